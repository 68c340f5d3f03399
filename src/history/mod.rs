//! Transcription history feature.

pub mod storage;

pub use storage::{HistoryEntry, HistoryManager};
