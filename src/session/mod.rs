//! Microphone capture session feature.
//!
//! Covers the full capture lifecycle: device handling, input level metering,
//! silence-triggered auto-stop, cooperative cancellation, and artifact
//! encoding.

pub mod audio;
pub mod ffmpeg;
pub mod meter;
pub mod session;

pub use session::{
    CancelHandle, CaptureBackend, CpalBackend, RecordingSession, SessionError, SessionOutcome,
    SessionOwner, SessionState, StopReason,
};
