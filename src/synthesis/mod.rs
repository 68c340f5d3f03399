//! Spoken output: cloud speech synthesis and local playback.

pub mod playback;
pub mod tts;

pub use playback::play_audio_file;
pub use tts::TtsClient;
