//! Application command handlers for VoxLink.
//!
//! This module organizes command handling into separate submodules, each
//! responsible for a specific application command.
//!
//! # Commands
//! - `listen`: Voice assistant capture, transcription and dispatch (default)
//! - `transcribe`: Transcribe a pre-recorded audio file
//! - `say`: Translate, synthesize and play text
//! - `quick`: Quick-message phrasebook listing and speaking
//! - `translate`: Translate text between the supported languages
//! - `history`: Print recent transcriptions
//! - `auth`: Language selection and cloud API key management
//! - `config`: Open configuration file in the user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod auth;
pub mod config;
pub mod history;
pub mod listen;
pub mod list_devices;
pub mod logs;
pub mod quick;
pub mod say;
pub mod transcribe;
pub mod translate;

pub use auth::handle_auth;
pub use config::handle_config;
pub use history::handle_history;
pub use listen::handle_listen;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use quick::handle_quick;
pub use say::handle_say;
pub use transcribe::handle_transcribe;
pub use translate::handle_translate;
