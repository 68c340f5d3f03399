//! Configuration management for VoxLink.
//!
//! This module handles loading and saving application configuration from
//! TOML files, as well as secure storage of the cloud API credential.
//! Configuration lives in the user's config directory; the credential is
//! stored with restricted permissions in the user's local data directory.

pub mod file;
pub mod secrets;

pub use file::{
    get_config_path, AudioConfig, FeedbackConfig, GatewayConfig, SessionConfig, SpeechConfig,
    UserProfile, VoxConfig,
};
pub use secrets::{clear_api_key, get_api_key, require_api_key, save_api_key};
