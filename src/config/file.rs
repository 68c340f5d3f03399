//! Configuration file management for VoxLink.
//!
//! Loads and saves application configuration from a TOML file in the user's
//! config directory. Every table has serde defaults so a partial (or absent)
//! file still yields a working configuration; the first run writes the
//! defaults out.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::transcription::{Language, VoicePreference};

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for the system default device
    /// - numeric index (0, 1, 2, etc.) from `voxlink list-devices`
    /// - device name from `voxlink list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested capture sample rate in Hz (the device rate wins)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Artifact format string: "codec [ffmpeg_options]"
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_output_format() -> String {
    "mp3 -ab 16k -ar 12000".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            output_format: default_output_format(),
        }
    }
}

/// Capture session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Input level below which a monitor tick counts as silence, in dBFS
    #[serde(default = "default_silence_threshold_db")]
    pub silence_threshold_db: f32,
    /// Consecutive quiet ticks that stop the capture
    #[serde(default = "default_silence_ticks")]
    pub silence_ticks: u32,
    /// Monitor tick interval in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Hard cap on capture duration in seconds; absent disables the cap
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: Option<u64>,
}

fn default_silence_threshold_db() -> f32 {
    -40.0
}

fn default_silence_ticks() -> u32 {
    3
}

fn default_tick_interval_ms() -> u64 {
    500
}

fn default_max_duration_secs() -> Option<u64> {
    Some(60)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            silence_threshold_db: default_silence_threshold_db(),
            silence_ticks: default_silence_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
            max_duration_secs: default_max_duration_secs(),
        }
    }
}

/// Spoken output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Primary language for recognition and synthesis
    #[serde(default)]
    pub language: Language,
    /// Preferred synthesis voice
    #[serde(default)]
    pub voice: VoicePreference,
    /// Synthesis speaking rate (0.5 to 1.5)
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f32,
}

fn default_speaking_rate() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            voice: VoicePreference::default(),
            speaking_rate: default_speaking_rate(),
        }
    }
}

/// Remote speech gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Transcription endpoint accepting base64 audio plus a language hint
    #[serde(default = "default_transcribe_url")]
    pub transcribe_url: String,
}

fn default_transcribe_url() -> String {
    "https://api-msd2tzx4aq-uc.a.run.app/transcribe".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            transcribe_url: default_transcribe_url(),
        }
    }
}

/// Accessibility profile the feedback defaults are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserProfile {
    Blind,
    Deaf,
    Mute,
    #[default]
    Other,
}

impl UserProfile {
    /// Default feedback toggles for a profile: (sound, vibration, voice commands).
    ///
    /// Deaf users get no click sounds, mute users get no voice-command
    /// assistant; everyone keeps vibration.
    pub fn feedback_defaults(&self) -> (bool, bool, bool) {
        match self {
            UserProfile::Blind => (true, true, true),
            UserProfile::Deaf => (false, true, true),
            UserProfile::Mute => (true, true, false),
            UserProfile::Other => (true, true, true),
        }
    }
}

/// Feedback and assistant toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Accessibility profile; `apply_profile_defaults` derives the toggles
    #[serde(default)]
    pub profile: UserProfile,
    /// Click-sound feedback on actions
    #[serde(default = "default_true")]
    pub sound: bool,
    /// Vibration feedback on actions
    #[serde(default = "default_true")]
    pub vibration: bool,
    /// Master switch for the voice-command assistant
    #[serde(default = "default_true")]
    pub voice_commands: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            profile: UserProfile::default(),
            sound: true,
            vibration: true,
            voice_commands: true,
        }
    }
}

impl FeedbackConfig {
    /// Resets the toggles to the defaults of the given profile.
    pub fn apply_profile_defaults(&mut self, profile: UserProfile) {
        let (sound, vibration, voice_commands) = profile.feedback_defaults();
        self.profile = profile;
        self.sound = sound;
        self.vibration = vibration;
        self.voice_commands = voice_commands;
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoxConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl VoxConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: VoxConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Loads the configuration, writing defaults on the first run.
    ///
    /// A missing file produces (and persists) the default configuration; a
    /// malformed file stays an error so user edits are never clobbered.
    pub fn load_or_init() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            let config = VoxConfig::default();
            config.save()?;
            tracing::info!("Default configuration written to {}", config_path.display());
            return Ok(config);
        }
        Self::load()
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Could not find home directory")
    })?;
    let config_path = home.join(".config").join("voxlink").join("voxlink.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_monitor_tuning() {
        let config = VoxConfig::default();
        assert_eq!(config.session.silence_threshold_db, -40.0);
        assert_eq!(config.session.silence_ticks, 3);
        assert_eq!(config.session.tick_interval_ms, 500);
        assert_eq!(config.session.max_duration_secs, Some(60));
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: VoxConfig = toml::from_str("").unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.speech.language, Language::Pt);
        assert!(config.feedback.voice_commands);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: VoxConfig =
            toml::from_str("[session]\nsilence_threshold_db = -50.0\nsilence_ticks = 5\n").unwrap();
        assert_eq!(config.session.silence_threshold_db, -50.0);
        assert_eq!(config.session.silence_ticks, 5);
        assert_eq!(config.session.tick_interval_ms, 500);
    }

    #[test]
    fn test_profile_defaults() {
        let mut feedback = FeedbackConfig::default();

        feedback.apply_profile_defaults(UserProfile::Deaf);
        assert!(!feedback.sound);
        assert!(feedback.voice_commands);

        feedback.apply_profile_defaults(UserProfile::Mute);
        assert!(feedback.sound);
        assert!(!feedback.voice_commands);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = VoxConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let reparsed: VoxConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.speech.language, config.speech.language);
        assert_eq!(reparsed.session.silence_ticks, config.session.silence_ticks);
        assert_eq!(reparsed.session.max_duration_secs, config.session.max_duration_secs);
    }
}
