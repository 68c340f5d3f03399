//! Cloud credential, language and profile setup.
//!
//! Unified flow: pick the default language and accessibility profile, then
//! store the cloud API key used by the synthesis and translation endpoints.
//! Users keep an existing key by pressing Enter without typing anything.

use cliclack::{intro, note, outro, password, select};
use console::style;

use crate::config::{self, UserProfile, VoxConfig};
use crate::transcription::Language;

/// Handles language/profile selection and API key management.
///
/// With `clear` set, removes the stored API key instead of prompting.
/// Choosing a profile resets the feedback toggles to that profile's
/// defaults; the chosen language becomes the default for listen, say and
/// quick.
pub async fn handle_auth(clear: bool) -> Result<(), anyhow::Error> {
    tracing::info!("=== VoxLink Authentication ===");

    if clear {
        config::clear_api_key()?;
        println!("Stored API key removed.");
        return Ok(());
    }

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    intro(style(" auth ").on_white().black())?;

    let mut config_data = VoxConfig::load_or_init()?;

    note("current language", config_data.speech.language.display_name())?;

    let mut language_prompt = select("Default language:");
    for (i, language) in Language::all().iter().enumerate() {
        language_prompt = language_prompt.item(i, language.display_name(), "");
    }
    let selected_idx: usize = language_prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;
    let selected_language = Language::all()[selected_idx];

    let profiles = [
        (UserProfile::Blind, "Blind", "sound, vibration and voice commands on"),
        (UserProfile::Deaf, "Deaf", "no click sounds"),
        (UserProfile::Mute, "Mute", "voice commands off"),
        (UserProfile::Other, "Other", "everything on"),
    ];
    let mut profile_prompt = select("Accessibility profile:");
    for (i, (_, label, hint)) in profiles.iter().enumerate() {
        profile_prompt = profile_prompt.item(i, *label, *hint);
    }
    let profile_idx: usize = profile_prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;
    let selected_profile = profiles[profile_idx].0;

    let current_api_key = config::get_api_key().ok().flatten();

    let api_key = if current_api_key.is_some() {
        password("Enter cloud API key (press Enter to keep current):")
            .allow_empty()
            .interact()
            .map_err(|e| anyhow::anyhow!("API key input cancelled: {e}"))?
    } else {
        password("Enter cloud API key:")
            .interact()
            .map_err(|e| anyhow::anyhow!("API key input cancelled: {e}"))?
    };

    let api_key_to_save = if api_key.is_empty() {
        match current_api_key {
            Some(key) => key,
            None => return Err(anyhow::anyhow!("API key cannot be empty")),
        }
    } else {
        api_key
    };

    config::save_api_key(&api_key_to_save)?;

    config_data.speech.language = selected_language;
    config_data.feedback.apply_profile_defaults(selected_profile);
    config_data.save()?;

    outro("Configuration saved.")?;

    tracing::info!(
        "Authentication completed: language={}, profile={:?}",
        selected_language.code(),
        selected_profile
    );

    Ok(())
}
