//! Supported languages and their cloud service identifiers.
//!
//! VoxLink speaks four languages. Each maps to a BCP-47 code used by the
//! speech gateway and the synthesis endpoint, and to a pair of standard
//! voices for spoken output.

use serde::{Deserialize, Serialize};

/// A language supported across transcription, synthesis and translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Portuguese (Portugal)
    #[default]
    Pt,
    /// English (US)
    En,
    /// Spanish (Spain)
    Es,
    /// French (France)
    Fr,
}

/// Preferred synthesis voice gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoicePreference {
    #[default]
    Feminine,
    Masculine,
}

impl Language {
    /// Two-letter code used in configuration and the translate API.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
        }
    }

    /// Full BCP-47 tag sent to the speech services.
    pub fn bcp47(&self) -> &'static str {
        match self {
            Language::Pt => "pt-PT",
            Language::En => "en-US",
            Language::Es => "es-ES",
            Language::Fr => "fr-FR",
        }
    }

    /// Human-readable name for prompts and listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Pt => "Português (Portugal)",
            Language::En => "English (US)",
            Language::Es => "Español (España)",
            Language::Fr => "Français (France)",
        }
    }

    /// Parses a two-letter code or a full BCP-47 tag.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "pt" | "pt-pt" => Some(Language::Pt),
            "en" | "en-us" => Some(Language::En),
            "es" | "es-es" => Some(Language::Es),
            "fr" | "fr-fr" => Some(Language::Fr),
            _ => None,
        }
    }

    /// All supported languages, default first.
    pub fn all() -> &'static [Self] {
        &[Language::Pt, Language::En, Language::Es, Language::Fr]
    }

    /// BCP-47 tags of the other languages, used as recognition alternatives
    /// so the gateway can fall back when the speaker switches language.
    pub fn alternatives(&self) -> Vec<&'static str> {
        Self::all()
            .iter()
            .filter(|l| *l != self)
            .map(|l| l.bcp47())
            .collect()
    }

    /// Standard synthesis voice for this language and preference.
    pub fn voice_name(&self, voice: VoicePreference) -> &'static str {
        match (self, voice) {
            (Language::Pt, VoicePreference::Feminine) => "pt-PT-Standard-A",
            (Language::Pt, VoicePreference::Masculine) => "pt-PT-Standard-B",
            (Language::En, VoicePreference::Feminine) => "en-US-Standard-F",
            (Language::En, VoicePreference::Masculine) => "en-US-Standard-D",
            (Language::Es, VoicePreference::Feminine) => "es-ES-Standard-A",
            (Language::Es, VoicePreference::Masculine) => "es-ES-Standard-B",
            (Language::Fr, VoicePreference::Feminine) => "fr-FR-Standard-A",
            (Language::Fr, VoicePreference::Masculine) => "fr-FR-Standard-B",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_accepts_short_and_full_tags() {
        assert_eq!(Language::from_code("pt"), Some(Language::Pt));
        assert_eq!(Language::from_code("en-US"), Some(Language::En));
        assert_eq!(Language::from_code("FR"), Some(Language::Fr));
        assert_eq!(Language::from_code("de"), None);
    }

    #[test]
    fn test_alternatives_exclude_self() {
        let alts = Language::Pt.alternatives();
        assert_eq!(alts, vec!["en-US", "es-ES", "fr-FR"]);
        assert!(!alts.contains(&"pt-PT"));
    }

    #[test]
    fn test_voice_names_match_language() {
        assert_eq!(
            Language::Pt.voice_name(VoicePreference::Feminine),
            "pt-PT-Standard-A"
        );
        assert_eq!(
            Language::En.voice_name(VoicePreference::Masculine),
            "en-US-Standard-D"
        );
    }
}
