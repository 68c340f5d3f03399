//! Quick-message phrasebook.
//!
//! A small set of everyday phrases users can speak aloud with one command
//! instead of typing. Each language carries its own built-in set; users
//! extend it with extra lines in `quick.txt` next to the config file.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::transcription::Language;

/// Built-in quick messages for a language.
pub fn builtin_messages(language: Language) -> &'static [&'static str] {
    match language {
        Language::Pt => &[
            "Preciso de ajuda",
            "Sim",
            "Não",
            "Obrigado",
            "Pode repetir, por favor?",
            "Estou a caminho",
        ],
        Language::En => &[
            "I need help",
            "Yes",
            "No",
            "Thank you",
            "Could you repeat that, please?",
            "I'm on my way",
        ],
        Language::Es => &[
            "Necesito ayuda",
            "Sí",
            "No",
            "Gracias",
            "¿Puede repetirlo, por favor?",
            "Voy de camino",
        ],
        Language::Fr => &[
            "J'ai besoin d'aide",
            "Oui",
            "Non",
            "Merci",
            "Pouvez-vous répéter, s'il vous plaît?",
            "J'arrive",
        ],
    }
}

/// The quick messages available to the user: built-ins plus custom lines.
pub struct Phrasebook {
    phrases: Vec<String>,
}

impl Phrasebook {
    /// Loads the phrasebook for a language, appending the user's custom
    /// phrases from `quick.txt` when present.
    pub fn load(language: Language) -> Result<Self> {
        Self::load_from(language, user_phrases_path().ok().as_deref())
    }

    /// Loads the phrasebook with an explicit custom-phrase file.
    pub fn load_from(language: Language, user_file: Option<&Path>) -> Result<Self> {
        let mut phrases: Vec<String> = builtin_messages(language)
            .iter()
            .map(|p| p.to_string())
            .collect();

        if let Some(path) = user_file {
            if path.exists() {
                let content = fs::read_to_string(path)?;
                phrases.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                );
                tracing::debug!("Loaded custom quick messages from {}", path.display());
            }
        }

        Ok(Self { phrases })
    }

    /// All phrases in listing order.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Returns phrase number `index` (1-based, as printed by the listing).
    pub fn get(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return None;
        }
        self.phrases.get(index - 1).map(String::as_str)
    }
}

/// Path of the user's custom quick-message file.
pub fn user_phrases_path() -> Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("voxlink");
    Ok(config_dir.join("quick.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_builtins() {
        for language in Language::all() {
            assert!(!builtin_messages(*language).is_empty());
        }
    }

    #[test]
    fn test_indexing_is_one_based() {
        let book = Phrasebook::load_from(Language::Pt, None).unwrap();
        assert_eq!(book.get(1), Some("Preciso de ajuda"));
        assert_eq!(book.get(0), None);
        assert_eq!(book.get(book.phrases().len() + 1), None);
    }

    #[test]
    fn test_custom_phrases_are_appended() {
        let path = std::env::temp_dir().join(format!("voxlink-quick-{}.txt", std::process::id()));
        fs::write(&path, "A medicação está na mesa\n\n  Chama o meu contacto  \n").unwrap();

        let book = Phrasebook::load_from(Language::Pt, Some(&path)).unwrap();
        let builtin_count = builtin_messages(Language::Pt).len();

        assert_eq!(book.phrases().len(), builtin_count + 2);
        assert_eq!(
            book.get(builtin_count + 2),
            Some("Chama o meu contacto"),
            "custom lines are trimmed and blanks skipped"
        );

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_custom_file_is_fine() {
        let path = Path::new("/nonexistent/voxlink-quick.txt");
        let book = Phrasebook::load_from(Language::En, Some(path)).unwrap();
        assert_eq!(book.phrases().len(), builtin_messages(Language::En).len());
    }
}
