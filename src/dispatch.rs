//! Voice command matching and dispatch.
//!
//! Maps freeform recognized speech onto assistant actions. Each command owns
//! an ordered set of keywords in the supported languages; matching is
//! case-insensitive substring containment on the utterance. When several
//! keywords match, the longest one wins, and equal lengths fall back to
//! table order.

/// An action the assistant can perform in response to a voice command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    /// Start a dictation (speech-to-text) session
    OpenSpeechToText,
    /// Start a text-to-speech session
    OpenTextToSpeech,
    /// Open the settings / configuration
    OpenSettings,
    /// Open the quick-message phrasebook
    OpenQuickMessages,
    /// Toggle click-sound feedback
    ToggleSound,
    /// Toggle vibration feedback
    ToggleVibration,
}

impl CommandAction {
    /// Short identifier used in logs and history entries.
    pub fn id(&self) -> &'static str {
        match self {
            CommandAction::OpenSpeechToText => "speech-to-text",
            CommandAction::OpenTextToSpeech => "text-to-speech",
            CommandAction::OpenSettings => "settings",
            CommandAction::OpenQuickMessages => "quick-messages",
            CommandAction::ToggleSound => "toggle-sound",
            CommandAction::ToggleVibration => "toggle-vibration",
        }
    }
}

/// One entry of the command table: keywords in any supported language plus
/// the action they trigger.
#[derive(Debug, Clone)]
pub struct VoiceCommand {
    /// Keywords checked by substring containment against the lowercased input
    pub keywords: &'static [&'static str],
    /// Action triggered when one of the keywords matches
    pub action: CommandAction,
}

/// Matches recognized utterances against the command table.
pub struct CommandDispatcher {
    commands: Vec<VoiceCommand>,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandDispatcher {
    /// Creates a dispatcher with the built-in command table.
    pub fn new() -> Self {
        Self {
            commands: default_command_table(),
        }
    }

    /// Creates a dispatcher with a custom command table.
    pub fn with_commands(commands: Vec<VoiceCommand>) -> Self {
        Self { commands }
    }

    /// Resolves an utterance to at most one action without executing it.
    ///
    /// Keywords match by substring containment on the lowercased input.
    /// Several keywords can be present in one utterance ("ativar som"
    /// contains both "som" and "ativar som"); the longest matched keyword
    /// decides, and equal lengths keep the earlier table entry.
    pub fn resolve(&self, text: &str) -> Option<CommandAction> {
        let lower = text.to_lowercase();

        let mut best: Option<(usize, CommandAction, &str)> = None;
        for command in &self.commands {
            for &keyword in command.keywords {
                if !lower.contains(keyword) {
                    continue;
                }
                let len = keyword.chars().count();
                if best.is_none_or(|(best_len, _, _)| len > best_len) {
                    best = Some((len, command.action, keyword));
                }
            }
        }

        match best {
            Some((_, action, keyword)) => {
                tracing::debug!("Matched voice command '{}' via keyword '{}'", action.id(), keyword);
                Some(action)
            }
            None => {
                tracing::debug!("No voice command matched: {text}");
                None
            }
        }
    }

    /// Resolves the utterance and invokes the handler for the matched action.
    ///
    /// Returns whether anything matched; on `false` the caller is expected to
    /// tell the user the command was not recognized.
    pub fn dispatch<F>(&self, text: &str, mut handler: F) -> bool
    where
        F: FnMut(CommandAction),
    {
        match self.resolve(text) {
            Some(action) => {
                handler(action);
                true
            }
            None => false,
        }
    }
}

/// The built-in command table.
///
/// Keyword sets follow the utterances users actually produce in the four
/// supported languages. Short keywords ("som", "ler") deliberately stay in
/// the table for reachability; the longest-match rule keeps them from
/// shadowing more specific phrases.
fn default_command_table() -> Vec<VoiceCommand> {
    vec![
        VoiceCommand {
            keywords: &[
                "stt",
                "speech to text",
                "falar",
                "gravação",
                "voz para texto",
                "speechtotext",
                "dictar",
                "dicter",
            ],
            action: CommandAction::OpenSpeechToText,
        },
        VoiceCommand {
            keywords: &[
                "tts",
                "text to speech",
                "texto para voz",
                "ler",
                "texttospeech",
                "leer",
                "lire",
            ],
            action: CommandAction::OpenTextToSpeech,
        },
        VoiceCommand {
            keywords: &[
                "definições",
                "settings",
                "preferências",
                "configurações",
                "config",
                "acessibilidade",
                "paramètres",
                "einstellungen",
                "ajustes",
            ],
            action: CommandAction::OpenSettings,
        },
        VoiceCommand {
            keywords: &[
                "comunicação rápida",
                "rápida",
                "mensagens rápidas",
                "quick messages",
                "messages rapides",
                "mensajes rápidos",
            ],
            action: CommandAction::OpenQuickMessages,
        },
        VoiceCommand {
            keywords: &["feedback", "som", "ativar som", "desativar som", "sound", "sonido"],
            action: CommandAction::ToggleSound,
        },
        VoiceCommand {
            keywords: &[
                "vibração",
                "ativar vibração",
                "desativar vibração",
                "vibration",
                "vibración",
                "haptic",
            ],
            action: CommandAction::ToggleVibration,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new()
    }

    #[test]
    fn test_sound_toggle_invoked_exactly_once() {
        let mut calls = Vec::new();
        let matched = dispatcher().dispatch("ativar som", |action| calls.push(action));

        assert!(matched);
        assert_eq!(calls, vec![CommandAction::ToggleSound]);
    }

    #[test]
    fn test_nonsense_matches_nothing() {
        let mut calls = Vec::new();
        let matched = dispatcher().dispatch("xyz-nonsense", |action| calls.push(action));

        assert!(!matched);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_settings_keywords_in_every_language() {
        for utterance in [
            "ir para definições",
            "open the settings please",
            "ouvre les paramètres",
            "einstellungen öffnen",
        ] {
            assert_eq!(
                dispatcher().resolve(utterance),
                Some(CommandAction::OpenSettings),
                "expected settings for {utterance:?}"
            );
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            dispatcher().resolve("ATIVAR SOM"),
            Some(CommandAction::ToggleSound)
        );
    }

    #[test]
    fn test_longest_keyword_wins_over_shorter_overlap() {
        // "desativar som" contains both "som" and the more specific
        // "desativar som"; both live in the sound entry, but a custom table
        // shows the tie-break picks the longer keyword across entries too.
        let commands = vec![
            VoiceCommand {
                keywords: &["som"],
                action: CommandAction::OpenSettings,
            },
            VoiceCommand {
                keywords: &["ativar som"],
                action: CommandAction::ToggleSound,
            },
        ];
        let dispatcher = CommandDispatcher::with_commands(commands);

        assert_eq!(
            dispatcher.resolve("ativar som"),
            Some(CommandAction::ToggleSound)
        );
    }

    #[test]
    fn test_equal_length_keeps_table_order() {
        let commands = vec![
            VoiceCommand {
                keywords: &["abc"],
                action: CommandAction::OpenSettings,
            },
            VoiceCommand {
                keywords: &["bcd"],
                action: CommandAction::ToggleSound,
            },
        ];
        let dispatcher = CommandDispatcher::with_commands(commands);

        assert_eq!(
            dispatcher.resolve("abcd"),
            Some(CommandAction::OpenSettings)
        );
    }

    #[test]
    fn test_quick_messages_navigation() {
        assert_eq!(
            dispatcher().resolve("abrir mensagens rápidas"),
            Some(CommandAction::OpenQuickMessages)
        );
    }

    #[test]
    fn test_vibration_toggle() {
        assert_eq!(
            dispatcher().resolve("desativar vibração"),
            Some(CommandAction::ToggleVibration)
        );
    }
}
