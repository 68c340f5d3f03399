//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the appropriate
//! command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// A terminal voice assistant with silence-triggered capture, cloud
/// transcription and voice command dispatch
#[derive(Parser)]
#[command(name = "voxlink")]
#[command(version)]
#[command(about = "VoxLink - terminal voice assistant")]
#[command(
    long_about = "VoxLink is a terminal voice assistant for accessible communication.\n\
It captures one utterance from the microphone (stopping on silence), sends it\n\
to a cloud speech gateway, and dispatches the recognized text against a\n\
multilingual command table. It also speaks text aloud, translates it, and\n\
carries a quick-message phrasebook.\n\n\
DEFAULT COMMAND:\n    \
If no command is specified, 'listen' is used by default.\n    \
Listen options (-l, --raw) can be used without explicitly saying 'listen'.\n\n\
EXAMPLES:\n    \
# Listen for a voice command\n    \
$ voxlink\n    \
\n    \
# Dictate in English without dispatching\n    \
$ voxlink --raw -l en\n    \
\n    \
# Speak text aloud in French\n    \
$ voxlink say \"I'm on my way\" -l fr\n    \
\n    \
# Speak quick message #1\n    \
$ voxlink quick 1\n    \
\n    \
# Transcribe an existing recording\n    \
$ voxlink transcribe memo.mp3\n    \
\n    \
# Store the cloud API key and pick a language\n    \
$ voxlink auth"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/voxlink/voxlink.toml\n    Quick messages:     ~/.config/voxlink/quick.txt\n    Logs:               ~/.local/state/voxlink/voxlink.log.*"
)]
struct Cli {
    /// Language (pt, en, es, fr) for the default listen command
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Transcribe only; skip command dispatch (listen default command)
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for a voice command (default)
    ///
    /// Records until ~1.5s of silence, transcribes the speech, and runs the
    /// matching assistant action. Ctrl-C cancels; SIGUSR1 stops early.
    #[command(visible_alias = "l")]
    Listen {
        /// Language (pt, en, es, fr)
        #[arg(short, long)]
        language: Option<String>,

        /// Transcribe only; skip command dispatch
        #[arg(long)]
        raw: bool,
    },

    /// Transcribe a pre-recorded audio file
    ///
    /// Sends an existing audio file through the speech gateway. Supports the
    /// same output options as dictation.
    ///
    /// Examples:
    ///   voxlink transcribe memo.mp3
    ///   voxlink transcribe memo.mp3 -c
    ///   voxlink transcribe memo.mp3 -o transcript.txt
    #[command(visible_alias = "t")]
    Transcribe {
        /// Path to the audio file to transcribe
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Language (pt, en, es, fr)
        #[arg(short, long)]
        language: Option<String>,

        /// Copy transcript to clipboard instead of stdout
        #[arg(short, long)]
        clipboard: bool,

        /// Write transcript to file instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<String>,
    },

    /// Speak text aloud
    ///
    /// Translates the text into the target language, synthesizes speech with
    /// the configured voice, and plays it through the system audio player.
    #[command(visible_alias = "s")]
    Say {
        /// The text to speak
        #[arg(value_name = "TEXT")]
        text: String,

        /// Target language (pt, en, es, fr)
        #[arg(short, long)]
        language: Option<String>,

        /// Speaking rate (0.5 to 1.5)
        #[arg(short, long)]
        rate: Option<f32>,

        /// Write the MP3 to a file instead of playing it
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// Synthesize the text as-is without translating it first
        #[arg(long)]
        no_translate: bool,
    },

    /// List or speak quick messages
    ///
    /// Without a number, lists the phrasebook for the active language.
    /// With a number, speaks that phrase aloud.
    #[command(visible_alias = "q")]
    Quick {
        /// Quick message number (1 = first)
        #[arg(value_name = "N")]
        index: Option<usize>,

        /// Language (pt, en, es, fr)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Translate text between the supported languages
    Translate {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,

        /// Target language (pt, en, es, fr)
        #[arg(short, long, value_name = "LANG")]
        to: String,
    },

    /// View recent transcription history
    #[command(visible_alias = "h")]
    History {
        /// Maximum number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Store the cloud API key, pick the default language and profile
    ///
    /// The key authenticates the synthesis and translation endpoints; it is
    /// stored with restricted permissions in the local data directory.
    #[command(visible_alias = "a")]
    Auth {
        /// Remove the stored API key instead of prompting
        #[arg(long)]
        clear: bool,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio, session, speech and feedback settings.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in voxlink.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   voxlink completions bash > voxlink.bash
    ///   voxlink completions zsh > _voxlink
    ///   voxlink completions fish > voxlink.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voxlink", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Listen { .. }) => {
            // Default command is listen.
            // Merge top-level options with explicit listen command options;
            // explicit listen options take precedence.
            let (language, raw) = match cli.command {
                Some(Commands::Listen { language, raw }) => (language, raw),
                None => (cli.language, cli.raw),
                _ => unreachable!(),
            };
            commands::handle_listen(language, raw).await?;
        }
        Some(Commands::Transcribe {
            file,
            language,
            clipboard,
            output,
        }) => {
            commands::handle_transcribe(file, language, clipboard, output).await?;
        }
        Some(Commands::Say {
            text,
            language,
            rate,
            output,
            no_translate,
        }) => {
            commands::handle_say(text, language, rate, output, no_translate).await?;
        }
        Some(Commands::Quick { index, language }) => {
            commands::handle_quick(index, language).await?;
        }
        Some(Commands::Translate { text, to }) => {
            commands::handle_translate(text, to).await?;
        }
        Some(Commands::History { limit }) => {
            commands::handle_history(limit).await?;
        }
        Some(Commands::Auth { clear }) => {
            if let Err(e) = commands::handle_auth(clear).await {
                // Check if it's a cancellation (cliclack already showed the message)
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
