//! Plays synthesized audio through the system audio player.

use anyhow::{anyhow, Result};
use std::path::Path;
use std::process::Command;

/// Plays an audio file and waits for playback to finish.
///
/// On macOS: `afplay` (blocking, no window).
/// On other platforms: tries common CLI players (`mpv`, `ffplay`, `vlc`),
/// falling back to `xdg-open` which hands the file to the desktop default.
///
/// # Errors
/// - If no player can be started
pub fn play_audio_file(audio_path: &Path) -> Result<()> {
    if !audio_path.exists() {
        return Err(anyhow!("Audio file not found: {}", audio_path.display()));
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("afplay")
            .arg(audio_path)
            .spawn()
            .map_err(|e| anyhow!("Failed to start audio player: {e}"))?
            .wait()
            .map_err(|e| anyhow!("Audio player error: {e}"))?;
        tracing::debug!("Playback finished: {}", audio_path.display());
    }

    #[cfg(not(target_os = "macos"))]
    {
        let players: [(&str, &[&str]); 3] = [
            ("mpv", &["--no-video", "--really-quiet"]),
            ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "error"]),
            ("vlc", &["--intf", "dummy", "--play-and-exit"]),
        ];

        let mut played = false;
        for (player, args) in players {
            if let Ok(mut child) = Command::new(player).args(args).arg(audio_path).spawn() {
                child
                    .wait()
                    .map_err(|e| anyhow!("Audio player error: {e}"))?;
                tracing::debug!("Playback via {} finished: {}", player, audio_path.display());
                played = true;
                break;
            }
        }

        if !played {
            if let Ok(mut child) = Command::new("xdg-open").arg(audio_path).spawn() {
                child
                    .wait()
                    .map_err(|e| anyhow!("Audio player error: {e}"))?;
                played = true;
            }
        }

        if !played {
            return Err(anyhow!(
                "No audio player found. Install mpv, ffplay (ffmpeg) or vlc."
            ));
        }
    }

    Ok(())
}
