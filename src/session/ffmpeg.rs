//! FFmpeg discovery and artifact encoding.
//!
//! Captured audio is written as an intermediate WAV and handed to ffmpeg for
//! encoding into the configured artifact format. Discovery checks standard
//! installation locations before falling back to a PATH search so the binary
//! is found even under a minimal environment.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locates the ffmpeg binary on the system.
///
/// Checks platform-typical install locations first, then falls back to a
/// PATH search via `which`/`where`.
pub fn find_ffmpeg() -> Result<PathBuf> {
    let candidates = if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/snap/bin/ffmpeg"),
        ]
    } else {
        vec![]
    };

    for path in candidates {
        if path.exists() {
            tracing::debug!("Found ffmpeg at: {}", path.display());
            return Ok(path);
        }
    }

    let ffmpeg_path = find_in_path("ffmpeg")?;
    tracing::debug!("Found ffmpeg in PATH at: {}", ffmpeg_path.display());
    Ok(ffmpeg_path)
}

/// Encodes an intermediate WAV into the final artifact format.
///
/// The format string carries the codec followed by extra ffmpeg options,
/// e.g. `"mp3 -ab 16k -ar 12000"`. Mono output is always enforced since the
/// speech services expect a single channel.
///
/// # Errors
/// - If the format string is empty
/// - If ffmpeg cannot be located or the conversion fails
pub fn encode_artifact(input_wav: &Path, output_path: &Path, format: &str) -> Result<()> {
    let format_parts: Vec<&str> = format.split_whitespace().collect();

    let Some(&codec) = format_parts.first() else {
        return Err(anyhow!("Invalid artifact format string: empty"));
    };

    let ffmpeg_path = find_ffmpeg()?;

    let mut cmd = Command::new(&ffmpeg_path);
    cmd.arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input_wav)
        .arg("-acodec")
        .arg(codec)
        .arg("-ac")
        .arg("1")
        .arg("-y");

    for option in &format_parts[1..] {
        cmd.arg(option);
    }

    cmd.arg(output_path);

    let output = cmd.output()?;

    if output.status.success() {
        tracing::debug!("Artifact encoded as {} at {}", codec, output_path.display());
        Ok(())
    } else {
        let error_msg = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffmpeg encoding failed: {}", error_msg);
        Err(anyhow!("Audio encoding failed: {error_msg}"))
    }
}

/// File extension produced by a given artifact format string.
pub fn extension_for_format(format: &str) -> &'static str {
    match format.split_whitespace().next().unwrap_or("mp3") {
        "libopus" | "libvorbis" => "ogg",
        "flac" => "flac",
        "aac" => "m4a",
        "pcm_s16le" => "wav",
        _ => "mp3",
    }
}

/// Searches for a binary in the system PATH.
fn find_in_path(binary_name: &str) -> Result<PathBuf> {
    let search_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    let output = Command::new(search_cmd)
        .arg(binary_name)
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for {binary_name}: {e}"))?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        let path = PathBuf::from(path_str.trim());
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "ffmpeg not found. Please install ffmpeg:\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_known_codecs() {
        assert_eq!(extension_for_format("mp3 -ab 16k -ar 12000"), "mp3");
        assert_eq!(extension_for_format("libopus"), "ogg");
        assert_eq!(extension_for_format("pcm_s16le"), "wav");
        assert_eq!(extension_for_format("aac"), "m4a");
    }

    #[test]
    fn test_encode_rejects_empty_format() {
        let err = encode_artifact(Path::new("in.wav"), Path::new("out.mp3"), "  ");
        assert!(err.is_err());
    }
}
