//! Microphone capture.
//!
//! Captures PCM from the system's default (or a configured) input device,
//! mixes multi-channel input down to mono, meters the live input level for
//! the silence monitor, and encodes the finished capture into the configured
//! artifact format.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::ffmpeg::encode_artifact;
use super::meter::dbfs_from_samples;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Records audio from a specified or default input device.
///
/// Capture runs at the device's native sample rate; multi-channel input is
/// averaged to mono in the stream callback. The recorder keeps every sample
/// until `finish` or `discard` releases the device.
pub struct AudioRecorder {
    /// Actual capture sample rate from the device
    sample_rate: u32,
    /// Captured mono samples (i16 PCM)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active input stream, kept alive while capturing
    stream: Option<cpal::Stream>,
    /// Device name or "default" for the system default device
    device_name: String,
}

impl AudioRecorder {
    /// Creates a recorder for the given device.
    ///
    /// The requested rate is advisory; the device's native rate wins and can
    /// be read back with `sample_rate()` once capture has started.
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            device_name,
        }
    }

    /// Opens the input device and starts capturing.
    ///
    /// # Errors
    /// - If no input device is available or the named device is not found
    /// - If the device configuration cannot be read
    /// - If the input stream cannot be created or started
    pub fn start_capture(&mut self) -> Result<()> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        self.sample_rate = device_sample_rate;

        let samples_arc = Arc::clone(&self.samples);

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                Self::handle_audio_callback(data, &samples_arc, num_channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!(
            "Audio stream started: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );
        Ok(())
    }

    /// Meters the input level over the most recent half second, in dBFS.
    pub fn level_db(&self) -> f32 {
        let samples = self.samples.lock().unwrap();
        let window = (self.sample_rate / 2) as usize;
        let start = samples.len().saturating_sub(window);
        dbfs_from_samples(&samples[start..])
    }

    /// Number of mono samples captured so far.
    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    /// Actual capture sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Stops capture and throws the samples away, releasing the device.
    pub fn discard(&mut self) {
        self.stream = None;
        self.samples.lock().unwrap().clear();
        tracing::debug!("Capture discarded");
    }

    /// Stops capture and encodes the samples into the artifact file.
    ///
    /// The audio is first written as a temporary WAV, then encoded by ffmpeg
    /// into the requested format. The temporary file is removed afterwards.
    ///
    /// # Errors
    /// - If no samples were captured
    /// - If the WAV intermediate cannot be written
    /// - If the ffmpeg encoding fails
    pub fn finish(&mut self, output_path: &Path, format: &str) -> Result<PathBuf> {
        self.stream = None;

        let samples = std::mem::take(&mut *self.samples.lock().unwrap());

        if samples.is_empty() {
            return Err(anyhow!("No audio captured"));
        }

        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.sample_rate
        );

        let temp_wav = std::env::temp_dir().join(format!("voxlink_{}.wav", std::process::id()));

        self.save_wav(&samples, &temp_wav)?;
        let encode_result = encode_artifact(&temp_wav, output_path, format);

        if let Err(e) = std::fs::remove_file(&temp_wav) {
            tracing::debug!("Failed to remove temp file: {}", e);
        }
        encode_result?;

        let file_size = std::fs::metadata(output_path)?.len();
        tracing::info!(
            "Artifact saved: {} ({} bytes, format: {})",
            output_path.display(),
            file_size,
            format
        );

        Ok(output_path.to_path_buf())
    }

    /// Appends incoming device frames as mono samples.
    fn handle_audio_callback(
        data: &[i16],
        samples_arc: &Arc<Mutex<Vec<i16>>>,
        num_channels: usize,
    ) {
        let mut samples = samples_arc.lock().unwrap();

        match num_channels {
            1 => {
                samples.extend_from_slice(data);
            }
            2 => {
                for chunk in data.chunks_exact(2) {
                    let left = chunk[0] as i32;
                    let right = chunk[1] as i32;
                    samples.push(((left + right) / 2) as i16);
                }
            }
            _ => {
                for chunk in data.chunks_exact(num_channels) {
                    let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                    samples.push((sum / num_channels as i32) as i16);
                }
            }
        }
    }

    /// Writes the captured samples as an uncompressed PCM WAV.
    fn save_wav(&self, samples: &[i16], path: &Path) -> Result<()> {
        let wav_spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, wav_spec)?;

        for &sample in samples {
            writer.write_sample(sample)?;
        }

        writer.finalize()?;
        tracing::debug!("Intermediate WAV created: {}", path.display());
        Ok(())
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the given name/index exists
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        } else {
            return Err(anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'voxlink list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms ALSA doesn't exist, so no suppression is needed.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
