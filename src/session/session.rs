//! Capture session lifecycle.
//!
//! A [`RecordingSession`] owns one microphone capture attempt end to end:
//! acquire the process-wide busy slot, open the device, watch the input
//! level until silence (or a cancel, a manual stop, or the duration cap)
//! ends the capture, then encode and hand back the artifact. Every exit
//! path releases the device and the busy slot exactly once.
//!
//! Capture is single-flow: the monitor is a timer loop `select!`-ed against
//! a cancel channel, so cancellation is cooperative and takes effect at the
//! next tick.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use super::audio::AudioRecorder;
use super::ffmpeg::extension_for_format;
use super::meter::SilenceTracker;
use crate::config::SessionConfig;

/// Lifecycle states of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No capture attempted yet
    #[default]
    Idle,
    /// Acquiring the input device
    Requesting,
    /// Capture running, silence monitor active
    Recording,
    /// Finalizing the capture
    Stopping,
    /// Capture finished, artifact available
    Stopped,
    /// Capture aborted by the user, no artifact
    Canceled,
    /// Capture failed
    Failed,
}

/// Why a recording capture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The silence monitor saw enough consecutive quiet ticks
    Silence,
    /// An external stop request (e.g. SIGUSR1) ended the capture
    Manual,
    /// The configured maximum duration elapsed
    MaxDuration,
}

/// Result of a completed capture attempt.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Capture finished and produced an artifact
    Completed {
        /// Location of the encoded audio artifact
        artifact: PathBuf,
        /// What ended the capture
        reason: StopReason,
    },
    /// Capture was canceled before completion; no artifact exists
    Canceled,
}

/// Errors a capture session reports to its caller.
///
/// All of these convert into short user-facing status lines; none are fatal
/// and no retries happen at this layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Another session holds the capture slot
    #[error("another capture session is already active")]
    Busy,
    /// The input device could not be acquired
    #[error("microphone unavailable: {0}")]
    PermissionDenied(String),
    /// The capture produced no usable recording
    #[error("no usable recording was produced")]
    InvalidArtifact,
    /// Capturing or encoding failed
    #[error("capture failed: {0}")]
    Capture(String),
}

/// Platform seam for the capture device.
///
/// The session state machine only ever talks to this trait, so tests drive
/// it with a scripted backend and the binary plugs in [`CpalBackend`].
pub trait CaptureBackend {
    /// Acquires the input device and starts capturing.
    fn open(&mut self) -> Result<(), SessionError>;

    /// Current input level in dBFS.
    fn level_db(&self) -> f32;

    /// Stops capturing, encodes the artifact at `output` and returns its
    /// location.
    fn finish(&mut self, output: &Path) -> Result<PathBuf, SessionError>;

    /// Stops capturing and releases the device without producing an artifact.
    fn discard(&mut self);

    /// File extension of the artifact this backend produces.
    fn artifact_extension(&self) -> &'static str;
}

/// Grants the process-wide capture slot.
///
/// At most one session may be recording at a time; a second `capture` while
/// the slot is held fails with [`SessionError::Busy`] instead of queuing.
/// Cloning shares the same slot.
#[derive(Clone, Default)]
pub struct SessionOwner {
    busy: Arc<AtomicBool>,
}

impl SessionOwner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session currently holds the capture slot.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Result<BusyGuard, SessionError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(BusyGuard {
                busy: Arc::clone(&self.busy),
            })
        } else {
            Err(SessionError::Busy)
        }
    }
}

/// Releases the capture slot exactly once, on every exit path.
struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Requests cancellation of a running session.
///
/// Cloneable and settable from any task at any time. Cancellation is
/// observed at the session's next monitor tick; calling it more than once
/// is harmless.
#[derive(Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Flags the session for cancellation.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// One microphone capture attempt with silence-triggered auto-stop.
pub struct RecordingSession {
    owner: SessionOwner,
    config: SessionConfig,
    backend: Box<dyn CaptureBackend>,
    cancel_tx: watch::Sender<bool>,
    stop_requested: Arc<AtomicBool>,
    state: SessionState,
}

impl RecordingSession {
    /// Creates a session bound to the given owner slot and backend.
    pub fn new(owner: &SessionOwner, config: SessionConfig, backend: Box<dyn CaptureBackend>) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            owner: owner.clone(),
            config,
            backend,
            cancel_tx,
            stop_requested: Arc::new(AtomicBool::new(false)),
            state: SessionState::Idle,
        }
    }

    /// Handle for canceling this session from another task or a signal
    /// handler.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Flag that requests a manual stop (capture finishes and the artifact
    /// is kept). Wired to SIGUSR1 by the listen command.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_requested)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the capture to completion.
    ///
    /// Acquires the busy slot, opens the device, and monitors the input
    /// level every `tick_interval_ms` until one of the end conditions fires.
    /// The busy slot and the device are released on every path out of this
    /// function.
    ///
    /// # Errors
    /// - [`SessionError::Busy`] if another session is recording
    /// - [`SessionError::PermissionDenied`] if the device cannot be acquired
    /// - [`SessionError::InvalidArtifact`] if nothing usable was captured
    /// - [`SessionError::Capture`] if encoding the artifact fails
    pub async fn capture(&mut self) -> Result<SessionOutcome, SessionError> {
        let _guard = self.owner.try_acquire()?;

        let mut cancel_rx = self.cancel_tx.subscribe();

        // A cancel issued before the capture starts wins without ever
        // touching the device.
        if *cancel_rx.borrow_and_update() {
            self.state = SessionState::Canceled;
            tracing::info!("Capture canceled before start");
            return Ok(SessionOutcome::Canceled);
        }

        self.state = SessionState::Requesting;
        if let Err(e) = self.backend.open() {
            self.state = SessionState::Failed;
            return Err(e);
        }

        self.state = SessionState::Recording;
        tracing::info!(
            "Capture started: silence threshold {}dB, {} ticks of {}ms",
            self.config.silence_threshold_db,
            self.config.silence_ticks,
            self.config.tick_interval_ms
        );

        let mut tracker = SilenceTracker::new(
            self.config.silence_threshold_db,
            self.config.silence_ticks,
        );
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // the first tick completes immediately

        let started = Instant::now();

        let end = loop {
            tokio::select! {
                _ = interval.tick() => {
                    if *cancel_rx.borrow_and_update() {
                        break None;
                    }
                    if self.stop_requested.load(Ordering::Relaxed) {
                        tracing::info!("Manual stop requested");
                        break Some(StopReason::Manual);
                    }

                    let level = self.backend.level_db();
                    if tracker.observe(level) {
                        tracing::info!(
                            "Silence detected ({} quiet ticks at {:.1}dB), stopping",
                            tracker.consecutive(),
                            level
                        );
                        break Some(StopReason::Silence);
                    }

                    if let Some(max_secs) = self.config.max_duration_secs {
                        if started.elapsed() >= Duration::from_secs(max_secs) {
                            tracing::warn!("Capture hit the {max_secs}s duration cap, stopping");
                            break Some(StopReason::MaxDuration);
                        }
                    }
                }
                _ = cancel_rx.changed() => {
                    if *cancel_rx.borrow_and_update() {
                        break None;
                    }
                }
            }
        };

        self.state = SessionState::Stopping;

        let Some(reason) = end else {
            self.backend.discard();
            self.state = SessionState::Canceled;
            tracing::info!("Capture canceled");
            return Ok(SessionOutcome::Canceled);
        };

        let artifact_path = std::env::temp_dir().join(format!(
            "voxlink-capture.{}",
            self.backend.artifact_extension()
        ));

        match self.backend.finish(&artifact_path) {
            Ok(artifact) => {
                self.state = SessionState::Stopped;
                Ok(SessionOutcome::Completed { artifact, reason })
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }
}

/// Capture backend backed by the cpal recorder and ffmpeg encoding.
pub struct CpalBackend {
    recorder: AudioRecorder,
    output_format: String,
}

impl CpalBackend {
    /// Creates a backend for the configured device and artifact format.
    pub fn new(sample_rate: u32, device_name: String, output_format: String) -> Self {
        Self {
            recorder: AudioRecorder::new(sample_rate, device_name),
            output_format,
        }
    }
}

impl CaptureBackend for CpalBackend {
    fn open(&mut self) -> Result<(), SessionError> {
        self.recorder
            .start_capture()
            .map_err(|e| SessionError::PermissionDenied(e.to_string()))
    }

    fn level_db(&self) -> f32 {
        self.recorder.level_db()
    }

    fn finish(&mut self, output: &Path) -> Result<PathBuf, SessionError> {
        if self.recorder.sample_count() == 0 {
            self.recorder.discard();
            return Err(SessionError::InvalidArtifact);
        }
        self.recorder
            .finish(output, &self.output_format)
            .map_err(|e| SessionError::Capture(e.to_string()))
    }

    fn discard(&mut self) {
        self.recorder.discard();
    }

    fn artifact_extension(&self) -> &'static str {
        extension_for_format(&self.output_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::AtomicUsize;

    /// Scripted backend: replays a level sequence, repeating the last entry.
    struct FakeBackend {
        levels: Vec<f32>,
        cursor: Cell<usize>,
        opens: Arc<AtomicUsize>,
        finishes: Arc<AtomicUsize>,
        discards: Arc<AtomicUsize>,
        fail_open: bool,
    }

    #[derive(Clone, Default)]
    struct Counters {
        opens: Arc<AtomicUsize>,
        finishes: Arc<AtomicUsize>,
        discards: Arc<AtomicUsize>,
    }

    impl Counters {
        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }
        fn finishes(&self) -> usize {
            self.finishes.load(Ordering::SeqCst)
        }
        fn discards(&self) -> usize {
            self.discards.load(Ordering::SeqCst)
        }
    }

    impl FakeBackend {
        fn new(levels: Vec<f32>, counters: &Counters) -> Self {
            Self {
                levels,
                cursor: Cell::new(0),
                opens: Arc::clone(&counters.opens),
                finishes: Arc::clone(&counters.finishes),
                discards: Arc::clone(&counters.discards),
                fail_open: false,
            }
        }

        fn failing_open(counters: &Counters) -> Self {
            let mut backend = Self::new(vec![-10.0], counters);
            backend.fail_open = true;
            backend
        }
    }

    impl CaptureBackend for FakeBackend {
        fn open(&mut self) -> Result<(), SessionError> {
            if self.fail_open {
                return Err(SessionError::PermissionDenied("denied".into()));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn level_db(&self) -> f32 {
            let idx = self.cursor.get();
            let level = self.levels[idx.min(self.levels.len() - 1)];
            self.cursor.set(idx + 1);
            level
        }

        fn finish(&mut self, output: &Path) -> Result<PathBuf, SessionError> {
            self.finishes.fetch_add(1, Ordering::SeqCst);
            Ok(output.to_path_buf())
        }

        fn discard(&mut self) {
            self.discards.fetch_add(1, Ordering::SeqCst);
        }

        fn artifact_extension(&self) -> &'static str {
            "wav"
        }
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            silence_threshold_db: -40.0,
            silence_ticks: 3,
            tick_interval_ms: 500,
            max_duration_secs: Some(30),
        }
    }

    fn session(
        owner: &SessionOwner,
        config: SessionConfig,
        levels: Vec<f32>,
        counters: &Counters,
    ) -> RecordingSession {
        RecordingSession::new(owner, config, Box::new(FakeBackend::new(levels, counters)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_silence_run_auto_stops() {
        let owner = SessionOwner::new();
        let counters = Counters::default();
        // Two ticks of speech, then unbroken silence.
        let mut session = session(
            &owner,
            test_config(),
            vec![-10.0, -12.0, -55.0, -60.0, -58.0],
            &counters,
        );

        let outcome = session.capture().await.unwrap();

        match outcome {
            SessionOutcome::Completed { reason, artifact } => {
                assert_eq!(reason, StopReason::Silence);
                assert!(artifact.to_string_lossy().contains("voxlink-capture"));
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(counters.finishes(), 1);
        assert!(!owner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_alternating_levels_never_auto_stop() {
        let owner = SessionOwner::new();
        let counters = Counters::default();
        // Two quiet ticks, one loud: the silence run never reaches three,
        // so only the duration cap ends the capture.
        let levels: Vec<f32> = [-55.0, -55.0, -15.0]
            .iter()
            .copied()
            .cycle()
            .take(60)
            .collect();
        let config = SessionConfig {
            max_duration_secs: Some(10),
            ..test_config()
        };
        let mut session = session(&owner, config, levels, &counters);

        let outcome = session.capture().await.unwrap();

        match outcome {
            SessionOutcome::Completed { reason, .. } => {
                assert_eq!(reason, StopReason::MaxDuration);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_rejected_while_recording() {
        let owner = SessionOwner::new();
        let first_counters = Counters::default();
        let second_counters = Counters::default();

        // First session never goes silent; the test cancels it once the
        // second start has been rejected.
        let mut first = session(&owner, test_config(), vec![-10.0], &first_counters);
        let mut second = session(&owner, test_config(), vec![-10.0], &second_counters);
        let cancel_first = first.cancel_handle();

        let (first_result, _) = tokio::join!(first.capture(), async {
            let err = second.capture().await.unwrap_err();
            assert!(matches!(err, SessionError::Busy));
            cancel_first.cancel();
        });

        assert!(matches!(first_result, Ok(SessionOutcome::Canceled)));
        // The rejected session never touched its capture device.
        assert_eq!(second_counters.opens(), 0);
        assert_eq!(first_counters.opens(), 1);
        assert!(!owner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_capture_and_frees_slot() {
        let owner = SessionOwner::new();
        let counters = Counters::default();
        let mut session = session(&owner, test_config(), vec![-10.0], &counters);
        let cancel = session.cancel_handle();

        let (outcome, ()) = tokio::join!(session.capture(), async {
            tokio::time::sleep(Duration::from_millis(1200)).await;
            cancel.cancel();
        });

        assert!(matches!(outcome, Ok(SessionOutcome::Canceled)));
        assert_eq!(session.state(), SessionState::Canceled);
        assert_eq!(counters.finishes(), 0, "a canceled capture yields no artifact");
        assert_eq!(counters.discards(), 1);
        assert!(!owner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_twice_is_idempotent() {
        let owner = SessionOwner::new();
        let counters = Counters::default();
        let mut session = session(&owner, test_config(), vec![-10.0], &counters);
        let cancel = session.cancel_handle();

        cancel.cancel();
        cancel.cancel();
        assert!(cancel.is_canceled());

        let outcome = session.capture().await.unwrap();
        assert!(matches!(outcome, SessionOutcome::Canceled));
        assert_eq!(session.state(), SessionState::Canceled);
        // Canceled before start: the device was never opened.
        assert_eq!(counters.opens(), 0);
        assert!(!owner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_stop_keeps_artifact() {
        let owner = SessionOwner::new();
        let counters = Counters::default();
        let mut session = session(&owner, test_config(), vec![-10.0], &counters);
        let stop = session.stop_flag();

        let (outcome, ()) = tokio::join!(session.capture(), async {
            tokio::time::sleep(Duration::from_millis(1200)).await;
            stop.store(true, Ordering::Relaxed);
        });

        match outcome.unwrap() {
            SessionOutcome::Completed { reason, .. } => {
                assert_eq!(reason, StopReason::Manual);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(counters.finishes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_device_fails_and_frees_slot() {
        let owner = SessionOwner::new();
        let counters = Counters::default();
        let mut session = RecordingSession::new(
            &owner,
            test_config(),
            Box::new(FakeBackend::failing_open(&counters)),
        );

        let err = session.capture().await.unwrap_err();

        assert!(matches!(err, SessionError::PermissionDenied(_)));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(!owner.is_busy(), "a failed session leaves the slot free");
    }
}
