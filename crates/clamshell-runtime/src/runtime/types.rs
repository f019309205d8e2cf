use std::time::Duration;

/// Target wall-clock period between emulation steps.
pub const FRAME_PERIOD: Duration = Duration::from_nanos(16_666_667);

/// How long a bounded device wait may block before re-checking the cancel
/// token.
pub(crate) const DEVICE_WAIT_SLICE: Duration = Duration::from_millis(100);

/// Default bound on joining workers during a pause transition.
pub(crate) const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("cannot {op} while {state}")]
    InvalidState {
        op: &'static str,
        state: &'static str,
    },

    #[error("no ROM selected for a start with reset")]
    NoRomSelected,

    #[error("worker `{worker}` did not stop within {timeout:?}")]
    ShutdownTimeout {
        worker: &'static str,
        timeout: Duration,
    },

    #[error("failed to spawn worker `{worker}`: {error}")]
    WorkerSpawn {
        worker: &'static str,
        error: String,
    },

    #[error("platform error: {0}")]
    Platform(String),

    #[error("core error: {0}")]
    Core(String),
}

/// Asynchronous reports from the workers, drained by the main loop.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The stepping loop hit a fatal core error and terminated.
    CoreStopped { error: String },
    AudioInitFailed { error: String },
    AudioDeviceError { error: String },
    MicInitFailed { error: String },
    MicDeviceError { error: String },
}
