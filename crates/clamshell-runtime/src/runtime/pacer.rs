use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use clamshell_config::Config;

use crate::core::EmulatorCore;
use crate::video::FrameStore;

use super::state::SharedState;
use super::types::{RuntimeEvent, FRAME_PERIOD};

/// The stepping worker: drives one emulation step per iteration and
/// paces against wall-clock time.
pub(crate) struct FramePacer {
    pub(crate) core: Arc<Mutex<dyn EmulatorCore>>,
    pub(crate) frames: Arc<FrameStore>,
    pub(crate) config: Arc<RwLock<Config>>,
    pub(crate) state: Arc<SharedState>,
    pub(crate) events: Sender<RuntimeEvent>,
}

impl FramePacer {
    /// Runs until the cancel token is observed at an iteration boundary
    /// (at most one frame of termination latency) or the core reports a
    /// fatal error.
    pub(crate) fn run(&mut self) {
        debug!("stepping loop started");

        while !self.state.cancel_requested() {
            let start = Instant::now();

            let step = {
                let mut core = self.core.lock();
                core.run_frame().map(|()| {
                    // Copy to the presentation store while the lock is
                    // held so the source frame cannot change under us.
                    self.frames.present(core.framebuffer());
                })
            };

            if let Err(e) = step {
                error!("emulation step failed: {e}");
                let _ = self.events.send(RuntimeEvent::CoreStopped {
                    error: e.to_string(),
                });
                return;
            }

            let limit = self.config.read().limit_fps;
            let elapsed = start.elapsed();
            if limit && elapsed < FRAME_PERIOD {
                thread::sleep(FRAME_PERIOD - elapsed);
            }
        }

        debug!("stepping loop stopped");
    }
}
