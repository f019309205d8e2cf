use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use tracing::{debug, error};

use clamshell_config::{Config, MicMode};
use clamshell_support::input::Hotkeys;

use crate::core::{EmulatorCore, MIC_FRAME_SAMPLES};
use crate::platform::MicSourceFactory;

use super::state::SharedState;
use super::types::{RuntimeEvent, DEVICE_WAIT_SLICE};

/// The microphone worker.
///
/// The MIC hotkey is level-sensitive: while it is not held (or the mode is
/// Off) the core is fed empty frames. Passthrough blocks on the capture
/// device; SyntheticNoise generates frames unblocked.
pub(crate) struct MicPump {
    pub(crate) factory: Option<Arc<Mutex<MicSourceFactory>>>,
    pub(crate) core: Arc<Mutex<dyn EmulatorCore>>,
    pub(crate) config: Arc<RwLock<Config>>,
    pub(crate) state: Arc<SharedState>,
    pub(crate) events: Sender<RuntimeEvent>,
}

impl MicPump {
    pub(crate) fn run(&mut self) {
        // The capture device exists only for passthrough mode; it is
        // constructed on this thread, which owns it until exit.
        let built = self.factory.as_ref().map(|factory| {
            let mut factory = factory.lock();
            (*factory)()
        });
        let mut source = match built {
            Some(result) => match result.and_then(|mut s| s.start().map(|()| s)) {
                Ok(source) => Some(source),
                Err(e) => {
                    error!("mic init failed: {e}");
                    let _ = self.events.send(RuntimeEvent::MicInitFailed {
                        error: e.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        debug!("mic pump started");

        let mut frame = [0_i16; MIC_FRAME_SAMPLES];
        let mut rng = rand::rng();

        while !self.state.cancel_requested() {
            let mode = self.config.read().mic_mode();
            let held = self.state.hotkeys().contains(Hotkeys::MIC);

            if mode == MicMode::Off || !held {
                self.core.lock().mic_input_frame(None);
                continue;
            }

            match (mode, source.as_mut()) {
                (MicMode::Passthrough, Some(device)) => {
                    match device.capture(&mut frame, DEVICE_WAIT_SLICE) {
                        Ok(true) => self.core.lock().mic_input_frame(Some(&frame)),
                        Ok(false) => {}
                        Err(e) => {
                            error!("mic capture failed: {e}");
                            let _ = self.events.send(RuntimeEvent::MicDeviceError {
                                error: e.to_string(),
                            });
                            break;
                        }
                    }
                }
                // Passthrough without a device (init failed): stay silent.
                (MicMode::Passthrough, None) => self.core.lock().mic_input_frame(None),
                (MicMode::SyntheticNoise, _) => {
                    rng.fill(&mut frame[..]);
                    self.core.lock().mic_input_frame(Some(&frame));
                }
                (MicMode::Off, _) => unreachable!("handled above"),
            }
        }

        if let Some(mut device) = source {
            device.stop();
        }
        debug!("mic pump stopped");
    }
}
