use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use clamshell_config::Config;
use clamshell_support::resample::{resample_block, SOURCE_BLOCK_PAIRS};

use crate::core::EmulatorCore;
use crate::platform::{AudioSinkFactory, OUTPUT_BLOCK_SAMPLES};

use super::state::SharedState;
use super::types::{RuntimeEvent, DEVICE_WAIT_SLICE};

/// The audio worker: once per device-ready notification, pulls whatever
/// the core produced, resamples it to one fixed output block, and submits
/// it.
pub(crate) struct AudioPump {
    pub(crate) factory: Arc<Mutex<AudioSinkFactory>>,
    pub(crate) core: Arc<Mutex<dyn EmulatorCore>>,
    pub(crate) config: Arc<RwLock<Config>>,
    pub(crate) state: Arc<SharedState>,
    pub(crate) events: Sender<RuntimeEvent>,
}

impl AudioPump {
    pub(crate) fn run(&mut self) {
        // The device is constructed here, on the thread that owns it.
        let built = {
            let mut factory = self.factory.lock();
            (*factory)()
        };
        let mut sink = match built {
            Ok(sink) => sink,
            Err(e) => {
                error!("audio init failed: {e}");
                let _ = self.events.send(RuntimeEvent::AudioInitFailed {
                    error: e.to_string(),
                });
                return;
            }
        };

        if let Err(e) = sink.start() {
            error!("audio start failed: {e}");
            let _ = self.events.send(RuntimeEvent::AudioInitFailed {
                error: e.to_string(),
            });
            return;
        }

        debug!("audio pump started");

        let mut source = [0_i16; SOURCE_BLOCK_PAIRS * 2];
        let mut block = [0_i16; OUTPUT_BLOCK_SAMPLES];

        while !self.state.cancel_requested() {
            match sink.wait_consumed(DEVICE_WAIT_SLICE) {
                Ok(true) => {}
                // Timed out: re-check the cancel token and wait again.
                Ok(false) => continue,
                Err(e) => {
                    error!("audio device error: {e}");
                    let _ = self.events.send(RuntimeEvent::AudioDeviceError {
                        error: e.to_string(),
                    });
                    break;
                }
            }

            let available = {
                let mut core = self.core.lock();
                core.read_audio_output(&mut source, SOURCE_BLOCK_PAIRS)
            };
            let volume = self.config.read().volume();
            resample_block(&mut source, available, volume, &mut block);

            if let Err(e) = sink.submit(&block) {
                error!("audio submit failed: {e}");
                let _ = self.events.send(RuntimeEvent::AudioDeviceError {
                    error: e.to_string(),
                });
                break;
            }
        }

        sink.stop();
        debug!("audio pump stopped");
    }
}
