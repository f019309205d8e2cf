use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use clamshell_config::{Config, MicMode};
use clamshell_support::layout::{self, ScreenGeometry};
use clamshell_support::paths::SessionPaths;

use crate::core::EmulatorCore;
use crate::platform::{
    AudioSinkFactory, ClockControl, MicSourceFactory, PlatformHost, CLOCK_RATES_HZ,
};
use crate::video::FrameStore;

use super::audio_pump::AudioPump;
use super::mic_pump::MicPump;
use super::pacer::FramePacer;
use super::state::SharedState;
use super::types::{RuntimeError, RuntimeEvent, WORKER_JOIN_TIMEOUT};

/// Everything the runtime borrows from the outside world.
pub struct Collaborators {
    pub core: Arc<Mutex<dyn EmulatorCore>>,
    pub clock: Arc<Mutex<dyn ClockControl>>,
    pub host: Box<dyn PlatformHost>,
    /// Constructs the output device on the audio worker thread.
    pub audio_factory: AudioSinkFactory,
    /// Constructs the capture device on the microphone worker thread.
    pub mic_factory: MicSourceFactory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Stopped,
    Active,
    Paused,
}

impl Lifecycle {
    fn name(self) -> &'static str {
        match self {
            Lifecycle::Stopped => "stopped",
            Lifecycle::Active => "active",
            Lifecycle::Paused => "paused",
        }
    }
}

struct Worker {
    name: &'static str,
    join: JoinHandle<()>,
    done: Receiver<()>,
}

/// The lifecycle controller.
///
/// Owns the worker threads and the platform device handles. Workers are
/// only started and stopped through `start`/`pause`; no worker is ever
/// respawned without a full join of its previous instance. Configuration
/// may only be mutated through [`Runtime::update_config`], which refuses
/// while workers are running - the join in `pause` is the synchronization
/// point that makes the mutation safe.
pub struct Runtime {
    core: Arc<Mutex<dyn EmulatorCore>>,
    clock: Arc<Mutex<dyn ClockControl>>,
    host: Box<dyn PlatformHost>,
    audio_factory: Arc<Mutex<AudioSinkFactory>>,
    mic_factory: Arc<Mutex<MicSourceFactory>>,
    config: Arc<RwLock<Config>>,
    state: Arc<SharedState>,
    frames: Arc<FrameStore>,
    events_tx: Sender<RuntimeEvent>,
    events_rx: Receiver<RuntimeEvent>,
    geometry: ScreenGeometry,
    rom_path: Option<PathBuf>,
    session: Option<SessionPaths>,
    lifecycle: Lifecycle,
    workers: Vec<Worker>,
    join_timeout: Duration,
}

impl Runtime {
    pub fn new(collab: Collaborators, config: Config) -> Self {
        let (events_tx, events_rx) = unbounded();
        let geometry = compute_geometry(&config);
        Self {
            core: collab.core,
            clock: collab.clock,
            host: collab.host,
            audio_factory: Arc::new(Mutex::new(collab.audio_factory)),
            mic_factory: Arc::new(Mutex::new(collab.mic_factory)),
            config: Arc::new(RwLock::new(config)),
            state: Arc::new(SharedState::new()),
            frames: FrameStore::new(),
            events_tx,
            events_rx,
            geometry,
            rom_path: None,
            session: None,
            lifecycle: Lifecycle::Stopped,
            workers: Vec::new(),
            join_timeout: WORKER_JOIN_TIMEOUT,
        }
    }

    /// Bound on joining workers during a pause transition.
    pub fn set_join_timeout(&mut self, timeout: Duration) {
        self.join_timeout = timeout;
    }

    /// Selects the ROM used by the next start-with-reset.
    pub fn set_rom_path(&mut self, path: impl Into<PathBuf>) {
        self.rom_path = Some(path.into());
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle == Lifecycle::Paused
    }

    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    pub fn frames(&self) -> Arc<FrameStore> {
        Arc::clone(&self.frames)
    }

    pub fn shared(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    pub fn session_paths(&self) -> Option<&SessionPaths> {
        self.session.as_ref()
    }

    pub fn config_snapshot(&self) -> Config {
        self.config.read().clone()
    }

    pub fn try_recv_event(&self) -> Option<RuntimeEvent> {
        match self.events_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Runs `f` against the core. Used by the main loop for key, touch
    /// and lid forwarding; the lock is held only for the call.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut dyn EmulatorCore) -> R) -> R {
        let mut core = self.core.lock();
        f(&mut *core)
    }

    /// The single mutation gateway. Refused while workers are running;
    /// bounded fields are re-clamped after the edit.
    pub fn update_config(&mut self, f: impl FnOnce(&mut Config)) -> Result<(), RuntimeError> {
        if self.lifecycle == Lifecycle::Active {
            return Err(RuntimeError::InvalidState {
                op: "mutate configuration",
                state: self.lifecycle.name(),
            });
        }
        let mut config = self.config.write();
        f(&mut config);
        config.sanitize();
        Ok(())
    }

    /// Starts (or resumes) the core. With `reset` set, derives the session
    /// paths from the selected ROM and reinitializes the emulation session
    /// first.
    pub fn start(&mut self, reset: bool) -> Result<(), RuntimeError> {
        if self.lifecycle == Lifecycle::Active {
            return Err(RuntimeError::InvalidState {
                op: "start",
                state: self.lifecycle.name(),
            });
        }

        self.geometry = compute_geometry(&self.config.read());

        self.host
            .acquire_focus()
            .map_err(|e| RuntimeError::Platform(e.to_string()))?;

        // Re-apply the configured boost whenever the platform changes
        // operating mode; the request is idempotent.
        let clock = Arc::clone(&self.clock);
        let level = self.config.read().clock_level();
        if let Err(e) = self.host.subscribe_mode_changes(Box::new(move || {
            if let Err(e) = clock.lock().set_clock_rate(CLOCK_RATES_HZ[level]) {
                warn!("clock re-apply on mode change failed: {e}");
            }
        })) {
            self.host.release_focus();
            return Err(RuntimeError::Platform(e.to_string()));
        }

        if reset {
            if let Err(e) = self.reset_session() {
                self.host.unsubscribe_mode_changes();
                self.host.release_focus();
                return Err(e);
            }
        }

        self.state.reset_cancel();

        let spawned = self.spawn_pacer().and_then(|()| {
            let snapshot = self.config.read().clone();
            if snapshot.volume() > 0 {
                self.spawn_audio_pump()?;
            }
            if snapshot.mic_mode() != MicMode::Off {
                self.spawn_mic_pump(snapshot.mic_mode())?;
            }
            Ok(())
        });
        if let Err(e) = spawned {
            // Roll every part of this transition back before reporting.
            self.state.request_cancel();
            self.join_workers_blocking();
            self.host.unsubscribe_mode_changes();
            self.host.release_focus();
            return Err(e);
        }

        let level = self.config.read().clock_level();
        if level > 0 {
            if let Err(e) = self.clock.lock().set_clock_rate(CLOCK_RATES_HZ[level]) {
                warn!("clock boost request failed: {e}");
            }
        }

        self.lifecycle = Lifecycle::Active;
        info!(reset, "core started");
        Ok(())
    }

    /// Resume after a pause; identical to `start(false)`.
    pub fn resume(&mut self) -> Result<(), RuntimeError> {
        self.start(false)
    }

    /// Pauses the core: cancels the workers, joins them within the bound,
    /// then releases the platform resources. Only callable from Active.
    ///
    /// On a join timeout the error names the stuck worker and the runtime
    /// stays Active; a later retry waits again.
    pub fn pause(&mut self) -> Result<(), RuntimeError> {
        if self.lifecycle != Lifecycle::Active {
            return Err(RuntimeError::InvalidState {
                op: "pause",
                state: self.lifecycle.name(),
            });
        }

        // Baseline clock first, like the platform expects.
        if let Err(e) = self.clock.lock().set_clock_rate(CLOCK_RATES_HZ[0]) {
            warn!("clock baseline request failed: {e}");
        }

        self.state.request_cancel();

        let deadline = Instant::now() + self.join_timeout;
        for worker in &self.workers {
            if worker.done.recv_deadline(deadline).is_err() && !worker.join.is_finished() {
                warn!(worker = worker.name, "worker missed the shutdown deadline");
                return Err(RuntimeError::ShutdownTimeout {
                    worker: worker.name,
                    timeout: self.join_timeout,
                });
            }
        }
        self.join_workers_blocking();

        self.host.unsubscribe_mode_changes();
        self.host.release_focus();

        self.lifecycle = Lifecycle::Paused;
        info!("core paused");
        Ok(())
    }

    /// Final shutdown; valid from any state.
    pub fn stop(&mut self) -> Result<(), RuntimeError> {
        if self.lifecycle == Lifecycle::Active {
            self.pause()?;
        }
        self.lifecycle = Lifecycle::Stopped;
        Ok(())
    }

    fn reset_session(&mut self) -> Result<(), RuntimeError> {
        let rom = self.rom_path.clone().ok_or(RuntimeError::NoRomSelected)?;
        let paths = SessionPaths::derive(&rom);
        let direct_boot = self.config.read().direct_boot;

        self.core
            .lock()
            .reset_session(&rom, &paths.save, direct_boot)
            .map_err(|e| RuntimeError::Core(e.to_string()))?;

        info!(rom = %rom.display(), "session reset");
        self.session = Some(paths);
        Ok(())
    }

    fn spawn_pacer(&mut self) -> Result<(), RuntimeError> {
        let mut pacer = FramePacer {
            core: Arc::clone(&self.core),
            frames: Arc::clone(&self.frames),
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            events: self.events_tx.clone(),
        };
        self.spawn_worker("stepper", move || pacer.run())
    }

    fn spawn_audio_pump(&mut self) -> Result<(), RuntimeError> {
        let mut pump = AudioPump {
            factory: Arc::clone(&self.audio_factory),
            core: Arc::clone(&self.core),
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            events: self.events_tx.clone(),
        };
        self.spawn_worker("audio", move || pump.run())
    }

    fn spawn_mic_pump(&mut self, mode: MicMode) -> Result<(), RuntimeError> {
        let factory = (mode == MicMode::Passthrough).then(|| Arc::clone(&self.mic_factory));
        let mut pump = MicPump {
            factory,
            core: Arc::clone(&self.core),
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            events: self.events_tx.clone(),
        };
        self.spawn_worker("mic", move || pump.run())
    }

    fn spawn_worker(
        &mut self,
        name: &'static str,
        f: impl FnOnce() + Send + 'static,
    ) -> Result<(), RuntimeError> {
        let (done_tx, done_rx) = bounded(1);
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                f();
                let _ = done_tx.send(());
            })
            .map_err(|e| RuntimeError::WorkerSpawn {
                worker: name,
                error: e.to_string(),
            })?;

        self.workers.push(Worker {
            name,
            join,
            done: done_rx,
        });
        Ok(())
    }

    fn join_workers_blocking(&mut self) {
        for worker in self.workers.drain(..) {
            let _ = worker.join.join();
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.state.request_cancel();
        self.join_workers_blocking();
    }
}

fn compute_geometry(config: &Config) -> ScreenGeometry {
    let (rotation, gap, layout, sizing) = config.layout_key();
    layout::compute(rotation, gap, layout, sizing)
}
