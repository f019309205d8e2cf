use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use clamshell_config::Config;
use clamshell_runtime::{
    AudioSink, AudioSinkFactory, ClockControl, Collaborators, CoreError, EmulatorCore, MicSource,
    MicSourceFactory, PlatformError, PlatformHost, Runtime, FRAME_PIXELS, MIC_FRAME_SAMPLES,
    OUTPUT_BLOCK_SAMPLES,
};
use clamshell_shell::{MainLoop, PauseAction, PauseFlow, Session, TickFlow};
use clamshell_support::input::{raw, Button, InputSnapshot};
use clamshell_support::layout::ScreenGeometry;

#[derive(Default)]
struct CoreLog {
    keys: Mutex<Vec<(Button, bool)>>,
    touches: Mutex<Vec<Option<(u16, u16)>>>,
    lid: Mutex<Vec<bool>>,
    saves: Mutex<Vec<PathBuf>>,
    loads: Mutex<Vec<PathBuf>>,
    relocations: Mutex<Vec<(PathBuf, bool)>>,
    sessions_stopped: AtomicU64,
    fail_savestates: std::sync::atomic::AtomicBool,
}

struct FakeCore {
    log: Arc<CoreLog>,
    framebuffer: Box<[u32; FRAME_PIXELS]>,
}

impl EmulatorCore for FakeCore {
    fn run_frame(&mut self) -> Result<(), CoreError> {
        Ok(())
    }

    fn framebuffer(&self) -> &[u32; FRAME_PIXELS] {
        &self.framebuffer
    }

    fn read_audio_output(&mut self, _dst: &mut [i16], _max_pairs: usize) -> usize {
        0
    }

    fn mic_input_frame(&mut self, _samples: Option<&[i16]>) {}

    fn set_key(&mut self, button: Button, pressed: bool) {
        self.log.keys.lock().push((button, pressed));
    }

    fn touch(&mut self, x: u16, y: u16) {
        self.log.touches.lock().push(Some((x, y)));
    }

    fn release_touch(&mut self) {
        self.log.touches.lock().push(None);
    }

    fn set_lid_closed(&mut self, closed: bool) {
        self.log.lid.lock().push(closed);
    }

    fn reset_session(
        &mut self,
        _rom: &Path,
        _save: &Path,
        _direct_boot: bool,
    ) -> Result<(), CoreError> {
        Ok(())
    }

    fn stop_session(&mut self) {
        self.log.sessions_stopped.fetch_add(1, Ordering::AcqRel);
    }

    fn save_state(&mut self, path: &Path) -> Result<(), CoreError> {
        if self.log.fail_savestates.load(Ordering::Acquire) {
            return Err(CoreError("disk full".to_string()));
        }
        self.log.saves.lock().push(path.to_path_buf());
        Ok(())
    }

    fn load_state(&mut self, path: &Path) -> Result<(), CoreError> {
        if self.log.fail_savestates.load(Ordering::Acquire) {
            return Err(CoreError("corrupt state".to_string()));
        }
        self.log.loads.lock().push(path.to_path_buf());
        Ok(())
    }

    fn relocate_save(&mut self, path: &Path, saving: bool) -> Result<(), CoreError> {
        self.log.relocations.lock().push((path.to_path_buf(), saving));
        Ok(())
    }
}

struct NullClock;

impl ClockControl for NullClock {
    fn set_clock_rate(&mut self, _hz: u32) -> Result<(), PlatformError> {
        Ok(())
    }
}

struct NullHost;

impl PlatformHost for NullHost {
    fn acquire_focus(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
    fn release_focus(&mut self) {}
    fn subscribe_mode_changes(
        &mut self,
        _callback: clamshell_runtime::platform::ModeChangeCallback,
    ) -> Result<(), PlatformError> {
        Ok(())
    }
    fn unsubscribe_mode_changes(&mut self) {}
}

struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn start(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
    fn wait_consumed(&mut self, timeout: Duration) -> Result<bool, PlatformError> {
        std::thread::sleep(timeout.min(Duration::from_millis(5)));
        Ok(false)
    }
    fn submit(&mut self, _block: &[i16; OUTPUT_BLOCK_SAMPLES]) -> Result<(), PlatformError> {
        Ok(())
    }
    fn stop(&mut self) {}
}

struct NullMicSource;

impl MicSource for NullMicSource {
    fn start(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
    fn capture(
        &mut self,
        _frame: &mut [i16; MIC_FRAME_SAMPLES],
        timeout: Duration,
    ) -> Result<bool, PlatformError> {
        std::thread::sleep(timeout.min(Duration::from_millis(5)));
        Ok(false)
    }
    fn stop(&mut self) {}
}

#[derive(Default)]
struct RecordingRenderer {
    draws: u64,
    filtering: Option<bool>,
    last_geometry: Option<ScreenGeometry>,
}

impl clamshell_shell::Renderer for &mut RecordingRenderer {
    fn set_filtering(&mut self, enabled: bool) {
        self.filtering = Some(enabled);
    }

    fn draw(&mut self, _frame: &[u32; FRAME_PIXELS], geometry: &ScreenGeometry) {
        self.draws += 1;
        self.last_geometry = Some(*geometry);
    }
}

/// Scripted input: yields queued snapshots, then repeats the last one.
struct ScriptedInput {
    script: Vec<InputSnapshot>,
    position: usize,
}

impl ScriptedInput {
    fn new(script: Vec<InputSnapshot>) -> Self {
        Self {
            script,
            position: 0,
        }
    }
}

impl clamshell_shell::InputSource for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        let snapshot = self
            .script
            .get(self.position)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or_default();
        self.position += 1;
        snapshot
    }
}

fn buttons(mask: u32) -> InputSnapshot {
    InputSnapshot {
        buttons: mask,
        touch: None,
    }
}

fn make_session(config: Config, log: Arc<CoreLog>) -> Session {
    let core = FakeCore {
        log,
        framebuffer: Box::new([0; FRAME_PIXELS]),
    };
    let audio_factory: AudioSinkFactory =
        Box::new(|| Ok(Box::new(NullAudioSink) as Box<dyn AudioSink>));
    let mic_factory: MicSourceFactory =
        Box::new(|| Ok(Box::new(NullMicSource) as Box<dyn MicSource>));

    let collab = Collaborators {
        core: Arc::new(Mutex::new(core)),
        clock: Arc::new(Mutex::new(NullClock)),
        host: Box::new(NullHost),
        audio_factory,
        mic_factory,
    };

    static NEXT_CONFIG: AtomicU64 = AtomicU64::new(0);
    let config_path = std::env::temp_dir().join("clamshell_shell_tests").join(format!(
        "config-{}-{}.toml",
        std::process::id(),
        NEXT_CONFIG.fetch_add(1, Ordering::AcqRel)
    ));
    std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();

    Session::new(Runtime::new(collab, config), config_path)
}

fn started_session(config: Config, log: Arc<CoreLog>) -> Session {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut session = make_session(config, log);
    session.begin(PathBuf::from("/roms/demo.nds")).unwrap();
    session
}

#[test]
fn menu_hotkey_requests_pause_exactly_once() {
    let log = Arc::new(CoreLog::default());
    let mut session = started_session(Config::default(), Arc::clone(&log));

    let mut renderer = RecordingRenderer::default();
    let input = ScriptedInput::new(vec![
        buttons(raw::L | raw::R),
        buttons(raw::L | raw::R),
        buttons(0),
    ]);
    let mut main_loop = MainLoop::new(&mut renderer, input, Default::default());

    assert_eq!(main_loop.tick(session.runtime()), TickFlow::PauseRequested);
    // Still held: the bit was consumed, no retrigger until a new edge.
    assert_eq!(main_loop.tick(session.runtime()), TickFlow::Continue);
    assert_eq!(main_loop.tick(session.runtime()), TickFlow::Continue);

    session.request_pause().unwrap();
    assert!(session.runtime().is_paused());
}

#[test]
fn lid_hotkey_toggles_and_clears() {
    let log = Arc::new(CoreLog::default());
    let mut session = started_session(Config::default(), Arc::clone(&log));

    let mut renderer = RecordingRenderer::default();
    // Press, hold, release, press again.
    let input = ScriptedInput::new(vec![
        buttons(raw::STICK_R),
        buttons(raw::STICK_R),
        buttons(0),
        buttons(raw::STICK_R),
    ]);
    let mut main_loop = MainLoop::new(&mut renderer, input, Default::default());

    for _ in 0..4 {
        assert_eq!(main_loop.tick(session.runtime()), TickFlow::Continue);
    }

    // Two one-shot toggles: closed, then open again.
    assert_eq!(*log.lid.lock(), vec![true, false]);

    session.request_pause().unwrap();
}

#[test]
fn button_edges_reach_the_core() {
    let log = Arc::new(CoreLog::default());
    let mut session = started_session(Config::default(), Arc::clone(&log));

    let mut renderer = RecordingRenderer::default();
    let input = ScriptedInput::new(vec![buttons(raw::A), buttons(raw::A), buttons(0)]);
    let mut main_loop = MainLoop::new(&mut renderer, input, Default::default());

    for _ in 0..3 {
        main_loop.tick(session.runtime());
    }

    assert_eq!(
        *log.keys.lock(),
        vec![(Button::A, true), (Button::A, false)]
    );

    session.request_pause().unwrap();
}

#[test]
fn touch_maps_into_the_bottom_screen_and_releases_outside() {
    let log = Arc::new(CoreLog::default());
    let mut session = started_session(Config::default(), Arc::clone(&log));

    let geometry = session.runtime().geometry();
    let inside = (
        geometry.bottom.x + geometry.bottom.width / 2.0,
        geometry.bottom.y + geometry.bottom.height / 2.0,
    );

    let mut renderer = RecordingRenderer::default();
    let input = ScriptedInput::new(vec![
        InputSnapshot {
            buttons: 0,
            touch: Some(inside),
        },
        InputSnapshot {
            buttons: 0,
            // Top-left canvas corner is never on the bottom screen in the
            // default layout.
            touch: Some((0.0, 0.0)),
        },
        InputSnapshot {
            buttons: 0,
            touch: None,
        },
    ]);
    let mut main_loop = MainLoop::new(&mut renderer, input, Default::default());

    for _ in 0..3 {
        main_loop.tick(session.runtime());
    }

    let touches = log.touches.lock().clone();
    assert_eq!(touches.len(), 3);
    let centre = touches[0].expect("inside point should map");
    assert!((i32::from(centre.0) - 128).abs() <= 1);
    assert!((i32::from(centre.1) - 96).abs() <= 1);
    assert_eq!(touches[1], None);
    assert_eq!(touches[2], None);

    session.request_pause().unwrap();
}

#[test]
fn savestates_use_the_session_paths_and_relocate_when_configured() {
    let log = Arc::new(CoreLog::default());
    let mut config = Config::default();
    config.savestate_reloc_sram = true;
    let mut session = started_session(config, Arc::clone(&log));

    session.request_pause().unwrap();
    let flow = session.handle_pause_action(PauseAction::SaveState).unwrap();
    assert_eq!(flow, PauseFlow::Resumed);
    assert!(session.runtime().is_active());

    assert_eq!(*log.saves.lock(), vec![PathBuf::from("/roms/demo.mln")]);
    assert_eq!(
        *log.relocations.lock(),
        vec![(PathBuf::from("/roms/demo.mln.sav"), true)]
    );

    session.request_pause().unwrap();
    session.handle_pause_action(PauseAction::LoadState).unwrap();
    assert_eq!(*log.loads.lock(), vec![PathBuf::from("/roms/demo.mln")]);

    session.request_pause().unwrap();
}

#[test]
fn a_failed_savestate_is_skipped_and_the_session_still_resumes() {
    let log = Arc::new(CoreLog::default());
    let mut session = started_session(Config::default(), Arc::clone(&log));
    log.fail_savestates.store(true, Ordering::Release);

    session.request_pause().unwrap();
    let flow = session.handle_pause_action(PauseAction::SaveState).unwrap();
    assert_eq!(flow, PauseFlow::Resumed);
    assert!(session.runtime().is_active());
    assert!(log.saves.lock().is_empty());
    assert!(log.relocations.lock().is_empty());

    session.request_pause().unwrap();
}

#[test]
fn open_browser_tears_the_session_down() {
    let log = Arc::new(CoreLog::default());
    let mut session = started_session(Config::default(), Arc::clone(&log));

    session.request_pause().unwrap();
    let flow = session
        .handle_pause_action(PauseAction::OpenBrowser)
        .unwrap();
    assert_eq!(flow, PauseFlow::ToBrowser);
    assert_eq!(log.sessions_stopped.load(Ordering::Acquire), 1);
    assert!(session.runtime().is_paused());

    // Picking a new ROM starts a fresh session with reset.
    session.begin(PathBuf::from("/roms/other.nds")).unwrap();
    assert!(session.runtime().is_active());
    assert_eq!(
        session.runtime().session_paths().unwrap().state,
        PathBuf::from("/roms/other.mln")
    );

    session.request_pause().unwrap();
}

#[test]
fn settings_gateway_persists_and_the_loop_resyncs() -> anyhow::Result<()> {
    let log = Arc::new(CoreLog::default());
    let mut session = started_session(Config::default(), Arc::clone(&log));

    let mut renderer = RecordingRenderer::default();
    let input = ScriptedInput::new(vec![buttons(0)]);
    let mut main_loop = MainLoop::new(&mut renderer, input, Default::default());
    main_loop.tick(session.runtime());

    session.request_pause()?;
    session.update_settings(|c| {
        c.screen_filter = false;
        c.screen_rotation = 2;
    })?;
    session.handle_pause_action(PauseAction::Resume)?;
    main_loop.sync_with_config(session.runtime());

    // The rotation change swapped the screens; geometry was recomputed on
    // resume and the renderer saw the new filter flag.
    main_loop.tick(session.runtime());
    drop(main_loop);
    assert_eq!(renderer.draws, 2);
    assert_eq!(renderer.filtering, Some(false));
    let geometry = renderer.last_geometry.expect("a frame was drawn");
    assert_eq!(geometry.top.y, 720.0 - geometry.top.height);
    assert_eq!(geometry.bottom.y, 0.0);

    session.request_pause()?;
    Ok(())
}
