//! The per-tick orchestration of the main/input/render thread.

use clamshell_runtime::Runtime;
use clamshell_support::input::{Hotkeys, InputMap, InputSnapshot, InputTranslator};
use clamshell_support::touch::map_touch;

use crate::frontend::{InputSource, Renderer};

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    /// The pause hotkey fired (and has been consumed); the caller owns
    /// the pause transition and the menu that follows.
    PauseRequested,
}

/// Owns the input translation state and the render/input collaborators.
pub struct MainLoop<R: Renderer, I: InputSource> {
    pub renderer: R,
    pub input: I,
    translator: InputTranslator,
}

impl<R: Renderer, I: InputSource> MainLoop<R, I> {
    pub fn new(renderer: R, input: I, map: InputMap) -> Self {
        Self {
            renderer,
            input,
            translator: InputTranslator::new(map),
        }
    }

    /// Re-reads everything display- and input-related from the config.
    /// Called after every start/resume, when a paused-state settings edit
    /// may have changed the mapping, the filter flag, or the layout.
    pub fn sync_with_config(&mut self, runtime: &Runtime) {
        let config = runtime.config_snapshot();
        self.translator.set_map(config.input_map());
        self.renderer.set_filtering(config.screen_filter);
    }

    /// One tick: poll input, translate, forward to the core, consume
    /// one-shot hotkeys, map touch, present.
    pub fn tick(&mut self, runtime: &Runtime) -> TickFlow {
        let snapshot = self.input.poll();
        let flow = self.process_input(runtime, snapshot);
        self.present(runtime);
        flow
    }

    fn process_input(&mut self, runtime: &Runtime, snapshot: InputSnapshot) -> TickFlow {
        let shared = runtime.shared();

        let translation = self.translator.translate(snapshot.buttons);
        shared.raise_hotkeys(translation.set);
        shared.clear_hotkeys(translation.cleared);

        let geometry = runtime.geometry();
        let rotation = runtime.config_snapshot().rotation();
        let touch = snapshot
            .touch
            .and_then(|(x, y)| map_touch(x, y, &geometry.bottom, rotation));

        runtime.with_core(|core| {
            for event in &translation.keys {
                core.set_key(event.button, event.pressed);
            }
            match touch {
                Some(point) => core.touch(point.x, point.y),
                None => core.release_touch(),
            }
        });

        // One-shot hotkeys: consuming clears the bit, so holding the
        // physical button does not retrigger until the next rising edge.
        if shared.take_hotkey(Hotkeys::LID) {
            let closed = shared.toggle_lid();
            runtime.with_core(|core| core.set_lid_closed(closed));
            TickFlow::Continue
        } else if shared.take_hotkey(Hotkeys::MENU) {
            TickFlow::PauseRequested
        } else {
            TickFlow::Continue
        }
    }

    fn present(&mut self, runtime: &Runtime) {
        let geometry = runtime.geometry();
        let frames = runtime.frames();
        frames.with_front(|frame| self.renderer.draw(frame, &geometry));
    }
}
