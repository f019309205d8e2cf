//! Collaborator traits implemented by the embedding front-end.

use clamshell_runtime::FRAME_PIXELS;
use clamshell_support::input::InputSnapshot;
use clamshell_support::layout::ScreenGeometry;

/// Consumes the presented frame and the current screen placement once per
/// main-loop tick.
pub trait Renderer {
    /// Texture filtering preference, forwarded whenever the display
    /// config is (re)applied.
    fn set_filtering(&mut self, enabled: bool);

    fn draw(&mut self, frame: &[u32; FRAME_PIXELS], geometry: &ScreenGeometry);
}

/// Produces one raw input snapshot per tick.
pub trait InputSource {
    fn poll(&mut self) -> InputSnapshot;
}
