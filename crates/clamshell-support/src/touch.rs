//! Canvas-space touch points mapped into the bottom screen's native
//! 256x192 coordinate space.

use crate::layout::{ScreenRect, ScreenRotation, NATIVE_HEIGHT, NATIVE_WIDTH};

/// A touch position in native bottom-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeTouch {
    pub x: u16,
    pub y: u16,
}

/// Maps a canvas-space point into the bottom screen.
///
/// Returns `None` when the point is outside the rectangle, which callers
/// treat as "touch released". One affine transform per rotation value:
/// direct scale at 0, axis swap with a reflection at 90/270, both axes
/// reflected at 180. Boundary points are inclusive and clamp to the last
/// native pixel.
pub fn map_touch(px: f32, py: f32, bottom: &ScreenRect, rotation: ScreenRotation) -> Option<NativeTouch> {
    if !bottom.contains(px, py) {
        return None;
    }

    let dx = px - bottom.x;
    let dy = py - bottom.y;
    let w = bottom.width;

    let (x, y) = match rotation {
        ScreenRotation::Deg0 => (dx * NATIVE_WIDTH / w, dy * NATIVE_WIDTH / w),
        ScreenRotation::Deg90 => (
            dy * NATIVE_HEIGHT / w,
            NATIVE_HEIGHT - dx * NATIVE_HEIGHT / w,
        ),
        ScreenRotation::Deg180 => (
            NATIVE_WIDTH - dx * NATIVE_WIDTH / w,
            NATIVE_HEIGHT - dy * NATIVE_WIDTH / w,
        ),
        ScreenRotation::Deg270 => (
            NATIVE_WIDTH - dy * NATIVE_HEIGHT / w,
            dx * NATIVE_HEIGHT / w,
        ),
    };

    Some(NativeTouch {
        x: x.clamp(0.0, NATIVE_WIDTH - 1.0) as u16,
        y: y.clamp(0.0, NATIVE_HEIGHT - 1.0) as u16,
    })
}
