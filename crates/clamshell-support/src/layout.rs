//! Screen geometry for the two emulated displays.
//!
//! The renderer works in a fixed 1280x720 logical canvas; each emulated
//! screen is natively 256x192. Geometry is a pure function of the four
//! layout-affecting config fields and is recomputed only when one of them
//! changes.

/// Logical canvas the renderer composes into.
pub const CANVAS_WIDTH: f32 = 1280.0;
pub const CANVAS_HEIGHT: f32 = 720.0;

/// Native resolution of a single emulated screen.
pub const NATIVE_WIDTH: f32 = 256.0;
pub const NATIVE_HEIGHT: f32 = 192.0;

/// Emphasized screens in horizontal layouts never grow wider than this.
const EMPHASIZED_MAX_WIDTH: f32 = 960.0;

const GAP_PIXELS: [f32; 6] = [0.0, 1.0, 8.0, 64.0, 90.0, 128.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl ScreenRotation {
    pub const COUNT: usize = 4;

    /// Builds from a persisted index, clamping out-of-range values.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// True for 90/270 degrees, where the screens render portrait.
    pub fn is_sideways(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Index into the fixed mid-screen gap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenGap(u8);

impl ScreenGap {
    pub const COUNT: usize = GAP_PIXELS.len();

    pub fn from_index(index: i64) -> Self {
        let clamped = index.clamp(0, Self::COUNT as i64 - 1) as u8;
        Self(clamped)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn pixels(self) -> f32 {
        GAP_PIXELS[self.0 as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenLayout {
    /// Resolves to Vertical or Horizontal based on rotation parity.
    #[default]
    Natural,
    Vertical,
    Horizontal,
}

impl ScreenLayout {
    pub const COUNT: usize = 3;

    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::Vertical,
            2 => Self::Horizontal,
            _ => Self::Natural,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Natural => 0,
            Self::Vertical => 1,
            Self::Horizontal => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenSizing {
    #[default]
    Even,
    EmphasizeTop,
    EmphasizeBottom,
}

impl ScreenSizing {
    pub const COUNT: usize = 3;

    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::EmphasizeTop,
            2 => Self::EmphasizeBottom,
            _ => Self::Even,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Even => 0,
            Self::EmphasizeTop => 1,
            Self::EmphasizeBottom => 2,
        }
    }
}

/// One screen's placement in the logical canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Boundary-inclusive containment test.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Placement of both screens, already adjusted for rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenGeometry {
    pub top: ScreenRect,
    pub bottom: ScreenRect,
}

/// Computes the placement of both screens.
///
/// Total over all inputs. The Natural layout resolves to Vertical for
/// 0/180 degrees and Horizontal for 90/270 without touching the config.
/// For 90 and 180 degrees the two rectangles are swapped wholesale as the
/// final step; that swap decides which physical surface shows which
/// emulated screen and is independent of the sizing arithmetic.
pub fn compute(
    rotation: ScreenRotation,
    gap: ScreenGap,
    layout: ScreenLayout,
    sizing: ScreenSizing,
) -> ScreenGeometry {
    let gap = gap.pixels();
    let sideways = rotation.is_sideways();

    let layout = match layout {
        ScreenLayout::Natural if sideways => ScreenLayout::Horizontal,
        ScreenLayout::Natural => ScreenLayout::Vertical,
        other => other,
    };

    let mut top = ScreenRect::default();
    let mut bot = ScreenRect::default();

    if layout == ScreenLayout::Vertical {
        match sizing {
            ScreenSizing::Even => {
                top.height = 360.0 - gap / 2.0;
                bot.height = top.height;
                let width = if sideways {
                    top.height * 3.0 / 4.0
                } else {
                    top.height * 4.0 / 3.0
                };
                top.width = width;
                bot.width = width;
            }
            ScreenSizing::EmphasizeTop => {
                if sideways {
                    bot.width = NATIVE_HEIGHT;
                    bot.height = NATIVE_WIDTH;
                    top.height = CANVAS_HEIGHT - bot.height - gap;
                    top.width = top.height * 3.0 / 4.0;
                } else {
                    bot.width = NATIVE_WIDTH;
                    bot.height = NATIVE_HEIGHT;
                    top.height = CANVAS_HEIGHT - bot.height - gap;
                    top.width = top.height * 4.0 / 3.0;
                }
            }
            ScreenSizing::EmphasizeBottom => {
                if sideways {
                    top.width = NATIVE_HEIGHT;
                    top.height = NATIVE_WIDTH;
                    bot.height = CANVAS_HEIGHT - top.height - gap;
                    bot.width = bot.height * 3.0 / 4.0;
                } else {
                    top.width = NATIVE_WIDTH;
                    top.height = NATIVE_HEIGHT;
                    bot.height = CANVAS_HEIGHT - top.height - gap;
                    bot.width = bot.height * 4.0 / 3.0;
                }
            }
        }

        top.x = CANVAS_WIDTH / 2.0 - top.width / 2.0;
        bot.x = CANVAS_WIDTH / 2.0 - bot.width / 2.0;
        top.y = 0.0;
        bot.y = CANVAS_HEIGHT - bot.height;
    } else {
        // Horizontal: start from the Even placement, then let the
        // emphasize modes override it.
        if sideways {
            top.height = CANVAS_HEIGHT;
            bot.height = CANVAS_HEIGHT;
            top.width = top.height * 3.0 / 4.0;
            bot.width = top.width;
            top.x = CANVAS_WIDTH / 2.0 - top.width - gap / 2.0;
            bot.x = CANVAS_WIDTH / 2.0 + gap / 2.0;
        } else {
            top.width = CANVAS_WIDTH / 2.0 - gap / 2.0;
            bot.width = top.width;
            top.height = top.width * 3.0 / 4.0;
            bot.height = top.height;
            top.x = 0.0;
            bot.x = CANVAS_WIDTH - top.width;
        }
        top.y = CANVAS_HEIGHT / 2.0 - top.height / 2.0;
        bot.y = top.y;

        match sizing {
            ScreenSizing::Even => {}
            ScreenSizing::EmphasizeTop => {
                if sideways {
                    let shift = (top.width - NATIVE_HEIGHT) / 2.0;
                    bot.width = NATIVE_HEIGHT;
                    bot.height = NATIVE_WIDTH;
                    top.x += shift;
                    bot.x += shift;
                    bot.y = CANVAS_HEIGHT - bot.height;
                } else {
                    bot.width = NATIVE_WIDTH;
                    bot.height = NATIVE_HEIGHT;
                    top.width =
                        (CANVAS_WIDTH - bot.width - gap).min(EMPHASIZED_MAX_WIDTH);
                    top.height = top.width * 3.0 / 4.0;
                    top.x = CANVAS_WIDTH / 2.0 - (bot.width + top.width + gap) / 2.0;
                    bot.x = top.x + top.width + gap;
                    top.y = CANVAS_HEIGHT / 2.0 - top.height / 2.0;
                    bot.y = top.y + top.height - bot.height;
                }
            }
            ScreenSizing::EmphasizeBottom => {
                if sideways {
                    let shift = (bot.width - NATIVE_HEIGHT) / 2.0;
                    top.width = NATIVE_HEIGHT;
                    top.height = NATIVE_WIDTH;
                    top.x += shift;
                    bot.x -= shift;
                    top.y = CANVAS_HEIGHT - top.height;
                } else {
                    top.width = NATIVE_WIDTH;
                    top.height = NATIVE_HEIGHT;
                    bot.width =
                        (CANVAS_WIDTH - top.width - gap).min(EMPHASIZED_MAX_WIDTH);
                    bot.height = bot.width * 3.0 / 4.0;
                    top.x = CANVAS_WIDTH / 2.0 - (bot.width + top.width + gap) / 2.0;
                    bot.x = top.x + top.width + gap;
                    bot.y = CANVAS_HEIGHT / 2.0 - bot.height / 2.0;
                    top.y = bot.y + bot.height - top.height;
                }
            }
        }
    }

    // The 90/180 degree orientations present the emulated top screen on
    // the other physical surface; swap wholesale, after everything else.
    if matches!(rotation, ScreenRotation::Deg90 | ScreenRotation::Deg180) {
        std::mem::swap(&mut top, &mut bot);
    }

    ScreenGeometry { top, bottom: bot }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_resolves_by_rotation_parity() {
        let even = compute(
            ScreenRotation::Deg0,
            ScreenGap::default(),
            ScreenLayout::Natural,
            ScreenSizing::Even,
        );
        let vertical = compute(
            ScreenRotation::Deg0,
            ScreenGap::default(),
            ScreenLayout::Vertical,
            ScreenSizing::Even,
        );
        assert_eq!(even, vertical);

        let odd = compute(
            ScreenRotation::Deg270,
            ScreenGap::default(),
            ScreenLayout::Natural,
            ScreenSizing::Even,
        );
        let horizontal = compute(
            ScreenRotation::Deg270,
            ScreenGap::default(),
            ScreenLayout::Horizontal,
            ScreenSizing::Even,
        );
        assert_eq!(odd, horizontal);
    }

    #[test]
    fn vertical_even_gap8_reference_case() {
        // gap index 2 -> 8 pixels
        let geom = compute(
            ScreenRotation::Deg0,
            ScreenGap::from_index(2),
            ScreenLayout::Natural,
            ScreenSizing::Even,
        );

        assert_eq!(geom.top.height, 356.0);
        assert_eq!(geom.bottom.height, 356.0);
        assert!((geom.top.width - 356.0 * 4.0 / 3.0).abs() < 1e-3);
        assert!((geom.top.x - (640.0 - geom.top.width / 2.0)).abs() < 1e-3);
        assert_eq!(geom.top.x, geom.bottom.x);
        assert_eq!(geom.top.y, 0.0);
        assert_eq!(geom.bottom.y, 364.0);
    }

    #[test]
    fn emphasized_width_is_capped_for_even_rotation() {
        let geom = compute(
            ScreenRotation::Deg0,
            ScreenGap::from_index(0),
            ScreenLayout::Horizontal,
            ScreenSizing::EmphasizeTop,
        );
        assert_eq!(geom.top.width, 960.0);
        assert_eq!(geom.bottom.width, NATIVE_WIDTH);
        assert_eq!(geom.bottom.height, NATIVE_HEIGHT);
        // Adjacent and jointly centered.
        assert!((geom.bottom.x - geom.top.right()).abs() < 1e-3);
        let span = geom.bottom.right() - geom.top.x;
        assert!((geom.top.x - (CANVAS_WIDTH - span) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn rotation_swap_is_wholesale() {
        for layout in [ScreenLayout::Natural, ScreenLayout::Vertical, ScreenLayout::Horizontal] {
            for sizing in [
                ScreenSizing::Even,
                ScreenSizing::EmphasizeTop,
                ScreenSizing::EmphasizeBottom,
            ] {
                let gap = ScreenGap::from_index(3);

                let rot0 = compute(ScreenRotation::Deg0, gap, layout, sizing);
                let rot180 = compute(ScreenRotation::Deg180, gap, layout, sizing);
                assert_eq!(rot180.top, rot0.bottom);
                assert_eq!(rot180.bottom, rot0.top);

                let rot90 = compute(ScreenRotation::Deg90, gap, layout, sizing);
                let rot270 = compute(ScreenRotation::Deg270, gap, layout, sizing);
                assert_eq!(rot90.top, rot270.bottom);
                assert_eq!(rot90.bottom, rot270.top);
            }
        }
    }

    #[test]
    fn out_of_range_indices_clamp() {
        assert_eq!(ScreenRotation::from_index(17), ScreenRotation::Deg0);
        assert_eq!(ScreenGap::from_index(99).index(), 5);
        assert_eq!(ScreenGap::from_index(-3).index(), 0);
        assert_eq!(ScreenLayout::from_index(-1), ScreenLayout::Natural);
        assert_eq!(ScreenSizing::from_index(7), ScreenSizing::Even);
    }
}
