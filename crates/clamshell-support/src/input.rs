//! Translation from raw physical input snapshots to logical button edges
//! and hotkey state.
//!
//! The mapping table has 15 slots: 12 emulated buttons and 3 hotkeys. A
//! slot's logical state is the OR of its mapped physical bits, so two
//! physical buttons bound to the same slot produce a single key-down and a
//! single key-up no matter how their presses interleave.

use bitflags::bitflags;

/// Physical button bits as delivered by the platform input source.
///
/// The bit positions mirror the host controller's native report: face
/// buttons, stick clicks, shoulders, plus/minus, d-pad, then the four
/// directions of each stick.
pub mod raw {
    pub const A: u32 = 1 << 0;
    pub const B: u32 = 1 << 1;
    pub const X: u32 = 1 << 2;
    pub const Y: u32 = 1 << 3;
    pub const STICK_L: u32 = 1 << 4;
    pub const STICK_R: u32 = 1 << 5;
    pub const L: u32 = 1 << 6;
    pub const R: u32 = 1 << 7;
    pub const ZL: u32 = 1 << 8;
    pub const ZR: u32 = 1 << 9;
    pub const PLUS: u32 = 1 << 10;
    pub const MINUS: u32 = 1 << 11;
    pub const DPAD_LEFT: u32 = 1 << 12;
    pub const DPAD_UP: u32 = 1 << 13;
    pub const DPAD_RIGHT: u32 = 1 << 14;
    pub const DPAD_DOWN: u32 = 1 << 15;
    pub const STICK_L_LEFT: u32 = 1 << 16;
    pub const STICK_L_UP: u32 = 1 << 17;
    pub const STICK_L_RIGHT: u32 = 1 << 18;
    pub const STICK_L_DOWN: u32 = 1 << 19;
    pub const STICK_R_LEFT: u32 = 1 << 20;
    pub const STICK_R_UP: u32 = 1 << 21;
    pub const STICK_R_RIGHT: u32 = 1 << 22;
    pub const STICK_R_DOWN: u32 = 1 << 23;
}

/// The 12 emulated pad buttons, in mapping-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
    R,
    L,
    X,
    Y,
}

impl Button {
    pub const COUNT: usize = 12;

    pub const ALL: [Button; Self::COUNT] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::R,
        Button::L,
        Button::X,
        Button::Y,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Currently-asserted hotkeys.
    ///
    /// LID and MENU are consumed one-shot: the handler that reacts to the
    /// bit clears it after acting. MIC stays level-sensitive and is read
    /// continuously by the microphone pump.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Hotkeys: u8 {
        const LID = 1 << 0;
        const MIC = 1 << 1;
        const MENU = 1 << 2;
    }
}

/// The three hotkey mapping slots, in slot order after the buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Lid,
    Mic,
    Menu,
}

impl Hotkey {
    pub const COUNT: usize = 3;

    pub const ALL: [Hotkey; Self::COUNT] = [Hotkey::Lid, Hotkey::Mic, Hotkey::Menu];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn flag(self) -> Hotkeys {
        match self {
            Hotkey::Lid => Hotkeys::LID,
            Hotkey::Mic => Hotkeys::MIC,
            Hotkey::Menu => Hotkeys::MENU,
        }
    }
}

/// Physical-bit masks for all 15 logical control slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMap {
    pub buttons: [u32; Button::COUNT],
    pub hotkeys: [u32; Hotkey::COUNT],
}

impl Default for InputMap {
    /// Platform defaults: face buttons map straight across, d-pad
    /// directions are OR'd with the left stick, shoulders land on ZL/ZR,
    /// lid/mic on the stick clicks, menu on L+R.
    fn default() -> Self {
        Self {
            buttons: [
                raw::A,
                raw::B,
                raw::MINUS,
                raw::PLUS,
                raw::DPAD_RIGHT | raw::STICK_L_RIGHT,
                raw::DPAD_LEFT | raw::STICK_L_LEFT,
                raw::DPAD_UP | raw::STICK_L_UP,
                raw::DPAD_DOWN | raw::STICK_L_DOWN,
                raw::ZR,
                raw::ZL,
                raw::X,
                raw::Y,
            ],
            hotkeys: [raw::STICK_R, raw::STICK_L, raw::L | raw::R],
        }
    }
}

impl InputMap {
    pub fn button_mask(&self, button: Button) -> u32 {
        self.buttons[button.index()]
    }

    pub fn hotkey_mask(&self, hotkey: Hotkey) -> u32 {
        self.hotkeys[hotkey.index()]
    }
}

/// A raw per-tick input snapshot from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// OR of all currently-held physical button bits.
    pub buttons: u32,
    /// Touch point in canvas coordinates, if the surface is touched.
    pub touch: Option<(f32, f32)>,
}

/// A logical button edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub button: Button,
    pub pressed: bool,
}

/// Result of translating one snapshot against the previous one.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub keys: Vec<KeyEvent>,
    /// Hotkey bits that rose this tick.
    pub set: Hotkeys,
    /// Hotkey bits that fell this tick.
    pub cleared: Hotkeys,
}

/// Stateful edge detector over raw snapshots.
pub struct InputTranslator {
    map: InputMap,
    prev: u32,
}

impl InputTranslator {
    pub fn new(map: InputMap) -> Self {
        Self { map, prev: 0 }
    }

    /// Replaces the mapping table (only safe while the core is paused).
    pub fn set_map(&mut self, map: InputMap) {
        self.map = map;
    }

    pub fn map(&self) -> &InputMap {
        &self.map
    }

    /// Translates the current raw button state into logical edges.
    pub fn translate(&mut self, buttons: u32) -> Translation {
        let prev = self.prev;
        self.prev = buttons;

        let mut out = Translation::default();

        for button in Button::ALL {
            let mask = self.map.button_mask(button);
            let was = prev & mask != 0;
            let is = buttons & mask != 0;
            if is != was {
                out.keys.push(KeyEvent {
                    button,
                    pressed: is,
                });
            }
        }

        for hotkey in Hotkey::ALL {
            let mask = self.map.hotkey_mask(hotkey);
            let was = prev & mask != 0;
            let is = buttons & mask != 0;
            if is && !was {
                out.set |= hotkey.flag();
            } else if was && !is {
                out.cleared |= hotkey.flag();
            }
        }

        out
    }
}
