//! Persisted front-end configuration.
//!
//! The on-disk format is a flat TOML table using the historical key names.
//! Every bounded field is clamped on load: persisted integers are never
//! trusted as array indices. Mutation is only safe while the core is
//! paused; the runtime enforces that through its config gateway.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use clamshell_support::input::{raw, InputMap};
use clamshell_support::layout::{ScreenGap, ScreenLayout, ScreenRotation, ScreenSizing};
use clamshell_support::resample::VOLUME_MAX;

/// Number of selectable clock-boost levels; level 0 is the baseline rate.
pub const CLOCK_BOOST_LEVELS: i64 = 4;

/// Longest persisted ROM-folder path, in bytes.
pub const MAX_ROM_FOLDER_LEN: usize = 511;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Microphone input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicMode {
    Off,
    #[default]
    Passthrough,
    SyntheticNoise,
}

impl MicMode {
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => Self::Off,
            2 => Self::SyntheticNoise,
            _ => Self::Passthrough,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Passthrough => 1,
            Self::SyntheticNoise => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "Joy_A")]
    pub joy_a: u32,
    #[serde(rename = "Joy_B")]
    pub joy_b: u32,
    #[serde(rename = "Joy_Select")]
    pub joy_select: u32,
    #[serde(rename = "Joy_Start")]
    pub joy_start: u32,
    #[serde(rename = "Joy_Right")]
    pub joy_right: u32,
    #[serde(rename = "Joy_Left")]
    pub joy_left: u32,
    #[serde(rename = "Joy_Up")]
    pub joy_up: u32,
    #[serde(rename = "Joy_Down")]
    pub joy_down: u32,
    #[serde(rename = "Joy_R")]
    pub joy_r: u32,
    #[serde(rename = "Joy_L")]
    pub joy_l: u32,
    #[serde(rename = "Joy_X")]
    pub joy_x: u32,
    #[serde(rename = "Joy_Y")]
    pub joy_y: u32,
    #[serde(rename = "Joy_Lid")]
    pub joy_lid: u32,
    #[serde(rename = "Joy_Mic")]
    pub joy_mic: u32,
    #[serde(rename = "Joy_Menu")]
    pub joy_menu: u32,

    #[serde(rename = "ScreenRotation")]
    pub screen_rotation: i64,
    #[serde(rename = "ScreenGap")]
    pub screen_gap: i64,
    #[serde(rename = "ScreenLayout")]
    pub screen_layout: i64,
    #[serde(rename = "ScreenSizing")]
    pub screen_sizing: i64,
    #[serde(rename = "ScreenFilter")]
    pub screen_filter: bool,

    #[serde(rename = "LimitFPS")]
    pub limit_fps: bool,

    #[serde(rename = "DirectBoot")]
    pub direct_boot: bool,

    #[serde(rename = "SavStaRelocSRAM")]
    pub savestate_reloc_sram: bool,

    #[serde(rename = "AudioVolume")]
    pub audio_volume: i64,
    #[serde(rename = "MicInputType")]
    pub mic_input_type: i64,

    #[serde(rename = "LastROMFolder")]
    pub last_rom_folder: String,

    #[serde(rename = "ClockBoostLevel")]
    pub clock_boost_level: i64,
}

impl Default for Config {
    fn default() -> Self {
        let map = InputMap::default();
        Self {
            joy_a: map.buttons[0],
            joy_b: map.buttons[1],
            joy_select: map.buttons[2],
            joy_start: map.buttons[3],
            joy_right: map.buttons[4],
            joy_left: map.buttons[5],
            joy_up: map.buttons[6],
            joy_down: map.buttons[7],
            joy_r: map.buttons[8],
            joy_l: map.buttons[9],
            joy_x: map.buttons[10],
            joy_y: map.buttons[11],
            joy_lid: raw::STICK_R,
            joy_mic: raw::STICK_L,
            joy_menu: raw::L | raw::R,
            screen_rotation: 0,
            screen_gap: 0,
            screen_layout: 0,
            screen_sizing: 0,
            screen_filter: true,
            limit_fps: true,
            direct_boot: true,
            savestate_reloc_sram: false,
            audio_volume: i64::from(VOLUME_MAX),
            mic_input_type: 1,
            last_rom_folder: "/".to_string(),
            clock_boost_level: 0,
        }
    }
}

/// Result of loading: the config plus whether anything had to be clamped
/// (in which case the caller should rewrite the file).
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub config: Config,
    pub sanitized: bool,
}

impl Config {
    /// Loads the config at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<LoadOutcome, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadOutcome {
                    config: Self::default(),
                    sanitized: false,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut config: Config = toml::from_str(&text)?;
        let sanitized = config.sanitize();
        if sanitized {
            warn!(path = %path.display(), "config contained out-of-range values, clamped");
        }
        Ok(LoadOutcome { config, sanitized })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Clamps every bounded field into its table's range. Returns whether
    /// anything changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();

        self.screen_rotation = self.screen_rotation.clamp(0, ScreenRotation::COUNT as i64 - 1);
        self.screen_gap = self.screen_gap.clamp(0, ScreenGap::COUNT as i64 - 1);
        self.screen_layout = self.screen_layout.clamp(0, ScreenLayout::COUNT as i64 - 1);
        self.screen_sizing = self.screen_sizing.clamp(0, ScreenSizing::COUNT as i64 - 1);
        self.audio_volume = self.audio_volume.clamp(0, i64::from(VOLUME_MAX));
        self.mic_input_type = self.mic_input_type.clamp(0, 2);
        self.clock_boost_level = self.clock_boost_level.clamp(0, CLOCK_BOOST_LEVELS - 1);
        if self.last_rom_folder.len() > MAX_ROM_FOLDER_LEN {
            let mut end = MAX_ROM_FOLDER_LEN;
            while !self.last_rom_folder.is_char_boundary(end) {
                end -= 1;
            }
            self.last_rom_folder.truncate(end);
        }

        *self != before
    }

    pub fn rotation(&self) -> ScreenRotation {
        ScreenRotation::from_index(self.screen_rotation)
    }

    pub fn gap(&self) -> ScreenGap {
        ScreenGap::from_index(self.screen_gap)
    }

    pub fn layout(&self) -> ScreenLayout {
        ScreenLayout::from_index(self.screen_layout)
    }

    pub fn sizing(&self) -> ScreenSizing {
        ScreenSizing::from_index(self.screen_sizing)
    }

    pub fn mic_mode(&self) -> MicMode {
        MicMode::from_index(self.mic_input_type)
    }

    pub fn volume(&self) -> u8 {
        self.audio_volume.clamp(0, i64::from(VOLUME_MAX)) as u8
    }

    pub fn clock_level(&self) -> usize {
        self.clock_boost_level.clamp(0, CLOCK_BOOST_LEVELS - 1) as usize
    }

    /// The four fields the screen geometry depends on; compare across a
    /// settings edit to decide whether to recompute the layout.
    pub fn layout_key(&self) -> (ScreenRotation, ScreenGap, ScreenLayout, ScreenSizing) {
        (self.rotation(), self.gap(), self.layout(), self.sizing())
    }

    pub fn input_map(&self) -> InputMap {
        InputMap {
            buttons: [
                self.joy_a,
                self.joy_b,
                self.joy_select,
                self.joy_start,
                self.joy_right,
                self.joy_left,
                self.joy_up,
                self.joy_down,
                self.joy_r,
                self.joy_l,
                self.joy_x,
                self.joy_y,
            ],
            hotkeys: [self.joy_lid, self.joy_mic, self.joy_menu],
        }
    }
}
