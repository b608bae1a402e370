// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Memory areas of the cartridge

use strum::{EnumCount, EnumIter, IntoStaticStr};

/// Number of memory areas, fixed by the hardware memory map
pub const AREAS: usize = MemoryArea::COUNT;

/// Logical memory regions of the cartridge.
///
/// The order is the hardware order and is used as the index into per-area
/// arrays.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumCount,
    EnumIter,
    IntoStaticStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemoryArea {
    /// 68000 program code
    P,

    /// Fix (text/tile) layer
    S,

    /// Z80 sound CPU code
    M,

    /// ADPCM-A samples
    V1,

    /// ADPCM-B samples
    V2,

    /// Sprite graphics
    C,
}

impl MemoryArea {
    /// Index of the area within per-area arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name, as used in configuration files
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn try_from_str(s: &str) -> Option<Self> {
        use strum::IntoEnumIterator;

        MemoryArea::iter().find(|area| area.name().eq_ignore_ascii_case(s))
    }
}

impl core::fmt::Display for MemoryArea {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
