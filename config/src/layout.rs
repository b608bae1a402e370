// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Chip, area and title layouts

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Index;

use crate::area::MemoryArea;

/// A single physical ROM chip dump, as catalogued.
///
/// The name is only used to pick out chips that need special handling (such
/// as patch chips), it is never used to locate data.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct RomChip {
    /// Chip filename within the catalogued set
    pub name: String,

    /// Size of the chip dump in bytes
    pub size: usize,

    /// CRC32 of the chip dump
    #[serde(default)]
    pub crc: u32,
}

impl RomChip {
    pub fn new(name: impl Into<String>, size: usize, crc: u32) -> Self {
        Self {
            name: name.into(),
            size,
            crc,
        }
    }
}

/// The chips making up one memory area.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AreaLayout {
    /// Nominal size of the area.  This is independent of the sum of the chip
    /// sizes.
    #[serde(default)]
    pub size: usize,

    /// Chips, in load order
    #[serde(default)]
    pub chips: Vec<RomChip>,
}

impl AreaLayout {
    pub fn new(size: usize, chips: Vec<RomChip>) -> Self {
        Self { size, chips }
    }

    /// Size each chip but the last is padded to when concatenating chips -
    /// the size of the largest chip in the area.
    pub fn pad_size(&self) -> usize {
        self.chips.iter().map(|chip| chip.size).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn chip_count(&self) -> usize {
        self.chips.len()
    }
}

/// Complete chip layout of a title.
///
/// Indexed by [`MemoryArea`].  Areas without chips are simply empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct TitleLayout {
    /// Parent title, for clones.  Informational only.
    #[serde(default)]
    pub parent: String,

    #[serde(default)]
    pub p: AreaLayout,

    #[serde(default)]
    pub s: AreaLayout,

    #[serde(default)]
    pub m: AreaLayout,

    #[serde(default)]
    pub v1: AreaLayout,

    #[serde(default)]
    pub v2: AreaLayout,

    #[serde(default)]
    pub c: AreaLayout,
}

impl TitleLayout {
    /// Returns the layout for the given area
    pub fn area(&self, area: MemoryArea) -> &AreaLayout {
        match area {
            MemoryArea::P => &self.p,
            MemoryArea::S => &self.s,
            MemoryArea::M => &self.m,
            MemoryArea::V1 => &self.v1,
            MemoryArea::V2 => &self.v2,
            MemoryArea::C => &self.c,
        }
    }

    pub fn area_mut(&mut self, area: MemoryArea) -> &mut AreaLayout {
        match area {
            MemoryArea::P => &mut self.p,
            MemoryArea::S => &mut self.s,
            MemoryArea::M => &mut self.m,
            MemoryArea::V1 => &mut self.v1,
            MemoryArea::V2 => &mut self.v2,
            MemoryArea::C => &mut self.c,
        }
    }

    /// Builder style helper to set an area's layout
    pub fn with_area(mut self, area: MemoryArea, layout: AreaLayout) -> Self {
        *self.area_mut(area) = layout;
        self
    }

    /// Total number of chips across all areas
    pub fn chip_count(&self) -> usize {
        use strum::IntoEnumIterator;

        MemoryArea::iter()
            .map(|area| self.area(area).chip_count())
            .sum()
    }
}

impl Index<MemoryArea> for TitleLayout {
    type Output = AreaLayout;

    fn index(&self, area: MemoryArea) -> &AreaLayout {
        self.area(area)
    }
}
