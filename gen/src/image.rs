// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Reconstructed area images
//!
//! Use [`populate()`] to select the strategy for a title and build its
//! [`OutputImage`] from the chip streams, or [`crate::Builder`] to do the
//! same from a JSON config and in-memory chip data.

use std::io::Read;
use std::ops::Index;

use neorom_config::{AREAS, MemoryArea, TitleLayout};

use crate::Result;
use crate::cmc::CmcDecrypt;
use crate::strategy::Strategy;

/// The reconstructed image of every memory area of a title.
///
/// Areas whose layout has no chips, and which the strategy doesn't
/// fabricate or derive, are empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputImage {
    areas: [Vec<u8>; AREAS],
}

impl OutputImage {
    pub(crate) fn set(&mut self, area: MemoryArea, data: Vec<u8>) {
        self.areas[area.index()] = data;
    }

    /// Returns the image of the given area
    pub fn area(&self, area: MemoryArea) -> &[u8] {
        &self.areas[area.index()]
    }

    /// Total size of all areas, in bytes
    pub fn len(&self) -> usize {
        self.areas.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.iter().all(Vec::is_empty)
    }

    /// Consumes the image, returning the per-area buffers in
    /// [`MemoryArea`] order.
    pub fn into_areas(self) -> [Vec<u8>; AREAS] {
        self.areas
    }
}

impl Index<MemoryArea> for OutputImage {
    type Output = [u8];

    fn index(&self, area: MemoryArea) -> &[u8] {
        self.area(area)
    }
}

/// Reconstructs a title's area images.
///
/// Selects the title's [`Strategy`] (the default for titles without one) and
/// runs it.  `streams` must hold one reader per chip in each area, in layout
/// order.  `cmc` is only used for CMC protected titles - pass
/// [`crate::NoCmc`] if none is available.
pub fn populate<R: Read, D: CmcDecrypt + ?Sized>(
    title: &str,
    layout: &TitleLayout,
    streams: [Vec<R>; AREAS],
    cmc: &D,
) -> Result<OutputImage> {
    Strategy::for_title(title).populate(title, layout, streams, cmc)
}
