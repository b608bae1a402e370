// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Per-title reconstruction strategies
//!
//! Most titles are reconstructed the same way: program chips concatenated
//! with any patch chips overlaid, graphics chips byte interleaved in pairs,
//! everything else concatenated.  The titles listed in [`TITLES`] need
//! something different - CMC decryption, SMA descrambling, or a fix for a
//! quirk in how the chips were catalogued.

use std::io::Read;

#[allow(unused_imports)]
use log::{debug, trace, warn};
use neorom_config::{AREAS, AreaLayout, MemoryArea, SIZE_2M, SIZE_128K, TitleLayout};
use strum::IntoEnumIterator;

use crate::bits::AddressOrder;
use crate::cmc::{self, CmcDecrypt, CmcGeneration};
use crate::combine::{
    ERASED_BYTE, PAD_BYTE, PatchPattern, fabricate, interleave, interleave_groups,
    padded_concat, patched_concat, read_chips,
};
use crate::image::OutputImage;
use crate::sma::{self, PassOrder, SmaKey};
use crate::{Error, Result};

// CMC42 graphics keys
const BANGBEAD_GFX_KEY: u8 = 0xF8;
const GANRYU_GFX_KEY: u8 = 0x07;
const GAROU_GFX_KEY: u8 = 0x06;
const KOF99_GFX_KEY: u8 = 0x00;
const MSLUG3_GFX_KEY: u8 = 0xAD;
const NITD_GFX_KEY: u8 = 0xFF;
const PREISLE2_GFX_KEY: u8 = 0x9F;
const S1945P_GFX_KEY: u8 = 0x05;
const SENGOKU3_GFX_KEY: u8 = 0xFE;
const ZUPAPA_GFX_KEY: u8 = 0xBD;

// CMC50 graphics keys
const KOF2000_GFX_KEY: u8 = 0x00;
const KOF2001_GFX_KEY: u8 = 0x1E;
const JOCKEYGP_GFX_KEY: u8 = 0xAC;

// Upper address lines are never scrambled
const fn high_lines<const N: usize>(low: [u8; N]) -> AddressOrder {
    let mut order = [0; 24];
    let high = 24 - N;
    let mut ii = 0;
    while ii < high {
        order[ii] = 23 - ii as u8;
        ii += 1;
    }
    while ii < 24 {
        order[ii] = low[ii - high];
        ii += 1;
    }
    order
}

const GAROU_SMA: SmaKey = SmaKey {
    data_order: [13, 12, 14, 10, 8, 2, 3, 1, 5, 9, 11, 4, 15, 0, 6, 7],
    address_base: 0x710000,
    address_order: high_lines([4, 5, 16, 14, 7, 9, 6, 13, 17, 15, 3, 1, 2, 12, 11, 8, 10, 0]),
    block_size: 0x8000,
    block_range: 0x800000,
    block_order: high_lines([9, 4, 8, 3, 13, 6, 2, 7, 0, 12, 1, 11, 10, 5]),
    pass_order: PassOrder::AddressThenBlocks,
};

const GAROUH_SMA: SmaKey = SmaKey {
    data_order: [14, 5, 1, 11, 7, 4, 10, 15, 3, 12, 8, 13, 0, 2, 9, 6],
    address_base: 0x7F8000,
    address_order: high_lines([5, 16, 11, 2, 6, 7, 17, 3, 12, 8, 14, 4, 0, 9, 1, 10, 15, 13]),
    block_size: 0x8000,
    block_range: 0x800000,
    block_order: high_lines([12, 8, 1, 7, 11, 3, 13, 10, 6, 9, 5, 4, 0, 2]),
    pass_order: PassOrder::AddressThenBlocks,
};

const KOF99_SMA: SmaKey = SmaKey {
    data_order: [13, 7, 3, 0, 9, 4, 5, 6, 1, 12, 8, 14, 10, 11, 2, 15],
    address_base: 0x700000,
    address_order: high_lines([11, 6, 14, 17, 16, 5, 8, 10, 12, 0, 4, 3, 2, 7, 9, 15, 13, 1]),
    block_size: 0x800,
    block_range: 0x600000,
    block_order: high_lines([6, 2, 4, 9, 8, 3, 1, 7, 0, 5]),
    pass_order: PassOrder::BlocksThenAddress,
};

const KOF2000_SMA: SmaKey = SmaKey {
    data_order: [12, 8, 11, 3, 15, 14, 7, 0, 10, 13, 6, 5, 9, 2, 1, 4],
    address_base: 0x73A000,
    address_order: high_lines([8, 4, 15, 13, 3, 14, 16, 2, 6, 17, 7, 12, 10, 0, 5, 11, 1, 9]),
    block_size: 0x800,
    block_range: 0x63A000,
    block_order: high_lines([4, 1, 3, 8, 6, 2, 7, 0, 9, 5]),
    pass_order: PassOrder::BlocksThenAddress,
};

const MSLUG3_SMA: SmaKey = SmaKey {
    data_order: [4, 11, 14, 3, 1, 13, 0, 7, 2, 8, 12, 15, 10, 9, 5, 6],
    address_base: 0x5D0000,
    address_order: high_lines([15, 2, 1, 13, 3, 0, 9, 6, 16, 4, 11, 5, 7, 12, 17, 14, 10, 8]),
    block_size: 0x10000,
    block_range: 0x800000,
    block_order: high_lines([2, 11, 0, 14, 6, 4, 13, 8, 9, 3, 10, 7, 5, 12, 1]),
    pass_order: PassOrder::AddressThenBlocks,
};

const MSLUG3A_SMA: SmaKey = SmaKey {
    data_order: [2, 11, 12, 14, 9, 3, 1, 4, 13, 7, 6, 8, 10, 15, 0, 5],
    address_base: 0x5D0000,
    address_order: high_lines([1, 16, 14, 7, 17, 5, 8, 4, 15, 6, 3, 2, 0, 13, 10, 12, 9, 11]),
    block_size: 0x10000,
    block_range: 0x800000,
    block_order: high_lines([12, 0, 11, 3, 4, 13, 6, 8, 14, 7, 5, 2, 10, 9, 1]),
    pass_order: PassOrder::AddressThenBlocks,
};

/// Titles which don't use [`Strategy::Common`]
pub static TITLES: &[(&str, Strategy)] = &[
    ("bangbead", Strategy::Cmc42 { key: BANGBEAD_GFX_KEY }),
    ("dragonsh", Strategy::Dragonsh),
    ("fightfeva", Strategy::Fightfeva),
    ("ganryu", Strategy::Cmc42 { key: GANRYU_GFX_KEY }),
    ("garou", Strategy::SmaCmc42 { sma: &GAROU_SMA, key: GAROU_GFX_KEY }),
    ("garouh", Strategy::SmaCmc42 { sma: &GAROUH_SMA, key: GAROU_GFX_KEY }),
    ("gpilotsp", Strategy::Gpilotsp),
    ("jockeygp", Strategy::Cmc50 { key: JOCKEYGP_GFX_KEY }),
    ("kof2000", Strategy::SmaCmc50 { sma: &KOF2000_SMA, key: KOF2000_GFX_KEY }),
    ("kof2000n", Strategy::Cmc50 { key: KOF2000_GFX_KEY }),
    ("kof2001", Strategy::Cmc50 { key: KOF2001_GFX_KEY }),
    ("kof2001h", Strategy::Cmc50 { key: KOF2001_GFX_KEY }),
    ("kof95a", Strategy::Kof95a),
    ("kof99", Strategy::SmaCmc42 { sma: &KOF99_SMA, key: KOF99_GFX_KEY }),
    ("kof99e", Strategy::SmaCmc42 { sma: &KOF99_SMA, key: KOF99_GFX_KEY }),
    ("kof99h", Strategy::SmaCmc42 { sma: &KOF99_SMA, key: KOF99_GFX_KEY }),
    ("kof99ka", Strategy::Cmc42 { key: KOF99_GFX_KEY }),
    ("kotm2", Strategy::Kotm2),
    ("kotm2p", Strategy::Kotm2p),
    ("mslug3", Strategy::SmaCmc42 { sma: &MSLUG3_SMA, key: MSLUG3_GFX_KEY }),
    ("mslug3a", Strategy::SmaCmc42 { sma: &MSLUG3A_SMA, key: MSLUG3_GFX_KEY }),
    ("mslug3h", Strategy::Cmc42 { key: MSLUG3_GFX_KEY }),
    ("nitd", Strategy::Cmc42 { key: NITD_GFX_KEY }),
    ("pbobblenb", Strategy::Pbobblenb),
    ("preisle2", Strategy::Cmc42 { key: PREISLE2_GFX_KEY }),
    ("s1945p", Strategy::Cmc42 { key: S1945P_GFX_KEY }),
    ("sengoku3", Strategy::Cmc42 { key: SENGOKU3_GFX_KEY }),
    ("viewpoin", Strategy::Viewpoin),
    ("zupapa", Strategy::Cmc42 { key: ZUPAPA_GFX_KEY }),
];

/// How a title's chips are turned into area images
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The majority of titles
    #[default]
    Common,

    /// CMC42 graphics encryption, fix layer derived from the graphics
    Cmc42 { key: u8 },

    /// CMC50 graphics and sound CPU encryption, fix layer derived from the
    /// graphics
    Cmc50 { key: u8 },

    /// SMA program scrambling with CMC42 encryption
    SmaCmc42 { sma: &'static SmaKey, key: u8 },

    /// SMA program scrambling with CMC50 encryption
    SmaCmc50 { sma: &'static SmaKey, key: u8 },

    /// Program chips byte swapped pairs, sound CPU and first ADPCM chips were
    /// never dumped and are replaced with erased images
    Dragonsh,

    /// Patch chip named `.sp2` rather than `.ep1`
    Fightfeva,

    /// Program chips byte swapped pairs, graphics interleaved in fours
    Gpilotsp,

    /// Regular program chips named like patch chips
    Kof95a,

    /// Graphics pairs interleaved again in 2MB units
    Kotm2,

    /// Program chips interleaved in pairs, graphics in fours
    Kotm2p,

    /// 2MB of silence precedes the ADPCM-A samples
    Pbobblenb,

    /// Graphics pairs interleaved in 2MB units with 2MB of empty space
    Viewpoin,
}

impl Strategy {
    /// Looks up the strategy for a title, falling back to
    /// [`Strategy::Common`].
    pub fn for_title(title: &str) -> Strategy {
        TITLES
            .iter()
            .find(|(name, _)| *name == title)
            .map(|(_, strategy)| *strategy)
            .unwrap_or_default()
    }

    /// Titles with a dedicated strategy
    pub fn titles() -> impl Iterator<Item = &'static str> {
        TITLES.iter().map(|(name, _)| *name)
    }

    /// CMC generation and graphics key, if the title is CMC protected
    pub fn cmc(&self) -> Option<(CmcGeneration, u8)> {
        match *self {
            Strategy::Cmc42 { key } | Strategy::SmaCmc42 { key, .. } => {
                Some((CmcGeneration::Cmc42, key))
            }
            Strategy::Cmc50 { key } | Strategy::SmaCmc50 { key, .. } => {
                Some((CmcGeneration::Cmc50, key))
            }
            _ => None,
        }
    }

    /// SMA descrambling parameters, if the title is SMA protected
    pub fn sma(&self) -> Option<&'static SmaKey> {
        match *self {
            Strategy::SmaCmc42 { sma, .. } | Strategy::SmaCmc50 { sma, .. } => Some(sma),
            _ => None,
        }
    }

    fn patch_pattern(&self) -> PatchPattern {
        match self {
            Strategy::Fightfeva => PatchPattern::Named(".sp"),
            Strategy::Kof95a => PatchPattern::Disabled,
            _ => PatchPattern::EP,
        }
    }

    /// Builds every area of the title.
    ///
    /// `streams` holds one reader per chip, per area, in the same order as
    /// the layout.  The counts are checked for all areas before anything is
    /// read.  Any failure abandons the whole image.
    pub fn populate<R: Read, D: CmcDecrypt + ?Sized>(
        &self,
        title: &str,
        layout: &TitleLayout,
        streams: [Vec<R>; AREAS],
        cmc: &D,
    ) -> Result<OutputImage> {
        for area in MemoryArea::iter() {
            let expected = layout[area].chip_count();
            let actual = streams[area.index()].len();
            if expected != actual {
                return Err(Error::LayoutMismatch {
                    title: title.to_string(),
                    area,
                    expected,
                    actual,
                });
            }
        }

        debug!("Populating {title} using {self:?}");

        let mut image = OutputImage::default();
        for (area, area_streams) in MemoryArea::iter().zip(streams) {
            let data = self
                .populate_area(area, &layout[area], area_streams, cmc)
                .map_err(|e| Error::area(title, area, e))?;
            if let Some(data) = data {
                debug!("{title} area {area} is {:#X} bytes", data.len());
                image.set(area, data);
            }
        }

        // The fix layer of CMC titles is derived from the decrypted graphics,
        // so can only be built once they are done
        if self.cmc().is_some() {
            let fix = cmc::fix_plane_derive(cmc, image.area(MemoryArea::C), layout.s.size)
                .map_err(|e| Error::area(title, MemoryArea::S, e))?;
            debug!("{title} area {} derived, {:#X} bytes", MemoryArea::S, fix.len());
            image.set(MemoryArea::S, fix);
        }

        Ok(image)
    }

    // Returns None for an area which is derived later rather than built from
    // its own chips.
    fn populate_area<R: Read, D: CmcDecrypt + ?Sized>(
        &self,
        area: MemoryArea,
        layout: &AreaLayout,
        streams: Vec<R>,
        cmc: &D,
    ) -> Result<Option<Vec<u8>>> {
        let data = match area {
            MemoryArea::P => self.program(layout, streams)?,
            MemoryArea::S if self.cmc().is_some() => {
                if !layout.is_empty() {
                    trace!("Ignoring {} catalogued fix chips", layout.chip_count());
                }
                return Ok(None);
            }
            MemoryArea::M => self.sound(layout, streams, cmc)?,
            MemoryArea::V1 => self.adpcm_a(layout, streams)?,
            MemoryArea::C => self.graphics(layout, streams, cmc)?,
            MemoryArea::S | MemoryArea::V2 => concat(layout, streams)?,
        };
        Ok(Some(data))
    }

    fn program<R: Read>(&self, layout: &AreaLayout, streams: Vec<R>) -> Result<Vec<u8>> {
        let mut chips = read_chips(&layout.chips, streams)?;
        if chips.is_empty() {
            return Ok(Vec::new());
        }

        match self {
            Strategy::SmaCmc42 { sma, .. } | Strategy::SmaCmc50 { sma, .. } => {
                sma::decrypt(chips, sma)
            }
            Strategy::Dragonsh | Strategy::Gpilotsp => {
                // Odd and even chips are the wrong way round
                for pair in chips.chunks_exact_mut(2) {
                    pair.swap(0, 1);
                }
                Ok(interleave_groups(&chips, 2)?.concat())
            }
            Strategy::Kotm2p => Ok(interleave_groups(&chips, 2)?.concat()),
            _ => patched_concat(&layout.chips, chips, self.patch_pattern()),
        }
    }

    fn graphics<R: Read, D: CmcDecrypt + ?Sized>(
        &self,
        layout: &AreaLayout,
        streams: Vec<R>,
        cmc: &D,
    ) -> Result<Vec<u8>> {
        let chips = read_chips(&layout.chips, streams)?;
        let plane = match self {
            Strategy::Gpilotsp | Strategy::Kotm2p => interleave_groups(&chips, 4)?.concat(),
            Strategy::Kotm2 => interleave(&interleave_groups(&chips, 2)?, SIZE_2M),
            Strategy::Viewpoin => {
                let spaced: Vec<Vec<u8>> = interleave_groups(&chips, 2)?
                    .into_iter()
                    .flat_map(|pair| [pair, vec![PAD_BYTE; SIZE_2M]])
                    .collect();
                interleave(&spaced, SIZE_2M)
            }
            _ => padded_concat(interleave_groups(&chips, 2)?, layout.pad_size() * 2, PAD_BYTE),
        };

        match self.cmc() {
            Some((generation, key)) => {
                debug!("Decrypting {generation} graphics, key {key:#04X}");
                cmc::graphics_decrypt(cmc, generation, &plane, key)
            }
            None => Ok(plane),
        }
    }

    fn sound<R: Read, D: CmcDecrypt + ?Sized>(
        &self,
        layout: &AreaLayout,
        streams: Vec<R>,
        cmc: &D,
    ) -> Result<Vec<u8>> {
        if *self == Strategy::Dragonsh {
            return Ok(fabricate(SIZE_128K, ERASED_BYTE));
        }

        let m1 = concat(layout, streams)?;
        match self.cmc() {
            Some((CmcGeneration::Cmc50, _)) => cmc::sound_cpu_decrypt(cmc, &m1),
            _ => Ok(m1),
        }
    }

    fn adpcm_a<R: Read>(&self, layout: &AreaLayout, streams: Vec<R>) -> Result<Vec<u8>> {
        match self {
            Strategy::Dragonsh => Ok(fabricate(SIZE_2M, ERASED_BYTE)),
            Strategy::Pbobblenb => {
                let mut samples = fabricate(SIZE_2M, PAD_BYTE);
                samples.extend(concat(layout, streams)?);
                Ok(samples)
            }
            _ => concat(layout, streams),
        }
    }
}

fn concat<R: Read>(layout: &AreaLayout, streams: Vec<R>) -> Result<Vec<u8>> {
    let chips = read_chips(&layout.chips, streams)?;
    Ok(padded_concat(chips, layout.pad_size(), PAD_BYTE))
}
