// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Primitives for combining chip dumps into area images
//!
//! Chips are always read in full before being combined - patch overlays,
//! interleaving and SMA descrambling all need random access.

use std::io::Read;

#[allow(unused_imports)]
use log::{debug, trace, warn};
use neorom_config::{RomChip, SIZE_1M, SIZE_2M};

use crate::bits::unpack_words_le;
use crate::{Error, Result};

/// Value used to pad short chips
pub const PAD_BYTE: u8 = 0x00;

/// Value used to fabricate chips that were never dumped
pub const ERASED_BYTE: u8 = 0xFF;

/// Length of the zeroed region prepended to SMA program ROMs, in bytes
pub const SMA_PREFIX_LEN: usize = 0xC0000;

/// Filename pattern identifying program patch chips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchPattern {
    /// Chips whose filename contains the given text are patches
    Named(&'static str),

    /// No chip is a patch
    Disabled,
}

impl PatchPattern {
    /// The usual convention, `xxx-ep1.p1`
    pub const EP: PatchPattern = PatchPattern::Named(".ep");

    pub fn matches(&self, filename: &str) -> bool {
        match self {
            PatchPattern::Named(pattern) => filename.contains(pattern),
            PatchPattern::Disabled => false,
        }
    }
}

/// Reads each chip's stream to exhaustion, in layout order.
///
/// A stream yielding a different length to the catalogued chip size is not
/// an error, as the catalogue sizes are nominal, but is logged.
pub fn read_chips<R: Read>(chips: &[RomChip], streams: Vec<R>) -> Result<Vec<Vec<u8>>> {
    chips
        .iter()
        .zip(streams)
        .enumerate()
        .map(|(index, (chip, mut stream))| {
            let mut data = Vec::with_capacity(chip.size);
            stream
                .read_to_end(&mut data)
                .map_err(|source| Error::StreamRead { index, source })?;
            if data.len() != chip.size {
                warn!(
                    "Chip {} yielded {} bytes, catalogued as {} bytes",
                    chip.name,
                    data.len(),
                    chip.size
                );
            }
            Ok(data)
        })
        .collect()
}

/// Pads `data` at its end with `fill` until it is `size` bytes long.  Data
/// already at least `size` bytes long is left alone.
pub fn pad(mut data: Vec<u8>, size: usize, fill: u8) -> Vec<u8> {
    if data.len() < size {
        data.resize(size, fill);
    }
    data
}

/// A buffer of `size` bytes, all `fill`.  Stands in for chips which were
/// never dumped.
pub fn fabricate(size: usize, fill: u8) -> Vec<u8> {
    vec![fill; size]
}

/// Concatenates chips in order, padding every chip but the last out to
/// `pad_size` with `fill`.
pub fn padded_concat(chips: Vec<Vec<u8>>, pad_size: usize, fill: u8) -> Vec<u8> {
    let count = chips.len();
    let mut out = Vec::new();
    for (ii, chip) in chips.into_iter().enumerate() {
        if ii + 1 < count {
            out.extend(pad(chip, pad_size, fill));
        } else {
            out.extend(chip);
        }
    }
    out
}

/// Concatenates program chips, overlaying any patch chips on the start.
///
/// Chips matching `pattern` are patches; the rest make up the body.  Both
/// groups keep their relative order.  The patch chips are concatenated and
/// replace the first bytes of the concatenated body - they supersede that
/// prefix rather than shifting it.
///
/// If the first body chip is catalogued at exactly 2MB it was dumped with its
/// halves swapped, and they are swapped back before concatenation.
pub fn patched_concat(
    chips: &[RomChip],
    data: Vec<Vec<u8>>,
    pattern: PatchPattern,
) -> Result<Vec<u8>> {
    let mut patch = Vec::new();
    let mut body = Vec::new();
    for (chip, bytes) in chips.iter().zip(data) {
        if pattern.matches(&chip.name) {
            trace!("Chip {} is a patch", chip.name);
            patch.extend(bytes);
        } else {
            body.push((chip, bytes));
        }
    }

    let Some((first, first_data)) = body.first_mut() else {
        return Err(Error::NoChips);
    };

    if first.size == SIZE_2M {
        if first_data.len() < SIZE_1M {
            return Err(Error::Truncated {
                expected: SIZE_1M,
                actual: first_data.len(),
            });
        }
        debug!("Swapping halves of chip {}", first.name);
        first_data.rotate_left(SIZE_1M);
    }

    let mut out: Vec<u8> = body.into_iter().flat_map(|(_, bytes)| bytes).collect();
    if out.len() < patch.len() {
        return Err(Error::Truncated {
            expected: patch.len(),
            actual: out.len(),
        });
    }
    out[..patch.len()].copy_from_slice(&patch);

    Ok(out)
}

/// Interleaves streams, taking `unit` bytes from each in turn.
///
/// Streams would normally be the same length.  A stream which runs out
/// simply stops contributing, while the others carry on in order, which is
/// what's needed when recombining intermediates of unequal length.
pub fn interleave<S: AsRef<[u8]>>(streams: &[S], unit: usize) -> Vec<u8> {
    let unit = unit.max(1);
    let total = streams.iter().map(|s| s.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);

    let mut offset = 0;
    while out.len() < total {
        for stream in streams {
            let stream = stream.as_ref();
            if offset < stream.len() {
                let end = stream.len().min(offset + unit);
                out.extend_from_slice(&stream[offset..end]);
            }
        }
        offset += unit;
    }

    out
}

/// Byte interleaves consecutive groups of `group` chips, returning one
/// intermediate per group.
///
/// Used to recombine chips split across odd/even bytes or bit planes.
pub fn interleave_groups(chips: &[Vec<u8>], group: usize) -> Result<Vec<Vec<u8>>> {
    if group == 0 || chips.len() % group != 0 {
        return Err(Error::UnpairedChips {
            count: chips.len(),
            group,
        });
    }

    Ok(chips.chunks(group).map(|set| interleave(set, 1)).collect())
}

/// Builds the word array the SMA chip addresses - the program chips with
/// [`SMA_PREFIX_LEN`] zero bytes in front of them, as little-endian words.
pub fn sma_expand(chips: Vec<Vec<u8>>) -> Vec<u16> {
    let mut bytes = vec![0u8; SMA_PREFIX_LEN];
    for chip in chips {
        bytes.extend(chip);
    }
    unpack_words_le(&bytes)
}
