// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! SMA program ROM descrambler
//!
//! Titles protected by the SMA chip have their program ROM data lines
//! scrambled per word, a block of the address space scrambled within fixed
//! size blocks, and the boot/vector region relocated elsewhere in the ROM
//! behind a scrambled address bus.  Each is undone by a pass over the
//! expanded word array (see [`crate::combine::sma_expand`]) driven by
//! per-title bit orders.

#[allow(unused_imports)]
use log::{debug, trace};

use crate::bits::{AddressOrder, WordOrder, pack_words_le, permute_address, permute_word};
use crate::combine::{SMA_PREFIX_LEN, sma_expand};
use crate::{Error, Result};

/// Word index of the start of the scrambled region
pub const SCRAMBLED_START: usize = 0x080000;

/// Length, in bytes, of the region whose data lines are scrambled
pub const SCRAMBLED_LEN: usize = 0x800000;

/// Order of the address descramble and block shuffle passes.  The data line
/// descramble always comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOrder {
    AddressThenBlocks,
    BlocksThenAddress,
}

/// Per-title SMA descrambling parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmaKey {
    /// Data line order, applied to every word of the scrambled region
    pub data_order: WordOrder,

    /// Byte offset of the relocated boot region
    pub address_base: usize,

    /// Address line order for the relocated boot region
    pub address_order: AddressOrder,

    /// Size in bytes of each shuffled block
    pub block_size: usize,

    /// Length in bytes of the region divided into shuffled blocks, starting
    /// at [`SCRAMBLED_START`]
    pub block_range: usize,

    /// Address line order within each block
    pub block_order: AddressOrder,

    pub pass_order: PassOrder,
}

/// Descrambles the program chips of an SMA protected title, returning the
/// program area image.
pub fn decrypt(chips: Vec<Vec<u8>>, key: &SmaKey) -> Result<Vec<u8>> {
    let mut rom = sma_expand(chips);
    debug!("SMA descrambling {:#X} words", rom.len());
    descramble(&mut rom, key)?;
    Ok(pack_words_le(&rom))
}

/// Runs all three passes over the expanded word array, in place.
pub fn descramble(rom: &mut [u16], key: &SmaKey) -> Result<()> {
    descramble_data(rom, &key.data_order)?;
    match key.pass_order {
        PassOrder::AddressThenBlocks => {
            descramble_address(rom, key.address_base, &key.address_order)?;
            shuffle_blocks(rom, key.block_size, key.block_range, &key.block_order)?;
        }
        PassOrder::BlocksThenAddress => {
            shuffle_blocks(rom, key.block_size, key.block_range, &key.block_order)?;
            descramble_address(rom, key.address_base, &key.address_order)?;
        }
    }
    Ok(())
}

fn check_range(rom: &[u16], end: usize) -> Result<()> {
    if end > rom.len() {
        Err(Error::BoundsViolation {
            index: end - 1,
            len: rom.len(),
        })
    } else {
        Ok(())
    }
}

/// Pass 1: undo the per-word data line scramble.
pub fn descramble_data(rom: &mut [u16], order: &WordOrder) -> Result<()> {
    let end = SCRAMBLED_START + SCRAMBLED_LEN / 2;
    check_range(rom, end)?;
    trace!("SMA data lines {:#X}-{:#X}", SCRAMBLED_START, end);

    for word in &mut rom[SCRAMBLED_START..end] {
        *word = permute_word(*word, order);
    }
    Ok(())
}

/// Pass 2: rebuild the boot region from its relocated, address scrambled
/// copy.
pub fn descramble_address(rom: &mut [u16], base: usize, order: &AddressOrder) -> Result<()> {
    let base = base / 2;
    trace!("SMA boot region from word {:#X}", base);

    for ii in 0..SMA_PREFIX_LEN / 2 {
        let source = base + permute_address(ii, order);
        rom[ii] = *rom.get(source).ok_or(Error::BoundsViolation {
            index: source,
            len: rom.len(),
        })?;
    }
    Ok(())
}

/// Pass 3: undo the address scramble within each block of the scrambled
/// region.
pub fn shuffle_blocks(
    rom: &mut [u16],
    block_size: usize,
    range: usize,
    order: &AddressOrder,
) -> Result<()> {
    let block_words = (block_size / 2).max(1);
    trace!(
        "SMA shuffling {:#X} bytes in {:#X} byte blocks",
        range, block_size
    );

    for block in (0..range / 2).step_by(block_words) {
        let start = SCRAMBLED_START + block;
        check_range(rom, start + block_words)?;

        let original = rom[start..start + block_words].to_vec();
        for (jj, word) in rom[start..start + block_words].iter_mut().enumerate() {
            let source = permute_address(jj, order);
            *word = *original.get(source).ok_or(Error::BoundsViolation {
                index: start + source,
                len: start + block_words,
            })?;
        }
    }
    Ok(())
}
