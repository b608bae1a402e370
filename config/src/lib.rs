// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Chip and memory area layouts for MVS cartridges.
//!
//! A cartridge is built from a number of physical ROM chips, each of which
//! backs part of one of a fixed set of memory areas.  A [`TitleLayout`]
//! records which chips make up each area for a single title, as catalogued
//! by the reference emulation database, and is the blueprint consumed by
//! `neorom-gen` when reconstructing the area images.

#![no_std]

extern crate alloc;

pub mod area;
pub mod layout;

pub use area::{AREAS, MemoryArea};
pub use layout::{AreaLayout, RomChip, TitleLayout};

/// 128KB, the size of an erased sound CPU ROM
pub const SIZE_128K: usize = 128 * 1024;

/// 1MB
pub const SIZE_1M: usize = 1024 * 1024;

/// 2MB.  Program chips of exactly this size were dumped with their halves
/// swapped.
pub const SIZE_2M: usize = 2 * 1024 * 1024;

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
