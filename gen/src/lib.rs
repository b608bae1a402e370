// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Reconstructs canonical, decrypted MVS cartridge ROM images.
//!
//! Each catalogued title supplies one byte stream per chip, grouped by
//! [`MemoryArea`].  The [`Strategy`] selected for the title combines those
//! streams (concatenating, interleaving, overlaying patch chips, undoing the
//! SMA program scrambling) into one buffer per area - an [`OutputImage`].
//!
//! Graphics, fix layer and sound CPU decryption for CMC protected titles is
//! supplied by the caller through the [`CmcDecrypt`] trait.

pub mod bits;
pub mod builder;
pub mod cmc;
pub mod combine;
pub mod image;
pub mod sma;
pub mod strategy;

pub use builder::{Builder, Config, FileData, FileSpec};
pub use cmc::{CmcDecrypt, CmcGeneration, NoCmc};
pub use image::{OutputImage, populate};
pub use strategy::Strategy;

pub use neorom_config::{AREAS, AreaLayout, MemoryArea, RomChip, TitleLayout};

/// Version of the JSON configuration understood by this crate
pub const CONFIG_VERSION: u32 = 1;

/// Error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read chip {index}")]
    StreamRead {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("{title}: area {area} has {actual} streams, layout has {expected} chips")]
    LayoutMismatch {
        title: String,
        area: MemoryArea,
        expected: usize,
        actual: usize,
    },

    #[error("word index {index:#X} out of range for {len:#X} word program image")]
    BoundsViolation { index: usize, len: usize },

    #[error("no chips to combine")]
    NoChips,

    #[error("{count} chips cannot be grouped in {group}s")]
    UnpairedChips { count: usize, group: usize },

    #[error("data truncated: needed {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("{operation} returned {actual} bytes, expected {expected}")]
    CollaboratorLength {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{operation} is not available")]
    CipherUnavailable { operation: &'static str },

    #[error("{title}: failed to populate area {area}")]
    Area {
        title: String,
        area: MemoryArea,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid config: {error}")]
    InvalidConfig { error: String },

    #[error("unsupported config version {version}")]
    UnsupportedConfigVersion { version: u32 },

    #[error("file {id} supplied twice")]
    DuplicateFile { id: usize },

    #[error("file {id} invalid, only {total} files expected")]
    InvalidFile { id: usize, total: usize },

    #[error("file {id} not supplied")]
    MissingFile { id: usize },
}

impl Error {
    pub(crate) fn area(title: &str, area: MemoryArea, source: Error) -> Self {
        Error::Area {
            title: title.to_string(),
            area,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn config_version() -> u32 {
    CONFIG_VERSION
}
