// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! CMC protection chip decryption boundary
//!
//! The CMC42 and CMC50 graphics ciphers, the fix layer derivation and the
//! CMC50 sound CPU cipher are provided by the caller.  Strategies invoke
//! them as black boxes, and check the lengths they return.

use crate::{Error, Result};

/// Generation of CMC chip protecting a title's graphics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum CmcGeneration {
    #[strum(to_string = "CMC42")]
    Cmc42,

    #[strum(to_string = "CMC50")]
    Cmc50,
}

/// Decryption operations for CMC protected titles.
pub trait CmcDecrypt {
    /// Decrypts the interleaved graphics plane.  Must return the same number
    /// of bytes as supplied.
    fn graphics_decrypt(&self, generation: CmcGeneration, plane: &[u8], key: u8)
    -> Result<Vec<u8>>;

    /// Derives the fix layer from the decrypted graphics plane.  Must return
    /// exactly `size` bytes.
    fn fix_plane_derive(&self, graphics: &[u8], size: usize) -> Result<Vec<u8>>;

    /// Decrypts the CMC50 sound CPU ROM.  Must return the same number of
    /// bytes as supplied.
    fn sound_cpu_decrypt(&self, m1: &[u8]) -> Result<Vec<u8>>;
}

/// For use when no CMC implementation is available.  Titles without CMC
/// protection populate normally; CMC protected titles fail with
/// [`Error::CipherUnavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCmc;

impl CmcDecrypt for NoCmc {
    fn graphics_decrypt(&self, _: CmcGeneration, _: &[u8], _: u8) -> Result<Vec<u8>> {
        Err(Error::CipherUnavailable {
            operation: "graphics decrypt",
        })
    }

    fn fix_plane_derive(&self, _: &[u8], _: usize) -> Result<Vec<u8>> {
        Err(Error::CipherUnavailable {
            operation: "fix plane derive",
        })
    }

    fn sound_cpu_decrypt(&self, _: &[u8]) -> Result<Vec<u8>> {
        Err(Error::CipherUnavailable {
            operation: "sound CPU decrypt",
        })
    }
}

fn check_len(operation: &'static str, data: Vec<u8>, expected: usize) -> Result<Vec<u8>> {
    if data.len() == expected {
        Ok(data)
    } else {
        Err(Error::CollaboratorLength {
            operation,
            expected,
            actual: data.len(),
        })
    }
}

pub(crate) fn graphics_decrypt<D: CmcDecrypt + ?Sized>(
    cmc: &D,
    generation: CmcGeneration,
    plane: &[u8],
    key: u8,
) -> Result<Vec<u8>> {
    let data = cmc.graphics_decrypt(generation, plane, key)?;
    check_len("graphics decrypt", data, plane.len())
}

pub(crate) fn fix_plane_derive<D: CmcDecrypt + ?Sized>(
    cmc: &D,
    graphics: &[u8],
    size: usize,
) -> Result<Vec<u8>> {
    let data = cmc.fix_plane_derive(graphics, size)?;
    check_len("fix plane derive", data, size)
}

pub(crate) fn sound_cpu_decrypt<D: CmcDecrypt + ?Sized>(cmc: &D, m1: &[u8]) -> Result<Vec<u8>> {
    let data = cmc.sound_cpu_decrypt(m1)?;
    check_len("sound CPU decrypt", data, m1.len())
}
