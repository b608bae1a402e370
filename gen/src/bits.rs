// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Bit permutation and word packing primitives

/// A 16 entry bit order, used to descramble data lines
pub type WordOrder = [u8; 16];

/// A 24 entry bit order, used to descramble address lines
pub type AddressOrder = [u8; 24];

/// Reorders the bits of an `N` bit value.
///
/// `order` lists, most significant result bit first, the input bit that
/// feeds each result bit - so result bit `N - 1 - k` is input bit
/// `order[k]`.  This is the same convention as MAME's `BITSWAP` macros, so
/// orders can be transcribed directly from hardware analysis.
///
/// Input bits not named in `order` are dropped.  Every entry must be below
/// 32.
pub fn bit_permute<const N: usize>(value: u32, order: &[u8; N]) -> u32 {
    order
        .iter()
        .fold(0, |result, &bit| (result << 1) | ((value >> bit) & 1))
}

/// Descrambles a 16 bit data word.
pub fn permute_word(word: u16, order: &WordOrder) -> u16 {
    // 16 result bits, so the truncation is lossless
    bit_permute(u32::from(word), order) as u16
}

/// Descrambles a 24 bit address (or word index).
pub fn permute_address(address: usize, order: &AddressOrder) -> usize {
    bit_permute((address & 0xFF_FFFF) as u32, order) as usize
}

/// Reinterprets a byte buffer as little-endian 16 bit words.
///
/// A trailing odd byte has no partner and is dropped.
pub fn unpack_words_le(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Flattens 16 bit words into little-endian bytes.  The inverse of
/// [`unpack_words_le`].
pub fn pack_words_le(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}
