use core::ops::BitXorAssign;

/// Width of the word inspected by [`is_bit_set`].
pub const WORD_BITS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BitIndexError {
    #[error("bit index {index} is outside 0..=31")]
    OutOfRange { index: u32 },
}

/// Exchanges `a` and `b` in place using three XOR assignments.
pub fn xor_swap<T>(a: &mut T, b: &mut T)
where
    T: BitXorAssign + Copy,
{
    *a ^= *b;
    *b ^= *a;
    *a ^= *b;
}

/// Returns the pair exchanged.
pub fn swap<T>(a: T, b: T) -> (T, T)
where
    T: BitXorAssign + Copy,
{
    let (mut a, mut b) = (a, b);
    xor_swap(&mut a, &mut b);
    (a, b)
}

/// Like [`xor_swap`], but leaves both values untouched when either side is absent.
pub fn swap_optional<T>(a: Option<&mut T>, b: Option<&mut T>)
where
    T: BitXorAssign + Copy,
{
    if let (Some(a), Some(b)) = (a, b) {
        xor_swap(a, b);
    }
}

/// Population count of a byte.
///
/// Adjacent bit pairs are summed into 2-bit fields, those into nibbles, and
/// the two nibbles into the final count.
pub const fn count_set_bits(byte: u8) -> u8 {
    let mut x = byte;
    x = ((x & 0xAA) >> 1) + (x & 0x55);
    x = ((x & 0xCC) >> 2) + (x & 0x33);
    ((x & 0xF0) >> 4) + (x & 0x0F)
}

/// Tests bit `index` of `word`, counting from the least significant bit.
pub const fn is_bit_set(word: u32, index: u32) -> Result<bool, BitIndexError> {
    if index >= WORD_BITS {
        return Err(BitIndexError::OutOfRange { index });
    }
    let mask = 1u32 << index;
    Ok(word & mask == mask)
}
