//! Console drivers for the bit helpers.
//!
//! Output lines keep the historical demo format so captured logs stay
//! comparable across firmware and simulator runs.

use crate::bits::{count_set_bits, is_bit_set, swap, WORD_BITS};
use crate::Board;
use rand_core::RngCore;

/// Random samples printed per count/check run.
pub const SAMPLES_PER_RUN: usize = 5;

/// Fixed `(D1, D2)` inputs of the swap run.
pub const SWAP_CASES: [(i32, i32); 4] = [(10, 20), (10, 10), (0, 20), (10, 0)];

pub fn swap_test<B>(board: &mut B)
where
    B: Board + ?Sized,
{
    board.print(format_args!("--Swap Data Test--"));
    for &(d1, d2) in SWAP_CASES.iter() {
        let (out1, out2) = swap(d1, d2);
        board.print(format_args!(
            "Input(D1={}, D2={}) --> Output(D1={}, D2={})",
            d1, d2, out1, out2
        ));
    }
}

pub fn count_bits_test<B, R>(board: &mut B, rng: &mut R)
where
    B: Board + ?Sized,
    R: RngCore + ?Sized,
{
    board.print(format_args!("--Number of Set Bits in a Byte Test--"));
    for _ in 0..SAMPLES_PER_RUN {
        let sample = (rng.next_u32() % 0xFF) as u8;
        board.print(format_args!(
            "Number of Set Bits in: 0x{:X} = {}",
            sample,
            count_set_bits(sample)
        ));
    }
}

/// Draws the word first, then the index.
pub fn check_bit_test<B, R>(board: &mut B, rng: &mut R)
where
    B: Board + ?Sized,
    R: RngCore + ?Sized,
{
    board.print(format_args!("--Nth Bit Set Test--"));
    for _ in 0..SAMPLES_PER_RUN {
        let sample = rng.next_u32() % 0xFFFF_FFFF;
        let index = rng.next_u32() % WORD_BITS;
        let Ok(set) = is_bit_set(sample, index) else {
            continue;
        };
        board.print(format_args!(
            "Is Bit {} set in 0x{:X}? = {}({})",
            index,
            sample,
            if set { "TRUE" } else { "FALSE" },
            set as u8
        ));
    }
}
