#![cfg_attr(not(test), no_std)]

//! Round-robin bit utility demo.
//!
//! The crate is shared by the bare-metal firmware and the host simulator:
//!
//! - [`bits`]: XOR swap, population count and nth-bit test
//! - [`selftest`]: console drivers that exercise the bit helpers
//! - [`controller`]: the button-driven state machine
//! - [`board`]: the peripheral collaborator the controller drives
//! - [`signal`]: interrupt-to-main-loop flag and button debouncing

pub mod bits;
pub mod board;
pub mod controller;
pub mod selftest;
pub mod signal;

mod tests;

pub use bits::{count_set_bits, is_bit_set, swap, xor_swap, BitIndexError};
pub use board::Board;
pub use controller::{AppState, DemoController, Transition};
pub use signal::{Debouncer, SwitchFlag};
