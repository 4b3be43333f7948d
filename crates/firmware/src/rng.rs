use cortex_m::peripheral::SYST;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Sample generator seeded on first use from the tick counter.
///
/// The first draw happens after the operator has pressed the button a few
/// times, so the seed carries the timing of those presses.
pub struct TickSeededRng {
    inner: Option<SmallRng>,
}

impl TickSeededRng {
    pub const fn new() -> Self {
        Self { inner: None }
    }

    fn rng(&mut self) -> &mut SmallRng {
        self.inner.get_or_insert_with(|| {
            let seed = ((crate::board::ticks() as u64) << 32) | SYST::get_current() as u64;
            SmallRng::seed_from_u64(seed)
        })
    }
}

impl RngCore for TickSeededRng {
    fn next_u32(&mut self) -> u32 {
        self.rng().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng().try_fill_bytes(dest)
    }
}
