use core::sync::atomic::{AtomicBool, Ordering};

/// Single-producer, single-consumer "switch requested" flag.
///
/// The button handler raises it, the main loop clears it once the request
/// has been handled. Only plain loads and stores are used, so the flag also
/// works on cores without compare-and-swap.
#[derive(Debug)]
pub struct SwitchFlag {
    requested: AtomicBool,
}

impl SwitchFlag {
    pub const fn new(requested: bool) -> Self {
        Self {
            requested: AtomicBool::new(requested),
        }
    }

    pub fn raise(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

impl Default for SwitchFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Counter-based button debouncer fed one sample per millisecond.
///
/// A new level is accepted once it has been observed for `threshold`
/// consecutive samples. [`Debouncer::sample`] reports only the released to
/// pressed edge.
#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: u16,
    pending: u16,
    pressed: bool,
}

impl Debouncer {
    pub const fn new(threshold_ms: u16) -> Self {
        Self {
            threshold: if threshold_ms == 0 { 1 } else { threshold_ms },
            pending: 0,
            pressed: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed the raw pin level. Returns `true` exactly once per debounced press.
    pub fn sample(&mut self, raw_pressed: bool) -> bool {
        if raw_pressed == self.pressed {
            self.pending = 0;
            return false;
        }

        self.pending = self.pending.saturating_add(1);
        if self.pending < self.threshold {
            return false;
        }

        self.pressed = raw_pressed;
        self.pending = 0;
        raw_pressed
    }
}
