use crate::signal::SwitchFlag;
use core::fmt;

/// Peripheral collaborator the demo runs against.
///
/// The firmware implements this over memory-mapped registers, the host
/// simulator over stdout and an in-memory display.
pub trait Board {
    /// Bring up clocks, console, display and button input.
    fn init(&mut self);

    fn clear_display(&mut self);

    /// Write `text` at column 0 of display row `row`.
    fn write_line(&mut self, row: u8, text: &str);

    /// Emit one console line. Implementations append the line terminator.
    fn print(&mut self, line: fmt::Arguments<'_>);

    /// Route debounced button presses to `switch`.
    fn register_button(&mut self, switch: &'static SwitchFlag);

    fn sleep_ms(&mut self, ms: u32);
}
