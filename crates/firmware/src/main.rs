#![no_std]
#![no_main]

//! BitBench firmware for an STM32F103 "Blue Pill".
//!
//! - Console: USART1 on PA9/PA10, 115200 8N1
//! - Display: SSD1306 128x32 on I2C1 (PB6 SCL, PB7 SDA)
//! - Button: PA0 to GND, internal pull-up, sampled from SysTick at 1 kHz

mod board;
mod rng;

use bitbench_core::{Debouncer, DemoController, SwitchFlag};
use cortex_m_rt::{entry, exception};
use panic_halt as _;

static SWITCH: SwitchFlag = SwitchFlag::new(false);

#[entry]
fn main() -> ! {
    let mut board = board::BluePill::take();
    let mut controller = DemoController::new(&SWITCH, rng::TickSeededRng::new());
    controller.run(&mut board)
}

#[exception]
fn SysTick() {
    static mut BUTTON: Debouncer = Debouncer::new(board::DEBOUNCE_MS);

    board::tick();
    if BUTTON.sample(board::button_pressed()) {
        board::notify_button();
    }
}
