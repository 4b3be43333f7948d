use bitbench_core::{Board, SwitchFlag};
use core::fmt::{self, Write};
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicU32, Ordering};
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use ssd1306::mode::TerminalMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use stm32f1xx_hal::gpio::{Alternate, OpenDrain, PB6, PB7};
use stm32f1xx_hal::i2c::{BlockingI2c, DutyCycle, Mode};
use stm32f1xx_hal::serial::{Config, Serial, Tx};
use stm32f1xx_hal::{pac, prelude::*};

pub const DEBOUNCE_MS: u16 = 10;

const CONSOLE_BAUD: u32 = 115_200;
const SYSTICK_HZ: u32 = 1_000;

// GPIOA input data register; PA0 reads low while the button is held.
const GPIOA_IDR: *const u32 = 0x4001_0808 as *const u32;
const BUTTON_MASK: u32 = 1 << 0;

static TICKS: AtomicU32 = AtomicU32::new(0);
static BUTTON_TARGET: AtomicPtr<SwitchFlag> = AtomicPtr::new(ptr::null_mut());

type OledBus = BlockingI2c<pac::I2C1, (PB6<Alternate<OpenDrain>>, PB7<Alternate<OpenDrain>>)>;
type Oled = Ssd1306<I2CInterface<OledBus>, DisplaySize128x32, TerminalMode>;

pub struct BluePill {
    console: Tx<pac::USART1>,
    oled: Oled,
    syst: SYST,
    sysclk_hz: u32,
}

impl BluePill {
    /// Clock tree, pin muxing, USART1 and I2C1. Device-level bring-up
    /// happens in [`Board::init`].
    pub fn take() -> Self {
        let dp = pac::Peripherals::take().unwrap();
        let cp = cortex_m::Peripherals::take().unwrap();

        let mut flash = dp.FLASH.constrain();
        let rcc = dp.RCC.constrain();
        let clocks = rcc
            .cfgr
            .use_hse(8.MHz())
            .sysclk(72.MHz())
            .pclk1(36.MHz())
            .freeze(&mut flash.acr);

        let mut afio = dp.AFIO.constrain();
        let mut gpioa = dp.GPIOA.split();
        let mut gpiob = dp.GPIOB.split();

        // Sampled through GPIOA_IDR from the SysTick handler.
        let _button = gpioa.pa0.into_pull_up_input(&mut gpioa.crl);

        let tx = gpioa.pa9.into_alternate_push_pull(&mut gpioa.crh);
        let rx = gpioa.pa10;
        let serial = Serial::new(
            dp.USART1,
            (tx, rx),
            &mut afio.mapr,
            Config::default().baudrate(CONSOLE_BAUD.bps()).parity_none(),
            &clocks,
        );
        let (console, _rx) = serial.split();

        let scl = gpiob.pb6.into_alternate_open_drain(&mut gpiob.crl);
        let sda = gpiob.pb7.into_alternate_open_drain(&mut gpiob.crl);
        let i2c = BlockingI2c::i2c1(
            dp.I2C1,
            (scl, sda),
            &mut afio.mapr,
            Mode::Fast {
                frequency: 400.kHz(),
                duty_cycle: DutyCycle::Ratio2to1,
            },
            clocks,
            1000,
            10,
            1000,
            1000,
        );
        let oled = Ssd1306::new(
            I2CDisplayInterface::new(i2c),
            DisplaySize128x32,
            DisplayRotation::Rotate0,
        )
        .into_terminal_mode();

        Self {
            console,
            oled,
            syst: cp.SYST,
            sysclk_hz: clocks.sysclk().raw(),
        }
    }

    fn start_systick(&mut self) {
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(self.sysclk_hz / SYSTICK_HZ - 1);
        self.syst.clear_current();
        self.syst.enable_counter();
        self.syst.enable_interrupt();
    }
}

impl Board for BluePill {
    fn init(&mut self) {
        // A missing panel must not stop the console demo.
        if self.oled.init().is_err() {
            let _ = self.console.write_str("OLED init failed\r\n");
        }
        let _ = self.oled.clear();
        self.start_systick();
    }

    fn clear_display(&mut self) {
        let _ = self.oled.clear();
    }

    fn write_line(&mut self, row: u8, text: &str) {
        if self.oled.set_position(0, row).is_ok() {
            let _ = self.oled.write_str(text);
        }
    }

    fn print(&mut self, line: fmt::Arguments<'_>) {
        let _ = self.console.write_fmt(line);
        let _ = self.console.write_str("\r\n");
    }

    fn register_button(&mut self, switch: &'static SwitchFlag) {
        BUTTON_TARGET.store(switch as *const SwitchFlag as *mut SwitchFlag, Ordering::Release);
    }

    fn sleep_ms(&mut self, ms: u32) {
        let start = ticks();
        while ticks().wrapping_sub(start) < ms {
            cortex_m::asm::wfi();
        }
    }
}

pub fn ticks() -> u32 {
    TICKS.load(Ordering::Relaxed)
}

pub fn tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

pub fn button_pressed() -> bool {
    unsafe { ptr::read_volatile(GPIOA_IDR) & BUTTON_MASK == 0 }
}

/// Called from SysTick on a debounced press edge.
pub fn notify_button() {
    let target = BUTTON_TARGET.load(Ordering::Acquire);
    // Only ever set from a `&'static SwitchFlag`.
    if let Some(switch) = unsafe { target.as_ref() } {
        switch.raise();
    }
}
