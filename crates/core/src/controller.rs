use crate::selftest;
use crate::signal::SwitchFlag;
use crate::Board;
use core::fmt;
use rand_core::RngCore;

pub const OPERATOR_NAME: &str = "Roopak Ingole";
pub const ORGANIZATION_NAME: &str = "Atmel Corp.";

/// Idle delay between polls when no switch is pending.
pub const DEFAULT_IDLE_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AppState {
    Init = 0,
    SwapTest = 1,
    CountBitsTest = 2,
    CheckBitTest = 3,
}

impl AppState {
    pub const COUNT: u8 = 4;

    pub const fn from_index(index: u8) -> Self {
        match index % Self::COUNT {
            0 => AppState::Init,
            1 => AppState::SwapTest,
            2 => AppState::CountBitsTest,
            _ => AppState::CheckBitTest,
        }
    }

    /// Round-robin successor, wrapping from the last state to `Init`.
    pub const fn next(self) -> Self {
        Self::from_index(self as u8 + 1)
    }

    pub const fn name(self) -> &'static str {
        match self {
            AppState::Init => "init",
            AppState::SwapTest => "swap_test",
            AppState::CountBitsTest => "count_bits_test",
            AppState::CheckBitTest => "check_bit_test",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One handled switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AppState,
    pub to: AppState,
    /// `Init` was reached but already done, so the controller stepped past it.
    pub skipped_init: bool,
}

/// Button-driven round-robin over the demo states.
///
/// The controller is the only writer of the current state and the init
/// latch. The shared [`SwitchFlag`] is raised by the button handler and
/// cleared here after each handled request.
pub struct DemoController<R> {
    current_state: AppState,
    init_done: bool,
    switch: &'static SwitchFlag,
    rng: R,
    idle_ms: u32,
}

impl<R: RngCore> DemoController<R> {
    /// Starts parked on the last state with a request pending, so the first
    /// poll lands on `Init`.
    pub fn new(switch: &'static SwitchFlag, rng: R) -> Self {
        switch.raise();
        Self {
            current_state: AppState::CheckBitTest,
            init_done: false,
            switch,
            rng,
            idle_ms: DEFAULT_IDLE_MS,
        }
    }

    pub fn with_idle_ms(mut self, idle_ms: u32) -> Self {
        self.idle_ms = idle_ms;
        self
    }

    pub fn state(&self) -> AppState {
        self.current_state
    }

    pub fn init_done(&self) -> bool {
        self.init_done
    }

    pub fn switch(&self) -> &'static SwitchFlag {
        self.switch
    }

    /// Initializes the board and attaches the button to the switch flag.
    pub fn start<B: Board>(&self, board: &mut B) {
        board.init();
        board.register_button(self.switch);
    }

    /// One main-loop tick. Handles a pending switch request, or sleeps for
    /// the idle interval when there is none.
    pub fn poll<B: Board>(&mut self, board: &mut B) -> Option<Transition> {
        if !self.switch.is_raised() {
            board.sleep_ms(self.idle_ms);
            return None;
        }

        let transition = self.advance();
        self.dispatch(board);
        self.switch.clear();
        Some(transition)
    }

    pub fn run<B: Board>(&mut self, board: &mut B) -> ! {
        self.start(board);
        loop {
            self.poll(board);
        }
    }

    fn advance(&mut self) -> Transition {
        let from = self.current_state;
        let mut to = from.next();
        let skipped_init = to == AppState::Init && self.init_done;
        if skipped_init {
            to = to.next();
        }
        self.current_state = to;
        Transition {
            from,
            to,
            skipped_init,
        }
    }

    fn dispatch<B: Board>(&mut self, board: &mut B) {
        match self.current_state {
            AppState::Init => {
                show_identity(board);
                self.init_done = true;
            }
            AppState::SwapTest => selftest::swap_test(board),
            AppState::CountBitsTest => selftest::count_bits_test(board, &mut self.rng),
            AppState::CheckBitTest => selftest::check_bit_test(board, &mut self.rng),
        }
    }
}

fn show_identity<B: Board>(board: &mut B) {
    board.clear_display();
    board.write_line(0, OPERATOR_NAME);
    board.print(format_args!("{}", OPERATOR_NAME));
    board.write_line(1, ORGANIZATION_NAME);
    board.print(format_args!("{}", ORGANIZATION_NAME));
}
