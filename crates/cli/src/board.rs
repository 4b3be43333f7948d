use bitbench_config::BoardConfig;
use bitbench_core::{Board, SwitchFlag};
use std::fmt;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where button presses come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSource {
    /// Each line on stdin (Enter) is a press; EOF unplugs the button.
    Stdin,
    /// The runner raises the switch flag itself.
    Scripted,
}

/// Host stand-in for the evaluation board.
///
/// Console lines go to a transcript (and stdout unless disabled), the OLED is
/// a row buffer clipped to the configured character grid.
#[derive(Debug)]
pub struct HostBoard {
    config: BoardConfig,
    source: ButtonSource,
    echo_console: bool,
    transcript: Vec<String>,
    rows: Vec<String>,
    button: Option<&'static SwitchFlag>,
    button_closed: Arc<AtomicBool>,
}

impl HostBoard {
    pub fn new(config: BoardConfig, source: ButtonSource, echo_console: bool) -> Self {
        let rows = vec![String::new(); config.display.rows as usize];
        Self {
            config,
            source,
            echo_console,
            transcript: Vec::new(),
            rows,
            button: None,
            button_closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn display_rows(&self) -> &[String] {
        &self.rows
    }

    /// Press the button as the hardware would. No-op until a handler is registered.
    pub fn press(&self) {
        match self.button {
            Some(switch) => {
                debug!("Button {}: pressed", self.config.button.pin);
                switch.raise();
            }
            None => warn!("Button pressed before a handler was registered"),
        }
    }

    /// True once the stdin button source has hit EOF.
    pub fn button_closed(&self) -> bool {
        self.button_closed.load(Ordering::Acquire)
    }

    fn spawn_stdin_button(&self, switch: &'static SwitchFlag) {
        let debounce = Duration::from_millis(self.config.button.debounce_ms as u64);
        let closed = self.button_closed.clone();
        let pin = self.config.button.pin.clone();

        std::thread::spawn(move || {
            let stdin = io::stdin();
            let mut last_press: Option<Instant> = None;
            for line in stdin.lock().lines() {
                if line.is_err() {
                    break;
                }
                let now = Instant::now();
                if last_press.is_some_and(|t| now.duration_since(t) < debounce) {
                    debug!("Button {}: press within debounce window ignored", pin);
                    continue;
                }
                last_press = Some(now);
                debug!("Button {}: pressed", pin);
                switch.raise();
            }
            debug!("Button {}: input closed", pin);
            closed.store(true, Ordering::Release);
        });
    }
}

impl Board for HostBoard {
    fn init(&mut self) {
        info!("Board '{}' initialized", self.config.name);
        info!(
            "Console: {} baud, parity {:?}",
            self.config.console.baud_rate, self.config.console.parity
        );
        info!(
            "Display: {} rows x {} columns",
            self.config.display.rows, self.config.display.columns
        );
        info!(
            "Button: pin {}, debounce {} ms",
            self.config.button.pin, self.config.button.debounce_ms
        );
    }

    fn clear_display(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        debug!("Display cleared");
    }

    fn write_line(&mut self, row: u8, text: &str) {
        let Some(slot) = self.rows.get_mut(row as usize) else {
            warn!("Display write to row {} outside the panel ignored", row);
            return;
        };
        *slot = text.chars().take(self.config.display.columns).collect();
        info!("Display row {}: {:?}", row, slot);
    }

    fn print(&mut self, line: fmt::Arguments<'_>) {
        let line = line.to_string();
        if self.echo_console {
            println!("{}", line);
        }
        self.transcript.push(line);
    }

    fn register_button(&mut self, switch: &'static SwitchFlag) {
        self.button = Some(switch);
        if self.source == ButtonSource::Stdin {
            self.spawn_stdin_button(switch);
        }
    }

    fn sleep_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}
