use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
    Mark,
    Space,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default)]
    pub parity: Parity,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            parity: Parity::None,
        }
    }
}

/// Character-cell view of the OLED (128x32 panel, 6x8 font).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default = "default_rows")]
    pub rows: u8,
    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            columns: default_columns(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ButtonConfig {
    #[serde(default = "default_button_pin")]
    pub pin: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u16,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            pin: default_button_pin(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Board description consumed by the host simulator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    #[serde(default = "default_board_name")]
    pub name: String,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub button: ButtonConfig,
    #[serde(default = "default_idle_poll_ms")]
    pub idle_poll_ms: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            console: ConsoleConfig::default(),
            display: DisplayConfig::default(),
            button: ButtonConfig::default(),
            idle_poll_ms: default_idle_poll_ms(),
        }
    }
}

fn default_board_name() -> String {
    "stm32f103-bitbench".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_rows() -> u8 {
    4
}

fn default_columns() -> usize {
    21
}

fn default_button_pin() -> String {
    "PA0".to_string()
}

fn default_debounce_ms() -> u16 {
    10
}

fn default_idle_poll_ms() -> u32 {
    10
}

impl BoardConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open board description at {:?}", path.as_ref()))?;
        let board: Self =
            serde_yaml::from_reader(f).context("Failed to parse Board Description")?;
        board.validate()?;
        Ok(board)
    }

    pub fn validate(&self) -> Result<()> {
        if self.console.baud_rate == 0 {
            anyhow::bail!("Console 'baud_rate' must be greater than zero");
        }

        // The startup banner occupies two rows.
        if self.display.rows < 2 {
            anyhow::bail!(
                "Display needs at least 2 rows, got {}",
                self.display.rows
            );
        }

        if self.display.columns == 0 {
            anyhow::bail!("Display 'columns' must be greater than zero");
        }

        if self.idle_poll_ms == 0 {
            anyhow::bail!("'idle_poll_ms' must be greater than zero");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TestInputs {
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestLimits {
    /// Button presses to simulate, counting the forced startup transition.
    pub presses: u32,
}

/// Demo states as named in scripts; mirrors `bitbench_core::AppState`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedState {
    Init,
    SwapTest,
    CountBitsTest,
    CheckBitTest,
}

impl ExpectedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedState::Init => "init",
            ExpectedState::SwapTest => "swap_test",
            ExpectedState::CountBitsTest => "count_bits_test",
            ExpectedState::CheckBitTest => "check_bit_test",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConsoleContainsAssertion {
    pub console_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DisplayContainsAssertion {
    pub display_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FinalStateAssertion {
    pub expected_final_state: ExpectedState,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum TestAssertion {
    ConsoleContains(ConsoleContainsAssertion),
    DisplayContains(DisplayContainsAssertion),
    ExpectedFinalState(FinalStateAssertion),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestScript {
    pub schema_version: String,
    #[serde(default)]
    pub inputs: TestInputs,
    pub limits: TestLimits,
    #[serde(default)]
    pub assertions: Vec<TestAssertion>,
}

impl TestScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open test script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Test Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.limits.presses == 0 {
            anyhow::bail!("Limit 'presses' must be greater than zero");
        }

        if let Some(board) = &self.inputs.board {
            if board.trim().is_empty() {
                anyhow::bail!("Input 'board' path cannot be empty");
            }
        }

        Ok(())
    }
}
