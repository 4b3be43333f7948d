use crate::board::HostBoard;
use bitbench_config::TestAssertion;
use bitbench_core::{AppState, DemoController, Transition};
use rand::RngCore;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

pub fn log_transition(transition: &Transition) {
    if transition.skipped_init {
        debug!("Init already done, stepping past it");
    }
    info!("State {} -> {}", transition.from, transition.to);
}

/// Performs `presses` transitions. The first one is the request pending at
/// startup, every further one is a simulated button press.
pub fn run_presses<R: RngCore>(
    controller: &mut DemoController<R>,
    board: &mut HostBoard,
    presses: u32,
    interval: Duration,
) -> Vec<Transition> {
    controller.start(board);

    let mut transitions = Vec::with_capacity(presses as usize);
    for n in 0..presses {
        if n > 0 {
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
            board.press();
        }

        let transition = loop {
            if let Some(t) = controller.poll(board) {
                break t;
            }
        };
        log_transition(&transition);
        transitions.push(transition);
    }
    transitions
}

/// Polls until the stdin button is closed and no request is left.
pub fn run_interactive<R: RngCore>(
    controller: &mut DemoController<R>,
    board: &mut HostBoard,
) -> usize {
    controller.start(board);
    info!("Press Enter to advance, Ctrl-D to quit");

    let mut handled = 0;
    loop {
        match controller.poll(board) {
            Some(transition) => {
                log_transition(&transition);
                handled += 1;
            }
            None if board.button_closed() && !controller.switch().is_raised() => break,
            None => {}
        }
    }
    handled
}

#[derive(Debug, Serialize)]
pub struct AssertionResult {
    pub assertion: String,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub struct TestResult {
    pub status: String,
    pub presses: u32,
    pub final_state: String,
    pub seed: Option<u64>,
    pub assertions: Vec<AssertionResult>,
    pub console: Vec<String>,
    pub display: Vec<String>,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status == "pass"
    }
}

pub fn evaluate(
    assertions: &[TestAssertion],
    board: &HostBoard,
    final_state: AppState,
) -> Vec<AssertionResult> {
    assertions
        .iter()
        .map(|assertion| match assertion {
            TestAssertion::ConsoleContains(a) => AssertionResult {
                assertion: format!("console_contains: {:?}", a.console_contains),
                passed: board
                    .transcript()
                    .iter()
                    .any(|line| line.contains(&a.console_contains)),
            },
            TestAssertion::DisplayContains(a) => AssertionResult {
                assertion: format!("display_contains: {:?}", a.display_contains),
                passed: board
                    .display_rows()
                    .iter()
                    .any(|row| row.contains(&a.display_contains)),
            },
            TestAssertion::ExpectedFinalState(a) => AssertionResult {
                assertion: format!(
                    "expected_final_state: {}",
                    a.expected_final_state.as_str()
                ),
                passed: a.expected_final_state.as_str() == final_state.name(),
            },
        })
        .collect()
}

pub fn build_result(
    presses: u32,
    seed: Option<u64>,
    final_state: AppState,
    assertions: Vec<AssertionResult>,
    board: &HostBoard,
) -> TestResult {
    let status = if assertions.iter().all(|a| a.passed) {
        "pass"
    } else {
        "fail"
    };
    TestResult {
        status: status.to_string(),
        presses,
        final_state: final_state.name().to_string(),
        seed,
        assertions,
        console: board.transcript().to_vec(),
        display: board.display_rows().to_vec(),
    }
}
