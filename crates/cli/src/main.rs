mod board;
mod runner;

use anyhow::Context;
use bitbench_config::{BoardConfig, TestScript};
use bitbench_core::{DemoController, SwitchFlag};
use board::{ButtonSource, HostBoard};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "BitBench host simulator", long_about = None)]
struct Args {
    /// Path to the board description (YAML)
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// Simulate this many button presses instead of reading Enter from stdin
    #[arg(short, long, conflicts_with = "script")]
    presses: Option<u32>,

    /// Delay between simulated presses in milliseconds
    #[arg(long, default_value = "0")]
    press_interval_ms: u64,

    /// Seed for the self-test sample generator (default: entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Run a YAML test script and evaluate its assertions
    #[arg(long)]
    script: Option<PathBuf>,

    /// Directory to write result.json to (script mode)
    #[arg(long, requires = "script")]
    output_dir: Option<PathBuf>,

    /// Do not echo console lines to stdout
    #[arg(long)]
    no_console_stdout: bool,

    /// Enable debug logging
    #[arg(short, long)]
    trace: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the console.
    tracing_subscriber::fmt()
        .with_max_level(if args.trace {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    info!("Starting BitBench");

    if let Some(script_path) = args.script.clone() {
        return run_script(&args, &script_path);
    }

    let config = load_board(args.board.as_deref())?;
    let idle_ms = config.idle_poll_ms;
    let source = if args.presses.is_some() {
        ButtonSource::Scripted
    } else {
        ButtonSource::Stdin
    };
    let mut board = HostBoard::new(config, source, !args.no_console_stdout);
    let mut controller =
        DemoController::new(switch_flag(), make_rng(args.seed)).with_idle_ms(idle_ms);

    match args.presses {
        Some(presses) => {
            let transitions = runner::run_presses(
                &mut controller,
                &mut board,
                presses,
                Duration::from_millis(args.press_interval_ms),
            );
            info!("Handled {} transitions", transitions.len());
        }
        None => {
            let handled = runner::run_interactive(&mut controller, &mut board);
            info!("Button input closed after {} transitions", handled);
        }
    }
    info!("Final state: {}", controller.state());

    Ok(())
}

fn run_script(args: &Args, script_path: &Path) -> anyhow::Result<()> {
    info!("Loading test script: {:?}", script_path);
    let script = TestScript::from_file(script_path)?;

    // Board paths in scripts are relative to the script itself.
    let board_path = match (&args.board, &script.inputs.board) {
        (Some(cli), _) => Some(cli.clone()),
        (None, Some(rel)) => Some(
            script_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(rel),
        ),
        (None, None) => None,
    };
    let config = load_board(board_path.as_deref())?;
    let idle_ms = config.idle_poll_ms;

    let seed = args.seed.or(script.inputs.seed);
    let mut board = HostBoard::new(config, ButtonSource::Scripted, !args.no_console_stdout);
    let mut controller =
        DemoController::new(switch_flag(), make_rng(seed)).with_idle_ms(idle_ms);

    runner::run_presses(
        &mut controller,
        &mut board,
        script.limits.presses,
        Duration::from_millis(args.press_interval_ms),
    );

    let assertions = runner::evaluate(&script.assertions, &board, controller.state());
    let result = runner::build_result(
        script.limits.presses,
        seed,
        controller.state(),
        assertions,
        &board,
    );

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        let result_path = dir.join("result.json");
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&result_path, json)
            .with_context(|| format!("Failed to write {:?}", result_path))?;
        info!("Wrote {:?}", result_path);
    }

    for a in &result.assertions {
        info!("[{}] {}", if a.passed { "PASS" } else { "FAIL" }, a.assertion);
    }

    if !result.passed() {
        let failed = result.assertions.iter().filter(|a| !a.passed).count();
        anyhow::bail!("{} assertion(s) failed", failed);
    }
    Ok(())
}

fn load_board(path: Option<&Path>) -> anyhow::Result<BoardConfig> {
    match path {
        Some(path) => {
            info!("Loading board description: {:?}", path);
            BoardConfig::from_file(path)
        }
        None => {
            info!("Using default board description");
            Ok(BoardConfig::default())
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// The flag outlives every context that touches it, like its firmware counterpart.
fn switch_flag() -> &'static SwitchFlag {
    Box::leak(Box::new(SwitchFlag::default()))
}
