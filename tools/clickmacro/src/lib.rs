pub mod config;
pub mod errors;
pub mod hotkeys;
pub mod log_retention;
pub mod logging;
pub mod menu;
pub mod playback;
pub mod raw_mode;
pub mod recorder;
pub mod runtime;
pub mod sequence_store;
pub mod types;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use config::{load_config, AppConfig, CliOverrides};
use errors::MacroError;
use logging::{append_run_log, init_run_logger};
use menu::{MenuController, SessionSettings};
use raw_mode::RawModeGuard;
use runtime::{ProductionFileSystem, ProductionRuntime};
use serde_json::json;
use types::MouseBackend;

#[derive(Debug, Clone, Parser)]
#[command(name = "clickmacro", version)]
#[command(about = "Record mouse positions from the terminal and replay them as clicks")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    #[arg(long)]
    pub data_file: Option<std::path::PathBuf>,
    #[arg(long)]
    pub run_delay_ms: Option<u64>,
    #[arg(long)]
    pub test_delay_ms: Option<u64>,
    #[arg(long, value_enum)]
    pub mouse: Option<CliMouse>,
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliMouse {
    Enigo,
    Virtual,
}

impl From<CliMouse> for MouseBackend {
    fn from(value: CliMouse) -> Self {
        match value {
            CliMouse::Enigo => MouseBackend::Enigo,
            CliMouse::Virtual => MouseBackend::Virtual,
        }
    }
}

pub fn run() -> Result<i32, MacroError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| MacroError::Io(e.to_string()))?;
    run_with_args(&args, &cwd)
}

pub fn run_with_args(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
) -> Result<i32, MacroError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(MacroError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        data_file: cli.data_file.clone(),
        run_delay_ms: cli.run_delay_ms,
        test_delay_ms: cli.test_delay_ms,
        mouse_backend: cli.mouse.map(Into::into),
        log_file: cli.log_file.clone(),
    };
    let cfg = load_config(&overrides, cwd, &ProductionFileSystem)?;
    init_run_logger(cfg.run_logger());

    let runtime = ProductionRuntime::new(cfg.mouse.backend)?;
    run_session(&cfg, &runtime)
}

/// Runs the interactive session on `runtime`: raw mode, load, menu loop,
/// save. Raw mode is released on every return path.
pub fn run_session(cfg: &AppConfig, runtime: &ProductionRuntime) -> Result<i32, MacroError> {
    let _raw_mode = RawModeGuard::acquire(runtime.terminal.as_ref())?;
    append_run_log(
        "info",
        "session.started",
        json!({
            "data_file": cfg.storage.data_file.display().to_string(),
            "mouse": cfg.mouse.backend.as_str(),
            "run_delay_ms": cfg.playback.run_delay_ms,
            "test_delay_ms": cfg.playback.test_delay_ms,
            "tty": runtime.terminal.stdin_is_tty()
        }),
    );

    let mut controller = MenuController::new(
        runtime,
        SessionSettings {
            data_file: cfg.storage.data_file.clone(),
            run_delay: cfg.run_delay(),
            test_delay: cfg.test_delay(),
        },
    );
    controller.init()?;
    controller.run_until_exit()?;

    append_run_log(
        "info",
        "session.finished",
        json!({ "points": controller.sequence().len() }),
    );
    Ok(0)
}

pub fn render_help() -> String {
    let mut cmd = Cli::command();
    cmd.render_long_help().to_string()
}
