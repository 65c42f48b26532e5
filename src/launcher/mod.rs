//! SLURM job launcher for the OpenQA training entry point
//!
//! The flow is strictly linear: parse the job arguments, print diagnostics,
//! optionally bring up a local Elasticsearch daemon, then run `run.py` in the
//! foreground and hand its exit status back to the scheduler.

pub mod args;
pub mod config;
pub mod diagnostics;
pub mod process;
pub mod search_engine;
pub mod training;

pub use args::JobArgs;
pub use config::{load_config, LauncherConfig, ToolConfig, TrainingConfig};
pub use diagnostics::{HostEnv, SystemEnv};
pub use process::{CommandSpec, DryRunRunner, ProcessRunner, SystemRunner};

use std::io::Write;

/// Error type for launcher operations
#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    #[error("Unknown option {0}")]
    UnknownOption(String),
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LaunchError>;

/// Run a full launch with already-parsed job arguments.
///
/// Returns the exit code of the training process.
pub fn launch<W: Write>(
    out: &mut W,
    runner: &mut dyn ProcessRunner,
    env: &dyn HostEnv,
    args: &JobArgs,
    config: &LauncherConfig,
) -> std::io::Result<i32> {
    diagnostics::report(out, runner, args, config, env)?;
    out.flush()?;

    search_engine::bootstrap(runner, config);

    let command = training::build_command(args, config);
    Ok(training::run(runner, &command))
}
