//! SLURM job launcher
//!
//! Usage: slurm_launch [--launcher-config FILE] [--dry-run] [-e=DSET] [-s=CORPUS] [--gradients]

use anyhow::Result;
use clap::Parser;
use log::info;
use openqa_launcher::launcher::{DryRunRunner, ProcessRunner, SystemEnv, SystemRunner};
use openqa_launcher::{launch, load_config, JobArgs, LaunchError, LauncherConfig};
use std::io;
use std::path::PathBuf;

/// Launcher-level options. Everything after them is a job token.
#[derive(Parser, Debug)]
#[command(
    name = "slurm_launch",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// YAML file overriding the launcher defaults
    #[arg(long)]
    launcher_config: Option<PathBuf>,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,
}

/// Split argv into the launcher prefix (program name included) and the job
/// tokens. Each launcher option is taken at most once; the first token that
/// is not one ends the prefix, so `--`, `-h` and repeats reach the job parser.
fn split_argv(argv: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut tokens = argv.into_iter();
    let mut prefix: Vec<String> = tokens.next().into_iter().collect();
    let mut seen_config = false;
    let mut seen_dry_run = false;

    let mut rest: Vec<String> = Vec::new();
    while let Some(token) = tokens.next() {
        if token == "--dry-run" && !seen_dry_run {
            seen_dry_run = true;
            prefix.push(token);
        } else if token.starts_with("--launcher-config=") && !seen_config {
            seen_config = true;
            prefix.push(token);
        } else if token == "--launcher-config" && !seen_config {
            seen_config = true;
            prefix.push(token);
            prefix.extend(tokens.next());
        } else {
            rest.push(token);
            break;
        }
    }
    rest.extend(tokens);

    (prefix, rest)
}

fn main() -> Result<()> {
    let (launcher_argv, job_tokens) = split_argv(std::env::args().collect());

    let args = match Args::try_parse_from(&launcher_argv) {
        Ok(args) => args,
        Err(e) => {
            println!("{}", e);
            std::process::exit(1);
        }
    };

    openqa_launcher::logging::init_logger();

    let job = match JobArgs::parse(&job_tokens) {
        Ok(job) => job,
        Err(e @ LaunchError::UnknownOption(_)) => {
            println!("{}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let config = match &args.launcher_config {
        Some(path) => {
            info!("Loading launcher config: {}", path.display());
            load_config(path)?
        }
        None => LauncherConfig::default(),
    };

    let mut runner: Box<dyn ProcessRunner> = if args.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(SystemRunner)
    };

    let stdout = io::stdout();
    let code = launch(&mut stdout.lock(), runner.as_mut(), &SystemEnv, &job, &config)?;

    std::process::exit(code);
}
