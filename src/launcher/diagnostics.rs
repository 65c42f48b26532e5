//! Job diagnostics printed at the top of every SLURM log

use super::config::LauncherConfig;
use super::process::{CommandSpec, ProcessRunner};
use super::JobArgs;
use log::warn;
use std::fs;
use std::io::{self, Write};

const BORDER: &str = "=================================";

/// Source of host and environment information
pub trait HostEnv {
    fn var(&self, key: &str) -> Option<String>;
    fn hostname(&self) -> String;
}

/// Reads from the real process environment
#[derive(Debug, Default)]
pub struct SystemEnv;

impl HostEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn hostname(&self) -> String {
        if let Some(name) = self.var("HOSTNAME").filter(|n| !n.is_empty()) {
            return name;
        }
        fs::read_to_string("/etc/hostname")
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Write the parsed values and host details to `out`
pub fn write_summary<W: Write>(out: &mut W, args: &JobArgs, env: &dyn HostEnv) -> io::Result<()> {
    writeln!(out, "{}", BORDER)?;
    writeln!(out, "DSET_NAME    = {}", args.dataset_name)?;
    writeln!(out, "CORPUS_NAME  = {}", args.corpus_name)?;
    writeln!(out, "GRADIENTS    = {}", args.gradients)?;
    writeln!(out, "{}", BORDER)?;
    writeln!(out, "{}", env.hostname())?;
    if let Some(job_id) = env.var("SLURM_JOB_ID") {
        writeln!(out, "SLURM_JOB_ID = {}", job_id)?;
    }
    writeln!(
        out,
        "CUDA_VISIBLE_DEVICES = {}",
        env.var("CUDA_VISIBLE_DEVICES").unwrap_or_default()
    )?;
    Ok(())
}

/// Print the summary, then let the GPU status tool report on the devices.
///
/// The tool's outcome never aborts the launch.
pub fn report<W: Write>(
    out: &mut W,
    runner: &mut dyn ProcessRunner,
    args: &JobArgs,
    config: &LauncherConfig,
    env: &dyn HostEnv,
) -> io::Result<()> {
    write_summary(out, args, env)?;
    // The tool writes to our stdout directly
    out.flush()?;

    let tool = CommandSpec::new(config.gpu_status.program.as_str())
        .args(config.gpu_status.args.iter().cloned())
        .working_dir(config.working_dir.clone());

    match runner.run(&tool) {
        Ok(0) => {}
        Ok(code) => warn!("{} exited with status {}", tool.program, code),
        Err(e) => warn!("{}", e),
    }
    Ok(())
}
