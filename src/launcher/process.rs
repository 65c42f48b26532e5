//! Child process handling

use super::{LaunchError, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

/// A program invocation, independent of how it gets executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Render as a copy-pasteable shell command line
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| shell_quote(s))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> LaunchError {
        LaunchError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || "-_./=+:,@%".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Executes launcher child processes
pub trait ProcessRunner {
    /// Start a process in the background and return without waiting on it
    fn spawn_detached(&mut self, spec: &CommandSpec) -> Result<()>;

    /// Run a process in the foreground and return its exit code
    fn run(&mut self, spec: &CommandSpec) -> Result<i32>;
}

/// Runs commands for real, inheriting stdout and stderr
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn spawn_detached(&mut self, spec: &CommandSpec) -> Result<()> {
        debug!("Spawning in background: {}", spec.command_line());
        let child = spec
            .to_command()
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| spec.spawn_error(e))?;
        info!("Started {} (pid {})", spec.program, child.id());
        // Dropping the handle leaves the child running
        Ok(())
    }

    fn run(&mut self, spec: &CommandSpec) -> Result<i32> {
        debug!("Running: {}", spec.command_line());
        let status = spec
            .to_command()
            .status()
            .map_err(|e| spec.spawn_error(e))?;
        Ok(exit_code(status))
    }
}

/// Map an exit status to a shell-style exit code (`128 + signal` when killed)
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Prints what would be executed and runs nothing
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl ProcessRunner for DryRunRunner {
    fn spawn_detached(&mut self, spec: &CommandSpec) -> Result<()> {
        println!("[dry-run] {} &", spec.command_line());
        Ok(())
    }

    fn run(&mut self, spec: &CommandSpec) -> Result<i32> {
        println!("[dry-run] {}", spec.command_line());
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_command_line_quoting() {
        let spec = CommandSpec::new("python")
            .arg("run.py")
            .arg("datamodule.dset_name=")
            .arg("model/module/gradients=--gradients")
            .arg("two words")
            .arg("")
            .arg("it's");
        assert_eq!(
            spec.command_line(),
            concat!(
                "python run.py datamodule.dset_name= model/module/gradients=--gradients ",
                "'two words' '' 'it'\\''s'"
            )
        );
    }

    #[test]
    fn test_builder_collects_args() {
        let spec = CommandSpec::new("elasticsearch")
            .args(["-q"])
            .working_dir(Some(PathBuf::from("/tmp")));
        assert_eq!(spec.args, vec!["-q".to_string()]);
        assert_eq!(spec.working_dir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let spec = CommandSpec::new("definitely-not-a-real-binary-7f3a");
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(
            err,
            LaunchError::Spawn { ref program, .. } if program == "definitely-not-a-real-binary-7f3a"
        ));

        assert!(SystemRunner.spawn_detached(&spec).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_propagates_exit_code() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        assert_eq!(SystemRunner.run(&spec).unwrap(), 3);

        let spec = CommandSpec::new("sh").args(["-c", "kill -TERM $$"]);
        assert_eq!(SystemRunner.run(&spec).unwrap(), 128 + 15);
    }

    #[cfg(unix)]
    #[test]
    fn test_background_spawn_does_not_wait() {
        let start = Instant::now();
        let result = SystemRunner.spawn_detached(&CommandSpec::new("sleep").arg("5"));
        let elapsed = start.elapsed();

        assert!(result.is_ok());
        assert!(elapsed < Duration::from_millis(500), "spawn took {:?}", elapsed);
    }

    #[test]
    fn test_dry_run_reports_success() {
        let spec = CommandSpec::new("python").arg("run.py");
        assert_eq!(DryRunRunner.run(&spec).unwrap(), 0);
        assert!(DryRunRunner.spawn_detached(&spec).is_ok());
    }
}
