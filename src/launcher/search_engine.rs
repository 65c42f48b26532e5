//! Local Elasticsearch bootstrap

use super::config::LauncherConfig;
use super::process::{CommandSpec, ProcessRunner};
use log::{info, warn};

pub fn command(config: &LauncherConfig) -> CommandSpec {
    CommandSpec::new(config.search_engine.program.as_str())
        .args(config.search_engine.args.iter().cloned())
        .working_dir(config.working_dir.clone())
}

/// Start the search engine in the background unless the training process
/// owns it (`setup_with_model`). Returns whether a spawn was issued.
///
/// There is no readiness check; a failed spawn is only logged.
pub fn bootstrap(runner: &mut dyn ProcessRunner, config: &LauncherConfig) -> bool {
    if config.setup_with_model {
        info!(
            "setup_with_model=true, leaving {} to the training process",
            config.search_engine.program
        );
        return false;
    }

    let cmd = command(config);
    if let Err(e) = runner.spawn_detached(&cmd) {
        warn!("{}", e);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::{LaunchError, Result};

    #[derive(Default)]
    struct Recorder {
        spawned: Vec<CommandSpec>,
        fail: bool,
    }

    impl ProcessRunner for Recorder {
        fn spawn_detached(&mut self, spec: &CommandSpec) -> Result<()> {
            self.spawned.push(spec.clone());
            if self.fail {
                return Err(LaunchError::Spawn {
                    program: spec.program.clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Ok(())
        }

        fn run(&mut self, _spec: &CommandSpec) -> Result<i32> {
            panic!("search engine must not be run in the foreground");
        }
    }

    #[test]
    fn test_starts_in_background_by_default() {
        let mut runner = Recorder::default();
        assert!(bootstrap(&mut runner, &LauncherConfig::default()));
        assert_eq!(runner.spawned.len(), 1);
        assert_eq!(runner.spawned[0].command_line(), "elasticsearch -q");
    }

    #[test]
    fn test_skipped_when_model_sets_up() {
        let mut runner = Recorder::default();
        let config = LauncherConfig {
            setup_with_model: true,
            ..Default::default()
        };
        assert!(!bootstrap(&mut runner, &config));
        assert!(runner.spawned.is_empty());
    }

    #[test]
    fn test_spawn_failure_is_not_fatal() {
        let mut runner = Recorder {
            fail: true,
            ..Default::default()
        };
        assert!(bootstrap(&mut runner, &LauncherConfig::default()));
    }
}
