//! Training entry point invocation
//!
//! The override list is the launcher's whole contract with `run.py`.

use super::config::LauncherConfig;
use super::process::{CommandSpec, ProcessRunner};
use super::JobArgs;
use log::{error, info};

/// Exit code used when the training process cannot be started at all
pub const EXIT_SPAWN_FAILED: i32 = 127;

/// Hydra overrides passed to the training script, in order
pub fn overrides(args: &JobArgs, config: &LauncherConfig) -> Vec<String> {
    let train = &config.training;
    let mut overrides = Vec::new();

    if let Some(experiment) = &train.experiment {
        overrides.push(format!("+experiment={}", experiment));
    }
    overrides.push(format!("datamodule.dset_name={}", args.dataset_name));
    // The corpus is written to the same key as the dataset and wins
    overrides.push(format!("datamodule.dset_name={}", args.corpus_name));
    overrides.push(format!("datamodule.train_batch_size={}", train.train_batch_size));
    overrides.push(format!("datamodule.eval_batch_size={}", train.eval_batch_size));
    overrides.push(format!("trainer.precision={}", train.precision));
    overrides.push(format!("datamodule.num_workers={}", train.num_workers));
    overrides.push(format!("model/module/gradients={}", args.gradients));
    overrides.push(format!("+setup_with_model={}", config.setup_with_model));
    overrides.push(format!("+kill_es={}", config.kill_es()));
    overrides.extend(train.extra_overrides.iter().cloned());

    overrides
}

pub fn build_command(args: &JobArgs, config: &LauncherConfig) -> CommandSpec {
    CommandSpec::new(config.training.python.as_str())
        .arg(config.training.script.as_str())
        .args(overrides(args, config))
        .working_dir(config.working_dir.clone())
}

/// Run training in the foreground and return the code the launcher exits with
pub fn run(runner: &mut dyn ProcessRunner, command: &CommandSpec) -> i32 {
    info!("Launching training: {}", command.command_line());
    match runner.run(command) {
        Ok(code) => {
            info!("Training exited with status {}", code);
            code
        }
        Err(e) => {
            error!("{}", e);
            EXIT_SPAWN_FAILED
        }
    }
}
