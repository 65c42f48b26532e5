pub mod launcher;

// Re-export common types
pub use launcher::{launch, load_config, JobArgs, LaunchError, LauncherConfig};

pub mod logging {
    use env_logger::{Builder, Env};
    use std::io::Write;

    /// Timestamped logger on stderr, `info` unless `RUST_LOG` says otherwise
    pub fn init_logger() {
        Builder::from_env(Env::default().default_filter_or("info"))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] - {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                )
            })
            .init();
    }
}
