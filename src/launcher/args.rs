//! Job argument parsing
//!
//! Options are matched token by token with the same glob-style forms the
//! cluster scripts have always accepted (`-e=VALUE`, `--dset_name=VALUE`, ...).
//! Tokens that do not start with `-` are skipped.

use super::{LaunchError, Result};

/// Values collected from the job command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobArgs {
    pub dataset_name: String,
    pub corpus_name: String,
    pub gradients: String,
}

impl JobArgs {
    pub fn parse<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = JobArgs::default();

        for token in tokens {
            let token = token.as_ref();

            if has_any_prefix(token, &["-e=", "--dset_name="]) {
                args.dataset_name = value_after_eq(token).to_string();
            } else if has_any_prefix(token, &["-s=", "--corpus_name="]) {
                args.corpus_name = value_after_eq(token).to_string();
            } else if token == "--gradients" {
                // No `=` in this form, so the whole token is captured.
                args.gradients = value_after_eq(token).to_string();
            } else if token.starts_with('-') {
                return Err(LaunchError::UnknownOption(token.to_string()));
            }
        }

        Ok(args)
    }
}

fn has_any_prefix(token: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| token.starts_with(p))
}

/// Strip the shortest prefix ending in `=`; the token is returned unchanged
/// when it has no `=`.
fn value_after_eq(token: &str) -> &str {
    match token.find('=') {
        Some(idx) => &token[idx + 1..],
        None => token,
    }
}
