// CLI subcommands
//
// - auth: login, register, logout, forgot-password
// - pages: status, open, dashboard, generate, home

pub mod auth;
pub mod pages;

use std::fmt;

use idgen_core::{ClientConfig, Notice, SessionStore};

use crate::output::{print_notice, OutputFormat};

/// Everything a command needs
pub struct Context {
    pub config: ClientConfig,
    pub store: SessionStore,
    pub output: OutputFormat,
    pub quiet: bool,
}

/// Failure that has already been shown to the user. `main` exits non-zero
/// without printing it again.
#[derive(Debug)]
pub struct AlreadyReported;

impl fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failure already reported")
    }
}

impl std::error::Error for AlreadyReported {}

/// Show an error notice in the selected output format and return the error
/// the command should fail with
pub fn fail_with_notice(ctx: &Context, notice: &Notice) -> anyhow::Error {
    if ctx.output.is_text() {
        print_notice(notice);
    } else if let Err(err) = ctx.output.print_value(notice) {
        return err;
    }
    AlreadyReported.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(output: &str) -> Context {
        Context {
            config: ClientConfig::default(),
            store: SessionStore::in_memory(),
            output: OutputFormat::from_str(output),
            quiet: false,
        }
    }

    #[test]
    fn test_failure_notice_is_reported_once() {
        let notice = Notice::Error("Unable to connect to server. Please try again later.".to_string());
        for output in ["text", "json", "yaml"] {
            let err = fail_with_notice(&context(output), &notice);
            assert!(err.is::<AlreadyReported>(), "{output}");
        }
    }
}
