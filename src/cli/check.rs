use std::process;

use clap::Parser;
use fieldbind::{Validator, Value};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Check text values against a list of validation rules")]
pub struct Check {
    /// Comma-separated rules, e.g. "length=5-10,int"
    #[arg(long, short)]
    rules: String,

    /// The values to check
    #[arg(required = true)]
    values: Vec<String>,

    /// Suppress all output; the exit status reports the result
    #[arg(long, short)]
    quiet: bool,
}

impl Check {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let validator = Validator::parse(&self.rules)?;
        tracing::debug!(rules = validator.len(), "compiled rules");

        let mut failures = 0_usize;

        for value in self.values {
            let candidate = Value::Text(value);
            match validator.first_failure(&candidate) {
                None => {
                    if !self.quiet {
                        println!("{} {candidate}", "pass".success());
                    }
                }
                Some(rule) => {
                    failures += 1;
                    if !self.quiet {
                        println!(
                            "{} {candidate} {}",
                            "fail".failure(),
                            format!("({rule})").dim()
                        );
                    }
                }
            }
        }

        if failures > 0 {
            process::exit(1);
        }

        Ok(())
    }
}
