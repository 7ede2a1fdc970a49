mod bind;
mod check;
mod init;
mod parse;
mod terminal;

use bind::Bind;
use check::Check;
use clap::ArgAction;
use init::Init;
use parse::Parse;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Write a starter schema file
    Init(Init),

    /// Parse a field annotation and show the result
    Parse(Parse),

    /// Check values against a list of validation rules
    Check(Check),

    /// Bind form or JSON input into a record described by a schema file
    Bind(Bind),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run()?,
            Self::Parse(command) => command.run()?,
            Self::Check(command) => command.run()?,
            Self::Bind(command) => command.run()?,
        }
        Ok(())
    }
}
