use clap::Parser;
use fieldbind::FieldSpec;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Parse a field annotation and display the resulting field specification")]
pub struct Parse {
    /// The annotation, e.g. 'source:"email" required validate:"length=3-255"'
    annotation: String,

    /// Print the specification as JSON
    #[arg(long)]
    json: bool,
}

impl Parse {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let spec = FieldSpec::parse(&self.annotation)?;

        if self.json {
            let rules: Vec<String> = spec.rules().iter().map(ToString::to_string).collect();
            let output = serde_json::json!({
                "source": spec.source(),
                "required": spec.is_required(),
                "rules": rules,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        let source = spec
            .source()
            .map_or_else(|| "(field name)".dim(), ToString::to_string);
        println!("source:   {source}");
        println!("required: {}", spec.is_required());

        if spec.rules().is_empty() {
            println!("rules:    {}", "(none)".dim());
        } else {
            println!("rules:");
            for rule in spec.rules() {
                println!("  - {rule}");
            }
        }

        Ok(())
    }
}
