use std::path::{Path, PathBuf};

use clap::Parser;
use fieldbind::{Schema, schema::FieldEntry};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Write a starter schema file")]
pub struct Init {
    /// Where to write the schema
    #[arg(default_value = "schema.toml")]
    path: PathBuf,
}

impl Init {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        write_starter(&self.path)?;

        println!("Created schema file {}", self.path.display());
        println!();
        println!("Next steps:");
        println!(
            "  fieldbind bind --schema {} --form 'email=ada%40example.com&age=36'",
            self.path.display()
        );
        Ok(())
    }
}

fn write_starter(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("Schema file already exists: {}", path.display());
    }

    let schema = Schema::new(vec![
        entry("email", "text", r#"required validate:"length=3-255""#),
        entry("age", "integer", r#"validate:"range=0-150""#),
        entry("joined", "date", ""),
    ]);

    schema
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to create schema file: {e}"))
}

fn entry(name: &str, kind: &str, annotation: &str) -> FieldEntry {
    FieldEntry {
        name: name.to_string(),
        kind: kind.to_string(),
        annotation: annotation.to_string(),
    }
}
