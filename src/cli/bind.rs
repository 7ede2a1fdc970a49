use std::{
    io::Read,
    path::{Path, PathBuf},
};

use clap::Parser;
use fieldbind::{
    DynamicRecord, RecordShape, Schema,
    binding::{FormSource, JsonSource},
};
use serde_json::Value as JsonValue;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Bind form or JSON input into a record described by a schema file")]
pub struct Bind {
    /// Path to the schema file
    #[arg(long, short, value_name = "FILE")]
    schema: PathBuf,

    /// A URL-encoded form body, e.g. "email=a%40b.c&age=30"
    #[arg(long, value_name = "BODY", conflicts_with = "json", required_unless_present = "json")]
    form: Option<String>,

    /// A JSON file to bind, or '-' to read standard input
    ///
    /// An array of objects binds each element into its own record.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

impl Bind {
    #[instrument(level = "debug", skip(self), fields(schema = %self.schema.display()))]
    pub fn run(self) -> anyhow::Result<()> {
        let schema = Schema::load(&self.schema).map_err(|e| anyhow::anyhow!("{e}"))?;
        let shape = schema.shape()?;

        let output = match (self.form, self.json) {
            (Some(body), _) => Self::bind_form(&shape, &body)?,
            (None, Some(path)) => Self::bind_json(&shape, &path)?,
            (None, None) => anyhow::bail!("either --form or --json must be given"),
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn bind_form(shape: &RecordShape<DynamicRecord>, body: &str) -> anyhow::Result<JsonValue> {
        let source = FormSource::parse(body)?;
        let record = shape.build(&source)?;
        Ok(serde_json::to_value(record)?)
    }

    fn bind_json(shape: &RecordShape<DynamicRecord>, path: &Path) -> anyhow::Result<JsonValue> {
        let body = read_input(path)?;
        let value: JsonValue = serde_json::from_slice(&body)?;

        if let JsonValue::Array(elements) = value {
            let sources = elements
                .into_iter()
                .map(JsonSource::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            tracing::info!(records = sources.len(), "binding batch");

            let records = shape
                .bind_all(&sources)
                .into_iter()
                .enumerate()
                .map(|(index, result)| {
                    result.map_err(|e| anyhow::anyhow!("record {index}: {e}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            return Ok(serde_json::to_value(records)?);
        }

        let record = shape.build(&JsonSource::try_from(value)?)?;
        Ok(serde_json::to_value(record)?)
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer)?;
        return Ok(buffer);
    }

    std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read input file {}: {e}", path.display()))
}
