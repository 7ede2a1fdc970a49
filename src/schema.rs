use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::binding::{self, Bound, FieldKind, RecordShape};

/// A record whose fields are only known at runtime.
///
/// Bound values are keyed by field name. Fields that were not bound are
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DynamicRecord(BTreeMap<String, Bound>);

impl DynamicRecord {
    /// Returns the value bound to a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Bound> {
        self.0.get(field)
    }

    /// The number of bound fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no field has been bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, field: &str, value: Bound) {
        self.0.insert(field.to_string(), value);
    }
}

/// A field declaration in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// The field name.
    pub name: String,

    /// The field kind: `text`, `integer`, `float` or `date`.
    pub kind: String,

    /// The field annotation, e.g. `source:"email" required`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub annotation: String,
}

/// A record shape described in a TOML file.
///
/// ```toml
/// _version = "1"
///
/// [[fields]]
/// name = "email"
/// kind = "text"
/// annotation = 'required validate:"length=3-255"'
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Schema {
    fields: Vec<FieldEntry>,
}

impl Schema {
    /// Creates a schema from field declarations.
    #[must_use]
    pub const fn new(fields: Vec<FieldEntry>) -> Self {
        Self { fields }
    }

    /// Loads a schema from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read schema file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse schema file: {e}"))
    }

    /// Saves the schema to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be serialized to TOML or if the
    /// file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize schema: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write schema file: {e}"))
    }

    /// The field declarations, in order.
    #[must_use]
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Builds the record shape described by this schema.
    ///
    /// Annotations are not parsed here; they are checked when binding.
    ///
    /// # Errors
    ///
    /// Returns [`binding::Error::UnsupportedFieldKind`] if a field declares an
    /// unknown kind.
    pub fn shape(&self) -> Result<RecordShape<DynamicRecord>, binding::Error> {
        let mut builder = RecordShape::<DynamicRecord>::builder();

        for field in &self.fields {
            let name = field.name.clone();
            let annotation = field.annotation.as_str();
            builder = match field.kind.parse::<FieldKind>()? {
                FieldKind::Text => {
                    builder.text(&field.name, annotation, move |record, value| {
                        record.insert(&name, Bound::Text(value));
                    })
                }
                FieldKind::Integer => {
                    builder.integer(&field.name, annotation, move |record, value| {
                        record.insert(&name, Bound::Integer(value));
                    })
                }
                FieldKind::Float => {
                    builder.float(&field.name, annotation, move |record, value| {
                        record.insert(&name, Bound::Float(value));
                    })
                }
                FieldKind::Date => {
                    builder.date(&field.name, annotation, move |record, value| {
                        record.insert(&name, Bound::Date(value));
                    })
                }
            };
        }

        Ok(builder.build())
    }
}

/// The serialized versions of the schema.
/// This allows for future changes to the schema format without breaking
/// existing files.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<FieldEntry>,
    },
}

impl From<Versions> for Schema {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { fields } => Self { fields },
        }
    }
}

impl From<Schema> for Versions {
    fn from(schema: Schema) -> Self {
        Self::V1 {
            fields: schema.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::binding::{FormSource, JsonSource};

    const SCHEMA: &str = r#"
_version = "1"

[[fields]]
name = "text"
kind = "text"
annotation = 'source:"test" validate:"length=4-10"'

[[fields]]
name = "number"
kind = "integer"
annotation = 'source:"number" validate:"range=0-10"'

[[fields]]
name = "floaty"
kind = "float"

[[fields]]
name = "date"
kind = "date"
annotation = 'source:"date" required'
"#;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA.as_bytes()).unwrap();

        let schema = Schema::load(file.path()).unwrap();

        assert_eq!(schema.fields().len(), 4);
        assert_eq!(schema.fields()[1].kind, "integer");
        assert_eq!(schema.fields()[2].annotation, "");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Schema::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read schema file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nfields = \"three\"\n")
            .unwrap();

        let error = Schema::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse schema file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Schema::default();
        let actual: Schema = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let schema: Schema = toml::from_str(SCHEMA).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("schema.toml");

        schema.save(&path).unwrap();

        assert_eq!(Schema::load(&path).unwrap(), schema);
    }

    #[test]
    fn shape_binds_form() {
        let schema: Schema = toml::from_str(SCHEMA).unwrap();
        let shape = schema.shape().unwrap();
        let source = FormSource::parse("test=test&number=2&floaty=1.2&date=2020-06-30").unwrap();

        let record = shape.build(&source).unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("text"), Some(&Bound::Text("test".to_string())));
        assert_eq!(record.get("number"), Some(&Bound::Integer(2)));
        assert_eq!(record.get("floaty"), Some(&Bound::Float(1.2)));
        assert_eq!(
            record.get("date"),
            Some(&Bound::Date(
                Utc.with_ymd_and_hms(2020, 6, 30, 0, 0, 0).unwrap()
            ))
        );
    }

    #[test]
    fn default_record_is_empty() {
        let record = DynamicRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
    }

    #[test]
    fn unbound_fields_are_absent() {
        let schema: Schema = toml::from_str(SCHEMA).unwrap();
        let source = JsonSource::parse(br#"{"date": "2021-01-01"}"#).unwrap();

        let record = schema.shape().unwrap().build(&source).unwrap();

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("text"), None);
    }

    #[test]
    fn record_serializes_as_object() {
        let schema: Schema = toml::from_str(SCHEMA).unwrap();
        let source = FormSource::parse("test=test&number=2&date=2020-06-30").unwrap();
        let record = schema.shape().unwrap().build(&source).unwrap();

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "date": "2020-06-30T00:00:00Z",
                "number": 2,
                "text": "test",
            })
        );
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let schema = Schema::new(vec![FieldEntry {
            name: "flag".to_string(),
            kind: "boolean".to_string(),
            annotation: String::new(),
        }]);

        assert!(matches!(
            schema.shape(),
            Err(binding::Error::UnsupportedFieldKind(kind)) if kind == "boolean"
        ));
    }
}
