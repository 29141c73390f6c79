//! Loading of the YAML report document written by the QC pipeline.
//!
//! A document is a sequence of single-key mappings. The first is always the
//! run metadata under the `QCPP` key; each following one maps a stage-type tag
//! to that stage's report:
//!
//! ```yaml
//! - QCPP:
//!     version: 0.2.1
//!     input: reads.fastq.gz
//! - WindowedQualTrim:
//!     name: QC
//!     parameters:
//!       min_quality: 28
//!     output:
//!       num_reads_trimmed: 1302
//! ```
//!
//! The whole document is validated while it is loaded, so that a malformed
//! section is reported before anything is rendered.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::errors::Error;
use crate::quality::QualityHistogram;
use crate::stages::StageKind;

/// Key of the metadata section.
pub const METADATA_KEY: &str = "QCPP";

/// A parsed report document.
#[derive(Clone, Debug)]
pub struct Document {
    /// The tool name, version and configuration for the run.
    pub metadata: IndexMap<String, Value>,

    /// The stage reports, in pipeline order.
    pub stages: Vec<StageReport>,
}

/// The result of one stage of the QC pipeline.
#[derive(Clone, Debug)]
pub struct StageReport {
    /// The type of stage.
    pub kind: StageKind,

    /// The display name of this stage.
    pub name: String,

    /// The parameters the stage was run with.
    pub parameters: IndexMap<String, Value>,

    /// The outputs of the stage.
    pub output: IndexMap<String, Value>,
}

fn malformed<S: Into<String>>(message: S) -> Error {
    Error::MalformedDocument(message.into())
}

impl Document {
    /// Reads and validates a document from a file.
    pub fn read(path: impl AsRef<Path>) -> Result<Document, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses and validates a document from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Document, Error> {
        let root: Value =
            serde_yaml::from_str(text).map_err(|e| malformed(format!("invalid YAML: {}", e)))?;

        let sections = match root {
            Value::Sequence(sections) => sections,
            _ => return Err(malformed("the document must be a sequence of sections")),
        };

        let mut sections = sections.into_iter().enumerate();

        let (_, first) = sections
            .next()
            .ok_or_else(|| malformed("the document has no sections"))?;
        let (key, body) = single_entry(0, first)?;
        if key != METADATA_KEY {
            return Err(malformed(format!(
                "the first section must be the `{}` metadata, found `{}`",
                METADATA_KEY, key
            )));
        }
        let metadata = to_string_map(body, "section 0 (metadata)")?;

        let mut stages = Vec::new();
        for (index, section) in sections {
            let (tag, body) = single_entry(index, section)?;
            let kind = tag.parse::<StageKind>().map_err(|e| {
                let location = match body.get("name").and_then(scalar_to_string) {
                    Some(name) => format!("section {} (\"{}\")", index, name),
                    None => format!("section {}", index),
                };
                e.in_section(location)
            })?;
            stages.push(StageReport::from_section(kind, index, body)?);
        }

        Ok(Document { metadata, stages })
    }

    /// Keeps only the stages of the given kind.
    pub fn retain_kind(&mut self, kind: StageKind) {
        self.stages.retain(|stage| stage.kind == kind);
    }
}

impl StageReport {
    fn from_section(kind: StageKind, index: usize, body: Value) -> Result<StageReport, Error> {
        let location = format!("section {} (`{}`)", index, kind.tag());

        let mut body = match body {
            Value::Mapping(mapping) => mapping,
            _ => return Err(malformed(format!("{} must be a mapping", location))),
        };

        let name = match take_field(&mut body, "name", &location)? {
            Value::String(name) => name,
            other => scalar_to_string(&other)
                .ok_or_else(|| malformed(format!("{} has a non-scalar `name`", location)))?,
        };

        let location = format!("{} \"{}\"", location, name);
        let parameters = take_field(&mut body, "parameters", &location)?;
        let parameters = to_string_map(parameters, &format!("`parameters` of {}", location))?;
        let output = take_field(&mut body, "output", &location)?;
        let output = to_string_map(output, &format!("`output` of {}", location))?;

        Ok(StageReport {
            kind,
            name,
            parameters,
            output,
        })
    }

    /// Reads a quality histogram from the stage output.
    ///
    /// A key that is absent, null or an empty sequence yields `None`.
    pub fn histogram(&self, key: &str) -> Result<Option<QualityHistogram>, Error> {
        let value = match self.output.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value.clone(),
        };

        let histogram: QualityHistogram = serde_yaml::from_value(value).map_err(|e| {
            malformed(format!(
                "`{}` of stage \"{}\" is not a quality histogram: {}",
                key, self.name, e
            ))
        })?;

        if histogram.is_empty() {
            Ok(None)
        } else {
            Ok(Some(histogram))
        }
    }
}

/// Splits a section into its only key and the value under it.
fn single_entry(index: usize, section: Value) -> Result<(String, Value), Error> {
    let mapping = match section {
        Value::Mapping(mapping) if mapping.len() == 1 => mapping,
        _ => {
            return Err(malformed(format!(
                "section {} must be a mapping with exactly one key",
                index
            )))
        }
    };

    let (key, value) = mapping
        .into_iter()
        .next()
        .ok_or_else(|| malformed(format!("section {} is empty", index)))?;
    let key = match key {
        Value::String(key) => key,
        _ => {
            return Err(malformed(format!(
                "the key of section {} must be a string",
                index
            )))
        }
    };

    Ok((key, value))
}

fn take_field(body: &mut Mapping, field: &str, location: &str) -> Result<Value, Error> {
    body.remove(field)
        .ok_or_else(|| malformed(format!("{} is missing `{}`", location, field)))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Converts a mapping with scalar keys into an ordered map keyed by string.
/// An explicit null is treated as an empty mapping.
fn to_string_map(value: Value, what: &str) -> Result<IndexMap<String, Value>, Error> {
    let mapping = match value {
        Value::Null => return Ok(IndexMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(malformed(format!("{} must be a mapping", what))),
    };

    mapping
        .into_iter()
        .map(|(key, value)| {
            let key = scalar_to_string(&key)
                .ok_or_else(|| malformed(format!("{} has a non-scalar key", what)))?;
            Ok((key, value))
        })
        .collect()
}
