//! Utilities related to displaying things.

use std::fmt;

use indexmap::IndexMap;
use num_format::Locale;
use num_format::ToFormattedString;
use serde::Serialize;
use serde_yaml::Value;

/// Converts a `pothole_case` key into a `Title Case` label.
///
/// ```
/// use qcpp_report::utils::display::pothole_to_title;
///
/// assert_eq!(pothole_to_title("num_reads_trimmed"), "Num Reads Trimmed");
/// assert_eq!(pothole_to_title("r1_phred_scores"), "R1 Phred Scores");
/// ```
pub fn pothole_to_title(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One `label: value` line of a parameter or output listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayEntry {
    /// Human readable label derived from the key.
    pub label: String,

    /// The value as text. Scalars are shown as they are; mappings and
    /// sequences are written inline in YAML flow style.
    pub value: String,
}

/// Converts an ordered mapping into display entries, keeping its order.
pub fn nice_params(params: &IndexMap<String, Value>) -> Vec<DisplayEntry> {
    params
        .iter()
        .map(|(key, value)| DisplayEntry {
            label: pothole_to_title(key),
            value: FlowValue(value).to_string(),
        })
        .collect()
}

/// Utility struct for displaying a YAML value on a single line.
///
/// ```
/// use qcpp_report::utils::display::FlowValue;
///
/// let value: serde_yaml::Value =
///     serde_yaml::from_str("{size: 4, adaptors: [AGATC, CTGT]}").unwrap();
/// assert_eq!(FlowValue(&value).to_string(), "{size: 4, adaptors: [AGATC, CTGT]}");
/// ```
pub struct FlowValue<'a>(pub &'a Value);

impl fmt::Display for FlowValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", FlowValue(item))?;
                }
                f.write_str("]")
            }
            Value::Mapping(mapping) => {
                f.write_str("{")?;
                for (i, (key, value)) in mapping.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", FlowValue(key), FlowValue(value))?;
                }
                f.write_str("}")
            }
            Value::Tagged(tagged) => write!(f, "{} {}", tagged.tag, FlowValue(&tagged.value)),
        }
    }
}

/// Utility struct for displaying counts with thousands separators.
pub struct CountFormat(pub u64);

impl fmt::Display for CountFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_formatted_string(&Locale::en))
    }
}
