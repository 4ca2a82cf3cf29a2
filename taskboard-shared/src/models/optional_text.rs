/// Optional free-text fields that the backend stores as `""` when unset
///
/// Blank or missing values read as `None`; `None` is written back as `""`
/// so a full update clears the field instead of leaving the old value.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize(raw))
}

/// Maps blank strings to `None`, trimming surrounding whitespace
pub fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
