//! YAML frontmatter handling

use chrono::NaiveDate;
use serde::Deserialize;

/// Fields read from a post's frontmatter block
#[derive(Debug, Default, Deserialize)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub date: Option<serde_yaml::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
}

impl Frontmatter {
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Date as a calendar day; accepts `2024-01-31` and full timestamps
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = match self.date.as_ref()? {
            serde_yaml::Value::String(s) => s.clone(),
            other => serde_yaml::to_string(other).ok()?,
        };
        let day = raw.trim().get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Split a leading `---` delimited block from the body
///
/// Returns `(Some(yaml), body)` when the source opens with a complete block,
/// otherwise `(None, source)`.
pub fn split_frontmatter(source: &str) -> (Option<&str>, &str) {
    let rest = match source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    {
        Some(rest) => rest,
        None => return (None, source),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, source)
}
