//! Field paths — the small grammar shared by template placeholders and
//! structured-data updates: dot-separated fields, each optionally followed by
//! bracketed indices (`education[0].universityName`, `grid[1][2]`).
//!
//! Paths are parsed once into segments instead of re-splitting the string on
//! every lookup.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("empty field name in path '{0}'")]
    EmptySegment(String),

    #[error("invalid index '{index}' in path '{path}'")]
    InvalidIndex { path: String, index: String },

    #[error("unclosed '[' in path '{0}'")]
    UnclosedBracket(String),
}

impl FieldPath {
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Walks `root` segment by segment. `None` as soon as a field is missing,
    /// an index is out of range, or the value has the wrong shape.
    pub fn lookup<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match segment {
                PathSegment::Field(name) => current.as_object()?.get(name),
                PathSegment::Index(index) => current.as_array()?.get(*index),
            })
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let path = raw.trim();
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in path.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };
            if name.is_empty() {
                return Err(PathError::EmptySegment(path.to_string()));
            }
            segments.push(PathSegment::Field(name.to_string()));

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(PathError::InvalidIndex {
                        path: path.to_string(),
                        index: rest.to_string(),
                    });
                };
                let close = inner
                    .find(']')
                    .ok_or_else(|| PathError::UnclosedBracket(path.to_string()))?;
                let digits = inner[..close].trim();
                let index = digits.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                    path: path.to_string(),
                    index: digits.to_string(),
                })?;
                segments.push(PathSegment::Index(index));
                rest = &inner[close + 1..];
            }
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field(name: &str) -> PathSegment {
        PathSegment::Field(name.to_string())
    }

    #[test]
    fn test_parse_dotted_path() {
        let path: FieldPath = "userInfo.headLine".parse().unwrap();
        assert_eq!(path.segments(), &[field("userInfo"), field("headLine")]);
    }

    #[test]
    fn test_parse_indexed_segments() {
        let path: FieldPath = "education[0].universityName".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[field("education"), PathSegment::Index(0), field("universityName")]
        );

        let path: FieldPath = " grid[1][2] ".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[field("grid"), PathSegment::Index(1), PathSegment::Index(2)]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<FieldPath>(), Err(PathError::Empty));
        assert!(matches!("a..b".parse::<FieldPath>(), Err(PathError::EmptySegment(_))));
        assert!(matches!("[0].a".parse::<FieldPath>(), Err(PathError::EmptySegment(_))));
        assert!(matches!("a[x]".parse::<FieldPath>(), Err(PathError::InvalidIndex { .. })));
        assert!(matches!("a[-1]".parse::<FieldPath>(), Err(PathError::InvalidIndex { .. })));
        assert!(matches!("a[0]b".parse::<FieldPath>(), Err(PathError::InvalidIndex { .. })));
        assert!(matches!("a[0".parse::<FieldPath>(), Err(PathError::UnclosedBracket(_))));
    }

    #[test]
    fn test_display_round_trips() {
        let raw = "workExperience[2].description";
        assert_eq!(raw.parse::<FieldPath>().unwrap().to_string(), raw);
    }

    #[test]
    fn test_lookup_walks_objects_and_arrays() {
        let data = json!({ "a": [{ "c": "p" }, { "c": "q" }] });
        let path: FieldPath = "a[1].c".parse().unwrap();
        assert_eq!(path.lookup(&data), Some(&json!("q")));
    }

    #[test]
    fn test_lookup_misses() {
        let data = json!({ "a": [{ "c": "p" }], "s": "text" });
        for raw in ["a[5].c", "missing.path", "s.inner", "a.c", "s[0]"] {
            let path: FieldPath = raw.parse().unwrap();
            assert_eq!(path.lookup(&data), None, "{raw} should miss");
        }
    }
}
