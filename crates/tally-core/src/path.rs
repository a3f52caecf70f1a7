//! Document path templates (e.g. `users/{userId}/receipts/{docId}`).
//!
//! Record-write triggers are bound to a collection path. When a delivery
//! carries only the written document's path, the template recovers the
//! parent id (first parameter) and record id (last parameter).

use std::fmt;

use crate::error::{Result, TallyError};

/// Trigger path for child records unless configured otherwise.
pub const DEFAULT_RECORDS_TEMPLATE: &str = "users/{userId}/receipts/{docId}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a slash-separated template. Requires at least two `{param}`
    /// segments with distinct names and no empty segments.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut params: Vec<&str> = Vec::new();

        for seg in raw.split('/') {
            if seg.is_empty() {
                return Err(TallyError::BadRequest(format!(
                    "path template has an empty segment: {raw}"
                )));
            }
            match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    if name.is_empty() || name.contains(['{', '}']) {
                        return Err(TallyError::BadRequest(format!(
                            "invalid template param `{seg}` in {raw}"
                        )));
                    }
                    if params.contains(&name) {
                        return Err(TallyError::BadRequest(format!(
                            "duplicate template param `{name}` in {raw}"
                        )));
                    }
                    params.push(name);
                    segments.push(Segment::Param(name.to_string()));
                }
                None => {
                    if seg.contains(['{', '}']) {
                        return Err(TallyError::BadRequest(format!(
                            "unbalanced braces in segment `{seg}` of {raw}"
                        )));
                    }
                    segments.push(Segment::Literal(seg.to_string()));
                }
            }
        }

        if params.len() < 2 {
            return Err(TallyError::BadRequest(format!(
                "path template needs a parent and a record param: {raw}"
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of the template params, in path order.
    pub fn params(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Match `path` segment-for-segment. Returns `(param, value)` pairs in
    /// path order, or `None` when the path does not belong to this template.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut out = Vec::new();
        for (seg, part) in self.segments.iter().zip(parts) {
            match seg {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => out.push((name.as_str(), part)),
            }
        }
        Some(out)
    }

    /// Resolve `(parent_id, record_id)` from a concrete document path.
    pub fn locate<'p>(&self, path: &'p str) -> Result<(&'p str, &'p str)> {
        let caps = self.captures(path).ok_or_else(|| {
            TallyError::MalformedEvent(format!("path `{path}` does not match `{}`", self.raw))
        })?;
        match (caps.first(), caps.last()) {
            (Some((_, parent)), Some((_, record))) => Ok((*parent, *record)),
            _ => Err(TallyError::Internal("template without params".into())),
        }
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self {
            raw: DEFAULT_RECORDS_TEMPLATE.to_string(),
            segments: vec![
                Segment::Literal("users".into()),
                Segment::Param("userId".into()),
                Segment::Literal("receipts".into()),
                Segment::Param("docId".into()),
            ],
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
