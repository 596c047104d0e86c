//! Structural JSON comparison
//!
//! Produces a flat list of path-level differences between two JSON
//! documents. Object keys are compared by membership; arrays are compared
//! element-wise by index (no reordering detection).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The kind of change at one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present only in the new document.
    Added,
    /// Present only in the old document.
    Removed,
    /// Present in both with different values.
    Changed,
}

/// One difference: a dotted/bracketed path into the document plus the
/// values on each side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub path: String,
    pub kind: ChangeKind,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            self.path.as_str()
        };
        match self.kind {
            ChangeKind::Changed => write!(
                f,
                "changed {path}: {} -> {}",
                render(&self.old),
                render(&self.new)
            ),
            ChangeKind::Added => write!(f, "added {path}: {}", render(&self.new)),
            ChangeKind::Removed => write!(f, "removed {path}: {}", render(&self.old)),
        }
    }
}

fn render(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "null".to_string())
}

/// All differences between two documents. Empty means the case matches.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub entries: Vec<DiffEntry>,
}

impl DiffRecord {
    pub fn is_match(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human-readable rendering, one entry per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Compute the structural diff between two JSON documents.
pub fn diff(old: &Value, new: &Value) -> DiffRecord {
    let mut entries = Vec::new();
    walk("", old, new, &mut entries);
    DiffRecord { entries }
}

fn walk(path: &str, old: &Value, new: &Value, out: &mut Vec<DiffEntry>) {
    match (old, new) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, old_value) in a {
                match b.get(key) {
                    Some(new_value) => walk(&key_path(path, key), old_value, new_value, out),
                    None => out.push(DiffEntry {
                        path: key_path(path, key),
                        kind: ChangeKind::Removed,
                        old: Some(old_value.clone()),
                        new: None,
                    }),
                }
            }
            for (key, new_value) in b {
                if !a.contains_key(key) {
                    out.push(DiffEntry {
                        path: key_path(path, key),
                        kind: ChangeKind::Added,
                        old: None,
                        new: Some(new_value.clone()),
                    });
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            let shared = a.len().min(b.len());
            for i in 0..shared {
                walk(&index_path(path, i), &a[i], &b[i], out);
            }
            for (i, old_value) in a.iter().enumerate().skip(shared) {
                out.push(DiffEntry {
                    path: index_path(path, i),
                    kind: ChangeKind::Removed,
                    old: Some(old_value.clone()),
                    new: None,
                });
            }
            for (i, new_value) in b.iter().enumerate().skip(shared) {
                out.push(DiffEntry {
                    path: index_path(path, i),
                    kind: ChangeKind::Added,
                    old: None,
                    new: Some(new_value.clone()),
                });
            }
        }
        (a, b) => {
            if a != b {
                out.push(DiffEntry {
                    path: path.to_string(),
                    kind: ChangeKind::Changed,
                    old: Some(a.clone()),
                    new: Some(b.clone()),
                });
            }
        }
    }
}

fn key_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn index_path(prefix: &str, index: usize) -> String {
    format!("{prefix}[{index}]")
}
