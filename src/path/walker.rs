//! Dotted path resolution
//!
//! The response tree is `serde_json::Value`, itself a tagged tree of object,
//! array and scalar variants; traversal is a recursive pattern match over it.

use serde_json::Value;
use std::fmt;

/// A validated dotted path such as `sampleData.users.nodes`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DottedPath {
    raw: String,
    segments: Vec<String>,
}

impl DottedPath {
    /// Parse a dotted path. Returns `None` for an empty path or one with an
    /// empty segment (`a..b`, `.a`, `a.`). Whitespace around segments is
    /// dropped, so `a. b` is `a.b`.
    pub fn parse(raw: &str) -> Option<Self> {
        let segments: Vec<String> = raw.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }

        Some(Self {
            raw: segments.join("."),
            segments,
        })
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path segments, in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve this path against a tree
    pub fn resolve<'a>(&self, tree: &'a Value) -> Lookup<'a> {
        let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        match walk(tree, &segments, 0) {
            Ok(resolved) => Lookup::Found(resolved),
            Err(depth) => Lookup::NotFound(Miss {
                segment: self.segments[depth].clone(),
                depth,
                total: self.segments.len(),
            }),
        }
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Node(s) found at a path
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// A single node reached without crossing an array
    Node(&'a Value),
    /// One sub-result per array element that resolved the remaining path
    Many(Vec<Resolved<'a>>),
}

impl<'a> Resolved<'a> {
    /// The single node, if no array was crossed
    pub fn as_node(&self) -> Option<&'a Value> {
        match self {
            Resolved::Node(value) => Some(value),
            Resolved::Many(_) => None,
        }
    }

    /// Flatten into the reached nodes, depth-first in document order
    pub fn leaves(&self) -> Vec<&'a Value> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<&'a Value>) {
        match self {
            Resolved::Node(value) => out.push(value),
            Resolved::Many(items) => {
                for item in items {
                    item.collect_leaves(out);
                }
            }
        }
    }

    /// Materialise the result: `Many` becomes a JSON array
    pub fn to_value(&self) -> Value {
        match self {
            Resolved::Node(value) => (*value).clone(),
            Resolved::Many(items) => Value::Array(items.iter().map(Resolved::to_value).collect()),
        }
    }
}

/// Outcome of a path lookup. `NotFound` is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The path resolved
    Found(Resolved<'a>),
    /// Some segment was absent
    NotFound(Miss),
}

impl<'a> Lookup<'a> {
    /// Convert into an `Option`, dropping the miss details
    pub fn found(self) -> Option<Resolved<'a>> {
        match self {
            Lookup::Found(resolved) => Some(resolved),
            Lookup::NotFound(_) => None,
        }
    }

    /// Check whether the path resolved
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Where a lookup stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Miss {
    /// The segment that could not be resolved
    pub segment: String,
    /// Zero-based index of that segment
    pub depth: usize,
    /// Number of segments in the path
    pub total: usize,
}

impl Miss {
    /// True when everything but the final segment resolved, i.e. the parent
    /// object existed and only the leaf field is absent
    pub fn parent_found(&self) -> bool {
        self.depth + 1 == self.total
    }
}

/// Resolve `path` against `tree`. An invalid path never resolves.
pub fn resolve<'a>(tree: &'a Value, path: &str) -> Lookup<'a> {
    match DottedPath::parse(path) {
        Some(path) => path.resolve(tree),
        None => Lookup::NotFound(Miss {
            segment: path.to_string(),
            depth: 0,
            total: 1,
        }),
    }
}

/// Walk `segments` from `node`. On failure returns the depth of the segment
/// that could not be resolved.
fn walk<'a>(node: &'a Value, segments: &[&str], depth: usize) -> Result<Resolved<'a>, usize> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(Resolved::Node(node));
    };

    match node {
        Value::Object(map) => match map.get(*head) {
            Some(child) => walk(child, rest, depth + 1),
            None => Err(depth),
        },
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(Resolved::Many(Vec::new()));
            }

            let mut found = Vec::with_capacity(items.len());
            let mut deepest_miss = None;
            for item in items {
                match walk(item, segments, depth) {
                    Ok(resolved) => found.push(resolved),
                    Err(miss) => {
                        deepest_miss = Some(deepest_miss.map_or(miss, |d: usize| d.max(miss)));
                    }
                }
            }

            match (found.is_empty(), deepest_miss) {
                (true, Some(miss)) => Err(miss),
                _ => Ok(Resolved::Many(found)),
            }
        }
        _ => Err(depth),
    }
}
