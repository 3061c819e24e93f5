//! Record extractor implementation

use super::types::{ExtractPolicy, ExtractedRecord, PageExtraction};
use crate::config::ObjectIdMap;
use crate::error::{Error, Result};
use crate::path::{DottedPath, Lookup, Resolved};
use crate::types::JsonValue;
use tracing::{debug, warn};

/// Pulls records out of response pages. Holds only immutable data.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    map: ObjectIdMap,
    policy: ExtractPolicy,
}

impl RecordExtractor {
    /// Create an extractor with the strict policy
    pub fn new(map: ObjectIdMap) -> Self {
        Self {
            map,
            policy: ExtractPolicy::Strict,
        }
    }

    /// Set the policy for elements without a usable identity
    #[must_use]
    pub fn with_policy(mut self, policy: ExtractPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The configured policy
    pub fn policy(&self) -> ExtractPolicy {
        self.policy
    }

    /// Extract every record of a page, path by path in path order. A path
    /// that fails is reported in `failures` and does not affect the others.
    pub fn extract(&self, data: &JsonValue) -> PageExtraction {
        let mut page = PageExtraction::default();
        for (path, id_field) in self.map.iter() {
            match self.extract_path(data, path, id_field) {
                Ok(records) => page.records.extend(records),
                Err(e) => page.failures.push(e),
            }
        }
        page
    }

    /// Records under one path. All or nothing: an error discards the
    /// records already built for this path.
    pub fn extract_path(
        &self,
        data: &JsonValue,
        path: &DottedPath,
        id_field: &str,
    ) -> Result<Vec<ExtractedRecord>> {
        let resolved = match path.resolve(data) {
            Lookup::Found(resolved) => resolved,
            Lookup::NotFound(miss) => {
                if miss.parent_found() {
                    debug!(path = %path, "No data at path on this page");
                } else {
                    debug!(
                        path = %path,
                        segment = %miss.segment,
                        depth = miss.depth,
                        "Path does not exist in response"
                    );
                }
                return Ok(Vec::new());
            }
        };

        let elements = collection_elements(&resolved);
        if resolved.as_node().is_some_and(|node| !node.is_array()) {
            debug!(path = %path, "Path resolved to a non-list node, skipping");
        }

        let mut records = Vec::new();
        for (index, element) in elements.into_iter().enumerate() {
            match identify(element, path, index, id_field) {
                Ok(id) => records.push(ExtractedRecord {
                    source_path: path.to_string(),
                    id,
                    payload: element.clone(),
                }),
                Err(e) if self.policy == ExtractPolicy::SkipMalformed => {
                    warn!(error = %e, "Skipping element without a usable id");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }
}

/// Elements of the collection a path resolved to, in document order.
///
/// A single node counts only when it is a list. Once an array was crossed,
/// each sub-result is an element itself (`users.edges.node`), or a list whose
/// elements are flattened in (`orgs.users.nodes`). Null sub-results are empty
/// slots and contribute nothing.
fn collection_elements<'a>(resolved: &Resolved<'a>) -> Vec<&'a JsonValue> {
    match resolved {
        Resolved::Node(node) => match *node {
            JsonValue::Array(elements) => elements.iter().collect(),
            _ => Vec::new(),
        },
        Resolved::Many(_) => {
            let mut elements = Vec::new();
            for leaf in resolved.leaves() {
                match leaf {
                    JsonValue::Array(items) => elements.extend(items),
                    JsonValue::Null => {}
                    other => elements.push(other),
                }
            }
            elements
        }
    }
}

/// Render the element's id. Strings verbatim, numbers and booleans as JSON text.
fn identify(element: &JsonValue, path: &DottedPath, index: usize, id_field: &str) -> Result<String> {
    let JsonValue::Object(object) = element else {
        return Err(Error::MalformedElement {
            path: path.to_string(),
            index,
        });
    };

    match object.get(id_field) {
        None | Some(JsonValue::Null) => Err(Error::MissingIdField {
            path: path.to_string(),
            index,
            id_field: id_field.to_string(),
        }),
        Some(JsonValue::String(id)) => Ok(id.clone()),
        Some(id @ (JsonValue::Number(_) | JsonValue::Bool(_))) => Ok(id.to_string()),
        Some(JsonValue::Object(_) | JsonValue::Array(_)) => Err(Error::InvalidIdField {
            path: path.to_string(),
            index,
            id_field: id_field.to_string(),
        }),
    }
}
