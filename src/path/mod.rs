//! Path walker module
//!
//! Resolves dotted paths (`a.b.c`) against a JSON response tree.
//!
//! # Overview
//!
//! Each segment descends one level through a named object field. When a
//! segment lands on an array, the remaining segments are mapped over every
//! element and the result becomes a list of per-element sub-results. This is
//! what lets a path like `sampleData.users.nodes` reach through an array of
//! users into each user's nested `nodes` array.

mod walker;

pub use walker::{resolve, DottedPath, Lookup, Miss, Resolved};

#[cfg(test)]
mod tests;
