//! Candidate extraction: raw matches per field.

use std::collections::BTreeMap;

use tracing::trace;

use crate::models::fields::{Candidate, FieldId, Span};

use super::rules::library::{FieldSpec, field_specs};

/// Scan `text` for every field.
///
/// For each field the descriptors are tried in rank order and scanning stops
/// at the first descriptor with at least one usable match; all of its
/// matches are returned. Fields may overlap each other freely. Every field
/// is a key of the result; a field with no match maps to an empty list.
pub fn extract_candidates(text: &str) -> BTreeMap<FieldId, Vec<Candidate>> {
    field_specs()
        .iter()
        .map(|spec| (spec.field, candidates_for(spec, text)))
        .collect()
}

/// Candidates of one field.
pub fn candidates_for(spec: &FieldSpec, text: &str) -> Vec<Candidate> {
    for (rank, descriptor) in spec.patterns.iter().enumerate() {
        let found: Vec<Candidate> = descriptor
            .regex
            .captures_iter(text)
            .filter(|caps| caps.name("skip").is_none())
            .filter_map(|caps| caps.name("value"))
            .filter(|m| !m.as_str().trim().is_empty())
            .map(|m| {
                Candidate::new(
                    spec.field,
                    descriptor.tag,
                    rank,
                    m.as_str(),
                    Span::new(m.start(), m.end()),
                )
            })
            .collect();

        if !found.is_empty() {
            trace!(
                "{}: {} candidate(s) from {:?}",
                spec.field,
                found.len(),
                descriptor.tag
            );
            return found;
        }
    }

    Vec::new()
}
