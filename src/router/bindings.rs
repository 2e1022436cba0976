//! Variable binding tables.
//!
//! Variables are transparent to matching: the trie only sees the flattened
//! sub-patterns. Each registered route keeps a [`BindingTable`] recording which
//! flattened positions every variable covers, and values are reconstructed
//! from the request segments after a successful match.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::template::{Segment, SubSegment, Template};

/// Maximum number of variables before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Extracted variables: `(field path, raw captured text)`.
///
/// Field paths are shared `Arc<str>` from the binding table; values are
/// per-request data taken from the path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Position range a single variable covers in the flattened template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    /// Dotted field path, e.g. `shelf.name`.
    pub field_path: Arc<str>,
    /// First flattened position covered.
    pub start: usize,
    /// One past the last position, or `None` when the variable ends in `**`
    /// and runs to the end of the path.
    pub end: Option<usize>,
    /// Whether the capture may span several segments.
    pub multi_segment: bool,
}

/// Ordered variable bindings of one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    bindings: SmallVec<[VariableBinding; 4]>,
}

impl BindingTable {
    /// Record the position range of every variable in `template`.
    #[must_use]
    pub fn from_template(template: &Template) -> Self {
        let mut bindings = SmallVec::new();
        let mut position = 0usize;
        for segment in template.segments() {
            match segment {
                Segment::Literal(_) | Segment::SingleWildcard | Segment::DoubleWildcard => {
                    position += 1;
                }
                Segment::Variable(variable) => {
                    let start = position;
                    position += variable.pattern.len();
                    let open_ended = variable
                        .pattern
                        .last()
                        .is_some_and(SubSegment::is_double_wildcard);
                    bindings.push(VariableBinding {
                        field_path: Arc::from(variable.field_path.to_string()),
                        start,
                        end: (!open_ended).then_some(position),
                        multi_segment: variable.is_multi_segment(),
                    });
                }
            }
        }
        Self { bindings }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableBinding> {
        self.bindings.iter()
    }

    /// Rebuild variable values from the segments of a matched request path.
    ///
    /// `segments` are the request segments with any custom verb already
    /// removed. A `**` consumes everything after its position, so every other
    /// flattened position maps one-to-one onto a request segment.
    ///
    /// # Panics
    ///
    /// Panics if a recorded range does not fit `segments`. That can only
    /// happen if the trie reported a match for a path the template cannot
    /// match, which is a bug in the matcher rather than bad input.
    #[must_use]
    pub fn extract(&self, segments: &[&str]) -> ParamVec {
        let mut params = ParamVec::new();
        for binding in &self.bindings {
            let end = binding.end.unwrap_or(segments.len());
            assert!(
                binding.start <= end && end <= segments.len(),
                "variable `{}` bound to positions {}..{} but the matched path has {} segments",
                binding.field_path,
                binding.start,
                end,
                segments.len()
            );
            params.push((
                Arc::clone(&binding.field_path),
                segments[binding.start..end].join("/"),
            ));
        }
        params
    }
}
