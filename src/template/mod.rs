//! # Template Module
//!
//! Parsing and rendering of `google.api.http` path templates such as
//! `/v1/{name=shelves/*/books/*}:publish`.
//!
//! A template is an ordered list of [`Segment`]s (literal, `*`, `**` or a
//! named [`Variable`] with its own sub-pattern) plus an optional custom verb.
//! Parsing is pure: it never touches the network or the filesystem, and a
//! parsed template renders back to canonical text with [`std::fmt::Display`].
//!
//! ```rust
//! use path_matcher::template::{Segment, Template};
//!
//! let t: Template = "/v1/{name=shelves/*}:archive".parse().unwrap();
//! assert_eq!(t.verb(), Some("archive"));
//! assert!(matches!(t.segments()[1], Segment::Variable(_)));
//! ```

mod parser;
mod types;

pub use parser::parse;
pub use types::{FieldPath, Segment, SubSegment, Template, Variable};
