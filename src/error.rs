//! Error types for template parsing, route registration and lookup.
//!
//! Parse and registration errors are reported synchronously while the matcher
//! is being built; the caller decides whether to abort the whole route table
//! or skip the offending route. [`NotFound`] is the ordinary outcome of a
//! lookup that matched nothing and carries no retry semantics.

use http::Method;
use thiserror::Error;

/// A template string violated the grammar or its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Grammar violation: missing leading slash, unbalanced braces, nested
    /// variables, more than one `**`, invalid field-path identifier, ...
    #[error("malformed template `{template}` at offset {offset}: {reason}")]
    Malformed {
        /// The template text as supplied.
        template: String,
        /// Byte offset where parsing stopped.
        offset: usize,
        /// Human-readable description of the violation.
        reason: &'static str,
    },

    /// The same field path is bound by two variables of one template.
    #[error("duplicate variable `{field_path}` in template `{template}`")]
    DuplicateVariable {
        /// The template text as supplied.
        template: String,
        /// Dotted field path bound twice.
        field_path: String,
    },
}

/// Registering a route into a [`PathMatcherBuilder`](crate::router::PathMatcherBuilder) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// The template did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The same method and normalized template are already registered, or an
    /// earlier route would always be selected in place of this one.
    #[error("conflicting registration: {method} {template} is already bound")]
    Conflict {
        /// HTTP method of the rejected route.
        method: Method,
        /// Canonical rendering of the rejected template.
        template: String,
    },

    /// The HTTP method string is not a valid method token.
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),
}

/// No registered route matches the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route matches {method} {path}")]
pub struct NotFound {
    /// Requested method.
    pub method: String,
    /// Requested path as supplied.
    pub path: String,
}
