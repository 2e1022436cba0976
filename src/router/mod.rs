//! # Router Module
//!
//! The router module matches concrete request paths against a set of
//! registered http-template routes and extracts named path variables.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building a segment trie from `(method, template, operation)` registrations
//! - Rejecting malformed or conflicting templates at build time
//! - Matching incoming requests in O(path segments) with deterministic precedence
//! - Reconstructing variable values from the matched path
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Registration**: At startup, every template is parsed, flattened
//!    (variables unwrapped into their sub-patterns) and inserted into the trie.
//!    Each route keeps a binding table recording which positions its variables
//!    cover.
//!
//! 2. **Matching**: For each request the trie is walked depth-first, trying
//!    literal, then `*`, then `**` children and backtracking on failure. The
//!    first terminal with a binding for the request method wins.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use path_matcher::router::PathMatcher;
//!
//! let mut builder = PathMatcher::builder();
//! builder.register(Method::GET, "/v1/{name=shelves/*}", "GetShelf").unwrap();
//! builder.register(Method::GET, "/v1/shelves/*/books/**", "ListBooks").unwrap();
//! let matcher = builder.build();
//!
//! let found = matcher.lookup(&Method::GET, "/v1/shelves/42").unwrap();
//! assert_eq!(*found.operation(), "GetShelf");
//! assert_eq!(found.get("name"), Some("shelves/42"));
//!
//! assert!(matcher.lookup(&Method::POST, "/v1/shelves/42").is_err());
//! ```
//!
//! ## Concurrency
//!
//! [`PathMatcher`] is immutable; lookups take `&self` and never lock. Reloads
//! build a new matcher and publish it through a [`MatcherHandle`].

mod bindings;
mod core;
mod handle;
mod trie;
#[cfg(test)]
mod tests;

pub use bindings::{BindingTable, ParamVec, VariableBinding, MAX_INLINE_PARAMS};
pub use core::{DuplicatePolicy, MatchResult, PathMatcher, PathMatcherBuilder, Route};
pub use handle::MatcherHandle;
