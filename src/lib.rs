//! # path-matcher
//!
//! **path-matcher** resolves concrete HTTP request paths against Google API
//! http-templates (`/v1/{name=shelves/*}/books/**:verb`) and extracts the
//! values of the named variables. It is the routing core an API gateway proxy
//! needs to map a request to the API method (operation) it belongs to.
//!
//! ## Architecture
//!
//! - **[`template`]** - Template parser and data model (segments, variables, verb)
//! - **[`router`]** - Segment trie, registration, lookup and variable extraction
//! - **[`projection`]** - Regex projection and variable renaming for external consumers
//! - **[`http_rule`]** - `google.api.Http` rule documents (YAML / JSON)
//! - **[`runtime_config`]** - Environment-driven build policies
//! - **[`hot_reload`]** - Rebuild and republish the matcher when a rule file changes
//! - **[`logging`]** - `tracing-subscriber` setup
//! - **[`cli`]** - The `path-matcher` command-line tool
//!
//! ### Request Matching Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Proxy
//!     participant Handle as MatcherHandle
//!     participant Matcher as PathMatcher
//!     participant Trie as TrieNode
//!     participant Bindings as BindingTable
//!
//!     Proxy->>Handle: load()
//!     Handle-->>Proxy: current matcher
//!     Proxy->>Matcher: lookup(POST, "/v1/shelves/1/books:publish")
//!     Matcher->>Matcher: strip query, split segments,<br/>split registered verb
//!     Matcher->>Trie: search(segments)
//!     Trie->>Trie: literal, then *, then **<br/>(backtracking)
//!     Trie-->>Matcher: route index
//!     Matcher->>Bindings: extract(segments)
//!     Bindings-->>Matcher: {parent: "shelves/1"}
//!     Matcher-->>Proxy: MatchResult (operation, variables)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use path_matcher::PathMatcher;
//!
//! let mut builder = PathMatcher::builder();
//! builder
//!     .register(Method::POST, "/v1/{parent=shelves/*}/books", "CreateBook")
//!     .unwrap();
//! builder
//!     .register(Method::GET, "/v1/{name=shelves/*/books/*}", "GetBook")
//!     .unwrap();
//! let matcher = builder.build();
//!
//! let found = matcher.lookup(&Method::GET, "/v1/shelves/1/books/2").unwrap();
//! assert_eq!(*found.operation(), "GetBook");
//! assert_eq!(found.get("name"), Some("shelves/1/books/2"));
//! ```
//!
//! ## Configuration
//!
//! Route tables are usually loaded from a rule document:
//!
//! ```yaml
//! http:
//!   rules:
//!     - selector: library.v1.Library.GetShelf
//!       get: /v1/{name=shelves/*}
//! ```
//!
//! See [`http_rule::load_matcher`] and [`runtime_config::RuntimeConfig`].

pub mod cli;
pub mod error;
pub mod hot_reload;
pub mod http_rule;
pub mod logging;
pub mod projection;
pub mod router;
pub mod runtime_config;
pub mod template;

pub use error::{NotFound, ParseError, RegisterError};
pub use projection::{
    camel_case_variable_names, compile_template_regex, project_variable_names, template_to_regex,
};
pub use router::{DuplicatePolicy, MatchResult, MatcherHandle, PathMatcher, PathMatcherBuilder};
pub use template::Template;
