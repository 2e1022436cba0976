//! # CLI Module
//!
//! Command-line front end for inspecting rule files and templates.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Parse and register every route of a rule file:
//!
//! ```bash
//! path-matcher check --rules service.yaml
//! ```
//!
//! ### `routes`
//!
//! List the registered routes with their selectors:
//!
//! ```bash
//! path-matcher routes --rules service.yaml
//! ```
//!
//! ### `match`
//!
//! Resolve one request and print the selector and variables as JSON:
//!
//! ```bash
//! path-matcher match --rules service.yaml --method POST /v1/shelves/1/books
//! ```
//!
//! ### `regex` / `rename`
//!
//! Template projections for consumers without the trie matcher:
//!
//! ```bash
//! path-matcher regex '/v1/{name=shelves/*}/books/**'
//! path-matcher rename '/v1/{book_id}' --map book_id=bookId
//! path-matcher rename '/v1/{shelf.shelf_id}' --camel
//! ```
//!
//! Runtime behaviour (duplicate policy, invalid routes) follows
//! [`RuntimeConfig::from_env`](crate::runtime_config::RuntimeConfig::from_env).

mod commands;


pub use commands::{run_cli, run_command, Cli, Commands};
