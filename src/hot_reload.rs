//! # Hot Reload Module
//!
//! Watches a rule document and republishes the matcher when it changes.
//!
//! ## Reload Process
//!
//! When the rule file changes:
//!
//! 1. **Detection** - Filesystem watcher reports a modify or create event
//! 2. **Build** - The document is parsed and a complete new matcher is built
//! 3. **Publish** - The new matcher is swapped into the [`MatcherHandle`]
//! 4. **Hook** - The caller's callback receives the published matcher
//!
//! If the new document fails to parse or register, the error is logged and
//! the previous matcher stays active. A document that yields no routes while
//! routes are currently published is treated as a partially written file and
//! ignored. In-flight lookups are never affected since they hold their own
//! reference to the matcher they started with.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use path_matcher::hot_reload::watch_rules;
//!
//! let handle = MatcherHandle::new(load_matcher("rules.yaml", &config)?);
//! let watcher = watch_rules("rules.yaml", handle.clone(), config, |matcher| {
//!     println!("Reloaded {} routes", matcher.len());
//! })?;
//! // Dropping the watcher stops reloads.
//! ```

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::http_rule;
use crate::router::{MatcherHandle, PathMatcher};
use crate::runtime_config::RuntimeConfig;

/// Watch a rule file and rebuild the matcher behind `handle` when it changes.
///
/// `on_reload` runs after each successful swap with the newly published
/// matcher.
///
/// # Errors
///
/// Fails if the watcher cannot be created or the path cannot be watched.
pub fn watch_rules<P, F>(
    rules_path: P,
    handle: MatcherHandle<String>,
    config: RuntimeConfig,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(Arc<PathMatcher<String>>) + Send + 'static,
{
    let path: PathBuf = rules_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match http_rule::load_matcher(&watch_path, &config) {
                        Ok(matcher) if matcher.is_empty() && !handle.load().is_empty() => {
                            warn!(
                                path = %watch_path.display(),
                                "hot-reload: rule file has no routes, keeping previous route table"
                            );
                        }
                        Ok(matcher) => {
                            info!(
                                path = %watch_path.display(),
                                routes_count = matcher.len(),
                                "hot-reload: applying route updates"
                            );
                            handle.swap(matcher);
                            on_reload(handle.snapshot());
                        }
                        Err(e) => {
                            error!(
                                path = %watch_path.display(),
                                error = format!("{e:#}"),
                                "hot-reload: keeping previous route table"
                            );
                        }
                    }
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
