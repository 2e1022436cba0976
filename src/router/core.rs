//! Matcher core: registration, freezing and lookup.
//!
//! Routes are registered into a [`PathMatcherBuilder`] by a single owner.
//! [`PathMatcherBuilder::build`] consumes the builder and returns a
//! [`PathMatcher`], which has no mutating methods and can be shared freely
//! between request-handling threads.

use http::Method;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{NotFound, RegisterError};
use crate::template::Template;

use super::bindings::{BindingTable, ParamVec};
use super::trie::TrieNode;

/// Inline capacity for request path segments.
const INLINE_SEGMENTS: usize = 16;

type Segments<'p> = SmallVec<[&'p str; INLINE_SEGMENTS]>;

/// What to do when a registration conflicts with an earlier one: the same
/// method and normalized template, or a template it would be indistinguishable
/// from at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`RegisterError::Conflict`].
    #[default]
    Reject,
    /// Log a warning and keep the first registration.
    KeepFirst,
}

/// A registered `(method, template, operation)` tuple.
#[derive(Debug, Clone)]
pub struct Route<T> {
    method: Method,
    template: Template,
    pattern: String,
    operation: T,
    bindings: BindingTable,
}

impl<T> Route<T> {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Canonical rendering of the template, used for conflict detection.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The caller's opaque operation identifier.
    #[must_use]
    pub fn operation(&self) -> &T {
        &self.operation
    }

    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }
}

/// Collects routes and builds the immutable [`PathMatcher`].
#[derive(Debug, Clone)]
pub struct PathMatcherBuilder<T> {
    root: TrieNode,
    routes: Vec<Route<T>>,
    registered: HashSet<(Method, String)>,
    verbs: HashSet<Box<str>>,
    duplicate_policy: DuplicatePolicy,
    slow_lookup_threshold: Duration,
}

impl<T> Default for PathMatcherBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathMatcherBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            routes: Vec::new(),
            registered: HashSet::new(),
            verbs: HashSet::new(),
            duplicate_policy: DuplicatePolicy::default(),
            slow_lookup_threshold: Duration::from_millis(1),
        }
    }

    #[must_use]
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Lookups slower than this are logged at `warn`.
    #[must_use]
    pub fn slow_lookup_threshold(mut self, threshold: Duration) -> Self {
        self.slow_lookup_threshold = threshold;
        self
    }

    /// Number of routes registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Parse `template` and register it for `method`.
    ///
    /// # Errors
    ///
    /// [`RegisterError::Parse`] if the template is malformed and
    /// [`RegisterError::Conflict`] if `(method, template)` is already bound
    /// under [`DuplicatePolicy::Reject`].
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        operation: T,
    ) -> Result<(), RegisterError> {
        let template = Template::parse(template)?;
        self.register_template(method, template, operation)
    }

    /// Like [`register`](Self::register) with the method given as a string
    /// (e.g. the `kind` of a custom HTTP rule).
    ///
    /// # Errors
    ///
    /// [`RegisterError::InvalidMethod`] if `method` is not a valid token, plus
    /// everything [`register`](Self::register) reports.
    pub fn register_str(
        &mut self,
        method: &str,
        template: &str,
        operation: T,
    ) -> Result<(), RegisterError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| RegisterError::InvalidMethod(method.to_string()))?;
        self.register(method, template, operation)
    }

    /// Register an already parsed template.
    ///
    /// Two templates for the same method conflict when their canonical text is
    /// identical, or when they reach the same trie terminal with the same verb
    /// and the same number of variables (e.g. `/v1/books/{a}` and
    /// `/v1/books/{b}`), since the later one could never be selected.
    ///
    /// # Errors
    ///
    /// [`RegisterError::Conflict`] for a conflicting registration under
    /// [`DuplicatePolicy::Reject`].
    pub fn register_template(
        &mut self,
        method: Method,
        template: Template,
        operation: T,
    ) -> Result<(), RegisterError> {
        let pattern = template.to_string();
        let bindings = BindingTable::from_template(&template);
        let verb = template.verb().map(Box::<str>::from);
        let flat = template.flatten();

        let key = (method.clone(), pattern.clone());
        if self.registered.contains(&key) {
            return self.duplicate(method, pattern, None);
        }
        let shadowing = self
            .root
            .get_path(&flat)
            .map(|node| node.bound(&method, verb.as_deref()))
            .unwrap_or_default()
            .iter()
            .find(|&&i| self.routes[i].bindings.len() == bindings.len())
            .map(|&i| self.routes[i].pattern.clone());
        if let Some(existing) = shadowing {
            return self.duplicate(method, pattern, Some(&existing));
        }
        self.registered.insert(key);

        let index = self.routes.len();

        debug!(
            method = %method,
            template = %pattern,
            variables = bindings.len(),
            route_index = index,
            "Registering route"
        );

        self.routes.push(Route {
            method: method.clone(),
            template,
            pattern,
            operation,
            bindings,
        });

        let routes = &self.routes;
        let candidates = self
            .root
            .insert_path(&flat)
            .bindings_mut(method, verb.as_deref());
        candidates.push(index);
        candidates.sort_by_key(|&i| (Reverse(routes[i].bindings.len()), i));

        if let Some(verb) = verb {
            self.verbs.insert(verb);
        }
        Ok(())
    }

    /// Apply the duplicate policy to a rejected registration.
    fn duplicate(
        &self,
        method: Method,
        pattern: String,
        existing: Option<&str>,
    ) -> Result<(), RegisterError> {
        match self.duplicate_policy {
            DuplicatePolicy::Reject => Err(RegisterError::Conflict {
                method,
                template: pattern,
            }),
            DuplicatePolicy::KeepFirst => {
                warn!(
                    method = %method,
                    template = %pattern,
                    existing = existing.unwrap_or(pattern.as_str()),
                    "Duplicate route registration skipped, first registration wins"
                );
                Ok(())
            }
        }
    }

    /// Freeze the builder into an immutable matcher.
    #[must_use]
    pub fn build(self) -> PathMatcher<T> {
        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|route| format!("{} {}", route.method, route.pattern))
            .collect();

        info!(
            routes_count = self.routes.len(),
            verbs_count = self.verbs.len(),
            trie_nodes = self.root.node_count(),
            routes_summary = ?routes_summary,
            "Path matcher built"
        );

        PathMatcher {
            root: self.root,
            routes: self.routes,
            verbs: self.verbs,
            slow_lookup_threshold: self.slow_lookup_threshold,
        }
    }
}

/// Immutable, lock-free-readable route matcher.
#[derive(Debug, Clone)]
pub struct PathMatcher<T> {
    root: TrieNode,
    routes: Vec<Route<T>>,
    verbs: HashSet<Box<str>>,
    slow_lookup_threshold: Duration,
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct MatchResult<'m, T> {
    route: &'m Route<T>,
    variables: ParamVec,
}

impl<'m, T> MatchResult<'m, T> {
    /// The operation identifier registered with the matched route.
    #[must_use]
    pub fn operation(&self) -> &'m T {
        &self.route.operation
    }

    #[must_use]
    pub fn route(&self) -> &'m Route<T> {
        self.route
    }

    /// Raw captured text per field path, in template order.
    #[must_use]
    pub fn variables(&self) -> &ParamVec {
        &self.variables
    }

    /// Raw captured text for a field path such as `shelf.name`.
    #[inline]
    #[must_use]
    pub fn get(&self, field_path: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(name, _)| name.as_ref() == field_path)
            .map(|(_, value)| value.as_str())
    }

    /// Percent-decoded captured text for a field path.
    ///
    /// Captures that can span several segments keep `%2F` encoded so a
    /// decoded value never gains segment boundaries the path did not have.
    /// Returns `None` for unknown field paths and invalid UTF-8.
    #[must_use]
    pub fn decoded(&self, field_path: &str) -> Option<String> {
        let raw = self.get(field_path)?;
        let multi_segment = self
            .route
            .bindings
            .iter()
            .any(|b| b.multi_segment && b.field_path.as_ref() == field_path);
        if !multi_segment {
            return urlencoding::decode(raw).ok().map(|s| s.into_owned());
        }
        let mut decoded = String::with_capacity(raw.len());
        for (i, part) in split_keep_encoded_slash(raw).into_iter().enumerate() {
            if i > 0 {
                decoded.push_str("%2F");
            }
            decoded.push_str(&urlencoding::decode(part).ok()?);
        }
        Some(decoded)
    }

    /// Copy the variables into a `HashMap`.
    /// Note: This allocates - use [`get`](Self::get) in hot paths instead
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.variables
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Split on `%2F` / `%2f` so the pieces can be decoded independently.
fn split_keep_encoded_slash(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = raw;
    while let Some(i) = rest
        .as_bytes()
        .windows(3)
        .position(|w| w[0] == b'%' && w[1] == b'2' && (w[2] == b'F' || w[2] == b'f'))
    {
        parts.push(&rest[..i]);
        rest = &rest[i + 3..];
    }
    parts.push(rest);
    parts
}

impl<T> PathMatcher<T> {
    /// Shorthand for `PathMatcherBuilder::new()`.
    #[must_use]
    pub fn builder() -> PathMatcherBuilder<T> {
        PathMatcherBuilder::new()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<T>> {
        self.routes.iter()
    }

    /// Match a request.
    ///
    /// Anything from the first `?` or `#` is ignored. A trailing `:verb` on the
    /// last segment is split off when some registered template carries that
    /// verb; if that fails, the path is retried as-is against verb-less
    /// templates. A method with no binding at an otherwise matching node is
    /// reported as [`NotFound`]; see [`allowed_methods`](Self::allowed_methods).
    ///
    /// # Errors
    ///
    /// [`NotFound`] when no registered route matches.
    pub fn lookup(&self, method: &Method, path: &str) -> Result<MatchResult<'_, T>, NotFound> {
        let start = Instant::now();
        let segments = split_path(path);

        let mut found = None;
        if let Some((stripped, verb)) = self.split_verb(&segments) {
            found = self
                .find(method, &stripped, Some(verb))
                .map(|index| self.matched(index, &stripped));
        }
        if found.is_none() {
            found = self
                .find(method, &segments, None)
                .map(|index| self.matched(index, &segments));
        }

        let elapsed = start.elapsed();
        match found {
            Some(result) => {
                if elapsed > self.slow_lookup_threshold {
                    warn!(
                        method = %method,
                        path = %path,
                        template = %result.route.pattern,
                        duration_us = elapsed.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        template = %result.route.pattern,
                        variables = ?result.variables,
                        duration_us = elapsed.as_micros(),
                        "Route matched"
                    );
                }
                Ok(result)
            }
            None => {
                debug!(
                    method = %method,
                    path = %path,
                    duration_us = elapsed.as_micros(),
                    "No route matched"
                );
                Err(NotFound {
                    method: method.to_string(),
                    path: path.to_string(),
                })
            }
        }
    }

    /// [`lookup`](Self::lookup) with the method given as a string. An invalid
    /// method token matches nothing.
    ///
    /// # Errors
    ///
    /// [`NotFound`] when no registered route matches.
    pub fn lookup_str(&self, method: &str, path: &str) -> Result<MatchResult<'_, T>, NotFound> {
        match Method::from_bytes(method.as_bytes()) {
            Ok(method) => self.lookup(&method, path),
            Err(_) => Err(NotFound {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Methods bound at any node the path structurally matches, sorted by name.
    ///
    /// An empty result means "not found"; a non-empty result that does not
    /// contain the request method means "method not allowed".
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let segments = split_path(path);
        let mut methods: Vec<Method> = Vec::new();
        let mut visit = |segments: &[&str], verb: Option<&str>| {
            self.root.search(segments, &mut |node: &TrieNode| {
                for method in node.methods(verb) {
                    if !methods.contains(method) {
                        methods.push(method.clone());
                    }
                }
                None::<()>
            });
        };
        if let Some((stripped, verb)) = self.split_verb(&segments) {
            visit(&stripped, Some(verb));
        }
        visit(&segments, None);
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self)
    where
        T: fmt::Debug,
    {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!(
                "[route] {} {} -> {:?}",
                route.method, route.pattern, route.operation
            );
        }
    }

    fn find(&self, method: &Method, segments: &[&str], verb: Option<&str>) -> Option<usize> {
        self.root
            .search(segments, &mut |node| node.terminal(method, verb))
    }

    fn matched(&self, index: usize, segments: &[&str]) -> MatchResult<'_, T> {
        let route = &self.routes[index];
        MatchResult {
            route,
            variables: route.bindings.extract(segments),
        }
    }

    /// Split a registered custom verb off the last segment.
    fn split_verb<'p>(&self, segments: &Segments<'p>) -> Option<(Segments<'p>, &'p str)> {
        if self.verbs.is_empty() {
            return None;
        }
        let last: &'p str = segments.last().copied()?;
        let (head, verb) = last.rsplit_once(':')?;
        if !self.verbs.contains(verb) {
            return None;
        }
        let mut stripped = segments.clone();
        let len = stripped.len();
        stripped[len - 1] = head;
        Some((stripped, verb))
    }
}

/// Split a request path into segments, ignoring query and fragment.
///
/// `/` yields no segments; empty segments (`//`, trailing `/`) are kept.
fn split_path(path: &str) -> Segments<'_> {
    let path = match path.find(['?', '#']) {
        Some(end) => &path[..end],
        None => path,
    };
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Segments::new();
    }
    path.split('/').collect()
}
