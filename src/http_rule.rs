//! # HTTP Rule Configuration
//!
//! Loads route tables written as `google.api.Http` rule documents and builds a
//! [`PathMatcher`] keyed by each rule's `selector`.
//!
//! ```yaml
//! http:
//!   rules:
//!     - selector: library.v1.Library.GetShelf
//!       get: /v1/{name=shelves/*}
//!     - selector: library.v1.Library.CreateBook
//!       post: /v1/{parent=shelves/*}/books
//!       body: book
//!       additional_bindings:
//!         - post: /v1/books
//!     - selector: library.v1.Library.Probe
//!       custom: { kind: HEAD, path: /v1/probe }
//! ```
//!
//! Documents ending in `.yaml` / `.yml` are read as YAML, anything else as JSON.

use anyhow::{bail, Context};
use http::Method;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::router::{PathMatcher, PathMatcherBuilder};
use crate::runtime_config::{InvalidRoutePolicy, RuntimeConfig};

/// Top-level rule document (the `http` section of a service config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHttpConfig {
    #[serde(default)]
    pub http: HttpRules,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRules {
    #[serde(default)]
    pub rules: Vec<HttpRule>,
}

/// Custom pattern for methods without a dedicated field (`HEAD`, `OPTIONS`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub kind: String,
    pub path: String,
}

/// One HTTP binding of an API method.
///
/// Exactly one of `get`, `put`, `post`, `delete`, `patch` or `custom` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRule {
    /// Operation identifier; inherited by additional bindings.
    #[serde(default)]
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomPattern>,
    /// Request field mapped from the body. Carried through, not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_bindings: Vec<HttpRule>,
}

impl HttpRule {
    /// The `(method, template)` this rule binds.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one pattern is set, or if a custom kind is not a
    /// valid method token.
    pub fn pattern(&self) -> anyhow::Result<(Method, &str)> {
        let mut patterns = Vec::with_capacity(1);
        if let Some(path) = &self.get {
            patterns.push((Method::GET, path.as_str()));
        }
        if let Some(path) = &self.put {
            patterns.push((Method::PUT, path.as_str()));
        }
        if let Some(path) = &self.post {
            patterns.push((Method::POST, path.as_str()));
        }
        if let Some(path) = &self.delete {
            patterns.push((Method::DELETE, path.as_str()));
        }
        if let Some(path) = &self.patch {
            patterns.push((Method::PATCH, path.as_str()));
        }
        if let Some(custom) = &self.custom {
            let method = Method::from_bytes(custom.kind.as_bytes())
                .with_context(|| format!("invalid custom method kind `{}`", custom.kind))?;
            patterns.push((method, custom.path.as_str()));
        }
        match patterns.len() {
            1 => Ok(patterns.remove(0)),
            0 => bail!("rule `{}` has no HTTP pattern", self.selector),
            n => bail!("rule `{}` has {n} HTTP patterns, expected one", self.selector),
        }
    }
}

/// A flattened `(method, template, selector)` registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub method: Method,
    pub template: String,
    pub selector: String,
    pub body: Option<String>,
}

impl ServiceHttpConfig {
    /// Parse a rule document from text. `yaml` selects the format.
    ///
    /// # Errors
    ///
    /// Fails on syntax errors or fields of the wrong type.
    pub fn from_str_with_format(content: &str, yaml: bool) -> anyhow::Result<Self> {
        let config = if yaml {
            serde_yaml::from_str(content).context("failed to parse YAML rule document")?
        } else {
            serde_json::from_str(content).context("failed to parse JSON rule document")?
        };
        Ok(config)
    }

    /// Flatten rules and their additional bindings in document order.
    ///
    /// # Errors
    ///
    /// Fails if a rule has no selector, has other than one pattern, or nests
    /// additional bindings.
    pub fn routes(&self) -> anyhow::Result<Vec<RouteSpec>> {
        let mut routes = Vec::new();
        for rule in &self.http.rules {
            if rule.selector.is_empty() {
                bail!("HTTP rule without selector");
            }
            routes.push(route_spec(rule, &rule.selector)?);
            for binding in &rule.additional_bindings {
                if !binding.additional_bindings.is_empty() {
                    bail!(
                        "rule `{}`: additional bindings may not nest",
                        rule.selector
                    );
                }
                routes.push(route_spec(binding, &rule.selector)?);
            }
        }
        Ok(routes)
    }
}

fn route_spec(rule: &HttpRule, selector: &str) -> anyhow::Result<RouteSpec> {
    let (method, template) = rule
        .pattern()
        .with_context(|| format!("invalid HTTP rule for `{selector}`"))?;
    Ok(RouteSpec {
        method,
        template: template.to_string(),
        selector: selector.to_string(),
        body: rule.body.clone(),
    })
}

/// Load a rule document from disk.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed.
pub fn load_rules<P: AsRef<Path>>(path: P) -> anyhow::Result<ServiceHttpConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule file {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    ServiceHttpConfig::from_str_with_format(&content, yaml)
        .with_context(|| format!("invalid rule file {}", path.display()))
}

/// Register `routes` into a new matcher configured from `config`.
///
/// # Errors
///
/// With [`InvalidRoutePolicy::Abort`], the first route that fails to register
/// aborts the build. With [`InvalidRoutePolicy::Skip`] failures are logged and
/// the route is left out.
pub fn build_matcher(
    routes: &[RouteSpec],
    config: &RuntimeConfig,
) -> anyhow::Result<PathMatcher<String>> {
    let mut builder = PathMatcherBuilder::new()
        .duplicate_policy(config.duplicate_policy)
        .slow_lookup_threshold(config.slow_lookup_threshold);
    let mut skipped = 0usize;

    for route in routes {
        let registered = builder.register(
            route.method.clone(),
            &route.template,
            route.selector.clone(),
        );
        if let Err(err) = registered {
            match config.invalid_routes {
                InvalidRoutePolicy::Abort => {
                    return Err(err).with_context(|| {
                        format!(
                            "failed to register {} {} for `{}`",
                            route.method, route.template, route.selector
                        )
                    });
                }
                InvalidRoutePolicy::Skip => {
                    skipped += 1;
                    warn!(
                        method = %route.method,
                        template = %route.template,
                        selector = %route.selector,
                        error = %err,
                        "Skipping invalid route"
                    );
                }
            }
        }
    }

    info!(
        routes_count = builder.len(),
        skipped,
        "Route table registered"
    );
    Ok(builder.build())
}

/// Load a rule file and build its matcher.
///
/// # Errors
///
/// See [`load_rules`] and [`build_matcher`].
pub fn load_matcher<P: AsRef<Path>>(
    path: P,
    config: &RuntimeConfig,
) -> anyhow::Result<PathMatcher<String>> {
    let rules = load_rules(path)?;
    build_matcher(&rules.routes()?, config)
}
