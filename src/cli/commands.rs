use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::json;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use crate::http_rule;
use crate::projection::{camel_case_variable_names, project_variable_names, template_to_regex};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for the path matcher
#[derive(Parser, Debug)]
#[command(name = "path-matcher")]
#[command(about = "Google API http-template path matcher", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Parse and register every route of a rule file
    Check {
        /// Path to the rule document (YAML or JSON)
        #[arg(short, long)]
        rules: PathBuf,
    },
    /// List the registered routes of a rule file
    Routes {
        /// Path to the rule document (YAML or JSON)
        #[arg(short, long)]
        rules: PathBuf,
    },
    /// Match a request path against a rule file and print the result as JSON
    Match {
        /// Path to the rule document (YAML or JSON)
        #[arg(short, long)]
        rules: PathBuf,

        /// HTTP method of the request
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, optionally with query string
        path: String,
    },
    /// Print the anchored regex projection of a template
    Regex {
        /// Path template, e.g. `/v1/{name=shelves/*}`
        template: String,
    },
    /// Rename variable field paths inside a template
    Rename {
        /// Path template, e.g. `/v1/{book_id}`
        template: String,

        /// Rename pairs `old=new` (comma-separated or repeated)
        #[arg(long, value_delimiter = ',', conflicts_with = "camel")]
        map: Vec<String>,

        /// Rename every field path component to lowerCamelCase
        #[arg(long, default_value_t = false)]
        camel: bool,
    },
}

/// Parse the process arguments and run the selected command against stdout.
///
/// # Errors
///
/// Returns the command's error; the binary reports it and exits non-zero.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(&cli.command, &RuntimeConfig::from_env(), &mut out)
}

/// Run one command, writing its output to `out`.
///
/// # Errors
///
/// Fails if a rule file cannot be loaded, a template is malformed, or a
/// `match` finds no route.
pub fn run_command<W: Write>(
    command: &Commands,
    config: &RuntimeConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Check { rules } => {
            let matcher = http_rule::load_matcher(rules, config)?;
            writeln!(
                out,
                "OK: {} routes registered from {}",
                matcher.len(),
                rules.display()
            )?;
            Ok(())
        }
        Commands::Routes { rules } => {
            let matcher = http_rule::load_matcher(rules, config)?;
            for route in matcher.routes() {
                writeln!(
                    out,
                    "{:<7} {} -> {}",
                    route.method().as_str(),
                    route.pattern(),
                    route.operation()
                )?;
            }
            Ok(())
        }
        Commands::Match {
            rules,
            method,
            path,
        } => {
            let matcher = http_rule::load_matcher(rules, config)?;
            let method = Method::from_bytes(method.as_bytes())
                .with_context(|| format!("invalid HTTP method `{method}`"))?;
            match matcher.lookup(&method, path) {
                Ok(matched) => {
                    let body = json!({
                        "method": method.as_str(),
                        "path": path,
                        "selector": matched.operation(),
                        "template": matched.route().pattern(),
                        "variables": matched.to_map(),
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
                    Ok(())
                }
                Err(not_found) => {
                    let allowed = matcher.allowed_methods(path);
                    if allowed.is_empty() {
                        Err(not_found.into())
                    } else {
                        let allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
                        Err(anyhow!(not_found).context(format!(
                            "method not allowed; path accepts {}",
                            allowed.join(", ")
                        )))
                    }
                }
            }
        }
        Commands::Regex { template } => {
            match template_to_regex(template)? {
                Some(pattern) => writeln!(out, "{pattern}")?,
                None => writeln!(out, "{template} is fully literal; no regex needed")?,
            }
            Ok(())
        }
        Commands::Rename {
            template,
            map,
            camel,
        } => {
            let renamed = if *camel {
                camel_case_variable_names(template)?
            } else {
                if map.is_empty() {
                    bail!("rename needs --map old=new or --camel");
                }
                project_variable_names(template, &parse_rename_map(map)?)
            };
            writeln!(out, "{renamed}")?;
            Ok(())
        }
    }
}

fn parse_rename_map(pairs: &[String]) -> anyhow::Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (from, to) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("invalid rename `{pair}`, expected old=new"))?;
            Ok((from.trim().to_string(), to.trim().to_string()))
        })
        .collect()
}
