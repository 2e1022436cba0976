//! # Template Projections
//!
//! Transforms for consumers that cannot embed the trie matcher:
//!
//! - [`template_to_regex`] projects a template into an anchored regular
//!   expression over raw path text. It is derived from the same parsed
//!   [`Template`] the trie is built from, so both agree on what matches.
//! - [`project_variable_names`] rewrites variable names inside a template
//!   string (e.g. `snake_case` field names to their JSON `camelCase` names)
//!   for templates that are re-exposed externally.

use regex::Regex;
use std::collections::HashMap;

use crate::error::ParseError;
use crate::template::{SubSegment, Template};

/// Matches one non-empty path segment.
const SINGLE_WILDCARD_REGEX: &str = "/[^/]+";
/// Matches zero or more remaining segments.
const DOUBLE_WILDCARD_REGEX: &str = "(?:/.*)?";

/// Project a template string into an anchored regex (`^...$`).
///
/// Returns `Ok(None)` when the template has no wildcard or variable, meaning
/// no dynamic matching is needed. The custom verb and HTTP method are not
/// part of the projection.
///
/// ```rust
/// use path_matcher::projection::template_to_regex;
///
/// assert_eq!(
///     template_to_regex("/v1/{name=shelves/*}/books/**").unwrap().as_deref(),
///     Some("^/v1/shelves/[^/]+/books(?:/.*)?$")
/// );
/// assert_eq!(template_to_regex("/v1/shelves").unwrap(), None);
/// ```
///
/// # Errors
///
/// [`ParseError`] if the template is malformed.
pub fn template_to_regex(template: &str) -> Result<Option<String>, ParseError> {
    Ok(regex_for(&Template::parse(template)?))
}

/// Anchored regex for an already parsed template; `None` if it is fully literal.
#[must_use]
pub fn regex_for(template: &Template) -> Option<String> {
    if !template.is_dynamic() {
        return None;
    }
    let mut pattern = String::from("^");
    for segment in template.flatten() {
        match segment {
            SubSegment::Literal(text) => {
                pattern.push('/');
                pattern.push_str(&regex::escape(&text));
            }
            SubSegment::SingleWildcard => pattern.push_str(SINGLE_WILDCARD_REGEX),
            SubSegment::DoubleWildcard => pattern.push_str(DOUBLE_WILDCARD_REGEX),
        }
    }
    pattern.push('$');
    Some(pattern)
}

/// Compile the projection of `template`.
///
/// # Errors
///
/// Fails if the template is malformed or the generated pattern does not
/// compile.
pub fn compile_template_regex(template: &str) -> anyhow::Result<Option<Regex>> {
    match template_to_regex(template)? {
        Some(pattern) => Ok(Some(Regex::new(&pattern)?)),
        None => Ok(None),
    }
}

/// Replace variable field-path names in `template` according to `rename`.
///
/// An occurrence of a name qualifies only if it is preceded by `{` or `.` and
/// followed by `}`, `.` or `=`, i.e. it sits inside a variable's field path.
/// Only the first qualifying occurrence of each name is replaced; literal text
/// that happens to contain the name is left untouched. All occurrences are
/// located in the original template, so a name's replacement is never renamed
/// again by another entry. The template is not validated.
///
/// ```rust
/// use path_matcher::projection::project_variable_names;
/// use std::collections::HashMap;
///
/// let rename = HashMap::from([("book_id".to_string(), "bookId".to_string())]);
/// assert_eq!(
///     project_variable_names("/v1/book_id/{book_id}", &rename),
///     "/v1/book_id/{bookId}"
/// );
/// ```
#[must_use]
pub fn project_variable_names(template: &str, rename: &HashMap<String, String>) -> String {
    let mut edits: Vec<(usize, &str, &str)> = rename
        .iter()
        .filter_map(|(from, to)| {
            find_field_name(template, from).map(|index| (index, from.as_str(), to.as_str()))
        })
        .collect();
    // Earliest first, longest first at the same offset; overlapping edits lose.
    edits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())).then(a.1.cmp(b.1)));

    let mut projected = String::with_capacity(template.len());
    let mut copied = 0;
    for (index, from, to) in edits {
        if index < copied {
            continue;
        }
        projected.push_str(&template[copied..index]);
        projected.push_str(to);
        copied = index + from.len();
    }
    projected.push_str(&template[copied..]);
    projected
}

/// Byte offset of the first occurrence of `name` bounded by field-path delimiters.
fn find_field_name(template: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let bytes = template.as_bytes();
    template.match_indices(name).map(|(i, _)| i).find(|&i| {
        let end = i + name.len();
        i > 0
            && end < bytes.len()
            && matches!(bytes[i - 1], b'{' | b'.')
            && matches!(bytes[end], b'}' | b'.' | b'=')
    })
}

/// Rename every field-path component of `template` to lowerCamelCase.
///
/// Every occurrence is renamed, including a component repeated across
/// several field paths. Literals, sub-patterns and the verb are kept as
/// written.
///
/// # Errors
///
/// [`ParseError`] if the template is malformed.
pub fn camel_case_variable_names(template: &str) -> Result<String, ParseError> {
    Template::parse(template)?;

    // A parsed template has `{` only where a variable opens, and its field
    // path runs up to the first `=` or `}`.
    let mut camel = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        camel.push_str(&rest[..=open]);
        rest = &rest[open + 1..];
        let end = rest.find(['=', '}']).unwrap_or(rest.len());
        for (i, component) in rest[..end].split('.').enumerate() {
            if i > 0 {
                camel.push('.');
            }
            camel.push_str(&snake_to_camel(component));
        }
        rest = &rest[end..];
    }
    camel.push_str(rest);
    Ok(camel)
}

/// `book_id` -> `bookId`. Leading underscores are kept.
fn snake_to_camel(name: &str) -> String {
    let leading = name.len() - name.trim_start_matches('_').len();
    let mut camel = String::with_capacity(name.len());
    camel.push_str(&name[..leading]);
    let mut upper_next = false;
    for c in name[leading..].chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            camel.extend(c.to_uppercase());
            upper_next = false;
        } else {
            camel.push(c);
        }
    }
    camel
}
