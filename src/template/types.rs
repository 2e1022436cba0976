use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Dot-separated identifier path naming where a captured value is written
/// (e.g. `shelf.book.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub(crate) fn new(components: Vec<String>) -> Self {
        Self(components)
    }

    /// Identifiers in order, outermost first.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(component)?;
        }
        Ok(())
    }
}

/// A segment allowed inside a variable's sub-pattern.
///
/// Variables never nest, so this is [`Segment`] without the `Variable` arm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubSegment {
    /// Exact text of one path segment.
    Literal(String),
    /// `*`: exactly one path segment, any content.
    SingleWildcard,
    /// `**`: zero or more remaining path segments.
    DoubleWildcard,
}

impl SubSegment {
    #[must_use]
    pub fn is_double_wildcard(&self) -> bool {
        matches!(self, SubSegment::DoubleWildcard)
    }
}

impl fmt::Display for SubSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubSegment::Literal(text) => f.write_str(text),
            SubSegment::SingleWildcard => f.write_str("*"),
            SubSegment::DoubleWildcard => f.write_str("**"),
        }
    }
}

/// A named capture: `{field.path=sub/pattern}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub field_path: FieldPath,
    /// What the variable may match. Never empty; `{name}` is `[SingleWildcard]`.
    pub pattern: Vec<SubSegment>,
}

impl Variable {
    /// Whether the variable can span more than one path segment.
    #[must_use]
    pub fn is_multi_segment(&self) -> bool {
        self.pattern.len() > 1 || self.pattern.iter().any(SubSegment::is_double_wildcard)
    }
}

/// Top-level template segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    SingleWildcard,
    DoubleWildcard,
    Variable(Variable),
}

/// A parsed path template: top-level segments plus an optional custom verb.
///
/// Invariants upheld by the parser:
/// - at most one `**`, and nothing follows it;
/// - variables do not nest;
/// - field paths are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template {
    pub(crate) segments: Vec<Segment>,
    pub(crate) verb: Option<String>,
}

impl Template {
    /// Parse a template string. See [`parse`](super::parse).
    pub fn parse(template: &str) -> Result<Self, ParseError> {
        super::parser::parse(template)
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Custom verb following the final `:`, if any.
    #[must_use]
    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    /// Variables in template order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(variable) => Some(variable),
            _ => None,
        })
    }

    /// Whether matching needs anything beyond exact text comparison.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| !matches!(segment, Segment::Literal(_)))
    }

    /// The template with variables unwrapped into their sub-patterns.
    ///
    /// This is the shape the trie and the regex projection operate on:
    /// variables are an annotation over positions, not a matching axis.
    #[must_use]
    pub fn flatten(&self) -> Vec<SubSegment> {
        let mut flat = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => flat.push(SubSegment::Literal(text.clone())),
                Segment::SingleWildcard => flat.push(SubSegment::SingleWildcard),
                Segment::DoubleWildcard => flat.push(SubSegment::DoubleWildcard),
                Segment::Variable(variable) => flat.extend(variable.pattern.iter().cloned()),
            }
        }
        flat
    }
}

impl FromStr for Template {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical rendering. `{name=*}` renders as `{name}`; everything else is
/// reproduced as written, so `parse(render(t)) == t` for every parsed `t`.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str("/")?;
        }
        for segment in &self.segments {
            f.write_str("/")?;
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::SingleWildcard => f.write_str("*")?,
                Segment::DoubleWildcard => f.write_str("**")?,
                Segment::Variable(variable) => {
                    write!(f, "{{{}", variable.field_path)?;
                    if variable.pattern != [SubSegment::SingleWildcard] {
                        f.write_str("=")?;
                        for (i, sub) in variable.pattern.iter().enumerate() {
                            if i > 0 {
                                f.write_str("/")?;
                            }
                            write!(f, "{sub}")?;
                        }
                    }
                    f.write_str("}")?;
                }
            }
        }
        if let Some(verb) = &self.verb {
            write!(f, ":{verb}")?;
        }
        Ok(())
    }
}
