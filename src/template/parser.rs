//! Recursive-descent parser for `google.api.http` path templates.
//!
//! ```text
//! Template    = "/" [ Segments ] [ ":" Verb ] ;
//! Segments    = Segment { "/" Segment } ;
//! Segment     = "*" | "**" | Literal | Variable ;
//! Variable    = "{" FieldPath [ "=" SubSegments ] "}" ;
//! FieldPath   = Ident { "." Ident } ;
//! SubSegments = SubSegment { "/" SubSegment } ;
//! SubSegment  = "*" | "**" | Literal ;
//! ```

use std::collections::HashSet;

use crate::error::ParseError;

use super::types::{FieldPath, Segment, SubSegment, Template, Variable};

/// Parse a template string into a [`Template`].
///
/// Literals are taken verbatim (no percent-decoding). `{`, `}` and `*` are
/// reserved inside literals; `:` starts the custom verb.
///
/// # Errors
///
/// [`ParseError::Malformed`] for grammar violations and
/// [`ParseError::DuplicateVariable`] when two variables bind the same field path.
pub fn parse(template: &str) -> Result<Template, ParseError> {
    Parser::new(template).parse_template()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    seen_double_wildcard: bool,
    field_paths: HashSet<String>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            seen_double_wildcard: false,
            field_paths: HashSet::new(),
        }
    }

    fn parse_template(mut self) -> Result<Template, ParseError> {
        if !self.consume(b'/') {
            return Err(self.malformed("template must start with `/`"));
        }

        let mut segments = Vec::new();
        if self.at_end() {
            return Ok(Template {
                segments,
                verb: None,
            });
        }
        if self.peek() == Some(b':') {
            return Err(self.malformed("custom verb requires at least one segment"));
        }

        loop {
            segments.push(self.parse_segment()?);
            match self.peek() {
                Some(b'/') => self.pos += 1,
                Some(b':') | None => break,
                Some(b'}') => return Err(self.malformed("unbalanced `}`")),
                Some(_) => return Err(self.malformed("reserved character in literal")),
            }
        }

        let verb = if self.consume(b':') {
            Some(self.parse_verb()?)
        } else {
            None
        };

        Ok(Template { segments, verb })
    }

    fn parse_segment(&mut self) -> Result<Segment, ParseError> {
        match self.peek() {
            Some(b'{') => self.parse_variable().map(Segment::Variable),
            _ => Ok(match self.parse_sub_segment()? {
                SubSegment::Literal(text) => Segment::Literal(text),
                SubSegment::SingleWildcard => Segment::SingleWildcard,
                SubSegment::DoubleWildcard => Segment::DoubleWildcard,
            }),
        }
    }

    fn parse_sub_segment(&mut self) -> Result<SubSegment, ParseError> {
        if self.seen_double_wildcard {
            return Err(self.malformed("`**` must be the final segment"));
        }
        match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                if self.consume(b'*') {
                    self.seen_double_wildcard = true;
                    Ok(SubSegment::DoubleWildcard)
                } else {
                    Ok(SubSegment::SingleWildcard)
                }
            }
            Some(b'{') => Err(self.malformed("nested variables are not allowed")),
            _ => self.parse_literal().map(SubSegment::Literal),
        }
    }

    fn parse_literal(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b'/' | b':' | b'{' | b'}' | b'*') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.malformed("empty segment"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_variable(&mut self) -> Result<Variable, ParseError> {
        self.pos += 1; // '{'
        let field_path = self.parse_field_path()?;

        let pattern = if self.consume(b'=') {
            let mut pattern = Vec::new();
            loop {
                pattern.push(self.parse_sub_segment()?);
                match self.peek() {
                    Some(b'/') => self.pos += 1,
                    Some(b'}') => break,
                    None => return Err(self.malformed("unterminated variable")),
                    Some(_) => return Err(self.malformed("reserved character in literal")),
                }
            }
            pattern
        } else {
            vec![SubSegment::SingleWildcard]
        };

        if !self.consume(b'}') {
            return Err(self.malformed("unterminated variable"));
        }

        let rendered = field_path.to_string();
        if !self.field_paths.insert(rendered.clone()) {
            return Err(ParseError::DuplicateVariable {
                template: self.input.to_string(),
                field_path: rendered,
            });
        }

        Ok(Variable {
            field_path,
            pattern,
        })
    }

    fn parse_field_path(&mut self) -> Result<FieldPath, ParseError> {
        let mut components = vec![self.parse_ident()?];
        while self.consume(b'.') {
            components.push(self.parse_ident()?);
        }
        match self.peek() {
            Some(b'=') | Some(b'}') => Ok(FieldPath::new(components)),
            None => Err(self.malformed("unterminated variable")),
            Some(_) => Err(self.malformed("invalid character in field path")),
        }
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.pos += 1,
            _ => return Err(self.malformed("field path identifier expected")),
        }
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == b'_') {
                break;
            }
            self.pos += 1;
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_verb(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b'/' | b':' | b'{' | b'}' | b'*') {
                return Err(self.malformed("invalid character in custom verb"));
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.malformed("empty custom verb"));
        }
        Ok(self.input[start..].to_string())
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn consume(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn malformed(&self, reason: &'static str) -> ParseError {
        ParseError::Malformed {
            template: self.input.to_string(),
            offset: self.pos,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Segment {
        Segment::Literal(text.to_string())
    }

    fn field(path: &str) -> FieldPath {
        FieldPath::new(path.split('.').map(str::to_string).collect())
    }

    fn reason(template: &str) -> &'static str {
        match parse(template) {
            Err(ParseError::Malformed { reason, .. }) => reason,
            other => panic!("expected malformed error for {template}, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_root() {
        let t = parse("/").unwrap();
        assert!(t.segments().is_empty());
        assert_eq!(t.verb(), None);
    }

    #[test]
    fn test_parse_literals_and_wildcards() {
        let t = parse("/v1/shelves/*/books/**").unwrap();
        assert_eq!(
            t.segments(),
            &[
                literal("v1"),
                literal("shelves"),
                Segment::SingleWildcard,
                literal("books"),
                Segment::DoubleWildcard,
            ]
        );
    }

    #[test]
    fn test_parse_variable_defaults_to_single_wildcard() {
        let t = parse("/v1/books/{book_id}").unwrap();
        assert_eq!(
            t.segments()[2],
            Segment::Variable(Variable {
                field_path: field("book_id"),
                pattern: vec![SubSegment::SingleWildcard],
            })
        );
    }

    #[test]
    fn test_parse_variable_with_sub_pattern_and_nested_field() {
        let t = parse("/v1/{shelf.name=shelves/*/books/**}").unwrap();
        assert_eq!(
            t.segments()[1],
            Segment::Variable(Variable {
                field_path: field("shelf.name"),
                pattern: vec![
                    SubSegment::Literal("shelves".into()),
                    SubSegment::SingleWildcard,
                    SubSegment::Literal("books".into()),
                    SubSegment::DoubleWildcard,
                ],
            })
        );
    }

    #[test]
    fn test_parse_verb() {
        let t = parse("/v1/{name=projects/*/serviceAccounts/*}:generateIdToken").unwrap();
        assert_eq!(t.verb(), Some("generateIdToken"));
        assert_eq!(t.segments().len(), 2);
    }

    #[test]
    fn test_literals_are_not_decoded() {
        let t = parse("/v1/a%2Fb/x=y").unwrap();
        assert_eq!(t.segments(), &[literal("v1"), literal("a%2Fb"), literal("x=y")]);
    }

    #[test]
    fn test_missing_leading_slash() {
        assert_eq!(reason("v1/books"), "template must start with `/`");
        assert_eq!(reason(""), "template must start with `/`");
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(reason("/v1/{name"), "unterminated variable");
        assert_eq!(reason("/v1/{name=shelves/*"), "unterminated variable");
        assert_eq!(reason("/v1/name}"), "unbalanced `}`");
    }

    #[test]
    fn test_nested_variable_rejected() {
        assert_eq!(reason("/v1/{a={b}}"), "nested variables are not allowed");
    }

    #[test]
    fn test_double_wildcard_must_be_final() {
        assert_eq!(reason("/v1/**/books"), "`**` must be the final segment");
        assert_eq!(reason("/v1/{a=**}/**"), "`**` must be the final segment");
        assert_eq!(reason("/v1/{a=x/**/y}"), "`**` must be the final segment");
        assert!(parse("/v1/{a=x/**}:verb").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert_eq!(reason("/v1/{1abc}"), "field path identifier expected");
        assert_eq!(reason("/v1/{a..b}"), "field path identifier expected");
        assert_eq!(reason("/v1/{a-b}"), "invalid character in field path");
    }

    #[test]
    fn test_empty_segments_and_reserved_chars() {
        assert_eq!(reason("/v1//books"), "empty segment");
        assert_eq!(reason("/v1/"), "empty segment");
        assert_eq!(reason("/v1/a*b"), "reserved character in literal");
        assert_eq!(reason("/v1/{a=}"), "empty segment");
    }

    #[test]
    fn test_verb_errors() {
        assert_eq!(reason("/:verb"), "custom verb requires at least one segment");
        assert_eq!(reason("/v1/books:"), "empty custom verb");
        assert_eq!(reason("/v1/books:a/b"), "invalid character in custom verb");
    }

    #[test]
    fn test_duplicate_variable() {
        let err = parse("/v1/{a.b}/x/{a.b=**}").unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateVariable {
                template: "/v1/{a.b}/x/{a.b=**}".into(),
                field_path: "a.b".into(),
            }
        );
        assert!(parse("/v1/{a.b}/{a.c}").is_ok());
    }

    #[test]
    fn test_render_round_trip() {
        for raw in [
            "/",
            "/v1/shelves",
            "/v1/{name=shelves/*}",
            "/v1/{name=*}/books/{book.id}",
            "/v1/{name=shelves/*/books/**}:publish",
            "/**",
            "/v1/*/x/**",
        ] {
            let parsed = parse(raw).unwrap();
            let rendered = parsed.to_string();
            assert_eq!(parse(&rendered).unwrap(), parsed, "round trip of {raw}");
        }
        assert_eq!(parse("/v1/{name=*}").unwrap().to_string(), "/v1/{name}");
    }
}
