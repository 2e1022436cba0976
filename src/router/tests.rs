use http::Method;

use super::{DuplicatePolicy, PathMatcher, PathMatcherBuilder};
use crate::error::{ParseError, RegisterError};

fn build(routes: &[(Method, &str, &'static str)]) -> PathMatcher<&'static str> {
    let mut builder = PathMatcherBuilder::new();
    for (method, template, operation) in routes {
        builder
            .register(method.clone(), template, *operation)
            .unwrap_or_else(|e| panic!("register {template}: {e}"));
    }
    builder.build()
}

fn operation(matcher: &PathMatcher<&'static str>, method: Method, path: &str) -> Option<&'static str> {
    matcher.lookup(&method, path).ok().map(|m| *m.operation())
}

#[test]
fn test_instantiated_template_matches_with_variables() {
    let matcher = build(&[
        (Method::GET, "/v1/shelves/{shelf}/books/{book.id}", "GetBook"),
        (Method::GET, "/v1/{name=projects/*/locations/*}/jobs", "ListJobs"),
    ]);

    let m = matcher.lookup(&Method::GET, "/v1/shelves/s1/books/b2").unwrap();
    assert_eq!(*m.operation(), "GetBook");
    assert_eq!(m.get("shelf"), Some("s1"));
    assert_eq!(m.get("book.id"), Some("b2"));

    let m = matcher
        .lookup(&Method::GET, "/v1/projects/p/locations/us/jobs")
        .unwrap();
    assert_eq!(*m.operation(), "ListJobs");
    assert_eq!(m.get("name"), Some("projects/p/locations/us"));
}

#[test]
fn test_variable_template_wins_over_structurally_identical_plain_template() {
    // Registration order must not matter.
    for routes in [
        [
            (Method::GET, "/v1/shelves/*", "Plain"),
            (Method::GET, "/v1/{name=shelves/*}", "WithVariable"),
        ],
        [
            (Method::GET, "/v1/{name=shelves/*}", "WithVariable"),
            (Method::GET, "/v1/shelves/*", "Plain"),
        ],
    ] {
        let matcher = build(&routes);
        let m = matcher.lookup(&Method::GET, "/v1/shelves/42").unwrap();
        assert_eq!(*m.operation(), "WithVariable");
        assert_eq!(m.get("name"), Some("shelves/42"));
    }
}

#[test]
fn test_double_wildcard_matches_any_remainder_including_empty() {
    let matcher = build(&[(Method::GET, "/v1/shelves/**", "Any")]);

    let m = matcher.lookup(&Method::GET, "/v1/shelves/a/b/c").unwrap();
    assert_eq!(*m.operation(), "Any");
    assert!(m.variables().is_empty());

    assert_eq!(operation(&matcher, Method::GET, "/v1/shelves"), Some("Any"));
    assert_eq!(operation(&matcher, Method::GET, "/v1/shelves/"), Some("Any"));
    assert_eq!(operation(&matcher, Method::GET, "/v1/books"), None);
}

#[test]
fn test_double_wildcard_variable_capture() {
    let matcher = build(&[(Method::GET, "/v1/{path=files/**}", "Files")]);
    let m = matcher.lookup(&Method::GET, "/v1/files/a/b/c.txt").unwrap();
    assert_eq!(m.get("path"), Some("files/a/b/c.txt"));
    let m = matcher.lookup(&Method::GET, "/v1/files").unwrap();
    assert_eq!(m.get("path"), Some("files"));
}

#[test]
fn test_duplicate_registration_conflicts() {
    let mut builder = PathMatcherBuilder::new();
    builder.register(Method::GET, "/v1/books/{id}", 1).unwrap();
    let err = builder.register(Method::GET, "/v1/books/{id}", 2).unwrap_err();
    assert_eq!(
        err,
        RegisterError::Conflict {
            method: Method::GET,
            template: "/v1/books/{id}".to_string(),
        }
    );

    // Normalization: `{id=*}` is the same template.
    assert!(matches!(
        builder.register(Method::GET, "/v1/books/{id=*}", 3),
        Err(RegisterError::Conflict { .. })
    ));

    // Other methods are independent.
    builder.register(Method::DELETE, "/v1/books/{id}", 4).unwrap();
}

#[test]
fn test_templates_differing_only_in_variable_names_conflict() {
    let mut builder = PathMatcherBuilder::new();
    builder.register(Method::GET, "/v1/books/{a}", "A").unwrap();
    assert_eq!(
        builder.register(Method::GET, "/v1/books/{b}", "B").unwrap_err(),
        RegisterError::Conflict {
            method: Method::GET,
            template: "/v1/books/{b}".to_string(),
        }
    );
    // Same flattened shape and variable count, different grouping.
    assert!(matches!(
        builder.register(Method::GET, "/v1/{name=books/*}", "C"),
        Err(RegisterError::Conflict { .. })
    ));

    // Same shape under another verb or method is a different binding.
    builder.register(Method::GET, "/v1/books/{b}:preview", "E").unwrap();
    builder.register(Method::PUT, "/v1/books/{b}", "F").unwrap();
    // A plain template alongside the variable one still coexists.
    builder.register(Method::GET, "/v1/books/*", "G").unwrap();
    assert_eq!(builder.len(), 4);

    let matcher = builder.build();
    assert_eq!(operation(&matcher, Method::GET, "/v1/books/1"), Some("A"));
    assert_eq!(operation(&matcher, Method::GET, "/v1/books/1:preview"), Some("E"));
    assert_eq!(operation(&matcher, Method::PUT, "/v1/books/1"), Some("F"));
}

#[test]
fn test_keep_first_skips_shadowed_template() {
    let mut builder = PathMatcherBuilder::new().duplicate_policy(DuplicatePolicy::KeepFirst);
    builder.register(Method::GET, "/v1/books/{a}", "A").unwrap();
    builder.register(Method::GET, "/v1/books/{b}", "B").unwrap();
    assert_eq!(builder.len(), 1);

    let matcher = builder.build();
    let patterns: Vec<&str> = matcher.routes().map(|r| r.pattern()).collect();
    assert_eq!(patterns, vec!["/v1/books/{a}"]);
    let m = matcher.lookup(&Method::GET, "/v1/books/1").unwrap();
    assert_eq!(*m.operation(), "A");
    assert_eq!(m.get("a"), Some("1"));
}

#[test]
fn test_keep_first_duplicate_policy() {
    let mut builder = PathMatcherBuilder::new().duplicate_policy(DuplicatePolicy::KeepFirst);
    builder.register(Method::GET, "/v1/books/{id}", "first").unwrap();
    builder.register(Method::GET, "/v1/books/{id}", "second").unwrap();
    assert_eq!(builder.len(), 1);

    let matcher = builder.build();
    assert_eq!(operation(&matcher, Method::GET, "/v1/books/9"), Some("first"));
}

#[test]
fn test_parse_errors_surface_from_register() {
    let mut builder: PathMatcherBuilder<u32> = PathMatcherBuilder::new();
    assert!(matches!(
        builder.register(Method::GET, "v1/books", 1),
        Err(RegisterError::Parse(ParseError::Malformed { .. }))
    ));
    assert!(matches!(
        builder.register(Method::GET, "/v1/{a}/{a}", 1),
        Err(RegisterError::Parse(ParseError::DuplicateVariable { .. }))
    ));
    assert!(matches!(
        builder.register_str("BAD METHOD", "/v1/books", 1),
        Err(RegisterError::InvalidMethod(_))
    ));
    assert!(builder.is_empty());
}

#[test]
fn test_method_mismatch_is_not_found() {
    let matcher = build(&[
        (Method::GET, "/v1/books/{id}", "GetBook"),
        (Method::DELETE, "/v1/books/{id}", "DeleteBook"),
    ]);

    assert_eq!(operation(&matcher, Method::GET, "/v1/books/1"), Some("GetBook"));
    assert_eq!(operation(&matcher, Method::DELETE, "/v1/books/1"), Some("DeleteBook"));

    let err = matcher.lookup(&Method::PUT, "/v1/books/1").unwrap_err();
    assert_eq!(err.method, "PUT");
    assert_eq!(err.path, "/v1/books/1");

    assert_eq!(
        matcher.allowed_methods("/v1/books/1"),
        vec![Method::DELETE, Method::GET]
    );
    assert!(matcher.allowed_methods("/v2/books/1").is_empty());
}

#[test]
fn test_literal_precedence_with_backtracking() {
    let matcher = build(&[
        (Method::GET, "/v1/shelves/{shelf}/books", "ListBooks"),
        (Method::GET, "/v1/shelves/featured", "Featured"),
        (Method::GET, "/v1/shelves/featured/summary", "FeaturedSummary"),
        (Method::GET, "/v1/**", "CatchAll"),
    ]);

    assert_eq!(operation(&matcher, Method::GET, "/v1/shelves/featured"), Some("Featured"));
    assert_eq!(
        operation(&matcher, Method::GET, "/v1/shelves/featured/summary"),
        Some("FeaturedSummary")
    );
    // `featured` literal branch has no `books` child: backtrack to `{shelf}`.
    let m = matcher.lookup(&Method::GET, "/v1/shelves/featured/books").unwrap();
    assert_eq!(*m.operation(), "ListBooks");
    assert_eq!(m.get("shelf"), Some("featured"));
    // Nothing more specific: fall through to `**`.
    assert_eq!(operation(&matcher, Method::GET, "/v1/shelves/a/b/c"), Some("CatchAll"));
    assert_eq!(operation(&matcher, Method::GET, "/v1"), Some("CatchAll"));
    assert_eq!(operation(&matcher, Method::GET, "/v2"), None);
}

#[test]
fn test_custom_verbs() {
    let matcher = build(&[
        (Method::GET, "/v1/{name=books/*}", "GetBook"),
        (Method::POST, "/v1/{name=books/*}:cancel", "CancelBook"),
        (Method::POST, "/v1/{name=books/*}:archive", "ArchiveBook"),
        (Method::POST, "/v1/books/*", "UpdateBook"),
    ]);

    let m = matcher.lookup(&Method::POST, "/v1/books/1:cancel").unwrap();
    assert_eq!(*m.operation(), "CancelBook");
    assert_eq!(m.get("name"), Some("books/1"));
    assert_eq!(operation(&matcher, Method::POST, "/v1/books/1:archive"), Some("ArchiveBook"));

    // A template with a verb never matches a request without it.
    assert_eq!(operation(&matcher, Method::POST, "/v1/books/1"), Some("UpdateBook"));

    // Verb-less templates ignore verbs: the text stays in the segment.
    let m = matcher.lookup(&Method::GET, "/v1/books/1:cancel").unwrap();
    assert_eq!(*m.operation(), "GetBook");
    assert_eq!(m.get("name"), Some("books/1:cancel"));
    let m = matcher.lookup(&Method::GET, "/v1/books/1:unknown").unwrap();
    assert_eq!(m.get("name"), Some("books/1:unknown"));
}

#[test]
fn test_root_and_query_handling() {
    let matcher = build(&[
        (Method::GET, "/", "Root"),
        (Method::GET, "/v1/books/{id}", "GetBook"),
    ]);

    assert_eq!(operation(&matcher, Method::GET, "/"), Some("Root"));
    assert_eq!(operation(&matcher, Method::GET, "/?alt=json"), Some("Root"));
    let m = matcher.lookup(&Method::GET, "/v1/books/7?view=FULL").unwrap();
    assert_eq!(m.get("id"), Some("7"));
    assert_eq!(operation(&matcher, Method::GET, "/v1/books/"), None);
    assert_eq!(operation(&matcher, Method::GET, "/v1//7"), None);
}

#[test]
fn test_decoded_variables() {
    let matcher = build(&[
        (Method::GET, "/v1/books/{id}", "GetBook"),
        (Method::GET, "/v1/{path=files/**}", "GetFile"),
    ]);

    let m = matcher.lookup(&Method::GET, "/v1/books/a%20b%2Fc").unwrap();
    assert_eq!(m.get("id"), Some("a%20b%2Fc"));
    assert_eq!(m.decoded("id").as_deref(), Some("a b/c"));

    let m = matcher.lookup(&Method::GET, "/v1/files/x%20y/a%2Fb").unwrap();
    assert_eq!(m.decoded("path").as_deref(), Some("files/x y/a%2Fb"));
    assert_eq!(m.decoded("missing"), None);
}

#[test]
fn test_lookup_str_and_routes() {
    let matcher = build(&[(Method::GET, "/v1/books/{id}", "GetBook")]);
    assert_eq!(*matcher.lookup_str("GET", "/v1/books/1").unwrap().operation(), "GetBook");
    assert!(matcher.lookup_str("BAD METHOD", "/v1/books/1").is_err());

    let routes: Vec<_> = matcher.routes().map(|r| (r.method().clone(), r.pattern())).collect();
    assert_eq!(routes, vec![(Method::GET, "/v1/books/{id}")]);
    assert_eq!(matcher.len(), 1);
    assert_eq!(
        matcher.lookup(&Method::GET, "/v1/books/1").unwrap().to_map().get("id"),
        Some(&"1".to_string())
    );
}

#[test]
fn test_many_routes_share_the_trie() {
    let mut builder = PathMatcherBuilder::new();
    for i in 0..500 {
        builder
            .register(Method::GET, &format!("/v1/service{i}/items/{{item_id}}"), i)
            .unwrap();
        builder
            .register(Method::POST, &format!("/v1/service{i}/items"), i + 1000)
            .unwrap();
    }
    let matcher = builder.build();

    for i in [0, 17, 250, 499] {
        let m = matcher
            .lookup(&Method::GET, &format!("/v1/service{i}/items/abc"))
            .unwrap();
        assert_eq!(*m.operation(), i);
        assert_eq!(m.get("item_id"), Some("abc"));
        assert_eq!(
            *matcher
                .lookup(&Method::POST, &format!("/v1/service{i}/items"))
                .unwrap()
                .operation(),
            i + 1000
        );
    }
}
