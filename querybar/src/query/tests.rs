//! Tests for the tokenizer, serializer and validator.

use super::*;

fn filter_at(q: &ParsedQuery, i: usize) -> &FilterToken {
    match &q.tokens[i].kind {
        TokenKind::Filter(f) => f,
        other => panic!("Expected filter token, got {:?}", other),
    }
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind.clone()).collect()
}

#[test]
fn test_empty_query() {
    let q = tokenize("");
    assert!(q.is_empty());
    assert!(q.free_text.is_empty());
    assert!(q.filters.is_empty());
}

#[test]
fn test_whitespace_only_query() {
    assert!(tokenize("   \t  ").is_empty());
}

#[test]
fn test_free_text() {
    let q = tokenize("hello world");
    assert_eq!(q.tokens.len(), 2);
    assert_eq!(q.free_text, vec!["hello", "world"]);
    assert!(q.filters.is_empty());
}

#[test]
fn test_simple_filter() {
    let q = tokenize("browser.name:Chrome");
    let f = filter_at(&q, 0);
    assert_eq!(f.filter_key, "browser.name");
    assert_eq!(f.operator, Operator::Eq);
    assert_eq!(f.value, FilterValue::Single("Chrome".to_string()));
    assert!(!f.negated);
}

#[test]
fn test_filter_gt() {
    let q = tokenize("count:>100");
    let f = filter_at(&q, 0);
    assert_eq!(f.operator, Operator::Gt);
    assert_eq!(f.value, FilterValue::from("100"));
    assert!(!f.negated);
}

#[test]
fn test_filter_two_char_operators() {
    let q = tokenize("a:>=1 b:<=2 c:<3");
    assert_eq!(filter_at(&q, 0).operator, Operator::Gte);
    assert_eq!(filter_at(&q, 0).value, FilterValue::from("1"));
    assert_eq!(filter_at(&q, 1).operator, Operator::Lte);
    assert_eq!(filter_at(&q, 2).operator, Operator::Lt);
    assert_eq!(filter_at(&q, 2).value, FilterValue::from("3"));
}

#[test]
fn test_negated_filter() {
    let q = tokenize("status:!resolved");
    let f = filter_at(&q, 0);
    assert!(f.negated);
    assert_eq!(f.operator, Operator::Eq);
    assert_eq!(f.value, FilterValue::from("resolved"));
}

#[test]
fn test_negated_with_operator() {
    let q = tokenize("count:!>=5");
    let f = filter_at(&q, 0);
    assert!(f.negated);
    assert_eq!(f.operator, Operator::Gte);
    assert_eq!(f.value, FilterValue::from("5"));
}

#[test]
fn test_array_value() {
    let q = tokenize("status:[resolved,ignored]");
    assert_eq!(
        filter_at(&q, 0).value,
        FilterValue::List(vec!["resolved".to_string(), "ignored".to_string()])
    );
}

#[test]
fn test_array_value_trims_elements() {
    let q = tokenize("status:[ a , b ]");
    // Unquoted spaces split the part; only the first piece is the filter
    assert_eq!(q.tokens.len(), 5);
    assert_eq!(filter_at(&q, 0).value, FilterValue::from("["));

    let q = tokenize(r#"status:"[ a , b ]""#);
    assert_eq!(
        filter_at(&q, 0).value,
        FilterValue::List(vec!["a".to_string(), "b".to_string()])
    );
}

#[test]
fn test_empty_array_value() {
    let q = tokenize("status:[]");
    assert_eq!(filter_at(&q, 0).value, FilterValue::List(Vec::new()));
}

#[test]
fn test_quoted_value() {
    let q = tokenize(r#"message:"hello world""#);
    assert_eq!(q.tokens.len(), 1);
    assert_eq!(filter_at(&q, 0).value, FilterValue::from("hello world"));
}

#[test]
fn test_single_quotes_group_but_are_kept() {
    let q = tokenize("message:'hello world'");
    assert_eq!(q.tokens.len(), 1);
    assert_eq!(filter_at(&q, 0).value, FilterValue::from("'hello world'"));
}

#[test]
fn test_unterminated_quote_is_literal() {
    let q = tokenize(r#"a:b message:"oops no end"#);
    assert_eq!(q.tokens.len(), 2);
    assert_eq!(filter_at(&q, 1).value, FilterValue::from(r#""oops no end"#));
}

#[test]
fn test_lone_quote_value() {
    let q = tokenize(r#"a:""#);
    assert_eq!(filter_at(&q, 0).value, FilterValue::from("\""));
}

#[test]
fn test_missing_value() {
    let q = tokenize("browser.name:");
    let f = filter_at(&q, 0);
    assert_eq!(f.filter_key, "browser.name");
    assert_eq!(f.value, FilterValue::from(""));
}

#[test]
fn test_split_on_first_colon() {
    let q = tokenize("url:http://example.com");
    let f = filter_at(&q, 0);
    assert_eq!(f.filter_key, "url");
    assert_eq!(f.value, FilterValue::from("http://example.com"));
}

#[test]
fn test_boolean_operators() {
    let q = tokenize("browser.name:Chrome AND status:unresolved");
    assert_eq!(q.tokens.len(), 3);
    assert_eq!(
        q.tokens[1].kind,
        TokenKind::Boolean {
            value: BooleanOp::And
        }
    );
}

#[test]
fn test_lowercase_and_is_free_text() {
    let q = tokenize("and or");
    assert_eq!(q.free_text, vec!["and", "or"]);
}

#[test]
fn test_paren_structure() {
    let q = tokenize("( browser.name:Chrome OR browser.name:Firefox )");
    let types: Vec<&str> = q.tokens.iter().map(|t| t.kind.type_name()).collect();
    assert_eq!(types, vec!["paren", "filter", "boolean", "filter", "paren"]);
}

#[test]
fn test_complex_query() {
    let q = tokenize(
        "browser.name:Chrome user.email:test@example.com AND status:unresolved error message",
    );
    assert_eq!(q.tokens.len(), 6);
    assert_eq!(q.filters.len(), 3);
    assert_eq!(q.free_text, vec!["error", "message"]);
}

#[test]
fn test_positional_keys() {
    let q = tokenize("( a:b OR hello )");
    let keys: Vec<&str> = q.tokens.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["paren_0", "filter_1", "boolean_2", "freetext_3", "paren_4"]
    );
}

#[test]
fn test_stringify_filter() {
    let tokens = vec![Token::filter(FilterToken::new("browser.name", "Chrome"))];
    assert_eq!(stringify(&tokens), "browser.name:Chrome");
}

#[test]
fn test_stringify_operator_and_negation() {
    let tokens = vec![
        Token::filter(FilterToken::new("count", "100").with_operator(Operator::Gt)),
        Token::filter(FilterToken::new("status", "resolved").negated()),
        Token::filter(
            FilterToken::new("count", "5")
                .with_operator(Operator::Lte)
                .negated(),
        ),
    ];
    assert_eq!(stringify(&tokens), "count:>100 status:!resolved count:!<=5");
}

#[test]
fn test_stringify_array() {
    let tokens = vec![Token::filter(FilterToken::new(
        "status",
        vec!["resolved".to_string(), "ignored".to_string()],
    ))];
    assert_eq!(stringify(&tokens), "status:[resolved,ignored]");
}

#[test]
fn test_stringify_quotes_whitespace() {
    let tokens = vec![Token::filter(FilterToken::new("message", "hello world"))];
    assert_eq!(stringify(&tokens), r#"message:"hello world""#);
}

#[test]
fn test_stringify_quotes_list_with_whitespace() {
    let filter = FilterToken::new(
        "browser.name",
        vec!["Chrome Mobile".to_string(), "Safari".to_string()],
    );
    let tokens = vec![Token::filter(filter.clone()), Token::free_text("crash")];
    let text = stringify(&tokens);
    assert_eq!(text, r#"browser.name:"[Chrome Mobile,Safari]" crash"#);

    let parsed = tokenize(&text);
    assert_eq!(parsed.tokens.len(), 2);
    assert_eq!(parsed.filters, vec![filter]);
}

#[test]
fn test_stringify_quotes_values_that_look_like_syntax() {
    for query in [
        r#"count:">5""#,
        r#"count:"<=5""#,
        r#"status:"!open""#,
        r#"count:>"=5""#,
        r#"a:"it's" b:c"#,
    ] {
        let first = tokenize(query);
        let text = stringify(&first.tokens);
        assert_eq!(text, query);
        assert_eq!(kinds(&tokenize(&text).tokens), kinds(&first.tokens));
    }

    let gt = tokenize(r#"count:">5""#);
    assert_eq!(gt.filters[0].operator, Operator::Eq);
    assert_eq!(gt.filters[0].value, FilterValue::from(">5"));
}

#[test]
fn test_stringify_keeps_unterminated_quote_last() {
    let first = tokenize(r#"x a:"b c"#);
    assert_eq!(first.tokens.len(), 2);
    let text = stringify(&first.tokens);
    assert_eq!(text, r#"x a:"b c"#);
    assert_eq!(kinds(&tokenize(&text).tokens), kinds(&first.tokens));
}

#[test]
fn test_stringify_mixed() {
    let tokens = vec![
        Token::paren(Paren::Open),
        Token::free_text("error"),
        Token::boolean(BooleanOp::Or),
        Token::free_text("warning"),
        Token::paren(Paren::Close),
    ];
    assert_eq!(stringify(&tokens), "( error OR warning )");
}

#[test]
fn test_stringify_empty() {
    assert_eq!(stringify(&[]), "");
}

#[test]
fn test_round_trip_examples() {
    for query in [
        "browser.name:Chrome AND status:!resolved",
        "( browser.name:Chrome OR browser.name:Firefox ) count:>=10",
        r#"message:"hello world" status:[resolved,ignored] free text"#,
        "a:!<3 b:<=4",
    ] {
        let first = tokenize(query);
        let text = stringify(&first.tokens);
        assert_eq!(text, query);
        let second = tokenize(&text);
        assert_eq!(kinds(&first.tokens), kinds(&second.tokens));
    }
}

#[test]
fn test_reparse_normalizes_spacing() {
    let q = tokenize("  a:b    AND\tc  ");
    let text = stringify(&q.tokens);
    assert_eq!(text, "a:b AND c");
    assert_eq!(tokenize(&text).filters, q.filters);
    assert_eq!(tokenize(&text).free_text, q.free_text);
}

#[test]
fn test_validate_filter_key_required() {
    let token = Token::filter(FilterToken::new("", "x"));
    assert_eq!(validate(&token), Some("Filter key is required"));
}

#[test]
fn test_validate_filter_value_required() {
    let token = Token::filter(FilterToken::new("x", ""));
    assert_eq!(validate(&token), Some("Filter value is required"));

    let token = Token::filter(FilterToken::new("x", Vec::<String>::new()));
    assert_eq!(validate(&token), Some(FILTER_VALUE_REQUIRED));
}

#[test]
fn test_validate_free_text() {
    assert_eq!(
        validate(&Token::free_text("  ")),
        Some("Free text cannot be empty")
    );
    assert_eq!(validate(&Token::free_text("ok")), None);
}

#[test]
fn test_validate_structural_tokens() {
    assert_eq!(validate(&Token::boolean(BooleanOp::And)), None);
    assert_eq!(validate(&Token::paren(Paren::Close)), None);
}

#[test]
fn test_annotate_records_and_clears() {
    let mut token = Token::free_text("");
    annotate(&mut token);
    assert_eq!(token.invalid.as_deref(), Some(FREE_TEXT_EMPTY));

    token.kind = TokenKind::FreeText {
        value: "fixed".to_string(),
    };
    annotate(&mut token);
    assert!(token.invalid.is_none());
}

#[test]
fn test_operator_display() {
    assert_eq!(format!("{}", Operator::Eq), "=");
    assert_eq!(format!("{}", Operator::NotEq), "!=");
    assert_eq!(format!("{}", Operator::DoesNotContain), "does_not_contain");
    assert_eq!(format!("{}", Operator::Gte), ">=");
}

#[test]
fn test_operator_from_str() {
    for op in Operator::ALL {
        assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
    }
    assert!("~=".parse::<Operator>().is_err());
}

#[test]
fn test_operator_labels() {
    assert_eq!(Operator::Eq.label(), "equals");
    assert_eq!(Operator::StartsWith.description(), "Begins with the text");
    assert_eq!(Operator::default(), Operator::Eq);
}

#[test]
fn test_token_json_shape() {
    let token = Token::new("filter_0", TokenKind::Filter(FilterToken::new("a", "b")));
    let json = serde_json::to_value(&token).unwrap();
    assert_eq!(json["type"], "filter");
    assert_eq!(json["filter_key"], "a");
    assert_eq!(json["operator"], "=");
    assert_eq!(json["value"], "b");

    let back: Token = serde_json::from_value(json).unwrap();
    assert_eq!(back, token);
}
