// Tests for substitution templates
use crate::*;

fn expand(pattern: &str, text: &str, template: &str) -> String {
    let mut re = Regex::new(pattern).unwrap();
    assert!(re.is_match(text.as_bytes()), "{:?} should match {:?}", pattern, text);
    let out = re.substitute_to_vec(text.as_bytes(), template.as_bytes());
    String::from_utf8(out).unwrap()
}

#[test]
fn test_group_case_conversion() {
    assert_eq!(expand("(\\w+)@(\\w+)", "user@host", "\\U\\1\\L@\\2"), "USER@host");
    assert_eq!(expand("(\\w+)", "HELLO", "\\L\\1"), "hello");
    assert_eq!(expand("(\\w+)", "hello", "\\u\\1"), "Hello");
    assert_eq!(expand("(\\w+)", "HELLO", "\\l\\1"), "hELLO");
}

#[test]
fn test_whole_match() {
    assert_eq!(expand("[0-9]+", "ab123", "<&>"), "<123>");
    assert_eq!(expand("[0-9]+", "ab123", "\\U&"), "123");
    assert_eq!(expand("[a-z]+", "x abc", "\\U&!"), "ABC!");
}

#[test]
fn test_template_escapes() {
    assert_eq!(expand("a", "a", "1\\n2\\t3"), "1\n2\t3");
    assert_eq!(expand("a", "a", "\\x41\\0102"), "AB");
    assert_eq!(expand("a", "a", "\\&\\\\"), "&\\");
    assert_eq!(expand("a", "a", "\\q"), "q");
    assert_eq!(expand("a", "a", "\\000"), "000");
    assert_eq!(expand("a", "a", "ab\\"), "ab\\");
}

#[test]
fn test_unmatched_group_expands_to_nothing() {
    assert_eq!(expand("(a)|(b)", "b", "[\\1][\\2]"), "[][b]");
    assert_eq!(expand("(a)", "a", "[\\5]"), "[]");
}

#[test]
fn test_case_change_applies_only_to_groups() {
    // The case escape is spent on the literal x, so \1 is copied unchanged
    assert_eq!(expand("(b)", "b", "\\Ux\\1"), "xb");
    assert_eq!(expand("(b)", "b", "x\\U\\1"), "xB");
}

#[test]
fn test_substitute_appends() {
    let mut re = Regex::new("o+").unwrap();
    assert!(re.is_match(b"foo"));
    let mut out = b"prefix:".to_vec();
    assert!(re.substitute(b"foo", b"[&]", &mut out));
    assert_eq!(out, b"prefix:[oo]".to_vec());
}

#[test]
fn test_damaged_program_still_expands() {
    let mut re = Regex::new("(b)").unwrap();
    assert!(re.is_match(b"abc"));
    re.program.magic = 0;

    // Reported as a failure, but the template is still expanded
    let mut out = Vec::new();
    assert!(!re.substitute(b"abc", b"x\\1y", &mut out));
    assert_eq!(out, b"xby".to_vec());

    assert!(!re.is_match(b"abc"));
}
