// Tests for Regex::execute: captures, anchors, classes and search options
use crate::*;

fn find(pattern: &str, text: &str) -> Option<std::ops::Range<usize>> {
    let mut re = Regex::new(pattern).unwrap();
    if re.is_match(text.as_bytes()) {
        re.span()
    } else {
        None
    }
}

#[test]
fn test_alternation_inside_repeated_group() {
    let mut re = Regex::new("a(b|c)+d").unwrap();
    assert!(re.is_match(b"xabcbcd"));
    assert_eq!(re.span(), Some(1..7));
    // The last iteration of the group wins
    assert_eq!(re.group(1), Some(5..6));
}

#[test]
fn test_literal_and_first_char_hint() {
    assert_eq!(find("needle", "haystack with needle"), Some(14..20));
    assert_eq!(find("needle", "haystack"), None);
    let re = Regex::new("abc").unwrap();
    assert_eq!(re.match_start(), Some(b'a'));
}

#[test]
fn test_anchored_digits() {
    let mut re = Regex::new("^\\d{2,4}$").unwrap();
    assert!(re.is_anchored());
    assert!(re.is_match(b"123"));
    assert_eq!(re.span(), Some(0..3));
    assert!(!re.is_match(b"12345"));
    assert!(re.span().is_none());
}

#[test]
fn test_line_anchors_inside_text() {
    assert_eq!(find("^b$", "a\nb\nc"), Some(2..3));
    assert_eq!(find("$", "abc"), Some(3..3));
    assert_eq!(find("^", "abc"), Some(0..0));
}

#[test]
fn test_empty_pattern() {
    assert_eq!(find("", "abc"), Some(0..0));
    assert_eq!(find("", ""), Some(0..0));
}

#[test]
fn test_back_reference() {
    let mut re = Regex::new("(foo)\\1").unwrap();
    assert!(re.is_match(b"foofoo"));
    assert_eq!(re.span(), Some(0..6));
    assert!(!re.is_match(b"foobar"));

    let mut re = Regex::with_flags("(ab)\\1", CompileFlags::case_insensitive()).unwrap();
    assert!(re.is_match(b"abAB"));
}

#[test]
fn test_unset_group_is_none() {
    let mut re = Regex::new("(a)|(b)").unwrap();
    assert!(re.is_match(b"b"));
    assert_eq!(re.group(1), None);
    assert_eq!(re.group(2), Some(0..1));
    assert_eq!(re.group(3), None);
}

#[test]
fn test_non_capturing_group() {
    let mut re = Regex::new("(?:ab)+").unwrap();
    assert_eq!(re.group_count(), 0);
    assert!(re.is_match(b"ababx"));
    assert_eq!(re.span(), Some(0..4));
}

#[test]
fn test_case_insensitive() {
    let mut re = Regex::with_flags("hello", CompileFlags::case_insensitive()).unwrap();
    assert!(re.is_match(b"say HeLLo"));
    assert_eq!(re.span(), Some(4..9));

    let mut re = Regex::with_flags("[a-c]+", CompileFlags::case_insensitive()).unwrap();
    assert!(re.is_match(b"ABCd"));
    assert_eq!(re.span(), Some(0..3));
}

#[test]
fn test_inline_case_groups() {
    assert_eq!(find("(?iabc)d", "ABCd"), Some(0..4));
    assert_eq!(find("(?iabc)d", "ABCD"), None);

    let mut re = Regex::with_flags("a(?Ib)c", CompileFlags::case_insensitive()).unwrap();
    assert!(re.is_match(b"AbC"));
    assert!(!re.is_match(b"ABC"));
}

#[test]
fn test_newline_mode() {
    assert_eq!(find("a.b", "a\nb"), None);
    assert_eq!(find("(?na.b)", "a\nb"), Some(0..3));

    let flags = CompileFlags {
        match_newline: true,
        ..CompileFlags::default()
    };
    let mut re = Regex::with_flags("a[^x]b", flags).unwrap();
    assert!(re.is_match(b"a\nb"));
    assert_eq!(find("a[^x]b", "a\nb"), None);
}

#[test]
fn test_character_classes() {
    assert_eq!(find("[a-c]+", "xxbcay"), Some(2..5));
    assert_eq!(find("[^a-z]", "abc1"), Some(3..4));
    assert_eq!(find("[\\d_]+", "ab_12c"), Some(2..5));
    assert_eq!(find("[]a]+", "x]a]"), Some(1..4));
    assert_eq!(find("[a-]+", "x-a"), Some(1..3));
    assert_eq!(find("[\\x41-\\x43]+", "zABCD"), Some(1..4));
}

#[test]
fn test_negated_shortcut_in_class_excludes_newline() {
    assert_eq!(find("[\\D]", "12a"), Some(2..3));
    assert_eq!(find("[\\D]", "1\n2"), None);
}

#[test]
fn test_shortcut_nodes() {
    assert_eq!(find("\\d+", "ab123c"), Some(2..5));
    assert_eq!(find("\\s+", "ab \t c"), Some(2..5));
    assert_eq!(find("\\w+", "--abc_1--"), Some(2..7));
    assert_eq!(find("\\l+", "12abC3"), Some(2..5));
    assert_eq!(find("\\S+", "  xy  "), Some(2..4));
    assert_eq!(find("\\s", "a\nb"), None);
}

#[test]
fn test_word_boundaries() {
    assert_eq!(find("<foo>", "a foo b"), Some(2..5));
    assert_eq!(find("<foo>", "afoob"), None);
    // \y consumes the delimiter itself
    assert_eq!(find("\\yfoo", "(foo"), Some(0..4));
    assert_eq!(find("o\\B", "foo bar"), Some(1..2));
}

#[test]
fn test_custom_delimiters() {
    let delimiters = DelimiterTable::new(b"_");
    let options = ExecOptions {
        delimiters: Some(&delimiters),
        ..Default::default()
    };
    let mut re = Regex::new("<bar").unwrap();
    assert!(re.execute(b"foo_bar", &options));
    assert_eq!(re.span(), Some(4..7));
    assert!(!re.is_match(b"foo_bar"));
}

#[test]
fn test_literal_escapes() {
    assert_eq!(find("a\\.b", "axb a.b"), Some(4..7));
    assert_eq!(find("\\t", "a\tb"), Some(1..2));
    assert_eq!(find("\\x41", "zA"), Some(1..2));
    assert_eq!(find("\\0101", "zA"), Some(1..2));
    assert_eq!(find("colou?r", "color"), Some(0..5));
    assert_eq!(find("colou?r", "colour"), Some(0..6));
}

#[test]
fn test_top_branch() {
    let mut re = Regex::new("foo|bar|baz").unwrap();
    assert!(re.is_match(b"xxbaz"));
    assert_eq!(re.span(), Some(2..5));
    assert_eq!(re.top_branch(), 2);
    assert!(re.is_match(b"foo"));
    assert_eq!(re.top_branch(), 0);
}

#[test]
fn test_start_offset_and_end_limit() {
    let mut re = Regex::new("ab").unwrap();
    assert_eq!(re.find_at(b"ab ab", 1), Some(3..5));

    let options = ExecOptions {
        end: Some(3),
        ..Default::default()
    };
    assert!(!re.execute(b"xx ab", &options));

    // A match may extend past the end limit as long as it starts before it
    let options = ExecOptions {
        end: Some(4),
        ..Default::default()
    };
    assert!(re.execute(b"xx ab", &options));
    assert_eq!(re.span(), Some(3..5));

    assert!(!re.execute(b"ab", &ExecOptions::starting_at(5)));
}

#[test]
fn test_end_limit_before_start() {
    let mut re = Regex::new("a").unwrap();
    let options = ExecOptions {
        start: 3,
        end: Some(1),
        ..Default::default()
    };
    assert!(!re.execute(b"xxxxxxa", &options));
    assert!(re.span().is_none());

    // An empty range admits no start position, not even the end of text
    let mut re = Regex::new("").unwrap();
    let options = ExecOptions {
        start: 3,
        end: Some(3),
        ..Default::default()
    };
    assert!(!re.execute(b"abc", &options));

    // Line starts after a newline are start positions too
    let mut re = Regex::new("^b").unwrap();
    let options = ExecOptions {
        end: Some(2),
        ..Default::default()
    };
    assert!(!re.execute(b"a\nb", &options));
    let options = ExecOptions {
        end: Some(3),
        ..Default::default()
    };
    assert!(re.execute(b"a\nb", &options));
    assert_eq!(re.span(), Some(2..3));
}

#[test]
fn test_previous_character_context() {
    let mut re = Regex::new("^b").unwrap();
    assert!(!re.execute(b"ab", &ExecOptions::starting_at(1)));

    let options = ExecOptions {
        start: 1,
        prev_char: Some(b'\n'),
        ..Default::default()
    };
    assert!(re.execute(b"ab", &options));
    assert_eq!(re.span(), Some(1..2));
}

#[test]
fn test_match_to_and_successor_character() {
    let mut re = Regex::new("c$").unwrap();
    let options = ExecOptions {
        match_to: Some(3),
        ..Default::default()
    };
    assert!(!re.execute(b"abcdef", &options));

    let options = ExecOptions {
        match_to: Some(3),
        succ_char: Some(b'\n'),
        ..Default::default()
    };
    assert!(re.execute(b"abcdef", &options));
    assert_eq!(re.span(), Some(2..3));

    // Nothing may be consumed past the logical end
    let mut re = Regex::new("cd").unwrap();
    let options = ExecOptions {
        match_to: Some(3),
        ..Default::default()
    };
    assert!(!re.execute(b"abcdef", &options));
}

#[test]
fn test_reverse_search() {
    let mut re = Regex::new("ab").unwrap();
    assert!(re.execute(b"ab ab ab", &ExecOptions::reverse_from(0, 8)));
    assert_eq!(re.span(), Some(6..8));

    assert!(re.execute(b"ab ab ab", &ExecOptions::reverse_from(0, 5)));
    assert_eq!(re.span(), Some(3..5));

    assert!(!re.execute(b"ab ab ab", &ExecOptions::reverse_from(1, 2)));

    let mut re = Regex::new("^x").unwrap();
    assert!(re.execute(b"x\nx\ny", &ExecOptions::reverse_from(0, 5)));
    assert_eq!(re.span(), Some(2..3));
}

#[test]
fn test_recursion_limit_aborts_search() {
    let text = b"abababababababc";
    let mut re = Regex::new("(a|b)*c").unwrap();
    assert!(re.is_match(text));
    assert_eq!(re.span(), Some(0..15));

    let options = ExecOptions {
        recursion_limit: Some(5),
        ..Default::default()
    };
    assert!(!re.execute(text, &options));
    assert!(re.span().is_none());
}

#[test]
fn test_default_recursion_limit_fails_long_input_cleanly() {
    // One recursion level per alternative and group boundary per character
    let text = vec![b'a'; 200_000];
    let mut re = Regex::new("(a|b)*c").unwrap();
    assert!(!re.is_match(&text));
    assert!(re.span().is_none());

    let mut re = Regex::new("(?:a|b)*c").unwrap();
    assert!(!re.is_match(&text));

    // Short inputs of the same shape still match under the default
    let mut text = b"ab".repeat(20);
    text.push(b'c');
    let mut re = Regex::new("(a|b)*c").unwrap();
    assert!(re.is_match(&text));
    assert_eq!(re.span(), Some(0..41));
    assert_eq!(re.group(1), Some(39..40));
}

#[test]
fn test_find_all() {
    let mut re = Regex::new("\\d+").unwrap();
    assert_eq!(re.find_all(b"a1b22"), vec![1..2, 3..5]);

    let mut re = Regex::new("x*").unwrap();
    assert_eq!(re.find_all(b"ab"), vec![0..0, 1..1, 2..2]);

    let mut re = Regex::new("a*").unwrap();
    assert_eq!(re.find_all(b"baa"), vec![0..0, 1..3]);
}

#[test]
fn test_from_str() {
    let mut re: Regex = "b+".parse().unwrap();
    assert!(re.is_match(b"abbb"));
    assert_eq!(re.span(), Some(1..4));
    assert!("(".parse::<Regex>().is_err());
}
