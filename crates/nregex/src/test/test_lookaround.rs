// Tests for look-ahead, look-behind and match extents
use crate::*;

#[test]
fn test_positive_look_behind() {
    let mut re = Regex::new("(?<=\\d)px").unwrap();
    assert!(re.is_match(b"3px"));
    assert_eq!(re.span(), Some(1..3));
    assert_eq!(re.extent_bw(), Some(0));
    assert!(!re.is_match(b"apx"));
}

#[test]
fn test_negative_look_behind() {
    let mut re = Regex::new("(?<!\\d)px").unwrap();
    assert!(re.is_match(b"3px apx"));
    assert_eq!(re.span(), Some(5..7));
}

#[test]
fn test_variable_length_look_behind() {
    let mut re = Regex::new("(?<=ab|c)d").unwrap();
    assert!(re.is_match(b"abd"));
    assert_eq!(re.span(), Some(2..3));
    assert_eq!(re.extent_bw(), Some(0));
    assert!(re.is_match(b"cd"));
    assert_eq!(re.span(), Some(1..2));
    assert!(!re.is_match(b"bd"));
}

#[test]
fn test_look_behind_sees_before_start_but_not_before_limit() {
    let mut re = Regex::new("(?<=\\d)px").unwrap();
    assert!(re.execute(b"3px", &ExecOptions::starting_at(1)));
    assert_eq!(re.span(), Some(1..3));

    let options = ExecOptions {
        start: 1,
        look_behind_to: Some(1),
        ..Default::default()
    };
    assert!(!re.execute(b"3px", &options));
}

#[test]
fn test_positive_look_ahead() {
    let mut re = Regex::new("foo(?=bar)").unwrap();
    assert!(re.is_match(b"foobaz foobar"));
    assert_eq!(re.span(), Some(7..10));
    assert_eq!(re.extent_fw(), Some(13));
}

#[test]
fn test_negative_look_ahead() {
    let mut re = Regex::new("foo(?!bar)").unwrap();
    assert!(re.is_match(b"foobar foobaz"));
    assert_eq!(re.span(), Some(7..10));
    assert_eq!(re.extent_fw(), Some(10));
}

#[test]
fn test_look_ahead_past_match_to() {
    let mut re = Regex::new("a(?=b)").unwrap();
    let options = ExecOptions {
        match_to: Some(1),
        ..Default::default()
    };
    assert!(re.execute(b"ab", &options));
    assert_eq!(re.span(), Some(0..1));
    assert_eq!(re.extent_fw(), Some(2));
}

#[test]
fn test_captures_inside_look_ahead() {
    let mut re = Regex::new("(?=(\\w+))\\w").unwrap();
    assert!(re.is_match(b" word"));
    assert_eq!(re.span(), Some(1..2));
    assert_eq!(re.group(1), Some(1..5));
}

#[test]
fn test_extent_without_look_around() {
    let mut re = Regex::new("b+").unwrap();
    assert!(re.is_match(b"abbc"));
    assert_eq!(re.extent_bw(), Some(1));
    assert_eq!(re.extent_fw(), Some(3));
}
