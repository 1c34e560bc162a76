// Tests for string search, replace-all and split
use crate::*;

fn regex_options() -> SearchOptions {
    SearchOptions::new(SearchType::Regex)
}

fn strings(pieces: Vec<Vec<u8>>) -> Vec<String> {
    pieces
        .into_iter()
        .map(|p| String::from_utf8(p).unwrap())
        .collect()
}

#[test]
fn test_literal_search_case() {
    let literal = SearchOptions::new(SearchType::Literal);
    assert_eq!(search_string(b"Hello world", b"WORLD", 0, &literal).unwrap(), Some(6..11));

    let exact = SearchOptions::new(SearchType::CaseSensitive);
    assert_eq!(search_string(b"Hello world", b"WORLD", 0, &exact).unwrap(), None);
    assert_eq!(search_string(b"Hello world", b"world", 0, &exact).unwrap(), Some(6..11));
}

#[test]
fn test_backward_search() {
    let mut options = SearchOptions::new(SearchType::CaseSensitive);
    options.direction = SearchDirection::Backward;
    assert_eq!(search_string(b"one two one", b"one", 11, &options).unwrap(), Some(8..11));
    assert_eq!(search_string(b"one two one", b"one", 7, &options).unwrap(), Some(0..3));

    let mut options = regex_options();
    options.direction = SearchDirection::Backward;
    assert_eq!(search_string(b"a1b22", b"\\d+", 5, &options).unwrap(), Some(4..5));
}

#[test]
fn test_wrap_around() {
    let mut options = SearchOptions::new(SearchType::CaseSensitive);
    assert_eq!(search_string(b"abc abc", b"abc", 5, &options).unwrap(), None);
    options.wrap = true;
    assert_eq!(search_string(b"abc abc", b"abc", 5, &options).unwrap(), Some(0..3));

    options.direction = SearchDirection::Backward;
    assert_eq!(search_string(b"xx abc", b"abc", 1, &options).unwrap(), Some(3..6));
}

#[test]
fn test_regex_search() {
    assert_eq!(search_string(b"a1b22", b"\\d+", 2, &regex_options()).unwrap(), Some(3..5));

    let no_case = SearchOptions::new(SearchType::RegexNoCase);
    assert_eq!(search_string(b"ABC", b"b", 0, &no_case).unwrap(), Some(1..2));

    let err = search_string(b"abc", b"(", 0, &regex_options()).unwrap_err();
    assert_eq!(err.message, "missing right parenthesis ')'");
}

#[test]
fn test_search_with_delimiters() {
    let options = SearchOptions {
        delimiters: Some(DelimiterTable::new(b"_")),
        ..regex_options()
    };
    assert_eq!(search_string(b"foo_bar", b"<bar", 0, &options).unwrap(), Some(4..7));
    assert_eq!(search_string(b"foo_bar", b"<bar", 0, &regex_options()).unwrap(), None);
}

#[test]
fn test_replace_all() {
    let out = replace_all_in_string(b"a1b22c", b"\\d+", b"<&>", &regex_options()).unwrap();
    assert_eq!(out, Some(b"a<1>b<22>c".to_vec()));

    let out = replace_all_in_string(b"john smith", b"(\\w+) (\\w+)", b"\\2, \\1", &regex_options())
        .unwrap();
    assert_eq!(out, Some(b"smith, john".to_vec()));

    let literal = SearchOptions::new(SearchType::Literal);
    let out = replace_all_in_string(b"Hello hello", b"HELLO", b"bye", &literal).unwrap();
    assert_eq!(out, Some(b"bye bye".to_vec()));

    let out = replace_all_in_string(b"abc", b"z", b"y", &literal).unwrap();
    assert_eq!(out, None);
}

#[test]
fn test_replace_all_empty_matches() {
    let out = replace_all_in_string(b"abc", b"x*", b"-", &regex_options()).unwrap();
    assert_eq!(out, Some(b"-a-b-c-".to_vec()));
}

#[test]
fn test_split_literal() {
    let literal = SearchOptions::new(SearchType::Literal);
    assert_eq!(
        strings(split(b"a,b,,c", b",", &literal).unwrap()),
        vec!["a", "b", "", "c"]
    );
    assert_eq!(strings(split(b"a,", b",", &literal).unwrap()), vec!["a", ""]);
    assert_eq!(strings(split(b"abc", b",", &literal).unwrap()), vec!["abc"]);
}

#[test]
fn test_split_zero_width_separator() {
    assert_eq!(
        strings(split(b"abc\n", b"$", &regex_options()).unwrap()),
        vec!["abc", "\n", ""]
    );
}

#[test]
fn test_split_regex() {
    assert_eq!(
        strings(split(b"a1b22c", b"\\d+", &regex_options()).unwrap()),
        vec!["a", "b", "c"]
    );
}

#[test]
fn test_split_rejects_empty_separator() {
    let err = split(b"abc", b"", &regex_options()).unwrap_err();
    assert_eq!(err.message, "split separator must be a non-empty string");
}
