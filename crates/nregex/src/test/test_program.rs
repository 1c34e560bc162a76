// Tests for the serialized program layout
use crate::*;

#[test]
fn test_program_survives_serialization() {
    let re = Regex::new("(?<=x)(ab){2,3}?[^c]\\1").unwrap();
    let bytes = re.program().to_bytes();
    let program = Program::from_bytes(&bytes).unwrap();
    assert_eq!(&program, re.program());

    let mut restored = Regex::from_program(program);
    assert!(restored.is_match(b"xababdab"));
    assert_eq!(restored.span(), Some(1..8));
    assert_eq!(restored.group(1), Some(3..5));
}

#[test]
fn test_from_program_recomputes_hints() {
    let re = Regex::new("^abc").unwrap();
    let restored = Regex::from_program(re.program().clone());
    assert!(restored.is_anchored());

    let re = Regex::new("abc").unwrap();
    let restored = Regex::from_program(re.program().clone());
    assert_eq!(restored.match_start(), Some(b'a'));
}

#[test]
fn test_header_validation() {
    let err = Program::from_bytes(&[]).unwrap_err();
    assert_eq!(err.kind, RegexErrorKind::Program);
    assert_eq!(err.message, "truncated program header");

    let mut bytes = Regex::new("a").unwrap().program().to_bytes();
    bytes[0] = 0;
    let err = Program::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.message, "not a compiled regular expression");
}

#[test]
fn test_node_validation() {
    // [magic, groups, counters] BRANCH(+2) EXACTLY(+1) "a" END
    let good = Regex::new("a").unwrap().program().to_bytes();
    assert!(Program::from_bytes(&good).is_ok());

    let mut bytes = good.clone();
    bytes[3] = 255;
    assert_eq!(
        Program::from_bytes(&bytes).unwrap_err().message,
        "unknown opcode 255"
    );

    let mut bytes = good.clone();
    bytes[5] = 9;
    assert_eq!(
        Program::from_bytes(&bytes).unwrap_err().message,
        "node 0 links outside the program"
    );

    let truncated = &good[..good.len() - 1];
    assert_eq!(
        Program::from_bytes(truncated).unwrap_err().message,
        "unexpected end of program"
    );
}

#[test]
fn test_group_numbers_checked_against_header() {
    let mut bytes = Regex::new("(a)").unwrap().program().to_bytes();
    bytes[1] = 0;
    assert_eq!(
        Program::from_bytes(&bytes).unwrap_err().message,
        "group number 1 out of range"
    );
}
