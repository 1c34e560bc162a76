// Escape sequence decoding shared by the pattern compiler and the
// substitution engine.

/// Result of decoding `\0NNN` / `\xNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericEscape {
    /// The character after the backslash does not start a numeric escape.
    NotNumeric,
    /// Decoded value and the index of the last byte that belongs to it.
    Value { value: u8, last: usize },
    /// The escape evaluates to NUL, which cannot be expressed.
    Zero,
}

/// Decode a numeric escape whose introducer (`0`, `x` or `X`) sits at
/// `src[at]`.
///
/// Octal takes up to three digits after the `0`, hex up to two. A digit
/// that would push the value past 255 is left for the caller as an
/// ordinary character, so `\0777` is `\077` followed by `7`.
pub fn numeric_escape(src: &[u8], at: usize) -> NumericEscape {
    let (radix, width) = match src.get(at) {
        Some(b'0') => (8u32, 3),
        Some(b'x') | Some(b'X') => (16u32, 2),
        _ => return NumericEscape::NotNumeric,
    };

    let mut scan = at + 1;
    let mut value = 0u32;
    for _ in 0..width {
        let Some(digit) = src.get(scan).and_then(|&b| (b as char).to_digit(radix)) else {
            break;
        };
        let candidate = value * radix + digit;
        if candidate > 255 {
            break;
        }
        value = candidate;
        scan += 1;
    }

    if value == 0 {
        NumericEscape::Zero
    } else {
        NumericEscape::Value {
            value: value as u8,
            last: scan - 1,
        }
    }
}

/// Translate `\a`, `\n`, `\(` and friends. `None` when `c` is not a
/// literal escape.
pub fn literal_escape(c: u8) -> Option<u8> {
    let value = match c {
        b'a' => 0x07,
        b'b' => 0x08,
        b'e' => 0x1b,
        b'f' => 0x0c,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0b,
        b'(' | b')' | b'-' | b'[' | b']' | b'<' | b'>' | b'{' | b'}' | b'.' | b'\\' | b'|'
        | b'^' | b'$' | b'*' | b'+' | b'?' | b'&' => c,
        _ => return None,
    };
    Some(value)
}

/// `\B`, `\y` and `\Y` only make sense as nodes, never inside `[...]`.
pub fn is_shortcut_escape(c: u8, in_class: bool) -> bool {
    let codes: &[u8] = if in_class { b"dDlLsSwW" } else { b"ByYdDlLsSwW" };
    codes.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octal_escape() {
        assert_eq!(
            numeric_escape(b"0101", 0),
            NumericEscape::Value {
                value: b'A',
                last: 3
            }
        );
        // \0777 stops before the digit that would overflow a byte
        assert_eq!(
            numeric_escape(b"0777", 0),
            NumericEscape::Value {
                value: 0o77,
                last: 2
            }
        );
        // octal ignores 8 and 9
        assert_eq!(
            numeric_escape(b"018", 0),
            NumericEscape::Value { value: 1, last: 1 }
        );
    }

    #[test]
    fn test_hex_escape() {
        assert_eq!(
            numeric_escape(b"x41z", 0),
            NumericEscape::Value {
                value: b'A',
                last: 2
            }
        );
        assert_eq!(
            numeric_escape(b"Xff", 0),
            NumericEscape::Value {
                value: 0xff,
                last: 2
            }
        );
        assert_eq!(
            numeric_escape(b"xa", 0),
            NumericEscape::Value { value: 10, last: 1 }
        );
    }

    #[test]
    fn test_zero_escapes() {
        assert_eq!(numeric_escape(b"0", 0), NumericEscape::Zero);
        assert_eq!(numeric_escape(b"000", 0), NumericEscape::Zero);
        assert_eq!(numeric_escape(b"x0", 0), NumericEscape::Zero);
        assert_eq!(numeric_escape(b"xg", 0), NumericEscape::Zero);
        assert_eq!(numeric_escape(b"q", 0), NumericEscape::NotNumeric);
        assert_eq!(numeric_escape(b"", 0), NumericEscape::NotNumeric);
    }

    #[test]
    fn test_literal_escapes() {
        assert_eq!(literal_escape(b'e'), Some(0x1b));
        assert_eq!(literal_escape(b't'), Some(b'\t'));
        assert_eq!(literal_escape(b'&'), Some(b'&'));
        assert_eq!(literal_escape(b'd'), None);
        assert_eq!(literal_escape(b'1'), None);
    }

    #[test]
    fn test_shortcut_escapes_in_class() {
        assert!(is_shortcut_escape(b'B', false));
        assert!(!is_shortcut_escape(b'B', true));
        assert!(!is_shortcut_escape(b'y', true));
        assert!(is_shortcut_escape(b'w', true));
        assert!(!is_shortcut_escape(b'q', false));
    }
}
