// Character classification tables and word delimiter sets
//
// The engine works on single bytes. Classification follows the C locale:
// letters and digits are ASCII, whitespace is " \t\n\v\f\r".

use crate::regex_limits::DEFAULT_WORD_DELIMITERS;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// 256-bit membership set over byte values.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    pub const fn new() -> Self {
        ByteSet([0; 4])
    }

    #[inline(always)]
    pub fn insert(&mut self, c: u8) {
        self.0[(c >> 6) as usize] |= 1u64 << (c & 63);
    }

    #[inline(always)]
    pub fn contains(&self, c: u8) -> bool {
        self.0[(c >> 6) as usize] & (1u64 << (c & 63)) != 0
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        for &c in bytes {
            self.insert(c);
        }
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    pub(crate) fn words(&self) -> [u64; 4] {
        self.0
    }

    pub(crate) fn from_words(words: [u64; 4]) -> Self {
        ByteSet(words)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&c| self.contains(c))
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for c in self.iter() {
            write!(f, "{}", std::ascii::escape_default(c))?;
        }
        write!(f, "]")
    }
}

// ===== Classification =====

#[inline(always)]
pub fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[inline(always)]
pub fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

#[inline(always)]
pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// C `isspace`: includes vertical tab, unlike `u8::is_ascii_whitespace`.
#[inline(always)]
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Member lists used when a shortcut escape appears inside `[...]`.
pub struct ClassTables {
    pub word_chars: Vec<u8>,
    pub letters: Vec<u8>,
    /// Whitespace without the newline; newline membership depends on the
    /// `(?n)` mode in effect.
    pub white_space: Vec<u8>,
    pub digits: Vec<u8>,
}

pub fn class_tables() -> &'static ClassTables {
    static TABLES: OnceLock<ClassTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let all = 1..=255u8;
        ClassTables {
            word_chars: all.clone().filter(|&c| is_word_char(c)).collect(),
            letters: all.clone().filter(|&c| is_letter(c)).collect(),
            white_space: all.filter(|&c| is_space(c) && c != b'\n').collect(),
            digits: (b'0'..=b'9').collect(),
        }
    })
}

// ===== Word delimiters =====

/// Characters that separate words for `<`, `>`, `\B`, `\y` and `\Y`.
/// NUL, tab, newline and space are always members.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DelimiterTable(ByteSet);

impl DelimiterTable {
    pub fn new(delimiters: &[u8]) -> Self {
        let mut set = ByteSet::new();
        set.extend_from_slice(delimiters);
        set.insert(b'\0');
        set.insert(b'\t');
        set.insert(b'\n');
        set.insert(b' ');
        DelimiterTable(set)
    }

    #[inline(always)]
    pub fn is_delimiter(&self, c: u8) -> bool {
        self.0.contains(c)
    }
}

impl Default for DelimiterTable {
    fn default() -> Self {
        DelimiterTable::new(DEFAULT_WORD_DELIMITERS)
    }
}

impl fmt::Debug for DelimiterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DelimiterTable").field(&self.0).finish()
    }
}

fn default_delimiter_cell() -> &'static RwLock<DelimiterTable> {
    static DEFAULT: OnceLock<RwLock<DelimiterTable>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(DelimiterTable::default()))
}

/// Replace the process-wide delimiter set used when an execute call does
/// not supply its own.
pub fn set_default_word_delimiters(delimiters: &[u8]) {
    let table = DelimiterTable::new(delimiters);
    match default_delimiter_cell().write() {
        Ok(mut guard) => *guard = table,
        Err(poisoned) => *poisoned.into_inner() = table,
    }
}

pub fn default_word_delimiters() -> DelimiterTable {
    match default_delimiter_cell().read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}
