// Replacement template expansion
//
//   &        whole match
//   \1..\9   capture group
//   \u \l    next group with its first character upper/lower-cased
//   \U \L    next group with every character upper/lower-cased
//   \n \t .. literal and numeric escapes as in patterns
//
// Any other escaped character is copied as is; a trailing backslash is a
// literal backslash.
use crate::compiler::escape::{literal_escape, numeric_escape, NumericEscape};
use crate::exec::reg_error;
use crate::regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseChange {
    None,
    UpperFirst,
    Upper,
    LowerFirst,
    Lower,
}

impl CaseChange {
    fn from_escape(c: u8) -> Option<Self> {
        match c {
            b'u' => Some(CaseChange::UpperFirst),
            b'U' => Some(CaseChange::Upper),
            b'l' => Some(CaseChange::LowerFirst),
            b'L' => Some(CaseChange::Lower),
            _ => None,
        }
    }

    fn apply(self, index: usize, c: u8) -> u8 {
        match self {
            CaseChange::Upper => c.to_ascii_uppercase(),
            CaseChange::Lower => c.to_ascii_lowercase(),
            CaseChange::UpperFirst if index == 0 => c.to_ascii_uppercase(),
            CaseChange::LowerFirst if index == 0 => c.to_ascii_lowercase(),
            _ => c,
        }
    }
}

impl Regex {
    /// Expand `template` against the captures of the last successful
    /// execute on `text`, appending to `dest`. A damaged program is
    /// reported and yields `false`, but the expansion still runs.
    pub fn substitute(&self, text: &[u8], template: &[u8], dest: &mut Vec<u8>) -> bool {
        let valid = self.program.is_valid();
        if !valid {
            reg_error("damaged regexp passed to 'SubstituteRE'");
        }

        let mut src = 0;
        while src < template.len() {
            let mut c = template[src];
            src += 1;

            let mut change = CaseChange::None;
            let mut paren_no: Option<usize> = None;

            if c == b'\\' {
                if let Some(found) = template.get(src).copied().and_then(CaseChange::from_escape) {
                    change = found;
                    src += 1;
                    let Some(&after) = template.get(src) else {
                        break;
                    };
                    c = after;
                    src += 1;
                }
            }

            if c == b'&' {
                paren_no = Some(0);
            } else if c == b'\\' {
                match template.get(src).copied() {
                    Some(d @ b'1'..=b'9') => {
                        paren_no = Some((d - b'0') as usize);
                        src += 1;
                    }
                    Some(e) => {
                        if let Some(value) = literal_escape(e) {
                            c = value;
                            src += 1;
                        } else if let NumericEscape::Value { value, last } =
                            numeric_escape(template, src)
                        {
                            c = value;
                            src = last + 1;
                        } else {
                            // Unknown escapes (and \000) keep the character
                            c = e;
                            src += 1;
                        }
                    }
                    None => c = b'\\',
                }
            }

            match paren_no {
                None => dest.push(c),
                Some(n) => {
                    if let Some(span) = self.group(n) {
                        let Some(captured) = text.get(span) else {
                            continue;
                        };
                        dest.extend(
                            captured
                                .iter()
                                .enumerate()
                                .map(|(i, &b)| change.apply(i, b)),
                        );
                    }
                }
            }
        }

        valid
    }

    pub fn substitute_to_vec(&self, text: &[u8], template: &[u8]) -> Vec<u8> {
        let mut dest = Vec::with_capacity(template.len());
        self.substitute(text, template, &mut dest);
        dest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_change_first_only() {
        assert_eq!(CaseChange::UpperFirst.apply(0, b'a'), b'A');
        assert_eq!(CaseChange::UpperFirst.apply(1, b'a'), b'a');
        assert_eq!(CaseChange::Lower.apply(3, b'Q'), b'q');
        assert_eq!(CaseChange::None.apply(0, b'Q'), b'Q');
    }
}
