/// Regex program opcodes.
///
/// Nodes whose operand is "the next node" (BRANCH, the quantifiers and the
/// lookaround openers) find that operand at the following index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum OpCode {
    End = 0,     // end of program
    Bol,         // ^  beginning of line
    Eol,         // $  end of line
    BoWord,      // <  beginning of word
    EoWord,      // >  end of word
    NotBoundary, // \B not a word boundary

    // Single character matchers (SIMPLE operands for quantifiers)
    Any,         // .  any character except newline
    Every,       // .  any character including newline, (?n) mode
    AnyOf,       // [...]
    AnyBut,      // [^...]
    IsDelim,     // \y
    NotDelim,    // \Y
    WordChar,    // \w
    NotWordChar, // \W
    Digit,       // \d
    NotDigit,    // \D
    Letter,      // \l
    NotLetter,   // \L
    Space,       // \s without newline
    SpaceNl,     // \s with newline, (?n) mode
    NotSpace,    // \S without newline
    NotSpaceNl,  // \S with newline, (?n) mode

    Exactly, // literal run
    Similar, // literal run, compared case-insensitively (operand is lowercase)
    Nothing, // no-op, used as a join point
    Back,    // no-op whose next link points backward
    Branch,  // alternative; operand is the alternative's body

    // Quantifiers applied to a single SIMPLE node (the operand)
    Star,
    LazyStar,
    Question,
    LazyQuestion,
    Plus,
    LazyPlus,
    Brace,     // {m,n}
    LazyBrace, // {m,n}?

    // General {m,n} over complex atoms
    InitCount, // counter[idx] = 0
    IncCount,  // counter[idx] += 1
    TestCount, // counter[idx] < limit: fall through to the loop edge, else follow next

    BackRef,   // \1..\9
    BackRefCi, // \1..\9, case-insensitive

    PosAheadOpen,    // (?=
    NegAheadOpen,    // (?!
    LookAheadClose,  //
    PosBehindOpen,   // (?<=
    NegBehindOpen,   // (?<!
    LookBehindClose, //

    Open,  // start of capturing group n
    Close, // end of capturing group n
}

impl OpCode {
    pub const LAST: OpCode = OpCode::Close;

    pub fn from_u8(byte: u8) -> Option<Self> {
        if byte <= Self::LAST as u8 {
            // SAFETY: `OpCode` is `repr(u8)` with contiguous discriminants
            // starting at zero, and `byte` is within range.
            Some(unsafe { std::mem::transmute::<u8, OpCode>(byte) })
        } else {
            None
        }
    }

    /// Opcodes that consume exactly one character and have no internal
    /// choice points; the greedy helper can repeat them directly.
    #[inline]
    pub fn is_single_char(self) -> bool {
        matches!(
            self,
            OpCode::Any
                | OpCode::Every
                | OpCode::AnyOf
                | OpCode::AnyBut
                | OpCode::IsDelim
                | OpCode::NotDelim
                | OpCode::WordChar
                | OpCode::NotWordChar
                | OpCode::Digit
                | OpCode::NotDigit
                | OpCode::Letter
                | OpCode::NotLetter
                | OpCode::Space
                | OpCode::SpaceNl
                | OpCode::NotSpace
                | OpCode::NotSpaceNl
        )
    }

    #[inline]
    pub fn is_quantifier(self) -> bool {
        matches!(
            self,
            OpCode::Star
                | OpCode::LazyStar
                | OpCode::Question
                | OpCode::LazyQuestion
                | OpCode::Plus
                | OpCode::LazyPlus
                | OpCode::Brace
                | OpCode::LazyBrace
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::End => "END",
            OpCode::Bol => "BOL",
            OpCode::Eol => "EOL",
            OpCode::BoWord => "BOWORD",
            OpCode::EoWord => "EOWORD",
            OpCode::NotBoundary => "NOT_BOUNDARY",
            OpCode::Any => "ANY",
            OpCode::Every => "EVERY",
            OpCode::AnyOf => "ANY_OF",
            OpCode::AnyBut => "ANY_BUT",
            OpCode::IsDelim => "IS_DELIM",
            OpCode::NotDelim => "NOT_DELIM",
            OpCode::WordChar => "WORD_CHAR",
            OpCode::NotWordChar => "NOT_WORD_CHAR",
            OpCode::Digit => "DIGIT",
            OpCode::NotDigit => "NOT_DIGIT",
            OpCode::Letter => "LETTER",
            OpCode::NotLetter => "NOT_LETTER",
            OpCode::Space => "SPACE",
            OpCode::SpaceNl => "SPACE_NL",
            OpCode::NotSpace => "NOT_SPACE",
            OpCode::NotSpaceNl => "NOT_SPACE_NL",
            OpCode::Exactly => "EXACTLY",
            OpCode::Similar => "SIMILAR",
            OpCode::Nothing => "NOTHING",
            OpCode::Back => "BACK",
            OpCode::Branch => "BRANCH",
            OpCode::Star => "STAR",
            OpCode::LazyStar => "LAZY_STAR",
            OpCode::Question => "QUESTION",
            OpCode::LazyQuestion => "LAZY_QUESTION",
            OpCode::Plus => "PLUS",
            OpCode::LazyPlus => "LAZY_PLUS",
            OpCode::Brace => "BRACE",
            OpCode::LazyBrace => "LAZY_BRACE",
            OpCode::InitCount => "INIT_COUNT",
            OpCode::IncCount => "INC_COUNT",
            OpCode::TestCount => "TEST_COUNT",
            OpCode::BackRef => "BACK_REF",
            OpCode::BackRefCi => "BACK_REF_CI",
            OpCode::PosAheadOpen => "POS_AHEAD_OPEN",
            OpCode::NegAheadOpen => "NEG_AHEAD_OPEN",
            OpCode::LookAheadClose => "LOOK_AHEAD_CLOSE",
            OpCode::PosBehindOpen => "POS_BEHIND_OPEN",
            OpCode::NegBehindOpen => "NEG_BEHIND_OPEN",
            OpCode::LookBehindClose => "LOOK_BEHIND_CLOSE",
            OpCode::Open => "OPEN",
            OpCode::Close => "CLOSE",
        }
    }
}
