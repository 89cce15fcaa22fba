use serde::Serialize;

/// Position of a token in the source. Lines are 1-based, columns are
/// 0-based character offsets within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Prog,
    EndProg,
    Do,
    EndDo,
    Out,
    In,
    If,
    Otherwise,
    EndIf,
    Switch,
    EndSwitch,
    For,
    From,
    To,
    By,
    EndFor,
    When,
    EndWhen,
    Repeat,
    Until,
    EndRepeat,
}

impl Keyword {
    pub const ALL: [Keyword; 21] = [
        Keyword::Prog,
        Keyword::EndProg,
        Keyword::Do,
        Keyword::EndDo,
        Keyword::Out,
        Keyword::In,
        Keyword::If,
        Keyword::Otherwise,
        Keyword::EndIf,
        Keyword::Switch,
        Keyword::EndSwitch,
        Keyword::For,
        Keyword::From,
        Keyword::To,
        Keyword::By,
        Keyword::EndFor,
        Keyword::When,
        Keyword::EndWhen,
        Keyword::Repeat,
        Keyword::Until,
        Keyword::EndRepeat,
    ];

    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|keyword| keyword.as_str() == word)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Prog => "PROG",
            Keyword::EndProg => "ENDPROG",
            Keyword::Do => "DO",
            Keyword::EndDo => "ENDDO",
            Keyword::Out => "OUT",
            Keyword::In => "IN",
            Keyword::If => "IF",
            Keyword::Otherwise => "OTHERWISE",
            Keyword::EndIf => "ENDIF",
            Keyword::Switch => "SWITCH",
            Keyword::EndSwitch => "ENDSWITCH",
            Keyword::For => "FOR",
            Keyword::From => "FROM",
            Keyword::To => "TO",
            Keyword::By => "BY",
            Keyword::EndFor => "ENDFOR",
            Keyword::When => "WHEN",
            Keyword::EndWhen => "ENDWHEN",
            Keyword::Repeat => "REPEAT",
            Keyword::Until => "UNTIL",
            Keyword::EndRepeat => "ENDREPEAT",
        }
    }

    /// Keywords that close a block. Skip mode always stops at one of these.
    pub fn is_block_end(self) -> bool {
        matches!(
            self,
            Keyword::EndProg
                | Keyword::EndDo
                | Keyword::EndIf
                | Keyword::EndSwitch
                | Keyword::EndFor
                | Keyword::EndWhen
                | Keyword::EndRepeat
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Percent,   // %
    GreaterEq, // >=
    LessEq,    // <=
    Greater,   // >
    Less,      // <
    EqualEq,   // ==
    AndAnd,    // &&
    OrOr,      // ||
    Bang,      // !
    Colon,     // :
    LBracket,  // [
    RBracket,  // ]
    Equal,     // =
}

impl Operator {
    /// Match order for the lexer: two-character forms come before their
    /// one-character prefixes.
    pub const ALL: [Operator; 17] = [
        Operator::GreaterEq,
        Operator::LessEq,
        Operator::EqualEq,
        Operator::AndAnd,
        Operator::OrOr,
        Operator::Plus,
        Operator::Minus,
        Operator::Star,
        Operator::Slash,
        Operator::Percent,
        Operator::Greater,
        Operator::Less,
        Operator::Bang,
        Operator::Colon,
        Operator::LBracket,
        Operator::RBracket,
        Operator::Equal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::GreaterEq => ">=",
            Operator::LessEq => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::EqualEq => "==",
            Operator::AndAnd => "&&",
            Operator::OrOr => "||",
            Operator::Bang => "!",
            Operator::Colon => ":",
            Operator::LBracket => "[",
            Operator::RBracket => "]",
            Operator::Equal => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Keyword(Keyword),
    Operator(Operator),
    Number(&'a str),
    /// String body without the surrounding quotes.
    String(&'a str),
    Variable(&'a str),
    Identifier(&'a str),
    Other(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Exact source text of the lexeme.
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, text: &'a str, span: Span) -> Self {
        Self { kind, text, span }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_operator(&self, operator: Operator) -> bool {
        self.kind == TokenKind::Operator(operator)
    }
}
