use logos::{Lexer, Logos};

use super::interp::{self, StringPart};

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    // Tags
    #[token("<?php", ignore(ascii_case))]
    OpenTag,
    /// `?>` plus the inline text that follows it, up to the next `<?php`.
    #[token("?>", close_tag)]
    CloseTag(String),

    // Keywords
    #[token("abstract", ignore(ascii_case))]
    Abstract,
    #[token("and", ignore(ascii_case))]
    LogicalAnd,
    #[token("array", ignore(ascii_case))]
    Array,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("break", ignore(ascii_case))]
    Break,
    #[token("case", ignore(ascii_case))]
    Case,
    #[token("catch", ignore(ascii_case))]
    Catch,
    #[token("class", ignore(ascii_case))]
    Class,
    #[token("clone", ignore(ascii_case))]
    Clone,
    #[token("const", ignore(ascii_case))]
    Const,
    #[token("continue", ignore(ascii_case))]
    Continue,
    #[token("declare", ignore(ascii_case))]
    Declare,
    #[token("default", ignore(ascii_case))]
    Default,
    #[token("do", ignore(ascii_case))]
    Do,
    #[token("echo", ignore(ascii_case))]
    Echo,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("elseif", ignore(ascii_case))]
    ElseIf,
    #[token("empty", ignore(ascii_case))]
    Empty,
    #[token("endfor", ignore(ascii_case))]
    EndFor,
    #[token("endforeach", ignore(ascii_case))]
    EndForeach,
    #[token("endif", ignore(ascii_case))]
    EndIf,
    #[token("endswitch", ignore(ascii_case))]
    EndSwitch,
    #[token("endwhile", ignore(ascii_case))]
    EndWhile,
    #[token("exit", ignore(ascii_case))]
    #[token("die", ignore(ascii_case))]
    Exit,
    #[token("extends", ignore(ascii_case))]
    Extends,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("final", ignore(ascii_case))]
    Final,
    #[token("finally", ignore(ascii_case))]
    Finally,
    #[token("fn", ignore(ascii_case))]
    Fn,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("foreach", ignore(ascii_case))]
    Foreach,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("global", ignore(ascii_case))]
    Global,
    #[token("goto", ignore(ascii_case))]
    Goto,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("implements", ignore(ascii_case))]
    Implements,
    #[token("include", ignore(ascii_case))]
    Include,
    #[token("include_once", ignore(ascii_case))]
    IncludeOnce,
    #[token("instanceof", ignore(ascii_case))]
    InstanceOf,
    #[token("isset", ignore(ascii_case))]
    Isset,
    #[token("match", ignore(ascii_case))]
    Match,
    #[token("namespace", ignore(ascii_case))]
    Namespace,
    #[token("new", ignore(ascii_case))]
    New,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("or", ignore(ascii_case))]
    LogicalOr,
    #[token("print", ignore(ascii_case))]
    Print,
    #[token("private", ignore(ascii_case))]
    Private,
    #[token("protected", ignore(ascii_case))]
    Protected,
    #[token("public", ignore(ascii_case))]
    Public,
    #[token("readonly", ignore(ascii_case))]
    Readonly,
    #[token("require", ignore(ascii_case))]
    Require,
    #[token("require_once", ignore(ascii_case))]
    RequireOnce,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("static", ignore(ascii_case))]
    Static,
    #[token("switch", ignore(ascii_case))]
    Switch,
    #[token("throw", ignore(ascii_case))]
    Throw,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("try", ignore(ascii_case))]
    Try,
    #[token("unset", ignore(ascii_case))]
    Unset,
    #[token("use", ignore(ascii_case))]
    Use,
    #[token("var", ignore(ascii_case))]
    Var,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("xor", ignore(ascii_case))]
    LogicalXor,

    // Literals
    #[regex(r"[0-9]+(_[0-9]+)*", decimal_int)]
    #[regex(r"0[xX][0-9a-fA-F]+(_[0-9a-fA-F]+)*", |lex| radix_int(lex.slice(), 16))]
    #[regex(r"0[oO][0-7]+(_[0-7]+)*", |lex| radix_int(lex.slice(), 8))]
    #[regex(r"0[bB][01]+(_[01]+)*", |lex| radix_int(lex.slice(), 2))]
    IntLit(Number),

    #[regex(r"[0-9]+(_[0-9]+)*\.([0-9]+(_[0-9]+)*)?([eE][+-]?[0-9]+)?", float)]
    #[regex(r"\.[0-9]+(_[0-9]+)*([eE][+-]?[0-9]+)?", float)]
    #[regex(r"[0-9]+(_[0-9]+)*[eE][+-]?[0-9]+", float)]
    FloatLit(f64),

    /// Single-quoted string; the value is the raw text between the quotes.
    #[regex(r"'([^'\\]|\\(.|\n))*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    SingleString(String),

    /// Double-quoted string split into literal runs and embedded expressions.
    #[token("\"", double_quoted)]
    DoubleString(Vec<StringPart>),

    // Names
    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Variable,
    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Ident,

    // Operators
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("**")]
    StarStar,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("**=")]
    StarStarEq,
    #[token("/=")]
    SlashEq,
    #[token(".=")]
    DotEq,
    #[token("%=")]
    PercentEq,
    #[token("??=")]
    QuestionQuestionEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("==")]
    EqEq,
    #[token("===")]
    EqEqEq,
    #[token("!=")]
    BangEq,
    #[token("<>")]
    LtGt,
    #[token("!==")]
    BangEqEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<=>")]
    Spaceship,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("@")]
    At,
    #[token("??")]
    QuestionQuestion,
    #[token("?")]
    Question,
    #[token("?->")]
    NullsafeArrow,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("::")]
    ColonColon,
    #[token("...")]
    Ellipsis,
    #[token("\\")]
    Backslash,
    #[token("$")]
    Dollar,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,

    // Trivia (moved off the token stream by `lex`)
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[token("//", line_comment)]
    #[token("#", hash_comment)]
    #[token("/*", block_comment)]
    Comment,

    /// Unrecognized input; carries the offending text.
    Error(String),
    /// End of input. Always the last token of a stream.
    Eof,
}

/// Integer literal value; decimal literals past `i64::MAX` become floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

fn decimal_int(lex: &mut Lexer<Token>) -> Number {
    let cleaned = lex.slice().replace('_', "");
    // Legacy octal: a leading zero followed by octal digits.
    if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return radix_int(&cleaned, 8);
    }
    match cleaned.parse::<i64>() {
        Ok(n) => Number::Int(n),
        Err(_) => Number::Float(cleaned.parse::<f64>().unwrap_or(f64::INFINITY)),
    }
}

fn radix_int(text: &str, radix: u32) -> Number {
    let digits = match radix {
        8 if text.len() > 1 && matches!(text.as_bytes()[1], b'o' | b'O') => &text[2..],
        8 => text,
        _ => &text[2..],
    };
    let cleaned = digits.replace('_', "");
    match i64::from_str_radix(&cleaned, radix) {
        Ok(n) => Number::Int(n),
        Err(_) => {
            let mut value = 0f64;
            for c in cleaned.chars() {
                value = value * radix as f64 + c.to_digit(radix).unwrap_or(0) as f64;
            }
            Number::Float(value)
        }
    }
}

fn float(lex: &mut Lexer<Token>) -> Option<f64> {
    lex.slice().replace('_', "").parse::<f64>().ok()
}

fn close_tag(lex: &mut Lexer<Token>) -> String {
    let rest = lex.remainder();
    let lower = rest.to_ascii_lowercase();
    let html_len = lower.find("<?php").unwrap_or(rest.len());
    let html = rest[..html_len].to_string();
    lex.bump(html_len);
    html
}

/// Length of a line comment body: up to the newline or a `?>`.
fn line_comment_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => break,
            b'?' if bytes.get(i + 1) == Some(&b'>') => break,
            _ => i += 1,
        }
    }
    i
}

fn line_comment(lex: &mut Lexer<Token>) {
    let n = line_comment_len(lex.remainder());
    lex.bump(n);
}

fn hash_comment(lex: &mut Lexer<Token>) -> bool {
    // `#[` opens an attribute, which this grammar does not cover.
    if lex.remainder().starts_with('[') {
        return false;
    }
    let n = line_comment_len(lex.remainder());
    lex.bump(n);
    true
}

fn block_comment(lex: &mut Lexer<Token>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

fn double_quoted(lex: &mut Lexer<Token>) -> Option<Vec<StringPart>> {
    let base = lex.span().end;
    let (parts, consumed) = interp::split(lex.remainder(), base)?;
    lex.bump(consumed);
    Some(parts)
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Comment)
    }

    /// Keywords that may still serve as names: member names, namespace segments, labels.
    pub fn is_keyword(&self) -> bool {
        keyword_text(self).is_some()
    }

    /// Tokens that close an alternative-syntax block.
    pub fn is_block_terminator(&self) -> bool {
        matches!(
            self,
            Token::EndIf | Token::EndWhile | Token::EndFor | Token::EndForeach | Token::EndSwitch
        )
    }

    /// Coarse category, used when reporting expected kinds.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::OpenTag | Token::CloseTag(_) => "tag",
            Token::IntLit(_) | Token::FloatLit(_) | Token::SingleString(_) | Token::True | Token::False | Token::Null => {
                "literal"
            }
            Token::DoubleString(_) => "interpolated string",
            Token::Variable => "variable",
            Token::Ident => "identifier",
            Token::Whitespace => "whitespace",
            Token::Comment => "comment",
            Token::Error(_) => "invalid input",
            Token::Eof => "end of input",
            t if t.is_keyword() => "keyword",
            Token::LParen
            | Token::RParen
            | Token::LBrace
            | Token::RBrace
            | Token::LBracket
            | Token::RBracket
            | Token::Comma
            | Token::Semicolon
            | Token::Colon => "punctuation",
            _ => "operator",
        }
    }
}

fn keyword_text(token: &Token) -> Option<&'static str> {
    let s = match token {
        Token::Abstract => "abstract",
        Token::LogicalAnd => "and",
        Token::Array => "array",
        Token::As => "as",
        Token::Break => "break",
        Token::Case => "case",
        Token::Catch => "catch",
        Token::Class => "class",
        Token::Clone => "clone",
        Token::Const => "const",
        Token::Continue => "continue",
        Token::Declare => "declare",
        Token::Default => "default",
        Token::Do => "do",
        Token::Echo => "echo",
        Token::Else => "else",
        Token::ElseIf => "elseif",
        Token::Empty => "empty",
        Token::EndFor => "endfor",
        Token::EndForeach => "endforeach",
        Token::EndIf => "endif",
        Token::EndSwitch => "endswitch",
        Token::EndWhile => "endwhile",
        Token::Exit => "exit",
        Token::Extends => "extends",
        Token::False => "false",
        Token::Final => "final",
        Token::Finally => "finally",
        Token::Fn => "fn",
        Token::For => "for",
        Token::Foreach => "foreach",
        Token::Function => "function",
        Token::Global => "global",
        Token::Goto => "goto",
        Token::If => "if",
        Token::Implements => "implements",
        Token::Include => "include",
        Token::IncludeOnce => "include_once",
        Token::InstanceOf => "instanceof",
        Token::Isset => "isset",
        Token::Match => "match",
        Token::Namespace => "namespace",
        Token::New => "new",
        Token::Null => "null",
        Token::LogicalOr => "or",
        Token::Print => "print",
        Token::Private => "private",
        Token::Protected => "protected",
        Token::Public => "public",
        Token::Readonly => "readonly",
        Token::Require => "require",
        Token::RequireOnce => "require_once",
        Token::Return => "return",
        Token::Static => "static",
        Token::Switch => "switch",
        Token::Throw => "throw",
        Token::True => "true",
        Token::Try => "try",
        Token::Unset => "unset",
        Token::Use => "use",
        Token::Var => "var",
        Token::While => "while",
        Token::LogicalXor => "xor",
        _ => return None,
    };
    Some(s)
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(kw) = keyword_text(self) {
            return write!(f, "'{kw}'");
        }
        let s = match self {
            Token::OpenTag => "'<?php'",
            Token::CloseTag(_) => "'?>'",
            Token::IntLit(_) => "integer",
            Token::FloatLit(_) => "float",
            Token::SingleString(_) | Token::DoubleString(_) => "string",
            Token::Variable => "variable",
            Token::Ident => "identifier",
            Token::PlusPlus => "'++'",
            Token::MinusMinus => "'--'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::StarStar => "'**'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Percent => "'%'",
            Token::Dot => "'.'",
            Token::Eq => "'='",
            Token::PlusEq => "'+='",
            Token::MinusEq => "'-='",
            Token::StarEq => "'*='",
            Token::StarStarEq => "'**='",
            Token::SlashEq => "'/='",
            Token::DotEq => "'.='",
            Token::PercentEq => "'%='",
            Token::QuestionQuestionEq => "'??='",
            Token::AmpEq => "'&='",
            Token::PipeEq => "'|='",
            Token::CaretEq => "'^='",
            Token::ShlEq => "'<<='",
            Token::ShrEq => "'>>='",
            Token::EqEq => "'=='",
            Token::EqEqEq => "'==='",
            Token::BangEq => "'!='",
            Token::LtGt => "'<>'",
            Token::BangEqEq => "'!=='",
            Token::Lt => "'<'",
            Token::Gt => "'>'",
            Token::LtEq => "'<='",
            Token::GtEq => "'>='",
            Token::Spaceship => "'<=>'",
            Token::Shl => "'<<'",
            Token::Shr => "'>>'",
            Token::AmpAmp => "'&&'",
            Token::PipePipe => "'||'",
            Token::Bang => "'!'",
            Token::Amp => "'&'",
            Token::Pipe => "'|'",
            Token::Caret => "'^'",
            Token::Tilde => "'~'",
            Token::At => "'@'",
            Token::QuestionQuestion => "'??'",
            Token::Question => "'?'",
            Token::NullsafeArrow => "'?->'",
            Token::Arrow => "'->'",
            Token::FatArrow => "'=>'",
            Token::ColonColon => "'::'",
            Token::Ellipsis => "'...'",
            Token::Backslash => "'\\'",
            Token::Dollar => "'$'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::Colon => "':'",
            Token::Whitespace => "whitespace",
            Token::Comment => "comment",
            Token::Error(text) => return write!(f, "invalid input '{text}'"),
            Token::Eof => "end of input",
            _ => "token",
        };
        f.write_str(s)
    }
}
