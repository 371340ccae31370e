use crate::span::Span;
use serde::Serialize;
use thiserror::Error;

/// The two ways a document can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    SyntaxError,
    StructuralError,
}

/// Grammatically valid input that breaks a cross-reference or arity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StructuralKind {
    DanglingGoto,
    DuplicateLabel,
    EmptyCatchTypes,
    TryWithoutHandler,
    MalformedPropertyHook,
    MismatchedTerminator,
    UnterminatedBlock,
    NestingTooDeep,
    DuplicateDefault,
    InvalidJumpLevel,
    JumpOutsideLoop,
}

impl std::fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StructuralKind::DanglingGoto => "dangling goto",
            StructuralKind::DuplicateLabel => "duplicate label",
            StructuralKind::EmptyCatchTypes => "empty catch type list",
            StructuralKind::TryWithoutHandler => "try without catch or finally",
            StructuralKind::MalformedPropertyHook => "malformed property hook",
            StructuralKind::MismatchedTerminator => "mismatched block terminator",
            StructuralKind::UnterminatedBlock => "unterminated block",
            StructuralKind::NestingTooDeep => "nesting too deep",
            StructuralKind::DuplicateDefault => "duplicate default",
            StructuralKind::InvalidJumpLevel => "invalid jump level",
            StructuralKind::JumpOutsideLoop => "jump outside loop",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum Diagnostic {
    #[error("Syntax error: {msg}")]
    Syntax {
        msg: String,
        span: Span,
        expected: Vec<String>,
    },

    #[error("Structural error ({kind}): {msg}")]
    Structural {
        kind: StructuralKind,
        msg: String,
        span: Span,
    },
}

impl Diagnostic {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span, expected: Vec::new() }
    }

    pub fn expected(msg: impl Into<String>, span: Span, expected: &[&str]) -> Self {
        Self::Syntax {
            msg: msg.into(),
            span,
            expected: expected.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn structural(kind: StructuralKind, msg: impl Into<String>, span: Span) -> Self {
        Self::Structural { kind, msg: msg.into(), span }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::Syntax { .. } => DiagnosticKind::SyntaxError,
            Diagnostic::Structural { .. } => DiagnosticKind::StructuralError,
        }
    }

    pub fn structural_kind(&self) -> Option<StructuralKind> {
        match self {
            Diagnostic::Structural { kind, .. } => Some(*kind),
            Diagnostic::Syntax { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Diagnostic::Syntax { msg, .. } | Diagnostic::Structural { msg, .. } => msg,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Diagnostic::Syntax { span, .. } | Diagnostic::Structural { span, .. } => *span,
        }
    }

    pub fn expected_kinds(&self) -> &[String] {
        match self {
            Diagnostic::Syntax { expected, .. } => expected,
            Diagnostic::Structural { .. } => &[],
        }
    }
}

/// Render a diagnostic as a labelled report (no colour) for terminal output.
pub fn render(source: &str, filename: &str, diag: &Diagnostic) -> String {
    use ariadne::{Config, Label, Report, ReportKind, Source};

    let span = diag.span();
    let start = span.start.min(source.len());
    let end = span.end.clamp(start, source.len());
    let title = match diag {
        Diagnostic::Syntax { .. } => "syntax error".to_string(),
        Diagnostic::Structural { kind, .. } => format!("structural error: {kind}"),
    };

    let mut label_msg = diag.message().to_string();
    if !diag.expected_kinds().is_empty() {
        label_msg.push_str(&format!(" (expected {})", diag.expected_kinds().join(", ")));
    }

    let mut out = Vec::new();
    let written = Report::build(ReportKind::Error, filename, start)
        .with_config(Config::default().with_color(false))
        .with_message(title)
        .with_label(Label::new((filename, start..end)).with_message(label_msg))
        .finish()
        .write((filename, Source::from(source)), &mut out);

    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => format!("{filename}:{}:{}: {diag}", span.line, span.column),
    }
}
