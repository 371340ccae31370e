pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod validate;
pub mod visit;
pub mod pretty;
pub mod stats;
pub mod cfg;
pub mod config;
mod stack;

use config::ParseOptions;
use diagnostics::Diagnostic;
use parser::ast::Program;

pub use pretty::pretty_print as print;

/// Parse a PHP document with default options (lex → parse → validate).
pub fn parse(source: &str) -> Result<Program, Diagnostic> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse a PHP document. The returned program has passed structural
/// validation.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Program, Diagnostic> {
    let stream = lexer::lex(source);
    tracing::debug!(tokens = stream.len(), bytes = source.len(), "parsing");
    let program = parser::Parser::new(&stream.tokens, source, *options).parse_program()?;
    validate::validate(&program)?;
    tracing::debug!(stmts = program.stmts.len(), "parsed program");
    Ok(program)
}

/// Reformat `source` into canonical form.
pub fn format_source(source: &str) -> Result<String, Diagnostic> {
    Ok(print(&parse(source)?))
}
