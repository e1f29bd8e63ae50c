//! Pipeline orchestration: source text in, program output and
//! diagnostics out.


use crate::diagnostics::Diagnostics;
use crate::interpreter::{interpret, OutputSink};
use crate::lexer::lex;
use crate::parser::parse;
use crate::types::check;

/// Run a program end to end. The stages share one diagnostics sink;
/// interpretation only starts when no stage before it reported an
/// error. The returned sink holds everything that went wrong — render
/// it against the same source to show the user.
pub fn run(source: &str, sink: &mut dyn OutputSink) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    let tokens = lex(source, &mut diagnostics);
    let program = parse(source, tokens, &mut diagnostics);
    check(&program, &mut diagnostics);

    if !diagnostics.had_error() {
        interpret(&program, sink, &mut diagnostics);
    }

    diagnostics
}
