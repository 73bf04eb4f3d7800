//! Error type for the translation pipeline.
//!
//! Every structural failure aborts the whole generation run; there is
//! no recovery or partial-output contract. Output already written to
//! the sink before the failure is not rolled back.

use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// A failed translation. One variant per malformed construct the code
/// generator can reject, plus sink I/O failures.
#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error("Define requires identifier")]
    #[diagnostic(help("write (define name ...) with a plain identifier after define"))]
    DefineRequiresIdentifier,

    #[error("Display requires literal or identifier")]
    #[diagnostic(help("display takes a number or a string literal"))]
    DisplayRequiresValue,

    #[error("Lambda requires a body and optional arguments")]
    LambdaRequiresBody,

    #[error("Subtraction requires two arguments")]
    SubRequiresTwoArguments,

    #[error("Multiplication requires two arguments")]
    MultiplyRequiresTwoArguments,

    #[error("Bytes requires a quoted s-expr")]
    #[diagnostic(help("write (bytes '(...)) with the list quoted"))]
    BytesRequiresQuotedSexpr,

    #[error("Words requires a quoted s-expr")]
    #[diagnostic(help("write (words '(...)) with the list quoted"))]
    WordsRequiresQuotedSexpr,

    #[error(transparent)]
    Io(#[from] io::Error),
}
