//! The second, C-like front end.
//!
//! Only the tokenizer tables are real; the parse step is a stub that
//! prints the token stream and builds nothing. It exists so the shared
//! [`crate::lexer::Tokenizer`] is exercised against a second language.

use crate::token::Token;

/// Classification tables for the C-like dialect.
pub const COMMENT: &str = "//";
pub const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "gosub", "goto", "if", "int", "long", "register", "return",
    "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned",
    "void", "volatile", "while", "word",
];
pub const OPERATORS: &str = "=+-*/<>&|";
pub const SEPARATORS: &str = ":;{}(),";

/// Stub parse: print each token. No AST is produced yet.
pub fn parse(tokens: &[Token]) {
    for token in tokens {
        println!("{token}");
    }
}
