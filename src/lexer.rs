//! Tokenizer — a configurable finite-state scanner.
//!
//! The tokenizer is shared by both front ends: it is parameterized by a
//! comment marker, a keyword list, an operator character set, and a
//! separator character set, and performs only demarcation and minimal
//! classification. It is driven a chunk at a time — a whole file or one
//! line per call — and the only state carried between calls is the
//! in-progress token.
//!
//! The scanner is a five-state machine (Unknown, Comment, Identifier,
//! Literal, String). Unknown is both the initial state and the state
//! every completed token resets to. Identifier and Literal terminators
//! are reprocessed in Unknown state rather than consumed, so a `)`
//! ending an identifier still becomes its own Separator token.

use crate::token::{Token, TokenKind};

/// Scanner state. Each non-Unknown state accumulates characters for a
/// token of the matching kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unknown,
    Comment,
    Identifier,
    Literal,
    String,
}

pub struct Tokenizer {
    comment: Vec<char>,
    keywords: Vec<String>,
    operators: Vec<char>,
    separators: Vec<char>,
    state: State,
    buf: String,
    tokens: Vec<Token>,
}

impl Tokenizer {
    /// Create a tokenizer for one language.
    ///
    /// * `comment` — the marker that starts a comment line (may be more
    ///   than one character, e.g. `//`).
    /// * `keywords` — words classified as [`TokenKind::Keyword`] instead
    ///   of [`TokenKind::Identifier`].
    /// * `operators` — characters classified as operators. A doubled
    ///   operator character (`--`, `==`) is emitted as one token.
    /// * `separators` — characters that always form a one-character token.
    pub fn new(comment: &str, keywords: &[&str], operators: &str, separators: &str) -> Self {
        Self {
            comment: comment.chars().collect(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            operators: operators.chars().collect(),
            separators: separators.chars().collect(),
            state: State::Unknown,
            buf: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Feed a chunk of source text. May be called repeatedly; a token
    /// split across chunk boundaries is carried over.
    pub fn feed(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let mut idx = 0;
        while idx < chars.len() {
            match self.state {
                State::Unknown => idx = self.scan_unknown(&chars, idx),
                State::Comment => idx = self.scan_comment(&chars, idx),
                State::Identifier => idx = self.scan_identifier(&chars, idx),
                State::Literal => idx = self.scan_literal(&chars, idx),
                State::String => idx = self.scan_string(&chars, idx),
            }
        }
    }

    /// Finish scanning and hand back the token list. A pending comment,
    /// identifier, or literal is emitted as if terminated; a pending
    /// (unterminated) string is dropped.
    pub fn into_tokens(mut self) -> Vec<Token> {
        match self.state {
            State::Comment => self.emit_buffered(TokenKind::Comment),
            State::Identifier => self.emit_word(),
            State::Literal => self.emit_buffered(TokenKind::Literal),
            State::String => {
                tracing::debug!(partial = %self.buf, "dropping unterminated string");
            }
            State::Unknown => {}
        }
        self.tokens
    }

    // ── Per-state scanners ───────────────────────────────────────────
    //
    // Each takes the current character index and returns the index to
    // resume from. Returning `idx` unchanged reprocesses the character
    // in the new state.

    fn scan_unknown(&mut self, chars: &[char], idx: usize) -> usize {
        if chars[idx..].starts_with(&self.comment) {
            self.state = State::Comment;
            return idx + self.comment.len();
        }

        let c = chars[idx];
        if c.is_alphabetic() || c == '_' {
            self.state = State::Identifier;
            self.buf.push(c);
        } else if c.is_numeric() {
            self.state = State::Literal;
            self.buf.push(c);
        } else if self.separators.contains(&c) {
            self.emit(TokenKind::Separator, c.to_string());
        } else if self.operators.contains(&c) {
            // A repeated operator character (--, ==, ...) is one token.
            if chars.get(idx + 1) == Some(&c) {
                self.emit(TokenKind::Operator, [c, c].iter().collect::<String>());
                return idx + 2;
            }
            self.emit(TokenKind::Operator, c.to_string());
        } else if c == '"' {
            self.state = State::String;
        } else if !c.is_whitespace() {
            // Not classifiable by any table: skip it, but leave a trace.
            tracing::debug!(ch = %c, "skipping unclassifiable character");
        }
        idx + 1
    }

    fn scan_comment(&mut self, chars: &[char], idx: usize) -> usize {
        if chars[idx] == '\n' {
            self.emit_buffered(TokenKind::Comment);
        } else {
            self.buf.push(chars[idx]);
        }
        idx + 1
    }

    fn scan_identifier(&mut self, chars: &[char], idx: usize) -> usize {
        let c = chars[idx];
        if c.is_alphanumeric() || c == '_' {
            self.buf.push(c);
            idx + 1
        } else {
            self.emit_word();
            idx
        }
    }

    fn scan_literal(&mut self, chars: &[char], idx: usize) -> usize {
        let c = chars[idx];
        if c.is_numeric() {
            self.buf.push(c);
            idx + 1
        } else {
            self.emit_buffered(TokenKind::Literal);
            idx
        }
    }

    fn scan_string(&mut self, chars: &[char], idx: usize) -> usize {
        if chars[idx] == '"' {
            self.emit_buffered(TokenKind::String);
        } else {
            self.buf.push(chars[idx]);
        }
        idx + 1
    }

    // ── Emission helpers ─────────────────────────────────────────────

    /// Emit the accumulated buffer as a keyword or identifier.
    fn emit_word(&mut self) {
        let kind = if self.keywords.iter().any(|k| *k == self.buf) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.emit_buffered(kind);
    }

    fn emit_buffered(&mut self, kind: TokenKind) {
        let text = std::mem::take(&mut self.buf);
        self.emit(kind, text);
    }

    fn emit(&mut self, kind: TokenKind, text: String) {
        self.tokens.push(Token::new(kind, text));
        self.state = State::Unknown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn scheme_tokenizer() -> Tokenizer {
        Tokenizer::new(
            parser::COMMENT,
            parser::KEYWORDS,
            parser::OPERATORS,
            parser::SEPARATORS,
        )
    }

    fn lex(source: &str) -> Vec<Token> {
        let mut tokenizer = scheme_tokenizer();
        tokenizer.feed(source);
        tokenizer.into_tokens()
    }

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text)
    }

    #[test]
    fn test_c_declaration() {
        let mut tokenizer = Tokenizer::new(
            crate::clike::COMMENT,
            crate::clike::KEYWORDS,
            crate::clike::OPERATORS,
            crate::clike::SEPARATORS,
        );
        tokenizer.feed("const char * hello_world = \"Hello World!\"");
        assert_eq!(
            tokenizer.into_tokens(),
            vec![
                tok(TokenKind::Keyword, "const"),
                tok(TokenKind::Keyword, "char"),
                tok(TokenKind::Operator, "*"),
                tok(TokenKind::Identifier, "hello_world"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::String, "Hello World!"),
            ]
        );
    }

    #[test]
    fn test_doubled_operator() {
        let mut tokenizer = Tokenizer::new(
            crate::clike::COMMENT,
            crate::clike::KEYWORDS,
            crate::clike::OPERATORS,
            crate::clike::SEPARATORS,
        );
        tokenizer.feed("x-- = y - 1");
        assert_eq!(
            tokenizer.into_tokens(),
            vec![
                tok(TokenKind::Identifier, "x"),
                tok(TokenKind::Operator, "--"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::Identifier, "y"),
                tok(TokenKind::Operator, "-"),
                tok(TokenKind::Literal, "1"),
            ]
        );
    }

    #[test]
    fn test_scheme_define() {
        assert_eq!(
            lex("(define data '(1 2 3 4))\n"),
            vec![
                tok(TokenKind::Separator, "("),
                tok(TokenKind::Keyword, "define"),
                tok(TokenKind::Identifier, "data"),
                tok(TokenKind::Separator, "'"),
                tok(TokenKind::Separator, "("),
                tok(TokenKind::Literal, "1"),
                tok(TokenKind::Literal, "2"),
                tok(TokenKind::Literal, "3"),
                tok(TokenKind::Literal, "4"),
                tok(TokenKind::Separator, ")"),
                tok(TokenKind::Separator, ")"),
            ]
        );
    }

    #[test]
    fn test_comment_keeps_text_after_marker() {
        assert_eq!(
            lex("; a comment.\n(dup)\n"),
            vec![
                tok(TokenKind::Comment, " a comment."),
                tok(TokenKind::Separator, "("),
                tok(TokenKind::Keyword, "dup"),
                tok(TokenKind::Separator, ")"),
            ]
        );
    }

    #[test]
    fn test_string_quotes_stripped() {
        assert_eq!(
            lex("(display \"Hello World!\")"),
            vec![
                tok(TokenKind::Separator, "("),
                tok(TokenKind::Keyword, "display"),
                tok(TokenKind::String, "Hello World!"),
                tok(TokenKind::Separator, ")"),
            ]
        );
    }

    #[test]
    fn test_line_at_a_time_matches_whole_stream() {
        let source = "(define factorial\n  (lambda (n)\n  (if (= n 0) 1\n      (* n (factorial (- n 1))))))\n";
        let mut by_line = scheme_tokenizer();
        for line in source.split_inclusive('\n') {
            by_line.feed(line);
        }
        assert_eq!(by_line.into_tokens(), lex(source));
    }

    #[test]
    fn test_trailing_token_flushed() {
        assert_eq!(lex("42"), vec![tok(TokenKind::Literal, "42")]);
        assert_eq!(lex("foo"), vec![tok(TokenKind::Identifier, "foo")]);
        assert_eq!(lex("; eof comment"), vec![tok(TokenKind::Comment, " eof comment")]);
    }

    #[test]
    fn test_unclassifiable_characters_skipped() {
        assert_eq!(
            lex("@ 7 #"),
            vec![tok(TokenKind::Literal, "7")]
        );
    }

    #[test]
    fn test_token_text_reconstructs_source() {
        let source = "(define x 42)";
        let rebuilt: String = lex(source).iter().map(|t| t.text.as_str()).collect();
        let squeezed: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(rebuilt, squeezed);
    }

    #[test]
    fn test_underscore_starts_identifier() {
        assert_eq!(
            lex("_x a1"),
            vec![
                tok(TokenKind::Identifier, "_x"),
                tok(TokenKind::Identifier, "a1"),
            ]
        );
    }
}
