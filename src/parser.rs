//! Parser — single-pass recursive descent over the token stream.
//!
//! The grammar is S-expressions, so "descent" is a mutually recursive
//! pair: [`Parser::parse_element`] dispatches on the current token, and
//! [`Parser::parse_sequence`] parses elements until a closing `)`,
//! appending each directly as a child of the current parent. There is
//! no lookahead beyond the current token and no backtracking.
//!
//! Two deliberate policies shape the tree:
//!
//! - **Unmapped keywords emit nothing.** Words like `car`, `let`, and
//!   `map` are recognized by the lexer but have no code-generation
//!   semantics yet. The parser consumes the token and moves on, so any
//!   sub-expression they governed attaches to the enclosing structural
//!   context instead.
//!
//! - **Quoting is shallow.** A `'` separator produces no node; it marks
//!   only the *next* parsed element as quoted. The marked element's own
//!   children are parsed unquoted.

use crate::ast::{string_ref_id, AstKind, AstNode};
use crate::token::{Token, TokenKind};

/// Classification tables for the Scheme dialect, handed to
/// [`crate::lexer::Tokenizer::new`].
pub const COMMENT: &str = ";";
pub const KEYWORDS: &[&str] = &[
    "abs", "and", "append", "apply", "bytes", "car", "cdr", "cond", "cons", "define", "display",
    "do", "dup", "filter", "if", "lambda", "length", "let", "map", "member", "modulo", "newline",
    "not", "or", "reverse", "words",
];
pub const OPERATORS: &str = "=+-*/<>";
pub const SEPARATORS: &str = "()'";

/// Node tag for a keyword or operator token, or `None` for the words
/// that are recognized lexically but deliberately produce no node.
fn keyword_node(text: &str) -> Option<AstKind> {
    match text {
        "bytes" => Some(AstKind::Bytes),
        "define" => Some(AstKind::Define),
        "display" => Some(AstKind::Display),
        "dup" => Some(AstKind::Dup),
        "if" => Some(AstKind::If),
        "lambda" => Some(AstKind::Lambda),
        "words" => Some(AstKind::Words),
        "=" => Some(AstKind::Equals),
        "+" => Some(AstKind::Add),
        "-" => Some(AstKind::Sub),
        "*" => Some(AstKind::Multiply),
        "/" => Some(AstKind::Divide),
        "<" => Some(AstKind::LessThan),
        ">" => Some(AstKind::GreaterThan),
        // Lexed as keywords, but no semantics are bound to them yet.
        "abs" | "and" | "append" | "apply" | "car" | "cdr" | "cond" | "cons" | "do" | "filter"
        | "length" | "let" | "map" | "member" | "modulo" | "newline" | "not" | "or" | "reverse" => {
            None
        }
        _ => None,
    }
}

pub struct Parser {
    /// Root of the tree under construction. Its first child is the
    /// StringPool node, created here and never re-created.
    root: AstNode,
    /// Strings hoisted out of the tree during this parse; drained into
    /// the StringPool node when parsing finishes.
    pool: Vec<AstNode>,
}

impl Parser {
    pub fn new() -> Self {
        let mut root = AstNode::new(AstKind::Root);
        root.children.push(AstNode::new(AstKind::StringPool));
        Self {
            root,
            pool: Vec::new(),
        }
    }

    /// Consume the token sequence and return the finished tree.
    ///
    /// Running out of tokens mid-expression (a missing `)`) ends the
    /// parse with whatever was built so far; it is an incomplete parse,
    /// not a failure.
    pub fn parse(mut self, tokens: &[Token]) -> AstNode {
        let mut root = std::mem::replace(&mut self.root, AstNode::new(AstKind::Root));
        self.parse_sequence(&mut root, tokens, 0);
        root.children[0].children.append(&mut self.pool);
        root
    }

    /// Parse elements until a closing `)` (consumed and dropped) or the
    /// end of the sequence. Returns the index after the closer.
    fn parse_sequence(&mut self, parent: &mut AstNode, tokens: &[Token], mut idx: usize) -> usize {
        while idx < tokens.len() && !is_separator(&tokens[idx], ")") {
            // The quote flag never travels into contained elements.
            idx = self.parse_element(parent, tokens, idx, false);
        }
        idx + 1
    }

    /// Parse one element, appending any produced node to `parent`.
    /// Returns the index of the next unconsumed token.
    fn parse_element(
        &mut self,
        parent: &mut AstNode,
        tokens: &[Token],
        idx: usize,
        quoted: bool,
    ) -> usize {
        let token = &tokens[idx];
        match token.kind {
            TokenKind::Comment => {
                parent
                    .children
                    .push(AstNode::with_text(AstKind::Comment, &token.text).quoted(quoted));
                idx + 1
            }
            TokenKind::Identifier => {
                parent
                    .children
                    .push(AstNode::with_text(AstKind::Identifier, &token.text).quoted(quoted));
                idx + 1
            }
            TokenKind::Keyword | TokenKind::Operator => {
                if let Some(kind) = keyword_node(&token.text) {
                    parent.children.push(AstNode::new(kind));
                }
                idx + 1
            }
            TokenKind::Literal => {
                parent
                    .children
                    .push(AstNode::with_text(AstKind::Literal, &token.text).quoted(quoted));
                idx + 1
            }
            TokenKind::Separator => self.parse_separator(parent, tokens, idx, quoted),
            TokenKind::String => {
                // Pool entries are deduplicated by content, so every
                // reference resolves to exactly one labelled entry.
                if !self.pool.iter().any(|s| s.text() == token.text) {
                    self.pool
                        .push(AstNode::with_text(AstKind::String, &token.text));
                }
                parent.children.push(AstNode::with_text(
                    AstKind::Reference,
                    string_ref_id(&token.text),
                ));
                idx + 1
            }
            TokenKind::Unknown => idx + 1,
        }
    }

    fn parse_separator(
        &mut self,
        parent: &mut AstNode,
        tokens: &[Token],
        idx: usize,
        quoted: bool,
    ) -> usize {
        match tokens[idx].text.as_str() {
            "(" => {
                let mut sexpr = AstNode::new(AstKind::SExpr).quoted(quoted);
                let next = self.parse_sequence(&mut sexpr, tokens, idx + 1);
                parent.children.push(sexpr);
                next
            }
            // A stray closer; parse_sequence normally consumes these.
            ")" => idx + 1,
            "'" => {
                if idx + 1 < tokens.len() {
                    // Quote the next element only.
                    self.parse_element(parent, tokens, idx + 1, true)
                } else {
                    idx + 1
                }
            }
            _ => idx + 1,
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_separator(token: &Token, text: &str) -> bool {
    token.kind == TokenKind::Separator && token.text == text
}
