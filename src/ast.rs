//! Abstract syntax tree for the Scheme dialect.
//!
//! The tree is deliberately loose: a node is a tag, an optional text
//! payload, a quoted flag, and an ordered list of owned children. There
//! is no per-tag arity — operator arguments live as *siblings* of the
//! operator node in the enclosing list, and the code generator walks
//! them positionally. See [`crate::codegen`].
//!
//! The root node's first child is always the [`AstKind::StringPool`]
//! node. String literals are never inlined at their use site: the
//! parser hoists each into the pool and leaves an [`AstKind::Reference`]
//! whose payload is a content-derived identifier, so the generator can
//! emit all string data once under stable labels.

use std::fmt;

/// Node tags. A closed set: both the parser's keyword table and the
/// code generator dispatch with exhaustive matches over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstKind {
    Root,

    Comment,
    Define,
    Display,
    Reference,

    Bytes,
    Words,

    Identifier,
    If,
    Label,
    Lambda,
    Literal,
    SExpr,
    String,

    Equals,
    Add,
    Sub,
    Multiply,
    Divide,
    GreaterThan,
    LessThan,

    StringPool,

    Dup,
}

impl fmt::Display for AstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AstKind::Root => "ROOT",
            AstKind::Comment => "COMMENT",
            AstKind::Define => "DEFINE",
            AstKind::Display => "DISPLAY",
            AstKind::Reference => "REFERENCE",
            AstKind::Bytes => "BYTES",
            AstKind::Words => "WORDS",
            AstKind::Identifier => "IDENTIFIER",
            AstKind::If => "IF",
            AstKind::Label => "LABEL",
            AstKind::Lambda => "LAMBDA",
            AstKind::Literal => "LITERAL",
            AstKind::SExpr => "SEXPR",
            AstKind::String => "STRING",
            AstKind::Equals => "EQUALS",
            AstKind::Add => "ADD",
            AstKind::Sub => "SUB",
            AstKind::Multiply => "MULTIPLY",
            AstKind::Divide => "DIVIDE",
            AstKind::GreaterThan => "GREATER_THAN",
            AstKind::LessThan => "LESS_THAN",
            AstKind::StringPool => "STRING_POOL",
            AstKind::Dup => "DUP",
        };
        f.write_str(name)
    }
}

/// One AST node. Owns its children; the tree has no sharing and no
/// cycles. `quoted` belongs to the node itself and is never inherited
/// by children (quoting is shallow).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: AstKind,
    pub text: Option<String>,
    pub quoted: bool,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(kind: AstKind) -> Self {
        Self {
            kind,
            text: None,
            quoted: false,
            children: Vec::new(),
        }
    }

    pub fn with_text(kind: AstKind, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(kind)
        }
    }

    pub fn quoted(mut self, quoted: bool) -> Self {
        self.quoted = quoted;
        self
    }

    /// Text payload, or `""` for payload-free tags.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Diagnostic tree dump: one node per line, indented by depth.
    pub fn write_tree(&self, f: &mut impl fmt::Write, level: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{}, value='{}', quoted={}, children={}",
            "",
            self.kind,
            self.text(),
            self.quoted,
            self.children.len(),
            indent = level * 4
        )?;
        for child in &self.children {
            child.write_tree(f, level + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_tree(&mut out, 0)?;
        f.write_str(out.trim_end())
    }
}

/// Content-derived identifier for a pooled string. The pool entry's
/// label and every reference to it must go through this same function
/// so a reference resolves to exactly one pool entry.
pub fn string_ref_id(text: &str) -> String {
    format!("{:x}", fxhash::hash64(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_id_stable_and_content_addressed() {
        assert_eq!(string_ref_id("Hello World!"), string_ref_id("Hello World!"));
        assert_ne!(string_ref_id("Hello World!"), string_ref_id("hello world!"));
    }

    #[test]
    fn test_tree_dump_indents_children() {
        let mut sexpr = AstNode::new(AstKind::SExpr);
        sexpr.children.push(AstNode::with_text(AstKind::Literal, "1"));
        let mut root = AstNode::new(AstKind::Root);
        root.children.push(sexpr);

        let dump = root.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[0].starts_with("ROOT"));
        assert!(lines[1].starts_with("    SEXPR"));
        assert!(lines[2].starts_with("        LITERAL, value='1'"));
    }
}
