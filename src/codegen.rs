//! Code generator — positional car/cdr walk over the AST, emitting
//! textual assembly for a stack-based VM.
//!
//! Generation does not recurse structurally (node into its own
//! children). Each dispatch receives the *parent* node, the *current*
//! node, and an index into the parent's children list, and returns the
//! index to resume from. An operator's arguments are the *following
//! sibling slots* in the same list, not its children: `(if test then
//! else)` parses to a flat four-element list `[If, test, then, else]`,
//! and the If handler walks slots 1..3 forward itself.
//!
//! "car" ([`CodeGenerator::process_car`]) dispatches the element at the
//! current index; "cdr" ([`CodeGenerator::process_cdr`]) advances
//! through the remainder of a parent's list. Every handler knows, by
//! tag, exactly how many forward slots it consumes.
//!
//! The target is a stack machine: arguments are generated first
//! (pushed left to right), then the operation is emitted as a
//! subroutine call that consumes them. Nested `if`s reuse the
//! `_else`/`_endif` label pair, so each one is wrapped in a
//! `.scope`/`.scend` lexical scope.

use std::io::Write;

use crate::ast::{string_ref_id, AstKind, AstNode};
use crate::errors::CompileError;

type Result<T> = std::result::Result<T, CompileError>;

pub struct CodeGenerator<W: Write> {
    out: W,
}

impl<W: Write> CodeGenerator<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Walk the whole tree and emit assembly to the sink. The string
    /// pool is the root's first child, so pooled string data is emitted
    /// before any code. Any structural error aborts the run; output
    /// already written stays written.
    pub fn generate(&mut self, root: &AstNode) -> Result<()> {
        self.process_cdr(root, 0)?;
        self.out.flush()?;
        Ok(())
    }

    /// Dispatch one element of a list by tag. Returns the next index in
    /// `parent`'s children to resume from.
    fn process_car(&mut self, parent: &AstNode, node: &AstNode, idx: usize) -> Result<usize> {
        match node.kind {
            AstKind::Bytes => self.process_data(parent, idx, ".byte"),
            AstKind::Define => self.process_define(parent, idx),
            AstKind::Display => self.process_display(parent, idx),
            AstKind::Dup => self.process_dup(idx),
            AstKind::Equals => self.process_equals(parent, idx),
            AstKind::Identifier => self.process_identifier(parent, node, idx),
            AstKind::If => self.process_if(parent, idx),
            AstKind::Lambda => self.process_lambda(parent, idx),
            AstKind::Literal => self.process_literal(node, idx),
            AstKind::Multiply => self.process_multiply(parent, idx),
            AstKind::SExpr => self.process_sexpr(node, idx),
            AstKind::StringPool => self.process_string_pool(node, idx),
            AstKind::Sub => self.process_sub(parent, idx),
            AstKind::Words => self.process_data(parent, idx, ".word"),

            // Structural tags: nothing to emit, but they show up in
            // trace output when walking the tree.
            AstKind::Root | AstKind::String => {
                tracing::debug!(node = %node.kind, "structural node, no emission");
                Ok(idx + 1)
            }

            // No generator entry bound: the walk skips the slot.
            AstKind::Comment
            | AstKind::Reference
            | AstKind::Label
            | AstKind::Add
            | AstKind::Divide
            | AstKind::GreaterThan
            | AstKind::LessThan => Ok(idx + 1),
        }
    }

    /// Process the rest of `parent`'s list from `idx` onward.
    fn process_cdr(&mut self, parent: &AstNode, mut idx: usize) -> Result<usize> {
        while idx < parent.children.len() {
            idx = self.process_car(parent, &parent.children[idx], idx)?;
        }
        Ok(idx)
    }

    // ── Per-tag handlers ─────────────────────────────────────────────

    /// `(define name ...)` — the next sibling names a label.
    fn process_define(&mut self, parent: &AstNode, idx: usize) -> Result<usize> {
        let idx = idx + 1;
        let name = match parent.children.get(idx) {
            Some(node) if node.kind == AstKind::Identifier => node.text(),
            _ => return Err(CompileError::DefineRequiresIdentifier),
        };
        writeln!(self.out, "{name}:")?;
        Ok(idx + 1)
    }

    /// `(display x)` — an immediate print for a literal, or
    /// push-address-and-call-println for a pooled string reference.
    fn process_display(&mut self, parent: &AstNode, idx: usize) -> Result<usize> {
        let idx = idx + 1;
        match parent.children.get(idx) {
            Some(node) if node.kind == AstKind::Literal => {
                writeln!(self.out, "\t`print {}", node.text())?;
            }
            Some(node) if node.kind == AstKind::Reference => {
                writeln!(self.out, "\t`pushi ref_{}", node.text())?;
                writeln!(self.out, "\tjsr println")?;
            }
            _ => return Err(CompileError::DisplayRequiresValue),
        }
        Ok(idx + 1)
    }

    fn process_dup(&mut self, idx: usize) -> Result<usize> {
        writeln!(self.out, "\t`dup")?;
        Ok(idx + 1)
    }

    /// `(= a b)` — generate all remaining siblings, then the comparison
    /// call consumes what they pushed.
    fn process_equals(&mut self, parent: &AstNode, idx: usize) -> Result<usize> {
        let idx = self.process_cdr(parent, idx + 1)?;
        writeln!(self.out, "\tjsr equals16")?;
        Ok(idx)
    }

    /// An identifier is positional: at slot 0 of its list it is a call
    /// (arguments first, then `jsr`); anywhere else it is a variable
    /// reference pushed onto the stack.
    fn process_identifier(&mut self, parent: &AstNode, node: &AstNode, idx: usize) -> Result<usize> {
        if idx == 0 {
            let idx = self.process_cdr(parent, idx + 1)?;
            writeln!(self.out, "\tjsr {}", node.text())?;
            Ok(idx)
        } else {
            writeln!(self.out, "\t`pushv {}", node.text())?;
            Ok(idx + 1)
        }
    }

    /// `(if test then else...)` — one `_else`/`_endif` label pair per
    /// if, inside its own `.scope` so nested ifs don't collide.
    fn process_if(&mut self, parent: &AstNode, idx: usize) -> Result<usize> {
        let mut idx = idx + 1;

        if let Some(test) = parent.children.get(idx) {
            idx = self.process_car(parent, test, idx)?;
        }
        writeln!(self.out, ".scope")?;
        writeln!(self.out, "\tbne _else")?;

        if let Some(then) = parent.children.get(idx) {
            idx = self.process_car(parent, then, idx)?;
        }
        writeln!(self.out, "\tbra _endif\n_else:")?;

        // Everything left in the list is the else arm.
        idx = self.process_cdr(parent, idx)?;

        writeln!(self.out, "_endif:")?;
        writeln!(self.out, ".scend")?;
        writeln!(self.out)?;
        Ok(idx)
    }

    /// `(lambda (params) body...)` — parameters are accepted
    /// syntactically but not bound; the body runs inside a scope and
    /// ends with a return.
    fn process_lambda(&mut self, parent: &AstNode, idx: usize) -> Result<usize> {
        let mut idx = idx + 1;

        if parent.children.len() < 2 {
            return Err(CompileError::LambdaRequiresBody);
        }
        if parent.children.len() >= 3 {
            // Skip the parameter-list slot.
            idx += 1;
        }

        writeln!(self.out, ".scope")?;
        idx = self.process_cdr(parent, idx)?;
        writeln!(self.out, "\trts")?;
        writeln!(self.out, ".scend")?;
        writeln!(self.out)?;
        Ok(idx)
    }

    fn process_literal(&mut self, node: &AstNode, idx: usize) -> Result<usize> {
        writeln!(self.out, "\t`pushi {}", node.text())?;
        Ok(idx + 1)
    }

    fn process_multiply(&mut self, parent: &AstNode, idx: usize) -> Result<usize> {
        let idx = idx + 1;
        if parent.children.len() < 3 {
            return Err(CompileError::MultiplyRequiresTwoArguments);
        }
        let idx = self.process_cdr(parent, idx)?;
        writeln!(self.out, "\tjsr mul16")?;
        Ok(idx)
    }

    fn process_sub(&mut self, parent: &AstNode, idx: usize) -> Result<usize> {
        let idx = idx + 1;
        if parent.children.len() < 3 {
            return Err(CompileError::SubRequiresTwoArguments);
        }
        let idx = self.process_cdr(parent, idx)?;
        writeln!(self.out, "\tjsr sub16")?;
        Ok(idx)
    }

    /// Quoted lists are inert data (referenced by bytes/words); only
    /// unquoted lists generate code, from slot 0 of their own children.
    fn process_sexpr(&mut self, node: &AstNode, idx: usize) -> Result<usize> {
        if !node.quoted {
            self.process_cdr(node, 0)?;
        }
        Ok(idx + 1)
    }

    /// Emit every pooled string as a labelled, null-terminated byte
    /// literal. Labels use the same content hash as the references.
    fn process_string_pool(&mut self, node: &AstNode, idx: usize) -> Result<usize> {
        for entry in &node.children {
            writeln!(
                self.out,
                "ref_{}:\t.byte \"{}\",0",
                string_ref_id(entry.text()),
                entry.text()
            )?;
        }
        Ok(idx + 1)
    }

    /// `(bytes '(...))` / `(words '(...))` — the next sibling must be a
    /// quoted list; its literal values become a data directive.
    fn process_data(&mut self, parent: &AstNode, idx: usize, directive: &str) -> Result<usize> {
        let idx = idx + 1;
        let list = match parent.children.get(idx) {
            Some(node) if node.kind == AstKind::SExpr && node.quoted => node,
            _ => {
                return Err(if directive == ".byte" {
                    CompileError::BytesRequiresQuotedSexpr
                } else {
                    CompileError::WordsRequiresQuotedSexpr
                })
            }
        };

        write!(self.out, "\t{directive} ")?;
        for (i, value) in list.children.iter().enumerate() {
            if i > 0 {
                write!(self.out, ", ")?;
            }
            write!(self.out, "{}", value.text())?;
        }
        writeln!(self.out)?;
        Ok(idx + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use crate::parser::{self, Parser};

    fn parse_source(source: &str) -> AstNode {
        let mut tokenizer = Tokenizer::new(
            parser::COMMENT,
            parser::KEYWORDS,
            parser::OPERATORS,
            parser::SEPARATORS,
        );
        tokenizer.feed(source);
        Parser::new().parse(&tokenizer.into_tokens())
    }

    fn generate(source: &str) -> (Result<()>, String) {
        let root = parse_source(source);
        let mut out = Vec::new();
        let result = CodeGenerator::new(&mut out).generate(&root);
        (result, String::from_utf8(out).unwrap())
    }

    fn generate_ok(source: &str) -> String {
        let (result, asm) = generate(source);
        result.unwrap();
        asm
    }

    #[test]
    fn test_if_emits_scoped_branches_in_order() {
        let asm = generate_ok("(if (= n 0) 1 (* n (fact (- n 1))))");
        assert_eq!(
            asm,
            "\t`pushv n\n\
             \t`pushi 0\n\
             \tjsr equals16\n\
             .scope\n\
             \tbne _else\n\
             \t`pushi 1\n\
             \tbra _endif\n\
             _else:\n\
             \t`pushv n\n\
             \t`pushv n\n\
             \t`pushi 1\n\
             \tjsr sub16\n\
             \tjsr fact\n\
             \tjsr mul16\n\
             _endif:\n\
             .scend\n\n"
        );
    }

    #[test]
    fn test_define_quoted_list_emits_label_only() {
        let asm = generate_ok("(define data '(1 2 3 4))");
        assert_eq!(asm, "data:\n");
    }

    #[test]
    fn test_bytes_directive() {
        assert_eq!(generate_ok("(bytes '(1 2 3))"), "\t.byte 1, 2, 3\n");
    }

    #[test]
    fn test_words_directive() {
        assert_eq!(generate_ok("(words '(1 2))"), "\t.word 1, 2\n");
    }

    #[test]
    fn test_bytes_rejects_unquoted_list() {
        let (result, asm) = generate("(bytes (1 2 3))");
        assert!(matches!(result, Err(CompileError::BytesRequiresQuotedSexpr)));
        assert_eq!(asm, "");
    }

    #[test]
    fn test_sub_requires_two_arguments() {
        let (result, asm) = generate("(- 1)");
        assert!(matches!(result, Err(CompileError::SubRequiresTwoArguments)));
        assert_eq!(asm, "");
    }

    #[test]
    fn test_multiply_requires_two_arguments() {
        let (result, asm) = generate("(* 2)");
        assert!(matches!(
            result,
            Err(CompileError::MultiplyRequiresTwoArguments)
        ));
        assert_eq!(asm, "");
    }

    #[test]
    fn test_define_requires_identifier() {
        let (result, _) = generate("(define (dup))");
        assert!(matches!(result, Err(CompileError::DefineRequiresIdentifier)));
        // A missing sibling is the same structural failure.
        let (result, _) = generate("(define)");
        assert!(matches!(result, Err(CompileError::DefineRequiresIdentifier)));
    }

    #[test]
    fn test_display_literal_prints_immediately() {
        assert_eq!(generate_ok("(display 42)"), "\t`print 42\n");
    }

    #[test]
    fn test_display_string_pushes_pool_reference() {
        let asm = generate_ok("(display \"Hello World!\")");
        let id = crate::ast::string_ref_id("Hello World!");
        assert_eq!(
            asm,
            format!(
                "ref_{id}:\t.byte \"Hello World!\",0\n\
                 \t`pushi ref_{id}\n\
                 \tjsr println\n"
            )
        );
    }

    #[test]
    fn test_display_rejects_bare_list() {
        let (result, _) = generate("(display (dup))");
        assert!(matches!(result, Err(CompileError::DisplayRequiresValue)));
    }

    #[test]
    fn test_dup_duplicates_top_of_stack() {
        assert_eq!(generate_ok("(dup)"), "\t`dup\n");
    }

    #[test]
    fn test_identifier_at_head_is_a_call() {
        assert_eq!(generate_ok("(fact 5)"), "\t`pushi 5\n\tjsr fact\n");
    }

    #[test]
    fn test_lambda_wraps_body_in_scope_with_return() {
        let asm = generate_ok("(lambda (n) (dup))");
        assert_eq!(asm, ".scope\n\t`dup\n\trts\n.scend\n\n");
    }

    #[test]
    fn test_lambda_without_param_list_generates_body() {
        let asm = generate_ok("(define hello (lambda (display 42)))");
        assert_eq!(asm, "hello:\n.scope\n\t`print 42\n\trts\n.scend\n\n");
    }

    #[test]
    fn test_lambda_requires_body() {
        let (result, _) = generate("(lambda)");
        assert!(matches!(result, Err(CompileError::LambdaRequiresBody)));
    }

    #[test]
    fn test_equals_has_no_arity_check() {
        assert_eq!(generate_ok("(=)"), "\tjsr equals16\n");
    }

    #[test]
    fn test_unbound_operators_are_skipped() {
        // + and / have no generator entry yet; their arguments still
        // generate as plain siblings.
        assert_eq!(generate_ok("(+ 1 2)"), "\t`pushi 1\n\t`pushi 2\n");
    }

    #[test]
    fn test_comments_emit_nothing() {
        assert_eq!(generate_ok("; a comment\n(dup)"), "\t`dup\n");
    }

    #[test]
    fn test_string_pool_emitted_before_code() {
        let asm = generate_ok("(define main (lambda (display \"hi\")))");
        let id = crate::ast::string_ref_id("hi");
        assert!(asm.starts_with(&format!("ref_{id}:\t.byte \"hi\",0\n")));
        assert!(asm.contains("main:\n"));
    }

    #[test]
    fn test_factorial_program_end_to_end() {
        let asm = generate_ok(
            "(define factorial\n  (lambda (n)\n  (if (= n 0) 1\n      (* n (factorial (- n 1))))))\n(define main (factorial 5))",
        );
        assert_eq!(
            asm,
            "factorial:\n\
             .scope\n\
             \t`pushv n\n\
             \t`pushi 0\n\
             \tjsr equals16\n\
             .scope\n\
             \tbne _else\n\
             \t`pushi 1\n\
             \tbra _endif\n\
             _else:\n\
             \t`pushv n\n\
             \t`pushv n\n\
             \t`pushi 1\n\
             \tjsr sub16\n\
             \tjsr factorial\n\
             \tjsr mul16\n\
             _endif:\n\
             .scend\n\n\
             \trts\n\
             .scend\n\n\
             main:\n\
             \t`pushi 5\n\
             \tjsr factorial\n"
        );
    }
}
