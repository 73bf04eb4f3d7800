//! tinylisp — translates a small Lisp-like dialect into textual
//! assembly for a stack-based virtual machine.
//!
//! # Pipeline
//!
//! ```text
//! Source Code (.scm)
//!     │
//!     ▼
//! ┌───────────┐
//! │ Tokenizer  │  Five-state character scanner, table-configured
//! └─────┬─────┘
//!       │
//!       ▼
//! ┌───────────┐
//! │  Parser    │  Recursive descent over S-expressions; hoists
//! └─────┬─────┘  string literals into a pooled first child
//!       │
//!       ▼
//! ┌───────────┐
//! │  Codegen   │  Positional car/cdr walk; emits stack-VM assembly
//! └─────┬─────┘
//!       │
//!       ▼
//! Assembly text (.asm)
//! ```
//!
//! Data flows strictly left to right; no stage holds state across runs.
//! Each run builds fresh Tokenizer/Parser/CodeGenerator instances.

pub mod ast;
pub mod clike;
pub mod codegen;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod token;
