//! tinylisp CLI entry point.
//!
//! Usage:
//!   tinylisp compile <input.scm>   (translate to <input-stem>.asm)
//!   tinylisp parse <input.scm>     (dump AST)
//!   tinylisp lex <input.scm>       (dump tokens)
//!   tinylisp ctokens <input.c>     (tokenize with the C-like tables)

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::{env, fs, process};

use tinylisp::ast::AstNode;
use tinylisp::codegen::CodeGenerator;
use tinylisp::lexer::Tokenizer;
use tinylisp::parser::{self, Parser};
use tinylisp::token::Token;
use tinylisp::{clike, errors::CompileError};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: tinylisp <command> <file>");
        eprintln!("Commands: lex, parse, compile, ctokens");
        process::exit(64);
    }

    let command = &args[1];
    let filename = &args[2];

    let source = match fs::read_to_string(filename) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {}", filename, e);
            process::exit(74);
        }
    };

    match command.as_str() {
        "lex" => {
            for token in scheme_tokens(&source) {
                println!("{token}");
            }
        }
        "parse" => {
            println!("{}", scheme_ast(&source));
        }
        "compile" => {
            let root = scheme_ast(&source);
            let output = asm_name(filename);
            if let Err(e) = compile_to(&root, &output) {
                eprintln!("{:?}", miette::Report::new(e));
                process::exit(65);
            }
            println!("Compiled to {}", output);
        }
        "ctokens" => {
            let mut tokenizer = Tokenizer::new(
                clike::COMMENT,
                clike::KEYWORDS,
                clike::OPERATORS,
                clike::SEPARATORS,
            );
            tokenizer.feed(&source);
            clike::parse(&tokenizer.into_tokens());
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            process::exit(64);
        }
    }
}

fn scheme_tokens(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(
        parser::COMMENT,
        parser::KEYWORDS,
        parser::OPERATORS,
        parser::SEPARATORS,
    );
    tokenizer.feed(source);
    tokenizer.into_tokens()
}

fn scheme_ast(source: &str) -> AstNode {
    Parser::new().parse(&scheme_tokens(source))
}

/// Output lands in the working directory as `<input-stem>.asm`.
fn asm_name(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    format!("{stem}.asm")
}

fn compile_to(root: &AstNode, output: &str) -> Result<(), CompileError> {
    let sink = BufWriter::new(File::create(output)?);
    CodeGenerator::new(sink).generate(root)
}
