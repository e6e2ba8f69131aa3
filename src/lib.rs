//! A parser and interpreter for [Chef](https://esolangs.org/wiki/Chef), the
//! esoteric programming language whose programs read like cookery recipes.
//!
//! A source file is a sequence of recipes. The first recipe is the entry
//! point; the rest are auxiliary recipes callable with `Serve with`.
//! Parsing produces a [`Program`]; the [`Interpreter`] runs its entry
//! recipe, reading `Take` input from a handle and writing the served baking
//! dishes to another.
//!
//! # Basic usage
//!
//! ```rust
//! let src = "Beep.\n\nIngredients.\n7 g beeps\n\nMethod.\nPut beeps into \
//!            the mixing bowl.\nPour contents of the mixing bowl into the \
//!            baking dish.\n\nServes 1.\n";
//! let (program, warnings) = cheflang::parse(src).into_result()?;
//! assert!(warnings.is_empty());
//!
//! let mut out = Vec::new();
//! cheflang::Interpreter::new(&program, std::io::empty(), &mut out).run()?;
//! assert_eq!(out, b"7 \n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Diagnostics are collected in a [`SourceReport`] and print in the stable
//! `<file>:<line>:<column>: <severity>: <message>` format through
//! [`SourceReport::write`]. Runtime failures ([`RuntimeError`]) carry the
//! span of the offending method step and convert to the same format.

#![warn(rustdoc::broken_intra_doc_links, clippy::doc_markdown)]

pub mod error;
pub mod interpreter;
pub mod located;
pub mod model;
pub mod parser;
pub mod span;

mod lexer;
mod scope;

pub use error::{PassResult, Severity, SourceDiag, SourceReport};
pub use interpreter::{Interpreter, RuntimeError};
pub use located::Located;
pub use model::*;
pub use parser::parse;
pub use span::{LineIndex, Span};
