//
// lib.rs
// html-comment-remover
//
// Library entry that re-exports modules so the binary and any external users can access CLI parsing, the comment engine, traversal, and file processing.
//
// Thales Matheus Mendonça Santos - November 2025
//
// Public crate interface: re-export modules used by the binary and tests.
pub mod cli;
pub mod comment;
pub mod error;
pub mod process;
pub mod scanner;
pub mod utils;

pub use cli::{build_options, Args, Options};
pub use comment::{comment_spans, strip_comments, CommentKind, CommentSpan, RemovalPolicy};
pub use error::{Error, Result};
pub use process::{process_file, run, FileReport, Summary};
pub use scanner::{scan_input, FileTask, ScanResult};
