//! Inkscape extension that renders a matplotlib figure and inserts it into
//! the open document.
//!
//! The pipeline: assemble a Python program from the form options and the
//! user's code ([`codegen`]), run it in a child interpreter ([`execution`]),
//! read back the `SUCCESS:<path>` artifact and append it to the active layer
//! ([`insert`]).

pub mod bank;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod document;
pub mod error;
pub mod execution;
pub mod handlers;
pub mod insert;
pub mod logging;
pub mod process;
pub mod settings;
pub mod utils;
