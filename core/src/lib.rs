//! libcompose-core
//!
//! An X11 Compose sequence engine: compiles Compose text files (the
//! XCompose(5) format) into a compact in-memory trie, and walks that trie
//! one keysym at a time to turn sequences like `<dead_tilde> <space>` into
//! text and replacement keysyms.
//!
//! Two halves make up the crate:
//!
//! - The compiler: [`ComposeTable::from_locale`], `from_reader` and
//!   `from_buffer` run the scanner/lexer/parser pipeline, handle `include`
//!   directives with `%H`/`%L`/`%S` expansion, and build the trie.
//! - The runtime: [`ComposeState`] is a small walker over a shared table.
//!   Feed it keysyms, poll [`ComposeState::status`], and read the result
//!   with [`ComposeState::utf8`] and [`ComposeState::one_sym`].
//!
//! # Example
//!
//! ```
//! use libcompose_core::{
//!     CompileFlags, ComposeState, ComposeTable, Format, Keysym, StateFlags, Status,
//! };
//!
//! let table = ComposeTable::from_buffer(
//!     "<dead_tilde> <space> : \"~\" asciitilde\n",
//!     "C",
//!     Format::TextV1,
//!     CompileFlags::NONE,
//! )
//! .unwrap()
//! .share();
//!
//! let mut state = ComposeState::new(table, StateFlags::NONE).unwrap();
//! state.feed(Keysym::from_name("dead_tilde").unwrap());
//! assert_eq!(state.status(), Status::Composing);
//! state.feed(Keysym::from_name("space").unwrap());
//! assert_eq!(state.status(), Status::Composed);
//! assert_eq!(state.utf8(), "~");
//! ```
//!
//! Tables are immutable once built; share one across threads with
//! [`ComposeTable::share`] and give each consumer its own `ComposeState`.

pub mod config;
pub mod keysym;
pub mod locale;
pub mod paths;
pub mod state;
pub mod table;

mod lexer;
mod parser;
mod scanner;

pub use config::ComposeConfig;
pub use keysym::Keysym;
pub use locale::resolve_locale;
pub use paths::Environment;
pub use state::{ComposeState, StateFlags, Status};
pub use table::{CompileFlags, ComposeTable, Format, Node, SequenceEntry, Sequences};

/// Errors from table and state construction.
///
/// Per-line problems in Compose files are not errors; they are logged and
/// the offending line is skipped. Construction only fails on the hard
/// conditions below.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("unrecognized compile flags: {0:#x}")]
    UnknownCompileFlags(u32),
    #[error("unrecognized state flags: {0:#x}")]
    UnknownStateFlags(u32),
    #[error("could not resolve locale \"{0}\"")]
    UnresolvableLocale(String),
    #[error("couldn't find a Compose file for locale \"{0}\"")]
    NoComposeFile(String),
    #[error("failed to read Compose file {path:?}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse Compose file {0:?}")]
    Parse(String),
}
