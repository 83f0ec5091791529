//! The compiled compose table: a compact trie over keysym sequences.
//!
//! The trie is a single flat array of [`Node`] values. Nodes refer to each
//! other by index, never by pointer: `next` links a node to its sibling
//! (the alternative tried when the node's keysym does not match) and
//! `successor` links it to the head of its child list (the nodes matching
//! the following keysym of the sequence). Index 0 is the root and doubles
//! as the "absent" sentinel; the root's keysym is `NO_SYMBOL`, which never
//! matches real input, and the top-level alternatives hang off the root's
//! `next` chain.
//!
//! Leaf results live out-of-line: UTF-8 strings are interned back to back
//! in a byte blob, each NUL-terminated, and a node stores the offset of its
//! string. Offset 0 holds a lone NUL and uniformly means "no string".
//!
//! A table is immutable once built and carries no interior mutability, so
//! any number of `ComposeState` walkers may share it through an `Arc`.

use std::io::Read;
use std::sync::Arc;

use crate::keysym::Keysym;
use crate::locale::resolve_locale;
use crate::parser::{self, ParseCtx, Production, MAX_LHS_LEN};
use crate::paths;
use crate::paths::Environment;
use crate::scanner::Scanner;
use crate::ComposeError;

/// The supported Compose file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Format {
    TextV1,
}

/// Flags affecting table compilation. No flags are currently defined;
/// constructors reject any set bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileFlags(u32);

impl CompileFlags {
    pub const NONE: CompileFlags = CompileFlags(0);

    pub const fn from_bits(bits: u32) -> CompileFlags {
        CompileFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// One cell of the trie. All fields are indices or keysyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    keysym: Keysym,
    next: u32,
    successor: u32,
    utf8: u32,
    ks: Keysym,
}

impl Node {
    fn new(keysym: Keysym) -> Node {
        Node {
            keysym,
            next: 0,
            successor: 0,
            utf8: 0,
            ks: Keysym::NO_SYMBOL,
        }
    }

    /// The keysym this node matches.
    pub fn keysym(&self) -> Keysym {
        self.keysym
    }

    /// Index of the next sibling, or 0.
    pub fn next(&self) -> u32 {
        self.next
    }

    /// Index of the first child, or 0. A node with no successor is a leaf.
    pub fn successor(&self) -> u32 {
        self.successor
    }

    /// Offset of this leaf's string in the UTF-8 blob, or 0.
    pub fn utf8_offset(&self) -> u32 {
        self.utf8
    }

    /// Replacement keysym of this leaf, or `NO_SYMBOL`.
    pub fn replacement(&self) -> Keysym {
        self.ks
    }
}

/// A compiled, immutable compose table.
#[derive(Debug)]
pub struct ComposeTable {
    locale: String,
    format: Format,
    flags: CompileFlags,
    nodes: Vec<Node>,
    utf8: Vec<u8>,
}

impl ComposeTable {
    fn new(
        env: &Environment,
        locale: &str,
        format: Format,
        flags: CompileFlags,
    ) -> Result<ComposeTable, ComposeError> {
        if flags.bits() != 0 {
            log::error!("unrecognized compile flags: {:#x}", flags.bits());
            return Err(ComposeError::UnknownCompileFlags(flags.bits()));
        }

        Ok(ComposeTable {
            locale: resolve_locale(env, locale),
            format,
            flags,
            nodes: vec![Node::new(Keysym::NO_SYMBOL)],
            utf8: vec![0],
        })
    }

    /// Compile a table from an in-memory Compose source.
    pub fn from_buffer(
        buffer: impl AsRef<[u8]>,
        locale: &str,
        format: Format,
        flags: CompileFlags,
    ) -> Result<ComposeTable, ComposeError> {
        Self::from_buffer_with_env(
            &Environment::from_process(),
            buffer,
            locale,
            format,
            flags,
        )
    }

    /// Like [`ComposeTable::from_buffer`], with an explicit environment for
    /// locale resolution and `%` include expansion.
    pub fn from_buffer_with_env(
        env: &Environment,
        buffer: impl AsRef<[u8]>,
        locale: &str,
        format: Format,
        flags: CompileFlags,
    ) -> Result<ComposeTable, ComposeError> {
        let mut table = ComposeTable::new(env, locale, format, flags)?;
        let ctx = ParseCtx {
            env,
            locale: table.locale.clone(),
        };
        if !parser::parse_string(&mut table, &ctx, buffer.as_ref(), "(input string)") {
            return Err(ComposeError::Parse("(input string)".to_string()));
        }
        Ok(table)
    }

    /// Compile a table from an open Compose file.
    pub fn from_reader(
        reader: impl Read,
        locale: &str,
        format: Format,
        flags: CompileFlags,
    ) -> Result<ComposeTable, ComposeError> {
        Self::from_reader_with_env(
            &Environment::from_process(),
            reader,
            locale,
            format,
            flags,
        )
    }

    /// Like [`ComposeTable::from_reader`], with an explicit environment.
    pub fn from_reader_with_env(
        env: &Environment,
        mut reader: impl Read,
        locale: &str,
        format: Format,
        flags: CompileFlags,
    ) -> Result<ComposeTable, ComposeError> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|source| ComposeError::Read {
                path: "(unknown file)".into(),
                source,
            })?;

        let mut table = ComposeTable::new(env, locale, format, flags)?;
        let ctx = ParseCtx {
            env,
            locale: table.locale.clone(),
        };
        if !parser::parse_string(&mut table, &ctx, &buffer, "(unknown file)") {
            return Err(ComposeError::Parse("(unknown file)".to_string()));
        }
        Ok(table)
    }

    /// Compile the Compose table for a locale.
    ///
    /// Searches, in order: the file named by `XCOMPOSEFILE`, then
    /// `$HOME/.XCompose`, then the locale's system Compose file. The first
    /// file that can be read wins.
    pub fn from_locale(locale: &str, flags: CompileFlags) -> Result<ComposeTable, ComposeError> {
        Self::from_locale_with_env(&Environment::from_process(), locale, flags)
    }

    /// Like [`ComposeTable::from_locale`], with an explicit environment.
    pub fn from_locale_with_env(
        env: &Environment,
        locale: &str,
        flags: CompileFlags,
    ) -> Result<ComposeTable, ComposeError> {
        let mut table = ComposeTable::new(env, locale, Format::TextV1, flags)?;

        let candidates = [
            paths::xcomposefile_path(env),
            paths::home_xcompose_file_path(env),
            paths::locale_compose_file_path(env, &table.locale),
        ];

        for path in candidates.into_iter().flatten() {
            let Ok(buffer) = std::fs::read(&path) else {
                continue;
            };
            let ctx = ParseCtx {
                env,
                locale: table.locale.clone(),
            };
            let file_name = path.to_string_lossy().into_owned();
            if !parser::parse_string(&mut table, &ctx, &buffer, &file_name) {
                return Err(ComposeError::Parse(file_name));
            }
            log::debug!(
                "created compose table for locale {} from {}",
                table.locale, file_name
            );
            return Ok(table);
        }

        log::error!("couldn't find a Compose file for locale \"{}\"", table.locale);
        Err(ComposeError::NoComposeFile(table.locale))
    }

    /// The canonical locale this table was built for.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn flags(&self) -> CompileFlags {
        self.flags
    }

    /// Number of nodes in the arena, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Read a node by index.
    pub fn node(&self, index: u32) -> Option<&Node> {
        self.nodes.get(index as usize)
    }

    /// The interned string blob. `blob[0]` is always NUL.
    pub fn utf8_blob(&self) -> &[u8] {
        &self.utf8
    }

    /// Wrap the table for sharing with state machines.
    pub fn share(self) -> Arc<ComposeTable> {
        Arc::new(self)
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The NUL-terminated string at `offset` in the blob.
    pub(crate) fn utf8_at(&self, offset: u32) -> &str {
        let bytes = match self.utf8.get(offset as usize..) {
            Some(bytes) => bytes,
            None => return "",
        };
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        std::str::from_utf8(&bytes[..end]).unwrap_or("")
    }

    /// Iterate over every sequence reachable from the root, depth first.
    pub fn sequences(&self) -> Sequences<'_> {
        let mut pending = Vec::new();
        if self.nodes[0].next != 0 {
            pending.push((self.nodes[0].next, 0));
        }
        Sequences {
            table: self,
            pending,
            path: Vec::new(),
        }
    }

    fn add_node(&mut self, keysym: Keysym) -> u32 {
        self.nodes.push(Node::new(keysym));
        (self.nodes.len() - 1) as u32
    }

    /// Insert one production into the trie.
    ///
    /// Walks the sibling chain at each level, appending fresh nodes as
    /// needed. A longer sequence overrides a finished prefix; a new prefix
    /// of an existing sequence, or an exact duplicate, is dropped with a
    /// warning.
    pub(crate) fn add_production(&mut self, s: &Scanner<'_>, production: &Production) {
        debug_assert!(production.len >= 1 && production.len <= MAX_LHS_LEN);

        let mut curr: usize = 0;

        for lhs_pos in 0..production.len {
            let keysym = production.lhs[lhs_pos];

            while self.nodes[curr].keysym != keysym {
                if self.nodes[curr].next == 0 {
                    let next = self.add_node(keysym);
                    self.nodes[curr].next = next;
                }
                curr = self.nodes[curr].next as usize;
            }

            if lhs_pos + 1 == production.len {
                break;
            }

            if self.nodes[curr].successor == 0 {
                if self.nodes[curr].utf8 != 0 || !self.nodes[curr].ks.is_no_symbol() {
                    s.warn(
                        "a sequence already exists which is a prefix of this sequence; \
                         overriding",
                    );
                    self.nodes[curr].utf8 = 0;
                    self.nodes[curr].ks = Keysym::NO_SYMBOL;
                }

                let successor = self.add_node(production.lhs[lhs_pos + 1]);
                self.nodes[curr].successor = successor;
            }

            curr = self.nodes[curr].successor as usize;
        }

        if self.nodes[curr].successor != 0 {
            s.warn("the compose sequence is a prefix of another; skipping line");
            return;
        }

        if self.nodes[curr].utf8 != 0 || !self.nodes[curr].ks.is_no_symbol() {
            s.warn("the compose sequence already exists; skipping line");
            return;
        }

        if production.has_string {
            self.nodes[curr].utf8 = self.utf8.len() as u32;
            self.utf8.extend_from_slice(production.string.as_bytes());
            self.utf8.push(0);
        }
        if production.has_keysym {
            self.nodes[curr].ks = production.keysym;
        }
    }
}

/// One complete sequence of a table: the keysyms on the left-hand side and
/// the results on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry<'a> {
    pub keysyms: Vec<Keysym>,
    pub utf8: Option<&'a str>,
    pub keysym: Keysym,
}

/// Depth-first traversal over all reachable leaves of a table.
pub struct Sequences<'a> {
    table: &'a ComposeTable,
    /// Nodes still to visit, with the depth they sit at.
    pending: Vec<(u32, usize)>,
    path: Vec<Keysym>,
}

impl<'a> Iterator for Sequences<'a> {
    type Item = SequenceEntry<'a>;

    fn next(&mut self) -> Option<SequenceEntry<'a>> {
        while let Some((index, depth)) = self.pending.pop() {
            let node = &self.table.nodes[index as usize];
            self.path.truncate(depth);
            self.path.push(node.keysym);

            if node.next != 0 {
                self.pending.push((node.next, depth));
            }

            if node.successor != 0 {
                self.pending.push((node.successor, depth + 1));
                continue;
            }

            let utf8 = if node.utf8 != 0 {
                Some(self.table.utf8_at(node.utf8))
            } else {
                None
            };
            return Some(SequenceEntry {
                keysyms: self.path.clone(),
                utf8,
                keysym: node.ks,
            });
        }
        None
    }
}
