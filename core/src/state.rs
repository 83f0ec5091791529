//! The runtime compose state machine.
//!
//! A `ComposeState` walks a shared [`ComposeTable`] one keysym at a time.
//! The whole state is two node indices: `context`, the node reached by the
//! sequence fed so far (0 when not composing), and `prev_context`, the node
//! before the last feed, which is what lets [`ComposeState::status`] tell
//! "never started" apart from "started and broke off".
//!
//! Feeding allocates nothing and never fails; a keysym that matches no
//! alternative simply drops the walker back to the root.

use std::borrow::Cow;
use std::sync::Arc;

use crate::keysym::Keysym;
use crate::table::ComposeTable;
use crate::ComposeError;

/// The status of a compose state after the most recent feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The last keysym is not part of any sequence.
    Nothing,
    /// Mid-sequence; more keysyms are needed.
    Composing,
    /// A sequence just completed; the results are available.
    Composed,
    /// A sequence was in progress and the last keysym broke it off.
    Cancelled,
}

/// Flags affecting state machine behaviour. No flags are currently
/// defined; the constructor rejects any set bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateFlags(u32);

impl StateFlags {
    pub const NONE: StateFlags = StateFlags(0);

    pub const fn from_bits(bits: u32) -> StateFlags {
        StateFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// A per-consumer walker over a compose table.
///
/// Not thread-safe; wrap it in external synchronisation if shared.
/// Independent states over the same table do not affect each other.
#[derive(Debug, Clone)]
pub struct ComposeState {
    table: Arc<ComposeTable>,
    flags: StateFlags,
    prev_context: u32,
    context: u32,
}

impl ComposeState {
    pub fn new(table: Arc<ComposeTable>, flags: StateFlags) -> Result<ComposeState, ComposeError> {
        if flags.bits() != 0 {
            log::error!("unrecognized state flags: {:#x}", flags.bits());
            return Err(ComposeError::UnknownStateFlags(flags.bits()));
        }

        Ok(ComposeState {
            table,
            flags,
            prev_context: 0,
            context: 0,
        })
    }

    /// The table this state walks.
    pub fn table(&self) -> &Arc<ComposeTable> {
        &self.table
    }

    pub fn flags(&self) -> StateFlags {
        self.flags
    }

    /// Feed one keysym.
    ///
    /// Modifier keysyms are swallowed without touching the state at all, so
    /// holding Shift mid-sequence does not cancel it. Otherwise the walker
    /// descends into the current node's children, or starts over from the
    /// top-level alternatives when the current node has none, and lands on
    /// the sibling matching `keysym`, or on 0 if there is none.
    pub fn feed(&mut self, keysym: Keysym) {
        if keysym.is_modifier() {
            return;
        }

        let nodes = self.table.nodes();

        let mut context = nodes[self.context as usize].successor();
        let mut node = &nodes[context as usize];

        while node.keysym() != keysym && node.next() != 0 {
            context = node.next();
            node = &nodes[context as usize];
        }

        if node.keysym() != keysym {
            context = 0;
        }

        self.prev_context = self.context;
        self.context = context;
    }

    /// Drop back to the initial state.
    pub fn reset(&mut self) {
        self.prev_context = 0;
        self.context = 0;
    }

    pub fn status(&self) -> Status {
        let nodes = self.table.nodes();
        let prev_node = &nodes[self.prev_context as usize];
        let node = &nodes[self.context as usize];

        if self.context == 0 && prev_node.successor() != 0 {
            return Status::Cancelled;
        }

        if self.context == 0 {
            return Status::Nothing;
        }

        if node.successor() != 0 {
            return Status::Composing;
        }

        Status::Composed
    }

    /// The UTF-8 result of the current position.
    ///
    /// Borrowed straight from the table's blob for string leaves; derived
    /// from the replacement keysym for keysym-only leaves. Empty when there
    /// is nothing composed.
    pub fn utf8(&self) -> Cow<'_, str> {
        let node = &self.table.nodes()[self.context as usize];

        if node.utf8_offset() == 0 && !node.replacement().is_no_symbol() {
            return Cow::Owned(node.replacement().to_utf8().unwrap_or_default());
        }

        Cow::Borrowed(self.table.utf8_at(node.utf8_offset()))
    }

    /// Copy the UTF-8 result into `buf`, truncating if it does not fit.
    ///
    /// Returns the full length in bytes; a return value larger than
    /// `buf.len()` means the output was truncated.
    pub fn write_utf8(&self, buf: &mut [u8]) -> usize {
        let utf8 = self.utf8();
        let bytes = utf8.as_bytes();
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        bytes.len()
    }

    /// The replacement keysym of the current position, or `NO_SYMBOL`.
    pub fn one_sym(&self) -> Keysym {
        self.table.nodes()[self.context as usize].replacement()
    }
}
