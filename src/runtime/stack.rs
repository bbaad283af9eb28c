//! Ordered record of open dialogs
//!
//! Insertion order is z-order: the last entry is the topmost dialog. Only the
//! lifecycle in this crate pushes and removes entries; everything else gets
//! read-only queries.

use crate::dialog::DialogHandle;

/// Stack of open dialogs, oldest first
#[derive(Debug, Default, Clone)]
pub struct DialogStack {
    entries: Vec<DialogHandle>,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a newly opened dialog as the new topmost entry
    pub(crate) fn push(&mut self, handle: DialogHandle) {
        debug_assert!(!self.contains(handle), "dialog {} is already on the stack", handle);
        self.entries.push(handle);
    }

    /// Remove the entry for `handle`, returning whether one was found
    pub(crate) fn remove(&mut self, handle: DialogHandle) -> bool {
        match self.position(handle) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// The topmost dialog
    pub fn topmost(&self) -> Option<DialogHandle> {
        self.entries.last().copied()
    }

    /// The topmost dialog satisfying `predicate`
    pub fn topmost_where<P>(&self, mut predicate: P) -> Option<DialogHandle>
    where
        P: FnMut(DialogHandle) -> bool,
    {
        self.entries.iter().rev().copied().find(|&handle| predicate(handle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, handle: DialogHandle) -> bool {
        self.entries.contains(&handle)
    }

    /// Index of `handle`, 0 being the oldest entry
    pub fn position(&self, handle: DialogHandle) -> Option<usize> {
        self.entries.iter().position(|&entry| entry == handle)
    }

    /// Entries opened after `handle`; `None` if `handle` is not on the stack
    pub fn above(&self, handle: DialogHandle) -> Option<&[DialogHandle]> {
        self.position(handle).map(|index| &self.entries[index + 1..])
    }

    /// Entries in z-order, bottom first
    pub fn entries(&self) -> &[DialogHandle] {
        &self.entries
    }
}
