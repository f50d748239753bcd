//! Address → code identity, built incrementally from the log.
//!
//! Each address keeps a small history of entries ordered by the log
//! position at which they became valid. A later `code-creation` at the
//! same address shadows the earlier one from its position onward rather
//! than overwriting it, so a lookup at an earlier position still sees the
//! earlier name.

use crate::utils::config::UNKNOWN_SYMBOL;
use log::trace;
use std::collections::BTreeMap;

/// One version of the code object living at an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub address: u64,
    pub size: u64,
    pub name: String,
    /// Advisory code kind (`LoadIC`, `LazyCompile`, ...)
    pub tag: String,
    /// Log position (line index) from which this entry applies
    pub valid_from: usize,
    /// Tombstone left by `code-delete` / the source side of `code-move`
    pub deleted: bool,
}

impl SymbolEntry {
    fn covers(&self, pc: u64) -> bool {
        pc == self.address || (pc > self.address && pc - self.address < self.size)
    }
}

/// Symbol table for one parse
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: BTreeMap<u64, Vec<SymbolEntry>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a code object at `address`, valid from `position` onward
    pub fn upsert(
        &mut self,
        address: u64,
        size: u64,
        tag: impl Into<String>,
        name: impl Into<String>,
        position: usize,
    ) {
        let entry = SymbolEntry {
            address,
            size,
            name: name.into(),
            tag: tag.into(),
            valid_from: position,
            deleted: false,
        };
        trace!("symbol {:#x} -> {} @{}", address, entry.name, position);
        self.push(entry);
    }

    /// Tombstone the code object at `address`
    ///
    /// Returns false if nothing live was known there.
    pub fn delete(&mut self, address: u64, position: usize) -> bool {
        let Some(current) = self.entry_at(address, position).cloned() else {
            return false;
        };
        self.push(SymbolEntry {
            valid_from: position,
            deleted: true,
            ..current
        });
        true
    }

    /// Move the code object at `from` to `to`
    ///
    /// Returns false if nothing live was known at `from`.
    pub fn relocate(&mut self, from: u64, to: u64, position: usize) -> bool {
        let Some(current) = self.entry_at(from, position).cloned() else {
            return false;
        };
        self.push(SymbolEntry {
            address: to,
            valid_from: position,
            ..current.clone()
        });
        self.push(SymbolEntry {
            valid_from: position,
            deleted: true,
            ..current
        });
        true
    }

    /// Find the code object containing `pc` as of `position`
    ///
    /// An exact address match wins; otherwise the nearest lower code
    /// object is used when its `[address, address + size)` covers `pc`.
    pub fn resolve(&self, pc: u64, position: usize) -> Option<&SymbolEntry> {
        if let Some(entry) = self.entry_at(pc, position) {
            return Some(entry);
        }

        let (&start, _) = self.entries.range(..pc).next_back()?;
        self.entry_at(start, position)
            .filter(|entry| entry.covers(pc))
    }

    /// Resolved name for `pc`, or the unknown sentinel
    pub fn resolve_name(&self, pc: u64, position: usize) -> &str {
        self.resolve(pc, position)
            .map(|entry| entry.name.as_str())
            .unwrap_or(UNKNOWN_SYMBOL)
    }

    /// Every version ever recorded at `address`, oldest first
    pub fn history(&self, address: u64) -> &[SymbolEntry] {
        self.entries
            .get(&address)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct addresses seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live entry at exactly `address` as of `position`
    fn entry_at(&self, address: u64, position: usize) -> Option<&SymbolEntry> {
        let history = self.entries.get(&address)?;
        let idx = history.partition_point(|e| e.valid_from <= position);
        history
            .get(idx.checked_sub(1)?)
            .filter(|entry| !entry.deleted)
    }

    fn push(&mut self, entry: SymbolEntry) {
        let history = self.entries.entry(entry.address).or_default();
        // Entries at the same position keep insertion order
        let idx = history.partition_point(|e| e.valid_from <= entry.valid_from);
        history.insert(idx, entry);
    }
}
