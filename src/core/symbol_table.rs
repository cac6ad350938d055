// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Symbol table.
//!
//! Symbols are created undefined on first reference or defined on
//! assignment/label definition. A symbol that cannot be evaluated yet
//! stores the id of its defining pending expression, and every pending
//! expression that references a symbol is registered in that symbol's
//! `pending_refs` list so that defining the symbol can re-evaluate its
//! dependents in registration order.

use std::collections::HashMap;

use crate::core::expr::SECT_ABS;
use crate::core::source_pos::SourcePos;

/// Id of a pending expression in the driver's arena.
pub type PendingId = usize;

#[derive(Debug, Default)]
pub struct Symbol {
    pub value: u64,
    pub section: usize,
    pub defined: bool,
    /// Labels may be defined only once; assignments may be repeated.
    pub once_defined: bool,
    /// Every textual occurrence, for end-of-run undefined reports.
    pub occurrences: Vec<SourcePos>,
    /// The expression that will define this symbol, when deferred.
    pub defining_expr: Option<PendingId>,
    /// Pending expressions referencing this symbol, in registration order.
    pub pending_refs: Vec<PendingId>,
}

impl Symbol {
    fn undefined() -> Self {
        Self {
            section: SECT_ABS,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineError {
    Redefined,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    map: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, name: &str) -> Option<&Symbol> {
        self.map.get(name)
    }

    pub fn entry_mut(&mut self, name: &str) -> &mut Symbol {
        self.map.entry(name.to_string()).or_insert_with(Symbol::undefined)
    }

    /// Record a textual occurrence, creating the symbol if needed.
    pub fn add_occurrence(&mut self, name: &str, pos: SourcePos) {
        self.entry_mut(name).occurrences.push(pos);
    }

    /// Register a pending expression under a referenced symbol.
    pub fn add_pending_ref(&mut self, name: &str, id: PendingId) {
        self.entry_mut(name).pending_refs.push(id);
    }

    /// Scrub a pending expression from a symbol's reference list; used when
    /// the expression is destroyed or re-targeted.
    pub fn remove_pending_ref(&mut self, name: &str, id: PendingId) {
        if let Some(sym) = self.map.get_mut(name) {
            sym.pending_refs.retain(|&r| r != id);
        }
    }

    /// Define a symbol with a concrete value. Returns the pending references
    /// that may now be resolvable, in registration order.
    pub fn define(
        &mut self,
        name: &str,
        value: u64,
        section: usize,
        once: bool,
    ) -> Result<Vec<PendingId>, DefineError> {
        let sym = self.entry_mut(name);
        if sym.defined && sym.once_defined {
            return Err(DefineError::Redefined);
        }
        sym.value = value;
        sym.section = section;
        sym.defined = true;
        sym.once_defined = once;
        sym.defining_expr = None;
        Ok(std::mem::take(&mut sym.pending_refs))
    }

    /// Attach a deferred defining expression to a symbol.
    pub fn defer(&mut self, name: &str, id: PendingId) -> Result<(), DefineError> {
        let sym = self.entry_mut(name);
        if sym.defined && sym.once_defined {
            return Err(DefineError::Redefined);
        }
        sym.defined = false;
        sym.defining_expr = Some(id);
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.map.get(name).map(|s| s.defined).unwrap_or(false)
    }

    /// All still-undefined symbols that were referenced somewhere.
    pub fn undefined_symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.map
            .iter()
            .filter(|(_, s)| !s.defined && !s.occurrences.is_empty())
            .map(|(n, s)| (n.as_str(), s))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.map.iter().map(|(n, s)| (n.as_str(), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut table = SymbolTable::new();
        table.define("ten", 10, SECT_ABS, false).unwrap();
        let sym = table.entry("ten").unwrap();
        assert!(sym.defined);
        assert_eq!(sym.value, 10);
    }

    #[test]
    fn label_redefinition_fails() {
        let mut table = SymbolTable::new();
        table.define("start", 0, 0, true).unwrap();
        assert_eq!(
            table.define("start", 4, 0, true),
            Err(DefineError::Redefined)
        );
    }

    #[test]
    fn assignment_may_repeat() {
        let mut table = SymbolTable::new();
        table.define("x", 1, SECT_ABS, false).unwrap();
        table.define("x", 2, SECT_ABS, false).unwrap();
        assert_eq!(table.entry("x").unwrap().value, 2);
    }

    #[test]
    fn define_returns_pending_refs_in_order() {
        let mut table = SymbolTable::new();
        table.add_pending_ref("lbl", 5);
        table.add_pending_ref("lbl", 2);
        table.add_pending_ref("lbl", 9);
        table.remove_pending_ref("lbl", 2);
        let refs = table.define("lbl", 16, 0, true).unwrap();
        assert_eq!(refs, vec![5, 9]);
        assert!(table.entry("lbl").unwrap().pending_refs.is_empty());
    }

    #[test]
    fn undefined_with_occurrences_reported() {
        let mut table = SymbolTable::new();
        table.add_occurrence("ghost", SourcePos::default());
        table.define("real", 1, SECT_ABS, false).unwrap();
        let undefined: Vec<_> = table.undefined_symbols().map(|(n, _)| n).collect();
        assert_eq!(undefined, vec!["ghost"]);
    }
}
