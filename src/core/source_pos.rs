// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Source position tracking.
//!
//! A position identifies a character by file chain, macro-substitution chain,
//! line, and column. Chains are persistent linked lists of reference-counted
//! nodes so that the many positions produced during assembly share their
//! suffixes instead of cloning whole include stacks.

use std::rc::Rc;

/// A node of the include chain: one open file and where it was included from.
#[derive(Debug)]
pub struct FileNode {
    /// Including file, `None` for the root input.
    pub parent: Option<Rc<FileNode>>,
    /// Line of the `.include` in the parent (0 for the root input).
    pub include_line: u64,
    pub path: String,
}

impl FileNode {
    pub fn root(path: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            parent: None,
            include_line: 0,
            path: path.into(),
        })
    }

    pub fn included(parent: Rc<FileNode>, include_line: u64, path: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            parent: Some(parent),
            include_line,
            path: path.into(),
        })
    }
}

/// A node of the macro-substitution chain: one active macro expansion.
#[derive(Debug)]
pub struct MacroNode {
    /// Enclosing substitution, `None` when invoked from file scope.
    pub parent: Option<Rc<MacroNode>>,
    /// File in which the invocation appeared.
    pub file: Option<Rc<FileNode>>,
    /// Line of the invocation.
    pub line: u64,
}

impl MacroNode {
    pub fn new(
        parent: Option<Rc<MacroNode>>,
        file: Option<Rc<FileNode>>,
        line: u64,
    ) -> Rc<Self> {
        Rc::new(Self { parent, file, line })
    }
}

/// A line/column pair, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCol {
    pub line: u64,
    pub col: usize,
}

/// Immutable, shareable source position.
#[derive(Debug, Clone, Default)]
pub struct SourcePos {
    pub file: Option<Rc<FileNode>>,
    pub macro_subst: Option<Rc<MacroNode>>,
    pub line: u64,
    pub col: usize,
}

impl SourcePos {
    pub fn new(
        file: Option<Rc<FileNode>>,
        macro_subst: Option<Rc<MacroNode>>,
        lc: LineCol,
    ) -> Self {
        Self {
            file,
            macro_subst,
            line: lc.line,
            col: lc.col,
        }
    }

    pub fn file_path(&self) -> &str {
        self.file.as_ref().map(|f| f.path.as_str()).unwrap_or("<stdin>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_chain_shares_parents() {
        let root = FileNode::root("a.s");
        let inc1 = FileNode::included(root.clone(), 10, "b.s");
        let inc2 = FileNode::included(inc1.clone(), 3, "c.s");
        assert_eq!(inc2.parent.as_ref().unwrap().path, "b.s");
        assert_eq!(
            inc2.parent.as_ref().unwrap().parent.as_ref().unwrap().path,
            "a.s"
        );
        // both inclusions share the same root node
        assert!(Rc::ptr_eq(
            inc1.parent.as_ref().unwrap(),
            inc2.parent.as_ref().unwrap().parent.as_ref().unwrap()
        ));
    }

    #[test]
    fn source_pos_default_path() {
        let pos = SourcePos::default();
        assert_eq!(pos.file_path(), "<stdin>");
    }
}
