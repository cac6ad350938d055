// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Diagnostics: severities, messages with source positions, and the
//! reporter that renders and counts them.

use std::fmt;
use std::io::Write;

use serde::Serialize;

use crate::core::source_pos::SourcePos;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message attributed to a source position.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub pos: SourcePos,
    pub message: String,
}

#[derive(Serialize)]
struct DiagnosticJson<'a> {
    severity: &'a str,
    file: &'a str,
    line: u64,
    column: usize,
    message: &'a str,
}

impl Diagnostic {
    pub fn new(severity: Severity, pos: SourcePos, message: impl Into<String>) -> Self {
        Self {
            severity,
            pos,
            message: message.into(),
        }
    }

    /// Render as `file:line:col: level: message`, preceded by the include
    /// and macro-substitution chains, caller first.
    pub fn format(&self) -> String {
        let mut out = String::new();
        // include chain of the file the message lies in
        if let Some(file) = &self.pos.file {
            let mut chain = Vec::new();
            let mut cur = file.parent.as_ref();
            let mut line = file.include_line;
            while let Some(node) = cur {
                chain.push((node.path.clone(), line));
                line = node.include_line;
                cur = node.parent.as_ref();
            }
            for (path, line) in chain.into_iter().rev() {
                out.push_str(&format!("In file included from {}:{}:\n", path, line));
            }
        }
        // macro substitution chain, outermost caller first
        let mut macros = Vec::new();
        let mut cur = self.pos.macro_subst.as_ref();
        while let Some(node) = cur {
            let file = node
                .file
                .as_ref()
                .map(|f| f.path.as_str())
                .unwrap_or("<stdin>");
            macros.push(format!(
                "In macro substituted from {}:{}:\n",
                file, node.line
            ));
            cur = node.parent.as_ref();
        }
        for entry in macros.into_iter().rev() {
            out.push_str(&entry);
        }
        out.push_str(&format!(
            "{}:{}:{}: {}: {}",
            self.pos.file_path(),
            self.pos.line,
            self.pos.col,
            self.severity,
            self.message
        ));
        out
    }

    pub fn to_json(&self) -> String {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        serde_json::to_string(&DiagnosticJson {
            severity,
            file: self.pos.file_path(),
            line: self.pos.line,
            column: self.pos.col,
            message: &self.message,
        })
        .expect("diagnostic serialization cannot fail")
    }
}

/// Output rendering selected for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Collects diagnostics for one assembler or disassembler run.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    warnings: usize,
    errors: usize,
    pub no_warnings: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(&mut self, pos: SourcePos, message: impl Into<String>) {
        if self.no_warnings {
            return;
        }
        self.warnings += 1;
        self.diagnostics
            .push(Diagnostic::new(Severity::Warning, pos, message));
    }

    pub fn error(&mut self, pos: SourcePos, message: impl Into<String>) {
        self.errors += 1;
        self.diagnostics
            .push(Diagnostic::new(Severity::Error, pos, message));
    }

    pub fn has_errors(&self) -> bool {
        self.errors != 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn write_all<W: Write>(&self, out: &mut W, format: ReportFormat) -> std::io::Result<()> {
        for diag in &self.diagnostics {
            match format {
                ReportFormat::Text => writeln!(out, "{}", diag.format())?,
                ReportFormat::Json => writeln!(out, "{}", diag.to_json())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source_pos::{FileNode, LineCol, MacroNode};

    fn pos_in(path: &str, line: u64, col: usize) -> SourcePos {
        SourcePos::new(Some(FileNode::root(path)), None, LineCol { line, col })
    }

    #[test]
    fn plain_format() {
        let diag = Diagnostic::new(Severity::Error, pos_in("k.s", 12, 7), "unknown instruction");
        assert_eq!(diag.format(), "k.s:12:7: error: unknown instruction");
    }

    #[test]
    fn include_chain_renders_caller_lines() {
        let root = FileNode::root("main.s");
        let inc = FileNode::included(root, 4, "util.s");
        let pos = SourcePos::new(Some(inc), None, LineCol { line: 2, col: 1 });
        let diag = Diagnostic::new(Severity::Warning, pos, "value out of range");
        assert_eq!(
            diag.format(),
            "In file included from main.s:4:\nutil.s:2:1: warning: value out of range"
        );
    }

    #[test]
    fn macro_chain_renders_caller_first() {
        let file = FileNode::root("m.s");
        let outer = MacroNode::new(None, Some(file.clone()), 10);
        let inner = MacroNode::new(Some(outer), Some(file.clone()), 30);
        let pos = SourcePos::new(Some(file), Some(inner), LineCol { line: 3, col: 9 });
        let diag = Diagnostic::new(Severity::Error, pos, "missing operand");
        let text = diag.format();
        let first = text.find("m.s:10").expect("outer caller present");
        let second = text.find("m.s:30").expect("inner caller present");
        assert!(first < second);
        assert!(text.ends_with("m.s:3:9: error: missing operand"));
    }

    #[test]
    fn reporter_counts_and_exit_state() {
        let mut rep = Reporter::new();
        rep.warning(pos_in("a.s", 1, 1), "w");
        assert!(!rep.has_errors());
        rep.error(pos_in("a.s", 2, 1), "e");
        assert!(rep.has_errors());
        assert_eq!(rep.warning_count(), 1);
        assert_eq!(rep.error_count(), 1);
    }

    #[test]
    fn json_form_has_fields() {
        let diag = Diagnostic::new(Severity::Warning, pos_in("a.s", 5, 2), "late");
        let value: serde_json::Value = serde_json::from_str(&diag.to_json()).unwrap();
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["file"], "a.s");
        assert_eq!(value["line"], 5);
        assert_eq!(value["column"], 2);
        assert_eq!(value["message"], "late");
    }
}
