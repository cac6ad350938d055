// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The assembler driver.
//!
//! Reads cooked lines from the input filter stack, recognises labels,
//! assignments, directives and instructions, owns the symbol/section
//! tables and the pending-expression arena, and hands instruction lines to
//! the GCN encoder.

pub mod cli;
mod directives;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor as IoCursor};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use crate::core::cursor::LineCursor;
use crate::core::expr::{
    EvalContext, EvalError, Expression, SymbolLookup, SECT_ABS,
};
use crate::core::input_filter::{
    BodyLine, CookedLine, FilterError, LineSource, MacroFilter, RepeatFilter, StreamFilter,
};
use crate::core::macro_processor::MacroMap;
use crate::core::report::Reporter;
use crate::core::section::{CodeFlowEntry, CodeFlowKind, Section, SectionKind};
use crate::core::source_pos::{FileNode, LineCol, MacroNode, SourcePos};
use crate::core::symbol_table::{DefineError, PendingId, SymbolTable};
use crate::gcn::arch::Arch;
use crate::gcn::encoder;
use crate::gcn::regs::RegVar;
use crate::gcn::reloc::{self, RelocKind};
use crate::gcn::usage::{RegUsage, UsageCollector};
use crate::gcn::{AsmContext, RegPool};

const MAX_INCLUSION_DEPTH: usize = 500;
const MAX_MACRO_DEPTH: usize = 1000;

/// Assembler configuration.
#[derive(Debug, Clone)]
pub struct AsmOptions {
    pub arch: Arch,
    pub gnu_as_compat: bool,
    pub no_warnings: bool,
    pub include_dirs: Vec<PathBuf>,
    pub defsyms: Vec<(String, u64)>,
}

impl Default for AsmOptions {
    fn default() -> Self {
        Self {
            arch: Arch::Gcn10,
            gnu_as_compat: false,
            no_warnings: false,
            include_dirs: Vec::new(),
            defsyms: Vec::new(),
        }
    }
}

enum FilterKind {
    File,
    Macro,
    Repeat,
}

struct FilterEntry {
    source: Box<dyn LineSource>,
    kind: FilterKind,
    file: Option<Rc<FileNode>>,
    macro_subst: Option<Rc<MacroNode>>,
}

/// Where a deferred expression lands when it resolves.
enum PendTarget {
    Symbol(String),
    Reloc {
        section: usize,
        kind: RelocKind,
        offset: usize,
    },
}

struct PendingExpr {
    expr: Expression,
    target: PendTarget,
    pos: SourcePos,
}

/// A macro or repeat body being captured.
struct Capture {
    kind: CaptureKind,
    body: Vec<BodyLine>,
    depth: usize,
}

enum CaptureKind {
    Macro {
        name: String,
        params: Vec<crate::core::macro_processor::MacroParam>,
        pos: SourcePos,
        content_line: u64,
    },
    Repeat {
        count: u64,
    },
}

pub(crate) struct Cond {
    /// This branch is being assembled.
    pub(crate) active: bool,
    /// Some earlier branch of this clause was taken.
    pub(crate) taken: bool,
    /// The enclosing context was active.
    pub(crate) parent_active: bool,
}

/// The register-usage stream for one instruction.
#[derive(Debug)]
pub struct InstrUsage {
    pub offset: usize,
    pub records: Vec<RegUsage>,
}

pub struct Assembler {
    options: AsmOptions,
    arch: Arch,
    pub reporter: Reporter,
    sections: Vec<Section>,
    current_section: usize,
    symbols: SymbolTable,
    macros: MacroMap,
    pending: Vec<Option<PendingExpr>>,
    filters: Vec<FilterEntry>,
    inclusion_depth: usize,
    macro_depth: usize,
    cond_stack: Vec<Cond>,
    capture: Option<Capture>,
    usage: UsageCollector,
    pool: RegPool,
    regvars: HashMap<String, Rc<RegVar>>,
    usage_stream: Vec<InstrUsage>,
    /// Position context of the statement being assembled.
    stmt_pos: LineCol,
}

impl Assembler {
    pub fn new(options: AsmOptions) -> Self {
        let arch = options.arch;
        let mut reporter = Reporter::new();
        reporter.no_warnings = options.no_warnings;
        let mut symbols = SymbolTable::new();
        for (name, value) in &options.defsyms {
            let _ = symbols.define(name, *value, SECT_ABS, false);
        }
        Self {
            options,
            arch,
            reporter,
            sections: vec![Section::new(0, 0, SectionKind::GalliumCode)],
            current_section: 0,
            symbols,
            macros: MacroMap::new(),
            pending: Vec::new(),
            filters: Vec::new(),
            inclusion_depth: 0,
            macro_depth: 0,
            cond_stack: Vec::new(),
            capture: None,
            usage: UsageCollector::new(),
            pool: RegPool::default(),
            regvars: HashMap::new(),
            usage_stream: Vec::new(),
            stmt_pos: LineCol { line: 1, col: 1 },
        }
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn set_arch(&mut self, arch: Arch) {
        self.arch = arch;
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn pool(&self) -> &RegPool {
        &self.pool
    }

    pub fn usage_stream(&self) -> &[InstrUsage] {
        &self.usage_stream
    }

    pub fn code(&self) -> &[u8] {
        &self.sections[0].content
    }

    pub fn code_flow(&self) -> &[CodeFlowEntry] {
        &self.sections[0].code_flow
    }

    fn here(&self, at: LineCol) -> SourcePos {
        let (file, macro_subst) = match self.filters.last() {
            Some(entry) => (entry.file.clone(), entry.macro_subst.clone()),
            None => (None, None),
        };
        SourcePos::new(file, macro_subst, at)
    }

    pub(crate) fn report_error(&mut self, at: LineCol, message: &str) {
        let pos = self.here(at);
        self.reporter.error(pos, message);
    }

    pub(crate) fn report_warning(&mut self, at: LineCol, message: &str) {
        let pos = self.here(at);
        self.reporter.warning(pos, message);
    }

    /// Assemble a file from disk.
    pub fn assemble_file(&mut self, path: &Path) -> io::Result<()> {
        let file = File::open(path)?;
        let node = FileNode::root(path.display().to_string());
        self.filters.push(FilterEntry {
            source: Box::new(StreamFilter::new(Box::new(BufReader::new(file)))),
            kind: FilterKind::File,
            file: Some(node),
            macro_subst: None,
        });
        self.run();
        Ok(())
    }

    /// Assemble in-memory source text under the given stream name.
    pub fn assemble_source(&mut self, name: &str, text: &str) {
        let node = FileNode::root(name);
        self.filters.push(FilterEntry {
            source: Box::new(StreamFilter::new(Box::new(IoCursor::new(
                text.as_bytes().to_vec(),
            )))),
            kind: FilterKind::File,
            file: Some(node),
            macro_subst: None,
        });
        self.run();
    }

    fn run(&mut self) {
        while let Some(cooked) = self.next_line() {
            self.process_line(&cooked);
        }
        self.finish();
    }

    fn next_line(&mut self) -> Option<CookedLine> {
        loop {
            let entry = self.filters.last_mut()?;
            let mut errors: Vec<FilterError> = Vec::new();
            match entry.source.read_line(&mut errors) {
                Ok(Some(line)) => {
                    for err in errors {
                        self.report_error(err.at, err.message);
                    }
                    return Some(line);
                }
                Ok(None) => {
                    let entry = self.filters.pop().expect("filter present");
                    match entry.kind {
                        FilterKind::File => {
                            if self.inclusion_depth > 0 {
                                self.inclusion_depth -= 1;
                            }
                        }
                        FilterKind::Macro => {
                            if self.macro_depth > 0 {
                                self.macro_depth -= 1;
                            }
                        }
                        FilterKind::Repeat => {}
                    }
                }
                Err(err) => {
                    let at = LineCol { line: 0, col: 0 };
                    self.report_error(at, &format!("Input error: {}", err));
                    self.filters.pop();
                }
            }
        }
    }

    fn cond_active(&self) -> bool {
        self.cond_stack
            .last()
            .map(|c| c.active && c.parent_active)
            .unwrap_or(true)
    }

    fn process_line(&mut self, cooked: &CookedLine) {
        // capture mode swallows lines until the matching end directive
        if self.capture.is_some() {
            if self.capture_line(cooked) {
                return;
            }
        }
        let mut cur = LineCursor::new(&cooked.text, &cooked.translations);
        if cur.at_end() {
            return;
        }
        self.stmt_pos = cur.line_col();
        if !self.cond_active() {
            self.process_skipped(&mut cur);
            return;
        }
        // labels, then at most one statement
        loop {
            cur.skip_spaces();
            let mark = cur.pos;
            let Some(name) = cur.parse_name() else { break };
            if cur.peek() == Some(b':') {
                cur.bump();
                let at = cur.line_col_at(mark);
                let name = name.to_string();
                self.define_label(&name, at);
                continue;
            }
            // assignment?
            if cur.try_char(b'=') && cur.peek() != Some(b'=') {
                let at = cur.line_col_at(mark);
                let name = name.to_string();
                self.assign_symbol(&name, &mut cur, at);
                return;
            }
            cur.pos = mark;
            if let Some(rest) = name.strip_prefix('.') {
                let rest = rest.to_string();
                cur.advance(name.len());
                let at = cur.line_col_at(mark);
                directives::dispatch(self, &rest, &mut cur, at);
                return;
            }
            let mnemonic = name.to_string();
            cur.advance(mnemonic.len());
            let at = cur.line_col_at(mark);
            if self.macros.contains_key(&mnemonic) {
                self.apply_macro(&mnemonic, &mut cur, at);
                return;
            }
            // instruction
            let offset = self.out_pos();
            self.stmt_pos = at;
            if encoder::assemble(self, &mnemonic, at, &mut cur) {
                let records = self.usage.take();
                if !records.is_empty() {
                    self.usage_stream.push(InstrUsage { offset, records });
                }
            }
            return;
        }
        if !cur.at_end() {
            let at = cur.line_col();
            self.report_error(at, "Expected label, directive or instruction");
        }
    }

    /// In a skipped conditional region only the conditional directives are
    /// recognised.
    fn process_skipped(&mut self, cur: &mut LineCursor<'_>) {
        cur.skip_spaces();
        let mark = cur.pos;
        let Some(name) = cur.parse_name() else { return };
        let Some(directive) = name.strip_prefix('.') else {
            return;
        };
        let directive = directive.to_ascii_lowercase();
        let at = cur.line_col_at(mark);
        match directive.as_str() {
            "if" | "ifdef" | "ifndef" => {
                self.cond_stack.push(Cond {
                    active: false,
                    taken: true,
                    parent_active: false,
                });
            }
            "elseif" | "else" | "endif" => {
                let directive = directive.clone();
                directives::dispatch(self, &directive, cur, at);
            }
            _ => {}
        }
    }

    fn capture_line(&mut self, cooked: &CookedLine) -> bool {
        let mut cur = LineCursor::new(&cooked.text, &cooked.translations);
        cur.skip_spaces();
        let name = cur.parse_name().map(|n| n.to_ascii_lowercase());
        let (is_macro, depth) = {
            let capture = self.capture.as_ref().expect("in capture mode");
            (
                matches!(capture.kind, CaptureKind::Macro { .. }),
                capture.depth,
            )
        };
        match name.as_deref() {
            Some(".macro") | Some(".rept") => {
                self.capture.as_mut().expect("in capture mode").depth += 1;
            }
            Some(".endm") | Some(".endmacro") => {
                if depth == 0 && is_macro {
                    self.end_macro_capture();
                    return true;
                }
                if depth > 0 {
                    self.capture.as_mut().expect("in capture mode").depth -= 1;
                }
            }
            Some(".endr") => {
                if depth == 0 && !is_macro {
                    self.end_repeat_capture();
                    return true;
                }
                if depth > 0 {
                    self.capture.as_mut().expect("in capture mode").depth -= 1;
                }
            }
            _ => {}
        }
        let line_no = cooked.translations.first().map(|t| t.line).unwrap_or(1);
        self.capture
            .as_mut()
            .expect("in capture mode")
            .body
            .push(BodyLine {
                text: cooked.text.clone(),
                line: line_no,
            });
        true
    }

    fn end_macro_capture(&mut self) {
        let capture = self.capture.take().expect("macro capture");
        let CaptureKind::Macro {
            name,
            params,
            pos,
            content_line,
        } = capture.kind
        else {
            return;
        };
        self.macros.insert(
            name,
            crate::core::macro_processor::MacroDef {
                params,
                body: Rc::new(capture.body),
                pos,
                content_line,
            },
        );
    }

    fn end_repeat_capture(&mut self) {
        let capture = self.capture.take().expect("repeat capture");
        let CaptureKind::Repeat { count } = capture.kind else {
            return;
        };
        let (file, macro_subst) = match self.filters.last() {
            Some(entry) => (entry.file.clone(), entry.macro_subst.clone()),
            None => (None, None),
        };
        self.filters.push(FilterEntry {
            source: Box::new(RepeatFilter::new(Rc::new(capture.body), count)),
            kind: FilterKind::Repeat,
            file,
            macro_subst,
        });
    }

    pub(crate) fn begin_macro(
        &mut self,
        name: String,
        params: Vec<crate::core::macro_processor::MacroParam>,
        at: LineCol,
    ) {
        let pos = self.here(at);
        let content_line = at.line + 1;
        self.capture = Some(Capture {
            kind: CaptureKind::Macro {
                name,
                params,
                pos,
                content_line,
            },
            body: Vec::new(),
            depth: 0,
        });
    }

    pub(crate) fn begin_repeat(&mut self, count: u64) {
        self.capture = Some(Capture {
            kind: CaptureKind::Repeat { count },
            body: Vec::new(),
            depth: 0,
        });
    }

    fn apply_macro(&mut self, name: &str, cur: &mut LineCursor<'_>, at: LineCol) {
        if self.macro_depth >= MAX_MACRO_DEPTH {
            self.report_error(at, "Macro substitution depth limit reached");
            return;
        }
        let def = self.macros.get(name).expect("macro exists").clone();
        let args = match crate::core::macro_processor::bind_macro_args(&def, cur) {
            Ok(args) => args,
            Err(err) => {
                let at = cur.line_col_at(err.at);
                self.report_error(at, &err.message);
                return;
            }
        };
        let (file, parent) = match self.filters.last() {
            Some(entry) => (entry.file.clone(), entry.macro_subst.clone()),
            None => (None, None),
        };
        let node = MacroNode::new(parent, file, at.line);
        self.macro_depth += 1;
        self.filters.push(FilterEntry {
            source: Box::new(MacroFilter::new(def.body.clone(), args)),
            kind: FilterKind::Macro,
            file: def.pos.file.clone(),
            macro_subst: Some(node),
        });
    }

    pub(crate) fn include_file(&mut self, path: &str, at: LineCol) {
        if self.inclusion_depth >= MAX_INCLUSION_DEPTH {
            self.report_error(at, "Inclusion depth limit reached");
            return;
        }
        let mut resolved = PathBuf::from(path);
        if !resolved.exists() {
            for dir in &self.options.include_dirs {
                let candidate = dir.join(path);
                if candidate.exists() {
                    resolved = candidate;
                    break;
                }
            }
        }
        let file = match File::open(&resolved) {
            Ok(f) => f,
            Err(err) => {
                self.report_error(at, &format!("Cannot open file '{}': {}", path, err));
                return;
            }
        };
        let parent = self.filters.last().and_then(|e| e.file.clone());
        let node = match parent {
            Some(parent) => FileNode::included(parent, at.line, resolved.display().to_string()),
            None => FileNode::root(resolved.display().to_string()),
        };
        self.inclusion_depth += 1;
        self.filters.push(FilterEntry {
            source: Box::new(StreamFilter::new(Box::new(BufReader::new(file)))),
            kind: FilterKind::File,
            file: Some(node),
            macro_subst: None,
        });
    }

    fn define_label(&mut self, name: &str, at: LineCol) {
        let value = self.out_pos() as u64;
        let section = self.current_section;
        let pos = self.here(at);
        self.symbols.add_occurrence(name, pos);
        self.define_symbol(name, value, section, true, at);
    }

    pub(crate) fn assign_symbol(&mut self, name: &str, cur: &mut LineCursor<'_>, at: LineCol) {
        let Some(expr) = self.parse_expression(cur) else {
            return;
        };
        if !cur.at_end() {
            let at = cur.line_col();
            self.report_error(at, "Garbage at end of line");
            return;
        }
        match self.eval(&expr) {
            Ok(Some((value, section))) => {
                self.define_symbol(name, value, section, false, at);
            }
            Ok(None) => {
                let id = self.add_pending(expr, PendTarget::Symbol(name.to_string()), at);
                if self.symbols.defer(name, id).is_err() {
                    self.report_error(at, &format!("Symbol '{}' is already defined", name));
                }
            }
            Err(()) => {}
        }
    }

    fn define_symbol(&mut self, name: &str, value: u64, section: usize, once: bool, at: LineCol) {
        match self.symbols.define(name, value, section, once) {
            Ok(refs) => {
                debug!("symbol '{}' = {:#x} resolves {} pending", name, value, refs.len());
                self.drain_pending(refs);
            }
            Err(DefineError::Redefined) => {
                self.report_error(at, &format!("Symbol '{}' is already defined", name));
            }
        }
    }

    fn add_pending(&mut self, expr: Expression, target: PendTarget, at: LineCol) -> PendingId {
        let id = self.pending.len();
        for name in expr.symbol_refs() {
            if !self.symbols.is_defined(name) && name != "." {
                self.symbols.add_pending_ref(name, id);
            }
        }
        let pos = self.here(at);
        self.pending.push(Some(PendingExpr { expr, target, pos }));
        id
    }

    /// Re-evaluate newly unblocked pending expressions, resolving targets
    /// in registration order; symbol targets cascade through a worklist.
    fn drain_pending(&mut self, refs: Vec<PendingId>) {
        let mut work = refs;
        while !work.is_empty() {
            let mut next = Vec::new();
            for id in work {
                let Some(pend) = self.pending[id].take() else {
                    continue;
                };
                match self.eval_pending(&pend.expr) {
                    Ok(Some((value, section))) => {
                        // scrub remaining registrations of this expression
                        for name in pend.expr.symbol_refs() {
                            self.symbols.remove_pending_ref(name, id);
                        }
                        match pend.target {
                            PendTarget::Symbol(name) => {
                                match self.symbols.define(&name, value, section, false) {
                                    Ok(refs) => next.extend(refs),
                                    Err(DefineError::Redefined) => {
                                        let pos = pend.pos.clone();
                                        self.reporter.error(
                                            pos,
                                            format!("Symbol '{}' is already defined", name),
                                        );
                                    }
                                }
                            }
                            PendTarget::Reloc {
                                section: sect_id,
                                kind,
                                offset,
                            } => {
                                self.apply_reloc(sect_id, kind, offset, value, section, &pend.pos);
                            }
                        }
                    }
                    Ok(None) => {
                        // still blocked on another symbol
                        self.pending[id] = Some(pend);
                    }
                    Err(()) => {
                        for name in pend.expr.symbol_refs() {
                            self.symbols.remove_pending_ref(name, id);
                        }
                    }
                }
            }
            work = next;
        }
    }

    fn apply_reloc(
        &mut self,
        section_id: usize,
        kind: RelocKind,
        offset: usize,
        value: u64,
        value_section: usize,
        pos: &SourcePos,
    ) {
        let reporter = &mut self.reporter;
        let section = &mut self.sections[section_id];
        let mut report = |is_err: bool, pos: SourcePos, msg: String| {
            if is_err {
                reporter.error(pos, msg);
            } else {
                reporter.warning(pos, msg);
            }
        };
        let outcome = reloc::patch(
            &mut section.content,
            offset,
            kind,
            value,
            value_section,
            section_id,
            pos,
            &mut report,
        );
        if let Some((from, to, flow)) = outcome.code_flow {
            section.add_code_flow(CodeFlowEntry {
                offset: from,
                target: to,
                kind: flow,
            });
        }
    }

    /// Like [`AsmContext::eval`] but without recording anything.
    fn eval_pending(&mut self, expr: &Expression) -> Result<Option<(u64, usize)>, ()> {
        let mut ctx = EvalAdapter {
            symbols: &self.symbols,
            reporter: &mut self.reporter,
            file: self.filters.last().and_then(|e| e.file.clone()),
            macro_subst: self.filters.last().and_then(|e| e.macro_subst.clone()),
            dot: (
                self.sections[self.current_section].out_pos() as u64,
                self.current_section,
            ),
        };
        match expr.evaluate(&mut ctx) {
            Ok(pair) => Ok(Some(pair)),
            Err(EvalError::Unresolved) => Ok(None),
            Err(EvalError::Failed) => Err(()),
        }
    }

    /// Fill with the ISA's alignment pattern: zero bytes up to word
    /// alignment, then `s_nop` words.
    pub(crate) fn fill_code(&mut self, size: usize) {
        let section = &mut self.sections[self.current_section];
        let mut remaining = size;
        if section.kind.is_code() {
            let misalign = (4 - (section.out_pos() & 3)) & 3;
            let zeros = misalign.min(remaining);
            section.emit(&vec![0u8; zeros]);
            remaining -= zeros;
            while remaining >= 4 {
                section.emit_words(&[0xbf80_0000]);
                remaining -= 4;
            }
        }
        section.emit(&vec![0u8; remaining]);
    }

    pub(crate) fn define_regvar(&mut self, var: RegVar, at: LineCol) {
        if self.regvars.contains_key(&var.name) {
            self.report_error(at, &format!("Register variable '{}' is already defined", var.name));
            return;
        }
        self.regvars.insert(var.name.clone(), Rc::new(var));
    }

    pub(crate) fn cond_stack_mut(&mut self) -> &mut Vec<Cond> {
        &mut self.cond_stack
    }

    /// End-of-assembly checks: every remaining undefined symbol reports one
    /// error per occurrence.
    fn finish(&mut self) {
        let mut reports = Vec::new();
        for (name, sym) in self.symbols.undefined_symbols() {
            for occ in &sym.occurrences {
                reports.push((occ.clone(), format!("Undefined symbol '{}'", name)));
            }
        }
        for (pos, message) in reports {
            self.reporter.error(pos, message);
        }
        if !self.cond_stack.is_empty() {
            let pos = self.here(self.stmt_pos);
            self.reporter.error(pos, "Unterminated '.if' clause".to_string());
            self.cond_stack.clear();
        }
        if self.capture.is_some() {
            let pos = self.here(self.stmt_pos);
            self.reporter
                .error(pos, "Unterminated macro or repetition block".to_string());
            self.capture = None;
        }
    }
}

struct EvalAdapter<'a> {
    symbols: &'a SymbolTable,
    reporter: &'a mut Reporter,
    file: Option<Rc<FileNode>>,
    macro_subst: Option<Rc<MacroNode>>,
    dot: (u64, usize),
}

impl EvalContext for EvalAdapter<'_> {
    fn lookup(&self, name: &str) -> SymbolLookup {
        if name == "." {
            return SymbolLookup::Value {
                value: self.dot.0,
                section: self.dot.1,
            };
        }
        match self.symbols.entry(name) {
            Some(sym) if sym.defined => SymbolLookup::Value {
                value: sym.value,
                section: sym.section,
            },
            _ => SymbolLookup::Undefined,
        }
    }

    fn warn(&mut self, at: LineCol, message: &str) {
        let pos = SourcePos::new(self.file.clone(), self.macro_subst.clone(), at);
        self.reporter.warning(pos, message);
    }

    fn error(&mut self, at: LineCol, message: &str) {
        let pos = SourcePos::new(self.file.clone(), self.macro_subst.clone(), at);
        self.reporter.error(pos, message);
    }
}

impl AsmContext for Assembler {
    fn arch(&self) -> Arch {
        self.arch
    }

    fn error(&mut self, at: LineCol, message: &str) {
        self.report_error(at, message);
    }

    fn warn(&mut self, at: LineCol, message: &str) {
        self.report_warning(at, message);
    }

    fn parse_expression(&mut self, cur: &mut LineCursor<'_>) -> Option<Expression> {
        match Expression::parse(cur, self.options.gnu_as_compat) {
            Ok(expr) => {
                let refs: Vec<(String, LineCol)> = expr
                    .args
                    .iter()
                    .zip(expr.arg_positions.iter())
                    .filter_map(|(arg, at)| match arg {
                        crate::core::expr::ExprArg::Symbol(name) if name != "." => {
                            Some((name.clone(), *at))
                        }
                        _ => None,
                    })
                    .collect();
                for (name, at) in refs {
                    let pos = self.here(at);
                    self.symbols.add_occurrence(&name, pos);
                }
                Some(expr)
            }
            Err(err) => {
                let at = cur.line_col_at(err.at);
                self.report_error(at, err.message);
                None
            }
        }
    }

    fn eval(&mut self, expr: &Expression) -> Result<Option<(u64, usize)>, ()> {
        self.eval_pending(expr)
    }

    fn regvar(&self, name: &str) -> Option<Rc<RegVar>> {
        self.regvars.get(name).cloned()
    }

    fn current_section(&self) -> usize {
        self.current_section
    }

    fn out_pos(&self) -> usize {
        self.sections[self.current_section].out_pos()
    }

    fn emit_words(&mut self, words: &[u32]) {
        self.sections[self.current_section].emit_words(words);
    }

    fn add_code_flow(&mut self, offset: usize, target: usize, kind: CodeFlowKind) {
        self.sections[self.current_section].add_code_flow(CodeFlowEntry {
            offset,
            target,
            kind,
        });
    }

    fn attach(&mut self, expr: Expression, kind: RelocKind, offset: usize) {
        let section = self.current_section;
        let at = self.stmt_pos;
        self.add_pending(expr, PendTarget::Reloc { section, kind, offset }, at);
    }

    fn usage(&mut self) -> &mut UsageCollector {
        &mut self.usage
    }

    fn reg_pool(&mut self) -> &mut RegPool {
        &mut self.pool
    }
}

#[cfg(test)]
mod tests;
