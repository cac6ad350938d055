// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Directive handling: includes, macros, conditionals, repeats, data
//! emission, alignment, and the architecture selector.

use super::{Assembler, Cond};
use crate::core::cursor::LineCursor;
use crate::core::expr::SECT_ABS;
use crate::core::macro_processor::parse_macro_params;
use crate::core::source_pos::LineCol;
use crate::gcn::arch::Arch;
use crate::gcn::regs::RegVar;

/// Evaluate an expression that must resolve right now.
fn eval_now(asm: &mut Assembler, cur: &mut LineCursor<'_>, at: LineCol) -> Option<u64> {
    use crate::gcn::AsmContext;
    let expr = asm.parse_expression(cur)?;
    match asm.eval(&expr) {
        Ok(Some((value, section))) => {
            if section != SECT_ABS {
                asm.report_error(at, "Expression must be absolute");
                return None;
            }
            Some(value)
        }
        Ok(None) => {
            asm.report_error(at, "Expression must be resolvable at this point");
            None
        }
        Err(()) => None,
    }
}

/// Evaluate an expression that may be section-relative (`.org`).
fn eval_now_rel(asm: &mut Assembler, cur: &mut LineCursor<'_>, at: LineCol) -> Option<(u64, usize)> {
    use crate::gcn::AsmContext;
    let expr = asm.parse_expression(cur)?;
    match asm.eval(&expr) {
        Ok(Some(pair)) => Some(pair),
        Ok(None) => {
            asm.report_error(at, "Expression must be resolvable at this point");
            None
        }
        Err(()) => None,
    }
}

fn expect_end(asm: &mut Assembler, cur: &mut LineCursor<'_>) {
    if !cur.at_end() {
        let at = cur.line_col();
        asm.report_error(at, "Garbage at end of line");
    }
}

/// Parse a quoted string with the usual escapes.
fn parse_string(asm: &mut Assembler, cur: &mut LineCursor<'_>) -> Option<Vec<u8>> {
    cur.skip_spaces();
    let at = cur.line_col();
    if !cur.try_char(b'"') {
        asm.report_error(at, "Expected string literal");
        return None;
    }
    let mut out = Vec::new();
    loop {
        match cur.peek() {
            None => {
                let at = cur.line_col();
                asm.report_error(at, "Unterminated string");
                return None;
            }
            Some(b'"') => {
                cur.bump();
                return Some(out);
            }
            Some(b'\\') => {
                cur.bump();
                let esc = cur.peek().unwrap_or(b'\\');
                cur.bump();
                out.push(match esc {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'0' => 0,
                    other => other,
                });
            }
            Some(c) => {
                out.push(c);
                cur.bump();
            }
        }
    }
}

fn emit_data(asm: &mut Assembler, cur: &mut LineCursor<'_>, width: usize) {
    loop {
        cur.skip_spaces();
        let item_at = cur.line_col();
        let Some(value) = eval_now(asm, cur, item_at) else {
            return;
        };
        let bytes = value.to_le_bytes();
        let section = asm.current_section_mut();
        section.emit(&bytes[..width]);
        if !cur.try_char(b',') {
            break;
        }
    }
    expect_end(asm, cur);
}

impl Assembler {
    fn current_section_mut(&mut self) -> &mut crate::core::section::Section {
        let id = {
            use crate::gcn::AsmContext;
            self.current_section()
        };
        &mut self.sections[id]
    }
}

pub(super) fn dispatch(asm: &mut Assembler, name: &str, cur: &mut LineCursor<'_>, at: LineCol) {
    use crate::gcn::AsmContext;
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "include" => {
            let Some(path) = parse_string(asm, cur) else {
                return;
            };
            expect_end(asm, cur);
            let path = String::from_utf8_lossy(&path).to_string();
            asm.include_file(&path, at);
        }
        "macro" => {
            cur.skip_spaces();
            let name_at = cur.line_col();
            let Some(macro_name) = cur.parse_name() else {
                asm.report_error(name_at, "Expected macro name");
                return;
            };
            let macro_name = macro_name.to_string();
            match parse_macro_params(cur) {
                Ok(params) => asm.begin_macro(macro_name, params, at),
                Err(err) => {
                    let at = cur.line_col_at(err.at);
                    asm.report_error(at, &err.message);
                }
            }
        }
        "endm" | "endmacro" => {
            asm.report_error(at, "'.endm' without '.macro'");
        }
        "rept" => {
            let Some(count) = eval_now(asm, cur, at) else {
                return;
            };
            expect_end(asm, cur);
            asm.begin_repeat(count);
        }
        "endr" => {
            asm.report_error(at, "'.endr' without '.rept'");
        }
        "if" | "ifdef" | "ifndef" => {
            let parent_active = asm
                .cond_stack_mut()
                .last()
                .map(|c| c.active && c.parent_active)
                .unwrap_or(true);
            let active = match lower.as_str() {
                "if" => eval_now(asm, cur, at).map(|v| v != 0).unwrap_or(false),
                "ifdef" | "ifndef" => {
                    cur.skip_spaces();
                    let defined = cur
                        .parse_name()
                        .map(|n| asm.symbols().is_defined(n))
                        .unwrap_or(false);
                    if lower == "ifdef" {
                        defined
                    } else {
                        !defined
                    }
                }
                _ => unreachable!(),
            };
            expect_end(asm, cur);
            asm.cond_stack_mut().push(Cond {
                active,
                taken: active,
                parent_active,
            });
        }
        "elseif" => {
            let value = eval_now(asm, cur, at);
            expect_end(asm, cur);
            match asm.cond_stack_mut().last_mut() {
                Some(cond) => {
                    if cond.taken {
                        cond.active = false;
                    } else {
                        let take = value.map(|v| v != 0).unwrap_or(false);
                        cond.active = take;
                        cond.taken = take;
                    }
                }
                None => asm.report_error(at, "'.elseif' without '.if'"),
            }
        }
        "else" => {
            expect_end(asm, cur);
            match asm.cond_stack_mut().last_mut() {
                Some(cond) => {
                    cond.active = !cond.taken;
                    cond.taken = true;
                }
                None => asm.report_error(at, "'.else' without '.if'"),
            }
        }
        "endif" => {
            expect_end(asm, cur);
            if asm.cond_stack_mut().pop().is_none() {
                asm.report_error(at, "'.endif' without '.if'");
            }
        }
        "arch" => {
            cur.skip_spaces();
            let name_at = cur.line_col();
            let arch_name = cur.parse_name().unwrap_or_default().to_string();
            match Arch::from_name(&arch_name) {
                Some(arch) => asm.set_arch(arch),
                None => asm.report_error(name_at, "Unknown architecture"),
            }
            expect_end(asm, cur);
        }
        "org" | "offset" => {
            let Some((value, section)) = eval_now_rel(asm, cur, at) else {
                return;
            };
            expect_end(asm, cur);
            if section != SECT_ABS && section != asm.current_section() {
                asm.report_error(at, "Offset must lie in the current section");
                return;
            }
            // moves within the emitted content only reposition; moves past
            // the end fill with the ISA pattern
            let target = value as usize;
            let len = asm.current_section_mut().content.len();
            if target <= len {
                asm.current_section_mut().set_out_pos(target);
            } else {
                asm.current_section_mut().set_out_pos(len);
                asm.fill_code(target - len);
            }
        }
        "equ" | "set" => {
            cur.skip_spaces();
            let name_at = cur.line_col();
            let Some(sym) = cur.parse_name() else {
                asm.report_error(name_at, "Expected symbol name");
                return;
            };
            let sym = sym.to_string();
            if !cur.try_char(b',') {
                let at = cur.line_col();
                asm.report_error(at, "Expected ',' before expression");
                return;
            }
            asm.assign_symbol(&sym, cur, name_at);
        }
        "byte" => emit_data(asm, cur, 1),
        "short" | "half" => emit_data(asm, cur, 2),
        "int" | "word" => emit_data(asm, cur, 4),
        "quad" => emit_data(asm, cur, 8),
        "ascii" | "asciz" => {
            let Some(mut bytes) = parse_string(asm, cur) else {
                return;
            };
            if lower == "asciz" {
                bytes.push(0);
            }
            expect_end(asm, cur);
            asm.current_section_mut().emit(&bytes);
        }
        "align" => {
            let Some(value) = eval_now(asm, cur, at) else {
                return;
            };
            expect_end(asm, cur);
            if value == 0 || !value.is_power_of_two() {
                asm.report_error(at, "Alignment is not a power of two");
                return;
            }
            let here = asm.out_pos() as u64;
            let target = here.next_multiple_of(value);
            asm.fill_code((target - here) as usize);
        }
        "fill" => {
            let Some(count) = eval_now(asm, cur, at) else {
                return;
            };
            let mut size = 1u64;
            let mut value = 0u64;
            if cur.try_char(b',') {
                cur.skip_spaces();
                let at = cur.line_col();
                size = match eval_now(asm, cur, at) {
                    Some(v) => v,
                    None => return,
                };
                if cur.try_char(b',') {
                    cur.skip_spaces();
                    let at = cur.line_col();
                    value = match eval_now(asm, cur, at) {
                        Some(v) => v,
                        None => return,
                    };
                }
            }
            expect_end(asm, cur);
            if size > 8 {
                asm.report_error(at, "Fill size is too large");
                return;
            }
            let pattern = &value.to_le_bytes()[..size as usize];
            let mut content = Vec::with_capacity((count as usize) * pattern.len());
            for _ in 0..count {
                content.extend_from_slice(pattern);
            }
            asm.current_section_mut().emit(&content);
        }
        "skip" | "space" => {
            let Some(count) = eval_now(asm, cur, at) else {
                return;
            };
            let mut value = 0u8;
            if cur.try_char(b',') {
                cur.skip_spaces();
                let at = cur.line_col();
                value = match eval_now(asm, cur, at) {
                    Some(v) => v as u8,
                    None => return,
                };
            }
            expect_end(asm, cur);
            asm.current_section_mut().emit(&vec![value; count as usize]);
        }
        "regvar" => loop {
            cur.skip_spaces();
            let name_at = cur.line_col();
            let Some(var_name) = cur.parse_name() else {
                asm.report_error(name_at, "Expected register variable name");
                return;
            };
            let var_name = var_name.to_string();
            if !cur.try_char(b':') {
                let at = cur.line_col();
                asm.report_error(at, "Expected ':' before register type");
                return;
            }
            cur.skip_spaces();
            let type_at = cur.line_col();
            let vector = match cur.parse_name_lower().as_deref() {
                Some("v") => true,
                Some("s") => false,
                _ => {
                    asm.report_error(type_at, "Expected 'v' or 's' register type");
                    return;
                }
            };
            let mut size = 1u16;
            if cur.try_char(b':') {
                cur.skip_spaces();
                let at = cur.line_col();
                size = match eval_now(asm, cur, at) {
                    Some(v) if (1..=16).contains(&v) => v as u16,
                    Some(_) => {
                        asm.report_error(at, "Register variable size out of range (1-16)");
                        return;
                    }
                    None => return,
                };
            }
            asm.define_regvar(
                RegVar {
                    name: var_name,
                    vector,
                    size,
                },
                name_at,
            );
            if !cur.try_char(b',') {
                break;
            }
        },
        _ => {
            asm.report_error(at, "Unknown directive");
        }
    }
}
