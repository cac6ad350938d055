// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! EXP (export) encoder.

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::operand::{parse_vreg_range, OpFlags};
use crate::gcn::registry::InsnDesc;
use crate::gcn::regs::RegRange;
use crate::gcn::usage::RegField;
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize};

const VSRC_FIELDS: [RegField; 4] = [
    RegField::ExpVsrc0,
    RegField::ExpVsrc1,
    RegField::ExpVsrc2,
    RegField::ExpVsrc3,
];

/// Parse an export target: `mrt0..mrt7`, `mrtz`, `null`, `pos0..pos3`,
/// `param0..param31`.
fn parse_exp_target(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<u32> {
    cur.skip_spaces();
    let at = cur.line_col();
    let Some(name) = cur.parse_name_lower() else {
        ctx.error(at, "Expected export target");
        return None;
    };
    if name == "mrtz" {
        return Some(8);
    }
    if name == "null" {
        return Some(9);
    }
    if let Some(digits) = name.strip_prefix("mrt") {
        match digits.parse::<u32>() {
            Ok(n) if n < 8 => return Some(n),
            _ => {
                ctx.error(at, "MRT number out of range (0-7)");
                return None;
            }
        }
    }
    if let Some(digits) = name.strip_prefix("pos") {
        match digits.parse::<u32>() {
            Ok(n) if n < 4 => return Some(12 + n),
            _ => {
                ctx.error(at, "Pos number out of range (0-3)");
                return None;
            }
        }
    }
    if let Some(digits) = name.strip_prefix("param") {
        match digits.parse::<u32>() {
            Ok(n) if n < 32 => return Some(32 + n),
            _ => {
                ctx.error(at, "Param number out of range (0-31)");
                return None;
            }
        }
    }
    ctx.error(at, "Unknown EXP target");
    None
}

pub fn encode_exp(
    ctx: &mut dyn AsmContext,
    _desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit32 {
        ctx.error(at, "Only 64-bit size for EXP encoding");
        return false;
    }
    let mut good = true;
    let target = match parse_exp_target(ctx, cur) {
        Some(t) => t,
        None => return false,
    };
    let mut en_mask: u32 = 0xf;
    let mut vsrcs = [
        RegRange::default(),
        RegRange::default(),
        RegRange::default(),
        RegRange::default(),
    ];
    let mut vsrc_marks = [0usize; 4];
    for i in 0..4 {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        cur.skip_spaces();
        vsrc_marks[i] = cur.pos;
        if cur.try_keyword("off") {
            en_mask &= !(1 << i);
        } else {
            ctx.usage().set_current(i);
            match parse_vreg_range(
                ctx,
                cur,
                1,
                Some(VSRC_FIELDS[i]),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => vsrcs[i] = r,
                None => good = false,
            }
        }
    }
    let mut have_vm = false;
    let mut have_compr = false;
    let mut have_done = false;
    while !cur.at_end() {
        let mod_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            ctx.error(mod_at, "Expected EXP modifier");
            return false;
        };
        match name.as_str() {
            "vm" => have_vm = true,
            "done" => have_done = true,
            "compr" => have_compr = true,
            _ => {
                ctx.error(mod_at, "Unknown EXP modifier");
                good = false;
            }
        }
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if have_compr && !vsrcs[0].is_var() && !vsrcs[1].is_var() {
        // packed export: VSRC1 aliases VSRC0, VSRC3 aliases VSRC2
        if vsrcs[0].start != vsrcs[1].start && (en_mask & 3) == 3 {
            let at = cur.line_col_at(vsrc_marks[1]);
            ctx.error(at, "VSRC1 must be equal to VSRC0 in compr mode");
            return false;
        }
        if vsrcs[2].start != vsrcs[3].start && (en_mask & 12) == 12 {
            let at = cur.line_col_at(vsrc_marks[3]);
            ctx.error(at, "VSRC3 must be equal to VSRC2 in compr mode");
            return false;
        }
        vsrcs[1] = vsrcs[2].clone();
        vsrcs[2] = RegRange::default();
        vsrcs[3] = RegRange::default();
    }
    let encoding = if ctx.arch().is_gcn12() {
        0xc400_0000u32
    } else {
        0xf800_0000u32
    };
    let words = [
        encoding
            | en_mask
            | (target << 4)
            | if have_compr { 0x400 } else { 0 }
            | if have_done { 0x800 } else { 0 }
            | if have_vm { 0x1000 } else { 0 },
        (vsrcs[0].field_value() & 0xff)
            | ((vsrcs[1].field_value() & 0xff) << 8)
            | ((vsrcs[2].field_value() & 0xff) << 16)
            | ((vsrcs[3].field_value() & 0xff) << 24),
    ];
    if !check_enc_size(ctx, at, enc_size, 2) {
        return false;
    }
    ctx.emit_words(&words);
    true
}
