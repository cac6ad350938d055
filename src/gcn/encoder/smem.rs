// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Scalar memory encoders: SMRD (GCN 1.0/1.1) and SMEM (GCN 1.2+).

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::operand::{parse_imm, parse_mod_imm, parse_sreg_range, ImmKind, OpFlags};
use crate::gcn::registry::{ArgMode, InsnDesc};
use crate::gcn::regs::RegRange;
use crate::gcn::reloc::RelocKind;
use crate::gcn::usage::{split_halfwrite, RegField, RwFlags};
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize};

fn dregs_count(desc: &InsnDesc) -> u16 {
    1u16 << desc.mode.dsize
}

fn update_pool(ctx: &mut dyn AsmContext, range: &RegRange, written: bool) {
    if range.is_set() && !range.is_var() && range.start < 255 {
        let pool = ctx.reg_pool();
        if written {
            pool.update_sgpr(range.end.saturating_sub(1));
        }
        pool.update_flags(range.start);
    }
}

pub fn encode_smrd(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit64 {
        ctx.error(at, "Only 32-bit size for SMRD encoding");
        return false;
    }
    let mut good = true;
    let mut dst = RegRange::default();
    let mut sbase = RegRange::default();
    let mut soffset = RegRange::default();
    let mut soffset_val: u8 = 0;
    let mut soffset_expr = None;
    match desc.mode.arg {
        ArgMode::SmrdOnlyDst => {
            ctx.usage().set_current(0);
            let regs = if desc.mode.dst64 { 2 } else { 1 };
            match parse_sreg_range(
                ctx,
                cur,
                regs,
                Some(RegField::SmrdSdst),
                true,
                OpFlags::SYMREG | OpFlags::WRITE,
            ) {
                Some(r) => dst = r,
                None => good = false,
            }
        }
        ArgMode::ArgNone => {}
        _ => {
            ctx.usage().set_current(0);
            match parse_sreg_range(
                ctx,
                cur,
                dregs_count(desc),
                Some(RegField::SmrdSdst),
                true,
                OpFlags::SYMREG | OpFlags::WRITE,
            ) {
                Some(r) => dst = r,
                None => good = false,
            }
            if !skip_required_comma(ctx, cur) {
                return false;
            }
            ctx.usage().set_current(1);
            let sbase_regs = if desc.mode.sbase4 { 4 } else { 2 };
            match parse_sreg_range(
                ctx,
                cur,
                sbase_regs,
                Some(RegField::SmrdSbase),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => sbase = r,
                None => good = false,
            }
            if !skip_required_comma(ctx, cur) {
                return false;
            }
            cur.skip_spaces();
            if !cur.try_char(b'@') {
                ctx.usage().set_current(2);
                match parse_sreg_range(
                    ctx,
                    cur,
                    1,
                    Some(RegField::SmrdSoffset),
                    false,
                    OpFlags::SYMREG | OpFlags::READ,
                ) {
                    Some(r) => soffset = r,
                    None => good = false,
                }
            }
            if soffset.is_empty() {
                // immediate 8-bit offset
                soffset = RegRange::new(255, 256);
                match parse_imm(ctx, cur, 8, ImmKind::Unsigned) {
                    Some(imm) => {
                        soffset_val = imm.value as u8;
                        soffset_expr = imm.expr;
                    }
                    None => good = false,
                }
            }
        }
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    let offset = ctx.out_pos();
    if let Some(expr) = soffset_expr {
        ctx.attach(expr, RelocKind::SmrdOffset, offset);
    }
    let word = 0xc000_0000u32
        | ((desc.code as u32) << 22)
        | (dst.field_value() << 15)
        | ((sbase.field_value() & !1) << 8)
        | if soffset.is_val(255) {
            0x100 | soffset_val as u32
        } else {
            soffset.field_value()
        };
    ctx.emit_words(&[word]);
    update_pool(ctx, &dst, true);
    update_pool(ctx, &sbase, false);
    update_pool(ctx, &soffset, false);
    true
}

pub fn encode_smem(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit32 {
        ctx.error(at, "Only 64-bit size for SMEM encoding");
        return false;
    }
    let gcn14 = ctx.arch().is_gcn14();
    let mut good = true;
    let mut data = RegRange::default();
    let mut sbase = RegRange::default();
    let mut soffset = RegRange::default();
    let mut soffset_val: u32 = 0;
    let mut soffset_expr = None;
    let mut simm7_expr = None;
    match desc.mode.arg {
        ArgMode::SmrdOnlyDst => {
            ctx.usage().set_current(0);
            let regs = if desc.mode.dst64 { 2 } else { 1 };
            match parse_sreg_range(
                ctx,
                cur,
                regs,
                Some(RegField::SmrdSdst),
                true,
                OpFlags::SYMREG | OpFlags::WRITE,
            ) {
                Some(r) => data = r,
                None => good = false,
            }
        }
        ArgMode::ArgNone => {}
        _ => {
            ctx.usage().set_current(0);
            if desc.mode.arg == ArgMode::SmemSdataImm {
                match parse_imm(ctx, cur, 7, ImmKind::Unsigned) {
                    Some(imm) => {
                        data = RegRange::new(imm.value as u16 & 0x7f, (imm.value as u16 & 0x7f) + 1);
                        simm7_expr = imm.expr;
                    }
                    None => good = false,
                }
            } else {
                let rw = if desc.mode.mem_load {
                    OpFlags::WRITE
                } else {
                    OpFlags::READ
                };
                match parse_sreg_range(
                    ctx,
                    cur,
                    dregs_count(desc),
                    Some(RegField::SmrdSdst),
                    true,
                    OpFlags::SYMREG | rw,
                ) {
                    Some(r) => data = r,
                    None => good = false,
                }
            }
            if !skip_required_comma(ctx, cur) {
                return false;
            }
            ctx.usage().set_current(1);
            let sbase_regs = if desc.mode.sbase4 { 4 } else { 2 };
            match parse_sreg_range(
                ctx,
                cur,
                sbase_regs,
                Some(RegField::SmrdSbase),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => sbase = r,
                None => good = false,
            }
            if !skip_required_comma(ctx, cur) {
                return false;
            }
            cur.skip_spaces();
            if !cur.try_char(b'@') {
                ctx.usage().set_current(2);
                let mark = cur.pos;
                match parse_sreg_range(
                    ctx,
                    cur,
                    1,
                    Some(RegField::SmrdSoffset),
                    false,
                    OpFlags::SYMREG | OpFlags::READ,
                ) {
                    Some(r) => soffset = r,
                    None => good = false,
                }
                if good
                    && !gcn14
                    && !desc.mode.mem_load
                    && soffset.is_set()
                    && !soffset.is_val(124)
                {
                    let at = cur.line_col_at(mark);
                    ctx.error(at, "Store/Atomic SMEM instructions accepts only M0 register");
                    good = false;
                }
            }
            if soffset.is_empty() {
                soffset = RegRange::new(255, 256);
                let (bits, kind) = if gcn14 {
                    (21, ImmKind::Both)
                } else {
                    (20, ImmKind::Unsigned)
                };
                match parse_imm(ctx, cur, bits, kind) {
                    Some(imm) => {
                        soffset_val = imm.value as u32;
                        soffset_expr = imm.expr;
                    }
                    None => good = false,
                }
            }
        }
    }
    // modifiers
    let mut have_glc = false;
    let mut have_nv = false;
    let mut have_offset = false;
    while !cur.at_end() {
        let mod_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            ctx.error(mod_at, "Expected SMEM modifier");
            return false;
        };
        match name.as_str() {
            "glc" => have_glc = true,
            "nv" if gcn14 => have_nv = true,
            "offset" if gcn14 => match parse_mod_imm(ctx, cur, "offset", 21, ImmKind::Both) {
                Some(imm) => {
                    if have_offset {
                        ctx.warn(mod_at, "Offset is already defined");
                    }
                    have_offset = true;
                    if soffset.is_val(255) {
                        ctx.error(mod_at, "Illegal second offset");
                        good = false;
                    } else {
                        soffset_val = imm.value as u32;
                        soffset_expr = imm.expr;
                    }
                }
                None => good = false,
            },
            _ => {
                ctx.error(mod_at, "Unknown SMEM modifier");
                good = false;
            }
        }
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    let offset = ctx.out_pos();
    if let Some(expr) = soffset_expr {
        let kind = if gcn14 {
            RelocKind::SmemOffsetVega
        } else {
            RelocKind::SmemOffset
        };
        ctx.attach(expr, kind, offset);
    }
    if let Some(expr) = simm7_expr {
        ctx.attach(expr, RelocKind::SmemImm, offset);
    }
    // atomics write back only with GLC; fix the data record accordingly
    if desc.mode.arg != ArgMode::SmemSdataImm && data.is_set() {
        let to_write = desc.mode.mem_load || (desc.mode.mem_atomic && have_glc);
        let to_read = !desc.mode.mem_load || desc.mode.mem_atomic;
        let mut rw = RwFlags::empty();
        if to_read {
            rw |= RwFlags::READ;
        }
        if to_write {
            rw |= RwFlags::WRITE;
        }
        if let Some(rvu) = ctx.usage().slot_mut(0) {
            rvu.rw = rw;
        }
        if desc.mode.halfwrite && to_write {
            split_halfwrite(ctx.usage(), 0, 3, RegField::SmrdSdstH);
        }
    }
    let imm_bit = soffset.is_val(255) || have_offset;
    let words = [
        0xc000_0000u32
            | ((desc.code as u32) << 18)
            | (data.field_value() << 6)
            | (sbase.field_value() >> 1)
            | if imm_bit { 0x2_0000 } else { 0 }
            | if have_glc { 0x1_0000 } else { 0 }
            | if have_nv { 0x8000 } else { 0 }
            | if have_offset { 0x4000 } else { 0 },
        (if imm_bit {
            soffset_val & 0x1f_ffff
        } else {
            soffset.field_value()
        }) | if have_offset && !soffset.is_val(255) {
            soffset.field_value() << 25
        } else {
            0
        },
    ];
    if !check_enc_size(ctx, at, enc_size, 2) {
        return false;
    }
    ctx.emit_words(&words);
    let wrote = desc.mode.mem_load || (desc.mode.mem_atomic && have_glc);
    if desc.mode.arg != ArgMode::SmemSdataImm {
        update_pool(ctx, &data, wrote);
    }
    update_pool(ctx, &sbase, false);
    update_pool(ctx, &soffset, false);
    true
}
