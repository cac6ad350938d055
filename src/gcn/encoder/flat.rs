// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! FLAT, GLOBAL and SCRATCH encoder (GCN 1.1+).

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::operand::{parse_mod_imm, parse_sreg_range, parse_vreg_range, ImmKind, OpFlags};
use crate::gcn::registry::{ArgMode, FlatMode, InsnDesc};
use crate::gcn::regs::RegRange;
use crate::gcn::reloc::RelocKind;
use crate::gcn::usage::{add_tfe_lane, RegField, RwFlags};
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize};

pub fn encode_flat(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit32 {
        ctx.error(at, "Only 64-bit size for FLAT encoding");
        return false;
    }
    let gcn14 = ctx.arch().is_gcn14();
    let flat_mode = desc.mode.flat_mode;
    let mut good = true;
    let dregs = desc.mode.dsize.max(1) as u16;
    // FLAT addresses are 64-bit; SCRATCH takes one offset register
    let addr_regs: u16 = match flat_mode {
        FlatMode::Flat => 2,
        FlatMode::Scratch => 1,
        FlatMode::Global => 0,
    };
    let mut vdst = RegRange::default();
    let mut vaddr = RegRange::default();
    let mut vdata = RegRange::default();
    let mut saddr = RegRange::default();
    let mut vaddr_off = false;
    let mut saddr_off = false;
    cur.skip_spaces();
    let mut vdst_mark = cur.pos;
    let mut addr_mark = cur.pos;

    if desc.mode.arg != ArgMode::FlatStore {
        // destination first
        vdst_mark = cur.pos;
        ctx.usage().set_current(0);
        match parse_vreg_range(ctx, cur, 0, Some(RegField::FlatVdst), true, OpFlags::SYMREG | OpFlags::WRITE)
        {
            Some(r) => vdst = r,
            None => good = false,
        }
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        cur.skip_spaces();
        addr_mark = cur.pos;
        if flat_mode == FlatMode::Scratch && cur.try_keyword("off") {
            vaddr_off = true;
        } else {
            ctx.usage().set_current(1);
            match parse_vreg_range(
                ctx,
                cur,
                addr_regs,
                Some(RegField::FlatAddr),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => vaddr = r,
                None => good = false,
            }
        }
    } else {
        cur.skip_spaces();
        addr_mark = cur.pos;
        if flat_mode == FlatMode::Scratch && cur.try_keyword("off") {
            vaddr_off = true;
        } else {
            ctx.usage().set_current(1);
            match parse_vreg_range(
                ctx,
                cur,
                addr_regs,
                Some(RegField::FlatAddr),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => vaddr = r,
                None => good = false,
            }
        }
    }
    if desc.mode.arg != ArgMode::FlatLoad {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        ctx.usage().set_current(2);
        match parse_vreg_range(
            ctx,
            cur,
            dregs,
            Some(RegField::FlatData),
            true,
            OpFlags::SYMREG | OpFlags::READ,
        ) {
            Some(r) => vdata = r,
            None => good = false,
        }
    }
    if flat_mode != FlatMode::Flat {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        cur.skip_spaces();
        if cur.try_keyword("off") {
            saddr_off = true;
        } else {
            ctx.usage().set_current(3);
            let saddr_regs = if flat_mode == FlatMode::Scratch { 1 } else { 2 };
            match parse_sreg_range(
                ctx,
                cur,
                saddr_regs,
                Some(RegField::FlatSaddr),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => saddr = r,
                None => good = false,
            }
        }
    }
    if addr_regs == 0 && vaddr.is_set() {
        // GLOBAL: one offset register with SADDR, a 64-bit address without
        let want = if saddr_off { 2 } else { 1 };
        if vaddr.len() != want {
            let at = cur.line_col_at(addr_mark);
            let plural = if want > 1 { "s" } else { "" };
            ctx.error(at, &format!("Required {} vector register{}", want, plural));
            good = false;
        }
    }
    if flat_mode == FlatMode::Scratch && !saddr_off && !vaddr_off {
        ctx.error(at, "Only one of VADDR and SADDR can be set in SCRATCH mode");
        good = false;
    }
    if saddr_off {
        saddr = RegRange::new(0x7f, 0x80);
    }
    if vaddr_off {
        vaddr = RegRange::default();
    }
    // modifiers
    let mut inst_offset: u32 = 0;
    let mut inst_offset_expr = None;
    let mut have_inst_offset = false;
    let mut have_tfe = false;
    let mut have_slc = false;
    let mut have_glc = false;
    let mut have_nv = false;
    let mut have_lds = false;
    while !cur.at_end() {
        let mod_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            ctx.error(mod_at, "Expected FLAT modifier");
            return false;
        };
        match name.as_str() {
            "tfe" if !gcn14 => have_tfe = true,
            "nv" if gcn14 => have_nv = true,
            "lds" if gcn14 => have_lds = true,
            "glc" => have_glc = true,
            "slc" => have_slc = true,
            "inst_offset" if gcn14 => {
                let (bits, kind) = if flat_mode != FlatMode::Flat {
                    (13, ImmKind::Both)
                } else {
                    (12, ImmKind::Unsigned)
                };
                match parse_mod_imm(ctx, cur, "inst_offset", bits, kind) {
                    Some(imm) => {
                        if have_inst_offset {
                            ctx.warn(mod_at, "InstOffset is already defined");
                        }
                        have_inst_offset = true;
                        inst_offset = imm.value as u32;
                        inst_offset_expr = imm.expr;
                    }
                    None => good = false,
                }
            }
            _ => {
                ctx.error(mod_at, "Unknown FLAT modifier");
                good = false;
            }
        }
    }
    // destination register-count check; cmpswap returns only half
    let dst_to_write = vdst.is_set() && (!desc.mode.mem_atomic || have_glc);
    if vdst.is_set() {
        let mut dst_regs = if desc.mode.halfwrite { dregs >> 1 } else { dregs };
        dst_regs += have_tfe as u16;
        if vdst.len() != dst_regs {
            let at = cur.line_col_at(vdst_mark);
            let plural = if dst_regs > 1 { "s" } else { "" };
            ctx.error(at, &format!("Required {} vector register{}", dst_regs, plural));
            good = false;
        }
        if have_tfe && ctx.usage().slot(0).is_some() {
            add_tfe_lane(ctx.usage(), 0, 3, RegField::FlatVdstLast);
        }
        if !dst_to_write {
            ctx.usage().clear_slot(0);
        } else if let Some(rvu) = ctx.usage().slot_mut(0) {
            rvu.rw = RwFlags::WRITE;
        }
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    let offset_pos = ctx.out_pos();
    if let Some(expr) = inst_offset_expr {
        let kind = if flat_mode != FlatMode::Flat {
            RelocKind::InstOffsetSigned
        } else {
            RelocKind::InstOffset
        };
        ctx.attach(expr, kind, offset_pos);
    }
    let words = [
        0xdc00_0000u32
            | (inst_offset & 0x1fff)
            | if have_lds { 0x2000 } else { 0 }
            | ((flat_mode.field()) << 14)
            | if have_glc { 0x1_0000 } else { 0 }
            | if have_slc { 0x2_0000 } else { 0 }
            | ((desc.code as u32) << 18),
        (vaddr.field_value() & 0xff)
            | ((vdata.field_value() & 0xff) << 8)
            | (saddr.field_value() << 16)
            | if have_tfe || have_nv { 1 << 23 } else { 0 }
            | ((vdst.field_value() & 0xff) << 24),
    ];
    if !check_enc_size(ctx, at, enc_size, 2) {
        return false;
    }
    ctx.emit_words(&words);
    if vdst.is_set() && !vdst.is_var() && (dst_to_write || have_tfe) {
        ctx.reg_pool().update_vgpr(vdst.end);
    }
    true
}
