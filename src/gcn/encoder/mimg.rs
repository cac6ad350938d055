// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! MIMG (image) encoder.

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::operand::{parse_imm, parse_sreg_range, parse_vreg_range, ImmKind, OpFlags};
use crate::gcn::registry::InsnDesc;
use crate::gcn::regs::RegRange;
use crate::gcn::usage::{add_tfe_lane, split_halfwrite, RegField, RwFlags};
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize};

pub fn encode_mimg(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit32 {
        ctx.error(at, "Only 64-bit size for MIMG encoding");
        return false;
    }
    let gcn14 = ctx.arch().is_gcn14();
    let mut good = true;
    cur.skip_spaces();
    let vdata_mark = cur.pos;
    ctx.usage().set_current(0);
    let mut vdata = RegRange::default();
    match parse_vreg_range(ctx, cur, 0, Some(RegField::MVdata), true, OpFlags::SYMREG | OpFlags::READ)
    {
        Some(r) => vdata = r,
        None => good = false,
    }
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    cur.skip_spaces();
    let vaddr_mark = cur.pos;
    ctx.usage().set_current(1);
    let mut vaddr = RegRange::default();
    match parse_vreg_range(ctx, cur, 0, Some(RegField::MVaddr), true, OpFlags::SYMREG | OpFlags::READ)
    {
        Some(r) => vaddr = r,
        None => good = false,
    }
    let required = desc.mode.dsize.max(1) as u16;
    let max_extra = if desc.mode.vaderiv { 7 } else { 3 };
    if vaddr.is_set() && (vaddr.len() < required || vaddr.len() > required + max_extra) {
        let at = cur.line_col_at(vaddr_mark);
        ctx.error(
            at,
            &format!(
                "Required ({}-{}) vector registers",
                required,
                required + max_extra
            ),
        );
        good = false;
    }
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    cur.skip_spaces();
    let srsrc_mark = cur.pos;
    ctx.usage().set_current(2);
    let mut srsrc = RegRange::default();
    match parse_sreg_range(ctx, cur, 0, Some(RegField::MSrsrc), true, OpFlags::SYMREG | OpFlags::READ)
    {
        Some(r) => srsrc = r,
        None => good = false,
    }
    let mut ssamp = RegRange::default();
    if desc.mode.sample {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        ctx.usage().set_current(3);
        match parse_sreg_range(
            ctx,
            cur,
            4,
            Some(RegField::MimgSsamp),
            true,
            OpFlags::SYMREG | OpFlags::READ,
        ) {
            Some(r) => ssamp = r,
            None => good = false,
        }
    }
    // modifiers
    let mut have_tfe = false;
    let mut have_slc = false;
    let mut have_glc = false;
    let mut have_da = false;
    let mut have_r128 = false;
    let mut have_lwe = false;
    let mut have_unorm = false;
    let mut have_dmask = false;
    let mut have_d16 = false;
    let mut have_a16 = false;
    let mut dmask: u32 = 1;
    while !cur.at_end() {
        let mod_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            ctx.error(mod_at, "Expected MIMG modifier");
            return false;
        };
        match name.as_str() {
            "da" => have_da = true,
            "d16" if ctx.arch().is_gcn12() => have_d16 = true,
            "dmask" => {
                if !cur.try_char(b':') {
                    ctx.error(mod_at, "Expected ':' before dmask");
                    good = false;
                    continue;
                }
                cur.skip_spaces();
                let value_at = cur.line_col();
                match parse_imm(ctx, cur, 0, ImmKind::Unsigned) {
                    Some(imm) => {
                        if have_dmask {
                            ctx.warn(mod_at, "Dmask is already defined");
                        }
                        have_dmask = true;
                        if imm.value > 0xf {
                            ctx.warn(value_at, "Dmask out of range (0-15)");
                        }
                        dmask = imm.value as u32 & 0xf;
                        if dmask == 0 {
                            ctx.error(value_at, "Zero in dmask is illegal");
                            good = false;
                        }
                    }
                    None => good = false,
                }
            }
            "glc" => have_glc = true,
            "lwe" => have_lwe = true,
            "r128" if !gcn14 => have_r128 = true,
            "a16" if gcn14 => have_a16 = true,
            "tfe" => have_tfe = true,
            "slc" => have_slc = true,
            "unorm" => have_unorm = true,
            _ => {
                ctx.error(mod_at, "Unknown MIMG modifier");
                good = false;
            }
        }
    }
    // VDATA register count follows the dmask population unless fixed
    let mut dregs = 4u16;
    if !desc.mode.vdata4 {
        dregs = dmask.count_ones() as u16 + have_tfe as u16;
    }
    if dregs != 0 && vdata.is_set() && vdata.len() != dregs {
        let at = cur.line_col_at(vdata_mark);
        let plural = if dregs > 1 { "s" } else { "" };
        ctx.error(at, &format!("Required {} vector register{}", dregs, plural));
        good = false;
    }
    let srsrc_want = if have_r128 { 4 } else { 8 };
    if srsrc.is_set() && srsrc.len() != srsrc_want {
        let at = cur.line_col_at(srsrc_mark);
        ctx.error(
            at,
            &format!("Required {} scalar registers", srsrc_want),
        );
        good = false;
    }
    let vdata_to_write = desc.mode.mem_load || (desc.mode.mem_atomic && have_glc);
    let vdata_to_read = !desc.mode.mem_load || desc.mode.mem_atomic;
    let mut rw = RwFlags::empty();
    if vdata_to_read {
        rw |= RwFlags::READ;
    }
    if vdata_to_write {
        rw |= RwFlags::WRITE;
    }
    if let Some(rvu) = ctx.usage().slot_mut(0) {
        rvu.rw = rw;
    }
    if let Some(rvu) = ctx.usage().slot_mut(2) {
        if rvu.range.is_var() {
            rvu.align = 4;
        }
    }
    let mut vdata_divided = false;
    if desc.mode.halfwrite && vdata_to_write && ctx.usage().slot(0).is_some() {
        split_halfwrite(ctx.usage(), 0, 4, RegField::MVdataH);
        vdata_divided = true;
    }
    if have_tfe && ctx.usage().slot(if vdata_divided { 4 } else { 0 }).is_some() {
        let from = if vdata_divided { 4 } else { 0 };
        add_tfe_lane(ctx.usage(), from, 5, RegField::MVdataLast);
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if !have_unorm && (!desc.mode.mem_load || desc.mode.mem_atomic) {
        ctx.error(at, "Unorm is not set for store or atomic instruction");
        return false;
    }
    let words = [
        0xf000_0000u32
            | (dmask << 8)
            | if have_unorm { 0x1000 } else { 0 }
            | if have_glc { 0x2000 } else { 0 }
            | if have_da { 0x4000 } else { 0 }
            | if have_r128 || have_a16 { 0x8000 } else { 0 }
            | if have_tfe { 0x1_0000 } else { 0 }
            | if have_lwe { 0x2_0000 } else { 0 }
            | ((desc.code as u32) << 18)
            | if have_slc { 1 << 25 } else { 0 },
        (vaddr.field_value() & 0xff)
            | ((vdata.field_value() & 0xff) << 8)
            | ((srsrc.field_value() >> 2) << 16)
            | ((ssamp.field_value() >> 2) << 21)
            | if have_d16 { 1u32 << 31 } else { 0 },
    ];
    if !check_enc_size(ctx, at, enc_size, 2) {
        return false;
    }
    ctx.emit_words(&words);
    if vdata.is_set() && !vdata.is_var() && (vdata_to_write || have_tfe) {
        ctx.reg_pool().update_vgpr(vdata.end);
    }
    true
}
