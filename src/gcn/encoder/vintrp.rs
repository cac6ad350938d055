// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Plain VINTRP encoder (GCN 1.0/1.1).

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::vop3::{parse_p0_p10_p20, parse_vintrp_attr};
use crate::gcn::operand::{parse_vreg_range, OpFlags};
use crate::gcn::registry::{ArgMode, InsnDesc};
use crate::gcn::regs::RegRange;
use crate::gcn::usage::RegField;
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize, VopEnc};

pub fn encode_vintrp(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
    vop_enc: VopEnc,
) -> bool {
    if enc_size == EncSize::Bit64 {
        ctx.error(at, "Only 32-bit size for VINTRP encoding");
        return false;
    }
    if vop_enc != VopEnc::Normal {
        ctx.error(at, "DPP and SDWA encoding is illegal for VINTRP");
        return false;
    }
    let mut good = true;
    ctx.usage().set_current(0);
    let mut dst = RegRange::default();
    match parse_vreg_range(
        ctx,
        cur,
        1,
        Some(RegField::VintrpVdst),
        true,
        OpFlags::SYMREG | OpFlags::WRITE,
    ) {
        Some(r) => dst = r,
        None => good = false,
    }
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    let mut src = RegRange::default();
    if desc.mode.arg == ArgMode::P0P10P20 {
        match parse_p0_p10_p20(ctx, cur) {
            Some(r) => src = r,
            None => good = false,
        }
    } else {
        ctx.usage().set_current(1);
        match parse_vreg_range(
            ctx,
            cur,
            1,
            Some(RegField::VintrpVsrc0),
            true,
            OpFlags::SYMREG | OpFlags::READ,
        ) {
            Some(r) => src = r,
            None => good = false,
        }
    }
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    let attr = match parse_vintrp_attr(ctx, cur) {
        Some(attr) => attr,
        None => return false,
    };
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    // attr arrives as (chan << 6) | attrno, exactly the field layout
    let word = 0xc800_0000u32
        | (src.field_value() & 0xff)
        | ((attr as u32 & 0xff) << 8)
        | ((desc.code as u32) << 16)
        | ((dst.field_value() & 0xff) << 18);
    ctx.emit_words(&[word]);
    if !dst.is_var() {
        ctx.reg_pool().update_vgpr(dst.end);
    }
    true
}
