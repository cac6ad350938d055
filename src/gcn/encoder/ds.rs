// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! DS (local/global data share) encoder.

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::operand::{parse_imm, parse_vreg_range, ImmKind, OpFlags};
use crate::gcn::registry::{ArgMode, InsnDesc};
use crate::gcn::regs::RegRange;
use crate::gcn::reloc::RelocKind;
use crate::gcn::usage::RegField;
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize};

struct DsShape {
    vdst: bool,
    addr: bool,
    srcs: u8,
}

fn shape(arg: ArgMode) -> DsShape {
    match arg {
        ArgMode::DsDstAddr => DsShape { vdst: true, addr: true, srcs: 0 },
        ArgMode::DsAddrSrc => DsShape { vdst: false, addr: true, srcs: 1 },
        ArgMode::DsAddr2Src => DsShape { vdst: false, addr: true, srcs: 2 },
        ArgMode::DsDstAddrSrc => DsShape { vdst: true, addr: true, srcs: 1 },
        ArgMode::DsDstAddr2Src => DsShape { vdst: true, addr: true, srcs: 2 },
        ArgMode::DsOnlyDst => DsShape { vdst: true, addr: false, srcs: 0 },
        ArgMode::DsOnlySrc0 => DsShape { vdst: false, addr: false, srcs: 1 },
        _ => DsShape { vdst: false, addr: false, srcs: 0 },
    }
}

pub fn encode_ds(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit32 {
        ctx.error(at, "Only 64-bit size for DS encoding");
        return false;
    }
    let gcn12 = ctx.arch().is_gcn12();
    let mut good = true;
    let shape = shape(desc.mode.arg);
    let data_regs = desc.mode.dsize.max(1) as u16;
    let mut vdst = RegRange::default();
    let mut addr = RegRange::default();
    let mut data0 = RegRange::default();
    let mut data1 = RegRange::default();
    let mut before_data = false;
    if shape.vdst {
        ctx.usage().set_current(0);
        // the two-offset read/exchange forms return two values
        let vdst_regs = if desc.mode.two_offsets {
            data_regs * 2
        } else {
            data_regs
        };
        match parse_vreg_range(
            ctx,
            cur,
            vdst_regs,
            Some(RegField::DsVdst),
            true,
            OpFlags::SYMREG | OpFlags::WRITE,
        ) {
            Some(r) => vdst = r,
            None => good = false,
        }
        before_data = true;
    }
    if shape.addr {
        if before_data && !skip_required_comma(ctx, cur) {
            return false;
        }
        ctx.usage().set_current(1);
        match parse_vreg_range(
            ctx,
            cur,
            1,
            Some(RegField::DsAddr),
            true,
            OpFlags::SYMREG | OpFlags::READ,
        ) {
            Some(r) => addr = r,
            None => good = false,
        }
        before_data = true;
    }
    if shape.srcs >= 1 {
        if before_data && !skip_required_comma(ctx, cur) {
            return false;
        }
        ctx.usage().set_current(2);
        match parse_vreg_range(
            ctx,
            cur,
            data_regs,
            Some(RegField::DsData0),
            true,
            OpFlags::SYMREG | OpFlags::READ,
        ) {
            Some(r) => data0 = r,
            None => good = false,
        }
        if shape.srcs == 2 {
            if !skip_required_comma(ctx, cur) {
                return false;
            }
            ctx.usage().set_current(3);
            match parse_vreg_range(
                ctx,
                cur,
                data_regs,
                Some(RegField::DsData1),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => data1 = r,
                None => good = false,
            }
        }
    }
    // modifiers
    let mut have_gds = false;
    let mut have_offset = false;
    let mut have_offset2 = false;
    let mut offset: u16 = 0;
    let mut offset1: u8 = 0;
    let mut offset2: u8 = 0;
    let mut offset_expr = None;
    let mut offset2_expr = None;
    while !cur.at_end() {
        let mod_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            ctx.error(mod_at, "Expected DS modifier");
            return false;
        };
        match name.as_str() {
            "gds" => have_gds = true,
            "offset" if !desc.mode.two_offsets => {
                if !cur.try_char(b':') {
                    ctx.error(mod_at, "Expected ':' before offset");
                    good = false;
                    continue;
                }
                match parse_imm(ctx, cur, 16, ImmKind::Unsigned) {
                    Some(imm) => {
                        if have_offset {
                            ctx.warn(mod_at, "Offset is already defined");
                        }
                        have_offset = true;
                        offset = imm.value as u16;
                        offset_expr = imm.expr;
                    }
                    None => good = false,
                }
            }
            "offset0" if desc.mode.two_offsets => {
                if !cur.try_char(b':') {
                    ctx.error(mod_at, "Expected ':' before offset");
                    good = false;
                    continue;
                }
                match parse_imm(ctx, cur, 8, ImmKind::Unsigned) {
                    Some(imm) => {
                        if have_offset {
                            ctx.warn(mod_at, "Offset0 is already defined");
                        }
                        have_offset = true;
                        offset1 = imm.value as u8;
                        offset_expr = imm.expr;
                    }
                    None => good = false,
                }
            }
            "offset1" if desc.mode.two_offsets => {
                if !cur.try_char(b':') {
                    ctx.error(mod_at, "Expected ':' before offset");
                    good = false;
                    continue;
                }
                match parse_imm(ctx, cur, 8, ImmKind::Unsigned) {
                    Some(imm) => {
                        if have_offset2 {
                            ctx.warn(mod_at, "Offset1 is already defined");
                        }
                        have_offset2 = true;
                        offset2 = imm.value as u8;
                        offset2_expr = imm.expr;
                    }
                    None => good = false,
                }
            }
            _ => {
                let expected = if desc.mode.two_offsets {
                    "Expected 'offset', 'offset0' or 'offset1'"
                } else {
                    "Expected 'offset'"
                };
                ctx.error(mod_at, expected);
                good = false;
            }
        }
    }
    if desc.mode.two_offsets {
        offset = offset1 as u16 | ((offset2 as u16) << 8);
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if desc.mode.gds_only && !have_gds {
        ctx.error(at, "Instruction requires GDS modifier");
        return false;
    }
    let offset_pos = ctx.out_pos();
    if let Some(expr) = offset_expr {
        let kind = if desc.mode.two_offsets {
            RelocKind::DsOffset8_0
        } else {
            RelocKind::DsOffset16
        };
        ctx.attach(expr, kind, offset_pos);
    }
    if let Some(expr) = offset2_expr {
        ctx.attach(expr, RelocKind::DsOffset8_1, offset_pos);
    }
    let words = [
        if !gcn12 {
            0xd800_0000u32
                | offset as u32
                | if have_gds { 0x2_0000 } else { 0 }
                | ((desc.code as u32) << 18)
        } else {
            0xd800_0000u32
                | offset as u32
                | if have_gds { 0x1_0000 } else { 0 }
                | ((desc.code as u32) << 17)
        },
        (addr.field_value() & 0xff)
            | ((data0.field_value() & 0xff) << 8)
            | ((data1.field_value() & 0xff) << 16)
            | ((vdst.field_value() & 0xff) << 24),
    ];
    if !check_enc_size(ctx, at, enc_size, 2) {
        return false;
    }
    ctx.emit_words(&words);
    if vdst.is_set() && !vdst.is_var() {
        ctx.reg_pool().update_vgpr(vdst.end);
    }
    true
}
