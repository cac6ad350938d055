// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! VOP3A/VOP3B encoder, including VOP3-encoded interpolation and the Vega
//! packed-math (VOP3P) block.

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::encoder::vop::{apply_named_mods, count_sgpr_reads, VSRC_FLAGS};
use crate::gcn::encoder::vop_mods::{parse_vop_modifiers, ModParse, VopModifiers};
use crate::gcn::operand::{
    parse_operand, parse_sreg_range, parse_vreg_range, Operand, OpFlags, VopMods,
};
use crate::gcn::registry::{ArgMode, Encoding, InsnDesc, SECONDARY_NONE};
use crate::gcn::regs::RegRange;
use crate::gcn::usage::RegField;
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize, VopEnc};

/// Parse `p10`/`p20`/`p0` for `v_interp_mov_f32`.
pub(super) fn parse_p0_p10_p20(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
) -> Option<RegRange> {
    cur.skip_spaces();
    let at = cur.line_col();
    let name = cur.parse_name_lower().unwrap_or_default();
    let value = match name.as_str() {
        "p10" => 0,
        "p20" => 1,
        "p0" => 2,
        _ => {
            ctx.error(at, "Expected p0, p10 or p20");
            return None;
        }
    };
    Some(RegRange::new(value, value + 1))
}

/// Parse `attrN.c` into the plain-VINTRP field layout `(attr << 2) | chan`.
pub(super) fn parse_vintrp_attr(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<u16> {
    cur.skip_spaces();
    let at = cur.line_col();
    let name = cur.parse_name_lower().unwrap_or_default();
    // the channel arrives inside the name because '.' is a name character
    let Some(rest) = name.strip_prefix("attr") else {
        ctx.error(at, "Expected 'attr' keyword");
        return None;
    };
    let (num_text, chan_text) = match rest.split_once('.') {
        Some(pair) => pair,
        None => {
            ctx.error(at, "Expected '.' in attribute");
            return None;
        }
    };
    let Ok(attr) = num_text.parse::<u16>() else {
        ctx.error(at, "Expected attribute number");
        return None;
    };
    if attr > 63 {
        ctx.error(at, "Attribute number out of range (0-63)");
        return None;
    }
    let chan = match chan_text {
        "x" => 0u16,
        "y" => 1,
        "z" => 2,
        "w" => 3,
        _ => {
            ctx.error(at, "Expected attribute channel");
            return None;
        }
    };
    Some((attr << 2) | chan)
}

fn update_dst_pool(ctx: &mut dyn AsmContext, range: &RegRange) {
    if range.is_set() && !range.is_var() {
        if range.is_vgpr() {
            ctx.reg_pool().update_vgpr(range.end);
        } else {
            let pool = ctx.reg_pool();
            pool.update_sgpr(range.end.saturating_sub(1));
            pool.update_flags(range.start);
        }
    }
}

fn update_src_pool(ctx: &mut dyn AsmContext, range: &RegRange) {
    if range.is_set() && !range.is_var() && range.start < 256 {
        ctx.reg_pool().update_flags(range.start);
    }
}

pub fn encode_vop3(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
    vop_enc: VopEnc,
) -> bool {
    if vop_enc != VopEnc::Normal {
        ctx.error(at, "DPP and SDWA encoding is illegal for VOP3");
        return false;
    }
    let gcn12 = ctx.arch().is_gcn12();
    let gcn14 = ctx.arch().is_gcn14();
    let vop3b = desc.encoding == Encoding::Vop3B;
    let vop3p = desc.mode.vop3p;
    let vintrp = desc.mode.vintrp_vop3;
    let is128 = desc.mode.dsize == 4 && !vintrp;
    let arg = desc.mode.arg;
    let mut good = true;

    let src_mod_flags = if vop3b {
        OpFlags::VOP3NEG
    } else {
        OpFlags::VOP3MODS | OpFlags::NOSEXT
    };
    let src_flags = VSRC_FLAGS
        | src_mod_flags
        | OpFlags::ONLY_INLINE
        | OpFlags::NO_LIT_ERROR;

    let mut dst = RegRange::default();
    let mut sdst = RegRange::default();
    let mut src0 = Operand::default();
    let mut src1 = Operand::default();
    let mut src2 = Operand::default();
    let mut mods = VopModifiers::default();
    let mut mod_high = false;

    // the lane-access ops keep an SGPR destination and only two sources
    let dst_sgpr = matches!(arg, ArgMode::DstSgpr | ArgMode::Ds1Sgpr);
    let two_srcs = matches!(
        arg,
        ArgMode::Src2None
            | ArgMode::DstVcc
            | ArgMode::DstSgpr
            | ArgMode::Ds1Sgpr
            | ArgMode::Src1Sgpr
    );
    if arg != ArgMode::VopArgNone {
        ctx.usage().set_current(0);
        if dst_sgpr {
            let regs = if desc.mode.dst64 { 2 } else { 1 };
            match parse_sreg_range(
                ctx,
                cur,
                regs,
                Some(RegField::Vop3Sdst0),
                true,
                OpFlags::SYMREG | OpFlags::UNALIGNED | OpFlags::WRITE,
            ) {
                Some(r) => dst = r,
                None => good = false,
            }
        } else {
            let regs = if is128 {
                4
            } else if desc.mode.dst64 {
                2
            } else {
                1
            };
            match parse_vreg_range(
                ctx,
                cur,
                regs,
                Some(RegField::Vop3Vdst),
                true,
                OpFlags::SYMREG | OpFlags::WRITE,
            ) {
                Some(r) => dst = r,
                None => good = false,
            }
        }
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        if vop3b {
            ctx.usage().set_current(1);
            match parse_sreg_range(
                ctx,
                cur,
                2,
                Some(RegField::Vop3Sdst1),
                true,
                OpFlags::SYMREG | OpFlags::UNALIGNED | OpFlags::WRITE,
            ) {
                Some(r) => sdst = r,
                None => good = false,
            }
            if !skip_required_comma(ctx, cur) {
                return false;
            }
        }
        if !vintrp {
            ctx.usage().set_current(2);
            let regs = if desc.mode.src0_64 { 2 } else { 1 };
            match parse_operand(ctx, cur, regs, src_flags | OpFlags::LDS, desc.mode.lit, Some(RegField::Vop3Src0)) {
                Some(op) => src0 = op,
                None => good = false,
            }
            if arg != ArgMode::Src12None {
                if !skip_required_comma(ctx, cur) {
                    return false;
                }
                ctx.usage().set_current(3);
                let regs = if desc.mode.src1_64 { 2 } else { 1 };
                match parse_operand(ctx, cur, regs, src_flags, desc.mode.lit, Some(RegField::Vop3Src1)) {
                    Some(op) => src1 = op,
                    None => good = false,
                }
                if !two_srcs {
                    if !skip_required_comma(ctx, cur) {
                        return false;
                    }
                    ctx.usage().set_current(4);
                    let regs = if is128 {
                        4
                    } else if desc.mode.src2_64 {
                        2
                    } else {
                        1
                    };
                    match parse_operand(ctx, cur, regs, src_flags, desc.mode.lit, Some(RegField::Vop3Src2)) {
                        Some(op) => src2 = op,
                        None => good = false,
                    }
                }
            }
        } else {
            // interpolation source then attribute
            ctx.usage().set_current(3);
            if arg == ArgMode::P0P10P20 {
                match parse_p0_p10_p20(ctx, cur) {
                    Some(r) => src1.range = r,
                    None => good = false,
                }
            } else {
                match parse_vreg_range(
                    ctx,
                    cur,
                    1,
                    Some(RegField::Vop3Src1),
                    true,
                    OpFlags::SYMREG | OpFlags::READ,
                ) {
                    Some(r) => src1.range = r,
                    None => good = false,
                }
            }
            if !skip_required_comma(ctx, cur) {
                return false;
            }
            match parse_vintrp_attr(ctx, cur) {
                Some(raw) => {
                    // VOP3 stores the attribute as (chan << 6) | attr
                    let attr = ((raw & 3) << 6) | ((raw & 0xfc) >> 2);
                    src0.range = RegRange::new(attr, attr + 1);
                }
                None => good = false,
            }
            if arg == ArgMode::VintrpSrc2 {
                if !skip_required_comma(ctx, cur) {
                    return false;
                }
                ctx.usage().set_current(4);
                match parse_operand(
                    ctx,
                    cur,
                    1,
                    OpFlags::VREGS
                        | OpFlags::SREGS
                        | OpFlags::SYMREG
                        | OpFlags::UNALIGNED
                        | OpFlags::READ
                        | src_mod_flags,
                    desc.mode.lit,
                    Some(RegField::Vop3Src2),
                ) {
                    Some(op) => src2 = op,
                    None => good = false,
                }
            }
            // interpolation modifier list: high, vop3, clamp, omod, op_sel
            while !cur.at_end() {
                let mod_at = cur.line_col();
                let Some(name) = cur.parse_name_lower() else {
                    ctx.error(mod_at, "Expected VINTRP modifier");
                    return false;
                };
                match name.as_str() {
                    "high" => mod_high = true,
                    "vop3" => mods.force_vop3 = true,
                    "clamp" => mods.clamp = true,
                    "mul" => {
                        if !cur.try_char(b':') {
                            ctx.error(mod_at, "Expected ':' before multiplier");
                            return false;
                        }
                        match crate::gcn::operand::parse_imm(
                            ctx,
                            cur,
                            0,
                            crate::gcn::operand::ImmKind::Unsigned,
                        ) {
                            Some(v) if v.value == 2 => mods.omod = 1,
                            Some(v) if v.value == 4 => mods.omod = 2,
                            _ => {
                                ctx.error(mod_at, "Only mul:2 and mul:4 are accepted");
                                return false;
                            }
                        }
                    }
                    "div" => {
                        if !cur.try_char(b':') {
                            ctx.error(mod_at, "Expected ':' before divisor");
                            return false;
                        }
                        match crate::gcn::operand::parse_imm(
                            ctx,
                            cur,
                            0,
                            crate::gcn::operand::ImmKind::Unsigned,
                        ) {
                            Some(v) if v.value == 2 => mods.omod = 3,
                            _ => {
                                ctx.error(mod_at, "Only div:2 is accepted");
                                return false;
                            }
                        }
                    }
                    _ => {
                        ctx.error(mod_at, "Unknown VINTRP modifier");
                        return false;
                    }
                }
            }
            if mod_high {
                src0.range.start |= 0x100;
                src0.range.end = src0.range.start + 1;
            }
        }
    }
    if !vintrp {
        let mut accept = ModParse::empty();
        if gcn12 || !vop3b {
            accept |= ModParse::WITH_CLAMP;
        }
        if gcn14 && !vop3b {
            accept |= ModParse::WITH_OPSEL;
        }
        if vop3p {
            accept |= ModParse::VOP3P | ModParse::WITH_OPSEL;
        }
        mods = match parse_vop_modifiers(ctx, cur, 3, accept, None) {
            Some(m) => m,
            None => return false,
        };
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if !vintrp {
        apply_named_mods(&mut src0, &mods, 0);
        apply_named_mods(&mut src1, &mods, 1);
        apply_named_mods(&mut src2, &mods, 2);
        src2.mods &= !VopMods::SEXT;
        if count_sgpr_reads(&[&src0.range, &src1.range, &src2.range]) >= 2 {
            ctx.error(at, "More than one SGPR to read in instruction");
            return false;
        }
    }

    let mut words = [0u32; 2];
    let mut n = 2;
    if vop3b {
        if !gcn12 {
            words[0] = 0xd000_0000
                | ((desc.code as u32) << 17)
                | (dst.field_value() & 0xff)
                | (sdst.field_value() << 8);
        } else {
            words[0] = 0xd000_0000
                | ((desc.code as u32) << 16)
                | (dst.field_value() & 0xff)
                | (sdst.field_value() << 8)
                | if mods.clamp { 0x8000 } else { 0 };
        }
    } else if !gcn12 {
        words[0] = 0xd000_0000
            | ((desc.code as u32) << 17)
            | (dst.field_value() & 0xff)
            | if mods.clamp { 0x800 } else { 0 }
            | if src0.mods.contains(VopMods::ABS) { 0x100 } else { 0 }
            | if src1.mods.contains(VopMods::ABS) { 0x200 } else { 0 }
            | if src2.mods.contains(VopMods::ABS) { 0x400 } else { 0 };
    } else {
        // the plain VINTRP word serves unless something needs the long form
        let need_full = !vintrp
            || desc.code2 == SECONDARY_NONE
            || arg == ArgMode::VintrpSrc2
            || mods.force_vop3
            || (src0.range.field_value() & 0x100) != 0
            || mods.clamp
            || mods.omod != 0
            || mods.opsel != 0 && !vop3p
            || !src1.mods.is_empty()
            || !src2.mods.is_empty();
        if need_full {
            let hi_bits = if vop3p {
                ((mods.neg_hi as u32) & 7) << 8
            } else {
                (if src0.mods.contains(VopMods::ABS) { 0x100 } else { 0 })
                    | if src1.mods.contains(VopMods::ABS) { 0x200 } else { 0 }
                    | if src2.mods.contains(VopMods::ABS) { 0x400 } else { 0 }
            };
            words[0] = 0xd000_0000
                | ((desc.code as u32) << 16)
                | (dst.field_value() & 0xff)
                | if mods.clamp { 0x8000 } else { 0 }
                | hi_bits
                | if mods.opsel & 0x40 != 0 { 0x4000 } else { 0 }
                | ((mods.opsel as u32 & 15) << 11);
        } else {
            words[0] = 0xd400_0000
                | (src1.range.field_value() & 0xff)
                | ((src0.range.field_value() >> 6) << 8)
                | ((src0.range.field_value() & 63) << 10)
                | ((desc.code2 as u32) << 16)
                | ((dst.field_value() & 0xff) << 18);
            n = 1;
        }
    }
    if n == 2 {
        let hi27 = if vop3p {
            ((mods.opsel as u32 >> 4) & 3) << 27
        } else {
            (mods.omod as u32) << 27
        };
        words[1] = src0.range.field_value()
            | (src1.range.field_value() << 9)
            | (src2.range.field_value() << 18)
            | hi27
            | if src0.mods.contains(VopMods::NEG) { 1 << 29 } else { 0 }
            | if src1.mods.contains(VopMods::NEG) { 1 << 30 } else { 0 }
            | if src2.mods.contains(VopMods::NEG) { 1u32 << 31 } else { 0 };
    }
    if !check_enc_size(ctx, at, enc_size, n) {
        return false;
    }
    ctx.emit_words(&words[..n]);
    update_dst_pool(ctx, &dst);
    update_dst_pool(ctx, &sdst);
    if !vintrp {
        update_src_pool(ctx, &src0.range);
        update_src_pool(ctx, &src1.range);
    }
    update_src_pool(ctx, &src2.range);
    true
}
