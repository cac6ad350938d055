// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Vector-ALU short-form encoders: VOP2, VOP1, VOPC, with promotion to
//! VOP3 and the SDWA/DPP extra-modifier words.

use crate::core::cursor::LineCursor;
use crate::core::expr::Expression;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::encoder::vop_mods::{parse_vop_modifiers, ExtraMods, ModParse, VopModifiers};
use crate::gcn::operand::{
    f16_bits, parse_operand, parse_sreg_range, parse_vreg_range, Operand, OpFlags, VopMods,
};
use crate::gcn::registry::{ArgMode, InsnDesc, LitType, SECONDARY_NONE};
use crate::gcn::regs::{ranges_can_alias, RegRange};
use crate::gcn::reloc::RelocKind;
use crate::gcn::usage::RegField;
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize, VopEnc};

pub(super) const VSRC_FLAGS: OpFlags = OpFlags::SREGS
    .union(OpFlags::VREGS)
    .union(OpFlags::SSOURCE)
    .union(OpFlags::SYMREG)
    .union(OpFlags::UNALIGNED)
    .union(OpFlags::READ);

/// Apply named per-operand modifier masks (`abs:[..]` style) to an operand.
pub(super) fn apply_named_mods(op: &mut Operand, mods: &VopModifiers, index: u8) {
    let bit = 1 << index;
    if mods.abs & bit != 0 {
        op.mods |= VopMods::ABS;
    }
    if mods.neg & bit != 0 {
        op.mods |= VopMods::NEG;
    }
    if mods.sext & bit != 0 {
        op.mods |= VopMods::SEXT;
    }
}

/// Count distinct scalar registers read; more than one is illegal in any
/// VOP form.
pub(super) fn count_sgpr_reads(ops: &[&RegRange]) -> usize {
    let mut seen: Vec<&RegRange> = Vec::new();
    for &range in ops {
        if !range.is_sgpr() || !range.is_set() {
            continue;
        }
        if !seen.iter().any(|&prev| ranges_can_alias(prev, range)) {
            seen.push(range);
        }
    }
    seen.len()
}

/// Validate SDWA/DPP applicability and merge the explicit suffix request.
#[allow(clippy::too_many_arguments)]
pub(super) fn check_vop_extra(
    ctx: &mut dyn AsmContext,
    at: LineCol,
    need_imm: bool,
    sext: bool,
    vop3: bool,
    vop_enc: VopEnc,
    src0: &Operand,
    extra: &mut ExtraMods,
) -> bool {
    match vop_enc {
        VopEnc::Sdwa => extra.need_sdwa = true,
        VopEnc::Dpp => extra.need_dpp = true,
        VopEnc::Normal => {}
    }
    if sext {
        extra.need_sdwa = true;
    }
    if !extra.need_sdwa && !extra.need_dpp {
        return true;
    }
    if !ctx.arch().is_gcn12() {
        ctx.error(at, "SDWA and DPP encodings need GCN 1.2 or later");
        return false;
    }
    if extra.need_sdwa && extra.need_dpp {
        ctx.error(at, "Both SDWA and DPP is illegal");
        return false;
    }
    if need_imm {
        ctx.error(at, "Literal with SDWA or DPP is illegal");
        return false;
    }
    if vop3 {
        ctx.error(at, "Mixing VOP3 with SDWA or DPP is illegal");
        return false;
    }
    if extra.need_dpp && !src0.range.is_vgpr() {
        ctx.error(at, "SRC0 must be a vector register with DPP");
        return false;
    }
    if extra.need_sdwa && !ctx.arch().is_gcn14() && !src0.range.is_vgpr() {
        ctx.error(at, "SRC0 must be a vector register with SDWA");
        return false;
    }
    true
}

/// The SDWA second word shared by VOP1 and VOP2.
pub(super) fn sdwa_word(
    src0: &Operand,
    src1: Option<&Operand>,
    mods: &VopModifiers,
    extra: &ExtraMods,
) -> u32 {
    let src1_mods = src1.map(|s| s.mods).unwrap_or_default();
    let src1_nonv = src1.map(|s| s.range.is_non_vgpr()).unwrap_or(false);
    (src0.range.field_value() & 0xff)
        | ((extra.dst_sel as u32) << 8)
        | ((extra.dst_unused as u32) << 11)
        | if mods.clamp { 0x2000 } else { 0 }
        | ((mods.omod as u32) << 14)
        | ((extra.src0_sel as u32) << 16)
        | if src0.mods.contains(VopMods::SEXT) { 1 << 19 } else { 0 }
        | if src0.mods.contains(VopMods::NEG) { 1 << 20 } else { 0 }
        | if src0.mods.contains(VopMods::ABS) { 1 << 21 } else { 0 }
        | if src0.range.is_non_vgpr() { 1 << 23 } else { 0 }
        | ((extra.src1_sel as u32) << 24)
        | if src1_mods.contains(VopMods::SEXT) { 1 << 27 } else { 0 }
        | if src1_mods.contains(VopMods::NEG) { 1 << 28 } else { 0 }
        | if src1_mods.contains(VopMods::ABS) { 1 << 29 } else { 0 }
        | if src1_nonv { 1 << 31 } else { 0 }
}

/// The DPP second word shared by all short VOP forms.
pub(super) fn dpp_word(src0: &Operand, src1: Option<&Operand>, mods: &VopModifiers, extra: &ExtraMods) -> u32 {
    let src1_mods = src1.map(|s| s.mods).unwrap_or_default();
    (src0.range.field_value() & 0xff)
        | ((extra.dpp_ctrl as u32) << 8)
        | if mods.bound_ctrl { 1 << 19 } else { 0 }
        | if src0.mods.contains(VopMods::NEG) { 1 << 20 } else { 0 }
        | if src0.mods.contains(VopMods::ABS) { 1 << 21 } else { 0 }
        | if src1_mods.contains(VopMods::NEG) { 1 << 22 } else { 0 }
        | if src1_mods.contains(VopMods::ABS) { 1 << 23 } else { 0 }
        | ((extra.bank_mask as u32) << 24)
        | ((extra.row_mask as u32) << 28)
}

/// The literal constant operand of `v_madmk`/`v_madak`.
fn parse_literal_imm(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    lit: LitType,
) -> Option<(u32, Option<Expression>)> {
    cur.skip_spaces();
    if lit != LitType::Int {
        let save = cur.pos;
        if let Some(value) = crate::gcn::operand::try_parse_float(cur) {
            let bits = match lit {
                LitType::F16 => f16_bits(value) as u32,
                _ => (value as f32).to_bits(),
            };
            return Some((bits, None));
        }
        cur.pos = save;
    }
    let at = cur.line_col();
    let expr = ctx.parse_expression(cur)?;
    match ctx.eval(&expr) {
        Ok(Some((value, section))) => {
            if section != crate::core::expr::SECT_ABS {
                ctx.error(at, "Relative value is illegal in literal expressions");
                return None;
            }
            Some((value as u32, None))
        }
        Ok(None) => Some((0, Some(expr))),
        Err(()) => None,
    }
}

/// Rewrite VOP usage field tags after a decision to use the long form.
fn rename_usage_for_vop3(ctx: &mut dyn AsmContext, slots: &[(usize, RegField)]) {
    for &(slot, field) in slots {
        if let Some(rvu) = ctx.usage().slot_mut(slot) {
            rvu.field = field;
        }
    }
}

fn update_vgpr_pool(ctx: &mut dyn AsmContext, range: &RegRange) {
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

pub fn encode_vop2(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
    vop_enc: VopEnc,
) -> bool {
    let gcn12 = ctx.arch().is_gcn12();
    let gcn14 = ctx.arch().is_gcn14();
    let mut good = true;
    let arg = desc.mode.arg;
    let have_dst_cc = matches!(arg, ArgMode::Ds2Vcc | ArgMode::DstVcc);
    let have_src_cc = matches!(arg, ArgMode::Ds2Vcc | ArgMode::Src2Vcc);
    let sgpr_in_src1 = matches!(arg, ArgMode::Ds1Sgpr | ArgMode::Src1Sgpr);

    ctx.usage().set_current(0);
    let dst_regs = if desc.mode.dst64 { 2 } else { 1 };
    let mut dst = RegRange::default();
    if arg == ArgMode::Ds1Sgpr {
        match parse_sreg_range(
            ctx,
            cur,
            dst_regs,
            Some(RegField::VopSdst),
            true,
            OpFlags::SYMREG | OpFlags::UNALIGNED | OpFlags::WRITE,
        ) {
            Some(r) => dst = r,
            None => good = false,
        }
    } else {
        let rw = if desc.mode.dst_read {
            OpFlags::READ | OpFlags::WRITE
        } else {
            OpFlags::WRITE
        };
        match parse_vreg_range(ctx, cur, dst_regs, Some(RegField::VopVdst), true, OpFlags::SYMREG | rw)
        {
            Some(r) => dst = r,
            None => good = false,
        }
    }
    let mut dst_cc = RegRange::default();
    if have_dst_cc {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        ctx.usage().set_current(1);
        match parse_sreg_range(
            ctx,
            cur,
            2,
            Some(RegField::Vop3Sdst1),
            true,
            OpFlags::SYMREG | OpFlags::UNALIGNED | OpFlags::WRITE,
        ) {
            Some(r) => dst_cc = r,
            None => good = false,
        }
    }
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    let op_mod_flags = if have_dst_cc && !gcn12 {
        OpFlags::VOP3NEG
    } else {
        OpFlags::VOP3MODS
    };
    ctx.usage().set_current(2);
    let src0_regs = if desc.mode.src0_64 { 2 } else { 1 };
    let mut src0 = match parse_operand(
        ctx,
        cur,
        src0_regs,
        VSRC_FLAGS | op_mod_flags | OpFlags::LDS,
        desc.mode.lit,
        Some(RegField::VopSrc0),
    ) {
        Some(op) => op,
        None => {
            good = false;
            Operand::default()
        }
    };
    let mut imm_value: u32 = 0;
    let mut imm_expr = None;
    if arg == ArgMode::Arg1Imm {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        match parse_literal_imm(ctx, cur, desc.mode.lit) {
            Some((v, e)) => {
                imm_value = v;
                imm_expr = e;
            }
            None => good = false,
        }
    }
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    ctx.usage().set_current(3);
    let src1_regs = if desc.mode.src1_64 { 2 } else { 1 };
    let mut src1_flags = VSRC_FLAGS | op_mod_flags;
    if !sgpr_in_src1 {
        src1_flags |= OpFlags::VREGS;
    } else {
        src1_flags &= !OpFlags::VREGS;
    }
    if src0.needs_literal() {
        src1_flags |= OpFlags::ONLY_INLINE;
    }
    let src1_field = if sgpr_in_src1 {
        RegField::VopSsrc1
    } else {
        RegField::VopVsrc1
    };
    let mut src1 = match parse_operand(ctx, cur, src1_regs, src1_flags, desc.mode.lit, Some(src1_field))
    {
        Some(op) => op,
        None => {
            good = false;
            Operand::default()
        }
    };
    if arg == ArgMode::Arg2Imm {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        match parse_literal_imm(ctx, cur, desc.mode.lit) {
            Some((v, e)) => {
                imm_value = v;
                imm_expr = e;
            }
            None => good = false,
        }
    }
    let mut src_cc = RegRange::default();
    if have_src_cc {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        ctx.usage().set_current(4);
        match parse_sreg_range(
            ctx,
            cur,
            2,
            Some(RegField::Vop3Ssrc),
            true,
            OpFlags::SYMREG | OpFlags::UNALIGNED | OpFlags::READ,
        ) {
            Some(r) => src_cc = r,
            None => good = false,
        }
    }
    // trailing modifiers
    let mut extra = ExtraMods::default();
    let mut accept = ModParse::WITH_SEXT;
    if !have_dst_cc || gcn12 {
        accept |= ModParse::WITH_CLAMP;
    }
    if gcn14 && !have_dst_cc {
        accept |= ModParse::WITH_OPSEL;
    }
    let mods = match parse_vop_modifiers(ctx, cur, 2, accept, gcn12.then_some(&mut extra)) {
        Some(m) => m,
        None => return false,
    };
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    apply_named_mods(&mut src0, &mods, 0);
    apply_named_mods(&mut src1, &mods, 1);
    let sext = (src0.mods | src1.mods).contains(VopMods::SEXT);
    extra.need_sdwa |= sext;

    let mut vop3 = ((!gcn14 || !extra.need_sdwa) && (src1.range.is_non_vgpr() ^ sgpr_in_src1))
        || (!gcn12 && (!src0.mods.is_empty() || !src1.mods.is_empty()))
        || mods.has_vop3_only(extra.need_sdwa, gcn14)
        || (have_dst_cc && !dst_cc.is_val(106))
        || (have_src_cc && !src_cc.is_val(106))
        || (mods.opsel & 15) != 0
        || enc_size == EncSize::Bit64;

    if (src0.needs_literal() || src1.needs_literal())
        && (src0.range.is_sgpr()
            || src0.range.is_val(124)
            || src1.range.is_sgpr()
            || src1.range.is_val(124))
    {
        ctx.error(at, "Literal with SGPR or M0 is illegal");
        return false;
    }
    if count_sgpr_reads(&[&src0.range, &src1.range, &src_cc]) >= 2 {
        ctx.error(at, "More than one SGPR to read in instruction");
        return false;
    }
    let need_imm = src0.needs_literal()
        || src1.needs_literal()
        || matches!(arg, ArgMode::Arg1Imm | ArgMode::Arg2Imm);

    if gcn12 && (extra.need_sdwa || extra.need_dpp || sext || vop_enc != VopEnc::Normal) {
        if !check_vop_extra(ctx, at, need_imm, sext, vop3, vop_enc, &src0, &mut extra) {
            return false;
        }
        rename_usage_for_vop3(ctx, &[(2, RegField::DppSdwaSrc0)]);
        if extra.need_sdwa && gcn14 {
            if src0.range.is_non_vgpr() {
                rename_usage_for_vop3(ctx, &[(2, RegField::DppSdwaSsrc0)]);
            }
            rename_usage_for_vop3(ctx, &[(3, RegField::VopSsrc1)]);
        }
    } else if gcn12 && (src0.mods | src1.mods).intersects(VopMods::NEG | VopMods::ABS) && !sext {
        vop3 = true;
    }
    if vop3 {
        let dst_field = if arg == ArgMode::Ds1Sgpr {
            RegField::Vop3Sdst0
        } else {
            RegField::Vop3Vdst
        };
        rename_usage_for_vop3(
            ctx,
            &[(0, dst_field), (2, RegField::Vop3Src0), (3, RegField::Vop3Src1)],
        );
    }
    if gcn12 && vop3 && have_dst_cc && (src0.mods | src1.mods).contains(VopMods::ABS) {
        ctx.error(at, "Abs modifier is illegal for VOP3B encoding");
        return false;
    }
    if vop3 && need_imm {
        ctx.error(at, "Literal in VOP3 encoding is illegal");
        return false;
    }
    if vop3 && desc.code2 == SECONDARY_NONE {
        ctx.error(at, "Instruction has no 64-bit encoding");
        return false;
    }

    let mut words = [0u32; 2];
    let mut n = 1;
    if !vop3 {
        let src0_out = if extra.need_sdwa {
            0xf9
        } else if extra.need_dpp {
            0xfa
        } else {
            src0.range.field_value()
        };
        words[0] = ((desc.code as u32) << 25)
            | src0_out
            | ((src1.range.field_value() & 0xff) << 9)
            | ((dst.field_value() & 0xff) << 17);
        if extra.need_sdwa {
            words[1] = sdwa_word(&src0, Some(&src1), &mods, &extra);
            n = 2;
        } else if extra.need_dpp {
            words[1] = dpp_word(&src0, Some(&src1), &mods, &extra);
            n = 2;
        } else if src0.needs_literal() {
            words[1] = src0.value;
            n = 2;
        } else if src1.needs_literal() {
            words[1] = src1.value;
            n = 2;
        } else if matches!(arg, ArgMode::Arg1Imm | ArgMode::Arg2Imm) {
            words[1] = imm_value;
            n = 2;
        }
    } else {
        let code = if gcn12 {
            ((desc.code2 as u32) << 16) | if mods.clamp { 0x8000 } else { 0 }
        } else {
            ((desc.code2 as u32) << 17) | if mods.clamp { 0x800 } else { 0 }
        };
        words[0] = 0xd000_0000 | code | (dst.field_value() & 0xff);
        if have_dst_cc {
            words[0] |= dst_cc.field_value() << 8;
        } else {
            words[0] |= if src0.mods.contains(VopMods::ABS) { 0x100 } else { 0 }
                | if src1.mods.contains(VopMods::ABS) { 0x200 } else { 0 }
                | ((mods.opsel as u32 & 15) << 11);
        }
        words[1] = src0.range.field_value()
            | (src1.range.field_value() << 9)
            | (src_cc.field_value() << 18)
            | ((mods.omod as u32) << 27)
            | if src0.mods.contains(VopMods::NEG) { 1 << 29 } else { 0 }
            | if src1.mods.contains(VopMods::NEG) { 1 << 30 } else { 0 };
        n = 2;
    }
    if !check_enc_size(ctx, at, enc_size, n) {
        return false;
    }
    let offset = ctx.out_pos();
    if let Some(expr) = src0.expr.take().or_else(|| src1.expr.take()).or(imm_expr) {
        ctx.attach(expr, RelocKind::LitImm, offset);
    }
    ctx.emit_words(&words[..n]);
    update_vgpr_pool(ctx, &dst);
    update_src_pool(ctx, &src0.range);
    update_src_pool(ctx, &src1.range);
    update_vgpr_pool(ctx, &dst_cc);
    update_src_pool(ctx, &src_cc);
    true
}

pub fn encode_vop1(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
    vop_enc: VopEnc,
) -> bool {
    let gcn12 = ctx.arch().is_gcn12();
    let gcn14 = ctx.arch().is_gcn14();
    let mut good = true;
    let has_args = desc.mode.arg != ArgMode::VopArgNone;
    let mut dst = RegRange::default();
    let mut src0 = Operand::default();
    if has_args {
        ctx.usage().set_current(0);
        let dst_regs = if desc.mode.dst64 { 2 } else { 1 };
        if desc.mode.arg == ArgMode::DstSgpr {
            match parse_sreg_range(
                ctx,
                cur,
                dst_regs,
                Some(RegField::VopSdst),
                true,
                OpFlags::SYMREG | OpFlags::UNALIGNED | OpFlags::WRITE,
            ) {
                Some(r) => dst = r,
                None => good = false,
            }
        } else {
            match parse_vreg_range(
                ctx,
                cur,
                dst_regs,
                Some(RegField::VopVdst),
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
        ctx.usage().set_current(1);
        let src_regs = if desc.mode.src0_64 { 2 } else { 1 };
        match parse_operand(
            ctx,
            cur,
            src_regs,
            VSRC_FLAGS | OpFlags::VOP3MODS | OpFlags::LDS,
            desc.mode.lit,
            Some(RegField::VopSrc0),
        ) {
            Some(op) => src0 = op,
            None => good = false,
        }
    }
    let mut extra = ExtraMods::default();
    let mut accept = ModParse::WITH_CLAMP | ModParse::WITH_SEXT;
    if gcn14 {
        accept |= ModParse::WITH_OPSEL;
    }
    let operands = if has_args { 1 } else { 0 };
    let mods = match parse_vop_modifiers(ctx, cur, operands, accept, gcn12.then_some(&mut extra)) {
        Some(m) => m,
        None => return false,
    };
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    apply_named_mods(&mut src0, &mods, 0);
    let sext = src0.mods.contains(VopMods::SEXT);
    extra.need_sdwa |= sext;
    let mut vop3 = (!gcn12 && !src0.mods.is_empty())
        || mods.has_vop3_only(extra.need_sdwa, gcn14)
        || (mods.opsel & 15) != 0
        || enc_size == EncSize::Bit64;
    let need_imm = src0.needs_literal();
    if gcn12 && (extra.need_sdwa || extra.need_dpp || sext || vop_enc != VopEnc::Normal) {
        if !check_vop_extra(ctx, at, need_imm, sext, vop3, vop_enc, &src0, &mut extra) {
            return false;
        }
        rename_usage_for_vop3(ctx, &[(1, RegField::DppSdwaSrc0)]);
        if extra.need_sdwa && gcn14 && src0.range.is_non_vgpr() {
            rename_usage_for_vop3(ctx, &[(1, RegField::DppSdwaSsrc0)]);
        }
    } else if gcn12 && src0.mods.intersects(VopMods::NEG | VopMods::ABS) && !sext {
        vop3 = true;
    }
    if vop3 {
        let dst_field = if desc.mode.arg == ArgMode::DstSgpr {
            RegField::Vop3Sdst0
        } else {
            RegField::Vop3Vdst
        };
        rename_usage_for_vop3(ctx, &[(0, dst_field), (1, RegField::Vop3Src0)]);
    }
    if vop3 && src0.needs_literal() {
        ctx.error(at, "Literal in VOP3 encoding is illegal");
        return false;
    }
    if vop3 && desc.code2 == SECONDARY_NONE {
        ctx.error(at, "Instruction has no 64-bit encoding");
        return false;
    }
    let mut words = [0u32; 2];
    let mut n = 1;
    if !vop3 {
        let src0_out = if extra.need_sdwa {
            0xf9
        } else if extra.need_dpp {
            0xfa
        } else {
            src0.range.field_value()
        };
        words[0] = 0x7e00_0000
            | ((desc.code as u32) << 9)
            | src0_out
            | ((dst.field_value() & 0xff) << 17);
        if extra.need_sdwa {
            words[1] = sdwa_word(&src0, None, &mods, &extra);
            n = 2;
        } else if extra.need_dpp {
            words[1] = dpp_word(&src0, None, &mods, &extra);
            n = 2;
        } else if src0.needs_literal() {
            words[1] = src0.value;
            n = 2;
        }
    } else {
        let code = if gcn12 {
            ((desc.code2 as u32) << 16) | if mods.clamp { 0x8000 } else { 0 }
        } else {
            ((desc.code2 as u32) << 17) | if mods.clamp { 0x800 } else { 0 }
        };
        words[0] = 0xd000_0000
            | code
            | (dst.field_value() & 0xff)
            | if src0.mods.contains(VopMods::ABS) { 0x100 } else { 0 }
            | ((mods.opsel as u32 & 15) << 11);
        words[1] = src0.range.field_value()
            | ((mods.omod as u32) << 27)
            | if src0.mods.contains(VopMods::NEG) { 1 << 29 } else { 0 };
        n = 2;
    }
    if !check_enc_size(ctx, at, enc_size, n) {
        return false;
    }
    let offset = ctx.out_pos();
    if let Some(expr) = src0.expr.take() {
        ctx.attach(expr, RelocKind::LitImm, offset);
    }
    ctx.emit_words(&words[..n]);
    update_vgpr_pool(ctx, &dst);
    update_src_pool(ctx, &src0.range);
    true
}

pub fn encode_vopc(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
    vop_enc: VopEnc,
) -> bool {
    let gcn12 = ctx.arch().is_gcn12();
    let gcn14 = ctx.arch().is_gcn14();
    let mut good = true;
    ctx.usage().set_current(0);
    let mut dst = RegRange::default();
    match parse_sreg_range(
        ctx,
        cur,
        2,
        Some(RegField::Vop3Sdst0),
        true,
        OpFlags::SYMREG | OpFlags::UNALIGNED | OpFlags::WRITE,
    ) {
        Some(r) => dst = r,
        None => good = false,
    }
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    ctx.usage().set_current(1);
    let src0_regs = if desc.mode.src0_64 { 2 } else { 1 };
    let mut src0 = match parse_operand(
        ctx,
        cur,
        src0_regs,
        VSRC_FLAGS | OpFlags::VOP3MODS | OpFlags::LDS,
        desc.mode.lit,
        Some(RegField::VopSrc0),
    ) {
        Some(op) => op,
        None => {
            good = false;
            Operand::default()
        }
    };
    if !skip_required_comma(ctx, cur) {
        return false;
    }
    ctx.usage().set_current(2);
    let src1_regs = if desc.mode.src1_64 { 2 } else { 1 };
    let mut src1_flags = VSRC_FLAGS | OpFlags::VOP3MODS;
    if src0.needs_literal() {
        src1_flags |= OpFlags::ONLY_INLINE;
    }
    let mut src1 = match parse_operand(
        ctx,
        cur,
        src1_regs,
        src1_flags,
        desc.mode.lit,
        Some(RegField::VopVsrc1),
    ) {
        Some(op) => op,
        None => {
            good = false;
            Operand::default()
        }
    };
    let mut extra = ExtraMods::default();
    let mut accept = ModParse::WITH_CLAMP | ModParse::WITH_SEXT;
    if gcn14 {
        accept |= ModParse::WITH_OPSEL | ModParse::NO_DST_MODS;
    }
    let mods = match parse_vop_modifiers(ctx, cur, 2, accept, gcn12.then_some(&mut extra)) {
        Some(m) => m,
        None => return false,
    };
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    apply_named_mods(&mut src0, &mods, 0);
    apply_named_mods(&mut src1, &mods, 1);
    let sext = (src0.mods | src1.mods).contains(VopMods::SEXT);
    extra.need_sdwa |= sext;
    let mut vop3 = ((!gcn14 || !extra.need_sdwa) && !dst.is_val(106))
        || ((!gcn14 || !extra.need_sdwa) && src1.range.is_non_vgpr())
        || (!gcn12 && (!src0.mods.is_empty() || !src1.mods.is_empty()))
        || mods.has_vop3_only(extra.need_sdwa, gcn14)
        || (mods.opsel & 15) != 0
        || enc_size == EncSize::Bit64;
    if (src0.needs_literal() || src1.needs_literal())
        && (src0.range.is_sgpr()
            || src0.range.is_val(124)
            || src1.range.is_sgpr()
            || src1.range.is_val(124))
    {
        ctx.error(at, "Literal with SGPR or M0 is illegal");
        return false;
    }
    if count_sgpr_reads(&[&src0.range, &src1.range]) >= 2 {
        ctx.error(at, "More than one SGPR to read in instruction");
        return false;
    }
    let need_imm = src0.needs_literal() || src1.needs_literal();
    if gcn12 && (extra.need_sdwa || extra.need_dpp || sext || vop_enc != VopEnc::Normal) {
        if !check_vop_extra(ctx, at, need_imm, sext, vop3, vop_enc, &src0, &mut extra) {
            return false;
        }
        rename_usage_for_vop3(ctx, &[(1, RegField::DppSdwaSrc0)]);
        if extra.need_sdwa && gcn14 {
            if src0.range.is_non_vgpr() {
                rename_usage_for_vop3(ctx, &[(1, RegField::DppSdwaSsrc0)]);
            }
            rename_usage_for_vop3(ctx, &[(2, RegField::VopSsrc1)]);
        }
    } else if gcn12 && (src0.mods | src1.mods).intersects(VopMods::NEG | VopMods::ABS) && !sext {
        vop3 = true;
    }
    if vop3 {
        rename_usage_for_vop3(ctx, &[(1, RegField::Vop3Src0), (2, RegField::Vop3Src1)]);
    }
    if vop3 && need_imm {
        ctx.error(at, "Literal in VOP3 encoding is illegal");
        return false;
    }
    if gcn14 && extra.need_sdwa && (mods.clamp || mods.omod != 0) {
        ctx.error(at, "Modifier CLAMP and OMOD is illegal in SDWAB");
        return false;
    }
    let mut words = [0u32; 2];
    let mut n = 1;
    if !vop3 {
        let src0_out = if extra.need_sdwa {
            0xf9
        } else if extra.need_dpp {
            0xfa
        } else {
            src0.range.field_value()
        };
        words[0] = 0x7c00_0000
            | ((desc.code as u32) << 17)
            | src0_out
            | ((src1.range.field_value() & 0xff) << 9);
        if extra.need_sdwa {
            // SDWAB: the scalar destination replaces dst_sel/dst_unused
            let dst_mods = if !gcn14 {
                ((extra.dst_sel as u32) << 8)
                    | ((extra.dst_unused as u32) << 11)
                    | if mods.clamp { 0x2000 } else { 0 }
                    | ((mods.omod as u32) << 14)
            } else {
                0
            };
            words[1] = (src0.range.field_value() & 0xff)
                | if gcn14 && !dst.is_val(106) {
                    (dst.field_value() | 0x80) << 8
                } else {
                    0
                }
                | ((extra.src0_sel as u32) << 16)
                | if src0.mods.contains(VopMods::SEXT) { 1 << 19 } else { 0 }
                | if src0.mods.contains(VopMods::NEG) { 1 << 20 } else { 0 }
                | if src0.mods.contains(VopMods::ABS) { 1 << 21 } else { 0 }
                | if src0.range.is_non_vgpr() { 1 << 23 } else { 0 }
                | ((extra.src1_sel as u32) << 24)
                | if src1.mods.contains(VopMods::SEXT) { 1 << 27 } else { 0 }
                | if src1.mods.contains(VopMods::NEG) { 1 << 28 } else { 0 }
                | if src1.mods.contains(VopMods::ABS) { 1 << 29 } else { 0 }
                | if src1.range.is_non_vgpr() { 1u32 << 31 } else { 0 }
                | dst_mods;
            n = 2;
        } else if extra.need_dpp {
            words[1] = dpp_word(&src0, Some(&src1), &mods, &extra);
            n = 2;
        } else if src0.needs_literal() {
            words[1] = src0.value;
            n = 2;
        } else if src1.needs_literal() {
            words[1] = src1.value;
            n = 2;
        }
    } else {
        let code = if gcn12 {
            ((desc.code2 as u32) << 16) | if mods.clamp { 0x8000 } else { 0 }
        } else {
            ((desc.code2 as u32) << 17) | if mods.clamp { 0x800 } else { 0 }
        };
        words[0] = 0xd000_0000
            | code
            | dst.field_value()
            | if src0.mods.contains(VopMods::ABS) { 0x100 } else { 0 }
            | if src1.mods.contains(VopMods::ABS) { 0x200 } else { 0 }
            | ((mods.opsel as u32 & 15) << 11);
        words[1] = src0.range.field_value()
            | (src1.range.field_value() << 9)
            | ((mods.omod as u32) << 27)
            | if src0.mods.contains(VopMods::NEG) { 1 << 29 } else { 0 }
            | if src1.mods.contains(VopMods::NEG) { 1 << 30 } else { 0 };
        n = 2;
    }
    if !check_enc_size(ctx, at, enc_size, n) {
        return false;
    }
    let offset = ctx.out_pos();
    if let Some(expr) = src0.expr.take().or_else(|| src1.expr.take()) {
        ctx.attach(expr, RelocKind::LitImm, offset);
    }
    ctx.emit_words(&words[..n]);
    update_vgpr_pool(ctx, &dst);
    update_src_pool(ctx, &src0.range);
    update_src_pool(ctx, &src1.range);
    true
}
