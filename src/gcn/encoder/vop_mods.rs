// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Trailing VOP modifier list: CLAMP/OMOD/OPSEL, per-operand abs/neg/sext
//! masks, and the SDWA/DPP extra-modifier fields.

use bitflags::bitflags;

use crate::core::cursor::LineCursor;
use crate::gcn::operand::{parse_imm, ImmKind};
use crate::gcn::AsmContext;

bitflags! {
    /// Which modifier groups the calling family accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModParse: u8 {
        const WITH_CLAMP = 1;
        const WITH_SEXT = 2;
        const WITH_OPSEL = 4;
        const VOP3P = 8;
        /// VOPC on Vega with SDWA: no dst_sel/dst_unused.
        const NO_DST_MODS = 16;
    }
}

/// Parsed instruction-level modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct VopModifiers {
    pub omod: u8,
    pub clamp: bool,
    pub bound_ctrl: bool,
    /// Explicit `vop3` modifier.
    pub force_vop3: bool,
    /// Bits 0..=3: OPSEL; bits 4..=6: OPSEL_HI (VOP3P).
    pub opsel: u8,
    pub abs: u8,
    pub neg: u8,
    pub sext: u8,
    /// VOP3P NEG_HI per-source mask.
    pub neg_hi: u8,
}

impl VopModifiers {
    /// Anything that forces the VOP3 form outside SDWA/DPP.
    pub fn has_vop3_only(&self, sdwa: bool, gcn14: bool) -> bool {
        let omod_counts = !(gcn14 && sdwa);
        (self.omod != 0 && omod_counts) || (self.clamp && !sdwa) || self.force_vop3
    }
}

/// SDWA/DPP extra-word fields with their hardware defaults.
#[derive(Debug, Clone, Copy)]
pub struct ExtraMods {
    pub need_sdwa: bool,
    pub need_dpp: bool,
    pub dst_sel: u8,
    pub dst_unused: u8,
    pub src0_sel: u8,
    pub src1_sel: u8,
    pub dpp_ctrl: u16,
    pub bank_mask: u8,
    pub row_mask: u8,
}

impl Default for ExtraMods {
    fn default() -> Self {
        Self {
            need_sdwa: false,
            need_dpp: false,
            dst_sel: 6,
            dst_unused: 0,
            src0_sel: 6,
            src1_sel: 6,
            dpp_ctrl: 0xe4,
            bank_mask: 0xf,
            row_mask: 0xf,
        }
    }
}

/// SDWA byte/word selector encodings.
fn parse_sel(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<u8> {
    if !cur.try_char(b':') {
        let at = cur.line_col();
        ctx.error(at, "Expected ':' before selector");
        return None;
    }
    cur.skip_spaces();
    let at = cur.line_col();
    if cur.try_char(b'@') {
        return parse_imm(ctx, cur, 3, ImmKind::Unsigned).map(|i| i.value as u8);
    }
    let name = cur.parse_name_lower().unwrap_or_default();
    let sel = match name.as_str() {
        "byte0" | "byte_0" | "b0" => 0,
        "byte1" | "byte_1" | "b1" => 1,
        "byte2" | "byte_2" | "b2" => 2,
        "byte3" | "byte_3" | "b3" => 3,
        "word0" | "word_0" | "w0" => 4,
        "word1" | "word_1" | "w1" => 5,
        "dword" | "dw" => 6,
        _ => {
            ctx.error(at, "Unknown SDWA selector");
            return None;
        }
    };
    Some(sel)
}

fn parse_dst_unused(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<u8> {
    if !cur.try_char(b':') {
        let at = cur.line_col();
        ctx.error(at, "Expected ':' before dst_unused value");
        return None;
    }
    cur.skip_spaces();
    let at = cur.line_col();
    let name = cur.parse_name_lower().unwrap_or_default();
    let key = name.strip_prefix("unused_").unwrap_or(&name);
    match key {
        "pad" => Some(0),
        "sext" => Some(1),
        "preserve" => Some(2),
        _ => {
            ctx.error(at, "Unknown dst_unused value");
            None
        }
    }
}

/// Parse `[b,b,...]` into an n-operand bit mask, or a raw value.
fn parse_mask(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    operands: u8,
) -> Option<u8> {
    if !cur.try_char(b':') {
        let at = cur.line_col();
        ctx.error(at, "Expected ':' before modifier mask");
        return None;
    }
    cur.skip_spaces();
    if cur.try_char(b'[') {
        let mut mask = 0u8;
        for i in 0..operands {
            cur.skip_spaces();
            let at = cur.line_col();
            let bit = parse_imm(ctx, cur, 1, ImmKind::Unsigned)?.value;
            if bit > 1 {
                ctx.warn(at, "Value out of range");
            }
            if bit & 1 != 0 {
                mask |= 1 << i;
            }
            if i + 1 < operands && !cur.try_char(b',') {
                break;
            }
        }
        if !cur.try_char(b']') {
            let at = cur.line_col();
            ctx.error(at, "Unterminated modifier mask");
            return None;
        }
        Some(mask)
    } else {
        cur.try_char(b'@');
        parse_imm(ctx, cur, 0, ImmKind::Unsigned).map(|i| i.value as u8)
    }
}

fn parse_dpp_arg(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>, bits: u8) -> Option<u16> {
    if !cur.try_char(b':') {
        let at = cur.line_col();
        ctx.error(at, "Expected ':' before DPP parameter");
        return None;
    }
    cur.skip_spaces();
    let at = cur.line_col();
    let value = parse_imm(ctx, cur, bits, ImmKind::Unsigned)?.value;
    if bits != 0 && value >= (1 << bits) {
        ctx.warn(at, "Value out of range");
    }
    Some(value as u16)
}

/// Parse the trailing modifier list. `operands` is the source-operand count
/// the abs/neg/sext arrays address. Returns `None` after a reported error.
pub fn parse_vop_modifiers(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    operands: u8,
    accept: ModParse,
    extra: Option<&mut ExtraMods>,
) -> Option<VopModifiers> {
    let mut mods = VopModifiers::default();
    if accept.contains(ModParse::VOP3P) {
        // OPSEL_HI defaults to all-ones on packed math
        mods.opsel = 7 << 4;
    }
    let mut have_extra = match extra {
        Some(e) => Some(e),
        None => None,
    };
    let mut good = true;
    while !cur.at_end() {
        let mod_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            ctx.error(mod_at, "Expected VOP modifier");
            return None;
        };
        match name.as_str() {
            "mul" => {
                if !cur.try_char(b':') {
                    ctx.error(mod_at, "Expected ':' before multiplier");
                    return None;
                }
                cur.skip_spaces();
                let at = cur.line_col();
                match parse_imm(ctx, cur, 0, ImmKind::Unsigned)?.value {
                    2 => mods.omod = 1,
                    4 => mods.omod = 2,
                    _ => {
                        ctx.error(at, "Only mul:2 and mul:4 are accepted");
                        good = false;
                    }
                }
            }
            "div" => {
                if !cur.try_char(b':') {
                    ctx.error(mod_at, "Expected ':' before divisor");
                    return None;
                }
                cur.skip_spaces();
                let at = cur.line_col();
                match parse_imm(ctx, cur, 0, ImmKind::Unsigned)?.value {
                    2 => mods.omod = 3,
                    _ => {
                        ctx.error(at, "Only div:2 is accepted");
                        good = false;
                    }
                }
            }
            "omod" => {
                mods.omod = (parse_dpp_arg(ctx, cur, 2)? & 3) as u8;
            }
            "clamp" if accept.contains(ModParse::WITH_CLAMP) => {
                mods.clamp = true;
            }
            "vop3" => {
                mods.force_vop3 = true;
            }
            "op_sel" | "opsel" if accept.contains(ModParse::WITH_OPSEL) => {
                let mask = parse_mask(ctx, cur, 4)?;
                mods.opsel = (mods.opsel & 0xf0) | (mask & 0xf);
            }
            "op_sel_hi" | "opsel_hi" if accept.contains(ModParse::VOP3P) => {
                let mask = parse_mask(ctx, cur, 3)?;
                mods.opsel = (mods.opsel & 0x0f) | ((mask & 7) << 4);
            }
            "abs" => {
                mods.abs |= parse_mask(ctx, cur, operands)?;
            }
            "neg" | "neg_lo" => {
                mods.neg |= parse_mask(ctx, cur, operands)?;
            }
            "neg_hi" if accept.contains(ModParse::VOP3P) => {
                mods.neg_hi |= parse_mask(ctx, cur, operands)?;
            }
            "sext" if accept.contains(ModParse::WITH_SEXT) => {
                mods.sext |= parse_mask(ctx, cur, operands)?;
            }
            // SDWA fields
            "dst_sel" if !accept.contains(ModParse::NO_DST_MODS) => {
                match have_extra.as_mut() {
                    Some(e) => {
                        e.dst_sel = parse_sel(ctx, cur)?;
                        e.need_sdwa = true;
                    }
                    None => {
                        ctx.error(mod_at, "SDWA is not supported by this architecture");
                        return None;
                    }
                }
            }
            "dst_unused" | "dst_un" if !accept.contains(ModParse::NO_DST_MODS) => {
                match have_extra.as_mut() {
                    Some(e) => {
                        e.dst_unused = parse_dst_unused(ctx, cur)?;
                        e.need_sdwa = true;
                    }
                    None => {
                        ctx.error(mod_at, "SDWA is not supported by this architecture");
                        return None;
                    }
                }
            }
            "src0_sel" => match have_extra.as_mut() {
                Some(e) => {
                    e.src0_sel = parse_sel(ctx, cur)?;
                    e.need_sdwa = true;
                }
                None => {
                    ctx.error(mod_at, "SDWA is not supported by this architecture");
                    return None;
                }
            },
            "src1_sel" => match have_extra.as_mut() {
                Some(e) => {
                    e.src1_sel = parse_sel(ctx, cur)?;
                    e.need_sdwa = true;
                }
                None => {
                    ctx.error(mod_at, "SDWA is not supported by this architecture");
                    return None;
                }
            },
            // DPP fields
            "quad_perm" => match have_extra.as_mut() {
                Some(e) => {
                    if !cur.try_char(b':') || !cur.try_char(b'[') {
                        ctx.error(mod_at, "Expected ':[' after quad_perm");
                        return None;
                    }
                    let mut ctrl = 0u16;
                    for i in 0..4 {
                        cur.skip_spaces();
                        let at = cur.line_col();
                        let lane = parse_imm(ctx, cur, 2, ImmKind::Unsigned)?.value;
                        if lane > 3 {
                            ctx.warn(at, "Value out of range");
                        }
                        ctrl |= ((lane & 3) as u16) << (2 * i);
                        if i < 3 && !cur.try_char(b',') {
                            ctx.error(mod_at, "Expected 4 quad_perm lanes");
                            return None;
                        }
                    }
                    if !cur.try_char(b']') {
                        ctx.error(mod_at, "Unterminated quad_perm");
                        return None;
                    }
                    e.dpp_ctrl = ctrl;
                    e.need_dpp = true;
                }
                None => {
                    ctx.error(mod_at, "DPP is not supported by this architecture");
                    return None;
                }
            },
            "row_shl" | "row_shr" | "row_ror" => match have_extra.as_mut() {
                Some(e) => {
                    let n = parse_dpp_arg(ctx, cur, 4)?;
                    e.dpp_ctrl = match name.as_str() {
                        "row_shl" => 0x100 | (n & 15),
                        "row_shr" => 0x110 | (n & 15),
                        _ => 0x120 | (n & 15),
                    };
                    e.need_dpp = true;
                }
                None => {
                    ctx.error(mod_at, "DPP is not supported by this architecture");
                    return None;
                }
            },
            "wave_shl" | "wave_rol" | "wave_shr" | "wave_ror" => {
                match have_extra.as_mut() {
                    Some(e) => {
                        // an optional `:1` is accepted and ignored
                        if cur.try_char(b':') {
                            let _ = parse_imm(ctx, cur, 1, ImmKind::Unsigned)?;
                        }
                        e.dpp_ctrl = match name.as_str() {
                            "wave_shl" => 0x130,
                            "wave_rol" => 0x134,
                            "wave_shr" => 0x138,
                            _ => 0x13c,
                        };
                        e.need_dpp = true;
                    }
                    None => {
                        ctx.error(mod_at, "DPP is not supported by this architecture");
                        return None;
                    }
                }
            }
            "row_mirror" | "row_half_mirror" | "row_bcast15" | "row_bcast31" => {
                match have_extra.as_mut() {
                    Some(e) => {
                        e.dpp_ctrl = match name.as_str() {
                            "row_mirror" => 0x140,
                            "row_half_mirror" => 0x141,
                            "row_bcast15" => 0x142,
                            _ => 0x143,
                        };
                        e.need_dpp = true;
                    }
                    None => {
                        ctx.error(mod_at, "DPP is not supported by this architecture");
                        return None;
                    }
                }
            }
            "row_bcast" => match have_extra.as_mut() {
                Some(e) => {
                    let n = parse_dpp_arg(ctx, cur, 0)?;
                    match n {
                        15 => e.dpp_ctrl = 0x142,
                        31 => e.dpp_ctrl = 0x143,
                        _ => {
                            ctx.error(mod_at, "Only row_bcast:15 and row_bcast:31 are accepted");
                            return None;
                        }
                    }
                    e.need_dpp = true;
                }
                None => {
                    ctx.error(mod_at, "DPP is not supported by this architecture");
                    return None;
                }
            },
            "bank_mask" => match have_extra.as_mut() {
                Some(e) => {
                    e.bank_mask = (parse_dpp_arg(ctx, cur, 4)? & 15) as u8;
                    e.need_dpp = true;
                }
                None => {
                    ctx.error(mod_at, "DPP is not supported by this architecture");
                    return None;
                }
            },
            "row_mask" => match have_extra.as_mut() {
                Some(e) => {
                    e.row_mask = (parse_dpp_arg(ctx, cur, 4)? & 15) as u8;
                    e.need_dpp = true;
                }
                None => {
                    ctx.error(mod_at, "DPP is not supported by this architecture");
                    return None;
                }
            },
            "bound_ctrl" => {
                if cur.try_char(b':') {
                    let _ = parse_imm(ctx, cur, 1, ImmKind::Unsigned)?;
                }
                mods.bound_ctrl = true;
                if let Some(e) = have_extra.as_mut() {
                    e.need_dpp = true;
                }
            }
            _ => {
                ctx.error(mod_at, "Unknown VOP modifier");
                good = false;
                // resynchronise on the next space-delimited token
                while let Some(c) = cur.peek() {
                    if c == b' ' {
                        break;
                    }
                    cur.bump();
                }
            }
        }
    }
    if good {
        Some(mods)
    } else {
        None
    }
}
