// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Per-family instruction formatters.

use std::fmt::Write;

use crate::gcn::arch::Arch;
use crate::gcn::registry::{ArgMode, Encoding, FlatMode, InsnDesc, LitType};

pub(super) struct FmtCtx {
    pub arch: Arch,
    pub float_lits: bool,
    pub desc: &'static InsnDesc,
    pub insn: u32,
    pub second: u32,
    pub pos: usize,
}

impl FmtCtx {
    fn gcn12(&self) -> bool {
        self.arch.is_gcn12()
    }

    fn gcn14(&self) -> bool {
        self.arch.is_gcn14()
    }

    /// Float-literal comments apply to 32-bit float operands only.
    fn float_comment(&self) -> bool {
        self.float_lits && self.desc.mode.lit == LitType::Float && !self.desc.mode.src0_64
    }
}

fn mnemonic_head(out: &mut String, mnemonic: &str, has_operands: bool) {
    if has_operands {
        let _ = write!(out, "        {:<15} ", mnemonic);
    } else {
        let _ = write!(out, "        {}", mnemonic);
    }
}

const FLOAT_NAMES: [&str; 8] = ["0.5", "-0.5", "1.0", "-1.0", "2.0", "-2.0", "4.0", "-4.0"];

fn reg_block(prefix: char, base: u32, count: u16) -> String {
    if count == 1 {
        format!("{}{}", prefix, base)
    } else {
        format!("{}[{}:{}]", prefix, base, base + count as u32 - 1)
    }
}

fn named_pair(name: &str, offset: u32, count: u16) -> String {
    match (offset, count) {
        (0, 2) => name.to_string(),
        (0, _) => format!("{}_lo", name),
        _ => format!("{}_hi", name),
    }
}

/// Render one operand field value the way the assembler spells it.
pub fn format_operand(op: u32, count: u16, literal: u32, float_comment: bool) -> String {
    if op < 104 {
        return reg_block('s', op, count);
    }
    if (256..512).contains(&op) {
        return reg_block('v', op - 256, count);
    }
    match op {
        106 | 107 => named_pair("vcc", op - 106, count),
        108 | 109 => named_pair("tba", op - 108, count),
        110 | 111 => named_pair("tma", op - 110, count),
        112..=123 => format!("ttmp{}", op - 112),
        124 => "m0".to_string(),
        126 | 127 => named_pair("exec", op - 126, count),
        128..=192 => format!("{}", op - 128),
        193..=208 => format!("-{}", op - 192),
        240..=247 => FLOAT_NAMES[(op - 240) as usize].to_string(),
        248 => "0.15915494".to_string(),
        251 => "vccz".to_string(),
        252 => "execz".to_string(),
        253 => "scc".to_string(),
        254 => "lds".to_string(),
        255 => {
            if float_comment {
                format!("{:#x} /* {:?}f */", literal, f32::from_bits(literal))
            } else {
                format!("{:#x}", literal)
            }
        }
        _ => format!("ill_{}", op),
    }
}

fn jump_label(pos: usize, imm16: u32) -> String {
    let target = pos as i64 + (imm16 as u16 as i16) as i64 + 1;
    format!(".L{}", target)
}

pub(super) fn format_sop2(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let src0 = ctx.insn & 0xff;
    let src1 = (ctx.insn >> 8) & 0xff;
    let sdst = (ctx.insn >> 16) & 0x7f;
    let s0c = if desc.mode.src0_64 { 2 } else { 1 };
    let s1c = if desc.mode.src1_64 { 2 } else { 1 };
    if desc.mode.arg != ArgMode::RegS1Jmp {
        let dc = if desc.mode.dst64 { 2 } else { 1 };
        let _ = write!(out, "{}, ", format_operand(sdst, dc, 0, false));
    }
    let _ = write!(
        out,
        "{}, {}",
        format_operand(src0, s0c, ctx.second, ctx.float_comment()),
        format_operand(src1, s1c, ctx.second, ctx.float_comment())
    );
    if desc.mode.arg == ArgMode::RegS1Jmp && sdst != 0 {
        let _ = write!(out, " sdst={:#x}", sdst);
    }
    out.push('\n');
}

pub(super) fn format_sop1(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    let src0 = ctx.insn & 0xff;
    let sdst = (ctx.insn >> 16) & 0x7f;
    let has_dst = matches!(desc.mode.arg, ArgMode::Std | ArgMode::DstOnly);
    let has_src = matches!(desc.mode.arg, ArgMode::Std | ArgMode::SrcOnly);
    mnemonic_head(out, &desc.mnemonic, has_dst || has_src);
    let mut first = true;
    if has_dst {
        let dc = if desc.mode.dst64 { 2 } else { 1 };
        let _ = write!(out, "{}", format_operand(sdst, dc, 0, false));
        first = false;
    }
    if has_src {
        if !first {
            out.push_str(", ");
        }
        let sc = if desc.mode.src0_64 { 2 } else { 1 };
        let _ = write!(
            out,
            "{}",
            format_operand(src0, sc, ctx.second, ctx.float_comment())
        );
    }
    out.push('\n');
}

pub(super) fn format_sopc(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let src0 = ctx.insn & 0xff;
    let src1 = (ctx.insn >> 8) & 0xff;
    let s0c = if desc.mode.src0_64 { 2 } else { 1 };
    let s1c = if desc.mode.src1_64 { 2 } else { 1 };
    let _ = write!(
        out,
        "{}, ",
        format_operand(src0, s0c, ctx.second, ctx.float_comment())
    );
    if desc.mode.arg == ArgMode::Src1Imm {
        let _ = write!(out, "{:#x}", src1);
    } else {
        let _ = write!(
            out,
            "{}",
            format_operand(src1, s1c, ctx.second, ctx.float_comment())
        );
    }
    out.push('\n');
}

// hwreg id -> canonical name (the Vega names extend the shared table)
fn hwreg_name(id: u32, gcn14: bool) -> Option<&'static str> {
    Some(match id {
        1 => "mode",
        2 => "status",
        3 => "trapsts",
        4 => "hw_id",
        5 => "gpr_alloc",
        6 => "lds_alloc",
        7 => "ib_sts",
        8 => "pc_lo",
        9 => "pc_hi",
        10 => "inst_dw0",
        11 => "inst_dw1",
        12 => "ib_dbg0",
        13 => "ib_dbg1",
        14 if gcn14 => "flush_ib",
        15 if gcn14 => "sh_mem_bases",
        16 if gcn14 => "sq_shader_tba_lo",
        17 if gcn14 => "sq_shader_tba_hi",
        18 if gcn14 => "sq_shader_tma_lo",
        19 if gcn14 => "sq_shader_tma_hi",
        _ => return None,
    })
}

fn write_hwreg(out: &mut String, imm16: u32, gcn14: bool) {
    let id = imm16 & 0x3f;
    let offset = (imm16 >> 6) & 31;
    let size = ((imm16 >> 11) & 31) + 1;
    match hwreg_name(id, gcn14) {
        Some(name) => {
            let _ = write!(out, "hwreg({}, {}, {})", name, offset, size);
        }
        None => {
            let _ = write!(out, "hwreg(@{}, {}, {})", id, offset, size);
        }
    }
}

pub(super) fn format_sopk(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let imm16 = ctx.insn & 0xffff;
    let sdst = (ctx.insn >> 16) & 0x7f;
    let dc = if desc.mode.dst64 { 2 } else { 1 };
    if !desc.mode.imm_dst {
        let _ = write!(out, "{}, ", format_operand(sdst, dc, 0, false));
    }
    match desc.mode.arg {
        ArgMode::ImmRel => {
            let _ = write!(out, "{}", jump_label(ctx.pos, imm16));
        }
        ArgMode::ImmSreg => write_hwreg(out, imm16, ctx.gcn14()),
        _ => {
            let _ = write!(out, "{:#x}", imm16);
        }
    }
    if desc.mode.imm_dst {
        if desc.mode.sopk_const {
            let _ = write!(out, ", {:#x}", ctx.second);
        } else {
            let _ = write!(out, ", {}", format_operand(sdst, dc, 0, false));
        }
    }
    out.push('\n');
}

const MSG_NAMES: [&str; 16] = [
    "@0", "interrupt", "gs", "gs_done", "savewave", "stall_wave_gen", "halt_waves",
    "ordered_ps_done", "early_prim_dealloc", "gs_alloc_req", "get_doorbell", "@11", "@12", "@13",
    "@14", "sysmsg",
];
const GSOP_NAMES: [&str; 4] = ["nop", "cut", "emit", "emit_cut"];

fn write_sendmsg(out: &mut String, imm16: u32, gcn14: bool) {
    let msg = imm16 & 15;
    let gsop = (imm16 >> 4) & 3;
    let stream = (imm16 >> 8) & 3;
    let mut known = matches!(msg, 1..=4 | 15);
    if gcn14 {
        known |= matches!(msg, 5..=10);
    }
    out.push_str("sendmsg(");
    if known {
        out.push_str(MSG_NAMES[msg as usize]);
    } else {
        let _ = write!(out, "@{}", msg);
    }
    let mut ill_mask = 0xfff0u32;
    if msg == 2 || msg == 3 {
        ill_mask = 0xffc0;
        let _ = write!(out, ", {}", GSOP_NAMES[gsop as usize]);
        if gsop != 0 {
            ill_mask = 0xfcc0;
            let _ = write!(out, ", {}", stream);
        }
    }
    out.push(')');
    if imm16 & ill_mask != 0 {
        let _ = write!(out, " :{:#x}", imm16);
    }
}

fn write_waitcnt(out: &mut String, imm16: u32, gcn14: bool) {
    let vm_full: u32 = if gcn14 { 63 } else { 15 };
    let vmcnt = if gcn14 {
        (imm16 & 15) | ((imm16 >> 10) & 0x30)
    } else {
        imm16 & 15
    };
    let expcnt = (imm16 >> 4) & 7;
    let lgkmcnt = (imm16 >> 8) & 15;
    let mut first = true;
    if vmcnt != vm_full {
        let _ = write!(out, "vmcnt({})", vmcnt);
        first = false;
    }
    if expcnt != 7 {
        if !first {
            out.push_str(" & ");
        }
        let _ = write!(out, "expcnt({})", expcnt);
        first = false;
    }
    if lgkmcnt != 15 {
        if !first {
            out.push_str(" & ");
        }
        let _ = write!(out, "lgkmcnt({})", lgkmcnt);
        first = false;
    }
    let residue_mask: u32 = if gcn14 { 0x3080 } else { 0xf080 };
    if imm16 & residue_mask != 0 {
        if !first {
            out.push(' ');
        }
        let _ = write!(out, ":{:#x}", imm16);
    }
}

pub(super) fn format_sopp(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    let imm16 = ctx.insn & 0xffff;
    let has_operands = !matches!(desc.mode.arg, ArgMode::ImmNone) || imm16 != 0;
    mnemonic_head(out, &desc.mnemonic, has_operands);
    match desc.mode.arg {
        ArgMode::ImmRel => {
            let _ = write!(out, "{}", jump_label(ctx.pos, imm16));
        }
        ArgMode::ImmLocks => write_waitcnt(out, imm16, ctx.gcn14()),
        ArgMode::ImmMsgs => write_sendmsg(out, imm16, ctx.gcn14()),
        ArgMode::ImmNone => {
            if imm16 != 0 {
                let _ = write!(out, "{:#x}", imm16);
            }
        }
        _ => {
            let _ = write!(out, "{:#x}", imm16);
        }
    }
    out.push('\n');
}

pub(super) fn format_smrd(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    let arg_none = desc.mode.arg == ArgMode::ArgNone;
    mnemonic_head(out, &desc.mnemonic, !arg_none);
    if arg_none {
        out.push('\n');
        return;
    }
    let sdst = (ctx.insn >> 15) & 0x7f;
    let dregs = if desc.mode.arg == ArgMode::SmrdOnlyDst {
        if desc.mode.dst64 {
            2
        } else {
            1
        }
    } else {
        1u16 << desc.mode.dsize
    };
    let _ = write!(out, "{}", format_operand(sdst, dregs, 0, false));
    if desc.mode.arg != ArgMode::SmrdOnlyDst {
        let sbase = (ctx.insn >> 8) & 0x7e;
        let sbc = if desc.mode.sbase4 { 4 } else { 2 };
        let _ = write!(out, ", {}", format_operand(sbase, sbc, 0, false));
        if ctx.insn & 0x100 != 0 {
            let _ = write!(out, ", {:#x}", ctx.insn & 0xff);
        } else {
            let _ = write!(out, ", {}", format_operand(ctx.insn & 0xff, 1, 0, false));
        }
    }
    out.push('\n');
}

pub(super) fn format_smem(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    let arg_none = desc.mode.arg == ArgMode::ArgNone;
    mnemonic_head(out, &desc.mnemonic, !arg_none);
    let imm = ctx.insn & 0x2_0000 != 0;
    let glc = ctx.insn & 0x1_0000 != 0;
    let nv = ctx.insn & 0x8000 != 0;
    let soe = ctx.insn & 0x4000 != 0;
    if !arg_none {
        let sdata = (ctx.insn >> 6) & 0x7f;
        match desc.mode.arg {
            ArgMode::SmrdOnlyDst => {
                let dc = if desc.mode.dst64 { 2 } else { 1 };
                let _ = write!(out, "{}", format_operand(sdata, dc, 0, false));
            }
            ArgMode::SmemSdataImm => {
                let _ = write!(out, "{:#x}", sdata);
            }
            _ => {
                let dregs = 1u16 << desc.mode.dsize;
                let _ = write!(out, "{}", format_operand(sdata, dregs, 0, false));
            }
        }
        if desc.mode.arg != ArgMode::SmrdOnlyDst {
            let sbase = (ctx.insn & 0x3f) << 1;
            let sbc = if desc.mode.sbase4 { 4 } else { 2 };
            let _ = write!(out, ", {}", format_operand(sbase, sbc, 0, false));
            if soe {
                // SGPR offset plus the immediate printed as a modifier
                let soffset = (ctx.second >> 25) & 0x7f;
                let _ = write!(out, ", {}", format_operand(soffset, 1, 0, false));
            } else if imm {
                let mask: u32 = if ctx.gcn14() { 0x1f_ffff } else { 0xf_ffff };
                let _ = write!(out, ", {:#x}", ctx.second & mask);
            } else {
                let _ = write!(out, ", {}", format_operand(ctx.second & 0x7f, 1, 0, false));
            }
        }
    }
    if glc {
        out.push_str(" glc");
    }
    if nv {
        out.push_str(" nv");
    }
    if soe {
        let _ = write!(out, " offset:{:#x}", ctx.second & 0x1f_ffff);
    }
    out.push('\n');
}

/// Write one VOP source operand with its SDWA/DPP or VOP3 modifiers.
fn write_mod_operand(out: &mut String, body: String, neg: bool, abs: bool, sext: bool) {
    if neg {
        out.push('-');
    }
    if sext {
        out.push_str("sext(");
    }
    if abs {
        out.push_str("abs(");
    }
    out.push_str(&body);
    if abs {
        out.push(')');
    }
    if sext {
        out.push(')');
    }
}

const SEL_NAMES: [&str; 7] = ["byte0", "byte1", "byte2", "byte3", "word0", "word1", "dword"];

fn sel_name(sel: u32) -> &'static str {
    SEL_NAMES.get(sel as usize).copied().unwrap_or("dword")
}

fn write_sdwa_tail(out: &mut String, word: u32, with_dst: bool, omod_live: bool) {
    if with_dst {
        let dst_sel = (word >> 8) & 7;
        if dst_sel != 6 {
            let _ = write!(out, " dst_sel:{}", sel_name(dst_sel));
        }
        let dst_unused = (word >> 11) & 3;
        if dst_unused != 0 {
            let name = ["pad", "sext", "preserve", "@3"][dst_unused as usize];
            let _ = write!(out, " dst_unused:{}", name);
        }
        if word & 0x2000 != 0 {
            out.push_str(" clamp");
        }
        if omod_live {
            match (word >> 14) & 3 {
                1 => out.push_str(" mul:2"),
                2 => out.push_str(" mul:4"),
                3 => out.push_str(" div:2"),
                _ => {}
            }
        }
    }
    let src0_sel = (word >> 16) & 7;
    if src0_sel != 6 {
        let _ = write!(out, " src0_sel:{}", sel_name(src0_sel));
    }
    let src1_sel = (word >> 24) & 7;
    if src1_sel != 6 {
        let _ = write!(out, " src1_sel:{}", sel_name(src1_sel));
    }
}

fn write_dpp_tail(out: &mut String, word: u32) {
    let ctrl = (word >> 8) & 0x1ff;
    match ctrl {
        0..=0xff => {
            let _ = write!(
                out,
                " quad_perm:[{},{},{},{}]",
                ctrl & 3,
                (ctrl >> 2) & 3,
                (ctrl >> 4) & 3,
                (ctrl >> 6) & 3
            );
        }
        0x100..=0x10f => {
            let _ = write!(out, " row_shl:{}", ctrl & 15);
        }
        0x110..=0x11f => {
            let _ = write!(out, " row_shr:{}", ctrl & 15);
        }
        0x120..=0x12f => {
            let _ = write!(out, " row_ror:{}", ctrl & 15);
        }
        0x130 => out.push_str(" wave_shl"),
        0x134 => out.push_str(" wave_rol"),
        0x138 => out.push_str(" wave_shr"),
        0x13c => out.push_str(" wave_ror"),
        0x140 => out.push_str(" row_mirror"),
        0x141 => out.push_str(" row_half_mirror"),
        0x142 => out.push_str(" row_bcast15"),
        0x143 => out.push_str(" row_bcast31"),
        _ => {
            let _ = write!(out, " dppctrl:{:#x}", ctrl);
        }
    }
    if word & (1 << 19) != 0 {
        out.push_str(" bound_ctrl");
    }
    let bank_mask = (word >> 24) & 15;
    if bank_mask != 15 {
        let _ = write!(out, " bank_mask:{}", bank_mask);
    }
    let row_mask = (word >> 28) & 15;
    if row_mask != 15 {
        let _ = write!(out, " row_mask:{}", row_mask);
    }
}

/// Decode the SRC0 field of a short VOP form, resolving SDWA/DPP selectors
/// to the real source held in the extra word.
struct VopSrc0 {
    text: String,
    sdwa: bool,
    dpp: bool,
}

fn vop_src0(ctx: &FmtCtx, count: u16) -> VopSrc0 {
    let src0 = ctx.insn & 0x1ff;
    if ctx.gcn12() && src0 == 0xf9 {
        let raw = ctx.second & 0xff;
        let value = if ctx.second & (1 << 23) != 0 { raw } else { raw + 256 };
        let body = format_operand(value, count, 0, false);
        let mut text = String::new();
        write_mod_operand(
            &mut text,
            body,
            ctx.second & (1 << 20) != 0,
            ctx.second & (1 << 21) != 0,
            ctx.second & (1 << 19) != 0,
        );
        VopSrc0 {
            text,
            sdwa: true,
            dpp: false,
        }
    } else if ctx.gcn12() && src0 == 0xfa {
        let body = format_operand((ctx.second & 0xff) + 256, count, 0, false);
        let mut text = String::new();
        write_mod_operand(
            &mut text,
            body,
            ctx.second & (1 << 20) != 0,
            ctx.second & (1 << 21) != 0,
            false,
        );
        VopSrc0 {
            text,
            sdwa: false,
            dpp: true,
        }
    } else {
        VopSrc0 {
            text: format_operand(src0, count, ctx.second, ctx.float_comment()),
            sdwa: false,
            dpp: false,
        }
    }
}

pub(super) fn format_vop2(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let arg = desc.mode.arg;
    let vdst = (ctx.insn >> 17) & 0xff;
    let vsrc1 = (ctx.insn >> 9) & 0xff;
    let dc = if desc.mode.dst64 { 2 } else { 1 };
    let s0c = if desc.mode.src0_64 { 2 } else { 1 };
    let s1c = if desc.mode.src1_64 { 2 } else { 1 };
    let dst_text = if arg == ArgMode::Ds1Sgpr {
        format_operand(vdst, dc, 0, false)
    } else {
        format_operand(vdst + 256, dc, 0, false)
    };
    let _ = write!(out, "{}, ", dst_text);
    if matches!(arg, ArgMode::Ds2Vcc | ArgMode::DstVcc) {
        out.push_str("vcc, ");
    }
    let src0 = vop_src0(ctx, s0c);
    out.push_str(&src0.text);
    if arg == ArgMode::Arg1Imm {
        let _ = write!(out, ", {:#x}", ctx.second);
        if ctx.float_comment() {
            let _ = write!(out, " /* {:?}f */", f32::from_bits(ctx.second));
        }
    }
    let src1_text = if matches!(arg, ArgMode::Ds1Sgpr | ArgMode::Src1Sgpr) {
        format_operand(vsrc1, s1c, 0, false)
    } else {
        format_operand(vsrc1 + 256, s1c, 0, false)
    };
    if src0.sdwa {
        let mut text = String::new();
        write_mod_operand(
            &mut text,
            src1_text,
            ctx.second & (1 << 28) != 0,
            ctx.second & (1 << 29) != 0,
            ctx.second & (1 << 27) != 0,
        );
        let _ = write!(out, ", {}", text);
    } else if src0.dpp {
        let mut text = String::new();
        write_mod_operand(
            &mut text,
            src1_text,
            ctx.second & (1 << 22) != 0,
            ctx.second & (1 << 23) != 0,
            false,
        );
        let _ = write!(out, ", {}", text);
    } else {
        let _ = write!(out, ", {}", src1_text);
    }
    if arg == ArgMode::Arg2Imm {
        let _ = write!(out, ", {:#x}", ctx.second);
        if ctx.float_comment() {
            let _ = write!(out, " /* {:?}f */", f32::from_bits(ctx.second));
        }
    }
    if matches!(arg, ArgMode::Ds2Vcc | ArgMode::Src2Vcc) {
        out.push_str(", vcc");
    }
    if src0.sdwa {
        write_sdwa_tail(out, ctx.second, true, ctx.gcn14());
    } else if src0.dpp {
        write_dpp_tail(out, ctx.second);
    }
    out.push('\n');
}

pub(super) fn format_vop1(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    if desc.mode.arg == ArgMode::VopArgNone {
        mnemonic_head(out, &desc.mnemonic, false);
        out.push('\n');
        return;
    }
    mnemonic_head(out, &desc.mnemonic, true);
    let vdst = (ctx.insn >> 17) & 0xff;
    let dc = if desc.mode.dst64 { 2 } else { 1 };
    let s0c = if desc.mode.src0_64 { 2 } else { 1 };
    let dst_text = if desc.mode.arg == ArgMode::DstSgpr {
        format_operand(vdst, dc, 0, false)
    } else {
        format_operand(vdst + 256, dc, 0, false)
    };
    let src0 = vop_src0(ctx, s0c);
    let _ = write!(out, "{}, {}", dst_text, src0.text);
    if src0.sdwa {
        write_sdwa_tail(out, ctx.second, true, ctx.gcn14());
    } else if src0.dpp {
        write_dpp_tail(out, ctx.second);
    }
    out.push('\n');
}

pub(super) fn format_vopc(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let s0c = if desc.mode.src0_64 { 2 } else { 1 };
    let s1c = if desc.mode.src1_64 { 2 } else { 1 };
    let src0 = vop_src0(ctx, s0c);
    // Vega SDWAB can name a non-VCC destination
    if src0.sdwa && ctx.gcn14() && ctx.second & 0x8000 != 0 {
        let sdst = (ctx.second >> 8) & 0x7f;
        let _ = write!(out, "{}, ", format_operand(sdst, 2, 0, false));
    } else {
        out.push_str("vcc, ");
    }
    out.push_str(&src0.text);
    let vsrc1 = (ctx.insn >> 9) & 0xff;
    let src1_text = format_operand(vsrc1 + 256, s1c, 0, false);
    if src0.sdwa {
        let mut text = String::new();
        write_mod_operand(
            &mut text,
            src1_text,
            ctx.second & (1 << 28) != 0,
            ctx.second & (1 << 29) != 0,
            ctx.second & (1 << 27) != 0,
        );
        let _ = write!(out, ", {}", text);
        write_sdwa_tail(out, ctx.second, !ctx.gcn14(), false);
    } else if src0.dpp {
        let mut text = String::new();
        write_mod_operand(
            &mut text,
            src1_text,
            ctx.second & (1 << 22) != 0,
            ctx.second & (1 << 23) != 0,
            false,
        );
        let _ = write!(out, ", {}", text);
        write_dpp_tail(out, ctx.second);
    } else {
        let _ = write!(out, ", {}", src1_text);
    }
    out.push('\n');
}

fn write_omod(out: &mut String, omod: u32) {
    match omod {
        1 => out.push_str(" mul:2"),
        2 => out.push_str(" mul:4"),
        3 => out.push_str(" div:2"),
        _ => {}
    }
}

pub(super) fn format_vop3(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    let gcn12 = ctx.gcn12();
    mnemonic_head(out, &desc.mnemonic, true);
    let vop3b = desc.encoding == Encoding::Vop3B
        || (matches!(desc.encoding, Encoding::Vop2)
            && matches!(desc.mode.arg, ArgMode::Ds2Vcc | ArgMode::DstVcc));
    let vop3p = desc.mode.vop3p;
    let vdst = ctx.insn & 0xff;
    let sdst = (ctx.insn >> 8) & 0x7f;
    let clamp = if gcn12 {
        ctx.insn & 0x8000 != 0
    } else if vop3b {
        false
    } else {
        ctx.insn & 0x800 != 0
    };
    let abs_flags = if vop3b || vop3p {
        0
    } else {
        (ctx.insn >> 8) & 7
    };
    let opsel = if gcn12 && !vop3b { (ctx.insn >> 11) & 15 } else { 0 };
    let src0 = ctx.second & 0x1ff;
    let src1 = (ctx.second >> 9) & 0x1ff;
    let src2 = (ctx.second >> 18) & 0x1ff;
    let omod = (ctx.second >> 27) & 3;
    let neg = ctx.second >> 29;

    // interpolation in VOP3 clothing
    if desc.mode.vintrp_vop3 {
        let dc = 1;
        let _ = write!(out, "{}, ", format_operand(vdst + 256, dc, 0, false));
        if desc.mode.arg == ArgMode::P0P10P20 {
            let names = ["p10", "p20", "p0"];
            let _ = write!(
                out,
                "{}, ",
                names.get(src1 as usize).copied().unwrap_or("p10")
            );
        } else {
            let _ = write!(out, "{}, ", format_operand(src1, 1, 0, false));
        }
        let attr = src0 & 0x3f;
        let chan = (src0 >> 6) & 3;
        let _ = write!(out, "attr{}.{}", attr, ["x", "y", "z", "w"][chan as usize]);
        if desc.mode.arg == ArgMode::VintrpSrc2 {
            let _ = write!(out, ", {}", format_operand(src2, 1, 0, false));
        }
        if src0 & 0x100 != 0 {
            out.push_str(" high");
        }
        if clamp {
            out.push_str(" clamp");
        }
        write_omod(out, omod);
        out.push_str(" vop3");
        out.push('\n');
        return;
    }

    // destination
    let mut operands: Vec<String> = Vec::new();
    let compare = desc.encoding == Encoding::Vopc;
    let dst_sgpr = compare || matches!(desc.mode.arg, ArgMode::DstSgpr | ArgMode::Ds1Sgpr);
    let dc = if desc.mode.dsize == 4 {
        4
    } else if desc.mode.dst64 {
        2
    } else {
        1
    };
    if dst_sgpr {
        let dcount = if compare { 2 } else { dc };
        operands.push(format_operand(vdst, dcount, 0, false));
    } else {
        operands.push(format_operand(vdst + 256, dc, 0, false));
    }
    if vop3b {
        operands.push(format_operand(sdst, 2, 0, false));
    }
    let s0 = (src0, if desc.mode.src0_64 { 2u16 } else { 1 });
    let s1 = (src1, if desc.mode.src1_64 { 2u16 } else { 1 });
    let s2 = (
        src2,
        if desc.mode.dsize == 4 {
            4u16
        } else if desc.mode.src2_64 {
            2
        } else {
            1
        },
    );
    let mut srcs: Vec<(u32, u16)> = Vec::new();
    match desc.encoding {
        Encoding::Vop1 => srcs.push(s0),
        Encoding::Vop2 | Encoding::Vopc => {
            srcs.push(s0);
            srcs.push(s1);
        }
        _ => match desc.mode.arg {
            ArgMode::Src12None => srcs.push(s0),
            ArgMode::Src2None
            | ArgMode::DstVcc
            | ArgMode::DstSgpr
            | ArgMode::Ds1Sgpr
            | ArgMode::Src1Sgpr => {
                srcs.push(s0);
                srcs.push(s1);
            }
            _ => {
                srcs.push(s0);
                srcs.push(s1);
                srcs.push(s2);
            }
        },
    }
    for (i, &(value, count)) in srcs.iter().enumerate() {
        let mut text = String::new();
        write_mod_operand(
            &mut text,
            format_operand(value, count, 0, false),
            neg & (1 << i) != 0,
            abs_flags & (1 << i) != 0,
            false,
        );
        operands.push(text);
    }
    // a VOP2 carry form reads VCC implicitly in the short encoding but the
    // long form names the SSRC
    if desc.encoding == Encoding::Vop2 && matches!(desc.mode.arg, ArgMode::Ds2Vcc | ArgMode::Src2Vcc)
    {
        operands.push(format_operand(src2, 2, 0, false));
    }
    let _ = write!(out, "{}", operands.join(", "));
    // residues for unused source slots
    if matches!(desc.mode.arg, ArgMode::Src12None) && src1 != 0 {
        let _ = write!(out, " src1={:#x}", src1);
    }
    if matches!(desc.mode.arg, ArgMode::Src12None | ArgMode::Src2None) && src2 != 0
        && !(desc.encoding == Encoding::Vop2
            && matches!(desc.mode.arg, ArgMode::Ds2Vcc | ArgMode::Src2Vcc))
    {
        let _ = write!(out, " src2={:#x}", src2);
    }
    if clamp {
        out.push_str(" clamp");
    }
    if vop3p {
        if opsel != 0 {
            let _ = write!(
                out,
                " op_sel:[{},{},{}]",
                opsel & 1,
                (opsel >> 1) & 1,
                (opsel >> 2) & 1
            );
        }
        let hi2 = if ctx.insn & 0x4000 != 0 { 1u32 } else { 0 };
        let opsel_hi = (omod & 3) | (hi2 << 2);
        if opsel_hi != 7 {
            let _ = write!(
                out,
                " op_sel_hi:[{},{},{}]",
                opsel_hi & 1,
                (opsel_hi >> 1) & 1,
                (opsel_hi >> 2) & 1
            );
        }
        let neg_hi = (ctx.insn >> 8) & 7;
        if neg_hi != 0 {
            let _ = write!(
                out,
                " neg_hi:[{},{},{}]",
                neg_hi & 1,
                (neg_hi >> 1) & 1,
                (neg_hi >> 2) & 1
            );
        }
    } else {
        if opsel != 0 {
            let _ = write!(
                out,
                " op_sel:[{},{},{},{}]",
                opsel & 1,
                (opsel >> 1) & 1,
                (opsel >> 2) & 1,
                (opsel >> 3) & 1
            );
        }
        write_omod(out, omod);
    }
    // short-encodable long forms carry an explicit marker so reassembly
    // picks the 64-bit encoding again
    if !matches!(desc.encoding, Encoding::Vop3A | Encoding::Vop3B) {
        let has_mods =
            clamp || omod != 0 || opsel != 0 || abs_flags != 0 || (neg & 7) != 0;
        let short_ok = match desc.encoding {
            Encoding::Vopc => vdst == 106 && src1 >= 256,
            Encoding::Vop2 => {
                let src1_vgpr = src1 >= 256;
                let cc_ok = if vop3b { sdst == 106 } else { true };
                let ssrc_ok = if matches!(desc.mode.arg, ArgMode::Ds2Vcc | ArgMode::Src2Vcc) {
                    src2 == 106
                } else {
                    true
                };
                (src1_vgpr ^ matches!(desc.mode.arg, ArgMode::Ds1Sgpr | ArgMode::Src1Sgpr))
                    && cc_ok
                    && ssrc_ok
            }
            _ => true,
        };
        if !has_mods && short_ok {
            out.push_str(" vop3");
        }
    }
    out.push('\n');
}

pub(super) fn format_vintrp(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let vdst = (ctx.insn >> 18) & 0xff;
    let vsrc = ctx.insn & 0xff;
    let attr = (ctx.insn >> 10) & 0x3f;
    let chan = (ctx.insn >> 8) & 3;
    let _ = write!(out, "{}, ", format_operand(vdst + 256, 1, 0, false));
    if desc.mode.arg == ArgMode::P0P10P20 {
        let names = ["p10", "p20", "p0"];
        let _ = write!(out, "{}, ", names.get(vsrc as usize).copied().unwrap_or("p10"));
    } else {
        let _ = write!(out, "{}, ", format_operand(vsrc + 256, 1, 0, false));
    }
    let _ = write!(out, "attr{}.{}", attr, ["x", "y", "z", "w"][chan as usize]);
    out.push('\n');
}

pub(super) fn format_ds(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    let arg = desc.mode.arg;
    if arg == ArgMode::NoArgs {
        mnemonic_head(out, &desc.mnemonic, false);
        out.push('\n');
        return;
    }
    mnemonic_head(out, &desc.mnemonic, true);
    let addr = ctx.second & 0xff;
    let data0 = (ctx.second >> 8) & 0xff;
    let data1 = (ctx.second >> 16) & 0xff;
    let vdst = (ctx.second >> 24) & 0xff;
    let gds_bit = if ctx.gcn12() { 0x1_0000 } else { 0x2_0000 };
    let regs = desc.mode.dsize.max(1) as u16;
    let vdst_regs = if desc.mode.two_offsets { regs * 2 } else { regs };
    let mut parts: Vec<String> = Vec::new();
    let (has_vdst, has_addr, srcs) = match arg {
        ArgMode::DsDstAddr => (true, true, 0),
        ArgMode::DsAddrSrc => (false, true, 1),
        ArgMode::DsAddr2Src => (false, true, 2),
        ArgMode::DsDstAddrSrc => (true, true, 1),
        ArgMode::DsDstAddr2Src => (true, true, 2),
        ArgMode::DsOnlyDst => (true, false, 0),
        ArgMode::DsOnlySrc0 => (false, false, 1),
        _ => (false, false, 0),
    };
    if has_vdst {
        parts.push(format_operand(vdst + 256, vdst_regs, 0, false));
    }
    if has_addr {
        parts.push(format_operand(addr + 256, 1, 0, false));
    }
    if srcs >= 1 {
        parts.push(format_operand(data0 + 256, regs, 0, false));
    }
    if srcs == 2 {
        parts.push(format_operand(data1 + 256, regs, 0, false));
    }
    let _ = write!(out, "{}", parts.join(", "));
    let offset = ctx.insn & 0xffff;
    if offset != 0 {
        if desc.mode.two_offsets {
            if offset & 0xff != 0 {
                let _ = write!(out, " offset0:{}", offset & 0xff);
            }
            if offset & 0xff00 != 0 {
                let _ = write!(out, " offset1:{}", (offset >> 8) & 0xff);
            }
        } else {
            let _ = write!(out, " offset:{}", offset);
        }
    }
    if ctx.insn & gds_bit != 0 {
        out.push_str(" gds");
    }
    out.push('\n');
}

const DFMT_NAMES: [&str; 16] = [
    "invalid", "8", "16", "8_8", "32", "16_16", "10_11_11", "11_11_10", "10_10_10_2",
    "2_10_10_10", "8_8_8_8", "32_32", "16_16_16_16", "32_32_32", "32_32_32_32", "reserved",
];
const NFMT_NAMES: [&str; 8] = [
    "unorm", "snorm", "uscaled", "sscaled", "uint", "sint", "snorm_ogl", "float",
];

pub(super) fn format_mxbuf(out: &mut String, ctx: &FmtCtx, mtbuf: bool) {
    let desc = ctx.desc;
    let arg = desc.mode.arg;
    let gcn12 = ctx.gcn12();
    if arg == ArgMode::ArgNone {
        mnemonic_head(out, &desc.mnemonic, false);
        out.push('\n');
        return;
    }
    mnemonic_head(out, &desc.mnemonic, true);
    let offen = ctx.insn & 0x1000 != 0;
    let idxen = ctx.insn & 0x2000 != 0;
    let glc = ctx.insn & 0x4000 != 0;
    let addr64 = !gcn12 && ctx.insn & 0x8000 != 0;
    let lds = !mtbuf && ctx.insn & 0x1_0000 != 0;
    let slc = if mtbuf || !gcn12 {
        ctx.second & (1 << 22) != 0
    } else {
        ctx.insn & 0x2_0000 != 0
    };
    let tfe = ctx.second & (1 << 23) != 0;
    let vaddr = ctx.second & 0xff;
    let vdata = (ctx.second >> 8) & 0xff;
    let srsrc = ((ctx.second >> 16) & 0x1f) << 2;
    let soffset = (ctx.second >> 24) & 0xff;
    let mut dregs = desc.mode.dsize as u16;
    if desc.mode.d16 && ctx.gcn14() {
        dregs = (dregs + 1) / 2;
    }
    dregs += tfe as u16;
    if arg != ArgMode::MubufNoVad {
        let _ = write!(out, "{}, ", format_operand(vdata + 256, dregs.max(1), 0, false));
        if offen || idxen || addr64 {
            let acount = if (offen && idxen) || addr64 { 2 } else { 1 };
            let _ = write!(out, "{}, ", format_operand(vaddr + 256, acount, 0, false));
        } else {
            out.push_str("off, ");
        }
    }
    let _ = write!(
        out,
        "{}, {}",
        format_operand(srsrc, 4, 0, false),
        format_operand(soffset, 1, 0, false)
    );
    if offen {
        out.push_str(" offen");
    }
    if idxen {
        out.push_str(" idxen");
    }
    let offset = ctx.insn & 0xfff;
    if offset != 0 {
        let _ = write!(out, " offset:{}", offset);
    }
    if glc {
        out.push_str(" glc");
    }
    if slc {
        out.push_str(" slc");
    }
    if addr64 {
        out.push_str(" addr64");
    }
    if tfe {
        out.push_str(" tfe");
    }
    if lds {
        out.push_str(" lds");
    }
    if mtbuf {
        // dfmt and nfmt sit at the same bits on every generation
        let (dfmt, nfmt) = ((ctx.insn >> 19) & 15, (ctx.insn >> 23) & 7);
        let _ = write!(
            out,
            " format:[{},{}]",
            DFMT_NAMES[dfmt as usize], NFMT_NAMES[nfmt as usize]
        );
    }
    out.push('\n');
}

pub(super) fn format_mimg(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let dmask = (ctx.insn >> 8) & 15;
    let unorm = ctx.insn & 0x1000 != 0;
    let glc = ctx.insn & 0x2000 != 0;
    let da = ctx.insn & 0x4000 != 0;
    let r128_a16 = ctx.insn & 0x8000 != 0;
    let tfe = ctx.insn & 0x1_0000 != 0;
    let lwe = ctx.insn & 0x2_0000 != 0;
    let slc = ctx.insn & (1 << 25) != 0;
    let vaddr = ctx.second & 0xff;
    let vdata = (ctx.second >> 8) & 0xff;
    let srsrc = ((ctx.second >> 16) & 0x1f) << 2;
    let ssamp = ((ctx.second >> 21) & 0x1f) << 2;
    let d16 = ctx.second & (1 << 31) != 0;
    let dregs = if desc.mode.vdata4 {
        4
    } else {
        (dmask.count_ones() as u16 + tfe as u16).max(1)
    };
    let _ = write!(
        out,
        "{}, {}, {}",
        format_operand(vdata + 256, dregs, 0, false),
        format_operand(vaddr + 256, desc.mode.dsize.max(1) as u16, 0, false),
        format_operand(srsrc, if r128_a16 && !ctx.gcn14() { 4 } else { 8 }, 0, false)
    );
    if desc.mode.sample {
        let _ = write!(out, ", {}", format_operand(ssamp, 4, 0, false));
    }
    if dmask != 1 {
        let _ = write!(out, " dmask:{}", dmask);
    }
    if unorm {
        out.push_str(" unorm");
    }
    if glc {
        out.push_str(" glc");
    }
    if slc {
        out.push_str(" slc");
    }
    if da {
        out.push_str(" da");
    }
    if r128_a16 {
        out.push_str(if ctx.gcn14() { " a16" } else { " r128" });
    }
    if tfe {
        out.push_str(" tfe");
    }
    if lwe {
        out.push_str(" lwe");
    }
    if d16 {
        out.push_str(" d16");
    }
    out.push('\n');
}

pub(super) fn format_exp(out: &mut String, insn: u32, second: u32) {
    mnemonic_head(out, "exp", true);
    let target = (insn >> 4) & 0x3f;
    let en = insn & 15;
    let target_name = match target {
        0..=7 => format!("mrt{}", target),
        8 => "mrtz".to_string(),
        9 => "null".to_string(),
        12..=15 => format!("pos{}", target - 12),
        32..=63 => format!("param{}", target - 32),
        _ => format!("ill_{}", target),
    };
    let _ = write!(out, "{}", target_name);
    for i in 0..4 {
        let vsrc = (second >> (8 * i)) & 0xff;
        if en & (1 << i) != 0 {
            let _ = write!(out, ", {}", format_operand(vsrc + 256, 1, 0, false));
        } else {
            out.push_str(", off");
        }
    }
    if insn & 0x400 != 0 {
        out.push_str(" compr");
    }
    if insn & 0x800 != 0 {
        out.push_str(" done");
    }
    if insn & 0x1000 != 0 {
        out.push_str(" vm");
    }
    out.push('\n');
}

pub(super) fn format_flat(out: &mut String, ctx: &FmtCtx) {
    let desc = ctx.desc;
    mnemonic_head(out, &desc.mnemonic, true);
    let flat_mode = desc.mode.flat_mode;
    let glc = ctx.insn & 0x1_0000 != 0;
    let slc = ctx.insn & 0x2_0000 != 0;
    let lds = ctx.gcn14() && ctx.insn & 0x2000 != 0;
    let vaddr = ctx.second & 0xff;
    let vdata = (ctx.second >> 8) & 0xff;
    let saddr = (ctx.second >> 16) & 0x7f;
    let tfe_nv = ctx.second & (1 << 23) != 0;
    let vdst = (ctx.second >> 24) & 0xff;
    let dregs = desc.mode.dsize.max(1) as u16;
    let saddr_off = saddr == 0x7f;
    let addr_regs: u16 = match flat_mode {
        FlatMode::Flat => 2,
        FlatMode::Scratch => 1,
        FlatMode::Global => {
            if saddr_off {
                2
            } else {
                1
            }
        }
    };
    let mut parts: Vec<String> = Vec::new();
    if desc.mode.arg != ArgMode::FlatStore {
        let mut dst_regs = if desc.mode.halfwrite { dregs / 2 } else { dregs };
        if !ctx.gcn14() && tfe_nv {
            dst_regs += 1;
        }
        parts.push(format_operand(vdst + 256, dst_regs.max(1), 0, false));
    }
    parts.push(format_operand(vaddr + 256, addr_regs, 0, false));
    if desc.mode.arg != ArgMode::FlatLoad {
        parts.push(format_operand(vdata + 256, dregs, 0, false));
    }
    if flat_mode != FlatMode::Flat {
        if saddr_off {
            parts.push("off".to_string());
        } else {
            let sregs = if flat_mode == FlatMode::Scratch { 1 } else { 2 };
            parts.push(format_operand(saddr, sregs, 0, false));
        }
    }
    let _ = write!(out, "{}", parts.join(", "));
    let inst_offset = ctx.insn & 0x1fff;
    if ctx.gcn14() && inst_offset != 0 {
        let value = if flat_mode != FlatMode::Flat {
            // 13-bit signed
            ((inst_offset as i32) << 19) >> 19
        } else {
            (inst_offset & 0xfff) as i32
        };
        let _ = write!(out, " inst_offset:{}", value);
    }
    if glc {
        out.push_str(" glc");
    }
    if slc {
        out.push_str(" slc");
    }
    if tfe_nv {
        out.push_str(if ctx.gcn14() { " nv" } else { " tfe" });
    }
    if lds {
        out.push_str(" lds");
    }
    out.push('\n');
}
