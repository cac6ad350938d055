// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Scalar-ALU encoders: SOP2, SOP1, SOPC, SOPK, SOPP.

use crate::core::cursor::LineCursor;
use crate::core::expr::SECT_ABS;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::operand::{
    parse_imm, parse_operand, parse_sreg_range, ImmKind, ImmValue, Operand, OpFlags,
};
use crate::gcn::registry::{ArgMode, InsnDesc};
use crate::gcn::regs::RegRange;
use crate::gcn::reloc::RelocKind;
use crate::gcn::usage::RegField;
use crate::gcn::{skip_required_comma, check_garbage_at_end, AsmContext, EncSize};

const SSRC_FLAGS: OpFlags = OpFlags::SREGS
    .union(OpFlags::SSOURCE)
    .union(OpFlags::SYMREG)
    .union(OpFlags::READ);

/// Convert an inline constant to the literal slot so that an `_e64` request
/// can widen a 32-bit SOP encoding.
fn try_promote_const_to_literal(op: &mut Operand, gcn12: bool) {
    if op.range.is_var() {
        return;
    }
    let start = op.range.start;
    if (128..=208).contains(&start) {
        op.value = if start < 193 {
            (start - 128) as u32
        } else {
            (192i32 - start as i32) as u32
        };
        op.range = RegRange::new(255, 256);
    } else if (240..248).contains(&start) || (gcn12 && start == 248) {
        const FLOAT_LITERALS: [u32; 9] = [
            0x3f000000, 0xbf000000, 0x3f800000, 0xbf800000, 0x40000000, 0xc0000000, 0x40800000,
            0xc0800000, 0x3e22f983,
        ];
        op.value = FLOAT_LITERALS[(start - 240) as usize];
        op.range = RegRange::new(255, 256);
    }
}

fn update_pool_sreg(ctx: &mut dyn AsmContext, range: &RegRange, written: bool) {
    if range.is_set() && !range.is_var() {
        let pool = ctx.reg_pool();
        if written {
            pool.update_sgpr(range.end.saturating_sub(1));
        }
        pool.update_flags(range.start);
    }
}

/// A resolved or deferred branch target.
struct JumpTarget {
    value: u64,
    expr: Option<crate::core::expr::Expression>,
}

fn parse_jump_target(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<JumpTarget> {
    cur.skip_spaces();
    let at = cur.line_col();
    let expr = ctx.parse_expression(cur)?;
    match ctx.eval(&expr) {
        Ok(Some((value, section))) => {
            if section != SECT_ABS && section != ctx.current_section() {
                ctx.error(at, "Jump over current section!");
                return None;
            }
            Some(JumpTarget { value, expr: None })
        }
        Ok(None) => Some(JumpTarget {
            value: 0,
            expr: Some(expr),
        }),
        Err(()) => None,
    }
}

/// Resolve a jump target into the word-scaled imm16, recording the
/// code-flow edge named by the descriptor.
fn resolve_jump(
    ctx: &mut dyn AsmContext,
    desc: &InsnDesc,
    at: LineCol,
    target: &JumpTarget,
    good: &mut bool,
) -> u16 {
    let out_pos = ctx.out_pos();
    let delta = target.value as i64 - out_pos as i64 - 4;
    if delta & 3 != 0 {
        ctx.error(at, "Jump is not aligned to word!");
        *good = false;
        return 0;
    }
    let words = delta >> 2;
    if words > i16::MAX as i64 || words < i16::MIN as i64 {
        ctx.error(at, "Jump out of range");
        *good = false;
        return 0;
    }
    if *good {
        if let Some(kind) = desc.flow {
            ctx.add_code_flow(out_pos, target.value as usize, kind);
        }
    }
    words as u16
}

pub fn encode_sop2(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    let mut good = true;
    let mut dst = RegRange::default();
    let has_dst = !matches!(desc.mode.arg, ArgMode::RegS1Jmp);
    if has_dst {
        ctx.usage().set_current(0);
        let regs = if desc.mode.dst64 { 2 } else { 1 };
        match parse_sreg_range(
            ctx,
            cur,
            regs,
            Some(RegField::Sdst),
            true,
            OpFlags::SYMREG | OpFlags::WRITE,
        ) {
            Some(r) => dst = r,
            None => good = false,
        }
        if !skip_required_comma(ctx, cur) {
            return false;
        }
    }
    ctx.usage().set_current(1);
    let src0_regs = if desc.mode.src0_64 { 2 } else { 1 };
    let mut src0 = match parse_operand(
        ctx,
        cur,
        src0_regs,
        SSRC_FLAGS,
        desc.mode.lit,
        Some(RegField::Ssrc0),
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
    let src1_flags = if src0.needs_literal() {
        SSRC_FLAGS | OpFlags::ONLY_INLINE
    } else {
        SSRC_FLAGS
    };
    let mut src1 = match parse_operand(
        ctx,
        cur,
        src1_regs,
        src1_flags,
        desc.mode.lit,
        Some(RegField::Ssrc1),
    ) {
        Some(op) => op,
        None => {
            good = false;
            Operand::default()
        }
    };
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if enc_size == EncSize::Bit64 {
        try_promote_const_to_literal(&mut src0, ctx.arch().is_gcn12());
        try_promote_const_to_literal(&mut src1, ctx.arch().is_gcn12());
    }
    let mut words = [0u32; 2];
    let mut n = 1;
    words[0] = 0x8000_0000
        | ((desc.code as u32) << 23)
        | src0.range.field_value()
        | (src1.range.field_value() << 8)
        | (dst.field_value() << 16);
    if src0.needs_literal() || src1.needs_literal() {
        words[1] = if src0.needs_literal() {
            src0.value
        } else {
            src1.value
        };
        if src0.expr.is_some() || src1.expr.is_some() {
            words[1] = 0;
        }
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
    update_pool_sreg(ctx, &dst, true);
    update_pool_sreg(ctx, &src0.range, false);
    update_pool_sreg(ctx, &src1.range, false);
    true
}

pub fn encode_sop1(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    let mut good = true;
    let mut dst = RegRange::default();
    let has_dst = matches!(desc.mode.arg, ArgMode::Std | ArgMode::DstOnly);
    let has_src = matches!(desc.mode.arg, ArgMode::Std | ArgMode::SrcOnly);
    if has_dst {
        ctx.usage().set_current(0);
        let regs = if desc.mode.dst64 { 2 } else { 1 };
        match parse_sreg_range(
            ctx,
            cur,
            regs,
            Some(RegField::Sdst),
            true,
            OpFlags::SYMREG | OpFlags::WRITE,
        ) {
            Some(r) => dst = r,
            None => good = false,
        }
        if has_src && !skip_required_comma(ctx, cur) {
            return false;
        }
    }
    let mut src0 = Operand::default();
    if has_src {
        ctx.usage().set_current(1);
        let regs = if desc.mode.src0_64 { 2 } else { 1 };
        match parse_operand(ctx, cur, regs, SSRC_FLAGS, desc.mode.lit, Some(RegField::Ssrc0)) {
            Some(op) => src0 = op,
            None => good = false,
        }
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if enc_size == EncSize::Bit64 {
        try_promote_const_to_literal(&mut src0, ctx.arch().is_gcn12());
    }
    let mut words = [0u32; 2];
    let mut n = 1;
    words[0] = 0xbe80_0000
        | ((desc.code as u32) << 8)
        | src0.range.field_value()
        | (dst.field_value() << 16);
    if src0.needs_literal() {
        words[1] = if src0.expr.is_some() { 0 } else { src0.value };
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
    update_pool_sreg(ctx, &dst, true);
    update_pool_sreg(ctx, &src0.range, false);
    true
}

pub fn encode_sopc(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    let mut good = true;
    ctx.usage().set_current(0);
    let src0_regs = if desc.mode.src0_64 { 2 } else { 1 };
    let mut src0 = match parse_operand(
        ctx,
        cur,
        src0_regs,
        SSRC_FLAGS,
        desc.mode.lit,
        Some(RegField::Ssrc0),
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
    let mut src1 = Operand::default();
    let mut imm_expr = None;
    if desc.mode.arg == ArgMode::Src1Imm {
        match parse_imm(ctx, cur, 8, ImmKind::Both) {
            Some(ImmValue { value, expr }) => {
                src1.range = RegRange::new(value as u16 & 0xff, (value as u16 & 0xff) + 1);
                imm_expr = expr;
            }
            None => good = false,
        }
    } else {
        ctx.usage().set_current(1);
        let src1_regs = if desc.mode.src1_64 { 2 } else { 1 };
        let flags = if src0.needs_literal() {
            SSRC_FLAGS | OpFlags::ONLY_INLINE
        } else {
            SSRC_FLAGS
        };
        match parse_operand(ctx, cur, src1_regs, flags, desc.mode.lit, Some(RegField::Ssrc1)) {
            Some(op) => src1 = op,
            None => good = false,
        }
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if enc_size == EncSize::Bit64 {
        try_promote_const_to_literal(&mut src0, ctx.arch().is_gcn12());
        if desc.mode.arg != ArgMode::Src1Imm {
            try_promote_const_to_literal(&mut src1, ctx.arch().is_gcn12());
        }
    }
    let mut words = [0u32; 2];
    let mut n = 1;
    words[0] = 0xbf00_0000
        | ((desc.code as u32) << 16)
        | src0.range.field_value()
        | (src1.range.field_value() << 8);
    if src0.needs_literal() || (desc.mode.arg != ArgMode::Src1Imm && src1.needs_literal()) {
        words[1] = if src0.needs_literal() {
            src0.value
        } else {
            src1.value
        };
        if src0.expr.is_some() || src1.expr.is_some() {
            words[1] = 0;
        }
        n = 2;
    }
    if !check_enc_size(ctx, at, enc_size, n) {
        return false;
    }
    let offset = ctx.out_pos();
    if let Some(expr) = src0.expr.take() {
        ctx.attach(expr, RelocKind::LitImm, offset);
    } else if let Some(expr) = src1.expr.take() {
        ctx.attach(expr, RelocKind::LitImm, offset);
    } else if let Some(expr) = imm_expr {
        ctx.attach(expr, RelocKind::SopcImm8, offset);
    }
    ctx.emit_words(&words[..n]);
    update_pool_sreg(ctx, &src0.range, false);
    update_pool_sreg(ctx, &src1.range, false);
    true
}

// hwreg names, pre-Vega
const HWREG_NAMES: &[(&str, u16)] = &[
    ("gpr_alloc", 5),
    ("hw_id", 4),
    ("ib_dbg0", 12),
    ("ib_dbg1", 13),
    ("ib_sts", 7),
    ("inst_dw0", 10),
    ("inst_dw1", 11),
    ("lds_alloc", 6),
    ("mode", 1),
    ("pc_hi", 9),
    ("pc_lo", 8),
    ("status", 2),
    ("trapsts", 3),
];

// hwreg names, Vega
const HWREG_NAMES_GCN14: &[(&str, u16)] = &[
    ("flush_ib", 14),
    ("gpr_alloc", 5),
    ("hw_id", 4),
    ("ib_dbg0", 12),
    ("ib_dbg1", 13),
    ("ib_sts", 7),
    ("inst_dw0", 10),
    ("inst_dw1", 11),
    ("lds_alloc", 6),
    ("mode", 1),
    ("pc_hi", 9),
    ("pc_lo", 8),
    ("sh_mem_bases", 15),
    ("sq_shader_tba_hi", 17),
    ("sq_shader_tba_lo", 16),
    ("sq_shader_tma_hi", 19),
    ("sq_shader_tma_lo", 18),
    ("status", 2),
    ("trapsts", 3),
];

/// Parse `hwreg(name|@id, offset, size)` and pack the imm16.
fn parse_hwreg(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<u16> {
    cur.skip_spaces();
    let func_at = cur.line_col();
    let Some(name) = cur.parse_name_lower() else {
        ctx.error(func_at, "Expected hwreg function");
        return None;
    };
    if name != "hwreg" || !cur.try_char(b'(') {
        ctx.error(func_at, "Expected hwreg function");
        return None;
    }
    cur.skip_spaces();
    let id = if cur.try_char(b'@') {
        parse_imm(ctx, cur, 6, ImmKind::Unsigned)?.value as u16
    } else {
        let name_at = cur.line_col();
        let reg_name = cur.parse_name_lower().unwrap_or_default();
        let key = reg_name.strip_prefix("hwreg_").unwrap_or(&reg_name);
        let table = if ctx.arch().is_gcn14() {
            HWREG_NAMES_GCN14
        } else {
            HWREG_NAMES
        };
        let Some(&(_, id)) = table.iter().find(|(n, _)| *n == key) else {
            ctx.error(name_at, "Unknown HWRegister");
            return None;
        };
        if id == 13 && !ctx.arch().is_gcn12() {
            ctx.error(name_at, "Unknown HWRegister");
            return None;
        }
        id
    };
    if !cur.try_char(b',') {
        let at = cur.line_col();
        ctx.error(at, "Expected ',' before argument");
        return None;
    }
    cur.skip_spaces();
    let off_at = cur.line_col();
    let offset = parse_imm(ctx, cur, 0, ImmKind::Unsigned)?.value;
    if offset >= 32 {
        ctx.warn(off_at, "Second argument out of range (0-31)");
    }
    if !cur.try_char(b',') {
        let at = cur.line_col();
        ctx.error(at, "Expected ',' before argument");
        return None;
    }
    cur.skip_spaces();
    let size_at = cur.line_col();
    let size = parse_imm(ctx, cur, 0, ImmKind::Unsigned)?.value;
    if size < 1 || size > 32 {
        ctx.warn(size_at, "Third argument out of range (1-32)");
    }
    if !cur.try_char(b')') {
        let at = cur.line_col();
        ctx.error(at, "Unterminated hwreg function");
        return None;
    }
    Some(id | ((offset as u16 & 31) << 6) | (((size as u16).wrapping_sub(1) & 31) << 11))
}

pub fn encode_sopk(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    let mut good = true;
    let mut dst = RegRange::default();
    ctx.usage().set_current(0);
    let do_write = !desc.mode.dst_no_write && desc.mode.arg != ArgMode::ImmRel;
    let mut rw_flag = if do_write {
        OpFlags::WRITE
    } else {
        OpFlags::READ
    };
    if desc.mode.dst_read && do_write {
        rw_flag |= OpFlags::READ;
    }
    if !desc.mode.imm_dst {
        let regs = if desc.mode.dst64 { 2 } else { 1 };
        match parse_sreg_range(ctx, cur, regs, Some(RegField::Sdst), true, OpFlags::SYMREG | rw_flag)
        {
            Some(r) => dst = r,
            None => good = false,
        }
        if !skip_required_comma(ctx, cur) {
            return false;
        }
    }
    let mut imm16: u16 = 0;
    let mut imm16_expr = None;
    match desc.mode.arg {
        ArgMode::ImmRel => {
            let Some(target) = parse_jump_target(ctx, cur) else {
                return false;
            };
            if target.expr.is_none() {
                imm16 = resolve_jump(ctx, desc, at, &target, &mut good);
            }
            imm16_expr = target.expr;
        }
        ArgMode::ImmSreg => match parse_hwreg(ctx, cur) {
            Some(v) => imm16 = v,
            None => return false,
        },
        _ => match parse_imm(ctx, cur, 16, ImmKind::Both) {
            Some(ImmValue { value, expr }) => {
                imm16 = value as u16;
                imm16_expr = expr;
            }
            None => good = false,
        },
    }
    let mut imm32: u32 = 0;
    let mut imm32_expr = None;
    if desc.mode.imm_dst {
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        if desc.mode.sopk_const {
            match parse_imm(ctx, cur, 32, ImmKind::Both) {
                Some(ImmValue { value, expr }) => {
                    imm32 = value as u32;
                    imm32_expr = expr;
                }
                None => good = false,
            }
        } else {
            let regs = if desc.mode.dst64 { 2 } else { 1 };
            match parse_sreg_range(
                ctx,
                cur,
                regs,
                Some(RegField::Sdst),
                true,
                OpFlags::SYMREG | OpFlags::READ,
            ) {
                Some(r) => dst = r,
                None => good = false,
            }
        }
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    let n = if desc.mode.sopk_const { 2 } else { 1 };
    if !check_enc_size(ctx, at, enc_size, n) {
        return false;
    }
    let mut words = [0u32; 2];
    words[0] = 0xb000_0000
        | imm16 as u32
        | (dst.field_value() << 16)
        | ((desc.code as u32) << 23);
    words[1] = imm32;
    let offset = ctx.out_pos();
    if let Some(expr) = imm32_expr {
        ctx.attach(expr, RelocKind::LitImm, offset);
    }
    if let Some(expr) = imm16_expr {
        let kind = if desc.mode.arg == ArgMode::ImmRel {
            RelocKind::SopJmp
        } else {
            RelocKind::SopkImm16
        };
        ctx.attach(expr, kind, offset);
    }
    ctx.emit_words(&words[..n]);
    update_pool_sreg(ctx, &dst, do_write && !desc.mode.imm_dst);
    true
}

// message names, pre-Vega; savewave needs GCN 1.2
const MSG_NAMES: &[(&str, u16)] = &[
    ("gs", 2),
    ("gs_done", 3),
    ("interrupt", 1),
    ("savewave", 4),
    ("sysmsg", 15),
    ("system", 15),
];

const MSG_NAMES_GCN14: &[(&str, u16)] = &[
    ("early_prim_dealloc", 8),
    ("get_doorbell", 10),
    ("gs", 2),
    ("gs_alloc_req", 9),
    ("gs_done", 3),
    ("halt_waves", 6),
    ("interrupt", 1),
    ("ordered_ps_done", 7),
    ("savewave", 4),
    ("stall_wave_gen", 5),
    ("sysmsg", 15),
    ("system", 15),
];

const GSOP_NAMES: [&str; 4] = ["nop", "cut", "emit", "emit_cut"];

/// Parse `sendmsg(message[, gsop[, streamid]])` and pack the imm16.
fn parse_sendmsg(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<u16> {
    cur.skip_spaces();
    let func_at = cur.line_col();
    let Some(name) = cur.parse_name_lower() else {
        ctx.error(func_at, "Expected sendmsg function");
        return None;
    };
    if name != "sendmsg" || !cur.try_char(b'(') {
        ctx.error(func_at, "Expected sendmsg function");
        return None;
    }
    cur.skip_spaces();
    let message = if cur.try_char(b'@') {
        parse_imm(ctx, cur, 4, ImmKind::Unsigned)?.value as u16
    } else {
        let name_at = cur.line_col();
        let msg_name = cur.parse_name_lower().unwrap_or_default();
        let key = msg_name.strip_prefix("msg_").unwrap_or(&msg_name);
        let table = if ctx.arch().is_gcn14() {
            MSG_NAMES_GCN14
        } else {
            MSG_NAMES
        };
        match table.iter().find(|(n, _)| *n == key) {
            Some(&(_, id)) if id != 4 || ctx.arch().is_gcn12() => id,
            _ => {
                ctx.error(name_at, "Unknown message");
                return None;
            }
        }
    };
    let mut gsop = 0u16;
    let mut stream = 0u16;
    if message == 2 || message == 3 {
        if !cur.try_char(b',') {
            let at = cur.line_col();
            ctx.error(at, "Expected ',' before argument");
            return None;
        }
        cur.skip_spaces();
        if cur.try_char(b'@') {
            gsop = parse_imm(ctx, cur, 3, ImmKind::Unsigned)?.value as u16;
        } else {
            let gsop_at = cur.line_col();
            let gsop_name = cur.parse_name_lower().unwrap_or_default();
            let key = gsop_name.strip_prefix("gs_op_").unwrap_or(&gsop_name);
            match GSOP_NAMES.iter().position(|n| *n == key) {
                Some(i) => gsop = i as u16,
                None => {
                    // the historical spelling 'emit-cut'
                    if key == "emit" && cur.rest().starts_with("-cut") {
                        cur.advance(4);
                        gsop = 3;
                    } else {
                        ctx.error(gsop_at, "Unknown GSOP");
                        return None;
                    }
                }
            }
        }
        if gsop != 0 {
            if !cur.try_char(b',') {
                let at = cur.line_col();
                ctx.error(at, "Expected ',' before argument");
                return None;
            }
            cur.skip_spaces();
            let stream_at = cur.line_col();
            let value = parse_imm(ctx, cur, 0, ImmKind::Unsigned)?.value;
            if value > 3 {
                ctx.warn(stream_at, "StreamId (3rd argument) out of range");
            }
            stream = value as u16 & 3;
        }
    }
    if !cur.try_char(b')') {
        let at = cur.line_col();
        ctx.error(at, "Unterminated sendmsg function");
        return None;
    }
    Some(message | (gsop << 4) | (stream << 8))
}

/// Parse the `s_waitcnt` counter list: `name(value)` joined by `&`.
fn parse_waitcnt(ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>) -> Option<u16> {
    let gcn14 = ctx.arch().is_gcn14();
    let mut imm16: u16 = if gcn14 { 0xcf7f } else { 0xf7f };
    let mut have_vm = false;
    let mut have_exp = false;
    let mut have_lgkm = false;
    loop {
        cur.skip_spaces();
        let name_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            ctx.error(name_at, "Expected vmcnt, lgkmcnt or expcnt");
            return None;
        };
        let (bit_pos, bit_mask, is_vm) = match name.as_str() {
            "vmcnt" => {
                if have_vm {
                    ctx.warn(name_at, "vmcnt was already defined");
                }
                have_vm = true;
                (0u16, if gcn14 { 63u16 } else { 15 }, true)
            }
            "expcnt" => {
                if have_exp {
                    ctx.warn(name_at, "expcnt was already defined");
                }
                have_exp = true;
                (4, 7, false)
            }
            "lgkmcnt" => {
                if have_lgkm {
                    ctx.warn(name_at, "lgkmcnt was already defined");
                }
                have_lgkm = true;
                (8, 15, false)
            }
            _ => {
                ctx.error(name_at, "Expected vmcnt, lgkmcnt or expcnt");
                return None;
            }
        };
        if !cur.try_char(b'(') {
            let at = cur.line_col();
            ctx.error(at, "Expected '(' after counter name");
            return None;
        }
        cur.skip_spaces();
        let value_at = cur.line_col();
        let value = parse_imm(ctx, cur, 0, ImmKind::Unsigned)?.value as u16;
        if value > bit_mask {
            ctx.warn(value_at, "Value out of range");
        }
        if gcn14 && is_vm {
            // Vega vmcnt is 6 bits: low 4 at [3:0], high 2 at [15:14]
            imm16 = (imm16 & 0x3ff0) | (value & 15) | ((value & 0x30) << 10);
        } else {
            imm16 = (imm16 & !(bit_mask << bit_pos)) | ((value & bit_mask) << bit_pos);
        }
        if !cur.try_char(b')') {
            let at = cur.line_col();
            ctx.error(at, "Unterminated function");
            return None;
        }
        if cur.at_end() {
            break;
        }
        cur.try_char(b'&');
        if cur.at_end() {
            break;
        }
    }
    Some(imm16)
}

pub fn encode_sopp(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit64 {
        ctx.error(at, "Only 32-bit size for SOPP encoding");
        return false;
    }
    let mut good = true;
    let mut imm16: u16 = 0;
    let mut imm16_expr = None;
    match desc.mode.arg {
        ArgMode::ImmRel => {
            let Some(target) = parse_jump_target(ctx, cur) else {
                return false;
            };
            if target.expr.is_none() {
                imm16 = resolve_jump(ctx, desc, at, &target, &mut good);
            }
            imm16_expr = target.expr;
        }
        ArgMode::ImmLocks => match parse_waitcnt(ctx, cur) {
            Some(v) => imm16 = v,
            None => return false,
        },
        ArgMode::ImmMsgs => match parse_sendmsg(ctx, cur) {
            Some(v) => imm16 = v,
            None => return false,
        },
        ArgMode::ImmNone => {
            // end-of-program markers contribute an END edge
            if desc.flow == Some(crate::core::section::CodeFlowKind::End) {
                let pos = ctx.out_pos();
                ctx.add_code_flow(pos + 4, 0, crate::core::section::CodeFlowKind::End);
            }
        }
        _ => match parse_imm(ctx, cur, 16, ImmKind::Both) {
            Some(ImmValue { value, expr }) => {
                imm16 = value as u16;
                imm16_expr = expr;
            }
            None => good = false,
        },
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    let word =
        0xbf80_0000u32 | imm16 as u32 | ((desc.code as u32) << 16);
    let offset = ctx.out_pos();
    if let Some(expr) = imm16_expr {
        let kind = if desc.mode.arg == ArgMode::ImmRel {
            RelocKind::SopJmp
        } else {
            RelocKind::SopkImm16
        };
        ctx.attach(expr, kind, offset);
    }
    ctx.emit_words(&[word]);
    true
}
