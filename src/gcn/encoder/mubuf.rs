// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! MUBUF and MTBUF (untyped/typed buffer) encoder.

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::encoder::check_enc_size;
use crate::gcn::operand::{
    parse_imm, parse_operand, parse_sreg_range, parse_vreg_range, ImmKind, Operand, OpFlags,
};
use crate::gcn::registry::{ArgMode, Encoding, InsnDesc, LitType};
use crate::gcn::regs::RegRange;
use crate::gcn::reloc::RelocKind;
use crate::gcn::usage::{add_tfe_lane, split_halfwrite, RegField, RwFlags};
use crate::gcn::{check_garbage_at_end, skip_required_comma, AsmContext, EncSize};

// data format names for the MTBUF format modifier
const DFMT_NAMES: &[(&str, u32)] = &[
    ("10_10_10_2", 8),
    ("10_11_11", 6),
    ("11_11_10", 7),
    ("16", 2),
    ("16_16", 5),
    ("16_16_16_16", 12),
    ("2_10_10_10", 9),
    ("32", 4),
    ("32_32", 11),
    ("32_32_32", 13),
    ("32_32_32_32", 14),
    ("8", 1),
    ("8_8", 3),
    ("8_8_8_8", 10),
];

const NFMT_NAMES: &[(&str, u32)] = &[
    ("float", 7),
    ("sint", 5),
    ("snorm", 1),
    ("snorm_ogl", 6),
    ("sscaled", 3),
    ("uint", 4),
    ("unorm", 0),
    ("uscaled", 2),
];

/// Parse `format:[dfmt,nfmt]` with the `buf_data_format_`/`buf_num_format_`
/// long names accepted.
fn parse_format(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    dfmt: &mut u32,
    nfmt: &mut u32,
) -> bool {
    if !cur.try_char(b':') {
        let at = cur.line_col();
        ctx.error(at, "Expected ':' before format");
        return false;
    }
    if !cur.try_char(b'[') {
        let at = cur.line_col();
        ctx.error(at, "Expected '[' before format");
        return false;
    }
    cur.skip_spaces();
    let mut have_nfmt = false;
    if cur.try_char(b'@') {
        match parse_imm(ctx, cur, 4, ImmKind::Unsigned) {
            Some(imm) => *dfmt = imm.value as u32,
            None => return false,
        }
    } else {
        let at = cur.line_col();
        let name = cur.parse_name_lower().unwrap_or_default();
        let dkey = name.strip_prefix("buf_data_format_").unwrap_or(&name);
        if let Some(&(_, value)) = DFMT_NAMES.iter().find(|(n, _)| *n == dkey) {
            *dfmt = value;
        } else {
            let nkey = name.strip_prefix("buf_num_format_").unwrap_or(&name);
            if let Some(&(_, value)) = NFMT_NAMES.iter().find(|(n, _)| *n == nkey) {
                *nfmt = value;
                have_nfmt = true;
            } else {
                ctx.error(at, "Unknown data/number format");
                return false;
            }
        }
    }
    if !have_nfmt && cur.try_char(b',') {
        cur.skip_spaces();
        if cur.try_char(b'@') {
            match parse_imm(ctx, cur, 3, ImmKind::Unsigned) {
                Some(imm) => *nfmt = imm.value as u32,
                None => return false,
            }
        } else {
            let at = cur.line_col();
            let name = cur.parse_name_lower().unwrap_or_default();
            let nkey = name.strip_prefix("buf_num_format_").unwrap_or(&name);
            match NFMT_NAMES.iter().find(|(n, _)| *n == nkey) {
                Some(&(_, value)) => *nfmt = value,
                None => {
                    ctx.error(at, "Unknown number format");
                    return false;
                }
            }
        }
    }
    if !cur.try_char(b']') {
        let at = cur.line_col();
        ctx.error(at, "Unterminated format modifier");
        return false;
    }
    true
}

pub fn encode_mxbuf(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
) -> bool {
    if enc_size == EncSize::Bit32 {
        ctx.error(at, "Only 64-bit size for MUBUF/MTBUF encoding");
        return false;
    }
    let mtbuf = desc.encoding == Encoding::Mtbuf;
    let gcn12 = ctx.arch().is_gcn12();
    let gcn14 = ctx.arch().is_gcn14();
    let mut good = true;
    let mut vaddr = RegRange::default();
    let mut vdata = RegRange::default();
    let mut srsrc = RegRange::default();
    let mut soffset = Operand::default();
    let mut parsed_vaddr = false;
    cur.skip_spaces();
    let vdata_mark = cur.pos;
    let mut vaddr_mark = cur.pos;
    if desc.mode.arg != ArgMode::ArgNone {
        if desc.mode.arg != ArgMode::MubufNoVad {
            ctx.usage().set_current(0);
            match parse_vreg_range(ctx, cur, 0, Some(RegField::MVdata), true, OpFlags::SYMREG | OpFlags::READ) {
                Some(r) => vdata = r,
                None => good = false,
            }
            if !skip_required_comma(ctx, cur) {
                return false;
            }
            cur.skip_spaces();
            vaddr_mark = cur.pos;
            ctx.usage().set_current(1);
            match parse_vreg_range(ctx, cur, 0, Some(RegField::MVaddr), false, OpFlags::SYMREG | OpFlags::READ) {
                Some(r) => vaddr = r,
                None => good = false,
            }
            if vaddr.is_set() {
                parsed_vaddr = true;
                if !skip_required_comma(ctx, cur) {
                    return false;
                }
            } else {
                // the placeholder 'off' stands for a disabled vaddr
                if cur.try_keyword("off") && !skip_required_comma(ctx, cur) {
                    return false;
                }
                vaddr = RegRange::new(256, 257);
            }
        }
        ctx.usage().set_current(2);
        match parse_sreg_range(ctx, cur, 4, Some(RegField::MSrsrc), true, OpFlags::SYMREG | OpFlags::READ)
        {
            Some(r) => srsrc = r,
            None => good = false,
        }
        if !skip_required_comma(ctx, cur) {
            return false;
        }
        ctx.usage().set_current(3);
        match parse_operand(
            ctx,
            cur,
            1,
            OpFlags::SREGS
                | OpFlags::SSOURCE
                | OpFlags::SYMREG
                | OpFlags::ONLY_INLINE
                | OpFlags::NO_LIT_MUBUF
                | OpFlags::READ,
            LitType::Int,
            Some(RegField::MSoffset),
        ) {
            Some(op) => soffset = op,
            None => good = false,
        }
    }
    // modifiers
    let mut offset: u32 = 0;
    let mut offset_expr = None;
    let mut have_offset = false;
    let mut have_format = false;
    let mut dfmt: u32 = 1;
    let mut nfmt: u32 = 0;
    let mut have_addr64 = false;
    let mut have_tfe = false;
    let mut have_slc = false;
    let mut have_lds = false;
    let mut have_glc = false;
    let mut have_offen = false;
    let mut have_idxen = false;
    while !cur.at_end() {
        let mod_at = cur.line_col();
        let Some(name) = cur.parse_name_lower() else {
            let kind = if mtbuf { "MTBUF" } else { "MUBUF" };
            ctx.error(mod_at, &format!("Expected {} modifier", kind));
            return false;
        };
        match name.as_str() {
            "offen" => have_offen = true,
            "idxen" => have_idxen = true,
            "offset" => {
                if !cur.try_char(b':') {
                    ctx.error(mod_at, "Expected ':' before offset");
                    good = false;
                    continue;
                }
                match parse_imm(ctx, cur, 12, ImmKind::Unsigned) {
                    Some(imm) => {
                        if have_offset {
                            ctx.warn(mod_at, "Offset is already defined");
                        }
                        have_offset = true;
                        offset = imm.value as u32;
                        offset_expr = imm.expr;
                    }
                    None => good = false,
                }
            }
            "format" if mtbuf => {
                if parse_format(ctx, cur, &mut dfmt, &mut nfmt) {
                    if have_format {
                        ctx.warn(mod_at, "Format is already defined");
                    }
                    have_format = true;
                } else {
                    good = false;
                }
            }
            "addr64" if !gcn12 => have_addr64 = true,
            "tfe" => have_tfe = true,
            "glc" => have_glc = true,
            "slc" => have_slc = true,
            "lds" if !mtbuf => have_lds = true,
            _ => {
                let kind = if mtbuf { "MTBUF" } else { "MUBUF" };
                ctx.error(mod_at, &format!("Unknown {} modifier", kind));
                good = false;
            }
        }
    }
    // data range checks
    let vdata_to_write = desc.mode.mem_load || (desc.mode.mem_atomic && have_glc);
    let vdata_to_read = !desc.mode.mem_load || desc.mode.mem_atomic;
    if vdata.is_set() {
        let mut dregs = desc.mode.dsize as u16;
        if desc.mode.d16 && gcn14 {
            dregs = (dregs + 1) >> 1;
        }
        dregs += have_tfe as u16;
        if vdata.len() != dregs {
            let at = cur.line_col_at(vdata_mark);
            let plural = if dregs > 1 { "s" } else { "" };
            ctx.error(at, &format!("Required {} vector register{}", dregs, plural));
            good = false;
        }
    }
    if vaddr.is_set() {
        if !parsed_vaddr && (have_idxen || have_offen || have_addr64) {
            let at = cur.line_col_at(vaddr_mark);
            ctx.error(at, "VADDR is required if idxen, offen or addr64 is enabled");
            good = false;
        } else if parsed_vaddr {
            let want = if (have_offen && have_idxen) || have_addr64 { 2 } else { 1 };
            if vaddr.len() != want {
                let at = cur.line_col_at(vaddr_mark);
                let plural = if want > 1 { "s" } else { "" };
                ctx.error(at, &format!("Required {} vector register{}", want, plural));
                good = false;
            }
        }
    }
    // usage fixes
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
    let mut vdata_divided = false;
    if desc.mode.halfwrite && vdata_to_write && !have_lds && ctx.usage().slot(0).is_some() {
        split_halfwrite(ctx.usage(), 0, 4, RegField::MVdataH);
        vdata_divided = true;
    }
    if !have_addr64 && !have_offen && !have_idxen {
        // the address register is not read without an addressing mode
        ctx.usage().clear_slot(1);
    }
    if !good || !check_garbage_at_end(ctx, cur) {
        return false;
    }
    if have_addr64 && (have_offen || have_idxen) {
        ctx.error(at, "Idxen and offen must be zero in 64-bit address mode");
        return false;
    }
    if have_tfe && have_lds {
        ctx.error(at, "Both LDS and TFE is illegal");
        return false;
    }
    if have_lds {
        // LDS transfers bypass VDATA
        ctx.usage().clear_slot(0);
    }
    if have_tfe && ctx.usage().slot(if vdata_divided { 4 } else { 0 }).is_some() {
        let from = if vdata_divided { 4 } else { 0 };
        add_tfe_lane(ctx.usage(), from, 5, RegField::MVdataLast);
    }
    let offset_pos = ctx.out_pos();
    if let Some(expr) = offset_expr {
        ctx.attach(expr, RelocKind::MxBufOffset, offset_pos);
    }
    let word0 = if !mtbuf {
        0xe000_0000u32
            | offset
            | if have_offen { 0x1000 } else { 0 }
            | if have_idxen { 0x2000 } else { 0 }
            | if have_glc { 0x4000 } else { 0 }
            | if have_addr64 && !gcn12 { 0x8000 } else { 0 }
            | if have_lds { 0x1_0000 } else { 0 }
            | if have_slc && gcn12 { 0x2_0000 } else { 0 }
            | ((desc.code as u32) << 18)
    } else {
        let code = if gcn12 {
            (desc.code as u32) << 15
        } else {
            (desc.code as u32) << 16
        };
        0xe800_0000u32
            | offset
            | if have_offen { 0x1000 } else { 0 }
            | if have_idxen { 0x2000 } else { 0 }
            | if have_glc { 0x4000 } else { 0 }
            | if have_addr64 && !gcn12 { 0x8000 } else { 0 }
            | code
            | (dfmt << 19)
            | (nfmt << 23)
    };
    let word1 = (vaddr.field_value() & 0xff)
        | ((vdata.field_value() & 0xff) << 8)
        | ((srsrc.field_value() >> 2) << 16)
        | if have_slc && (!gcn12 || mtbuf) { 1 << 22 } else { 0 }
        | if have_tfe { 1 << 23 } else { 0 }
        | (soffset.range.field_value() << 24);
    if !check_enc_size(ctx, at, enc_size, 2) {
        return false;
    }
    ctx.emit_words(&[word0, word1]);
    if vdata.is_set() && !vdata.is_var() && (vdata_to_write || have_tfe) && !have_lds {
        ctx.reg_pool().update_vgpr(vdata.end);
    }
    if soffset.range.is_set() && !soffset.range.is_var() && soffset.range.start < 128 {
        ctx.reg_pool().update_flags(soffset.range.start);
    }
    true
}
