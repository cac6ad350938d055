// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operand parsing: register ranges, named specials, inline constants,
//! literal expressions, and the VOP modifier wrappers `abs()`, `-`, `|x|`
//! and `sext()`.

use bitflags::bitflags;

use crate::core::cursor::LineCursor;
use crate::core::expr::{parse_int_literal, Expression, SECT_ABS};
use crate::gcn::regs::{fixed, sgpr_alignment, RegRange};
use crate::gcn::registry::LitType;
use crate::gcn::usage::{RegField, RwFlags};
use crate::gcn::AsmContext;

bitflags! {
    /// Operand-parse behaviour flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpFlags: u32 {
        /// Accept scalar registers.
        const SREGS = 1 << 0;
        /// Accept vector registers.
        const VREGS = 1 << 1;
        /// Accept scalar special sources (constants, SCC, VCCZ, literals).
        const SSOURCE = 1 << 2;
        /// Accept the LDS direct source.
        const LDS = 1 << 3;
        /// A literal slot is already taken; only inline constants remain.
        const ONLY_INLINE = 1 << 4;
        /// Literal-needed errors say "illegal in VOP3".
        const NO_LIT_ERROR = 1 << 5;
        /// Literal-needed errors say "illegal in SOFFSET".
        const NO_LIT_MUBUF = 1 << 6;
        /// Skip the SGPR natural-alignment check.
        const UNALIGNED = 1 << 7;
        /// Accept `abs()`, `-`, `|x|` wrappers.
        const VOP3MODS = 1 << 8;
        /// Accept only the `-` wrapper (VOP3B).
        const VOP3NEG = 1 << 9;
        /// `sext()` is not recognised even with VOP3MODS.
        const NOSEXT = 1 << 10;
        /// Accept register variables.
        const SYMREG = 1 << 11;
        /// Operand is read.
        const READ = 1 << 12;
        /// Operand is written.
        const WRITE = 1 << 13;
    }
}

impl OpFlags {
    pub fn rw(self) -> RwFlags {
        let mut rw = RwFlags::empty();
        if self.contains(OpFlags::READ) {
            rw |= RwFlags::READ;
        }
        if self.contains(OpFlags::WRITE) {
            rw |= RwFlags::WRITE;
        }
        rw
    }
}

bitflags! {
    /// VOP operand modifiers attached to one source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VopMods: u8 {
        const NEG = 1;
        const ABS = 2;
        const SEXT = 4;
    }
}

/// A parsed operand: register range or constant, the literal value when the
/// range is the literal slot, a pending expression for deferred literals,
/// and modifier wrappers.
#[derive(Debug, Default)]
pub struct Operand {
    pub range: RegRange,
    pub value: u32,
    pub expr: Option<Expression>,
    pub mods: VopMods,
}

impl Operand {
    pub fn is_set(&self) -> bool {
        self.range.is_set()
    }

    pub fn needs_literal(&self) -> bool {
        self.range.is_val(fixed::LITERAL)
    }
}

/// An immediate field value, possibly deferred.
#[derive(Debug, Default)]
pub struct ImmValue {
    pub value: u64,
    pub expr: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmKind {
    Unsigned,
    Signed,
    Both,
}

fn fits(value: u64, bits: u8, kind: ImmKind) -> bool {
    if bits == 0 || bits >= 64 {
        return true;
    }
    let unsigned = value < (1u64 << bits);
    let v = value as i64;
    let signed = v >= -(1i64 << (bits - 1)) && v < (1i64 << (bits - 1));
    match kind {
        ImmKind::Unsigned => unsigned,
        ImmKind::Signed => signed,
        ImmKind::Both => unsigned || signed,
    }
}

/// Parse an immediate expression; deferred when symbols are unresolved.
pub fn parse_imm(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    bits: u8,
    kind: ImmKind,
) -> Option<ImmValue> {
    cur.skip_spaces();
    let at = cur.line_col();
    let expr = ctx.parse_expression(cur)?;
    match ctx.eval(&expr) {
        Ok(Some((value, section))) => {
            if section != SECT_ABS {
                ctx.error(at, "Relative value is illegal in immediate expressions");
                return None;
            }
            if !fits(value, bits, kind) {
                ctx.warn(at, "Value out of range");
            }
            Some(ImmValue { value, expr: None })
        }
        Ok(None) => Some(ImmValue {
            value: 0,
            expr: Some(expr),
        }),
        Err(()) => None,
    }
}

/// Parse a `modifier:value` immediate, the `:` already pending.
pub fn parse_mod_imm(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    name: &str,
    bits: u8,
    kind: ImmKind,
) -> Option<ImmValue> {
    if !cur.try_char(b':') {
        let at = cur.line_col();
        ctx.error(at, &format!("Expected ':' before {}", name));
        return None;
    }
    cur.try_char(b'@');
    parse_imm(ctx, cur, bits, kind)
}

struct NamedReg {
    start: u16,
    size: u16,
}

fn named_scalar(name: &str) -> Option<NamedReg> {
    let (start, size) = match name {
        "vcc" => (fixed::VCC, 2),
        "vcc_lo" => (fixed::VCC, 1),
        "vcc_hi" => (fixed::VCC + 1, 1),
        "tba" => (fixed::TBA, 2),
        "tba_lo" => (fixed::TBA, 1),
        "tba_hi" => (fixed::TBA + 1, 1),
        "tma" => (fixed::TMA, 2),
        "tma_lo" => (fixed::TMA, 1),
        "tma_hi" => (fixed::TMA + 1, 1),
        "m0" => (fixed::M0, 1),
        "exec" => (fixed::EXEC, 2),
        "exec_lo" => (fixed::EXEC, 1),
        "exec_hi" => (fixed::EXEC + 1, 1),
        _ => {
            if let Some(rest) = name.strip_prefix("ttmp") {
                let n: u16 = rest.parse().ok()?;
                if n > 11 {
                    return None;
                }
                (fixed::TTMP0 + n, 1)
            } else {
                return None;
            }
        }
    };
    Some(NamedReg { start, size })
}

/// Parse `[a:b]` or `[a]` after a register-class prefix.
fn parse_bracket_range(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
) -> Option<(u16, u16)> {
    // '[' already consumed
    cur.skip_spaces();
    let at = cur.line_col();
    let first = match parse_int_literal(cur) {
        Ok(v) => v,
        Err(_) => {
            ctx.error(at, "Expected register index");
            return None;
        }
    };
    let last = if cur.try_char(b':') {
        cur.skip_spaces();
        let at = cur.line_col();
        match parse_int_literal(cur) {
            Ok(v) => v,
            Err(_) => {
                ctx.error(at, "Expected register index");
                return None;
            }
        }
    } else {
        first
    };
    if !cur.try_char(b']') {
        let at = cur.line_col();
        ctx.error(at, "Unterminated register range");
        return None;
    }
    if last < first || last >= 512 {
        ctx.error(at, "Illegal register range");
        return None;
    }
    Some((first as u16, last as u16))
}

fn check_count(
    ctx: &mut dyn AsmContext,
    cur: &LineCursor<'_>,
    mark: usize,
    got: u16,
    want: u16,
    scalar: bool,
) -> bool {
    if want != 0 && got != want {
        let at = cur.line_col_at(mark);
        let kind = if scalar { "scalar" } else { "vector" };
        let plural = if want > 1 { "s" } else { "" };
        ctx.error(at, &format!("Required {} {} register{}", want, kind, plural));
        false
    } else {
        true
    }
}

/// Parse a scalar register range: `sN`, `s[a:b]`, a named special, a TTMP
/// range, or a scalar register variable.
///
/// With `required` false, a non-register operand rewinds and yields an
/// empty range without a diagnostic.
pub fn parse_sreg_range(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    regs_num: u16,
    field: Option<RegField>,
    required: bool,
    flags: OpFlags,
) -> Option<RegRange> {
    cur.skip_spaces();
    let mark = cur.pos;
    let missing = |ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>| {
        if required {
            let at = cur.line_col_at(mark);
            ctx.error(at, "Expected scalar register");
            None
        } else {
            cur.pos = mark;
            Some(RegRange::default())
        }
    };
    let Some(name) = cur.parse_name_lower() else {
        return missing(ctx, cur);
    };
    let range = if let Some(named) = named_scalar(&name) {
        RegRange::new(named.start, named.start + named.size)
    } else if name == "ttmp" && cur.peek() == Some(b'[') {
        cur.bump();
        let (first, last) = parse_bracket_range(ctx, cur)?;
        if last > 11 {
            let at = cur.line_col_at(mark);
            ctx.error(at, "Trap temporary register number out of range");
            return None;
        }
        RegRange::new(fixed::TTMP0 + first, fixed::TTMP0 + last + 1)
    } else if name == "s" && cur.peek() == Some(b'[') {
        cur.bump();
        let (first, last) = parse_bracket_range(ctx, cur)?;
        if last > 103 {
            let at = cur.line_col_at(mark);
            ctx.error(at, "Scalar register number out of range");
            return None;
        }
        RegRange::new(first, last + 1)
    } else if let Some(digits) = name.strip_prefix('s').filter(|d| {
        !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit())
    }) {
        let n: u32 = digits.parse().unwrap_or(512);
        if n > 103 {
            let at = cur.line_col_at(mark);
            ctx.error(at, "Scalar register number out of range");
            return None;
        }
        RegRange::new(n as u16, n as u16 + 1)
    } else if flags.contains(OpFlags::SYMREG) {
        match ctx.regvar(&name) {
            Some(var) if !var.vector => RegRange::for_var(var),
            _ => return missing(ctx, cur),
        }
    } else {
        return missing(ctx, cur);
    };
    if !check_count(ctx, cur, mark, range.len(), regs_num, true) {
        return None;
    }
    let align = sgpr_alignment(range.len());
    if !flags.contains(OpFlags::UNALIGNED)
        && !range.is_var()
        && range.start < 104
        && range.start % align != 0
    {
        let at = cur.line_col_at(mark);
        ctx.error(at, "Unaligned scalar register range");
        return None;
    }
    if let Some(field) = field {
        let align = if flags.contains(OpFlags::UNALIGNED) { 1 } else { align };
        ctx.usage().record(field, range.clone(), flags.rw(), align as u8);
    }
    Some(range)
}

/// Parse a vector register range: `vN`, `v[a:b]`, or a vector register
/// variable. VGPR ranges carry no alignment rule.
pub fn parse_vreg_range(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    regs_num: u16,
    field: Option<RegField>,
    required: bool,
    flags: OpFlags,
) -> Option<RegRange> {
    cur.skip_spaces();
    let mark = cur.pos;
    let missing = |ctx: &mut dyn AsmContext, cur: &mut LineCursor<'_>| {
        if required {
            let at = cur.line_col_at(mark);
            ctx.error(at, "Expected vector register");
            None
        } else {
            cur.pos = mark;
            Some(RegRange::default())
        }
    };
    let Some(name) = cur.parse_name_lower() else {
        return missing(ctx, cur);
    };
    let range = if name == "v" && cur.peek() == Some(b'[') {
        cur.bump();
        let (first, last) = parse_bracket_range(ctx, cur)?;
        if last > 255 {
            let at = cur.line_col_at(mark);
            ctx.error(at, "Vector register number out of range");
            return None;
        }
        RegRange::new(fixed::VGPR0 + first, fixed::VGPR0 + last + 1)
    } else if let Some(digits) = name.strip_prefix('v').filter(|d| {
        !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit())
    }) {
        let n: u32 = digits.parse().unwrap_or(512);
        if n > 255 {
            let at = cur.line_col_at(mark);
            ctx.error(at, "Vector register number out of range");
            return None;
        }
        RegRange::new(fixed::VGPR0 + n as u16, fixed::VGPR0 + n as u16 + 1)
    } else if flags.contains(OpFlags::SYMREG) {
        match ctx.regvar(&name) {
            Some(var) if var.vector => RegRange::for_var(var),
            _ => return missing(ctx, cur),
        }
    } else {
        return missing(ctx, cur);
    };
    if !check_count(ctx, cur, mark, range.len(), regs_num, false) {
        return None;
    }
    if let Some(field) = field {
        ctx.usage().record(field, range.clone(), flags.rw(), 1);
    }
    Some(range)
}

const FLOAT_INLINE_F32: [u32; 8] = [
    0x3f000000, 0xbf000000, 0x3f800000, 0xbf800000, 0x40000000, 0xc0000000, 0x40800000, 0xc0800000,
];
const FLOAT_INLINE_F16: [u16; 8] = [
    0x3800, 0xb800, 0x3c00, 0xbc00, 0x4000, 0xc000, 0x4400, 0xc400,
];
const FLOAT_INLINE_F64_HI: [u32; 8] = [
    0x3fe00000, 0xbfe00000, 0x3ff00000, 0xbff00000, 0x40000000, 0xc0000000, 0x40100000, 0xc0100000,
];

/// f32 bit pattern of 1/(2*PI), the ninth inline constant on GCN 1.2+.
pub const INV_2PI_F32: u32 = 0x3e22f983;
/// f16 bit pattern of 1/(2*PI).
pub const INV_2PI_F16: u16 = 0x3118;

/// Convert an f64 value to IEEE half-precision bits (round to nearest even).
pub fn f16_bits(value: f64) -> u16 {
    let bits = (value as f32).to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32;
    let mant = bits & 0x7f_ffff;
    if exp == 0xff {
        // infinity or NaN
        return sign | 0x7c00 | if mant != 0 { 0x200 } else { 0 };
    }
    let unbiased = exp - 127;
    if unbiased > 15 {
        return sign | 0x7c00;
    }
    if unbiased >= -14 {
        let half_exp = (unbiased + 15) as u16;
        let mut half_mant = (mant >> 13) as u16;
        // round to nearest even on the dropped 13 bits
        let rest = mant & 0x1fff;
        if rest > 0x1000 || (rest == 0x1000 && (half_mant & 1) != 0) {
            half_mant += 1;
            if half_mant == 0x400 {
                return sign | ((half_exp + 1) << 10);
            }
        }
        return sign | (half_exp << 10) | half_mant;
    }
    if unbiased >= -24 {
        // subnormal half: shift the full 24-bit significand into place
        let shift = (-unbiased - 1) as u32;
        let full = mant | 0x80_0000;
        let half_mant = (full >> shift) as u16;
        return sign | half_mant;
    }
    sign
}

/// Literal-type correction: a two-register float/int operand takes 64-bit
/// immediates.
pub fn wide_literal(regs_num: u16, lit: LitType) -> bool {
    regs_num == 2 && matches!(lit, LitType::Float | LitType::Int)
}

/// Recognise a floating-point literal token; rewinds when the text is not
/// one.
pub fn try_parse_float(cur: &mut LineCursor<'_>) -> Option<f64> {
    cur.skip_spaces();
    let mark = cur.pos;
    let rest = cur.rest().as_bytes();
    let mut i = 0usize;
    if i < rest.len() && (rest[i] == b'-' || rest[i] == b'+') {
        i += 1;
    }
    let digits_start = i;
    while i < rest.len() && rest[i].is_ascii_digit() {
        i += 1;
    }
    let mut is_float = false;
    if i < rest.len() && rest[i] == b'.' && rest.get(i + 1).map_or(false, u8::is_ascii_digit) {
        is_float = true;
        i += 1;
        while i < rest.len() && rest[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < rest.len() && (rest[i] == b'e' || rest[i] == b'E') {
        let mut j = i + 1;
        if j < rest.len() && (rest[j] == b'-' || rest[j] == b'+') {
            j += 1;
        }
        if j < rest.len() && rest[j].is_ascii_digit() {
            is_float = true;
            i = j;
            while i < rest.len() && rest[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    if !is_float || i == digits_start {
        cur.pos = mark;
        return None;
    }
    // a float literal must end the token
    if let Some(&next) = rest.get(i) {
        if next.is_ascii_alphanumeric() || next == b'_' || next == b'.' {
            cur.pos = mark;
            return None;
        }
    }
    let text = &cur.rest()[..i];
    match text.parse::<f64>() {
        Ok(v) => {
            cur.advance(i);
            Some(v)
        }
        Err(_) => {
            cur.pos = mark;
            None
        }
    }
}

/// Classify a float value against the inline-constant set; `None` means a
/// literal slot is needed, `Some((code, literal_bits))` otherwise.
fn float_inline(value: f64, lit: LitType, wide: bool, gcn12: bool) -> Result<u16, u32> {
    if wide {
        let bits = value.to_bits();
        let hi = (bits >> 32) as u32;
        let lo = bits as u32;
        if lo == 0 {
            if let Some(i) = FLOAT_INLINE_F64_HI.iter().position(|&h| h == hi) {
                return Ok(240 + i as u16);
            }
        }
        return Err(hi);
    }
    match lit {
        LitType::F16 => {
            let bits = f16_bits(value);
            if let Some(i) = FLOAT_INLINE_F16.iter().position(|&h| h == bits) {
                return Ok(240 + i as u16);
            }
            if gcn12 && bits == INV_2PI_F16 {
                return Ok(248);
            }
            Err(bits as u32)
        }
        _ => {
            let bits = (value as f32).to_bits();
            if let Some(i) = FLOAT_INLINE_F32.iter().position(|&h| h == bits) {
                return Ok(240 + i as u16);
            }
            if gcn12 && bits == INV_2PI_F32 {
                return Ok(248);
            }
            Err(bits)
        }
    }
}

fn literal_error(ctx: &mut dyn AsmContext, cur: &LineCursor<'_>, mark: usize, flags: OpFlags) {
    let at = cur.line_col_at(mark);
    if flags.contains(OpFlags::NO_LIT_ERROR) {
        ctx.error(at, "Literal in VOP3 encoding is illegal");
    } else if flags.contains(OpFlags::NO_LIT_MUBUF) {
        ctx.error(at, "Literal in SOFFSET field is illegal");
    } else {
        ctx.error(at, "Only one literal can be used");
    }
}

/// Parse one operand of an instruction. `regs_num` 0 accepts any size.
pub fn parse_operand(
    ctx: &mut dyn AsmContext,
    cur: &mut LineCursor<'_>,
    regs_num: u16,
    flags: OpFlags,
    lit: LitType,
    field: Option<RegField>,
) -> Option<Operand> {
    cur.skip_spaces();
    let mark = cur.pos;
    // modifier wrappers, outermost first
    if flags.intersects(OpFlags::VOP3MODS | OpFlags::VOP3NEG) {
        let inner_flags = flags;
        if cur.peek() == Some(b'-') {
            // negation of a register operand; a leading minus of a constant
            // expression stays with the expression
            let save = cur.pos;
            cur.bump();
            cur.skip_spaces();
            let next = cur.peek();
            let starts_reg = matches!(next, Some(c) if c.is_ascii_alphabetic() || c == b'|');
            if starts_reg {
                let mut op = parse_operand(ctx, cur, regs_num, inner_flags, lit, field)?;
                op.mods ^= VopMods::NEG;
                return Some(op);
            }
            cur.pos = save;
        }
        if flags.contains(OpFlags::VOP3MODS) {
            if cur.peek() == Some(b'|') {
                cur.bump();
                let mut op = parse_operand(ctx, cur, regs_num, inner_flags, lit, field)?;
                if !cur.try_char(b'|') {
                    let at = cur.line_col();
                    ctx.error(at, "Unterminated abs modifier");
                    return None;
                }
                op.mods |= VopMods::ABS;
                return Some(op);
            }
            let save = cur.pos;
            if let Some(name) = cur.parse_name_lower() {
                if name == "abs" && cur.try_char(b'(') {
                    let mut op = parse_operand(ctx, cur, regs_num, inner_flags, lit, field)?;
                    if !cur.try_char(b')') {
                        let at = cur.line_col();
                        ctx.error(at, "Unterminated abs modifier");
                        return None;
                    }
                    op.mods |= VopMods::ABS;
                    return Some(op);
                }
                if name == "sext" && !flags.contains(OpFlags::NOSEXT) && cur.try_char(b'(') {
                    let mut op = parse_operand(ctx, cur, regs_num, inner_flags, lit, field)?;
                    if !cur.try_char(b')') {
                        let at = cur.line_col();
                        ctx.error(at, "Unterminated sext modifier");
                        return None;
                    }
                    op.mods |= VopMods::SEXT;
                    return Some(op);
                }
            }
            cur.pos = save;
        }
    }
    // vector register
    if flags.contains(OpFlags::VREGS) {
        let range = parse_vreg_range(ctx, cur, regs_num, field, false, flags)?;
        if range.is_set() {
            return Some(Operand {
                range,
                ..Operand::default()
            });
        }
    }
    // scalar register or named special
    if flags.contains(OpFlags::SREGS) {
        let range = parse_sreg_range(ctx, cur, regs_num, field, false, flags)?;
        if range.is_set() {
            return Some(Operand {
                range,
                ..Operand::default()
            });
        }
    }
    // scalar special sources
    if flags.contains(OpFlags::SSOURCE) {
        let save = cur.pos;
        if let Some(name) = cur.parse_name_lower() {
            let special = match name.as_str() {
                "vccz" => Some(251),
                "execz" => Some(252),
                "scc" => Some(253),
                "lds" | "lds_direct" | "src_lds_direct" => {
                    if flags.contains(OpFlags::LDS) {
                        Some(254)
                    } else {
                        None
                    }
                }
                _ => None,
            };
            if let Some(value) = special {
                let range = RegRange::new(value, value + 1);
                return Some(Operand {
                    range,
                    ..Operand::default()
                });
            }
        }
        cur.pos = save;

        // floating-point literal text
        if lit != LitType::Int || wide_literal(regs_num, lit) {
            if let Some(value) = try_parse_float(cur) {
                let wide = wide_literal(regs_num, lit);
                match float_inline(value, lit, wide, ctx.arch().is_gcn12()) {
                    Ok(code) => {
                        return Some(Operand {
                            range: RegRange::new(code, code + 1),
                            ..Operand::default()
                        });
                    }
                    Err(bits) => {
                        if flags.contains(OpFlags::ONLY_INLINE) {
                            literal_error(ctx, cur, mark, flags);
                            return None;
                        }
                        return Some(Operand {
                            range: RegRange::new(fixed::LITERAL, fixed::LITERAL + 1),
                            value: bits,
                            ..Operand::default()
                        });
                    }
                }
            }
        }

        // integer constant or deferred literal expression
        let at = cur.line_col();
        let expr = ctx.parse_expression(cur)?;
        return match ctx.eval(&expr) {
            Ok(Some((value, section))) => {
                if section != SECT_ABS {
                    ctx.error(at, "Relative value is illegal in operand");
                    return None;
                }
                let sval = value as i64;
                if (0..=64).contains(&sval) {
                    let code = 128 + sval as u16;
                    Some(Operand {
                        range: RegRange::new(code, code + 1),
                        ..Operand::default()
                    })
                } else if (-16..=-1).contains(&sval) {
                    let code = (192 - sval) as u16;
                    Some(Operand {
                        range: RegRange::new(code, code + 1),
                        ..Operand::default()
                    })
                } else {
                    if flags.contains(OpFlags::ONLY_INLINE) {
                        literal_error(ctx, cur, mark, flags);
                        return None;
                    }
                    if !fits(value, 32, ImmKind::Both) {
                        ctx.warn(at, "Value out of range");
                    }
                    Some(Operand {
                        range: RegRange::new(fixed::LITERAL, fixed::LITERAL + 1),
                        value: value as u32,
                        ..Operand::default()
                    })
                }
            }
            Ok(None) => {
                if flags.contains(OpFlags::ONLY_INLINE) {
                    literal_error(ctx, cur, mark, flags);
                    return None;
                }
                Some(Operand {
                    range: RegRange::new(fixed::LITERAL, fixed::LITERAL + 1),
                    value: 0,
                    expr: Some(expr),
                    ..Operand::default()
                })
            }
            Err(()) => None,
        };
    }
    let at = cur.line_col_at(mark);
    ctx.error(at, "Expected operand");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn f16_conversion_basics() {
        assert_eq!(f16_bits(0.5), 0x3800);
        assert_eq!(f16_bits(-0.5), 0xb800);
        assert_eq!(f16_bits(1.0), 0x3c00);
        assert_eq!(f16_bits(2.0), 0x4000);
        assert_eq!(f16_bits(4.0), 0x4400);
        assert_eq!(f16_bits(-4.0), 0xc400);
        assert_eq!(f16_bits(65536.0), 0x7c00);
        assert_eq!(f16_bits(0.0), 0x0000);
    }

    #[test]
    fn float_inline_classification() {
        assert_eq!(float_inline(0.5, LitType::Float, false, false), Ok(240));
        assert_eq!(float_inline(-4.0, LitType::Float, false, false), Ok(247));
        assert_eq!(
            float_inline(0.15915494, LitType::Float, false, true),
            Ok(248)
        );
        assert_eq!(
            float_inline(0.15915494, LitType::Float, false, false),
            Err(INV_2PI_F32)
        );
        assert_eq!(
            float_inline(1.25, LitType::Float, false, false),
            Err(1.25f32.to_bits())
        );
        // doubles match on the high word with a zero low word
        assert_eq!(float_inline(1.0, LitType::Float, true, false), Ok(242));
        assert_eq!(float_inline(1.5, LitType::Float, true, false), Err(0x3ff80000));
    }

    #[test]
    fn float_text_recognition() {
        let mut cur = LineCursor::new("1.25, v0", &[]);
        assert_eq!(try_parse_float(&mut cur), Some(1.25));
        assert!(cur.try_char(b','));
        let mut cur = LineCursor::new("12", &[]);
        assert_eq!(try_parse_float(&mut cur), None);
        assert_eq!(cur.pos, 0);
        let mut cur = LineCursor::new("2e3 x", &[]);
        assert_eq!(try_parse_float(&mut cur), Some(2000.0));
        let mut cur = LineCursor::new("1.5x", &[]);
        assert_eq!(try_parse_float(&mut cur), None);
    }

    proptest! {
        #[test]
        fn f16_round_trips_through_f32(bits in 0u16..0x7c00) {
            // every finite positive half value survives the f32 route
            let sign = 0u16;
            let half = sign | bits;
            let exp = (half >> 10) & 0x1f;
            let mant = half & 0x3ff;
            let value = if exp == 0 {
                (mant as f64) * 2f64.powi(-24)
            } else {
                (1.0 + mant as f64 / 1024.0) * 2f64.powi(exp as i32 - 15)
            };
            prop_assert_eq!(f16_bits(value), half);
        }
    }
}
