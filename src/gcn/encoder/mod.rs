// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The GCN encoder: one routine per encoding family, dispatched by a
//! closed match over the descriptor's encoding. Routines parse the operand
//! list in family order, parse trailing modifiers, decide the output size,
//! emit little-endian words, attach pending expressions to their relocation
//! sites, and rewrite register-usage records where promotion renames
//! fields.

mod ds;
mod exp;
mod flat;
mod mimg;
mod mubuf;
mod smem;
mod sop;
mod vintrp;
mod vop;
mod vop3;
pub mod vop_mods;

use log::trace;

use crate::core::cursor::LineCursor;
use crate::core::source_pos::LineCol;
use crate::gcn::registry::{self, Encoding, InsnDesc};
use crate::gcn::{AsmContext, EncSize, VopEnc};

/// Strip a recognised mnemonic suffix, returning the bare mnemonic and the
/// forced-size/forced-encoding hints.
pub fn strip_mnemonic_suffix(mnemonic: &str) -> (&str, EncSize, VopEnc) {
    let lower_matches = |suffix: &str| {
        mnemonic.len() > suffix.len()
            && mnemonic[mnemonic.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    };
    if lower_matches("_e64") {
        (&mnemonic[..mnemonic.len() - 4], EncSize::Bit64, VopEnc::Normal)
    } else if lower_matches("_e32") {
        (&mnemonic[..mnemonic.len() - 4], EncSize::Bit32, VopEnc::Normal)
    } else if mnemonic.len() > 6
        && mnemonic[..2].eq_ignore_ascii_case("v_")
        && lower_matches("_dpp")
    {
        (&mnemonic[..mnemonic.len() - 4], EncSize::Unknown, VopEnc::Dpp)
    } else if mnemonic.len() > 7
        && mnemonic[..2].eq_ignore_ascii_case("v_")
        && lower_matches("_sdwa")
    {
        (&mnemonic[..mnemonic.len() - 5], EncSize::Unknown, VopEnc::Sdwa)
    } else {
        (mnemonic, EncSize::Unknown, VopEnc::Normal)
    }
}

/// Verify the emitted word count against an explicit `_e32`/`_e64` request.
pub fn check_enc_size(
    ctx: &mut dyn AsmContext,
    at: LineCol,
    requested: EncSize,
    words: usize,
) -> bool {
    match requested {
        EncSize::Bit32 if words != 1 => {
            ctx.error(at, "Instruction does not fit into 32-bit encoding");
            false
        }
        EncSize::Bit64 if words != 2 => {
            ctx.error(at, "Instruction cannot be encoded as 64-bit");
            false
        }
        _ => true,
    }
}

/// Assemble one instruction line: mnemonic already read, the cursor rests
/// on the operand list. Returns false when any diagnostic was an error.
pub fn assemble(
    ctx: &mut dyn AsmContext,
    mnemonic: &str,
    mnemonic_at: LineCol,
    cur: &mut LineCursor<'_>,
) -> bool {
    let (bare, enc_size, vop_enc) = strip_mnemonic_suffix(mnemonic);
    let Some(desc) = registry::lookup(bare, ctx.arch()) else {
        if registry::known_mnemonic(bare) {
            ctx.error(
                mnemonic_at,
                "Instruction is not supported by the selected architecture",
            );
        } else {
            ctx.error(mnemonic_at, "Unknown instruction");
        }
        return false;
    };
    ctx.usage().reset();
    trace!(
        "encode {} ({:?}, code {}) at {}",
        desc.mnemonic,
        desc.encoding,
        desc.code,
        ctx.out_pos()
    );
    dispatch(ctx, desc, mnemonic_at, cur, enc_size, vop_enc)
}

fn dispatch(
    ctx: &mut dyn AsmContext,
    desc: &'static InsnDesc,
    at: LineCol,
    cur: &mut LineCursor<'_>,
    enc_size: EncSize,
    vop_enc: VopEnc,
) -> bool {
    match desc.encoding {
        Encoding::Sop2 => sop::encode_sop2(ctx, desc, at, cur, enc_size),
        Encoding::Sop1 => sop::encode_sop1(ctx, desc, at, cur, enc_size),
        Encoding::Sopc => sop::encode_sopc(ctx, desc, at, cur, enc_size),
        Encoding::Sopk => sop::encode_sopk(ctx, desc, at, cur, enc_size),
        Encoding::Sopp => sop::encode_sopp(ctx, desc, at, cur, enc_size),
        Encoding::Smrd => {
            if ctx.arch().is_gcn12() {
                smem::encode_smem(ctx, desc, at, cur, enc_size)
            } else {
                smem::encode_smrd(ctx, desc, at, cur, enc_size)
            }
        }
        Encoding::Vop2 => vop::encode_vop2(ctx, desc, at, cur, enc_size, vop_enc),
        Encoding::Vop1 => vop::encode_vop1(ctx, desc, at, cur, enc_size, vop_enc),
        Encoding::Vopc => vop::encode_vopc(ctx, desc, at, cur, enc_size, vop_enc),
        Encoding::Vop3A | Encoding::Vop3B => {
            vop3::encode_vop3(ctx, desc, at, cur, enc_size, vop_enc)
        }
        Encoding::Vintrp => vintrp::encode_vintrp(ctx, desc, at, cur, enc_size, vop_enc),
        Encoding::Ds => ds::encode_ds(ctx, desc, at, cur, enc_size),
        Encoding::Mubuf | Encoding::Mtbuf => mubuf::encode_mxbuf(ctx, desc, at, cur, enc_size),
        Encoding::Mimg => mimg::encode_mimg(ctx, desc, at, cur, enc_size),
        Encoding::Exp => exp::encode_exp(ctx, desc, at, cur, enc_size),
        Encoding::Flat => flat::encode_flat(ctx, desc, at, cur, enc_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_stripping() {
        assert_eq!(
            strip_mnemonic_suffix("v_add_f32_e64"),
            ("v_add_f32", EncSize::Bit64, VopEnc::Normal)
        );
        assert_eq!(
            strip_mnemonic_suffix("s_add_u32_e32"),
            ("s_add_u32", EncSize::Bit32, VopEnc::Normal)
        );
        assert_eq!(
            strip_mnemonic_suffix("v_add_f32_sdwa"),
            ("v_add_f32", EncSize::Unknown, VopEnc::Sdwa)
        );
        assert_eq!(
            strip_mnemonic_suffix("v_mov_b32_dpp"),
            ("v_mov_b32", EncSize::Unknown, VopEnc::Dpp)
        );
        // the VOP suffixes require a v_ prefix
        assert_eq!(
            strip_mnemonic_suffix("s_mov_b32_dpp"),
            ("s_mov_b32_dpp", EncSize::Unknown, VopEnc::Normal)
        );
        assert_eq!(
            strip_mnemonic_suffix("v_mov_b32"),
            ("v_mov_b32", EncSize::Unknown, VopEnc::Normal)
        );
    }
}
