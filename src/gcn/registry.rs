// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! GCN instruction descriptor table.
//!
//! The raw table lists every (mnemonic, encoding, architecture-bucket)
//! entry separately; compare and atomic families are generated from their
//! base opcodes. The table is built once behind a `OnceLock`, sorted by
//! (mnemonic, encoding, architecture mask), and merged: a VOP3A/VOP3B entry
//! whose mnemonic also exists as VOP1/VOP2/VOPC collapses into that entry's
//! secondary opcode, and on GCN 1.2+ a VINTRP mnemonic's plain opcode is
//! carried as the secondary opcode of its VOP3 entry. The encoder can then
//! promote from short to long form without a second lookup.
//!
//! The table carries the commonly used instructions of every encoding
//! family across all four generations; the format and the merge support
//! the full ISA listing without change.

use std::cmp::Ordering;
use std::sync::OnceLock;

use log::debug;

use crate::core::section::CodeFlowKind;
use crate::gcn::arch::{Arch, ArchMask};

/// Sentinel for an absent secondary opcode.
pub const SECONDARY_NONE: u16 = u16::MAX;

/// Encoding family of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Encoding {
    Sopc,
    Sopp,
    Sop1,
    Sop2,
    Sopk,
    /// Scalar memory; dispatched as SMRD before GCN 1.2 and SMEM after.
    Smrd,
    Vopc,
    Vop1,
    Vop2,
    Vop3A,
    Vop3B,
    Vintrp,
    Ds,
    Mubuf,
    Mtbuf,
    Mimg,
    Exp,
    Flat,
}

/// Operand-shape selector, interpreted per encoding family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgMode {
    #[default]
    Std,
    /// Destination only (e.g. `s_getpc_b64`).
    DstOnly,
    /// Source only (e.g. `s_setpc_b64`).
    SrcOnly,
    /// No operands at all.
    NoArgs,
    /// SOP2 branch-by-register: two 64-bit sources, `sdst` is a residue.
    RegS1Jmp,
    /// SOPK/SOPP plain 16-bit immediate.
    Imm16,
    /// PC-relative 16-bit branch target.
    ImmRel,
    /// `s_waitcnt` counter locks.
    ImmLocks,
    /// `s_sendmsg` message field.
    ImmMsgs,
    /// No immediate printed/parsed (`s_endpgm`).
    ImmNone,
    /// `hwreg(...)` function (`s_getreg_b32`/`s_setreg_b32`).
    ImmSreg,
    /// SOPC with an 8-bit immediate in SRC1 (`s_set_gpr_idx_on`).
    Src1Imm,
    /// VOP2 with SGPR destination and SGPR SRC1 (`v_readlane_b32`).
    Ds1Sgpr,
    /// VOP2 with SGPR SRC1 (`v_writelane_b32`).
    Src1Sgpr,
    /// VOP2 with both carry-out and carry-in (`v_addc_u32`).
    Ds2Vcc,
    /// VOP2 with carry-out only (`v_add_i32`).
    DstVcc,
    /// VOP2 with carry-in only (`v_cndmask_b32`).
    Src2Vcc,
    /// Literal constant between SRC0 and SRC1 (`v_madmk_*`).
    Arg1Imm,
    /// Literal constant after SRC1 (`v_madak_*`).
    Arg2Imm,
    /// SGPR destination (`v_readfirstlane_b32`, VOP3 compares).
    DstSgpr,
    /// No operands (`v_nop`).
    VopArgNone,
    /// VINTRP source is `p0`/`p10`/`p20` (`v_interp_mov_f32`).
    P0P10P20,
    /// VOP3-encoded interpolation with a third source.
    VintrpSrc2,
    /// SMRD/SMEM destination-only (`s_memtime`).
    SmrdOnlyDst,
    /// SMEM with a 7-bit immediate in SDATA (`s_atc_probe`).
    SmemSdataImm,
    /// VOP3 without SRC2.
    Src2None,
    /// VOP3 without SRC1 and SRC2.
    Src12None,
    /// MUBUF without VDATA/VADDR (`buffer_wbinvl1`).
    MubufNoVad,
    /// No operands for buffer/scalar cache ops.
    ArgNone,
    /// DS: vdst, addr.
    DsDstAddr,
    /// DS: addr, data0.
    DsAddrSrc,
    /// DS: addr, data0, data1.
    DsAddr2Src,
    /// DS: vdst, addr, data0.
    DsDstAddrSrc,
    /// DS: vdst, addr, data0, data1.
    DsDstAddr2Src,
    /// DS: vdst only (`ds_append`).
    DsOnlyDst,
    /// DS: data0 only (`ds_gws_*`).
    DsOnlySrc0,
    /// FLAT load: vdst, vaddr.
    FlatLoad,
    /// FLAT store: vaddr, data.
    FlatStore,
    /// FLAT atomic: vdst, vaddr, data.
    FlatAtomic,
}

/// Literal-typing of an instruction's immediate operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LitType {
    #[default]
    Int,
    Float,
    F16,
}

/// Address space selector for the FLAT family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlatMode {
    #[default]
    Flat,
    Scratch,
    Global,
}

impl FlatMode {
    pub fn field(self) -> u32 {
        match self {
            FlatMode::Flat => 0,
            FlatMode::Scratch => 1,
            FlatMode::Global => 2,
        }
    }
}

/// Mode flags of a descriptor; fields are interpreted by the family's
/// encoder routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsnMode {
    pub arg: ArgMode,
    pub lit: LitType,
    pub dst64: bool,
    pub src0_64: bool,
    pub src1_64: bool,
    pub src2_64: bool,
    /// Data size: log2 dwords for SMRD/SMEM, dword count for DS, MUBUF,
    /// MTBUF, MIMG (required VADDR count) and FLAT.
    pub dsize: u8,
    pub sbase4: bool,
    /// Memory op writes its data operand (load, or atomic with GLC).
    pub mem_load: bool,
    pub mem_atomic: bool,
    /// cmpswap-style: only the low half of the data range is written back.
    pub halfwrite: bool,
    pub d16: bool,
    pub sample: bool,
    pub vdata4: bool,
    pub vaderiv: bool,
    pub two_offsets: bool,
    pub gds_only: bool,
    pub flat_mode: FlatMode,
    pub vop3p: bool,
    /// VOP3-encoded VINTRP instruction.
    pub vintrp_vop3: bool,
    /// SOPK: a register/immediate destination follows the imm16.
    pub imm_dst: bool,
    /// SOPK: a 32-bit literal word follows the instruction.
    pub sopk_const: bool,
    /// The destination operand is also read (`s_addk_i32`, `v_mac_*`).
    pub dst_read: bool,
    /// The destination operand is only read (`s_cmpk_*`).
    pub dst_no_write: bool,
}

/// One instruction descriptor.
#[derive(Debug, Clone)]
pub struct InsnDesc {
    pub mnemonic: String,
    pub encoding: Encoding,
    pub mode: InsnMode,
    pub code: u16,
    pub code2: u16,
    pub arch: ArchMask,
    pub flow: Option<CodeFlowKind>,
}

impl InsnDesc {
    fn new(
        mnemonic: impl Into<String>,
        encoding: Encoding,
        mode: InsnMode,
        code: u16,
        arch: ArchMask,
    ) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            encoding,
            mode,
            code,
            code2: SECONDARY_NONE,
            arch,
            flow: None,
        }
    }

    fn with_flow(mut self, flow: CodeFlowKind) -> Self {
        self.flow = Some(flow);
        self
    }
}

const M: InsnMode = InsnMode {
    arg: ArgMode::Std,
    lit: LitType::Int,
    dst64: false,
    src0_64: false,
    src1_64: false,
    src2_64: false,
    dsize: 0,
    sbase4: false,
    mem_load: false,
    mem_atomic: false,
    halfwrite: false,
    d16: false,
    sample: false,
    vdata4: false,
    vaderiv: false,
    two_offsets: false,
    gds_only: false,
    flat_mode: FlatMode::Flat,
    vop3p: false,
    vintrp_vop3: false,
    imm_dst: false,
    sopk_const: false,
    dst_read: false,
    dst_no_write: false,
};

const ALL: ArchMask = ArchMask::ALL;
const G10_11: ArchMask = ArchMask::GCN1_0_1;
const G12_14: ArchMask = ArchMask::GCN1_2_4;
const G14: ArchMask = ArchMask::GCN14;
const G12: ArchMask = ArchMask::GCN12;
const G11: ArchMask = ArchMask::GCN11;
const G11P: ArchMask = ArchMask::GCN1_1_2_4;

fn mode64(dst: bool, src0: bool, src1: bool) -> InsnMode {
    InsnMode {
        dst64: dst,
        src0_64: src0,
        src1_64: src1,
        ..M
    }
}

fn sop2_entries(out: &mut Vec<InsnDesc>) {
    // (mnemonic, si code or none, vi code or none, mode)
    let b32 = M;
    let b64 = mode64(true, true, true);
    let shift64 = mode64(true, true, false);
    let table: &[(&str, Option<u16>, Option<u16>, InsnMode)] = &[
        ("s_add_u32", Some(0), Some(0), b32),
        ("s_sub_u32", Some(1), Some(1), b32),
        ("s_add_i32", Some(2), Some(2), b32),
        ("s_sub_i32", Some(3), Some(3), b32),
        ("s_addc_u32", Some(4), Some(4), b32),
        ("s_subb_u32", Some(5), Some(5), b32),
        ("s_min_i32", Some(6), Some(6), b32),
        ("s_min_u32", Some(7), Some(7), b32),
        ("s_max_i32", Some(8), Some(8), b32),
        ("s_max_u32", Some(9), Some(9), b32),
        ("s_cselect_b32", Some(10), Some(10), b32),
        ("s_cselect_b64", Some(11), Some(11), b64),
        ("s_and_b32", Some(14), Some(12), b32),
        ("s_and_b64", Some(15), Some(13), b64),
        ("s_or_b32", Some(16), Some(14), b32),
        ("s_or_b64", Some(17), Some(15), b64),
        ("s_xor_b32", Some(18), Some(16), b32),
        ("s_xor_b64", Some(19), Some(17), b64),
        ("s_andn2_b32", Some(20), Some(18), b32),
        ("s_andn2_b64", Some(21), Some(19), b64),
        ("s_orn2_b32", Some(22), Some(20), b32),
        ("s_orn2_b64", Some(23), Some(21), b64),
        ("s_nand_b32", Some(24), Some(22), b32),
        ("s_nand_b64", Some(25), Some(23), b64),
        ("s_nor_b32", Some(26), Some(24), b32),
        ("s_nor_b64", Some(27), Some(25), b64),
        ("s_xnor_b32", Some(28), Some(26), b32),
        ("s_xnor_b64", Some(29), Some(27), b64),
        ("s_lshl_b32", Some(30), Some(28), b32),
        ("s_lshl_b64", Some(31), Some(29), shift64),
        ("s_lshr_b32", Some(32), Some(30), b32),
        ("s_lshr_b64", Some(33), Some(31), shift64),
        ("s_ashr_i32", Some(34), Some(32), b32),
        ("s_ashr_i64", Some(35), Some(33), shift64),
        ("s_bfm_b32", Some(36), Some(34), b32),
        ("s_bfm_b64", Some(37), Some(35), InsnMode { dst64: true, ..M }),
        ("s_mul_i32", Some(38), Some(36), b32),
        ("s_bfe_u32", Some(39), Some(37), b32),
        ("s_bfe_i32", Some(40), Some(38), b32),
        ("s_bfe_u64", Some(41), Some(39), InsnMode { dst64: true, src0_64: true, ..M }),
        ("s_bfe_i64", Some(42), Some(40), InsnMode { dst64: true, src0_64: true, ..M }),
        (
            "s_cbranch_g_fork",
            Some(43),
            Some(41),
            InsnMode { arg: ArgMode::RegS1Jmp, src0_64: true, src1_64: true, ..M },
        ),
        ("s_absdiff_i32", Some(44), Some(42), b32),
        ("s_rfe_restore_b64", None, Some(43), InsnMode { dst64: true, src0_64: true, ..M }),
    ];
    for &(mnem, si, vi, mode) in table {
        if let Some(code) = si {
            out.push(InsnDesc::new(mnem, Encoding::Sop2, mode, code, G10_11));
        }
        if let Some(code) = vi {
            out.push(InsnDesc::new(mnem, Encoding::Sop2, mode, code, G12_14));
        }
    }
    // Vega additions
    let vega: &[(&str, u16, InsnMode)] = &[
        ("s_mul_hi_u32", 44, b32),
        ("s_mul_hi_i32", 45, b32),
        ("s_lshl1_add_u32", 46, b32),
        ("s_lshl2_add_u32", 47, b32),
        ("s_lshl3_add_u32", 48, b32),
        ("s_lshl4_add_u32", 49, b32),
        ("s_pack_ll_b32_b16", 50, b32),
        ("s_pack_lh_b32_b16", 51, b32),
        ("s_pack_hh_b32_b16", 52, b32),
    ];
    for &(mnem, code, mode) in vega {
        out.push(InsnDesc::new(mnem, Encoding::Sop2, mode, code, G14));
    }
}

fn sop1_entries(out: &mut Vec<InsnDesc>) {
    let b32 = M;
    let b64 = mode64(true, true, false);
    // (mnemonic, si/ci code, gcn1.2+ code, mode); the SI block keeps a
    // reserved slot between s_rfe_b64 and the saveexec group
    let table: &[(&str, u16, u16, InsnMode)] = &[
        ("s_mov_b32", 3, 0, b32),
        ("s_mov_b64", 4, 1, b64),
        ("s_cmov_b32", 5, 2, b32),
        ("s_cmov_b64", 6, 3, b64),
        ("s_not_b32", 7, 4, b32),
        ("s_not_b64", 8, 5, b64),
        ("s_wqm_b32", 9, 6, b32),
        ("s_wqm_b64", 10, 7, b64),
        ("s_brev_b32", 11, 8, b32),
        ("s_brev_b64", 12, 9, b64),
        ("s_bcnt0_i32_b32", 13, 10, b32),
        ("s_bcnt0_i32_b64", 14, 11, InsnMode { src0_64: true, ..M }),
        ("s_bcnt1_i32_b32", 15, 12, b32),
        ("s_bcnt1_i32_b64", 16, 13, InsnMode { src0_64: true, ..M }),
        ("s_ff0_i32_b32", 17, 14, b32),
        ("s_ff0_i32_b64", 18, 15, InsnMode { src0_64: true, ..M }),
        ("s_ff1_i32_b32", 19, 16, b32),
        ("s_ff1_i32_b64", 20, 17, InsnMode { src0_64: true, ..M }),
        ("s_flbit_i32_b32", 21, 18, b32),
        ("s_flbit_i32_b64", 22, 19, InsnMode { src0_64: true, ..M }),
        ("s_flbit_i32", 23, 20, b32),
        ("s_flbit_i32_i64", 24, 21, InsnMode { src0_64: true, ..M }),
        ("s_sext_i32_i8", 25, 22, b32),
        ("s_sext_i32_i16", 26, 23, b32),
        ("s_bitset0_b32", 27, 24, b32),
        ("s_bitset0_b64", 28, 25, InsnMode { dst64: true, ..M }),
        ("s_bitset1_b32", 29, 26, b32),
        ("s_bitset1_b64", 30, 27, InsnMode { dst64: true, ..M }),
        ("s_getpc_b64", 31, 28, InsnMode { arg: ArgMode::DstOnly, dst64: true, ..M }),
        ("s_setpc_b64", 32, 29, InsnMode { arg: ArgMode::SrcOnly, src0_64: true, ..M }),
        ("s_swappc_b64", 33, 30, b64),
        ("s_rfe_b64", 34, 31, InsnMode { arg: ArgMode::SrcOnly, src0_64: true, ..M }),
        ("s_and_saveexec_b64", 36, 32, b64),
        ("s_or_saveexec_b64", 37, 33, b64),
        ("s_xor_saveexec_b64", 38, 34, b64),
        ("s_andn2_saveexec_b64", 39, 35, b64),
        ("s_orn2_saveexec_b64", 40, 36, b64),
        ("s_nand_saveexec_b64", 41, 37, b64),
        ("s_nor_saveexec_b64", 42, 38, b64),
        ("s_xnor_saveexec_b64", 43, 39, b64),
        ("s_quadmask_b32", 44, 40, b32),
        ("s_quadmask_b64", 45, 41, b64),
        ("s_movrels_b32", 46, 42, b32),
        ("s_movrels_b64", 47, 43, b64),
        ("s_movreld_b32", 48, 44, b32),
        ("s_movreld_b64", 49, 45, b64),
        ("s_cbranch_join", 50, 46, InsnMode { arg: ArgMode::SrcOnly, ..M }),
        ("s_abs_i32", 52, 48, b32),
        ("s_mov_fed_b32", 53, 49, b32),
    ];
    for &(mnem, si_code, vi_code, mode) in table {
        out.push(InsnDesc::new(mnem, Encoding::Sop1, mode, si_code, G10_11));
        out.push(InsnDesc::new(mnem, Encoding::Sop1, mode, vi_code, G12_14));
    }
    out.push(InsnDesc::new(
        "s_set_gpr_idx_idx",
        Encoding::Sop1,
        InsnMode { arg: ArgMode::SrcOnly, ..M },
        50,
        G12_14,
    ));
}

fn sopc_entries(out: &mut Vec<InsnDesc>) {
    let table: &[(&str, u16, ArchMask, InsnMode)] = &[
        ("s_cmp_eq_i32", 0, ALL, M),
        ("s_cmp_lg_i32", 1, ALL, M),
        ("s_cmp_gt_i32", 2, ALL, M),
        ("s_cmp_ge_i32", 3, ALL, M),
        ("s_cmp_lt_i32", 4, ALL, M),
        ("s_cmp_le_i32", 5, ALL, M),
        ("s_cmp_eq_u32", 6, ALL, M),
        ("s_cmp_lg_u32", 7, ALL, M),
        ("s_cmp_gt_u32", 8, ALL, M),
        ("s_cmp_ge_u32", 9, ALL, M),
        ("s_cmp_lt_u32", 10, ALL, M),
        ("s_cmp_le_u32", 11, ALL, M),
        ("s_bitcmp0_b32", 12, ALL, M),
        ("s_bitcmp1_b32", 13, ALL, M),
        ("s_bitcmp0_b64", 14, ALL, InsnMode { src0_64: true, ..M }),
        ("s_bitcmp1_b64", 15, ALL, InsnMode { src0_64: true, ..M }),
        ("s_setvskip", 16, ALL, M),
        (
            "s_set_gpr_idx_on",
            17,
            G12_14,
            InsnMode { arg: ArgMode::Src1Imm, ..M },
        ),
        ("s_cmp_eq_u64", 18, G12_14, InsnMode { src0_64: true, src1_64: true, ..M }),
        ("s_cmp_lg_u64", 19, G12_14, InsnMode { src0_64: true, src1_64: true, ..M }),
    ];
    for &(mnem, code, arch, mode) in table {
        out.push(InsnDesc::new(mnem, Encoding::Sopc, mode, code, arch));
    }
}

fn sopp_entries(out: &mut Vec<InsnDesc>) {
    let rel = InsnMode { arg: ArgMode::ImmRel, ..M };
    let none = InsnMode { arg: ArgMode::ImmNone, ..M };
    let imm = InsnMode { arg: ArgMode::Imm16, ..M };
    let table: &[(&str, u16, ArchMask, InsnMode, Option<CodeFlowKind>)] = &[
        ("s_nop", 0, ALL, imm, None),
        ("s_endpgm", 1, ALL, none, Some(CodeFlowKind::End)),
        ("s_branch", 2, ALL, rel, Some(CodeFlowKind::Jump)),
        ("s_wakeup", 3, G12_14, none, None),
        ("s_cbranch_scc0", 4, ALL, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_scc1", 5, ALL, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_vccz", 6, ALL, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_vccnz", 7, ALL, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_execz", 8, ALL, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_execnz", 9, ALL, rel, Some(CodeFlowKind::CJump)),
        ("s_barrier", 10, ALL, none, None),
        ("s_setkill", 11, G12_14, imm, None),
        ("s_waitcnt", 12, ALL, InsnMode { arg: ArgMode::ImmLocks, ..M }, None),
        ("s_sethalt", 13, ALL, imm, None),
        ("s_sleep", 14, ALL, imm, None),
        ("s_setprio", 15, ALL, imm, None),
        ("s_sendmsg", 16, ALL, InsnMode { arg: ArgMode::ImmMsgs, ..M }, None),
        ("s_sendmsghalt", 17, ALL, InsnMode { arg: ArgMode::ImmMsgs, ..M }, None),
        ("s_trap", 18, ALL, imm, None),
        ("s_icache_inv", 19, ALL, none, None),
        ("s_incperflevel", 20, ALL, imm, None),
        ("s_decperflevel", 21, ALL, imm, None),
        ("s_ttracedata", 22, ALL, none, None),
        ("s_cbranch_cdbgsys", 23, G11P, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_cdbguser", 24, G11P, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_cdbgsys_or_user", 25, G11P, rel, Some(CodeFlowKind::CJump)),
        ("s_cbranch_cdbgsys_and_user", 26, G11P, rel, Some(CodeFlowKind::CJump)),
        ("s_endpgm_saved", 27, G12_14, none, Some(CodeFlowKind::End)),
        ("s_set_gpr_idx_off", 28, G12_14, none, None),
        ("s_set_gpr_idx_mode", 29, G12_14, imm, None),
        ("s_endpgm_ordered_ps_done", 30, G14, none, Some(CodeFlowKind::End)),
    ];
    for &(mnem, code, arch, mode, flow) in table {
        let mut desc = InsnDesc::new(mnem, Encoding::Sopp, mode, code, arch);
        desc.flow = flow;
        out.push(desc);
    }
}

fn sopk_entries(out: &mut Vec<InsnDesc>) {
    let imm = InsnMode { arg: ArgMode::Imm16, ..M };
    let cmp = InsnMode {
        arg: ArgMode::Imm16,
        dst_read: true,
        dst_no_write: true,
        ..M
    };
    let rmw = InsnMode { arg: ArgMode::Imm16, dst_read: true, ..M };
    // (mnemonic, si code, vi code, mode, flow)
    let table: &[(&str, Option<u16>, Option<u16>, InsnMode, Option<CodeFlowKind>)] = &[
        ("s_movk_i32", Some(0), Some(0), imm, None),
        ("s_cmovk_i32", Some(2), Some(1), imm, None),
        ("s_cmpk_eq_i32", Some(3), Some(2), cmp, None),
        ("s_cmpk_lg_i32", Some(4), Some(3), cmp, None),
        ("s_cmpk_gt_i32", Some(5), Some(4), cmp, None),
        ("s_cmpk_ge_i32", Some(6), Some(5), cmp, None),
        ("s_cmpk_lt_i32", Some(7), Some(6), cmp, None),
        ("s_cmpk_le_i32", Some(8), Some(7), cmp, None),
        ("s_cmpk_eq_u32", Some(9), Some(8), cmp, None),
        ("s_cmpk_lg_u32", Some(10), Some(9), cmp, None),
        ("s_cmpk_gt_u32", Some(11), Some(10), cmp, None),
        ("s_cmpk_ge_u32", Some(12), Some(11), cmp, None),
        ("s_cmpk_lt_u32", Some(13), Some(12), cmp, None),
        ("s_cmpk_le_u32", Some(14), Some(13), cmp, None),
        ("s_addk_i32", Some(15), Some(14), rmw, None),
        ("s_mulk_i32", Some(16), Some(15), rmw, None),
        (
            "s_cbranch_i_fork",
            Some(17),
            Some(16),
            InsnMode { arg: ArgMode::ImmRel, src0_64: true, dst64: true, ..M },
            Some(CodeFlowKind::CJump),
        ),
        (
            "s_getreg_b32",
            Some(18),
            Some(17),
            InsnMode { arg: ArgMode::ImmSreg, ..M },
            None,
        ),
        (
            "s_setreg_b32",
            Some(19),
            Some(18),
            InsnMode { arg: ArgMode::ImmSreg, imm_dst: true, ..M },
            None,
        ),
        (
            "s_setreg_imm32_b32",
            Some(21),
            Some(20),
            InsnMode { arg: ArgMode::ImmSreg, imm_dst: true, sopk_const: true, ..M },
            None,
        ),
    ];
    for &(mnem, si, vi, mode, flow) in table {
        if let Some(code) = si {
            let mut desc = InsnDesc::new(mnem, Encoding::Sopk, mode, code, G10_11);
            desc.flow = flow;
            out.push(desc);
        }
        if let Some(code) = vi {
            let mut desc = InsnDesc::new(mnem, Encoding::Sopk, mode, code, G12_14);
            desc.flow = flow;
            out.push(desc);
        }
    }
    out.push(
        InsnDesc::new(
            "s_call_b64",
            Encoding::Sopk,
            InsnMode { arg: ArgMode::ImmRel, dst64: true, ..M },
            21,
            G14,
        )
        .with_flow(CodeFlowKind::Call),
    );
}

fn smrd_entries(out: &mut Vec<InsnDesc>) {
    // SMRD: dsize holds log2 of the loaded dword count
    let load = |log2: u8, sbase4: bool| InsnMode {
        dsize: log2,
        sbase4,
        mem_load: true,
        ..M
    };
    let table: &[(&str, u16, InsnMode)] = &[
        ("s_load_dword", 0, load(0, false)),
        ("s_load_dwordx2", 1, load(1, false)),
        ("s_load_dwordx4", 2, load(2, false)),
        ("s_load_dwordx8", 3, load(3, false)),
        ("s_load_dwordx16", 4, load(4, false)),
        ("s_buffer_load_dword", 8, load(0, true)),
        ("s_buffer_load_dwordx2", 9, load(1, true)),
        ("s_buffer_load_dwordx4", 10, load(2, true)),
        ("s_buffer_load_dwordx8", 11, load(3, true)),
        ("s_buffer_load_dwordx16", 12, load(4, true)),
    ];
    for &(mnem, code, mode) in table {
        out.push(InsnDesc::new(mnem, Encoding::Smrd, mode, code, G10_11));
    }
    out.push(InsnDesc::new(
        "s_dcache_inv_vol",
        Encoding::Smrd,
        InsnMode { arg: ArgMode::ArgNone, ..M },
        29,
        G11,
    ));
    out.push(InsnDesc::new(
        "s_memtime",
        Encoding::Smrd,
        InsnMode { arg: ArgMode::SmrdOnlyDst, dst64: true, mem_load: true, ..M },
        30,
        G10_11,
    ));
    out.push(InsnDesc::new(
        "s_dcache_inv",
        Encoding::Smrd,
        InsnMode { arg: ArgMode::ArgNone, ..M },
        31,
        G10_11,
    ));

    // SMEM opcodes for GCN 1.2+, same encoding slot
    let table: &[(&str, u16, InsnMode)] = &[
        ("s_load_dword", 0, load(0, false)),
        ("s_load_dwordx2", 1, load(1, false)),
        ("s_load_dwordx4", 2, load(2, false)),
        ("s_load_dwordx8", 3, load(3, false)),
        ("s_load_dwordx16", 4, load(4, false)),
        ("s_buffer_load_dword", 8, load(0, true)),
        ("s_buffer_load_dwordx2", 9, load(1, true)),
        ("s_buffer_load_dwordx4", 10, load(2, true)),
        ("s_buffer_load_dwordx8", 11, load(3, true)),
        ("s_buffer_load_dwordx16", 12, load(4, true)),
        ("s_store_dword", 16, InsnMode { dsize: 0, ..M }),
        ("s_store_dwordx2", 17, InsnMode { dsize: 1, ..M }),
        ("s_store_dwordx4", 18, InsnMode { dsize: 2, ..M }),
        ("s_buffer_store_dword", 24, InsnMode { dsize: 0, sbase4: true, ..M }),
        ("s_buffer_store_dwordx2", 25, InsnMode { dsize: 1, sbase4: true, ..M }),
        ("s_buffer_store_dwordx4", 26, InsnMode { dsize: 2, sbase4: true, ..M }),
        ("s_dcache_inv", 32, InsnMode { arg: ArgMode::ArgNone, ..M }),
        ("s_dcache_wb", 33, InsnMode { arg: ArgMode::ArgNone, ..M }),
        ("s_memtime", 36, InsnMode { arg: ArgMode::SmrdOnlyDst, dst64: true, mem_load: true, ..M }),
        ("s_memrealtime", 37, InsnMode { arg: ArgMode::SmrdOnlyDst, dst64: true, mem_load: true, ..M }),
        ("s_atc_probe", 38, InsnMode { arg: ArgMode::SmemSdataImm, ..M }),
        ("s_atc_probe_buffer", 39, InsnMode { arg: ArgMode::SmemSdataImm, sbase4: true, ..M }),
    ];
    for &(mnem, code, mode) in table {
        out.push(InsnDesc::new(mnem, Encoding::Smrd, mode, code, G12_14));
    }
    out.push(InsnDesc::new(
        "s_dcache_inv_vol",
        Encoding::Smrd,
        InsnMode { arg: ArgMode::ArgNone, ..M },
        34,
        G12,
    ));
    out.push(InsnDesc::new(
        "s_dcache_wb_vol",
        Encoding::Smrd,
        InsnMode { arg: ArgMode::ArgNone, ..M },
        35,
        G12,
    ));
}

/// Push a VOP2 entry together with its VOP3 twin.
fn vop2_pair(
    out: &mut Vec<InsnDesc>,
    mnem: &str,
    code: u16,
    arch: ArchMask,
    mode: InsnMode,
    vop3_base: u16,
    vop3b: bool,
) {
    out.push(InsnDesc::new(mnem, Encoding::Vop2, mode, code, arch));
    let enc3 = if vop3b { Encoding::Vop3B } else { Encoding::Vop3A };
    out.push(InsnDesc::new(mnem, enc3, mode, vop3_base + code, arch));
}

fn vop2_entries(out: &mut Vec<InsnDesc>) {
    let f32m = InsnMode { lit: LitType::Float, ..M };
    let f16m = InsnMode { lit: LitType::F16, ..M };
    // SI/CI; VOP3 twin at +0x100
    let si: &[(&str, u16, InsnMode, bool)] = &[
        ("v_cndmask_b32", 0, InsnMode { arg: ArgMode::Src2Vcc, ..M }, false),
        ("v_readlane_b32", 1, InsnMode { arg: ArgMode::Ds1Sgpr, ..M }, false),
        ("v_writelane_b32", 2, InsnMode { arg: ArgMode::Src1Sgpr, ..M }, false),
        ("v_add_f32", 3, f32m, false),
        ("v_sub_f32", 4, f32m, false),
        ("v_subrev_f32", 5, f32m, false),
        ("v_mac_legacy_f32", 6, InsnMode { lit: LitType::Float, dst_read: true, ..M }, false),
        ("v_mul_legacy_f32", 7, f32m, false),
        ("v_mul_f32", 8, f32m, false),
        ("v_mul_i32_i24", 9, M, false),
        ("v_mul_hi_i32_i24", 10, M, false),
        ("v_mul_u32_u24", 11, M, false),
        ("v_mul_hi_u32_u24", 12, M, false),
        ("v_min_legacy_f32", 13, f32m, false),
        ("v_max_legacy_f32", 14, f32m, false),
        ("v_min_f32", 15, f32m, false),
        ("v_max_f32", 16, f32m, false),
        ("v_min_i32", 17, M, false),
        ("v_max_i32", 18, M, false),
        ("v_min_u32", 19, M, false),
        ("v_max_u32", 20, M, false),
        ("v_lshr_b32", 21, M, false),
        ("v_lshrrev_b32", 22, M, false),
        ("v_ashr_i32", 23, M, false),
        ("v_ashrrev_i32", 24, M, false),
        ("v_lshl_b32", 25, M, false),
        ("v_lshlrev_b32", 26, M, false),
        ("v_and_b32", 27, M, false),
        ("v_or_b32", 28, M, false),
        ("v_xor_b32", 29, M, false),
        ("v_bfm_b32", 30, M, false),
        ("v_mac_f32", 31, InsnMode { lit: LitType::Float, dst_read: true, ..M }, false),
        ("v_madmk_f32", 32, InsnMode { arg: ArgMode::Arg1Imm, lit: LitType::Float, ..M }, false),
        ("v_madak_f32", 33, InsnMode { arg: ArgMode::Arg2Imm, lit: LitType::Float, ..M }, false),
        ("v_bcnt_u32_b32", 34, M, false),
        ("v_mbcnt_lo_u32_b32", 35, M, false),
        ("v_mbcnt_hi_u32_b32", 36, M, false),
        ("v_add_i32", 37, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_sub_i32", 38, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_subrev_i32", 39, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_addc_u32", 40, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_subb_u32", 41, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_subbrev_u32", 42, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_ldexp_f32", 43, f32m, false),
        ("v_cvt_pkaccum_u8_f32", 44, f32m, false),
        ("v_cvt_pknorm_i16_f32", 45, f32m, false),
        ("v_cvt_pknorm_u16_f32", 46, f32m, false),
        ("v_cvt_pkrtz_f16_f32", 47, f32m, false),
        ("v_cvt_pk_u16_u32", 48, M, false),
        ("v_cvt_pk_i16_i32", 49, M, false),
    ];
    for &(mnem, code, mode, vop3b) in si {
        vop2_pair(out, mnem, code, G10_11, mode, 0x100, vop3b);
    }
    // GCN 1.2; VOP3 twin at +0x100. Carry names changed again on Vega.
    let vi: &[(&str, u16, ArchMask, InsnMode, bool)] = &[
        ("v_cndmask_b32", 0, G12_14, InsnMode { arg: ArgMode::Src2Vcc, ..M }, false),
        ("v_add_f32", 1, G12_14, f32m, false),
        ("v_sub_f32", 2, G12_14, f32m, false),
        ("v_subrev_f32", 3, G12_14, f32m, false),
        ("v_mul_legacy_f32", 4, G12_14, f32m, false),
        ("v_mul_f32", 5, G12_14, f32m, false),
        ("v_mul_i32_i24", 6, G12_14, M, false),
        ("v_mul_hi_i32_i24", 7, G12_14, M, false),
        ("v_mul_u32_u24", 8, G12_14, M, false),
        ("v_mul_hi_u32_u24", 9, G12_14, M, false),
        ("v_min_f32", 10, G12_14, f32m, false),
        ("v_max_f32", 11, G12_14, f32m, false),
        ("v_min_i32", 12, G12_14, M, false),
        ("v_max_i32", 13, G12_14, M, false),
        ("v_min_u32", 14, G12_14, M, false),
        ("v_max_u32", 15, G12_14, M, false),
        ("v_lshrrev_b32", 16, G12_14, M, false),
        ("v_ashrrev_i32", 17, G12_14, M, false),
        ("v_lshlrev_b32", 18, G12_14, M, false),
        ("v_and_b32", 19, G12_14, M, false),
        ("v_or_b32", 20, G12_14, M, false),
        ("v_xor_b32", 21, G12_14, M, false),
        ("v_mac_f32", 22, G12_14, InsnMode { lit: LitType::Float, dst_read: true, ..M }, false),
        ("v_madmk_f32", 23, G12_14, InsnMode { arg: ArgMode::Arg1Imm, lit: LitType::Float, ..M }, false),
        ("v_madak_f32", 24, G12_14, InsnMode { arg: ArgMode::Arg2Imm, lit: LitType::Float, ..M }, false),
        ("v_add_u32", 25, G12, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_sub_u32", 26, G12, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_subrev_u32", 27, G12, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_add_co_u32", 25, G14, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_sub_co_u32", 26, G14, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_subrev_co_u32", 27, G14, InsnMode { arg: ArgMode::DstVcc, ..M }, true),
        ("v_addc_u32", 28, G12, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_subb_u32", 29, G12, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_subbrev_u32", 30, G12, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_addc_co_u32", 28, G14, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_subb_co_u32", 29, G14, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_subbrev_co_u32", 30, G14, InsnMode { arg: ArgMode::Ds2Vcc, ..M }, true),
        ("v_add_f16", 31, G12_14, f16m, false),
        ("v_sub_f16", 32, G12_14, f16m, false),
        ("v_subrev_f16", 33, G12_14, f16m, false),
        ("v_mul_f16", 34, G12_14, f16m, false),
        ("v_mac_f16", 35, G12_14, InsnMode { lit: LitType::F16, dst_read: true, ..M }, false),
        ("v_madmk_f16", 36, G12_14, InsnMode { arg: ArgMode::Arg1Imm, lit: LitType::F16, ..M }, false),
        ("v_madak_f16", 37, G12_14, InsnMode { arg: ArgMode::Arg2Imm, lit: LitType::F16, ..M }, false),
        ("v_add_u16", 38, G12_14, M, false),
        ("v_sub_u16", 39, G12_14, M, false),
        ("v_subrev_u16", 40, G12_14, M, false),
        ("v_mul_lo_u16", 41, G12_14, M, false),
        ("v_lshlrev_b16", 42, G12_14, M, false),
        ("v_lshrrev_b16", 43, G12_14, M, false),
        ("v_ashrrev_i16", 44, G12_14, M, false),
        ("v_max_f16", 45, G12_14, f16m, false),
        ("v_min_f16", 46, G12_14, f16m, false),
        ("v_max_u16", 47, G12_14, M, false),
        ("v_max_i16", 48, G12_14, M, false),
        ("v_min_u16", 49, G12_14, M, false),
        ("v_min_i16", 50, G12_14, M, false),
        ("v_ldexp_f16", 51, G12_14, f16m, false),
        ("v_add_u32", 52, G14, M, false),
        ("v_sub_u32", 53, G14, M, false),
        ("v_subrev_u32", 54, G14, M, false),
    ];
    for &(mnem, code, arch, mode, vop3b) in vi {
        vop2_pair(out, mnem, code, arch, mode, 0x100, vop3b);
    }
}

fn vop1_entries(out: &mut Vec<InsnDesc>) {
    let f32m = InsnMode { lit: LitType::Float, ..M };
    let f16m = InsnMode { lit: LitType::F16, ..M };
    let d64s64 = InsnMode { dst64: true, src0_64: true, lit: LitType::Float, ..M };
    let s64 = InsnMode { src0_64: true, lit: LitType::Float, ..M };
    let d64 = InsnMode { dst64: true, lit: LitType::Float, ..M };
    // (mnemonic, si, vi, mode, arch override for vi bucket)
    let table: &[(&str, Option<u16>, Option<u16>, InsnMode)] = &[
        ("v_nop", Some(0), Some(0), InsnMode { arg: ArgMode::VopArgNone, ..M }),
        ("v_mov_b32", Some(1), Some(1), M),
        ("v_readfirstlane_b32", Some(2), Some(2), InsnMode { arg: ArgMode::DstSgpr, ..M }),
        ("v_cvt_i32_f64", Some(3), Some(3), s64),
        ("v_cvt_f64_i32", Some(4), Some(4), d64),
        ("v_cvt_f32_i32", Some(5), Some(5), M),
        ("v_cvt_f32_u32", Some(6), Some(6), M),
        ("v_cvt_u32_f32", Some(7), Some(7), f32m),
        ("v_cvt_i32_f32", Some(8), Some(8), f32m),
        ("v_mov_fed_b32", Some(9), Some(9), M),
        ("v_cvt_f16_f32", Some(10), Some(10), f32m),
        ("v_cvt_f32_f16", Some(11), Some(11), f16m),
        ("v_cvt_rpi_i32_f32", Some(12), Some(12), f32m),
        ("v_cvt_flr_i32_f32", Some(13), Some(13), f32m),
        ("v_cvt_off_f32_i4", Some(14), Some(14), M),
        ("v_cvt_f32_f64", Some(15), Some(15), s64),
        ("v_cvt_f64_f32", Some(16), Some(16), InsnMode { dst64: true, lit: LitType::Float, ..M }),
        ("v_cvt_f32_ubyte0", Some(17), Some(17), M),
        ("v_cvt_f32_ubyte1", Some(18), Some(18), M),
        ("v_cvt_f32_ubyte2", Some(19), Some(19), M),
        ("v_cvt_f32_ubyte3", Some(20), Some(20), M),
        ("v_cvt_u32_f64", Some(21), Some(21), s64),
        ("v_cvt_f64_u32", Some(22), Some(22), d64),
        ("v_fract_f32", Some(32), Some(27), f32m),
        ("v_trunc_f32", Some(33), Some(28), f32m),
        ("v_ceil_f32", Some(34), Some(29), f32m),
        ("v_rndne_f32", Some(35), Some(30), f32m),
        ("v_floor_f32", Some(36), Some(31), f32m),
        ("v_exp_f32", Some(37), Some(32), f32m),
        ("v_log_clamp_f32", Some(38), None, f32m),
        ("v_log_f32", Some(39), Some(33), f32m),
        ("v_rcp_clamp_f32", Some(40), None, f32m),
        ("v_rcp_legacy_f32", Some(41), None, f32m),
        ("v_rcp_f32", Some(42), Some(34), f32m),
        ("v_rcp_iflag_f32", Some(43), Some(35), f32m),
        ("v_rsq_clamp_f32", Some(44), None, f32m),
        ("v_rsq_legacy_f32", Some(45), None, f32m),
        ("v_rsq_f32", Some(46), Some(36), f32m),
        ("v_rcp_f64", Some(47), Some(37), d64s64),
        ("v_rcp_clamp_f64", Some(48), None, d64s64),
        ("v_rsq_f64", Some(49), Some(38), d64s64),
        ("v_rsq_clamp_f64", Some(50), None, d64s64),
        ("v_sqrt_f32", Some(51), Some(39), f32m),
        ("v_sqrt_f64", Some(52), Some(40), d64s64),
        ("v_sin_f32", Some(53), Some(41), f32m),
        ("v_cos_f32", Some(54), Some(42), f32m),
        ("v_not_b32", Some(55), Some(43), M),
        ("v_bfrev_b32", Some(56), Some(44), M),
        ("v_ffbh_u32", Some(57), Some(45), M),
        ("v_ffbl_b32", Some(58), Some(46), M),
        ("v_ffbh_i32", Some(59), Some(47), M),
        ("v_frexp_exp_i32_f64", Some(60), Some(48), s64),
        ("v_frexp_mant_f64", Some(61), Some(49), d64s64),
        ("v_fract_f64", Some(62), Some(50), d64s64),
        ("v_frexp_exp_i32_f32", Some(63), Some(51), f32m),
        ("v_frexp_mant_f32", Some(64), Some(52), f32m),
        ("v_clrexcp", Some(65), Some(53), InsnMode { arg: ArgMode::VopArgNone, ..M }),
        ("v_movreld_b32", Some(66), Some(54), M),
        ("v_movrels_b32", Some(67), Some(55), M),
        ("v_movrelsd_b32", Some(68), Some(56), M),
    ];
    for &(mnem, si, vi, mode) in table {
        if let Some(code) = si {
            vop2_pair_vop1(out, mnem, code, G10_11, mode, 0x180);
        }
        if let Some(code) = vi {
            vop2_pair_vop1(out, mnem, code, G12_14, mode, 0x140);
        }
    }
    // CI additions (f64 rounding), shared with GCN 1.2+
    let ci: &[(&str, u16, u16)] = &[
        ("v_trunc_f64", 23, 23),
        ("v_ceil_f64", 24, 24),
        ("v_rndne_f64", 25, 25),
        ("v_floor_f64", 26, 26),
    ];
    for &(mnem, ci_code, vi_code) in ci {
        vop2_pair_vop1(out, mnem, ci_code, G11, d64s64, 0x180);
        vop2_pair_vop1(out, mnem, vi_code, G12_14, d64s64, 0x140);
    }
    let ci2: &[(&str, u16, u16)] = &[("v_exp_legacy_f32", 69, 75), ("v_log_legacy_f32", 70, 76)];
    for &(mnem, ci_code, vi_code) in ci2 {
        vop2_pair_vop1(out, mnem, ci_code, G11, f32m, 0x180);
        vop2_pair_vop1(out, mnem, vi_code, G12_14, f32m, 0x140);
    }
    // GCN 1.2 f16 unaries
    let f16ops: &[(&str, u16)] = &[
        ("v_cvt_f16_u16", 57),
        ("v_cvt_f16_i16", 58),
        ("v_cvt_u16_f16", 59),
        ("v_cvt_i16_f16", 60),
        ("v_rcp_f16", 61),
        ("v_sqrt_f16", 62),
        ("v_rsq_f16", 63),
        ("v_log_f16", 64),
        ("v_exp_f16", 65),
        ("v_frexp_mant_f16", 66),
        ("v_frexp_exp_i16_f16", 67),
        ("v_floor_f16", 68),
        ("v_ceil_f16", 69),
        ("v_trunc_f16", 70),
        ("v_rndne_f16", 71),
        ("v_fract_f16", 72),
        ("v_sin_f16", 73),
        ("v_cos_f16", 74),
    ];
    for &(mnem, code) in f16ops {
        vop2_pair_vop1(out, mnem, code, G12_14, f16m, 0x140);
    }
    // Vega additions
    let vega: &[(&str, u16, InsnMode)] = &[
        ("v_cvt_norm_i16_f16", 77, f16m),
        ("v_cvt_norm_u16_f16", 78, f16m),
        ("v_sat_pk_u8_i16", 79, M),
        ("v_swap_b32", 80, M),
    ];
    for &(mnem, code, mode) in vega {
        vop2_pair_vop1(out, mnem, code, G14, mode, 0x140);
    }
}

fn vop2_pair_vop1(
    out: &mut Vec<InsnDesc>,
    mnem: &str,
    code: u16,
    arch: ArchMask,
    mode: InsnMode,
    vop3_base: u16,
) {
    out.push(InsnDesc::new(mnem, Encoding::Vop1, mode, code, arch));
    out.push(InsnDesc::new(
        mnem,
        Encoding::Vop3A,
        mode,
        vop3_base + code,
        arch,
    ));
}

const FLOAT_CMP_OPS: [&str; 16] = [
    "f", "lt", "eq", "le", "gt", "lg", "ge", "o", "u", "nge", "nlg", "ngt", "nle", "neq", "nlt",
    "tru",
];
const INT_CMP_OPS: [&str; 8] = ["f", "lt", "eq", "le", "gt", "ne", "ge", "t"];

fn vopc_family(
    out: &mut Vec<InsnDesc>,
    type_suffix: &str,
    ops: &[&str],
    base: u16,
    xbase: u16,
    arch: ArchMask,
    mode: InsnMode,
) {
    for (i, op) in ops.iter().enumerate() {
        for (prefix, code) in [("v_cmp_", base + i as u16), ("v_cmpx_", xbase + i as u16)] {
            let mnem = format!("{}{}_{}", prefix, op, type_suffix);
            out.push(InsnDesc::new(&mnem, Encoding::Vopc, mode, code, arch));
            out.push(InsnDesc::new(&mnem, Encoding::Vop3A, mode, code, arch));
        }
    }
}

fn vopc_entries(out: &mut Vec<InsnDesc>) {
    let f32m = InsnMode { lit: LitType::Float, ..M };
    let f64m = InsnMode { lit: LitType::Float, src0_64: true, src1_64: true, ..M };
    let f16m = InsnMode { lit: LitType::F16, ..M };
    let i64m = InsnMode { src0_64: true, src1_64: true, ..M };
    // SI/CI
    vopc_family(out, "f32", &FLOAT_CMP_OPS, 0x00, 0x10, G10_11, f32m);
    vopc_family(out, "f64", &FLOAT_CMP_OPS, 0x20, 0x30, G10_11, f64m);
    vopc_family(out, "i32", &INT_CMP_OPS, 0x80, 0x90, G10_11, M);
    vopc_family(out, "i64", &INT_CMP_OPS, 0xa0, 0xb0, G10_11, i64m);
    vopc_family(out, "u32", &INT_CMP_OPS, 0xc0, 0xd0, G10_11, M);
    vopc_family(out, "u64", &INT_CMP_OPS, 0xe0, 0xf0, G10_11, i64m);
    for (mnem, code) in [
        ("v_cmp_class_f32", 0x88u16),
        ("v_cmpx_class_f32", 0x98),
        ("v_cmp_class_f64", 0xa8),
        ("v_cmpx_class_f64", 0xb8),
    ] {
        let mode = if mnem.ends_with("f64") { f64m } else { f32m };
        out.push(InsnDesc::new(mnem, Encoding::Vopc, mode, code, G10_11));
        out.push(InsnDesc::new(mnem, Encoding::Vop3A, mode, code, G10_11));
    }
    // GCN 1.2+
    vopc_family(out, "f16", &FLOAT_CMP_OPS, 0x20, 0x30, G12_14, f16m);
    vopc_family(out, "f32", &FLOAT_CMP_OPS, 0x40, 0x50, G12_14, f32m);
    vopc_family(out, "f64", &FLOAT_CMP_OPS, 0x60, 0x70, G12_14, f64m);
    vopc_family(out, "i16", &INT_CMP_OPS, 0xa0, 0xb0, G12_14, M);
    vopc_family(out, "u16", &INT_CMP_OPS, 0xa8, 0xb8, G12_14, M);
    vopc_family(out, "i32", &INT_CMP_OPS, 0xc0, 0xd0, G12_14, M);
    vopc_family(out, "u32", &INT_CMP_OPS, 0xc8, 0xd8, G12_14, M);
    vopc_family(out, "i64", &INT_CMP_OPS, 0xe0, 0xf0, G12_14, i64m);
    vopc_family(out, "u64", &INT_CMP_OPS, 0xe8, 0xf8, G12_14, i64m);
    for (mnem, code) in [
        ("v_cmp_class_f32", 0x10u16),
        ("v_cmpx_class_f32", 0x11),
        ("v_cmp_class_f64", 0x12),
        ("v_cmpx_class_f64", 0x13),
        ("v_cmp_class_f16", 0x14),
        ("v_cmpx_class_f16", 0x15),
    ] {
        let mode = if mnem.ends_with("f64") {
            f64m
        } else if mnem.ends_with("f16") {
            f16m
        } else {
            f32m
        };
        out.push(InsnDesc::new(mnem, Encoding::Vopc, mode, code, G12_14));
        out.push(InsnDesc::new(mnem, Encoding::Vop3A, mode, code, G12_14));
    }
}

fn vop3_entries(out: &mut Vec<InsnDesc>) {
    let f32m = InsnMode { lit: LitType::Float, ..M };
    let f64all = InsnMode {
        lit: LitType::Float,
        dst64: true,
        src0_64: true,
        src1_64: true,
        src2_64: true,
        ..M
    };
    let f16m = InsnMode { lit: LitType::F16, ..M };
    let two = InsnMode { arg: ArgMode::Src2None, ..M };
    // VOP3-only three-source entries: (mnemonic, si, vi, mode, vop3b)
    let table: &[(&str, Option<u16>, Option<u16>, InsnMode, bool)] = &[
        ("v_mad_legacy_f32", Some(0x140), Some(0x1c0), f32m, false),
        ("v_mad_f32", Some(0x141), Some(0x1c1), f32m, false),
        ("v_mad_i32_i24", Some(0x142), Some(0x1c2), M, false),
        ("v_mad_u32_u24", Some(0x143), Some(0x1c3), M, false),
        ("v_cubeid_f32", Some(0x144), Some(0x1c4), f32m, false),
        ("v_cubesc_f32", Some(0x145), Some(0x1c5), f32m, false),
        ("v_cubetc_f32", Some(0x146), Some(0x1c6), f32m, false),
        ("v_cubema_f32", Some(0x147), Some(0x1c7), f32m, false),
        ("v_bfe_u32", Some(0x148), Some(0x1c8), M, false),
        ("v_bfe_i32", Some(0x149), Some(0x1c9), M, false),
        ("v_bfi_b32", Some(0x14a), Some(0x1ca), M, false),
        ("v_fma_f32", Some(0x14b), Some(0x1cb), f32m, false),
        ("v_fma_f64", Some(0x14c), Some(0x1cc), f64all, false),
        ("v_lerp_u8", Some(0x14d), Some(0x1cd), M, false),
        ("v_alignbit_b32", Some(0x14e), Some(0x1ce), M, false),
        ("v_alignbyte_b32", Some(0x14f), Some(0x1cf), M, false),
        ("v_mullit_f32", Some(0x150), None, f32m, false),
        ("v_min3_f32", Some(0x151), Some(0x1d0), f32m, false),
        ("v_min3_i32", Some(0x152), Some(0x1d1), M, false),
        ("v_min3_u32", Some(0x153), Some(0x1d2), M, false),
        ("v_max3_f32", Some(0x154), Some(0x1d3), f32m, false),
        ("v_max3_i32", Some(0x155), Some(0x1d4), M, false),
        ("v_max3_u32", Some(0x156), Some(0x1d5), M, false),
        ("v_med3_f32", Some(0x157), Some(0x1d6), f32m, false),
        ("v_med3_i32", Some(0x158), Some(0x1d7), M, false),
        ("v_med3_u32", Some(0x159), Some(0x1d8), M, false),
        ("v_sad_u8", Some(0x15a), Some(0x1d9), M, false),
        ("v_sad_hi_u8", Some(0x15b), Some(0x1da), M, false),
        ("v_sad_u16", Some(0x15c), Some(0x1db), M, false),
        ("v_sad_u32", Some(0x15d), Some(0x1dc), M, false),
        ("v_cvt_pk_u8_f32", Some(0x15e), Some(0x1dd), f32m, false),
        ("v_div_fixup_f32", Some(0x15f), Some(0x1de), f32m, false),
        ("v_div_fixup_f64", Some(0x160), Some(0x1df), f64all, false),
        ("v_lshl_b64", Some(0x161), None, InsnMode { dst64: true, src0_64: true, ..two }, false),
        ("v_lshr_b64", Some(0x162), None, InsnMode { dst64: true, src0_64: true, ..two }, false),
        ("v_ashr_i64", Some(0x163), None, InsnMode { dst64: true, src0_64: true, ..two }, false),
        ("v_add_f64", Some(0x164), Some(0x280), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, dst64: true, src0_64: true, src1_64: true, ..M }, false),
        ("v_mul_f64", Some(0x165), Some(0x281), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, dst64: true, src0_64: true, src1_64: true, ..M }, false),
        ("v_min_f64", Some(0x166), Some(0x282), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, dst64: true, src0_64: true, src1_64: true, ..M }, false),
        ("v_max_f64", Some(0x167), Some(0x283), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, dst64: true, src0_64: true, src1_64: true, ..M }, false),
        ("v_ldexp_f64", Some(0x168), Some(0x284), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, dst64: true, src0_64: true, ..M }, false),
        ("v_mul_lo_u32", Some(0x169), Some(0x285), two, false),
        ("v_mul_hi_u32", Some(0x16a), Some(0x286), two, false),
        ("v_mul_lo_i32", Some(0x16b), None, two, false),
        ("v_mul_hi_i32", Some(0x16c), Some(0x287), two, false),
        ("v_div_scale_f32", Some(0x16d), Some(0x1e0), InsnMode { lit: LitType::Float, ..M }, true),
        ("v_div_scale_f64", Some(0x16e), Some(0x1e1), f64all, true),
        ("v_div_fmas_f32", Some(0x16f), Some(0x1e2), f32m, false),
        ("v_div_fmas_f64", Some(0x170), Some(0x1e3), f64all, false),
        ("v_msad_u8", Some(0x171), Some(0x1e4), M, false),
        ("v_trig_preop_f64", Some(0x174), Some(0x292), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, dst64: true, src0_64: true, ..M }, false),
        ("v_ldexp_f32", None, Some(0x288), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, ..M }, false),
        ("v_readlane_b32", None, Some(0x289), InsnMode { arg: ArgMode::Ds1Sgpr, ..two }, false),
        ("v_writelane_b32", None, Some(0x28a), InsnMode { arg: ArgMode::Src1Sgpr, ..two }, false),
        ("v_bcnt_u32_b32", None, Some(0x28b), two, false),
        ("v_mbcnt_lo_u32_b32", None, Some(0x28c), two, false),
        ("v_mbcnt_hi_u32_b32", None, Some(0x28d), two, false),
        ("v_lshlrev_b64", None, Some(0x28f), InsnMode { dst64: true, src1_64: true, ..two }, false),
        ("v_lshrrev_b64", None, Some(0x290), InsnMode { dst64: true, src1_64: true, ..two }, false),
        ("v_ashrrev_i64", None, Some(0x291), InsnMode { dst64: true, src1_64: true, ..two }, false),
        ("v_bfm_b32", None, Some(0x293), two, false),
        ("v_cvt_pknorm_i16_f32", None, Some(0x294), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, ..M }, false),
        ("v_cvt_pknorm_u16_f32", None, Some(0x295), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, ..M }, false),
        ("v_cvt_pkrtz_f16_f32", None, Some(0x296), InsnMode { arg: ArgMode::Src2None, lit: LitType::Float, ..M }, false),
        ("v_cvt_pk_u16_u32", None, Some(0x297), two, false),
        ("v_cvt_pk_i16_i32", None, Some(0x298), two, false),
    ];
    for &(mnem, si, vi, mode, vop3b) in table {
        let enc = if vop3b { Encoding::Vop3B } else { Encoding::Vop3A };
        if let Some(code) = si {
            out.push(InsnDesc::new(mnem, enc, mode, code, G10_11));
        }
        if let Some(code) = vi {
            out.push(InsnDesc::new(mnem, enc, mode, code, G12_14));
        }
    }
    // 128-bit QSAD group (CI names carried forward on 1.2+)
    out.push(InsnDesc::new("v_qsad_u8", Encoding::Vop3A, InsnMode { dst64: true, src0_64: true, src2_64: true, ..M }, 0x172, ArchMask::GCN10));
    out.push(InsnDesc::new("v_qsad_pk_u16_u8", Encoding::Vop3A, InsnMode { dst64: true, src0_64: true, src2_64: true, ..M }, 0x172, G11));
    out.push(InsnDesc::new("v_qsad_pk_u16_u8", Encoding::Vop3A, InsnMode { dst64: true, src0_64: true, src2_64: true, ..M }, 0x1e5, G12_14));
    out.push(InsnDesc::new("v_mqsad_u8", Encoding::Vop3A, InsnMode { dst64: true, src0_64: true, src2_64: true, ..M }, 0x173, ArchMask::GCN10));
    out.push(InsnDesc::new("v_mqsad_pk_u16_u8", Encoding::Vop3A, InsnMode { dst64: true, src0_64: true, src2_64: true, ..M }, 0x173, G11));
    out.push(InsnDesc::new("v_mqsad_pk_u16_u8", Encoding::Vop3A, InsnMode { dst64: true, src0_64: true, src2_64: true, ..M }, 0x1e6, G12_14));
    // 128-bit destination forms
    let m128 = InsnMode { dsize: 4, src0_64: true, ..M };
    out.push(InsnDesc::new("v_mqsad_u32_u8", Encoding::Vop3A, m128, 0x175, G11));
    out.push(InsnDesc::new("v_mqsad_u32_u8", Encoding::Vop3A, m128, 0x1e7, G12_14));
    let mad64 = InsnMode { dst64: true, src2_64: true, ..M };
    out.push(InsnDesc::new("v_mad_u64_u32", Encoding::Vop3B, mad64, 0x176, G11));
    out.push(InsnDesc::new("v_mad_i64_i32", Encoding::Vop3B, mad64, 0x177, G11));
    out.push(InsnDesc::new("v_mad_u64_u32", Encoding::Vop3B, mad64, 0x1e8, G12_14));
    out.push(InsnDesc::new("v_mad_i64_i32", Encoding::Vop3B, mad64, 0x1e9, G12_14));
    // GCN 1.2 three-source f16 ops
    let vi_f16: &[(&str, u16)] = &[
        ("v_mad_f16", 0x1ea),
        ("v_mad_u16", 0x1eb),
        ("v_mad_i16", 0x1ec),
        ("v_fma_f16", 0x1ee),
        ("v_div_fixup_f16", 0x1ef),
    ];
    for &(mnem, code) in vi_f16 {
        let mode = if mnem.contains("f16") { f16m } else { M };
        out.push(InsnDesc::new(mnem, Encoding::Vop3A, mode, code, G12));
    }
    out.push(InsnDesc::new("v_perm_b32", Encoding::Vop3A, M, 0x1ed, G12_14));
    // Vega VOP3P packed-math subset
    let vop3p: &[(&str, u16)] = &[
        ("v_pk_mad_i16", 0x00),
        ("v_pk_mul_lo_u16", 0x01),
        ("v_pk_add_i16", 0x02),
        ("v_pk_sub_i16", 0x03),
        ("v_pk_lshlrev_b16", 0x04),
        ("v_pk_lshrrev_b16", 0x05),
        ("v_pk_ashrrev_i16", 0x06),
        ("v_pk_max_i16", 0x07),
        ("v_pk_min_i16", 0x08),
        ("v_pk_mad_u16", 0x09),
        ("v_pk_add_u16", 0x0a),
        ("v_pk_sub_u16", 0x0b),
        ("v_pk_max_u16", 0x0c),
        ("v_pk_min_u16", 0x0d),
        ("v_pk_fma_f16", 0x0e),
        ("v_pk_add_f16", 0x0f),
        ("v_pk_mul_f16", 0x10),
        ("v_pk_min_f16", 0x11),
        ("v_pk_max_f16", 0x12),
    ];
    for &(mnem, code) in vop3p {
        let three = matches!(code, 0x00 | 0x09 | 0x0e);
        let mode = InsnMode {
            arg: if three { ArgMode::Std } else { ArgMode::Src2None },
            vop3p: true,
            lit: LitType::F16,
            ..M
        };
        // VOP3P occupies the 0x380 block of the 10-bit VOP3 opcode space
        out.push(InsnDesc::new(mnem, Encoding::Vop3A, mode, 0x380 + code, G14));
    }
}

fn vintrp_entries(out: &mut Vec<InsnDesc>) {
    let table: &[(&str, u16, ArgMode)] = &[
        ("v_interp_p1_f32", 0, ArgMode::Std),
        ("v_interp_p2_f32", 1, ArgMode::Std),
        ("v_interp_mov_f32", 2, ArgMode::P0P10P20),
    ];
    for &(mnem, code, arg) in table {
        let mode = InsnMode { arg, ..M };
        out.push(InsnDesc::new(mnem, Encoding::Vintrp, mode, code, ALL));
        // GCN 1.2+ VOP3 twin; the merge attaches the plain opcode as code2
        let mode3 = InsnMode { arg, vintrp_vop3: true, ..M };
        out.push(InsnDesc::new(mnem, Encoding::Vop3A, mode3, 0x270 + code, G12_14));
    }
    // VOP3-only interpolation (GCN 1.2+)
    let vop3only: &[(&str, u16, ArgMode)] = &[
        ("v_interp_p1ll_f16", 0x274, ArgMode::Std),
        ("v_interp_p1lv_f16", 0x275, ArgMode::VintrpSrc2),
        ("v_interp_p2_f16", 0x276, ArgMode::VintrpSrc2),
    ];
    for &(mnem, code, arg) in vop3only {
        let mode = InsnMode { arg, vintrp_vop3: true, lit: LitType::F16, ..M };
        out.push(InsnDesc::new(mnem, Encoding::Vop3A, mode, code, G12_14));
    }
}

fn ds_entries(out: &mut Vec<InsnDesc>) {
    // DS opcode values are stable across generations for this subset; only
    // the opcode bit position moves.
    let atomic = |code: u16, size: u8| {
        (code, InsnMode { arg: ArgMode::DsAddrSrc, mem_atomic: true, dsize: size, ..M })
    };
    let atomic_rtn = |code: u16, size: u8| {
        (
            code,
            InsnMode {
                arg: ArgMode::DsDstAddrSrc,
                mem_atomic: true,
                mem_load: true,
                dsize: size,
                ..M
            },
        )
    };
    let mut push = |mnem: &str, entry: (u16, InsnMode), arch: ArchMask| {
        out.push(InsnDesc::new(mnem, Encoding::Ds, entry.1, entry.0, arch));
    };
    for (base, size, sfx) in [(0u16, 1u8, "u32"), (64, 2, "u64")] {
        push(&format!("ds_add_{}", sfx), atomic(base, size), ALL);
        push(&format!("ds_sub_{}", sfx), atomic(base + 1, size), ALL);
        push(&format!("ds_rsub_{}", sfx), atomic(base + 2, size), ALL);
        push(&format!("ds_inc_{}", sfx), atomic(base + 3, size), ALL);
        push(&format!("ds_dec_{}", sfx), atomic(base + 4, size), ALL);
        let isfx = sfx.replace('u', "i");
        push(&format!("ds_min_{}", isfx), atomic(base + 5, size), ALL);
        push(&format!("ds_max_{}", isfx), atomic(base + 6, size), ALL);
        push(&format!("ds_min_{}", sfx), atomic(base + 7, size), ALL);
        push(&format!("ds_max_{}", sfx), atomic(base + 8, size), ALL);
        let bsfx = sfx.replace('u', "b");
        push(&format!("ds_and_{}", bsfx), atomic(base + 9, size), ALL);
        push(&format!("ds_or_{}", bsfx), atomic(base + 10, size), ALL);
        push(&format!("ds_xor_{}", bsfx), atomic(base + 11, size), ALL);
        push(
            &format!("ds_mskor_{}", bsfx),
            (base + 12, InsnMode { arg: ArgMode::DsAddr2Src, dsize: size, ..M }),
            ALL,
        );
        push(
            &format!("ds_write_{}", bsfx),
            (base + 13, InsnMode { arg: ArgMode::DsAddrSrc, dsize: size, ..M }),
            ALL,
        );
        push(
            &format!("ds_write2_{}", bsfx),
            (base + 14, InsnMode { arg: ArgMode::DsAddr2Src, dsize: size, two_offsets: true, ..M }),
            ALL,
        );
        push(
            &format!("ds_write2st64_{}", bsfx),
            (base + 15, InsnMode { arg: ArgMode::DsAddr2Src, dsize: size, two_offsets: true, ..M }),
            ALL,
        );
        push(
            &format!("ds_cmpst_{}", bsfx),
            (base + 16, InsnMode { arg: ArgMode::DsAddr2Src, dsize: size, ..M }),
            ALL,
        );
        let fsfx = sfx.replace('u', "f");
        push(
            &format!("ds_cmpst_{}", fsfx),
            (base + 17, InsnMode { arg: ArgMode::DsAddr2Src, dsize: size, ..M }),
            ALL,
        );
        push(&format!("ds_min_{}", fsfx), atomic(base + 18, size), ALL);
        push(&format!("ds_max_{}", fsfx), atomic(base + 19, size), ALL);
        // rtn forms
        push(&format!("ds_add_rtn_{}", sfx), atomic_rtn(base + 32, size), ALL);
        push(&format!("ds_sub_rtn_{}", sfx), atomic_rtn(base + 33, size), ALL);
        push(&format!("ds_rsub_rtn_{}", sfx), atomic_rtn(base + 34, size), ALL);
        push(&format!("ds_inc_rtn_{}", sfx), atomic_rtn(base + 35, size), ALL);
        push(&format!("ds_dec_rtn_{}", sfx), atomic_rtn(base + 36, size), ALL);
        push(&format!("ds_min_rtn_{}", isfx), atomic_rtn(base + 37, size), ALL);
        push(&format!("ds_max_rtn_{}", isfx), atomic_rtn(base + 38, size), ALL);
        push(&format!("ds_min_rtn_{}", sfx), atomic_rtn(base + 39, size), ALL);
        push(&format!("ds_max_rtn_{}", sfx), atomic_rtn(base + 40, size), ALL);
        push(&format!("ds_and_rtn_{}", bsfx), atomic_rtn(base + 41, size), ALL);
        push(&format!("ds_or_rtn_{}", bsfx), atomic_rtn(base + 42, size), ALL);
        push(&format!("ds_xor_rtn_{}", bsfx), atomic_rtn(base + 43, size), ALL);
        push(
            &format!("ds_mskor_rtn_{}", bsfx),
            (base + 44, InsnMode { arg: ArgMode::DsDstAddr2Src, mem_atomic: true, mem_load: true, dsize: size, ..M }),
            ALL,
        );
        push(&format!("ds_wrxchg_rtn_{}", bsfx), atomic_rtn(base + 45, size), ALL);
        push(
            &format!("ds_wrxchg2_rtn_{}", bsfx),
            (base + 46, InsnMode { arg: ArgMode::DsDstAddr2Src, mem_load: true, dsize: size, two_offsets: true, ..M }),
            ALL,
        );
        push(
            &format!("ds_wrxchg2st64_rtn_{}", bsfx),
            (base + 47, InsnMode { arg: ArgMode::DsDstAddr2Src, mem_load: true, dsize: size, two_offsets: true, ..M }),
            ALL,
        );
        push(
            &format!("ds_cmpst_rtn_{}", bsfx),
            (base + 48, InsnMode { arg: ArgMode::DsDstAddr2Src, mem_atomic: true, mem_load: true, dsize: size, ..M }),
            ALL,
        );
        push(
            &format!("ds_cmpst_rtn_{}", fsfx),
            (base + 49, InsnMode { arg: ArgMode::DsDstAddr2Src, mem_atomic: true, mem_load: true, dsize: size, ..M }),
            ALL,
        );
        push(&format!("ds_min_rtn_{}", fsfx), atomic_rtn(base + 50, size), ALL);
        push(&format!("ds_max_rtn_{}", fsfx), atomic_rtn(base + 51, size), ALL);
        push(
            &format!("ds_read_{}", bsfx),
            (base + 54, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: size, ..M }),
            ALL,
        );
        push(
            &format!("ds_read2_{}", bsfx),
            (base + 55, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: size, two_offsets: true, ..M }),
            ALL,
        );
        push(
            &format!("ds_read2st64_{}", bsfx),
            (base + 56, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: size, two_offsets: true, ..M }),
            ALL,
        );
    }
    let read = |code: u16| {
        (code, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: 1, ..M })
    };
    push("ds_write_b8", (30, InsnMode { arg: ArgMode::DsAddrSrc, dsize: 1, ..M }), ALL);
    push("ds_write_b16", (31, InsnMode { arg: ArgMode::DsAddrSrc, dsize: 1, ..M }), ALL);
    push("ds_wrap_rtn_b32", (52, InsnMode { arg: ArgMode::DsDstAddr2Src, mem_load: true, dsize: 1, ..M }), G11P);
    push("ds_swizzle_b32", (53, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: 1, ..M }), ALL);
    push("ds_read_i8", read(57), ALL);
    push("ds_read_u8", read(58), ALL);
    push("ds_read_i16", read(59), ALL);
    push("ds_read_u16", read(60), ALL);
    push("ds_consume", (61, InsnMode { arg: ArgMode::DsOnlyDst, mem_load: true, dsize: 1, ..M }), ALL);
    push("ds_append", (62, InsnMode { arg: ArgMode::DsOnlyDst, mem_load: true, dsize: 1, ..M }), ALL);
    push("ds_ordered_count", (63, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: 1, gds_only: true, ..M }), ALL);
    push("ds_nop", (20, InsnMode { arg: ArgMode::NoArgs, ..M }), G11P);
    for (mnem, code) in [
        ("ds_gws_init", 25u16),
        ("ds_gws_sema_v", 26),
        ("ds_gws_sema_br", 27),
        ("ds_gws_sema_p", 28),
        ("ds_gws_barrier", 29),
    ] {
        let arg = if matches!(code, 26 | 28) {
            ArgMode::NoArgs
        } else {
            ArgMode::DsOnlySrc0
        };
        push(mnem, (code, InsnMode { arg, gds_only: true, dsize: 1, ..M }), ALL);
    }
    push("ds_condxchg32_rtn_b64", (126, InsnMode { arg: ArgMode::DsDstAddrSrc, mem_load: true, dsize: 2, ..M }), ALL);
    push("ds_read_b96", (254, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: 3, ..M }), G11P);
    push("ds_read_b128", (255, InsnMode { arg: ArgMode::DsDstAddr, mem_load: true, dsize: 4, ..M }), G11P);
    push("ds_write_b96", (222, InsnMode { arg: ArgMode::DsAddrSrc, dsize: 3, ..M }), G11P);
    push("ds_write_b128", (223, InsnMode { arg: ArgMode::DsAddrSrc, dsize: 4, ..M }), G11P);
}

fn mubuf_entries(out: &mut Vec<InsnDesc>) {
    let load = |size: u8| InsnMode { mem_load: true, dsize: size, ..M };
    let store = |size: u8| InsnMode { dsize: size, ..M };
    // (mnemonic, si code, vi code, mode)
    let table: &[(&str, Option<u16>, Option<u16>, InsnMode)] = &[
        ("buffer_load_format_x", Some(0), Some(0), load(1)),
        ("buffer_load_format_xy", Some(1), Some(1), load(2)),
        ("buffer_load_format_xyz", Some(2), Some(2), load(3)),
        ("buffer_load_format_xyzw", Some(3), Some(3), load(4)),
        ("buffer_store_format_x", Some(4), Some(4), store(1)),
        ("buffer_store_format_xy", Some(5), Some(5), store(2)),
        ("buffer_store_format_xyz", Some(6), Some(6), store(3)),
        ("buffer_store_format_xyzw", Some(7), Some(7), store(4)),
        ("buffer_load_ubyte", Some(8), Some(8), load(1)),
        ("buffer_load_sbyte", Some(9), Some(9), load(1)),
        ("buffer_load_ushort", Some(10), Some(10), load(1)),
        ("buffer_load_sshort", Some(11), Some(11), load(1)),
        ("buffer_load_dword", Some(12), Some(12), load(1)),
        ("buffer_load_dwordx2", Some(13), Some(13), load(2)),
        ("buffer_load_dwordx4", Some(14), Some(15), load(4)),
        ("buffer_load_dwordx3", None, Some(14), load(3)),
        ("buffer_store_byte", Some(24), Some(24), store(1)),
        ("buffer_store_short", Some(26), Some(26), store(1)),
        ("buffer_store_dword", Some(28), Some(28), store(1)),
        ("buffer_store_dwordx2", Some(29), Some(29), store(2)),
        ("buffer_store_dwordx4", Some(30), Some(31), store(4)),
        ("buffer_store_dwordx3", None, Some(30), store(3)),
    ];
    for &(mnem, si, vi, mode) in table {
        if let Some(code) = si {
            out.push(InsnDesc::new(mnem, Encoding::Mubuf, mode, code, G10_11));
        }
        if let Some(code) = vi {
            out.push(InsnDesc::new(mnem, Encoding::Mubuf, mode, code, G12_14));
        }
    }
    // CI dwordx3 forms at their own slots
    out.push(InsnDesc::new("buffer_load_dwordx3", Encoding::Mubuf, load(3), 15, G11));
    out.push(InsnDesc::new("buffer_store_dwordx3", Encoding::Mubuf, store(3), 31, G11));
    // atomics: SI/CI base 48, x2 base 80; GCN 1.2+ base 64, x2 base 96.
    // Offsets are the dense GCN 1.2 layout; the SI/CI layout has a hole
    // where rsub was.
    let names: &[(&str, u16, u8, bool)] = &[
        ("swap", 0, 1, false),
        ("cmpswap", 1, 2, true),
        ("add", 2, 1, false),
        ("sub", 3, 1, false),
        ("smin", 4, 1, false),
        ("umin", 5, 1, false),
        ("smax", 6, 1, false),
        ("umax", 7, 1, false),
        ("and", 8, 1, false),
        ("or", 9, 1, false),
        ("xor", 10, 1, false),
        ("inc", 11, 1, false),
        ("dec", 12, 1, false),
    ];
    for &(name, offset, size, halfwrite) in names {
        let mode = InsnMode {
            mem_atomic: true,
            halfwrite,
            dsize: size,
            ..M
        };
        let mode_x2 = InsnMode { dsize: size * 2, ..mode };
        // GCN 1.2+ layout is dense
        out.push(InsnDesc::new(
            format!("buffer_atomic_{}", name),
            Encoding::Mubuf,
            mode,
            64 + offset,
            G12_14,
        ));
        out.push(InsnDesc::new(
            format!("buffer_atomic_{}_x2", name),
            Encoding::Mubuf,
            mode_x2,
            96 + offset,
            G12_14,
        ));
        // SI/CI layout leaves a hole at +4 (rsub)
        let si_offset = if offset >= 4 { offset + 1 } else { offset };
        out.push(InsnDesc::new(
            format!("buffer_atomic_{}", name),
            Encoding::Mubuf,
            mode,
            48 + si_offset,
            G10_11,
        ));
        out.push(InsnDesc::new(
            format!("buffer_atomic_{}_x2", name),
            Encoding::Mubuf,
            mode_x2,
            80 + si_offset,
            G10_11,
        ));
    }
    out.push(InsnDesc::new(
        "buffer_atomic_rsub",
        Encoding::Mubuf,
        InsnMode { mem_atomic: true, dsize: 1, ..M },
        52,
        ArchMask::GCN10,
    ));
    out.push(InsnDesc::new(
        "buffer_atomic_rsub_x2",
        Encoding::Mubuf,
        InsnMode { mem_atomic: true, dsize: 2, ..M },
        84,
        ArchMask::GCN10,
    ));
    let novad = InsnMode { arg: ArgMode::MubufNoVad, ..M };
    out.push(InsnDesc::new("buffer_wbinvl1_sc", Encoding::Mubuf, InsnMode { arg: ArgMode::ArgNone, ..M }, 112, ArchMask::GCN10));
    out.push(InsnDesc::new("buffer_wbinvl1_vol", Encoding::Mubuf, InsnMode { arg: ArgMode::ArgNone, ..M }, 112, G11));
    out.push(InsnDesc::new("buffer_wbinvl1", Encoding::Mubuf, InsnMode { arg: ArgMode::ArgNone, ..M }, 113, G10_11));
    out.push(InsnDesc::new("buffer_store_lds_dword", Encoding::Mubuf, novad, 61, G12_14));
    out.push(InsnDesc::new("buffer_wbinvl1", Encoding::Mubuf, InsnMode { arg: ArgMode::ArgNone, ..M }, 62, G12_14));
    out.push(InsnDesc::new("buffer_wbinvl1_vol", Encoding::Mubuf, InsnMode { arg: ArgMode::ArgNone, ..M }, 63, G12_14));
}

fn mtbuf_entries(out: &mut Vec<InsnDesc>) {
    let table: &[(&str, u16, u8, bool)] = &[
        ("tbuffer_load_format_x", 0, 1, true),
        ("tbuffer_load_format_xy", 1, 2, true),
        ("tbuffer_load_format_xyz", 2, 3, true),
        ("tbuffer_load_format_xyzw", 3, 4, true),
        ("tbuffer_store_format_x", 4, 1, false),
        ("tbuffer_store_format_xy", 5, 2, false),
        ("tbuffer_store_format_xyz", 6, 3, false),
        ("tbuffer_store_format_xyzw", 7, 4, false),
    ];
    for &(mnem, code, size, is_load) in table {
        let mode = InsnMode {
            mem_load: is_load,
            dsize: size,
            ..M
        };
        out.push(InsnDesc::new(mnem, Encoding::Mtbuf, mode, code, ALL));
    }
}

fn mimg_entries(out: &mut Vec<InsnDesc>) {
    let load = InsnMode { mem_load: true, dsize: 1, ..M };
    let store = InsnMode { dsize: 1, ..M };
    let table: &[(&str, u16, InsnMode)] = &[
        ("image_load", 0, load),
        ("image_load_mip", 1, load),
        ("image_load_pck", 2, load),
        ("image_load_pck_sgn", 3, load),
        ("image_load_mip_pck", 4, load),
        ("image_load_mip_pck_sgn", 5, load),
        ("image_store", 8, store),
        ("image_store_mip", 9, store),
        ("image_store_pck", 10, store),
        ("image_store_mip_pck", 11, store),
        ("image_get_resinfo", 14, load),
    ];
    for &(mnem, code, mode) in table {
        out.push(InsnDesc::new(mnem, Encoding::Mimg, mode, code, ALL));
    }
    // atomics: SI/CI from 15 with the rsub hole, GCN 1.2+ from 16 dense
    let names: &[(&str, u16, bool)] = &[
        ("swap", 0, false),
        ("cmpswap", 1, true),
        ("add", 2, false),
        ("sub", 3, false),
        ("smin", 4, false),
        ("umin", 5, false),
        ("smax", 6, false),
        ("umax", 7, false),
        ("and", 8, false),
        ("or", 9, false),
        ("xor", 10, false),
        ("inc", 11, false),
        ("dec", 12, false),
    ];
    for &(name, offset, halfwrite) in names {
        let mode = InsnMode {
            mem_atomic: true,
            halfwrite,
            dsize: 1,
            ..M
        };
        let si_offset = if offset >= 4 { offset + 1 } else { offset };
        out.push(InsnDesc::new(
            format!("image_atomic_{}", name),
            Encoding::Mimg,
            mode,
            15 + si_offset,
            G10_11,
        ));
        out.push(InsnDesc::new(
            format!("image_atomic_{}", name),
            Encoding::Mimg,
            mode,
            16 + offset,
            G12_14,
        ));
    }
    out.push(InsnDesc::new(
        "image_atomic_rsub",
        Encoding::Mimg,
        InsnMode { mem_atomic: true, dsize: 1, ..M },
        19,
        ArchMask::GCN10,
    ));
    // sampling subset; opcode values are stable across generations
    let sample = InsnMode { mem_load: true, sample: true, dsize: 1, ..M };
    let deriv = InsnMode { vaderiv: true, ..sample };
    let table: &[(&str, u16, InsnMode)] = &[
        ("image_sample", 32, sample),
        ("image_sample_cl", 33, sample),
        ("image_sample_d", 34, deriv),
        ("image_sample_d_cl", 35, deriv),
        ("image_sample_l", 36, sample),
        ("image_sample_b", 37, sample),
        ("image_sample_b_cl", 38, sample),
        ("image_sample_lz", 39, sample),
        ("image_sample_c", 40, sample),
        ("image_sample_c_cl", 41, sample),
        ("image_sample_c_d", 42, deriv),
        ("image_sample_c_d_cl", 43, deriv),
        ("image_sample_c_l", 44, sample),
        ("image_sample_c_b", 45, sample),
        ("image_sample_c_b_cl", 46, sample),
        ("image_sample_c_lz", 47, sample),
        ("image_gather4", 64, InsnMode { vdata4: true, ..sample }),
        ("image_gather4_cl", 65, InsnMode { vdata4: true, ..sample }),
        ("image_gather4_l", 68, InsnMode { vdata4: true, ..sample }),
        ("image_gather4_b", 69, InsnMode { vdata4: true, ..sample }),
        ("image_gather4_lz", 71, InsnMode { vdata4: true, ..sample }),
        ("image_get_lod", 96, sample),
    ];
    for &(mnem, code, mode) in table {
        out.push(InsnDesc::new(mnem, Encoding::Mimg, mode, code, ALL));
    }
}

fn exp_entries(out: &mut Vec<InsnDesc>) {
    out.push(InsnDesc::new("exp", Encoding::Exp, M, 0, ALL));
}

fn flat_entries(out: &mut Vec<InsnDesc>) {
    let load = |size: u8| InsnMode {
        arg: ArgMode::FlatLoad,
        mem_load: true,
        dsize: size,
        ..M
    };
    let store = |size: u8| InsnMode {
        arg: ArgMode::FlatStore,
        dsize: size,
        ..M
    };
    // (mnemonic, ci code, vi code, mode)
    let table: &[(&str, u16, u16, InsnMode)] = &[
        ("flat_load_ubyte", 8, 16, load(1)),
        ("flat_load_sbyte", 9, 17, load(1)),
        ("flat_load_ushort", 10, 18, load(1)),
        ("flat_load_sshort", 11, 19, load(1)),
        ("flat_load_dword", 12, 20, load(1)),
        ("flat_load_dwordx2", 13, 21, load(2)),
        ("flat_load_dwordx3", 15, 22, load(3)),
        ("flat_load_dwordx4", 14, 23, load(4)),
        ("flat_store_byte", 24, 24, store(1)),
        ("flat_store_short", 26, 26, store(1)),
        ("flat_store_dword", 28, 28, store(1)),
        ("flat_store_dwordx2", 29, 29, store(2)),
        ("flat_store_dwordx3", 31, 30, store(3)),
        ("flat_store_dwordx4", 30, 31, store(4)),
    ];
    // The GCN 1.1 flat opcode map differs from 1.2+ in the load block only.
    for &(mnem, ci, vi, mode) in table {
        out.push(InsnDesc::new(mnem, Encoding::Flat, mode, ci, G11));
        out.push(InsnDesc::new(mnem, Encoding::Flat, mode, vi, G12_14));
    }
    // dense GCN 1.2 offsets; the GCN 1.1 block keeps the rsub hole
    let names: &[(&str, u16, u8, bool)] = &[
        ("swap", 0, 1, false),
        ("cmpswap", 1, 2, true),
        ("add", 2, 1, false),
        ("sub", 3, 1, false),
        ("smin", 4, 1, false),
        ("umin", 5, 1, false),
        ("smax", 6, 1, false),
        ("umax", 7, 1, false),
        ("and", 8, 1, false),
        ("or", 9, 1, false),
        ("xor", 10, 1, false),
        ("inc", 11, 1, false),
        ("dec", 12, 1, false),
    ];
    for &(name, offset, size, halfwrite) in names {
        let mode = InsnMode {
            arg: ArgMode::FlatAtomic,
            mem_atomic: true,
            halfwrite,
            dsize: size,
            ..M
        };
        let mode_x2 = InsnMode { dsize: size * 2, ..mode };
        let si_offset = if offset >= 4 { offset + 1 } else { offset };
        out.push(InsnDesc::new(
            format!("flat_atomic_{}", name),
            Encoding::Flat,
            mode,
            48 + si_offset,
            G11,
        ));
        out.push(InsnDesc::new(
            format!("flat_atomic_{}_x2", name),
            Encoding::Flat,
            mode_x2,
            80 + si_offset,
            G11,
        ));
        out.push(InsnDesc::new(
            format!("flat_atomic_{}", name),
            Encoding::Flat,
            mode,
            64 + offset,
            G12_14,
        ));
        out.push(InsnDesc::new(
            format!("flat_atomic_{}_x2", name),
            Encoding::Flat,
            mode_x2,
            96 + offset,
            G12_14,
        ));
    }
    // Vega GLOBAL and SCRATCH address spaces share the opcode map
    for &(mnem, _, vi, mode) in table {
        let global = mnem.replace("flat_", "global_");
        out.push(InsnDesc::new(
            global,
            Encoding::Flat,
            InsnMode { flat_mode: FlatMode::Global, ..mode },
            vi,
            G14,
        ));
        let scratch = mnem.replace("flat_", "scratch_");
        out.push(InsnDesc::new(
            scratch,
            Encoding::Flat,
            InsnMode { flat_mode: FlatMode::Scratch, ..mode },
            vi,
            G14,
        ));
    }
    for &(name, offset, size, halfwrite) in names {
        let mode = InsnMode {
            arg: ArgMode::FlatAtomic,
            flat_mode: FlatMode::Global,
            mem_atomic: true,
            halfwrite,
            dsize: size,
            ..M
        };
        out.push(InsnDesc::new(
            format!("global_atomic_{}", name),
            Encoding::Flat,
            mode,
            64 + offset,
            G14,
        ));
        out.push(InsnDesc::new(
            format!("global_atomic_{}_x2", name),
            Encoding::Flat,
            InsnMode { dsize: size * 2, ..mode },
            96 + offset,
            G14,
        ));
    }
}

fn raw_table() -> Vec<InsnDesc> {
    let mut out = Vec::with_capacity(2048);
    sop2_entries(&mut out);
    sop1_entries(&mut out);
    sopc_entries(&mut out);
    sopp_entries(&mut out);
    sopk_entries(&mut out);
    smrd_entries(&mut out);
    vop2_entries(&mut out);
    vop1_entries(&mut out);
    vopc_entries(&mut out);
    vop3_entries(&mut out);
    vintrp_entries(&mut out);
    ds_entries(&mut out);
    mubuf_entries(&mut out);
    mtbuf_entries(&mut out);
    mimg_entries(&mut out);
    exp_entries(&mut out);
    flat_entries(&mut out);
    out
}

fn table_order(a: &InsnDesc, b: &InsnDesc) -> Ordering {
    a.mnemonic
        .cmp(&b.mnemonic)
        .then(a.encoding.cmp(&b.encoding))
        .then(a.arch.bits().cmp(&b.arch.bits()))
}

/// Sort and merge the raw table: VOP3 twins collapse into the short-form
/// entry's secondary opcode; GCN 1.2+ VINTRP opcodes collapse into their
/// VOP3 entry.
fn merge_table(mut raw: Vec<InsnDesc>) -> Vec<InsnDesc> {
    raw.sort_by(table_order);
    let mut out: Vec<InsnDesc> = Vec::with_capacity(raw.len());
    for insn in raw {
        match insn.encoding {
            Encoding::Vop3A | Encoding::Vop3B => {
                // find a short-form duplicate covering this arch bucket
                let found = out
                    .iter_mut()
                    .rev()
                    .take_while(|prev| prev.mnemonic == insn.mnemonic)
                    .find(|prev| {
                        prev.arch.contains(insn.arch)
                            && matches!(
                                prev.encoding,
                                Encoding::Vop1 | Encoding::Vop2 | Encoding::Vopc
                            )
                    });
                match found {
                    Some(prev) if prev.code2 == SECONDARY_NONE => {
                        prev.code2 = insn.code;
                        prev.arch &= insn.arch;
                    }
                    Some(prev) => {
                        let mut extra = prev.clone();
                        extra.arch &= insn.arch;
                        extra.code2 = insn.code;
                        out.push(extra);
                    }
                    None => out.push(insn),
                }
            }
            Encoding::Vintrp => {
                // attach the plain opcode to an already-emitted VOP3 twin
                let twin = out
                    .iter_mut()
                    .rev()
                    .take_while(|prev| prev.mnemonic == insn.mnemonic)
                    .find(|prev| prev.encoding == Encoding::Vop3A && prev.mode.vintrp_vop3);
                if let Some(twin) = twin {
                    twin.code2 = insn.code;
                    // the plain entry still serves pre-GCN1.2 encodings
                    let mut plain = insn.clone();
                    plain.arch &= !twin.arch;
                    if !plain.arch.is_empty() {
                        out.push(plain);
                    }
                } else {
                    out.push(insn);
                }
            }
            _ => out.push(insn),
        }
    }
    out.sort_by(table_order);
    out
}

static MERGED_TABLE: OnceLock<Vec<InsnDesc>> = OnceLock::new();

/// The merged, sorted descriptor table. Built once, immutable afterwards.
pub fn instruction_table() -> &'static [InsnDesc] {
    MERGED_TABLE.get_or_init(|| {
        let merged = merge_table(raw_table());
        debug!("GCN instruction table built: {} descriptors", merged.len());
        merged
    })
}

/// Find the descriptor for a mnemonic on the given architecture.
pub fn lookup(mnemonic: &str, arch: Arch) -> Option<&'static InsnDesc> {
    let table = instruction_table();
    let first = table.partition_point(|d| d.mnemonic.as_str() < mnemonic);
    table[first..]
        .iter()
        .take_while(|d| d.mnemonic == mnemonic)
        .find(|d| d.arch.contains(arch.mask()))
}

/// True when the mnemonic exists for any architecture.
pub fn known_mnemonic(mnemonic: &str) -> bool {
    let table = instruction_table();
    let first = table.partition_point(|d| d.mnemonic.as_str() < mnemonic);
    table.get(first).map(|d| d.mnemonic == mnemonic).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_mnemonic() {
        let table = instruction_table();
        for pair in table.windows(2) {
            assert!(table_order(&pair[0], &pair[1]) != Ordering::Greater);
        }
    }

    #[test]
    fn vop2_carries_vop3_secondary() {
        let desc = lookup("v_add_f32", Arch::Gcn10).unwrap();
        assert_eq!(desc.encoding, Encoding::Vop2);
        assert_eq!(desc.code, 3);
        assert_eq!(desc.code2, 0x103);
        let desc = lookup("v_add_f32", Arch::Gcn12).unwrap();
        assert_eq!(desc.code, 1);
        assert_eq!(desc.code2, 0x101);
    }

    #[test]
    fn vop1_merges_per_arch() {
        let desc = lookup("v_mov_b32", Arch::Gcn10).unwrap();
        assert_eq!(desc.encoding, Encoding::Vop1);
        assert_eq!(desc.code, 1);
        assert_eq!(desc.code2, 0x181);
        let desc = lookup("v_mov_b32", Arch::Gcn14).unwrap();
        assert_eq!(desc.code2, 0x141);
    }

    #[test]
    fn vopc_secondary_equals_primary() {
        let desc = lookup("v_cmpx_lg_f64", Arch::Gcn10).unwrap();
        assert_eq!(desc.encoding, Encoding::Vopc);
        assert_eq!(desc.code, 0x35);
        assert_eq!(desc.code2, 0x35);
        assert!(desc.mode.src0_64 && desc.mode.src1_64);
    }

    #[test]
    fn vintrp_merge_per_arch() {
        // plain VINTRP encoding survives for GCN 1.0/1.1
        let si = lookup("v_interp_p1_f32", Arch::Gcn10).unwrap();
        assert_eq!(si.encoding, Encoding::Vintrp);
        assert_eq!(si.code, 0);
        // GCN 1.2+ resolves to the merged VOP3 entry carrying both opcodes
        let vi = lookup("v_interp_p1_f32", Arch::Gcn12).unwrap();
        assert_eq!(vi.encoding, Encoding::Vop3A);
        assert!(vi.mode.vintrp_vop3);
        assert_eq!(vi.code, 0x270);
        assert_eq!(vi.code2, 0);
    }

    #[test]
    fn arch_masked_lookup() {
        assert!(lookup("s_call_b64", Arch::Gcn12).is_none());
        let desc = lookup("s_call_b64", Arch::Gcn14).unwrap();
        assert_eq!(desc.code, 21);
        assert_eq!(desc.flow, Some(CodeFlowKind::Call));
        assert!(lookup("flat_load_dword", Arch::Gcn10).is_none());
        assert!(lookup("flat_load_dword", Arch::Gcn11).is_some());
    }

    #[test]
    fn sopk_branch_fork_flow() {
        let desc = lookup("s_cbranch_i_fork", Arch::Gcn10).unwrap();
        assert_eq!(desc.code, 17);
        assert_eq!(desc.flow, Some(CodeFlowKind::CJump));
        let desc = lookup("s_cbranch_i_fork", Arch::Gcn12).unwrap();
        assert_eq!(desc.code, 16);
    }

    #[test]
    fn branch_flow_is_table_property() {
        assert_eq!(
            lookup("s_branch", Arch::Gcn10).unwrap().flow,
            Some(CodeFlowKind::Jump)
        );
        assert_eq!(
            lookup("s_cbranch_scc1", Arch::Gcn10).unwrap().flow,
            Some(CodeFlowKind::CJump)
        );
        assert_eq!(
            lookup("s_endpgm", Arch::Gcn10).unwrap().flow,
            Some(CodeFlowKind::End)
        );
        assert_eq!(
            lookup("s_endpgm_saved", Arch::Gcn12).unwrap().flow,
            Some(CodeFlowKind::End)
        );
    }

    #[test]
    fn ds_read2_b32_code() {
        let desc = lookup("ds_read2_b32", Arch::Gcn10).unwrap();
        assert_eq!(desc.code, 55);
        assert!(desc.mode.two_offsets);
        assert!(desc.mode.mem_load);
    }

    #[test]
    fn smrd_vs_smem_codes() {
        let si = lookup("s_load_dwordx2", Arch::Gcn10).unwrap();
        assert_eq!(si.code, 1);
        assert_eq!(si.mode.dsize, 1);
        let vega = lookup("s_store_dword", Arch::Gcn14).unwrap();
        assert_eq!(vega.code, 16);
        assert!(lookup("s_store_dword", Arch::Gcn10).is_none());
    }

    #[test]
    fn unknown_mnemonic() {
        assert!(lookup("v_teleport_b32", Arch::Gcn10).is_none());
        assert!(!known_mnemonic("v_teleport_b32"));
        assert!(known_mnemonic("v_add_f32"));
    }
}
