// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use super::{AsmOptions, Assembler};
use crate::core::section::CodeFlowKind;
use crate::gcn::arch::Arch;
use crate::gcn::usage::{RegField, RwFlags};

fn assemble_arch(arch: Arch, text: &str) -> Assembler {
    let mut asm = Assembler::new(AsmOptions {
        arch,
        ..AsmOptions::default()
    });
    asm.assemble_source("test.s", text);
    asm
}

fn words(asm: &Assembler) -> Vec<u32> {
    asm.code()
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn assemble_ok(arch: Arch, text: &str) -> Vec<u32> {
    let asm = assemble_arch(arch, text);
    let messages: Vec<String> = asm
        .reporter
        .diagnostics()
        .iter()
        .map(|d| d.format())
        .collect();
    assert!(
        !asm.reporter.has_errors(),
        "unexpected errors for {:?}: {:?}",
        text,
        messages
    );
    words(&asm)
}

fn assemble_err(arch: Arch, text: &str, needle: &str) {
    let asm = assemble_arch(arch, text);
    assert!(asm.reporter.has_errors(), "expected an error for {:?}", text);
    assert!(
        asm.reporter
            .diagnostics()
            .iter()
            .any(|d| d.message.contains(needle)),
        "no diagnostic containing {:?} for {:?}; got {:?}",
        needle,
        text,
        asm.reporter
            .diagnostics()
            .iter()
            .map(|d| d.message.clone())
            .collect::<Vec<_>>()
    );
}

// --- scalar ALU ---

#[test]
fn sop1_mov() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_mov_b32 s0, s1"),
        vec![0xbe800301]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn12, "s_mov_b32 s0, s1"),
        vec![0xbe800001]
    );
}

#[test]
fn sop1_mov_b64_and_specials() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_mov_b64 s[2:3], vcc"),
        vec![0xbe82046a]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_getpc_b64 s[4:5]"),
        vec![0xbe841f00]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_setpc_b64 s[4:5]"),
        vec![0xbe802004]
    );
}

#[test]
fn sop2_with_inline_constants() {
    // s_add_u32 s0, 5, s1
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_add_u32 s0, 5, s1"),
        vec![0x80000185]
    );
    // -6 encodes as inline constant 198
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_add_u32 s0, -6, s1"),
        vec![0x800001c6]
    );
}

#[test]
fn sop2_literal_promotion() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_add_u32 s0, 0x12345678, s1"),
        vec![0x800001ff, 0x12345678]
    );
}

#[test]
fn sop2_forced_e64_promotes_inline_constant() {
    // with _e64 the inline constant 5 moves to the literal slot
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_add_u32_e64 s0, 5, s1"),
        vec![0x800001ff, 5]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_add_u32_e64 s0, 1.0, s1"),
        vec![0x800001ff, 0x3f800000]
    );
}

#[test]
fn sop2_forward_symbol_attaches_literal_relocation() {
    let code = assemble_ok(Arch::Gcn10, "s_add_u32 s0, later, s1\nlater = 0x12345678");
    assert_eq!(code, vec![0x800001ff, 0x12345678]);
}

#[test]
fn sop2_unresolved_symbol_reports_each_occurrence() {
    let asm = assemble_arch(Arch::Gcn10, "s_add_u32 s0, ghost, s1\ns_add_u32 s0, ghost, s1");
    let count = asm
        .reporter
        .diagnostics()
        .iter()
        .filter(|d| d.message.contains("Undefined symbol 'ghost'"))
        .count();
    assert_eq!(count, 2);
}

#[test]
fn sopc_compare_and_imm8() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_cmp_eq_i32 s4, s5"),
        vec![0xbf000504]
    );
    // s_set_gpr_idx_on s0, 3 (GCN 1.2)
    assert_eq!(
        assemble_ok(Arch::Gcn12, "s_set_gpr_idx_on s0, 3"),
        vec![0xbf110300]
    );
}

#[test]
fn sopk_movk_and_cmpk() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_movk_i32 s5, 0x1234"),
        vec![0xb0051234]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn12, "s_movk_i32 s5, 0x1234"),
        vec![0xb0051234]
    );
}

#[test]
fn sopk_setreg_imm32() {
    // s_setreg_imm32_b32 hwreg(mode, 0, 6), 0x55
    let code = assemble_ok(Arch::Gcn10, "s_setreg_imm32_b32 hwreg(mode, 0, 6), 0x55");
    assert_eq!(code.len(), 2);
    // imm16 = 1 | (6-1)<<11
    assert_eq!(code[0], 0xb0000000 | 0x2801 | (21 << 23));
    assert_eq!(code[1], 0x55);
}

#[test]
fn sopk_getreg_hwreg() {
    // s_getreg_b32 s1, hwreg(trapsts, 0, 32): id 3, size-1 = 31
    let imm16 = 3 | (31 << 11);
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_getreg_b32 s1, hwreg(trapsts, 0, 32)"),
        vec![0xb0000000 | imm16 | (1 << 16) | (18 << 23)]
    );
}

#[test]
fn sopp_endpgm_and_flow() {
    let asm = assemble_arch(Arch::Gcn10, "s_endpgm");
    assert_eq!(words(&asm), vec![0xbf810000]);
    let flow = asm.code_flow();
    assert_eq!(flow.len(), 1);
    assert_eq!(flow[0].kind, CodeFlowKind::End);
    assert_eq!(flow[0].offset, 4);
}

#[test]
fn sopp_branch_backward() {
    let asm = assemble_arch(Arch::Gcn10, "top:\ns_nop 0\ns_branch top");
    assert_eq!(words(&asm), vec![0xbf800000, 0xbf82fffe]);
    let flow = asm.code_flow();
    assert_eq!(flow.len(), 1);
    assert_eq!((flow[0].offset, flow[0].target), (4, 0));
    assert_eq!(flow[0].kind, CodeFlowKind::Jump);
}

#[test]
fn sopp_branch_forward_patches() {
    let asm = assemble_arch(Arch::Gcn10, "s_branch fwd\ns_nop 0\nfwd:\ns_endpgm");
    let code = words(&asm);
    assert!(!asm.reporter.has_errors());
    assert_eq!(code[0], 0xbf820001);
    let flow = asm.code_flow();
    assert!(flow
        .iter()
        .any(|e| e.offset == 0 && e.target == 8 && e.kind == CodeFlowKind::Jump));
}

#[test]
fn sopk_cbranch_i_fork_flow() {
    // target at PC+8 gives imm16 = +1
    let asm = assemble_arch(
        Arch::Gcn10,
        "s_cbranch_i_fork s[4:5], target\ns_nop 0\ntarget:\ns_endpgm",
    );
    assert!(!asm.reporter.has_errors());
    let code = words(&asm);
    assert_eq!(code[0], 0xb0000000 | 1 | (4 << 16) | (17 << 23));
    assert!(asm
        .code_flow()
        .iter()
        .any(|e| e.offset == 0 && e.target == 8 && e.kind == CodeFlowKind::CJump));
}

#[test]
fn vega_call_is_table_driven() {
    let asm = assemble_arch(Arch::Gcn14, "fn:\ns_nop 0\ns_call_b64 s[10:11], fn");
    assert!(!asm.reporter.has_errors());
    let code = words(&asm);
    assert_eq!(code[1], 0xb0000000 | 0xfffe | (10 << 16) | (21 << 23));
    assert!(asm
        .code_flow()
        .iter()
        .any(|e| e.offset == 4 && e.target == 0 && e.kind == CodeFlowKind::Call));
}

#[test]
fn jump_misaligned_target_fails() {
    assemble_err(
        Arch::Gcn10,
        ".byte 1\nodd:\n.offset 4\ns_branch odd",
        "aligned",
    );
}

#[test]
fn jump_out_of_range_fails() {
    assemble_err(Arch::Gcn10, "s_branch .+0x40000", "out of range");
}

#[test]
fn waitcnt_packs_counters() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_waitcnt vmcnt(0) & lgkmcnt(0)"),
        vec![0xbf8c0070]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_waitcnt expcnt(2)"),
        vec![0xbf8c0f2f]
    );
    // order independence
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_waitcnt lgkmcnt(0) & vmcnt(0)"),
        vec![0xbf8c0070]
    );
}

#[test]
fn waitcnt_vega_vmcnt_split() {
    // vmcnt(35) = 0b100011: low 4 bits at [3:0], high 2 at [15:14]
    let code = assemble_ok(Arch::Gcn14, "s_waitcnt vmcnt(35)");
    let imm16 = (0xcf7fu32 & 0x3ff0) | 3 | ((35 & 0x30) << 10);
    assert_eq!(code, vec![0xbf8c0000 | imm16]);
}

#[test]
fn sendmsg_forms() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_sendmsg sendmsg(interrupt)"),
        vec![0xbf900001]
    );
    // gs with cut on stream 1: 2 | 1<<4 | 1<<8
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_sendmsg sendmsg(gs, cut, 1)"),
        vec![0xbf900112]
    );
    assemble_err(Arch::Gcn10, "s_sendmsg sendmsg(halt_waves)", "Unknown message");
    assert_eq!(
        assemble_ok(Arch::Gcn14, "s_sendmsg sendmsg(halt_waves)"),
        vec![0xbf900006]
    );
}

// --- scalar memory ---

#[test]
fn smrd_load() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_load_dword s4, s[2:3], 0x1"),
        vec![0xc0020301]
    );
    // SGPR offset
    assert_eq!(
        assemble_ok(Arch::Gcn10, "s_load_dwordx2 s[4:5], s[2:3], s8"),
        vec![0xc0420208]
    );
}

#[test]
fn smrd_rejects_64bit_suffix() {
    assemble_err(Arch::Gcn10, "s_load_dword_e64 s4, s[2:3], 0x1", "32-bit");
}

#[test]
fn smem_vega_offset21() {
    let code = assemble_ok(Arch::Gcn14, "s_load_dwordx2 s[4:5], s[10:11], 0x12345");
    assert_eq!(code, vec![0xc0060105, 0x12345]);
}

#[test]
fn smem_illegal_second_offset() {
    assemble_err(
        Arch::Gcn14,
        "s_load_dwordx2 s[4:5], s[10:11], 0x12345 offset:0",
        "Illegal second offset",
    );
}

#[test]
fn smem_store_needs_m0_before_vega() {
    assemble_err(
        Arch::Gcn12,
        "s_store_dword s0, s[4:5], s8",
        "only M0 register",
    );
    let code = assemble_ok(Arch::Gcn12, "s_store_dword s0, s[4:5], m0");
    assert_eq!(code[0] >> 26, 0x30);
}

#[test]
fn smem_forward_offset_patches_vega() {
    let code = assemble_ok(
        Arch::Gcn14,
        "s_load_dword s4, s[10:11], later\nlater = 0x1ffff",
    );
    assert_eq!(code[1], 0x1ffff);
}

// --- vector ALU ---

#[test]
fn vop1_mov() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_mov_b32 v0, v1"),
        vec![0x7e000301]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_mov_b32 v0, s1"),
        vec![0x7e000201]
    );
}

#[test]
fn vop2_plain_stays_short() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_f32 v5, v6, v11"),
        vec![0x060a1706]
    );
    // SGPR in SRC0 is legal in the short form
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_f32 v5, s10, v11"),
        vec![0x060a160a]
    );
}

#[test]
fn vop2_omod_promotes_to_vop3() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_f32 v5, s10, v11 mul:2"),
        vec![0xd2060005, 0x0802160a]
    );
}

#[test]
fn vop2_sgpr_src1_promotes() {
    // SGPR in SRC1 has no slot in the short encoding
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_f32 v5, v6, s11"),
        vec![0xd2060005, 0x00001706]
    );
}

#[test]
fn vop2_forced_e64() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_f32_e64 v5, v6, v11"),
        vec![0xd2060005, 0x00021706]
    );
}

#[test]
fn vop2_float_inline_constant() {
    // 1.0 is inline constant 242
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_f32 v5, 1.0, v11"),
        vec![0x060a1600 | 242]
    );
    // 1/(2*PI) is inline only on GCN 1.2+
    assert_eq!(
        assemble_ok(Arch::Gcn12, "v_add_f32 v5, 0.15915494, v11"),
        vec![0x020a1600 | 248]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_f32 v5, 0.15915494, v11"),
        vec![0x060a16ff, 0x3e22f983]
    );
}

#[test]
fn vop2_madmk_has_mandatory_literal() {
    // v_madmk_f32 v1, v2, 1.5, v3
    let code = assemble_ok(Arch::Gcn10, "v_madmk_f32 v1, v2, 1.5, v3");
    assert_eq!(code, vec![(32 << 25) | 0x102 | (3 << 9) | (1 << 17), 0x3fc00000]);
}

#[test]
fn vop2_carry_forms() {
    // v_add_i32 v1, vcc, v2, v3
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_add_i32 v1, vcc, v2, v3"),
        vec![(37 << 25) | 0x102 | (3 << 9) | (1 << 17)]
    );
    // a non-VCC carry-out needs VOP3B
    let code = assemble_ok(Arch::Gcn10, "v_add_i32 v1, s[4:5], v2, v3");
    assert_eq!(code.len(), 2);
    assert_eq!(code[0], 0xd0000000 | (0x125 << 17) | 1 | (4 << 8));
    assert_eq!(code[1], 0x102 | (0x103 << 9));
}

#[test]
fn vop2_literal_with_sgpr_is_illegal() {
    assemble_err(
        Arch::Gcn10,
        "v_add_f32 v5, 0x12345678, s11",
        "Literal with SGPR or M0 is illegal",
    );
}

#[test]
fn vop_two_sgpr_reads_rejected() {
    assemble_err(
        Arch::Gcn10,
        "v_add_f32_e64 v5, s10, s11",
        "More than one SGPR to read",
    );
    // the same SGPR twice is fine
    assemble_ok(Arch::Gcn10, "v_add_f32_e64 v5, s10, s10");
}

#[test]
fn vopc_compare() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_cmp_lt_f32 vcc, v1, v2"),
        vec![0x7c020501]
    );
    // non-VCC destination promotes to VOP3
    let code = assemble_ok(Arch::Gcn10, "v_cmp_lt_f32 s[0:1], v1, v2");
    assert_eq!(code[0], 0xd0000000 | (0x01 << 17));
    assert_eq!(code[1], 0x101 | (0x102 << 9));
}

#[test]
fn vop1_sdwa_word() {
    let code = assemble_ok(Arch::Gcn12, "v_mov_b32_sdwa v0, v1 src0_sel:byte0");
    assert_eq!(code, vec![0x7e0002f9, 0x06000601]);
}

#[test]
fn vop2_sdwa_and_dpp() {
    let code = assemble_ok(Arch::Gcn12, "v_add_f32_sdwa v0, v1, v2 src0_sel:byte0");
    assert_eq!(code[0], (1 << 25) | 0xf9 | (2 << 9));
    assert_eq!(code[1], 0x06000601);
    let code = assemble_ok(Arch::Gcn12, "v_mov_b32_dpp v0, v1 quad_perm:[0,1,2,3]");
    assert_eq!(code, vec![0x7e0002fa, 0xff00e401]);
}

#[test]
fn sdwa_rejected_before_gcn12() {
    assemble_err(Arch::Gcn10, "v_add_f32_sdwa v0, v1, v2", "GCN 1.2");
}

#[test]
fn literal_with_dpp_is_illegal() {
    assemble_err(
        Arch::Gcn12,
        "v_add_f32_dpp v0, 0x12345678, v2",
        "Literal with SDWA or DPP",
    );
}

#[test]
fn sext_forces_sdwa() {
    let code = assemble_ok(Arch::Gcn12, "v_add_f32 v0, sext(v1), v2");
    assert_eq!(code[0] & 0x1ff, 0xf9);
    assert_ne!(code[1] & (1 << 19), 0);
}

#[test]
fn vop3_native_three_sources() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_mad_f32 v1, v2, v3, v4"),
        vec![0xd2820001, 0x04120702]
    );
}

#[test]
fn vop3_modifiers() {
    // v_mad_f32 v1, -v2, abs(v3), v4 clamp
    let code = assemble_ok(Arch::Gcn10, "v_mad_f32 v1, -v2, abs(v3), v4 clamp");
    assert_eq!(code[0], 0xd2820001 | 0x800 | 0x200);
    assert_eq!(code[1], 0x04120702 | (1 << 29));
}

#[test]
fn vop3_literal_is_illegal() {
    assemble_err(
        Arch::Gcn10,
        "v_mad_f32 v1, 0x12345678, v3, v4",
        "Literal in VOP3 encoding is illegal",
    );
}

#[test]
fn vop3b_div_scale() {
    let code = assemble_ok(Arch::Gcn10, "v_div_scale_f32 v1, vcc, v2, v3, v4");
    assert_eq!(code[0], 0xd0000000 | (0x16d << 17) | 1 | (106 << 8));
    assert_eq!(code[1], 0x04120702);
}

#[test]
fn vop3b_abs_is_illegal() {
    assemble_err(
        Arch::Gcn12,
        "v_add_u32 v1, s[2:3], abs(v2), v3",
        "Abs modifier is illegal",
    );
}

#[test]
fn vintrp_plain() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_interp_p1_f32 v0, v1, attr0.x"),
        vec![0xc8000001]
    );
    // attr channel and number
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_interp_p2_f32 v7, v3, attr5.w"),
        vec![0xc8000000 | 3 | (((5 << 2) | 3) << 8) | (1 << 16) | (7 << 18)]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn10, "v_interp_mov_f32 v2, p0, attr1.y"),
        vec![0xc8000000 | 2 | (((1 << 2) | 1) << 8) | (2 << 16) | (2 << 18)]
    );
}

#[test]
fn vintrp_gcn12_uses_new_encoding_word() {
    assert_eq!(
        assemble_ok(Arch::Gcn12, "v_interp_p1_f32 v0, v1, attr0.x"),
        vec![0xd4000001]
    );
}

// --- DS ---

#[test]
fn ds_read2_golden() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "ds_read2_b32 v[55:56], v6 offset0:37 offset1:38"),
        vec![0xd8dc2625, 0x37000006]
    );
}

#[test]
fn ds_write_and_atomic() {
    // ds_write_b32 v1, v2 offset:16
    assert_eq!(
        assemble_ok(Arch::Gcn10, "ds_write_b32 v1, v2 offset:16"),
        vec![0xd8000010 | (13 << 18), 0x00000201]
    );
    // ds_add_rtn_u32 v5, v1, v2
    assert_eq!(
        assemble_ok(Arch::Gcn10, "ds_add_rtn_u32 v5, v1, v2"),
        vec![0xd8000000 | (32 << 18), 0x05000201]
    );
}

#[test]
fn ds_gcn12_opcode_position() {
    assert_eq!(
        assemble_ok(Arch::Gcn12, "ds_read2_b32 v[55:56], v6 offset0:37 offset1:38"),
        vec![0xd8000000 | (55 << 17) | 0x2625, 0x37000006]
    );
}

#[test]
fn ds_gds_required() {
    assemble_err(Arch::Gcn10, "ds_ordered_count v1, v2", "requires GDS");
    assemble_ok(Arch::Gcn10, "ds_ordered_count v1, v2 gds");
}

#[test]
fn ds_halfword_usage_split() {
    let asm = assemble_arch(Arch::Gcn10, "ds_read2_b32 v[55:56], v6 offset0:37 offset1:38");
    let usage = asm.usage_stream();
    assert_eq!(usage.len(), 1);
    let fields: Vec<RegField> = usage[0].records.iter().map(|r| r.field).collect();
    assert_eq!(fields, vec![RegField::DsVdst, RegField::DsAddr]);
}

// --- buffers ---

#[test]
fn mubuf_load_off() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "buffer_load_dword v4, off, s[8:11], s3"),
        vec![0xe0300000, 0x03020400]
    );
}

#[test]
fn mubuf_offen_offset() {
    assert_eq!(
        assemble_ok(
            Arch::Gcn10,
            "buffer_load_dword v4, v1, s[8:11], s3 offen offset:100"
        ),
        vec![0xe0301064, 0x03020401]
    );
}

#[test]
fn mtbuf_full_modifier_set() {
    let code = assemble_ok(
        Arch::Gcn10,
        "tbuffer_load_format_x v[61:62], v[18:19], s[80:83], s35 \
         offen idxen offset:2004 glc slc addr64 tfe format:[8,sint]",
    );
    assert_eq!(code, vec![0xea88f7d4, 0x23d43d12]);
}

#[test]
fn mubuf_lds_and_tfe_conflict() {
    assemble_err(
        Arch::Gcn12,
        "buffer_load_dword v4, off, s[8:11], s3 lds tfe",
        "Both LDS and TFE",
    );
}

#[test]
fn mubuf_wrong_vdata_count() {
    assemble_err(
        Arch::Gcn10,
        "buffer_load_dwordx2 v4, off, s[8:11], s3",
        "Required 2 vector registers",
    );
}

#[test]
fn mubuf_atomic_usage_and_tfe() {
    // cmpswap splits the data range; tfe appends a carry-lane record
    let asm = assemble_arch(
        Arch::Gcn10,
        "buffer_atomic_cmpswap v[4:5], off, s[8:11], s3 glc",
    );
    assert!(!asm.reporter.has_errors());
    let usage = asm.usage_stream();
    let records = &usage[0].records;
    assert_eq!(records[0].field, RegField::MVdata);
    assert_eq!(records[0].rw, RwFlags::READ | RwFlags::WRITE);
    assert_eq!(records[0].range.len(), 1);
    assert!(records
        .iter()
        .any(|r| r.field == RegField::MVdataH && r.rw == RwFlags::READ));
}

// --- MIMG ---

#[test]
fn mimg_load() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "image_load v[0:3], v4, s[8:15] dmask:15 unorm"),
        vec![0xf0001f00, 0x00020004]
    );
}

#[test]
fn mimg_sample_needs_unorm_only_for_stores() {
    assemble_err(
        Arch::Gcn10,
        "image_store v[0:3], v4, s[8:15] dmask:15",
        "Unorm is not set",
    );
}

#[test]
fn mimg_dmask_drives_vdata_count() {
    assemble_err(
        Arch::Gcn10,
        "image_load v[0:1], v4, s[8:15] dmask:15 unorm",
        "Required 4 vector registers",
    );
}

// --- EXP ---

#[test]
fn exp_mrt() {
    assert_eq!(
        assemble_ok(Arch::Gcn10, "exp mrt0, v0, v1, v2, v3 done vm"),
        vec![0xf800180f, 0x03020100]
    );
    // GCN 1.2 moved the encoding value
    assert_eq!(
        assemble_ok(Arch::Gcn12, "exp mrt0, v0, v1, v2, v3 done vm"),
        vec![0xc400180f, 0x03020100]
    );
}

#[test]
fn exp_off_lanes() {
    let code = assemble_ok(Arch::Gcn10, "exp pos0, v0, v1, off, off");
    assert_eq!(code[0] & 0xf, 3);
    assert_eq!((code[0] >> 4) & 0x3f, 12);
}

#[test]
fn exp_compr_vsrc_rule() {
    assemble_err(
        Arch::Gcn10,
        "exp mrt0, v0, v1, v2, v2 compr",
        "VSRC1 must be equal to VSRC0",
    );
    let code = assemble_ok(Arch::Gcn10, "exp mrt0, v0, v0, v2, v2 compr");
    assert_eq!(code[1], 0x0200 | 0);
}

// --- FLAT ---

#[test]
fn flat_load_store() {
    assert_eq!(
        assemble_ok(Arch::Gcn12, "flat_load_dword v1, v[2:3]"),
        vec![0xdc500000, 0x01000002]
    );
    assert_eq!(
        assemble_ok(Arch::Gcn12, "flat_store_dword v[2:3], v4"),
        vec![0xdc700000, 0x00000402]
    );
    // GCN 1.1 uses the old opcode block
    assert_eq!(
        assemble_ok(Arch::Gcn11, "flat_load_dword v1, v[2:3]"),
        vec![0xdc300000, 0x01000002]
    );
}

#[test]
fn flat_unavailable_on_gcn10() {
    assemble_err(Arch::Gcn10, "flat_load_dword v1, v[2:3]", "not supported");
}

#[test]
fn global_vega() {
    assert_eq!(
        assemble_ok(Arch::Gcn14, "global_load_dword v1, v[2:3], off"),
        vec![0xdc508000, 0x017f0002]
    );
    // SADDR form takes a single offset register
    assert_eq!(
        assemble_ok(Arch::Gcn14, "global_load_dword v1, v2, s[4:5]"),
        vec![0xdc508000, 0x01040002]
    );
}

#[test]
fn scratch_requires_single_address() {
    assemble_err(
        Arch::Gcn14,
        "scratch_load_dword v1, v2, s4",
        "Only one of VADDR and SADDR",
    );
    assemble_ok(Arch::Gcn14, "scratch_load_dword v1, off, s4");
}

#[test]
fn flat_inst_offset_vega() {
    let code = assemble_ok(Arch::Gcn14, "flat_load_dword v1, v[2:3] inst_offset:16");
    assert_eq!(code[0] & 0xfff, 16);
    let code = assemble_ok(Arch::Gcn14, "global_load_dword v1, v[2:3], off inst_offset:-16");
    assert_eq!(code[0] & 0x1fff, 0x1ff0);
}

// --- driver, directives, macro layer ---

#[test]
fn labels_and_symbol_arithmetic() {
    let code = assemble_ok(
        Arch::Gcn10,
        "start:\ns_nop 0\nsize = end - start\nend:\ns_movk_i32 s0, size",
    );
    assert_eq!(code[1] & 0xffff, 4);
}

#[test]
fn equ_and_conditionals() {
    let code = assemble_ok(
        Arch::Gcn10,
        ".equ two, 2\n.if two == 2\ns_nop 1\n.else\ns_nop 2\n.endif",
    );
    assert_eq!(code, vec![0xbf800001]);
}

#[test]
fn elseif_chain() {
    let code = assemble_ok(
        Arch::Gcn10,
        ".if 0\ns_nop 0\n.elseif 1\ns_nop 1\n.elseif 1\ns_nop 2\n.else\ns_nop 3\n.endif",
    );
    assert_eq!(code, vec![0xbf800001]);
}

#[test]
fn nested_skipped_conditionals() {
    let code = assemble_ok(
        Arch::Gcn10,
        ".if 0\n.if 1\ns_nop 0\n.endif\ns_nop 1\n.endif\ns_nop 7",
    );
    assert_eq!(code, vec![0xbf800007]);
}

#[test]
fn rept_expands() {
    let code = assemble_ok(Arch::Gcn10, ".rept 3\ns_nop \\+\n.endr");
    assert_eq!(code, vec![0xbf800000, 0xbf800001, 0xbf800002]);
}

#[test]
fn macro_definition_and_call() {
    let code = assemble_ok(
        Arch::Gcn10,
        ".macro pause count=0\ns_nop \\count\n.endm\npause\npause 3",
    );
    assert_eq!(code, vec![0xbf800000, 0xbf800003]);
}

#[test]
fn macro_containing_repeat() {
    let code = assemble_ok(
        Arch::Gcn10,
        ".macro pad count\n.rept \\count\ns_nop 0\n.endr\n.endm\npad 2",
    );
    assert_eq!(code, vec![0xbf800000, 0xbf800000]);
}

#[test]
fn macro_required_argument() {
    assemble_err(
        Arch::Gcn10,
        ".macro need x:req\ns_nop \\x\n.endm\nneed",
        "Required macro argument",
    );
}

#[test]
fn macro_error_carries_substitution_chain() {
    let asm = assemble_arch(
        Arch::Gcn10,
        ".macro bad\ns_unknown_op s0\n.endm\nbad",
    );
    assert!(asm.reporter.has_errors());
    let text = asm.reporter.diagnostics()[0].format();
    assert!(text.contains("In macro substituted from"), "got: {}", text);
}

#[test]
fn data_directives() {
    let asm = assemble_arch(
        Arch::Gcn10,
        ".byte 1, 2\n.short 0x3344\n.int 0x55667788\n.ascii \"ab\"",
    );
    assert!(!asm.reporter.has_errors());
    assert_eq!(
        asm.code(),
        &[1, 2, 0x44, 0x33, 0x88, 0x77, 0x66, 0x55, b'a', b'b']
    );
}

#[test]
fn align_fills_code_with_nops() {
    let asm = assemble_arch(Arch::Gcn10, ".byte 1\n.align 8\ns_endpgm");
    assert!(!asm.reporter.has_errors());
    let code = asm.code();
    assert_eq!(code.len(), 12);
    assert_eq!(&code[..4], &[1, 0, 0, 0]);
    assert_eq!(&code[4..8], &0xbf800000u32.to_le_bytes());
}

#[test]
fn org_fills_forward_and_repositions_backward() {
    let code = assemble_ok(Arch::Gcn10, ".org 8\ns_endpgm");
    assert_eq!(code.len(), 3);
    assert_eq!(code[2], 0xbf810000);
    // a backward move re-positions without truncating, so a label placed
    // there sees the interior offset
    let code = assemble_ok(
        Arch::Gcn10,
        "s_nop 0\ns_nop 1\n.offset .-4\nmid = .\n.offset .+4\ns_movk_i32 s0, mid",
    );
    assert_eq!(code.len(), 3);
    assert_eq!(code[2] & 0xffff, 4);
}

#[test]
fn unknown_directive_and_mnemonic() {
    assemble_err(Arch::Gcn10, ".fancy 1", "Unknown directive");
    assemble_err(Arch::Gcn10, "v_teleport_b32 v0, v1", "Unknown instruction");
    assemble_err(
        Arch::Gcn12,
        "v_mac_legacy_f32 v0, v1, v2",
        "not supported",
    );
}

#[test]
fn arch_directive_switches_tables() {
    let code = assemble_ok(Arch::Gcn10, ".arch gcn1.2\ns_mov_b32 s0, s1");
    assert_eq!(code, vec![0xbe800001]);
}

#[test]
fn garbage_at_end_is_rejected() {
    assemble_err(Arch::Gcn10, "s_mov_b32 s0, s1 junk", "Garbage at end of line");
}

#[test]
fn literal_slot_uniqueness() {
    assemble_err(
        Arch::Gcn10,
        "s_add_u32 s0, 0x11223344, 0x55667788",
        "Only one literal can be used",
    );
    // the same value is still two slots; inline constants remain fine
    assemble_ok(Arch::Gcn10, "s_add_u32 s0, 0x11223344, 7");
}

#[test]
fn sgpr_alignment_enforced() {
    assemble_err(Arch::Gcn10, "s_mov_b64 s[1:2], s[4:5]", "Unaligned");
    assemble_ok(Arch::Gcn10, "s_mov_b64 s[2:3], s[4:5]");
    // VOP operands allow unaligned SGPR pairs
    assemble_ok(Arch::Gcn10, "v_cmp_lt_f32 s[1:2], v1, v2");
}

#[test]
fn label_redefinition_fails() {
    assemble_err(Arch::Gcn10, "a:\na:\n", "already defined");
}

#[test]
fn register_pool_high_water() {
    let asm = assemble_arch(Arch::Gcn10, "v_add_f32 v17, v0, v1\ns_mov_b32 s9, 0\ns_mov_b64 vcc, 0");
    assert!(!asm.reporter.has_errors());
    assert_eq!(asm.pool().vgprs_num, 18);
    assert_eq!(asm.pool().sgprs_num, 10);
    assert!(asm.pool().vcc_used);
}

#[test]
fn usage_stream_for_vop2() {
    let asm = assemble_arch(Arch::Gcn10, "v_add_f32 v5, s10, v11 mul:2");
    let usage = asm.usage_stream();
    assert_eq!(usage.len(), 1);
    let records = &usage[0].records;
    // promotion renames the fields to their VOP3 tags
    assert_eq!(records[0].field, RegField::Vop3Vdst);
    assert_eq!(records[0].rw, RwFlags::WRITE);
    assert_eq!(records[1].field, RegField::Vop3Src0);
    assert_eq!(records[2].field, RegField::Vop3Src1);
}

#[test]
fn regvar_operands_carry_reference() {
    let asm = assemble_arch(
        Arch::Gcn10,
        ".regvar acc:v:1, base:s:2\nv_add_f32 acc, s0, v1",
    );
    assert!(!asm.reporter.has_errors());
    let usage = asm.usage_stream();
    let dst = &usage[0].records[0];
    assert!(dst.range.is_var());
    assert_eq!(dst.range.var.as_ref().unwrap().name, "acc");
}

#[test]
fn relocation_idempotence() {
    // resolving the same value twice must leave identical bytes
    let first = assemble_ok(Arch::Gcn10, "s_add_u32 s0, later, s1\nlater = 0x1000");
    let second = assemble_ok(Arch::Gcn10, "s_add_u32 s0, 0x1000, s1");
    assert_eq!(first, second);
}
