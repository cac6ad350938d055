// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use super::GcnDisasm;
use crate::assembler::{AsmOptions, Assembler};
use crate::gcn::arch::Arch;

fn bytes_of(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn disassemble(arch: Arch, words: &[u32]) -> String {
    GcnDisasm::new(arch, false)
        .disassemble(&bytes_of(words))
        .expect("disassembly")
}

fn disassemble_fl(arch: Arch, words: &[u32]) -> String {
    GcnDisasm::new(arch, true)
        .disassemble(&bytes_of(words))
        .expect("disassembly")
}

fn assemble(arch: Arch, text: &str) -> Vec<u32> {
    let mut asm = Assembler::new(AsmOptions {
        arch,
        ..AsmOptions::default()
    });
    asm.assemble_source("rt.s", text);
    assert!(
        !asm.reporter.has_errors(),
        "errors for {:?}: {:?}",
        text,
        asm.reporter
            .diagnostics()
            .iter()
            .map(|d| d.format())
            .collect::<Vec<_>>()
    );
    asm.code()
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn ds_and_branch_with_interior_label() {
    let text = disassemble(Arch::Gcn10, &[0xd8dc2625, 0x37000006, 0xbf82fffe]);
    assert_eq!(
        text,
        "        ds_read2_b32    v[55:56], v6 offset0:37 offset1:38\n\
         .offset .-4\n\
         .L1:\n\
         .offset .+4\n\
         \x20       s_branch        .L1\n"
    );
}

#[test]
fn unfinished_instruction_at_end() {
    let text = disassemble_fl(Arch::Gcn10, &[0x7c6b92ff]);
    assert_eq!(
        text,
        "        /* WARNING: Unfinished instruction at end! */\n\
         \x20       v_cmpx_lg_f64   vcc, 0x0, v[201:202]\n"
    );
}

#[test]
fn trailing_labels_use_org() {
    let text = disassemble(Arch::Gcn10, &[0xbf820243, 0xbf820106, 0xbf820105]);
    assert_eq!(
        text,
        "        s_branch        .L580\n\
         \x20       s_branch        .L264\n\
         \x20       s_branch        .L264\n\
         .org 0x420\n\
         .L264:\n\
         .org 0x910\n\
         .L580:\n"
    );
}

#[test]
fn named_label_resynchronises_decoding() {
    let mut disasm = GcnDisasm::new(Arch::Gcn10, false);
    disasm.add_named_label(8, "MyKernel0");
    let text = disasm
        .disassemble(&bytes_of(&[0x90153d04, 0x0934d6ff, 0x11110000, 0x90153d02]))
        .unwrap();
    assert_eq!(
        text,
        "        s_lshr_b32      s21, s4, s61\n\
         \x20       v_sub_f32       v154, 0x11110000, v107\n\
         .offset .-4\n\
         \n\
         MyKernel0:\n\
         \x20       v_mul_f32       v136, s0, v128\n\
         \x20       s_lshr_b32      s21, s2, s61\n"
    );
}

#[test]
fn float_literal_comment() {
    // v_add_f32 v5, <literal 2.5>, v11
    let words = assemble(Arch::Gcn10, "v_add_f32 v5, 2.5, v11");
    let text = disassemble_fl(Arch::Gcn10, &words);
    assert!(text.contains("0x40200000 /* 2.5f */"), "got: {}", text);
    // without the flag only the hexadecimal form appears
    let text = disassemble(Arch::Gcn10, &words);
    assert!(text.contains("0x40200000"), "got: {}", text);
    assert!(!text.contains("/*"), "got: {}", text);
}

#[test]
fn misaligned_input_is_rejected() {
    let err = GcnDisasm::new(Arch::Gcn10, false)
        .disassemble(&[0u8; 5])
        .unwrap_err();
    assert!(err.contains("aligned"));
}

#[test]
fn waitcnt_and_sendmsg_render() {
    let words = assemble(Arch::Gcn10, "s_waitcnt vmcnt(0) & lgkmcnt(0)");
    let text = disassemble(Arch::Gcn10, &words);
    assert!(text.contains("vmcnt(0) & lgkmcnt(0)"), "got: {}", text);
    let words = assemble(Arch::Gcn10, "s_sendmsg sendmsg(gs, cut, 1)");
    let text = disassemble(Arch::Gcn10, &words);
    assert!(text.contains("sendmsg(gs, cut, 1)"), "got: {}", text);
}

#[test]
fn waitcnt_residue_disambiguator() {
    // stray bits outside the three counters are appended in hex
    let text = disassemble(Arch::Gcn10, &[0xbf8c8070]);
    assert!(text.contains(":0x8070"), "got: {}", text);
}

#[test]
fn sopk_hwreg_renders() {
    let words = assemble(Arch::Gcn10, "s_getreg_b32 s1, hwreg(trapsts, 3, 7)");
    let text = disassemble(Arch::Gcn10, &words);
    assert!(text.contains("hwreg(trapsts, 3, 7)"), "got: {}", text);
}

#[test]
fn sop2_jump_residue() {
    // s_cbranch_g_fork with a non-zero unused SDST field
    let words = vec![0x80000000 | (43u32 << 23) | 4 | (6 << 8) | (9 << 16)];
    let text = disassemble(Arch::Gcn10, &words);
    assert!(
        text.contains("s_cbranch_g_fork") && text.contains("sdst=0x9"),
        "got: {}",
        text
    );
}

#[test]
fn vop3_marker_preserves_long_encoding() {
    let words = assemble(Arch::Gcn10, "v_add_f32_e64 v5, v6, v11");
    let text = disassemble(Arch::Gcn10, &words);
    assert!(text.contains("v_add_f32") && text.contains(" vop3"), "got: {}", text);
    // round trip back through the assembler
    assert_eq!(assemble(Arch::Gcn10, &text), words);
}

#[test]
fn instruction_size_scanner() {
    use super::instruction_size;
    let words = [0x800001ff, 0x12345678, 0xbf800000];
    assert_eq!(instruction_size(Arch::Gcn10, &words, 0), 8);
    assert_eq!(instruction_size(Arch::Gcn10, &words, 2), 4);
}

fn round_trip(arch: Arch, text: &str) {
    let words = assemble(arch, text);
    let disassembled = disassemble(arch, &words);
    let again = assemble(arch, &disassembled);
    assert_eq!(words, again, "round trip failed for {:?}:\n{}", text, disassembled);
}

#[test]
fn round_trip_scalar() {
    round_trip(Arch::Gcn10, "s_add_u32 s0, 5, s1");
    round_trip(Arch::Gcn10, "s_add_u32 s0, 0x12345678, s1");
    round_trip(Arch::Gcn10, "s_mov_b64 s[2:3], vcc");
    round_trip(Arch::Gcn10, "s_movk_i32 s5, 0x1234");
    round_trip(Arch::Gcn10, "s_cmp_eq_i32 s4, s5");
    round_trip(Arch::Gcn10, "s_getreg_b32 s1, hwreg(mode, 0, 32)");
    round_trip(Arch::Gcn10, "s_waitcnt vmcnt(3) & expcnt(2) & lgkmcnt(1)");
    round_trip(Arch::Gcn10, "top:\ns_nop 0\ns_branch top");
    round_trip(Arch::Gcn10, "s_branch fwd\ns_nop 0\nfwd:\ns_endpgm");
}

#[test]
fn round_trip_scalar_memory() {
    round_trip(Arch::Gcn10, "s_load_dword s4, s[2:3], 0x1");
    round_trip(Arch::Gcn10, "s_buffer_load_dwordx4 s[8:11], s[0:3], s5");
    round_trip(Arch::Gcn14, "s_load_dwordx2 s[4:5], s[10:11], 0x12345");
    round_trip(Arch::Gcn12, "s_store_dword s0, s[4:5], m0 glc");
}

#[test]
fn round_trip_vector() {
    round_trip(Arch::Gcn10, "v_mov_b32 v0, v1");
    round_trip(Arch::Gcn10, "v_add_f32 v5, v6, v11");
    round_trip(Arch::Gcn10, "v_add_f32 v5, s10, v11");
    round_trip(Arch::Gcn10, "v_add_f32 v5, s10, v11 mul:2");
    round_trip(Arch::Gcn10, "v_add_f32 v5, 1.0, v11");
    round_trip(Arch::Gcn10, "v_madmk_f32 v1, v2, 1.5, v3");
    round_trip(Arch::Gcn10, "v_add_i32 v1, vcc, v2, v3");
    round_trip(Arch::Gcn10, "v_addc_u32 v1, vcc, v2, v3, vcc");
    round_trip(Arch::Gcn10, "v_cmp_lt_f32 vcc, v1, v2");
    round_trip(Arch::Gcn10, "v_cmp_lt_f32 s[0:1], v1, v2");
    round_trip(Arch::Gcn10, "v_mad_f32 v1, -v2, abs(v3), v4 clamp");
    round_trip(Arch::Gcn10, "v_interp_p1_f32 v0, v1, attr0.x");
    round_trip(Arch::Gcn12, "v_interp_p1_f32 v0, v1, attr0.x");
    round_trip(Arch::Gcn12, "v_add_f32 v0, v1, v2 src0_sel:byte0");
    round_trip(Arch::Gcn12, "v_mov_b32 v0, v1 quad_perm:[3,2,1,0] bank_mask:3");
}

#[test]
fn round_trip_memory() {
    round_trip(Arch::Gcn10, "ds_read2_b32 v[55:56], v6 offset0:37 offset1:38");
    round_trip(Arch::Gcn10, "ds_write_b32 v1, v2 offset:16");
    round_trip(Arch::Gcn10, "ds_add_rtn_u32 v5, v1, v2 gds");
    round_trip(Arch::Gcn10, "buffer_load_dword v4, off, s[8:11], s3");
    round_trip(
        Arch::Gcn10,
        "buffer_load_dword v4, v1, s[8:11], s3 offen offset:100 glc",
    );
    round_trip(
        Arch::Gcn10,
        "tbuffer_load_format_x v[61:62], v[18:19], s[80:83], s35 \
         offen idxen offset:2004 glc slc addr64 tfe format:[8,sint]",
    );
    round_trip(Arch::Gcn10, "image_load v[0:3], v4, s[8:15] dmask:15 unorm");
    round_trip(Arch::Gcn11, "flat_load_dword v1, v[2:3]");
    round_trip(Arch::Gcn12, "flat_store_dword v[2:3], v4 glc slc");
    round_trip(Arch::Gcn14, "global_load_dword v1, v[2:3], off");
    round_trip(Arch::Gcn10, "exp mrt0, v0, v1, v2, v3 done vm");
}

#[test]
fn label_prepass_matches_code_flow_targets() {
    // every JUMP/CJUMP/CALL target from assembly appears as a label
    let text = "a:\ns_nop 0\ns_branch a\ns_cbranch_scc0 b\ns_nop 0\nb:\ns_endpgm";
    let mut asm = Assembler::new(AsmOptions {
        arch: Arch::Gcn10,
        ..AsmOptions::default()
    });
    asm.assemble_source("flow.s", text);
    assert!(!asm.reporter.has_errors());
    let words: Vec<u32> = asm
        .code()
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let rendered = disassemble(Arch::Gcn10, &words);
    use crate::core::section::CodeFlowKind;
    for entry in asm.code_flow() {
        if matches!(
            entry.kind,
            CodeFlowKind::Jump | CodeFlowKind::CJump | CodeFlowKind::Call
        ) {
            let label = format!(".L{}:", entry.target / 4);
            assert!(
                rendered.contains(&label),
                "missing {} in:\n{}",
                label,
                rendered
            );
        }
    }
}
