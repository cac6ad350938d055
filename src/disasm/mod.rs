// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The GCN decoder.
//!
//! A pre-pass scans the word stream with the same classifier the main pass
//! uses and collects every branch target so the main pass can print
//! symbolic labels. Formatting follows the assembler's canonical operand
//! spellings so that reassembling the output reproduces the input words.
//!
//! Branch labels are named `L<pc>` with the pc counted in words; label
//! placement works in bytes (`.offset .-N` for a label inside the already
//! printed instruction, `.org <hex>` for labels beyond the code end).

mod fmt;

use std::fmt::Write;

use log::debug;

use crate::gcn::arch::Arch;
use crate::gcn::registry::{self, ArgMode, Encoding, InsnDesc, SECONDARY_NONE};

pub use fmt::format_operand;

/// Decode-space keys: one opcode namespace per word-level encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Space {
    Sop1,
    Sop2,
    Sopc,
    Sopk,
    Sopp,
    Smrd,
    Vop1,
    Vop2,
    Vopc,
    Vop3,
    Vintrp,
    Ds,
    Mubuf,
    Mtbuf,
    Mimg,
    Flat,
}

struct DecodeTable {
    map: std::collections::HashMap<(Space, u16), &'static InsnDesc>,
}

impl DecodeTable {
    fn new(arch: Arch) -> Self {
        let mut map = std::collections::HashMap::new();
        for desc in registry::instruction_table() {
            if !desc.arch.contains(arch.mask()) {
                continue;
            }
            match desc.encoding {
                Encoding::Sop1 => {
                    map.insert((Space::Sop1, desc.code), desc);
                }
                Encoding::Sop2 => {
                    map.insert((Space::Sop2, desc.code), desc);
                }
                Encoding::Sopc => {
                    map.insert((Space::Sopc, desc.code), desc);
                }
                Encoding::Sopk => {
                    map.insert((Space::Sopk, desc.code), desc);
                }
                Encoding::Sopp => {
                    map.insert((Space::Sopp, desc.code), desc);
                }
                Encoding::Smrd => {
                    map.insert((Space::Smrd, desc.code), desc);
                }
                Encoding::Vop1 => {
                    map.insert((Space::Vop1, desc.code), desc);
                    if desc.code2 != SECONDARY_NONE {
                        map.insert((Space::Vop3, desc.code2), desc);
                    }
                }
                Encoding::Vop2 => {
                    map.insert((Space::Vop2, desc.code), desc);
                    if desc.code2 != SECONDARY_NONE {
                        map.insert((Space::Vop3, desc.code2), desc);
                    }
                }
                Encoding::Vopc => {
                    map.insert((Space::Vopc, desc.code), desc);
                    if desc.code2 != SECONDARY_NONE {
                        map.insert((Space::Vop3, desc.code2), desc);
                    }
                }
                Encoding::Vop3A | Encoding::Vop3B => {
                    map.insert((Space::Vop3, desc.code), desc);
                    if desc.mode.vintrp_vop3 && desc.code2 != SECONDARY_NONE {
                        map.insert((Space::Vintrp, desc.code2), desc);
                    }
                }
                Encoding::Vintrp => {
                    map.insert((Space::Vintrp, desc.code), desc);
                }
                Encoding::Ds => {
                    map.insert((Space::Ds, desc.code), desc);
                }
                Encoding::Mubuf => {
                    map.insert((Space::Mubuf, desc.code), desc);
                }
                Encoding::Mtbuf => {
                    map.insert((Space::Mtbuf, desc.code), desc);
                }
                Encoding::Mimg => {
                    map.insert((Space::Mimg, desc.code), desc);
                }
                Encoding::Flat => {
                    map.insert((Space::Flat, desc.code), desc);
                }
                Encoding::Exp => {}
            }
        }
        Self { map }
    }

    fn get(&self, space: Space, code: u16) -> Option<&'static InsnDesc> {
        self.map.get(&(space, code)).copied()
    }
}

/// One classified instruction: its encoding space, opcode, and extra words.
struct Classified {
    space: Option<Space>,
    is_exp: bool,
    code: u16,
    /// Number of words the instruction occupies, including any literal.
    words: usize,
    /// A literal or second-word value that was expected but missing.
    truncated: bool,
}

/// Classify the instruction starting at `pos` by its fixed bit patterns.
fn classify(arch: Arch, words: &[u32], pos: usize) -> Classified {
    let gcn11 = arch == Arch::Gcn11;
    let gcn12 = arch.is_gcn12();
    let insn = words[pos];
    let avail = words.len() - pos;
    let mut out = Classified {
        space: None,
        is_exp: false,
        code: 0,
        words: 1,
        truncated: false,
    };
    let mut need = |out: &mut Classified, n: usize| {
        out.words = n;
        if avail < n {
            out.truncated = true;
            out.words = avail;
        }
    };
    if insn & 0x8000_0000 != 0 {
        if insn & 0x4000_0000 == 0 {
            if insn & 0x3000_0000 == 0x3000_0000 {
                // SOP1/SOPK/SOPC/SOPP
                let enc_part = insn & 0x0f80_0000;
                if enc_part == 0x0e80_0000 {
                    out.space = Some(Space::Sop1);
                    out.code = ((insn >> 8) & 0xff) as u16;
                    if insn & 0xff == 0xff {
                        need(&mut out, 2);
                    }
                } else if enc_part == 0x0f00_0000 {
                    out.space = Some(Space::Sopc);
                    out.code = ((insn >> 16) & 0x7f) as u16;
                    if insn & 0xff == 0xff || insn & 0xff00 == 0xff00 {
                        need(&mut out, 2);
                    }
                } else if enc_part == 0x0f80_0000 {
                    out.space = Some(Space::Sopp);
                    out.code = ((insn >> 16) & 0x7f) as u16;
                } else {
                    out.space = Some(Space::Sopk);
                    out.code = ((insn >> 23) & 0x1f) as u16;
                    let setreg_imm32 = if gcn12 { 20 } else { 21 };
                    if out.code == setreg_imm32 {
                        need(&mut out, 2);
                    }
                }
            } else {
                out.space = Some(Space::Sop2);
                out.code = ((insn >> 23) & 0x7f) as u16;
                if insn & 0xff == 0xff || insn & 0xff00 == 0xff00 {
                    need(&mut out, 2);
                }
            }
        } else {
            // the long-encoded families, discriminated at [29:26]
            let enc_part = (insn >> 26) & 0xf;
            if !gcn12 {
                match enc_part {
                    0x2 => {
                        out.space = Some(Space::Vintrp);
                        out.code = ((insn >> 16) & 3) as u16;
                    }
                    0x4 => {
                        out.space = Some(Space::Vop3);
                        out.code = ((insn >> 17) & 0x1ff) as u16;
                        need(&mut out, 2);
                    }
                    0x6 => {
                        out.space = Some(Space::Ds);
                        out.code = ((insn >> 18) & 0xff) as u16;
                        need(&mut out, 2);
                    }
                    0x7 if gcn11 => {
                        out.space = Some(Space::Flat);
                        out.code = ((insn >> 18) & 0x7f) as u16;
                        need(&mut out, 2);
                    }
                    0x8 => {
                        out.space = Some(Space::Mubuf);
                        out.code = ((insn >> 18) & 0x7f) as u16;
                        need(&mut out, 2);
                    }
                    0xa => {
                        out.space = Some(Space::Mtbuf);
                        out.code = ((insn >> 16) & 7) as u16;
                        need(&mut out, 2);
                    }
                    0xc => {
                        out.space = Some(Space::Mimg);
                        out.code = ((insn >> 18) & 0x7f) as u16;
                        need(&mut out, 2);
                    }
                    0xe => {
                        out.is_exp = true;
                        need(&mut out, 2);
                    }
                    _ => {
                        out.space = Some(Space::Smrd);
                        out.code = ((insn >> 22) & 0x1f) as u16;
                    }
                }
            } else {
                match enc_part {
                    0x0 => {
                        out.space = Some(Space::Smrd);
                        out.code = ((insn >> 18) & 0xff) as u16;
                        need(&mut out, 2);
                    }
                    0x1 => {
                        out.is_exp = true;
                        need(&mut out, 2);
                    }
                    0x4 => {
                        out.space = Some(Space::Vop3);
                        out.code = ((insn >> 16) & 0x3ff) as u16;
                        need(&mut out, 2);
                    }
                    0x5 => {
                        out.space = Some(Space::Vintrp);
                        out.code = ((insn >> 16) & 3) as u16;
                    }
                    0x6 => {
                        out.space = Some(Space::Ds);
                        out.code = ((insn >> 17) & 0xff) as u16;
                        need(&mut out, 2);
                    }
                    0x7 => {
                        out.space = Some(Space::Flat);
                        out.code = ((insn >> 18) & 0x7f) as u16;
                        need(&mut out, 2);
                    }
                    0x8 => {
                        out.space = Some(Space::Mubuf);
                        out.code = ((insn >> 18) & 0x7f) as u16;
                        need(&mut out, 2);
                    }
                    0xa => {
                        out.space = Some(Space::Mtbuf);
                        out.code = ((insn >> 15) & 7) as u16;
                        need(&mut out, 2);
                    }
                    0xc => {
                        out.space = Some(Space::Mimg);
                        out.code = ((insn >> 18) & 0x7f) as u16;
                        need(&mut out, 2);
                    }
                    _ => {}
                }
            }
        }
    } else if insn & 0x7e00_0000 == 0x7c00_0000 {
        out.space = Some(Space::Vopc);
        out.code = ((insn >> 17) & 0xff) as u16;
        let src0 = insn & 0x1ff;
        if src0 == 0xff || (gcn12 && (src0 == 0xf9 || src0 == 0xfa)) {
            need(&mut out, 2);
        }
    } else if insn & 0x7e00_0000 == 0x7e00_0000 {
        out.space = Some(Space::Vop1);
        out.code = ((insn >> 9) & 0xff) as u16;
        let src0 = insn & 0x1ff;
        if src0 == 0xff || (gcn12 && (src0 == 0xf9 || src0 == 0xfa)) {
            need(&mut out, 2);
        }
    } else {
        out.space = Some(Space::Vop2);
        out.code = ((insn >> 25) & 0x3f) as u16;
        let madmk = if gcn12 {
            matches!(out.code, 23 | 24 | 36 | 37)
        } else {
            matches!(out.code, 32 | 33)
        };
        let src0 = insn & 0x1ff;
        if madmk || src0 == 0xff || (gcn12 && (src0 == 0xf9 || src0 == 0xfa)) {
            need(&mut out, 2);
        }
    }
    out
}

/// Byte length of the instruction starting at word `pos`; usable without a
/// full decode.
pub fn instruction_size(arch: Arch, words: &[u32], pos: usize) -> usize {
    classify(arch, words, pos).words * 4
}

pub struct GcnDisasm {
    arch: Arch,
    float_lits: bool,
    table: DecodeTable,
    named_labels: Vec<(usize, String)>,
}

impl GcnDisasm {
    pub fn new(arch: Arch, float_lits: bool) -> Self {
        Self {
            arch,
            float_lits,
            table: DecodeTable::new(arch),
            named_labels: Vec::new(),
        }
    }

    /// Register a named label at a byte offset.
    pub fn add_named_label(&mut self, offset: usize, name: impl Into<String>) {
        self.named_labels.push((offset, name.into()));
        self.named_labels.sort();
    }

    fn words_from_bytes(input: &[u8]) -> Result<Vec<u32>, String> {
        if input.len() % 4 != 0 {
            return Err("Input code size must be aligned to 4 bytes!".to_string());
        }
        Ok(input
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// The label pre-pass: word indices of every branch target.
    fn scan_labels(&self, words: &[u32]) -> Vec<i64> {
        let mut labels = Vec::new();
        let mut pos = 0usize;
        while pos < words.len() {
            let cls = classify(self.arch, words, pos);
            if let Some(space) = cls.space {
                let is_branch = match space {
                    Space::Sopp => self
                        .table
                        .get(Space::Sopp, cls.code)
                        .map(|d| d.mode.arg == ArgMode::ImmRel)
                        .unwrap_or(false),
                    Space::Sopk => self
                        .table
                        .get(Space::Sopk, cls.code)
                        .map(|d| d.mode.arg == ArgMode::ImmRel)
                        .unwrap_or(false),
                    _ => false,
                };
                if is_branch {
                    let imm = (words[pos] & 0xffff) as u16 as i16 as i64;
                    labels.push(pos as i64 + imm + 1);
                }
            }
            pos += cls.words.max(1);
        }
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// Disassemble a little-endian byte stream into canonical text.
    pub fn disassemble(&self, input: &[u8]) -> Result<String, String> {
        let words = Self::words_from_bytes(input)?;
        let labels = self.scan_labels(&words);
        debug!("disassembling {} words, {} labels", words.len(), labels.len());
        let mut out = String::new();
        let mut pos = 0usize;
        let mut label_iter = labels.iter().peekable();
        let mut named_iter = self.named_labels.iter().peekable();
        while pos < words.len() {
            // labels landing exactly here
            while let Some(&&label) = label_iter.peek() {
                if label == pos as i64 {
                    let _ = writeln!(out, ".L{}:", label);
                    label_iter.next();
                } else if label < pos as i64 {
                    label_iter.next();
                } else {
                    break;
                }
            }
            let mut resync = None;
            while let Some((offset, name)) = named_iter.peek() {
                if *offset == pos * 4 {
                    let _ = writeln!(out, "\n{}:", name);
                    named_iter.next();
                } else {
                    break;
                }
            }
            let cls = classify(self.arch, words.as_slice(), pos);
            if cls.truncated {
                let _ = writeln!(out, "        /* WARNING: Unfinished instruction at end! */");
            }
            self.format_instruction(&mut out, &words, pos, &cls);
            let end = pos + cls.words.max(1);
            // labels inside the instruction body print after it, stepping
            // the position back and forth in bytes
            while let Some(&&label) = label_iter.peek() {
                if label > pos as i64 && (label as usize) < end {
                    let back = (end - label as usize) * 4;
                    let _ = writeln!(out, ".offset .-{}", back);
                    let _ = writeln!(out, ".L{}:", label);
                    let _ = writeln!(out, ".offset .+{}", back);
                    label_iter.next();
                } else {
                    break;
                }
            }
            // a named label inside the instruction resynchronises decoding
            if let Some((offset, name)) = named_iter.peek() {
                let byte_end = end * 4;
                if *offset > pos * 4 && *offset < byte_end && *offset % 4 == 0 {
                    let back = byte_end - *offset;
                    let _ = writeln!(out, ".offset .-{}", back);
                    let _ = writeln!(out, "\n{}:", name);
                    resync = Some(*offset / 4);
                    named_iter.next();
                }
            }
            pos = resync.unwrap_or(end);
        }
        // labels beyond the code end
        for &label in label_iter {
            let _ = writeln!(out, ".org {:#x}", (label as usize) * 4);
            let _ = writeln!(out, ".L{}:", label);
        }
        Ok(out)
    }

    fn format_instruction(&self, out: &mut String, words: &[u32], pos: usize, cls: &Classified) {
        let insn = words[pos];
        let second = words.get(pos + 1).copied().unwrap_or(0);
        if cls.is_exp {
            fmt::format_exp(out, insn, second);
            return;
        }
        let Some(space) = cls.space else {
            let _ = writeln!(out, "        /* unknown encoding: {:#010x} */", insn);
            return;
        };
        let desc = self.table.get(space, cls.code);
        let Some(desc) = desc else {
            let _ = writeln!(
                out,
                "        /* unknown opcode {} in {:?}: {:#010x} */",
                cls.code, space, insn
            );
            return;
        };
        let ctx = fmt::FmtCtx {
            arch: self.arch,
            float_lits: self.float_lits,
            desc,
            insn,
            second,
            pos,
        };
        match space {
            Space::Sop1 => fmt::format_sop1(out, &ctx),
            Space::Sop2 => fmt::format_sop2(out, &ctx),
            Space::Sopc => fmt::format_sopc(out, &ctx),
            Space::Sopk => fmt::format_sopk(out, &ctx),
            Space::Sopp => fmt::format_sopp(out, &ctx),
            Space::Smrd => {
                if self.arch.is_gcn12() {
                    fmt::format_smem(out, &ctx)
                } else {
                    fmt::format_smrd(out, &ctx)
                }
            }
            Space::Vop1 => fmt::format_vop1(out, &ctx),
            Space::Vop2 => fmt::format_vop2(out, &ctx),
            Space::Vopc => fmt::format_vopc(out, &ctx),
            Space::Vop3 => fmt::format_vop3(out, &ctx),
            Space::Vintrp => fmt::format_vintrp(out, &ctx),
            Space::Ds => fmt::format_ds(out, &ctx),
            Space::Mubuf | Space::Mtbuf => fmt::format_mxbuf(out, &ctx, space == Space::Mtbuf),
            Space::Mimg => fmt::format_mimg(out, &ctx),
            Space::Flat => fmt::format_flat(out, &ctx),
        }
    }
}

#[cfg(test)]
mod tests;
