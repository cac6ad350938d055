// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! GCN architecture generations and instruction-table architecture masks.

use bitflags::bitflags;

/// One GPU architecture generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// Southern Islands.
    Gcn10,
    /// Sea Islands.
    Gcn11,
    /// Volcanic Islands.
    Gcn12,
    /// Vega.
    Gcn14,
}

bitflags! {
    /// Supported-architecture bitmask on an instruction descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ArchMask: u16 {
        const GCN10 = 1;
        const GCN11 = 2;
        const GCN12 = 4;
        const GCN14 = 8;
    }
}

impl ArchMask {
    pub const ALL: ArchMask = ArchMask::all();
    /// GCN 1.0 and 1.1.
    pub const GCN1_0_1: ArchMask = ArchMask::GCN10.union(ArchMask::GCN11);
    /// GCN 1.2 and later; the "new encodings" line.
    pub const GCN1_2_4: ArchMask = ArchMask::GCN12.union(ArchMask::GCN14);
    /// GCN 1.1 and later (FLAT-capable).
    pub const GCN1_1_2_4: ArchMask = ArchMask::GCN11
        .union(ArchMask::GCN12)
        .union(ArchMask::GCN14);
}

impl Arch {
    pub fn mask(self) -> ArchMask {
        match self {
            Arch::Gcn10 => ArchMask::GCN10,
            Arch::Gcn11 => ArchMask::GCN11,
            Arch::Gcn12 => ArchMask::GCN12,
            Arch::Gcn14 => ArchMask::GCN14,
        }
    }

    /// GCN 1.2 or newer: new opcode layouts, SMEM, SDWA/DPP.
    pub fn is_gcn12(self) -> bool {
        matches!(self, Arch::Gcn12 | Arch::Gcn14)
    }

    /// Vega.
    pub fn is_gcn14(self) -> bool {
        matches!(self, Arch::Gcn14)
    }

    pub fn name(self) -> &'static str {
        match self {
            Arch::Gcn10 => "gcn1.0",
            Arch::Gcn11 => "gcn1.1",
            Arch::Gcn12 => "gcn1.2",
            Arch::Gcn14 => "gcn1.4",
        }
    }

    /// Parse an architecture name; accepts generation names and the common
    /// codename aliases.
    pub fn from_name(name: &str) -> Option<Arch> {
        match name.to_ascii_lowercase().as_str() {
            "gcn1.0" | "gcn10" | "si" | "southernislands" | "pitcairn" | "tahiti" => {
                Some(Arch::Gcn10)
            }
            "gcn1.1" | "gcn11" | "ci" | "seaislands" | "hawaii" | "bonaire" => Some(Arch::Gcn11),
            "gcn1.2" | "gcn12" | "vi" | "volcanicislands" | "tonga" | "fiji" => Some(Arch::Gcn12),
            "gcn1.4" | "gcn14" | "vega" | "gfx900" | "rxvega" => Some(Arch::Gcn14),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_membership() {
        assert!(ArchMask::GCN1_2_4.contains(Arch::Gcn14.mask()));
        assert!(!ArchMask::GCN1_2_4.contains(Arch::Gcn11.mask()));
        assert!(ArchMask::GCN1_0_1.contains(Arch::Gcn10.mask()));
    }

    #[test]
    fn names_round_trip() {
        for arch in [Arch::Gcn10, Arch::Gcn11, Arch::Gcn12, Arch::Gcn14] {
            assert_eq!(Arch::from_name(arch.name()), Some(arch));
        }
        assert_eq!(Arch::from_name("VEGA"), Some(Arch::Gcn14));
        assert_eq!(Arch::from_name("r600"), None);
    }
}
