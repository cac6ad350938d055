// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Register-usage records surfaced to the register-pressure collaborator.
//!
//! Every instruction produces an ordered list of at most six records, each
//! naming the encoding field, the register range, read/write bits, and the
//! alignment requirement. Encoders rewrite field tags when they promote to
//! VOP3 and split data ranges for cmpswap-style halfwrite atomics.

use bitflags::bitflags;

use crate::gcn::regs::RegRange;

/// Canonical field tags, one namespace across the encoding families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegField {
    Ssrc0,
    Ssrc1,
    Sdst,
    SmrdSbase,
    SmrdSdst,
    SmrdSdstH,
    SmrdSoffset,
    VopSrc0,
    VopVsrc1,
    VopSsrc1,
    VopVdst,
    VopSdst,
    Vop3Src0,
    Vop3Src1,
    Vop3Src2,
    Vop3Vdst,
    Vop3Sdst0,
    Vop3Ssrc,
    Vop3Sdst1,
    DppSdwaSrc0,
    DppSdwaSsrc0,
    VintrpVsrc0,
    VintrpVdst,
    DsAddr,
    DsData0,
    DsData1,
    DsVdst,
    MVaddr,
    MVdata,
    MVdataH,
    MVdataLast,
    MSrsrc,
    MimgSsamp,
    MSoffset,
    ExpVsrc0,
    ExpVsrc1,
    ExpVsrc2,
    ExpVsrc3,
    FlatAddr,
    FlatData,
    FlatVdst,
    FlatVdstLast,
    FlatSaddr,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RwFlags: u8 {
        const READ = 1;
        const WRITE = 2;
    }
}

/// One usage record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegUsage {
    pub field: RegField,
    pub range: RegRange,
    pub rw: RwFlags,
    pub align: u8,
}

pub const MAX_USAGE_SLOTS: usize = 6;

/// Per-instruction collector. Slots are addressed explicitly so that a
/// family routine can rewrite or split earlier records after parsing.
#[derive(Debug, Default)]
pub struct UsageCollector {
    slots: [Option<RegUsage>; MAX_USAGE_SLOTS],
    current: usize,
}

impl UsageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.slots = Default::default();
        self.current = 0;
    }

    pub fn set_current(&mut self, slot: usize) {
        debug_assert!(slot < MAX_USAGE_SLOTS);
        self.current = slot;
    }

    /// Record a usage in the current slot.
    pub fn record(&mut self, field: RegField, range: RegRange, rw: RwFlags, align: u8) {
        self.slots[self.current] = Some(RegUsage {
            field,
            range,
            rw,
            align,
        });
    }

    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut RegUsage> {
        self.slots[slot].as_mut()
    }

    pub fn slot(&self, slot: usize) -> Option<&RegUsage> {
        self.slots[slot].as_ref()
    }

    pub fn clear_slot(&mut self, slot: usize) {
        self.slots[slot] = None;
    }

    pub fn put_slot(&mut self, slot: usize, usage: RegUsage) {
        self.slots[slot] = Some(usage);
    }

    /// Drain the records in slot order.
    pub fn take(&mut self) -> Vec<RegUsage> {
        let mut out = Vec::new();
        for slot in self.slots.iter_mut() {
            if let Some(usage) = slot.take() {
                out.push(usage);
            }
        }
        self.current = 0;
        out
    }
}

/// Split the record in `slot` into a first-half read+write and a
/// second-half read-only record placed in `half_slot`; the halfwrite rule
/// for cmpswap-style atomics.
pub fn split_halfwrite(usage: &mut UsageCollector, slot: usize, half_slot: usize, field: RegField) {
    let Some(rvu) = usage.slot_mut(slot) else {
        return;
    };
    let size = rvu.range.len();
    let half = size >> 1;
    let start = rvu.range.start;
    let var = rvu.range.var.clone();
    rvu.range.end = start + half;
    let second = RegUsage {
        field,
        range: RegRange {
            start: start + half,
            end: start + size,
            var,
        },
        rw: RwFlags::READ,
        align: 0,
    };
    usage.put_slot(half_slot, second);
}

/// Append a trailing one-register read+write record for the TFE carry lane.
pub fn add_tfe_lane(usage: &mut UsageCollector, from_slot: usize, last_slot: usize, field: RegField) {
    let Some(rvu) = usage.slot_mut(from_slot) else {
        return;
    };
    let end = rvu.range.end;
    let var = rvu.range.var.clone();
    rvu.range.end = end - 1;
    usage.put_slot(
        last_slot,
        RegUsage {
            field,
            range: RegRange {
                start: end - 1,
                end,
                var,
            },
            rw: RwFlags::READ | RwFlags::WRITE,
            align: 0,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vrange(start: u16, count: u16) -> RegRange {
        RegRange::new(256 + start, 256 + start + count)
    }

    #[test]
    fn records_come_out_in_slot_order() {
        let mut usage = UsageCollector::new();
        usage.set_current(2);
        usage.record(RegField::VopSrc0, vrange(4, 1), RwFlags::READ, 1);
        usage.set_current(0);
        usage.record(RegField::VopVdst, vrange(0, 1), RwFlags::WRITE, 1);
        let records = usage.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field, RegField::VopVdst);
        assert_eq!(records[1].field, RegField::VopSrc0);
    }

    #[test]
    fn halfwrite_split() {
        let mut usage = UsageCollector::new();
        usage.set_current(0);
        usage.record(
            RegField::MVdata,
            vrange(8, 4),
            RwFlags::READ | RwFlags::WRITE,
            1,
        );
        split_halfwrite(&mut usage, 0, 4, RegField::MVdataH);
        let records = usage.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].range, vrange(8, 2));
        assert_eq!(records[0].rw, RwFlags::READ | RwFlags::WRITE);
        assert_eq!(records[1].field, RegField::MVdataH);
        assert_eq!(records[1].range, vrange(10, 2));
        assert_eq!(records[1].rw, RwFlags::READ);
    }

    #[test]
    fn tfe_lane_is_split_off() {
        let mut usage = UsageCollector::new();
        usage.set_current(0);
        usage.record(RegField::MVdata, vrange(0, 3), RwFlags::WRITE, 1);
        add_tfe_lane(&mut usage, 0, 5, RegField::MVdataLast);
        let records = usage.take();
        assert_eq!(records[0].range, vrange(0, 2));
        assert_eq!(records[1].range, vrange(2, 1));
        assert_eq!(records[1].rw, RwFlags::READ | RwFlags::WRITE);
    }
}
