// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! ISA-independent assembler plumbing: source positions, input filters,
//! expressions, symbols, sections, macros, and diagnostics.

pub mod cursor;
pub mod expr;
pub mod input_filter;
pub mod macro_processor;
pub mod report;
pub mod section;
pub mod source_pos;
pub mod symbol_table;
