//! Compiled-in packed data for the default "countries" table.
//!
//! The six zoom-level arrays and the leaf array are produced offline (see
//! `tools/gen_fixture_table.py`, which stands in for the real generator
//! named out of scope in the design docs) and embedded verbatim,
//! gzip-compressed, via `include_bytes!`.

pub(crate) const DEG_PIXELS: i32 = 12;

/// Loop-iteration cap for leaf resolution; a chain longer than this
/// indicates a malformed table rather than a deep-but-valid one.
pub(crate) const RECURSION_CAP: u32 = 16;

/// Coarsest first (level 5 down to level 0), matching the on-disk file
/// naming; `Table::build` reverses this to index by ascending level.
pub(crate) const REV_ZOOM_LEVELS: &[&[u8]] = &[
    include_bytes!("data/table5.bin"),
    include_bytes!("data/table4.bin"),
    include_bytes!("data/table3.bin"),
    include_bytes!("data/table2.bin"),
    include_bytes!("data/table1.bin"),
    include_bytes!("data/table0.bin"),
];

pub(crate) const LEAVES_PACKED: &[u8] = include_bytes!("data/leaves.bin");
