use std::io::{BufRead, BufReader, Read};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;

use crate::error::TableError;
use crate::leaf::{Leaf, Step};
use crate::tables;
use crate::tile::{TileEntry, TileKey, ZoomLevel};
use crate::coord;

/// All the information required for a lookup: six zoom-level tile indexes
/// and the leaf array they point into.
///
/// Built once, lazily, from the bytes compiled into the binary (see
/// [`crate::get_table`]); never mutated afterwards.
pub struct Table {
    deg_pixels: i32,
    zoom_levels: [ZoomLevel; 6],
    leaves: Vec<Leaf>,
}

impl Table {
    pub(crate) fn build() -> Result<Table, TableError> {
        let mut zoom_levels = Vec::with_capacity(6);
        for packed in tables::REV_ZOOM_LEVELS.iter().rev() {
            zoom_levels.push(Self::parse_zoom_level(packed)?);
        }
        let found = zoom_levels.len();
        let zoom_levels: [ZoomLevel; 6] = zoom_levels
            .try_into()
            .map_err(|_| TableError::WrongZoomLevelCount { found })?;

        for (level, zl) in zoom_levels.iter().enumerate() {
            debug_assert!(zl.is_sorted(), "zoom level {level} tile array is not sorted");
        }

        let leaves = Self::parse_leaves(tables::LEAVES_PACKED)?;

        Ok(Table { deg_pixels: tables::DEG_PIXELS, zoom_levels, leaves })
    }

    fn parse_zoom_level(packed: &[u8]) -> Result<ZoomLevel, TableError> {
        let mut raw = Vec::new();
        GzDecoder::new(packed).read_to_end(&mut raw)?;
        if raw.len() % 6 != 0 {
            return Err(TableError::Truncated { context: "zoom level tile array" });
        }
        let mut cursor = &raw[..];
        let mut tiles = Vec::with_capacity(raw.len() / 6);
        while !cursor.is_empty() {
            let key = cursor.read_u32::<BigEndian>()?;
            let leaf_index = cursor.read_u16::<BigEndian>()?;
            tiles.push(TileEntry { key: TileKey(key), leaf_index });
        }
        Ok(ZoomLevel { tiles })
    }

    fn parse_leaves(packed: &[u8]) -> Result<Vec<Leaf>, TableError> {
        let mut src = BufReader::new(GzDecoder::new(packed));
        let mut leaves = Vec::new();
        loop {
            let mut tag = [0u8; 1];
            let read = src.read(&mut tag)?;
            if read == 0 {
                break;
            }
            let leaf = match tag[0] {
                b'S' => {
                    let mut name = Vec::new();
                    src.read_until(0, &mut name)?;
                    if name.last() == Some(&0) {
                        name.pop();
                    }
                    let name =
                        String::from_utf8(name).map_err(|_| TableError::InvalidCountryCode)?;
                    Leaf::Uniform(name.into_boxed_str())
                }
                b'2' => {
                    let idx0 = src.read_u16::<BigEndian>()?;
                    let idx1 = src.read_u16::<BigEndian>()?;
                    let bits = src.read_u64::<BigEndian>()?;
                    Leaf::Bitmap { idx: [idx0, idx1], bits }
                }
                b'P' => {
                    let mut cells = [0u16; 64];
                    for cell in cells.iter_mut() {
                        *cell = src.read_u16::<BigEndian>()?;
                    }
                    Leaf::Pixmap { cells }
                }
                other => return Err(TableError::UnknownLeafTag { tag: other }),
            };
            leaves.push(leaf);
        }
        Ok(leaves)
    }

    /// Pixels per degree (`D`); the grid is `360*D` by `180*D`.
    pub fn deg_pixels(&self) -> i32 {
        self.deg_pixels
    }

    /// Resolves `(lat, lon)` to a country code, or `None` for ocean /
    /// unclassified. `lat`/`lon` must be finite; out-of-range values are
    /// silently clamped, per the coordinate mapper's contract.
    pub fn lookup(&self, lat: f64, lon: f64) -> Option<&str> {
        let (x, y) = coord::map_lat_lon(self.deg_pixels, lat, lon);
        self.lookup_pixel(x, y)
    }

    pub(crate) fn lookup_pixel(&self, x: usize, y: usize) -> Option<&str> {
        for level in (0..6).rev() {
            let shift = 3 + level;
            let tile_x = (x >> shift) as u16;
            let tile_y = (y >> shift) as u16;
            let key = TileKey::new(level as u8, tile_x, tile_y);
            if let Some(leaf_index) = self.zoom_levels[level].search(key) {
                // The first level that matches is terminal for this pixel,
                // even when the leaf resolves to ocean.
                return self.resolve_leaf(leaf_index, x, y);
            }
        }
        None
    }

    /// Iterative walk through a leaf chain (see the design notes on
    /// preferring a loop over recursion). Bounded by `RECURSION_CAP`
    /// iterations; exceeding it means the table is malformed.
    fn resolve_leaf(&self, mut leaf_index: u16, x: usize, y: usize) -> Option<&str> {
        for _ in 0..tables::RECURSION_CAP {
            let leaf = match self.leaves.get(leaf_index as usize) {
                Some(leaf) => leaf,
                None => {
                    let err = TableError::LeafIndexOutOfRange {
                        index: leaf_index,
                        len: self.leaves.len(),
                    };
                    log::error!("{err}");
                    return None;
                }
            };
            match leaf.step(x, y) {
                Step::Country(code) => return Some(code),
                Step::Ocean => return None,
                Step::Recurse(next) => leaf_index = next,
            }
        }
        let err = TableError::RecursionOverflow { cap: tables::RECURSION_CAP };
        log::error!("{err}");
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a tiny synthetic table in memory (no gzip/embedding involved)
    /// for exercising the pyramid walker and leaf resolver without
    /// depending on real-world geography.
    pub(crate) fn fixture() -> Table {
        // leaves: 0 = "DE" uniform, 1 = "FR" uniform, 2 = bitmap(0, 1),
        // 3 = pixmap with one ocean cell and otherwise leaf 0.
        let mut bits = 0u64;
        for y in 4..8 {
            for x in 0..8 {
                bits |= 1 << (8 * y + x);
            }
        }
        let mut pix_cells = [0u16; 64];
        pix_cells[0] = crate::leaf::OCEAN_INDEX;

        let leaves = vec![
            Leaf::Uniform("DE".into()),
            Leaf::Uniform("FR".into()),
            Leaf::Bitmap { idx: [0, 1], bits },
            Leaf::Pixmap { cells: pix_cells },
        ];

        let mut zoom_levels: [ZoomLevel; 6] = Default::default();
        // level 5: one big uniform tile at (0,0) -> "DE".
        zoom_levels[5].tiles.push(TileEntry { key: TileKey::new(5, 0, 0), leaf_index: 0 });
        // level 0: a bitmap tile at (1,0) and a pixmap tile at (2,0), both
        // inside the level-5 tile's footprint but matched first since the
        // walker starts coarse and only descends past a level with no hit.
        // Use tile coordinates outside the level-5 tile instead, so both
        // levels are independently reachable.
        zoom_levels[0].tiles.push(TileEntry { key: TileKey::new(0, 40, 0), leaf_index: 2 });
        zoom_levels[0].tiles.push(TileEntry { key: TileKey::new(0, 41, 0), leaf_index: 3 });

        Table { deg_pixels: 12, zoom_levels, leaves }
    }

    #[test]
    fn uniform_tile_resolves_directly() {
        let table = fixture();
        assert_eq!(table.lookup_pixel(0, 0), Some("DE"));
        assert_eq!(table.lookup_pixel(255, 255), Some("DE"));
    }

    #[test]
    fn bitmap_tile_splits_by_bit() {
        let table = fixture();
        let base_x = 40 * 8;
        assert_eq!(table.lookup_pixel(base_x, 0), Some("DE"));
        assert_eq!(table.lookup_pixel(base_x, 4), Some("FR"));
    }

    #[test]
    fn pixmap_ocean_cell_is_null() {
        let table = fixture();
        let base_x = 41 * 8;
        assert_eq!(table.lookup_pixel(base_x, 0), None);
        assert_eq!(table.lookup_pixel(base_x + 1, 0), Some("DE"));
    }

    #[test]
    fn unmatched_pixel_is_ocean() {
        let table = fixture();
        // Far away from the level-5 tile (which only covers x,y < 256) and
        // from the two level-0 tiles.
        assert_eq!(table.lookup_pixel(4000, 2000), None);
    }

    #[test]
    fn recursion_overflow_degrades_to_ocean_not_panic() {
        // A leaf that points at itself must be caught by the iteration cap.
        let leaves = vec![Leaf::Bitmap { idx: [0, 0], bits: u64::MAX }];
        let mut zoom_levels: [ZoomLevel; 6] = Default::default();
        zoom_levels[0].tiles.push(TileEntry { key: TileKey::new(0, 0, 0), leaf_index: 0 });
        let table = Table { deg_pixels: 12, zoom_levels, leaves };
        assert_eq!(table.lookup_pixel(0, 0), None);
    }

    #[test]
    fn out_of_range_leaf_index_degrades_to_ocean_not_panic() {
        let leaves = vec![Leaf::Bitmap { idx: [99, 99], bits: 0 }];
        let mut zoom_levels: [ZoomLevel; 6] = Default::default();
        zoom_levels[0].tiles.push(TileEntry { key: TileKey::new(0, 0, 0), leaf_index: 0 });
        let table = Table { deg_pixels: 12, zoom_levels, leaves };
        assert_eq!(table.lookup_pixel(0, 0), None);
    }

    #[test]
    fn embedded_countries_table_builds() {
        let table = Table::build().expect("embedded table must parse");
        assert_eq!(table.deg_pixels(), 12);
        assert!(!table.leaves.is_empty());
    }
}
