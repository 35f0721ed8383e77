//! Compute the ISO 3166-1 alpha-2 country code of points on the Earth.
//!
//! A point is located by walking a pyramid of tile indexes from coarse to
//! fine (see [`Table::lookup`]); the first tile that matches is terminal,
//! even when it resolves to "ocean" (`None`). Compared to testing every
//! country's polygon boundary, this trades perfect accuracy at borders for
//! a small, fixed-size, allocation-free lookup.
//!
//! # Examples
//!
//! ```rust
//! let table = country_lookup::get_table(None);
//! assert_eq!(country_lookup::lookup(table, 52.52, 13.405), Some("DE"));
//!
//! // in the ocean
//! assert_eq!(country_lookup::lookup(table, 0.0, -140.0), None);
//! ```

mod coord;
mod error;
mod leaf;
mod table;
#[allow(warnings)]
mod tables;
mod tile;

pub use table::Table;

use once_cell::sync::Lazy;

static DEFAULT_TABLE: Lazy<Table> = Lazy::new(|| {
    let table = Table::build().expect("embedded \"countries\" table is malformed");
    log::debug!("loaded default country table: deg_pixels={}", table.deg_pixels());
    table
});

/// Returns a handle to a compiled-in lookup table.
///
/// `name` is reserved for selecting between multiple compiled-in tables;
/// only the default "countries" table is embedded today, so any value
/// (including `None`) returns it. The table is built at most once, on
/// first use, and lives for the remainder of the process.
pub fn get_table(_name: Option<&str>) -> &'static Table {
    &DEFAULT_TABLE
}

/// Pixels per degree (`D`) of the grid backing `table`.
pub fn deg_pixels(table: &Table) -> i32 {
    table.deg_pixels()
}

/// Resolves `(lat, lon)` to a country code using `table`, or `None` for
/// ocean / unclassified.
///
/// `lat` should lie in `[-90, 90]` (negative south) and `lon` in
/// `[-180, 180]` (negative west); out-of-range values are clamped to the
/// nearest valid pixel rather than panicking.
///
/// # Examples
///
/// ```rust
/// let table = country_lookup::get_table(None);
/// assert_eq!(country_lookup::lookup(table, 35.6762, 139.6503), Some("JP"));
/// ```
pub fn lookup(table: &'static Table, lat: f64, lon: f64) -> Option<&'static str> {
    table.lookup(lat, lon)
}
