//! Cooling site loader.
//!
//! Source coordinates are state plane feet stored as text with thousands
//! separators (`"1,000,000"`). They are parsed strictly: a value that is
//! still not a number after the separators are removed aborts the load.

use std::collections::BTreeMap;
use std::io::Read;

use geo::Point;
use heat_map_models::CoolingSite;
use heat_map_spatial::StatePlane;

use crate::LoadError;
use crate::table::{HeaderStyle, Row, Table, normalize_column_name};

/// Planar easting column.
pub const X_COLUMN: &str = "x";

/// Planar northing column.
pub const Y_COLUMN: &str = "y";

/// Options for [`load_cooling_sites`].
#[derive(Debug, Clone, Default)]
pub struct CoolingOptions {
    /// Column holding the site identifier. When `None`, the zero-based row
    /// index is used instead.
    pub id_column: Option<String>,
}

/// Parses a number that may contain `,` thousands separators.
///
/// Returns `None` for empty, non-numeric, or non-finite values.
#[must_use]
pub fn parse_grouped_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Loads cooling sites and unprojects them from `plane` to WGS84.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if `x`, `y`, or the configured id
/// column is absent, [`LoadError::MalformedCoordinate`] for the first
/// coordinate that fails to parse, and [`LoadError::Projection`] if a
/// parsed point cannot be unprojected.
pub fn load_cooling_sites<R: Read>(
    reader: R,
    file: &str,
    options: &CoolingOptions,
    plane: &StatePlane,
) -> Result<Vec<CoolingSite>, LoadError> {
    let table = Table::read(reader, file, HeaderStyle::Lowercase)?;

    let x_col = table.require(X_COLUMN)?;
    let y_col = table.require(Y_COLUMN)?;
    let id_col = options
        .id_column
        .as_deref()
        .map(|name| table.require(&normalize_column_name(name)))
        .transpose()?;

    let property_cols: Vec<(usize, &String)> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(i, name)| {
            *i != x_col && *i != y_col && Some(*i) != id_col && !name.is_empty()
        })
        .collect();

    let mut sites = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        let x = coordinate(&table, row, x_col)?;
        let y = coordinate(&table, row, y_col)?;

        let geographic =
            plane
                .to_geographic(Point::new(x, y))
                .map_err(|source| LoadError::Projection {
                    file: file.to_string(),
                    row: row.index,
                    source,
                })?;

        let id = id_col.map_or_else(|| row.index.to_string(), |col| row.get(col).to_string());

        let properties: BTreeMap<String, String> = property_cols
            .iter()
            .map(|(col, name)| ((*name).clone(), row.get(*col).to_string()))
            .collect();

        sites.push(CoolingSite {
            id,
            x,
            y,
            longitude: geographic.x(),
            latitude: geographic.y(),
            properties,
        });
    }

    log::info!(
        "Loaded {} cooling sites from {file} (EPSG:{} -> WGS84)",
        sites.len(),
        plane.epsg()
    );

    Ok(sites)
}

fn coordinate(table: &Table, row: &Row, col: usize) -> Result<f64, LoadError> {
    let raw = row.get(col);
    parse_grouped_number(raw).ok_or_else(|| LoadError::MalformedCoordinate {
        file: table.file().to_string(),
        row: row.index,
        line: row.line,
        field: table.headers()[col].clone(),
        value: raw.to_string(),
    })
}
