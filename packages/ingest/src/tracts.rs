//! Census tract statistics loader.
//!
//! The GEOID is always the first column, whatever its header says. Only the
//! last six characters are used for joining; the rest of the row is passed
//! through untouched.

use std::collections::BTreeMap;
use std::io::Read;

use heat_map_models::TractStatistics;

use crate::LoadError;
use crate::table::{HeaderStyle, Table};

/// Options for [`load_tract_statistics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TractOptions {
    /// Descriptive rows directly under the header to skip (census exports
    /// often repeat the header as human-readable labels).
    pub label_rows: usize,
}

/// Loads tract statistics rows keyed by GEOID.
///
/// Rows with an empty GEOID are skipped.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] or [`LoadError::EmptyTable`] if the table
/// cannot be read.
pub fn load_tract_statistics<R: Read>(
    reader: R,
    file: &str,
    options: TractOptions,
) -> Result<Vec<TractStatistics>, LoadError> {
    let table = Table::read(reader, file, HeaderStyle::Trim)?;
    let headers = table.headers();

    let mut tracts = Vec::with_capacity(table.rows().len());
    let mut skipped = 0usize;

    for row in table.rows().iter().skip(options.label_rows) {
        let geoid = row.get(0);
        if geoid.is_empty() {
            skipped += 1;
            continue;
        }

        let statistics: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, name)| !name.is_empty())
            .map(|(i, name)| (name.clone(), row.get(i).to_string()))
            .collect();

        tracts.push(TractStatistics::new(geoid, statistics));
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} rows with an empty GEOID in {file}");
    }
    log::info!("Loaded {} tract statistics rows from {file}", tracts.len());

    Ok(tracts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACS: &str = "\
GEO_ID,NAME,B11007_001E
1400000US36005000100,Census Tract 1,120
1400000US36005000200,Census Tract 2,85
";

    #[test]
    fn derives_geoid_and_suffix_from_first_column() {
        let tracts = load_tract_statistics(ACS.as_bytes(), "acs.csv", TractOptions::default())
            .unwrap();
        assert_eq!(tracts.len(), 2);
        assert_eq!(tracts[0].geoid, "1400000US36005000100");
        assert_eq!(tracts[0].tract_2010, "000100");
        assert_eq!(tracts[1].tract_2010, "000200");
        assert_eq!(tracts[0].statistics.get("B11007_001E").unwrap(), "120");
        assert_eq!(tracts[0].statistics.get("NAME").unwrap(), "Census Tract 1");
        assert!(!tracts[0].statistics.contains_key("GEO_ID"));
    }

    #[test]
    fn first_column_is_used_regardless_of_name() {
        let csv = "id,pop\n36061000700,10\n";
        let tracts = load_tract_statistics(csv.as_bytes(), "acs.csv", TractOptions::default())
            .unwrap();
        assert_eq!(tracts[0].tract_2010, "000700");
    }

    #[test]
    fn skips_label_rows() {
        let csv = "\
GEO_ID,NAME
Geography,Geographic Area Name
1400000US36005000100,Census Tract 1
";
        let tracts =
            load_tract_statistics(csv.as_bytes(), "acs.csv", TractOptions { label_rows: 1 })
                .unwrap();
        assert_eq!(tracts.len(), 1);
        assert_eq!(tracts[0].tract_2010, "000100");
    }

    #[test]
    fn skips_empty_geoids() {
        let csv = "GEO_ID,NAME\n,blank\n36005000100,one\n";
        let tracts = load_tract_statistics(csv.as_bytes(), "acs.csv", TractOptions::default())
            .unwrap();
        assert_eq!(tracts.len(), 1);
    }
}
