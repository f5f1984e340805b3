//! CSV heightmap export, one grid row per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::terrain::Heightmap;

/// Errors that can occur during CSV export.
#[derive(Error, Debug)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes a heightmap as comma-separated rows.
///
/// Values are written with full float precision, one grid row per line,
/// matching what engine-side line-by-line loaders expect.
pub fn export_heightmap_csv(heightmap: &Heightmap, path: &Path) -> Result<(), CsvExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let width = heightmap.width() as usize;
    for row in heightmap.as_slice().chunks(width) {
        let mut first = true;
        for value in row {
            if !first {
                write!(writer, ",")?;
            }
            write!(writer, "{}", value)?;
            first = false;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_csv_layout() {
        let map = Heightmap::from_values(2, 3, vec![0.0, 0.5, 1.0, 0.25, 0.75, 0.125]);

        let dir = tempdir().unwrap();
        let path = dir.path().join("heightmap.csv");
        export_heightmap_csv(&map, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0,0.5,1");
        assert_eq!(lines[1], "0.25,0.75,0.125");
    }

    #[test]
    fn test_csv_values_parse_back() {
        let map = Heightmap::from_values(3, 3, (0..9).map(|i| i as f32 / 8.0).collect());

        let dir = tempdir().unwrap();
        let path = dir.path().join("heightmap.csv");
        export_heightmap_csv(&map, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<f32> = text
            .lines()
            .flat_map(|line| line.split(','))
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(parsed, map.as_slice());
    }
}
