//! Custom assertions for written cube and mapping tables

use std::collections::HashSet;

/// Assert that the first line of a delimited file is exactly `expected`
pub fn assert_header(content: &str, expected: &[&str]) {
    let header = content.lines().next().unwrap_or_default();
    assert_eq!(header, expected.join(","), "unexpected header");
}

/// Assert that no two cube rows share (year, eea_cell_code, taxonKey)
pub fn assert_unique_cells(cube: &str) {
    let mut seen = HashSet::new();
    for line in cube.lines().skip(1) {
        let cell: Vec<&str> = line.splitn(4, ',').take(3).collect();
        assert!(seen.insert(cell.clone()), "duplicate cube cell {:?}", cell);
    }
}

/// Data rows of a delimited file, header excluded
pub fn data_lines(content: &str) -> Vec<&str> {
    content.lines().skip(1).collect()
}
