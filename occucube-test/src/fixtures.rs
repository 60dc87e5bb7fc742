//! Test fixtures and data generators
//!
//! Occurrence rows and taxa-of-interest lists rendered as comma-separated
//! tables with the same header names as a GBIF occurrence download.

use occucube_taxonomy::TaxonOfInterest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One raw occurrence row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestOccurrence {
    pub year: Option<i64>,
    pub cell: Option<String>,
    pub taxon_key: Option<u64>,
    pub accepted_taxon_key: Option<u64>,
    pub species_key: Option<u64>,
    pub scientific_name: Option<String>,
    pub uncertainty: Option<f64>,
}

impl TestOccurrence {
    /// Occurrence of `taxon_key` whose accepted and species keys equal it
    pub fn new(year: i64, cell: impl Into<String>, taxon_key: u64) -> Self {
        Self {
            year: Some(year),
            cell: Some(cell.into()),
            taxon_key: Some(taxon_key),
            accepted_taxon_key: Some(taxon_key),
            species_key: Some(taxon_key),
            ..Default::default()
        }
    }

    pub fn accepted(mut self, key: u64) -> Self {
        self.accepted_taxon_key = Some(key);
        self
    }

    pub fn species(mut self, key: u64) -> Self {
        self.species_key = Some(key);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.scientific_name = Some(name.into());
        self
    }

    pub fn uncertainty(mut self, meters: f64) -> Self {
        self.uncertainty = Some(meters);
        self
    }
}

pub const OCCURRENCE_HEADER: &str = "gbifID,datasetKey,year,eea_cell_code,taxonKey,acceptedTaxonKey,speciesKey,scientificName,coordinateUncertaintyInMeters";

pub const TAXA_HEADER: &str = "key,backboneTaxonKey,scientificName,rank,taxonomicStatus,speciesKey";

fn field<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| escape(&v.to_string())).unwrap_or_default()
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render occurrence rows with a GBIF-like header
pub fn occurrences_csv(rows: &[TestOccurrence]) -> String {
    let mut out = String::from(OCCURRENCE_HEADER);
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{},4fa7b334-ce0d-4e88-aaae-2e0c138d049e,{},{},{},{},{},{},{}\n",
            i + 1,
            field(&row.year),
            field(&row.cell),
            field(&row.taxon_key),
            field(&row.accepted_taxon_key),
            field(&row.species_key),
            field(&row.scientific_name),
            field(&row.uncertainty),
        ));
    }
    out
}

/// Render a taxa-of-interest list
pub fn taxa_csv(taxa: &[TaxonOfInterest]) -> String {
    let mut out = String::from(TAXA_HEADER);
    out.push('\n');
    for taxon in taxa {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            field(&taxon.key),
            field(&taxon.backbone_taxon_key),
            field(&taxon.scientific_name),
            field(&taxon.rank),
            field(&taxon.taxonomic_status),
            field(&taxon.species_key),
        ));
    }
    out
}

/// Generate random occurrences of the given taxon keys
///
/// Deterministic for a given seed; about one in five rows has no uncertainty.
pub fn generate_occurrences(count: usize, keys: &[u64], seed: u64) -> Vec<TestOccurrence> {
    let mut rng = StdRng::seed_from_u64(seed);
    if keys.is_empty() {
        return Vec::new();
    }

    (0..count)
        .map(|_| {
            let key = keys[rng.gen_range(0..keys.len())];
            let year = rng.gen_range(2015..2021);
            let cell = format!("1kmE{}N{}", rng.gen_range(3900..3904), rng.gen_range(3100..3103));
            let mut row = TestOccurrence::new(year, cell, key).named(format!("Taxon {}", key));
            if rng.gen_range(0..5) != 0 {
                row = row.uncertainty(rng.gen_range(1..500) as f64);
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use occucube_core::{TaxonKey, TaxonRank, TaxonomicStatus};

    #[test]
    fn test_occurrences_csv_quotes_names() {
        let rows = vec![TestOccurrence::new(2020, "E1", 1).named("Rana, sp.").uncertainty(30.0)];
        let csv = occurrences_csv(&rows);
        let line = csv.lines().nth(1).unwrap();
        assert!(line.contains("\"Rana, sp.\""));
        assert!(line.ends_with(",30"));
    }

    #[test]
    fn test_taxa_csv_leaves_nulls_empty() {
        let taxa = vec![TaxonOfInterest::new(TaxonKey(7), TaxonRank::Subspecies, TaxonomicStatus::Accepted)];
        let csv = taxa_csv(&taxa);
        assert_eq!(csv.lines().nth(1), Some("7,,,SUBSPECIES,ACCEPTED,"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        assert_eq!(generate_occurrences(50, &[1, 2], 7), generate_occurrences(50, &[1, 2], 7));
        assert!(generate_occurrences(10, &[], 7).is_empty());
    }
}
