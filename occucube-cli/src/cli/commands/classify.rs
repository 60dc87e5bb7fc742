use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::Cell;
use occucube_core::{ClassificationGap, Config, TaxonKey};
use occucube_cube::read_taxa;
use occucube_taxonomy::{partition, Bucket, ClassifierOutput, TaxonOfInterest};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// Taxa of interest table
    #[arg(long, value_name = "FILE")]
    pub taxa: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Assignment {
    row: usize,
    bucket: Bucket,
    key: TaxonKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    scientific_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    species: Vec<TaxonKey>,
    infraspecific: Vec<TaxonKey>,
    synonym: Vec<TaxonKey>,
    assignments: Vec<Assignment>,
    gaps: Vec<ClassificationGap>,
    overlaps: Vec<(TaxonKey, Bucket, Bucket)>,
}

impl Report {
    fn new(taxa: &[TaxonOfInterest], classes: &ClassifierOutput) -> Self {
        let keys = |bucket: Bucket| -> Vec<TaxonKey> {
            classes.keys.get(bucket).iter().copied().collect()
        };
        Self {
            species: keys(Bucket::Species),
            infraspecific: keys(Bucket::Infraspecific),
            synonym: keys(Bucket::Synonym),
            assignments: classes
                .assignments
                .iter()
                .map(|&(row, bucket, key)| Assignment {
                    row,
                    bucket,
                    key,
                    scientific_name: taxa.get(row).and_then(|t| t.scientific_name.clone()),
                })
                .collect(),
            gaps: classes.gaps.clone(),
            overlaps: classes.keys.overlaps(),
        }
    }
}

pub fn run(args: ClassifyArgs, config: &Config) -> Result<()> {
    let taxa = read_taxa(&args.taxa, config.input.delimiter)
        .with_context(|| format!("Failed to read taxa from {}", args.taxa.display()))?;
    let classes = partition(&taxa);
    let report = Report::new(&taxa, &classes);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report, taxa.len()),
    }
    Ok(())
}

fn print_text(report: &Report, total: usize) {
    section_header("Taxa of interest");
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Key"),
        header_cell("Name"),
        header_cell("Bucket"),
    ]);
    for a in &report.assignments {
        table.add_row(vec![
            number_cell(a.row + 1),
            Cell::new(a.key),
            Cell::new(or_dash(a.scientific_name.as_deref())),
            Cell::new(a.bucket),
        ]);
    }
    println!("{}", table);

    if !report.gaps.is_empty() {
        section_header("Excluded");
        let last = report.gaps.len() - 1;
        for (i, gap) in report.gaps.iter().enumerate() {
            let label = format!(
                "row {} {}",
                gap.row + 1,
                gap.scientific_name.as_deref().unwrap_or_default()
            );
            tree_item(i == last, label.trim_end(), Some(&gap.reason.to_string()));
        }
    }

    println!();
    for (key, a, b) in &report.overlaps {
        warning(&format!("key {} is claimed by both the {} and {} buckets", key, a, b));
    }
    info(&format!(
        "{} of {} taxa classified: {} species, {} infraspecific, {} synonym keys",
        report.assignments.len(),
        total,
        report.species.len(),
        report.infraspecific.len(),
        report.synonym.len()
    ));
}
