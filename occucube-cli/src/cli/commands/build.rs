use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use occucube_core::{Config, PipelineSummary};
use occucube_cube::{read_occurrences, read_taxa, CubePipeline, OutputFiles};
use std::path::PathBuf;

use crate::cli::output::*;
use crate::cli::progress::{create_spinner, LookupBar};

#[derive(Args)]
pub struct BuildArgs {
    /// Occurrence table (GBIF download, comma or tab separated)
    #[arg(long, value_name = "FILE")]
    pub occurrences: PathBuf,

    /// Taxa of interest table
    #[arg(long, value_name = "FILE")]
    pub taxa: PathBuf,

    /// Directory receiving the cube, the mapping table and summary.json
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Skip remote taxonomy lookups
    #[arg(long)]
    pub offline: bool,

    /// Field delimiter of the written tables
    #[arg(long, value_name = "C")]
    pub delimiter: Option<char>,

    /// Field delimiter of the input tables (detected when omitted)
    #[arg(long, value_name = "C")]
    pub input_delimiter: Option<char>,

    /// Separator placed between entries of the includes column
    #[arg(long, value_name = "S")]
    pub includes_separator: Option<String>,

    /// Maximum number of lookups in flight
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl BuildArgs {
    /// Flags override the file values
    fn apply(&self, config: &mut Config) {
        if let Some(d) = self.delimiter {
            config.output.delimiter = d;
        }
        if let Some(d) = self.input_delimiter {
            config.input.delimiter = Some(d);
        }
        if let Some(sep) = &self.includes_separator {
            config.output.includes_separator = sep.clone();
        }
        if let Some(n) = self.concurrency {
            config.lookup.max_concurrency = n;
        }
    }
}

pub fn run(args: BuildArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let spinner = create_spinner("Reading input tables...");
    let taxa = read_taxa(&args.taxa, config.input.delimiter)
        .with_context(|| format!("Failed to read taxa from {}", args.taxa.display()))?;
    let occurrences = read_occurrences(&args.occurrences, config.input.delimiter).with_context(|| {
        format!("Failed to read occurrences from {}", args.occurrences.display())
    })?;
    spinner.finish_and_clear();
    info(&format!(
        "Read {} taxa of interest and {} occurrences",
        format_number(taxa.len()),
        format_number(occurrences.len())
    ));

    let service = super::lookup_service(&config.lookup, args.offline)?;
    let pipeline = CubePipeline::from_config(&config);
    let bar = LookupBar::new(!args.no_progress && !args.offline && config.lookup.enabled);

    let output = super::runtime()?.block_on(pipeline.run_with_progress(
        &taxa,
        &occurrences,
        service.as_ref(),
        &bar,
    ));
    bar.finish();
    let output = output?;

    let files = output
        .write_to(&args.output, &config.output)
        .with_context(|| format!("Failed to write outputs to {}", args.output.display()))?;

    print_summary(&output.summary, &files);
    Ok(())
}

fn print_summary(summary: &PipelineSummary, files: &OutputFiles) {
    section_header("Buckets");
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Bucket"),
        header_cell("Taxa"),
        header_cell("With occurrences"),
        header_cell("Occurrences"),
        header_cell("Cube rows"),
        header_cell("Mapping rows"),
        header_cell("Remapped"),
    ]);
    for bucket in &summary.buckets {
        table.add_row(vec![
            Cell::new(&bucket.bucket),
            number_cell(bucket.taxa),
            number_cell(bucket.taxa_with_occurrences),
            number_cell(bucket.occurrences),
            number_cell(bucket.cube_rows),
            number_cell(bucket.mapping_rows),
            number_cell(bucket.remapped_keys),
        ]);
    }
    println!("{}", table);

    let lookup = &summary.lookup;
    section_header("Taxonomy lookups");
    tree_item(false, "Requested", Some(&format_number(lookup.requested)));
    tree_item(false, "Resolved", Some(&format_number(lookup.resolved)));
    tree_item(false, "Not found", Some(&format_number(lookup.not_found)));
    tree_item(true, "Failed", Some(&format_number(lookup.failed)));

    if !summary.gaps.is_empty() {
        section_header("Excluded taxa");
        let last = summary.gaps.len() - 1;
        for (i, gap) in summary.gaps.iter().enumerate() {
            let label = match (gap.key, gap.scientific_name.as_deref()) {
                (Some(key), Some(name)) => format!("{} {}", key, name),
                (Some(key), None) => key.to_string(),
                (None, Some(name)) => name.to_string(),
                (None, None) => format!("row {}", gap.row + 1),
            };
            tree_item(i == last, &label, Some(&gap.reason.to_string()));
        }
    }

    println!();
    for bucket in &summary.empty_buckets {
        empty(&format!("{} bucket produced no cube rows", bucket));
    }
    if lookup.failed > 0 {
        warning(&format!(
            "{} lookups failed; their mapping rows carry no metadata",
            lookup.failed
        ));
    }
    info(&summary.coverage_line());
    success(&format!(
        "Wrote {} cube rows to {} and {} mapping rows to {} in {}",
        format_number(summary.cube_rows),
        files.cube.display(),
        format_number(summary.mapping_rows),
        files.mapping.display(),
        format_duration_ms(summary.elapsed_ms)
    ));
}
