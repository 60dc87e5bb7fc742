use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use occucube_core::{Config, TaxonKey};
use occucube_taxonomy::{resolve_many, LookupOptions, LookupReport};

use crate::cli::output::*;

#[derive(Args)]
pub struct LookupArgs {
    /// GBIF backbone taxon keys
    #[arg(value_name = "KEY", required = true)]
    pub keys: Vec<u64>,

    /// Print the raw result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: LookupArgs, config: Config) -> Result<()> {
    config.validate()?;
    let service = super::lookup_service(&config.lookup, false)?;
    let options = LookupOptions::from_config(&config.lookup);
    let keys: Vec<TaxonKey> = args.keys.iter().copied().map(TaxonKey).collect();

    let report = super::runtime()?.block_on(resolve_many(service.as_ref(), keys, &options));

    if args.json {
        let resolved: Vec<_> = report.resolved.values().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "resolved": resolved,
                "not_found": report.not_found,
                "failed": report.failed,
            }))?
        );
    } else {
        print_report(&report);
    }

    if !report.failed.is_empty() {
        anyhow::bail!("{} of {} lookups failed", report.failed.len(), args.keys.len());
    }
    Ok(())
}

fn print_report(report: &LookupReport) {
    if !report.resolved.is_empty() {
        let mut table = create_standard_table();
        table.set_header(vec![
            header_cell("Key"),
            header_cell("Scientific name"),
            header_cell("Rank"),
            header_cell("Status"),
            header_cell("Accepted"),
        ]);
        for meta in report.resolved.values() {
            let accepted = match (meta.accepted_key, meta.accepted.as_deref()) {
                (Some(key), Some(name)) => format!("{} {}", key, name),
                (Some(key), None) => key.to_string(),
                _ => "-".to_string(),
            };
            table.add_row(vec![
                Cell::new(meta.key),
                Cell::new(or_dash(meta.scientific_name.as_deref())),
                Cell::new(or_dash(meta.rank.as_ref().map(|r| r.as_str()))),
                Cell::new(or_dash(meta.taxonomic_status.as_ref().map(|s| s.as_str()))),
                Cell::new(accepted),
            ]);
        }
        println!("{}", table);
    }

    for key in &report.not_found {
        empty(&format!("{}: no taxonomy record", key));
    }
    for key in &report.failed {
        warning(&format!("{}: lookup failed", key));
    }
}
