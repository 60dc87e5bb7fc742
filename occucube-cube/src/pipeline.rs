//! End-to-end cube construction
//!
//! classify → aggregate the three buckets in parallel → build the three
//! mapping tables concurrently over one cached lookup → remap → merge.

use occucube_core::config::OutputConfig;
use occucube_core::{
    generate_utc_timestamp, BucketSummary, Config, CubeResult, LookupSummary, PipelineSummary,
};
use occucube_taxonomy::{partition, Bucket, CachedLookup, LookupOptions, TaxonOfInterest, TaxonomyLookup};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::aggregate::{aggregate_bucket, PartialCube};
use crate::formats::TableWriter;
use crate::mapping::{collect_contributors, BucketMapping, ContributorIndex, LookupProgress, MappingBuilder};
use crate::merge::{merge_cubes, merge_mappings, Cube, MappingTable};
use crate::occurrence::OccurrenceRecord;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Default)]
pub struct CubePipeline {
    lookup_options: LookupOptions,
}

/// Merged tables and run statistics
#[derive(Debug, Clone)]
pub struct CubeOutput {
    pub cube: Cube,
    pub mapping: MappingTable,
    pub summary: PipelineSummary,
}

/// Paths written by [`CubeOutput::write_to`]
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub cube: PathBuf,
    pub mapping: PathBuf,
    pub summary: PathBuf,
}

impl CubePipeline {
    pub fn new(lookup_options: LookupOptions) -> Self {
        Self { lookup_options }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(LookupOptions::from_config(&config.lookup))
    }

    pub async fn run<L>(
        &self,
        taxa: &[TaxonOfInterest],
        occurrences: &[OccurrenceRecord],
        lookup: &L,
    ) -> CubeResult<CubeOutput>
    where
        L: TaxonomyLookup + ?Sized,
    {
        self.run_with_progress(taxa, occurrences, lookup, &()).await
    }

    pub async fn run_with_progress<L>(
        &self,
        taxa: &[TaxonOfInterest],
        occurrences: &[OccurrenceRecord],
        lookup: &L,
        progress: &dyn LookupProgress,
    ) -> CubeResult<CubeOutput>
    where
        L: TaxonomyLookup + ?Sized,
    {
        let started = Instant::now();
        let classes = partition(taxa);

        let aggregate = |bucket: Bucket| -> (PartialCube, ContributorIndex) {
            let keys = classes.keys.get(bucket);
            (
                aggregate_bucket(bucket, keys, occurrences),
                collect_contributors(bucket, keys, occurrences),
            )
        };
        let ((species, species_raw), ((infra, infra_raw), (synonym, synonym_raw))) = rayon::join(
            || aggregate(Bucket::Species),
            || rayon::join(|| aggregate(Bucket::Infraspecific), || aggregate(Bucket::Synonym)),
        );
        tracing::info!(
            "Aggregated {} occurrences into {} species, {} infraspecific and {} synonym cells",
            occurrences.len(),
            species.cells.len(),
            infra.cells.len(),
            synonym.cells.len()
        );

        let cached = CachedLookup::new(lookup);
        let builder = MappingBuilder::new(&cached, self.lookup_options.clone()).with_progress(progress);
        let (species_map, infra_map, synonym_map) = futures::join!(
            builder.build(Bucket::Species, species_raw),
            builder.build(Bucket::Infraspecific, infra_raw),
            builder.build(Bucket::Synonym, synonym_raw),
        );
        let (hits, misses) = cached.stats();
        tracing::debug!("Taxonomy lookups: {} fetched, {} served from cache", misses, hits);

        let infra = infra.remap(&infra_map.remapped);
        let cubes = vec![species, infra, synonym];
        let mappings = vec![species_map, infra_map, synonym_map];

        let mut summary = summarize(&classes, taxa.len(), occurrences.len(), &cubes, &mappings);

        let cube = merge_cubes(cubes)?;
        let mapping = merge_mappings(mappings)?;

        summary.cube_rows = cube.len();
        summary.mapping_rows = mapping.len();
        summary.elapsed_ms = started.elapsed().as_millis();

        tracing::info!("{}", summary.coverage_line());
        for bucket in &summary.empty_buckets {
            tracing::info!("{} bucket produced no cube rows", bucket);
        }

        Ok(CubeOutput { cube, mapping, summary })
    }
}

fn summarize(
    classes: &occucube_taxonomy::ClassifierOutput,
    taxa_total: usize,
    occurrences_read: usize,
    cubes: &[PartialCube],
    mappings: &[BucketMapping],
) -> PipelineSummary {
    let mut lookup = LookupSummary::default();
    let mut buckets = Vec::new();
    let mut empty_buckets = Vec::new();

    for (cube, mapping) in cubes.iter().zip(mappings) {
        lookup.absorb(&mapping.lookup);
        if cube.is_empty() {
            empty_buckets.push(cube.bucket.name().to_string());
        }
        buckets.push(BucketSummary {
            bucket: cube.bucket.name().to_string(),
            taxa: classes.keys.get(cube.bucket).len(),
            taxa_with_occurrences: cube.matched_keys.len(),
            occurrences: cube.occurrences,
            cube_rows: cube.cells.len(),
            mapping_rows: mapping.entries.len(),
            remapped_keys: mapping.remapped.len(),
        });
    }

    let taxa_in_cube = classes
        .assignments
        .iter()
        .filter(|(_, bucket, key)| {
            cubes
                .iter()
                .any(|c| c.bucket == *bucket && c.matched_keys.contains(key))
        })
        .count();

    PipelineSummary {
        generated_at: generate_utc_timestamp(),
        taxa_total,
        taxa_classified: classes.classified(),
        taxa_in_cube,
        occurrences_read,
        occurrences_used: cubes.iter().map(|c| c.occurrences).sum(),
        buckets,
        empty_buckets,
        lookup,
        gaps: classes.gaps.clone(),
        ..Default::default()
    }
}

impl CubeOutput {
    /// Write the cube, the mapping table and `summary.json` into `dir`
    pub fn write_to(&self, dir: &Path, output: &OutputConfig) -> CubeResult<OutputFiles> {
        std::fs::create_dir_all(dir)?;
        let writer = TableWriter::new(output.delimiter, output.includes_separator.clone());

        let files = OutputFiles {
            cube: dir.join(&output.cube_file),
            mapping: dir.join(&output.taxa_file),
            summary: dir.join(SUMMARY_FILE),
        };

        writer.write_cube_file(&files.cube, &self.cube.cells)?;
        writer.write_mapping_file(&files.mapping, &self.mapping.entries)?;
        std::fs::write(&files.summary, serde_json::to_string_pretty(&self.summary)?)?;

        Ok(files)
    }
}
