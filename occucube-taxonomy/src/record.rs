/// Taxa-of-interest rows and resolved taxonomy metadata
use occucube_core::{TaxonKey, TaxonRank, TaxonomicStatus};
use serde::{Deserialize, Serialize};

/// One entry of the curated taxa-of-interest list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonOfInterest {
    pub backbone_taxon_key: Option<TaxonKey>,
    pub key: Option<TaxonKey>,
    pub scientific_name: Option<String>,
    pub rank: Option<TaxonRank>,
    pub taxonomic_status: Option<TaxonomicStatus>,
    pub species_key: Option<TaxonKey>,
}

impl TaxonOfInterest {
    pub fn new(key: TaxonKey, rank: TaxonRank, status: TaxonomicStatus) -> Self {
        Self {
            key: Some(key),
            rank: Some(rank),
            taxonomic_status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_backbone_key(mut self, key: TaxonKey) -> Self {
        self.backbone_taxon_key = Some(key);
        self
    }

    pub fn with_species_key(mut self, key: TaxonKey) -> Self {
        self.species_key = Some(key);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.scientific_name = Some(name.into());
        self
    }

    /// The taxon's own backbone key: `backboneTaxonKey`, else `key`
    pub fn own_key(&self) -> Option<TaxonKey> {
        self.backbone_taxon_key.or(self.key)
    }
}

/// Metadata returned by the taxonomy lookup service for one key
///
/// Field names follow the GBIF species API so responses deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonMetadata {
    pub key: TaxonKey,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub rank: Option<TaxonRank>,
    #[serde(default)]
    pub taxonomic_status: Option<TaxonomicStatus>,
    /// Set when the queried key is itself a synonym
    #[serde(default)]
    pub accepted_key: Option<TaxonKey>,
    /// Scientific name of the accepted usage
    #[serde(default)]
    pub accepted: Option<String>,
}

impl TaxonMetadata {
    pub fn new(key: TaxonKey, scientific_name: impl Into<String>) -> Self {
        Self {
            key,
            scientific_name: Some(scientific_name.into()),
            rank: None,
            taxonomic_status: None,
            accepted_key: None,
            accepted: None,
        }
    }

    pub fn with_rank(mut self, rank: TaxonRank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_status(mut self, status: TaxonomicStatus) -> Self {
        self.taxonomic_status = Some(status);
        self
    }

    pub fn with_accepted(mut self, accepted_key: TaxonKey, accepted: impl Into<String>) -> Self {
        self.accepted_key = Some(accepted_key);
        self.accepted = Some(accepted.into());
        self
    }

    /// Accepted key differing from the queried key, if any
    pub fn redirect(&self) -> Option<TaxonKey> {
        self.accepted_key.filter(|accepted| *accepted != self.key)
    }
}
