/// Taxonomy-related types used throughout occucube
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Taxon key in the backbone taxonomy - newtype pattern for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonKey(pub u64);

impl TaxonKey {
    pub fn new(key: u64) -> Self {
        Self(key)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaxonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaxonKey {
    fn from(key: u64) -> Self {
        Self(key)
    }
}

impl From<TaxonKey> for u64 {
    fn from(key: TaxonKey) -> Self {
        key.0
    }
}

impl TryFrom<i64> for TaxonKey {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value).map(TaxonKey).map_err(|_| value)
    }
}

/// Taxonomic rank as reported by the backbone
///
/// Only the ranks the classifier distinguishes get their own variant; every
/// other rank string is preserved in `Other` (upper-cased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxonRank {
    Species,
    SubspecificAggregate,
    Subspecies,
    Variety,
    Subvariety,
    Form,
    Subform,
    Other(String),
}

impl TaxonRank {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Species => "SPECIES",
            Self::SubspecificAggregate => "SUBSPECIFICAGGREGATE",
            Self::Subspecies => "SUBSPECIES",
            Self::Variety => "VARIETY",
            Self::Subvariety => "SUBVARIETY",
            Self::Form => "FORM",
            Self::Subform => "SUBFORM",
            Self::Other(rank) => rank,
        }
    }

    /// Ranks below species that roll up to a species
    pub fn is_infraspecific(&self) -> bool {
        matches!(
            self,
            Self::SubspecificAggregate
                | Self::Subspecies
                | Self::Variety
                | Self::Subvariety
                | Self::Form
                | Self::Subform
        )
    }
}

impl FromStr for TaxonRank {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "SPECIES" => Self::Species,
            "SUBSPECIFICAGGREGATE" | "SUBSPECIFIC_AGGREGATE" => Self::SubspecificAggregate,
            "SUBSPECIES" => Self::Subspecies,
            "VARIETY" => Self::Variety,
            "SUBVARIETY" => Self::Subvariety,
            "FORM" => Self::Form,
            "SUBFORM" => Self::Subform,
            _ => Self::Other(upper),
        })
    }
}

impl fmt::Display for TaxonRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaxonRank {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaxonRank {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|never: Infallible| match never {}))
    }
}

/// Taxonomic status of a name usage
///
/// Anything other than ACCEPTED or DOUBTFUL belongs to the synonym family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxonomicStatus {
    Accepted,
    Doubtful,
    Synonym,
    HeterotypicSynonym,
    HomotypicSynonym,
    ProparteSynonym,
    Misapplied,
    Other(String),
}

impl TaxonomicStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Doubtful => "DOUBTFUL",
            Self::Synonym => "SYNONYM",
            Self::HeterotypicSynonym => "HETEROTYPIC_SYNONYM",
            Self::HomotypicSynonym => "HOMOTYPIC_SYNONYM",
            Self::ProparteSynonym => "PROPARTE_SYNONYM",
            Self::Misapplied => "MISAPPLIED",
            Self::Other(status) => status,
        }
    }

    pub fn is_accepted_or_doubtful(&self) -> bool {
        matches!(self, Self::Accepted | Self::Doubtful)
    }

    pub fn is_synonym_family(&self) -> bool {
        !self.is_accepted_or_doubtful()
    }
}

impl FromStr for TaxonomicStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace(' ', "_");
        Ok(match upper.as_str() {
            "ACCEPTED" => Self::Accepted,
            "DOUBTFUL" => Self::Doubtful,
            "SYNONYM" => Self::Synonym,
            "HETEROTYPIC_SYNONYM" => Self::HeterotypicSynonym,
            "HOMOTYPIC_SYNONYM" => Self::HomotypicSynonym,
            "PROPARTE_SYNONYM" => Self::ProparteSynonym,
            "MISAPPLIED" => Self::Misapplied,
            _ => Self::Other(upper),
        })
    }
}

impl fmt::Display for TaxonomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaxonomicStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaxonomicStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|never: Infallible| match never {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxon_key_conversion() {
        let key = TaxonKey::from(2366634u64);
        let back: u64 = key.into();
        assert_eq!(back, 2366634);
        assert_eq!(key.to_string(), "2366634");
        assert_eq!(TaxonKey::try_from(-1i64), Err(-1));
    }

    #[test]
    fn test_rank_parsing_is_case_insensitive() {
        assert_eq!("species".parse::<TaxonRank>().unwrap(), TaxonRank::Species);
        assert_eq!(" Subspecies ".parse::<TaxonRank>().unwrap(), TaxonRank::Subspecies);
        assert_eq!(
            "genus".parse::<TaxonRank>().unwrap(),
            TaxonRank::Other("GENUS".to_string())
        );
    }

    #[test]
    fn test_infraspecific_ranks() {
        for rank in ["SUBSPECIFICAGGREGATE", "SUBSPECIES", "VARIETY", "SUBVARIETY", "FORM", "SUBFORM"] {
            assert!(rank.parse::<TaxonRank>().unwrap().is_infraspecific(), "{}", rank);
        }
        assert!(!TaxonRank::Species.is_infraspecific());
        assert!(!TaxonRank::Other("GENUS".to_string()).is_infraspecific());
    }

    #[test]
    fn test_status_families() {
        let accepted: TaxonomicStatus = "ACCEPTED".parse().unwrap();
        let doubtful: TaxonomicStatus = "doubtful".parse().unwrap();
        let homotypic: TaxonomicStatus = "homotypic synonym".parse().unwrap();
        let unknown: TaxonomicStatus = "INTERMEDIATE_RANK_SYNONYM".parse().unwrap();

        assert!(accepted.is_accepted_or_doubtful());
        assert!(doubtful.is_accepted_or_doubtful());
        assert_eq!(homotypic, TaxonomicStatus::HomotypicSynonym);
        assert!(homotypic.is_synonym_family());
        assert!(unknown.is_synonym_family());
        assert_eq!(unknown.as_str(), "INTERMEDIATE_RANK_SYNONYM");
    }

    #[test]
    fn test_serde_uses_backbone_strings() {
        let json = serde_json::to_string(&TaxonomicStatus::ProparteSynonym).unwrap();
        assert_eq!(json, "\"PROPARTE_SYNONYM\"");
        let rank: TaxonRank = serde_json::from_str("\"VARIETY\"").unwrap();
        assert_eq!(rank, TaxonRank::Variety);
    }
}
