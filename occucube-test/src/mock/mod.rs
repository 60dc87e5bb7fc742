//! Mock implementations for testing

mod taxonomy;

pub use taxonomy::MockTaxonomyLookup;
