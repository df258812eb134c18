// Curated reference data

pub mod showcase;

pub use showcase::{catalog, MarketTrends, ShowcaseCase, ShowcaseCatalog};
