//! Input contracts consumed by the scoring engine.
//!
//! A scoring request is the triple `(Quote, EnrichmentBundle, ScoringContext)`.
//! All three are plain serde data: the engine never fetches or mutates them.

mod context;
mod enrichment;
mod quote;

pub use context::*;
pub use enrichment::*;
pub use quote::*;
