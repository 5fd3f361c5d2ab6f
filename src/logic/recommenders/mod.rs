pub mod fertility;
pub mod financial;
pub mod irrigation;
pub mod pest_disease;
pub mod rotation;

pub use fertility::FertilityRecommender;
pub use financial::FinancialRecommender;
pub use irrigation::IrrigationRecommender;
pub use pest_disease::PestDiseaseRecommender;
pub use rotation::RotationRecommender;

use crate::knowledge::KnowledgeBase;
use crate::models::{FarmState, GeneratedRecommendation, WeatherWindow};
use chrono::{DateTime, Utc};

/// Read-only inputs shared by every recommender for one generation pass.
pub struct RecommenderContext<'a> {
    pub kb: &'a KnowledgeBase,
    pub state: &'a FarmState,
    /// Resolved weather for the farm, when available. Recommenders that
    /// need it degrade gracefully when it is absent.
    pub weather: Option<&'a WeatherWindow>,
    pub as_of: DateTime<Utc>,
}

/// Trait for domain recommenders. Implementations are pure functions of
/// the context: no I/O, no shared mutable state, and deterministic output
/// for a fixed snapshot and `as_of`.
pub trait Recommender: Send + Sync {
    /// Unique identifier for this recommender
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate farm state and return zero or more candidates. Missing
    /// optional data must degrade the output, never fail it.
    fn evaluate(&self, ctx: &RecommenderContext) -> Vec<GeneratedRecommendation>;
}
