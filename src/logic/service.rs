use super::engine::RecommendationEngine;
use crate::db::Database;
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::models::GeneratedRecommendation;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Ties the farm store to the engine: loads a snapshot, runs an
/// evaluation pass, and optionally persists the result as the farm's
/// active recommendation set.
pub struct RecommendationService {
    db: Database,
    engine: RecommendationEngine,
}

impl RecommendationService {
    pub fn new(db: Database, kb: Arc<KnowledgeBase>) -> Self {
        Self {
            db,
            engine: RecommendationEngine::new(kb),
        }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Generate the ranked recommendation list for a farm without writing
    /// anything. `as_of` defaults to now; pinning it makes the result
    /// reproducible.
    pub fn generate(
        &self,
        farm_id: i64,
        field_id: Option<i64>,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<GeneratedRecommendation>> {
        let as_of = as_of.unwrap_or_else(Utc::now);
        let state = self.db.load_farm_state(farm_id, field_id)?;
        let weather = self.db.load_weather_window(farm_id, as_of)?;
        let recs = self.engine.evaluate(&state, Some(&weather), as_of);
        info!(farm_id, count = recs.len(), "Generated recommendations");
        Ok(recs)
    }

    /// Generate and atomically replace the farm's active recommendation
    /// set. Persistence failures are hard errors; nothing is partially
    /// written.
    pub fn generate_and_save(
        &self,
        farm_id: i64,
        field_id: Option<i64>,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<GeneratedRecommendation>> {
        let recs = self.generate(farm_id, field_id, as_of)?;
        let saved = self.db.replace_active_recommendations(farm_id, &recs)?;
        info!(farm_id, saved, "Saved active recommendation set");
        Ok(recs)
    }
}
