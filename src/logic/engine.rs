use super::prioritizer;
use super::recommenders::{
    FertilityRecommender, FinancialRecommender, IrrigationRecommender, PestDiseaseRecommender,
    Recommender, RecommenderContext, RotationRecommender,
};
use crate::knowledge::KnowledgeBase;
use crate::models::{FarmState, GeneratedRecommendation, WeatherWindow};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs the five domain recommenders over a farm snapshot and ranks the
/// combined output.
///
/// Evaluation is pure and deterministic: the same snapshot and `as_of`
/// always produce the same ranked list. Recommenders run in a fixed
/// registration order so that ties in the ranking keys preserve a stable,
/// reproducible order.
pub struct RecommendationEngine {
    kb: Arc<KnowledgeBase>,
    recommenders: Vec<Box<dyn Recommender>>,
}

impl RecommendationEngine {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        let recommenders: Vec<Box<dyn Recommender>> = vec![
            Box::new(FertilityRecommender),
            Box::new(IrrigationRecommender),
            Box::new(PestDiseaseRecommender),
            Box::new(FinancialRecommender),
            Box::new(RotationRecommender),
        ];
        Self { kb, recommenders }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn list_recommenders(&self) -> Vec<(&'static str, &'static str)> {
        self.recommenders.iter().map(|r| (r.id(), r.name())).collect()
    }

    /// Evaluate all recommenders against a snapshot and return the ranked
    /// result. Missing reference data or observations degrade individual
    /// candidates; they never abort the pass.
    pub fn evaluate(
        &self,
        state: &FarmState,
        weather: Option<&WeatherWindow>,
        as_of: DateTime<Utc>,
    ) -> Vec<GeneratedRecommendation> {
        for field in &state.fields {
            if let Some(crop) = &field.active_crop {
                if self.kb.lookup_crop(&crop.crop_type).is_none() {
                    warn!(
                        crop = %crop.crop_type,
                        field = field.id,
                        "Crop has no knowledge-base profile; profile-driven checks skipped"
                    );
                }
            }
        }

        let ctx = RecommenderContext {
            kb: &self.kb,
            state,
            weather,
            as_of,
        };

        let mut all = Vec::new();
        for recommender in &self.recommenders {
            let candidates = recommender.evaluate(&ctx);
            debug!(
                recommender = recommender.id(),
                candidates = candidates.len(),
                "Recommender pass complete"
            );
            all.extend(candidates);
        }

        prioritizer::rank(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Crop, CropStatus, Farm, Field, FinancialTransaction, SoilSample, VegetationIndexReading,
    };
    use chrono::{NaiveDate, TimeZone};

    fn full_state() -> FarmState {
        FarmState {
            farm: Farm {
                id: 1,
                name: "Prairie Creek".to_string(),
                latitude: 41.9,
                longitude: -93.5,
                region: "Midwest".to_string(),
            },
            fields: vec![Field {
                id: 1,
                name: "North 40".to_string(),
                area_acres: 40.0,
                soil_type: Some("loam".to_string()),
                active_crop: Some(Crop {
                    id: 10,
                    crop_type: "corn".to_string(),
                    planting_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                    expected_harvest_date: NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
                    status: CropStatus::Growing,
                    yield_amount: None,
                }),
                crop_history: Vec::new(),
                soil_sample: Some(SoilSample {
                    ph: 6.4,
                    nitrogen_ppm: 40.0,
                    phosphorus_ppm: 40.0,
                    potassium_ppm: 120.0,
                    sample_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                }),
                vegetation: Some(VegetationIndexReading {
                    value: 0.42,
                    capture_date: Utc.with_ymd_and_hms(2025, 6, 18, 0, 0, 0).unwrap(),
                }),
            }],
            transactions: vec![FinancialTransaction {
                category: "fertilizer".to_string(),
                amount: 900.0,
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            }],
        }
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(KnowledgeBase::builtin().unwrap()))
    }

    #[test]
    fn output_is_ranked() {
        let engine = engine();
        let state = full_state();
        let as_of = Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap();
        let recs = engine.evaluate(&state, None, as_of);
        assert!(!recs.is_empty());
        for pair in recs.windows(2) {
            assert!(pair[0].priority.rank() >= pair[1].priority.rank());
            if pair[0].priority.rank() == pair[1].priority.rank() {
                assert!(pair[0].optimal_timing <= pair[1].optimal_timing);
            }
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let engine = engine();
        let state = full_state();
        let as_of = Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap();
        let first = engine.evaluate(&state, None, as_of);
        let second = engine.evaluate(&state, None, as_of);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.priority, b.priority);
            assert_eq!(a.optimal_timing, b.optimal_timing);
            assert_eq!(a.supporting_data, b.supporting_data);
        }
    }

    #[test]
    fn unknown_crop_still_yields_other_fields() {
        let engine = engine();
        let mut state = full_state();
        state.fields.push(Field {
            id: 2,
            name: "Mystery".to_string(),
            area_acres: 10.0,
            soil_type: None,
            active_crop: Some(Crop {
                id: 11,
                crop_type: "dragonfruit".to_string(),
                planting_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                expected_harvest_date: NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
                status: CropStatus::Growing,
                yield_amount: None,
            }),
            crop_history: Vec::new(),
            soil_sample: None,
            vegetation: None,
        });
        let as_of = Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap();
        let recs = engine.evaluate(&state, None, as_of);
        // Field 1 candidates still present.
        assert!(recs.iter().any(|r| r.field_id == Some(1)));
    }

    #[test]
    fn five_recommenders_registered() {
        let engine = engine();
        let ids: Vec<&str> = engine.list_recommenders().iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec!["fertility", "irrigation", "pest_disease", "financial", "rotation"]
        );
    }
}
