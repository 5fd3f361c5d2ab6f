use super::{Recommender, RecommenderContext};
use crate::knowledge::{DiseaseRisk, PestRisk};
use crate::logic::constants::{NDVI_URGENT_BELOW, NDVI_WARN_BELOW};
use crate::logic::growth::{current_growth_stage, days_since_planting};
use crate::logic::risk::{conditions_match, is_in_risk_window};
use crate::models::{
    Confidence, Field, GeneratedRecommendation, Priority, RecommendationType,
    VegetationIndexReading,
};
use chrono::{Datelike, Duration};
use tracing::debug;

/// Pest and disease recommender: knowledge-base risk windows, weather-driven
/// disease conditions, and vegetation-index stress triage.
pub struct PestDiseaseRecommender;

impl Recommender for PestDiseaseRecommender {
    fn id(&self) -> &'static str {
        "pest_disease"
    }

    fn name(&self) -> &'static str {
        "Pest & Disease"
    }

    fn evaluate(&self, ctx: &RecommenderContext) -> Vec<GeneratedRecommendation> {
        let mut recs = Vec::new();
        let current_month = ctx.as_of.month();

        for field in &ctx.state.fields {
            let crop = match &field.active_crop {
                Some(crop) => crop,
                None => continue,
            };

            // Vegetation triage needs no crop profile; it runs off the
            // satellite reading alone.
            if let Some(reading) = &field.vegetation {
                if let Some(rec) = self.vegetation_triage(ctx, field, reading) {
                    recs.push(rec);
                }
            }

            let profile = match ctx.kb.lookup_crop(&crop.crop_type) {
                Some(p) => p,
                None => {
                    debug!(crop = %crop.crop_type, field = field.id, "No crop profile, skipping pest/disease checks");
                    continue;
                }
            };

            let days = days_since_planting(crop, ctx.as_of);
            for pest in profile.pests_for_region(&ctx.state.farm.region) {
                if is_in_risk_window(&pest.risk_period, days, current_month) {
                    recs.push(self.pest_alert(ctx, field, &crop.crop_type, pest, days));
                }
            }

            if let Some(weather) = ctx.weather.filter(|w| w.has_trailing_data()) {
                let stage = current_growth_stage(Some(profile), days);
                for disease in &profile.disease_risks {
                    if disease.critical_stage.eq_ignore_ascii_case(stage.name())
                        && conditions_match(&disease.trigger_conditions, weather)
                    {
                        recs.push(self.disease_alert(ctx, field, &crop.crop_type, disease));
                    }
                }
            }
        }

        recs
    }
}

impl PestDiseaseRecommender {
    fn pest_alert(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop_type: &str,
        pest: &PestRisk,
        days: i64,
    ) -> GeneratedRecommendation {
        let action = if pest.treatment.is_empty() {
            format!("Scout {} for {} and confirm pressure.", field.name, pest.pest)
        } else {
            format!(
                "Scout {} for {}. If found: {}",
                field.name,
                pest.pest,
                pest.treatment.join("; ")
            )
        };

        let mut rec = GeneratedRecommendation::new(
            RecommendationType::PestControl,
            pest.severity,
            format!("{} risk in {}", pest.pest, field.name),
            format!(
                "{} is {} days after planting, inside the {} risk window ({}).",
                crop_type, days, pest.pest, pest.risk_period
            ),
            ctx.as_of + Duration::days(2),
        )
        .for_field(field.id)
        .with_action(action)
        .with_impact("Early detection keeps treatment cheap and localized")
        .with_confidence(Confidence::Medium)
        .with_data("field_id", field.id)
        .with_data("pest", pest.pest.clone())
        .with_data("risk_period", pest.risk_period.clone())
        .with_data("days_since_planting", days);

        if !pest.prevention.is_empty() {
            rec = rec.with_data("prevention", pest.prevention.join("; "));
        }
        rec
    }

    fn disease_alert(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop_type: &str,
        disease: &DiseaseRisk,
    ) -> GeneratedRecommendation {
        let symptoms = if disease.symptoms.is_empty() {
            String::new()
        } else {
            format!(" Watch for: {}.", disease.symptoms.join(", "))
        };

        GeneratedRecommendation::new(
            RecommendationType::PestControl,
            Priority::High,
            format!("{} conditions in {}", disease.disease, field.name),
            format!(
                "Recent weather matches the trigger conditions for {} and the {} \
                 crop is in its critical stage ({}).{}",
                disease.disease, crop_type, disease.critical_stage, symptoms
            ),
            // Next-day action.
            ctx.as_of + Duration::days(1),
        )
        .for_field(field.id)
        .with_action(if disease.prevention.is_empty() {
            format!("Inspect {} for early {} symptoms.", field.name, disease.disease)
        } else {
            disease.prevention.join("; ")
        })
        .with_impact("Preventative treatment beats curative once infection sets in")
        .with_confidence(Confidence::Medium)
        .with_data("field_id", field.id)
        .with_data("disease", disease.disease.clone())
        .with_data("critical_stage", disease.critical_stage.clone())
        .with_data("trigger_conditions", disease.trigger_conditions.join(", "))
    }

    fn vegetation_triage(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        reading: &VegetationIndexReading,
    ) -> Option<GeneratedRecommendation> {
        if reading.value < NDVI_URGENT_BELOW {
            Some(
                GeneratedRecommendation::new(
                    RecommendationType::PestControl,
                    Priority::Urgent,
                    format!("Severe vegetation stress in {}", field.name),
                    format!(
                        "Vegetation index {:.2} indicates severe canopy stress. Possible \
                         causes: pest outbreak, disease, drowning, or nutrient collapse.",
                        reading.value
                    ),
                    ctx.as_of,
                )
                .for_field(field.id)
                .with_action("Scout the field immediately and ground-truth the stressed zones.")
                .with_impact("Hours matter when canopy loss is this steep")
                .with_confidence(Confidence::High)
                .expires(ctx.as_of + Duration::hours(12))
                .with_data("field_id", field.id)
                .with_data("vegetation_index", reading.value)
                .with_data("threshold", NDVI_URGENT_BELOW),
            )
        } else if reading.value < NDVI_WARN_BELOW {
            Some(
                GeneratedRecommendation::new(
                    RecommendationType::PestControl,
                    Priority::High,
                    format!("Vegetation stress in {}", field.name),
                    format!(
                        "Vegetation index {:.2} is below the healthy range. The canopy \
                         is thinner than it should be for an active crop.",
                        reading.value
                    ),
                    ctx.as_of + Duration::days(1),
                )
                .for_field(field.id)
                .with_action("Walk the field within 48 hours and check the weakest zones first.")
                .with_impact("Catches developing problems before visible yield loss")
                .with_confidence(Confidence::Medium)
                .expires(ctx.as_of + Duration::hours(48))
                .with_data("field_id", field.id)
                .with_data("vegetation_index", reading.value)
                .with_data("threshold", NDVI_WARN_BELOW),
            )
        } else {
            None
        }
    }
}
