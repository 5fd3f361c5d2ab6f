use super::{Recommender, RecommenderContext};
use crate::logic::constants::{
    ASSUMED_GRAIN_PRICE_PER_BU, LIME_COST_PER_TON, LIME_TONS_PER_PH_UNIT, NITROGEN_COST_PER_LB,
    NITROGEN_DEFICIT_THRESHOLD_PPM, NITROGEN_RATE_FACTOR, SOIL_TEST_COST, SULFUR_COST_PER_LB,
    SULFUR_LBS_PER_PH_UNIT, YIELD_GAP_FRACTION,
};
use crate::logic::growth::{current_growth_stage, days_since_planting};
use crate::models::{
    Confidence, Field, GeneratedRecommendation, Priority, RecommendationType, SoilSample,
};
use chrono::Duration;
use tracing::debug;

/// Fertility and soil health recommender.
///
/// Covers soil-testing gaps, pH correction, in-season nitrogen deficits
/// during critical stages, and yield-gap diagnostics against regional
/// benchmarks.
pub struct FertilityRecommender;

impl Recommender for FertilityRecommender {
    fn id(&self) -> &'static str {
        "fertility"
    }

    fn name(&self) -> &'static str {
        "Fertility & Soil"
    }

    fn evaluate(&self, ctx: &RecommenderContext) -> Vec<GeneratedRecommendation> {
        let mut recs = Vec::new();

        for field in &ctx.state.fields {
            let crop = match &field.active_crop {
                Some(crop) => crop,
                None => {
                    recs.push(self.fallow_soil_test(ctx, field));
                    continue;
                }
            };

            let profile = match ctx.kb.lookup_crop(&crop.crop_type) {
                Some(p) => p,
                None => {
                    debug!(crop = %crop.crop_type, field = field.id, "No crop profile, skipping fertility checks");
                    continue;
                }
            };

            let days = days_since_planting(crop, ctx.as_of);
            let stage = current_growth_stage(Some(profile), days);
            let need = profile.nutrient_need_for_stage(stage.name());
            let critical_stage = need.map(|n| n.critical_period).unwrap_or(false);

            let sample = match &field.soil_sample {
                Some(sample) => sample,
                None => {
                    recs.push(self.missing_sample(ctx, field, &crop.crop_type, stage.name(), critical_stage));
                    continue;
                }
            };

            // pH correction
            let [ph_min, ph_max] = profile.ph_range();
            if sample.ph < ph_min {
                recs.push(self.lime_recommendation(ctx, field, sample, ph_min, ph_max));
            } else if sample.ph > ph_max {
                recs.push(self.sulfur_recommendation(ctx, field, sample, ph_min, ph_max));
            }

            // In-season nitrogen deficit during a critical stage
            if let Some(need) = need {
                let deficit = need.nitrogen_ppm - sample.nitrogen_ppm;
                if need.critical_period && deficit > NITROGEN_DEFICIT_THRESHOLD_PPM {
                    recs.push(self.nitrogen_deficit(
                        ctx,
                        field,
                        &crop.crop_type,
                        stage.name(),
                        deficit,
                    ));
                }
            }

            // Yield gap against the regional benchmark
            if let Some(benchmark) = ctx.kb.benchmark_yield(&crop.crop_type, &ctx.state.farm.region)
            {
                let recorded = field
                    .last_harvested_crop()
                    .filter(|c| c.crop_type.eq_ignore_ascii_case(&crop.crop_type))
                    .and_then(|c| c.yield_amount);
                if let Some(recorded) = recorded {
                    let threshold = benchmark.average * (1.0 - YIELD_GAP_FRACTION);
                    if recorded < threshold {
                        recs.push(self.yield_gap(
                            ctx,
                            field,
                            &crop.crop_type,
                            recorded,
                            benchmark.average,
                            &benchmark.unit,
                        ));
                    }
                }
            }
        }

        recs
    }
}

impl FertilityRecommender {
    fn fallow_soil_test(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
    ) -> GeneratedRecommendation {
        GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            Priority::Medium,
            format!("Soil test {} before next planting", field.name),
            format!(
                "{} has no active crop. A soil test now gives time to correct \
                 pH and nutrient levels before the next crop goes in.",
                field.name
            ),
            ctx.as_of + Duration::days(7),
        )
        .for_field(field.id)
        .with_action("Pull 10-15 soil cores across the field and submit for a standard fertility panel.")
        .with_impact("Avoids planting into unknown fertility conditions")
        .with_confidence(Confidence::Medium)
        .with_cost(SOIL_TEST_COST)
        .with_data("field_id", field.id)
    }

    fn missing_sample(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop_type: &str,
        stage: &str,
        critical_stage: bool,
    ) -> GeneratedRecommendation {
        let priority = if critical_stage {
            Priority::Urgent
        } else {
            Priority::High
        };
        let urgency_note = if critical_stage {
            format!(
                "{} is in {}, a nutrient-critical stage, and there is no soil data to manage it with.",
                crop_type, stage
            )
        } else {
            format!("{} is growing with no soil sample on record.", crop_type)
        };

        GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            priority,
            format!("No soil data for {}", field.name),
            urgency_note,
            ctx.as_of + Duration::days(2),
        )
        .for_field(field.id)
        .with_action("Collect a soil sample immediately so in-season nutrient decisions have a baseline.")
        .with_impact("Enables nutrient management during the current season")
        .with_confidence(Confidence::Low)
        .with_cost(SOIL_TEST_COST)
        .with_data("field_id", field.id)
        .with_data("growth_stage", stage)
        .with_data("critical_period", critical_stage)
    }

    fn lime_recommendation(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        sample: &SoilSample,
        ph_min: f64,
        ph_max: f64,
    ) -> GeneratedRecommendation {
        let tons = (ph_min - sample.ph) * LIME_TONS_PER_PH_UNIT * field.area_acres;
        let cost = tons * LIME_COST_PER_TON;

        GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            Priority::High,
            format!("Soil pH low in {}", field.name),
            format!(
                "Soil pH {:.1} is below the optimal {:.1}-{:.1} band. Acidic soil \
                 locks up phosphorus and reduces nutrient uptake.",
                sample.ph, ph_min, ph_max
            ),
            ctx.as_of + Duration::days(14),
        )
        .for_field(field.id)
        .with_action(format!(
            "Apply roughly {:.1} tons of ag lime across the field and retest next season.",
            tons
        ))
        .with_impact("Restores nutrient availability across the rotation")
        .with_confidence(Confidence::High)
        .with_cost(cost)
        .with_data("field_id", field.id)
        .with_data("soil_ph", sample.ph)
        .with_data("target_ph_min", ph_min)
        .with_data("target_ph_max", ph_max)
    }

    fn sulfur_recommendation(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        sample: &SoilSample,
        ph_min: f64,
        ph_max: f64,
    ) -> GeneratedRecommendation {
        let lbs = (sample.ph - ph_max) * SULFUR_LBS_PER_PH_UNIT * field.area_acres;
        let cost = lbs * SULFUR_COST_PER_LB;

        GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            Priority::High,
            format!("Soil pH high in {}", field.name),
            format!(
                "Soil pH {:.1} is above the optimal {:.1}-{:.1} band. Alkaline soil \
                 ties up iron, zinc and manganese.",
                sample.ph, ph_min, ph_max
            ),
            ctx.as_of + Duration::days(14),
        )
        .for_field(field.id)
        .with_action(format!(
            "Apply roughly {:.0} lbs of elemental sulfur across the field and retest next season.",
            lbs
        ))
        .with_impact("Corrects micronutrient availability")
        .with_confidence(Confidence::High)
        .with_cost(cost)
        .with_data("field_id", field.id)
        .with_data("soil_ph", sample.ph)
        .with_data("target_ph_min", ph_min)
        .with_data("target_ph_max", ph_max)
    }

    fn nitrogen_deficit(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop_type: &str,
        stage: &str,
        deficit_ppm: f64,
    ) -> GeneratedRecommendation {
        let rate_lb_acre = deficit_ppm * NITROGEN_RATE_FACTOR;
        let cost = rate_lb_acre * field.area_acres * NITROGEN_COST_PER_LB;

        GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            Priority::Urgent,
            format!("Nitrogen deficit in {}", field.name),
            format!(
                "Soil nitrogen is {:.0} ppm short of what {} needs during {}. \
                 Deficits during a critical stage translate directly into lost yield.",
                deficit_ppm, crop_type, stage
            ),
            // Same-day/next-day action.
            ctx.as_of + Duration::hours(12),
        )
        .for_field(field.id)
        .with_action(format!(
            "Side-dress approximately {:.0} lb N/acre within the next 24 hours.",
            rate_lb_acre
        ))
        .with_impact("Protects yield through the critical uptake window")
        .with_confidence(Confidence::High)
        .with_cost(cost)
        .with_data("field_id", field.id)
        .with_data("growth_stage", stage)
        .with_data("nitrogen_deficit_ppm", deficit_ppm)
        .with_data("rate_lb_per_acre", rate_lb_acre)
    }

    fn yield_gap(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop_type: &str,
        recorded: f64,
        benchmark: f64,
        unit: &str,
    ) -> GeneratedRecommendation {
        let gap = benchmark - recorded;
        let roi = gap * field.area_acres * ASSUMED_GRAIN_PRICE_PER_BU;

        GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            Priority::Medium,
            format!("Yield gap in {}", field.name),
            format!(
                "Last recorded {} yield ({:.0} {}) runs more than {:.0}% below the \
                 regional benchmark of {:.0} {}.",
                crop_type,
                recorded,
                unit,
                YIELD_GAP_FRACTION * 100.0,
                benchmark,
                unit
            ),
            ctx.as_of + Duration::days(30),
        )
        .for_field(field.id)
        .with_action(
            "Review fertility program, plant population and hybrid selection against \
             regional practice; tissue-test during the next critical stage.",
        )
        .with_impact(format!(
            "Closing the gap is worth an estimated ${:.0} per season",
            roi
        ))
        .with_confidence(Confidence::Medium)
        .with_roi(roi)
        .with_data("field_id", field.id)
        .with_data("recorded_yield", recorded)
        .with_data("benchmark_yield", benchmark)
    }
}
