use super::{Recommender, RecommenderContext};
use crate::logic::constants::{
    IRRIGATION_DEPTH_MAX_IN, IRRIGATION_DEPTH_MIN_IN, IRRIGATION_EXPIRY_DAYS,
    IRRIGATION_WINDOW_DAYS, PRECIP_7DAY_CRITICAL_IN, PRECIP_7DAY_LOW_IN,
};
use crate::models::{Confidence, GeneratedRecommendation, Priority, RecommendationType};
use chrono::Duration;
use tracing::debug;

/// Irrigation recommender driven by the 7-day precipitation forecast.
pub struct IrrigationRecommender;

impl Recommender for IrrigationRecommender {
    fn id(&self) -> &'static str {
        "irrigation"
    }

    fn name(&self) -> &'static str {
        "Irrigation"
    }

    fn evaluate(&self, ctx: &RecommenderContext) -> Vec<GeneratedRecommendation> {
        let weather = match ctx.weather.filter(|w| w.has_forecast()) {
            Some(w) => w,
            None => {
                debug!(farm = ctx.state.farm.id, "No precipitation forecast, skipping irrigation checks");
                return Vec::new();
            }
        };

        let forecast_in = weather.forecast_precip_in(7);
        if forecast_in >= PRECIP_7DAY_LOW_IN {
            return Vec::new();
        }

        let priority = if forecast_in < PRECIP_7DAY_CRITICAL_IN {
            Priority::High
        } else {
            Priority::Medium
        };

        ctx.state
            .fields
            .iter()
            .filter(|f| f.active_crop.is_some())
            .map(|field| {
                let crop_type = field
                    .active_crop
                    .as_ref()
                    .map(|c| c.crop_type.clone())
                    .unwrap_or_default();
                GeneratedRecommendation::new(
                    RecommendationType::Irrigation,
                    priority,
                    format!("Irrigate {}", field.name),
                    format!(
                        "Only {:.2}\" of rain is forecast over the next 7 days. {} will \
                         draw down soil moisture faster than the forecast replaces it.",
                        forecast_in, crop_type
                    ),
                    ctx.as_of + Duration::days(IRRIGATION_WINDOW_DAYS),
                )
                .for_field(field.id)
                .with_action(format!(
                    "Apply {:.1}-{:.1} inches of irrigation within {} days. Water early \
                     morning to limit evaporation.",
                    IRRIGATION_DEPTH_MIN_IN, IRRIGATION_DEPTH_MAX_IN, IRRIGATION_WINDOW_DAYS
                ))
                .with_impact("Prevents moisture stress during the forecast dry spell")
                .with_confidence(Confidence::Medium)
                .expires(ctx.as_of + Duration::days(IRRIGATION_EXPIRY_DAYS))
                .with_data("field_id", field.id)
                .with_data("forecast_precip_in", forecast_in)
            })
            .collect()
    }
}
