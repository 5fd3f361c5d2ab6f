use super::{Recommender, RecommenderContext};
use crate::knowledge::MarketPattern;
use crate::logic::constants::{
    ASSUMED_GRAIN_PRICE_PER_BU, BULK_SAVINGS_RATE, INPUT_CATEGORIES, INPUT_SPEND_THRESHOLD,
    MARKET_LOOKAHEAD_DAYS, POOR_TIMING_GAP, STORAGE_GAIN_BUFFER, STORAGE_PRICE_GAP,
    TRANSACTION_WINDOW_DAYS,
};
use crate::logic::growth::days_until_harvest;
use crate::models::{
    Confidence, Crop, Field, GeneratedRecommendation, Priority, RecommendationType,
};
use chrono::{Datelike, Duration, Utc};
use tracing::debug;

/// Financial recommender: input purchasing patterns and harvest
/// market-timing analysis.
pub struct FinancialRecommender;

impl Recommender for FinancialRecommender {
    fn id(&self) -> &'static str {
        "financial"
    }

    fn name(&self) -> &'static str {
        "Financial & Market Timing"
    }

    fn evaluate(&self, ctx: &RecommenderContext) -> Vec<GeneratedRecommendation> {
        let mut recs = Vec::new();

        if let Some(rec) = self.bulk_purchasing(ctx) {
            recs.push(rec);
        }

        for field in &ctx.state.fields {
            let crop = match &field.active_crop {
                Some(crop) => crop,
                None => continue,
            };
            let days_out = days_until_harvest(crop, ctx.as_of);
            if !(0..=MARKET_LOOKAHEAD_DAYS).contains(&days_out) {
                continue;
            }
            let profile = match ctx.kb.lookup_crop(&crop.crop_type) {
                Some(p) => p,
                None => {
                    debug!(crop = %crop.crop_type, field = field.id, "No crop profile, skipping market timing");
                    continue;
                }
            };
            let pattern = match &profile.market_pattern {
                Some(p) => p,
                None => continue,
            };
            if let Some(rec) = self.market_timing(ctx, field, crop, pattern, days_out) {
                recs.push(rec);
            }
        }

        recs
    }
}

impl FinancialRecommender {
    /// Flag elevated recent spend on crop inputs as a bulk-purchasing
    /// opportunity.
    fn bulk_purchasing(&self, ctx: &RecommenderContext) -> Option<GeneratedRecommendation> {
        let cutoff = (ctx.as_of - Duration::days(TRANSACTION_WINDOW_DAYS)).date_naive();
        let input_spend: f64 = ctx
            .state
            .transactions
            .iter()
            .filter(|t| t.date >= cutoff)
            .filter(|t| {
                let cat = t.category.to_lowercase();
                INPUT_CATEGORIES.iter().any(|c| cat.contains(c))
            })
            .map(|t| t.amount)
            .sum();

        if input_spend <= INPUT_SPEND_THRESHOLD {
            return None;
        }

        let savings = input_spend * BULK_SAVINGS_RATE;
        Some(
            GeneratedRecommendation::new(
                RecommendationType::Financial,
                Priority::Medium,
                "Consolidate input purchases",
                format!(
                    "${:.0} spent on seed, fertilizer and pesticide in the last {} days. \
                     Volume pricing and early-order programs typically discount around \
                     {:.0}% at this spend level.",
                    input_spend,
                    TRANSACTION_WINDOW_DAYS,
                    BULK_SAVINGS_RATE * 100.0
                ),
                ctx.as_of + Duration::days(14),
            )
            .with_action(
                "Quote next season's input needs as a single bulk order across suppliers; \
                 ask about early-pay discounts.",
            )
            .with_impact(format!("Estimated ${:.0} in annual savings", savings))
            .with_confidence(Confidence::Medium)
            .with_roi(savings)
            .with_data("input_spend", input_spend)
            .with_data("threshold", INPUT_SPEND_THRESHOLD),
        )
    }

    /// Compare the harvest month's relative price against the optimal sell
    /// month. Exactly one outcome fires: store, sell at harvest, or a
    /// poor-timing warning.
    fn market_timing(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop: &Crop,
        pattern: &MarketPattern,
        days_out: i64,
    ) -> Option<GeneratedRecommendation> {
        let harvest_month = crop.expected_harvest_date.month();
        let harvest_price = pattern.relative_price(harvest_month)?;
        let sell_month = pattern.storage.optimal_sell_month;
        let optimal_price = pattern.relative_price(sell_month)?;
        let gap = optimal_price - harvest_price;

        let harvest_at = crop
            .expected_harvest_date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        // Estimated volume from the regional benchmark; absent a benchmark,
        // fall back to the field's own last recorded yield.
        let per_acre = ctx
            .kb
            .benchmark_yield(&crop.crop_type, &ctx.state.farm.region)
            .map(|b| b.average)
            .or_else(|| {
                field
                    .last_harvested_crop()
                    .filter(|c| c.crop_type.eq_ignore_ascii_case(&crop.crop_type))
                    .and_then(|c| c.yield_amount)
            });
        let volume = per_acre.map(|y| y * field.area_acres);

        let rec = if gap > STORAGE_PRICE_GAP {
            let months_stored = (sell_month + 12 - harvest_month) % 12;
            let months_stored = months_stored.max(1);
            let cost = volume.map(|v| v * pattern.storage.cost_per_unit * months_stored as f64);
            let gain =
                volume.map(|v| v * (gap - STORAGE_GAIN_BUFFER) * ASSUMED_GRAIN_PRICE_PER_BU);

            let mut rec = GeneratedRecommendation::new(
                RecommendationType::Financial,
                Priority::Medium,
                format!("Store {} instead of selling at harvest", crop.crop_type),
                format!(
                    "Relative price at harvest (month {}) is {:.2} vs {:.2} in the \
                     optimal sell month ({}). Storing captures most of that spread.",
                    harvest_month, harvest_price, optimal_price, sell_month
                ),
                harvest_at,
            )
            .for_field(field.id)
            .with_action(format!(
                "Line up on-farm or commercial storage before harvest; plan to market \
                 around month {}.",
                sell_month
            ))
            .with_impact("Captures the seasonal price spread net of storage cost")
            .with_confidence(Confidence::Medium)
            .with_data("field_id", field.id)
            .with_data("crop_id", crop.id)
            .with_data("price_gap", gap)
            .with_data("harvest_month", harvest_month)
            .with_data("optimal_sell_month", sell_month)
            .with_data("days_until_harvest", days_out);
            if let Some(cost) = cost {
                rec = rec.with_cost(cost);
            }
            if let Some(gain) = gain {
                rec = rec.with_roi(gain);
            }
            rec
        } else if gap < POOR_TIMING_GAP {
            GeneratedRecommendation::new(
                RecommendationType::Financial,
                Priority::High,
                format!("Poor market timing for {}", crop.crop_type),
                format!(
                    "The expected harvest month ({}) prices above the designated sell \
                     month ({}): relative {:.2} vs {:.2}. Holding grain past harvest \
                     would sell into a falling market.",
                    harvest_month, sell_month, harvest_price, optimal_price
                ),
                harvest_at,
            )
            .for_field(field.id)
            .with_action(
                "Do not plan on storage gains this season; price grain at or before \
                 harvest, or hedge now.",
            )
            .with_impact("Avoids storing into a weaker market")
            .with_confidence(Confidence::Medium)
            .with_data("field_id", field.id)
            .with_data("crop_id", crop.id)
            .with_data("price_gap", gap)
            .with_data("harvest_month", harvest_month)
            .with_data("optimal_sell_month", sell_month)
        } else {
            GeneratedRecommendation::new(
                RecommendationType::Financial,
                Priority::Medium,
                format!("Sell {} at harvest", crop.crop_type),
                format!(
                    "Harvest-month pricing (relative {:.2}) is close to the seasonal \
                     optimum ({:.2}); storage costs would eat the difference.",
                    harvest_price, optimal_price
                ),
                harvest_at,
            )
            .for_field(field.id)
            .with_action("Plan to deliver and price grain at harvest; skip storage this season.")
            .with_impact("Avoids storage cost with no offsetting price gain")
            .with_confidence(Confidence::Medium)
            .with_data("field_id", field.id)
            .with_data("crop_id", crop.id)
            .with_data("price_gap", gap)
            .with_data("harvest_month", harvest_month)
            .with_data("optimal_sell_month", sell_month)
        };

        Some(rec)
    }
}
