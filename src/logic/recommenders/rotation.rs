use super::{Recommender, RecommenderContext};
use crate::logic::constants::{
    HARVEST_PREP_DAYS, ROTATION_HISTORY_SEASONS, ROTATION_LOOKAHEAD_DAYS, SOIL_TEST_COST,
    STARTER_CROP,
};
use crate::logic::growth::days_until_harvest;
use crate::models::{
    Confidence, Crop, Field, GeneratedRecommendation, Priority, RecommendationType,
};
use chrono::{Duration, Utc};
use tracing::debug;

/// Planting and rotation-timing recommender: harvest preparation, rotation
/// health for soon-to-finish crops, and next-crop suggestions for idle
/// fields.
pub struct RotationRecommender;

impl Recommender for RotationRecommender {
    fn id(&self) -> &'static str {
        "rotation"
    }

    fn name(&self) -> &'static str {
        "Planting & Rotation"
    }

    fn evaluate(&self, ctx: &RecommenderContext) -> Vec<GeneratedRecommendation> {
        let mut recs = Vec::new();

        for field in &ctx.state.fields {
            match &field.active_crop {
                Some(crop) => {
                    let days_out = days_until_harvest(crop, ctx.as_of);

                    if days_out <= HARVEST_PREP_DAYS {
                        recs.push(self.harvest_prep(ctx, field, crop, days_out));
                    }

                    if days_out <= ROTATION_LOOKAHEAD_DAYS {
                        self.rotation_planning(ctx, field, crop, &mut recs);
                    }
                }
                None => {
                    if let Some(rec) = self.idle_field(ctx, field) {
                        recs.push(rec);
                    }
                }
            }
        }

        recs
    }
}

impl RotationRecommender {
    fn harvest_prep(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop: &Crop,
        days_out: i64,
    ) -> GeneratedRecommendation {
        let (priority, note) = if days_out < 0 {
            (
                Priority::Urgent,
                format!("{} is {} days past its expected harvest date.", crop.crop_type, -days_out),
            )
        } else if days_out <= 7 {
            (
                Priority::High,
                format!("{} harvest is expected within {} days.", crop.crop_type, days_out),
            )
        } else {
            (
                Priority::Medium,
                format!("{} harvest is expected in about {} days.", crop.crop_type, days_out),
            )
        };

        let timing = if days_out < 0 {
            ctx.as_of
        } else {
            crop.expected_harvest_date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or_else(Utc::now)
        };

        GeneratedRecommendation::new(
            RecommendationType::Harvest,
            priority,
            format!("Prepare to harvest {}", field.name),
            note,
            timing,
        )
        .for_field(field.id)
        .with_action(
            "Service harvest equipment, confirm grain moisture targets, and line up \
             trucking and storage space.",
        )
        .with_impact("Field losses climb quickly once a crop stands past maturity")
        .with_confidence(Confidence::High)
        .with_data("field_id", field.id)
        .with_data("crop_id", crop.id)
        .with_data("days_until_harvest", days_out)
    }

    fn rotation_planning(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
        crop: &Crop,
        recs: &mut Vec<GeneratedRecommendation>,
    ) {
        let profile = match ctx.kb.lookup_crop(&crop.crop_type) {
            Some(p) => p,
            None => {
                debug!(crop = %crop.crop_type, field = field.id, "No crop profile, skipping rotation planning");
                return;
            }
        };

        let history = field.recent_crop_types(ROTATION_HISTORY_SEASONS);
        let monoculture = history.len() == ROTATION_HISTORY_SEASONS
            && history
                .iter()
                .all(|t| t.eq_ignore_ascii_case(&crop.crop_type));

        if monoculture {
            let alternatives = if profile.rotation.good_followers.is_empty() {
                "a different crop family".to_string()
            } else {
                profile.rotation.good_followers.join(" or ")
            };
            recs.push(
                GeneratedRecommendation::new(
                    RecommendationType::Planting,
                    Priority::Medium,
                    format!("Break the {} rotation in {}", crop.crop_type, field.name),
                    format!(
                        "{} has grown {} for {} straight seasons. Continuous cropping \
                         builds pest and disease pressure and mines the same nutrients.",
                        field.name, crop.crop_type, ROTATION_HISTORY_SEASONS
                    ),
                    ctx.as_of + Duration::days(30),
                )
                .for_field(field.id)
                .with_action(format!("Plan {} for this field next season.", alternatives))
                .with_impact("Rotation typically recovers 5-15% yield versus continuous cropping")
                .with_confidence(Confidence::High)
                .with_data("field_id", field.id)
                .with_data("consecutive_seasons", ROTATION_HISTORY_SEASONS as i64)
                .with_data("crop_type", crop.crop_type.clone()),
            );
        } else if !profile.rotation.good_followers.is_empty() {
            recs.push(
                GeneratedRecommendation::new(
                    RecommendationType::Planting,
                    Priority::Low,
                    format!("Plan next rotation for {}", field.name),
                    format!(
                        "With {} finishing soon, good follow crops are: {}.",
                        crop.crop_type,
                        profile.rotation.good_followers.join(", ")
                    ),
                    ctx.as_of + Duration::days(30),
                )
                .for_field(field.id)
                .with_action("Lock in seed for the preferred follower before early-order pricing ends.")
                .with_impact("Keeps the rotation working for soil health")
                .with_confidence(Confidence::Medium)
                .with_data("field_id", field.id)
                .with_data("good_followers", profile.rotation.good_followers.join(", ")),
            );
        }

        if !profile.rotation.avoid_after.is_empty() {
            recs.push(
                GeneratedRecommendation::new(
                    RecommendationType::Planting,
                    Priority::Low,
                    format!("Avoid problem follow crops in {}", field.name),
                    format!(
                        "After {}, avoid planting: {}. Shared pests and residue effects \
                         penalize these sequences.",
                        crop.crop_type,
                        profile.rotation.avoid_after.join(", ")
                    ),
                    ctx.as_of + Duration::days(30),
                )
                .for_field(field.id)
                .with_action("Exclude these crops when finalizing next season's plan.")
                .with_impact("Avoids known rotation penalties")
                .with_confidence(Confidence::High)
                .with_data("field_id", field.id)
                .with_data("avoid_after", profile.rotation.avoid_after.join(", ")),
            );
        }
    }

    fn idle_field(
        &self,
        ctx: &RecommenderContext,
        field: &Field,
    ) -> Option<GeneratedRecommendation> {
        match field.last_harvested_crop() {
            Some(last) => {
                let profile = ctx.kb.lookup_crop(&last.crop_type)?;
                let follower = profile.rotation.good_followers.first()?;
                Some(
                    GeneratedRecommendation::new(
                        RecommendationType::Planting,
                        Priority::Medium,
                        format!("Plant {} in {}", follower, field.name),
                        format!(
                            "{} is open after {}. {} is the recommended rotation follower.",
                            field.name, last.crop_type, follower
                        ),
                        ctx.as_of + Duration::days(14),
                    )
                    .for_field(field.id)
                    .with_action(format!(
                        "Plan {} for the coming season and order seed.",
                        follower
                    ))
                    .with_impact("Keeps the field productive and the rotation intact")
                    .with_confidence(Confidence::Medium)
                    .with_data("field_id", field.id)
                    .with_data("previous_crop", last.crop_type.clone())
                    .with_data("suggested_crop", follower.clone()),
                )
            }
            None => Some(
                GeneratedRecommendation::new(
                    RecommendationType::Planting,
                    Priority::Medium,
                    format!("Establish a baseline for {}", field.name),
                    format!(
                        "{} has no cropping history on record. Start with a soil test, \
                         then consider {} as a soil-building first crop.",
                        field.name, STARTER_CROP
                    ),
                    ctx.as_of + Duration::days(14),
                )
                .for_field(field.id)
                .with_action(format!(
                    "Soil test the field, then plan {} for the first season.",
                    STARTER_CROP
                ))
                .with_impact("Baseline data makes every later recommendation sharper")
                .with_confidence(Confidence::Low)
                .with_cost(SOIL_TEST_COST)
                .with_data("field_id", field.id)
                .with_data("suggested_crop", STARTER_CROP),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::models::{CropStatus, Farm, FarmState};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn crop(crop_type: &str, harvest: NaiveDate, status: CropStatus) -> Crop {
        Crop {
            id: 10,
            crop_type: crop_type.to_string(),
            planting_date: harvest - Duration::days(150),
            expected_harvest_date: harvest,
            status,
            yield_amount: Some(170.0),
        }
    }

    fn field(active: Option<Crop>, history: Vec<Crop>) -> Field {
        Field {
            id: 1,
            name: "North 40".to_string(),
            area_acres: 40.0,
            soil_type: None,
            active_crop: active,
            crop_history: history,
            soil_sample: None,
            vegetation: None,
        }
    }

    fn run(field: Field, as_of: chrono::DateTime<Utc>) -> Vec<GeneratedRecommendation> {
        let kb = KnowledgeBase::builtin().unwrap();
        let state = FarmState {
            farm: Farm {
                id: 1,
                name: "Test Farm".to_string(),
                latitude: 41.9,
                longitude: -93.5,
                region: "Midwest".to_string(),
            },
            fields: vec![field],
            transactions: Vec::new(),
        };
        let ctx = RecommenderContext {
            kb: &kb,
            state: &state,
            weather: None,
            as_of,
        };
        RotationRecommender.evaluate(&ctx)
    }

    #[test]
    fn imminent_harvest_gets_high_priority_prep() {
        let harvest = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap();
        let f = field(Some(crop("corn", harvest, CropStatus::Growing)), Vec::new());
        let as_of = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        let recs = run(f, as_of);
        let prep: Vec<_> = recs
            .iter()
            .filter(|r| r.rec_type == RecommendationType::Harvest)
            .collect();
        assert_eq!(prep.len(), 1);
        assert_eq!(prep[0].priority, Priority::High);
    }

    #[test]
    fn overdue_harvest_is_urgent() {
        let harvest = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap();
        let f = field(Some(crop("corn", harvest, CropStatus::Growing)), Vec::new());
        let as_of = Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap();
        let recs = run(f, as_of);
        let prep: Vec<_> = recs
            .iter()
            .filter(|r| r.rec_type == RecommendationType::Harvest)
            .collect();
        assert_eq!(prep[0].priority, Priority::Urgent);
    }

    #[test]
    fn monoculture_history_warns_to_break_rotation() {
        let harvest = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap();
        let history: Vec<Crop> = (1..=3)
            .map(|i| {
                crop(
                    "corn",
                    NaiveDate::from_ymd_opt(2025 - i, 10, 10).unwrap(),
                    CropStatus::Harvested,
                )
            })
            .collect();
        let f = field(Some(crop("corn", harvest, CropStatus::Growing)), history);
        let as_of = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        let recs = run(f, as_of);
        let breaks: Vec<_> = recs
            .iter()
            .filter(|r| r.title.starts_with("Break the"))
            .collect();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].priority, Priority::Medium);
        // Named alternatives come from the knowledge base.
        assert!(breaks[0].action_required.contains("Soybeans"));
    }

    #[test]
    fn mixed_history_suggests_followers_at_low_priority() {
        let harvest = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap();
        let history = vec![
            crop(
                "soybeans",
                NaiveDate::from_ymd_opt(2024, 10, 10).unwrap(),
                CropStatus::Harvested,
            ),
            crop(
                "corn",
                NaiveDate::from_ymd_opt(2023, 10, 10).unwrap(),
                CropStatus::Harvested,
            ),
        ];
        let f = field(Some(crop("corn", harvest, CropStatus::Growing)), history);
        let as_of = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        let recs = run(f, as_of);
        assert!(recs
            .iter()
            .any(|r| r.title.starts_with("Plan next rotation") && r.priority == Priority::Low));
        // Corn lists itself as a crop to avoid repeating.
        assert!(recs
            .iter()
            .any(|r| r.supporting_data.contains_key("avoid_after")));
    }

    #[test]
    fn distant_harvest_stays_quiet() {
        let harvest = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap();
        let f = field(Some(crop("corn", harvest, CropStatus::Growing)), Vec::new());
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(run(f, as_of).is_empty());
    }

    #[test]
    fn idle_field_gets_follower_of_last_crop() {
        let last = crop(
            "corn",
            NaiveDate::from_ymd_opt(2024, 10, 10).unwrap(),
            CropStatus::Harvested,
        );
        let f = field(None, vec![last]);
        let as_of = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let recs = run(f, as_of);
        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs[0].supporting_data.get("suggested_crop").unwrap(),
            "Soybeans"
        );
    }

    #[test]
    fn bare_field_gets_baseline_plan() {
        let f = field(None, Vec::new());
        let as_of = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let recs = run(f, as_of);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, Confidence::Low);
        assert!(recs[0].description.contains("soil test"));
    }
}
