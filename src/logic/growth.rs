use crate::knowledge::{CropProfile, GrowthStage};
use crate::models::Crop;
use chrono::{DateTime, Utc};

/// Result of a growth-stage lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageLookup<'a> {
    /// Days-since-planting falls inside this stage's day range.
    Stage(&'a GrowthStage),
    /// Past the final stage's upper bound.
    Mature,
    /// Crop has no profile, or the value falls in a calendar gap.
    Unknown,
}

impl<'a> StageLookup<'a> {
    pub fn name(&self) -> &str {
        match self {
            StageLookup::Stage(stage) => &stage.name,
            StageLookup::Mature => "Mature",
            StageLookup::Unknown => "Unknown",
        }
    }

    pub fn stage(&self) -> Option<&'a GrowthStage> {
        match self {
            StageLookup::Stage(stage) => Some(stage),
            _ => None,
        }
    }
}

/// Whole days since planting, floored.
pub fn days_since_planting(crop: &Crop, as_of: DateTime<Utc>) -> i64 {
    let planted = crop
        .planting_date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(as_of);
    (as_of - planted).num_days()
}

/// Days until the expected harvest date, ceiling-rounded. Negative when
/// harvest is overdue.
pub fn days_until_harvest(crop: &Crop, as_of: DateTime<Utc>) -> i64 {
    let harvest = crop
        .expected_harvest_date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(as_of);
    let seconds = (harvest - as_of).num_seconds();
    (seconds as f64 / 86_400.0).ceil() as i64
}

/// Scan the stage calendar in order and return the first stage whose day
/// range contains `days`.
pub fn current_growth_stage(profile: Option<&CropProfile>, days: i64) -> StageLookup<'_> {
    let profile = match profile {
        Some(p) => p,
        None => return StageLookup::Unknown,
    };

    for stage in &profile.growth_stages {
        if stage.contains_day(days) {
            return StageLookup::Stage(stage);
        }
    }

    match profile.growth_stages.last() {
        Some(last) if days > last.day_range[1] as i64 => StageLookup::Mature,
        _ => StageLookup::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::models::CropStatus;
    use chrono::NaiveDate;

    fn corn_crop() -> Crop {
        Crop {
            id: 1,
            crop_type: "corn".to_string(),
            planting_date: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
            expected_harvest_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            status: CropStatus::Growing,
            yield_amount: None,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn days_since_planting_floors() {
        let crop = corn_crop();
        // Noon on the planting day is 0 whole days.
        assert_eq!(days_since_planting(&crop, at(2025, 4, 20)), 0);
        assert_eq!(days_since_planting(&crop, at(2025, 4, 21)), 1);
        assert_eq!(days_since_planting(&crop, at(2025, 6, 20)), 61);
    }

    #[test]
    fn days_until_harvest_ceils_and_goes_negative() {
        let crop = corn_crop();
        // Noon the day before harvest rounds up to a full day.
        assert_eq!(days_until_harvest(&crop, at(2025, 9, 30)), 1);
        assert_eq!(days_until_harvest(&crop, at(2025, 10, 1)), 0);
        assert!(days_until_harvest(&crop, at(2025, 10, 15)) < 0);
    }

    #[test]
    fn stage_lookup_scans_calendar_in_order() {
        let kb = KnowledgeBase::builtin().unwrap();
        let corn = kb.lookup_crop("corn");

        assert_eq!(current_growth_stage(corn, 5).name(), "Emergence");
        assert_eq!(current_growth_stage(corn, 50).name(), "Rapid Growth");
        assert_eq!(current_growth_stage(corn, 70).name(), "Silking");
    }

    #[test]
    fn stage_lookup_contains_days_since_planting() {
        let kb = KnowledgeBase::builtin().unwrap();
        let corn = kb.lookup_crop("corn").unwrap();
        for days in 0..=160 {
            let lookup = current_growth_stage(Some(corn), days);
            let stage = lookup.stage().expect("contiguous calendar");
            assert!(stage.contains_day(days), "day {} not in {}", days, stage.name);
        }
    }

    #[test]
    fn stage_lookup_sentinels() {
        let kb = KnowledgeBase::builtin().unwrap();
        let corn = kb.lookup_crop("corn");
        assert_eq!(current_growth_stage(corn, 500).name(), "Mature");
        assert_eq!(current_growth_stage(corn, -3).name(), "Unknown");
        assert_eq!(current_growth_stage(None, 50).name(), "Unknown");
    }
}
