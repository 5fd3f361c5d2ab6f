use crate::models::Priority;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Benchmark yields for one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkYield {
    pub average: f64,
    pub top_25: f64,
    pub top_10: f64,
    pub unit: String,
}

/// A named phase of the crop lifecycle, defined by an inclusive
/// days-since-planting range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStage {
    pub name: String,
    /// Inclusive [min, max] days since planting.
    pub day_range: [u32; 2],
    #[serde(default)]
    pub critical_factors: Vec<String>,
    #[serde(default)]
    pub common_issues: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl GrowthStage {
    pub fn contains_day(&self, days: i64) -> bool {
        days >= self.day_range[0] as i64 && days <= self.day_range[1] as i64
    }
}

/// Soil nutrient requirements during one growth stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientNeed {
    pub stage: String,
    pub nitrogen_ppm: f64,
    pub phosphorus_ppm: f64,
    pub potassium_ppm: f64,
    /// True when a deficit during this stage has outsized yield impact.
    #[serde(default)]
    pub critical_period: bool,
}

/// A pest and the window during which it is likely to strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PestRisk {
    pub pest: String,
    /// Free-text risk window, e.g. "45-65 days after planting",
    /// "Emergence and late season", "June". Parsed heuristically.
    pub risk_period: String,
    /// Regions where this pest applies; empty means region-agnostic.
    #[serde(default)]
    pub regions: Vec<String>,
    pub severity: Priority,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub treatment: Vec<String>,
}

/// A disease together with the weather conditions that favor it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseRisk {
    pub disease: String,
    pub trigger_conditions: Vec<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    /// Growth stage during which this disease does the most damage.
    pub critical_stage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageProfile {
    /// Storage cost per yield unit per month.
    pub cost_per_unit: f64,
    /// Calendar month (1-12) with the best expected sell price.
    pub optimal_sell_month: u32,
    pub max_storage_days: u32,
}

/// Seasonal price pattern, normalized so 1.0 is the yearly average.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPattern {
    pub harvest_peak_month: u32,
    /// Relative price for each calendar month, January first.
    pub monthly_relative_price: Vec<f64>,
    pub storage: StorageProfile,
}

impl MarketPattern {
    /// Relative price for a 1-based calendar month.
    pub fn relative_price(&self, month: u32) -> Option<f64> {
        if (1..=12).contains(&month) {
            self.monthly_relative_price.get(month as usize - 1).copied()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationProfile {
    #[serde(default)]
    pub good_followers: Vec<String>,
    #[serde(default)]
    pub avoid_after: Vec<String>,
    #[serde(default)]
    pub soil_benefits: Vec<String>,
}

/// Full agronomic profile for one crop, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Optimal soil pH band [min, max]. Falls back to 6.0-7.0 when absent.
    pub optimal_ph: Option<[f64; 2]>,
    /// Benchmark yields keyed by region name; "National" is the fallback.
    #[serde(default)]
    pub benchmark_yields: BTreeMap<String, BenchmarkYield>,
    pub growth_stages: Vec<GrowthStage>,
    #[serde(default)]
    pub nutrient_needs: Vec<NutrientNeed>,
    #[serde(default)]
    pub pest_risks: Vec<PestRisk>,
    #[serde(default)]
    pub disease_risks: Vec<DiseaseRisk>,
    pub market_pattern: Option<MarketPattern>,
    #[serde(default)]
    pub rotation: RotationProfile,
}

pub const DEFAULT_PH_RANGE: [f64; 2] = [6.0, 7.0];

impl CropProfile {
    pub fn ph_range(&self) -> [f64; 2] {
        self.optimal_ph.unwrap_or(DEFAULT_PH_RANGE)
    }

    pub fn stage_by_name(&self, name: &str) -> Option<&GrowthStage> {
        self.growth_stages
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Nutrient needs for a stage, if the profile lists any.
    pub fn nutrient_need_for_stage(&self, stage: &str) -> Option<&NutrientNeed> {
        self.nutrient_needs
            .iter()
            .find(|n| n.stage.eq_ignore_ascii_case(stage))
    }

    /// Pests applicable to a region (region-specific plus region-agnostic).
    pub fn pests_for_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a PestRisk> {
        self.pest_risks.iter().filter(move |p| {
            p.regions.is_empty() || p.regions.iter().any(|r| r.eq_ignore_ascii_case(region))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_day_containment_is_inclusive() {
        let stage = GrowthStage {
            name: "Emergence".to_string(),
            day_range: [0, 14],
            critical_factors: Vec::new(),
            common_issues: Vec::new(),
            actions: Vec::new(),
        };
        assert!(stage.contains_day(0));
        assert!(stage.contains_day(14));
        assert!(!stage.contains_day(15));
        assert!(!stage.contains_day(-1));
    }

    #[test]
    fn relative_price_is_one_based() {
        let pattern = MarketPattern {
            harvest_peak_month: 10,
            monthly_relative_price: vec![
                1.10, 1.12, 1.15, 1.08, 1.02, 0.98, 0.95, 0.92, 0.90, 0.88, 0.95, 1.05,
            ],
            storage: StorageProfile {
                cost_per_unit: 0.05,
                optimal_sell_month: 3,
                max_storage_days: 240,
            },
        };
        assert_eq!(pattern.relative_price(1), Some(1.10));
        assert_eq!(pattern.relative_price(10), Some(0.88));
        assert_eq!(pattern.relative_price(0), None);
        assert_eq!(pattern.relative_price(13), None);
    }
}
