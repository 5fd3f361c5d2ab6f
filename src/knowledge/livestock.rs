use crate::models::Priority;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementCategory {
    Health,
    Breeding,
    Nutrition,
    Housing,
}

impl ManagementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagementCategory::Health => "health",
            ManagementCategory::Breeding => "breeding",
            ManagementCategory::Nutrition => "nutrition",
            ManagementCategory::Housing => "housing",
        }
    }
}

impl std::fmt::Display for ManagementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring management task tied to a calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementTask {
    /// Calendar month, 1-12.
    pub month: u32,
    pub category: ManagementCategory,
    pub task: String,
    pub priority: Priority,
    pub age_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthBenchmark {
    pub metric: String,
    /// Optimal [min, max] range.
    pub range: [f64; 2],
    pub unit: String,
    pub check_frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingAges {
    pub female_months: u32,
    pub male_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingCalendar {
    /// Calendar months (1-12) best suited for breeding.
    pub optimal_months: Vec<u32>,
    pub gestation_days: u32,
    pub breeding_age: BreedingAges,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionRequirement {
    pub life_stage: String,
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthIssue {
    pub issue: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub seasonal_risk: Option<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub treatment: Vec<String>,
}

/// Husbandry reference profile for one species. Informational lookups
/// only; the recommender pipeline does not consume these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivestockProfile {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub breeds: Vec<String>,
    #[serde(default)]
    pub management_calendar: Vec<ManagementTask>,
    #[serde(default)]
    pub health_benchmarks: Vec<HealthBenchmark>,
    pub breeding: Option<BreedingCalendar>,
    #[serde(default)]
    pub nutrition: Vec<NutritionRequirement>,
    #[serde(default)]
    pub common_issues: Vec<HealthIssue>,
}

impl LivestockProfile {
    /// Management tasks scheduled for a calendar month.
    pub fn tasks_for_month(&self, month: u32) -> Vec<&ManagementTask> {
        self.management_calendar
            .iter()
            .filter(|t| t.month == month)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn tasks_filtered_by_month() {
        let profile = LivestockProfile {
            name: "Cattle".to_string(),
            aliases: Vec::new(),
            breeds: Vec::new(),
            management_calendar: vec![
                ManagementTask {
                    month: 3,
                    category: ManagementCategory::Health,
                    task: "Spring vaccinations".to_string(),
                    priority: Priority::High,
                    age_group: None,
                },
                ManagementTask {
                    month: 5,
                    category: ManagementCategory::Breeding,
                    task: "Begin breeding season".to_string(),
                    priority: Priority::Medium,
                    age_group: Some("mature".to_string()),
                },
            ],
            health_benchmarks: Vec::new(),
            breeding: None,
            nutrition: Vec::new(),
            common_issues: Vec::new(),
        };

        assert_eq!(profile.tasks_for_month(3).len(), 1);
        assert_eq!(profile.tasks_for_month(5)[0].category.as_str(), "breeding");
        assert!(profile.tasks_for_month(12).is_empty());
    }
}
