use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStatus {
    Planted,
    Growing,
    Harvested,
    Failed,
}

impl CropStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropStatus::Planted => "planted",
            CropStatus::Growing => "growing",
            CropStatus::Harvested => "harvested",
            CropStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "planted" => Some(CropStatus::Planted),
            "growing" => Some(CropStatus::Growing),
            "harvested" => Some(CropStatus::Harvested),
            "failed" => Some(CropStatus::Failed),
            _ => None,
        }
    }

    /// Whether a crop in this status is the field's current crop for
    /// recommendation purposes.
    pub fn is_active(&self) -> bool {
        matches!(self, CropStatus::Planted | CropStatus::Growing)
    }
}

impl std::fmt::Display for CropStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crop {
    pub id: i64,
    pub crop_type: String,
    pub planting_date: NaiveDate,
    pub expected_harvest_date: NaiveDate,
    pub status: CropStatus,
    /// Recorded yield for harvested crops, in the crop's benchmark unit.
    pub yield_amount: Option<f64>,
}

impl Crop {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilSample {
    pub ph: f64,
    pub nitrogen_ppm: f64,
    pub phosphorus_ppm: f64,
    pub potassium_ppm: f64,
    pub sample_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegetationIndexReading {
    /// NDVI-style vegetation index in [-1, 1]; higher is healthier.
    pub value: f64,
    pub capture_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: i64,
    pub name: String,
    pub area_acres: f64,
    pub soil_type: Option<String>,
    /// At most one planted/growing crop per field.
    pub active_crop: Option<Crop>,
    /// Prior crops, most recent first. Used for rotation analysis.
    pub crop_history: Vec<Crop>,
    pub soil_sample: Option<SoilSample>,
    pub vegetation: Option<VegetationIndexReading>,
}

impl Field {
    /// Crop types of the most recent `n` completed seasons, newest first.
    pub fn recent_crop_types(&self, n: usize) -> Vec<&str> {
        self.crop_history
            .iter()
            .filter(|c| c.status == CropStatus::Harvested)
            .take(n)
            .map(|c| c.crop_type.as_str())
            .collect()
    }

    /// The most recently harvested crop, if any.
    pub fn last_harvested_crop(&self) -> Option<&Crop> {
        self.crop_history
            .iter()
            .find(|c| c.status == CropStatus::Harvested)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farm {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: String,
}

/// Snapshot of everything the engine needs to generate recommendations
/// for one farm. Assembled by the farm data store before the engine runs;
/// the engine itself performs no I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmState {
    pub farm: Farm,
    pub fields: Vec<Field>,
    /// Recent transactions, newest first.
    pub transactions: Vec<FinancialTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(crop_type: &str, status: CropStatus) -> Crop {
        Crop {
            id: 1,
            crop_type: crop_type.to_string(),
            planting_date: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
            expected_harvest_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            status,
            yield_amount: None,
        }
    }

    #[test]
    fn active_statuses() {
        assert!(CropStatus::Planted.is_active());
        assert!(CropStatus::Growing.is_active());
        assert!(!CropStatus::Harvested.is_active());
        assert!(!CropStatus::Failed.is_active());
    }

    #[test]
    fn recent_crop_types_skips_failed_seasons() {
        let field = Field {
            id: 1,
            name: "North 40".to_string(),
            area_acres: 40.0,
            soil_type: None,
            active_crop: None,
            crop_history: vec![
                crop("corn", CropStatus::Harvested),
                crop("corn", CropStatus::Failed),
                crop("soybeans", CropStatus::Harvested),
            ],
            soil_sample: None,
            vegetation: None,
        };

        assert_eq!(field.recent_crop_types(3), vec!["corn", "soybeans"]);
        assert_eq!(field.last_harvested_crop().unwrap().crop_type, "corn");
    }
}
