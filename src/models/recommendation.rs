use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Fertilizer,
    Irrigation,
    PestControl,
    Planting,
    Harvest,
    Financial,
    Equipment,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Fertilizer => "fertilizer",
            RecommendationType::Irrigation => "irrigation",
            RecommendationType::PestControl => "pest_control",
            RecommendationType::Planting => "planting",
            RecommendationType::Harvest => "harvest",
            RecommendationType::Financial => "financial",
            RecommendationType::Equipment => "equipment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fertilizer" => Some(RecommendationType::Fertilizer),
            "irrigation" => Some(RecommendationType::Irrigation),
            "pest_control" | "pest control" => Some(RecommendationType::PestControl),
            "planting" => Some(RecommendationType::Planting),
            "harvest" => Some(RecommendationType::Harvest),
            "financial" => Some(RecommendationType::Financial),
            "equipment" => Some(RecommendationType::Equipment),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Numeric rank used by the prioritizer: urgent=4 .. low=1.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a persisted recommendation.
///
/// The engine only ever writes `Active` (new batches) and `Expired`
/// (retired batches); `Completed` and `Dismissed` are user-driven
/// transitions applied downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Active,
    Completed,
    Dismissed,
    Expired,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Active => "active",
            RecommendationStatus::Completed => "completed",
            RecommendationStatus::Dismissed => "dismissed",
            RecommendationStatus::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(RecommendationStatus::Active),
            "completed" => Some(RecommendationStatus::Completed),
            "dismissed" => Some(RecommendationStatus::Dismissed),
            "expired" => Some(RecommendationStatus::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An actionable recommendation produced by one of the domain recommenders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedRecommendation {
    pub rec_type: RecommendationType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action_required: String,
    pub potential_impact: String,
    pub confidence: Confidence,
    pub field_id: Option<i64>,
    pub estimated_cost: Option<f64>,
    pub estimated_roi: Option<f64>,
    /// When the action should occur.
    pub optimal_timing: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Traceability: field/crop ids and the thresholds that fired.
    pub supporting_data: Map<String, Value>,
}

impl GeneratedRecommendation {
    pub fn new(
        rec_type: RecommendationType,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        optimal_timing: DateTime<Utc>,
    ) -> Self {
        Self {
            rec_type,
            priority,
            title: title.into(),
            description: description.into(),
            action_required: String::new(),
            potential_impact: String::new(),
            confidence: Confidence::Medium,
            field_id: None,
            estimated_cost: None,
            estimated_roi: None,
            optimal_timing,
            expires_at: None,
            supporting_data: Map::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action_required = action.into();
        self
    }

    pub fn with_impact(mut self, impact: impl Into<String>) -> Self {
        self.potential_impact = impact.into();
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn for_field(mut self, field_id: i64) -> Self {
        self.field_id = Some(field_id);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = Some(cost);
        self
    }

    pub fn with_roi(mut self, roi: f64) -> Self {
        self.estimated_roi = Some(roi);
        self
    }

    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.supporting_data.insert(key.to_string(), value.into());
        self
    }
}

/// A recommendation row as persisted by the store adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecommendation {
    pub id: i64,
    pub farm_id: i64,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub recommendation: GeneratedRecommendation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_ordering() {
        assert!(Priority::Urgent.rank() > Priority::High.rank());
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
        assert_eq!(Priority::Low.rank(), 1);
        assert_eq!(Priority::Urgent.rank(), 4);
    }

    #[test]
    fn status_round_trip() {
        for status in [
            RecommendationStatus::Active,
            RecommendationStatus::Completed,
            RecommendationStatus::Dismissed,
            RecommendationStatus::Expired,
        ] {
            assert_eq!(
                RecommendationStatus::from_str(status.as_str()),
                Some(status)
            );
        }
        assert_eq!(RecommendationStatus::from_str("archived"), None);
    }

    #[test]
    fn builder_populates_supporting_data() {
        let rec = GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            Priority::Urgent,
            "Apply nitrogen",
            "Deficit detected",
            Utc::now(),
        )
        .for_field(7)
        .with_cost(120.0)
        .with_data("nitrogen_deficit_ppm", 80.0);

        assert_eq!(rec.field_id, Some(7));
        assert_eq!(rec.estimated_cost, Some(120.0));
        assert!(rec.supporting_data.contains_key("nitrogen_deficit_ppm"));
    }
}
