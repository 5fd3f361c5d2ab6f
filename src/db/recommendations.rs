use crate::db::Database;
use crate::error::{FarmOpsError, Result};
use crate::models::{
    Confidence, GeneratedRecommendation, Priority, RecommendationStatus, RecommendationType,
    StoredRecommendation,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde_json::{Map, Value};
use tracing::warn;

// Recommendation Store

impl Database {
    /// Replace the active recommendation set for a farm in one atomic step:
    /// retire every currently-active row, then insert the new batch in
    /// ranked order. A failure anywhere rolls the whole batch back, so
    /// readers never observe a half-replaced set.
    pub fn replace_active_recommendations(
        &self,
        farm_id: i64,
        recommendations: &[GeneratedRecommendation],
    ) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "UPDATE recommendations SET status = 'expired' WHERE farm_id = ?1 AND status = 'active'",
                [farm_id],
            )?;

            for rec in recommendations {
                tx.execute(
                    r#"
                    INSERT INTO recommendations
                        (farm_id, field_id, rec_type, priority, title, description,
                         action_required, potential_impact, confidence, estimated_cost,
                         estimated_roi, optimal_timing, expires_at, supporting_data,
                         status, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 'active', ?15)
                    "#,
                    params![
                        farm_id,
                        rec.field_id,
                        rec.rec_type.as_str(),
                        rec.priority.as_str(),
                        rec.title,
                        rec.description,
                        rec.action_required,
                        rec.potential_impact,
                        rec.confidence.as_str(),
                        rec.estimated_cost,
                        rec.estimated_roi,
                        rec.optimal_timing.to_rfc3339(),
                        rec.expires_at.map(|t| t.to_rfc3339()),
                        serde_json::to_string(&rec.supporting_data)?,
                        Utc::now().to_rfc3339(),
                    ],
                )?;
            }

            tx.commit()?;
            Ok(recommendations.len())
        })
    }

    /// Active recommendations for a farm, in the order the engine ranked
    /// them (insertion order within the batch).
    pub fn list_active_recommendations(
        &self,
        farm_id: i64,
        field_id: Option<i64>,
    ) -> Result<Vec<StoredRecommendation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM recommendations
                WHERE farm_id = ?1 AND status = 'active' AND (?2 IS NULL OR field_id = ?2)
                ORDER BY id
                "#,
            )?;
            let recs = stmt
                .query_map(params![farm_id, field_id], row_to_stored_recommendation)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(recs)
        })
    }

    pub fn set_recommendation_status(
        &self,
        recommendation_id: i64,
        status: RecommendationStatus,
    ) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE recommendations SET status = ?1 WHERE id = ?2",
                params![status.as_str(), recommendation_id],
            )?;
            if changed == 0 {
                return Err(FarmOpsError::NotFound(format!(
                    "recommendation {recommendation_id}"
                )));
            }
            Ok(())
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(timestamp = %value, "Unparseable timestamp in database, using now");
            Utc::now()
        })
}

fn row_to_stored_recommendation(row: &Row) -> rusqlite::Result<StoredRecommendation> {
    let rec_type_str: String = row.get("rec_type")?;
    let priority_str: String = row.get("priority")?;
    let confidence_str: String = row.get("confidence")?;
    let status_str: String = row.get("status")?;
    let timing_str: String = row.get("optimal_timing")?;
    let expires_str: Option<String> = row.get("expires_at")?;
    let created_str: String = row.get("created_at")?;
    let data_str: String = row.get("supporting_data")?;

    let rec_type = RecommendationType::from_str(&rec_type_str).unwrap_or_else(|| {
        warn!(rec_type = %rec_type_str, "Unknown rec_type in database, defaulting to equipment");
        RecommendationType::Equipment
    });
    let priority = Priority::from_str(&priority_str).unwrap_or_else(|| {
        warn!(priority = %priority_str, "Unknown priority in database, defaulting to low");
        Priority::Low
    });
    let confidence = Confidence::from_str(&confidence_str).unwrap_or(Confidence::Low);
    let status = RecommendationStatus::from_str(&status_str).unwrap_or_else(|| {
        warn!(status = %status_str, "Unknown status in database, treating as expired");
        RecommendationStatus::Expired
    });
    let supporting_data: Map<String, Value> = serde_json::from_str(&data_str).unwrap_or_else(|e| {
        warn!(error = %e, "Unparseable supporting_data in database, dropping");
        Map::new()
    });

    Ok(StoredRecommendation {
        id: row.get("id")?,
        farm_id: row.get("farm_id")?,
        status,
        created_at: parse_timestamp(&created_str),
        recommendation: GeneratedRecommendation {
            rec_type,
            priority,
            title: row.get("title")?,
            description: row.get("description")?,
            action_required: row.get::<_, Option<String>>("action_required")?.unwrap_or_default(),
            potential_impact: row.get::<_, Option<String>>("potential_impact")?.unwrap_or_default(),
            confidence,
            field_id: row.get("field_id")?,
            estimated_cost: row.get("estimated_cost")?,
            estimated_roi: row.get("estimated_roi")?,
            optimal_timing: parse_timestamp(&timing_str),
            expires_at: expires_str.as_deref().map(parse_timestamp),
            supporting_data,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Farm;
    use chrono::TimeZone;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let farm_id = db
            .create_farm(&Farm {
                id: 0,
                name: "Test Farm".to_string(),
                latitude: 41.5,
                longitude: -93.6,
                region: "Midwest".to_string(),
            })
            .unwrap();
        db.create_field(farm_id, "Field One", 100.0, None).unwrap();
        db.create_field(farm_id, "Field Two", 100.0, None).unwrap();
        (db, farm_id)
    }

    fn rec(title: &str, priority: Priority) -> GeneratedRecommendation {
        GeneratedRecommendation::new(
            RecommendationType::Fertilizer,
            priority,
            title,
            "test",
            Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
        )
        .for_field(1)
        .with_cost(100.0)
        .with_data("threshold", 20.0)
    }

    #[test]
    fn replace_expires_previous_batch() {
        let (db, farm_id) = setup();

        db.replace_active_recommendations(farm_id, &[rec("first", Priority::High)])
            .unwrap();
        db.replace_active_recommendations(
            farm_id,
            &[rec("second", Priority::Urgent), rec("third", Priority::Low)],
        )
        .unwrap();

        let active = db.list_active_recommendations(farm_id, None).unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].recommendation.title, "second");
        assert_eq!(active[1].recommendation.title, "third");

        // Exactly one active batch exists; the old row is expired, not gone.
        let expired: i64 = db
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM recommendations WHERE farm_id = ?1 AND status = 'expired'",
                    [farm_id],
                    |row| row.get(0),
                )
                .map_err(Into::into)
            })
            .unwrap();
        assert_eq!(expired, 1);
    }

    #[test]
    fn replace_with_empty_batch_clears_active_set() {
        let (db, farm_id) = setup();
        db.replace_active_recommendations(farm_id, &[rec("only", Priority::Medium)])
            .unwrap();
        db.replace_active_recommendations(farm_id, &[]).unwrap();
        assert!(db.list_active_recommendations(farm_id, None).unwrap().is_empty());
    }

    #[test]
    fn listing_preserves_ranked_order_and_round_trips_fields() {
        let (db, farm_id) = setup();
        let batch = vec![
            rec("a", Priority::Urgent),
            rec("b", Priority::High),
            rec("c", Priority::Low),
        ];
        db.replace_active_recommendations(farm_id, &batch).unwrap();

        let active = db.list_active_recommendations(farm_id, None).unwrap();
        let titles: Vec<&str> = active.iter().map(|r| r.recommendation.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        let first = &active[0].recommendation;
        assert_eq!(first.rec_type, RecommendationType::Fertilizer);
        assert_eq!(first.priority, Priority::Urgent);
        assert_eq!(first.field_id, Some(1));
        assert_eq!(first.estimated_cost, Some(100.0));
        assert!(first.supporting_data.contains_key("threshold"));
        assert_eq!(active[0].status, RecommendationStatus::Active);
    }

    #[test]
    fn field_filter_limits_listing() {
        let (db, farm_id) = setup();
        let batch = vec![rec("one", Priority::High), rec("two", Priority::High).for_field(2)];
        db.replace_active_recommendations(farm_id, &batch).unwrap();

        let field_two = db.list_active_recommendations(farm_id, Some(2)).unwrap();
        assert_eq!(field_two.len(), 1);
        assert_eq!(field_two[0].recommendation.title, "two");
    }

    #[test]
    fn status_transitions_apply_to_known_rows_only() {
        let (db, farm_id) = setup();
        db.replace_active_recommendations(farm_id, &[rec("done", Priority::Medium)])
            .unwrap();
        let id = db.list_active_recommendations(farm_id, None).unwrap()[0].id;

        db.set_recommendation_status(id, RecommendationStatus::Completed)
            .unwrap();
        assert!(db.list_active_recommendations(farm_id, None).unwrap().is_empty());

        let err = db
            .set_recommendation_status(9999, RecommendationStatus::Dismissed)
            .unwrap_err();
        assert!(matches!(err, FarmOpsError::NotFound(_)));
    }

    #[test]
    fn batches_are_scoped_per_farm() {
        let (db, farm_a) = setup();
        let farm_b = db
            .create_farm(&Farm {
                id: 0,
                name: "Other Farm".to_string(),
                latitude: 40.0,
                longitude: -90.0,
                region: "Midwest".to_string(),
            })
            .unwrap();

        db.replace_active_recommendations(farm_a, &[rec("a", Priority::High)])
            .unwrap();
        db.replace_active_recommendations(farm_b, &[rec("b", Priority::High)])
            .unwrap();
        db.replace_active_recommendations(farm_a, &[rec("a2", Priority::High)])
            .unwrap();

        let b_active = db.list_active_recommendations(farm_b, None).unwrap();
        assert_eq!(b_active.len(), 1);
        assert_eq!(b_active[0].recommendation.title, "b");
    }
}
