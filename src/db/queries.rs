use crate::db::Database;
use crate::error::{FarmOpsError, Result};
use crate::models::{
    Crop, CropStatus, DailyPrecipForecast, Farm, FarmState, Field, FinancialTransaction,
    SoilSample, VegetationIndexReading, WeatherDay, WeatherWindow,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

const DATE_FMT: &str = "%Y-%m-%d";

fn parse_date(column: &str, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("bad {column} date {value}: {e}"),
            )),
        )
    })
}

// Farm Queries

impl Database {
    pub fn create_farm(&self, farm: &Farm) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO farms (name, latitude, longitude, region)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![farm.name, farm.latitude, farm.longitude, farm.region],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_farm(&self, farm_id: i64) -> Result<Option<Farm>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM farms WHERE id = ?1", [farm_id], row_to_farm)
                .optional()
                .map_err(Into::into)
        })
    }
}

fn row_to_farm(row: &Row) -> rusqlite::Result<Farm> {
    Ok(Farm {
        id: row.get("id")?,
        name: row.get("name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        region: row.get("region")?,
    })
}

// Field and Crop Queries

impl Database {
    pub fn create_field(&self, farm_id: i64, name: &str, area_acres: f64, soil_type: Option<&str>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO fields (farm_id, name, area_acres, soil_type)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![farm_id, name, area_acres, soil_type],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn create_crop(&self, field_id: i64, crop: &Crop) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO crops
                    (field_id, crop_type, planting_date, expected_harvest_date, status, yield_amount)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    field_id,
                    crop.crop_type,
                    crop.planting_date.format(DATE_FMT).to_string(),
                    crop.expected_harvest_date.format(DATE_FMT).to_string(),
                    crop.status.as_str(),
                    crop.yield_amount,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn update_crop_status(&self, crop_id: i64, status: CropStatus, yield_amount: Option<f64>) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE crops SET status = ?1, yield_amount = COALESCE(?2, yield_amount) WHERE id = ?3",
                params![status.as_str(), yield_amount, crop_id],
            )?;
            if changed == 0 {
                return Err(FarmOpsError::NotFound(format!("crop {crop_id}")));
            }
            Ok(())
        })
    }

    pub fn insert_soil_sample(&self, field_id: i64, sample: &SoilSample) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO soil_samples
                    (field_id, ph, nitrogen_ppm, phosphorus_ppm, potassium_ppm, sample_date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    field_id,
                    sample.ph,
                    sample.nitrogen_ppm,
                    sample.phosphorus_ppm,
                    sample.potassium_ppm,
                    sample.sample_date.format(DATE_FMT).to_string(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn insert_vegetation_reading(&self, field_id: i64, reading: &VegetationIndexReading) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO vegetation_readings (field_id, value, capture_date)
                VALUES (?1, ?2, ?3)
                "#,
                params![field_id, reading.value, reading.capture_date.to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn insert_transaction(&self, farm_id: i64, tx: &FinancialTransaction) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO financial_transactions (farm_id, category, amount, transaction_date)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    farm_id,
                    tx.category,
                    tx.amount,
                    tx.date.format(DATE_FMT).to_string(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }
}

fn row_to_crop(row: &Row) -> rusqlite::Result<Crop> {
    let planting_str: String = row.get("planting_date")?;
    let harvest_str: String = row.get("expected_harvest_date")?;
    let status_str: String = row.get("status")?;

    let status = CropStatus::from_str(&status_str).unwrap_or_else(|| {
        warn!(status = %status_str, "Unknown crop status in database, treating as failed");
        CropStatus::Failed
    });

    Ok(Crop {
        id: row.get("id")?,
        crop_type: row.get("crop_type")?,
        planting_date: parse_date("planting_date", &planting_str)?,
        expected_harvest_date: parse_date("expected_harvest_date", &harvest_str)?,
        status,
        yield_amount: row.get("yield_amount")?,
    })
}

// Snapshot Assembly

impl Database {
    /// Assemble the full recommendation snapshot for one farm. `field_id`
    /// narrows the snapshot to a single field; transactions are always
    /// farm-wide.
    pub fn load_farm_state(&self, farm_id: i64, field_id: Option<i64>) -> Result<FarmState> {
        let farm = self
            .get_farm(farm_id)?
            .ok_or_else(|| FarmOpsError::NotFound(format!("farm {farm_id}")))?;

        let fields = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM fields WHERE farm_id = ?1 AND (?2 IS NULL OR id = ?2) ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![farm_id, field_id], |row| {
                    Ok((
                        row.get::<_, i64>("id")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, f64>("area_acres")?,
                        row.get::<_, Option<String>>("soil_type")?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        if let Some(id) = field_id {
            if fields.is_empty() {
                return Err(FarmOpsError::NotFound(format!("field {id} on farm {farm_id}")));
            }
        }

        let mut assembled = Vec::with_capacity(fields.len());
        for (id, name, area_acres, soil_type) in fields {
            let crops = self.with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT * FROM crops WHERE field_id = ?1 ORDER BY planting_date DESC, id DESC",
                )?;
                let crops = stmt
                    .query_map([id], row_to_crop)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(crops)
            })?;

            let (active, history): (Vec<Crop>, Vec<Crop>) =
                crops.into_iter().partition(|c| c.is_active());
            if active.len() > 1 {
                warn!(field = id, count = active.len(), "Multiple active crops; using newest");
            }

            let soil_sample = self.with_conn(|conn| {
                conn.query_row(
                    "SELECT * FROM soil_samples WHERE field_id = ?1 ORDER BY sample_date DESC, id DESC LIMIT 1",
                    [id],
                    row_to_soil_sample,
                )
                .optional()
                .map_err(Into::into)
            })?;

            let vegetation = self.with_conn(|conn| {
                conn.query_row(
                    "SELECT * FROM vegetation_readings WHERE field_id = ?1 ORDER BY capture_date DESC, id DESC LIMIT 1",
                    [id],
                    row_to_vegetation,
                )
                .optional()
                .map_err(Into::into)
            })?;

            assembled.push(Field {
                id,
                name,
                area_acres,
                soil_type,
                active_crop: active.into_iter().next(),
                crop_history: history,
                soil_sample,
                vegetation,
            });
        }

        let transactions = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM financial_transactions WHERE farm_id = ?1 ORDER BY transaction_date DESC, id DESC",
            )?;
            let txs = stmt
                .query_map([farm_id], row_to_transaction)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(txs)
        })?;

        Ok(FarmState {
            farm,
            fields: assembled,
            transactions,
        })
    }

    /// Load the weather inputs for one farm: the forecast for the 7 days
    /// starting at `as_of` and the observations for the 7 days before it.
    pub fn load_weather_window(&self, farm_id: i64, as_of: DateTime<Utc>) -> Result<WeatherWindow> {
        let today = as_of.date_naive();
        let horizon = today + Duration::days(7);
        let trailing_start = today - Duration::days(7);

        let forecast = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM weather_forecast_daily
                WHERE farm_id = ?1 AND forecast_date >= ?2 AND forecast_date < ?3
                ORDER BY forecast_date
                "#,
            )?;
            let days = stmt
                .query_map(
                    params![
                        farm_id,
                        today.format(DATE_FMT).to_string(),
                        horizon.format(DATE_FMT).to_string(),
                    ],
                    row_to_forecast_day,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(days)
        })?;

        let trailing = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM weather_observed_daily
                WHERE farm_id = ?1 AND observed_date >= ?2 AND observed_date < ?3
                ORDER BY observed_date
                "#,
            )?;
            let days = stmt
                .query_map(
                    params![
                        farm_id,
                        trailing_start.format(DATE_FMT).to_string(),
                        today.format(DATE_FMT).to_string(),
                    ],
                    row_to_weather_day,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(days)
        })?;

        Ok(WeatherWindow { forecast, trailing })
    }

    pub fn upsert_forecast_day(&self, farm_id: i64, day: &DailyPrecipForecast) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO weather_forecast_daily (farm_id, forecast_date, precipitation_in)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(farm_id, forecast_date) DO UPDATE SET precipitation_in = excluded.precipitation_in
                "#,
                params![farm_id, day.date.format(DATE_FMT).to_string(), day.precipitation_in],
            )?;
            Ok(())
        })
    }

    pub fn upsert_observed_day(&self, farm_id: i64, day: &WeatherDay) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO weather_observed_daily
                    (farm_id, observed_date, avg_temp_f, avg_humidity_percent, leaf_wetness_hours)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(farm_id, observed_date) DO UPDATE SET
                    avg_temp_f = excluded.avg_temp_f,
                    avg_humidity_percent = excluded.avg_humidity_percent,
                    leaf_wetness_hours = excluded.leaf_wetness_hours
                "#,
                params![
                    farm_id,
                    day.date.format(DATE_FMT).to_string(),
                    day.avg_temp_f,
                    day.avg_humidity_percent,
                    day.leaf_wetness_hours,
                ],
            )?;
            Ok(())
        })
    }
}

fn row_to_soil_sample(row: &Row) -> rusqlite::Result<SoilSample> {
    let date_str: String = row.get("sample_date")?;
    Ok(SoilSample {
        ph: row.get("ph")?,
        nitrogen_ppm: row.get("nitrogen_ppm")?,
        phosphorus_ppm: row.get("phosphorus_ppm")?,
        potassium_ppm: row.get("potassium_ppm")?,
        sample_date: parse_date("sample_date", &date_str)?,
    })
}

fn row_to_vegetation(row: &Row) -> rusqlite::Result<VegetationIndexReading> {
    let capture_str: String = row.get("capture_date")?;
    let capture_date = DateTime::parse_from_rfc3339(&capture_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(capture_date = %capture_str, "Unparseable capture_date, using now");
            Utc::now()
        });
    Ok(VegetationIndexReading {
        value: row.get("value")?,
        capture_date,
    })
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<FinancialTransaction> {
    let date_str: String = row.get("transaction_date")?;
    Ok(FinancialTransaction {
        category: row.get("category")?,
        amount: row.get("amount")?,
        date: parse_date("transaction_date", &date_str)?,
    })
}

fn row_to_forecast_day(row: &Row) -> rusqlite::Result<DailyPrecipForecast> {
    let date_str: String = row.get("forecast_date")?;
    Ok(DailyPrecipForecast {
        date: parse_date("forecast_date", &date_str)?,
        precipitation_in: row.get("precipitation_in")?,
    })
}

fn row_to_weather_day(row: &Row) -> rusqlite::Result<WeatherDay> {
    let date_str: String = row.get("observed_date")?;
    Ok(WeatherDay {
        date: parse_date("observed_date", &date_str)?,
        avg_temp_f: row.get::<_, Option<f64>>("avg_temp_f")?.unwrap_or(0.0),
        avg_humidity_percent: row
            .get::<_, Option<f64>>("avg_humidity_percent")?
            .unwrap_or(0.0),
        leaf_wetness_hours: row
            .get::<_, Option<f64>>("leaf_wetness_hours")?
            .unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn farm() -> Farm {
        Farm {
            id: 0,
            name: "Test Farm".to_string(),
            latitude: 41.5,
            longitude: -93.6,
            region: "Midwest".to_string(),
        }
    }

    fn crop(crop_type: &str, status: CropStatus) -> Crop {
        Crop {
            id: 0,
            crop_type: crop_type.to_string(),
            planting_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            expected_harvest_date: NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
            status,
            yield_amount: None,
        }
    }

    #[test]
    fn load_farm_state_assembles_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let farm_id = db.create_farm(&farm()).unwrap();
        let field_id = db.create_field(farm_id, "North 40", 40.0, Some("loam")).unwrap();

        db.create_crop(field_id, &crop("soybeans", CropStatus::Harvested))
            .unwrap();
        let mut active = crop("corn", CropStatus::Growing);
        active.planting_date = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();
        db.create_crop(field_id, &active).unwrap();

        db.insert_soil_sample(
            field_id,
            &SoilSample {
                ph: 6.2,
                nitrogen_ppm: 30.0,
                phosphorus_ppm: 25.0,
                potassium_ppm: 140.0,
                sample_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            },
        )
        .unwrap();

        db.insert_transaction(
            farm_id,
            &FinancialTransaction {
                category: "seed".to_string(),
                amount: 400.0,
                date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            },
        )
        .unwrap();

        let state = db.load_farm_state(farm_id, None).unwrap();
        assert_eq!(state.farm.name, "Test Farm");
        assert_eq!(state.fields.len(), 1);
        let field = &state.fields[0];
        assert_eq!(field.active_crop.as_ref().unwrap().crop_type, "corn");
        assert_eq!(field.crop_history.len(), 1);
        assert_eq!(field.crop_history[0].crop_type, "soybeans");
        assert!((field.soil_sample.as_ref().unwrap().ph - 6.2).abs() < 1e-9);
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn missing_farm_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.load_farm_state(99, None).unwrap_err();
        assert!(matches!(err, FarmOpsError::NotFound(_)));
    }

    #[test]
    fn field_filter_narrows_and_validates() {
        let db = Database::open_in_memory().unwrap();
        let farm_id = db.create_farm(&farm()).unwrap();
        let a = db.create_field(farm_id, "A", 10.0, None).unwrap();
        let _b = db.create_field(farm_id, "B", 20.0, None).unwrap();

        let state = db.load_farm_state(farm_id, Some(a)).unwrap();
        assert_eq!(state.fields.len(), 1);
        assert_eq!(state.fields[0].name, "A");

        let err = db.load_farm_state(farm_id, Some(999)).unwrap_err();
        assert!(matches!(err, FarmOpsError::NotFound(_)));
    }

    #[test]
    fn weather_window_splits_forecast_and_trailing() {
        let db = Database::open_in_memory().unwrap();
        let farm_id = db.create_farm(&farm()).unwrap();
        let as_of = Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap();

        for offset in 0..7 {
            db.upsert_forecast_day(
                farm_id,
                &DailyPrecipForecast {
                    date: as_of.date_naive() + Duration::days(offset),
                    precipitation_in: 0.05,
                },
            )
            .unwrap();
        }
        for offset in 1..=7 {
            db.upsert_observed_day(
                farm_id,
                &WeatherDay {
                    date: as_of.date_naive() - Duration::days(offset),
                    avg_temp_f: 80.0,
                    avg_humidity_percent: 78.0,
                    leaf_wetness_hours: 7.0,
                },
            )
            .unwrap();
        }
        // Outside both windows.
        db.upsert_forecast_day(
            farm_id,
            &DailyPrecipForecast {
                date: as_of.date_naive() + Duration::days(10),
                precipitation_in: 2.0,
            },
        )
        .unwrap();

        let window = db.load_weather_window(farm_id, as_of).unwrap();
        assert_eq!(window.forecast.len(), 7);
        assert_eq!(window.trailing.len(), 7);
        assert!((window.forecast_precip_in(7) - 0.35).abs() < 1e-9);
    }

    #[test]
    fn upsert_replaces_same_day_forecast() {
        let db = Database::open_in_memory().unwrap();
        let farm_id = db.create_farm(&farm()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();

        db.upsert_forecast_day(farm_id, &DailyPrecipForecast { date, precipitation_in: 0.1 })
            .unwrap();
        db.upsert_forecast_day(farm_id, &DailyPrecipForecast { date, precipitation_in: 0.4 })
            .unwrap();

        let window = db
            .load_weather_window(farm_id, Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap())
            .unwrap();
        assert_eq!(window.forecast.len(), 1);
        assert!((window.forecast[0].precipitation_in - 0.4).abs() < 1e-9);
    }
}
