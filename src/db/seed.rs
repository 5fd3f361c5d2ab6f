use crate::db::Database;
use crate::error::Result;
use crate::models::{
    Crop, CropStatus, DailyPrecipForecast, Farm, FinancialTransaction, SoilSample,
    VegetationIndexReading, WeatherDay,
};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Populate a sample farm for local use. All fixture values are fixed
/// offsets from `as_of`, so seeding the same database at the same instant
/// always produces the same snapshot.
pub fn seed_demo(db: &Database, as_of: DateTime<Utc>) -> Result<i64> {
    let today = as_of.date_naive();

    let farm_id = db.create_farm(&Farm {
        id: 0,
        name: "Prairie Creek Farm".to_string(),
        latitude: 41.88,
        longitude: -93.52,
        region: "Midwest".to_string(),
    })?;

    // Field 1: corn mid-season with a nitrogen-poor soil test and a
    // middling vegetation index.
    let north = db.create_field(farm_id, "North 40", 40.0, Some("loam"))?;
    db.create_crop(
        north,
        &Crop {
            id: 0,
            crop_type: "corn".to_string(),
            planting_date: today - Duration::days(50),
            expected_harvest_date: today + Duration::days(90),
            status: CropStatus::Growing,
            yield_amount: None,
        },
    )?;
    db.create_crop(
        north,
        &Crop {
            id: 0,
            crop_type: "soybeans".to_string(),
            planting_date: today - Duration::days(415),
            expected_harvest_date: today - Duration::days(280),
            status: CropStatus::Harvested,
            yield_amount: Some(58.0),
        },
    )?;
    db.insert_soil_sample(
        north,
        &SoilSample {
            ph: 6.2,
            nitrogen_ppm: 35.0,
            phosphorus_ppm: 28.0,
            potassium_ppm: 150.0,
            sample_date: today - Duration::days(10),
        },
    )?;
    db.insert_vegetation_reading(
        north,
        &VegetationIndexReading {
            value: 0.45,
            capture_date: as_of - Duration::days(2),
        },
    )?;

    // Field 2: idle after three straight corn seasons.
    let south = db.create_field(farm_id, "South Creek", 25.0, Some("clay loam"))?;
    for years_back in 1..=3 {
        db.create_crop(
            south,
            &Crop {
                id: 0,
                crop_type: "corn".to_string(),
                planting_date: today - Duration::days(365 * years_back + 50),
                expected_harvest_date: today - Duration::days(365 * years_back - 90),
                status: CropStatus::Harvested,
                yield_amount: Some(152.0),
            },
        )?;
    }

    for (category, amount, days_ago) in [
        ("fertilizer", 620.0, 20),
        ("seed", 480.0, 45),
        ("fuel", 310.0, 12),
    ] {
        db.insert_transaction(
            farm_id,
            &FinancialTransaction {
                category: category.to_string(),
                amount,
                date: today - Duration::days(days_ago),
            },
        )?;
    }

    // A dry week ahead, a humid warm week behind.
    for offset in 0..7 {
        db.upsert_forecast_day(
            farm_id,
            &DailyPrecipForecast {
                date: today + Duration::days(offset),
                precipitation_in: 0.05,
            },
        )?;
    }
    for offset in 1..=7 {
        db.upsert_observed_day(
            farm_id,
            &WeatherDay {
                date: today - Duration::days(offset),
                avg_temp_f: 80.0,
                avg_humidity_percent: 82.0,
                leaf_wetness_hours: 7.0,
            },
        )?;
    }

    info!(farm_id, "Seeded demo farm");
    Ok(farm_id)
}
