use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of forward precipitation forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPrecipForecast {
    pub date: NaiveDate,
    pub precipitation_in: f64,
}

/// One day of trailing observed weather, aggregated daily.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub avg_temp_f: f64,
    pub avg_humidity_percent: f64,
    pub leaf_wetness_hours: f64,
}

/// Weather inputs for one farm: a 7-day forward precipitation forecast and
/// a 7-day trailing observation window, both resolved by the caller before
/// the engine runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherWindow {
    pub forecast: Vec<DailyPrecipForecast>,
    pub trailing: Vec<WeatherDay>,
}

impl WeatherWindow {
    /// Total forecast precipitation over the next `days` days, in inches.
    pub fn forecast_precip_in(&self, days: usize) -> f64 {
        self.forecast
            .iter()
            .take(days)
            .map(|d| d.precipitation_in)
            .sum()
    }

    pub fn mean_temp_f(&self) -> Option<f64> {
        mean(self.trailing.iter().map(|d| d.avg_temp_f))
    }

    pub fn mean_humidity_percent(&self) -> Option<f64> {
        mean(self.trailing.iter().map(|d| d.avg_humidity_percent))
    }

    pub fn mean_leaf_wetness_hours(&self) -> Option<f64> {
        mean(self.trailing.iter().map(|d| d.leaf_wetness_hours))
    }

    /// Number of trailing days with humidity above `threshold` percent.
    pub fn days_humidity_above(&self, threshold: f64) -> usize {
        self.trailing
            .iter()
            .filter(|d| d.avg_humidity_percent > threshold)
            .count()
    }

    pub fn has_trailing_data(&self) -> bool {
        !self.trailing.is_empty()
    }

    pub fn has_forecast(&self) -> bool {
        !self.forecast.is_empty()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        None
    } else {
        Some(collected.iter().sum::<f64>() / collected.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, temp: f64, humidity: f64, wetness: f64) -> WeatherDay {
        WeatherDay {
            date: NaiveDate::from_ymd_opt(2025, 7, d).unwrap(),
            avg_temp_f: temp,
            avg_humidity_percent: humidity,
            leaf_wetness_hours: wetness,
        }
    }

    #[test]
    fn forecast_precip_sums_requested_days() {
        let window = WeatherWindow {
            forecast: (1..=7)
                .map(|d| DailyPrecipForecast {
                    date: NaiveDate::from_ymd_opt(2025, 7, d).unwrap(),
                    precipitation_in: 0.1,
                })
                .collect(),
            trailing: Vec::new(),
        };
        assert!((window.forecast_precip_in(7) - 0.7).abs() < 1e-9);
        assert!((window.forecast_precip_in(3) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn trailing_aggregates() {
        let window = WeatherWindow {
            forecast: Vec::new(),
            trailing: vec![
                day(1, 80.0, 85.0, 8.0),
                day(2, 78.0, 82.0, 6.0),
                day(3, 82.0, 70.0, 4.0),
            ],
        };
        assert!((window.mean_temp_f().unwrap() - 80.0).abs() < 1e-9);
        assert_eq!(window.days_humidity_above(80.0), 2);
        assert!((window.mean_leaf_wetness_hours().unwrap() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_window_yields_no_aggregates() {
        let window = WeatherWindow::default();
        assert!(window.mean_temp_f().is_none());
        assert!(!window.has_trailing_data());
        assert_eq!(window.forecast_precip_in(7), 0.0);
    }
}
