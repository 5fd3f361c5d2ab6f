//! Fixed agronomic thresholds and economic assumptions used by the
//! recommenders. These are business assumptions, not physical constants;
//! they live in one place so they can be revisited without touching
//! recommender control flow.

/// Soil nitrogen deficit (stage requirement minus measured ppm) above which
/// a corrective application is recommended.
pub const NITROGEN_DEFICIT_THRESHOLD_PPM: f64 = 20.0;

/// Application rate sizing: lb N/acre per ppm of measured deficit.
pub const NITROGEN_RATE_FACTOR: f64 = 1.2;

/// Cost basis for nitrogen fertilizer, $/lb N.
pub const NITROGEN_COST_PER_LB: f64 = 0.55;

/// Lime requirement: tons/acre per pH unit below the optimal band.
pub const LIME_TONS_PER_PH_UNIT: f64 = 2.0;

/// Lime cost, $/ton applied.
pub const LIME_COST_PER_TON: f64 = 45.0;

/// Elemental sulfur requirement: lb/acre per pH unit above the optimal band.
pub const SULFUR_LBS_PER_PH_UNIT: f64 = 400.0;

/// Sulfur cost, $/lb applied.
pub const SULFUR_COST_PER_LB: f64 = 0.35;

/// Fraction below the regional benchmark that counts as a yield gap.
pub const YIELD_GAP_FRACTION: f64 = 0.15;

/// Assumed grain price used for rough ROI figures, $/bu.
pub const ASSUMED_GRAIN_PRICE_PER_BU: f64 = 4.50;

/// 7-day forecast precipitation below this is a moderate irrigation signal.
pub const PRECIP_7DAY_LOW_IN: f64 = 0.5;

/// 7-day forecast precipitation below this is a strong irrigation signal.
pub const PRECIP_7DAY_CRITICAL_IN: f64 = 0.1;

/// Recommended irrigation depth range, inches.
pub const IRRIGATION_DEPTH_MIN_IN: f64 = 1.0;
pub const IRRIGATION_DEPTH_MAX_IN: f64 = 1.5;

/// Irrigate within this many days of the recommendation.
pub const IRRIGATION_WINDOW_DAYS: i64 = 2;

/// Irrigation recommendations go stale after this many days.
pub const IRRIGATION_EXPIRY_DAYS: i64 = 5;

/// Vegetation index below this demands immediate scouting.
pub const NDVI_URGENT_BELOW: f64 = 0.30;

/// Vegetation index below this warrants scouting within two days.
pub const NDVI_WARN_BELOW: f64 = 0.50;

/// "Emergence" pest windows cover this many days after planting.
pub const EMERGENCE_MAX_DAYS: i64 = 14;

/// "Late season" pest windows start this many days after planting.
pub const LATE_SEASON_MIN_DAYS: i64 = 90;

/// Mean relative humidity that counts as "high humidity".
pub const HIGH_HUMIDITY_PCT: f64 = 75.0;

/// Mean temperature band for "warm temperatures", degrees F.
pub const WARM_TEMP_RANGE_F: (f64, f64) = (75.0, 85.0);

/// Mean temperature band for "cool temperatures", degrees F.
pub const COOL_TEMP_RANGE_F: (f64, f64) = (65.0, 80.0);

/// Mean daily leaf wetness that counts as "extended leaf wetness", hours.
pub const LEAF_WETNESS_EXTENDED_HOURS: f64 = 6.0;

/// Daily humidity above this counts toward "extended dew periods".
pub const DEW_HUMIDITY_PCT: f64 = 80.0;

/// Days above [`DEW_HUMIDITY_PCT`] in the trailing week that count as
/// "extended dew periods".
pub const DEW_DAYS_MIN: usize = 3;

/// Recent input spend (seed/fertilizer/pesticide) above this flags a bulk
/// purchasing opportunity, $.
pub const INPUT_SPEND_THRESHOLD: f64 = 500.0;

/// Assumed savings rate from bulk input purchasing.
pub const BULK_SAVINGS_RATE: f64 = 0.12;

/// Transaction categories that count as crop inputs.
pub const INPUT_CATEGORIES: &[&str] = &["seed", "fertilizer", "pesticide"];

/// Market-timing analysis starts this close to harvest, days.
pub const MARKET_LOOKAHEAD_DAYS: i64 = 45;

/// Relative-price gap above which storage beats selling at harvest.
pub const STORAGE_PRICE_GAP: f64 = 0.10;

/// Relative-price gap below which (negative) harvest timing is poor.
pub const POOR_TIMING_GAP: f64 = -0.05;

/// Haircut applied to the storage price gap when estimating gains.
pub const STORAGE_GAIN_BUFFER: f64 = 0.05;

/// Harvest preparation reminders start this many days before harvest.
pub const HARVEST_PREP_DAYS: i64 = 14;

/// Rotation planning starts this many days before harvest.
pub const ROTATION_LOOKAHEAD_DAYS: i64 = 60;

/// Seasons of identical cropping that count as a broken rotation.
pub const ROTATION_HISTORY_SEASONS: usize = 3;

/// How far back farm transactions are considered recent, days.
pub const TRANSACTION_WINDOW_DAYS: i64 = 90;

/// Flat cost assumed for a professional soil test, $.
pub const SOIL_TEST_COST: f64 = 35.0;

/// Default suggestion for fields with no cropping history.
pub const STARTER_CROP: &str = "soybeans";
