pub mod crop;
pub mod livestock;

pub use crop::*;
pub use livestock::*;

use crate::error::{FarmOpsError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

// Representative built-in profiles. Additional profiles load from the
// configured knowledge directory without code changes.
const BUILTIN_CROPS: &[&str] = &[
    include_str!("data/corn.yaml"),
    include_str!("data/soybeans.yaml"),
    include_str!("data/wheat.yaml"),
];

const BUILTIN_LIVESTOCK: &[&str] = &[include_str!("data/cattle.yaml")];

/// Fallback region for benchmark yield lookups.
pub const NATIONAL_REGION: &str = "National";

/// Normalize a crop/species name for lookup: lowercase, alphanumerics only.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Static agronomic reference data, loaded once per process and read-only
/// afterwards. Safe to share across recommenders.
pub struct KnowledgeBase {
    crops: Vec<CropProfile>,
    livestock: Vec<LivestockProfile>,
    crop_index: HashMap<String, usize>,
    livestock_index: HashMap<String, usize>,
}

impl KnowledgeBase {
    /// Load the built-in profiles.
    pub fn builtin() -> Result<Self> {
        let mut kb = Self {
            crops: Vec::new(),
            livestock: Vec::new(),
            crop_index: HashMap::new(),
            livestock_index: HashMap::new(),
        };

        for source in BUILTIN_CROPS {
            let profile: CropProfile = serde_yaml::from_str(source)?;
            kb.add_crop(profile)?;
        }
        for source in BUILTIN_LIVESTOCK {
            let profile: LivestockProfile = serde_yaml::from_str(source)?;
            kb.add_livestock(profile)?;
        }

        debug!(
            crops = kb.crops.len(),
            livestock = kb.livestock.len(),
            "Loaded built-in knowledge base"
        );
        Ok(kb)
    }

    /// Load built-ins plus any profiles under `dir/crops/` and
    /// `dir/livestock/`.
    pub fn load(extra_dir: Option<&Path>) -> Result<Self> {
        let mut kb = Self::builtin()?;
        if let Some(dir) = extra_dir {
            kb.load_dir(dir)?;
        }
        Ok(kb)
    }

    fn load_dir(&mut self, dir: &Path) -> Result<()> {
        let crops_dir = dir.join("crops");
        if crops_dir.is_dir() {
            for path in yaml_files(&crops_dir)? {
                let source = std::fs::read_to_string(&path)?;
                let profile: CropProfile = serde_yaml::from_str(&source)?;
                debug!(path = %path.display(), crop = %profile.name, "Loaded crop profile");
                self.add_crop(profile)?;
            }
        }
        let livestock_dir = dir.join("livestock");
        if livestock_dir.is_dir() {
            for path in yaml_files(&livestock_dir)? {
                let source = std::fs::read_to_string(&path)?;
                let profile: LivestockProfile = serde_yaml::from_str(&source)?;
                debug!(path = %path.display(), species = %profile.name, "Loaded livestock profile");
                self.add_livestock(profile)?;
            }
        }
        Ok(())
    }

    fn add_crop(&mut self, profile: CropProfile) -> Result<()> {
        validate_crop(&profile)?;
        let idx = self.crops.len();
        for key in index_keys(&profile.name, &profile.aliases) {
            if self.crop_index.insert(key.clone(), idx).is_some() {
                return Err(FarmOpsError::KnowledgeBase(format!(
                    "duplicate crop name or alias '{}' in profile '{}'",
                    key, profile.name
                )));
            }
        }
        self.crops.push(profile);
        Ok(())
    }

    fn add_livestock(&mut self, profile: LivestockProfile) -> Result<()> {
        validate_livestock(&profile)?;
        let idx = self.livestock.len();
        for key in index_keys(&profile.name, &profile.aliases) {
            if self.livestock_index.insert(key.clone(), idx).is_some() {
                return Err(FarmOpsError::KnowledgeBase(format!(
                    "duplicate livestock name or alias '{}' in profile '{}'",
                    key, profile.name
                )));
            }
        }
        self.livestock.push(profile);
        Ok(())
    }

    pub fn lookup_crop(&self, name: &str) -> Option<&CropProfile> {
        lookup(&self.crop_index, name).map(|idx| &self.crops[idx])
    }

    pub fn lookup_livestock(&self, name: &str) -> Option<&LivestockProfile> {
        lookup(&self.livestock_index, name).map(|idx| &self.livestock[idx])
    }

    /// Benchmark yield for a crop and region, falling back to the
    /// "National" entry when the region is absent.
    pub fn benchmark_yield(&self, crop: &str, region: &str) -> Option<&BenchmarkYield> {
        let profile = self.lookup_crop(crop)?;
        profile
            .benchmark_yields
            .iter()
            .find(|(r, _)| r.eq_ignore_ascii_case(region))
            .or_else(|| {
                profile
                    .benchmark_yields
                    .iter()
                    .find(|(r, _)| r.eq_ignore_ascii_case(NATIONAL_REGION))
            })
            .map(|(_, y)| y)
    }

    pub fn crop_names(&self) -> Vec<&str> {
        self.crops.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn livestock_names(&self) -> Vec<&str> {
        self.livestock.iter().map(|l| l.name.as_str()).collect()
    }
}

fn index_keys(name: &str, aliases: &[String]) -> Vec<String> {
    let mut keys = vec![normalize_name(name)];
    for alias in aliases {
        let key = normalize_name(alias);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

fn lookup(index: &HashMap<String, usize>, name: &str) -> Option<usize> {
    let key = normalize_name(name);
    if let Some(&idx) = index.get(&key) {
        return Some(idx);
    }
    // Singular/plural fallback: "soybean" finds "soybeans" and vice versa.
    if let Some(stripped) = key.strip_suffix('s') {
        if let Some(&idx) = index.get(stripped) {
            return Some(idx);
        }
    }
    index.get(&format!("{}s", key)).copied()
}

fn yaml_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Validate one crop profile at load time: ordered non-overlapping stage
/// ranges and referential integrity of stage names.
fn validate_crop(profile: &CropProfile) -> Result<()> {
    let name = &profile.name;

    if profile.growth_stages.is_empty() {
        return Err(FarmOpsError::KnowledgeBase(format!(
            "crop '{}' has no growth stages",
            name
        )));
    }

    let mut prev_max: Option<u32> = None;
    for stage in &profile.growth_stages {
        let [min, max] = stage.day_range;
        if min > max {
            return Err(FarmOpsError::KnowledgeBase(format!(
                "crop '{}' stage '{}' has inverted day range [{}, {}]",
                name, stage.name, min, max
            )));
        }
        if let Some(prev) = prev_max {
            if min <= prev {
                return Err(FarmOpsError::KnowledgeBase(format!(
                    "crop '{}' stage '{}' overlaps or is out of order (starts at day {}, previous stage ends at {})",
                    name, stage.name, min, prev
                )));
            }
        }
        prev_max = Some(max);
    }

    for need in &profile.nutrient_needs {
        if profile.stage_by_name(&need.stage).is_none() {
            return Err(FarmOpsError::KnowledgeBase(format!(
                "crop '{}' nutrient need references unknown stage '{}'",
                name, need.stage
            )));
        }
    }

    for disease in &profile.disease_risks {
        if profile.stage_by_name(&disease.critical_stage).is_none() {
            return Err(FarmOpsError::KnowledgeBase(format!(
                "crop '{}' disease '{}' references unknown stage '{}'",
                name, disease.disease, disease.critical_stage
            )));
        }
    }

    if let Some(pattern) = &profile.market_pattern {
        if pattern.monthly_relative_price.len() != 12 {
            return Err(FarmOpsError::KnowledgeBase(format!(
                "crop '{}' market pattern has {} monthly prices, expected 12",
                name,
                pattern.monthly_relative_price.len()
            )));
        }
        if !(1..=12).contains(&pattern.harvest_peak_month)
            || !(1..=12).contains(&pattern.storage.optimal_sell_month)
        {
            return Err(FarmOpsError::KnowledgeBase(format!(
                "crop '{}' market pattern has an out-of-range month",
                name
            )));
        }
    }

    Ok(())
}

fn validate_livestock(profile: &LivestockProfile) -> Result<()> {
    for task in &profile.management_calendar {
        if !(1..=12).contains(&task.month) {
            return Err(FarmOpsError::KnowledgeBase(format!(
                "livestock '{}' task '{}' has out-of-range month {}",
                profile.name, task.task, task.month
            )));
        }
    }
    if let Some(breeding) = &profile.breeding {
        if breeding.optimal_months.iter().any(|m| !(1..=12).contains(m)) {
            return Err(FarmOpsError::KnowledgeBase(format!(
                "livestock '{}' breeding calendar has an out-of-range month",
                profile.name
            )));
        }
    }
    Ok(())
}
