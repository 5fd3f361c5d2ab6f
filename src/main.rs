mod cli;
mod config;
mod db;
mod error;
mod knowledge;
mod logic;
mod models;

use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use db::Database;
use error::{FarmOpsError, Result};
use knowledge::KnowledgeBase;
use logic::RecommendationService;
use models::{GeneratedRecommendation, RecommendationStatus, StoredRecommendation};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Commands::Init = cli.command {
        let (_, path) = Config::setup_interactive()?;
        println!("Setup complete. Config written to {}", path.display());
        return Ok(());
    }

    // Load configuration; a missing config falls back to defaults so
    // read-only commands work out of the box.
    let config = if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config.clone())?
    } else {
        tracing::debug!("No config file found, using defaults");
        Config::default()
    };

    let kb = Arc::new(KnowledgeBase::load(
        config.knowledge.profile_dir.as_deref(),
    )?);

    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Generate {
            farm_id,
            field,
            as_of,
            save,
        } => {
            let service = RecommendationService::new(db, kb);
            let as_of = as_of.map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc());
            let recs = if save {
                service.generate_and_save(farm_id, field, as_of)?
            } else {
                service.generate(farm_id, field, as_of)?
            };
            print_generated(&recs);
            if save {
                println!("\nSaved {} recommendations as the active set.", recs.len());
            }
        }
        Commands::List { farm_id, field } => {
            let recs = db.list_active_recommendations(farm_id, field)?;
            print_stored(&recs);
        }
        Commands::SetStatus { rec_id, status } => {
            let status = RecommendationStatus::from_str(&status)
                .filter(|s| *s != RecommendationStatus::Expired)
                .ok_or_else(|| {
                    FarmOpsError::InvalidData(format!(
                        "invalid status '{}' (expected active, completed, or dismissed)",
                        status
                    ))
                })?;
            db.set_recommendation_status(rec_id, status)?;
            println!("Recommendation {} marked {}", rec_id, status);
        }
        Commands::Crop { name } => {
            let profile = kb
                .lookup_crop(&name)
                .ok_or_else(|| FarmOpsError::NotFound(format!("crop profile '{}'", name)))?;
            print!("{}", serde_yaml::to_string(profile)?);
        }
        Commands::Livestock { name } => {
            let profile = kb
                .lookup_livestock(&name)
                .ok_or_else(|| FarmOpsError::NotFound(format!("livestock profile '{}'", name)))?;
            print!("{}", serde_yaml::to_string(profile)?);
        }
        Commands::SeedDemo => {
            let farm_id = db::seed::seed_demo(&db, Utc::now())?;
            println!("Seeded demo farm with id {}", farm_id);
            println!("Try: farmops generate {} --save", farm_id);
        }
    }

    Ok(())
}

fn print_generated(recs: &[GeneratedRecommendation]) {
    if recs.is_empty() {
        println!("No recommendations.");
        return;
    }
    for (i, rec) in recs.iter().enumerate() {
        println!(
            "{:>2}. [{}] {} ({})",
            i + 1,
            rec.priority.to_string().to_uppercase(),
            rec.title,
            rec.rec_type
        );
        println!("    {}", rec.description);
        if !rec.action_required.is_empty() {
            println!("    Action: {}", rec.action_required);
        }
        if let Some(field_id) = rec.field_id {
            println!("    Field: {}", field_id);
        }
        match (rec.estimated_cost, rec.estimated_roi) {
            (Some(cost), Some(roi)) => println!("    Cost: ${:.2}  ROI: ${:.2}", cost, roi),
            (Some(cost), None) => println!("    Cost: ${:.2}", cost),
            (None, Some(roi)) => println!("    ROI: ${:.2}", roi),
            (None, None) => {}
        }
        println!("    When: {}", rec.optimal_timing.format("%Y-%m-%d"));
    }
}

fn print_stored(recs: &[StoredRecommendation]) {
    if recs.is_empty() {
        println!("No active recommendations.");
        return;
    }
    for rec in recs {
        println!(
            "#{:<4} [{}] {} ({})",
            rec.id,
            rec.recommendation.priority.to_string().to_uppercase(),
            rec.recommendation.title,
            rec.recommendation.rec_type
        );
        println!("      {}", rec.recommendation.description);
        println!(
            "      When: {}  Created: {}",
            rec.recommendation.optimal_timing.format("%Y-%m-%d"),
            rec.created_at.format("%Y-%m-%d")
        );
    }
}
