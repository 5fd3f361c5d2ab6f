pub mod constants;
pub mod engine;
pub mod growth;
pub mod prioritizer;
pub mod recommenders;
pub mod risk;
pub mod service;

pub use engine::RecommendationEngine;
pub use service::RecommendationService;
