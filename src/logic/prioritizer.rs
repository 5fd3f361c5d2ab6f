use crate::models::GeneratedRecommendation;

/// Order recommendations for display and persistence: priority tier
/// descending (urgent first), then `optimal_timing` ascending (soonest
/// first). The sort is stable, so candidates that tie on both keys keep
/// their generation order.
pub fn rank(mut recommendations: Vec<GeneratedRecommendation>) -> Vec<GeneratedRecommendation> {
    recommendations.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then(a.optimal_timing.cmp(&b.optimal_timing))
    });
    recommendations
}
