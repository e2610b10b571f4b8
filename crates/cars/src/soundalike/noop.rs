use super::provider::{ScoredWord, SoundsLikeProvider};

/// Provider that never finds anything. Used when enrichment is switched off.
pub struct NoopSoundsLike;

#[async_trait::async_trait]
impl SoundsLikeProvider for NoopSoundsLike {
    async fn sounds_like(&self, _word: &str) -> Vec<ScoredWord> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "none"
    }
}
