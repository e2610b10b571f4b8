use serde::{Deserialize, Serialize};

/// A word returned by a sound-alike lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredWord {
    pub word: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_syllables: i64,
}

impl ScoredWord {
    pub fn new(word: impl Into<String>, score: i64, num_syllables: i64) -> Self {
        Self {
            word: word.into(),
            score,
            num_syllables,
        }
    }
}

/// Trait for sound-alike word providers.
///
/// Implementations absorb their own failures: a lookup that cannot be served
/// returns an empty vector instead of an error.
#[async_trait::async_trait]
pub trait SoundsLikeProvider: Send + Sync {
    /// Words that sound like `word`, best match first
    async fn sounds_like(&self, word: &str) -> Vec<ScoredWord>;

    /// Provider identifier used in logs
    fn name(&self) -> &str;
}
