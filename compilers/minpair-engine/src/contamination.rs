//! Pretraining-contamination filter: picks a per-sentence score threshold at which
//! the sentences every model finds suspiciously likely form a pool of the wanted size.

use std::collections::{BTreeSet, HashMap};

use minpair_protocol::MinimalPair;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Min-k% ratios reported by default.
pub const DEFAULT_RATIOS: [f64; 4] = [0.3, 0.4, 0.5, 0.6];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceScore {
    pub sentence_id: String,
    pub score: f64,
}

/// One model's statistic per sentence; lower reads as more likely memorized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    pub model: String,
    pub scores: Vec<SentenceScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold {
    pub value: f64,
    /// Exact size of the intersection at `value`; ties may push it past the target.
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("no score lists given")]
    NoModels,
    #[error("model {model} scored sentence {sentence_id} with a non-finite value")]
    NonFinite { model: String, sentence_id: String },
    #[error("threshold unattainable: wanted {target} sentences, at most {reachable} are shared by every model")]
    Unattainable { target: usize, reachable: usize },
}

/// Lowest score of each sentence in one model's list.
fn best_scores(pool: &ModelScores) -> Result<HashMap<&str, f64>, ThresholdError> {
    let mut best: HashMap<&str, f64> = HashMap::new();
    for entry in &pool.scores {
        if !entry.score.is_finite() {
            return Err(ThresholdError::NonFinite {
                model: pool.model.clone(),
                sentence_id: entry.sentence_id.clone(),
            });
        }
        best.entry(entry.sentence_id.as_str())
            .and_modify(|score| *score = score.min(entry.score))
            .or_insert(entry.score);
    }
    Ok(best)
}

/// Smallest observed score at which at least `target_size` sentences sit at or below
/// the threshold in every model. Sentences sharing a score enter together.
pub fn select_threshold(pools: &[ModelScores], target_size: usize) -> Result<Threshold, ThresholdError> {
    if pools.is_empty() {
        return Err(ThresholdError::NoModels);
    }
    if target_size == 0 {
        return Ok(Threshold {
            value: f64::NEG_INFINITY,
            size: 0,
        });
    }

    let mut events: Vec<(f64, &str)> = Vec::new();
    for pool in pools {
        events.extend(best_scores(pool)?.into_iter().map(|(id, score)| (score, id)));
    }
    events.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut size = 0;
    let mut index = 0;
    while index < events.len() {
        let value = events[index].0;
        while index < events.len() && events[index].0 == value {
            let count = seen.entry(events[index].1).or_default();
            *count += 1;
            if *count == pools.len() {
                size += 1;
            }
            index += 1;
        }
        if size >= target_size {
            debug!(value, size, target_size, "threshold found");
            return Ok(Threshold { value, size });
        }
    }
    Err(ThresholdError::Unattainable {
        target: target_size,
        reachable: size,
    })
}

/// Sentences at or below `threshold` in every model.
pub fn eligible(pools: &[ModelScores], threshold: &Threshold) -> Result<BTreeSet<String>, ThresholdError> {
    let mut lists = Vec::with_capacity(pools.len());
    for pool in pools {
        lists.push(best_scores(pool)?);
    }
    let Some((first, rest)) = lists.split_first() else {
        return Ok(BTreeSet::new());
    };
    Ok(first
        .iter()
        .filter(|(id, score)| {
            **score <= threshold.value
                && rest
                    .iter()
                    .all(|list| list.get(*id).is_some_and(|s| *s <= threshold.value))
        })
        .map(|(id, _)| id.to_string())
        .collect())
}

/// Drops pairs built from sentences outside `allowed`; returns how many were dropped.
pub fn retain_eligible(pairs: &mut Vec<MinimalPair>, allowed: &BTreeSet<String>) -> usize {
    let before = pairs.len();
    pairs.retain(|pair| allowed.contains(&pair.sentence_id));
    before - pairs.len()
}

/// Min-k% probability: negated mean of the lowest `⌊n·ratio⌋` token log-probs, at
/// least one token.
pub fn min_k_statistic(logprobs: &[f64], ratio: f64) -> Option<f64> {
    if logprobs.is_empty() || !(0.0..=1.0).contains(&ratio) {
        return None;
    }
    let k = ((logprobs.len() as f64 * ratio).floor() as usize).max(1);
    let mut sorted = logprobs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let lowest = &sorted[..k];
    Some(-lowest.iter().sum::<f64>() / k as f64)
}

/// External language model returning per-token log-probabilities.
pub trait Scorer: Sync {
    fn score(&self, sentence: &str, model: &str) -> Vec<f64>;
}

/// Scores `(sentence_id, text)` pairs under every model, sentences in parallel.
pub fn score_pool<S: Scorer>(
    scorer: &S,
    models: &[String],
    sentences: &[(String, String)],
    ratio: f64,
) -> Vec<ModelScores> {
    models
        .iter()
        .map(|model| {
            let scores: Vec<SentenceScore> = sentences
                .par_iter()
                .filter_map(|(id, text)| {
                    let statistic = min_k_statistic(&scorer.score(text, model), ratio);
                    if statistic.is_none() {
                        warn!(model = %model, sentence = %id, "scorer returned no usable log-probs");
                    }
                    statistic.map(|score| SentenceScore {
                        sentence_id: id.clone(),
                        score,
                    })
                })
                .collect();
            info!(model = %model, scored = scores.len(), ratio, "model scored");
            ModelScores {
                model: model.clone(),
                scores,
            }
        })
        .collect()
}
