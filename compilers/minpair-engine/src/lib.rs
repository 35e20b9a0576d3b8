//! Perturbation engine: finds the constructions each phenomenon targets, rewrites
//! them into ungrammatical alternatives and emits validated minimal pairs.

pub mod assembler;
pub mod candidate;
pub mod closed_class;
pub mod config;
pub mod contamination;
pub mod error;
pub mod filter;
pub mod generator;
pub mod matcher;
pub mod phenomena;
pub mod registry;
pub mod resources;
pub mod rule;

#[cfg(test)]
mod testkit;

pub use candidate::{Attractor, Candidate};
pub use config::GeneratorConfig;
pub use contamination::{
    eligible, min_k_statistic, retain_eligible, score_pool, select_threshold, ModelScores, Scorer, SentenceScore,
    Threshold, ThresholdError, DEFAULT_RATIOS,
};
pub use error::{CandidateError, ResourceError, Unsynthesizable};
pub use filter::{Check, ValidityFilter};
pub use generator::{GenerationReport, Generator, PhenomenonCounts};
pub use matcher::PatternMatcher;
pub use registry::{PhenomenonEntry, Resolve};
pub use resources::Resources;
pub use rule::{Perturbation, PerturbedForm};
