#![no_std]

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod ids;
pub mod morphology;
pub mod token;
pub mod phenomenon;
pub mod pair;

// Re-export core types for convenience
pub use ids::{LemmaId, TokenId, ParadigmId};
pub use morphology::*;
pub use token::{DepRel, Token};
pub use phenomenon::{Family, Phenomenon, UnknownPhenomenon};
pub use pair::{AlteredSpan, Feature, MinimalPair};

pub mod model;
pub use model::*;
