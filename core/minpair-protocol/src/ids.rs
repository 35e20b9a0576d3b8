use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(LemmaId, "Unique identifier for a Lemma (dictionary headword) or a semantic concept.");
define_id!(ParadigmId, "Unique identifier for an inflectional paradigm.");
define_id!(TokenId, "1-based position of a token in its sentence (CoNLL-U `ID`).");

impl TokenId {
    /// Zero-based index into the sentence arena.
    pub const fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }

    pub const fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}
