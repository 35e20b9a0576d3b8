use rkyv::{Archive, Deserialize, Serialize};
use crate::ids::{LemmaId, ParadigmId};
use crate::morphology::PartOfSpeech;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Lemma {
    pub id: LemmaId,
    pub text: String,
    pub pos: PartOfSpeech,
    pub stem: String,
    pub paradigm: ParadigmId,
    /// Lexical grammemes (gender, animacy, aspect) shared by every cell.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lexical: u64,
    /// Frequency rank; lower is more frequent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rank: Option<u32>,
    /// Full forms overriding or extending the paradigm (suppletion, stem alternation).
    #[cfg_attr(feature = "serde", serde(default))]
    pub forms: Vec<(u64, String)>,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Paradigm {
    pub id: ParadigmId,
    pub endings: Vec<(u64, String)>,
}

#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Dictionary {
    pub version: u32,
    pub lemmas: Vec<Lemma>,
    pub paradigms: Vec<Paradigm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Relation {
    IsA = 0,          // Inheritance (e.g., бригада IsA коллектив)
    HasAttribute = 1, // Property (e.g., коллектив HasAttribute collective)
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Concept {
    pub id: LemmaId,
    pub label: String,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SemanticEdge {
    pub from: LemmaId,
    pub to: LemmaId,
    pub relation: Relation,
}

#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SemanticNetwork {
    pub version: u32,
    pub concepts: Vec<Concept>,
    pub edges: Vec<SemanticEdge>,
}

/// `word` → `"плеч:ROOT/о:END"`-style morpheme segmentation.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SegmentationEntry {
    pub word: String,
    pub segmentation: String,
}

/// Affixes attested with a key (`root_POS` or `POS`).
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Concordance {
    pub key: String,
    pub affixes: Vec<String>,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SuffixRule {
    pub suffix: String,
    /// Suffixes that overlap with this one; never offered together as candidates.
    #[cfg_attr(feature = "serde", serde(default))]
    pub excludes: Vec<String>,
    /// Suffixes that cannot be added to a word already carrying this one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub incompatible: Vec<String>,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct AspectPair {
    pub imperfective: String,
    pub perfective: String,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Frequency {
    pub lemma: String,
    /// Instances per million.
    pub ipm: f64,
}

/// Every curated table the engine consumes, compiled as one archive.
#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[archive(check_bytes)]
pub struct ResourceBundle {
    pub version: u32,
    pub dictionary: Dictionary,
    pub semantics: SemanticNetwork,
    pub segmentation: Vec<SegmentationEntry>,
    pub prefix_roots: Vec<Concordance>,
    pub suffix_roots: Vec<Concordance>,
    pub suffix_pos: Vec<Concordance>,
    pub derivational_suffixes: Vec<SuffixRule>,
    pub inflectional_suffixes: Vec<String>,
    pub aspect_pairs: Vec<AspectPair>,
    pub frequencies: Vec<Frequency>,
}
