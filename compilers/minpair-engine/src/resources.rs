use std::collections::HashMap;

use minpair_lexicon::SemanticGraph;
use minpair_morph::orthography::normalize;
use minpair_morph::{parse_segmentation, Lexicon, Segmentation};
use minpair_protocol::{ResourceBundle, SuffixRule};
use rkyv::Deserialize;
use tracing::{info, warn};

use crate::error::ResourceError;

/// Read-only curated tables, shared by reference across workers.
#[derive(Default)]
pub struct Resources {
    pub semantics: SemanticGraph,
    segmentation: HashMap<String, Segmentation>,
    prefix_roots: HashMap<String, Vec<String>>,
    suffix_roots: HashMap<String, Vec<String>>,
    suffix_pos: HashMap<String, Vec<String>>,
    derivational: HashMap<String, SuffixRule>,
    inflectional: Vec<String>,
    perfectives: HashMap<String, Vec<String>>,
    frequencies: HashMap<String, f64>,
}

impl Resources {
    pub fn from_bundle(bundle: &ResourceBundle) -> Result<Self, ResourceError> {
        let semantics = SemanticGraph::from_network(&bundle.semantics)?;

        let mut segmentation = HashMap::new();
        for entry in &bundle.segmentation {
            match parse_segmentation(&entry.segmentation) {
                Ok(parsed) => {
                    segmentation.insert(normalize(&entry.word), parsed);
                }
                Err(e) => warn!(word = %entry.word, error = %e, "skipping segmentation"),
            }
        }

        let concordance = |rows: &[minpair_protocol::Concordance]| {
            rows.iter()
                .map(|row| (row.key.clone(), row.affixes.clone()))
                .collect::<HashMap<_, _>>()
        };

        let mut perfectives: HashMap<String, Vec<String>> = HashMap::new();
        for pair in &bundle.aspect_pairs {
            perfectives
                .entry(normalize(&pair.imperfective))
                .or_default()
                .push(pair.perfective.clone());
        }

        let resources = Self {
            semantics,
            segmentation,
            prefix_roots: concordance(&bundle.prefix_roots),
            suffix_roots: concordance(&bundle.suffix_roots),
            suffix_pos: concordance(&bundle.suffix_pos),
            derivational: bundle
                .derivational_suffixes
                .iter()
                .map(|rule| (rule.suffix.clone(), rule.clone()))
                .collect(),
            inflectional: bundle.inflectional_suffixes.clone(),
            perfectives,
            frequencies: bundle
                .frequencies
                .iter()
                .map(|f| (normalize(&f.lemma), f.ipm))
                .collect(),
        };
        info!(
            concepts = resources.semantics.len(),
            segmented = resources.segmentation.len(),
            aspect_pairs = bundle.aspect_pairs.len(),
            "resources loaded"
        );
        Ok(resources)
    }

    /// Validates and deserializes a compiled bundle.
    pub fn bundle_from_archive(bytes: &[u8]) -> Result<ResourceBundle, ResourceError> {
        let archived = rkyv::check_archived_root::<ResourceBundle>(bytes)
            .map_err(|e| ResourceError::Archive(e.to_string()))?;
        archived
            .deserialize(&mut rkyv::Infallible)
            .map_err(|_| ResourceError::Archive("deserialization failed".to_string()))
    }

    /// Tables plus the paradigm lexicon built from the same bundle.
    pub fn load(bundle: &ResourceBundle) -> Result<(Self, Lexicon), ResourceError> {
        let lexicon = Lexicon::from_dictionary(&bundle.dictionary)?;
        Ok((Self::from_bundle(bundle)?, lexicon))
    }

    pub fn segmentation(&self, lemma: &str) -> Option<&Segmentation> {
        self.segmentation.get(&normalize(lemma))
    }

    /// Prefixes attested with `root` for a part of speech (`"ROOT_POS"` key).
    pub fn prefixes_for(&self, root: &str, pos: &str) -> &[String] {
        self.prefix_roots
            .get(&format!("{root}_{pos}"))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn suffixes_for_root(&self, root: &str, pos: &str) -> &[String] {
        self.suffix_roots
            .get(&format!("{root}_{pos}"))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn suffixes_for_pos(&self, pos: &str) -> &[String] {
        self.suffix_pos.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn derivational(&self, suffix: &str) -> Option<&SuffixRule> {
        self.derivational.get(suffix)
    }

    pub fn is_inflectional(&self, suffix: &str) -> bool {
        self.inflectional.iter().any(|s| s == suffix)
    }

    /// Perfective partners of an imperfective lemma, most frequent first.
    pub fn perfectives(&self, imperfective: &str) -> Vec<&str> {
        let mut partners: Vec<&str> = self
            .perfectives
            .get(&normalize(imperfective))
            .map(|p| p.iter().map(String::as_str).collect())
            .unwrap_or_default();
        partners.sort_by(|a, b| self.ipm(b).total_cmp(&self.ipm(a)));
        partners
    }

    /// Instances per million; unknown lemmas count as zero.
    pub fn ipm(&self, lemma: &str) -> f64 {
        self.frequencies.get(&normalize(lemma)).copied().unwrap_or(0.0)
    }

    /// Lemmas of the frequency list, most frequent first, ties in lemma order.
    pub fn by_frequency(&self) -> Vec<(&str, f64)> {
        let mut lemmas: Vec<(&str, f64)> = self
            .frequencies
            .iter()
            .map(|(lemma, ipm)| (lemma.as_str(), *ipm))
            .collect();
        lemmas.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        lemmas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minpair_protocol::{AspectPair, Frequency, SegmentationEntry};
    use rkyv::ser::{serializers::AllocSerializer, Serializer};

    fn bundle() -> ResourceBundle {
        ResourceBundle {
            version: 1,
            segmentation: vec![
                SegmentationEntry {
                    word: "плечо".to_string(),
                    segmentation: "плеч:ROOT/о:END".to_string(),
                },
                SegmentationEntry {
                    word: "сломанное".to_string(),
                    segmentation: "???".to_string(),
                },
            ],
            aspect_pairs: vec![
                AspectPair { imperfective: "решать".to_string(), perfective: "порешать".to_string() },
                AspectPair { imperfective: "решать".to_string(), perfective: "решить".to_string() },
            ],
            frequencies: vec![
                Frequency { lemma: "решить".to_string(), ipm: 300.0 },
                Frequency { lemma: "порешать".to_string(), ipm: 0.5 },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_tables() {
        let resources = Resources::from_bundle(&bundle()).unwrap();
        assert_eq!(resources.segmentation("плечо").and_then(|s| s.root()), Some("плеч"));
        assert!(resources.segmentation("сломанное").is_none());
        assert_eq!(resources.perfectives("решать"), vec!["решить", "порешать"]);
        assert_eq!(resources.ipm("неведомо"), 0.0);
        assert_eq!(resources.by_frequency()[0].0, "решить");
    }

    #[test]
    fn test_archive_roundtrip() {
        let mut serializer = AllocSerializer::<256>::default();
        serializer.serialize_value(&bundle()).unwrap();
        let bytes = serializer.into_serializer().into_inner();

        let restored = Resources::bundle_from_archive(&bytes).unwrap();
        assert_eq!(restored.aspect_pairs.len(), 2);
        assert!(Resources::bundle_from_archive(&bytes[..bytes.len() / 2]).is_err());
    }
}
