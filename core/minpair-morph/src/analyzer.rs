use minpair_protocol::{MorphFlags, PartOfSpeech};

/// One reading of a surface form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub features: MorphFlags,
    /// Frequency rank of the lemma; lower is more frequent.
    pub rank: Option<u32>,
}

/// Analyzer/synthesizer seam. Implementations are read-only and shared across workers.
pub trait MorphAnalyzer: Send + Sync {
    /// Every reading of `form`, in analyzer order.
    fn analyze(&self, form: &str) -> Vec<Analysis>;

    /// The form of `lemma` carrying at least `features`, if the paradigm has one.
    fn synthesize(&self, lemma: &str, pos: PartOfSpeech, features: MorphFlags) -> Option<String>;

    /// Full paradigm of `lemma` as (features, form) cells.
    fn paradigm(&self, lemma: &str, pos: PartOfSpeech) -> Vec<(MorphFlags, String)>;

    fn is_known(&self, form: &str) -> bool {
        !self.analyze(form).is_empty()
    }

    /// Grammemes shared by every cell of the paradigm (gender, animacy, aspect).
    fn lexical(&self, lemma: &str, pos: PartOfSpeech) -> Option<MorphFlags> {
        self.paradigm(lemma, pos)
            .into_iter()
            .map(|(features, _)| features)
            .reduce(|acc, features| acc & features)
    }

    fn rank(&self, lemma: &str, pos: PartOfSpeech) -> Option<u32>;
}
