//! Builders for scenario tests: CoNLL-U text in, pairs and report out.

use minpair_conllu::read_document;
use minpair_morph::Lexicon;
use minpair_protocol::{
    AspectPair, Concept, Concordance, Frequency, Lemma, LemmaId, MinimalPair, MorphFlags, Paradigm, ParadigmId,
    PartOfSpeech, Phenomenon, Relation, ResourceBundle, SegmentationEntry, SemanticEdge, SuffixRule,
};
use minpair_syntax::AnnotatedSentence;

use crate::config::GeneratorConfig;
use crate::generator::{GenerationReport, Generator};
use crate::resources::Resources;

pub const PLECHI: &str = "\
# sent_id = plechi
# text = Руками обхватила широкие плечи Окота.
1\tРуками\tрука\tNOUN\t_\tAnimacy=Inan|Case=Ins|Gender=Fem|Number=Plur\t2\tobl\t_\t_
2\tобхватила\tобхватить\tVERB\t_\tAspect=Perf|Gender=Fem|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin|Voice=Act\t0\troot\t_\t_
3\tширокие\tширокий\tADJ\t_\tAnimacy=Inan|Case=Acc|Degree=Pos|Number=Plur\t4\tamod\t_\t_
4\tплечи\tплечо\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Neut|Number=Plur\t2\tobj\t_\t_
5\tОкота\tОкот\tPROPN\t_\tAnimacy=Anim|Case=Gen|Gender=Masc|Number=Sing\t4\tnmod\t_\tSpaceAfter=No
6\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";

/// First sentence of a CoNLL-U document.
pub fn parse(doc: &str) -> AnnotatedSentence {
    read_document(doc, None)
        .expect("valid CoNLL-U")
        .into_iter()
        .next()
        .expect("at least one sentence")
}

/// A lemma given as explicit cells.
pub struct Word {
    lemma: String,
    pos: PartOfSpeech,
    lexical: MorphFlags,
    cells: Vec<(u64, String)>,
}

impl Word {
    pub fn new(lemma: &str, pos: PartOfSpeech, lexical: MorphFlags) -> Self {
        Self {
            lemma: lemma.to_string(),
            pos,
            lexical,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, features: MorphFlags, form: &str) -> Self {
        self.cells.push((features.bits(), form.to_string()));
        self
    }
}

pub struct Fixture {
    bundle: ResourceBundle,
}

impl Fixture {
    pub fn new() -> Self {
        let mut bundle = ResourceBundle::default();
        bundle.dictionary.paradigms.push(Paradigm {
            id: ParadigmId(0),
            endings: Vec::new(),
        });
        Self { bundle }
    }

    pub fn word(mut self, word: Word) -> Self {
        let id = LemmaId(self.bundle.dictionary.lemmas.len() as u32 + 1);
        self.bundle.dictionary.lemmas.push(Lemma {
            id,
            text: word.lemma,
            pos: word.pos,
            stem: String::new(),
            paradigm: ParadigmId(0),
            lexical: word.lexical.bits(),
            rank: None,
            forms: word.cells,
        });
        self
    }

    pub fn concepts(mut self, concepts: &[(u32, &str)]) -> Self {
        self.bundle.semantics.concepts.extend(concepts.iter().map(|(id, label)| Concept {
            id: LemmaId(*id),
            label: label.to_string(),
        }));
        self
    }

    fn edge(mut self, from: u32, to: u32, relation: Relation) -> Self {
        self.bundle.semantics.edges.push(SemanticEdge {
            from: LemmaId(from),
            to: LemmaId(to),
            relation,
        });
        self
    }

    pub fn is_a(self, from: u32, to: u32) -> Self {
        self.edge(from, to, Relation::IsA)
    }

    pub fn has_attribute(self, from: u32, to: u32) -> Self {
        self.edge(from, to, Relation::HasAttribute)
    }

    pub fn segment(mut self, word: &str, segmentation: &str) -> Self {
        self.bundle.segmentation.push(SegmentationEntry {
            word: word.to_string(),
            segmentation: segmentation.to_string(),
        });
        self
    }

    fn concordance(key: &str, affixes: &[&str]) -> Concordance {
        Concordance {
            key: key.to_string(),
            affixes: affixes.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn prefixes_for_root(mut self, key: &str, prefixes: &[&str]) -> Self {
        self.bundle.prefix_roots.push(Self::concordance(key, prefixes));
        self
    }

    pub fn suffixes_for_root(mut self, key: &str, suffixes: &[&str]) -> Self {
        self.bundle.suffix_roots.push(Self::concordance(key, suffixes));
        self
    }

    pub fn suffixes_for_pos(mut self, pos: &str, suffixes: &[&str]) -> Self {
        self.bundle.suffix_pos.push(Self::concordance(pos, suffixes));
        self
    }

    pub fn derivational(mut self, suffix: &str, excludes: &[&str], incompatible: &[&str]) -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        self.bundle.derivational_suffixes.push(SuffixRule {
            suffix: suffix.to_string(),
            excludes: owned(excludes),
            incompatible: owned(incompatible),
        });
        self
    }

    pub fn aspect_pair(mut self, imperfective: &str, perfective: &str) -> Self {
        self.bundle.aspect_pairs.push(AspectPair {
            imperfective: imperfective.to_string(),
            perfective: perfective.to_string(),
        });
        self
    }

    pub fn frequency(mut self, lemma: &str, ipm: f64) -> Self {
        self.bundle.frequencies.push(Frequency {
            lemma: lemma.to_string(),
            ipm,
        });
        self
    }

    pub fn resources(&self) -> Resources {
        Resources::from_bundle(&self.bundle).expect("fixture resources load")
    }

    pub fn load(&self) -> (Resources, Lexicon) {
        Resources::load(&self.bundle).expect("fixture bundle loads")
    }

    /// Runs `phenomena` (all of them when empty) over every sentence of `doc`.
    pub fn generate(&self, doc: &str, phenomena: &[Phenomenon]) -> (Vec<MinimalPair>, GenerationReport) {
        let (resources, lexicon) = self.load();
        let sentences = read_document(doc, None).expect("valid CoNLL-U");
        let config = GeneratorConfig {
            phenomena: phenomena.to_vec(),
            ..Default::default()
        };
        Generator::from_config(&lexicon, &resources, &config).generate(&sentences)
    }
}
