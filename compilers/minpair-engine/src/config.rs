use minpair_protocol::Phenomenon;
use serde::{Deserialize, Serialize};

/// Run settings, read from `--config` JSON and overridden by command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Phenomena to run; empty runs every registered one.
    pub phenomena: Vec<Phenomenon>,
    /// Domain tag for sentences whose CoNLL-U block carries none.
    pub domain: Option<String>,
    pub max_sentences: Option<usize>,
    /// Worker threads; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl GeneratorConfig {
    /// The selected phenomena in registry order, duplicates dropped.
    pub fn selected(&self) -> Vec<Phenomenon> {
        if self.phenomena.is_empty() {
            return Phenomenon::ALL.to_vec();
        }
        Phenomenon::ALL
            .iter()
            .copied()
            .filter(|p| self.phenomena.contains(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"phenomena": ["verb_tense", "np_agreement_case", "verb_tense"], "threads": 2}"#)
                .unwrap();
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.max_sentences, None);
        assert_eq!(config.selected(), vec![Phenomenon::NpCase, Phenomenon::VerbTense]);
    }

    #[test]
    fn test_defaults_select_everything() {
        let config: GeneratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.selected().len(), Phenomenon::ALL.len());
        assert!(serde_json::from_str::<GeneratorConfig>(r#"{"phenomena": ["np_agreement_tense"]}"#).is_err());
        assert!(serde_json::from_str::<GeneratorConfig>(r#"{"workers": 4}"#).is_err());
    }
}
