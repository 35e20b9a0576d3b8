use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::ids::TokenId;
use crate::morphology::{MorphFlags, PartOfSpeech};

/// Universal Dependencies relation label, subtypes included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum DepRel {
    Root,
    Nsubj,
    NsubjPass,
    Csubj,
    CsubjPass,
    Obj,
    Iobj,
    Obl,
    OblAgent,
    Nmod,
    Amod,
    Det,
    Nummod,
    NummodGov,
    Advmod,
    Acl,
    AclRelcl,
    Case,
    Conj,
    Cc,
    Aux,
    AuxPass,
    Cop,
    Xcomp,
    Ccomp,
    Advcl,
    Appos,
    Flat,
    FlatName,
    Fixed,
    Mark,
    Parataxis,
    Punct,
    Other(String),
}

impl DepRel {
    pub fn from_label(label: &str) -> Self {
        match label {
            "root" => DepRel::Root,
            "nsubj" => DepRel::Nsubj,
            "nsubj:pass" => DepRel::NsubjPass,
            "csubj" => DepRel::Csubj,
            "csubj:pass" => DepRel::CsubjPass,
            "obj" => DepRel::Obj,
            "iobj" => DepRel::Iobj,
            "obl" => DepRel::Obl,
            "obl:agent" => DepRel::OblAgent,
            "nmod" => DepRel::Nmod,
            "amod" => DepRel::Amod,
            "det" => DepRel::Det,
            "nummod" => DepRel::Nummod,
            "nummod:gov" => DepRel::NummodGov,
            "advmod" => DepRel::Advmod,
            "acl" => DepRel::Acl,
            "acl:relcl" => DepRel::AclRelcl,
            "case" => DepRel::Case,
            "conj" => DepRel::Conj,
            "cc" => DepRel::Cc,
            "aux" => DepRel::Aux,
            "aux:pass" => DepRel::AuxPass,
            "cop" => DepRel::Cop,
            "xcomp" => DepRel::Xcomp,
            "ccomp" => DepRel::Ccomp,
            "advcl" => DepRel::Advcl,
            "appos" => DepRel::Appos,
            "flat" => DepRel::Flat,
            "flat:name" => DepRel::FlatName,
            "fixed" => DepRel::Fixed,
            "mark" => DepRel::Mark,
            "parataxis" => DepRel::Parataxis,
            "punct" => DepRel::Punct,
            other => DepRel::Other(String::from(other)),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DepRel::Root => "root",
            DepRel::Nsubj => "nsubj",
            DepRel::NsubjPass => "nsubj:pass",
            DepRel::Csubj => "csubj",
            DepRel::CsubjPass => "csubj:pass",
            DepRel::Obj => "obj",
            DepRel::Iobj => "iobj",
            DepRel::Obl => "obl",
            DepRel::OblAgent => "obl:agent",
            DepRel::Nmod => "nmod",
            DepRel::Amod => "amod",
            DepRel::Det => "det",
            DepRel::Nummod => "nummod",
            DepRel::NummodGov => "nummod:gov",
            DepRel::Advmod => "advmod",
            DepRel::Acl => "acl",
            DepRel::AclRelcl => "acl:relcl",
            DepRel::Case => "case",
            DepRel::Conj => "conj",
            DepRel::Cc => "cc",
            DepRel::Aux => "aux",
            DepRel::AuxPass => "aux:pass",
            DepRel::Cop => "cop",
            DepRel::Xcomp => "xcomp",
            DepRel::Ccomp => "ccomp",
            DepRel::Advcl => "advcl",
            DepRel::Appos => "appos",
            DepRel::Flat => "flat",
            DepRel::FlatName => "flat:name",
            DepRel::Fixed => "fixed",
            DepRel::Mark => "mark",
            DepRel::Parataxis => "parataxis",
            DepRel::Punct => "punct",
            DepRel::Other(label) => label.as_str(),
        }
    }

    pub fn is_subject(&self) -> bool {
        matches!(self, DepRel::Nsubj | DepRel::NsubjPass)
    }

    pub fn is_clausal_subject(&self) -> bool {
        matches!(self, DepRel::Csubj | DepRel::CsubjPass)
    }

    /// Relations that modify a nominal and would need re-inflection alongside it.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            DepRel::Amod
                | DepRel::Det
                | DepRel::Nmod
                | DepRel::Nummod
                | DepRel::NummodGov
                | DepRel::FlatName
                | DepRel::Appos
                | DepRel::Acl
                | DepRel::AclRelcl
        )
    }
}

/// One parsed word. Created once per parse, immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    pub upos: PartOfSpeech,
    pub features: MorphFlags,
    /// `None` for the root.
    pub head: Option<TokenId>,
    pub deprel: DepRel,
    pub space_after: bool,
}

impl Token {
    pub fn is_punct(&self) -> bool {
        self.upos == PartOfSpeech::Punctuation
    }

    pub fn has(&self, flags: MorphFlags) -> bool {
        self.features.contains(flags)
    }

    /// Lemma comparison insensitive to case and to ё/е spelling.
    pub fn lemma_is(&self, lemma: &str) -> bool {
        let mut left = self.lemma.chars().map(fold_char);
        let mut right = lemma.chars().map(fold_char);
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a == b => continue,
                _ => return false,
            }
        }
    }

    pub fn lemma_in(&self, lemmas: &[&str]) -> bool {
        lemmas.iter().any(|lemma| self.lemma_is(lemma))
    }

    /// Reflexive verbs end in -ся/-сь.
    pub fn is_reflexive_form(&self) -> bool {
        self.form.ends_with("ся") || self.form.ends_with("сь")
    }
}

fn fold_char(c: char) -> char {
    match c {
        'Ё' | 'ё' => 'е',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}
