use minpair_protocol::{MorphFlags, Phenomenon, TokenId};

/// A token between controller and target that carries a competing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attractor {
    pub token: TokenId,
    pub value: MorphFlags,
}

/// One match of a phenomenon's pattern. Transient: consumed by the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub phenomenon: Phenomenon,
    pub target: TokenId,
    pub controller: Option<TokenId>,
    pub attractor: Option<Attractor>,
    /// Marker, preposition or new host, depending on the phenomenon.
    pub anchor: Option<TokenId>,
    pub subtype: &'static str,
}

impl Candidate {
    pub fn new(phenomenon: Phenomenon, target: TokenId) -> Self {
        Self {
            phenomenon,
            target,
            controller: None,
            attractor: None,
            anchor: None,
            subtype: "plain",
        }
    }

    pub fn controlled_by(mut self, controller: TokenId) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn anchored_at(mut self, anchor: TokenId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn subtype(mut self, subtype: &'static str) -> Self {
        self.subtype = subtype;
        self
    }
}
