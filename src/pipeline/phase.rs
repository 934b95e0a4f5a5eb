use crate::config::PhaseFlags;
use serde::Serialize;
use std::fmt;

/// Phases that fan out across backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Collection,
    /// Enrichment restricted to identity extraction
    Identities,
    Enrichment,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 3] = [
        PhaseKind::Collection,
        PhaseKind::Identities,
        PhaseKind::Enrichment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PhaseKind::Collection => "Data collection",
            PhaseKind::Identities => "Identities collection",
            PhaseKind::Enrichment => "Data enrichment",
        }
    }

    /// Name of the external operation the phase invokes
    pub fn operation(&self) -> &'static str {
        match self {
            PhaseKind::Collection => "collection",
            PhaseKind::Identities | PhaseKind::Enrichment => "enrichment",
        }
    }

    pub fn is_enabled(&self, flags: &PhaseFlags) -> bool {
        match self {
            PhaseKind::Collection => flags.collection,
            PhaseKind::Identities => flags.identities,
            PhaseKind::Enrichment => flags.enrichment,
        }
    }

    pub fn only_identities(&self) -> bool {
        matches!(self, PhaseKind::Identities)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
