//! Pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One phase of the pipeline. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generate,
    Simulate,
    Extract,
    Summarize,
    Compare,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Generate,
        Stage::Simulate,
        Stage::Extract,
        Stage::Summarize,
        Stage::Compare,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Simulate => "simulate",
            Self::Extract => "extract",
            Self::Summarize => "summarize",
            Self::Compare => "compare",
        }
    }

    /// `stages` sorted into execution order, duplicates removed.
    #[must_use]
    pub fn ordered(stages: &[Stage]) -> Vec<Stage> {
        let mut out = stages.to_vec();
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
