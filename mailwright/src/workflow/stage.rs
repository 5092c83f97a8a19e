//! Workflow stages

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which panel of the workflow is active
///
/// Stages never gate data validity: a user may select any stage at any time.
/// Only the actions issued from a stage are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Prompt and credential entry
    #[default]
    Compose,
    /// Review and edit the generated email
    Preview,
    /// Recipients, sender identity and dispatch
    Send,
}

impl Stage {
    /// All stages in workflow order
    pub const ALL: [Self; 3] = [Self::Compose, Self::Preview, Self::Send];

    /// Tab label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compose => "Compose",
            Self::Preview => "Preview",
            Self::Send => "Send",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
