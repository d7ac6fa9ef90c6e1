//! Canonical assignee identities and raw-name normalization.
//!
//! Every raw assignee string seen in ticket data resolves to exactly one
//! canonical [`Tech`] or to none at all. Training evaluation and live
//! serving both go through [`Tech::normalize`], so ground truth and
//! predictions always live in the same identity space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical dispatch identities.
///
/// Two staff members share the first name Carl, so they carry short codes
/// ("Carl L", "Carl T") instead of a bare first name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tech {
    #[serde(rename = "Carl L")]
    CarlL,
    #[serde(rename = "Carl T")]
    CarlT,
    #[serde(rename = "Michael")]
    Michael,
    #[serde(rename = "Jomaree")]
    Jomaree,
    #[serde(rename = "Jorenzo")]
    Jorenzo,
}

/// Alias table, evaluated top-down; the first matching pattern wins.
///
/// Order is load-bearing: full-name patterns sit above the short forms
/// they contain, so "Carl Labrador" never falls through to a bare-name
/// entry.
const ALIASES: &[(&str, Tech)] = &[
    ("Carl Labrador", Tech::CarlL),
    ("Carl Tagle", Tech::CarlT),
    ("Carl L", Tech::CarlL),
    ("Carl T", Tech::CarlT),
    ("Michael", Tech::Michael),
    ("Jomaree", Tech::Jomaree),
    ("Jorenzo", Tech::Jorenzo),
];

/// A bare "Carl" is ambiguous between Carl L and Carl T. Assignment policy
/// says short-form references default to Carl T unless the fuller name is
/// present. Keep this in sync with the dispatch roster.
const AMBIGUOUS_FIRST_NAME: &str = "Carl";
const AMBIGUOUS_DEFAULT: Tech = Tech::CarlT;

impl Tech {
    pub const ALL: [Tech; 5] = [
        Tech::CarlL,
        Tech::CarlT,
        Tech::Michael,
        Tech::Jomaree,
        Tech::Jorenzo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tech::CarlL => "Carl L",
            Tech::CarlT => "Carl T",
            Tech::Michael => "Michael",
            Tech::Jomaree => "Jomaree",
            Tech::Jorenzo => "Jorenzo",
        }
    }

    /// Resolve a raw assignee string to a canonical identity.
    ///
    /// Substring match against the ordered alias table; empty, absent and
    /// unknown names all resolve to `None`.
    pub fn normalize(raw: Option<&str>) -> Option<Tech> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }
        for (pattern, tech) in ALIASES {
            if raw.contains(pattern) {
                return Some(*tech);
            }
        }
        if raw == AMBIGUOUS_FIRST_NAME {
            return Some(AMBIGUOUS_DEFAULT);
        }
        None
    }
}

impl fmt::Display for Tech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
