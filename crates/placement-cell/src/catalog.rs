//! Global skill and language catalogs.
//!
//! Names are unique case-insensitively: "Python" and "python" resolve to the
//! same entry. Entries are attached to users (resume side) and to recruitment
//! posts (requirement side).

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SkillId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct LanguageId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
}

/// Canonical lookup key for catalog names.
pub fn normalized(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_folds_case_and_whitespace() {
        assert_eq!(normalized("  Python "), "python");
        assert_eq!(normalized("python"), normalized("PYTHON"));
    }
}
