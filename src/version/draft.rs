//! Draft tag selection.

use serde::{Deserialize, Serialize};

/// A provisional release marker `v{version}-draft.{N}` and the commit it pins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTag {
    /// Tag name
    pub name: String,
    /// Commit the tag points at
    pub sha: String,
}

impl DraftTag {
    /// Create a draft tag
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha: sha.into(),
        }
    }

    /// Draft number `N` if this is a draft of `version`
    pub fn draft_number(&self, version: &str) -> Option<u64> {
        self.name
            .strip_prefix('v')?
            .strip_prefix(version)?
            .strip_prefix("-draft.")?
            .parse()
            .ok()
    }
}

/// Latest draft of `version`: the highest numeric `N`, not the
/// lexicographically greatest name.
pub fn select_most_recent_draft_tag<'a, I>(tags: I, version: &str) -> Option<DraftTag>
where
    I: IntoIterator<Item = &'a DraftTag>,
{
    tags.into_iter()
        .filter_map(|tag| tag.draft_number(version).map(|n| (n, tag)))
        .max_by_key(|(n, _)| *n)
        .map(|(_, tag)| tag.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_numeric_suffix_wins() {
        let tags = vec![
            DraftTag::new("v0.0.3-draft.2", "sha2"),
            DraftTag::new("v0.0.3-draft.11", "sha11"),
            DraftTag::new("v0.1.3-draft.0", "other"),
        ];
        assert_eq!(
            select_most_recent_draft_tag(&tags, "0.0.3"),
            Some(DraftTag::new("v0.0.3-draft.11", "sha11"))
        );
    }

    #[test]
    fn test_no_draft_for_version() {
        let tags = vec![
            DraftTag::new("v0.0.3", "sha"),
            DraftTag::new("v0.0.30-draft.1", "sha"),
            DraftTag::new("v0.0.3-draft.x", "sha"),
        ];
        assert_eq!(select_most_recent_draft_tag(&tags, "0.0.3"), None);
    }
}
