use std::collections::BTreeSet;

/// Set differences between staged ids and the ids an index reports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdDiff {
    pub missing_from_remote: BTreeSet<String>,
    pub unexpected_in_remote: BTreeSet<String>,
}

impl IdDiff {
    pub fn between<L, R>(local: L, remote: R) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let local: BTreeSet<String> = local.into_iter().map(Into::into).collect();
        let remote: BTreeSet<String> = remote.into_iter().map(Into::into).collect();

        Self {
            missing_from_remote: local.difference(&remote).cloned().collect(),
            unexpected_in_remote: remote.difference(&local).cloned().collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.missing_from_remote.is_empty() && self.unexpected_in_remote.is_empty()
    }
}
