use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::git::GitBackend;

/// What the branch list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    CreationTime,
    CommitTime,
}

impl SortKey {
    /// Next key in the `s` cycle: name → committed → created → name.
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::CommitTime,
            Self::CommitTime => Self::CreationTime,
            Self::CreationTime => Self::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreationTime => "created",
            Self::CommitTime => "committed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "\u{2191}",
            Self::Descending => "\u{2193}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Footer indicator, e.g. `"name ↑"`.
    pub fn label(self) -> String {
        format!("{} {}", self.key.label(), self.direction.arrow())
    }
}

enum Decoration {
    Name,
    Time(Option<DateTime<Utc>>),
}

/// Reorder `branches` in place according to `state`.
///
/// Time keys are fetched once per branch before sorting. The sort is stable
/// and descending order flips the comparator, so branches with equal keys
/// keep their previous relative order in both directions. Missing
/// timestamps sort as the earliest.
pub fn sort_branches(branches: &mut Vec<String>, state: SortState, git: &dyn GitBackend) {
    let mut decorated: Vec<(Decoration, String)> = std::mem::take(branches)
        .into_iter()
        .map(|name| {
            let key = match state.key {
                SortKey::Name => Decoration::Name,
                SortKey::CreationTime => Decoration::Time(git.creation_time(&name)),
                SortKey::CommitTime => Decoration::Time(git.last_commit_time(&name)),
            };
            (key, name)
        })
        .collect();

    decorated.sort_by(|(ka, a), (kb, b)| {
        let ord = match (ka, kb) {
            (Decoration::Time(ta), Decoration::Time(tb)) => ta.cmp(tb),
            _ => a.as_bytes().cmp(b.as_bytes()),
        };
        apply_direction(ord, state.direction)
    });

    branches.extend(decorated.into_iter().map(|(_, name)| name));
}

fn apply_direction(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}
