//! Selection of the most and least relevant passages.
//!
//! Rankings are lists of 1-based passage indices into the scored sequence;
//! the sequence itself is never reordered.

use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    error::{Error, Result},
    scoring::ScoredPassage,
};

/// Default number of top passages.
pub const DEFAULT_TOP_K: usize = 3;

/// Default number of weak passages considered before overlap removal.
pub const DEFAULT_WEAK_K: usize = 3;

/// Minimum passage count before weak passages are computed at all.
pub const MIN_PASSAGES_FOR_WEAK: usize = 4;

/// Outcome of weak-passage selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "indices", rename_all = "snake_case")]
pub enum WeakPassages {
    /// Fewer passages than the minimum; weak passages were not computed.
    NotEnoughPassages,
    /// Computed, but every candidate was already a top passage.
    AllRelevant,
    /// Indices of weak passages, least relevant first.
    Found(Vec<usize>),
}

impl WeakPassages {
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::Found(indices) => indices,
            Self::NotEnoughPassages | Self::AllRelevant => &[],
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }
}

/// Top and weak passage indices for a scored sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    /// Most relevant first, ties by ascending index.
    pub top: Vec<usize>,
    pub weak: WeakPassages,
}

impl Ranking {
    pub fn is_top(&self, index: usize) -> bool {
        self.top.contains(&index)
    }

    pub fn is_weak(&self, index: usize) -> bool {
        self.weak.contains(index)
    }
}

/// Ranking limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    pub top_k: usize,
    pub weak_k: usize,
    pub min_passages_for_weak: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            weak_k: DEFAULT_WEAK_K,
            min_passages_for_weak: MIN_PASSAGES_FOR_WEAK,
        }
    }
}

impl RankingLimits {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("top passage count", self.top_k),
            ("weak passage count", self.weak_k),
            ("minimum passages for weak selection", self.min_passages_for_weak),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}

/// Rank scored passages.
///
/// Returns `None` when the passages carry no scores (no query was given).
/// Top passages are the `top_k` highest scores; weak passages are the
/// `weak_k` lowest scores with any top passage removed afterwards, without
/// backfilling.
pub fn rank(passages: &[ScoredPassage], limits: &RankingLimits) -> Option<Ranking> {
    let scored: Vec<(usize, f32)> = passages
        .iter()
        .map(|p| p.score.map(|s| (p.index(), s)))
        .collect::<Option<_>>()?;

    if scored.is_empty() {
        return None;
    }

    let top = top_indices(&scored, limits.top_k);

    let weak = if scored.len() < limits.min_passages_for_weak {
        WeakPassages::NotEnoughPassages
    } else {
        let weak: Vec<usize> = bottom_indices(&scored, limits.weak_k)
            .into_iter()
            .filter(|index| !top.contains(index))
            .collect();
        if weak.is_empty() {
            WeakPassages::AllRelevant
        } else {
            WeakPassages::Found(weak)
        }
    };

    Some(Ranking { top, weak })
}

fn top_indices(scored: &[(usize, f32)], k: usize) -> Vec<usize> {
    select(scored, k, |a, b| b.total_cmp(a))
}

fn bottom_indices(scored: &[(usize, f32)], k: usize) -> Vec<usize> {
    select(scored, k, |a, b| a.total_cmp(b))
}

/// Stable sort by score with `cmp`, keeping original order among ties.
fn select(
    scored: &[(usize, f32)],
    k: usize,
    cmp: impl Fn(&f32, &f32) -> Ordering,
) -> Vec<usize> {
    let mut ordered = scored.to_vec();
    ordered.sort_by(|(_, a), (_, b)| cmp(a, b));
    ordered.into_iter().take(k).map(|(index, _)| index).collect()
}
