use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    chunking::{self, DEFAULT_CHUNK_SIZE},
    embedding::Embedder,
    error::{Error, Result},
    ranking::{self, Ranking, RankingLimits, WeakPassages},
    scoring::{self, ScoredPassage},
};

/// Tunable parameters of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Words per passage.
    pub chunk_size: usize,
    pub limits: RankingLimits,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            limits: RankingLimits::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1".into()));
        }
        self.limits.validate()
    }
}

/// Outcome of [`analyze`].
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// The content was empty after trimming; nothing was analyzed.
    Empty,
    Complete(AnalysisResult),
}

impl Analysis {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Empty => None,
            Self::Complete(result) => Some(result),
        }
    }

    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            Self::Empty => None,
            Self::Complete(result) => Some(result),
        }
    }
}

/// Scored passages plus their top/weak rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    query: Option<String>,
    passages: Vec<ScoredPassage>,
    ranking: Option<Ranking>,
}

impl AnalysisResult {
    /// Assemble a result from scored passages, ranking them when scores are
    /// present.
    pub fn assemble(
        query: Option<&str>,
        passages: Vec<ScoredPassage>,
        limits: &RankingLimits,
    ) -> Self {
        let ranking = ranking::rank(&passages, limits);
        Self {
            query: scoring::normalize_query(query).map(str::to_string),
            passages,
            ranking,
        }
    }

    /// The query the passages were scored against, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// All passages in original order.
    pub fn passages(&self) -> &[ScoredPassage] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Whether the passages carry scores.
    pub fn is_scored(&self) -> bool {
        self.ranking.is_some()
    }

    pub fn ranking(&self) -> Option<&Ranking> {
        self.ranking.as_ref()
    }

    /// Look up a passage by its 1-based index.
    pub fn passage(&self, index: usize) -> Option<&ScoredPassage> {
        index
            .checked_sub(1)
            .and_then(|i| self.passages.get(i))
            .filter(|p| p.index() == index)
    }

    /// Top passages, most relevant first. Empty when unscored.
    pub fn top_passages(&self) -> Vec<&ScoredPassage> {
        self.resolve(self.ranking.as_ref().map(|r| r.top.as_slice()))
    }

    /// Weak passages, least relevant first. Empty when unscored or when
    /// none qualify; see [`AnalysisResult::weak_status`] to tell apart.
    pub fn weak_passages(&self) -> Vec<&ScoredPassage> {
        self.resolve(self.ranking.as_ref().map(|r| r.weak.indices()))
    }

    /// Weak selection outcome, `None` when unscored.
    pub fn weak_status(&self) -> Option<&WeakPassages> {
        self.ranking.as_ref().map(|r| &r.weak)
    }

    pub fn is_top(&self, index: usize) -> bool {
        self.ranking.as_ref().is_some_and(|r| r.is_top(index))
    }

    pub fn is_weak(&self, index: usize) -> bool {
        self.ranking.as_ref().is_some_and(|r| r.is_weak(index))
    }

    /// Chart series of `(label, score)`, skipping unscored passages.
    pub fn score_series(&self) -> Vec<(String, f32)> {
        self.passages
            .iter()
            .filter_map(|p| p.score.map(|s| (p.label(), s)))
            .collect()
    }

    /// Scores keyed by passage index, with `None` for unscored passages.
    pub fn scores_by_index(&self) -> BTreeMap<usize, Option<f32>> {
        self.passages.iter().map(|p| (p.index(), p.score)).collect()
    }

    fn resolve(&self, indices: Option<&[usize]>) -> Vec<&ScoredPassage> {
        indices
            .unwrap_or_default()
            .iter()
            .filter_map(|&i| self.passage(i))
            .collect()
    }
}

/// Analyze content against an optional query.
///
/// 1. Split the content into word-window passages
/// 2. Encode query and passages (only when a query is present)
/// 3. Score each passage by cosine similarity
/// 4. Rank top and weak passages
///
/// Returns [`Analysis::Empty`] without touching the embedder when the
/// content is blank. Embedder failures are returned unchanged.
pub fn analyze<E: Embedder + ?Sized>(
    embedder: &E,
    content: &str,
    query: Option<&str>,
    options: &AnalysisOptions,
) -> Result<Analysis> {
    options.validate()?;

    let passages = chunking::chunk_words(content, options.chunk_size);
    if passages.is_empty() {
        tracing::debug!("content is empty, skipping analysis");
        return Ok(Analysis::Empty);
    }

    tracing::debug!(
        passages = passages.len(),
        chunk_size = options.chunk_size,
        has_query = scoring::normalize_query(query).is_some(),
        "analyzing content"
    );

    let scored = scoring::score_passages(embedder, passages, query)?;
    Ok(Analysis::Complete(AnalysisResult::assemble(
        query,
        scored,
        &options.limits,
    )))
}
