use serde::Serialize;

use crate::{
    chunking::Passage,
    embedding::{self, Embedder},
    error::{Error, Result},
};

/// Number of decimal places kept in reported scores.
pub const SCORE_DECIMALS: i32 = 3;

/// A passage with its retrievability score.
///
/// `score` is `None` for every passage when no query was supplied, and
/// `Some` for every passage otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPassage {
    #[serde(flatten)]
    pub passage: Passage,
    pub score: Option<f32>,
}

impl ScoredPassage {
    pub fn index(&self) -> usize {
        self.passage.index
    }

    pub fn text(&self) -> &str {
        &self.passage.text
    }

    pub fn label(&self) -> String {
        self.passage.label()
    }
}

/// Normalize a raw query, returning `None` when it is missing or blank.
pub fn normalize_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

/// Score passages against an optional query.
///
/// Without a query the embedder is never called and every score is `None`.
/// With a query, the query and the passages are each encoded in one
/// embedder call and every passage gets the rounded cosine similarity.
pub fn score_passages<E: Embedder + ?Sized>(
    embedder: &E,
    passages: Vec<Passage>,
    query: Option<&str>,
) -> Result<Vec<ScoredPassage>> {
    let Some(query) = normalize_query(query) else {
        return Ok(passages
            .into_iter()
            .map(|passage| ScoredPassage {
                passage,
                score: None,
            })
            .collect());
    };

    if passages.is_empty() {
        return Ok(Vec::new());
    }

    let query_vector = embedding::embed_one(embedder, query)?;
    let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
    let passage_vectors = embedding::embed_batch(embedder, &texts)?;

    if let Some(passage_vector) = passage_vectors.first()
        && passage_vector.len() != query_vector.len()
    {
        return Err(Error::Embedder(format!(
            "query has dimension {}, passages have dimension {}",
            query_vector.len(),
            passage_vector.len()
        )));
    }

    tracing::debug!(
        passages = passages.len(),
        dimension = query_vector.len(),
        "scoring passages"
    );

    Ok(passages
        .into_iter()
        .zip(&passage_vectors)
        .map(|(passage, vector)| ScoredPassage {
            passage,
            score: Some(round_score(cosine_similarity(&query_vector, vector))),
        })
        .collect())
}

/// Cosine similarity of two vectors.
///
/// Both vectors must have the same length. Returns 0.0 when either vector
/// has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Round a score to [`SCORE_DECIMALS`] decimal places.
pub fn round_score(score: f32) -> f32 {
    let scale = 10f64.powi(SCORE_DECIMALS);
    // `+ 0.0` turns a rounded `-0.0` into `0.0`.
    ((f64::from(score) * scale).round() / scale + 0.0) as f32
}
