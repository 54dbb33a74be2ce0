use crate::error::{Error, Result};

/// A fixed-length embedding produced for one text.
pub type EmbeddingVector = Vec<f32>;

/// Maps texts to fixed-dimension vectors.
///
/// Implementations must be deterministic for a fixed model and return one
/// vector per input text, all of the same dimension. [`embed_batch`]
/// enforces the shape contract for callers.
pub trait Embedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn embed(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        (**self).embed(texts)
    }
}

/// Encode a batch of texts with a single embedder call and validate the
/// result shape.
///
/// Returns an empty vector without calling the embedder when `texts` is
/// empty.
pub fn embed_batch<E: Embedder + ?Sized>(
    embedder: &E,
    texts: &[String],
) -> Result<Vec<EmbeddingVector>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let vectors = embedder.embed(texts)?;
    check_shape(texts.len(), &vectors)?;
    Ok(vectors)
}

/// Encode a single text, returning its vector.
pub fn embed_one<E: Embedder + ?Sized>(
    embedder: &E,
    text: &str,
) -> Result<EmbeddingVector> {
    embed_batch(embedder, &[text.to_string()])?
        .pop()
        .ok_or_else(|| Error::Embedder("embedder returned no vectors".into()))
}

fn check_shape(expected: usize, vectors: &[EmbeddingVector]) -> Result<()> {
    if vectors.len() != expected {
        return Err(Error::Embedder(format!(
            "expected {expected} vectors, got {}",
            vectors.len()
        )));
    }

    let Some(first) = vectors.first() else {
        return Ok(());
    };
    let dimension = first.len();
    if dimension == 0 {
        return Err(Error::Embedder("embedder returned empty vectors".into()));
    }
    if let Some((i, v)) =
        vectors.iter().enumerate().find(|(_, v)| v.len() != dimension)
    {
        return Err(Error::Embedder(format!(
            "vector {i} has dimension {}, expected {dimension}",
            v.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Fixed {
        vectors: Vec<EmbeddingVector>,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn new(vectors: Vec<EmbeddingVector>) -> Self {
            Self {
                vectors,
                calls: Cell::new(0),
            }
        }
    }

    impl Embedder for Fixed {
        fn embed(&self, _texts: &[String]) -> Result<Vec<EmbeddingVector>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.vectors.clone())
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("text {i}")).collect()
    }

    #[test]
    fn empty_batch_skips_embedder() {
        let embedder = Fixed::new(vec![vec![1.0]]);
        let out = embed_batch(&embedder, &[]).unwrap();
        assert!(out.is_empty());
        assert_eq!(embedder.calls.get(), 0);
    }

    #[test]
    fn batch_uses_one_call() {
        let embedder = Fixed::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let out = embed_batch(&embedder, &texts(2)).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(embedder.calls.get(), 1);
    }

    #[test]
    fn count_mismatch_is_an_embedder_error() {
        let embedder = Fixed::new(vec![vec![1.0, 0.0]]);
        let err = embed_batch(&embedder, &texts(2)).unwrap_err();
        assert!(matches!(err, Error::Embedder(_)));
    }

    #[test]
    fn ragged_dimensions_are_rejected() {
        let embedder = Fixed::new(vec![vec![1.0, 0.0], vec![1.0]]);
        let err = embed_batch(&embedder, &texts(2)).unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let embedder = Fixed::new(vec![vec![]]);
        assert!(embed_batch(&embedder, &texts(1)).is_err());
    }

    #[test]
    fn embed_one_returns_single_vector() {
        let embedder = Fixed::new(vec![vec![0.5, 0.5]]);
        assert_eq!(embed_one(&embedder, "q").unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn works_through_trait_object() {
        let embedder = Fixed::new(vec![vec![1.0]]);
        let dynamic: &dyn Embedder = &embedder;
        assert_eq!(embed_batch(dynamic, &texts(1)).unwrap().len(), 1);
    }
}
