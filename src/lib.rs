//! passageiq - passage-level retrievability analysis.
//!
//! passageiq splits content into fixed-size word windows ("passages") and,
//! given a query, scores how semantically close each passage is to it using a
//! sentence embedding model run with
//! [candle](https://github.com/huggingface/candle). It then highlights the
//! most relevant passages and the weakest ones worth rewriting.
//!
//! # Quick start
//!
//! ```no_run
//! use passageiq::{AnalysisOptions, ModelManager, analyze};
//!
//! let model = ModelManager::shared(None);
//! let content = std::fs::read_to_string("draft.md").unwrap();
//!
//! let analysis = analyze(
//!     model,
//!     &content,
//!     Some("best credit cards for students"),
//!     &AnalysisOptions::default(),
//! )
//! .unwrap();
//!
//! if let Some(result) = analysis.result() {
//!     for p in result.top_passages() {
//!         println!("{} ({:?}): {}", p.label(), p.score, p.text());
//!     }
//!     print!("{}", result.to_csv_string().unwrap());
//! }
//! ```

pub mod analysis;
pub mod chunking;
pub mod embedding;
pub mod error;
pub mod export;
pub mod model_manager;
pub mod ranking;
pub mod report;
pub mod scoring;

pub use analysis::{Analysis, AnalysisOptions, AnalysisResult, analyze};
pub use chunking::Passage;
pub use embedding::{Embedder, EmbeddingVector};
pub use error::{Error, Result};
pub use model_manager::ModelManager;
pub use ranking::{Ranking, RankingLimits, WeakPassages};
pub use scoring::ScoredPassage;
