//! Tabular CSV export of analysis results.
//!
//! The table has one row per passage with the columns `Passage #`, `Text`
//! and `Retrievability Score`. Unscored passages leave the score field
//! empty. There is no separate index column; the passage label carries it.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{
    analysis::AnalysisResult,
    chunking::parse_passage_label,
    error::Result,
};

/// Default file name for exported results.
pub const DEFAULT_EXPORT_FILE: &str = "passageiq_results.csv";

/// One exported passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Passage #")]
    pub passage: String,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Retrievability Score")]
    pub score: Option<f32>,
}

impl ExportRow {
    /// Passage index parsed from the label.
    pub fn index(&self) -> Option<usize> {
        parse_passage_label(&self.passage)
    }
}

impl AnalysisResult {
    /// Rows of the export table, in passage order.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.passages()
            .iter()
            .map(|p| ExportRow {
                passage: p.label(),
                text: p.text().to_string(),
                score: p.score,
            })
            .collect()
    }

    /// Write the export table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in self.export_rows() {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Parse a CSV export back into rows.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in csv.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chunking::chunk_words,
        ranking::RankingLimits,
        scoring::ScoredPassage,
    };

    fn result(scores: Option<&[f32]>, content: &str) -> AnalysisResult {
        let passages = chunk_words(content, 2)
            .into_iter()
            .enumerate()
            .map(|(i, passage)| ScoredPassage {
                passage,
                score: scores.map(|s| s[i]),
            })
            .collect();
        AnalysisResult::assemble(
            scores.map(|_| "query"),
            passages,
            &RankingLimits::default(),
        )
    }

    #[test]
    fn header_and_rows() {
        let csv = result(Some(&[0.5, 0.25]), "a b c").to_csv_string().unwrap();
        assert_eq!(
            csv,
            "Passage #,Text,Retrievability Score\n\
             Passage 1,a b,0.5\n\
             Passage 2,c,0.25\n"
        );
    }

    #[test]
    fn null_scores_are_empty_fields() {
        let csv = result(None, "a b c").to_csv_string().unwrap();
        assert!(csv.contains("Passage 1,a b,\n"));
    }

    #[test]
    fn text_with_quotes_and_commas_is_escaped() {
        let csv = result(None, "\"hi\", there").to_csv_string().unwrap();
        assert!(csv.contains("\"\"\"hi\"\", there\""));
    }

    #[test]
    fn roundtrip_recovers_rows() {
        let original = result(Some(&[0.912, 0.1, 0.333]), "x, y \"z\" w v");
        let csv = original.to_csv_string().unwrap();
        let rows = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows, original.export_rows());
        let indices: Vec<Option<usize>> = rows.iter().map(ExportRow::index).collect();
        assert_eq!(indices, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn roundtrip_preserves_nulls() {
        let original = result(None, "a b c d");
        let rows = read_csv(original.to_csv_string().unwrap().as_bytes()).unwrap();
        assert!(rows.iter().all(|r| r.score.is_none()));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn rejects_malformed_scores() {
        let csv = "Passage #,Text,Retrievability Score\nPassage 1,a,high\n";
        assert!(read_csv(csv.as_bytes()).is_err());
    }
}
