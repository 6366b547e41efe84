use crate::core::eligibility::EligibilityRelation;
use crate::models::ScoringParams;
use std::collections::{BTreeMap, HashMap};

/// Document-frequency pruning only applies to corpora at least this large;
/// on small corpora it would remove most of the shared vocabulary
const MIN_DOCS_FOR_DF_PRUNING: usize = 1000;

/// Dense sponsor × candidate similarity matrix, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ScoreMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy with every forbidden pair forced to zero
    pub fn masked(&self, eligibility: &EligibilityRelation) -> Self {
        let mut out = self.clone();
        for r in 0..self.rows {
            for c in 0..self.cols {
                if eligibility.is_excluded(r, c) {
                    out.set(r, c, 0.0);
                }
            }
        }
        out
    }
}

/// Split profile text into lower-cased alphanumeric terms
pub fn tokenize(text: &str, params: &ScoringParams) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= params.min_token_len)
        .map(str::to_lowercase)
        .filter(|t| !params.stop_words.iter().any(|w| w == t))
        .collect()
}

/// L2-normalised sparse vector, sorted by term index
type SparseVector = Vec<(usize, f64)>;

/// Term-frequency × inverse-document-frequency model over a fixed corpus
#[derive(Debug, Clone)]
pub struct TfIdf {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdf {
    /// Fit vocabulary and IDF weights
    ///
    /// IDF uses the smoothed form `ln((1 + N) / (1 + df)) + 1`, so a term
    /// present in every document keeps a small positive weight.
    pub fn fit(documents: &[Vec<String>], params: &ScoringParams) -> Self {
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in documents {
            let mut seen: Vec<&str> = doc.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len();
        let prune_ratio = params
            .max_document_frequency
            .filter(|_| n >= MIN_DOCS_FOR_DF_PRUNING);

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::new();
        for (term, df) in document_frequency {
            if let Some(ratio) = prune_ratio {
                if df as f64 / n as f64 > ratio {
                    continue;
                }
            }
            vocabulary.insert(term.to_string(), idf.len());
            idf.push(((1.0 + n as f64) / (1.0 + df as f64)).ln() + 1.0);
        }

        Self { vocabulary, idf }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Weight one tokenised document; raw counts reward repeated fields
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        vector.sort_unstable_by_key(|(index, _)| *index);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in vector.iter_mut() {
                *w /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity of two normalised sparse vectors
fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j, mut dot) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0)
}

/// Score every sponsor profile against every candidate profile
///
/// The model is fitted on the union of both populations so that the two
/// sides share one vocabulary. Eligibility is not consulted here.
pub fn score_profiles(
    sponsor_profiles: &[String],
    candidate_profiles: &[String],
    params: &ScoringParams,
) -> ScoreMatrix {
    let sponsor_tokens: Vec<Vec<String>> = sponsor_profiles.iter().map(|p| tokenize(p, params)).collect();
    let candidate_tokens: Vec<Vec<String>> = candidate_profiles.iter().map(|p| tokenize(p, params)).collect();

    let corpus: Vec<Vec<String>> = sponsor_tokens
        .iter()
        .chain(candidate_tokens.iter())
        .cloned()
        .collect();
    let model = TfIdf::fit(&corpus, params);

    tracing::debug!(
        documents = corpus.len(),
        vocabulary = model.vocabulary_size(),
        "Fitted term weighting model"
    );

    let sponsor_vectors: Vec<SparseVector> = sponsor_tokens.iter().map(|t| model.transform(t)).collect();
    let candidate_vectors: Vec<SparseVector> = candidate_tokens.iter().map(|t| model.transform(t)).collect();

    let mut matrix = ScoreMatrix::zeros(sponsor_vectors.len(), candidate_vectors.len());
    for (r, sv) in sponsor_vectors.iter().enumerate() {
        for (c, cv) in candidate_vectors.iter().enumerate() {
            matrix.set(r, c, cosine(sv, cv));
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ScoringParams {
        ScoringParams::default()
    }

    #[test]
    fn test_tokenize_drops_short_and_stop_words() {
        let tokens = tokenize("Neuro-imaging of the Brain; a EEG", &params());
        assert_eq!(tokens, vec!["neuro", "imaging", "brain", "eeg"]);
    }

    fn corpus(size: usize) -> Vec<Vec<String>> {
        (0..size)
            .map(|i| vec!["common".to_string(), format!("rare{}", i)])
            .collect()
    }

    #[test]
    fn test_frequent_terms_dropped_for_large_corpus() {
        let params = ScoringParams {
            max_document_frequency: Some(0.5),
            ..params()
        };
        let model = TfIdf::fit(&corpus(MIN_DOCS_FOR_DF_PRUNING), &params);

        assert!(!model.vocabulary.contains_key("common"));
        assert!(model.vocabulary.contains_key("rare0"));
        assert_eq!(model.vocabulary_size(), MIN_DOCS_FOR_DF_PRUNING);
        assert!(model.transform(&["common".to_string()]).is_empty());
    }

    #[test]
    fn test_frequent_terms_kept_for_small_corpus() {
        let params = ScoringParams {
            max_document_frequency: Some(0.5),
            ..params()
        };
        let size = MIN_DOCS_FOR_DF_PRUNING - 1;
        let model = TfIdf::fit(&corpus(size), &params);

        assert!(model.vocabulary.contains_key("common"));
        assert_eq!(model.vocabulary_size(), size + 1);
    }

    #[test]
    fn test_identical_profiles_score_one() {
        let m = score_profiles(
            &["memory consolidation sleep".to_string()],
            &["memory consolidation sleep".to_string()],
            &params(),
        );
        assert!((m.get(0, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_and_empty_profiles_score_zero() {
        let m = score_profiles(
            &["memory sleep".to_string(), String::new()],
            &["robotics vision".to_string()],
            &params(),
        );
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(1, 0), 0.0);
    }

    #[test]
    fn test_repetition_increases_similarity() {
        let sponsors = vec!["genetics ecology".to_string()];
        let candidates = vec![
            "genetics genetics genetics ecology".to_string(),
            "genetics ecology ecology ecology".to_string(),
        ];
        let m = score_profiles(&sponsors, &candidates, &params());

        // Both candidates overlap equally; only the repeated term differs
        assert!(m.get(0, 0) > 0.0 && m.get(0, 1) > 0.0);

        let sponsors = vec!["genetics".to_string()];
        let m = score_profiles(&sponsors, &candidates, &params());
        assert!(m.get(0, 0) > m.get(0, 1));
    }

    #[test]
    fn test_rare_terms_outweigh_common_terms() {
        let sponsors = vec!["science optics".to_string(), "science botany".to_string()];
        let candidates = vec![
            "science optics".to_string(),
            "science zoology".to_string(),
            "science geology".to_string(),
        ];
        let m = score_profiles(&sponsors, &candidates, &params());

        // Sharing the rare term beats sharing only the ubiquitous one
        assert!(m.get(0, 0) > m.get(1, 0));
        assert!(m.get(1, 1) > 0.0 && m.get(1, 1) < 0.5);
    }

    #[test]
    fn test_scores_are_bounded() {
        let profiles: Vec<String> = (0..5).map(|i| format!("topic{} shared words", i)).collect();
        let m = score_profiles(&profiles, &profiles, &params());
        for r in 0..m.rows() {
            assert!(m.row(r).iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
