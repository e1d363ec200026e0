use super::*;
use crate::document::DocumentId;

fn chunk(index: u32, text: &str) -> Chunk {
    Chunk {
        doc_id: DocumentId::new("abc12345"),
        doc_name: "doc.pdf".to_string(),
        index,
        page: 1,
        text: text.to_string(),
        start_word: 0,
        end_word: text.split_whitespace().count(),
    }
}

/// Scorer that panics if invoked; proves the empty-input short circuit.
struct PanicScorer;

impl PairScorer for PanicScorer {
    fn predict(&self, _pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankError> {
        panic!("scorer must not be invoked");
    }
}

/// Scorer returning a fixed score sequence, cycling if needed.
struct FixedScorer(Vec<f32>);

impl PairScorer for FixedScorer {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankError> {
        Ok(pairs
            .iter()
            .enumerate()
            .map(|(i, _)| self.0[i % self.0.len()])
            .collect())
    }
}

/// Scorer that lies about how many pairs it scored.
struct ShortScorer;

impl PairScorer for ShortScorer {
    fn predict(&self, _pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankError> {
        Ok(vec![0.5])
    }
}

#[test]
fn test_empty_input_skips_the_model() {
    let reranker = Reranker::new(PanicScorer);

    let result = reranker.rerank("query", &[], 3).unwrap();

    assert!(result.is_empty());
}

#[test]
fn test_sorted_descending_and_truncated() {
    let reranker = Reranker::new(FixedScorer(vec![0.1, 0.9, 0.5, 0.7]));
    let chunks = vec![
        chunk(0, "a"),
        chunk(1, "b"),
        chunk(2, "c"),
        chunk(3, "d"),
    ];

    let ranked = reranker.rerank("query", &chunks, 3).unwrap();

    assert_eq!(ranked.len(), 3);
    let scores: Vec<f32> = ranked.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![0.9, 0.7, 0.5]);
    assert_eq!(ranked[0].chunk.index, 1);
}

#[test]
fn test_fewer_chunks_than_top_k() {
    let reranker = Reranker::new(FixedScorer(vec![0.3, 0.6]));
    let chunks = vec![chunk(0, "a"), chunk(1, "b")];

    let ranked = reranker.rerank("query", &chunks, 10).unwrap();

    assert_eq!(ranked.len(), 2);
}

#[test]
fn test_ties_keep_input_order() {
    let reranker = Reranker::new(FixedScorer(vec![0.5]));
    let chunks = vec![chunk(0, "first"), chunk(1, "second"), chunk(2, "third")];

    let ranked = reranker.rerank("query", &chunks, 3).unwrap();

    let indices: Vec<u32> = ranked.iter().map(|r| r.chunk.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_score_count_mismatch_is_an_error() {
    let reranker = Reranker::new(ShortScorer);
    let chunks = vec![chunk(0, "a"), chunk(1, "b")];

    let result = reranker.rerank("query", &chunks, 2);

    assert!(matches!(
        result,
        Err(RerankError::ScoreCountMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn test_stub_cross_encoder_scores_in_unit_range() {
    let encoder = CrossEncoder::stub().unwrap();

    let scores = encoder
        .predict(&[
            ("electronic signal", "the electronic signal path"),
            ("electronic signal", "unrelated gardening advice"),
        ])
        .unwrap();

    assert_eq!(scores.len(), 2);
    for score in &scores {
        assert!((0.0..=1.0).contains(score));
    }
    // Overlapping text must outrank unrelated text.
    assert!(scores[0] > scores[1]);
}

#[test]
fn test_stub_cross_encoder_empty_query() {
    let encoder = CrossEncoder::stub().unwrap();

    let scores = encoder.predict(&[("", "some candidate")]).unwrap();

    assert_eq!(scores, vec![0.0]);
}

#[test]
fn test_cross_encoder_missing_model_dir() {
    let config = CrossEncoderConfig::new("/nonexistent/cross-encoder");

    let result = CrossEncoder::load(config);

    assert!(matches!(result, Err(RerankError::ModelNotFound { .. })));
}

#[test]
fn test_cross_encoder_stub_reports_no_model() {
    let encoder = CrossEncoder::stub().unwrap();

    assert!(!encoder.is_model_loaded());
}

#[test]
fn test_rerank_overwrites_prior_scores() {
    // The reranker receives plain chunks; whatever stage-1 score they had is
    // gone by construction. Assert the output score is the scorer's.
    let reranker = Reranker::new(FixedScorer(vec![0.42]));
    let chunks = vec![chunk(0, "text")];

    let ranked = reranker.rerank("query", &chunks, 1).unwrap();

    assert!((ranked[0].score - 0.42).abs() < f32::EPSILON);
}

#[test]
fn test_invalid_config_rejected() {
    let config = CrossEncoderConfig {
        max_seq_len: 0,
        ..Default::default()
    };

    assert!(matches!(
        CrossEncoder::load(config),
        Err(RerankError::InvalidConfig { .. })
    ));
}
