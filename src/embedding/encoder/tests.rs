use super::*;
use crate::constants::EMBEDDING_DIM;

#[test]
fn test_config_default() {
    let config = EncoderConfig::default();

    assert_eq!(config.embedding_dim, EMBEDDING_DIM);
    assert!(!config.testing_stub);
}

#[test]
fn test_config_stub_validates() {
    assert!(EncoderConfig::stub().validate().is_ok());
}

#[test]
fn test_config_empty_model_dir_rejected() {
    let result = EncoderConfig::default().validate();

    assert!(matches!(result, Err(EmbeddingError::InvalidConfig { .. })));
}

#[test]
fn test_config_missing_model_dir_rejected() {
    let config = EncoderConfig::new("/nonexistent/minilm");

    assert!(matches!(
        config.validate(),
        Err(EmbeddingError::ModelNotFound { .. })
    ));
}

#[test]
fn test_config_zero_dim_rejected() {
    let config = EncoderConfig {
        embedding_dim: 0,
        ..EncoderConfig::stub()
    };

    assert!(matches!(
        config.validate(),
        Err(EmbeddingError::InvalidConfig { .. })
    ));
}

#[test]
fn test_stub_embedder_dimension() {
    let embedder = MiniLmEmbedder::stub().unwrap();

    let vector = embedder.encode("a test sentence").unwrap();

    assert_eq!(vector.len(), EMBEDDING_DIM);
}

#[test]
fn test_stub_embedder_is_deterministic() {
    let embedder = MiniLmEmbedder::stub().unwrap();

    let a = embedder.encode("same text").unwrap();
    let b = embedder.encode("same text").unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_stub_embedder_distinguishes_texts() {
    let embedder = MiniLmEmbedder::stub().unwrap();

    let a = embedder.encode("first text").unwrap();
    let b = embedder.encode("second text").unwrap();

    assert_ne!(a, b);
}

#[test]
fn test_stub_embeddings_are_normalized() {
    let embedder = MiniLmEmbedder::stub().unwrap();

    let vector = embedder.encode("normalize me").unwrap();
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

    assert!((norm - 1.0).abs() < 1e-5);
}

#[test]
fn test_batch_preserves_order() {
    let embedder = MiniLmEmbedder::stub().unwrap();

    let batch = embedder.encode_batch(&["alpha", "beta", "alpha"]).unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0], batch[2]);
    assert_ne!(batch[0], batch[1]);
    assert_eq!(batch[0], embedder.encode("alpha").unwrap());
}

#[test]
fn test_empty_batch_short_circuits() {
    let embedder = MiniLmEmbedder::stub().unwrap();

    assert!(embedder.encode_batch(&[]).unwrap().is_empty());
}

#[test]
fn test_load_missing_model_fails() {
    let result = MiniLmEmbedder::load(EncoderConfig::new("/nonexistent/minilm"));

    assert!(result.is_err());
}

#[test]
fn test_stub_flag() {
    let embedder = MiniLmEmbedder::stub().unwrap();

    assert!(embedder.is_stub());
    assert_eq!(embedder.dim(), EMBEDDING_DIM);
}
