use super::*;
use crate::constants::EMBEDDING_DIM;
use crate::embedding::CountingEncoder;
use tempfile::TempDir;

fn chunk(doc_id: &str, index: u32, text: &str) -> Chunk {
    Chunk {
        doc_id: DocumentId::new(doc_id),
        doc_name: format!("{doc_id}.pdf"),
        index,
        page: 1,
        text: text.to_string(),
        start_word: 0,
        end_word: text.split_whitespace().count(),
    }
}

fn corpus() -> Vec<Chunk> {
    vec![
        chunk("abc123", 0, "electronic signal processing basics"),
        chunk("abc123", 1, "fourier transforms and filters"),
        chunk("def456", 0, "a different document entirely"),
    ]
}

#[test]
fn test_every_chunk_gets_exactly_one_vector() {
    let dir = TempDir::new().unwrap();
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());

    let chunks = corpus();
    let embeddings = cache.get_embeddings(&chunks).unwrap();

    assert_eq!(embeddings.len(), chunks.len());
    for c in &chunks {
        assert!(embeddings.contains_key(&c.key()));
    }
}

#[test]
fn test_every_vector_has_embedding_dim_components() {
    let dir = TempDir::new().unwrap();
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());

    let embeddings = cache.get_embeddings(&corpus()).unwrap();

    for vector in embeddings.values() {
        assert_eq!(vector.len(), EMBEDDING_DIM);
    }
}

#[test]
fn test_second_call_is_free_and_identical() {
    let dir = TempDir::new().unwrap();
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());
    let chunks = corpus();

    let first = cache.get_embeddings(&chunks).unwrap();
    assert_eq!(cache.encoder().calls(), 1);
    assert_eq!(cache.encoder().texts_encoded(), 3);

    let second = cache.get_embeddings(&chunks).unwrap();
    assert_eq!(cache.encoder().calls(), 1, "warm call must not hit the model");
    assert_eq!(first, second);
}

#[test]
fn test_cold_process_warm_disk_performs_no_model_calls() {
    let dir = TempDir::new().unwrap();
    let chunks = corpus();

    {
        let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());
        cache.get_embeddings(&chunks).unwrap();
    }

    // Fresh instance: memory is cold, disk stores are warm.
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());
    let embeddings = cache.get_embeddings(&chunks).unwrap();

    assert_eq!(cache.encoder().calls(), 0);
    assert_eq!(embeddings.len(), chunks.len());
}

#[test]
fn test_one_store_file_per_document() {
    let dir = TempDir::new().unwrap();
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());

    cache.get_embeddings(&corpus()).unwrap();

    assert!(dir.path().join("abc123_embeddings.json").exists());
    assert!(dir.path().join("def456_embeddings.json").exists());
}

#[test]
fn test_store_is_human_inspectable_json() {
    let dir = TempDir::new().unwrap();
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());

    cache
        .get_embeddings(&[chunk("abc123", 0, "some text")])
        .unwrap();

    let content = std::fs::read_to_string(dir.path().join("abc123_embeddings.json")).unwrap();
    let parsed: std::collections::HashMap<String, Vec<f32>> =
        serde_json::from_str(&content).unwrap();

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed["abc123_0"].len(), EMBEDDING_DIM);
}

#[test]
fn test_malformed_store_triggers_recompute_not_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("abc123_embeddings.json"),
        r#"{"abc123_0": [0.1, 0.2"#, // truncated JSON
    )
    .unwrap();

    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());
    let chunks = vec![chunk("abc123", 0, "recompute me")];

    let embeddings = cache.get_embeddings(&chunks).unwrap();

    assert_eq!(embeddings.len(), 1);
    assert_eq!(cache.encoder().calls(), 1);

    // The rewritten store is valid again.
    let content = std::fs::read_to_string(dir.path().join("abc123_embeddings.json")).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
}

#[test]
fn test_partial_hit_preserves_existing_store_entries() {
    let dir = TempDir::new().unwrap();

    {
        let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());
        cache
            .get_embeddings(&[chunk("abc123", 0, "first chunk")])
            .unwrap();
    }

    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());
    cache
        .get_embeddings(&[
            chunk("abc123", 0, "first chunk"),
            chunk("abc123", 1, "second chunk"),
        ])
        .unwrap();

    // Only the miss was embedded.
    assert_eq!(cache.encoder().texts_encoded(), 1);

    // And the store holds the union of both calls.
    let content = std::fs::read_to_string(dir.path().join("abc123_embeddings.json")).unwrap();
    let parsed: std::collections::HashMap<String, Vec<f32>> =
        serde_json::from_str(&content).unwrap();
    assert!(parsed.contains_key("abc123_0"));
    assert!(parsed.contains_key("abc123_1"));
}

#[test]
fn test_unwritable_cache_dir_still_returns_embeddings() {
    let dir = TempDir::new().unwrap();
    // Occupy the cache path with a file so directory creation and writes fail.
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"not a directory").unwrap();

    let cache = EmbeddingCache::new(CountingEncoder::new(), &blocked);
    let embeddings = cache.get_embeddings(&corpus()).unwrap();

    assert_eq!(embeddings.len(), 3);
}

#[test]
fn test_embed_text_is_never_cached() {
    let dir = TempDir::new().unwrap();
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());

    let a = cache.embed_text("the query").unwrap();
    let b = cache.embed_text("the query").unwrap();

    assert_eq!(cache.encoder().calls(), 2);
    assert_eq!(a, b);
    assert_eq!(a.len(), EMBEDDING_DIM);
}

#[test]
fn test_empty_batch_returns_empty_mapping() {
    let dir = TempDir::new().unwrap();
    let cache = EmbeddingCache::new(CountingEncoder::new(), dir.path());

    let embeddings = cache.get_embeddings(&[]).unwrap();

    assert!(embeddings.is_empty());
    assert_eq!(cache.encoder().calls(), 0);
}
