use super::*;
use serial_test::serial;

#[test]
#[serial]
fn test_from_env_without_key_fails() {
    // SAFETY: tests touching process env are serialized.
    unsafe { std::env::remove_var(ENV_API_KEY) };

    let result = ChatClient::from_env(&RagConfig::default());

    assert!(matches!(
        result,
        Err(ChatError::MissingApiKey { var: "POE_API_KEY" })
    ));
}

#[test]
#[serial]
fn test_from_env_blank_key_is_missing() {
    // SAFETY: tests touching process env are serialized.
    unsafe { std::env::set_var(ENV_API_KEY, "   ") };

    let result = ChatClient::from_env(&RagConfig::default());

    assert!(matches!(result, Err(ChatError::MissingApiKey { .. })));

    // SAFETY: as above.
    unsafe { std::env::remove_var(ENV_API_KEY) };
}

#[test]
fn test_client_carries_configured_model() {
    let config = RagConfig {
        chat_model: "Assistant".to_string(),
        ..Default::default()
    };

    let client = ChatClient::new(&config, "test-key");

    assert_eq!(client.model(), "Assistant");
}

#[test]
fn test_debug_does_not_leak_key() {
    let client = ChatClient::new(&RagConfig::default(), "sk-secret-key");

    let debug = format!("{client:?}");

    assert!(!debug.contains("sk-secret-key"));
}

#[test]
fn test_request_includes_prompt_and_limits() {
    let client = ChatClient::new(&RagConfig::default(), "test-key");

    let request = client.build_request("the prompt", false).unwrap();

    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.max_completion_tokens, Some(2048));
    assert_eq!(request.messages.len(), 2);
}
