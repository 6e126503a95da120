use mostrador_core::model::{AgentError, ChatModel};
use mostrador_core::session::ConversationMessage;
use mostrador_interaction::OllamaApiAgent;

#[tokio::test]
async fn test_unreachable_server_is_a_retryable_process_error() {
    // Port 1 is reserved and nothing listens there
    let agent = OllamaApiAgent::new("http://127.0.0.1:1", "prueba");
    let messages = vec![ConversationMessage::user("hola")];

    let err = agent
        .generate(&messages, None)
        .await
        .expect_err("request should fail");

    match err {
        AgentError::ProcessError {
            status_code,
            is_retryable,
            ..
        } => {
            assert_eq!(status_code, None);
            assert!(is_retryable, "connection errors should be retryable");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_model_name_is_exposed() {
    let agent = OllamaApiAgent::new("http://127.0.0.1:11434/", "llama3.2");
    assert_eq!(agent.model_name(), "llama3.2");
    assert_eq!(agent.host(), "http://127.0.0.1:11434");
}
