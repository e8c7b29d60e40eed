//! Relay between a display surface and the completion client.
//!
//! The bridge keeps no state of its own: every `ask` is answered by its own task, which owns a
//! clone of the client and a clone of the outbound sender. Whatever happens inside that task,
//! exactly one [`ChatResponse`] is sent back for the ask.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ai::GroqClient;
use crate::protocol::{ChatRequest, ChatResponse, RequestId};

/// The surface-side ends of an open bridge.
pub struct BridgeChannels {
    pub requests: UnboundedSender<ChatRequest>,
    pub responses: UnboundedReceiver<ChatResponse>,
    pub task: JoinHandle<()>,
}

pub struct MessageBridge {
    client: GroqClient,
    outbound: UnboundedSender<ChatResponse>,
}

impl MessageBridge {
    pub fn new(client: GroqClient, outbound: UnboundedSender<ChatResponse>) -> Self {
        Self { client, outbound }
    }

    /// Wires a bridge to fresh channels and starts it. The bridge stops once `requests`
    /// (and every clone of it) is dropped.
    pub fn open(client: GroqClient) -> BridgeChannels {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let bridge = Self::new(client, response_tx);
        let task = tokio::spawn(bridge.run(request_rx));

        BridgeChannels {
            requests: request_tx,
            responses: response_rx,
            task,
        }
    }

    pub async fn run(self, mut inbound: UnboundedReceiver<ChatRequest>) {
        info!(model = %self.client.model(), "message bridge opened");
        while let Some(request) = inbound.recv().await {
            self.dispatch(request);
        }
        info!("display surface closed, message bridge stopped");
    }

    /// Routes one inbound message. Returns the task answering it, if it was an `ask`.
    pub fn dispatch(&self, request: ChatRequest) -> Option<JoinHandle<()>> {
        match request {
            ChatRequest::Ask { text, id } => {
                let client = self.client.clone();
                let outbound = self.outbound.clone();
                Some(tokio::spawn(async move {
                    let response = answer(&client, &text, id).await;
                    if outbound.send(response).is_err() {
                        debug!(?id, "display surface gone, dropping response");
                    }
                }))
            }
            ChatRequest::Unknown => {
                debug!("ignoring message with unknown command");
                None
            }
        }
    }
}

/// Runs one completion and turns its outcome into the response for the surface.
pub async fn answer(client: &GroqClient, prompt: &str, id: Option<RequestId>) -> ChatResponse {
    debug!(?id, "awaiting completion");
    match client.complete(prompt).await {
        Ok(text) => ChatResponse::answer(text, id),
        Err(err) => {
            warn!(?id, error = %err, "completion failed");
            ChatResponse::error(err, id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::NO_RESPONSE;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_partial_json, method},
        Mock, MockServer, ResponseTemplate,
    };

    fn answer_body(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "content": content } }] })
    }

    async fn server_answering(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer) -> GroqClient {
        GroqClient::new("test-key").with_endpoint(&format!("{}/chat/completions", server.uri()))
    }

    #[tokio::test]
    async fn mutex_question_end_to_end() {
        let server =
            server_answering(ResponseTemplate::new(200).set_body_json(answer_body("A mutual-exclusion lock.")))
                .await;
        let mut bridge = MessageBridge::open(client_for(&server));

        let inbound: ChatRequest =
            serde_json::from_value(json!({ "command": "ask", "text": "What is a mutex?" })).unwrap();
        bridge.requests.send(inbound).unwrap();

        let response = bridge.responses.recv().await.unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "command": "response", "text": "A mutual-exclusion lock." })
        );
    }

    #[tokio::test]
    async fn rejection_becomes_prefixed_error_text() {
        let server =
            server_answering(ResponseTemplate::new(429).set_body_string("rate limit reached")).await;
        let mut bridge = MessageBridge::open(client_for(&server));

        bridge.requests.send(ChatRequest::ask("hi", Some(1))).unwrap();

        let response = bridge.responses.recv().await.unwrap();
        assert_eq!(response.text, "Error: Groq API error: rate limit reached");
        assert_eq!(response.id, Some(1));
    }

    #[tokio::test]
    async fn server_error_becomes_prefixed_error_text() {
        let server = server_answering(ResponseTemplate::new(502).set_body_string("Bad Gateway")).await;
        let mut bridge = MessageBridge::open(client_for(&server));

        bridge.requests.send(ChatRequest::ask("hi", Some(2))).unwrap();

        let response = bridge.responses.recv().await.unwrap();
        assert_eq!(response.text, "Error: Groq API error: Bad Gateway");
        assert_eq!(response.id, Some(2));
    }

    #[tokio::test]
    async fn transport_failure_is_prefixed_native_message() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = GroqClient::new("test-key").with_endpoint(&format!("http://{addr}/chat"));

        let native = client.complete("hi").await.unwrap_err().to_string();
        let response = answer(&client, "hi", None).await;

        assert_eq!(response.text, format!("Error: {native}"));
    }

    #[tokio::test]
    async fn empty_prompt_and_empty_answer_still_respond() {
        let server =
            server_answering(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] }))).await;
        let mut bridge = MessageBridge::open(client_for(&server));

        bridge.requests.send(ChatRequest::ask("", None)).unwrap();

        let response = bridge.responses.recv().await.unwrap();
        assert_eq!(response.text, NO_RESPONSE);
    }

    #[tokio::test]
    async fn repeated_ask_gets_identical_responses() {
        let server =
            server_answering(ResponseTemplate::new(200).set_body_json(answer_body("Same answer"))).await;
        let mut bridge = MessageBridge::open(client_for(&server));

        for _ in 0..2 {
            bridge.requests.send(ChatRequest::ask("Same question", None)).unwrap();
        }

        let first = bridge.responses.recv().await.unwrap();
        let second = bridge.responses.recv().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text, "Same answer");
    }

    #[tokio::test]
    async fn overlapping_asks_are_paired_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "messages": [{ "role": "user", "content": "slow" }] })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(answer_body("slow answer"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "messages": [{ "role": "user", "content": "fast" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer_body("fast answer")))
            .mount(&server)
            .await;
        let mut bridge = MessageBridge::open(client_for(&server));

        bridge.requests.send(ChatRequest::ask("slow", Some(1))).unwrap();
        bridge.requests.send(ChatRequest::ask("fast", Some(2))).unwrap();

        let first = bridge.responses.recv().await.unwrap();
        let second = bridge.responses.recv().await.unwrap();
        assert_eq!(first, ChatResponse::answer("fast answer".to_string(), Some(2)));
        assert_eq!(second, ChatResponse::answer("slow answer".to_string(), Some(1)));
    }

    #[tokio::test]
    async fn unknown_commands_are_not_answered() {
        let server = MockServer::start().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let bridge = MessageBridge::new(client_for(&server), tx);

        assert!(bridge.dispatch(ChatRequest::Unknown).is_none());
        drop(bridge);

        assert!(rx.recv().await.is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn closing_requests_stops_the_bridge() {
        let server = MockServer::start().await;
        let bridge = MessageBridge::open(client_for(&server));

        drop(bridge.requests);

        tokio::time::timeout(Duration::from_secs(1), bridge.task)
            .await
            .expect("bridge did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn response_is_dropped_quietly_when_surface_is_gone() {
        let server =
            server_answering(ResponseTemplate::new(200).set_body_json(answer_body("late"))).await;
        let (tx, rx) = mpsc::unbounded_channel();
        let bridge = MessageBridge::new(client_for(&server), tx);
        drop(rx);

        let task = bridge.dispatch(ChatRequest::ask("hi", None)).unwrap();
        task.await.unwrap();
    }
}
