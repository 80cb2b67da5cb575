//! REST client for the family calendar API.

use tracing::{debug, warn};

use famcal_core::{EventId, OperationType};
use famcal_protocol::{
    ConflictCheckRequest, ConflictCheckResponse, ErrorBody, MAX_BODY_SIZE, MutationRequest,
    ProtocolError, UpdatedEvent, decode_body, encode_body,
};
use serde::{Serialize, de::DeserializeOwned};

use super::config::HttpBackendConfig;
use crate::backend::{BoxFuture, CalendarBackend};
use crate::error::{BackendError, BackendErrorCode, BackendResult};

const BACKEND_NAME: &str = "http";

/// [`CalendarBackend`] talking JSON over HTTP.
#[derive(Debug)]
pub struct HttpBackend {
    http_client: reqwest::Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    /// Creates a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the underlying HTTP client cannot be
    /// built (for instance when no TLS backend is available).
    pub fn new(config: HttpBackendConfig) -> BackendResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                BackendError::configuration("failed to create HTTP client")
                    .with_backend(BACKEND_NAME)
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    async fn send_json<B, R>(
        &self,
        method: reqwest::Method,
        url: url::Url,
        body: &B,
    ) -> BackendResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let payload =
            encode_body(body).map_err(|e| BackendError::from(e).with_backend(BACKEND_NAME))?;

        debug!(%method, %url, bytes = payload.len(), "Sending backend request");

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .body(payload);
        if let Some(ref token) = self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                BackendError::timeout(format!("{} {} timed out", method, url))
            } else {
                BackendError::network(format!("request failed: {}", e))
            };
            err.with_backend(BACKEND_NAME).with_source(e)
        })?;

        let status = response.status();
        let bytes = read_capped(response).await?;

        if let Some(code) = BackendErrorCode::from_http_status(status.as_u16()) {
            let message =
                error_message(&bytes).unwrap_or_else(|| format!("API error ({})", status));
            warn!(%method, %url, status = status.as_u16(), %code, "Backend request failed");
            return Err(BackendError::new(code, message).with_backend(BACKEND_NAME));
        }

        decode_body(&bytes).map_err(|e| BackendError::from(e).with_backend(BACKEND_NAME))
    }
}

/// Reads a response body, refusing anything over [`MAX_BODY_SIZE`].
async fn read_capped(mut response: reqwest::Response) -> BackendResult<Vec<u8>> {
    let too_large = |size: usize| {
        BackendError::from(ProtocolError::BodyTooLarge {
            size,
            max: MAX_BODY_SIZE,
        })
        .with_backend(BACKEND_NAME)
    };

    if let Some(length) = response.content_length() {
        let length = usize::try_from(length).unwrap_or(usize::MAX);
        if length > MAX_BODY_SIZE {
            return Err(too_large(length));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| {
        BackendError::network(format!("failed to read response: {}", e))
            .with_backend(BACKEND_NAME)
            .with_source(e)
    })? {
        if body.len() + chunk.len() > MAX_BODY_SIZE {
            return Err(too_large(body.len() + chunk.len()));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Extracts the message from an error body, falling back to the raw text.
fn error_message(bytes: &[u8]) -> Option<String> {
    if let Ok(body) = decode_body::<ErrorBody>(bytes) {
        return Some(body.message);
    }
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl HttpBackend {
    async fn check_conflicts_impl(
        &self,
        request: ConflictCheckRequest,
    ) -> BackendResult<ConflictCheckResponse> {
        let url = self.config.conflicts_url(request.event_id)?;
        self.send_json(reqwest::Method::POST, url, &request).await
    }

    async fn apply_mutation_impl(
        &self,
        event_id: EventId,
        request: MutationRequest,
    ) -> BackendResult<UpdatedEvent> {
        let url = self.config.event_url(event_id)?;
        let is_copy = request.operation_type == OperationType::Copy;
        let updated: UpdatedEvent = self.send_json(reqwest::Method::PATCH, url, &request).await?;
        // a copy answers with the new event
        if !is_copy && updated.id != event_id {
            return Err(BackendError::invalid_response(format!(
                "expected event {}, backend returned {}",
                event_id, updated.id
            ))
            .with_backend(BACKEND_NAME));
        }
        Ok(updated)
    }
}

impl CalendarBackend for HttpBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn check_conflicts(
        &self,
        request: ConflictCheckRequest,
    ) -> BoxFuture<'_, BackendResult<ConflictCheckResponse>> {
        Box::pin(async move { self.check_conflicts_impl(request).await })
    }

    fn apply_mutation(
        &self,
        event_id: EventId,
        request: MutationRequest,
    ) -> BoxFuture<'_, BackendResult<UpdatedEvent>> {
        Box::pin(async move { self.apply_mutation_impl(event_id, request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famcal_core::{AssigneeId, DragOperation, Position};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn position(start: &str, end: &str) -> Position {
        Position::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    /// Serves exactly one request with a canned response and returns the raw
    /// request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            // the client may hang up early on a rejected body
            stream.write_all(response.as_bytes()).await.ok();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (base, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..split]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= split + 4 + content_length
    }

    #[tokio::test]
    async fn check_conflicts_posts_candidate() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"hasConflicts":true,"conflicts":[{"eventId":99,"title":"Piano","startTime":"2025-01-10T14:30:00Z","endTime":"2025-01-10T15:30:00Z"}]}"#,
        )
        .await;
        let backend =
            HttpBackend::new(HttpBackendConfig::new(&base).unwrap().with_auth_token("s3cret")).unwrap();

        let candidate = position("2025-01-10T14:00:00Z", "2025-01-10T15:00:00Z")
            .with_assignee(AssigneeId::new(7));
        let response = backend
            .check_conflicts(ConflictCheckRequest::new(EventId::new(42), &candidate))
            .await
            .unwrap();
        assert!(response.has_conflicts());
        assert_eq!(response.conflicts[0].event_id, EventId::new(99));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/calendar/events/42/conflicts HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer s3cret"));
        assert!(raw.contains(r#""newStartTime":"2025-01-10T14:00:00Z""#));
        assert!(raw.contains(r#""assigneeId":7"#));
    }

    #[tokio::test]
    async fn apply_mutation_patches_event() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"id":42,"startTime":"2025-01-10T14:00:00Z","endTime":"2025-01-10T15:00:00Z","assigneeId":null}"#,
        )
        .await;
        let backend = HttpBackend::new(HttpBackendConfig::new(&base).unwrap()).unwrap();

        let op = DragOperation::new(
            OperationType::Move,
            EventId::new(42),
            position("2025-01-10T09:00:00Z", "2025-01-10T10:00:00Z"),
            position("2025-01-10T14:00:00Z", "2025-01-10T15:00:00Z"),
        );
        let updated = backend
            .apply_mutation(EventId::new(42), MutationRequest::for_operation(&op))
            .await
            .unwrap();
        assert_eq!(updated.position().unwrap(), *op.to_position());

        let raw = server.await.unwrap();
        assert!(raw.starts_with("PATCH /api/calendar/events/42 HTTP/1.1"));
        assert!(raw.contains(r#""operationType":"move""#));
        assert!(raw.contains(&format!(r#""operationId":"{}""#, op.id())));
        assert!(!raw.to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn error_status_maps_to_code_and_message() {
        let (base, server) = serve_once(
            "409 Conflict",
            r#"{"error":"slot already taken"}"#,
        )
        .await;
        let backend = HttpBackend::new(HttpBackendConfig::new(&base).unwrap()).unwrap();

        let op = DragOperation::new(
            OperationType::Move,
            EventId::new(42),
            position("2025-01-10T09:00:00Z", "2025-01-10T10:00:00Z"),
            position("2025-01-10T14:00:00Z", "2025-01-10T15:00:00Z"),
        );
        let err = backend
            .apply_mutation(EventId::new(42), MutationRequest::for_operation(&op))
            .await
            .unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::Conflict);
        assert_eq!(err.message(), "slot already taken");
        assert_eq!(err.backend(), Some("http"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn garbage_response_is_invalid() {
        let (base, server) = serve_once("200 OK", "<html>maintenance</html>").await;
        let backend = HttpBackend::new(HttpBackendConfig::new(&base).unwrap()).unwrap();

        let candidate = position("2025-01-10T14:00:00Z", "2025-01-10T15:00:00Z");
        let err = backend
            .check_conflicts(ConflictCheckRequest::new(EventId::new(1), &candidate))
            .await
            .unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::InvalidResponse);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn mismatched_event_id_is_invalid() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"id":7,"startTime":"2025-01-10T14:00:00Z","endTime":"2025-01-10T15:00:00Z"}"#,
        )
        .await;
        let backend = HttpBackend::new(HttpBackendConfig::new(&base).unwrap()).unwrap();

        let op = DragOperation::new(
            OperationType::Resize,
            EventId::new(42),
            position("2025-01-10T14:00:00Z", "2025-01-10T14:30:00Z"),
            position("2025-01-10T14:00:00Z", "2025-01-10T15:00:00Z"),
        );
        let err = backend
            .apply_mutation(EventId::new(42), MutationRequest::for_operation(&op))
            .await
            .unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::InvalidResponse);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn copy_returns_new_event_id() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"id":77,"startTime":"2025-01-11T09:00:00Z","endTime":"2025-01-11T10:00:00Z"}"#,
        )
        .await;
        let backend = HttpBackend::new(HttpBackendConfig::new(&base).unwrap()).unwrap();

        let op = DragOperation::new(
            OperationType::Copy,
            EventId::new(42),
            position("2025-01-10T09:00:00Z", "2025-01-10T10:00:00Z"),
            position("2025-01-11T09:00:00Z", "2025-01-11T10:00:00Z"),
        );
        let updated = backend
            .apply_mutation(EventId::new(42), MutationRequest::for_operation(&op))
            .await
            .unwrap();
        assert_eq!(updated.id, EventId::new(77));

        let request = server.await.unwrap();
        assert!(request.starts_with("PATCH /api/calendar/events/42 HTTP/1.1"));
    }

    #[tokio::test]
    async fn oversized_response_is_rejected() {
        let huge: &'static str = Box::leak("x".repeat(MAX_BODY_SIZE + 10).into_boxed_str());
        let (base, server) = serve_once("200 OK", huge).await;
        let backend = HttpBackend::new(HttpBackendConfig::new(&base).unwrap()).unwrap();

        let candidate = position("2025-01-10T14:00:00Z", "2025-01-10T15:00:00Z");
        let err = backend
            .check_conflicts(ConflictCheckRequest::new(EventId::new(1), &candidate))
            .await
            .unwrap_err();
        assert_eq!(err.code(), BackendErrorCode::InvalidResponse);
        assert!(err.to_string().contains("too large"), "{err}");
        server.abort();
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend =
            HttpBackend::new(HttpBackendConfig::new(format!("http://{}", addr)).unwrap()).unwrap();
        let candidate = position("2025-01-10T14:00:00Z", "2025-01-10T15:00:00Z");
        let err = backend
            .check_conflicts(ConflictCheckRequest::new(EventId::new(1), &candidate))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
