use std::sync::{Arc, Mutex};

use webcam_watch::login::{HttpReply, HttpTransport, MultipartForm};
use webcam_watch::{ApiEndpoint, LoginError, LoginEvent, LoginRequest};

#[derive(Debug, Clone)]
struct Sent {
    url: String,
    parts: Vec<(String, String)>,
}

#[derive(Clone)]
struct FakeTransport {
    reply: Result<HttpReply, String>,
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl FakeTransport {
    fn replying(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(HttpReply {
                status,
                body: body.as_bytes().to_vec(),
            }),
            sent: Arc::default(),
        }
    }

    fn unreachable() -> Self {
        Self {
            reply: Err("connection refused".to_string()),
            sent: Arc::default(),
        }
    }
}

impl HttpTransport for FakeTransport {
    fn post_form(&self, url: &str, form: &MultipartForm) -> Result<HttpReply, LoginError> {
        self.sent.lock().expect("sent").push(Sent {
            url: url.to_string(),
            parts: form.parts().to_vec(),
        });
        self.reply.clone().map_err(LoginError::Transport)
    }
}

fn login_with(transport: FakeTransport) -> LoginRequest<FakeTransport> {
    let mut request =
        LoginRequest::with_transport(ApiEndpoint::new("api.example.org", "en"), transport);
    request.set_username("alice");
    request.set_password("s3cret");
    request
}

fn messages(request: &LoginRequest<FakeTransport>) -> Vec<LoginEvent> {
    request.messages().try_iter().collect()
}

#[test]
fn success_without_message() {
    let transport = FakeTransport::replying(200, r#"{"status":0}"#);
    let request = login_with(transport.clone());

    assert!(request.send());
    assert!(messages(&request).is_empty());

    let sent = transport.sent.lock().expect("sent");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "http://api.example.org/en/api/login");
}

#[test]
fn form_carries_username_and_password_parts() {
    let transport = FakeTransport::replying(200, r#"{"status":0}"#);
    let request = login_with(transport.clone());
    request.send();

    let sent = transport.sent.lock().expect("sent");
    assert_eq!(
        sent[0].parts,
        vec![
            ("username".to_string(), "alice".to_string()),
            ("password".to_string(), "s3cret".to_string()),
        ]
    );
}

#[test]
fn failure_surfaces_server_message() {
    let request = login_with(FakeTransport::replying(
        200,
        r#"{"status":1,"message":"bad credentials"}"#,
    ));

    assert!(!request.send());
    assert_eq!(
        messages(&request),
        vec![LoginEvent::Message("bad credentials".to_string())]
    );
}

#[test]
fn malformed_body_is_failure_without_message() {
    let request = login_with(FakeTransport::replying(200, "not json"));

    assert!(!request.send());
    assert!(messages(&request).is_empty());
}

#[test]
fn non_200_is_failure_even_with_zero_status() {
    let request = login_with(FakeTransport::replying(
        500,
        r#"{"status":0,"message":"maintenance"}"#,
    ));

    assert!(!request.send());
    assert_eq!(
        messages(&request),
        vec![LoginEvent::Message("maintenance".to_string())]
    );
}

#[test]
fn transport_failure_is_failure() {
    let request = login_with(FakeTransport::unreachable());
    assert!(!request.send());
    assert!(messages(&request).is_empty());
}

#[test]
fn spawned_login_reports_message_then_outcome() {
    let request = login_with(FakeTransport::replying(
        200,
        r#"{"status":0,"message":"welcome back"}"#,
    ));

    request.spawn().join().expect("login thread");
    assert_eq!(
        messages(&request),
        vec![
            LoginEvent::Message("welcome back".to_string()),
            LoginEvent::Finished(true),
        ]
    );
}

#[test]
fn reply_classification_needs_http_200_and_status_zero() {
    let request = login_with(FakeTransport::unreachable());
    assert!(request.on_reply_data_ready(200, br#"{"status":0}"#));
    assert!(!request.on_reply_data_ready(201, br#"{"status":0}"#));
    assert!(!request.on_reply_data_ready(200, br#"{"status":2}"#));
    assert!(!request.on_reply_data_ready(200, b""));
}

#[test]
fn non_integer_status_reads_as_zero() {
    let request = login_with(FakeTransport::unreachable());
    assert!(request.on_reply_data_ready(200, br#"{"status":0.0}"#));
    assert!(request.on_reply_data_ready(200, br#"{"status":"0"}"#));
    assert!(request.on_reply_data_ready(200, br#"{"status":"failed"}"#));
    assert!(request.on_reply_data_ready(200, br#"{"status":0.5}"#));
    assert!(!request.on_reply_data_ready(200, br#"{"status":2.0}"#));
}

#[test]
fn success_with_float_status_over_the_wire() {
    let request = login_with(FakeTransport::replying(200, r#"{"status":0.0}"#));
    assert!(request.send());
}
