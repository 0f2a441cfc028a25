//! Username/password login against the remote HTTP API.

mod multipart;
mod request;
mod transport;

pub use multipart::MultipartForm;
pub use request::{ApiEndpoint, ApiRequest};
pub use transport::{HttpReply, HttpTransport, ReqwestTransport};

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use log::{info, warn};
use serde_json::Value;

use crate::constants::LOGIN_API_PATH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    /// Text the server attached to its reply.
    Message(String),
    /// Outcome of a request started with [`LoginRequest::spawn`].
    Finished(bool),
}

pub struct LoginRequest<T: HttpTransport = ReqwestTransport> {
    request: Arc<ApiRequest<T>>,
    username: String,
    password: String,
    events_tx: Sender<LoginEvent>,
    events_rx: Receiver<LoginEvent>,
}

impl LoginRequest<ReqwestTransport> {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self::with_transport(endpoint, ReqwestTransport::default())
    }
}

impl<T: HttpTransport + 'static> LoginRequest<T> {
    pub fn with_transport(endpoint: ApiEndpoint, transport: T) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            request: Arc::new(ApiRequest::new(endpoint, transport)),
            username: String::new(),
            password: String::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn domain(&self) -> &str {
        self.request.domain()
    }

    pub fn locale(&self) -> &str {
        self.request.locale()
    }

    /// Server messages and, for spawned requests, the final outcome.
    pub fn messages(&self) -> Receiver<LoginEvent> {
        self.events_rx.clone()
    }

    fn form(&self) -> MultipartForm {
        MultipartForm::new()
            .text("username", self.username.as_str())
            .text("password", self.password.as_str())
    }

    /// Performs the login and returns whether it succeeded. Blocks until the
    /// reply arrives.
    pub fn send(&self) -> bool {
        perform(&self.request, &self.form(), &self.events_tx)
    }

    /// Performs the login on a background thread; the outcome is delivered as
    /// [`LoginEvent::Finished`] on [`LoginRequest::messages`].
    pub fn spawn(&self) -> thread::JoinHandle<()> {
        let request = Arc::clone(&self.request);
        let form = self.form();
        let events = self.events_tx.clone();
        thread::spawn(move || {
            let success = perform(&request, &form, &events);
            let _ = events.send(LoginEvent::Finished(success));
        })
    }

    pub fn on_reply_data_ready(&self, http_code: u16, data: &[u8]) -> bool {
        on_reply_data_ready(http_code, data, &self.events_tx)
    }
}

fn perform<T: HttpTransport>(
    request: &ApiRequest<T>,
    form: &MultipartForm,
    events: &Sender<LoginEvent>,
) -> bool {
    let success = request
        .post_form(LOGIN_API_PATH, form, |code, data| {
            on_reply_data_ready(code, data, events)
        })
        .unwrap_or(false);
    if success {
        info!("Logged in at {}", request.domain());
    } else {
        warn!("Login at {} failed", request.domain());
    }
    success
}

/// Fields of the login reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReply {
    pub status: i64,
    pub message: Option<String>,
}

/// Extracts `status` and `message` from a JSON object body. Anything that is
/// not a JSON object yields status `-1` and no message.
pub fn parse_login_reply(data: &[u8]) -> LoginReply {
    let mut reply = LoginReply {
        status: -1,
        message: None,
    };
    if data.is_empty() {
        return reply;
    }
    if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(data) {
        if let Some(status) = object.get("status") {
            reply.status = status_code(status);
        }
        reply.message = object
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_owned);
    }
    reply
}

/// Integral numbers that fit in an `i32` keep their value; anything else
/// present under `status` reads as 0.
fn status_code(value: &Value) -> i64 {
    value
        .as_f64()
        .filter(|number| number.fract() == 0f64)
        .filter(|number| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(number))
        .map_or(0, |number| number as i64)
}

fn on_reply_data_ready(http_code: u16, data: &[u8], events: &Sender<LoginEvent>) -> bool {
    let reply = parse_login_reply(data);
    if let Some(message) = reply.message {
        let _ = events.send(LoginEvent::Message(message));
    }
    http_code == 200 && reply.status == 0
}
