use log::debug;

use super::multipart::MultipartForm;
use crate::error::LoginError;

/// Status code and raw body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

pub trait HttpTransport: Send + Sync {
    fn post_form(&self, url: &str, form: &MultipartForm) -> Result<HttpReply, LoginError>;
}

/// Blocking transport backed by a `reqwest` client.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_form(&self, url: &str, form: &MultipartForm) -> Result<HttpReply, LoginError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .multipart(form.to_form())
            .send()
            .map_err(|err| LoginError::Transport(err.to_string()))?;
        // Error statuses are not turned into errors; their body may carry a message.
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| LoginError::Transport(err.to_string()))?;
        Ok(HttpReply {
            status,
            body: body.to_vec(),
        })
    }
}
