use log::warn;

use super::multipart::MultipartForm;
use super::transport::HttpTransport;

/// Host and locale segment shared by every API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub domain: String,
    pub locale: String,
}

impl ApiEndpoint {
    pub fn new(domain: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            locale: locale.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "http://{}/{}/{}",
            self.domain,
            self.locale,
            path.trim_start_matches('/')
        )
    }
}

/// An endpoint paired with the transport that reaches it.
///
/// Specific requests supply the form and a classification function instead
/// of overriding a base type.
pub struct ApiRequest<T: HttpTransport> {
    endpoint: ApiEndpoint,
    transport: T,
}

impl<T: HttpTransport> ApiRequest<T> {
    pub fn new(endpoint: ApiEndpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    pub fn domain(&self) -> &str {
        &self.endpoint.domain
    }

    pub fn locale(&self) -> &str {
        &self.endpoint.locale
    }

    /// Posts `form` to `path` and hands the reply to `classify`.
    ///
    /// Returns `None` when no reply arrived at all.
    pub fn post_form<R>(
        &self,
        path: &str,
        form: &MultipartForm,
        classify: impl FnOnce(u16, &[u8]) -> R,
    ) -> Option<R> {
        let url = self.endpoint.url(path);
        match self.transport.post_form(&url, form) {
            Ok(reply) => Some(classify(reply.status, &reply.body)),
            Err(err) => {
                warn!("Request to {} failed: {}", url, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_domain_locale_and_path() {
        let endpoint = ApiEndpoint::new("example.org", "ru");
        assert_eq!(endpoint.url("api/login"), "http://example.org/ru/api/login");
        assert_eq!(endpoint.url("/api/login"), "http://example.org/ru/api/login");
    }
}
