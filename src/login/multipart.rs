//! Text fields of a `multipart/form-data` submission.

use reqwest::blocking::multipart::Form;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, String)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), value.into()));
        self
    }

    pub fn parts(&self) -> &[(String, String)] {
        &self.parts
    }

    /// Builds the request body; parts keep their insertion order.
    pub fn to_form(&self) -> Form {
        self.parts
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            })
    }
}
