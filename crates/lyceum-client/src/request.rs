//! Replayable request descriptions.
//!
//! A request that hits a 401 may be sent a second time after the session
//! is refreshed. [`ApiRequest`] keeps everything needed to rebuild it, so
//! each attempt picks up whatever token the store holds at send time.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Request body, kept in a form that can be rebuilt for every attempt.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }

    /// Set the content type of a file part. No effect on text parts.
    pub fn with_mime(mut self, content_type: impl Into<String>) -> Self {
        if let FormPart::File { mime, .. } = &mut self {
            *mime = Some(content_type.into());
        }
        self
    }
}

/// A request against the backend, relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<Value>,
    pub body: RequestBody,
    anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: RequestBody::Empty,
            anonymous: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach query parameters.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        self.query = Some(serde_json::to_value(query)?);
        Ok(self)
    }

    /// Attach a JSON body.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart body.
    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Send without credentials and without 401 interception.
    ///
    /// Used for login, where a 401 means bad credentials rather than an
    /// expired session.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }
}

/// Build a fresh multipart form from its parts.
pub(crate) fn build_form(parts: &[FormPart]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Filter {
        upcoming: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    }

    #[test]
    fn test_builders() {
        let req = ApiRequest::post("api/leaders")
            .with_json(&serde_json::json!({"name": "Ada"}))
            .unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "api/leaders");
        assert!(matches!(req.body, RequestBody::Json(ref v) if v["name"] == "Ada"));
        assert!(!req.is_anonymous());
        assert!(ApiRequest::get("x").anonymous().is_anonymous());
    }

    #[test]
    fn test_query_skips_unset_fields() {
        let req = ApiRequest::get("api/events")
            .with_query(&Filter {
                upcoming: true,
                limit: None,
            })
            .unwrap();
        assert_eq!(req.query, Some(serde_json::json!({"upcoming": true})));
    }

    #[test]
    fn test_form_part_mime() {
        let part = FormPart::file("file", "a.png", vec![1, 2, 3]).with_mime("image/png");
        assert!(matches!(part, FormPart::File { mime: Some(ref m), .. } if m == "image/png"));

        let text = FormPart::text("title", "Gala").with_mime("image/png");
        assert!(matches!(text, FormPart::Text { .. }));
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let parts = vec![FormPart::file("file", "a.bin", vec![0]).with_mime("not a mime")];
        assert!(build_form(&parts).is_err());
    }
}
