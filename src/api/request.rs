//! Request descriptors for the uniform call primitive.
//!
//! Every backend operation is described by an [`Endpoint`] value: method,
//! path, query, headers and body encoding. The operations themselves are
//! thin wrappers that build a descriptor and hand it to
//! [`ApiClient::send`](super::ApiClient); authorization is attached there,
//! not here.

use reqwest::multipart;
use reqwest::Method;
use serde_json::Value;

/// A multipart field, kept as data so the reqwest form (which is
/// single-use) can be built at send time.
#[derive(Debug, Clone)]
pub enum Part {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        filename: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn text(name: &'static str, value: impl Into<String>) -> Self {
        Part::Text {
            name,
            value: value.into(),
        }
    }

    pub fn file(name: &'static str, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Part::File {
            name,
            filename: filename.into(),
            bytes,
        }
    }
}

/// Request body encoding, chosen per endpoint.
#[derive(Debug, Clone)]
pub enum Body {
    Empty,
    Form(Vec<(&'static str, String)>),
    Json(Value),
    Multipart(Vec<Part>),
}

/// One backend call: everything needed to issue the request.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: Body,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
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

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn form(mut self, fields: Vec<(&'static str, String)>) -> Self {
        self.body = Body::Form(fields);
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn multipart(mut self, parts: Vec<Part>) -> Self {
        self.body = Body::Multipart(parts);
        self
    }

    /// True when the descriptor carries its own `Authorization` header and
    /// the session bearer must not be attached.
    pub(crate) fn has_authorization(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
    }

    /// Build the reqwest multipart form for `parts`.
    pub(crate) fn build_multipart(parts: &[Part]) -> multipart::Form {
        let mut form = multipart::Form::new();
        for part in parts {
            form = match part {
                Part::Text { name, value } => form.text(*name, value.clone()),
                Part::File {
                    name,
                    filename,
                    bytes,
                } => form.part(
                    *name,
                    multipart::Part::bytes(bytes.clone()).file_name(filename.clone()),
                ),
            };
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_query_and_headers() {
        let endpoint = Endpoint::get("/user/@search")
            .query("keyword", "ada")
            .header("h-captcha-response", "tok");
        assert_eq!(endpoint.method, Method::GET);
        assert_eq!(endpoint.path, "/user/@search");
        assert_eq!(endpoint.query, vec![("keyword", "ada".to_string())]);
        assert_eq!(
            endpoint.headers,
            vec![("h-captcha-response", "tok".to_string())]
        );
    }

    #[test]
    fn authorization_detection_is_case_insensitive() {
        let endpoint = Endpoint::put("/@auth/@create").header("authorization", "Bearer x");
        assert!(endpoint.has_authorization());

        let endpoint = Endpoint::put("/@auth/@create").header("Authorization", "Bearer x");
        assert!(endpoint.has_authorization());

        let endpoint = Endpoint::get("/user/@me");
        assert!(!endpoint.has_authorization());
    }

    #[test]
    fn form_body_replaces_default_empty_body() {
        let endpoint = Endpoint::post("/auth/@create")
            .form(vec![("user", "ada".to_string()), ("pass", "pw".to_string())]);
        match endpoint.body {
            Body::Form(fields) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
