//! REST request descriptions.

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Which authentication header family a REST endpoint expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiFamily {
    /// `Authorization: Bearer <token>`
    #[default]
    Normal,
    /// `X-SFDC-Session: <token>` (Bulk API 1.0)
    Bulk,
}

/// Request body content.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`.
    Json(serde_json::Value),
    /// Sent verbatim with the given content type.
    Raw { content_type: String, body: String },
}

/// A REST call, relative to the instance host.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: RequestMethod,
    /// Absolute path including any query string, e.g.
    /// `/services/data/v62.0/query/?q=...`.
    pub path: String,
    pub body: Option<RequestBody>,
    /// Extra headers, applied after the standard ones.
    pub headers: Vec<(String, String)>,
    pub api_family: ApiFamily,
}

impl RequestSpec {
    /// Create a request.
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
            api_family: ApiFamily::Normal,
        }
    }

    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, path)
    }

    /// A POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, path)
    }

    /// A PATCH request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Patch, path)
    }

    /// A DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, path)
    }

    /// Set a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Set a raw body with its content type.
    pub fn raw(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw {
            content_type: content_type.into(),
            body: body.into(),
        });
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the API family.
    pub fn api_family(mut self, family: ApiFamily) -> Self {
        self.api_family = family;
        self
    }

    /// Authenticate with `X-SFDC-Session` instead of a bearer header.
    pub fn bulk(self) -> Self {
        self.api_family(ApiFamily::Bulk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_spec_builder() {
        let spec = RequestSpec::post("/services/async/62.0/job")
            .json(serde_json::json!({"operation": "query"}))
            .header("X-Custom", "value")
            .bulk();

        assert_eq!(spec.method, RequestMethod::Post);
        assert_eq!(spec.api_family, ApiFamily::Bulk);
        assert_eq!(spec.headers, vec![("X-Custom".to_string(), "value".to_string())]);
        assert!(matches!(spec.body, Some(RequestBody::Json(_))));
    }

    #[test]
    fn test_defaults() {
        let spec = RequestSpec::get("/services/data/");
        assert_eq!(spec.api_family, ApiFamily::Normal);
        assert!(spec.body.is_none());
        assert_eq!(RequestMethod::Patch.to_reqwest(), reqwest::Method::PATCH);
    }
}
