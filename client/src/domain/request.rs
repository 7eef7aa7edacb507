//! Request envelope passed from resource operations to the dispatcher.
//!
//! An [`ApiRequest`] names a method, a path relative to the API base URL,
//! caller headers, and a [`RequestBody`]. The body enum guarantees exactly one
//! encoding per request.

use bytes::Bytes;
use http::Method;
use serde::Serialize;

use super::error::ApiError;
use super::headers::{DISTRICT_ID, HeaderSet};
use super::tenant::DistrictId;

/// Transport shape of a request, as seen by the header builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// JSON body, or no body at all on a JSON-speaking endpoint.
    Json,
    /// `multipart/form-data`; the transport owns the content type.
    Multipart,
}

/// Request body in exactly one encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Serialized JSON document.
    Json(Bytes),
    /// Multipart form.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Encoding the header builder must honour for this body.
    pub fn encoding(&self) -> BodyEncoding {
        match self {
            Self::Empty | Self::Json(_) => BodyEncoding::Json,
            Self::Multipart(_) => BodyEncoding::Multipart,
        }
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// Binary file field.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        file_name: String,
        /// MIME type of the content, when known.
        content_type: Option<String>,
        /// File content.
        content: Bytes,
    },
}

impl FormPart {
    /// Field name of this part.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name.as_str(),
        }
    }
}

/// Ordered multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type,
            content: content.into(),
        });
        self
    }

    /// Parts in insertion order.
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Consume the form, yielding its parts in insertion order.
    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    /// First part named `name`.
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name() == name)
    }
}

/// Request envelope built by resource operations.
///
/// # Examples
/// ```
/// use precheck_client::domain::{ApiRequest, DistrictId};
///
/// let district = DistrictId::new("d1").expect("valid district");
/// let request = ApiRequest::get("/exceptions").scoped(&district);
/// assert_eq!(request.headers().get("X-District-ID"), Some("d1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: HeaderSet,
    body: RequestBody,
}

impl ApiRequest {
    /// Request with an explicit method.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderSet::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PATCH` request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Set one caller header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge caller headers; later values win.
    #[must_use]
    pub fn headers_from(mut self, headers: &HeaderSet) -> Self {
        self.headers.extend_from(headers);
        self
    }

    /// Scope the request to a tenant via the district header.
    #[must_use]
    pub fn scoped(self, district: &DistrictId) -> Self {
        self.header(DISTRICT_ID, district.as_str())
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] when `body` cannot be serialized.
    pub fn json<B>(mut self, body: &B) -> Result<Self, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let encoded =
            serde_json::to_vec(body).map_err(|error| ApiError::encode(error.to_string()))?;
        self.body = RequestBody::Json(Bytes::from(encoded));
        Ok(self)
    }

    /// Attach a multipart body.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API base URL, including any query string.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Caller headers, before defaults are merged.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Request body.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub(crate) fn into_parts(self) -> (Method, String, HeaderSet, RequestBody) {
        (self.method, self.path, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_replaces_previous_body() {
        let form = MultipartForm::new().text("mapping", "{}");
        let request = ApiRequest::post("/rules/runs")
            .multipart(form)
            .json(&json!({}))
            .expect("empty object encodes");

        assert_eq!(request.body(), &RequestBody::Json(Bytes::from_static(b"{}")));
        assert_eq!(request.body().encoding(), BodyEncoding::Json);
    }

    #[test]
    fn multipart_body_reports_multipart_encoding() {
        let form = MultipartForm::new()
            .file("file", "students.csv", None, Bytes::from_static(b"sis_id\n1\n"))
            .text("mapping", "{\"sis_id\":\"ID\"}");
        let request = ApiRequest::post("/import/students/csv").multipart(form);

        assert_eq!(request.body().encoding(), BodyEncoding::Multipart);
        let RequestBody::Multipart(form) = request.body() else {
            panic!("expected multipart body");
        };
        assert_eq!(form.parts().len(), 2);
        assert!(matches!(
            form.part("mapping"),
            Some(FormPart::Text { value, .. }) if value.contains("sis_id")
        ));
    }

    #[test]
    fn empty_body_is_json_shaped() {
        assert_eq!(ApiRequest::get("/districts").body().encoding(), BodyEncoding::Json);
    }
}
