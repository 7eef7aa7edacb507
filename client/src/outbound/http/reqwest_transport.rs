//! Reqwest-backed HTTP transport.
//!
//! This adapter owns wire details only: header encoding, JSON and multipart
//! bodies, and reqwest error mapping. Status interpretation belongs to the
//! dispatcher, so non-success responses are returned as ordinary values.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::domain::ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};
use crate::domain::{FormPart, HeaderSet, MultipartForm, RequestBody};

const DEFAULT_USER_AGENT: &str = concat!("precheck-client/", env!("CARGO_PKG_VERSION"));

/// [`HttpTransport`] over a shared [`reqwest::Client`].
///
/// No timeout is configured: a hung exchange blocks only its own call.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with a default client.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(DEFAULT_USER_AGENT).build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let builder = self
            .client
            .request(method, url.as_str())
            .headers(encode_headers(&headers)?);
        let builder = attach_body(builder, body)?;

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_body_error)?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "response received");
        Ok(TransportResponse::new(status, body))
    }
}

fn encode_headers(headers: &HeaderSet) -> Result<HeaderMap, TransportError> {
    let mut encoded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|error| TransportError::request(format!("header name {name:?}: {error}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|error| TransportError::request(format!("header {name}: {error}")))?;
        encoded.insert(header_name, header_value);
    }
    Ok(encoded)
}

fn attach_body(
    builder: RequestBuilder,
    body: RequestBody,
) -> Result<RequestBuilder, TransportError> {
    match body {
        RequestBody::Empty => Ok(builder),
        RequestBody::Json(bytes) => Ok(builder.body(bytes)),
        RequestBody::Multipart(form) => Ok(builder.multipart(encode_form(form)?)),
    }
}

fn encode_form(form: MultipartForm) -> Result<Form, TransportError> {
    form.into_parts()
        .into_iter()
        .try_fold(Form::new(), |encoded, part| match part {
            FormPart::Text { name, value } => Ok(encoded.text(name, value)),
            FormPart::File {
                name,
                file_name,
                content_type,
                content,
            } => {
                let file = Part::bytes(content.to_vec()).file_name(file_name);
                let file = match content_type {
                    Some(mime) => file
                        .mime_str(&mime)
                        .map_err(|error| TransportError::request(error.to_string()))?,
                    None => file,
                };
                Ok(encoded.part(name, file))
            }
        })
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::request(error.to_string())
    } else {
        TransportError::connection(error.to_string())
    }
}

fn map_body_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else {
        TransportError::body(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use bytes::Bytes;

    #[test]
    fn headers_keep_every_entry() {
        let headers = HeaderSet::new()
            .with("Authorization", "Bearer tok")
            .with("X-District-ID", "d1");

        let encoded = encode_headers(&headers).expect("valid headers");

        assert_eq!(encoded.len(), 2);
        assert_eq!(
            encoded.get("x-district-id").and_then(|value| value.to_str().ok()),
            Some("d1")
        );
    }

    #[test]
    fn invalid_header_values_are_request_errors() {
        let headers = HeaderSet::new().with("X-District-ID", "d1\nInjected: yes");

        let error = encode_headers(&headers).expect_err("newline rejected");

        assert_eq!(error.kind(), "Request");
    }

    #[test]
    fn invalid_mime_types_are_request_errors() {
        let form = MultipartForm::new().file(
            "file",
            "students.csv",
            Some("not a mime".to_owned()),
            Bytes::from_static(b"a,b\n"),
        );

        let error = encode_form(form).expect_err("bad mime rejected");

        assert_eq!(error.kind(), "Request");
    }
}
