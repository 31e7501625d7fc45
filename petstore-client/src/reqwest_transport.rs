//! [Transport] implementation on top of [reqwest].

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::mime::{MULTIPART_FORM_DATA, is_json_mime};
use crate::params::{Blob, NormalizedParams, NormalizedValue};
use crate::transport::{Transport, TransportFailure, TransportRequest, TransportResponse};

#[derive(Debug, thiserror::Error)]
pub enum ReqwestTransportError {
    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },
    #[error("binary parameter '{name}' cannot be sent as {location}")]
    UnsupportedValue {
        name: String,
        location: &'static str,
    },
    #[error("invalid MIME type '{mime}' for file part '{name}'")]
    InvalidPartMime {
        name: String,
        mime: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed")]
    Request(#[from] reqwest::Error),
    #[error("body could not be serialized")]
    Serialize(#[source] serde_json::Error),
    #[error("server responded with status {0}")]
    Status(StatusCode),
    #[error("response body is not valid JSON")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client, e.g. one with timeouts or proxies set.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    type Request = ReqwestRequest;

    fn request(&self, method: Method, url: &str) -> ReqwestRequest {
        ReqwestRequest {
            client: self.client.clone(),
            builder: self.client.request(method, url),
            content_type: None,
            accept: None,
            body: None,
            error: None,
        }
    }
}

#[derive(Debug, PartialEq)]
enum PendingPart {
    Text(String),
    File { file_name: String, blob: Blob },
}

enum PendingBody {
    Form(Vec<(String, String)>),
    Value(Value),
    Multipart(Vec<(String, PendingPart)>),
}

/// A request being assembled. The first invalid input is kept and reported by `end`.
pub struct ReqwestRequest {
    client: reqwest::Client,
    builder: reqwest::RequestBuilder,
    content_type: Option<String>,
    accept: Option<String>,
    body: Option<PendingBody>,
    error: Option<ReqwestTransportError>,
}

impl ReqwestRequest {
    fn fail(&mut self, error: ReqwestTransportError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn text_pairs(
        &mut self,
        params: &NormalizedParams,
        location: &'static str,
    ) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (name, value) in params {
            match value.text_values() {
                Some(values) => pairs.extend(values.into_iter().map(|v| (name.clone(), v))),
                None => self.fail(ReqwestTransportError::UnsupportedValue {
                    name: name.clone(),
                    location,
                }),
            }
        }
        pairs
    }

    fn take_parts(&mut self) -> Vec<(String, PendingPart)> {
        match self.body.take() {
            Some(PendingBody::Multipart(parts)) => parts,
            _ => Vec::new(),
        }
    }

    /**
    Assembles the final [reqwest::Request] without sending it.

    The negotiated content type and accept type replace any header of the same
    name set through [set](TransportRequest::set).
    */
    pub fn build(self) -> Result<reqwest::Request, ReqwestTransportError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut builder = self.builder;
        let mut content_type = self.content_type;
        let body = match self.body {
            None if content_type.as_deref() == Some(MULTIPART_FORM_DATA) => {
                Some(PendingBody::Multipart(Vec::new()))
            }
            body => body,
        };
        match body {
            Some(PendingBody::Multipart(parts)) => {
                let form = multipart_form(parts)?;
                // the boundary is part of the content type
                content_type = Some(format!("{MULTIPART_FORM_DATA}; boundary={}", form.boundary()));
                builder = builder.multipart(form);
            }
            Some(PendingBody::Form(pairs)) => builder = builder.form(&pairs),
            Some(PendingBody::Value(value)) => {
                let bytes = encode_body(value, content_type.as_deref())?;
                builder = builder.body(bytes);
            }
            None => {}
        }

        let mut request = builder.build()?;
        let headers = request.headers_mut();
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, header_value(&CONTENT_TYPE, &content_type)?);
        }
        if let Some(accept) = self.accept {
            headers.insert(ACCEPT, header_value(&ACCEPT, &accept)?);
        }
        Ok(request)
    }
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, ReqwestTransportError> {
    HeaderValue::from_str(value).map_err(|_| ReqwestTransportError::InvalidHeader {
        name: name.to_string(),
    })
}

fn multipart_form(parts: Vec<(String, PendingPart)>) -> Result<Form, ReqwestTransportError> {
    let mut form = Form::new();
    for (name, part) in parts {
        form = match part {
            PendingPart::Text(text) => form.text(name, text),
            PendingPart::File { file_name, blob } => {
                let mut part = Part::bytes(blob.bytes().to_vec()).file_name(file_name);
                if let Some(mime) = blob.mime_type() {
                    part = part.mime_str(mime).map_err(|source| {
                        ReqwestTransportError::InvalidPartMime {
                            name: name.clone(),
                            mime: mime.to_string(),
                            source,
                        }
                    })?;
                }
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

// strings go out raw unless the content type is JSON; everything else is JSON
fn encode_body(
    value: Value,
    content_type: Option<&str>,
) -> Result<Vec<u8>, ReqwestTransportError> {
    match value {
        Value::String(s) if !is_json_mime(content_type) => Ok(s.into_bytes()),
        value => serde_json::to_vec(&value).map_err(ReqwestTransportError::Serialize),
    }
}

fn failure(
    error: impl Into<ReqwestTransportError>,
) -> TransportFailure<ReqwestTransportError, ReqwestResponse> {
    TransportFailure::new(error.into())
}

fn decode_body(headers: &HeaderMap, raw: &[u8]) -> Result<Option<Value>, serde_json::Error> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if raw.is_empty() || !is_json_mime(content_type) {
        return Ok(None);
    }
    serde_json::from_slice(raw).map(Some)
}

/// Decodes the payload and turns non-2xx statuses into [ReqwestTransportError::Status].
fn complete(
    status: StatusCode,
    headers: HeaderMap,
    raw: Bytes,
) -> Result<ReqwestResponse, TransportFailure<ReqwestTransportError, ReqwestResponse>> {
    let mut response = ReqwestResponse {
        status,
        headers,
        body: None,
        raw,
    };
    let decoded = decode_body(&response.headers, &response.raw);
    if !status.is_success() {
        // an undecodable error payload stays available as raw bytes
        response.body = decoded.ok().flatten();
        return Err(TransportFailure::with_response(
            ReqwestTransportError::Status(status),
            response,
        ));
    }
    match decoded {
        Ok(body) => response.body = body,
        Err(e) => {
            return Err(TransportFailure::with_response(
                ReqwestTransportError::Decode(e),
                response,
            ));
        }
    }
    Ok(response)
}

impl TransportRequest for ReqwestRequest {
    type Response = ReqwestResponse;
    type Error = ReqwestTransportError;

    fn query(mut self, params: &NormalizedParams) -> Self {
        let pairs = self.text_pairs(params, "query parameter");
        self.builder = self.builder.query(&pairs);
        self
    }

    fn set(mut self, headers: &NormalizedParams) -> Self {
        for (name, value) in self.text_pairs(headers, "header") {
            let header_name = HeaderName::from_bytes(name.as_bytes());
            let header_value = HeaderValue::from_str(&value);
            match (header_name, header_value) {
                (Ok(n), Ok(v)) => self.builder = self.builder.header(n, v),
                _ => self.fail(ReqwestTransportError::InvalidHeader { name }),
            }
        }
        self
    }

    fn content_type(mut self, mime: &str) -> Self {
        self.content_type = Some(mime.to_string());
        self
    }

    fn send_form(mut self, form: &NormalizedParams) -> Self {
        let pairs = self.text_pairs(form, "urlencoded form field");
        self.body = Some(PendingBody::Form(pairs));
        self
    }

    fn send(mut self, body: &Value) -> Self {
        self.body = Some(PendingBody::Value(body.clone()));
        self
    }

    fn field(mut self, name: &str, value: &NormalizedValue) -> Self {
        let mut parts = self.take_parts();
        match value.text_values() {
            Some(values) => {
                parts.extend(values.into_iter().map(|v| (name.to_string(), PendingPart::Text(v))));
            }
            None => self.fail(ReqwestTransportError::UnsupportedValue {
                name: name.to_string(),
                location: "multipart text field",
            }),
        }
        self.body = Some(PendingBody::Multipart(parts));
        self
    }

    fn attach(mut self, name: &str, blob: &Blob) -> Self {
        let mut parts = self.take_parts();
        let file_name = blob.file_name().unwrap_or(name).to_string();
        parts.push((
            name.to_string(),
            PendingPart::File {
                file_name,
                blob: blob.clone(),
            },
        ));
        self.body = Some(PendingBody::Multipart(parts));
        self
    }

    fn accept(mut self, mime: &str) -> Self {
        self.accept = Some(mime.to_string());
        self
    }

    async fn end(
        self,
    ) -> Result<ReqwestResponse, TransportFailure<ReqwestTransportError, ReqwestResponse>> {
        let client = self.client.clone();
        let request = self.build().map_err(failure)?;
        let response = client
            .execute(request)
            .await
            .map_err(failure)?;

        let status = response.status();
        let headers = response.headers().clone();
        let raw = response
            .bytes()
            .await
            .map_err(failure)?;

        complete(status, headers, raw)
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
    raw: Bytes,
}

impl ReqwestResponse {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &Bytes {
        &self.raw
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

impl TransportResponse for ReqwestResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}
