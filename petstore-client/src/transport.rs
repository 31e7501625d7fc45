//! The HTTP transport the [ApiClient](crate::ApiClient) dispatches through.
//!
//! Connection handling, TLS, redirects and timeouts all live behind these
//! traits. Request builder methods never fail; a transport that receives
//! something it cannot send keeps the error and reports it from `end`.

use std::fmt::Debug;
use std::future::Future;

use http::{Method, StatusCode};
use serde_json::Value;

use crate::params::{Blob, NormalizedParams, NormalizedValue};

pub trait Transport {
    type Request: TransportRequest;

    fn request(&self, method: Method, url: &str) -> Self::Request;
}

pub trait TransportRequest: Sized + Send {
    type Response: TransportResponse;
    type Error: std::error::Error + Send + 'static;

    fn query(self, params: &NormalizedParams) -> Self;
    fn set(self, headers: &NormalizedParams) -> Self;
    fn content_type(self, mime: &str) -> Self;
    /// Sends the form parameters as an `application/x-www-form-urlencoded` body.
    fn send_form(self, form: &NormalizedParams) -> Self;
    fn send(self, body: &Value) -> Self;
    /// Adds a plain `multipart/form-data` field. Never called with binary values.
    fn field(self, name: &str, value: &NormalizedValue) -> Self;
    /// Adds a `multipart/form-data` file part.
    fn attach(self, name: &str, blob: &Blob) -> Self;
    fn accept(self, mime: &str) -> Self;

    /// Submits the request. The returned future resolves exactly once.
    fn end(
        self,
    ) -> impl Future<Output = Result<Self::Response, TransportFailure<Self::Error, Self::Response>>>
    + Send;
}

pub trait TransportResponse: Debug + Send {
    fn status(&self) -> StatusCode;

    /// The decoded payload, if the response carried one the transport could decode.
    fn body(&self) -> Option<&Value>;
}

/// A failed exchange. Some failures (like an error status) still come with a response.
#[derive(Debug)]
pub struct TransportFailure<E, R> {
    pub error: E,
    pub response: Option<R>,
}

impl<E, R> TransportFailure<E, R> {
    pub fn new(error: E) -> Self {
        Self {
            error,
            response: None,
        }
    }

    pub fn with_response(error: E, response: R) -> Self {
        Self {
            error,
            response: Some(response),
        }
    }
}
