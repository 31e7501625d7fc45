use std::fmt;

use http::Method;
use serde_json::Value;

use crate::transport::{TransportFailure, TransportRequest, TransportResponse};

/**
A request that has been fully set up but not submitted yet.

Returned by [ApiClient::call_api](crate::ApiClient::call_api). Nothing goes
over the wire until one of [end](InFlight::end), [execute](InFlight::execute)
or [detach](InFlight::detach) is awaited; each of them consumes the handle, so
an outcome is delivered at most once per request.
*/
pub struct InFlight<Q> {
    method: Method,
    url: String,
    request: Q,
}

impl<Q: TransportRequest> InFlight<Q> {
    pub(crate) fn new(method: Method, url: String, request: Q) -> Self {
        Self {
            method,
            url,
            request,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Applies further transport-level configuration before submission.
    pub fn configure(mut self, f: impl FnOnce(Q) -> Q) -> Self {
        self.request = f(self.request);
        self
    }

    pub fn into_request(self) -> Q {
        self.request
    }

    /// Submits the request and resolves to the reply, or to the transport error unchanged.
    pub async fn execute(self) -> Result<Reply<Q::Response>, CallError<Q::Error, Q::Response>> {
        let Self {
            method,
            url,
            request,
        } = self;
        match request.end().await {
            Ok(response) => {
                log::debug!("{method} {url} -> {}", response.status());
                Ok(Reply { response })
            }
            Err(TransportFailure { error, response }) => {
                match &response {
                    Some(r) => log::debug!("{method} {url} -> {} ({error})", r.status()),
                    None => log::debug!("{method} {url} failed: {error}"),
                }
                Err(CallError { error, response })
            }
        }
    }

    /**
    Submits the request and invokes `callback` exactly once with
    `(error, body, response)`. `body` is the decoded payload of the response
    whenever there is a response, including failed ones.
    */
    pub async fn end<F>(self, callback: F)
    where
        F: FnOnce(Option<&Q::Error>, Option<&Value>, Option<&Q::Response>),
    {
        match self.execute().await {
            Ok(reply) => callback(None, reply.body(), Some(reply.response())),
            Err(e) => callback(Some(e.error()), e.body(), e.response()),
        }
    }

    /// Submits the request and discards its outcome.
    pub async fn detach(self) {
        let _ = self.execute().await;
    }
}

impl<Q> fmt::Debug for InFlight<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("method", &self.method)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// A successful exchange.
#[derive(Debug)]
pub struct Reply<R> {
    response: R,
}

impl<R: TransportResponse> Reply<R> {
    pub fn body(&self) -> Option<&Value> {
        self.response.body()
    }

    pub fn response(&self) -> &R {
        &self.response
    }

    pub fn into_response(self) -> R {
        self.response
    }
}

/// A failed exchange: the transport's error, passed through as is, and the response if any.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct CallError<E, R> {
    #[source]
    error: E,
    response: Option<R>,
}

impl<E, R: TransportResponse> CallError<E, R> {
    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn response(&self) -> Option<&R> {
        self.response.as_ref()
    }

    pub fn body(&self) -> Option<&Value> {
        self.response.as_ref().and_then(TransportResponse::body)
    }

    pub fn into_parts(self) -> (E, Option<R>) {
        (self.error, self.response)
    }
}
