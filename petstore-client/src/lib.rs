//! Client layer for the Petstore REST API.
//!
//! An [ApiClient] turns a declarative [CallSpec] into a request on an injected
//! [Transport]: it resolves the URL from the path template, normalizes query,
//! header and form parameters, negotiates content and accept types (preferring
//! JSON), and hands the request to the transport. The outcome is delivered
//! through the returned [InFlight] handle.

mod client;
mod config;
mod dispatch;
mod params;
#[cfg(feature = "reqwest")]
mod reqwest_transport;

pub mod mime;
pub mod transport;
pub mod url_template;

pub use client::{ApiClient, CallSpec};
pub use config::{ApiConfig, DEFAULT_BASE_PATH};
pub use dispatch::{CallError, InFlight, Reply};
pub use params::{
    Blob, NormalizedParams, NormalizedValue, ParamValue, Params, normalize_params, stringify,
};
#[cfg(feature = "reqwest")]
pub use reqwest_transport::{ReqwestRequest, ReqwestResponse, ReqwestTransport, ReqwestTransportError};
