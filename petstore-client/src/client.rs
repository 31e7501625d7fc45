use http::Method;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::dispatch::InFlight;
use crate::mime::{APPLICATION_JSON, FORM_URLENCODED, MULTIPART_FORM_DATA, json_preferred_mime};
use crate::params::{NormalizedValue, ParamValue, Params, normalize_params};
use crate::transport::{Transport, TransportRequest};
use crate::url_template::{build_url, trim_base_path};

/**
Declarative description of one API call: everything [ApiClient::call_api]
needs to build and dispatch the request.
*/
#[derive(Debug, Clone)]
pub struct CallSpec {
    method: Method,
    path: String,
    path_params: Params,
    query_params: Params,
    header_params: Params,
    form_params: Params,
    body: Option<Value>,
    content_types: Vec<String>,
    accepts: Vec<String>,
}

impl CallSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: Params::new(),
            query_params: Params::new(),
            header_params: Params::new(),
            form_params: Params::new(),
            body: None,
            content_types: Vec::new(),
            accepts: Vec::new(),
        }
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.path_params.insert(name, value);
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query_params.insert(name, value);
        self
    }

    pub fn header_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.header_params.insert(name, value);
        self
    }

    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.form_params.insert(name, value);
        self
    }

    pub fn path_params(mut self, params: Params) -> Self {
        self.path_params = params;
        self
    }

    pub fn query_params(mut self, params: Params) -> Self {
        self.query_params = params;
        self
    }

    pub fn header_params(mut self, params: Params) -> Self {
        self.header_params = params;
        self
    }

    pub fn form_params(mut self, params: Params) -> Self {
        self.form_params = params;
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_types<I, S>(mut self, mimes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = mimes.into_iter().map(Into::into).collect();
        self
    }

    pub fn accepts<I, S>(mut self, mimes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts = mimes.into_iter().map(Into::into).collect();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Turns [CallSpec]s into requests on the injected transport.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    base_path: String,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(&ApiConfig::default(), transport)
    }

    pub fn with_config(config: &ApiConfig, transport: T) -> Self {
        Self {
            base_path: trim_base_path(config.base_path()),
            transport,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn set_base_path(&mut self, base_path: &str) {
        self.base_path = trim_base_path(base_path);
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// See [build_url](crate::url_template::build_url); uses this client's base path.
    pub fn build_url(&self, path: &str, path_params: &Params) -> String {
        build_url(&self.base_path, path, path_params)
    }

    /**
    Builds the request described by `call` and returns it unsubmitted.

    The content type is the JSON-preferred pick from the declared candidates,
    `application/json` if there are none. Form parameters are only sent for
    form-urlencoded and multipart content types; otherwise the body parameter
    is sent if it is truthy. The accept type is the JSON-preferred pick from
    the accept candidates and is left unset if there are none.
    */
    pub fn call_api(&self, call: CallSpec) -> InFlight<T::Request> {
        let url = self.build_url(&call.path, &call.path_params);
        let mut request = self
            .transport
            .request(call.method.clone(), &url)
            .query(&normalize_params(&call.query_params))
            .set(&normalize_params(&call.header_params));

        let content_type = json_preferred_mime(&call.content_types)
            .filter(|m| !m.is_empty())
            .unwrap_or(APPLICATION_JSON);
        request = request.content_type(content_type);

        if content_type == FORM_URLENCODED {
            log::trace!("sending form parameters urlencoded");
            request = request.send_form(&normalize_params(&call.form_params));
        } else if content_type == MULTIPART_FORM_DATA {
            log::trace!("sending form parameters as multipart");
            for (name, value) in &normalize_params(&call.form_params) {
                request = match value {
                    NormalizedValue::Binary(blob) => request.attach(name, blob),
                    _ => request.field(name, value),
                };
            }
        } else if let Some(body) = call.body.as_ref().filter(|b| is_truthy(b)) {
            log::trace!("sending body parameter");
            request = request.send(body);
        }

        let accept = json_preferred_mime(&call.accepts).filter(|m| !m.is_empty());
        if let Some(accept) = accept {
            request = request.accept(accept);
        }

        log::debug!(
            "dispatching {} {url} (content type {content_type}, accept {})",
            call.method,
            accept.unwrap_or("unset")
        );
        InFlight::new(call.method, url, request)
    }
}

// null, false, 0, NaN and "" count as "no body"; objects and arrays never do
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_call_spec_builder() {
        let call = CallSpec::new(Method::DELETE, "/pet/{petId}")
            .path_param("petId", 3)
            .header_param("api_key", "special-key")
            .accepts(["application/xml", "application/json"]);
        assert_eq!(call.method(), &Method::DELETE);
        assert_eq!(call.path(), "/pet/{petId}");
        assert_eq!(call.path_params.get("petId"), Some(&ParamValue::from(3)));
        assert_eq!(call.accepts, ["application/xml", "application/json"]);
        assert!(call.content_types.is_empty());
        assert!(call.body.is_none());
    }
}
