use lazy_static::lazy_static;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};

use crate::params::{Params, stringify};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([A-Za-z0-9_-]+)\}").unwrap();
}

/// Everything but the characters a URI component may carry unescaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

pub(crate) fn trim_base_path(base_path: &str) -> String {
    base_path.trim_end_matches('/').to_string()
}

/**
Appends `path` to `base_path` and replaces `{name}` placeholders with the
percent-encoded values from `path_params`.

A placeholder without a matching parameter is kept, encoded like any other
value (`{id}` becomes `%7Bid%7D`). Query parameters are not handled here.
*/
pub fn build_url(base_path: &str, path: &str, path_params: &Params) -> String {
    let url = if path.starts_with('/') {
        format!("{base_path}{path}")
    } else {
        format!("{base_path}/{path}")
    };

    PLACEHOLDER
        .replace_all(&url, |caps: &Captures| {
            let value = match path_params.get(&caps[1]) {
                Some(value) => stringify(value),
                None => caps[0].to_string(),
            };
            encode_uri_component(&value)
        })
        .into_owned()
}
