use lazy_static::lazy_static;
use regex::Regex;

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

lazy_static! {
    static ref JSON_MIME: Regex = Regex::new(r"(?i)^application/json(;.*)?$").unwrap();
}

/**
Checks if the given MIME is a JSON MIME, e.g.
`application/json`, `application/json; charset=UTF8` or `APPLICATION/JSON`.
*/
pub fn is_json_mime(mime: Option<&str>) -> bool {
    mime.is_some_and(|m| JSON_MIME.is_match(m))
}

/**
Picks a MIME from the candidates with JSON preferred: the first JSON MIME if
there is one, otherwise the first candidate. `None` only for an empty list.
*/
pub fn json_preferred_mime<S: AsRef<str>>(mimes: &[S]) -> Option<&str> {
    mimes
        .iter()
        .map(|m| m.as_ref())
        .find(|m| is_json_mime(Some(*m)))
        .or_else(|| mimes.first().map(|m| m.as_ref()))
}
