use std::fmt;

use bytes::Bytes;
use indexmap::IndexMap;
use serde_json::Number;

/// A binary payload. In `multipart/form-data` requests it is sent as a file part.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    file_name: Option<String>,
    mime_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.bytes.len())
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/**
A raw parameter value as supplied by the caller of an endpoint.

`Null` stands for a parameter that was not given; such entries are dropped
during normalization.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    String(String),
    Number(Number),
    Bool(bool),
    Binary(Blob),
    Array(Vec<ParamValue>),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => Ok(()),
            ParamValue::String(s) => f.write_str(s),
            ParamValue::Number(n) => match n.as_f64() {
                Some(x) if n.is_f64() => f.write_str(&format_float(x)),
                _ => write!(f, "{n}"),
            },
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Binary(blob) => f.write_str(blob.file_name().unwrap_or_default()),
            ParamValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Canonical string form of a parameter value. `Null` yields the empty string.
pub fn stringify(value: &ParamValue) -> String {
    value.to_string()
}

/**
Formats a finite float the way ECMAScript's `Number.prototype.toString` does:
plain decimal notation for magnitudes in `[1e-6, 1e21)`, exponent notation
(`1e+21`, `1.5e-7`) outside of it. Digits are the shortest ones that round-trip.
*/
fn format_float(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    // `{:e}` yields the shortest round-trip digits, e.g. "-1.2345e-7"
    let scientific = format!("{:e}", x.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    // x = 0.digits * 10^n
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        format!("{first}{fraction}e{sign}{}", (n - 1).abs())
    };
    if x < 0.0 { format!("-{body}") } else { body }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(n: $t) -> Self {
                    ParamValue::Number(Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

// integral floats print like integers ("42", not "42.0")
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        if n.is_nan() {
            ParamValue::String("NaN".to_string())
        } else if n.is_infinite() {
            let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
            ParamValue::String(s.to_string())
        } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            ParamValue::Number(Number::from(n as i64))
        } else {
            Number::from_f64(n)
                .map(ParamValue::Number)
                .unwrap_or_else(|| ParamValue::String(n.to_string()))
        }
    }
}

impl From<f32> for ParamValue {
    fn from(n: f32) -> Self {
        // widen through the shortest decimal so 0.1f32 stays 0.1
        let widened = n.to_string().parse::<f64>().unwrap_or(n as f64);
        ParamValue::from(widened)
    }
}

impl From<Blob> for ParamValue {
    fn from(blob: Blob) -> Self {
        ParamValue::Binary(blob)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

/// Parameters of one category (path, query, header or form) of a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = indexmap::map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A parameter value after normalization, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Text(String),
    Binary(Blob),
    Array(Vec<ParamValue>),
}

impl NormalizedValue {
    /**
    The textual values this parameter contributes to a query string, header or
    form field: one for text, one per element for arrays. Binary values have no
    textual form and return `None`.
    */
    pub fn text_values(&self) -> Option<Vec<String>> {
        match self {
            NormalizedValue::Text(s) => Some(vec![s.clone()]),
            NormalizedValue::Array(items) => Some(items.iter().map(stringify).collect()),
            NormalizedValue::Binary(_) => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Blob> {
        match self {
            NormalizedValue::Binary(blob) => Some(blob),
            _ => None,
        }
    }
}

pub type NormalizedParams = IndexMap<String, NormalizedValue>;

/// Drops `Null` entries, keeps binaries and arrays, and stringifies everything else.
pub fn normalize_params(params: &Params) -> NormalizedParams {
    params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| {
            let normalized = match value {
                ParamValue::Binary(blob) => NormalizedValue::Binary(blob.clone()),
                ParamValue::Array(items) => NormalizedValue::Array(items.clone()),
                other => NormalizedValue::Text(stringify(other)),
            };
            (name.clone(), normalized)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_stringify_primitives() {
        assert_eq!(stringify(&ParamValue::Null), "");
        assert_eq!(stringify(&ParamValue::from(None::<i64>)), "");
        assert_eq!(stringify(&ParamValue::from(42)), "42");
        assert_eq!(stringify(&ParamValue::from(true)), "true");
        assert_eq!(stringify(&ParamValue::from("sold")), "sold");
    }

    #[test]
    fn test_stringify_floats() {
        assert_eq!(stringify(&ParamValue::from(42.0)), "42");
        assert_eq!(stringify(&ParamValue::from(1.5)), "1.5");
        assert_eq!(stringify(&ParamValue::from(-0.25)), "-0.25");
        assert_eq!(stringify(&ParamValue::from(f64::NAN)), "NaN");
        assert_eq!(stringify(&ParamValue::from(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(stringify(&ParamValue::from(-0.0)), "0");
    }

    #[test]
    fn test_stringify_floats_in_decimal_form() {
        assert_eq!(stringify(&ParamValue::from(1e16)), "10000000000000000");
        assert_eq!(
            stringify(&ParamValue::from(2f64.powi(60))),
            "1152921504606847000"
        );
        assert_eq!(stringify(&ParamValue::from(-2f64.powi(60))), "-1152921504606847000");
        assert_eq!(stringify(&ParamValue::from(0.000001)), "0.000001");
        assert_eq!(stringify(&ParamValue::from(0.0000015)), "0.0000015");
        assert_eq!(stringify(&ParamValue::from(123.456)), "123.456");
        assert_eq!(stringify(&ParamValue::from(0.1f32)), "0.1");
        assert_eq!(stringify(&ParamValue::from(2.5f32)), "2.5");
    }

    #[test]
    fn test_stringify_floats_in_exponent_form() {
        assert_eq!(stringify(&ParamValue::from(1e21)), "1e+21");
        assert_eq!(stringify(&ParamValue::from(1.5e300)), "1.5e+300");
        assert_eq!(stringify(&ParamValue::from(1e-7)), "1e-7");
        assert_eq!(stringify(&ParamValue::from(-1.25e-10)), "-1.25e-10");
    }

    #[test]
    fn test_stringify_composites() {
        let tags = ParamValue::from(vec!["a", "b", "c"]);
        assert_eq!(stringify(&tags), "a,b,c");

        let mixed = ParamValue::Array(vec![ParamValue::Null, ParamValue::from(1)]);
        assert_eq!(stringify(&mixed), ",1");

        let photo = ParamValue::from(Blob::new(vec![1u8, 2, 3]).with_file_name("rex.png"));
        assert_eq!(stringify(&photo), "rex.png");
        assert_eq!(stringify(&ParamValue::from(Blob::new(Vec::<u8>::new()))), "");
    }

    #[test]
    fn test_normalize_params() {
        let blob = Blob::new(b"\x89PNG".to_vec()).with_mime_type("image/png");
        let params = Params::new()
            .with("a", ParamValue::Null)
            .with("b", 5)
            .with("c", vec![1, 2])
            .with("d", blob.clone());

        let normalized = normalize_params(&params);

        assert_eq!(3, normalized.len());
        assert!(!normalized.contains_key("a"));
        assert_eq!(
            normalized.get("b"),
            Some(&NormalizedValue::Text("5".to_string()))
        );
        assert_eq!(
            normalized.get("c"),
            Some(&NormalizedValue::Array(vec![
                ParamValue::from(1),
                ParamValue::from(2)
            ]))
        );
        assert_eq!(normalized.get("d"), Some(&NormalizedValue::Binary(blob)));
    }

    #[test]
    fn test_normalize_keeps_empty_string() {
        let params = Params::new().with("status", "").with("limit", None::<u32>);
        let normalized = normalize_params(&params);
        assert_eq!(
            normalized.get("status"),
            Some(&NormalizedValue::Text(String::new()))
        );
        assert!(!normalized.contains_key("limit"));
    }

    #[test]
    fn test_text_values() {
        let array = NormalizedValue::Array(vec![ParamValue::from("x"), ParamValue::from(2)]);
        assert_eq!(
            array.text_values(),
            Some(vec!["x".to_string(), "2".to_string()])
        );
        assert_eq!(
            NormalizedValue::Text("t".to_string()).text_values(),
            Some(vec!["t".to_string()])
        );
        assert_eq!(NormalizedValue::Binary(Blob::new(vec![0u8])).text_values(), None);
    }

    #[test]
    fn test_params_from_iter() {
        let params: Params = [("petId", 7), ("orderId", 3)].into_iter().collect();
        assert_eq!(2, params.len());
        assert_eq!(params.get("petId"), Some(&ParamValue::from(7)));
        let names: Vec<&String> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["petId", "orderId"]);
    }
}
