//! Response emission: turns a finished mapping into a response artifact.
//!
//! The builder never constructs [`Rendered`] itself; it always goes through
//! an [`Emitter`]. [`JsonEmitter`] is the stock implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RenderError, Result};
use crate::format::{EncodeOptions, encode};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const JSONP_CONTENT_TYPE: &str = "text/javascript";

/// Ordered list of extra response headers.
pub type Headers = Vec<(String, String)>;

/// A finished, transport-agnostic response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    pub status: u16,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Rendered {
    /// Body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Defaults used by the stock JSON / JSONP formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDefaults {
    pub status: u16,
    pub headers: Headers,
    pub options: EncodeOptions,
    pub callback: String,
}

impl Default for ResponseDefaults {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            options: EncodeOptions::default(),
            callback: "jsonp".into(),
        }
    }
}

/// The response-emission capability consumed by the builder's formatters.
pub trait Emitter: Send + Sync {
    /// Encode `data` as a JSON response.
    fn json(
        &self,
        data: &Map<String, Value>,
        status: u16,
        headers: &Headers,
        options: EncodeOptions,
    ) -> Result<Rendered>;

    /// Encode `data` as a JSONP response invoking `callback`.
    fn jsonp(
        &self,
        callback: &str,
        data: &Map<String, Value>,
        status: u16,
        headers: &Headers,
        options: EncodeOptions,
    ) -> Result<Rendered>;
}

/// Stock emitter: `application/json`, and `/**/cb(...);` for JSONP.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl Emitter for JsonEmitter {
    fn json(
        &self,
        data: &Map<String, Value>,
        status: u16,
        headers: &Headers,
        options: EncodeOptions,
    ) -> Result<Rendered> {
        check_status(status)?;
        Ok(Rendered {
            status,
            content_type: JSON_CONTENT_TYPE.into(),
            headers: headers.clone(),
            body: encode(data, options)?,
        })
    }

    fn jsonp(
        &self,
        callback: &str,
        data: &Map<String, Value>,
        status: u16,
        headers: &Headers,
        options: EncodeOptions,
    ) -> Result<Rendered> {
        check_status(status)?;
        if !is_valid_callback(callback) {
            return Err(RenderError::InvalidCallback(callback.to_string()));
        }

        let payload = encode(data, options)?;
        let mut body = Vec::with_capacity(payload.len() + callback.len() + 8);
        body.extend_from_slice(b"/**/");
        body.extend_from_slice(callback.as_bytes());
        body.push(b'(');
        body.extend_from_slice(&payload);
        body.extend_from_slice(b");");

        Ok(Rendered {
            status,
            content_type: JSONP_CONTENT_TYPE.into(),
            headers: headers.clone(),
            body,
        })
    }
}

fn check_status(status: u16) -> Result<()> {
    if (100..=599).contains(&status) {
        Ok(())
    } else {
        Err(RenderError::InvalidStatus(status))
    }
}

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "implements", "import", "in", "instanceof", "interface", "let", "new", "null", "package",
    "private", "protected", "public", "return", "static", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// A callback is a dot-separated path of JavaScript identifiers, each
/// optionally followed by numeric `[n]` index segments.
pub fn is_valid_callback(callback: &str) -> bool {
    !callback.is_empty() && callback.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let (ident, mut rest) = match segment.find('[') {
        Some(idx) => segment.split_at(idx),
        None => (segment, ""),
    };

    let mut chars = ident.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '$' || first == '_' || first.is_alphabetic()) {
        return false;
    }
    if !chars.all(|c| c == '$' || c == '_' || c.is_alphanumeric()) {
        return false;
    }
    if RESERVED_WORDS.contains(&ident) {
        return false;
    }

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return false;
        };
        let Some(len) = index_len(inner) else {
            return false;
        };
        let Some(after) = inner[len..].strip_prefix(']') else {
            return false;
        };
        rest = after;
    }
    true
}

/// Byte length of a leading index body: digits, or a single- or
/// double-quoted string with backslash escapes.
fn index_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next()? {
        (_, quote @ ('"' | '\'')) => {
            let mut escaped = false;
            for (i, c) in chars {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    return Some(i + 1);
                }
            }
            None
        }
        (_, c) if c.is_ascii_digit() => Some(s.bytes().take_while(u8::is_ascii_digit).count()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn json_response_defaults() {
        let data = mapping(json!({"message": "ok", "code": 0}));
        let out = JsonEmitter
            .json(&data, 200, &Vec::new(), EncodeOptions::default())
            .unwrap();
        assert_eq!(out.status, 200);
        assert_eq!(out.content_type, JSON_CONTENT_TYPE);
        assert!(out.headers.is_empty());
        assert_eq!(out.text(), r#"{"message":"ok","code":0}"#);
    }

    #[test]
    fn json_response_keeps_headers() {
        let headers = vec![("X-Trace".to_string(), "abc".to_string())];
        let out = JsonEmitter
            .json(&Map::new(), 201, &headers, EncodeOptions::default())
            .unwrap();
        assert_eq!(out.status, 201);
        assert_eq!(out.header("x-trace"), Some("abc"));
        assert_eq!(out.text(), "{}");
    }

    #[test]
    fn jsonp_wraps_payload() {
        let data = mapping(json!({"a": 1}));
        let out = JsonEmitter
            .jsonp("handle", &data, 200, &Vec::new(), EncodeOptions::default())
            .unwrap();
        assert_eq!(out.content_type, JSONP_CONTENT_TYPE);
        assert_eq!(out.text(), r#"/**/handle({"a":1});"#);
    }

    #[test]
    fn jsonp_rejects_bad_callback() {
        let err = JsonEmitter
            .jsonp("alert(1)//", &Map::new(), 200, &Vec::new(), EncodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidCallback(_)));
    }

    #[test]
    fn invalid_status_rejected() {
        let err = JsonEmitter
            .json(&Map::new(), 42, &Vec::new(), EncodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidStatus(42)));
    }

    #[test]
    fn callback_validation() {
        assert!(is_valid_callback("jsonp"));
        assert!(is_valid_callback("$.ajax.cb_1"));
        assert!(is_valid_callback("handlers[0].done"));
        assert!(is_valid_callback("名前"));
        assert!(!is_valid_callback(""));
        assert!(!is_valid_callback("a..b"));
        assert!(!is_valid_callback("1abc"));
        assert!(!is_valid_callback("foo[bar]"));
        assert!(!is_valid_callback("foo[0"));
        assert!(!is_valid_callback("function"));
        assert!(!is_valid_callback("a b"));
    }

    #[test]
    fn callback_quoted_indexes() {
        assert!(is_valid_callback(r#"cb["x"]"#));
        assert!(is_valid_callback("cb['y'][0].done"));
        assert!(is_valid_callback(r#"cb["a\"b"]"#));
        assert!(is_valid_callback(r#"cb[""]"#));
        assert!(!is_valid_callback(r#"cb["x]"#));
        assert!(!is_valid_callback(r#"cb["x"'"#));
        assert!(!is_valid_callback(r#"cb["x"]y"#));
    }
}
