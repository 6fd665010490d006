//! JSON encoding with configurable escaping.
//!
//! `serde_json` never escapes non-ASCII text or forward slashes. Responses
//! may need either, so the stock formatters are wrapped in [`Escaping`],
//! which rewrites string fragments before they reach the writer.

use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::io;

use crate::error::Result;

/// Encoding switches applied to every JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Write non-ASCII characters as-is instead of `\uXXXX`.
    pub unescaped_unicode: bool,
    /// Write `/` as-is instead of `\/`.
    pub unescaped_slashes: bool,
    /// Indent nested structures with four spaces.
    pub pretty_print: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            unescaped_unicode: true,
            unescaped_slashes: false,
            pretty_print: false,
        }
    }
}

impl EncodeOptions {
    /// Plain `serde_json` output: nothing escaped beyond what JSON requires.
    pub fn raw() -> Self {
        Self {
            unescaped_unicode: true,
            unescaped_slashes: true,
            pretty_print: false,
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty_print = true;
        self
    }
}

/// Serialize `value` to JSON bytes honoring `options`.
pub fn encode<T>(value: &T, options: EncodeOptions) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::with_capacity(128);
    if options.pretty_print {
        let formatter = Escaping::new(PrettyFormatter::with_indent(b"    "), options);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
    } else {
        let formatter = Escaping::new(CompactFormatter, options);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
    }
    Ok(buf)
}

/// Formatter adapter that escapes unicode and slashes on demand and
/// delegates layout to `inner`.
pub struct Escaping<F> {
    inner: F,
    options: EncodeOptions,
}

impl<F: Formatter> Escaping<F> {
    pub fn new(inner: F, options: EncodeOptions) -> Self {
        Self { inner, options }
    }
}

impl<F: Formatter> Formatter for Escaping<F> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.options.unescaped_unicode && self.options.unescaped_slashes {
            return writer.write_all(fragment.as_bytes());
        }

        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            let escape_slash = ch == '/' && !self.options.unescaped_slashes;
            let escape_char = !ch.is_ascii() && !self.options.unescaped_unicode;
            if !escape_slash && !escape_char {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..idx])?;
            if escape_slash {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object_value(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_str(value: &serde_json::Value, options: EncodeOptions) -> String {
        String::from_utf8(encode(value, options).unwrap()).unwrap()
    }

    #[test]
    fn default_keeps_unicode_and_escapes_slashes() {
        let value = json!({"message": "成功", "url": "https://example.com/a"});
        assert_eq!(
            encode_str(&value, EncodeOptions::default()),
            r#"{"message":"成功","url":"https:\/\/example.com\/a"}"#
        );
    }

    #[test]
    fn raw_matches_serde_json() {
        let value = json!({"message": "café", "url": "/a/b"});
        assert_eq!(
            encode_str(&value, EncodeOptions::raw()),
            serde_json::to_string(&value).unwrap()
        );
    }

    #[test]
    fn escaped_unicode_uses_utf16_units() {
        let options = EncodeOptions {
            unescaped_unicode: false,
            ..EncodeOptions::raw()
        };
        let value = json!({"é": "😀x"});
        assert_eq!(
            encode_str(&value, options),
            r#"{"\u00e9":"\ud83d\ude00x"}"#
        );
    }

    #[test]
    fn escaped_output_is_still_valid_json() {
        let options = EncodeOptions {
            unescaped_unicode: false,
            unescaped_slashes: false,
            pretty_print: false,
        };
        let value = json!({"path": "/ü/\"quoted\"\n", "list": [1, "ñ"]});
        let parsed: serde_json::Value =
            serde_json::from_slice(&encode(&value, options).unwrap()).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn pretty_print_uses_four_spaces() {
        let value = json!({"a": [1]});
        assert_eq!(
            encode_str(&value, EncodeOptions::raw().pretty()),
            "{\n    \"a\": [\n        1\n    ]\n}"
        );
    }

    #[test]
    fn empty_object_stays_compact() {
        assert_eq!(encode_str(&json!({}), EncodeOptions::default().pretty()), "{}");
    }
}
