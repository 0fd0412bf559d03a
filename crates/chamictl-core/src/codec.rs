//! Payload encoding and decoding.
//!
//! Pure conversions between bytes and values; reading payloads from files or
//! stdin lives in [`crate::payload`].

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Wire/display format for payloads and output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataFormat {
    #[default]
    Json,
    JsonPretty,
    Yaml,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::JsonPretty => "json-pretty",
            DataFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "json-pretty" => Ok(DataFormat::JsonPretty),
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            _ => Err(CodecError::UnknownFormat(s.to_string())),
        }
    }
}

/// Encode a value. Output never ends with a newline.
pub fn encode<T: Serialize + ?Sized>(value: &T, format: DataFormat) -> Result<String, CodecError> {
    let out = match format {
        DataFormat::Json => serde_json::to_string(value)?,
        DataFormat::JsonPretty => serde_json::to_string_pretty(value)?,
        DataFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(out.trim_end_matches('\n').to_string())
}

/// Decode a value. `json` and `json-pretty` are the same on input.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: DataFormat) -> Result<T, CodecError> {
    match format {
        DataFormat::Json | DataFormat::JsonPretty => Ok(serde_json::from_slice(data)?),
        DataFormat::Yaml => {
            let text = std::str::from_utf8(data).map_err(|_| CodecError::NotUtf8)?;
            Ok(serde_yaml::from_str(text)?)
        }
    }
}

/// Re-encode a response body for display.
///
/// JSON bodies are decoded and encoded in `format`; anything else (boot
/// scripts, plain text) is returned verbatim. Empty bodies yield `None`.
pub fn format_body(body: &[u8], format: DataFormat) -> Result<Option<String>, CodecError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => encode(&value, format).map(Some),
        Err(_) => {
            let text = std::str::from_utf8(body).map_err(|_| CodecError::NotUtf8)?;
            Ok(Some(text.trim_end_matches('\n').to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<DataFormat>().unwrap(), DataFormat::Json);
        assert_eq!("JSON-Pretty".parse::<DataFormat>().unwrap(), DataFormat::JsonPretty);
        assert_eq!("yaml".parse::<DataFormat>().unwrap(), DataFormat::Yaml);
        assert!(matches!(
            "xml".parse::<DataFormat>(),
            Err(CodecError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_json_and_yaml_round_trip() {
        let value = json!({
            "macs": ["de:ad:be:ef:00:01"],
            "kernel": "http://s3/kernel",
            "nested": { "n": 3, "ok": true }
        });

        for format in [DataFormat::Json, DataFormat::JsonPretty, DataFormat::Yaml] {
            let text = encode(&value, format).unwrap();
            let back: serde_json::Value = decode(text.as_bytes(), format).unwrap();
            assert_eq!(back, value, "{} round trip", format);
        }
    }

    #[test]
    fn test_format_body() {
        assert_eq!(format_body(b"", DataFormat::Json).unwrap(), None);
        assert_eq!(format_body(b"  \n", DataFormat::Json).unwrap(), None);

        assert_eq!(
            format_body(b"{\"a\": 1}", DataFormat::Json).unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(
            format_body(b"{\"a\": 1}", DataFormat::Yaml).unwrap().as_deref(),
            Some("a: 1")
        );

        let script = b"#!ipxe\nkernel http://x\n";
        assert_eq!(
            format_body(script, DataFormat::Yaml).unwrap().as_deref(),
            Some("#!ipxe\nkernel http://x")
        );
    }

    #[test]
    fn test_decode_yaml_not_utf8() {
        let err = decode::<serde_json::Value>(&[0xff, 0xfe], DataFormat::Yaml).unwrap_err();
        assert!(matches!(err, CodecError::NotUtf8));
    }
}
