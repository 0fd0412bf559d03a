//! Payload loading for `--data`.
//!
//! A payload argument is inline data, `@path` to read a file, or `@-` / `-`
//! to read standard input.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::{self, DataFormat};
use crate::error::CodecError;

/// Where a payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    Inline(String),
    File(PathBuf),
    Stdin,
}

impl PayloadSource {
    pub fn parse(arg: &str) -> Self {
        match arg {
            "-" | "@-" => PayloadSource::Stdin,
            _ => match arg.strip_prefix('@') {
                Some(path) => PayloadSource::File(PathBuf::from(path)),
                None => PayloadSource::Inline(arg.to_string()),
            },
        }
    }

    fn name(&self) -> String {
        match self {
            PayloadSource::Inline(_) => "<inline>".to_string(),
            PayloadSource::File(path) => path.display().to_string(),
            PayloadSource::Stdin => "<stdin>".to_string(),
        }
    }
}

/// Read the raw payload bytes, taking stdin from `stdin`.
pub async fn read_payload<R>(source: &PayloadSource, mut stdin: R) -> Result<Vec<u8>, CodecError>
where
    R: AsyncRead + Unpin,
{
    let read_err = |source_name: String| {
        move |source: std::io::Error| CodecError::Read {
            source_name,
            source,
        }
    };

    match source {
        PayloadSource::Inline(data) => Ok(data.clone().into_bytes()),
        PayloadSource::File(path) => tokio::fs::read(path)
            .await
            .map_err(read_err(source.name())),
        PayloadSource::Stdin => {
            let mut buf = Vec::new();
            stdin
                .read_to_end(&mut buf)
                .await
                .map_err(read_err(source.name()))?;
            Ok(buf)
        }
    }
}

/// Load and decode a payload argument, reading stdin from the process.
pub async fn load<T: DeserializeOwned>(arg: &str, format: DataFormat) -> Result<T, CodecError> {
    load_from(arg, format, tokio::io::stdin()).await
}

/// Load and decode a payload argument with an explicit stdin.
pub async fn load_from<T, R>(arg: &str, format: DataFormat, stdin: R) -> Result<T, CodecError>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let source = PayloadSource::parse(arg);
    tracing::debug!(source = %source.name(), %format, "loading payload");
    let data = read_payload(&source, stdin).await?;
    codec::decode(&data, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_source() {
        assert_eq!(PayloadSource::parse("-"), PayloadSource::Stdin);
        assert_eq!(PayloadSource::parse("@-"), PayloadSource::Stdin);
        assert_eq!(
            PayloadSource::parse("@data.json"),
            PayloadSource::File(PathBuf::from("data.json"))
        );
        assert_eq!(
            PayloadSource::parse("{\"a\":1}"),
            PayloadSource::Inline("{\"a\":1}".to_string())
        );
    }

    #[tokio::test]
    async fn test_load_inline_and_stdin() {
        let v: Value = load_from("[1,2]", DataFormat::Json, tokio::io::empty())
            .await
            .unwrap();
        assert_eq!(v, json!([1, 2]));

        let stdin: &[u8] = b"- name: a\n";
        let v: Value = load_from("-", DataFormat::Yaml, stdin).await.unwrap();
        assert_eq!(v, json!([{ "name": "a" }]));
    }

    #[tokio::test]
    async fn test_load_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{\"xname\":\"x1\"}").unwrap();

        let arg = format!("@{}", file.path().display());
        let v: Value = load_from(&arg, DataFormat::Json, tokio::io::empty())
            .await
            .unwrap();
        assert_eq!(v["xname"], "x1");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_from::<Value, _>("@/nonexistent/payload.json", DataFormat::Json, tokio::io::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Read { .. }));
    }
}
