//! `HttpFetcher`: the interface the `request` generator compiles against.
//!
//! The evaluator is synchronous (spec.md §5), so this trait is a blocking
//! call from the caller's point of view even though the default
//! implementation is built on `reqwest`'s async client — it spins up a
//! throwaway `tokio` runtime per call, the same way the teacher's
//! `DefaultHttpFetcher` bridges an async HTTP client into a sync trait.

use crate::error::HttpError;
use serde_json::Value;
use tracing::debug;

pub trait HttpFetcher: Send + Sync {
    /// `GET url` with the given headers; decode the body as a stream of
    /// concatenated JSON documents (a "JSON sequence") and return them all.
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Vec<Value>, HttpError>;
}

/// The default, `reqwest`-backed fetcher used outside tests.
#[derive(Debug, Default, Clone)]
pub struct ReqwestFetcher;

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Vec<Value>, HttpError> {
        debug!(%url, header_count = headers.len(), "request generator: fetching");

        let url = url.to_string();
        let headers = headers.to_vec();
        let runtime = tokio::runtime::Runtime::new().map_err(|e| HttpError::Transport {
            url: url.clone(),
            detail: format!("failed to start runtime: {e}"),
        })?;

        runtime.block_on(async move { fetch_async(&url, &headers).await })
    }
}

async fn fetch_async(url: &str, headers: &[(String, String)]) -> Result<Vec<Value>, HttpError> {
    let client = reqwest::Client::new();
    let mut builder = client.get(url);
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let response = builder.send().await.map_err(|e| HttpError::Transport {
        url: url.to_string(),
        detail: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| HttpError::Transport {
        url: url.to_string(),
        detail: e.to_string(),
    })?;

    decode_json_sequence(url, &body)
}

/// Decode a body made of zero or more whitespace-separated top-level JSON
/// documents ("JSON sequences"), e.g. `{"a":1}\n{"a":2}` or a single `[1,2]`.
pub fn decode_json_sequence(url: &str, body: &str) -> Result<Vec<Value>, HttpError> {
    let stream = serde_json::Deserializer::from_str(body).into_iter::<Value>();
    stream.collect::<Result<Vec<Value>, _>>().map_err(|e| HttpError::Decode {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_single_document() {
        let docs = decode_json_sequence("http://x", r#"{"a":1}"#).unwrap();
        assert_eq!(docs, vec![json!({"a": 1})]);
    }

    #[test]
    fn decodes_concatenated_documents() {
        let docs = decode_json_sequence("http://x", "{\"a\":1}\n{\"a\":2}").unwrap();
        assert_eq!(docs, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn decodes_single_array_document() {
        let docs = decode_json_sequence("http://x", "[1,2,3]").unwrap();
        assert_eq!(docs, vec![json!([1, 2, 3])]);
    }

    #[test]
    fn rejects_undecodable_body() {
        let err = decode_json_sequence("http://x", "not json").unwrap_err();
        assert!(matches!(err, HttpError::Decode { .. }));
    }
}

/// A scripted fetcher for tests: returns a fixed response (or error) no
/// matter what URL/headers it is called with, while recording every call
/// it received.
pub struct ScriptedFetcher {
    response: Result<Vec<Value>, HttpError>,
    calls: std::sync::Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedFetcher {
    pub fn ok(values: Vec<Value>) -> Self {
        Self {
            response: Ok(values),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn err(error: HttpError) -> Self {
        Self {
            response: Err(error),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl HttpFetcher for ScriptedFetcher {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Vec<Value>, HttpError> {
        self.calls.lock().unwrap().push((url.to_string(), headers.to_vec()));
        match &self.response {
            Ok(values) => Ok(values.clone()),
            Err(HttpError::Status { url, status }) => Err(HttpError::Status {
                url: url.clone(),
                status: *status,
            }),
            Err(HttpError::Decode { url, detail }) => Err(HttpError::Decode {
                url: url.clone(),
                detail: detail.clone(),
            }),
            Err(HttpError::Transport { url, detail }) => Err(HttpError::Transport {
                url: url.clone(),
                detail: detail.clone(),
            }),
        }
    }
}
