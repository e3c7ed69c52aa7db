use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use triage_core::constants::API_PREFIX;
use triage_core::{TriageError, TriageResult};

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub(crate) fn build_client(timeout: Duration) -> TriageResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TriageError::InvalidInput(format!("failed to build HTTP client: {e}")))
}

/// Parse the backend base URL and append the `/api` prefix.
pub(crate) fn api_root(base_url: &str) -> TriageResult<Url> {
    let mut url = Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| TriageError::InvalidInput(format!("invalid backend URL {base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| TriageError::InvalidInput(format!("backend URL cannot be a base: {base_url}")))?
        .pop_if_empty()
        .push(API_PREFIX);
    Ok(url)
}

/// `root` with each segment appended, percent-encoded.
pub(crate) fn endpoint(root: &Url, segments: &[&str]) -> TriageResult<Url> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|_| TriageError::InvalidInput(format!("backend URL cannot be a base: {root}")))?
        .extend(segments);
    Ok(url)
}

/// Decode a JSON response body, reporting the path of the first bad field.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> TriageResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = match err.path().to_string() {
            path if path.is_empty() || path == "." => "<root>".to_string(),
            path => path,
        };
        TriageError::Decode {
            path,
            message: err.into_inner().to_string(),
        }
    })
}

pub(crate) fn transport(err: reqwest::Error) -> TriageError {
    TriageError::Transport(err.to_string())
}

/// Pass 2xx responses through; turn anything else into `TriageError::Http`.
pub(crate) async fn check_status(response: Response) -> TriageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message);
    tracing::error!(status = status.as_u16(), ?message, "backend returned an error");

    Err(TriageError::http(status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_root_appends_prefix_once() {
        let root = api_root("http://localhost:8000/").expect("root");
        assert_eq!(root.as_str(), "http://localhost:8000/api");

        let nested = api_root("https://triage.example/v2").expect("root");
        assert_eq!(nested.as_str(), "https://triage.example/v2/api");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let root = api_root("http://localhost:8000").expect("root");
        let url = endpoint(&root, &["patients", "a/b c", "status"]).expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/patients/a%2Fb%20c/status"
        );
    }

    #[test]
    fn rejects_unparseable_base() {
        assert!(matches!(
            api_root("not a url"),
            Err(TriageError::InvalidInput(_))
        ));
    }
}
