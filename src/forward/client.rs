//! The forwarder: builds and issues the single upstream call.
//!
//! # Responsibilities
//! - Copy every inbound query pair onto the fixed target URL
//! - Re-wrap uploaded files as multipart parts (`file0`, `file1`, ...)
//! - Enforce the configured request timeout on the shared client
//! - Require a JSON body on success; relay it verbatim

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart;
use url::{form_urlencoded, Url};

use crate::forward::error::ForwardError;

/// A file uploaded by the caller, buffered in memory for re-forwarding.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A successful upstream reply, relayed to the caller as-is.
#[derive(Debug)]
pub struct UpstreamReply {
    /// Upstream content type, when it could be determined.
    pub content_type: Option<String>,
    /// Verbatim upstream body. Guaranteed to parse as JSON.
    pub body: Vec<u8>,
}

/// Extract a single query parameter from a raw query string.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Stateless forwarder bound to one target endpoint.
pub struct Forwarder {
    client: reqwest::Client,
    target: Url,
}

impl Forwarder {
    /// Create a forwarder with a shared client enforcing `timeout` per request.
    pub fn new(target: Url, timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, target })
    }

    /// The fixed target endpoint.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Target URL with every inbound query pair appended, in order.
    fn outbound_url(&self, query: &str) -> Url {
        let mut url = self.target.clone();
        let pairs: Vec<_> = form_urlencoded::parse(query.as_bytes()).collect();
        if !pairs.is_empty() {
            let mut serializer = url.query_pairs_mut();
            for (key, value) in &pairs {
                serializer.append_pair(key, value);
            }
        }
        url
    }

    /// Forward a GET request by copying the query onto the target URL.
    pub async fn forward_get(&self, query: &str) -> Result<UpstreamReply, ForwardError> {
        let url = self.outbound_url(query);
        tracing::debug!(url = %url, "Forwarding GET request");

        self.dispatch(
            self.client
                .get(url)
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json"),
        )
        .await
    }

    /// Forward a POST as a rebuilt multipart form: `action`, optional `data`
    /// text field, and uploaded files as `file0`, `file1`, ...
    pub async fn forward_form(
        &self,
        query: &str,
        action: &str,
        data: Option<String>,
        files: Vec<UploadedFile>,
    ) -> Result<UpstreamReply, ForwardError> {
        let url = self.outbound_url(query);
        tracing::debug!(url = %url, files = files.len(), "Forwarding POST request as multipart form");

        let mut form = multipart::Form::new().text("action", action.to_owned());
        if let Some(data) = data {
            form = form.text("data", data);
        }
        for (index, file) in files.into_iter().enumerate() {
            let mut part = multipart::Part::bytes(file.bytes);
            if let Some(filename) = file.filename {
                part = part.file_name(filename);
            }
            if let Some(mime) = file.content_type {
                part = part.mime_str(&mime)?;
            }
            form = form.part(format!("file{index}"), part);
        }

        self.dispatch(self.client.post(url).multipart(form)).await
    }

    /// Forward a POST body verbatim, keeping the inbound content type.
    pub async fn forward_body(
        &self,
        query: &str,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Result<UpstreamReply, ForwardError> {
        let url = self.outbound_url(query);
        tracing::debug!(url = %url, bytes = body.len(), "Forwarding POST request body");

        let content_type = content_type.unwrap_or_else(|| "application/json".to_owned());
        self.dispatch(
            self.client
                .post(url)
                .header(CONTENT_TYPE, content_type)
                .body(body),
        )
        .await
    }

    /// Issue the upstream call and translate the result.
    ///
    /// Non-2xx status and non-JSON bodies are errors; the body is otherwise
    /// relayed untouched.
    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<UpstreamReply, ForwardError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(status = %status, "Upstream returned error status");
            return Err(ForwardError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?.to_vec();

        serde_json::from_slice::<serde::de::IgnoredAny>(&body)?;

        tracing::debug!(status = %status, bytes = body.len(), "Upstream responded");
        Ok(UpstreamReply { content_type, body })
    }
}
