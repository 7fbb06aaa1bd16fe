//! Thin adapter over the HTTP transport

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::core::auth::TokenContext;
use crate::core::config::ConnectionConfig;
use crate::core::errors::Result;
use crate::core::params::{RequestBody, RequestSpec};

/// Raw response handed to the decoding pipeline
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: reqwest::StatusCode,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Executes built requests over the shared HTTP client
///
/// No retries happen at this layer; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    http: reqwest::Client,
}

impl Dispatcher {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10);

        if let Some(proxy) = &config.proxy {
            let mut http_proxy = reqwest::Proxy::all(proxy.url())?;
            if let (Some(username), Some(password)) = (&proxy.username, &proxy.password) {
                http_proxy = http_proxy.basic_auth(username, password);
            }
            builder = builder.proxy(http_proxy);
        }

        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Execute one request and collect the full response
    pub async fn execute(
        &self,
        spec: RequestSpec,
        token: Option<&TokenContext>,
    ) -> Result<RawResponse> {
        debug!("{} {}", spec.method, spec.url);

        let mut request = self.http.request(spec.method, spec.url);

        if let Some(token) = token {
            request = token.apply_to(request)?;
        }

        request = match spec.body {
            RequestBody::None => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::FileUpload(upload) => {
                let part = Part::bytes(upload.content)
                    .file_name(upload.file_name)
                    .mime_str(upload.charset.mime())?;

                let mut form = Form::new();
                for (name, value) in upload.fields.iter() {
                    form = form.text(name.to_string(), value.to_string());
                }

                request.multipart(form.part("file", part))
            }
        };

        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        // Drain the body unconditionally so the connection is released on
        // every exit path.
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            body,
            content_type,
        })
    }
}
