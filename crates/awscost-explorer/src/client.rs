//! HTTP client for the Cost Explorer `GetCostAndUsage` operation
//!
//! Requests are JSON 1.1 POSTs signed with SigV4. A non-success status is
//! turned into [`AwsCostError::Fetch`] carrying the AWS error code, so
//! callers see e.g. `GetCostAndUsage failed: ThrottlingException: Rate exceeded`.

use crate::config::ExplorerConfig;
use crate::signer::RequestSigner;
use async_trait::async_trait;
use awscost_core::error::{AwsCostError, Result};
use awscost_core::provider::CostQueryClient;
use awscost_core::raw::{CostAndUsageRequest, GetCostAndUsageResponse};
use serde::Deserialize;
use tracing::{debug, warn};

const OPERATION: &str = "GetCostAndUsage";
const TARGET: &str = "AWSInsightsIndexService.GetCostAndUsage";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Cost Explorer client implementing [`CostQueryClient`]
pub struct CostExplorerClient {
    http: reqwest::Client,
    signer: RequestSigner,
    endpoint: String,
}

impl CostExplorerClient {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AwsCostError::Config(format!("failed to build HTTP client: {e}")))?;

        let endpoint = config.endpoint_url();
        debug!("Cost Explorer endpoint: {}", endpoint);

        Ok(Self {
            http,
            signer: RequestSigner::new(config.credentials, config.region),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CostQueryClient for CostExplorerClient {
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> Result<GetCostAndUsageResponse> {
        let body = serde_json::to_vec(request)?;
        let base_headers = [("content-type", CONTENT_TYPE), ("x-amz-target", TARGET)];
        let signed = self
            .signer
            .sign("POST", &self.endpoint, &base_headers, &body)
            .await?;

        let mut builder = self.http.post(&self.endpoint);
        for (name, value) in base_headers {
            builder = builder.header(name, value);
        }
        for (name, value) in &signed {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| AwsCostError::fetch(OPERATION, e.to_string()))?;

        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AwsCostError::fetch(OPERATION, e.to_string()))?;

        if !status.is_success() {
            let message = describe_error(status.as_u16(), error_type.as_deref(), &bytes);
            warn!("{} returned {}: {}", OPERATION, status, message);
            return Err(AwsCostError::fetch(OPERATION, message));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            AwsCostError::fetch(OPERATION, format!("unreadable response body: {e}"))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Short error code from a `__type` like `com.amazonaws.ce#ThrottlingException`
fn error_code(raw: &str) -> &str {
    let code = raw.rsplit('#').next().unwrap_or(raw);
    code.split(':').next().unwrap_or(code)
}

/// Human-readable description of an AWS JSON error response
pub(crate) fn describe_error(status: u16, header_type: Option<&str>, body: &[u8]) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let code = parsed
        .kind
        .as_deref()
        .or(header_type)
        .map(error_code)
        .filter(|c| !c.is_empty());

    match (code, parsed.message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => format!("HTTP {status}: {message}"),
        (None, None) => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if text.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {text}")
            }
        }
    }
}
