//! Credential loading and SigV4 request signing

use crate::config::AwsCredentials;
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use aws_sigv4::{
    http_request::{SignableBody, SignableRequest, SigningSettings},
    sign::v4::SigningParams,
};
use awscost_core::error::{AwsCostError, Result};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::debug;

/// Signing name of the Cost Explorer service
pub const SERVICE_NAME: &str = "ce";

/// Refresh expiring credentials this long before they lapse
const CREDENTIAL_REFRESH_BUFFER: Duration = Duration::from_secs(300);

const OPERATION: &str = "Credentials";

/// Signs requests for one region, caching credentials between pages
pub struct RequestSigner {
    source: AwsCredentials,
    region: String,
    cached: Mutex<Option<Credentials>>,
}

impl RequestSigner {
    pub fn new(source: AwsCredentials, region: impl Into<String>) -> Self {
        Self {
            source,
            region: region.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Current credentials, loading them on first use or near expiry
    pub async fn credentials(&self) -> Result<Credentials> {
        let mut cached = self.cached.lock().await;
        if let Some(creds) = cached.as_ref()
            && credentials_valid(creds)
        {
            return Ok(creds.clone());
        }

        let fresh = self.load_credentials().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Headers to add to the request so it carries a valid signature
    pub async fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>> {
        let credentials = self.credentials().await?;
        sign_request(
            &credentials,
            &self.region,
            SERVICE_NAME,
            method,
            url,
            headers,
            body,
        )
    }

    async fn load_credentials(&self) -> Result<Credentials> {
        let config = match &self.source {
            AwsCredentials::Static {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                return Ok(Credentials::new(
                    access_key_id.clone(),
                    secret_access_key.clone(),
                    session_token.clone(),
                    None,
                    "static",
                ));
            }
            AwsCredentials::Profile { name } => {
                debug!("Loading credentials for profile {}", name);
                aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .profile_name(name)
                    .load()
                    .await
            }
            AwsCredentials::Default => {
                debug!("Loading credentials from the default chain");
                aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
            }
        };

        let provider = config
            .credentials_provider()
            .ok_or_else(|| AwsCostError::fetch(OPERATION, "no credentials provider available"))?;

        provider
            .provide_credentials()
            .await
            .map_err(|e| AwsCostError::fetch(OPERATION, e.to_string()))
    }
}

fn credentials_valid(creds: &Credentials) -> bool {
    match creds.expiry() {
        Some(expiry) => expiry > SystemTime::now() + CREDENTIAL_REFRESH_BUFFER,
        // Static credentials never expire
        None => true,
    }
}

/// Sign a request with SigV4 and return the headers to add
pub fn sign_request(
    credentials: &Credentials,
    region: &str,
    service: &str,
    method: &str,
    url: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> Result<Vec<(String, String)>> {
    let signing_error = |e: String| AwsCostError::fetch("SigV4 signing", e);

    let identity = credentials.clone().into();
    let signing_params = SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(service)
        .time(SystemTime::now())
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| signing_error(e.to_string()))?;

    let signable_request = SignableRequest::new(
        method,
        url,
        headers.iter().copied(),
        SignableBody::Bytes(body),
    )
    .map_err(|e| signing_error(e.to_string()))?;

    let (instructions, _signature) =
        aws_sigv4::http_request::sign(signable_request, &signing_params.into())
            .map_err(|e| signing_error(e.to_string()))?
            .into_parts();

    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY};

    fn static_source() -> AwsCredentials {
        AwsCredentials::Static {
            access_key_id: TEST_ACCESS_KEY_ID.to_string(),
            secret_access_key: TEST_SECRET_ACCESS_KEY.to_string(),
            session_token: None,
        }
    }

    #[tokio::test]
    async fn test_static_credentials_are_cached() {
        let signer = RequestSigner::new(static_source(), "us-east-1");

        let first = signer.credentials().await.unwrap();
        let second = signer.credentials().await.unwrap();
        assert_eq!(first.access_key_id(), TEST_ACCESS_KEY_ID);
        assert_eq!(first.access_key_id(), second.access_key_id());
        assert_eq!(signer.region(), "us-east-1");
    }

    #[test]
    fn test_sign_request_adds_auth_headers() {
        let credentials = Credentials::new(
            TEST_ACCESS_KEY_ID,
            TEST_SECRET_ACCESS_KEY,
            None,
            None,
            "test",
        );

        let headers = sign_request(
            &credentials,
            "us-east-1",
            SERVICE_NAME,
            "POST",
            "https://ce.us-east-1.amazonaws.com/",
            &[
                ("content-type", "application/x-amz-json-1.1"),
                ("x-amz-target", "AWSInsightsIndexService.GetCostAndUsage"),
            ],
            b"{}",
        )
        .unwrap();

        let authorization = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.clone())
            .unwrap();
        assert!(authorization.starts_with("AWS4-HMAC-SHA256"));
        assert!(authorization.contains("/us-east-1/ce/aws4_request"));
        assert!(
            headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("x-amz-date"))
        );
    }
}
