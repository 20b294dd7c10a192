//! License and version resolution API client

use crate::error::{Error, Result};
use serde::Deserialize;
use url::Url;

/// Base URL of the license/version API.
pub const API_BASE: &str = "https://api.mobiscroll.com/api";

/// Entitlement data for a registry user. Fetched once per run, after
/// login; drives the trial/licensed decision.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteLicenseInfo {
    #[serde(rename = "HasAccess")]
    pub has_access: bool,

    /// License tier name, when the account ever held one
    #[serde(rename = "License")]
    pub license: Option<String>,

    #[serde(rename = "LatestVersion")]
    pub latest_version: Option<String>,

    /// Trial access token, present for trial accounts
    #[serde(rename = "TrialCode")]
    pub trial_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(rename = "Version")]
    version: String,
}

/// Seam over the remote API so the workflow is testable without a network.
pub trait LicenseApi {
    fn license_info(
        &self,
        user: &str,
    ) -> impl std::future::Future<Output = Result<RemoteLicenseInfo>> + Send;

    /// Resolve a (possibly partial) version pin for a package line into a
    /// concrete version.
    fn resolve_version(
        &self,
        base_package: &str,
        pin: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// HTTP client for the Mobiscroll API. Failures are fatal for the run.
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(format!("mobiscroll-cli/{}", crate::CLI_VERSION));
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
            base: Url::parse(API_BASE).expect("static URL"),
        })
    }

    /// Append path segments, preserving the base path.
    fn build_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        {
            let mut parts = url.path_segments_mut().expect("API base is not opaque");
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        url
    }
}

impl LicenseApi for ApiClient {
    async fn license_info(&self, user: &str) -> Result<RemoteLicenseInfo> {
        let url = self.build_url(&["userdata", user]);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::AuthFailed(format!(
                "license lookup failed with HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    async fn resolve_version(&self, base_package: &str, pin: Option<&str>) -> Result<String> {
        let mut url = self.build_url(&["version", base_package]);
        if let Some(pin) = pin {
            url.query_pairs_mut().append_pair("pin", pin);
        }
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::UnsupportedProject(format!(
                "could not resolve a Mobiscroll version for {} (HTTP {})",
                base_package,
                response.status()
            )));
        }
        let body: VersionResponse = response.json().await?;
        Ok(body.version)
    }
}
