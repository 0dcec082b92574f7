#![allow(async_fn_in_trait)]

use anyhow::Result;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::instrument;

use super::http::HttpClient;
use super::release_variables;
use crate::config::Config;
use crate::config::required;
use crate::options::ReleaseOptions;

// -----------------------------------------------------------------------------
// AppVeyorOps trait

/// Operations for triggering AppVeyor builds
#[cfg_attr(test, automock)]
pub trait AppVeyorOps {
    /// Start a build of `branch` and return the URL of its status page
    async fn trigger_build(&self, branch: &str, options: &ReleaseOptions) -> Result<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBuild<'a> {
    account_name: &'a str,
    project_slug: &'a str,
    branch: &'a str,
    environment_variables: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Build {
    version: String,
}

// -----------------------------------------------------------------------------
// RealAppVeyor

/// Real implementation that calls the AppVeyor builds API
pub struct RealAppVeyor {
    http: HttpClient,
    base_url: String,
    account: String,
    project: String,
    token: Option<String>,
}

impl RealAppVeyor {
    pub fn new(http: HttpClient, config: &Config) -> Self {
        Self {
            http,
            base_url: config.endpoints.appveyor_url.clone(),
            account: config.endpoints.appveyor_account.clone(),
            project: config.endpoints.appveyor_project.clone(),
            token: config.credentials.appveyor_token.clone(),
        }
    }
}

impl AppVeyorOps for RealAppVeyor {
    #[instrument(skip_all)]
    async fn trigger_build(&self, branch: &str, options: &ReleaseOptions) -> Result<String> {
        let token = required(&self.token, "APPVEYOR_TOKEN")?;
        info!("Triggering AppVeyor to run build on branch: {branch} with release flag.");

        let body = StartBuild {
            account_name: &self.account,
            project_slug: &self.project,
            branch,
            environment_variables: release_variables(options),
        };
        let request = self
            .http
            .client()
            .post(format!("{}/api/builds", self.base_url))
            .bearer_auth(token)
            .json(&body);

        let build: Build = self.http.send_json(request).await?;
        Ok(format!(
            "{}/project/{}/{}/build/{}",
            self.base_url, self.account, self.project, build.version
        ))
    }
}
