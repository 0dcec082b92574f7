#![allow(async_fn_in_trait)]

use anyhow::Result;
use anyhow::anyhow;
#[cfg(test)]
use mockall::automock;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use tracing::instrument;

use super::http::HttpClient;
use super::release_variables;
use crate::config::Config;
use crate::config::required;
use crate::options::ReleaseOptions;

// -----------------------------------------------------------------------------
// CircleCiOps trait

/// Operations for triggering CircleCI builds
#[cfg_attr(test, automock)]
pub trait CircleCiOps {
    /// Trigger `job` on `branch` and return the build URL
    async fn trigger_job(
        &self,
        branch: &str,
        job: &str,
        options: &ReleaseOptions,
    ) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct Build {
    build_url: String,
}

// -----------------------------------------------------------------------------
// RealCircleCi

/// Real implementation that calls the CircleCI v1.1 API
pub struct RealCircleCi {
    http: HttpClient,
    base_url: String,
    org: String,
    repo: String,
    token: Option<String>,
}

impl RealCircleCi {
    pub fn new(http: HttpClient, config: &Config) -> Self {
        Self {
            http,
            base_url: config.endpoints.circleci_url.clone(),
            org: config.endpoints.circleci_org.clone(),
            repo: config.endpoints.circleci_repo.clone(),
            token: config.credentials.circle_token.clone(),
        }
    }

    /// Project build endpoint for `branch`. Each `/`-separated part of the
    /// branch is its own path segment, so `/` stays a separator while `#`,
    /// `?` and `%` are percent-encoded.
    pub fn tree_url(&self, branch: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("CircleCI URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(["api", "v1.1", "project", "github"])
            .extend([self.org.as_str(), self.repo.as_str(), "tree"])
            .extend(branch.split('/'));
        Ok(url)
    }
}

impl CircleCiOps for RealCircleCi {
    #[instrument(skip_all, fields(job = %job))]
    async fn trigger_job(
        &self,
        branch: &str,
        job: &str,
        options: &ReleaseOptions,
    ) -> Result<String> {
        let token = required(&self.token, "CIRCLE_TOKEN")?;
        info!("Triggering CircleCI to run build job: {job} on branch: {branch} with release flag.");

        let mut build_parameters = release_variables(options);
        build_parameters.insert("CIRCLE_JOB".to_string(), json!(job));

        let request = self
            .http
            .client()
            .post(self.tree_url(branch)?)
            .query(&[("circle-token", token)])
            .header("Accept", "application/json")
            .json(&json!({ "build_parameters": build_parameters }));

        let build: Build = self.http.send_json(request).await?;
        Ok(build.build_url)
    }
}
