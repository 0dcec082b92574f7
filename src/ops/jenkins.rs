#![allow(async_fn_in_trait)]

use anyhow::Context;
use anyhow::Result;
#[cfg(test)]
use mockall::automock;
use tracing::info;
use tracing::instrument;

use super::http::HttpClient;
use crate::config::Config;
use crate::config::required;
use crate::options::ReleaseOptions;

/// User the Jenkins API token belongs to
const JENKINS_USER: &str = "build";

/// XPath that makes the crumb issuer answer with `field:value`
const CRUMB_XPATH: &str = r#"concat(//crumbRequestField,":",//crumb)"#;

// -----------------------------------------------------------------------------
// JenkinsOps trait

/// Operations for triggering Jenkins builds
#[cfg_attr(test, automock)]
pub trait JenkinsOps {
    /// Fetch a CSRF crumb to send along with build requests
    async fn get_crumb(&self) -> Result<Crumb>;

    /// Queue `job` for `branch` and return the URL of its status page
    async fn trigger_job(
        &self,
        job: &str,
        crumb: &Crumb,
        branch: &str,
        options: &ReleaseOptions,
    ) -> Result<String>;
}

/// Jenkins CSRF protection header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub field: String,
    pub value: String,
}

impl Crumb {
    /// Parse the `field:value` answer of the crumb issuer
    pub fn parse(response: &str) -> Result<Self> {
        let (field, value) = response
            .trim()
            .split_once(':')
            .with_context(|| format!("Malformed Jenkins crumb: {}", response))?;
        anyhow::ensure!(!field.is_empty(), "Malformed Jenkins crumb: {}", response);
        Ok(Self {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Query parameters for `buildWithParameters`
fn build_parameters<'a>(
    build_token: &'a str,
    branch: &'a str,
    options: &ReleaseOptions,
) -> Vec<(&'static str, &'a str)> {
    let mut params = vec![("token", build_token), ("BRANCH", branch)];
    if !options.gh_release {
        params.push(("RUN_RELEASE_BUILD", "1"));
    }
    if options.automatic_release {
        params.push(("AUTO_RELEASE", "true"));
    }
    params
}

// -----------------------------------------------------------------------------
// RealJenkins

/// Real implementation that calls the Jenkins remote access API
pub struct RealJenkins {
    http: HttpClient,
    base_url: String,
    auth_token: Option<String>,
    build_token: Option<String>,
}

impl RealJenkins {
    pub fn new(http: HttpClient, config: &Config) -> Self {
        Self {
            http,
            base_url: config.endpoints.jenkins_url.clone(),
            auth_token: config.credentials.jenkins_auth_token.clone(),
            build_token: config.credentials.jenkins_build_token.clone(),
        }
    }

    /// Status page of the most recent build of `job`
    pub fn last_build_url(&self, job: &str) -> String {
        format!("{}/job/{}/lastBuild/", self.base_url, job)
    }
}

impl JenkinsOps for RealJenkins {
    #[instrument(skip_all)]
    async fn get_crumb(&self) -> Result<Crumb> {
        let auth_token = required(&self.auth_token, "JENKINS_AUTH_TOKEN")?;
        let request = self
            .http
            .client()
            .get(format!("{}/crumbIssuer/api/xml", self.base_url))
            .basic_auth(JENKINS_USER, Some(auth_token))
            .query(&[("xpath", CRUMB_XPATH)]);

        let response = self.http.send(request).await?;
        Crumb::parse(&response)
    }

    #[instrument(skip_all, fields(job = %job))]
    async fn trigger_job(
        &self,
        job: &str,
        crumb: &Crumb,
        branch: &str,
        options: &ReleaseOptions,
    ) -> Result<String> {
        let auth_token = required(&self.auth_token, "JENKINS_AUTH_TOKEN")?;
        let build_token = required(&self.build_token, "JENKINS_BUILD_TOKEN")?;
        info!("Triggering Jenkins to run build job: {job} on branch: {branch} with release flag.");

        let request = self
            .http
            .client()
            .get(format!("{}/job/{}/buildWithParameters", self.base_url, job))
            .basic_auth(JENKINS_USER, Some(auth_token))
            .header(crumb.field.as_str(), crumb.value.as_str())
            .query(&build_parameters(build_token, branch, options));

        self.http.send(request).await?;
        Ok(self.last_build_url(job))
    }
}
