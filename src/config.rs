use anyhow::Result;
use anyhow::anyhow;

use crate::options::CiProvider;

pub const DEFAULT_CIRCLECI_URL: &str = "https://circleci.com";
pub const DEFAULT_APPVEYOR_URL: &str = "https://windows-ci.electronjs.org";
pub const DEFAULT_JENKINS_URL: &str = "https://mac-ci.electronjs.org";

/// Where the release builds are triggered
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub circleci_url: String,
    pub circleci_org: String,
    pub circleci_repo: String,
    pub appveyor_url: String,
    pub appveyor_account: String,
    pub appveyor_project: String,
    pub jenkins_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            circleci_url: DEFAULT_CIRCLECI_URL.to_string(),
            circleci_org: "electron".to_string(),
            circleci_repo: "electron".to_string(),
            appveyor_url: DEFAULT_APPVEYOR_URL.to_string(),
            appveyor_account: "AppVeyor".to_string(),
            appveyor_project: "electron".to_string(),
            jenkins_url: DEFAULT_JENKINS_URL.to_string(),
        }
    }
}

/// Provider tokens. Never persisted; only checked for presence.
#[derive(Clone, Default)]
pub struct Credentials {
    pub circle_token: Option<String>,
    pub appveyor_token: Option<String>,
    pub jenkins_auth_token: Option<String>,
    pub jenkins_build_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |token: &Option<String>| token.as_ref().map(|_| "***");
        f.debug_struct("Credentials")
            .field("circle_token", &mask(&self.circle_token))
            .field("appveyor_token", &mask(&self.appveyor_token))
            .field("jenkins_auth_token", &mask(&self.jenkins_auth_token))
            .field("jenkins_build_token", &mask(&self.jenkins_build_token))
            .finish()
    }
}

impl Credentials {
    /// Read tokens with `lookup`, treating empty values as missing
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            circle_token: read("CIRCLE_TOKEN"),
            appveyor_token: read("APPVEYOR_TOKEN"),
            jenkins_auth_token: read("JENKINS_AUTH_TOKEN"),
            jenkins_build_token: read("JENKINS_BUILD_TOKEN"),
        }
    }

    /// Fail unless every token `provider` needs is present
    pub fn require(&self, provider: CiProvider) -> Result<()> {
        match provider {
            CiProvider::CircleCi => {
                required(&self.circle_token, "CIRCLE_TOKEN")?;
            }
            CiProvider::AppVeyor => {
                required(&self.appveyor_token, "APPVEYOR_TOKEN")?;
            }
            CiProvider::Jenkins => {
                required(&self.jenkins_auth_token, "JENKINS_AUTH_TOKEN")?;
                required(&self.jenkins_build_token, "JENKINS_BUILD_TOKEN")?;
            }
        }
        Ok(())
    }
}

/// Return the token or the error reported for a missing environment variable
pub(crate) fn required<'a>(token: &'a Option<String>, name: &str) -> Result<&'a str> {
    token
        .as_deref()
        .ok_or_else(|| anyhow!("{} not found in environment", name))
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub endpoints: Endpoints,
    pub credentials: Credentials,
}

impl Config {
    /// Load tokens and endpoint overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut endpoints = Endpoints::default();
        let overrides = [
            ("CIRCLECI_URL", &mut endpoints.circleci_url),
            ("APPVEYOR_URL", &mut endpoints.appveyor_url),
            ("JENKINS_URL", &mut endpoints.jenkins_url),
        ];
        for (name, field) in overrides {
            if let Some(url) = lookup(name).filter(|url| !url.is_empty()) {
                *field = url.trim_end_matches('/').to_string();
            }
        }

        Self {
            endpoints,
            credentials: Credentials::from_lookup(&lookup),
        }
    }

    /// Create a new config with explicit values (useful for tests)
    pub fn new(endpoints: Endpoints, credentials: Credentials) -> Self {
        Self {
            endpoints,
            credentials,
        }
    }

    /// Config with every token set and all providers on `base_url`
    pub fn default_for_tests(base_url: &str) -> Self {
        let token = |value: &str| Some(value.to_string());
        Self {
            endpoints: Endpoints {
                circleci_url: base_url.to_string(),
                appveyor_url: base_url.to_string(),
                jenkins_url: base_url.to_string(),
                ..Endpoints::default()
            },
            credentials: Credentials {
                circle_token: token("circle-token"),
                appveyor_token: token("appveyor-token"),
                jenkins_auth_token: token("jenkins-auth"),
                jenkins_build_token: token("jenkins-build"),
            },
        }
    }
}
