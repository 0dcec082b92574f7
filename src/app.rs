use anyhow::Result;
use anyhow::ensure;
use tracing::info;
use tracing::warn;

use crate::config::Config;
use crate::ops::appveyor::AppVeyorOps;
use crate::ops::appveyor::RealAppVeyor;
use crate::ops::circleci::CircleCiOps;
use crate::ops::circleci::RealCircleCi;
use crate::ops::http::HttpClient;
use crate::ops::jenkins::JenkinsOps;
use crate::ops::jenkins::RealJenkins;
use crate::options::CIRCLECI_JOBS;
use crate::options::CiProvider;
use crate::options::JENKINS_JOBS;
use crate::options::ReleaseOptions;

pub struct App<C: CircleCiOps, A: AppVeyorOps, J: JenkinsOps> {
    pub config: Config,
    pub circleci: C,
    pub appveyor: A,
    pub jenkins: J,
}

impl<C: CircleCiOps, A: AppVeyorOps, J: JenkinsOps> App<C, A, J> {
    pub fn new(config: Config, circleci: C, appveyor: A, jenkins: J) -> Self {
        Self {
            config,
            circleci,
            appveyor,
            jenkins,
        }
    }

    /// Work out which builds to trigger and check that their tokens are set.
    /// Runs before any request is sent.
    pub(crate) fn prepare(&self, options: &ReleaseOptions) -> Result<DispatchPlan> {
        let plan = DispatchPlan::new(options)?;
        for provider in plan.providers() {
            self.config.credentials.require(provider)?;
        }
        Ok(plan)
    }
}

impl App<RealCircleCi, RealAppVeyor, RealJenkins> {
    /// App talking to the real providers, sharing one HTTP client
    pub fn from_config(config: Config) -> Result<Self> {
        let http = HttpClient::new()?;
        let circleci = RealCircleCi::new(http.clone(), &config);
        let appveyor = RealAppVeyor::new(http.clone(), &config);
        let jenkins = RealJenkins::new(http, &config);
        Ok(Self::new(config, circleci, appveyor, jenkins))
    }
}

// -----------------------------------------------------------------------------
// DispatchPlan

/// The builds a release run triggers
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchPlan {
    pub circleci_jobs: Vec<&'static str>,
    pub appveyor: bool,
    pub jenkins_jobs: Vec<&'static str>,
}

impl DispatchPlan {
    pub fn new(options: &ReleaseOptions) -> Result<Self> {
        let selected = match options.ci {
            Some(provider) => vec![provider],
            None => CiProvider::ALL.to_vec(),
        };
        let job = options.job.as_deref();

        if let Some(job) = job {
            let selects_jobs = selected.iter().any(|provider| provider.jobs().is_some());
            let known = selected
                .iter()
                .filter_map(|provider| provider.jobs())
                .any(|jobs| jobs.iter().any(|known| *known == job));
            ensure!(known || !selects_jobs, "Unknown CI job name: {}.", job);
        }

        let mut plan = Self::default();
        for provider in selected {
            match provider {
                CiProvider::CircleCi => plan.circleci_jobs = select_jobs(provider, CIRCLECI_JOBS, job),
                CiProvider::AppVeyor => {
                    if let Some(job) = job {
                        warn!("AppVeyor has no job selection, ignoring job {}", job);
                    }
                    plan.appveyor = true;
                }
                CiProvider::Jenkins => plan.jenkins_jobs = select_jobs(provider, JENKINS_JOBS, job),
            }
        }
        Ok(plan)
    }

    /// Providers that receive at least one request
    pub fn providers(&self) -> Vec<CiProvider> {
        let mut providers = vec![];
        if !self.circleci_jobs.is_empty() {
            providers.push(CiProvider::CircleCi);
        }
        if self.appveyor {
            providers.push(CiProvider::AppVeyor);
        }
        if !self.jenkins_jobs.is_empty() {
            providers.push(CiProvider::Jenkins);
        }
        providers
    }

    /// Number of build requests the plan sends (crumb requests excluded)
    pub fn build_count(&self) -> usize {
        self.circleci_jobs.len() + usize::from(self.appveyor) + self.jenkins_jobs.len()
    }
}

fn select_jobs(
    provider: CiProvider,
    known: &'static [&'static str],
    job: Option<&str>,
) -> Vec<&'static str> {
    let Some(job) = job else {
        return known.to_vec();
    };
    let jobs: Vec<_> = known.iter().copied().filter(|known| *known == job).collect();
    if jobs.is_empty() {
        info!("Skipping {}: no job named {}", provider, job);
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(ci: Option<CiProvider>, job: Option<&str>) -> ReleaseOptions {
        ReleaseOptions {
            ci,
            job: job.map(str::to_string),
            ..ReleaseOptions::default()
        }
    }

    #[test]
    fn test_plan_all_providers() {
        let plan = DispatchPlan::new(&options(None, None)).unwrap();
        assert_eq!(plan.circleci_jobs, CIRCLECI_JOBS);
        assert!(plan.appveyor);
        assert_eq!(plan.jenkins_jobs, JENKINS_JOBS);
        assert_eq!(plan.build_count(), 7);
        assert_eq!(plan.providers(), CiProvider::ALL);
    }

    #[test]
    fn test_plan_single_provider() {
        let plan = DispatchPlan::new(&options(Some(CiProvider::Jenkins), None)).unwrap();
        assert_eq!(
            plan,
            DispatchPlan {
                jenkins_jobs: vec!["electron-release"],
                ..DispatchPlan::default()
            }
        );
    }

    #[test]
    fn test_plan_selected_job() {
        let plan = DispatchPlan::new(&options(
            Some(CiProvider::CircleCi),
            Some("electron-linux-arm64"),
        ))
        .unwrap();
        assert_eq!(plan.circleci_jobs, vec!["electron-linux-arm64"]);
        assert_eq!(plan.build_count(), 1);
    }

    #[test]
    fn test_plan_unknown_job_for_provider() {
        let err = DispatchPlan::new(&options(Some(CiProvider::Jenkins), Some("electron-linux-x64")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown CI job name: electron-linux-x64.");
    }

    #[test]
    fn test_plan_appveyor_ignores_job() {
        let plan = DispatchPlan::new(&options(Some(CiProvider::AppVeyor), Some("anything"))).unwrap();
        assert_eq!(plan.providers(), vec![CiProvider::AppVeyor]);
    }

    #[test]
    fn test_plan_job_across_all_providers() {
        let plan = DispatchPlan::new(&options(None, Some("electron-release"))).unwrap();
        assert!(plan.circleci_jobs.is_empty());
        assert!(plan.appveyor);
        assert_eq!(plan.jenkins_jobs, vec!["electron-release"]);

        let err = DispatchPlan::new(&options(None, Some("nope"))).unwrap_err();
        assert_eq!(err.to_string(), "Unknown CI job name: nope.");
    }
}
