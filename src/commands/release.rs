use anyhow::Result;
use anyhow::ensure;
use colored::Colorize;
use futures_util::future::join_all;
use tracing::debug;
use tracing::instrument;

use crate::App;
use crate::ops::appveyor::AppVeyorOps;
use crate::ops::circleci::CircleCiOps;
use crate::ops::jenkins::JenkinsOps;
use crate::options::CiProvider;
use crate::options::ReleaseOptions;

/// Result of one build request
struct Outcome {
    provider: CiProvider,
    job: Option<&'static str>,
    result: Result<String>,
}

impl Outcome {
    fn report(
        &self,
        stdout: &mut impl std::io::Write,
        stderr: &mut impl std::io::Write,
    ) -> Result<()> {
        let url = match &self.result {
            Ok(url) => url,
            Err(err) => {
                let target = match self.job {
                    Some(job) => format!("{} ({})", self.provider, job),
                    None => self.provider.to_string(),
                };
                writeln!(stderr, "{} {}: {:#}", "Error calling".red(), target, err)?;
                return Ok(());
            }
        };

        match (self.provider, self.job) {
            (CiProvider::CircleCi, Some(job)) => {
                writeln!(stdout, "Check {} for status. ({})", url.cyan(), job)?
            }
            (CiProvider::AppVeyor, _) => writeln!(
                stdout,
                "AppVeyor release build request successful. Check build status at {}",
                url.cyan()
            )?,
            _ => writeln!(
                stdout,
                "{} build request successful. Check build status at {}.",
                self.provider,
                url.cyan()
            )?,
        }
        Ok(())
    }
}

impl<C: CircleCiOps, A: AppVeyorOps, J: JenkinsOps> App<C, A, J> {
    /// Trigger release builds of `branch` on the providers selected by `options`.
    ///
    /// Bad options and missing tokens fail before any request is sent. Failed
    /// requests are reported on `stderr` and do not fail the command.
    #[instrument(skip_all, fields(branch = %branch))]
    pub async fn cmd_release(
        &self,
        branch: &str,
        options: &ReleaseOptions,
        stdout: &mut impl std::io::Write,
        stderr: &mut impl std::io::Write,
    ) -> Result<()> {
        ensure!(!branch.trim().is_empty(), "Target branch must not be empty");
        let plan = self.prepare(options)?;

        let (circleci, appveyor, jenkins) = tokio::join!(
            self.release_circleci(branch, &plan.circleci_jobs, options),
            self.release_appveyor(branch, plan.appveyor, options),
            self.release_jenkins(branch, &plan.jenkins_jobs, options),
        );

        for outcome in circleci.iter().chain(&appveyor).chain(&jenkins) {
            outcome.report(stdout, stderr)?;
        }
        Ok(())
    }

    async fn release_circleci(
        &self,
        branch: &str,
        jobs: &[&'static str],
        options: &ReleaseOptions,
    ) -> Vec<Outcome> {
        let futures = jobs.iter().map(|&job| async move {
            let result = self.circleci.trigger_job(branch, job, options).await;
            settled(CiProvider::CircleCi, Some(job), result)
        });
        join_all(futures).await
    }

    async fn release_appveyor(
        &self,
        branch: &str,
        enabled: bool,
        options: &ReleaseOptions,
    ) -> Vec<Outcome> {
        if !enabled {
            return vec![];
        }
        let result = self.appveyor.trigger_build(branch, options).await;
        vec![settled(CiProvider::AppVeyor, None, result)]
    }

    async fn release_jenkins(
        &self,
        branch: &str,
        jobs: &[&'static str],
        options: &ReleaseOptions,
    ) -> Vec<Outcome> {
        if jobs.is_empty() {
            return vec![];
        }

        let crumb = match self.jenkins.get_crumb().await {
            Ok(crumb) => crumb,
            Err(err) => {
                let err = err.context("Failed to get Jenkins crumb");
                return vec![settled(CiProvider::Jenkins, None, Err(err))];
            }
        };

        let crumb = &crumb;
        let futures = jobs.iter().map(|&job| async move {
            let result = self.jenkins.trigger_job(job, crumb, branch, options).await;
            settled(CiProvider::Jenkins, Some(job), result)
        });
        join_all(futures).await
    }
}

/// Trace a failed request as soon as it settles; `Outcome::report` tells the user
fn settled(provider: CiProvider, job: Option<&'static str>, result: Result<String>) -> Outcome {
    if let Err(err) = &result {
        debug!(%provider, job = job.unwrap_or_default(), "Build request failed: {:#}", err);
    }
    Outcome {
        provider,
        job,
        result,
    }
}
