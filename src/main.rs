use anyhow::Result;
use ci_release_build::App;
use ci_release_build::Config;
use ci_release_build::logging::setup_logging;
use ci_release_build::options::CiProvider;
use ci_release_build::options::ReleaseOptions;
use clap::Parser;

const USAGE: &str = "Trigger CI to build release builds of electron.
Usage: ci-release-build [--job=CI_JOB_NAME] [--ci=CircleCI|AppVeyor|Jenkins] [--ghRelease] [--automaticRelease] TARGET_BRANCH";

#[derive(Parser)]
#[command(name = "ci-release-build")]
#[command(about = "Trigger CI to build release builds of electron", long_about = None)]
pub struct Cli {
    /// Only run this CI job
    #[arg(long, value_name = "CI_JOB_NAME")]
    pub job: Option<String>,

    /// Only trigger this CI provider (all of them by default)
    #[arg(long, value_enum, ignore_case = true)]
    pub ci: Option<CiProvider>,

    /// Build a GitHub release instead of a plain release build
    #[arg(long = "ghRelease")]
    pub gh_release: bool,

    /// Publish the release automatically once the build succeeds
    #[arg(long = "automaticRelease")]
    pub automatic_release: bool,

    /// Branch to build
    pub target_branch: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.target_branch.is_some() {
        setup_logging()?;
    }
    run(cli, &mut std::io::stdout(), &mut std::io::stderr()).await
}

/// Print usage and succeed when no branch is given, otherwise trigger the builds
async fn run(
    cli: Cli,
    stdout: &mut impl std::io::Write,
    stderr: &mut impl std::io::Write,
) -> Result<()> {
    let Some(target_branch) = cli.target_branch else {
        writeln!(stdout, "{}", USAGE)?;
        return Ok(());
    };

    let options = ReleaseOptions {
        ci: cli.ci,
        job: cli.job,
        gh_release: cli.gh_release,
        automatic_release: cli.automatic_release,
    };
    let app = App::from_config(Config::from_env())?;
    app.cmd_release(&target_branch, &options, stdout, stderr).await
}
