use std::fmt::Display;

use clap::ValueEnum;

/// CI providers that can run a release build
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CiProvider {
    #[value(name = "CircleCI")]
    CircleCi,
    #[value(name = "AppVeyor")]
    AppVeyor,
    #[value(name = "Jenkins")]
    Jenkins,
}

impl CiProvider {
    pub const ALL: [CiProvider; 3] = [
        CiProvider::CircleCi,
        CiProvider::AppVeyor,
        CiProvider::Jenkins,
    ];

    /// Jobs known to the provider, or `None` if it has no job selection
    pub fn jobs(self) -> Option<&'static [&'static str]> {
        match self {
            CiProvider::CircleCi => Some(CIRCLECI_JOBS),
            CiProvider::AppVeyor => None,
            CiProvider::Jenkins => Some(JENKINS_JOBS),
        }
    }
}

impl Display for CiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CiProvider::CircleCi => "CircleCI",
            CiProvider::AppVeyor => "AppVeyor",
            CiProvider::Jenkins => "Jenkins",
        })
    }
}

pub const CIRCLECI_JOBS: &[&str] = &[
    "electron-linux-arm",
    "electron-linux-arm64",
    "electron-linux-ia32",
    "electron-linux-mips64el",
    "electron-linux-x64",
];

pub const JENKINS_JOBS: &[&str] = &["electron-release"];

/// Options controlling which builds are triggered and how
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Only trigger this provider; all of them when `None`
    pub ci: Option<CiProvider>,
    /// Only trigger this job on providers that support job selection
    pub job: Option<String>,
    pub gh_release: bool,
    pub automatic_release: bool,
}
