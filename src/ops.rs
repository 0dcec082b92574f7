//! Integration layers for the CI providers that run release builds.
//!
//! - [`circleci`]: one build per CircleCI job, through the v1.1 project API
//! - [`appveyor`]: a single AppVeyor build of the project
//! - [`jenkins`]: crumb-protected `buildWithParameters` calls
//! - [`http`]: shared reqwest client turning non-2xx responses into errors
//!
//! Each provider has a trait with a real implementation and, under test, a
//! mockall mock.

pub mod appveyor;
pub mod circleci;
pub mod http;
pub mod jenkins;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::options::ReleaseOptions;

/// Release flags as the build environment variables CircleCI and AppVeyor expect
pub(crate) fn release_variables(options: &ReleaseOptions) -> Map<String, Value> {
    let mut variables = Map::new();
    if options.gh_release {
        variables.insert("ELECTRON_RELEASE".to_string(), json!(1));
    } else {
        variables.insert("RUN_RELEASE_BUILD".to_string(), json!("true"));
    }
    if options.automatic_release {
        variables.insert("AUTO_RELEASE".to_string(), json!("true"));
    }
    variables
}
