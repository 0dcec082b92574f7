use ci_release_build::App;
use ci_release_build::Config;
use ci_release_build::ops::appveyor::RealAppVeyor;
use ci_release_build::ops::circleci::RealCircleCi;
use ci_release_build::ops::jenkins::RealJenkins;
use serde_json::Value;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockBuilder;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::basic_auth;
use wiremock::matchers::bearer_token;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

pub const BRANCH: &str = "7-0-x";

pub type RealApp = App<RealCircleCi, RealAppVeyor, RealJenkins>;

/// App whose providers all point at `server`, with every token set.
pub fn app_for(server: &MockServer) -> anyhow::Result<RealApp> {
    App::from_config(Config::default_for_tests(&server.uri()))
}

/// Expect one CircleCI build request for `job` carrying `flags`.
pub async fn mock_circleci_job(server: &MockServer, job: &str, flags: Value) {
    let mut build_parameters = flags;
    build_parameters["CIRCLE_JOB"] = json!(job);

    Mock::given(method("POST"))
        .and(path(format!(
            "/api/v1.1/project/github/electron/electron/tree/{}",
            BRANCH
        )))
        .and(query_param("circle-token", "circle-token"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({ "build_parameters": build_parameters })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "build_url": format!("https://circleci.com/gh/electron/electron/{}", job),
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Expect one AppVeyor build request carrying `flags` as environment variables.
pub async fn mock_appveyor(server: &MockServer, flags: Value) {
    Mock::given(method("POST"))
        .and(path("/api/builds"))
        .and(bearer_token("appveyor-token"))
        .and(body_json(json!({
            "accountName": "AppVeyor",
            "projectSlug": "electron",
            "branch": BRANCH,
            "environmentVariables": flags,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "1.0.42" })))
        .expect(1)
        .mount(server)
        .await;
}

/// Expect one crumb request, answered with `Jenkins-Crumb:abc123`.
pub async fn mock_jenkins_crumb(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/xml"))
        .and(basic_auth("build", "jenkins-auth"))
        .and(query_param(
            "xpath",
            r#"concat(//crumbRequestField,":",//crumb)"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("Jenkins-Crumb:abc123"))
        .expect(1)
        .mount(server)
        .await;
}

/// Matchers shared by every `buildWithParameters` request for `job`.
/// Callers add the flag parameters they expect.
pub fn jenkins_job_request(job: &str) -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(format!("/job/{}/buildWithParameters", job)))
        .and(basic_auth("build", "jenkins-auth"))
        .and(header("Jenkins-Crumb", "abc123"))
        .and(query_param("token", "jenkins-build"))
        .and(query_param("BRANCH", BRANCH))
}
