use std::collections::HashMap;

use ci_server::CiServer;
use errors::JenkinsRequestError;
use jenkins_response::*;
use network::{get_basic_credentials, get_json, post};
use reqwest::header::{Authorization, Headers};
use reqwest::Url;

const JOB_LIST_TREE: &'static str = "jobs[name,url,color,fullName]";
const COMPUTER_TREE: &'static str =
    "computer[displayName,executors[number,currentExecutable[number,url,fullDisplayName]]]";

/// Thin client over the Jenkins JSON API. One synchronous attempt per
/// call; failures are reported to the caller, never retried.
pub struct JenkinsClient {
    username: String,
    token: String,
    base_url: String,
}

impl JenkinsClient {
    pub fn new(username: &str, token: &str, base_url: &str) -> JenkinsClient {
        JenkinsClient {
            username: username.to_string(),
            token: token.to_string(),
            base_url: base_url.trim_right_matches('/').to_string(),
        }
    }

    fn auth_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.set(Authorization(get_basic_credentials(
            self.username.as_str(),
            Some(self.token.clone()),
        )));
        headers
    }
}

impl CiServer for JenkinsClient {
    fn build_job(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<(), JenkinsRequestError> {
        let url_string = build_job_url(&self.base_url, name, params)?;
        post(&url_string, self.auth_headers())
    }

    fn cancel_queue_item(&self, id: u64) -> Result<(), JenkinsRequestError> {
        let url_string = format!("{base}/queue/cancelItem?id={id}", base = self.base_url, id = id);
        post(&url_string, self.auth_headers())
    }

    fn get_jobs(&self) -> Result<Vec<JobSummary>, JenkinsRequestError> {
        let url_string = format!(
            "{base}/api/json?tree={tree}",
            base = self.base_url,
            tree = JOB_LIST_TREE
        );
        let response: JobListResponse = get_json(&url_string, self.auth_headers())?;
        Ok(response.jobs)
    }

    fn get_job_info(&self, name: &str) -> Result<JobDetail, JenkinsRequestError> {
        let url_string = format!("{base}/job/{job}/api/json", base = self.base_url, job = name);
        get_json(&url_string, self.auth_headers())
    }

    fn get_running_builds(&self) -> Result<Vec<RunningBuild>, JenkinsRequestError> {
        let url_string = format!(
            "{base}/computer/api/json?tree={tree}",
            base = self.base_url,
            tree = COMPUTER_TREE
        );
        let response: ComputerResponse = get_json(&url_string, self.auth_headers())?;
        Ok(flatten_running_builds(response))
    }

    fn get_queue_info(&self) -> Result<Vec<QueueItem>, JenkinsRequestError> {
        let url_string = format!("{base}/queue/api/json", base = self.base_url);
        let response: QueueResponse = get_json(&url_string, self.auth_headers())?;
        Ok(response.items)
    }

    fn stop_build(&self, name: &str, number: u32) -> Result<(), JenkinsRequestError> {
        let url_string = format!(
            "{base}/job/{job}/{number}/stop",
            base = self.base_url,
            job = name,
            number = number
        );
        post(&url_string, self.auth_headers())
    }
}

/// `job/<name>/build` for a parameterless trigger, or
/// `buildWithParameters` with the params as query pairs otherwise.
fn build_job_url(
    base_url: &str,
    name: &str,
    params: &HashMap<String, String>,
) -> Result<String, JenkinsRequestError> {
    if params.is_empty() {
        return Ok(format!("{base}/job/{job}/build", base = base_url, job = name));
    }

    let url_string = format!(
        "{base}/job/{job}/buildWithParameters",
        base = base_url,
        job = name
    );
    let mut url = Url::parse(&url_string).map_err(|_| JenkinsRequestError::InvalidUrl {
        url: url_string.clone(),
    })?;
    url.query_pairs_mut().extend_pairs(params.iter());
    Ok(url.into_string())
}

fn flatten_running_builds(response: ComputerResponse) -> Vec<RunningBuild> {
    let mut running = Vec::new();
    for node in response.computer {
        for executor in node.executors {
            if let Some(executable) = executor.current_executable {
                let name = match executable.full_display_name {
                    Some(display_name) => display_name,
                    None => executable.url.clone(),
                };
                running.push(RunningBuild {
                    number: executable.number,
                    name: name,
                    url: executable.url,
                    executor: format!("{} #{}", node.display_name, executor.number),
                });
            }
        }
    }
    running
}
