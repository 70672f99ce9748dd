use std::collections::HashMap;

use errors::JenkinsRequestError;
use jenkins_response::{JobDetail, JobSummary, QueueItem, RunningBuild};

/// The operations the command handlers need from the CI server. The
/// concrete error type lets callers match `NotFound` directly instead
/// of fishing through an opaque error chain.
pub trait CiServer {
    fn build_job(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<(), JenkinsRequestError>;

    fn cancel_queue_item(&self, id: u64) -> Result<(), JenkinsRequestError>;

    fn get_jobs(&self) -> Result<Vec<JobSummary>, JenkinsRequestError>;

    fn get_job_info(&self, name: &str) -> Result<JobDetail, JenkinsRequestError>;

    fn get_running_builds(&self) -> Result<Vec<RunningBuild>, JenkinsRequestError>;

    fn get_queue_info(&self) -> Result<Vec<QueueItem>, JenkinsRequestError>;

    fn stop_build(&self, name: &str, number: u32) -> Result<(), JenkinsRequestError>;
}
