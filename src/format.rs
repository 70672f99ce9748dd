//! Pure formatters turning Jenkins records into chat-friendly text.
//! Rows are newline-joined with no trailing separator, and every
//! empty input produces its fixed "nothing here" message rather than
//! an empty string.

use jenkins_response::{JobDetail, JobSummary, QueueItem, RunningBuild};
use status::status_label;

pub const NO_JOBS_FOUND: &'static str = "I haven't found any job.";
pub const NO_JOBS_TO_SHOW: &'static str = "There are no jobs to show.";
pub const NO_RUNNING_BUILDS: &'static str = "There are no running builds.";
pub const EMPTY_QUEUE: &'static str = "It seems there are no jobs in the queue.";

const NONE_PLACEHOLDER: &'static str = "None";

/// `name (url)` rows with names left-padded to the longest name.
pub fn format_jobs(jobs: &[JobSummary]) -> String {
    if jobs.is_empty() {
        return NO_JOBS_FOUND.to_string();
    }

    let max_length = jobs.iter().map(|job| job.name.len()).max().unwrap_or(0);
    let rows: Vec<String> = jobs
        .iter()
        .map(|job| format!("{:<width$} ({})", job.name, job.url, width = max_length))
        .collect();
    rows.join("\n").trim_right().to_string()
}

/// `fullname (LABEL)` rows in input order.
pub fn format_job_statuses(jobs: &[JobSummary]) -> String {
    if jobs.is_empty() {
        return NO_JOBS_TO_SHOW.to_string();
    }

    let rows: Vec<String> = jobs
        .iter()
        .map(|job| format!("{} ({})", job.fullname(), status_label(&job.color)))
        .collect();
    rows.join("\n").trim_right().to_string()
}

/// `id - taskName (taskUrl)` rows.
pub fn format_queue_items(items: &[QueueItem]) -> String {
    if items.is_empty() {
        return EMPTY_QUEUE.to_string();
    }

    let rows: Vec<String> = items
        .iter()
        .map(|item| format!("{} - {} ({})", item.id, item.task.name, item.task.url))
        .collect();
    rows.join("\n").trim_right().to_string()
}

/// `number - name (url) - executor` rows.
pub fn format_running_builds(builds: &[RunningBuild]) -> String {
    if builds.is_empty() {
        return NO_RUNNING_BUILDS.to_string();
    }

    let rows: Vec<String> = builds
        .iter()
        .map(|build| {
            format!(
                "{} - {} ({}) - {}",
                build.number, build.name, build.url, build.executor
            )
        })
        .collect();
    rows.join("\n").trim_right().to_string()
}

/// Multi-line description of a single job. Absent optionals print as
/// the literal "None", never as an empty field.
pub fn format_job_detail(job: &JobDetail) -> String {
    let description = match job.description {
        Some(ref text) => text.as_str(),
        None => NONE_PLACEHOLDER,
    };
    let next_build_number = match job.next_build_number {
        Some(number) => number.to_string(),
        None => NONE_PLACEHOLDER.to_string(),
    };
    let (last_build_number, last_build_url) = match job.last_build {
        Some(ref last) => (last.number.to_string(), last.url.as_str()),
        None => (NONE_PLACEHOLDER.to_string(), NONE_PLACEHOLDER),
    };

    format!(
        "Name: {}\nURL: {}\nDescription: {}\nNext Build Number: {}\nLast Successful Build Number: {}\nLast Successful Build URL: {}",
        job.name, job.url, description, next_build_number, last_build_number, last_build_url
    )
}
