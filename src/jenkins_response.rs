//! Typed views of the Jenkins JSON API payloads. Required keys are
//! validated here, at deserialization time, instead of leaking untyped
//! maps into the command handlers.

#[derive(Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JobSummary {
    pub name: String,
    pub url: String,

    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,

    pub color: String,
}

impl JobSummary {
    /// Jenkins only reports `fullName` for jobs inside folders; fall
    /// back to the plain name otherwise.
    pub fn fullname(&self) -> &str {
        match self.full_name {
            Some(ref full) => full.as_str(),
            None => self.name.as_str(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct JobDetail {
    pub name: String,
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "nextBuildNumber", default)]
    pub next_build_number: Option<u32>,

    #[serde(rename = "lastBuild", default)]
    pub last_build: Option<BuildRef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BuildRef {
    pub number: u32,
    pub url: String,
}

#[derive(Deserialize)]
pub struct QueueResponse {
    pub items: Vec<QueueItem>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct QueueItem {
    pub id: u64,
    pub task: QueueTask,
}

#[derive(Deserialize, Debug, Clone)]
pub struct QueueTask {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct ComputerResponse {
    pub computer: Vec<ComputerNode>,
}

#[derive(Deserialize)]
pub struct ComputerNode {
    #[serde(rename = "displayName")]
    pub display_name: String,

    #[serde(default)]
    pub executors: Vec<Executor>,
}

#[derive(Deserialize)]
pub struct Executor {
    #[serde(default)]
    pub number: u32,

    #[serde(rename = "currentExecutable", default)]
    pub current_executable: Option<Executable>,
}

#[derive(Deserialize)]
pub struct Executable {
    pub number: u32,
    pub url: String,

    #[serde(rename = "fullDisplayName", default)]
    pub full_display_name: Option<String>,
}

/// A build currently occupying an executor, flattened from the
/// computer API for display.
#[derive(Debug, Clone)]
pub struct RunningBuild {
    pub number: u32,
    pub name: String,
    pub url: String,
    pub executor: String,
}
