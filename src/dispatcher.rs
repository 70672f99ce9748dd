//! Routes chat commands to the CI server and turns the results into
//! reply strings. Every failure path ends in a returned string; nothing
//! escapes to the hosting framework.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use ci_server::CiServer;
use errors::JenkinsRequestError;
use format;
use jenkins_response::JobSummary;
use notifier::Notifier;
use status::{status_label, FAILED_LABEL};
use timer::MessageTimer;

const JOB_NOT_FOUND: &'static str = "Sorry, I can't find that job. Typo maybe?";
const QUEUE_ITEM_NOT_FOUND: &'static str =
    "Sorry, I can't find that queue item. Maybe the ID does not exist.";
const BUILD_USAGE: &'static str = "You have to specify a job name: build <jobName>";
const CANCEL_USAGE: &'static str = "You have to specify a numeric queue item ID: cancel <queueId>";
const STOP_USAGE: &'static str =
    "You have to specify the build number: stop <jobName> <buildNumber>";
const DESCRIBE_USAGE: &'static str = "You have to specify a job name: describe <jobName>";
const HELP: &'static str = "I know these commands: build, cancel, list, status, describe, \
                            running, stop, queue, failed, msgtimer";

const FETCHING_JOBS: &'static str = "I'm getting the job list from Jenkins...";
const FETCHING_STATUSES: &'static str = "I'm getting the jobs with their status from Jenkins...";
const FETCHING_FAILED: &'static str = "I'm getting the failed jobs...";
const FETCHING_RUNNING: &'static str = "I will ask for the current running builds list!";
const FETCHING_QUEUE: &'static str = "Getting the job queue...";

const TIMER_STARTING: &'static str = "Starting timer";
const TIMER_STARTED: &'static str = "Boo! Bet you weren't expecting me, were you?";
const TIMER_ALREADY_RUNNING: &'static str = "The message timer is already running.";
const TIMER_MESSAGE: &'static str = "I am called every 5 seconds";
const TIMER_INTERVAL_SECS: u64 = 5;

pub struct CommandDispatcher<C: CiServer> {
    client: C,
    notifier: Arc<Notifier>,
    timer: Mutex<Option<MessageTimer>>,
}

impl<C: CiServer> CommandDispatcher<C> {
    pub fn new(client: C, notifier: Arc<Notifier>) -> CommandDispatcher<C> {
        CommandDispatcher {
            client: client,
            notifier: notifier,
            timer: Mutex::new(None),
        }
    }

    /// Handles one chat command. `args` is the raw text after the
    /// command verb; each handler splits it the way it needs to.
    pub fn handle(&self, command: &str, args: &str) -> String {
        match command {
            "build" => self.build(args),
            "cancel" => self.cancel(args),
            "list" => self.list(args),
            "status" => self.status(args),
            "describe" => self.describe(args),
            "running" => self.running(),
            "stop" => self.stop(args),
            "queue" => self.queue(),
            "failed" => self.failed(args),
            "msgtimer" => self.msgtimer(),
            other => format!("I don't know the command '{}'. {}", other, HELP),
        }
    }

    /// Cancels the message timer, if one is running. The console host
    /// calls this on shutdown.
    pub fn shutdown(&self) {
        if let Some(timer) = self.timer_slot().take() {
            timer.cancel();
        }
    }

    // A poisoned lock only means some thread panicked while holding
    // it; the slot contents are still usable, so recover the guard
    // rather than letting the panic spread to the host.
    fn timer_slot(&self) -> MutexGuard<Option<MessageTimer>> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Job names with spaces come in as multiple tokens, so the tokens
    // are joined back together with single spaces. Anything else about
    // the original whitespace is lost.
    fn build(&self, args: &str) -> String {
        let tokens: Vec<&str> = args.split_whitespace().collect();
        if tokens.is_empty() {
            return BUILD_USAGE.to_string();
        }
        let job_name = tokens.join(" ");

        match self.client.build_job(&job_name, &HashMap::new()) {
            Ok(()) => format!(
                "The job {} has been sent to the queue to be built.",
                tokens[0]
            ),
            Err(JenkinsRequestError::NotFound { .. }) => {
                format!("{} ARGS={}", JOB_NOT_FOUND, job_name)
            }
            Err(err) => report_failure("build", &err),
        }
    }

    fn cancel(&self, args: &str) -> String {
        let id: u64 = match args.trim().parse() {
            Ok(id) => id,
            Err(_) => return CANCEL_USAGE.to_string(),
        };

        match self.client.cancel_queue_item(id) {
            Ok(()) => "Job canceled from the queue.".to_string(),
            Err(JenkinsRequestError::NotFound { .. }) => QUEUE_ITEM_NOT_FOUND.to_string(),
            Err(err) => report_failure("cancel", &err),
        }
    }

    fn list(&self, args: &str) -> String {
        self.notifier.notify(FETCHING_JOBS);

        let search_term = args.trim().to_lowercase();
        match self.client.get_jobs() {
            Ok(jobs) => {
                let matching: Vec<JobSummary> = jobs
                    .into_iter()
                    .filter(|job| job.name.to_lowercase().contains(&search_term))
                    .collect();
                format::format_jobs(&matching)
            }
            Err(err) => report_failure("list", &err),
        }
    }

    fn status(&self, args: &str) -> String {
        self.notifier.notify(FETCHING_STATUSES);

        match self.jobs_matching_fullname(args) {
            Ok(jobs) => format::format_job_statuses(&jobs),
            Err(err) => report_failure("status", &err),
        }
    }

    fn failed(&self, args: &str) -> String {
        self.notifier.notify(FETCHING_FAILED);

        match self.jobs_matching_fullname(args) {
            Ok(jobs) => {
                let failed: Vec<JobSummary> = jobs
                    .into_iter()
                    .filter(|job| status_label(&job.color) == FAILED_LABEL)
                    .collect();
                format::format_job_statuses(&failed)
            }
            Err(err) => report_failure("failed", &err),
        }
    }

    fn describe(&self, args: &str) -> String {
        let job_name = args.trim();
        if job_name.is_empty() {
            return DESCRIBE_USAGE.to_string();
        }

        match self.client.get_job_info(job_name) {
            Ok(detail) => format::format_job_detail(&detail),
            Err(JenkinsRequestError::NotFound { .. }) => JOB_NOT_FOUND.to_string(),
            Err(err) => report_failure("describe", &err),
        }
    }

    fn running(&self) -> String {
        self.notifier.notify(FETCHING_RUNNING);

        match self.client.get_running_builds() {
            Ok(builds) => format::format_running_builds(&builds),
            Err(err) => report_failure("running", &err),
        }
    }

    fn stop(&self, args: &str) -> String {
        let tokens: Vec<&str> = args.split_whitespace().collect();
        if tokens.len() < 2 {
            return STOP_USAGE.to_string();
        }
        let number: u32 = match tokens[1].parse() {
            Ok(number) => number,
            Err(_) => return STOP_USAGE.to_string(),
        };

        match self.client.stop_build(tokens[0], number) {
            Ok(()) => format!("The job {} has been stopped.", tokens[0]),
            Err(JenkinsRequestError::NotFound { .. }) => JOB_NOT_FOUND.to_string(),
            Err(err) => report_failure("stop", &err),
        }
    }

    fn queue(&self) -> String {
        self.notifier.notify(FETCHING_QUEUE);

        match self.client.get_queue_info() {
            Ok(items) => format::format_queue_items(&items),
            Err(err) => report_failure("queue", &err),
        }
    }

    fn msgtimer(&self) -> String {
        self.notifier.notify(TIMER_STARTING);

        let mut slot = self.timer_slot();
        if slot.is_some() {
            return TIMER_ALREADY_RUNNING.to_string();
        }
        *slot = Some(MessageTimer::start(
            Duration::from_secs(TIMER_INTERVAL_SECS),
            Arc::clone(&self.notifier),
            TIMER_MESSAGE,
        ));
        TIMER_STARTED.to_string()
    }

    fn jobs_matching_fullname(&self, args: &str) -> Result<Vec<JobSummary>, JenkinsRequestError> {
        let search_term = args.trim().to_lowercase();
        let jobs = self.client.get_jobs()?;
        Ok(jobs
            .into_iter()
            .filter(|job| job.fullname().to_lowercase().contains(&search_term))
            .collect())
    }
}

fn report_failure(command: &str, err: &JenkinsRequestError) -> String {
    warn!("Command '{}' failed: {}", command, err);
    format!("Something went wrong talking to Jenkins: {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jenkins_response::{BuildRef, JobDetail, QueueItem, QueueTask, RunningBuild};
    use std::sync::Mutex as StdMutex;

    struct RecordingNotifier {
        messages: StdMutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> RecordingNotifier {
            RecordingNotifier {
                messages: StdMutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    /// In-memory CI server: serves canned data and records every call,
    /// reporting NotFound for names/ids it has never heard of.
    struct FakeCiServer {
        calls: StdMutex<Vec<String>>,
        jobs: Vec<JobSummary>,
        job_details: HashMap<String, JobDetail>,
        queue: Vec<QueueItem>,
        running: Vec<RunningBuild>,
        unreachable: bool,
    }

    impl FakeCiServer {
        fn new() -> FakeCiServer {
            FakeCiServer {
                calls: StdMutex::new(Vec::new()),
                jobs: Vec::new(),
                job_details: HashMap::new(),
                queue: Vec::new(),
                running: Vec::new(),
                unreachable: false,
            }
        }

        fn with_jobs(jobs: Vec<JobSummary>) -> FakeCiServer {
            let mut fake = FakeCiServer::new();
            fake.jobs = jobs;
            fake
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn not_found(what: &str) -> JenkinsRequestError {
            JenkinsRequestError::NotFound {
                url: format!("http://jenkins/{}", what),
            }
        }

        fn check_reachable(&self) -> Result<(), JenkinsRequestError> {
            if self.unreachable {
                Err(JenkinsRequestError::Transport {
                    url: "http://jenkins/api/json".to_string(),
                    message: "connection refused".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl CiServer for FakeCiServer {
        fn build_job(
            &self,
            name: &str,
            _params: &HashMap<String, String>,
        ) -> Result<(), JenkinsRequestError> {
            self.record(format!("build_job:{}", name));
            self.check_reachable()?;
            if self.jobs.iter().any(|job| job.name == name) {
                Ok(())
            } else {
                Err(FakeCiServer::not_found(name))
            }
        }

        fn cancel_queue_item(&self, id: u64) -> Result<(), JenkinsRequestError> {
            self.record(format!("cancel_queue_item:{}", id));
            self.check_reachable()?;
            if self.queue.iter().any(|item| item.id == id) {
                Ok(())
            } else {
                Err(FakeCiServer::not_found("queue"))
            }
        }

        fn get_jobs(&self) -> Result<Vec<JobSummary>, JenkinsRequestError> {
            self.record("get_jobs".to_string());
            self.check_reachable()?;
            Ok(self.jobs.clone())
        }

        fn get_job_info(&self, name: &str) -> Result<JobDetail, JenkinsRequestError> {
            self.record(format!("get_job_info:{}", name));
            self.check_reachable()?;
            match self.job_details.get(name) {
                Some(detail) => Ok(detail.clone()),
                None => Err(FakeCiServer::not_found(name)),
            }
        }

        fn get_running_builds(&self) -> Result<Vec<RunningBuild>, JenkinsRequestError> {
            self.record("get_running_builds".to_string());
            self.check_reachable()?;
            Ok(self.running.clone())
        }

        fn get_queue_info(&self) -> Result<Vec<QueueItem>, JenkinsRequestError> {
            self.record("get_queue_info".to_string());
            self.check_reachable()?;
            Ok(self.queue.clone())
        }

        fn stop_build(&self, name: &str, number: u32) -> Result<(), JenkinsRequestError> {
            self.record(format!("stop_build:{}:{}", name, number));
            self.check_reachable()?;
            if self.jobs.iter().any(|job| job.name == name) {
                Ok(())
            } else {
                Err(FakeCiServer::not_found(name))
            }
        }
    }

    fn job(name: &str, color: &str) -> JobSummary {
        JobSummary {
            name: name.to_string(),
            url: format!("http://jenkins/job/{}/", name),
            full_name: None,
            color: color.to_string(),
        }
    }

    fn dispatcher_with(
        fake: FakeCiServer,
    ) -> (CommandDispatcher<FakeCiServer>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = CommandDispatcher::new(fake, notifier.clone());
        (dispatcher, notifier)
    }

    #[test]
    fn build_joins_tokens_into_the_job_name() {
        let fake = FakeCiServer::with_jobs(vec![job("myjob suffix", "blue")]);
        let (dispatcher, _) = dispatcher_with(fake);

        let reply = dispatcher.handle("build", "myjob suffix");
        assert_eq!(
            reply,
            "The job myjob has been sent to the queue to be built."
        );
        assert_eq!(
            dispatcher.client.calls(),
            vec!["build_job:myjob suffix".to_string()]
        );
    }

    #[test]
    fn build_not_found_reply_names_the_attempted_job() {
        let (dispatcher, _) = dispatcher_with(FakeCiServer::new());

        let reply = dispatcher.handle("build", "myjob suffix");
        assert!(reply.contains(JOB_NOT_FOUND));
        assert!(reply.contains("ARGS=myjob suffix"));
    }

    #[test]
    fn build_without_arguments_returns_usage_hint() {
        let (dispatcher, _) = dispatcher_with(FakeCiServer::new());
        assert_eq!(dispatcher.handle("build", "  "), BUILD_USAGE);
        assert!(dispatcher.client.calls().is_empty());
    }

    #[test]
    fn cancel_rejects_non_numeric_id_without_calling_jenkins() {
        let (dispatcher, _) = dispatcher_with(FakeCiServer::new());
        assert_eq!(dispatcher.handle("cancel", "abc"), CANCEL_USAGE);
        assert!(dispatcher.client.calls().is_empty());
    }

    #[test]
    fn cancel_reports_missing_queue_items() {
        let (dispatcher, _) = dispatcher_with(FakeCiServer::new());
        assert_eq!(dispatcher.handle("cancel", "99"), QUEUE_ITEM_NOT_FOUND);
    }

    #[test]
    fn cancel_confirms_removal() {
        let mut fake = FakeCiServer::new();
        fake.queue = vec![QueueItem {
            id: 7,
            task: QueueTask {
                name: "myjob".to_string(),
                url: "http://jenkins/job/myjob/".to_string(),
            },
        }];
        let (dispatcher, _) = dispatcher_with(fake);
        assert_eq!(
            dispatcher.handle("cancel", "7"),
            "Job canceled from the queue."
        );
    }

    #[test]
    fn list_filters_case_insensitively_and_sends_a_notice() {
        let fake = FakeCiServer::with_jobs(vec![
            job("Deploy-Prod", "blue"),
            job("deploy-staging", "red"),
            job("unrelated", "blue"),
        ]);
        let (dispatcher, notifier) = dispatcher_with(fake);

        let reply = dispatcher.handle("list", "DEPLOY");
        assert!(reply.contains("Deploy-Prod"));
        assert!(reply.contains("deploy-staging"));
        assert!(!reply.contains("unrelated"));
        assert_eq!(notifier.sent(), vec![FETCHING_JOBS.to_string()]);
    }

    #[test]
    fn list_with_no_matches_returns_the_fixed_message() {
        let fake = FakeCiServer::with_jobs(vec![job("myjob", "blue")]);
        let (dispatcher, _) = dispatcher_with(fake);
        assert_eq!(dispatcher.handle("list", "nomatch"), format::NO_JOBS_FOUND);
    }

    #[test]
    fn status_maps_colors_through_the_label_table() {
        let fake = FakeCiServer::with_jobs(vec![
            job("good", "blue"),
            job("bad", "red"),
            job("busy", "blue_anime"),
        ]);
        let (dispatcher, _) = dispatcher_with(fake);

        let reply = dispatcher.handle("status", "");
        assert_eq!(reply, "good (SUCCESS)\nbad (FAILED)\nbusy (IN PROGRESS)");
    }

    #[test]
    fn status_survives_an_unrecognized_color() {
        let fake = FakeCiServer::with_jobs(vec![job("odd", "polkadot")]);
        let (dispatcher, _) = dispatcher_with(fake);
        assert_eq!(dispatcher.handle("status", ""), "odd (UNKNOWN)");
    }

    #[test]
    fn failed_keeps_only_jobs_with_the_failed_label() {
        let fake = FakeCiServer::with_jobs(vec![
            job("good", "blue"),
            job("bad", "red"),
            job("worse", "red"),
            job("building", "red_anime"),
        ]);
        let (dispatcher, _) = dispatcher_with(fake);

        let reply = dispatcher.handle("failed", "");
        assert_eq!(reply, "bad (FAILED)\nworse (FAILED)");
    }

    #[test]
    fn failed_with_no_failures_returns_the_fixed_message() {
        let fake = FakeCiServer::with_jobs(vec![job("good", "blue")]);
        let (dispatcher, _) = dispatcher_with(fake);
        assert_eq!(dispatcher.handle("failed", ""), format::NO_JOBS_TO_SHOW);
    }

    #[test]
    fn describe_formats_the_job_detail() {
        let mut fake = FakeCiServer::new();
        fake.job_details.insert(
            "myjob".to_string(),
            JobDetail {
                name: "myjob".to_string(),
                url: "http://jenkins/job/myjob/".to_string(),
                description: None,
                next_build_number: Some(4),
                last_build: Some(BuildRef {
                    number: 3,
                    url: "http://jenkins/job/myjob/3/".to_string(),
                }),
            },
        );
        let (dispatcher, _) = dispatcher_with(fake);

        let reply = dispatcher.handle("describe", "myjob");
        assert!(reply.starts_with("Name: myjob"));
        assert!(reply.contains("Description: None"));
        assert!(reply.contains("Last Successful Build Number: 3"));
    }

    #[test]
    fn describe_unknown_job_apologizes() {
        let (dispatcher, _) = dispatcher_with(FakeCiServer::new());
        assert_eq!(dispatcher.handle("describe", "ghost"), JOB_NOT_FOUND);
    }

    #[test]
    fn running_reports_builds_or_the_fixed_message() {
        let mut fake = FakeCiServer::new();
        fake.running = vec![RunningBuild {
            number: 9,
            name: "myjob #9".to_string(),
            url: "http://jenkins/job/myjob/9/".to_string(),
            executor: "built-in #0".to_string(),
        }];
        let (dispatcher, notifier) = dispatcher_with(fake);

        let reply = dispatcher.handle("running", "");
        assert_eq!(
            reply,
            "9 - myjob #9 (http://jenkins/job/myjob/9/) - built-in #0"
        );
        assert_eq!(notifier.sent(), vec![FETCHING_RUNNING.to_string()]);

        let (empty_dispatcher, _) = dispatcher_with(FakeCiServer::new());
        assert_eq!(
            empty_dispatcher.handle("running", ""),
            format::NO_RUNNING_BUILDS
        );
    }

    #[test]
    fn stop_rejects_a_non_numeric_build_number_without_calling_jenkins() {
        let fake = FakeCiServer::with_jobs(vec![job("myjob", "blue")]);
        let (dispatcher, _) = dispatcher_with(fake);

        assert_eq!(dispatcher.handle("stop", "myjob abc"), STOP_USAGE);
        assert!(dispatcher.client.calls().is_empty());
    }

    #[test]
    fn stop_confirms_a_stopped_build() {
        let fake = FakeCiServer::with_jobs(vec![job("myjob", "blue")]);
        let (dispatcher, _) = dispatcher_with(fake);

        assert_eq!(
            dispatcher.handle("stop", "myjob 12"),
            "The job myjob has been stopped."
        );
        assert_eq!(
            dispatcher.client.calls(),
            vec!["stop_build:myjob:12".to_string()]
        );
    }

    #[test]
    fn queue_lists_waiting_items() {
        let mut fake = FakeCiServer::new();
        fake.queue = vec![QueueItem {
            id: 31,
            task: QueueTask {
                name: "myjob".to_string(),
                url: "http://jenkins/job/myjob/".to_string(),
            },
        }];
        let (dispatcher, _) = dispatcher_with(fake);

        assert_eq!(
            dispatcher.handle("queue", ""),
            "31 - myjob (http://jenkins/job/myjob/)"
        );
    }

    #[test]
    fn unknown_command_lists_the_known_ones() {
        let (dispatcher, _) = dispatcher_with(FakeCiServer::new());
        let reply = dispatcher.handle("deploy", "");
        assert!(reply.contains("deploy"));
        assert!(reply.contains("msgtimer"));
    }

    #[test]
    fn list_aborts_the_whole_response_when_jenkins_is_unreachable() {
        let mut fake = FakeCiServer::with_jobs(vec![job("myjob", "blue")]);
        fake.unreachable = true;
        let (dispatcher, notifier) = dispatcher_with(fake);

        let reply = dispatcher.handle("list", "");
        assert!(
            reply.starts_with("Something went wrong talking to Jenkins"),
            "unexpected reply: {}",
            reply
        );
        assert!(!reply.contains("myjob"));
        assert_eq!(notifier.sent(), vec![FETCHING_JOBS.to_string()]);
    }

    #[test]
    fn every_command_turns_a_transport_failure_into_a_reply() {
        let commands = vec![
            ("build", "myjob"),
            ("cancel", "7"),
            ("list", ""),
            ("status", ""),
            ("describe", "myjob"),
            ("running", ""),
            ("stop", "myjob 12"),
            ("queue", ""),
            ("failed", ""),
        ];

        for (command, args) in commands {
            let mut fake = FakeCiServer::new();
            fake.unreachable = true;
            let (dispatcher, _) = dispatcher_with(fake);

            let reply = dispatcher.handle(command, args);
            assert!(
                reply.starts_with("Something went wrong talking to Jenkins"),
                "command '{}' replied: {}",
                command,
                reply
            );
        }
    }

    #[test]
    fn msgtimer_survives_a_poisoned_timer_slot() {
        use std::thread;

        let (dispatcher, _) = dispatcher_with(FakeCiServer::new());
        let dispatcher = Arc::new(dispatcher);

        let poisoner = Arc::clone(&dispatcher);
        let _ = thread::spawn(move || {
            let _guard = poisoner.timer.lock().unwrap();
            panic!("leave the timer slot poisoned");
        })
        .join();

        assert_eq!(dispatcher.handle("msgtimer", ""), TIMER_STARTED);
        dispatcher.shutdown();
    }

    #[test]
    fn msgtimer_starts_once_and_reports_when_already_running() {
        let (dispatcher, notifier) = dispatcher_with(FakeCiServer::new());

        assert_eq!(dispatcher.handle("msgtimer", ""), TIMER_STARTED);
        assert_eq!(dispatcher.handle("msgtimer", ""), TIMER_ALREADY_RUNNING);
        assert_eq!(
            notifier.sent(),
            vec![TIMER_STARTING.to_string(), TIMER_STARTING.to_string()]
        );
        dispatcher.shutdown();
    }
}
