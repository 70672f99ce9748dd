/// Outbound channel for intermediate notices ("fetching the job
/// list...") sent before a command's final reply. The hosting chat
/// framework supplies the real implementation.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier used by the console host: notices go straight to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}
