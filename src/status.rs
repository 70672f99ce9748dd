use std::collections::HashMap;

/// Label used when Jenkins reports a color code outside the table
/// below. The original dictionary lookup would blow up on one of
/// these; an explicit fallback keeps the handler alive.
pub const UNKNOWN_LABEL: &'static str = "UNKNOWN";

pub const FAILED_LABEL: &'static str = "FAILED";

lazy_static! {
    /// Jenkins ball color -> human-readable build status. Initialized
    /// once, read-only afterwards, so concurrent handlers can share it
    /// freely.
    static ref STATUS_LABELS: HashMap<&'static str, &'static str> = {
        let mut labels = HashMap::new();
        labels.insert("blue", "SUCCESS");
        labels.insert("blue_anime", "IN PROGRESS");
        labels.insert("red", FAILED_LABEL);
        labels.insert("red_anime", "IN PROGRESS");
        labels.insert("yellow", "UNSTABLE");
        labels.insert("disabled", "DISABLED");
        labels.insert("aborted", "ABORTED");
        labels.insert("notbuilt", "NOTBUILT");
        labels
    };
}

pub fn status_label(color: &str) -> &'static str {
    match STATUS_LABELS.get(color) {
        Some(label) => label,
        None => UNKNOWN_LABEL,
    }
}
