use reqwest::StatusCode;

#[derive(Debug, Fail)]
pub enum JenkinsRequestError {
    #[fail(display = "Jenkins returned 404 for {}", url)]
    NotFound { url: String },

    #[fail(display = "HTTP call to {} failed with code: {}", url, status)]
    Http { url: String, status: StatusCode },

    #[fail(display = "Unable to parse '{}' into a valid URL", url)]
    InvalidUrl { url: String },

    #[fail(display = "Request to {} failed: {}", url, message)]
    Transport { url: String, message: String },

    #[fail(display = "Unable to deserialize the response from {}: {}", url, message)]
    Deserialize { url: String, message: String },
}
