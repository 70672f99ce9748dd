use errors::JenkinsRequestError;
use reqwest::header::{Basic, Headers};
use reqwest::{StatusCode, Url};
use serde;
use serde_json;
use HTTP_CLIENT;

pub fn get_basic_credentials(username: &str, password: Option<String>) -> Basic {
    Basic {
        username: username.to_string(),
        password: password,
    }
}

fn parse_url(url_string: &str) -> Result<Url, JenkinsRequestError> {
    Url::parse(url_string).map_err(|_| JenkinsRequestError::InvalidUrl {
        url: url_string.to_string(),
    })
}

/// GET the given URL and deserialize the JSON body into T. A 404
/// surfaces as `NotFound` so callers can tell a missing job apart from
/// a broken server.
pub fn get_json<T>(url_string: &str, headers: Headers) -> Result<T, JenkinsRequestError>
where
    T: serde::de::DeserializeOwned,
{
    let url = parse_url(url_string)?;
    let mut response =
        HTTP_CLIENT
            .get(url)
            .headers(headers)
            .send()
            .map_err(|err| JenkinsRequestError::Transport {
                url: url_string.to_string(),
                message: err.to_string(),
            })?;

    match response.status() {
        StatusCode::Ok => {
            let body_string =
                response
                    .text()
                    .map_err(|err| JenkinsRequestError::Transport {
                        url: url_string.to_string(),
                        message: err.to_string(),
                    })?;
            serde_json::from_str::<T>(body_string.as_str()).map_err(|err| {
                JenkinsRequestError::Deserialize {
                    url: url_string.to_string(),
                    message: err.to_string(),
                }
            })
        }
        StatusCode::NotFound => Err(JenkinsRequestError::NotFound {
            url: url_string.to_string(),
        }),
        other_code => Err(JenkinsRequestError::Http {
            url: url_string.to_string(),
            status: other_code,
        }),
    }
}

/// POST with an empty body. Jenkins answers its state-changing
/// endpoints with 2xx or a 302 back to the triggering page; both count
/// as success here.
pub fn post(url_string: &str, headers: Headers) -> Result<(), JenkinsRequestError> {
    let url = parse_url(url_string)?;
    let response =
        HTTP_CLIENT
            .post(url)
            .headers(headers)
            .send()
            .map_err(|err| JenkinsRequestError::Transport {
                url: url_string.to_string(),
                message: err.to_string(),
            })?;

    let status = response.status();
    if status.is_success() || status == StatusCode::Found {
        Ok(())
    } else if status == StatusCode::NotFound {
        Err(JenkinsRequestError::NotFound {
            url: url_string.to_string(),
        })
    } else {
        Err(JenkinsRequestError::Http {
            url: url_string.to_string(),
            status: status,
        })
    }
}
