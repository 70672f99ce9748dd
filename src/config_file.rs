#[derive(Deserialize)]
pub struct Config {
    pub jenkins_base_url: String,
    pub jenkins_username: String,
    pub jenkins_token: String,
}
