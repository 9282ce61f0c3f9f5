use crate::config::Config;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const AUTH_SCOPES: &str = "openid profile email";

/// Authorization URL the login screen sends the browser to. Only the URL is
/// built here; the code/token exchange happens on the server after the
/// redirect.
pub fn google_auth_url(config: &Config) -> String {
    let url = reqwest::Url::parse_with_params(
        AUTH_ENDPOINT,
        &[
            ("client_id", config.google_client_id.as_str()),
            ("redirect_uri", config.google_redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", AUTH_SCOPES),
        ],
    )
    .expect("the static authorization endpoint is a valid URL");
    url.to_string()
}
