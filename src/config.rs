pub const APP_ID: &str = "app.vernissage.Vernissage";
pub const APP_NAME: &str = "Vernissage";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_BASE: &str = "https://conference.vernissage.app";

/// Web address poster share links point at; the expanded poster rides in
/// its `id` query parameter.
pub const SHARE_BASE_URL: &str = "https://conference.vernissage.app/posters";

/// Base URL of the conference backend, overridable for local development.
pub fn api_base_url() -> String {
    std::env::var("VERNISSAGE_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
}
