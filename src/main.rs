mod app;
mod config;
mod models;
mod services;
mod ui;

use relm4::prelude::*;
use tracing_subscriber::EnvFilter;

use app::{App, AppInit};
use config::APP_ID;
use models::Viewer;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Viewer identity comes from the external auth wrapper; an optional
    // share link may be passed as the first argument.
    let init = AppInit {
        viewer: Viewer::from_env(),
        share_link: std::env::args().nth(1),
    };

    let app = adw::Application::builder().application_id(APP_ID).build();

    RelmApp::from_app(app).run_async::<App>(init);
}
