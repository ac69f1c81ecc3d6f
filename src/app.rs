use std::sync::Arc;

use adw::prelude::*;
use chrono_tz::Tz;
use relm4::prelude::*;

use crate::config;
use crate::models::Viewer;
use crate::services::settings::{AppSettings, ColorScheme};
use crate::services::{Database, HttpApi, SettingsService, SubmissionApi};
use crate::ui::browser::{Browser, BrowserInit, BrowserMsg, BrowserOutput};
use crate::ui::gallery::{Gallery, GalleryInit, GalleryMsg, GalleryOutput};
use crate::ui::timezone_selector::{
    TimezoneSelector, TimezoneSelectorMsg, TimezoneSelectorOutput,
};

pub struct App {
    db: Database,
    settings: AppSettings,
    gallery: AsyncController<Gallery>,
    browser: AsyncController<Browser>,
    timezone_selector: Controller<TimezoneSelector>,
    toast_overlay: adw::ToastOverlay,
}

/// Everything the window needs from the outside world, resolved once in
/// `main` and passed down explicitly.
pub struct AppInit {
    pub viewer: Option<Viewer>,
    pub share_link: Option<String>,
}

#[derive(Debug)]
pub enum AppMsg {
    TimezoneSelected(Tz),
    ColorSchemeSelected(ColorScheme),
    ShowToast(String),
    ShowAbout,
}

#[derive(Debug)]
pub enum AppCmd {
    Initialized(Database, AppSettings),
    InitFailed(String),
}

#[relm4::component(pub, async)]
impl AsyncComponent for App {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();
    type CommandOutput = AppCmd;

    view! {
        adw::ApplicationWindow {
            set_title: Some(config::APP_NAME),
            set_default_width: 1100,
            set_default_height: 760,
            set_width_request: 480,
            set_height_request: 420,

            #[local_ref]
            toast_overlay -> adw::ToastOverlay {},
        }
    }

    async fn init(
        init: Self::Init,
        root: Self::Root,
        sender: AsyncComponentSender<Self>,
    ) -> AsyncComponentParts<Self> {
        let settings = AppSettings::default();
        let api: Arc<dyn SubmissionApi> = Arc::new(HttpApi::new(config::api_base_url()));

        let gallery = Gallery::builder()
            .launch(GalleryInit {
                api: api.clone(),
                viewer: init.viewer,
                share_link: init.share_link,
                timezone: settings.timezone,
            })
            .forward(sender.input_sender(), |output| match output {
                GalleryOutput::Toast(message) => AppMsg::ShowToast(message),
            });

        let browser = Browser::builder()
            .launch(BrowserInit {
                api,
                timezone: settings.timezone,
            })
            .forward(sender.input_sender(), |output| match output {
                BrowserOutput::Toast(message) => AppMsg::ShowToast(message),
            });

        let timezone_selector = TimezoneSelector::builder()
            .launch(settings.timezone)
            .forward(sender.input_sender(), |output| match output {
                TimezoneSelectorOutput::ZoneSelected(tz) => AppMsg::TimezoneSelected(tz),
            });

        let toast_overlay = adw::ToastOverlay::new();
        toast_overlay.set_hexpand(true);
        toast_overlay.set_vexpand(true);

        let stack = adw::ViewStack::new();
        stack.add_titled_with_icon(
            gallery.widget(),
            Some("posters"),
            "Posters",
            "view-grid-symbolic",
        );
        stack.add_titled_with_icon(
            browser.widget(),
            Some("abstracts"),
            "Abstracts",
            "view-list-symbolic",
        );

        let switcher = adw::ViewSwitcher::new();
        switcher.set_policy(adw::ViewSwitcherPolicy::Wide);
        switcher.set_stack(Some(&stack));

        let menu = gio::Menu::new();
        let theme_section = gio::Menu::new();
        theme_section.append(Some("Follow System Style"), Some("app.theme-system"));
        theme_section.append(Some("Light Style"), Some("app.theme-light"));
        theme_section.append(Some("Dark Style"), Some("app.theme-dark"));
        menu.append_section(Some("Appearance"), &theme_section);
        menu.append(Some("About Vernissage"), Some("app.about"));

        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu)
            .build();

        let header = adw::HeaderBar::new();
        header.set_title_widget(Some(&switcher));
        header.pack_end(&menu_button);
        header.pack_end(timezone_selector.widget());

        let toolbar = adw::ToolbarView::new();
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&stack));

        toast_overlay.set_child(Some(&toolbar));

        let model = App {
            db: Database::new_in_memory().expect("placeholder db"),
            settings,
            gallery,
            browser,
            timezone_selector,
            toast_overlay: toast_overlay.clone(),
        };

        let widgets = view_output!();

        // App actions behind the hamburger menu
        let app = relm4::main_adw_application();
        for (name, scheme) in [
            ("theme-system", ColorScheme::System),
            ("theme-light", ColorScheme::Light),
            ("theme-dark", ColorScheme::Dark),
        ] {
            let sender_theme = sender.input_sender().clone();
            let action = gio::SimpleAction::new(name, None);
            action.connect_activate(move |_, _| {
                sender_theme.send(AppMsg::ColorSchemeSelected(scheme)).unwrap();
            });
            app.add_action(&action);
        }

        let sender_about = sender.input_sender().clone();
        let about_action = gio::SimpleAction::new("about", None);
        about_action.connect_activate(move |_, _| {
            sender_about.send(AppMsg::ShowAbout).unwrap();
        });
        app.add_action(&about_action);

        // Async initialization: open the settings store, load preferences
        sender.command(|out, _| {
            Box::pin(async move {
                match App::async_init().await {
                    Ok((db, settings)) => out.send(AppCmd::Initialized(db, settings)).unwrap(),
                    Err(e) => out.send(AppCmd::InitFailed(e.to_string())).unwrap(),
                }
            })
        });

        AsyncComponentParts { model, widgets }
    }

    async fn update(
        &mut self,
        msg: Self::Input,
        sender: AsyncComponentSender<Self>,
        root: &Self::Root,
    ) {
        match msg {
            AppMsg::TimezoneSelected(tz) => {
                if tz == self.settings.timezone {
                    return;
                }
                self.settings.timezone = tz;
                self.gallery.emit(GalleryMsg::TimezoneChanged(tz));
                self.browser.emit(BrowserMsg::TimezoneChanged(tz));

                let db = self.db.clone();
                sender.command(move |_out, _| {
                    Box::pin(async move {
                        if let Err(e) = SettingsService::save_timezone(&db, tz).await {
                            tracing::error!("Failed to persist timezone: {e}");
                        }
                    })
                });
            }
            AppMsg::ColorSchemeSelected(scheme) => {
                self.settings.color_scheme = scheme;
                apply_color_scheme(scheme);

                let db = self.db.clone();
                sender.command(move |_out, _| {
                    Box::pin(async move {
                        if let Err(e) = SettingsService::save_color_scheme(&db, scheme).await {
                            tracing::error!("Failed to persist color scheme: {e}");
                        }
                    })
                });
            }
            AppMsg::ShowToast(message) => {
                self.show_toast(&message);
            }
            AppMsg::ShowAbout => {
                crate::ui::window::create_about_dialog(root);
            }
        }
    }

    async fn update_cmd(
        &mut self,
        msg: Self::CommandOutput,
        _sender: AsyncComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match msg {
            AppCmd::Initialized(db, settings) => {
                self.db = db;

                apply_color_scheme(settings.color_scheme);
                if settings.timezone != self.settings.timezone {
                    self.timezone_selector
                        .emit(TimezoneSelectorMsg::SetZone(settings.timezone));
                    self.gallery
                        .emit(GalleryMsg::TimezoneChanged(settings.timezone));
                    self.browser
                        .emit(BrowserMsg::TimezoneChanged(settings.timezone));
                }
                self.settings = settings;
            }
            AppCmd::InitFailed(error) => {
                tracing::error!("Initialization failed: {error}");
                self.show_toast(&format!("Error: {error}"));
            }
        }
    }
}

impl App {
    async fn async_init() -> anyhow::Result<(Database, AppSettings)> {
        let db = Database::new().await?;
        let settings = SettingsService::load(&db).await;
        Ok((db, settings))
    }

    fn show_toast(&self, message: &str) {
        let toast = adw::Toast::new(message);
        toast.set_timeout(3);
        self.toast_overlay.add_toast(toast);
    }
}

fn apply_color_scheme(scheme: ColorScheme) {
    let style_manager = adw::StyleManager::default();
    style_manager.set_color_scheme(match scheme {
        ColorScheme::System => adw::ColorScheme::Default,
        ColorScheme::Light => adw::ColorScheme::ForceLight,
        ColorScheme::Dark => adw::ColorScheme::ForceDark,
    });
}
