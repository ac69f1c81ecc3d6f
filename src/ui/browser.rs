use std::sync::Arc;

use adw::prelude::*;
use chrono_tz::Tz;
use relm4::factory::FactoryVecDeque;
use relm4::prelude::*;

use crate::models::Submission;
use crate::services::api::SubmissionPage;
use crate::services::pagination::{PageLoader, PageRequest, ROW_HEIGHT};
use crate::services::timezone;
use crate::services::{Debouncer, SubmissionApi};
use crate::ui::detail_dialog::{DetailDialog, DetailDialogInit};

// --- AbstractRow: a loaded listing row or the trailing placeholder ---

#[derive(Debug, Clone)]
pub enum AbstractRowItem {
    Loaded {
        submission: Submission,
        timezone: Tz,
    },
    LoadingPlaceholder,
}

#[derive(Debug)]
pub struct AbstractRow {
    pub item: AbstractRowItem,
}

#[derive(Debug)]
pub enum AbstractRowMsg {}

#[derive(Debug)]
pub enum AbstractRowOutput {}

#[relm4::factory(pub)]
impl FactoryComponent for AbstractRow {
    type Init = AbstractRowItem;
    type Input = AbstractRowMsg;
    type Output = AbstractRowOutput;
    type CommandOutput = ();
    type ParentWidget = gtk::ListBox;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 4,
            set_margin_all: 8,
            set_height_request: ROW_HEIGHT,
        }
    }

    fn init_model(item: Self::Init, _index: &DynamicIndex, _sender: FactorySender<Self>) -> Self {
        Self { item }
    }

    fn init_widgets(
        &mut self,
        _index: &DynamicIndex,
        root: Self::Root,
        returned_widget: &<Self::ParentWidget as relm4::factory::FactoryView>::ReturnedWidget,
        _sender: FactorySender<Self>,
    ) -> Self::Widgets {
        match &self.item {
            AbstractRowItem::Loaded {
                submission,
                timezone,
            } => {
                let title = gtk::Label::builder()
                    .label(&submission.title)
                    .halign(gtk::Align::Start)
                    .xalign(0.0)
                    .ellipsize(gtk::pango::EllipsizeMode::End)
                    .build();
                title.add_css_class("heading");
                root.append(&title);

                let byline = gtk::Label::builder()
                    .label(format!(
                        "{} · {}",
                        submission.fullname, submission.institution
                    ))
                    .halign(gtk::Align::Start)
                    .xalign(0.0)
                    .ellipsize(gtk::pango::EllipsizeMode::End)
                    .build();
                byline.add_css_class("dim-label");
                byline.add_css_class("caption");
                root.append(&byline);

                let mut session = Vec::new();
                if let Some(format) = submission.talk_format.as_deref().filter(|f| !f.is_empty()) {
                    session.push(format.to_string());
                }
                if let Some(start) = &submission.starttime {
                    session.push(timezone::format_in_zone(start, *timezone));
                }
                if !session.is_empty() {
                    let when = gtk::Label::builder()
                        .label(session.join(" · "))
                        .halign(gtk::Align::Start)
                        .xalign(0.0)
                        .build();
                    when.add_css_class("caption");
                    root.append(&when);
                }

                let excerpt = gtk::Label::builder()
                    .label(&submission.abstract_text)
                    .halign(gtk::Align::Start)
                    .xalign(0.0)
                    .ellipsize(gtk::pango::EllipsizeMode::End)
                    .build();
                excerpt.add_css_class("dim-label");
                root.append(&excerpt);
            }
            AbstractRowItem::LoadingPlaceholder => {
                let spinner = gtk::Spinner::new();
                spinner.set_spinning(true);
                spinner.set_halign(gtk::Align::Center);
                spinner.set_valign(gtk::Align::Center);
                spinner.set_vexpand(true);
                root.append(&spinner);

                returned_widget.set_activatable(false);
                returned_widget.set_selectable(false);
            }
        }

        let widgets = view_output!();
        widgets
    }
}

// --- Browser component ---

pub struct Browser {
    api: Arc<dyn SubmissionApi>,
    loader: PageLoader,
    debouncer: Debouncer,
    timezone: Tz,
    rows: FactoryVecDeque<AbstractRow>,
    detail: Option<Controller<DetailDialog>>,
    initial_loading: bool,
}

pub struct BrowserInit {
    pub api: Arc<dyn SubmissionApi>,
    pub timezone: Tz,
}

#[derive(Debug)]
pub enum BrowserMsg {
    /// Raw keystroke; goes through the debouncer.
    SearchInput(String),
    /// Settled query from the debouncer; restarts the listing.
    SearchSettled(String),
    LoadMore,
    RowActivated(usize),
    TimezoneChanged(Tz),
}

#[derive(Debug)]
pub enum BrowserCmd {
    PageLoaded(u64, SubmissionPage),
    PageFailed(u64, String),
    DetailLoaded(Box<Submission>),
    DetailFailed(String),
}

#[derive(Debug)]
pub enum BrowserOutput {
    Toast(String),
}

#[relm4::component(pub, async)]
impl AsyncComponent for Browser {
    type Init = BrowserInit;
    type Input = BrowserMsg;
    type Output = BrowserOutput;
    type CommandOutput = BrowserCmd;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 12,
            set_margin_all: 16,

            gtk::Label {
                set_label: "Abstract browser",
                set_halign: gtk::Align::Start,
                add_css_class: "title-2",
            },

            gtk::Label {
                set_label: "Click a row to expand the details. More entries load as you \
                            scroll; times follow the chosen timezone.",
                set_wrap: true,
                set_halign: gtk::Align::Start,
                set_xalign: 0.0,
                add_css_class: "dim-label",
            },

            gtk::SearchEntry {
                set_placeholder_text: Some("search here"),
                set_halign: gtk::Align::Center,
                set_width_request: 320,
                connect_search_changed[sender] => move |entry| {
                    sender.input(BrowserMsg::SearchInput(entry.text().to_string()));
                },
            },

            gtk::Label {
                set_label: "No matching abstracts.",
                #[watch]
                set_visible: !model.initial_loading
                    && !model.loader.is_loading()
                    && model.loader.row_count() == 0,
                set_halign: gtk::Align::Center,
                add_css_class: "dim-label",
            },

            gtk::ScrolledWindow {
                set_hscrollbar_policy: gtk::PolicyType::Never,
                set_vexpand: true,
                connect_edge_reached[sender] => move |_, position| {
                    if position == gtk::PositionType::Bottom {
                        sender.input(BrowserMsg::LoadMore);
                    }
                },

                #[local_ref]
                row_list -> gtk::ListBox {
                    set_selection_mode: gtk::SelectionMode::None,
                    add_css_class: "boxed-list",
                },
            },
        }
    }

    async fn init(
        init: Self::Init,
        root: Self::Root,
        sender: AsyncComponentSender<Self>,
    ) -> AsyncComponentParts<Self> {
        let rows = FactoryVecDeque::builder()
            .launch(gtk::ListBox::default())
            .detach();

        let input = sender.input_sender().clone();
        let debouncer = Debouncer::new(move |value| {
            let _ = input.send(BrowserMsg::SearchSettled(value));
        });

        let mut model = Browser {
            api: init.api,
            loader: PageLoader::new(),
            debouncer,
            timezone: init.timezone,
            rows,
            detail: None,
            initial_loading: true,
        };

        let row_list = model.rows.widget();
        let widgets = view_output!();

        let sender_rows = sender.clone();
        row_list.connect_row_activated(move |_, row| {
            sender_rows.input(BrowserMsg::RowActivated(row.index() as usize));
        });

        // first page of the unfiltered listing
        let request = model.loader.restart("");
        model.rebuild_rows();
        model.dispatch(request, &sender);

        AsyncComponentParts { model, widgets }
    }

    async fn update(
        &mut self,
        msg: Self::Input,
        sender: AsyncComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match msg {
            BrowserMsg::SearchInput(text) => {
                self.debouncer.push(text);
            }
            BrowserMsg::SearchSettled(query) => {
                self.initial_loading = true;
                let request = self.loader.restart(&query);
                self.rebuild_rows();
                self.dispatch(request, &sender);
            }
            BrowserMsg::LoadMore => {
                // no-op while a page fetch is already in flight
                if let Some(request) = self.loader.load_more() {
                    self.dispatch(request, &sender);
                }
            }
            BrowserMsg::RowActivated(index) => {
                if !self.loader.is_row_loaded(index) {
                    return;
                }
                let Some(id) = self.loader.items().get(index).map(|s| s.id.clone()) else {
                    return;
                };
                let api = self.api.clone();
                sender.command(move |out, _| {
                    Box::pin(async move {
                        match api.submission_detail(&id).await {
                            Ok(submission) => out
                                .send(BrowserCmd::DetailLoaded(Box::new(submission)))
                                .unwrap(),
                            Err(e) => out.send(BrowserCmd::DetailFailed(e.to_string())).unwrap(),
                        }
                    })
                });
            }
            BrowserMsg::TimezoneChanged(tz) => {
                self.timezone = tz;
                self.rebuild_rows();
            }
        }
    }

    async fn update_cmd(
        &mut self,
        msg: Self::CommandOutput,
        sender: AsyncComponentSender<Self>,
        root: &Self::Root,
    ) {
        match msg {
            BrowserCmd::PageLoaded(seq, page) => {
                if self.loader.complete(seq, page) {
                    self.initial_loading = false;
                    self.rebuild_rows();
                } else {
                    tracing::debug!("Discarding stale page response (seq {seq})");
                }
            }
            BrowserCmd::PageFailed(seq, error) => {
                // keep whatever is loaded; scrolling again retries
                self.loader.fail(seq);
                self.initial_loading = false;
                tracing::error!("Abstract page fetch failed: {error}");
                let _ = sender.output(BrowserOutput::Toast(
                    "Could not load abstracts".to_string(),
                ));
            }
            BrowserCmd::DetailLoaded(submission) => {
                let dialog = DetailDialog::builder()
                    .launch(DetailDialogInit {
                        submission: *submission,
                        timezone: self.timezone,
                    })
                    .detach();
                if let Some(window) = root.root().and_then(|r| r.downcast::<gtk::Window>().ok()) {
                    dialog.widget().set_transient_for(Some(&window));
                }
                dialog.widget().present();
                self.detail = Some(dialog);
            }
            BrowserCmd::DetailFailed(error) => {
                tracing::error!("Abstract detail fetch failed: {error}");
                let _ = sender.output(BrowserOutput::Toast(
                    "Could not load the abstract".to_string(),
                ));
            }
        }
    }
}

impl Browser {
    fn rebuild_rows(&mut self) {
        let mut guard = self.rows.guard();
        guard.clear();
        for submission in self.loader.items() {
            guard.push_back(AbstractRowItem::Loaded {
                submission: submission.clone(),
                timezone: self.timezone,
            });
        }
        // rows beyond the loaded range render as a placeholder
        if self.loader.has_more() || self.initial_loading {
            guard.push_back(AbstractRowItem::LoadingPlaceholder);
        }
    }

    fn dispatch(&self, request: PageRequest, sender: &AsyncComponentSender<Self>) {
        let api = self.api.clone();
        sender.command(move |out, _| {
            Box::pin(async move {
                match api
                    .submission_page(request.next.as_deref(), &request.query)
                    .await
                {
                    Ok(page) => out.send(BrowserCmd::PageLoaded(request.seq, page)).unwrap(),
                    Err(e) => out
                        .send(BrowserCmd::PageFailed(request.seq, e.to_string()))
                        .unwrap(),
                }
            })
        });
    }
}
