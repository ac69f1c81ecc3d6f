use std::sync::Arc;

use adw::prelude::*;
use chrono_tz::Tz;
use relm4::factory::FactoryVecDeque;
use relm4::prelude::*;

use crate::config;
use crate::models::{Submission, SubmissionUpdate, Viewer};
use crate::services::selection::{self, ExpansionState};
use crate::services::timezone::{self, SlotDisplay, POSTER_SLOTS_UTC};
use crate::services::{Debouncer, FilterState, SubmissionApi};
use crate::ui::edit_dialog::{EditDialog, EditDialogInit, EditDialogOutput};

/// Navigation header height plus the first card's top margin; subtracted
/// when scrolling a shared card into view.
const SCROLL_HEADER_OFFSET: f64 = 72.0;

// --- PosterCard: one card in the gallery flow ---

#[derive(Debug)]
pub struct PosterCard {
    submission: Submission,
    expanded: bool,
    editable: bool,
}

pub struct PosterCardInit {
    pub submission: Submission,
    pub expanded: bool,
    pub editable: bool,
}

#[derive(Debug)]
pub enum PosterCardMsg {}

#[derive(Debug)]
pub enum PosterCardOutput {
    Toggle(DynamicIndex),
    Edit(DynamicIndex),
}

#[relm4::factory(pub)]
impl FactoryComponent for PosterCard {
    type Init = PosterCardInit;
    type Input = PosterCardMsg;
    type Output = PosterCardOutput;
    type CommandOutput = ();
    type ParentWidget = gtk::FlowBox;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 6,
            set_margin_all: 6,
            add_css_class: "card",
            set_width_request: 340,
        }
    }

    fn init_model(init: Self::Init, _index: &DynamicIndex, _sender: FactorySender<Self>) -> Self {
        Self {
            submission: init.submission,
            expanded: init.expanded,
            editable: init.editable,
        }
    }

    fn init_widgets(
        &mut self,
        index: &DynamicIndex,
        root: Self::Root,
        _returned_widget: &<Self::ParentWidget as relm4::factory::FactoryView>::ReturnedWidget,
        sender: FactorySender<Self>,
    ) -> Self::Widgets {
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 4);

        let heading = gtk::Box::new(gtk::Orientation::Vertical, 2);
        heading.set_hexpand(true);

        let title = gtk::Label::builder()
            .label(&self.submission.title)
            .halign(gtk::Align::Start)
            .xalign(0.0)
            .wrap(true)
            .build();
        title.add_css_class("heading");
        heading.append(&title);

        let byline = gtk::Label::builder()
            .label(format!(
                "{}; {}",
                self.submission.fullname, self.submission.institution
            ))
            .halign(gtk::Align::Start)
            .xalign(0.0)
            .wrap(true)
            .build();
        byline.add_css_class("dim-label");
        byline.add_css_class("caption");
        heading.append(&byline);

        header.append(&heading);

        if self.editable {
            let edit_btn = gtk::Button::from_icon_name("document-edit-symbolic");
            edit_btn.set_tooltip_text(Some("Edit poster information"));
            edit_btn.set_valign(gtk::Align::Start);
            edit_btn.add_css_class("flat");
            let sender_edit = sender.clone();
            let idx = index.clone();
            edit_btn.connect_clicked(move |_| {
                let _ = sender_edit.output(PosterCardOutput::Edit(idx.clone()));
            });
            header.append(&edit_btn);
        }

        let expand_btn = gtk::Button::from_icon_name(if self.expanded {
            "view-restore-symbolic"
        } else {
            "view-fullscreen-symbolic"
        });
        expand_btn.set_tooltip_text(Some(if self.expanded { "Collapse" } else { "Expand" }));
        expand_btn.set_valign(gtk::Align::Start);
        expand_btn.add_css_class("flat");
        let sender_toggle = sender.clone();
        let idx = index.clone();
        expand_btn.connect_clicked(move |_| {
            let _ = sender_toggle.output(PosterCardOutput::Toggle(idx.clone()));
        });
        header.append(&expand_btn);

        root.append(&header);

        let links = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        for (key, label) in [
            ("discussion", "live discussion"),
            ("slides", "slides"),
            ("recordedTalk", "recorded talk"),
        ] {
            if let Some(url) = self.submission.resource_url(key) {
                let link = gtk::LinkButton::with_label(url, label);
                link.add_css_class("caption");
                links.append(&link);
            }
        }
        if !self.submission.available_slots.is_empty() {
            let joined = self
                .submission
                .available_slots
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let badge = gtk::Label::new(Some(&format!("active slots: {joined}")));
            badge.add_css_class("caption");
            badge.add_css_class("accent");
            badge.set_valign(gtk::Align::Center);
            links.append(&badge);
        }
        if links.first_child().is_some() {
            root.append(&links);
        }

        let text = if self.expanded {
            self.submission.abstract_text.clone()
        } else {
            self.submission.abstract_preview()
        };
        let abstract_label = gtk::Label::builder()
            .use_markup(true)
            .label(format!("<b>Abstract:</b> {}", glib::markup_escape_text(&text)))
            .halign(gtk::Align::Start)
            .xalign(0.0)
            .wrap(true)
            .selectable(self.expanded)
            .build();
        root.append(&abstract_label);

        let widgets = view_output!();
        widgets
    }
}

// --- Gallery component ---

pub struct Gallery {
    api: Arc<dyn SubmissionApi>,
    viewer: Option<Viewer>,
    all: Vec<Submission>,
    displayed: Vec<Submission>,
    filter: FilterState,
    debouncer: Debouncer,
    expansion: ExpansionState,
    timezone: Tz,
    slots: Vec<SlotDisplay>,
    loading: bool,
    cards: FactoryVecDeque<PosterCard>,
    slots_grid: gtk::Grid,
    edit_dialog: Option<AsyncController<EditDialog>>,
}

pub struct GalleryInit {
    pub api: Arc<dyn SubmissionApi>,
    pub viewer: Option<Viewer>,
    /// Share link the app was opened with, if any.
    pub share_link: Option<String>,
    pub timezone: Tz,
}

#[derive(Debug)]
pub enum GalleryMsg {
    /// Raw keystroke; goes through the debouncer.
    FilterInput(String),
    /// Settled query from the debouncer; takes effect.
    FilterSettled(String),
    CardToggled(usize),
    EditRequested(usize),
    EditSaved(SubmissionUpdate),
    EditFailed(String),
    EditCancelled,
    TimezoneChanged(Tz),
    CopyShareLink,
}

#[derive(Debug)]
pub enum GalleryCmd {
    Loaded(Vec<Submission>),
    LoadFailed(String),
}

#[derive(Debug)]
pub enum GalleryOutput {
    Toast(String),
}

#[relm4::component(pub, async)]
impl AsyncComponent for Gallery {
    type Init = GalleryInit;
    type Input = GalleryMsg;
    type Output = GalleryOutput;
    type CommandOutput = GalleryCmd;

    view! {
        gtk::ScrolledWindow {
            set_hscrollbar_policy: gtk::PolicyType::Never,
            set_vexpand: true,

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 12,
                set_margin_all: 16,

                gtk::Label {
                    set_label: "Virtual poster session",
                    set_halign: gtk::Align::Start,
                    add_css_class: "title-2",
                },

                gtk::Label {
                    set_label: "Use the links under each poster to reach the author's slides, \
                                recorded talk, and discussion channel. Check active slots for \
                                when the presenter is at the poster; times follow the timezone \
                                chosen in the top-right corner.",
                    set_wrap: true,
                    set_halign: gtk::Align::Start,
                    set_xalign: 0.0,
                    add_css_class: "dim-label",
                },

                gtk::Label {
                    set_label: "Poster presentation time slots",
                    set_halign: gtk::Align::Center,
                    add_css_class: "heading",
                },

                #[local_ref]
                slots_grid -> gtk::Grid {
                    set_halign: gtk::Align::Center,
                    set_column_spacing: 24,
                    set_row_spacing: 4,
                },

                gtk::Separator {
                    set_orientation: gtk::Orientation::Horizontal,
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_halign: gtk::Align::Center,
                    set_spacing: 8,

                    gtk::SearchEntry {
                        set_placeholder_text: Some("type here to filter.."),
                        set_width_request: 320,
                        connect_search_changed[sender] => move |entry| {
                            sender.input(GalleryMsg::FilterInput(entry.text().to_string()));
                        },
                    },

                    gtk::Button {
                        set_icon_name: "edit-copy-symbolic",
                        set_tooltip_text: Some("Copy share link"),
                        add_css_class: "flat",
                        connect_clicked => GalleryMsg::CopyShareLink,
                    },
                },

                gtk::Spinner {
                    #[watch]
                    set_visible: model.loading,
                    #[watch]
                    set_spinning: model.loading,
                    set_halign: gtk::Align::Center,
                },

                gtk::Label {
                    set_label: "No posters match the filter.",
                    #[watch]
                    set_visible: !model.loading && model.displayed.is_empty(),
                    set_halign: gtk::Align::Center,
                    add_css_class: "dim-label",
                },

                #[local_ref]
                flowbox -> gtk::FlowBox {
                    set_selection_mode: gtk::SelectionMode::None,
                    set_homogeneous: true,
                    set_column_spacing: 8,
                    set_row_spacing: 8,
                    set_min_children_per_line: 1,
                    set_max_children_per_line: 3,
                    set_valign: gtk::Align::Start,
                },
            },
        }
    }

    async fn init(
        init: Self::Init,
        root: Self::Root,
        sender: AsyncComponentSender<Self>,
    ) -> AsyncComponentParts<Self> {
        let cards = FactoryVecDeque::builder()
            .launch(gtk::FlowBox::default())
            .forward(sender.input_sender(), |output| match output {
                PosterCardOutput::Toggle(index) => GalleryMsg::CardToggled(index.current_index()),
                PosterCardOutput::Edit(index) => GalleryMsg::EditRequested(index.current_index()),
            });

        let slots_grid = gtk::Grid::new();

        let input = sender.input_sender().clone();
        let debouncer = Debouncer::new(move |value| {
            let _ = input.send(GalleryMsg::FilterSettled(value));
        });

        let expansion = match &init.share_link {
            Some(link) => ExpansionState::from_share_link(link),
            None => ExpansionState::new(),
        };

        let mut model = Gallery {
            api: init.api.clone(),
            viewer: init.viewer,
            all: Vec::new(),
            displayed: Vec::new(),
            filter: FilterState::new(),
            debouncer,
            expansion,
            timezone: init.timezone,
            slots: Vec::new(),
            loading: true,
            cards,
            slots_grid: slots_grid.clone(),
            edit_dialog: None,
        };
        model.rebuild_slots();

        let flowbox = model.cards.widget();
        let widgets = view_output!();

        let api = init.api;
        let viewer = model.viewer.clone();
        sender.command(move |out, _| {
            Box::pin(async move {
                match api.all_submissions(viewer.as_ref()).await {
                    Ok(list) => out.send(GalleryCmd::Loaded(list)).unwrap(),
                    Err(e) => out.send(GalleryCmd::LoadFailed(e.to_string())).unwrap(),
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
            GalleryMsg::FilterInput(text) => {
                self.debouncer.push(text);
            }
            GalleryMsg::FilterSettled(query) => {
                self.filter.set_query(query);
                self.rebuild_cards();
            }
            GalleryMsg::CardToggled(index) => {
                self.expansion.toggle(index, &self.displayed);
                self.rebuild_cards();
            }
            GalleryMsg::EditRequested(index) => {
                self.open_edit_dialog(index, root, &sender);
            }
            GalleryMsg::EditSaved(update) => {
                self.edit_dialog = None;
                if let Some(submission) = self.all.iter_mut().find(|s| s.id == update.id) {
                    submission.urls = update.urls;
                    submission.available_slots = update.available_slots;
                }
                self.rebuild_cards();
                let _ = sender.output(GalleryOutput::Toast("Poster updated".to_string()));
            }
            GalleryMsg::EditFailed(error) => {
                let _ = sender.output(GalleryOutput::Toast(format!(
                    "Could not save poster: {error}"
                )));
            }
            GalleryMsg::EditCancelled => {
                self.edit_dialog = None;
            }
            GalleryMsg::TimezoneChanged(tz) => {
                self.timezone = tz;
                self.rebuild_slots();
            }
            GalleryMsg::CopyShareLink => {
                let link =
                    selection::with_share_id(config::SHARE_BASE_URL, self.expansion.share_id());
                root.clipboard().set_text(&link);
                let _ = sender.output(GalleryOutput::Toast("Link copied".to_string()));
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
            GalleryCmd::Loaded(list) => {
                self.loading = false;
                self.all = list;

                // expansion carried in from a share link still has no index;
                // once the rebuild resolves it, bring the card into view
                let from_link = self.expansion.expanded_index().is_none()
                    && self.expansion.share_id().is_some();
                self.rebuild_cards();
                if from_link && self.expansion.expanded_index().is_some() {
                    self.scroll_to_expanded(root);
                }
            }
            GalleryCmd::LoadFailed(error) => {
                self.loading = false;
                tracing::error!("Poster list fetch failed: {error}");
                let _ = sender.output(GalleryOutput::Toast("Could not load posters".to_string()));
            }
        }
    }
}

impl Gallery {
    fn rebuild_cards(&mut self) {
        self.displayed = self.filter.display(&self.all);
        self.expansion.rebind(&self.displayed);

        let mut guard = self.cards.guard();
        guard.clear();
        for (ind, submission) in self.displayed.iter().enumerate() {
            guard.push_back(PosterCardInit {
                submission: submission.clone(),
                expanded: self.expansion.is_expanded(ind),
                editable: submission.is_owned_by(self.viewer.as_ref()),
            });
        }
    }

    fn rebuild_slots(&mut self) {
        self.slots = timezone::project_slots(&POSTER_SLOTS_UTC, self.timezone);

        while let Some(child) = self.slots_grid.first_child() {
            self.slots_grid.remove(&child);
        }
        for (col, title) in ["Slot", "Date", "Time"].into_iter().enumerate() {
            let label = gtk::Label::new(Some(title));
            label.add_css_class("heading");
            self.slots_grid.attach(&label, col as i32, 0, 1, 1);
        }
        for (row, slot) in self.slots.iter().enumerate() {
            let number = gtk::Label::new(Some(&(row + 1).to_string()));
            let date = gtk::Label::new(Some(&slot.date));
            let hours = gtk::Label::new(Some(&slot.hours));
            date.set_halign(gtk::Align::Start);
            hours.set_halign(gtk::Align::Start);
            self.slots_grid.attach(&number, 0, row as i32 + 1, 1, 1);
            self.slots_grid.attach(&date, 1, row as i32 + 1, 1, 1);
            self.slots_grid.attach(&hours, 2, row as i32 + 1, 1, 1);
        }
    }

    /// Viewport position of the expanded card: poster area offset plus card
    /// offset, minus the header allowance. Deferred a tick so the rebuilt
    /// cards have an allocation.
    fn scroll_to_expanded(&self, root: &gtk::ScrolledWindow) {
        let Some(index) = self.expansion.expanded_index() else {
            return;
        };
        let flowbox = self.cards.widget().clone();
        let vadj = root.vadjustment();
        glib::timeout_add_local_once(std::time::Duration::from_millis(1), move || {
            if let Some(child) = flowbox.child_at_index(index as i32) {
                let offset = (flowbox.allocation().y() + child.allocation().y()) as f64;
                vadj.set_value((offset - SCROLL_HEADER_OFFSET).max(0.0));
            }
        });
    }

    fn open_edit_dialog(
        &mut self,
        index: usize,
        root: &gtk::ScrolledWindow,
        sender: &AsyncComponentSender<Self>,
    ) {
        let Some(submission) = self.displayed.get(index) else {
            return;
        };
        let slot_labels = self
            .slots
            .iter()
            .enumerate()
            .map(|(ind, slot)| format!("{}: {} {}", ind + 1, slot.date, slot.hours))
            .collect();

        let dialog = EditDialog::builder()
            .launch(EditDialogInit {
                api: self.api.clone(),
                submission: submission.clone(),
                slot_labels,
            })
            .forward(sender.input_sender(), |output| match output {
                EditDialogOutput::Saved(update) => GalleryMsg::EditSaved(update),
                EditDialogOutput::Failed(error) => GalleryMsg::EditFailed(error),
                EditDialogOutput::Cancelled => GalleryMsg::EditCancelled,
            });

        if let Some(window) = root.root().and_then(|r| r.downcast::<gtk::Window>().ok()) {
            dialog.widget().set_transient_for(Some(&window));
        }
        dialog.widget().present();
        self.edit_dialog = Some(dialog);
    }
}
