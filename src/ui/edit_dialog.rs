use std::sync::Arc;

use adw::prelude::*;
use relm4::prelude::*;

use crate::models::{ResourceLink, Submission, SubmissionUpdate};
use crate::services::SubmissionApi;

// Field keys as the backend stores them.
const URL_FIELDS: [(&str, &str); 3] = [
    ("discussion", "Live discussion"),
    ("slides", "Slides"),
    ("recordedTalk", "Recorded talk"),
];

/// Owner-only form for a poster's resource links and active slots. The
/// update is pushed to the backend first; local state leaves this dialog
/// only after the backend accepted it.
pub struct EditDialog {
    api: Arc<dyn SubmissionApi>,
    submission_id: String,
    url_entries: Vec<(String, gtk::Entry)>,
    slot_checks: Vec<gtk::CheckButton>,
    sending: bool,
}

pub struct EditDialogInit {
    pub api: Arc<dyn SubmissionApi>,
    pub submission: Submission,
    /// One label per presentation slot, already projected to the viewer's
    /// timezone.
    pub slot_labels: Vec<String>,
}

#[derive(Debug)]
pub enum EditDialogMsg {
    Save,
    Cancel,
}

#[derive(Debug)]
pub enum EditDialogCmd {
    Saved(SubmissionUpdate),
    Failed(String),
}

#[derive(Debug)]
pub enum EditDialogOutput {
    /// The backend accepted the update; apply it locally.
    Saved(SubmissionUpdate),
    Failed(String),
    Cancelled,
}

#[relm4::component(pub, async)]
impl AsyncComponent for EditDialog {
    type Init = EditDialogInit;
    type Input = EditDialogMsg;
    type Output = EditDialogOutput;
    type CommandOutput = EditDialogCmd;

    view! {
        adw::Window {
            set_title: Some("Edit poster information"),
            set_default_width: 420,
            set_modal: true,

            adw::ToolbarView {
                add_top_bar = &adw::HeaderBar {
                    pack_start = &gtk::Button {
                        set_label: "Cancel",
                        connect_clicked => EditDialogMsg::Cancel,
                    },
                    pack_end = &gtk::Button {
                        #[watch]
                        set_label: if model.sending { "Sending…" } else { "Save" },
                        #[watch]
                        set_sensitive: !model.sending,
                        add_css_class: "suggested-action",
                        connect_clicked => EditDialogMsg::Save,
                    },
                },

                #[wrap(Some)]
                set_content = &gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    set_spacing: 12,
                    set_margin_all: 16,

                    gtk::Label {
                        set_label: "Edit information for your poster here.",
                        set_halign: gtk::Align::Start,
                        add_css_class: "dim-label",
                    },

                    #[name = "fields_box"]
                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 8,
                    },

                    gtk::Label {
                        set_label: "Active slots",
                        set_halign: gtk::Align::Start,
                        add_css_class: "heading",
                    },

                    #[name = "slots_box"]
                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 4,
                    },
                },
            },
        }
    }

    async fn init(
        init: Self::Init,
        root: Self::Root,
        sender: AsyncComponentSender<Self>,
    ) -> AsyncComponentParts<Self> {
        let mut url_entries = Vec::new();
        for (key, _label) in URL_FIELDS {
            let entry = gtk::Entry::builder()
                .placeholder_text(format!("{} URL", heading_for(key)))
                .build();
            if let Some(url) = init.submission.resource_url(key) {
                entry.set_text(url);
            }
            url_entries.push((key.to_string(), entry));
        }

        let mut slot_checks = Vec::new();
        for (ind, label) in init.slot_labels.iter().enumerate() {
            let check = gtk::CheckButton::with_label(label);
            check.set_active(init.submission.available_slots.contains(&(ind as u32 + 1)));
            slot_checks.push(check);
        }

        let model = Self {
            api: init.api,
            submission_id: init.submission.id.clone(),
            url_entries,
            slot_checks,
            sending: false,
        };

        let widgets = view_output!();

        for ((_, entry), (_, label)) in model.url_entries.iter().zip(URL_FIELDS) {
            let block = gtk::Box::new(gtk::Orientation::Vertical, 2);
            let caption = gtk::Label::builder()
                .label(label)
                .halign(gtk::Align::Start)
                .build();
            caption.add_css_class("caption-heading");
            block.append(&caption);
            block.append(entry);
            widgets.fields_box.append(&block);
        }
        for check in &model.slot_checks {
            widgets.slots_box.append(check);
        }

        AsyncComponentParts { model, widgets }
    }

    async fn update(
        &mut self,
        msg: Self::Input,
        sender: AsyncComponentSender<Self>,
        root: &Self::Root,
    ) {
        match msg {
            EditDialogMsg::Save => {
                if self.sending {
                    return;
                }
                self.sending = true;

                let update = self.collect_update();
                let api = self.api.clone();
                sender.command(move |out, _| {
                    Box::pin(async move {
                        match api.update_submission(&update).await {
                            Ok(()) => out.send(EditDialogCmd::Saved(update)).unwrap(),
                            Err(e) => out.send(EditDialogCmd::Failed(e.to_string())).unwrap(),
                        }
                    })
                });
            }
            EditDialogMsg::Cancel => {
                let _ = sender.output(EditDialogOutput::Cancelled);
                root.close();
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
            EditDialogCmd::Saved(update) => {
                self.sending = false;
                let _ = sender.output(EditDialogOutput::Saved(update));
                root.close();
            }
            EditDialogCmd::Failed(error) => {
                // keep the dialog (and the typed values) so the user can retry
                self.sending = false;
                tracing::warn!("Poster update rejected: {error}");
                let _ = sender.output(EditDialogOutput::Failed(error));
            }
        }
    }
}

impl EditDialog {
    fn collect_update(&self) -> SubmissionUpdate {
        let urls = self
            .url_entries
            .iter()
            .map(|(key, entry)| ResourceLink {
                text: key.clone(),
                url: entry.text().to_string(),
            })
            .collect();

        let available_slots = self
            .slot_checks
            .iter()
            .enumerate()
            .filter(|(_, check)| check.is_active())
            .map(|(ind, _)| ind as u32 + 1)
            .collect();

        SubmissionUpdate {
            id: self.submission_id.clone(),
            urls,
            available_slots,
        }
    }
}

fn heading_for(key: &str) -> &'static str {
    URL_FIELDS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or("Resource")
}
