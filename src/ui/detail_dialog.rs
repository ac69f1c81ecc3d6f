use adw::prelude::*;
use chrono_tz::Tz;
use relm4::prelude::*;

use crate::models::Submission;
use crate::services::timezone;

/// Modal with the full record behind one abstract row: authors, talk
/// format, presentation time in the chosen zone, and the complete abstract.
pub struct DetailDialog {
    submission: Submission,
    timezone: Tz,
}

pub struct DetailDialogInit {
    pub submission: Submission,
    pub timezone: Tz,
}

#[relm4::component(pub)]
impl Component for DetailDialog {
    type Init = DetailDialogInit;
    type Input = ();
    type Output = ();
    type CommandOutput = ();

    view! {
        adw::Window {
            set_title: Some("Abstract"),
            set_default_width: 560,
            set_default_height: 520,
            set_modal: true,

            adw::ToolbarView {
                add_top_bar = &adw::HeaderBar {},

                #[wrap(Some)]
                set_content = &gtk::ScrolledWindow {
                    set_hscrollbar_policy: gtk::PolicyType::Never,
                    set_vexpand: true,

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 8,
                        set_margin_all: 16,

                        gtk::Label {
                            set_label: &model.submission.title,
                            set_wrap: true,
                            set_halign: gtk::Align::Start,
                            set_xalign: 0.0,
                            add_css_class: "title-3",
                        },

                        gtk::Label {
                            set_label: &model.authors_line(),
                            set_wrap: true,
                            set_halign: gtk::Align::Start,
                            set_xalign: 0.0,
                            add_css_class: "dim-label",
                        },

                        gtk::Label {
                            set_label: &model.submission.institution,
                            set_visible: !model.submission.institution.is_empty(),
                            set_halign: gtk::Align::Start,
                            set_xalign: 0.0,
                            add_css_class: "dim-label",
                            add_css_class: "caption",
                        },

                        gtk::Label {
                            set_label: &model.session_line(),
                            set_visible: !model.session_line().is_empty(),
                            set_halign: gtk::Align::Start,
                            set_xalign: 0.0,
                            add_css_class: "caption",
                        },

                        gtk::Separator {
                            set_orientation: gtk::Orientation::Horizontal,
                        },

                        gtk::Label {
                            set_label: &model.submission.abstract_text,
                            set_wrap: true,
                            set_selectable: true,
                            set_halign: gtk::Align::Start,
                            set_xalign: 0.0,
                        },
                    },
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        _sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = Self {
            submission: init.submission,
            timezone: init.timezone,
        };
        let widgets = view_output!();
        ComponentParts { model, widgets }
    }

    fn update(&mut self, _msg: Self::Input, _sender: ComponentSender<Self>, _root: &Self::Root) {}
}

impl DetailDialog {
    fn authors_line(&self) -> String {
        match self.submission.coauthors.as_deref().filter(|c| !c.is_empty()) {
            Some(coauthors) => format!("{}, {}", self.submission.fullname, coauthors),
            None => self.submission.fullname.clone(),
        }
    }

    /// Talk format plus the presentation window projected into the chosen
    /// zone; empty when the record carries no time.
    fn session_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(format) = self.submission.talk_format.as_deref().filter(|f| !f.is_empty()) {
            parts.push(format.to_string());
        }
        if let Some(start) = &self.submission.starttime {
            let mut when = timezone::format_in_zone(start, self.timezone);
            if let Some(end) = &self.submission.endtime {
                when = format!("{} – {}", when, timezone::format_in_zone(end, self.timezone));
            }
            parts.push(when);
        }
        parts.join(" · ")
    }
}
