use chrono_tz::Tz;
use gtk::prelude::*;
use relm4::prelude::*;

use crate::services::timezone;

/// Header-bar dropdown over the IANA zone list. Underscores in zone names
/// are shown as spaces; the search matches the displayed form.
pub struct TimezoneSelector {
    zones: Vec<&'static str>,
    current: Tz,
    dropdown: gtk::DropDown,
}

#[derive(Debug)]
pub enum TimezoneSelectorMsg {
    Changed(u32),
    /// Programmatic sync, e.g. after the persisted settings load.
    SetZone(Tz),
}

#[derive(Debug)]
pub enum TimezoneSelectorOutput {
    ZoneSelected(Tz),
}

#[relm4::component(pub)]
impl Component for TimezoneSelector {
    type Init = Tz;
    type Input = TimezoneSelectorMsg;
    type Output = TimezoneSelectorOutput;
    type CommandOutput = ();

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Horizontal,

            #[local_ref]
            dropdown -> gtk::DropDown {},
        }
    }

    fn init(
        initial: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let zones = timezone::selectable_zones();
        let labels: Vec<String> = zones.iter().map(|name| name.replace('_', " ")).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();

        let dropdown = gtk::DropDown::from_strings(&label_refs);
        dropdown.set_tooltip_text(Some("Display timezone"));
        dropdown.set_enable_search(true);
        dropdown.set_expression(Some(&gtk::PropertyExpression::new(
            gtk::StringObject::static_type(),
            gtk::Expression::NONE,
            "string",
        )));
        dropdown.add_css_class("flat");

        if let Some(pos) = zones.iter().position(|name| *name == initial.name()) {
            dropdown.set_selected(pos as u32);
        }

        let model = Self {
            zones,
            current: initial,
            dropdown: dropdown.clone(),
        };

        let widgets = view_output!();

        let sender_dd = sender.clone();
        dropdown.connect_selected_notify(move |dd| {
            sender_dd.input(TimezoneSelectorMsg::Changed(dd.selected()));
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            TimezoneSelectorMsg::Changed(index) => {
                let Some(tz) = self
                    .zones
                    .get(index as usize)
                    .and_then(|name| timezone::parse_timezone(name))
                else {
                    return;
                };
                // set_selected echoes back through selected-notify; only a
                // genuine change leaves the component
                if tz == self.current {
                    return;
                }
                self.current = tz;
                let _ = sender.output(TimezoneSelectorOutput::ZoneSelected(tz));
            }
            TimezoneSelectorMsg::SetZone(tz) => {
                self.current = tz;
                if let Some(pos) = self.zones.iter().position(|name| *name == tz.name()) {
                    self.dropdown.set_selected(pos as u32);
                }
            }
        }
    }
}
