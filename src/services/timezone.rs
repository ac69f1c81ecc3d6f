use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Poster presentation slots, UTC, in session order. Slot numbers shown in
/// the UI are 1-based indices into this list.
pub const POSTER_SLOTS_UTC: [&str; 8] = [
    "2020-05-26 00:00:00",
    "2020-05-26 01:00:00",
    "2020-05-26 09:00:00",
    "2020-05-26 10:00:00",
    "2020-05-27 00:00:00",
    "2020-05-27 01:00:00",
    "2020-05-27 09:00:00",
    "2020-05-27 10:00:00",
];

const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One slot rendered for a particular timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDisplay {
    /// e.g. "Tue, May 26, 2020"
    pub date: String,
    /// e.g. "8 - 9 PM"; every slot is one hour long
    pub hours: String,
}

/// Project UTC slot timestamps into `tz` for display. Pure; projecting the
/// same inputs twice yields identical strings. Unparseable entries are
/// skipped.
pub fn project_slots(slots: &[&str], tz: Tz) -> Vec<SlotDisplay> {
    slots.iter().filter_map(|slot| project_slot(slot, tz)).collect()
}

fn project_slot(slot: &str, tz: Tz) -> Option<SlotDisplay> {
    let naive = NaiveDateTime::parse_from_str(slot, SLOT_FORMAT).ok()?;
    let start = naive.and_utc().with_timezone(&tz);
    let end = start + Duration::hours(1);
    Some(SlotDisplay {
        date: start.format("%a, %b %-d, %Y").to_string(),
        hours: format!("{} - {}", start.format("%-I"), end.format("%-I %p")),
    })
}

/// A single timestamp rendered in `tz`, e.g. "Mon, Oct 26, 2020 8:00 PM".
pub fn format_in_zone(dt: &DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%a, %b %-d, %Y %-I:%M %p").to_string()
}

/// Parse an IANA zone name. `None` means the name is not a valid zone and
/// must not take effect; callers keep their previous value.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse().ok()
}

/// Best guess at the viewer's zone, the desktop stand-in for the browser's
/// detected timezone: the `TZ` environment variable when it names a valid
/// zone, otherwise a representative zone for the current UTC offset,
/// otherwise UTC.
pub fn detect_timezone() -> Tz {
    if let Ok(name) = std::env::var("TZ") {
        if let Some(tz) = parse_timezone(&name) {
            return tz;
        }
    }

    let offset_hours = chrono::Local::now().offset().local_minus_utc() / 3600;
    let guess = match offset_hours {
        -8 => "America/Los_Angeles",
        -7 => "America/Denver",
        -6 => "America/Chicago",
        -5 => "America/New_York",
        -4 => "America/Halifax",
        0 => "Europe/London",
        1 => "Europe/Paris",
        2 => "Europe/Helsinki",
        3 => "Europe/Moscow",
        8 => "Asia/Shanghai",
        9 => "Asia/Tokyo",
        _ => "UTC",
    };
    parse_timezone(guess).unwrap_or(Tz::UTC)
}

/// Zone names offered for selection: the proper Area/Location names, in
/// library order. The UI shows underscores as spaces.
pub fn selectable_zones() -> Vec<&'static str> {
    chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| tz.name())
        .filter(|name| name.contains('/'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_is_idempotent() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let first = project_slots(&POSTER_SLOTS_UTC, tz);
        let second = project_slots(&POSTER_SLOTS_UTC, tz);
        assert_eq!(first, second);
        assert_eq!(first.len(), POSTER_SLOTS_UTC.len());
    }

    #[test]
    fn test_new_york_observes_daylight_saving() {
        // 2020-05-26 00:00 UTC is the evening before in New York (EDT, UTC-4)
        let tz = parse_timezone("America/New_York").unwrap();
        let slots = project_slots(&POSTER_SLOTS_UTC, tz);
        assert_eq!(slots[0].date, "Mon, May 25, 2020");
        assert_eq!(slots[0].hours, "8 - 9 PM");
    }

    #[test]
    fn test_utc_projection_matches_source() {
        let slots = project_slots(&POSTER_SLOTS_UTC, Tz::UTC);
        assert_eq!(slots[0].date, "Tue, May 26, 2020");
        assert_eq!(slots[0].hours, "12 - 1 AM");
        assert_eq!(slots[2].hours, "9 - 10 AM");
    }

    #[test]
    fn test_unparseable_slots_are_skipped() {
        let slots = project_slots(&["2020-05-26 00:00:00", "yesterday"], Tz::UTC);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_invalid_zone_does_not_parse() {
        assert!(parse_timezone("America/New_York").is_some());
        assert!(parse_timezone("Mars/Olympus_Mons").is_none());
        assert!(parse_timezone("").is_none());
    }

    #[test]
    fn test_format_in_zone() {
        let dt: DateTime<Utc> = "2020-10-26T00:00:00Z".parse().unwrap();
        let tz = parse_timezone("America/New_York").unwrap();
        assert_eq!(format_in_zone(&dt, tz), "Sun, Oct 25, 2020 8:00 PM");
        // same instant, same zone, same string
        assert_eq!(format_in_zone(&dt, tz), format_in_zone(&dt, tz));
    }

    #[test]
    fn test_selectable_zones_are_area_location_names() {
        let zones = selectable_zones();
        assert!(zones.contains(&"America/New_York"));
        assert!(zones.iter().all(|name| name.contains('/')));
    }
}
