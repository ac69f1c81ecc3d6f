use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Viewer;

/// Length of the abstract excerpt shown on a collapsed poster card.
const PREVIEW_LEN: usize = 210;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub text: String,
    pub url: String,
}

/// A poster or abstract record as the backend serves it. The listing
/// endpoints key records by `id`, the abstract endpoints by
/// `submission_id`; both spellings land in [`Submission::id`].
///
/// Every field tolerates absence so a partially filled record still
/// renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(alias = "submission_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub talk_format: Option<String>,
    #[serde(default)]
    pub coauthors: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub starttime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub endtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub urls: Vec<ResourceLink>,
    /// 1-based indices into the fixed presentation slot list.
    #[serde(default)]
    pub available_slots: Vec<u32>,
}

impl Submission {
    /// Posters are keyed by their owner's uid, so a submission is editable
    /// exactly when its id matches the signed-in viewer.
    pub fn is_owned_by(&self, viewer: Option<&Viewer>) -> bool {
        viewer.is_some_and(|v| v.uid == self.id)
    }

    /// The lower-cased text the filter matches against.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title, self.abstract_text, self.fullname, self.institution
        )
        .to_lowercase()
    }

    /// Abstract excerpt for the collapsed card.
    pub fn abstract_preview(&self) -> String {
        if self.abstract_text.chars().count() <= PREVIEW_LEN {
            return self.abstract_text.clone();
        }
        let cut: String = self.abstract_text.chars().take(PREVIEW_LEN).collect();
        format!("{} ...", cut.trim_end())
    }

    pub fn resource_url(&self, key: &str) -> Option<&str> {
        self.urls
            .iter()
            .find(|link| link.text == key)
            .map(|link| link.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Payload of the owner-only update endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionUpdate {
    pub id: String,
    pub urls: Vec<ResourceLink>,
    pub available_slots: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_accepts_both_spellings() {
        let poster: Submission = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(poster.id, "abc");

        let item: Submission = serde_json::from_str(r#"{"submission_id": "xyz"}"#).unwrap();
        assert_eq!(item.id, "xyz");
    }

    #[test]
    fn test_missing_fields_default() {
        let s: Submission = serde_json::from_str(r#"{"id": "a", "title": "Neural coding"}"#).unwrap();
        assert_eq!(s.title, "Neural coding");
        assert!(s.abstract_text.is_empty());
        assert!(s.urls.is_empty());
        assert!(s.starttime.is_none());
        assert!(s.available_slots.is_empty());
    }

    #[test]
    fn test_ownership_rule() {
        let s = Submission {
            id: "uid-1".to_string(),
            ..Submission::default()
        };
        let viewer = Viewer {
            uid: "uid-1".to_string(),
        };
        let other = Viewer {
            uid: "uid-2".to_string(),
        };
        assert!(s.is_owned_by(Some(&viewer)));
        assert!(!s.is_owned_by(Some(&other)));
        assert!(!s.is_owned_by(None));
    }

    #[test]
    fn test_abstract_preview_truncates() {
        let short = Submission {
            abstract_text: "brief".to_string(),
            ..Submission::default()
        };
        assert_eq!(short.abstract_preview(), "brief");

        let long = Submission {
            abstract_text: "x".repeat(500),
            ..Submission::default()
        };
        let preview = long.abstract_preview();
        assert!(preview.ends_with(" ..."));
        assert_eq!(preview.chars().count(), PREVIEW_LEN + 4);
    }

    #[test]
    fn test_resource_url_skips_empty() {
        let s = Submission {
            urls: vec![
                ResourceLink {
                    text: "discussion".to_string(),
                    url: "https://example.org/room".to_string(),
                },
                ResourceLink {
                    text: "slides".to_string(),
                    url: String::new(),
                },
            ],
            ..Submission::default()
        };
        assert_eq!(s.resource_url("discussion"), Some("https://example.org/room"));
        assert_eq!(s.resource_url("slides"), None);
        assert_eq!(s.resource_url("recordedTalk"), None);
    }
}
