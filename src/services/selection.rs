use url::Url;

use crate::models::Submission;

/// Query parameter of a share link carrying the expanded submission.
pub const SHARE_PARAM: &str = "id";

/// Which single entry of the displayed list, if any, is expanded.
///
/// The index is what the view renders; the identifier is what survives:
/// it mirrors the share link's `id` parameter, and on every list change
/// the index is re-derived from it because indices are not stable across
/// reloads while identifiers are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: Option<usize>,
    share_id: Option<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state carried in from a share link; the index is resolved by
    /// the first `rebind` once the list arrives.
    pub fn from_share_link(link: &str) -> Self {
        Self {
            expanded: None,
            share_id: share_link_id(link),
        }
    }

    pub fn expanded_index(&self) -> Option<usize> {
        self.expanded
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    pub fn share_id(&self) -> Option<&str> {
        self.share_id.as_deref()
    }

    /// Expand the entry with this identifier (no entry if it is absent from
    /// the list) and record the identifier for the share link.
    pub fn select(&mut self, id: &str, list: &[Submission]) {
        self.expanded = list.iter().position(|s| s.id == id);
        self.share_id = Some(id.to_string());
    }

    /// Clicking an already-expanded entry collapses it; clicking a
    /// different entry moves the expansion there.
    pub fn toggle(&mut self, index: usize, list: &[Submission]) {
        if self.expanded == Some(index) {
            self.clear();
        } else if let Some(submission) = list.get(index) {
            let id = submission.id.clone();
            self.select(&id, list);
        }
    }

    pub fn clear(&mut self) {
        self.expanded = None;
        self.share_id = None;
    }

    /// Re-derive the index from the recorded identifier after the list
    /// changed. A vanished identifier resets the whole state.
    pub fn rebind(&mut self, list: &[Submission]) {
        let found = self
            .share_id
            .as_deref()
            .and_then(|id| list.iter().position(|s| s.id == id));
        match found {
            Some(index) => self.expanded = Some(index),
            None => self.clear(),
        }
    }
}

/// The `id` parameter of a share link, if present and non-empty.
pub fn share_link_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == SHARE_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Rewrite `link` so its `id` parameter matches the given identifier
/// (removed entirely when `None`). Other query parameters are kept.
pub fn with_share_id(link: &str, id: Option<&str>) -> String {
    let Ok(mut url) = Url::parse(link) else {
        return link.to_string();
    };
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SHARE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        if let Some(id) = id {
            pairs.append_pair(SHARE_PARAM, id);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(id: &str) -> Submission {
        Submission {
            id: id.to_string(),
            ..Submission::default()
        }
    }

    fn list() -> Vec<Submission> {
        vec![submission("a"), submission("b"), submission("c")]
    }

    #[test]
    fn test_select_round_trip() {
        let list = list();
        let mut state = ExpansionState::new();

        state.select("b", &list);
        assert_eq!(state.expanded_index(), Some(1));
        assert_eq!(state.share_id(), Some("b"));

        // the share parameter reads back exactly what was selected
        let link = with_share_id("https://example.org/posters", state.share_id());
        assert_eq!(share_link_id(&link).as_deref(), Some("b"));
    }

    #[test]
    fn test_select_absent_id_keeps_parameter() {
        let list = list();
        let mut state = ExpansionState::new();
        state.select("zz", &list);
        assert_eq!(state.expanded_index(), None);
        assert_eq!(state.share_id(), Some("zz"));
    }

    #[test]
    fn test_toggle_collapses_and_replaces() {
        let list = list();
        let mut state = ExpansionState::new();

        state.toggle(0, &list);
        assert!(state.is_expanded(0));
        assert_eq!(state.share_id(), Some("a"));

        // a different entry replaces the target
        state.toggle(2, &list);
        assert!(state.is_expanded(2));
        assert_eq!(state.share_id(), Some("c"));

        // the same entry collapses and clears the parameter
        state.toggle(2, &list);
        assert_eq!(state.expanded_index(), None);
        assert_eq!(state.share_id(), None);
    }

    #[test]
    fn test_rebind_follows_identifier_not_index() {
        let mut state = ExpansionState::new();
        state.select("c", &list());
        assert_eq!(state.expanded_index(), Some(2));

        // reloaded list puts "c" elsewhere
        let reloaded = vec![submission("c"), submission("a")];
        state.rebind(&reloaded);
        assert_eq!(state.expanded_index(), Some(0));
        assert_eq!(state.share_id(), Some("c"));
    }

    #[test]
    fn test_rebind_resets_when_identifier_vanishes() {
        let mut state = ExpansionState::new();
        state.select("b", &list());

        let reloaded = vec![submission("x"), submission("y")];
        state.rebind(&reloaded);
        assert_eq!(state, ExpansionState::new());
    }

    #[test]
    fn test_from_share_link() {
        let state = ExpansionState::from_share_link("https://example.org/posters?id=abc");
        assert_eq!(state.share_id(), Some("abc"));
        assert_eq!(state.expanded_index(), None);

        let none = ExpansionState::from_share_link("https://example.org/posters");
        assert_eq!(none.share_id(), None);

        let garbage = ExpansionState::from_share_link("not a url");
        assert_eq!(garbage.share_id(), None);
    }

    #[test]
    fn test_with_share_id_rewrites_parameter() {
        let added = with_share_id("https://example.org/posters?tab=all", Some("s1"));
        assert_eq!(added, "https://example.org/posters?tab=all&id=s1");

        let replaced = with_share_id(&added, Some("s2"));
        assert_eq!(share_link_id(&replaced).as_deref(), Some("s2"));

        let cleared = with_share_id(&replaced, None);
        assert_eq!(share_link_id(&cleared), None);
        assert!(cleared.contains("tab=all"));

        let bare = with_share_id("https://example.org/posters?id=s1", None);
        assert_eq!(bare, "https://example.org/posters");
    }
}
