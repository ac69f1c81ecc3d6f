use crate::models::Submission;

/// Submissions whose searchable text (title, abstract, author, institution)
/// contains `query` as a case-insensitive substring, in list order.
///
/// An empty query returns an empty Vec, the "no active filter" sentinel the
/// gallery inherited from the web client. Callers that want fall-back-to-all
/// semantics go through [`FilterState::display`] instead of inspecting the
/// result length.
pub fn filter_submissions(list: &[Submission], query: &str) -> Vec<Submission> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    list.iter()
        .filter(|s| s.searchable_text().contains(&needle))
        .cloned()
        .collect()
}

/// Current filter query plus the explicit "is a filter active" flag that
/// disambiguates an empty result from an empty query.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// The list to display: the filtered subset while a filter is active,
    /// the full list otherwise.
    pub fn display(&self, all: &[Submission]) -> Vec<Submission> {
        if self.is_active() {
            filter_submissions(all, &self.query)
        } else {
            all.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(id: &str, title: &str) -> Submission {
        Submission {
            id: id.to_string(),
            title: title.to_string(),
            ..Submission::default()
        }
    }

    fn sample() -> Vec<Submission> {
        vec![
            submission("a", "Neural coding"),
            submission("b", "Synaptic plasticity"),
        ]
    }

    #[test]
    fn test_matches_by_title_substring() {
        let result = filter_submissions(&sample(), "neural");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
    }

    #[test]
    fn test_empty_query_is_sentinel() {
        assert!(filter_submissions(&sample(), "").is_empty());
        assert!(filter_submissions(&[], "").is_empty());
    }

    #[test]
    fn test_sound_and_complete() {
        let mut list = sample();
        list.push(Submission {
            id: "c".to_string(),
            title: "Decision making".to_string(),
            institution: "Neuro Institute".to_string(),
            ..Submission::default()
        });

        let query = "neur";
        let result = filter_submissions(&list, query);

        // every hit really matches, every match is a hit
        for hit in &result {
            assert!(hit.searchable_text().contains(query));
        }
        for s in &list {
            let in_result = result.iter().any(|r| r.id == s.id);
            assert_eq!(in_result, s.searchable_text().contains(query));
        }
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_case_insensitive_across_fields() {
        let list = vec![Submission {
            id: "a".to_string(),
            fullname: "Ada Lovelace".to_string(),
            institution: "Analytical Engine Lab".to_string(),
            abstract_text: "On computable operations".to_string(),
            ..Submission::default()
        }];
        assert_eq!(filter_submissions(&list, "LOVELACE").len(), 1);
        assert_eq!(filter_submissions(&list, "engine lab").len(), 1);
        assert_eq!(filter_submissions(&list, "computable").len(), 1);
        assert!(filter_submissions(&list, "babbage").is_empty());
    }

    #[test]
    fn test_preserves_list_order() {
        let list = vec![
            submission("1", "neural nets"),
            submission("2", "other"),
            submission("3", "neural fields"),
        ];
        let result = filter_submissions(&list, "neural");
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn test_display_falls_back_when_inactive() {
        let list = sample();
        let mut state = FilterState::new();
        assert!(!state.is_active());
        assert_eq!(state.display(&list).len(), 2);

        state.set_query("synaptic");
        assert!(state.is_active());
        let shown = state.display(&list);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "b");

        // a query without matches is distinguishable from no query
        state.set_query("quantum");
        assert!(state.is_active());
        assert!(state.display(&list).is_empty());
    }
}
