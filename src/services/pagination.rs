use crate::models::Submission;
use crate::services::api::SubmissionPage;

/// Every abstract row renders at this height so the scrolled list stays
/// cheap regardless of list length.
pub const ROW_HEIGHT: i32 = 125;

/// A request for one page of the listing, tagged with a monotonically
/// increasing sequence number so late responses can be told apart from
/// current ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    /// Link from the previous page's envelope; `None` fetches page one.
    pub next: Option<String>,
    pub query: String,
}

/// Incrementally loaded submission listing.
///
/// The loaded list only ever grows within one listing; `restart` begins a
/// new listing and implicitly invalidates whatever was still in flight.
/// Page responses resolve in any order; only the response matching the most
/// recently issued request is applied, the rest are discarded on arrival
/// (never cancelled).
#[derive(Debug, Default)]
pub struct PageLoader {
    items: Vec<Submission>,
    current_page: u32,
    total_page: u32,
    next: Option<String>,
    query: String,
    in_flight: Option<u64>,
    last_seq: u64,
}

impl PageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Submission] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_page
    }

    /// True iff the row at `index` is within the loaded range. Once the
    /// final page is in, every index counts as loaded.
    pub fn is_row_loaded(&self, index: usize) -> bool {
        !self.has_more() || index < self.items.len()
    }

    /// Loaded rows plus one placeholder row while more pages remain.
    pub fn row_count(&self) -> usize {
        self.items.len() + usize::from(self.has_more())
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Begin a fresh listing for `query`, discarding loaded pages. The
    /// returned request is for page one; any response still in flight for
    /// the previous listing is now stale.
    pub fn restart(&mut self, query: &str) -> PageRequest {
        self.items.clear();
        self.current_page = 0;
        self.total_page = 0;
        self.next = None;
        self.query = query.to_string();
        self.issue(None)
    }

    /// Request the next page. Returns `None` (a no-op) while a fetch is
    /// already in flight or when every page is loaded.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more() {
            return None;
        }
        let next = self.next.clone();
        Some(self.issue(next))
    }

    fn issue(&mut self, next: Option<String>) -> PageRequest {
        self.last_seq += 1;
        self.in_flight = Some(self.last_seq);
        PageRequest {
            seq: self.last_seq,
            next,
            query: self.query.clone(),
        }
    }

    /// Apply a page response. Returns false when the response does not
    /// belong to the latest issued request and was discarded.
    pub fn complete(&mut self, seq: u64, page: SubmissionPage) -> bool {
        if self.in_flight != Some(seq) {
            return false;
        }
        self.in_flight = None;
        self.items.extend(page.data);
        self.current_page = page.meta.current_page;
        self.total_page = page.meta.total_page;
        self.next = page.links.next;
        true
    }

    /// A failed fetch clears the in-flight mark so scrolling can retry.
    pub fn fail(&mut self, seq: u64) {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::{PageLinks, PageMeta};

    fn page(count: usize, current_page: u32, total_page: u32) -> SubmissionPage {
        SubmissionPage {
            data: (0..count)
                .map(|i| Submission {
                    id: format!("p{current_page}-{i}"),
                    ..Submission::default()
                })
                .collect(),
            meta: PageMeta {
                current_page,
                total_page,
            },
            links: PageLinks {
                next: (current_page < total_page)
                    .then(|| format!("/api/abstract?page={}", current_page + 1)),
            },
        }
    }

    #[test]
    fn test_row_loaded_window() {
        let mut loader = PageLoader::new();
        let req = loader.restart("");
        assert!(loader.complete(req.seq, page(10, 1, 3)));

        assert!(loader.has_more());
        assert!(loader.is_row_loaded(5));
        assert!(!loader.is_row_loaded(10));
        assert_eq!(loader.row_count(), 11);

        // final page: everything counts as loaded, placeholder row gone
        let req = loader.load_more().unwrap();
        assert!(loader.complete(req.seq, page(4, 3, 3)));
        assert!(!loader.has_more());
        assert!(loader.is_row_loaded(100));
        assert_eq!(loader.row_count(), 14);
    }

    #[test]
    fn test_load_more_is_not_reentrant() {
        let mut loader = PageLoader::new();
        let req = loader.restart("");
        assert!(loader.complete(req.seq, page(10, 1, 2)));

        let first = loader.load_more().expect("one request per flight");
        assert!(loader.load_more().is_none());

        assert!(loader.complete(first.seq, page(10, 2, 2)));
        assert_eq!(loader.items().len(), 20);
        assert!(loader.load_more().is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut loader = PageLoader::new();
        let old = loader.restart("neural");

        // the user retyped before the first response arrived
        let new = loader.restart("synaptic");
        assert!(new.seq > old.seq);

        assert!(!loader.complete(old.seq, page(10, 1, 5)));
        assert!(loader.items().is_empty());

        assert!(loader.complete(new.seq, page(3, 1, 1)));
        assert_eq!(loader.items().len(), 3);
        assert!(!loader.has_more());
    }

    #[test]
    fn test_duplicate_response_is_discarded() {
        let mut loader = PageLoader::new();
        let req = loader.restart("");
        assert!(loader.complete(req.seq, page(5, 1, 2)));
        assert!(!loader.complete(req.seq, page(5, 1, 2)));
        assert_eq!(loader.items().len(), 5);
    }

    #[test]
    fn test_failure_allows_retry() {
        let mut loader = PageLoader::new();
        let req = loader.restart("");
        assert!(loader.complete(req.seq, page(10, 1, 2)));

        let req = loader.load_more().unwrap();
        loader.fail(req.seq);
        assert!(!loader.is_loading());

        let retry = loader.load_more().expect("retry after failure");
        assert_eq!(retry.next.as_deref(), Some("/api/abstract?page=2"));
    }

    #[test]
    fn test_requests_carry_the_query() {
        let mut loader = PageLoader::new();
        let req = loader.restart("plasticity");
        assert_eq!(req.query, "plasticity");
        assert!(req.next.is_none());

        assert!(loader.complete(req.seq, page(10, 1, 2)));
        let more = loader.load_more().unwrap();
        assert_eq!(more.query, "plasticity");
        assert_eq!(more.next.as_deref(), Some("/api/abstract?page=2"));
    }
}
