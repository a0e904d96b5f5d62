use evx_models::{Event, EventCategory};

use crate::requests::{RequestSeq, RequestToken};

/// Category predicate with the "all" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EventCategory),
}

impl CategoryFilter {
    fn matches(&self, event: &Event) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => event.category == *category,
        }
    }
}

/// Free-text + category predicate over the event catalog.
///
/// The same predicate runs whether the server pre-filtered or not, so the
/// visible result set for given inputs is deterministic either way.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub search: String,
    pub category: CategoryFilter,
}

impl EventFilter {
    /// An event is shown iff the search text matches (case-insensitive
    /// substring of title, description, or location, any of the three) AND
    /// the category matches. An empty search term matches everything.
    pub fn matches(&self, event: &Event) -> bool {
        self.matches_search(event) && self.category.matches(event)
    }

    fn matches_search(&self, event: &Event) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        [&event.title, &event.description, &event.location]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

/// View state for the event list: the fetched catalog, the active filter,
/// and a freshness guard so rapid repeated searches cannot leave older
/// results on screen.
#[derive(Debug, Default)]
pub struct CatalogBrowser {
    events: Vec<Event>,
    pub filter: EventFilter,
    refreshes: RequestSeq,
}

impl CatalogBrowser {
    pub fn new(filter: EventFilter) -> CatalogBrowser {
        CatalogBrowser {
            filter,
            ..CatalogBrowser::default()
        }
    }

    pub fn begin_refresh(&mut self) -> RequestToken {
        self.refreshes.begin()
    }

    /// Install fetched results. Returns false, dropping the payload, when a
    /// newer refresh was issued after this one.
    pub fn apply(&mut self, token: RequestToken, events: Vec<Event>) -> bool {
        if !self.refreshes.is_current(token) {
            return false;
        }
        self.events = events;
        true
    }

    /// The events that pass the active filter.
    pub fn visible(&self) -> Vec<&Event> {
        self.filter.apply(&self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(title: &str, description: &str, location: &str, category: EventCategory) -> Event {
        Event {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.into(),
            description: description.into(),
            date: Utc.with_ymd_and_hms(2025, 7, 1, 19, 0, 0).unwrap(),
            time: None,
            location: location.into(),
            category,
            price: 20.0,
            total_seats: 50,
            available_seats: 50,
            seats: None,
            image: None,
        }
    }

    fn catalog() -> Vec<Event> {
        vec![
            event("Jazz Night", "Live quartet", "Blue Hall", EventCategory::Concert),
            event("Jazz Workshop", "Improv basics", "Studio 4", EventCategory::Workshop),
            event("City Marathon", "Annual 42k", "Riverside", EventCategory::Sports),
        ]
    }

    #[test]
    fn search_and_category_combine_with_and() {
        let events = catalog();
        let filter = EventFilter {
            search: "jazz".into(),
            category: CategoryFilter::Only(EventCategory::Concert),
        };
        let visible = filter.apply(&events);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Jazz Night");
    }

    #[test]
    fn search_matches_any_of_three_fields() {
        let events = catalog();
        // Location hit, case-insensitive.
        let filter = EventFilter { search: "RIVER".into(), ..Default::default() };
        assert_eq!(filter.apply(&events).len(), 1);
        // Description hit.
        let filter = EventFilter { search: "improv".into(), ..Default::default() };
        assert_eq!(filter.apply(&events).len(), 1);
    }

    #[test]
    fn empty_search_and_all_category_match_everything() {
        let events = catalog();
        let filter = EventFilter::default();
        assert_eq!(filter.apply(&events).len(), events.len());
    }

    #[test]
    fn stale_refresh_results_are_discarded() {
        let mut browser = CatalogBrowser::default();
        let r1 = browser.begin_refresh();
        let r2 = browser.begin_refresh();

        // R2 lands first; R1 resolves afterwards and must not win.
        assert!(browser.apply(r2, catalog()));
        assert!(!browser.apply(r1, vec![]));
        assert_eq!(browser.visible().len(), 3);
    }
}
