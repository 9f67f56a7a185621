//! Browsing state for the artwork listing
//!
//! The listing view keeps its query, provider, department and page in an
//! explicit [`BrowseState`]. User input becomes a [`BrowseAction`], [`reduce`]
//! computes the next state, and [`to_request`] derives the request to send.
//! The state round-trips through the page URL so links and reloads restore it.

use crate::pagination::ArtworksQuery;
use curatly_common::Provider;
use url::form_urlencoded;

/// Query used when the search box is empty
pub const DEFAULT_QUERY: &str = "art";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
    pub query: String,
    pub provider: Provider,
    pub department_id: Option<u32>,
    pub page: u32,
    /// Last known page count, 0 before the first page has loaded
    pub total_pages: u32,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            query: String::new(),
            provider: Provider::Met,
            department_id: None,
            page: 1,
            total_pages: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseAction {
    Search(String),
    SelectProvider(Provider),
    SelectDepartment(Option<u32>),
    GoToPage(u32),
    /// A page came back; the server may have clamped the page number
    PageLoaded { page: u32, total_pages: u32 },
}

pub fn reduce(state: BrowseState, action: BrowseAction) -> BrowseState {
    match action {
        BrowseAction::Search(query) => BrowseState {
            query,
            page: 1,
            ..state
        },
        BrowseAction::SelectProvider(provider) => BrowseState {
            provider,
            department_id: match provider {
                Provider::Met => state.department_id,
                Provider::Aic => None,
            },
            page: 1,
            ..state
        },
        BrowseAction::SelectDepartment(department_id) => BrowseState {
            department_id,
            page: 1,
            ..state
        },
        BrowseAction::GoToPage(page) if (1..=state.total_pages).contains(&page) => {
            BrowseState { page, ..state }
        }
        BrowseAction::GoToPage(_) => state,
        BrowseAction::PageLoaded { page, total_pages } => BrowseState {
            page: page.max(1),
            total_pages,
            ..state
        },
    }
}

/// The artworks request for the current state
pub fn to_request(state: &BrowseState, limit: u32) -> ArtworksQuery {
    let query = state.query.trim();

    ArtworksQuery {
        query: if query.is_empty() { DEFAULT_QUERY } else { query }.to_string(),
        department_id: match state.provider {
            Provider::Met => state.department_id,
            Provider::Aic => None,
        },
        provider: state.provider,
        page: state.page.max(1),
        limit,
    }
}

/// Encode the state as URL query parameters
pub fn to_query_string(state: &BrowseState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if !state.query.trim().is_empty() {
        serializer.append_pair("query", state.query.trim());
    }
    serializer.append_pair("provider", state.provider.as_str());
    if let Some(department_id) = state.department_id {
        serializer.append_pair("departmentId", &department_id.to_string());
    }
    serializer.append_pair("page", &state.page.to_string());

    serializer.finish()
}

/// Restore state from URL query parameters, falling back to defaults for
/// anything missing or malformed
pub fn from_query_string(query: &str) -> BrowseState {
    let mut state = BrowseState::default();

    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        match key.as_ref() {
            "query" => state.query = value.into_owned(),
            "provider" => state.provider = value.parse().unwrap_or(Provider::Met),
            "departmentId" => state.department_id = value.parse().ok(),
            "page" => state.page = value.parse().ok().filter(|page| *page >= 1).unwrap_or(1),
            _ => {}
        }
    }

    if state.provider != Provider::Met {
        state.department_id = None;
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(page: u32, total_pages: u32) -> BrowseState {
        reduce(
            BrowseState::default(),
            BrowseAction::PageLoaded { page, total_pages },
        )
    }

    #[test]
    fn test_search_resets_page() {
        let state = reduce(loaded(3, 10), BrowseAction::Search("vase".into()));
        assert_eq!(state.query, "vase");
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_switching_to_aic_clears_department() {
        let state = reduce(loaded(2, 5), BrowseAction::SelectDepartment(Some(11)));
        assert_eq!(state.department_id, Some(11));

        let state = reduce(state, BrowseAction::SelectProvider(Provider::Aic));
        assert_eq!(state.provider, Provider::Aic);
        assert_eq!(state.department_id, None);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_go_to_page_bounds() {
        let state = loaded(1, 4);
        assert_eq!(reduce(state.clone(), BrowseAction::GoToPage(4)).page, 4);
        assert_eq!(reduce(state.clone(), BrowseAction::GoToPage(5)).page, 1);
        assert_eq!(reduce(state, BrowseAction::GoToPage(0)).page, 1);
    }

    #[test]
    fn test_page_loaded_adopts_clamped_page() {
        let state = BrowseState {
            page: 9,
            ..BrowseState::default()
        };
        let state = reduce(state, BrowseAction::PageLoaded { page: 3, total_pages: 3 });
        assert_eq!((state.page, state.total_pages), (3, 3));
    }

    #[test]
    fn test_to_request() {
        let state = BrowseState {
            query: "  ".into(),
            department_id: Some(11),
            ..BrowseState::default()
        };

        let request = to_request(&state, 20);
        assert_eq!(request.query, "art");
        assert_eq!(request.department_id, Some(11));
        assert_eq!((request.page, request.limit), (1, 20));

        let request = to_request(
            &BrowseState {
                provider: Provider::Aic,
                ..state
            },
            20,
        );
        assert_eq!(request.department_id, None);
    }

    #[test]
    fn test_query_string() {
        let state = BrowseState {
            query: "water lilies".into(),
            provider: Provider::Met,
            department_id: Some(11),
            page: 2,
            total_pages: 0,
        };

        let encoded = to_query_string(&state);
        assert_eq!(encoded, "query=water+lilies&provider=met&departmentId=11&page=2");
        assert_eq!(from_query_string(&encoded), state);
    }

    #[test]
    fn test_malformed_query_string() {
        let state = from_query_string("?provider=louvre&page=abc&departmentId=x");
        assert_eq!(state, BrowseState::default());

        let state = from_query_string("provider=aic&departmentId=11&page=0");
        assert_eq!(state.provider, Provider::Aic);
        assert_eq!(state.department_id, None);
        assert_eq!(state.page, 1);
    }
}
