//! Back-office routes. Every handler requires a staff session; destructive
//! catalog operations and account roles require an admin.

mod categories;
mod dashboard;
mod feedback;
mod orders;
mod products;
mod repairs;
mod users;

use axum::Router;
use serde::Deserialize;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(categories::routes())
        .merge(orders::routes())
        .merge(repairs::routes())
        .merge(feedback::routes())
        .merge(users::routes())
        .merge(dashboard::routes())
}

/// `?status=&search=` list filter. An absent, blank or `all` status selects
/// everything.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListFilter {
    pub fn selected(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty() && *s != "all")
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        let filter = |s: Option<&str>| ListFilter { status: s.map(Into::into), search: None };
        assert_eq!(filter(None).selected(), None);
        assert_eq!(filter(Some("all")).selected(), None);
        assert_eq!(filter(Some(" ")).selected(), None);
        assert_eq!(filter(Some("pending")).selected(), Some("pending"));
    }

    #[test]
    fn test_list_filter_from_query_string() {
        let filter: ListFilter = serde_json::from_value(serde_json::json!({ "search": "CMD-2026" })).unwrap();
        assert_eq!(filter.selected(), None);
        assert_eq!(filter.search(), Some("CMD-2026"));
    }
}
