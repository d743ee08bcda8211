pub mod application_handlers;
pub mod auth_handlers;
pub mod job_handlers;
pub mod notification_handlers;
pub mod organization_handlers;

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::models::timeline::TimelineEvent;

/// Page envelope for list endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub page_number: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(content: Vec<T>, total_elements: i64, page_number: i64, per_page: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + per_page - 1) / per_page
        };
        Self {
            content,
            total_elements,
            total_pages,
            page_number,
        }
    }
}

/// Parse `page` / `per_page` query params: page 1-based, per_page 1..=100,
/// default 25.
pub fn paging(query: &HashMap<String, String>) -> (i64, i64) {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(25)
        .clamp(1, 100);
    (page, per_page)
}

/// Timeline events as JSON for detail responses, newest first.
pub fn timeline_json(events: &[TimelineEvent]) -> Vec<Value> {
    events
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "actorId": e.actor_id,
                "action": &e.action,
                "details": &e.details,
                "createdAt": e.created_at,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_math() {
        let p = Page::new(vec![1, 2, 3], 7, 1, 3);
        assert_eq!(p.total_pages, 3);
        let empty: Page<i32> = Page::new(vec![], 0, 1, 25);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn paging_defaults_and_clamps() {
        let mut q = HashMap::new();
        assert_eq!(paging(&q), (1, 25));
        q.insert("page".to_string(), "0".to_string());
        q.insert("per_page".to_string(), "500".to_string());
        assert_eq!(paging(&q), (1, 100));
    }
}
