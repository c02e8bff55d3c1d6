//! Upstream order source
//!
//! Read-only view of the order-management service. Only the fields needed to
//! window and export orders are decoded; anything else in the payload is ignored.

mod client;

pub use client::HttpOrderSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Order as returned by the upstream listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Upstream identifier. Defaults to empty so a malformed record surfaces
    /// when it is serialized rather than aborting the whole page decode.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One page of the order listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
    /// Size of the full matching set server-side
    pub total: u64,
    pub results: Vec<Order>,
}

/// How orders are selected upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderQuery {
    /// Full listing ordered by the given sort specs (e.g. `lastModifiedAt desc`)
    Sorted { sort: Vec<String>, limit: Option<u32> },
    /// Listing restricted by a predicate evaluated by the upstream service
    Filtered { predicate: String, limit: Option<u32> },
}

impl OrderQuery {
    /// Query string pairs understood by the listing endpoint
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let (mut params, limit) = match self {
            Self::Sorted { sort, limit } => (
                sort.iter().map(|s| ("sort", s.clone())).collect::<Vec<_>>(),
                limit,
            ),
            Self::Filtered { predicate, limit } => (vec![("where", predicate.clone())], limit),
        };
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// Order source error
#[derive(Debug, Error)]
pub enum OrderSourceError {
    /// Transport failure or undecodable body
    #[error("order API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the order API
    #[error("order API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Source unavailable for any other reason
    #[error("order source unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can list orders for an export run
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_orders(&self, query: &OrderQuery) -> Result<OrderPage, OrderSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_query_params() {
        let query = OrderQuery::Sorted {
            sort: vec!["lastModifiedAt desc".to_string()],
            limit: None,
        };
        assert_eq!(
            query.to_params(),
            vec![("sort", "lastModifiedAt desc".to_string())]
        );
    }

    #[test]
    fn test_filtered_query_params_with_limit() {
        let query = OrderQuery::Filtered {
            predicate: "createdAt >= \"2024-05-01T00:00:00Z\"".to_string(),
            limit: Some(500),
        };
        let params = query.to_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].0, "where");
        assert_eq!(params[1], ("limit", "500".to_string()));
    }

    #[test]
    fn test_order_page_decodes_upstream_shape() {
        let body = serde_json::json!({
            "limit": 20,
            "offset": 0,
            "count": 1,
            "total": 42,
            "results": [{
                "id": "c1f7a6c0",
                "version": 3,
                "orderState": "Open",
                "createdAt": "2024-05-01T08:30:00.000Z",
                "lastModifiedAt": "2024-05-01T09:15:12.345Z"
            }]
        });

        let page: OrderPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.count, Some(1));
        assert_eq!(page.results[0].id, "c1f7a6c0");
        assert_eq!(
            page.results[0].last_modified_at.timestamp_subsec_millis(),
            345
        );
    }

    #[test]
    fn test_order_without_id_decodes_empty() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "createdAt": "2024-05-01T08:30:00Z",
            "lastModifiedAt": "2024-05-01T08:30:00Z"
        }))
        .unwrap();
        assert!(order.id.is_empty());
    }

    #[test]
    fn test_order_with_null_id_decodes_empty() {
        let page: OrderPage = serde_json::from_value(serde_json::json!({
            "total": 2,
            "results": [
                {
                    "id": "ord-1",
                    "createdAt": "2024-05-01T08:30:00Z",
                    "lastModifiedAt": "2024-05-01T08:30:00Z"
                },
                {
                    "id": null,
                    "createdAt": "2024-05-01T09:30:00Z",
                    "lastModifiedAt": "2024-05-01T09:30:00Z"
                }
            ]
        }))
        .unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, "ord-1");
        assert!(page.results[1].id.is_empty());
    }
}
