//! HTTP client for the upstream order listing API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{OrderPage, OrderQuery, OrderSource, OrderSourceError};
use crate::config::OrdersApiConfig;

/// reqwest-backed [`OrderSource`]
#[derive(Debug, Clone)]
pub struct HttpOrderSource {
    client: Client,
    orders_url: String,
    token: Option<String>,
}

impl HttpOrderSource {
    /// Build a client from configuration
    pub fn new(config: &OrdersApiConfig) -> Result<Self, OrderSourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            orders_url: format!(
                "{}/{}/orders",
                config.api_url.trim_end_matches('/'),
                config.project_key.trim_matches('/')
            ),
            token: config.token.clone(),
        })
    }

    /// Listing endpoint this client targets
    pub fn orders_url(&self) -> &str {
        &self.orders_url
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn fetch_orders(&self, query: &OrderQuery) -> Result<OrderPage, OrderSourceError> {
        let mut request = self.client.get(&self.orders_url).query(&query.to_params());

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderSourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<OrderPage>().await?)
    }
}
