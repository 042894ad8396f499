//! Remote product and order API.
//!
//! [`Gateway`] is the environment trait the reducer talks to. Requests
//! return `'static` boxed futures so the reducer can move them straight into
//! `Effect::Future`.
//!
//! - [`HttpGateway`]: the real API over `reqwest`
//! - [`StubGateway`]: in-memory catalog with scripted latency and failures,
//!   for tests and offline sessions

use crate::types::{ItemId, OrderDraft, OrderReceipt, Product, ProductList};
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Errors from gateway requests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request did not complete
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("server error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The body's `error` field, or the status text
        message: String,
    },

    /// The response body could not be decoded
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The requested product does not exist
    #[error("product {0} not found")]
    NotFound(ItemId),
}

/// Access to the product catalog and order placement
pub trait Gateway: Send + Sync {
    /// Fetches the whole catalog
    fn list_products(&self) -> BoxFuture<'static, Result<Vec<Product>, GatewayError>>;

    /// Fetches one product with its full description
    fn get_product(&self, id: &ItemId) -> BoxFuture<'static, Result<Product, GatewayError>>;

    /// Places an order
    fn place_order(&self, order: &OrderDraft) -> BoxFuture<'static, Result<OrderReceipt, GatewayError>>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Message for a non-success response: the JSON `error` field when present,
/// otherwise the status text
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .map_or_else(|| status.as_str().to_string(), str::to_string)
        },
        |parsed| parsed.error,
    )
}

/// Prefixes a product's image path with the CDN base
#[must_use]
pub fn with_cdn(cdn: &str, mut product: Product) -> Product {
    product.image = format!("{cdn}{}", product.image);
    product
}

/// Gateway for the storefront HTTP API
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    api_url: Arc<str>,
    cdn_url: Arc<str>,
}

impl HttpGateway {
    /// Creates a gateway for `api_url`, prefixing images with `cdn_url`
    #[must_use]
    pub fn new(api_url: &str, cdn_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: Arc::from(api_url.trim_end_matches('/')),
            cdn_url: Arc::from(cdn_url.trim_end_matches('/')),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl Gateway for HttpGateway {
    fn list_products(&self) -> BoxFuture<'static, Result<Vec<Product>, GatewayError>> {
        let request = self.client.get(format!("{}/product", self.api_url));
        let cdn = Arc::clone(&self.cdn_url);
        Box::pin(async move {
            tracing::debug!("GET /product");
            let response = request
                .send()
                .await
                .map_err(|e| GatewayError::Request(e.to_string()))?;
            let list: ProductList = Self::decode(response).await?;
            Ok(list
                .items
                .into_iter()
                .map(|product| with_cdn(&cdn, product))
                .collect())
        })
    }

    fn get_product(&self, id: &ItemId) -> BoxFuture<'static, Result<Product, GatewayError>> {
        let request = self.client.get(format!("{}/product/{id}", self.api_url));
        let cdn = Arc::clone(&self.cdn_url);
        let id = id.clone();
        Box::pin(async move {
            tracing::debug!(%id, "GET /product/{{id}}");
            let response = request
                .send()
                .await
                .map_err(|e| GatewayError::Request(e.to_string()))?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(GatewayError::NotFound(id));
            }
            let product: Product = Self::decode(response).await?;
            Ok(with_cdn(&cdn, product))
        })
    }

    fn place_order(&self, order: &OrderDraft) -> BoxFuture<'static, Result<OrderReceipt, GatewayError>> {
        let request = self
            .client
            .post(format!("{}/order", self.api_url))
            .json(order);
        let items = order.items.len();
        Box::pin(async move {
            tracing::debug!(items, "POST /order");
            let response = request
                .send()
                .await
                .map_err(|e| GatewayError::Request(e.to_string()))?;
            Self::decode(response).await
        })
    }
}

/// Scripted behaviour shared by clones of a [`StubGateway`]
#[derive(Debug, Default)]
struct StubScript {
    detail_delays: HashMap<ItemId, Duration>,
    catalog_failure: Option<String>,
    order_failure: Option<String>,
    orders: Vec<OrderDraft>,
}

/// In-memory gateway
///
/// Serves a fixed catalog, records placed orders and can be told to delay
/// product details or fail requests.
#[derive(Clone, Debug)]
pub struct StubGateway {
    products: Arc<Vec<Product>>,
    script: Arc<Mutex<StubScript>>,
}

impl StubGateway {
    /// Creates a stub serving `products`
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(products),
            script: Arc::new(Mutex::new(StubScript::default())),
        }
    }

    /// Creates a stub serving [`sample_catalog`]
    #[must_use]
    pub fn with_sample_catalog() -> Self {
        Self::new(sample_catalog())
    }

    fn script(&self) -> std::sync::MutexGuard<'_, StubScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delays detail responses for `id`
    pub fn delay_details(&self, id: impl Into<ItemId>, delay: Duration) {
        self.script().detail_delays.insert(id.into(), delay);
    }

    /// Makes catalog requests fail with `message`, or succeed again on `None`
    pub fn fail_catalog(&self, message: Option<&str>) {
        self.script().catalog_failure = message.map(str::to_string);
    }

    /// Makes order requests fail with `message`, or succeed again on `None`
    pub fn fail_orders(&self, message: Option<&str>) {
        self.script().order_failure = message.map(str::to_string);
    }

    /// Orders accepted so far
    #[must_use]
    pub fn placed_orders(&self) -> Vec<OrderDraft> {
        self.script().orders.clone()
    }
}

impl Gateway for StubGateway {
    fn list_products(&self) -> BoxFuture<'static, Result<Vec<Product>, GatewayError>> {
        let result = match self.script().catalog_failure.clone() {
            Some(message) => Err(GatewayError::Status {
                status: 500,
                message,
            }),
            None => Ok(self.products.as_ref().clone()),
        };
        Box::pin(async move { result })
    }

    fn get_product(&self, id: &ItemId) -> BoxFuture<'static, Result<Product, GatewayError>> {
        let delay = self.script().detail_delays.get(id).copied();
        let result = self
            .products
            .iter()
            .find(|product| &product.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.clone()));
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }

    fn place_order(&self, order: &OrderDraft) -> BoxFuture<'static, Result<OrderReceipt, GatewayError>> {
        let mut script = self.script();
        let result = if let Some(message) = script.order_failure.clone() {
            Err(GatewayError::Status {
                status: 400,
                message,
            })
        } else {
            script.orders.push(order.clone());
            Ok(OrderReceipt {
                id: format!("order-{}", script.orders.len()),
                total: order.total,
            })
        };
        Box::pin(async move { result })
    }
}

/// A small catalog covering every category, including a priceless item
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    let product = |id: &str, title: &str, category: &str, price: Option<u64>, description: &str| Product {
        id: ItemId::new(id),
        title: title.to_string(),
        description: description.to_string(),
        image: format!("/{id}.svg"),
        category: category.to_string(),
        price,
    };
    vec![
        product(
            "854cef69",
            "+1 hour in a day",
            "soft skill",
            Some(750),
            "If you plan to make everything happen, you'll need at least one more hour.",
        ),
        product(
            "c101ab44",
            "HEX lollipop",
            "other",
            Some(1450),
            "A lollipop in your favourite colour.\nCan be licked while coding.",
        ),
        product(
            "b06cde61",
            "Mamka-timer",
            "hard skill",
            None,
            "Will not let you stay up past bedtime.",
        ),
        product(
            "412bcf81",
            "Framework of the day",
            "additional",
            Some(1000),
            "The one everybody is talking about this morning.",
        ),
        product(
            "1c521d84",
            "Button of all buttons",
            "button",
            Some(2500),
            "Press it.",
        ),
    ]
}
