//! Shared test helpers: a scripted transport, canned tokens and listings.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rust_decimal::Decimal;

use tunda_client::{
    ListingProduct, ListingStatus, ListingSummary, MemoryStore, Transport, TransportError,
    TransportRequest, TransportResponse, TundaClient,
};
use tunda_core::{FarmId, ListingId, ProductId, UnitOfMeasure};

/// A request the fake transport received, kept for assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub authorization: Option<String>,
}

/// Scripted [`Transport`]: canned responses per `(method, path)` route.
///
/// Each route holds a queue; responses are consumed in order and the last
/// one repeats, so `[401, 200]` scripts a failure followed by recovery.
/// Unscripted routes answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for `method path`.
    pub fn on(&self, method: &str, path: &str, status: u16, body: &serde_json::Value) {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes
            .entry(route_key(method, path))
            .or_default()
            .push_back((status, body.to_string()));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for one path, any method.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

fn route_key(method: &str, path: &str) -> String {
    format!("{method} {path}")
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let recorded = RecordedRequest {
            method: request.method.to_string(),
            path: request.path.clone(),
            body: request.body.clone(),
            authorization: request.authorization.clone(),
        };
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);

        let key = route_key(&request.method.to_string(), &request.path);
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(queue) = routes.get_mut(&key) else {
            return Ok(TransportResponse {
                status: 404,
                body: r#"{"detail":"Not found."}"#.to_owned(),
            });
        };

        let (status, body) = if queue.len() > 1 {
            queue.pop_front().unwrap_or((404, String::new()))
        } else {
            queue.front().cloned().unwrap_or((404, String::new()))
        };

        Ok(TransportResponse { status, body })
    }
}

/// A structurally valid, unsigned JWT with the given `exp`.
pub fn make_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "token_type": "access", "exp": exp, "user_id": 1 }).to_string(),
    );
    format!("{header}.{payload}.signature")
}

/// An `exp` far in the future / past.
pub const FUTURE_EXP: i64 = 4_102_444_800; // 2100-01-01
pub const PAST_EXP: i64 = 946_684_800; // 2000-01-01

/// Profile payload as `/users/users/me/` returns it.
pub fn profile_json(role: &str) -> serde_json::Value {
    serde_json::json!({
        "user_id": 1,
        "phone_number": "+254712345678",
        "email": "amina@example.com",
        "first_name": "Amina",
        "last_name": "Odhiambo",
        "user_role": role,
    })
}

/// Token pair payload as `/users/jwt/create/` returns it.
pub fn token_pair_json() -> serde_json::Value {
    serde_json::json!({
        "access": make_jwt(FUTURE_EXP),
        "refresh": "refresh-token-1",
    })
}

/// Minimal server cart payload.
pub fn server_cart_json() -> serde_json::Value {
    serde_json::json!({
        "cart_id": 1,
        "items": [],
        "total_items": 0,
        "total_cost": 0,
    })
}

/// A listing snapshot for guest-cart tests.
pub fn listing(id: i32, name: &str, price: Decimal) -> ListingSummary {
    ListingSummary {
        listing_id: ListingId::new(id),
        farm: FarmId::new(1),
        farm_name: "Green Valley Farm".to_owned(),
        product: ListingProduct {
            product_id: ProductId::new(id),
            product_name: name.to_owned(),
            description: None,
            unit_of_measure: UnitOfMeasure::Kg,
        },
        current_price: price,
        quantity_available: Decimal::new(100_00, 2),
        min_order_quantity: Decimal::ONE,
        listing_status: ListingStatus::Available,
        photos: Vec::new(),
    }
}

/// A client over a scripted transport and fresh in-memory storage.
pub fn scripted_client(transport: &Arc<FakeTransport>) -> (TundaClient, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let client = TundaClient::with_parts(transport.clone(), storage.clone());
    (client, storage)
}

/// A client whose storage already holds the given tokens.
pub fn scripted_client_with_tokens(
    transport: &Arc<FakeTransport>,
    access: &str,
    refresh: &str,
) -> (TundaClient, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::with_entries([
        ("access_token".to_owned(), access.to_owned()),
        ("refresh_token".to_owned(), refresh.to_owned()),
    ]));
    let client = TundaClient::with_parts(transport.clone(), storage.clone());
    (client, storage)
}
