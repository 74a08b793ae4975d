//! Session lifecycle flows: initialization, login, registration, logout and
//! guest-cart reconciliation.

#![allow(clippy::unwrap_used)]

mod helpers;

use rust_decimal::Decimal;

use helpers::{
    FakeTransport, PAST_EXP, listing, make_jwt, profile_json, scripted_client,
    scripted_client_with_tokens, server_cart_json, token_pair_json, FUTURE_EXP,
};
use tunda_client::{ClientEvent, Outcome, RegisterOutcome, SessionState, Storage};
use tunda_core::PhoneNumber;

const JWT_CREATE: &str = "/users/jwt/create/";
const ME: &str = "/users/users/me/";
const REGISTER: &str = "/users/register/";
const MERGE: &str = "/carts/merge_guest_cart/";

fn phone() -> PhoneNumber {
    PhoneNumber::parse("+254712345678").unwrap()
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn initialize_without_tokens_settles_anonymous() {
    let transport = FakeTransport::new();
    let (client, _storage) = scripted_client(&transport);

    let state = client.session().initialize().await;
    assert_eq!(state, SessionState::Anonymous);
    assert!(transport.requests().is_empty(), "no network traffic expected");
}

#[tokio::test]
async fn initialize_with_expired_token_clears_storage_and_stays_anonymous() {
    let transport = FakeTransport::new();
    let (client, storage) =
        scripted_client_with_tokens(&transport, &make_jwt(PAST_EXP), "refresh-1");

    let state = client.session().initialize().await;

    assert_eq!(state, SessionState::Anonymous);
    assert_eq!(storage.get("access_token").unwrap(), None);
    assert_eq!(storage.get("refresh_token").unwrap(), None);
    assert!(transport.requests().is_empty(), "expiry is checked locally");
}

#[tokio::test]
async fn initialize_with_malformed_token_is_treated_as_expired() {
    let transport = FakeTransport::new();
    let (client, storage) =
        scripted_client_with_tokens(&transport, "definitely-not-a-jwt", "refresh-1");

    let state = client.session().initialize().await;
    assert_eq!(state, SessionState::Anonymous);
    assert_eq!(storage.get("access_token").unwrap(), None);
}

#[tokio::test]
async fn initialize_with_valid_token_fetches_profile() {
    let transport = FakeTransport::new();
    transport.on("GET", ME, 200, &profile_json("farmer"));

    let (client, _storage) =
        scripted_client_with_tokens(&transport, &make_jwt(FUTURE_EXP), "refresh-1");

    let state = client.session().initialize().await;
    assert!(state.is_authenticated());
    assert!(client.session().is_farmer());
    assert_eq!(
        client.session().current_user().unwrap().first_name,
        "Amina"
    );
}

#[tokio::test]
async fn initialize_demotes_to_anonymous_when_backend_rejects_token() {
    let transport = FakeTransport::new();
    transport.on("GET", ME, 401, &serde_json::json!({"detail": "revoked"}));

    let (client, storage) =
        scripted_client_with_tokens(&transport, &make_jwt(FUTURE_EXP), "refresh-1");

    // The gateway will also try a refresh; make it fail too.
    transport.on(
        "POST",
        "/users/jwt/refresh/",
        401,
        &serde_json::json!({"detail": "invalid"}),
    );

    let state = client.session().initialize().await;
    assert_eq!(state, SessionState::Anonymous);
    assert_eq!(storage.get("access_token").unwrap(), None);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn initialize_as_customer_with_guest_cart_triggers_merge() {
    let transport = FakeTransport::new();
    transport.on("GET", ME, 200, &profile_json("customer"));
    transport.on("POST", MERGE, 200, &server_cart_json());

    let (client, _storage) =
        scripted_client_with_tokens(&transport, &make_jwt(FUTURE_EXP), "refresh-1");
    client
        .guest_cart()
        .add(&listing(1, "Sukuma Wiki", Decimal::ONE), Decimal::TWO)
        .unwrap();

    let state = client.session().initialize().await;

    assert!(state.is_customer());
    assert_eq!(transport.requests_to(MERGE).len(), 1);
    assert!(client.guest_cart().is_empty());
}

#[tokio::test]
async fn initialize_runs_once() {
    let transport = FakeTransport::new();
    transport.on("GET", ME, 200, &profile_json("customer"));

    let (client, _storage) =
        scripted_client_with_tokens(&transport, &make_jwt(FUTURE_EXP), "refresh-1");

    client.session().initialize().await;
    let requests_after_first = transport.requests().len();

    let state = client.session().initialize().await;
    assert!(state.is_authenticated());
    assert_eq!(transport.requests().len(), requests_after_first);
}

// =============================================================================
// Login and reconciliation
// =============================================================================

#[tokio::test]
async fn login_failure_reports_backend_detail() {
    let transport = FakeTransport::new();
    transport.on(
        "POST",
        JWT_CREATE,
        401,
        &serde_json::json!({"detail": "No active account found with the given credentials"}),
    );

    let (client, _storage) = scripted_client(&transport);
    let outcome = client.session().login(&phone(), "wrong").await;

    assert_eq!(
        outcome,
        Outcome::Failed {
            error: "No active account found with the given credentials".to_owned()
        }
    );
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn login_with_empty_guest_cart_skips_merge() {
    let transport = FakeTransport::new();
    transport.on("POST", JWT_CREATE, 200, &token_pair_json());
    transport.on("GET", ME, 200, &profile_json("customer"));

    let (client, storage) = scripted_client(&transport);
    let outcome = client.session().login(&phone(), "secret").await;

    assert!(outcome.is_success());
    assert!(client.session().is_customer());
    assert!(transport.requests_to(MERGE).is_empty());
    assert!(storage.get("access_token").unwrap().is_some());
    assert!(storage.get("refresh_token").unwrap().is_some());
}

#[tokio::test]
async fn login_as_customer_merges_guest_cart_and_clears_it() {
    let transport = FakeTransport::new();
    transport.on("POST", JWT_CREATE, 200, &token_pair_json());
    transport.on("GET", ME, 200, &profile_json("customer"));
    transport.on("POST", MERGE, 200, &server_cart_json());

    let (client, _storage) = scripted_client(&transport);

    // Guest adds 2.00, then 3.00 more of the same listing
    let sukuma = listing(1, "Sukuma Wiki", Decimal::new(3500, 2));
    client.guest_cart().add(&sukuma, Decimal::new(200, 2)).unwrap();
    client.guest_cart().add(&sukuma, Decimal::new(300, 2)).unwrap();
    assert_eq!(client.guest_cart().len(), 1);

    let mut events = client.events().subscribe();
    let outcome = client.session().login(&phone(), "secret").await;
    assert!(outcome.is_success());

    // One merge call, carrying the single summed line
    let merges = transport.requests_to(MERGE);
    assert_eq!(merges.len(), 1);
    assert_eq!(
        merges[0].body,
        Some(serde_json::json!({
            "items": [{ "listing_id": 1, "quantity": "5.00" }]
        }))
    );

    // Guest cart emptied, exactly one cart-changed signal
    assert!(client.guest_cart().is_empty());
    assert_eq!(events.try_recv().unwrap(), ClientEvent::CartChanged);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn failed_merge_preserves_guest_cart_and_login_still_succeeds() {
    let transport = FakeTransport::new();
    transport.on("POST", JWT_CREATE, 200, &token_pair_json());
    transport.on("GET", ME, 200, &profile_json("customer"));
    transport.on(
        "POST",
        MERGE,
        500,
        &serde_json::json!({"detail": "temporarily unavailable"}),
    );

    let (client, _storage) = scripted_client(&transport);
    let sukuma = listing(1, "Sukuma Wiki", Decimal::new(3500, 2));
    client.guest_cart().add(&sukuma, Decimal::new(500, 2)).unwrap();
    let before = client.guest_cart().items();

    let mut events = client.events().subscribe();
    let outcome = client.session().login(&phone(), "secret").await;

    assert!(outcome.is_success(), "merge failure must not fail login");
    assert_eq!(client.guest_cart().items(), before);
    assert!(events.try_recv().is_err(), "no cart-changed signal on failure");
}

#[tokio::test]
async fn login_as_non_customer_never_merges() {
    let transport = FakeTransport::new();
    transport.on("POST", JWT_CREATE, 200, &token_pair_json());
    transport.on("GET", ME, 200, &profile_json("farmer"));

    let (client, _storage) = scripted_client(&transport);
    client
        .guest_cart()
        .add(&listing(1, "Sukuma Wiki", Decimal::ONE), Decimal::ONE)
        .unwrap();

    let outcome = client.session().login(&phone(), "secret").await;
    assert!(outcome.is_success());
    assert!(client.session().is_farmer());
    assert!(transport.requests_to(MERGE).is_empty());
    assert_eq!(client.guest_cart().len(), 1);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn logout_clears_session_but_not_guest_cart() {
    let transport = FakeTransport::new();
    transport.on("POST", JWT_CREATE, 200, &token_pair_json());
    transport.on("GET", ME, 200, &profile_json("farmer"));

    let (client, storage) = scripted_client(&transport);
    client
        .guest_cart()
        .add(&listing(1, "Sukuma Wiki", Decimal::ONE), Decimal::TWO)
        .unwrap();

    let outcome = client.session().login(&phone(), "secret").await;
    assert!(outcome.is_success());

    client.session().logout();

    assert!(!client.session().is_authenticated());
    assert_eq!(client.session().current_user(), None);
    assert_eq!(storage.get("access_token").unwrap(), None);
    assert_eq!(storage.get("refresh_token").unwrap(), None);

    // The guest cart survives, in memory and on disk
    assert_eq!(client.guest_cart().len(), 1);
    assert!(storage.get("guest_cart").unwrap().is_some());
}

// =============================================================================
// Registration
// =============================================================================

fn new_user() -> tunda_client::NewUser {
    tunda_client::NewUser {
        phone_number: phone(),
        email: Some("amina@example.com".to_owned()),
        first_name: "Amina".to_owned(),
        last_name: "Odhiambo".to_owned(),
        password: "correct horse".to_owned(),
        user_role: tunda_core::UserRole::Customer,
    }
}

#[tokio::test]
async fn register_then_auto_login() {
    let transport = FakeTransport::new();
    transport.on("POST", REGISTER, 201, &profile_json("customer"));
    transport.on("POST", JWT_CREATE, 200, &token_pair_json());
    transport.on("GET", ME, 200, &profile_json("customer"));

    let (client, _storage) = scripted_client(&transport);
    let outcome = client.session().register(&new_user()).await;

    assert!(matches!(outcome, RegisterOutcome::LoggedIn { .. }));
    assert!(client.session().is_customer());
}

#[tokio::test]
async fn register_succeeds_even_when_auto_login_fails() {
    let transport = FakeTransport::new();
    transport.on("POST", REGISTER, 201, &profile_json("customer"));
    transport.on(
        "POST",
        JWT_CREATE,
        503,
        &serde_json::json!({"detail": "try later"}),
    );

    let (client, _storage) = scripted_client(&transport);
    let outcome = client.session().register(&new_user()).await;

    let RegisterOutcome::Registered { message } = outcome else {
        panic!("expected Registered, got {outcome:?}");
    };
    assert!(message.contains("log in"));
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn register_failure_is_reported() {
    let transport = FakeTransport::new();
    transport.on(
        "POST",
        REGISTER,
        400,
        &serde_json::json!({"detail": "phone number already registered"}),
    );

    let (client, _storage) = scripted_client(&transport);
    let outcome = client.session().register(&new_user()).await;

    assert!(matches!(outcome, RegisterOutcome::Failed { .. }));
    assert!(transport.requests_to(JWT_CREATE).is_empty());
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn guest_shopping_to_customer_login_end_to_end() {
    let transport = FakeTransport::new();
    transport.on("POST", JWT_CREATE, 200, &token_pair_json());
    transport.on("GET", ME, 200, &profile_json("customer"));
    transport.on("POST", MERGE, 200, &server_cart_json());

    let (client, storage) = scripted_client(&transport);
    let state = client.session().initialize().await;
    assert_eq!(state, SessionState::Anonymous);

    // Anonymous shopper: L1 x 2, then 3 more
    let l1 = listing(1, "Sukuma Wiki", Decimal::new(3500, 2));
    client.guest_cart().add(&l1, Decimal::new(200, 2)).unwrap();
    client.guest_cart().add(&l1, Decimal::new(300, 2)).unwrap();

    let items = client.guest_cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, Decimal::new(500, 2));

    // A reload of the storage reproduces the cart exactly
    let reloaded = tunda_client::GuestCart::load(storage.clone(), tunda_client::EventBus::new());
    assert_eq!(reloaded.items(), items);

    // Customer logs in: reconciliation fires with the summed snapshot
    let outcome = client.session().login(&phone(), "secret").await;
    assert!(outcome.is_success());
    assert!(client.session().is_customer());

    let merges = transport.requests_to(MERGE);
    assert_eq!(merges.len(), 1);
    assert_eq!(
        merges[0].body,
        Some(serde_json::json!({
            "items": [{ "listing_id": 1, "quantity": "5.00" }]
        }))
    );

    // Merge succeeded, so the guest cart is gone locally and durably
    assert!(client.guest_cart().is_empty());
    assert_eq!(storage.get("guest_cart").unwrap().as_deref(), Some("[]"));
}
