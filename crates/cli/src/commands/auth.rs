//! Session commands: login, logout, register, whoami.

use tunda_client::{NewUser, Outcome, RegisterOutcome, TundaClient};
use tunda_core::PhoneNumber;

/// Log in and report the outcome.
pub async fn login(client: &TundaClient, phone: &PhoneNumber, password: &str) {
    match client.session().login(phone, password).await {
        Outcome::Success(user) => {
            tracing::info!("Logged in as {} ({})", user.full_name(), user.user_role);
            if user.user_role == tunda_core::UserRole::Customer {
                tracing::info!("Any guest cart has been merged into your cart");
            }
        }
        Outcome::Failed { error } => tracing::warn!("Login failed: {error}"),
    }
}

/// Log out. The guest cart, if any, stays on this device.
pub fn logout(client: &TundaClient) {
    client.session().logout();
    tracing::info!("Logged out");

    let guest_lines = client.guest_cart().len();
    if guest_lines > 0 {
        tracing::info!("Guest cart kept: {guest_lines} line(s)");
    }
}

/// Register an account, logging in automatically when possible.
pub async fn register(client: &TundaClient, new_user: &NewUser) {
    match client.session().register(new_user).await {
        RegisterOutcome::LoggedIn { user } => {
            tracing::info!("Welcome, {}! You are logged in.", user.full_name());
        }
        RegisterOutcome::Registered { message } => tracing::info!("{message}"),
        RegisterOutcome::Failed { error } => tracing::warn!("Registration failed: {error}"),
    }
}

/// Show who is logged in, if anyone.
pub fn whoami(client: &TundaClient) {
    match client.session().current_user() {
        Some(user) => {
            tracing::info!("{} ({})", user.full_name(), user.phone_number);
            tracing::info!("Role: {}", user.user_role.display_name());
        }
        None => tracing::info!("Not logged in"),
    }
}
