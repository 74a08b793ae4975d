//! Session and identity management.
//!
//! The [`SessionManager`] owns the relationship between stored tokens, the
//! current user profile, and the guest cart: it is the only component that
//! moves a session between anonymous and authenticated, and the trigger for
//! guest-cart reconciliation on every transition into an authenticated
//! customer session.
//!
//! Its public operations never panic and never leak transport errors:
//! everything is caught and converted into [`Outcome`] /
//! [`RegisterOutcome`] envelopes, so a UI can always render the result.

mod token;

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;
use tunda_core::{PhoneNumber, UserRole};

use crate::api::types::{NewUser, ProfileUpdate, UserProfile};
use crate::api::{ApiError, AuthApi, CartApi};
use crate::cart::{GuestCart, merge};
use crate::storage::{StorageError, TokenStore};

/// Session lifecycle states.
///
/// The state is a plain value: clone it and derive whatever the UI needs
/// with the pure predicates below. `Authenticated { user: None }` is the
/// transient window between accepting a stored token and the profile fetch
/// completing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// `initialize` has not run yet.
    #[default]
    Uninitialized,
    /// `initialize` is inspecting stored tokens.
    Initializing,
    /// No valid session; the guest cart is the only cart.
    Anonymous,
    /// A token was accepted; the profile may still be loading.
    Authenticated { user: Option<UserProfile> },
}

impl SessionState {
    /// True once a session holds a validated token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The loaded profile, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { user: Some(user) } => Some(user),
            _ => None,
        }
    }

    /// The session's role, once the profile is loaded.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.current_user().map(|user| user.user_role)
    }

    /// True for an authenticated customer.
    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.role() == Some(UserRole::Customer)
    }

    /// True for an authenticated farmer.
    #[must_use]
    pub fn is_farmer(&self) -> bool {
        self.role() == Some(UserRole::Farmer)
    }

    /// True for an authenticated rider.
    #[must_use]
    pub fn is_rider(&self) -> bool {
        self.role() == Some(UserRole::Rider)
    }

    /// True for an authenticated administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(UserRole::Admin)
    }
}

/// Result envelope for session operations.
///
/// Session operations are UI-facing; instead of bubbling error types they
/// resolve to either the requested value or a displayable message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The operation succeeded.
    Success(T),
    /// The operation failed; `error` is safe to show the user.
    Failed { error: String },
}

impl<T> Outcome<T> {
    /// True on success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The success value, if any.
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }
}

/// Result envelope for registration.
///
/// Registration reports success even when the follow-up automatic login
/// fails; the two shapes are distinguished so the UI can either proceed into
/// the session or route to the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RegisterOutcome {
    /// Registered and automatically logged in.
    LoggedIn { user: UserProfile },
    /// Registered, but the automatic login failed; log in manually.
    Registered { message: String },
    /// Registration itself failed.
    Failed { error: String },
}

/// Internal error type; converted to envelopes at the public boundary.
#[derive(Debug, Error)]
enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Message shown to the user: the backend's `detail` when present,
    /// otherwise the error's own rendering.
    fn user_message(&self) -> String {
        if let Self::Api(api) = self
            && let Some(detail) = api.detail()
        {
            return detail;
        }
        self.to_string()
    }
}

/// The session/identity manager.
///
/// Explicitly constructed and dependency-injected; build one per application
/// (or per test) rather than sharing process globals. Cheap to clone.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    auth: AuthApi,
    carts: CartApi,
    tokens: TokenStore,
    guest_cart: GuestCart,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// Create a session manager over its collaborators.
    #[must_use]
    pub fn new(auth: AuthApi, carts: CartApi, tokens: TokenStore, guest_cart: GuestCart) -> Self {
        Self {
            inner: Arc::new(SessionManagerInner {
                auth,
                carts,
                tokens,
                guest_cart,
                state: RwLock::new(SessionState::Uninitialized),
            }),
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// A copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.read_state().clone()
    }

    /// True once a session holds a validated token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_authenticated()
    }

    /// The loaded profile, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.read_state().current_user().cloned()
    }

    /// True for an authenticated customer.
    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.read_state().is_customer()
    }

    /// True for an authenticated farmer.
    #[must_use]
    pub fn is_farmer(&self) -> bool {
        self.read_state().is_farmer()
    }

    /// True for an authenticated rider.
    #[must_use]
    pub fn is_rider(&self) -> bool {
        self.read_state().is_rider()
    }

    /// True for an authenticated administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.read_state().is_admin()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the session from storage at startup.
    ///
    /// Runs once; later calls return the settled state unchanged. The stored
    /// access token is checked locally for expiry - no network call - and an
    /// expired or undecodable token downgrades silently to anonymous with
    /// storage cleared. A locally valid token authenticates optimistically,
    /// then the profile fetch confirms it; backend rejection demotes to
    /// anonymous. Ending up an authenticated customer with a non-empty guest
    /// cart triggers reconciliation.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> SessionState {
        {
            let mut state = self.write_state();
            if *state != SessionState::Uninitialized {
                return state.clone();
            }
            *state = SessionState::Initializing;
        }

        let Some(access) = self.inner.tokens.access_token() else {
            return self.settle(SessionState::Anonymous);
        };

        let valid = match token::decode_claims(&access) {
            Ok(claims) => !claims.is_expired_at(Utc::now()),
            Err(err) => {
                tracing::debug!(error = %err, "stored access token undecodable");
                false
            }
        };

        if !valid {
            tracing::info!("stored access token expired, starting anonymous");
            self.inner.tokens.clear();
            return self.settle(SessionState::Anonymous);
        }

        // Token looks good locally; authenticate optimistically while the
        // profile loads.
        self.settle(SessionState::Authenticated { user: None });

        match self.inner.auth.me().await {
            Ok(user) => {
                let state = self.settle(SessionState::Authenticated {
                    user: Some(user.clone()),
                });
                self.reconcile_guest_cart(&user).await;
                state
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored token rejected by backend, starting anonymous");
                self.inner.tokens.clear();
                self.settle(SessionState::Anonymous)
            }
        }
    }

    /// Authenticate with phone number and password.
    ///
    /// On success the tokens are persisted, the profile is loaded, and - for
    /// customers with a non-empty guest cart - reconciliation runs before the
    /// outcome is returned. A failed reconciliation does not fail the login.
    #[instrument(skip(self, password), fields(phone_number = %phone_number))]
    pub async fn login(
        &self,
        phone_number: &PhoneNumber,
        password: &str,
    ) -> Outcome<UserProfile> {
        match self.try_login(phone_number, password).await {
            Ok(user) => Outcome::Success(user),
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                Outcome::Failed {
                    error: err.user_message(),
                }
            }
        }
    }

    async fn try_login(
        &self,
        phone_number: &PhoneNumber,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        let pair = self.inner.auth.create_session(phone_number, password).await?;
        self.inner.tokens.store_pair(&pair.access, &pair.refresh)?;

        let user = match self.inner.auth.me().await {
            Ok(user) => user,
            Err(err) => {
                // Freshly issued token rejected: terminal for this attempt.
                self.inner.tokens.clear();
                self.settle(SessionState::Anonymous);
                return Err(err.into());
            }
        };

        self.settle(SessionState::Authenticated {
            user: Some(user.clone()),
        });
        self.reconcile_guest_cart(&user).await;

        Ok(user)
    }

    /// Create an account, then attempt an automatic login with the same
    /// credentials.
    #[instrument(skip(self, new_user), fields(phone_number = %new_user.phone_number))]
    pub async fn register(&self, new_user: &NewUser) -> RegisterOutcome {
        if let Err(err) = self.inner.auth.register(new_user).await {
            tracing::warn!(error = %err, "registration failed");
            return RegisterOutcome::Failed {
                error: SessionError::from(err).user_message(),
            };
        }

        match self.login(&new_user.phone_number, &new_user.password).await {
            Outcome::Success(user) => RegisterOutcome::LoggedIn { user },
            Outcome::Failed { error } => {
                // The account exists; only the convenience login failed.
                tracing::warn!(error = %error, "auto-login after registration failed");
                RegisterOutcome::Registered {
                    message: "Registration successful! Please log in.".to_owned(),
                }
            }
        }
    }

    /// End the session: clear both tokens and the in-memory identity.
    ///
    /// The guest cart is deliberately untouched - an anonymous cart may
    /// outlive any number of sessions on a shared device.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.inner.tokens.clear();
        self.settle(SessionState::Anonymous);
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Apply a partial profile update and merge the result into the session.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Outcome<UserProfile> {
        match self.inner.auth.update_profile(update).await {
            Ok(user) => {
                let mut state = self.write_state();
                if let SessionState::Authenticated { user: current } = &mut *state {
                    *current = Some(user.clone());
                }
                drop(state);
                Outcome::Success(user)
            }
            Err(err) => {
                tracing::warn!(error = %err, "profile update failed");
                Outcome::Failed {
                    error: SessionError::from(err).user_message(),
                }
            }
        }
    }

    /// Change the account password.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Outcome<()> {
        match self
            .inner
            .auth
            .change_password(current_password, new_password)
            .await
        {
            Ok(()) => Outcome::Success(()),
            Err(err) => {
                tracing::warn!(error = %err, "password change failed");
                Outcome::Failed {
                    error: SessionError::from(err).user_message(),
                }
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run reconciliation when the session just became an authenticated
    /// customer and guest lines exist. Failures are logged, never fatal: the
    /// untouched guest cart re-triggers the merge on the next transition.
    async fn reconcile_guest_cart(&self, user: &UserProfile) {
        if user.user_role != UserRole::Customer || self.inner.guest_cart.is_empty() {
            return;
        }

        if let Err(err) = merge::reconcile(&self.inner.carts, &self.inner.guest_cart).await {
            tracing::warn!(error = %err, "guest cart merge failed, keeping local cart");
        }
    }

    fn settle(&self, next: SessionState) -> SessionState {
        let mut state = self.write_state();
        *state = next;
        state.clone()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(role: UserRole) -> UserProfile {
        UserProfile {
            user_id: tunda_core::UserId::new(1),
            phone_number: PhoneNumber::parse("+254712345678").unwrap(),
            email: None,
            first_name: "Amina".to_owned(),
            last_name: "Odhiambo".to_owned(),
            user_role: role,
            profile_photo_url: None,
        }
    }

    #[test]
    fn test_state_predicates() {
        let anonymous = SessionState::Anonymous;
        assert!(!anonymous.is_authenticated());
        assert!(!anonymous.is_customer());
        assert_eq!(anonymous.current_user(), None);

        let pending = SessionState::Authenticated { user: None };
        assert!(pending.is_authenticated());
        assert!(!pending.is_customer());
        assert_eq!(pending.role(), None);

        let customer = SessionState::Authenticated {
            user: Some(profile(UserRole::Customer)),
        };
        assert!(customer.is_authenticated());
        assert!(customer.is_customer());
        assert!(!customer.is_farmer());
        assert!(!customer.is_rider());
        assert!(!customer.is_admin());

        let admin = SessionState::Authenticated {
            user: Some(profile(UserRole::Admin)),
        };
        assert!(admin.is_admin());
        assert!(!admin.is_customer());
    }

    #[test]
    fn test_outcome_helpers() {
        let ok: Outcome<i32> = Outcome::Success(5);
        assert!(ok.is_success());
        assert_eq!(ok.success(), Some(5));

        let failed: Outcome<i32> = Outcome::Failed {
            error: "nope".to_owned(),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.success(), None);
    }
}
