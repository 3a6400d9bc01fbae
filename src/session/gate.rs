use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::navigator::Navigator;
use super::store::{AdminSession, Role, SessionStore};
use crate::api::{AdminClient, ApiError, LoginOutcome};
use crate::constants::{PRIVILEGED_DASHBOARD_ROUTE, STANDARD_DASHBOARD_ROUTE};

pub const MISSING_CREDENTIALS: &str = "Please enter both username and password.";
pub const NOT_CONFIGURED: &str = "API URL is not configured.";
pub const SERVER_ERROR: &str = "Server error. Please try again.";

/// Result of looking for an existing session when the login page opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckState {
    AnonymousUnchecked,
    Checking,
    Authenticated(Role),
    AuthFailed,
}

/// Progress of a credential submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Redirected(Destination),
    ShowError(String),
}

/// Which button the user pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginTarget {
    Dashboard,
    /// The external blogs panel.
    Blogs(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    PrivilegedDashboard,
    StandardDashboard,
    External(String),
}

impl Destination {
    /// Privileged roles always land on their dashboard; others follow the
    /// requested target.
    #[must_use]
    pub fn for_login(role: &Role, target: &LoginTarget) -> Self {
        if role.is_privileged() {
            return Self::PrivilegedDashboard;
        }
        match target {
            LoginTarget::Blogs(url) if url.starts_with("http") => Self::External(url.clone()),
            _ => Self::StandardDashboard,
        }
    }

    /// Where an already authenticated user is sent.
    #[must_use]
    pub fn for_role(role: &Role) -> Self {
        Self::for_login(role, &LoginTarget::Dashboard)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PrivilegedDashboard => PRIVILEGED_DASHBOARD_ROUTE,
            Self::StandardDashboard => STANDARD_DASHBOARD_ROUTE,
            Self::External(url) => url,
        }
    }
}

/// The admin login page: session check on open, credential submission, and
/// the redirect that follows either.
pub struct SessionGate {
    client: AdminClient,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    check: watch::Sender<CheckState>,
    submit: watch::Sender<SubmitState>,
}

impl SessionGate {
    #[must_use]
    pub fn new(client: AdminClient, store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            store,
            navigator,
            check: watch::channel(CheckState::AnonymousUnchecked).0,
            submit: watch::channel(SubmitState::Idle).0,
        }
    }

    #[must_use]
    pub fn check_state(&self) -> CheckState {
        self.check.borrow().clone()
    }

    #[must_use]
    pub fn submit_state(&self) -> SubmitState {
        self.submit.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_submit(&self) -> watch::Receiver<SubmitState> {
        self.submit.subscribe()
    }

    /// Redirect straight away if a session is already stored.
    pub fn check(&self) -> CheckState {
        self.check.send_replace(CheckState::Checking);

        let next = match self.store.read() {
            Some(session) => {
                let destination = Destination::for_role(&session.role);
                debug!(username = %session.username, destination = %destination.as_str(), "Existing admin session");
                self.navigator.navigate(destination.as_str());
                CheckState::Authenticated(session.role)
            }
            None => CheckState::AuthFailed,
        };

        self.check.send_replace(next.clone());
        next
    }

    /// Submit credentials. Never fails: every outcome is a [`SubmitState`].
    pub async fn submit(&self, username: &str, password: &str, target: LoginTarget) -> SubmitState {
        let next = self.attempt(username, password, target).await;
        self.submit.send_replace(next.clone());
        next
    }

    async fn attempt(&self, username: &str, password: &str, target: LoginTarget) -> SubmitState {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return SubmitState::ShowError(MISSING_CREDENTIALS.to_string());
        }
        if !self.client.is_configured() {
            error!("SITE_API_URL is not configured");
            return SubmitState::ShowError(NOT_CONFIGURED.to_string());
        }

        self.submit.send_replace(SubmitState::Submitting);

        let response = match self.client.login(username, password).await {
            Ok(LoginOutcome::Accepted(response)) => response,
            Ok(LoginOutcome::Rejected(message)) => return SubmitState::ShowError(message),
            Err(ApiError::NotConfigured { .. }) => {
                return SubmitState::ShowError(NOT_CONFIGURED.to_string())
            }
            Err(e) => {
                warn!(error = %e, "Admin login request failed");
                return SubmitState::ShowError(SERVER_ERROR.to_string());
            }
        };

        let session = AdminSession {
            token: response.token,
            role: Role::parse(&response.role),
            username: response.username,
            id: response.id,
        };
        let destination = Destination::for_login(&session.role, &target);

        if let Err(e) = self.store.write(session).await {
            error!(error = %e, "Failed to persist admin session");
            return SubmitState::ShowError(SERVER_ERROR.to_string());
        }

        info!(destination = %destination.as_str(), "Admin login accepted");
        self.navigator.navigate(destination.as_str());
        SubmitState::Redirected(destination)
    }
}
