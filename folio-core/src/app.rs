//! Application state and the top-level controller.
//!
//! Everything the page chrome needs (current section, overlays, the admin
//! flag, the notification banner) lives in one explicit state struct owned
//! by the controller; there are no process-wide singletons.

use crate::auth::{AuthError, IdentityProvider};
use crate::config::{read_admin_hint, write_admin_hint_best_effort};
use crate::notify::{Notification, Notifier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Interval after which a notification banner dismisses itself.
pub const NOTIFICATION_DISMISS: Duration = Duration::from_secs(3);

/// The in-page sections of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Home,
    Comics,
    Videos,
    About,
}

/// Top-level application state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub section: Section,
    /// Whether the admin surface is shown. Derived from the identity
    /// collaborator's remembered session; the persisted hint only pre-seeds
    /// it before the session check completes.
    pub admin: bool,
    pub login_overlay: bool,
    pub mobile_menu: bool,
    pub notification: Option<Notification>,
    pub loading: bool,
}

/// Owns the application state and the identity collaborator.
pub struct AppController {
    state: AppState,
    identity: Arc<dyn IdentityProvider>,
    notifier: Notifier,
    hint_dir: Option<PathBuf>,
    /// Bumped on every banner change so a stale auto-dismiss task never
    /// clears a newer banner.
    banner_epoch: u64,
}

impl AppController {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        notifier: Notifier,
        hint_dir: Option<PathBuf>,
    ) -> Self {
        AppController {
            state: AppState {
                loading: true,
                ..AppState::default()
            },
            identity,
            notifier,
            hint_dir,
            banner_epoch: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn set_section(&mut self, section: Section) {
        self.state.section = section;
        self.state.mobile_menu = false;
    }

    pub fn set_login_overlay(&mut self, visible: bool) {
        self.state.login_overlay = visible;
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.state.mobile_menu = !self.state.mobile_menu;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    /// Pre-seed the admin flag from the persisted hint. Cosmetic only;
    /// [`check_admin_status`](Self::check_admin_status) overrides it from
    /// the real session.
    pub fn preseed_from_hint(&mut self) {
        if let Some(dir) = &self.hint_dir {
            self.state.admin = read_admin_hint(dir);
        }
    }

    /// Re-derive the admin flag from the identity collaborator's remembered
    /// session and bring the hint in line with it.
    pub async fn check_admin_status(&mut self) {
        let admin = self.identity.current_session().await.is_some();
        self.state.admin = admin;
        if let Some(dir) = &self.hint_dir {
            write_admin_hint_best_effort(dir, admin);
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) {
        match self.identity.sign_in(email, password).await {
            Ok(_) => {
                self.state.admin = true;
                self.state.login_overlay = false;
                if let Some(dir) = &self.hint_dir {
                    write_admin_hint_best_effort(dir, true);
                }
                self.notifier.success("Successfully logged in!");
            }
            Err(AuthError::InvalidCredentials) => {
                self.notifier
                    .error("Invalid credentials. Please check your email and password.");
            }
            Err(e) => {
                warn!("Login failed: {e}");
                self.notifier.error("Login failed. Please try again.");
            }
        }
    }

    pub async fn logout(&mut self) {
        if let Err(e) = self.identity.sign_out().await {
            warn!("Logout error: {e}");
        }
        self.state.admin = false;
        if let Some(dir) = &self.hint_dir {
            write_admin_hint_best_effort(dir, false);
        }
    }

    /// Show a banner. Returns the epoch to pass back to
    /// [`clear_notification`](Self::clear_notification) after
    /// [`NOTIFICATION_DISMISS`].
    pub fn show_notification(&mut self, notification: Notification) -> u64 {
        self.banner_epoch += 1;
        self.state.notification = Some(notification);
        self.banner_epoch
    }

    /// Clear the banner, but only if no newer one replaced it since `epoch`.
    pub fn clear_notification(&mut self, epoch: u64) {
        if epoch == self.banner_epoch {
            self.state.notification = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockIdentity;
    use crate::notify::NotificationLevel;

    fn banner(message: &str) -> Notification {
        Notification {
            message: message.to_string(),
            level: NotificationLevel::Success,
        }
    }

    fn controller(identity: Arc<MockIdentity>, hint_dir: Option<PathBuf>) -> AppController {
        AppController::new(identity, Notifier::new(), hint_dir)
    }

    #[test]
    fn navigating_closes_the_mobile_menu() {
        let mut app = controller(Arc::new(MockIdentity::new("o@e.com", "pw")), None);
        assert_eq!(app.state().section, Section::Home);
        app.toggle_mobile_menu();
        assert!(app.state().mobile_menu);
        app.set_section(Section::Comics);
        assert_eq!(app.state().section, Section::Comics);
        assert!(!app.state().mobile_menu);
    }

    #[tokio::test(start_paused = true)]
    async fn banner_dismisses_after_the_interval() {
        let mut app = controller(Arc::new(MockIdentity::new("o@e.com", "pw")), None);
        let epoch = app.show_notification(banner("saved"));
        tokio::time::sleep(NOTIFICATION_DISMISS).await;
        app.clear_notification(epoch);
        assert_eq!(app.state().notification, None);
    }

    #[test]
    fn stale_dismiss_leaves_newer_banner() {
        let mut app = controller(Arc::new(MockIdentity::new("o@e.com", "pw")), None);
        let first = app.show_notification(banner("one"));
        let second = app.show_notification(banner("two"));
        app.clear_notification(first);
        assert_eq!(app.state().notification, Some(banner("two")));
        app.clear_notification(second);
        assert_eq!(app.state().notification, None);
    }

    #[tokio::test]
    async fn login_sets_admin_and_hint() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = controller(
            Arc::new(MockIdentity::new("o@e.com", "pw")),
            Some(dir.path().to_path_buf()),
        );
        app.login("o@e.com", "pw").await;
        assert!(app.state().admin);
        assert!(crate::config::read_admin_hint(dir.path()));

        app.logout().await;
        assert!(!app.state().admin);
        assert!(!crate::config::read_admin_hint(dir.path()));
    }

    #[tokio::test]
    async fn bad_credentials_leave_admin_off() {
        let mut app = controller(Arc::new(MockIdentity::new("o@e.com", "pw")), None);
        app.login("o@e.com", "wrong").await;
        assert!(!app.state().admin);
    }

    #[tokio::test]
    async fn hint_preseeds_but_session_check_wins() {
        let dir = tempfile::tempdir().unwrap();
        crate::config::write_admin_hint(dir.path(), true).unwrap();

        let mut app = controller(
            Arc::new(MockIdentity::new("o@e.com", "pw")),
            Some(dir.path().to_path_buf()),
        );
        app.preseed_from_hint();
        assert!(app.state().admin);

        // No remembered session: the authority overrides the stale hint.
        app.check_admin_status().await;
        assert!(!app.state().admin);
        assert!(!crate::config::read_admin_hint(dir.path()));
    }

    #[tokio::test]
    async fn admin_status_follows_remembered_session() {
        let identity = Arc::new(MockIdentity::new("o@e.com", "pw"));
        let mut app = controller(identity.clone(), None);
        app.check_admin_status().await;
        assert!(!app.state().admin);

        identity.sign_in("o@e.com", "pw").await.unwrap();
        app.check_admin_status().await;
        assert!(app.state().admin);
    }
}
