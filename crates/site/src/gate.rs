//! Access Gate: the password prompt in front of the admin panel.
//!
//! The password is checked by the server, which opens a session. The gate
//! only decides whether to show the panel; every mutation is authorized
//! again server-side.

use lobianco_core::content::User;

use crate::api::{ClientError, ContentApi};
use crate::notify::Notifications;

pub const MSG_EMPTY_PASSWORD: &str = "Digite a senha";
pub const MSG_WRONG_PASSWORD: &str = "Senha incorreta!";
pub const MSG_NOT_ADMIN: &str = "Acesso restrito a administradores";
pub const MSG_WELCOME: &str = "Login realizado com sucesso!";

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Closed,
    AwaitingPassword,
    Granted(User),
    Rejected { reason: String },
}

#[derive(Debug)]
pub struct AccessGate {
    state: GateState,
    password: String,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Closed,
            password: String::new(),
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether the prompt is on screen.
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            GateState::AwaitingPassword | GateState::Rejected { .. }
        )
    }

    pub fn granted_user(&self) -> Option<&User> {
        match &self.state {
            GateState::Granted(user) => Some(user),
            _ => None,
        }
    }

    pub fn open(&mut self) {
        if !matches!(self.state, GateState::Granted(_)) {
            self.state = GateState::AwaitingPassword;
        }
    }

    pub fn close(&mut self) {
        self.password.clear();
        if self.is_open() {
            self.state = GateState::Closed;
        }
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Send the typed password. A blank password is rejected without a
    /// round trip. Any rejection clears the field and leaves the prompt
    /// open for another try.
    pub async fn submit(&mut self, api: &dyn ContentApi, toasts: &Notifications) -> &GateState {
        if !self.is_open() {
            return &self.state;
        }
        let password = std::mem::take(&mut self.password);
        if password.trim().is_empty() {
            return self.reject(MSG_EMPTY_PASSWORD, toasts);
        }

        match api.login(&password).await {
            Ok(user) if user.is_admin() => {
                tracing::info!(open_id = %user.open_id, "admin panel unlocked");
                toasts.success(MSG_WELCOME);
                self.state = GateState::Granted(user);
                &self.state
            }
            Ok(_) => {
                if let Err(e) = api.logout().await {
                    tracing::warn!("failed to drop non-admin session: {e}");
                }
                self.reject(MSG_NOT_ADMIN, toasts)
            }
            Err(ClientError::Unauthorized(_)) => self.reject(MSG_WRONG_PASSWORD, toasts),
            Err(e) => {
                let reason = format!("Não foi possível entrar: {e}");
                self.reject(&reason, toasts)
            }
        }
    }

    /// Skip the prompt when the client already holds an admin session.
    pub async fn restore(&mut self, api: &dyn ContentApi) -> &GateState {
        match api.me().await {
            Ok(Some(user)) if user.is_admin() => self.state = GateState::Granted(user),
            Ok(_) => {}
            Err(e) => tracing::warn!("could not check the current session: {e}"),
        }
        &self.state
    }

    /// Leave the panel and end the session.
    pub async fn sign_out(&mut self, api: &dyn ContentApi, toasts: &Notifications) {
        if let Err(e) = api.logout().await {
            toasts.error(format!("Erro ao sair: {e}"));
        }
        self.password.clear();
        self.state = GateState::Closed;
    }

    fn reject(&mut self, reason: &str, toasts: &Notifications) -> &GateState {
        toasts.error(reason);
        self.password.clear();
        self.state = GateState::Rejected {
            reason: reason.to_string(),
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use lobianco_core::store::ContentStore;

    use super::*;
    use crate::local::test_support::{Fixture, PASSWORD};
    use crate::notify::ToastKind;

    #[tokio::test]
    async fn wrong_password_clears_the_field_and_allows_retry() {
        let fixture = Fixture::new();
        let api = fixture.anonymous();
        let toasts = Notifications::default();
        let mut gate = AccessGate::new();

        gate.open();
        gate.set_password("errada");
        let state = gate.submit(&api, &toasts).await.clone();
        assert_eq!(
            state,
            GateState::Rejected {
                reason: MSG_WRONG_PASSWORD.to_string()
            }
        );
        assert_eq!(gate.password(), "");
        assert!(gate.is_open());
        assert_eq!(toasts.last().unwrap().kind, ToastKind::Error);

        gate.set_password(PASSWORD);
        assert!(matches!(gate.submit(&api, &toasts).await, GateState::Granted(_)));
        assert!(!gate.is_open());
        assert!(gate.granted_user().unwrap().is_admin());
    }

    #[tokio::test]
    async fn blank_password_never_reaches_the_server() {
        let fixture = Fixture::new();
        let api = fixture.anonymous();
        let toasts = Notifications::default();
        let mut gate = AccessGate::new();
        gate.open();
        gate.set_password("   ");

        let state = gate.submit(&api, &toasts).await.clone();
        assert_eq!(
            state,
            GateState::Rejected {
                reason: MSG_EMPTY_PASSWORD.to_string()
            }
        );
        assert!(fixture.store.get_user_by_open_id("owner").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn closed_gate_ignores_submissions() {
        let fixture = Fixture::new();
        let api = fixture.anonymous();
        let mut gate = AccessGate::new();
        gate.set_password(PASSWORD);
        assert_eq!(gate.submit(&api, &Notifications::default()).await, &GateState::Closed);
    }

    #[tokio::test]
    async fn existing_admin_session_is_restored_and_can_sign_out() {
        let fixture = Fixture::new();
        let api = fixture.admin().await;
        let toasts = Notifications::default();
        let mut gate = AccessGate::new();

        assert!(matches!(gate.restore(&api).await, GateState::Granted(_)));
        gate.sign_out(&api, &toasts).await;
        assert_eq!(gate.state(), &GateState::Closed);
        assert_eq!(api.me().await.unwrap(), None);

        let visitor = fixture.visitor().await;
        let mut gate = AccessGate::new();
        assert_eq!(gate.restore(&visitor).await, &GateState::Closed);
    }
}
