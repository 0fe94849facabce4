//! Session store: the single owner of "who is signed in".
//!
//! Every mutation writes client storage first and only then updates the
//! in-memory identity, so the two never disagree. Restoring never fails: an
//! unreadable or malformed record degrades to "signed out".

use crate::models::{Identity, Role};
use crate::services::role_resolver::{DemoRoleInference, RoleResolver};
use crate::services::storage::{ClientStorage, StorageError};
use std::fmt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use thiserror::Error;

/// Client storage key holding the serialized [`Identity`].
pub const STORAGE_KEY: &str = "cleanwave_user";

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Email,
    FullName,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Email => f.write_str("email"),
            Credential::FullName => f.write_str("full name"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("The {field} must not be empty")]
    EmptyCredential { field: Credential },

    #[error("Password must be at least {min} characters (got {actual})")]
    PasswordTooShort { min: usize, actual: usize },

    #[error("Another sign-in is already in progress")]
    InFlight,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What [`SessionStore::restore`] found in client storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    Empty,
    /// A record was present but unusable and has been removed.
    Discarded,
}

/// Shared flag raised while an authenticate/register call is pending.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator(Arc<AtomicBool>);

impl BusyIndicator {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self.0.clone()))
    }
}

/// One [`BusyIndicator`] per client key, shared by every store built for that
/// key while any of them is alive. Entries whose stores are all gone are
/// pruned on the next lookup.
#[derive(Debug, Clone, Default)]
pub struct BusyRegistry {
    flags: Arc<Mutex<HashMap<String, Weak<AtomicBool>>>>,
}

impl BusyRegistry {
    pub fn indicator(&self, key: &str) -> BusyIndicator {
        let mut flags = self
            .flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        flags.retain(|_, flag| flag.strong_count() > 0);

        if let Some(flag) = flags.get(key).and_then(Weak::upgrade) {
            return BusyIndicator(flag);
        }

        let flag = Arc::new(AtomicBool::new(false));
        flags.insert(key.to_string(), Arc::downgrade(&flag));
        BusyIndicator(flag)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.flags
            .lock()
            .map(|flags| flags.values().filter(|f| f.strong_count() > 0).count())
            .unwrap_or(0)
    }
}

/// Lowers the busy flag when dropped, including when the pending future is
/// cancelled.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionStore<S> {
    storage: S,
    resolver: Arc<dyn RoleResolver>,
    auth_delay: Duration,
    busy: BusyIndicator,
    current: Option<Identity>,
}

impl<S: ClientStorage> SessionStore<S> {
    /// Creates a signed-out store. Call [`restore`](Self::restore) to pick up
    /// a previously persisted identity.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            resolver: Arc::new(DemoRoleInference),
            auth_delay: Duration::ZERO,
            busy: BusyIndicator::default(),
            current: None,
        }
    }

    pub fn with_role_resolver(mut self, resolver: Arc<dyn RoleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Simulated authentication latency applied to authenticate/register.
    pub fn with_auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = delay;
        self
    }

    /// Shares a busy flag with other stores over the same client storage.
    pub fn with_busy_indicator(mut self, busy: BusyIndicator) -> Self {
        self.busy = busy;
        self
    }

    pub async fn restore(&mut self) -> RestoreOutcome {
        let raw = match self.storage.get_item(STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.current = None;
                return RestoreOutcome::Empty;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Client storage unreadable, continuing signed out");
                self.current = None;
                return RestoreOutcome::Empty;
            }
        };

        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.id, role = %identity.role, "Session restored");
                self.current = Some(identity);
                RestoreOutcome::Restored
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupted session record");
                self.current = None;
                if let Err(e) = self.storage.remove_item(STORAGE_KEY).await {
                    tracing::warn!(error = %e, "Failed to remove corrupted session record");
                }
                RestoreOutcome::Discarded
            }
        }
    }

    /// Signs in with an email and password.
    ///
    /// The granted role comes from the configured [`RoleResolver`]; the
    /// display name is the part of the email before `@`.
    pub async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
        requested: Role,
    ) -> Result<Identity, SessionError> {
        let _busy = self.busy.acquire().ok_or(SessionError::InFlight)?;

        require_non_empty(email, Credential::Email)?;
        require_password(password)?;

        self.simulate_latency().await;

        let role = self.resolver.resolve(email, requested);
        let full_name = email.split('@').next().unwrap_or(email);
        let identity = Identity::new(email, full_name, role);

        self.install(identity).await
    }

    /// Creates an account and signs it in. The role is taken verbatim.
    pub async fn register(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity, SessionError> {
        let _busy = self.busy.acquire().ok_or(SessionError::InFlight)?;

        require_non_empty(full_name, Credential::FullName)?;
        require_non_empty(email, Credential::Email)?;
        require_password(password)?;

        self.simulate_latency().await;

        self.install(Identity::new(email, full_name, role)).await
    }

    /// Clears the persisted record and the in-memory identity. Safe to call
    /// when already signed out.
    pub async fn sign_out(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(STORAGE_KEY).await?;

        if let Some(identity) = self.current.take() {
            tracing::info!(user_id = %identity.id, "User signed out");
        }
        Ok(())
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn simulate_latency(&self) {
        if !self.auth_delay.is_zero() {
            tokio::time::sleep(self.auth_delay).await;
        }
    }

    async fn install(&mut self, identity: Identity) -> Result<Identity, SessionError> {
        let record = serde_json::to_string(&identity).map_err(StorageError::from)?;
        self.storage.set_item(STORAGE_KEY, record).await?;

        tracing::info!(
            user_id = %identity.id,
            email = %identity.email,
            role = %identity.role,
            "User signed in"
        );

        self.current = Some(identity.clone());
        Ok(identity)
    }
}

fn require_non_empty(value: &str, field: Credential) -> Result<(), SessionError> {
    if value.is_empty() {
        return Err(SessionError::EmptyCredential { field });
    }
    Ok(())
}

fn require_password(password: &str) -> Result<(), SessionError> {
    let actual = password.chars().count();
    if actual < MIN_PASSWORD_LEN {
        return Err(SessionError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::role_resolver::RequestedRole;
    use crate::services::storage::MemoryStorage;
    use async_trait::async_trait;

    async fn stored_record(storage: &MemoryStorage) -> Option<String> {
        storage.get_item(STORAGE_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_volunteer() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());

        let identity = store
            .authenticate("a@b.com", "secret1", Role::Volunteer)
            .await
            .unwrap();

        assert_eq!(identity.role, Role::Volunteer);
        assert_eq!(identity.full_name, "a");
        assert_eq!(store.current_identity(), Some(&identity));
        assert!(stored_record(&storage).await.is_some());
    }

    #[tokio::test]
    async fn test_authenticate_infers_organizer_from_email() {
        let mut store = SessionStore::new(MemoryStorage::new());

        let identity = store
            .authenticate("organizer@b.com", "secret1", Role::Volunteer)
            .await
            .unwrap();

        assert_eq!(identity.role, Role::Organizer);
        assert_eq!(store.current_identity().unwrap().role, Role::Organizer);
    }

    #[tokio::test]
    async fn test_authenticate_short_password_leaves_state_unchanged() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());

        let result = store.authenticate("a@b.com", "123", Role::Volunteer).await;

        assert!(matches!(
            result,
            Err(SessionError::PasswordTooShort { min: 6, actual: 3 })
        ));
        assert!(store.current_identity().is_none());
        assert!(stored_record(&storage).await.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_empty_email_rejected() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());

        let result = store.authenticate("", "secret1", Role::Organizer).await;

        assert!(matches!(
            result,
            Err(SessionError::EmptyCredential {
                field: Credential::Email
            })
        ));
        assert!(store.current_identity().is_none());
        assert!(stored_record(&storage).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_authenticate_keeps_previous_identity() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());
        let first = store
            .authenticate("a@b.com", "secret1", Role::Volunteer)
            .await
            .unwrap();
        let record = stored_record(&storage).await;

        assert!(store.authenticate("c@d.com", "12345", Role::Organizer).await.is_err());

        assert_eq!(store.current_identity(), Some(&first));
        assert_eq!(stored_record(&storage).await, record);
    }

    #[tokio::test]
    async fn test_password_length_counts_characters() {
        let mut store = SessionStore::new(MemoryStorage::new());
        // Six characters, more than six bytes
        assert!(store
            .authenticate("a@b.com", "éééééé", Role::Volunteer)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_register_takes_role_verbatim() {
        let mut store = SessionStore::new(MemoryStorage::new());

        let identity = store
            .register("Organizer Fan", "organizer@b.com", "secret1", Role::Volunteer)
            .await
            .unwrap();

        assert_eq!(identity.role, Role::Volunteer);
        assert_eq!(identity.full_name, "Organizer Fan");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());

        assert!(matches!(
            store.register("", "a@b.com", "secret1", Role::Volunteer).await,
            Err(SessionError::EmptyCredential {
                field: Credential::FullName
            })
        ));
        assert!(matches!(
            store.register("Asha", "", "secret1", Role::Volunteer).await,
            Err(SessionError::EmptyCredential {
                field: Credential::Email
            })
        ));
        assert!(matches!(
            store.register("Asha", "a@b.com", "short", Role::Volunteer).await,
            Err(SessionError::PasswordTooShort { .. })
        ));
        assert!(store.current_identity().is_none());
        assert!(stored_record(&storage).await.is_none());
    }

    #[tokio::test]
    async fn test_restore_after_restart() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());
        let identity = store
            .authenticate("a@b.com", "secret1", Role::Organizer)
            .await
            .unwrap();
        drop(store);

        let mut restarted = SessionStore::new(storage);
        assert_eq!(restarted.restore().await, RestoreOutcome::Restored);
        assert_eq!(restarted.current_identity(), Some(&identity));
    }

    #[tokio::test]
    async fn test_restore_empty() {
        let mut store = SessionStore::new(MemoryStorage::new());
        assert_eq!(store.restore().await, RestoreOutcome::Empty);
        assert!(store.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_restore_discards_corrupted_record() {
        let storage = MemoryStorage::new();
        storage
            .set_item(STORAGE_KEY, "{not json".to_string())
            .await
            .unwrap();

        let mut store = SessionStore::new(storage.clone());
        assert_eq!(store.restore().await, RestoreOutcome::Discarded);
        assert!(store.current_identity().is_none());
        assert!(stored_record(&storage).await.is_none());
    }

    #[tokio::test]
    async fn test_restore_discards_unknown_role() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                STORAGE_KEY,
                r#"{"id":"1","email":"a@b.com","fullName":"A","userType":"admin"}"#.to_string(),
            )
            .await
            .unwrap();

        let mut store = SessionStore::new(storage.clone());
        assert_eq!(store.restore().await, RestoreOutcome::Discarded);
        assert!(store.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_is_idempotent() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());
        store
            .authenticate("a@b.com", "secret1", Role::Volunteer)
            .await
            .unwrap();

        store.sign_out().await.unwrap();
        assert!(store.current_identity().is_none());
        assert!(stored_record(&storage).await.is_none());

        store.sign_out().await.unwrap();
        assert!(store.current_identity().is_none());
        assert!(stored_record(&storage).await.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_when_never_signed_in() {
        let mut store = SessionStore::new(MemoryStorage::new());
        store.sign_out().await.unwrap();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_requested_role_resolver() {
        let mut store =
            SessionStore::new(MemoryStorage::new()).with_role_resolver(Arc::new(RequestedRole));

        let identity = store
            .authenticate("organizer@b.com", "secret1", Role::Volunteer)
            .await
            .unwrap();
        assert_eq!(identity.role, Role::Volunteer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_authenticate_leaves_no_trace() {
        let storage = MemoryStorage::new();
        let mut store =
            SessionStore::new(storage.clone()).with_auth_delay(Duration::from_millis(1000));

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            store.authenticate("a@b.com", "secret1", Role::Volunteer),
        )
        .await;

        assert!(result.is_err());
        assert!(!store.is_busy());
        assert!(store.current_identity().is_none());
        assert!(stored_record(&storage).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_while_pending() {
        let storage = MemoryStorage::new();
        let busy = BusyIndicator::default();
        let mut first = SessionStore::new(storage.clone())
            .with_auth_delay(Duration::from_millis(1000))
            .with_busy_indicator(busy.clone());
        let mut second = SessionStore::new(storage.clone()).with_busy_indicator(busy.clone());

        let pending = tokio::spawn(async move {
            first
                .authenticate("a@b.com", "secret1", Role::Volunteer)
                .await
                .map(|identity| identity.email)
        });

        // Let the spawned task reach its sleep
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(busy.is_busy());
        assert!(matches!(
            second.register("B", "b@c.com", "secret1", Role::Organizer).await,
            Err(SessionError::InFlight)
        ));

        let email = pending.await.unwrap().unwrap();
        assert_eq!(email, "a@b.com");
        assert!(!busy.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_shares_flag_per_key() {
        let registry = BusyRegistry::default();
        let storage = MemoryStorage::new();
        let mut first = SessionStore::new(storage.clone())
            .with_auth_delay(Duration::from_millis(1000))
            .with_busy_indicator(registry.indicator("browser-1"));
        let mut same_browser =
            SessionStore::new(storage.clone()).with_busy_indicator(registry.indicator("browser-1"));
        let mut other_browser =
            SessionStore::new(MemoryStorage::new()).with_busy_indicator(registry.indicator("browser-2"));

        let pending = tokio::spawn(async move {
            first
                .authenticate("a@b.com", "secret1", Role::Volunteer)
                .await
                .is_ok()
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(same_browser.is_busy());
        assert!(matches!(
            same_browser
                .authenticate("organizer@b.com", "secret1", Role::Volunteer)
                .await,
            Err(SessionError::InFlight)
        ));
        assert!(other_browser
            .authenticate("c@d.com", "secret1", Role::Volunteer)
            .await
            .is_ok());

        assert!(pending.await.unwrap());
        assert!(!same_browser.is_busy());
    }

    #[test]
    fn test_registry_forgets_released_keys() {
        let registry = BusyRegistry::default();
        let held = registry.indicator("kept");
        drop(registry.indicator("released"));

        assert_eq!(registry.tracked(), 1);
        drop(held);
        assert_eq!(registry.tracked(), 0);
    }

    struct FailingStorage;

    #[async_trait]
    impl ClientStorage for FailingStorage {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Backend("offline".to_string()))
        }

        async fn set_item(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Backend("offline".to_string()))
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_diverge() {
        let mut store = SessionStore::new(FailingStorage);

        assert_eq!(store.restore().await, RestoreOutcome::Empty);

        let result = store
            .authenticate("a@b.com", "secret1", Role::Volunteer)
            .await;
        assert!(matches!(result, Err(SessionError::Storage(_))));
        assert!(store.current_identity().is_none());
        assert!(!store.is_busy());
    }
}
