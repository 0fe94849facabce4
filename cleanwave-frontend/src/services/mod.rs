pub mod authorization;
pub mod fixtures;
pub mod metrics;
pub mod role_resolver;
pub mod session_store;
pub mod storage;

pub use authorization::{authorize, AuthorizationGuard, Decision, RequiredRole};
pub use fixtures::FixtureCatalog;
pub use role_resolver::{DemoRoleInference, RequestedRole, RoleResolver};
pub use session_store::{
    BusyIndicator, BusyRegistry, Credential, RestoreOutcome, SessionError, SessionStore,
    STORAGE_KEY,
};
pub use storage::{ClientStorage, MemoryStorage, StorageError};
