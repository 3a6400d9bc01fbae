//! Admin session: durable storage, the login gate and authorized requests.

pub mod authorized;
pub mod gate;
pub mod navigator;
pub mod store;

pub use authorized::AuthorizedClient;
pub use gate::{CheckState, Destination, LoginTarget, SessionGate, SubmitState};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};
pub use store::{
    AdminSession, FileStorage, MemoryStorage, Role, SessionStorage, SessionStore, StorageError,
};
