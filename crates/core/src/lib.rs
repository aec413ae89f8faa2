pub mod credential;
pub mod destination;
pub mod error;
pub mod notification;
pub mod provider;
pub mod result;

pub use credential::{Credential, CredentialStore, TokenStatus};
pub use destination::DeliveryPoint;
pub use error::{ErrorCategory, PushError};
pub use notification::{MSG_GROUP_KEY, Notification, TTL_KEY};
pub use provider::ProviderRecord;
pub use result::{PushOutcome, PushResult};
