pub mod credential_store;

pub use credential_store::{CredentialError, CredentialStore, CREDENTIAL_KEY};
