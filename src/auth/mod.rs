//! OAuth2 credential persistence, refresh and authorization-code bootstrap.

pub mod credential;
pub mod endpoints;
pub mod flow;
pub mod sink;

pub use credential::{Credential, CredentialStore, StoreOptions};
pub use endpoints::{OAuthEndpoints, AUTHORIZATION_URL, OOB_REDIRECT_URI, TOKEN_URL};
pub use flow::{authorize, AuthorizeParams, ConsoleInteraction, Interaction, Scopes};
pub use sink::{CredentialSink, FileSink};
