//! Authfetch core: token codec, credential storage, mock issuance and user feedback
//!
//! Nothing in this crate performs network I/O. The HTTP server and the
//! authenticated request executor live in `authfetch-http`.

pub mod error;
pub mod feedback;
pub mod issuer;
pub mod login;
pub mod store;
pub mod token;

#[cfg(feature = "tracing")]
pub mod tracing;

pub use error::{Error, Result};
pub use feedback::{FeedbackChannel, FeedbackObserver, RecordingObserver, TracingObserver};
pub use issuer::{CredentialPair, IssuerConfig, REFRESH_TOKEN_PREFIX, TokenIssuer};
pub use login::{LoginFlow, LoginOutcome, process_login};
pub use store::{
    ACCESS_TOKEN, CredentialStore, FileCredentialStore, MemoryCredentialStore, REFRESH_TOKEN,
    TokenLifetimes,
};
pub use token::{DecodedToken, FormatValidation};
