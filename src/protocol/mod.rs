//! SMTP protocol handling.
//!
//! [`SmtpSession`] drives the line-oriented handshake over any async
//! stream; [`SmtpProbe`] owns connection setup and the two probe flavors
//! (liveness and authentication). Domain derivation from the server
//! banner lives in [`domain_from_banner`].

mod domain;
mod probe;
mod session;

pub use domain::{domain_from_banner, UNKNOWN_DOMAIN};
pub use probe::{Liveness, SmtpProbe};
pub use session::{SessionState, SmtpSession};
