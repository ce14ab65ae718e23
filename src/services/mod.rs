//! Service layer for SoulVault
//!
//! Ties the stores, the oracle and the enhancer together into the flows the
//! CLI runs: unlocking a session and recording consultations.

pub mod consultation;
pub mod session;

pub use consultation::consult;
pub use session::Session;
