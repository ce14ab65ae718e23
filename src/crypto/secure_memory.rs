//! Password buffers for the CLI
//!
//! Passwords read from flags or prompts are held as `SecureString`, which wipes
//! its buffer on drop and never prints its contents.

use std::fmt;
use std::ops::Deref;

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A password that is zeroed on drop and redacted when formatted
pub struct SecureString(Zeroizing<String>);

impl SecureString {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare two entries (e.g. password and confirmation) without early exit
    pub fn same_as(&self, other: &SecureString) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString([REDACTED])")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
