//! Built-in test cases, composed from page objects.

pub mod login;

use crate::harness::Suite;

/// The full built-in suite.
#[must_use]
pub fn all() -> Suite {
    login::suite()
}

fn ensure(condition: bool, message: &str) -> crate::result::PilotarResult<()> {
    if condition {
        Ok(())
    } else {
        Err(crate::result::PilotarError::assertion(message))
    }
}
