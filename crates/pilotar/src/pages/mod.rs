//! Page objects, one module per application screen.

mod login;

pub use login::LoginPage;
