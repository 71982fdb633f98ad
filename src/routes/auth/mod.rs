pub mod claims;
pub mod error;
pub mod issuer;
pub mod login;
pub mod logout;
pub mod profile;
pub mod refresh;
pub mod session;
pub mod signup;

pub use login::handle_login;
pub use logout::handle_logout;
pub use profile::handle_profile;
pub use refresh::handle_refresh;
pub use signup::handle_signup;

#[cfg(test)]
pub(crate) mod test_support;
