pub mod cookies;
pub mod jwt;
pub mod password;
