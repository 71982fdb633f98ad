pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod product;
pub mod signup;
pub mod user;
