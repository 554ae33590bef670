pub mod access;
pub mod expression;
#[cfg(feature = "demo")]
pub mod sample;
pub mod schema;
