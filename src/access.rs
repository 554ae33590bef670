//! Primitive value model.
//!
//! - **Value**: Type-safe representation of constants and field values
//! - **DataType**: The scalar types a field or constant can carry

pub mod value;

pub use value::{DataType, Value};
