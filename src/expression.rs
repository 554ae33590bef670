//! Expression trees for record predicates.
//!
//! This module provides:
//! - Node and tree representation of predicates
//! - Checked tree construction against a schema registry
//! - Type checking and validation
//! - Compilation of trees into callable predicates

pub mod builder;
pub mod error;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod tree;
pub mod type_checker;

pub use builder::TreeBuilder;
pub use error::{ExpressionError, ExpressionResult};
pub use eval::{compile, BoxedPredicate, ExpressionEvaluator, Predicate};
pub use expr::{Node, NodeType, ParameterRef};
pub use operator::ComparisonOperator;
pub use tree::Tree;
pub use type_checker::{validate_predicate, TypeChecker};
