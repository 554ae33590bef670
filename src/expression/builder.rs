//! Checked construction of expression trees.
//!
//! Every call validates its operands against the schema registry, so type
//! and field errors surface while the tree is being assembled rather than
//! the first time it is evaluated.
//!
//! Operands are assumed to come from the same builder: each call only types
//! the nodes it is handed, not their subtrees. `make_tree` checks the whole
//! tree once more, which catches operands assembled elsewhere.

use crate::access::Value;
use crate::expression::{ComparisonOperator, ExpressionResult, Node, Tree, TypeChecker};
use crate::schema::SchemaRegistry;
use log::debug;

/// Builder for validated expression trees
pub struct TreeBuilder<'a> {
    checker: TypeChecker<'a>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a new builder over the given registry
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            checker: TypeChecker::new(registry),
        }
    }

    /// Create a parameter node
    pub fn parameter(&self, name: impl Into<String>, record_type: impl Into<String>) -> Node {
        Node::parameter(name, record_type)
    }

    /// Create a member access node, checking the field exists on the receiver's schema
    pub fn member_access(&self, receiver: Node, field: impl Into<String>) -> ExpressionResult<Node> {
        let field = field.into();
        let receiver_type = self.checker.output_type(&receiver)?;
        self.checker.member_type(&receiver_type, &field)?;
        Ok(Node::member_access(receiver, field))
    }

    /// Create a constant node
    pub fn constant(&self, value: impl Into<Value>) -> Node {
        Node::constant(value)
    }

    /// Create a comparison node, checking the operands are comparable
    pub fn comparison(
        &self,
        op: ComparisonOperator,
        left: Node,
        right: Node,
    ) -> ExpressionResult<Node> {
        let left_type = self.checker.output_type(&left)?;
        let right_type = self.checker.output_type(&right)?;
        self.checker.comparison_type(op, &left_type, &right_type)?;
        Ok(Node::comparison(op, left, right))
    }

    /// Create an AND node, checking both children are boolean
    pub fn logical_and(&self, left: Node, right: Node) -> ExpressionResult<Node> {
        let left_type = self.checker.output_type(&left)?;
        let right_type = self.checker.output_type(&right)?;
        self.checker.logical_type("AndAlso", &left_type, &right_type)?;
        Ok(Node::logical_and(left, right))
    }

    /// Create an OR node, checking both children are boolean
    pub fn logical_or(&self, left: Node, right: Node) -> ExpressionResult<Node> {
        let left_type = self.checker.output_type(&left)?;
        let right_type = self.checker.output_type(&right)?;
        self.checker.logical_type("OrElse", &left_type, &right_type)?;
        Ok(Node::logical_or(left, right))
    }

    /// Create a NOT node, checking the operand is boolean
    pub fn logical_not(&self, operand: Node) -> ExpressionResult<Node> {
        let operand_type = self.checker.output_type(&operand)?;
        self.checker.not_type(&operand_type)?;
        Ok(Node::logical_not(operand))
    }

    /// Bind a root to its parameters and check it is a boolean predicate
    pub fn make_tree(&self, root: Node, parameters: Vec<Node>) -> ExpressionResult<Tree> {
        let tree = Tree::new(root, parameters)?;
        self.checker.check_predicate(&tree)?;
        debug!("validated predicate {}", tree);
        Ok(tree)
    }
}
