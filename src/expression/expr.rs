//! Expression tree node definitions.

use crate::access::{DataType, Value};
use crate::expression::operator::ComparisonOperator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, record-typed input slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterRef {
    /// Variable name, e.g. `s`
    pub name: String,
    /// Name of the record schema the parameter is bound to
    pub record_type: String,
}

impl ParameterRef {
    pub fn new(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
        }
    }
}

/// Static result type of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
    Record(String),
    Scalar(DataType),
}

impl NodeType {
    pub const BOOLEAN: NodeType = NodeType::Scalar(DataType::Boolean);
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Record(name) => write!(f, "record {}", name),
            NodeType::Scalar(data_type) => write!(f, "{}", data_type),
        }
    }
}

/// Expression tree node
///
/// The constructors on this type do not validate anything. Use
/// [`TreeBuilder`](crate::expression::TreeBuilder) to get build-time type
/// and field checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Record-typed input slot
    Parameter(ParameterRef),

    /// Field read on the record produced by `receiver`
    MemberAccess { receiver: Box<Node>, field: String },

    /// Literal constant value
    Constant(Value),

    /// Binary comparison yielding a boolean
    Comparison {
        op: ComparisonOperator,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Short-circuit conjunction
    LogicalAnd { left: Box<Node>, right: Box<Node> },

    /// Short-circuit disjunction
    LogicalOr { left: Box<Node>, right: Box<Node> },

    /// Logical negation
    Not { operand: Box<Node> },
}

impl Node {
    /// Create a parameter node
    pub fn parameter(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Node::Parameter(ParameterRef::new(name, record_type))
    }

    /// Create a constant node
    pub fn constant(value: impl Into<Value>) -> Self {
        Node::Constant(value.into())
    }

    /// Create a member access node reading `field` from `receiver`
    pub fn member_access(receiver: Node, field: impl Into<String>) -> Self {
        Node::MemberAccess {
            receiver: Box::new(receiver),
            field: field.into(),
        }
    }

    /// Create a comparison node
    pub fn comparison(op: ComparisonOperator, left: Node, right: Node) -> Self {
        Node::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create an AND node
    pub fn logical_and(left: Node, right: Node) -> Self {
        Node::LogicalAnd {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create an OR node
    pub fn logical_or(left: Node, right: Node) -> Self {
        Node::LogicalOr {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a NOT node
    pub fn logical_not(operand: Node) -> Self {
        Node::Not {
            operand: Box::new(operand),
        }
    }

    // Fluent forms, so a predicate reads close to how it would be written
    // inline: `s.member("Age").gt(12).and(s.member("Age").lt(20))`.

    pub fn member(&self, field: impl Into<String>) -> Node {
        Node::member_access(self.clone(), field)
    }

    pub fn gt(self, rhs: impl Into<Node>) -> Node {
        Node::comparison(ComparisonOperator::Gt, self, rhs.into())
    }

    pub fn lt(self, rhs: impl Into<Node>) -> Node {
        Node::comparison(ComparisonOperator::Lt, self, rhs.into())
    }

    pub fn ge(self, rhs: impl Into<Node>) -> Node {
        Node::comparison(ComparisonOperator::Ge, self, rhs.into())
    }

    pub fn le(self, rhs: impl Into<Node>) -> Node {
        Node::comparison(ComparisonOperator::Le, self, rhs.into())
    }

    pub fn equals(self, rhs: impl Into<Node>) -> Node {
        Node::comparison(ComparisonOperator::Eq, self, rhs.into())
    }

    pub fn not_equals(self, rhs: impl Into<Node>) -> Node {
        Node::comparison(ComparisonOperator::Ne, self, rhs.into())
    }

    pub fn and(self, rhs: Node) -> Node {
        Node::logical_and(self, rhs)
    }

    pub fn or(self, rhs: Node) -> Node {
        Node::logical_or(self, rhs)
    }

    pub fn negate(self) -> Node {
        Node::logical_not(self)
    }

    /// Returns the parameter if this node is one
    pub fn as_parameter(&self) -> Option<&ParameterRef> {
        match self {
            Node::Parameter(param) => Some(param),
            _ => None,
        }
    }

    /// Collect every parameter referenced in this subtree, in visiting order
    pub fn referenced_parameters(&self) -> Vec<&ParameterRef> {
        let mut params = Vec::new();
        self.collect_parameters(&mut params);
        params
    }

    fn collect_parameters<'a>(&'a self, out: &mut Vec<&'a ParameterRef>) {
        match self {
            Node::Parameter(param) => out.push(param),
            Node::MemberAccess { receiver, .. } => receiver.collect_parameters(out),
            Node::Constant(_) => {}
            Node::Comparison { left, right, .. }
            | Node::LogicalAnd { left, right }
            | Node::LogicalOr { left, right } => {
                left.collect_parameters(out);
                right.collect_parameters(out);
            }
            Node::Not { operand } => operand.collect_parameters(out),
        }
    }

    /// Depth of the subtree rooted at this node
    pub fn depth(&self) -> usize {
        match self {
            Node::Parameter(_) | Node::Constant(_) => 1,
            Node::MemberAccess { receiver, .. } => 1 + receiver.depth(),
            Node::Comparison { left, right, .. }
            | Node::LogicalAnd { left, right }
            | Node::LogicalOr { left, right } => 1 + left.depth().max(right.depth()),
            Node::Not { operand } => 1 + operand.depth(),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Constant(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Constant(Value::Int32(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Constant(Value::Boolean(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Constant(Value::from(value))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Parameter(param) => f.write_str(&param.name),
            Node::MemberAccess { receiver, field } => write!(f, "{}.{}", receiver, field),
            Node::Constant(value) => write!(f, "{}", value),
            Node::Comparison { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Node::LogicalAnd { left, right } => write!(f, "({} AndAlso {})", left, right),
            Node::LogicalOr { left, right } => write!(f, "({} OrElse {})", left, right),
            Node::Not { operand } => write!(f, "Not({})", operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_matches_constructors() {
        let s = Node::parameter("s", "Student");
        let fluent = s.member("Age").gt(12);
        let explicit = Node::comparison(
            ComparisonOperator::Gt,
            Node::member_access(Node::parameter("s", "Student"), "Age"),
            Node::constant(12),
        );
        assert_eq!(fluent, explicit);
    }

    #[test]
    fn test_referenced_parameters() {
        let s = Node::parameter("s", "Student");
        let t = Node::parameter("t", "Student");
        let node = s.member("Age").lt(t.member("Age")).and(s.member("Name").equals("x1"));

        let names: Vec<&str> = node
            .referenced_parameters()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["s", "t", "s"]);

        assert!(Node::constant(true).referenced_parameters().is_empty());
    }

    #[test]
    fn test_depth() {
        let s = Node::parameter("s", "Student");
        assert_eq!(s.depth(), 1);
        assert_eq!(s.member("Age").depth(), 2);
        assert_eq!(s.member("Age").gt(12).depth(), 3);
        assert_eq!(s.member("Age").gt(12).negate().depth(), 4);
    }

    #[test]
    fn test_display() {
        let s = Node::parameter("s", "Student");
        let node = s.member("Age").gt(12).and(s.member("Age").lt(20));
        assert_eq!(node.to_string(), "((s.Age > 12) AndAlso (s.Age < 20))");

        let node = s.member("Name").equals("x4").or(Node::constant(false).negate());
        assert_eq!(
            node.to_string(),
            "((s.Name == \"x4\") OrElse Not(false))"
        );
    }

    #[test]
    fn test_node_type_display() {
        assert_eq!(NodeType::Record("Student".into()).to_string(), "record Student");
        assert_eq!(NodeType::BOOLEAN.to_string(), "bool");
    }
}
