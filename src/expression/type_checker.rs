//! Type checking for expression trees.

use crate::access::DataType;
use crate::expression::{
    ComparisonOperator, ExpressionError, ExpressionResult, Node, NodeType, Tree,
};
use crate::schema::SchemaRegistry;

/// Type checker for expression trees
pub struct TypeChecker<'a> {
    /// Schemas used to resolve member access types
    registry: &'a SchemaRegistry,
}

impl<'a> TypeChecker<'a> {
    /// Create a new type checker over the given registry
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Type check a node and return its output type
    pub fn check(&self, node: &Node) -> ExpressionResult<NodeType> {
        match node {
            Node::Parameter(param) => Ok(NodeType::Record(param.record_type.clone())),

            Node::MemberAccess { receiver, field } => {
                let receiver_type = self.check(receiver)?;
                self.member_type(&receiver_type, field)
            }

            Node::Constant(value) => Ok(NodeType::Scalar(value.data_type())),

            Node::Comparison { op, left, right } => {
                let left_type = self.check(left)?;
                let right_type = self.check(right)?;
                self.comparison_type(*op, &left_type, &right_type)
            }

            Node::LogicalAnd { left, right } => {
                let left_type = self.check(left)?;
                let right_type = self.check(right)?;
                self.logical_type("AndAlso", &left_type, &right_type)
            }

            Node::LogicalOr { left, right } => {
                let left_type = self.check(left)?;
                let right_type = self.check(right)?;
                self.logical_type("OrElse", &left_type, &right_type)
            }

            Node::Not { operand } => {
                let operand_type = self.check(operand)?;
                self.not_type(&operand_type)
            }
        }
    }

    /// Output type of a node whose children have already been checked.
    ///
    /// Only member access looks at its receiver; operators are boolean by
    /// construction, so the walk never descends into their operands.
    pub fn output_type(&self, node: &Node) -> ExpressionResult<NodeType> {
        match node {
            Node::Parameter(param) => Ok(NodeType::Record(param.record_type.clone())),
            Node::MemberAccess { receiver, field } => {
                let receiver_type = self.output_type(receiver)?;
                self.member_type(&receiver_type, field)
            }
            Node::Constant(value) => Ok(NodeType::Scalar(value.data_type())),
            Node::Comparison { .. }
            | Node::LogicalAnd { .. }
            | Node::LogicalOr { .. }
            | Node::Not { .. } => Ok(NodeType::BOOLEAN),
        }
    }

    /// Check that a tree's body is a boolean predicate
    pub fn check_predicate(&self, tree: &Tree) -> ExpressionResult<()> {
        let output_type = self.check(tree.root())?;
        self.expect_boolean("predicate body", &output_type)
    }

    /// Output type of reading `field` from a value of `receiver_type`
    pub fn member_type(&self, receiver_type: &NodeType, field: &str) -> ExpressionResult<NodeType> {
        match receiver_type {
            NodeType::Record(record_type) => self
                .registry
                .field_type(record_type, field)
                .map(NodeType::Scalar),
            NodeType::Scalar(data_type) => Err(ExpressionError::type_mismatch(
                format!("member access .{}", field),
                "record",
                data_type,
            )),
        }
    }

    /// Output type of a comparison; operands must share one scalar type
    pub fn comparison_type(
        &self,
        op: ComparisonOperator,
        left: &NodeType,
        right: &NodeType,
    ) -> ExpressionResult<NodeType> {
        match (left, right) {
            (NodeType::Scalar(lt), NodeType::Scalar(rt)) if lt == rt => Ok(NodeType::BOOLEAN),
            (NodeType::Scalar(_), _) => Err(ExpressionError::type_mismatch(
                format!("comparison {}", op),
                left,
                right,
            )),
            (NodeType::Record(_), _) => Err(ExpressionError::type_mismatch(
                format!("comparison {}", op),
                "scalar",
                left,
            )),
        }
    }

    /// Output type of a binary logical operator
    pub fn logical_type(
        &self,
        context: &str,
        left: &NodeType,
        right: &NodeType,
    ) -> ExpressionResult<NodeType> {
        self.expect_boolean(context, left)?;
        self.expect_boolean(context, right)?;
        Ok(NodeType::BOOLEAN)
    }

    /// Output type of a logical negation
    pub fn not_type(&self, operand: &NodeType) -> ExpressionResult<NodeType> {
        self.expect_boolean("Not", operand)?;
        Ok(NodeType::BOOLEAN)
    }

    fn expect_boolean(&self, context: &str, actual: &NodeType) -> ExpressionResult<()> {
        match actual {
            NodeType::Scalar(DataType::Boolean) => Ok(()),
            other => Err(ExpressionError::type_mismatch(
                context,
                DataType::Boolean,
                other,
            )),
        }
    }
}

/// Helper function to validate a tree as a predicate
pub fn validate_predicate(tree: &Tree, registry: &SchemaRegistry) -> ExpressionResult<()> {
    TypeChecker::new(registry).check_predicate(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Value;
    use crate::schema::RecordSchema;

    struct Item {
        qty: i32,
        sku: String,
        active: bool,
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(
            RecordSchema::builder::<Item>("Item")
                .field("Qty", DataType::Int32, |i| Value::Int32(i.qty))
                .field("Sku", DataType::Varchar, |i| Value::String(i.sku.clone()))
                .field("Active", DataType::Boolean, |i| Value::Boolean(i.active))
                .build(),
        );
        registry
    }

    #[test]
    fn test_leaf_types() {
        let registry = registry();
        let checker = TypeChecker::new(&registry);

        assert_eq!(
            checker.check(&Node::parameter("i", "Item")).unwrap(),
            NodeType::Record("Item".to_string())
        );
        assert_eq!(
            checker.check(&Node::constant(5)).unwrap(),
            NodeType::Scalar(DataType::Int32)
        );
        assert_eq!(
            checker.check(&Node::constant("a")).unwrap(),
            NodeType::Scalar(DataType::Varchar)
        );
    }

    #[test]
    fn test_member_access_types() {
        let registry = registry();
        let checker = TypeChecker::new(&registry);
        let item = Node::parameter("i", "Item");

        assert_eq!(
            checker.check(&item.member("Qty")).unwrap(),
            NodeType::Scalar(DataType::Int32)
        );
        assert_eq!(
            checker.check(&item.member("Active")).unwrap(),
            NodeType::BOOLEAN
        );

        assert!(matches!(
            checker.check(&item.member("Price")),
            Err(ExpressionError::UnknownField { .. })
        ));

        // Member access on a scalar
        assert!(matches!(
            checker.check(&item.member("Qty").member("Low")),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_output_type_stays_shallow() {
        let registry = registry();
        let checker = TypeChecker::new(&registry);
        let item = Node::parameter("i", "Item");

        assert_eq!(
            checker.output_type(&item.member("Sku")).unwrap(),
            NodeType::Scalar(DataType::Varchar)
        );
        assert!(matches!(
            checker.output_type(&item.member("Price")),
            Err(ExpressionError::UnknownField { .. })
        ));

        // Operands of an operator are not revisited
        let mismatched = item.member("Qty").equals("10");
        assert_eq!(checker.output_type(&mismatched).unwrap(), NodeType::BOOLEAN);
        assert!(checker.check(&mismatched).is_err());
    }

    #[test]
    fn test_comparison_types() {
        let registry = registry();
        let checker = TypeChecker::new(&registry);
        let item = Node::parameter("i", "Item");

        assert_eq!(
            checker.check(&item.member("Qty").ge(10)).unwrap(),
            NodeType::BOOLEAN
        );
        assert_eq!(
            checker.check(&item.member("Sku").equals("A-1")).unwrap(),
            NodeType::BOOLEAN
        );

        // No coercion between int and string
        assert!(matches!(
            checker.check(&item.member("Qty").equals("10")),
            Err(ExpressionError::TypeMismatch { .. })
        ));

        // Records are not comparable
        assert!(matches!(
            checker.check(&item.clone().equals(item.clone())),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_logical_types() {
        let registry = registry();
        let checker = TypeChecker::new(&registry);
        let item = Node::parameter("i", "Item");

        let expr = item.member("Active").and(item.member("Qty").gt(0));
        assert_eq!(checker.check(&expr).unwrap(), NodeType::BOOLEAN);

        let expr = item.member("Active").or(item.member("Qty"));
        assert!(matches!(
            checker.check(&expr),
            Err(ExpressionError::TypeMismatch { .. })
        ));

        let expr = item.member("Sku").negate();
        assert!(matches!(
            checker.check(&expr),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_check_predicate() {
        let registry = registry();
        let item = Node::parameter("i", "Item");

        let tree = Tree::new(item.member("Qty").gt(3), vec![item.clone()]).unwrap();
        assert!(validate_predicate(&tree, &registry).is_ok());

        let tree = Tree::new(item.member("Qty"), vec![item.clone()]).unwrap();
        assert!(matches!(
            validate_predicate(&tree, &registry),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }
}
