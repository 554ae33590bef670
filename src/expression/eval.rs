//! Expression tree evaluation and compilation into predicates.

use crate::access::{DataType, Value};
use crate::expression::{ExpressionError, ExpressionResult, Node, ParameterRef, Tree};
use crate::schema::SchemaRegistry;
use log::{debug, warn};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Intermediate result of evaluating a node
enum Evaluated<'a> {
    Record {
        record_type: &'a str,
        value: &'a dyn Any,
    },
    Scalar(Value),
}

/// Evaluator for expression trees with bound arguments
pub struct ExpressionEvaluator<'a> {
    registry: &'a SchemaRegistry,
    parameters: &'a [ParameterRef],
    arguments: &'a [&'a dyn Any],
}

impl<'a> ExpressionEvaluator<'a> {
    /// Bind `arguments` positionally to `parameters`
    pub fn new(
        registry: &'a SchemaRegistry,
        parameters: &'a [ParameterRef],
        arguments: &'a [&'a dyn Any],
    ) -> ExpressionResult<Self> {
        if parameters.len() != arguments.len() {
            return Err(ExpressionError::ArgumentCount {
                expected: parameters.len(),
                actual: arguments.len(),
            });
        }
        Ok(Self {
            registry,
            parameters,
            arguments,
        })
    }

    /// Evaluate a node that yields a scalar value
    pub fn evaluate(&self, node: &Node) -> ExpressionResult<Value> {
        match self.evaluate_node(node)? {
            Evaluated::Scalar(value) => Ok(value),
            Evaluated::Record { record_type, .. } => Err(ExpressionError::type_mismatch(
                "scalar evaluation",
                "scalar",
                format!("record {}", record_type),
            )),
        }
    }

    /// Evaluate a node that yields a boolean
    pub fn evaluate_bool(&self, node: &Node) -> ExpressionResult<bool> {
        self.expect_bool(node, "predicate body")
    }

    fn evaluate_node(&self, node: &Node) -> ExpressionResult<Evaluated<'a>> {
        match node {
            Node::Parameter(param) => self.bind(param),

            Node::MemberAccess { receiver, field } => match self.evaluate_node(receiver)? {
                Evaluated::Record { record_type, value } => self
                    .registry
                    .lookup(record_type, field, value)
                    .map(Evaluated::Scalar),
                Evaluated::Scalar(value) => Err(ExpressionError::type_mismatch(
                    format!("member access .{}", field),
                    "record",
                    value.data_type(),
                )),
            },

            Node::Constant(value) => Ok(Evaluated::Scalar(value.clone())),

            Node::Comparison { op, left, right } => {
                let context = format!("comparison {}", op);
                let left_val = self.expect_scalar(left, &context)?;
                let right_val = self.expect_scalar(right, &context)?;
                match left_val.compare(&right_val) {
                    Some(ordering) => Ok(boolean(op.holds(ordering))),
                    None => Err(ExpressionError::type_mismatch(
                        context,
                        left_val.data_type(),
                        right_val.data_type(),
                    )),
                }
            }

            // Left operand first; the right one is not evaluated once the result is known
            Node::LogicalAnd { left, right } => {
                if !self.expect_bool(left, "AndAlso")? {
                    return Ok(boolean(false));
                }
                self.expect_bool(right, "AndAlso").map(boolean)
            }

            Node::LogicalOr { left, right } => {
                if self.expect_bool(left, "OrElse")? {
                    return Ok(boolean(true));
                }
                self.expect_bool(right, "OrElse").map(boolean)
            }

            Node::Not { operand } => self.expect_bool(operand, "Not").map(|b| boolean(!b)),
        }
    }

    fn bind(&self, param: &ParameterRef) -> ExpressionResult<Evaluated<'a>> {
        let parameters: &'a [ParameterRef] = self.parameters;
        parameters
            .iter()
            .zip(self.arguments.iter())
            .find(|(declared, _)| *declared == param)
            .map(|(declared, argument)| Evaluated::Record {
                record_type: declared.record_type.as_str(),
                value: *argument,
            })
            .ok_or_else(|| ExpressionError::UnboundVariable {
                name: param.name.clone(),
                record_type: param.record_type.clone(),
            })
    }

    fn expect_scalar(&self, node: &Node, context: &str) -> ExpressionResult<Value> {
        match self.evaluate_node(node)? {
            Evaluated::Scalar(value) => Ok(value),
            Evaluated::Record { record_type, .. } => Err(ExpressionError::type_mismatch(
                context,
                "scalar",
                format!("record {}", record_type),
            )),
        }
    }

    fn expect_bool(&self, node: &Node, context: &str) -> ExpressionResult<bool> {
        match self.expect_scalar(node, context)? {
            Value::Boolean(b) => Ok(b),
            other => Err(ExpressionError::type_mismatch(
                context,
                DataType::Boolean,
                other.data_type(),
            )),
        }
    }
}

fn boolean<'a>(b: bool) -> Evaluated<'a> {
    Evaluated::Scalar(Value::Boolean(b))
}

/// Type alias for plain predicate closures
pub type BoxedPredicate<R> = Box<dyn Fn(&R) -> bool + Send + Sync + 'static>;

/// A compiled, callable predicate.
///
/// Holds the tree and registry behind `Arc`s and never mutates either, so a
/// predicate can be cloned and called from any number of threads.
#[derive(Clone)]
pub struct Predicate {
    tree: Arc<Tree>,
    registry: Arc<SchemaRegistry>,
}

impl Predicate {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Number of arguments the predicate expects
    pub fn arity(&self) -> usize {
        self.tree.parameters().len()
    }

    /// Evaluate with one argument per declared parameter, in declaration order
    pub fn call(&self, arguments: &[&dyn Any]) -> ExpressionResult<bool> {
        let evaluator =
            ExpressionEvaluator::new(&self.registry, self.tree.parameters(), arguments)?;
        evaluator.evaluate_bool(self.tree.root())
    }

    /// Evaluate a single-parameter predicate against one record
    pub fn test<R: Any>(&self, record: &R) -> ExpressionResult<bool> {
        self.call(&[record as &dyn Any])
    }

    /// Records for which the predicate holds, in their original order
    pub fn filter<'r, R: Any>(&self, records: &'r [R]) -> ExpressionResult<Vec<&'r R>> {
        let mut selected = Vec::new();
        for record in records {
            if self.test(record)? {
                selected.push(record);
            }
        }
        Ok(selected)
    }

    /// Convert into a plain closure. Evaluation errors are logged and treated as false.
    pub fn into_fn<R: Any>(self) -> BoxedPredicate<R> {
        Box::new(move |record: &R| match self.test(record) {
            Ok(b) => b,
            Err(e) => {
                warn!("predicate {} failed: {}", self.tree, e);
                false
            }
        })
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("tree", &format_args!("{}", self.tree))
            .finish()
    }
}

/// Compile a tree into a callable predicate
pub fn compile(tree: &Tree, registry: &Arc<SchemaRegistry>) -> Predicate {
    debug!("compiling {} (depth {})", tree, tree.root().depth());
    Predicate {
        tree: Arc::new(tree.clone()),
        registry: Arc::clone(registry),
    }
}

impl Tree {
    /// Compile this tree into a callable predicate
    pub fn compile(&self, registry: &Arc<SchemaRegistry>) -> Predicate {
        compile(self, registry)
    }
}
