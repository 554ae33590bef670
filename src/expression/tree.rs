//! A predicate body together with its declared parameters.

use crate::expression::{ExpressionError, ExpressionResult, Node, ParameterRef};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Root node plus the ordered list of parameters it is evaluated against.
///
/// Every parameter referenced by the root is guaranteed to be declared.
/// Deserialized trees go through the same binding checks as [`Tree::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct Tree {
    root: Node,
    parameters: Vec<ParameterRef>,
}

/// Serialized shape of a [`Tree`] before its bindings are checked
#[derive(Deserialize)]
struct RawTree {
    root: Node,
    parameters: Vec<ParameterRef>,
}

impl TryFrom<RawTree> for Tree {
    type Error = ExpressionError;

    fn try_from(raw: RawTree) -> ExpressionResult<Self> {
        let parameters = raw.parameters.into_iter().map(Node::Parameter).collect();
        Tree::new(raw.root, parameters)
    }
}

impl Tree {
    /// Build a tree from a root and its parameter nodes.
    ///
    /// Checks variable binding only. Field and type checks are done by
    /// [`TreeBuilder::make_tree`](crate::expression::TreeBuilder::make_tree).
    pub fn new(root: Node, parameters: Vec<Node>) -> ExpressionResult<Self> {
        let mut declared = Vec::with_capacity(parameters.len());
        let mut names = HashSet::new();

        for node in parameters {
            let param = match node {
                Node::Parameter(param) => param,
                other => {
                    return Err(ExpressionError::type_mismatch(
                        "tree parameter list",
                        "parameter",
                        other,
                    ))
                }
            };
            if !names.insert(param.name.clone()) {
                return Err(ExpressionError::DuplicateParameter { name: param.name });
            }
            declared.push(param);
        }

        if let Some(unbound) = root
            .referenced_parameters()
            .into_iter()
            .find(|referenced| !declared.contains(*referenced))
        {
            return Err(ExpressionError::UnboundVariable {
                name: unbound.name.clone(),
                record_type: unbound.record_type.clone(),
            });
        }

        debug!("built expression tree {}", DisplayLambda(&root, &declared));
        Ok(Self {
            root,
            parameters: declared,
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn parameters(&self) -> &[ParameterRef] {
        &self.parameters
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&DisplayLambda(&self.root, &self.parameters), f)
    }
}

struct DisplayLambda<'a>(&'a Node, &'a [ParameterRef]);

impl fmt::Display for DisplayLambda<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DisplayLambda(root, params) = self;
        match params {
            [single] => write!(f, "{} => {}", single.name, root),
            _ => {
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                write!(f, "({}) => {}", names.join(", "), root)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_binds_parameters() {
        let s = Node::parameter("s", "Student");
        let tree = Tree::new(s.member("Age").ge(18), vec![s.clone()]).unwrap();
        assert_eq!(tree.parameters(), &[ParameterRef::new("s", "Student")]);
        assert_eq!(tree.root(), &s.member("Age").ge(18));
    }

    #[test]
    fn test_unbound_variable() {
        let s = Node::parameter("s", "Student");
        let t = Node::parameter("t", "Student");

        let result = Tree::new(t.member("Age").ge(18), vec![s.clone()]);
        assert_eq!(
            result,
            Err(ExpressionError::UnboundVariable {
                name: "t".to_string(),
                record_type: "Student".to_string(),
            })
        );

        // Same name, different record type
        let other = Node::parameter("s", "Teacher");
        assert!(matches!(
            Tree::new(other.member("Age").ge(18), vec![s]),
            Err(ExpressionError::UnboundVariable { .. })
        ));
    }

    #[test]
    fn test_duplicate_parameter() {
        let s = Node::parameter("s", "Student");
        assert!(matches!(
            Tree::new(Node::constant(true), vec![s.clone(), s]),
            Err(ExpressionError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_non_parameter_in_list() {
        assert!(matches!(
            Tree::new(Node::constant(true), vec![Node::constant(1)]),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unused_parameter_allowed() {
        let s = Node::parameter("s", "Student");
        let tree = Tree::new(Node::constant(true), vec![s]).unwrap();
        assert_eq!(tree.parameters().len(), 1);
    }

    #[test]
    fn test_deserialize_checks_bindings() {
        let s = Node::parameter("s", "Student");
        let t = Node::parameter("t", "Student");
        let tree = Tree::new(s.member("Age").ge(18), vec![s.clone()]).unwrap();
        let bytes = bincode::serialize(&tree).unwrap();
        assert_eq!(bincode::deserialize::<Tree>(&bytes).unwrap(), tree);

        // Same layout as a tree, but the body reads an undeclared `t`
        let unbound = (t.member("Age").ge(18), vec![ParameterRef::new("s", "Student")]);
        let bytes = bincode::serialize(&unbound).unwrap();
        assert!(bincode::deserialize::<Tree>(&bytes).is_err());

        let duplicated = (
            Node::constant(true),
            vec![ParameterRef::new("s", "Student"), ParameterRef::new("s", "Student")],
        );
        let bytes = bincode::serialize(&duplicated).unwrap();
        assert!(bincode::deserialize::<Tree>(&bytes).is_err());
    }

    #[test]
    fn test_display() {
        let s = Node::parameter("s", "Student");
        let tree = Tree::new(s.member("Age").ge(18), vec![s.clone()]).unwrap();
        assert_eq!(tree.to_string(), "s => (s.Age >= 18)");

        let a = Node::parameter("a", "Student");
        let b = Node::parameter("b", "Student");
        let tree = Tree::new(a.member("Age").lt(b.member("Age")), vec![a, b]).unwrap();
        assert_eq!(tree.to_string(), "(a, b) => (a.Age < b.Age)");
    }
}
