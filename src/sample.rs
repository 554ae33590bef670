//! Student records used by the demo binary and the integration tests.

use crate::access::{DataType, Value};
use crate::expression::{ComparisonOperator, ExpressionResult, Node, Tree, TreeBuilder};
use crate::schema::{RecordSchema, SchemaRegistry};

pub const STUDENT: &str = "Student";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub name: String,
    pub age: i32,
}

impl Student {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

pub fn student_schema() -> RecordSchema {
    RecordSchema::builder::<Student>(STUDENT)
        .field("Name", DataType::Varchar, |s| Value::String(s.name.clone()))
        .field("Age", DataType::Int32, |s| Value::Int32(s.age))
        .build()
}

/// Registry with the `Student` schema registered
pub fn sample_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(student_schema());
    registry
}

pub fn sample_students() -> Vec<Student> {
    vec![
        Student::new("x1", 13),
        Student::new("x2", 27),
        Student::new("x3", 19),
        Student::new("x4", 12),
    ]
}

/// `s => s.Age > min && s.Age < max`, written with the fluent combinators
pub fn age_between_tree(min: i32, max: i32) -> ExpressionResult<Tree> {
    let s = Node::parameter("s", STUDENT);
    let body = s.member("Age").gt(min).and(s.member("Age").lt(max));
    Tree::new(body, vec![s])
}

/// `s => s.Age >= age`, assembled node by node
pub fn min_age_tree(registry: &SchemaRegistry, age: i32) -> ExpressionResult<Tree> {
    let builder = TreeBuilder::new(registry);

    // s
    let s = builder.parameter("s", STUDENT);
    // s.Age
    let member = builder.member_access(s.clone(), "Age")?;
    // 18
    let constant = builder.constant(age);
    // s.Age >= 18
    let body = builder.comparison(ComparisonOperator::Ge, member, constant)?;

    builder.make_tree(body, vec![s])
}

/// Comma separated names, the way the demo prints a selection
pub fn names(students: &[&Student]) -> String {
    students
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
