//! Schema registry for named field access.
//!
//! Record types are registered ahead of time with one typed accessor per
//! field. Member access nodes resolve `(record type, field name)` through
//! the registry instead of reflecting over the value.

use crate::access::{DataType, Value};
use crate::expression::{ExpressionError, ExpressionResult};
use log::debug;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Accessor = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;

/// A single declared field of a record schema
#[derive(Clone)]
pub struct FieldInfo {
    pub name: String,
    pub data_type: DataType,
    accessor: Accessor,
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .finish()
    }
}

/// Field layout of one record type
#[derive(Debug, Clone)]
pub struct RecordSchema {
    type_name: String,
    rust_type: TypeId,
    fields: Vec<FieldInfo>,
}

impl RecordSchema {
    /// Start declaring the schema for the Rust type `R`
    pub fn builder<R: Any>(type_name: impl Into<String>) -> RecordSchemaBuilder<R> {
        RecordSchemaBuilder {
            schema: RecordSchema {
                type_name: type_name.into(),
                rust_type: TypeId::of::<R>(),
                fields: Vec::new(),
            },
            _record: PhantomData,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `record` is an instance of the Rust type this schema describes
    pub fn describes(&self, record: &dyn Any) -> bool {
        record.type_id() == self.rust_type
    }
}

/// Typed builder for [`RecordSchema`]
pub struct RecordSchemaBuilder<R> {
    schema: RecordSchema,
    _record: PhantomData<fn(&R)>,
}

impl<R: Any> RecordSchemaBuilder<R> {
    /// Declare a field. Declaring the same name twice replaces the earlier accessor.
    pub fn field<F>(mut self, name: impl Into<String>, data_type: DataType, accessor: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        let accessor: Accessor =
            Arc::new(move |record: &dyn Any| record.downcast_ref::<R>().map(&accessor));
        let info = FieldInfo {
            name: name.clone(),
            data_type,
            accessor,
        };

        match self.schema.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => *existing = info,
            None => self.schema.fields.push(info),
        }
        self
    }

    pub fn build(self) -> RecordSchema {
        self.schema
    }
}

/// Registry of record schemas keyed by record type name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, replacing any previous schema with the same type name
    pub fn register(&mut self, schema: RecordSchema) {
        debug!(
            "registering record type '{}' with {} fields",
            schema.type_name,
            schema.fields.len()
        );
        self.schemas.insert(schema.type_name.clone(), schema);
    }

    pub fn schema(&self, type_name: &str) -> Option<&RecordSchema> {
        self.schemas.get(type_name)
    }

    /// Declared type of a field, checked at build time
    pub fn field_type(&self, type_name: &str, field: &str) -> ExpressionResult<DataType> {
        self.schema(type_name)
            .and_then(|schema| schema.field(field))
            .map(|info| info.data_type)
            .ok_or_else(|| ExpressionError::UnknownField {
                record_type: type_name.to_string(),
                field: field.to_string(),
            })
    }

    /// Read a field from a concrete record value
    pub fn lookup(&self, type_name: &str, field: &str, record: &dyn Any) -> ExpressionResult<Value> {
        let lookup_failed = || ExpressionError::FieldLookup {
            record_type: type_name.to_string(),
            field: field.to_string(),
        };

        let info = self
            .schema(type_name)
            .and_then(|schema| schema.field(field))
            .ok_or_else(lookup_failed)?;
        let value = (info.accessor)(record).ok_or_else(lookup_failed)?;

        if !value.is_compatible_with(info.data_type) {
            return Err(ExpressionError::type_mismatch(
                format!("field {}.{}", type_name, field),
                info.data_type,
                value.data_type(),
            ));
        }
        Ok(value)
    }
}
