//! Rows: schema-bound vectors of field values.

use std::fmt;
use std::sync::Arc;

use crate::common::{Error, RecordId, Result};
use crate::tuple::field::Field;
use crate::tuple::schema::Schema;

/// One record conforming to a schema.
///
/// Fields start unset and are filled in by [`Tuple::set_field`], which
/// rejects values whose type does not match the owning column. A tuple
/// carries its storage location once persisted; rows built in memory or
/// produced by non-scan operators have none.
#[derive(Debug, Clone)]
pub struct Tuple {
    schema: Arc<Schema>,
    fields: Vec<Option<Field>>,
    record_id: Option<RecordId>,
}

impl Tuple {
    /// Create a tuple with all fields unset.
    pub fn new(schema: Arc<Schema>) -> Self {
        let fields = vec![None; schema.len()];
        Tuple {
            schema,
            fields,
            record_id: None,
        }
    }

    /// Create a tuple from a complete list of field values.
    ///
    /// Fails with `TypeMismatch` if any value does not conform to its
    /// column, or `SchemaMismatch` if the count is wrong.
    pub fn from_fields(schema: Arc<Schema>, values: Vec<Field>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(Error::SchemaMismatch(format!(
                "expected {} fields, got {}",
                schema.len(),
                values.len()
            )));
        }
        let mut tuple = Tuple::new(schema);
        for (i, v) in values.into_iter().enumerate() {
            tuple.set_field(i, v)?;
        }
        Ok(tuple)
    }

    /// The schema of this tuple.
    #[inline]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Set field `i`, checking bounds and type conformance.
    pub fn set_field(&mut self, i: usize, value: Field) -> Result<()> {
        let ty = self
            .schema
            .columns()
            .get(i)
            .map(|c| &c.ty)
            .ok_or(Error::IllegalState("field index out of bounds"))?;
        if !value.matches_type(ty) {
            return Err(Error::TypeMismatch(format!(
                "cannot assign {} to column {} of type {}",
                value, i, ty
            )));
        }
        self.fields[i] = Some(value);
        Ok(())
    }

    /// Value of field `i`, or `None` if unset or out of bounds.
    #[inline]
    pub fn field(&self, i: usize) -> Option<&Field> {
        self.fields.get(i).and_then(|f| f.as_ref())
    }

    /// Whether every field has been assigned.
    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(|f| f.is_some())
    }

    /// Storage location of this tuple, if persisted.
    #[inline]
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    /// Attach or clear the storage location.
    #[inline]
    pub fn set_record_id(&mut self, rid: Option<RecordId>) {
        self.record_id = rid;
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.fields == other.fields
    }
}

impl Eq for Tuple {}

impl fmt::Display for Tuple {
    /// Tab-separated field values; unset fields render as `NULL`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            match field {
                Some(v) => write!(f, "{}", v)?,
                None => write!(f, "NULL")?,
            }
        }
        Ok(())
    }
}
