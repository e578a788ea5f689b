//! Feature schema, encoding and column reconciliation

pub mod encoder;
pub mod reconcile;
pub mod schema;

pub use encoder::FeatureEncoder;
pub use reconcile::{reconcile, ColumnOutcome, Reconciliation};
pub use schema::FeatureSchema;

/// Numeric feature vector aligned with a [`FeatureSchema`].
///
/// Never mutated after construction; transforms produce a new vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector(Vec<f64>);

impl EncodedVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}
