/// A vector valued quantity that remembers its previous value.
///
/// This is the narrow interface [`crate::ShieldedVector`] needs to add
/// per-component change tracking on top of an arbitrary quantity.
pub trait VectorValue {
    fn value(&self) -> &[f64];

    /// The value before the most recent `set_value`, if there was one.
    fn last_value(&self) -> Option<&[f64]>;

    fn set_value(&mut self, value: Vec<f64>);

    /// Restore the value before the most recent `set_value`.
    ///
    /// Does nothing if the value was never set.
    fn revert(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredVector {
    value: Vec<f64>,
    last_value: Option<Vec<f64>>,
}

impl StoredVector {
    pub fn new(value: Vec<f64>) -> Self {
        Self {
            value,
            last_value: None,
        }
    }
}

impl VectorValue for StoredVector {
    fn value(&self) -> &[f64] {
        &self.value
    }

    fn last_value(&self) -> Option<&[f64]> {
        self.last_value.as_deref()
    }

    fn set_value(&mut self, value: Vec<f64>) {
        let previous = std::mem::replace(&mut self.value, value);
        self.last_value = Some(previous);
    }

    fn revert(&mut self) {
        if let Some(last) = self.last_value.as_ref() {
            self.value.clone_from(last);
        }
    }
}
