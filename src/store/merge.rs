//! Shallow merge of partial updates into a state value.
//!
//! A state type declares its partial-update shape through [`Merge::Patch`].
//! Merging never mutates the current value; it produces the next one, so a
//! rejected patch leaves nothing half-applied.

use super::error::MergeError;

pub trait Merge: Sized {
    type Patch;

    /// Build the next state from `self` with `patch` applied on top.
    /// Fields the patch does not mention keep their current value.
    fn merge(&self, patch: Self::Patch) -> Result<Self, MergeError>;
}

/// Dynamic mapping state. The patch must itself be a table; its top-level
/// keys replace the current ones wholesale (nested tables are not merged).
impl Merge for toml::Table {
    type Patch = toml::Value;

    fn merge(&self, patch: toml::Value) -> Result<Self, MergeError> {
        let patch = match patch {
            toml::Value::Table(patch) => patch,
            other => {
                return Err(MergeError::new(format!(
                    "expected a table patch, got {}",
                    other.type_str()
                )))
            }
        };
        let mut next = self.clone();
        next.extend(patch);
        Ok(next)
    }
}
