//! Shallow field diffing for mutation audit entries.
//!
//! Services compare each patch field against the stored value and collect a
//! `FieldChange` per real difference. Rendering the changes to the audit
//! text is kept separate so the diffing contract stays testable without
//! string matching.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

impl FieldChange {
    pub fn new(field: &'static str, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            field,
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Collects changes while a patch is applied.
#[derive(Debug, Default)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn push(&mut self, change: FieldChange) {
        self.changes.push(change);
    }

    /// Record a change for a plain field when the patch value differs from
    /// the current one. Returns the value to store.
    pub fn apply<T: PartialEq + Display + Clone>(
        &mut self,
        field: &'static str,
        current: &T,
        patch: Option<T>,
    ) -> Option<T> {
        match patch {
            Some(new) if new != *current => {
                self.push(FieldChange::new(field, current.to_string(), new.to_string()));
                Some(new)
            }
            _ => None,
        }
    }

    /// Same as `apply` for nullable columns. A `None` in the patch means
    /// "leave untouched", never "clear".
    pub fn apply_opt<T: PartialEq + Display + Clone>(
        &mut self,
        field: &'static str,
        current: &Option<T>,
        patch: Option<T>,
    ) -> Option<T> {
        match patch {
            Some(new) if Some(&new) != current.as_ref() => {
                self.push(FieldChange::new(
                    field,
                    display_or_dash(current.as_ref()),
                    new.to_string(),
                ));
                Some(new)
            }
            _ => None,
        }
    }

    /// Render all fragments into one human-readable description.
    pub fn render(&self) -> String {
        render_changes(&self.changes)
    }
}

pub fn render_changes(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(|c| format!("'{}' changed from '{}' to '{}'", c.field, c.old, c.new))
        .collect::<Vec<_>>()
        .join(". ")
}

pub fn display_or_dash<T: Display>(value: Option<&T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_produce_no_change() {
        let mut set = ChangeSet::new();
        assert_eq!(set.apply("name", &"A".to_string(), Some("A".to_string())), None);
        assert_eq!(set.apply("name", &"A".to_string(), None), None);
        assert!(set.is_empty());
    }

    #[test]
    fn differing_value_is_recorded_and_returned() {
        let mut set = ChangeSet::new();
        let stored = set.apply("name", &"A".to_string(), Some("B".to_string()));
        assert_eq!(stored, Some("B".to_string()));
        assert_eq!(
            set.changes(),
            &[FieldChange::new("name", "A", "B")]
        );
    }

    #[test]
    fn optional_field_renders_missing_as_dash() {
        let mut set = ChangeSet::new();
        set.apply_opt("budget", &None::<f64>, Some(50.0));
        assert_eq!(set.render(), "'budget' changed from '-' to '50'");
    }

    #[test]
    fn fragments_join_with_period_space() {
        let changes = vec![
            FieldChange::new("name", "A", "B"),
            FieldChange::new("status", "pendiente", "revisada"),
        ];
        assert_eq!(
            render_changes(&changes),
            "'name' changed from 'A' to 'B'. 'status' changed from 'pendiente' to 'revisada'"
        );
    }
}
