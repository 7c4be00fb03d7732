//! Ordered, duplicate-free list of the schema fields chosen for a draft.

use serde::{Deserialize, Serialize};

use crate::catalog::{all_fields, FieldDescriptor, SchemaField};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionList {
    fields: Vec<SchemaField>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `field`. Leaves the list untouched if it is already selected.
    pub fn add(&mut self, field: SchemaField) -> Result<()> {
        if self.contains(field) {
            return Err(Error::DuplicateField(field));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Overwrite the field at `index`.
    ///
    /// Re-selecting the value already held at `index` is accepted as a no-op;
    /// a value held at any other position is rejected.
    pub fn replace_at(&mut self, index: usize, field: SchemaField) -> Result<()> {
        self.check_index(index)?;
        if self.position(field).is_some_and(|pos| pos != index) {
            return Err(Error::DuplicateField(field));
        }
        self.fields[index] = field;
        Ok(())
    }

    /// Remove the field at `index`, shifting later rows left.
    pub fn remove_at(&mut self, index: usize) -> Result<SchemaField> {
        self.check_index(index)?;
        Ok(self.fields.remove(index))
    }

    /// Catalog entries that are not selected yet, in catalog order.
    pub fn available_choices(&self) -> Vec<&'static FieldDescriptor> {
        all_fields()
            .iter()
            .filter(|d| !self.contains(d.id))
            .collect()
    }

    /// Catalog entries a row chooser at `index` may offer: everything not
    /// held by another row, so the row's own value stays selectable.
    pub fn available_choices_excluding_own_slot(
        &self,
        index: usize,
    ) -> Result<Vec<&'static FieldDescriptor>> {
        self.check_index(index)?;
        Ok(all_fields()
            .iter()
            .filter(|d| self.position(d.id).map_or(true, |pos| pos == index))
            .collect())
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<SchemaField> {
        self.fields.get(index).copied()
    }

    pub fn contains(&self, field: SchemaField) -> bool {
        self.fields.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = SchemaField> + '_ {
        self.fields.iter().copied()
    }

    pub fn as_slice(&self) -> &[SchemaField] {
        &self.fields
    }

    fn position(&self, field: SchemaField) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.fields.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.fields.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a SelectionList {
    type Item = SchemaField;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, SchemaField>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter().copied()
    }
}

impl TryFrom<Vec<SchemaField>> for SelectionList {
    type Error = Error;

    fn try_from(fields: Vec<SchemaField>) -> Result<Self> {
        let mut list = SelectionList::new();
        for field in fields {
            list.add(field)?;
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use SchemaField::*;

    fn list(fields: &[SchemaField]) -> SelectionList {
        SelectionList::try_from(fields.to_vec()).unwrap()
    }

    #[test]
    fn add_appends_in_order() {
        let mut sel = SelectionList::new();
        sel.add(City).unwrap();
        sel.add(FirstName).unwrap();
        assert_eq!(sel.as_slice(), &[City, FirstName]);
    }

    #[test]
    fn add_duplicate_is_rejected_and_list_unchanged() {
        let mut sel = list(&[Age, City]);
        let before = sel.clone();
        assert!(matches!(sel.add(Age), Err(Error::DuplicateField(Age))));
        assert_eq!(sel, before);
    }

    #[test]
    fn remove_shifts_left() {
        let mut sel = list(&[FirstName, Age, City]);
        assert_eq!(sel.remove_at(1).unwrap(), Age);
        assert_eq!(sel.as_slice(), &[FirstName, City]);
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        let mut sel = list(&[FirstName]);
        let before = sel.clone();
        assert!(matches!(
            sel.remove_at(1),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            SelectionList::new().remove_at(0),
            Err(Error::IndexOutOfRange { index: 0, len: 0 })
        ));
        assert_eq!(sel, before);
    }

    #[test]
    fn replace_with_own_value_is_noop() {
        let mut sel = list(&[FirstName, City]);
        sel.replace_at(1, City).unwrap();
        assert_eq!(sel.as_slice(), &[FirstName, City]);
    }

    #[test]
    fn replace_with_other_rows_value_is_rejected() {
        let mut sel = list(&[FirstName, City, Age]);
        let before = sel.clone();
        assert!(matches!(
            sel.replace_at(0, Age),
            Err(Error::DuplicateField(Age))
        ));
        assert_eq!(sel, before);
    }

    #[test]
    fn replace_keeps_other_rows_in_place() {
        let mut sel = list(&[FirstName, City, Age]);
        sel.replace_at(1, State).unwrap();
        assert_eq!(sel.as_slice(), &[FirstName, State, Age]);
    }

    #[test]
    fn replace_out_of_range_is_rejected() {
        let mut sel = list(&[FirstName]);
        assert!(matches!(
            sel.replace_at(3, Age),
            Err(Error::IndexOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn available_choices_skip_selected_fields() {
        let sel = list(&[Gender, City]);
        let ids: Vec<SchemaField> = sel.available_choices().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![FirstName, LastName, Age, AccountName, State]);
    }

    #[test]
    fn row_choices_keep_own_value() {
        let sel = list(&[Gender, City, Age]);
        let ids: Vec<SchemaField> = sel
            .available_choices_excluding_own_slot(1)
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![FirstName, LastName, AccountName, City, State]);
    }

    #[test]
    fn row_choices_size_is_catalog_minus_other_rows() {
        let mut sel = SelectionList::new();
        for field in SchemaField::iter() {
            sel.add(field).unwrap();
            for i in 0..sel.len() {
                let choices = sel.available_choices_excluding_own_slot(i).unwrap();
                assert_eq!(choices.len(), CATALOG.len() - sel.len() + 1);
            }
        }
    }

    #[test]
    fn row_choices_out_of_range() {
        assert!(matches!(
            SelectionList::new().available_choices_excluding_own_slot(0),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn clear_empties() {
        let mut sel = list(&[Age, State]);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.available_choices().len(), CATALOG.len());
    }

    #[test]
    fn try_from_rejects_duplicates() {
        assert!(matches!(
            SelectionList::try_from(vec![City, City]),
            Err(Error::DuplicateField(City))
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(SchemaField),
            Replace(usize, SchemaField),
            Remove(usize),
        }

        fn field() -> impl Strategy<Value = SchemaField> {
            (0..CATALOG.len()).prop_map(|i| CATALOG[i].id)
        }

        // Indices go past the longest possible list so out-of-range calls occur.
        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                field().prop_map(Op::Add),
                (0usize..CATALOG.len() + 2, field()).prop_map(|(i, f)| Op::Replace(i, f)),
                (0usize..CATALOG.len() + 2).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn any_operation_sequence_keeps_fields_unique(
                ops in prop::collection::vec(op(), 0..64),
            ) {
                let mut sel = SelectionList::new();
                for op in ops {
                    let before = sel.clone();
                    let result = match op.clone() {
                        Op::Add(f) => sel.add(f),
                        Op::Replace(i, f) => sel.replace_at(i, f),
                        Op::Remove(i) => sel.remove_at(i).map(|_| ()),
                    };

                    let mut seen = std::collections::HashSet::new();
                    prop_assert!(sel.iter().all(|f| seen.insert(f)), "duplicate after {:?}", op);

                    match (result, op) {
                        (Err(_), _) => prop_assert_eq!(&sel, &before),
                        (Ok(()), Op::Add(f)) => {
                            prop_assert_eq!(sel.len(), before.len() + 1);
                            prop_assert_eq!(sel.get(before.len()), Some(f));
                        }
                        (Ok(()), Op::Replace(i, f)) => {
                            prop_assert_eq!(sel.len(), before.len());
                            prop_assert_eq!(sel.get(i), Some(f));
                            for j in (0..sel.len()).filter(|j| *j != i) {
                                prop_assert_eq!(sel.get(j), before.get(j));
                            }
                        }
                        (Ok(()), Op::Remove(i)) => {
                            let mut expected = before.as_slice().to_vec();
                            expected.remove(i);
                            prop_assert_eq!(sel.as_slice(), expected.as_slice());
                        }
                    }
                }
            }
        }
    }
}
