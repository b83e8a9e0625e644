use crate::data::{GroupKey, MovementRecord};
use std::collections::HashMap;

/// Partition of a record arena into (unit, material) groups.
///
/// Groups are listed in order of first appearance and each holds the
/// ascending indices of its member records, so per-group results can be
/// written back into per-record slots.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    keys: Vec<GroupKey>,
    members: Vec<Vec<usize>>,
}

impl GroupIndex {
    pub fn build(records: &[MovementRecord]) -> Self {
        let mut slots: HashMap<GroupKey, usize> = HashMap::new();
        let mut index = GroupIndex::default();

        for (i, record) in records.iter().enumerate() {
            let key = record.group_key();
            let slot = match slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = index.keys.len();
                    slots.insert(key.clone(), slot);
                    index.keys.push(key);
                    index.members.push(Vec::new());
                    slot
                }
            };
            index.members[slot].push(i);
        }

        index
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, group: usize) -> &GroupKey {
        &self.keys[group]
    }

    pub fn members(&self, group: usize) -> &[usize] {
        &self.members[group]
    }

    /// Quantities of one group, in record order
    pub fn quantities(&self, group: usize, records: &[MovementRecord]) -> Vec<f64> {
        self.members[group]
            .iter()
            .map(|&i| records[i].quantity as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MovementKind;
    use chrono::NaiveDate;

    fn rec(unit: &str, material: &str, qty: i64) -> MovementRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        MovementRecord::new(date, unit, material, MovementKind::Inflow, qty, 1.0)
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let records = vec![
            rec("U02", "MAT-001", 1),
            rec("U01", "MAT-001", 2),
            rec("U02", "MAT-001", 3),
            rec("U01", "MAT-002", 4),
        ];
        let index = GroupIndex::build(&records);

        assert_eq!(index.len(), 3);
        assert_eq!(index.key(0), &GroupKey::new("U02", "MAT-001"));
        assert_eq!(index.members(0), &[0, 2]);
        assert_eq!(index.members(1), &[1]);
        assert_eq!(index.quantities(0, &records), vec![1.0, 3.0]);
    }

    #[test]
    fn test_same_material_different_unit_is_separate() {
        let records = vec![rec("U01", "MAT-001", 1), rec("U02", "MAT-001", 1)];
        let index = GroupIndex::build(&records);

        assert_eq!(index.len(), 2);
        assert!((0..index.len()).all(|g| index.members(g).len() == 1));
    }

    #[test]
    fn test_empty() {
        let index = GroupIndex::build(&[]);
        assert!(index.is_empty());
    }
}
