use crate::core::{CompatibilityTable, Identifier, Signature};

/// Merge discovered signatures into `table` in discovery order.
///
/// Returns how many pairs added a new signature to their overload set.
pub fn merge<I>(table: &mut CompatibilityTable, pairs: I) -> usize
where
    I: IntoIterator<Item = (Identifier, Signature)>,
{
    let mut changes = 0;
    for (id, signature) in pairs {
        if table.insert_if_absent(id, signature) {
            tracing::trace!(%id, "new signature");
            changes += 1;
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WireType::*;

    fn sig(types: &[crate::core::WireType]) -> Signature {
        Signature::new(types.to_vec()).unwrap()
    }

    #[test]
    fn test_duplicate_pair_counts_once() {
        let mut table = CompatibilityTable::new();
        let pair = (Identifier(0x1f3c2d9a), sig(&[ValueWord, RefWord]));

        let changes = merge(&mut table, [pair.clone(), pair]);

        assert_eq!(changes, 1);
        assert_eq!(table.get(Identifier(0x1f3c2d9a)).len(), 1);
    }

    #[test]
    fn test_merge_into_existing_entry() {
        let mut table = CompatibilityTable::new();
        table.insert_if_absent(Identifier(1), sig(&[Void]));

        let changes = merge(
            &mut table,
            [
                (Identifier(1), sig(&[Void])),
                (Identifier(1), sig(&[Void, ValueWord])),
                (Identifier(2), sig(&[Void])),
            ],
        );

        assert_eq!(changes, 2);
        assert_eq!(table.get(Identifier(1)).len(), 2);
        let order: Vec<u64> = table.iter().map(|(id, _)| id.value()).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_merging_same_batch_twice_is_idempotent() {
        let batch = vec![
            (Identifier(5), sig(&[String, ValueWord])),
            (Identifier(6), sig(&[Object])),
        ];
        let mut table = CompatibilityTable::new();
        assert_eq!(merge(&mut table, batch.clone()), 2);
        assert_eq!(merge(&mut table, batch), 0);
    }
}
