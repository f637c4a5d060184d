use crate::models::ChannelRecord;

/// Assign `sequence_id = 1..N` in emission order
pub fn renumber(records: &mut [ChannelRecord]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.sequence_id = Some(index as u32 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ids_are_contiguous_from_one(len in 0usize..64, preset in prop::option::of(0u32..5)) {
            let mut records = vec![
                ChannelRecord { sequence_id: preset, ..ChannelRecord::default() };
                len
            ];
            renumber(&mut records);
            let ids: Vec<u32> = records.iter().filter_map(|r| r.sequence_id).collect();
            prop_assert_eq!(ids, (1..=len as u32).collect::<Vec<_>>());
        }
    }
}
