use thiserror::Error;

/// Errors reported by [`Table`](crate::Table) operations.
///
/// A call that returns an error leaves the table exactly as it was before the
/// call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The requested capacity is zero or not prime.
    #[error("capacity {0} is not prime")]
    InvalidCapacity(usize),

    /// Key `0` marks an unused key and cannot be stored.
    #[error("key 0 is reserved and cannot be stored")]
    ReservedKey,

    /// The table binding passed to [`Table::destroy`](crate::Table::destroy)
    /// was already empty.
    #[error("no table to destroy")]
    MissingTable,

    /// The key is not present in the table.
    #[error("key {0} not found")]
    KeyNotFound(u32),

    /// The key is already present in the table.
    #[error("key {0} is already present")]
    DuplicateKey(u32),

    /// Growing past this capacity would overflow `usize`.
    #[error("cannot grow past capacity {0}")]
    CapacityOverflow(usize),

    /// The probe sequence for `key` visited no free slot.
    #[error("no free slot on the probe sequence of key {key} (capacity {capacity})")]
    ProbeExhausted {
        /// Key being placed.
        key: u32,
        /// Capacity at the time of the failed placement.
        capacity: usize,
    },
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            TableError::InvalidCapacity(8).to_string(),
            "capacity 8 is not prime"
        );
        assert_eq!(TableError::KeyNotFound(42).to_string(), "key 42 not found");
        assert_eq!(
            TableError::ProbeExhausted {
                key: 3,
                capacity: 7
            }
            .to_string(),
            "no free slot on the probe sequence of key 3 (capacity 7)"
        );
    }
}
