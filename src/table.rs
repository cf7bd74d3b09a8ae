//! An open-addressed table keyed by non-zero `u32`s.
//!
//! Collisions are resolved by quadratic probing: the `i`th probe for `key`
//! lands on `(key + i * i) % capacity`. The capacity is always prime and the
//! table grows before an insert would bring it to half load, which keeps a
//! free slot reachable on every probe sequence.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;

use crate::TableError;
#[cfg(feature = "log")]
use crate::debug;
use crate::prime;
#[cfg(feature = "log")]
use crate::trace;

/// Probe sequence for one key: `(key + i * i) % modulus` for
/// `i in 0..modulus`.
///
/// Step 0 is the home slot `key % modulus`. Computed in `u128` so no step can
/// overflow.
#[derive(Clone)]
struct Probe {
    key: u128,
    modulus: u128,
    step: u128,
}

impl Probe {
    #[inline]
    fn new(key: u32, capacity: usize) -> Self {
        Self {
            key: key as u128,
            modulus: capacity as u128,
            step: 0,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.step >= self.modulus {
            return None;
        }

        let index = (self.key + self.step * self.step) % self.modulus;
        self.step += 1;
        Some(index as usize)
    }
}

#[derive(Clone)]
enum Slot<V> {
    Empty,
    /// A removed entry. Lookups walk past it, inserts may reuse it.
    Tombstone,
    Occupied {
        key: u32,
        value: V,
    },
}

impl<V> Slot<V> {
    #[inline]
    fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn view(&self) -> SlotView<'_, V> {
        match self {
            Slot::Empty => SlotView::Empty,
            Slot::Tombstone => SlotView::Removed,
            Slot::Occupied { key, value } => SlotView::Occupied { key: *key, value },
        }
    }
}

/// Read-only view of a single slot, as yielded by [`Table::slots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotView<'a, V> {
    /// The slot has never held an entry since the last growth.
    Empty,
    /// The slot held an entry that has since been removed.
    Removed,
    /// The slot holds `key` and its value.
    Occupied {
        /// Key stored in the slot.
        key: u32,
        /// Value stored alongside `key`.
        value: &'a V,
    },
}

/// Probe-length and slot-usage statistics.
///
/// Only available with the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct TableStats {
    /// Number of entries in the table
    pub len: usize,
    /// Number of slots
    pub capacity: usize,
    /// Number of slots holding a removed-entry marker
    pub tombstones: usize,
    /// Number of never-used slots
    pub empty: usize,
    /// `len / capacity`
    pub load_factor: f64,
    /// Longest probe taken to reach a stored key (0 means its home slot)
    pub max_probe_len: usize,
    /// Average probe length over all stored keys
    pub mean_probe_len: f64,
}

#[cfg(feature = "stats")]
impl TableStats {
    /// Pretty-print the statistics to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.len,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slots: {} occupied, {} removed, {} empty",
            self.len, self.tombstones, self.empty
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_len, self.mean_probe_len
        );
    }
}

/// A table mapping non-zero `u32` keys to values, using quadratic probing
/// over a prime number of slots.
///
/// `Table<V>` is meant to hold [`Handle`](crate::Handle)s: pointers to values
/// the caller owns and keeps alive. Any `V` works, so an index or a reference
/// is an equally good handle.
///
/// Key `0` is reserved. [`insert`](Self::insert) rejects it and every lookup
/// treats it as absent.
///
/// The table grows when an insert would bring it to half load. The new
/// capacity is the first prime at or above `2 * capacity + 1`, and capacity
/// never shrinks.
///
/// ## Example
///
/// ```rust
/// # use quadprobe::Handle;
/// # use quadprobe::Table;
/// #
/// let symbols = ["main", "init", "exit"];
///
/// let mut table = Table::new(7)?;
/// for (id, name) in (1..).zip(symbols.iter()) {
///     table.insert(id, Handle::from_ref(name))?;
/// }
///
/// let name = table.get(2).copied().unwrap();
/// // SAFETY: `symbols` outlives the table.
/// assert_eq!(unsafe { *name.as_ref() }, "init");
/// # Ok::<(), quadprobe::TableError>(())
/// ```
#[derive(Clone)]
pub struct Table<V> {
    slots: Box<[Slot<V>]>,
    populated: usize,
}

impl<V> Debug for Table<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Table<V> {
    /// Creates an empty table with exactly `capacity` slots.
    ///
    /// Fails with [`TableError::InvalidCapacity`] if `capacity` is not prime,
    /// which includes `0` and `1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// # use quadprobe::TableError;
    /// #
    /// let table: Table<u64> = Table::new(7).unwrap();
    /// assert_eq!(table.capacity(), 7);
    /// assert!(table.is_empty());
    ///
    /// assert_eq!(Table::<u64>::new(8).unwrap_err(), TableError::InvalidCapacity(8));
    /// assert!(Table::<u64>::new(0).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, TableError> {
        if !prime::is_prime(capacity) {
            trace!("rejected table capacity {capacity}");
            return Err(TableError::InvalidCapacity(capacity));
        }

        Ok(Self::with_prime_capacity(capacity))
    }

    fn with_prime_capacity(capacity: usize) -> Self {
        debug_assert!(prime::is_prime(capacity));

        Self {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
            populated: 0,
        }
    }

    /// Drops the table held in `table`, leaving `None` behind.
    ///
    /// Fails with [`TableError::MissingTable`] if `table` is already `None`.
    /// Values are dropped like any owned value; for handles this leaves the
    /// pointees untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// # use quadprobe::TableError;
    /// #
    /// let mut table = Some(Table::<u8>::new(3)?);
    /// Table::destroy(&mut table)?;
    /// assert!(table.is_none());
    ///
    /// assert_eq!(Table::destroy(&mut table), Err(TableError::MissingTable));
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn destroy(table: &mut Option<Self>) -> Result<(), TableError> {
        let table = table.take().ok_or(TableError::MissingTable)?;
        trace!(
            "destroying table with {} entries over {} slots",
            table.len(),
            table.capacity()
        );
        drop(table);
        Ok(())
    }

    /// Returns the number of slots. Always prime.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of entries in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// #
    /// let mut table = Table::new(11)?;
    /// assert_eq!(table.len(), 0);
    ///
    /// table.insert(4, "four")?;
    /// assert_eq!(table.len(), 1);
    /// # Ok::<(), quadprobe::TableError>(())
    /// ```
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the ratio of entries to slots.
    pub fn load_factor(&self) -> f64 {
        self.populated as f64 / self.slots.len() as f64
    }

    #[inline]
    fn probe(&self, key: u32) -> Probe {
        Probe::new(key, self.slots.len())
    }

    /// Index of the slot holding `key`.
    ///
    /// Stops at the first never-used slot: an entry is always placed before
    /// any empty slot on its own probe sequence.
    fn find_index(&self, key: u32) -> Option<usize> {
        if key == 0 {
            return None;
        }

        for index in self.probe(key) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied { key: stored, .. } if *stored == key => return Some(index),
                _ => {}
            }
        }

        None
    }

    /// Index of the first empty or removed slot on `key`'s probe sequence.
    fn vacant_index(&self, key: u32) -> Option<usize> {
        self.probe(key)
            .find(|&index| !matches!(self.slots[index], Slot::Occupied { .. }))
    }

    /// Whether one more entry would bring the table to half load or above.
    #[inline]
    fn needs_growth(&self) -> bool {
        (self.populated + 1).saturating_mul(2) >= self.slots.len()
    }

    fn place(&mut self, key: u32, value: V) -> Result<(), TableError> {
        let index = self
            .vacant_index(key)
            .ok_or(TableError::ProbeExhausted {
                key,
                capacity: self.capacity(),
            })?;

        self.slots[index] = Slot::Occupied { key, value };
        self.populated += 1;
        Ok(())
    }

    /// Returns `true` if `key` is present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// #
    /// let mut table = Table::new(5)?;
    /// table.insert(9, ())?;
    ///
    /// assert!(table.contains_key(9));
    /// assert!(!table.contains_key(4));
    /// assert!(!table.contains_key(0));
    /// # Ok::<(), quadprobe::TableError>(())
    /// ```
    pub fn contains_key(&self, key: u32) -> bool {
        self.find_index(key).is_some()
    }

    /// Inserts `value` under `key`.
    ///
    /// Fails with [`TableError::ReservedKey`] for key `0` and with
    /// [`TableError::DuplicateKey`] if `key` is already present; in both cases
    /// the table is untouched and `value` is dropped.
    ///
    /// If the table would reach half load with the new entry, it is grown
    /// first and the entry is placed in the grown table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// # use quadprobe::TableError;
    /// #
    /// let mut table = Table::new(7)?;
    /// table.insert(5, "five")?;
    ///
    /// assert_eq!(table.insert(5, "again"), Err(TableError::DuplicateKey(5)));
    /// assert_eq!(table.insert(0, "zero"), Err(TableError::ReservedKey));
    /// assert_eq!(table.get(5), Some(&"five"));
    /// assert_eq!(table.len(), 1);
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn insert(&mut self, key: u32, value: V) -> Result<(), TableError> {
        if key == 0 {
            trace!("rejected insert of reserved key 0");
            return Err(TableError::ReservedKey);
        }

        if self.find_index(key).is_some() {
            trace!("rejected duplicate insert of key {key}");
            return Err(TableError::DuplicateKey(key));
        }

        if self.needs_growth() {
            self.rehash()?;
        }

        self.place(key, value)
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// #
    /// let mut table = Table::new(7)?;
    /// table.insert(3, 30u64)?;
    ///
    /// assert_eq!(table.get(3), Some(&30));
    /// assert_eq!(table.get(4), None);
    /// # Ok::<(), quadprobe::TableError>(())
    /// ```
    pub fn get(&self, key: u32) -> Option<&V> {
        let index = self.find_index(key)?;
        self.slots[index].value()
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: u32) -> Option<&mut V> {
        let index = self.find_index(key)?;
        self.slots[index].value_mut()
    }

    /// Replaces the value stored under `key`, returning the previous one.
    ///
    /// Fails with [`TableError::KeyNotFound`] if `key` is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// # use quadprobe::TableError;
    /// #
    /// let mut table = Table::new(7)?;
    /// table.insert(3, 'a')?;
    ///
    /// assert_eq!(table.update(3, 'b'), Ok('a'));
    /// assert_eq!(table.get(3), Some(&'b'));
    /// assert_eq!(table.update(4, 'c'), Err(TableError::KeyNotFound(4)));
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn update(&mut self, key: u32, value: V) -> Result<V, TableError> {
        self.get_mut(key)
            .map(|current| core::mem::replace(current, value))
            .ok_or(TableError::KeyNotFound(key))
    }

    /// Removes `key`, returning its value.
    ///
    /// The slot is marked as removed rather than emptied, so keys placed
    /// further along the same probe sequence stay reachable. Fails with
    /// [`TableError::KeyNotFound`] if `key` is absent.
    ///
    /// Removed slots count toward neither the load nor the growth trigger, and
    /// only growth clears them. Under sustained insert/remove churn at low load
    /// every unused slot can end up marked, so a lookup for an absent key walks
    /// all `capacity` candidate slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// # use quadprobe::TableError;
    /// #
    /// let mut table = Table::new(7)?;
    /// table.insert(3, 42)?;
    ///
    /// assert_eq!(table.remove(3), Ok(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(3), Err(TableError::KeyNotFound(3)));
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn remove(&mut self, key: u32) -> Result<V, TableError> {
        let index = self.find_index(key).ok_or(TableError::KeyNotFound(key))?;

        let Slot::Occupied { value, .. } =
            core::mem::replace(&mut self.slots[index], Slot::Tombstone)
        else {
            unreachable!("find_index yields occupied slots only");
        };

        self.populated -= 1;
        Ok(value)
    }

    /// Grows the table to the first prime at or above `2 * capacity + 1`,
    /// re-placing every entry for the new capacity.
    ///
    /// Removed-entry markers do not survive the move. This runs on its own
    /// from [`insert`](Self::insert); calling it directly is only useful to
    /// grow ahead of a burst of inserts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// #
    /// let mut table = Table::new(7)?;
    /// table.insert(1, "one")?;
    ///
    /// table.rehash()?;
    /// assert_eq!(table.capacity(), 17);
    /// assert_eq!(table.get(1), Some(&"one"));
    /// # Ok::<(), quadprobe::TableError>(())
    /// ```
    pub fn rehash(&mut self) -> Result<(), TableError> {
        let old_capacity = self.capacity();
        let capacity = prime::grown_capacity(old_capacity)
            .ok_or(TableError::CapacityOverflow(old_capacity))?;

        // Every target slot is chosen before anything moves, so a failure
        // leaves the table as it was.
        let mut taken = vec![false; capacity];
        let mut targets = Vec::with_capacity(self.populated);
        for slot in self.slots.iter() {
            if let Slot::Occupied { key, .. } = slot {
                let index = Probe::new(*key, capacity)
                    .find(|&index| !taken[index])
                    .ok_or(TableError::ProbeExhausted {
                        key: *key,
                        capacity,
                    })?;
                taken[index] = true;
                targets.push(index);
            }
        }

        let mut grown = Self::with_prime_capacity(capacity);
        let entries = core::mem::take(&mut self.slots)
            .into_vec()
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Occupied { key, value } => Some((key, value)),
                _ => None,
            });
        for ((key, value), index) in entries.zip(targets) {
            grown.slots[index] = Slot::Occupied { key, value };
            grown.populated += 1;
        }

        debug!(
            "rehashed {} entries: capacity {} -> {}",
            grown.populated, old_capacity, capacity
        );

        *self = grown;
        Ok(())
    }

    /// Returns an iterator over `(key, &value)` pairs in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// #
    /// let mut table = Table::new(7)?;
    /// table.insert(2, "two")?;
    /// table.insert(1, "one")?;
    ///
    /// let mut pairs: Vec<_> = table.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [(1, &"one"), (2, &"two")]);
    /// # Ok::<(), quadprobe::TableError>(())
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over the stored keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the stored values in slot order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Returns an iterator over every slot, in index order, including empty
    /// and removed slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::SlotView;
    /// # use quadprobe::Table;
    /// #
    /// let mut table = Table::new(3)?;
    /// table.insert(4, 'x')?;
    ///
    /// let slots: Vec<_> = table.slots().collect();
    /// assert_eq!(
    ///     slots,
    ///     [
    ///         SlotView::Empty,
    ///         SlotView::Occupied { key: 4, value: &'x' },
    ///         SlotView::Empty,
    ///     ]
    /// );
    /// # Ok::<(), quadprobe::TableError>(())
    /// ```
    pub fn slots(&self) -> impl ExactSizeIterator<Item = SlotView<'_, V>> + '_ {
        self.slots.iter().map(Slot::view)
    }

    /// Returns a [`Display`](fmt::Display) rendering of every slot, one line
    /// per slot, with values written by `format_value`.
    ///
    /// Lines read `Bucket {index}: (empty)`, `Bucket {index}: (removed)` or
    /// `Bucket {index}: {key} -> {value}`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Table;
    /// #
    /// let mut table = Table::new(3)?;
    /// table.insert(4, 40)?;
    ///
    /// let rendered = table.dump(|v, f| write!(f, "<{v}>")).to_string();
    /// assert_eq!(
    ///     rendered,
    ///     "Bucket 0: (empty)\nBucket 1: 4 -> <40>\nBucket 2: (empty)\n"
    /// );
    /// # Ok::<(), quadprobe::TableError>(())
    /// ```
    pub fn dump<F>(&self, format_value: F) -> Dump<'_, V, F>
    where
        F: Fn(&V, &mut fmt::Formatter<'_>) -> fmt::Result,
    {
        Dump {
            table: self,
            format_value,
        }
    }

    /// Writes [`dump`](Self::dump) to stdout.
    #[cfg(feature = "std")]
    pub fn print<F>(&self, format_value: F)
    where
        F: Fn(&V, &mut fmt::Formatter<'_>) -> fmt::Result,
    {
        print!("{}", self.dump(format_value));
    }

    /// Returns probe-length and slot-usage statistics.
    ///
    /// Only available with the `stats` feature.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> TableStats {
        let mut tombstones = 0;
        let mut empty = 0;
        let mut max_probe_len = 0;
        let mut total_probe_len = 0;

        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Empty => empty += 1,
                Slot::Tombstone => tombstones += 1,
                Slot::Occupied { key, .. } => {
                    let probe_len = self
                        .probe(*key)
                        .position(|candidate| candidate == index)
                        .unwrap_or(self.slots.len());
                    max_probe_len = max_probe_len.max(probe_len);
                    total_probe_len += probe_len;
                }
            }
        }

        TableStats {
            len: self.populated,
            capacity: self.slots.len(),
            tombstones,
            empty,
            load_factor: self.load_factor(),
            max_probe_len,
            mean_probe_len: if self.populated == 0 {
                0.0
            } else {
                total_probe_len as f64 / self.populated as f64
            },
        }
    }
}

/// Iterator over the entries of a [`Table`], in slot order.
///
/// Created by [`Table::iter`].
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { key, value } = slot {
                self.remaining -= 1;
                return Some((*key, value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a Table<V> {
    type IntoIter = Iter<'a, V>;
    type Item = (u32, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Slot-by-slot rendering of a [`Table`].
///
/// Created by [`Table::dump`].
pub struct Dump<'a, V, F> {
    table: &'a Table<V>,
    format_value: F,
}

impl<V, F> fmt::Display for Dump<'_, V, F>
where
    F: Fn(&V, &mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, slot) in self.table.slots().enumerate() {
            write!(f, "Bucket {index}: ")?;
            match slot {
                SlotView::Empty => f.write_str("(empty)")?,
                SlotView::Removed => f.write_str("(removed)")?,
                SlotView::Occupied { key, value } => {
                    write!(f, "{key} -> ")?;
                    (self.format_value)(value, f)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
