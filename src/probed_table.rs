//! ProbedTable: open addressing with double hashing over owned string pairs.

use crate::config::{StridePolicy, TableConfig};
use crate::error::TableError;
use crate::hash;
use crate::resize_guard::DebugResizeGuard;
use core::fmt;
use core::mem;
use log::{debug, error, trace, warn};

#[derive(Debug)]
struct Entry {
    key: String,
    value: String,
    // Raw key hashes; index and stride are derived per capacity.
    primary: u64,
    step: u64,
}

type Slot = Option<Entry>;

/// Outcome of probing for a key.
enum Probe {
    Found(usize),
    Vacant(usize),
    Exhausted,
}

/// A string-to-string hash table using open addressing with double hashing.
///
/// Every entry sits on its own probe sequence, and no empty slot lies
/// between its home index and its position. `remove` re-seats entries to
/// keep that true, so lookups stop at the first empty slot.
pub struct ProbedTable {
    slots: Vec<Slot>,
    count: usize,
    config: TableConfig,
    resize_guard: DebugResizeGuard,
}

/// Iterator over `(key, value)` pairs in slot order.
pub struct Iter<'a> {
    slots: core::slice::Iter<'a, Slot>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .find_map(|s| s.as_ref())
            .map(|e| (e.key.as_str(), e.value.as_str()))
    }
}

impl ProbedTable {
    /// Creates an empty table with the default configuration (1024 slots).
    pub fn new() -> Self {
        let config = TableConfig::default();
        let slots = core::iter::repeat_with(|| None)
            .take(config.initial_capacity)
            .collect();
        Self {
            slots,
            count: 0,
            config,
            resize_guard: DebugResizeGuard::new(),
        }
    }

    /// Creates an empty table after validating `config`.
    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let slots = alloc_slots(config.initial_capacity)?;
        Ok(Self {
            slots,
            count: 0,
            config,
            resize_guard: DebugResizeGuard::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Inserts `key` or overwrites its value, returning the previous value.
    ///
    /// Key and value are copied into storage owned by the table. If the load
    /// factor is above the maximum, the table grows before the insert.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<Option<String>, TableError> {
        if self.load_factor() > self.config.max_load_factor {
            let target = self
                .capacity()
                .checked_mul(self.config.growth_factor)
                .ok_or_else(|| alloc_failure("slot array", usize::MAX))?;
            self.resize(target)?;
        }

        let primary = hash::primary_raw(key);
        let step = hash::step_raw(key);
        match probe(&self.slots, key, primary, step, self.config.stride_policy) {
            Probe::Found(idx) => {
                let value = own(value, "value")?;
                Ok(self.slots[idx]
                    .as_mut()
                    .map(|e| mem::replace(&mut e.value, value)))
            }
            Probe::Vacant(idx) => {
                let entry = Entry {
                    key: own(key, "key")?,
                    value: own(value, "value")?,
                    primary,
                    step,
                };
                self.slots[idx] = Some(entry);
                self.count += 1;
                Ok(None)
            }
            Probe::Exhausted => Err(table_full(key, self.capacity())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let idx = self.find_index(key)?;
        self.slots[idx].as_ref().map(|e| e.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_index(key).is_some()
    }

    /// Removes `key`, returning its value. Absent keys are a no-op.
    ///
    /// Entries whose probe sequence ran through the cleared slot are re-seated,
    /// then the table shrinks if the load factor fell below the minimum. A
    /// shrink that cannot place every entry is logged and skipped; the key is
    /// still removed and its value returned.
    ///
    /// Cost is O(capacity) per removed key: after the stride walk, every
    /// occupied slot is checked for reachability from its own home index.
    /// Absent keys cost one probe.
    pub fn remove(&mut self, key: &str) -> Result<Option<String>, TableError> {
        let Some(idx) = self.find_index(key) else {
            return Ok(None);
        };
        let Some(removed) = self.slots[idx].take() else {
            return Ok(None);
        };
        self.count -= 1;

        let stride = hash::stride(removed.step, self.capacity(), self.config.stride_policy);
        self.compact_after(idx, stride)?;
        self.repair_orphans()?;

        let floor = self.config.initial_capacity;
        if self.load_factor() < self.config.min_load_factor && self.capacity() > floor {
            let target = (self.capacity() / self.config.shrink_divisor).max(floor);
            if let Err(err) = self.resize(target) {
                warn!(
                    "shrink to {target} skipped, keeping capacity {}: {err}",
                    self.capacity()
                );
            }
        }
        Ok(Some(removed.value))
    }

    /// Drops every entry and returns to the initial capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.slots.resize_with(self.config.initial_capacity, || None);
        self.slots.shrink_to_fit();
        self.count = 0;
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    fn find_index(&self, key: &str) -> Option<usize> {
        let primary = hash::primary_raw(key);
        let step = hash::step_raw(key);
        match probe(&self.slots, key, primary, step, self.config.stride_policy) {
            Probe::Found(idx) => Some(idx),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// Walks the run of occupied slots that follows `vacated` along `stride`,
    /// re-seating each entry with its own stride. Stops at the first empty
    /// slot or after one lap.
    fn compact_after(&mut self, vacated: usize, stride: usize) -> Result<(), TableError> {
        let capacity = self.capacity();
        let mut idx = (vacated + stride) % capacity;
        for _ in 0..capacity {
            if self.slots[idx].is_none() {
                break;
            }
            self.reseat(idx)?;
            idx = (idx + stride) % capacity;
        }
        Ok(())
    }

    /// Re-seats entries that are no longer reachable from their home index
    /// until a full pass finds none. A re-seat only moves an entry to an
    /// earlier point of its own probe sequence, so this terminates.
    fn repair_orphans(&mut self) -> Result<(), TableError> {
        loop {
            let mut reseated = 0usize;
            for idx in 0..self.slots.len() {
                if self.is_orphan(idx) {
                    self.reseat(idx)?;
                    reseated += 1;
                }
            }
            if reseated == 0 {
                return Ok(());
            }
        }
    }

    fn is_orphan(&self, idx: usize) -> bool {
        match &self.slots[idx] {
            Some(e) => !reaches(&self.slots, e.primary, e.step, idx, self.config.stride_policy),
            None => false,
        }
    }

    /// Takes the entry at `idx` out and places it again. The slot it came
    /// from is on its own probe sequence, so placement cannot fail for an
    /// entry that was placed by this table.
    fn reseat(&mut self, idx: usize) -> Result<usize, TableError> {
        let Some(entry) = self.slots[idx].take() else {
            return Ok(idx);
        };
        match place(&mut self.slots, entry, self.config.stride_policy) {
            Ok(to) => {
                if to != idx {
                    trace!("re-seated entry from slot {} to {}", idx, to);
                }
                Ok(to)
            }
            Err(entry) => {
                let err = table_full(&entry.key, self.slots.len());
                self.slots[idx] = Some(entry);
                Err(err)
            }
        }
    }

    /// Moves every entry into a fresh array of `new_capacity` slots.
    ///
    /// Allocation happens before any entry moves. If an entry finds no free
    /// slot in the new array, every moved entry goes back to its old slot and
    /// the table is left as it was.
    fn resize(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let _g = self.resize_guard.begin(new_capacity);
        let old_capacity = self.slots.len();
        let policy = self.config.stride_policy;

        let mut fresh = alloc_slots(new_capacity)?;
        let mut moved: Vec<(usize, usize)> = Vec::new();
        moved.try_reserve_exact(self.count).map_err(|_| {
            alloc_failure("resize journal", self.count * mem::size_of::<(usize, usize)>())
        })?;

        for from in 0..old_capacity {
            let Some(entry) = self.slots[from].take() else {
                continue;
            };
            match place(&mut fresh, entry, policy) {
                Ok(to) => moved.push((from, to)),
                Err(entry) => {
                    let err = table_full(&entry.key, new_capacity);
                    self.slots[from] = Some(entry);
                    for (from, to) in moved {
                        self.slots[from] = fresh[to].take();
                    }
                    return Err(err);
                }
            }
        }

        self.slots = fresh;
        debug!(
            "resized table from {} to {} slots ({} entries)",
            old_capacity, new_capacity, self.count
        );
        Ok(())
    }
}

impl Default for ProbedTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProbedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a ProbedTable {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn probe(slots: &[Slot], key: &str, primary: u64, step: u64, policy: StridePolicy) -> Probe {
    let capacity = slots.len();
    let start = hash::home_index(primary, capacity);
    let stride = hash::stride(step, capacity, policy);
    let mut idx = start;
    loop {
        match &slots[idx] {
            None => return Probe::Vacant(idx),
            Some(e) if e.primary == primary && e.key == key => return Probe::Found(idx),
            Some(_) => {}
        }
        idx = (idx + stride) % capacity;
        if idx == start {
            return Probe::Exhausted;
        }
    }
}

/// Puts `entry` in the first empty slot of its probe sequence, returning the
/// slot index, or hands the entry back if the sequence has no empty slot.
/// The key must not already be present in `slots`.
fn place(slots: &mut [Slot], entry: Entry, policy: StridePolicy) -> Result<usize, Entry> {
    let capacity = slots.len();
    let start = hash::home_index(entry.primary, capacity);
    let stride = hash::stride(entry.step, capacity, policy);
    let mut idx = start;
    loop {
        if slots[idx].is_none() {
            slots[idx] = Some(entry);
            return Ok(idx);
        }
        idx = (idx + stride) % capacity;
        if idx == start {
            return Err(entry);
        }
    }
}

/// Whether the probe sequence for these hashes arrives at `target` without
/// crossing an empty slot.
fn reaches(slots: &[Slot], primary: u64, step: u64, target: usize, policy: StridePolicy) -> bool {
    let capacity = slots.len();
    let start = hash::home_index(primary, capacity);
    let stride = hash::stride(step, capacity, policy);
    let mut idx = start;
    loop {
        if idx == target {
            return true;
        }
        if slots[idx].is_none() {
            return false;
        }
        idx = (idx + stride) % capacity;
        if idx == start {
            return false;
        }
    }
}

fn alloc_slots(capacity: usize) -> Result<Vec<Slot>, TableError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| alloc_failure("slot array", capacity.saturating_mul(mem::size_of::<Slot>())))?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}

fn own(s: &str, what: &'static str) -> Result<String, TableError> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(s.len())
        .map_err(|_| alloc_failure(what, s.len()))?;
    owned.push_str(s);
    Ok(owned)
}

fn alloc_failure(what: &'static str, bytes: usize) -> TableError {
    warn!("allocation of {} bytes for {} failed", bytes, what);
    TableError::AllocationFailure { what, bytes }
}

fn table_full(key: &str, capacity: usize) -> TableError {
    error!(
        "probe for key {:?} covered its whole sequence in {} slots without a free slot",
        key, capacity
    );
    TableError::TableFull {
        key: key.to_owned(),
        capacity,
    }
}

#[cfg(test)]
impl ProbedTable {
    /// Checks count, key uniqueness, reachability and capacity bounds.
    pub(crate) fn assert_invariants(&self) {
        let occupied = self.slots.iter().filter(|s| s.is_some()).count();
        assert_eq!(occupied, self.count, "count does not match occupied slots");

        let mut keys = std::collections::BTreeSet::new();
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(e) = slot {
                assert!(keys.insert(e.key.as_str()), "duplicate key {:?}", e.key);
                assert!(
                    reaches(&self.slots, e.primary, e.step, idx, self.config.stride_policy),
                    "key {:?} at slot {} is unreachable",
                    e.key,
                    idx
                );
            }
        }

        assert!(self.capacity().is_power_of_two());
        assert!(self.capacity() >= self.config.initial_capacity);
    }
}
