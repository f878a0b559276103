//! probed-table: an in-memory string-to-string hash table using open
//! addressing with double hashing.
//!
//! Internal Design:
//!
//! Summary
//! - One flat array of optional `(key, value)` slots. Collisions probe
//!   other slots of the same array; there is no chaining.
//! - Pieces:
//!   - `hash`: a primary rolling hash reduced by golden-ratio
//!     multiplicative hashing (home index), and a cheaper rolling hash
//!     reduced to a non-zero stride (double hashing).
//!   - `config::TableConfig`: initial capacity (also the shrink floor),
//!     growth factor, shrink divisor, load-factor bounds, stride policy.
//!   - `ProbedTable`: insert/get/remove plus grow, shrink and the
//!     re-seating delete.
//!
//! Constraints
//! - Single-threaded: mutation takes `&mut self`; there is no internal
//!   locking. Callers that share a table serialize access themselves.
//! - Keys and values are copied into the table on insert; the table never
//!   borrows caller memory past a call.
//! - Capacities are powers of two and never drop below the initial
//!   capacity.
//!
//! Probe-chain integrity
//! - Lookups stop at the first empty slot, so every entry must be reachable
//!   from its home index without crossing one. Removing an entry mid-chain
//!   breaks that, so `remove` walks the occupied run after the cleared slot
//!   along the removed key's stride, re-seating each entry, then re-seats
//!   any entry still unreachable (an entry can pass through the cleared slot
//!   on a different stride).
//! - Both steps iterate; nothing recurses, so stack depth does not grow
//!   with capacity.
//!
//! Hashing and resize
//! - Each entry stores both raw key hashes. Index and stride are derived
//!   from them for the current capacity, so a resize never re-reads key
//!   bytes.
//! - The default stride is forced odd, which makes it coprime with the
//!   power-of-two capacity: every probe visits every slot before wrapping.
//! - A resize allocates first, then moves entries with the same placement
//!   primitive inserts use. Placement never checks load factors, so a
//!   resize cannot trigger another one; a debug-only guard asserts this.
//!   If placement fails, entries are moved back and the table is unchanged.
//!   A failed grow fails the insert; a failed shrink after a removal is
//!   logged and skipped, and the removal still returns its value.
//! - Configured load bounds must be wider than one resize step, so a grow
//!   never lands below the minimum and a shrink never lands above the maximum.
//!
//! Errors and logging
//! - `TableError` covers allocation failure, a probe that found no free
//!   slot, and invalid configuration. Absent keys are `None`.
//! - Diagnostics go through the `log` facade; the crate never installs a
//!   logger.

pub mod config;
pub mod error;
pub mod hash;
mod probed_table;
mod probed_table_proptest;
mod resize_guard;

// Public surface
pub use config::{StridePolicy, TableConfig};
pub use error::{ConfigError, TableError};
pub use probed_table::{Iter, ProbedTable};
