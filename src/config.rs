//! Tuning parameters for `ProbedTable`.

use crate::error::ConfigError;

/// Default number of slots a new table starts with. Also the shrink floor.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;
/// Capacity multiplier applied when the table grows.
pub const DEFAULT_GROWTH_FACTOR: usize = 2;
/// Capacity divisor applied when the table shrinks (a 0.5x shrink factor).
pub const DEFAULT_SHRINK_DIVISOR: usize = 2;
/// Load above which the next insert grows the table.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;
/// Load below which a removal shrinks the table.
pub const DEFAULT_MIN_LOAD_FACTOR: f64 = 0.25;

/// How the step hash is turned into a probe stride.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum StridePolicy {
    /// Force the stride odd. With power-of-two capacities an odd stride is
    /// coprime to the capacity, so every probe visits every slot.
    #[default]
    Coprime,
    /// Use `hash % (capacity - 1) + 1` as is. Some keys then probe only a
    /// subset of the slots and may report `TableFull` early.
    Unadjusted,
}

/// Per-table configuration. Capacities and factors are powers of two so that
/// every capacity the table moves through stays a power of two.
#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub(crate) initial_capacity: usize,
    pub(crate) growth_factor: usize,
    pub(crate) shrink_divisor: usize,
    pub(crate) max_load_factor: f64,
    pub(crate) min_load_factor: f64,
    pub(crate) stride_policy: StridePolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            shrink_divisor: DEFAULT_SHRINK_DIVISOR,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            min_load_factor: DEFAULT_MIN_LOAD_FACTOR,
            stride_policy: StridePolicy::Coprime,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the starting capacity, which is also the floor for shrinking.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    pub fn with_shrink_divisor(mut self, divisor: usize) -> Self {
        self.shrink_divisor = divisor;
        self
    }

    /// Sets both load-factor bounds at once; they are validated as a pair.
    pub fn with_load_factors(mut self, min: f64, max: f64) -> Self {
        self.min_load_factor = min;
        self.max_load_factor = max;
        self
    }

    pub fn with_stride_policy(mut self, policy: StridePolicy) -> Self {
        self.stride_policy = policy;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }
    pub fn growth_factor(&self) -> usize {
        self.growth_factor
    }
    pub fn shrink_divisor(&self) -> usize {
        self.shrink_divisor
    }
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }
    pub fn min_load_factor(&self) -> f64 {
        self.min_load_factor
    }
    pub fn stride_policy(&self) -> StridePolicy {
        self.stride_policy
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_pow2_at_least_two(self.initial_capacity) {
            return Err(ConfigError::InvalidCapacity(self.initial_capacity));
        }
        if !is_pow2_at_least_two(self.growth_factor) {
            return Err(ConfigError::InvalidFactor {
                name: "growth factor",
                value: self.growth_factor,
            });
        }
        if !is_pow2_at_least_two(self.shrink_divisor) {
            return Err(ConfigError::InvalidFactor {
                name: "shrink divisor",
                value: self.shrink_divisor,
            });
        }
        let (min, max) = (self.min_load_factor, self.max_load_factor);
        // Written so that NaN fails every comparison and is rejected.
        if !(min > 0.0 && min < max && max < 1.0) {
            return Err(ConfigError::InvalidLoadFactors { min, max });
        }
        // A grow must land at or above min and a shrink at or below max.
        let (growth, shrink) = (self.growth_factor, self.shrink_divisor);
        if max / (growth as f64) < min || min * (shrink as f64) > max {
            return Err(ConfigError::ResizeOutsideLoadBounds {
                min,
                max,
                growth_factor: growth,
                shrink_divisor: shrink,
            });
        }
        Ok(())
    }
}

fn is_pow2_at_least_two(n: usize) -> bool {
    n >= 2 && n.is_power_of_two()
}
