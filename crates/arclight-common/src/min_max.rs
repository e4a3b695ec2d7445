//! Min/max and early/late enumerations used to select analysis extremes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinMax {
    Min,
    Max,
}

impl MinMax {
    pub const COUNT: usize = 2;

    pub const fn min() -> Self {
        MinMax::Min
    }

    pub const fn max() -> Self {
        MinMax::Max
    }

    pub const fn index(self) -> usize {
        match self {
            MinMax::Min => 0,
            MinMax::Max => 1,
        }
    }

    /// The worst starting value for a reduction toward this extreme.
    pub fn init_value(self) -> f32 {
        match self {
            MinMax::Min => f32::INFINITY,
            MinMax::Max => f32::NEG_INFINITY,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            MinMax::Min => MinMax::Max,
            MinMax::Max => MinMax::Min,
        }
    }

    /// True when `a` is closer to this extreme than `b`.
    pub fn compare(self, a: f32, b: f32) -> bool {
        match self {
            MinMax::Min => a < b,
            MinMax::Max => a > b,
        }
    }

    pub fn minmax(self, a: f32, b: f32) -> f32 {
        if self.compare(a, b) { a } else { b }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "min" => Some(MinMax::Min),
            "max" => Some(MinMax::Max),
            _ => None,
        }
    }

    pub const fn find_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(MinMax::Min),
            1 => Some(MinMax::Max),
            _ => None,
        }
    }

    pub const fn both() -> [Self; 2] {
        [MinMax::Min, MinMax::Max]
    }

    pub const fn to_str(self) -> &'static str {
        match self {
            MinMax::Min => "min",
            MinMax::Max => "max",
        }
    }
}

impl fmt::Display for MinMax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Min, max, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinMaxAll {
    Min,
    Max,
    All,
}

impl MinMaxAll {
    pub const fn min() -> Self {
        MinMaxAll::Min
    }

    pub const fn max() -> Self {
        MinMaxAll::Max
    }

    pub const fn all() -> Self {
        MinMaxAll::All
    }

    pub fn matches(self, min_max: MinMax) -> bool {
        match self {
            MinMaxAll::Min => min_max == MinMax::Min,
            MinMaxAll::Max => min_max == MinMax::Max,
            MinMaxAll::All => true,
        }
    }

    pub fn range(self) -> &'static [MinMax] {
        match self {
            MinMaxAll::Min => &[MinMax::Min],
            MinMaxAll::Max => &[MinMax::Max],
            MinMaxAll::All => &[MinMax::Min, MinMax::Max],
        }
    }

    /// The single extreme this selects, if it is not `All`.
    pub fn as_min_max(self) -> Option<MinMax> {
        match self {
            MinMaxAll::Min => Some(MinMax::Min),
            MinMaxAll::Max => Some(MinMax::Max),
            MinMaxAll::All => None,
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "min" => Some(MinMaxAll::Min),
            "max" => Some(MinMaxAll::Max),
            "all" | "min_max" | "minmax" => Some(MinMaxAll::All),
            _ => None,
        }
    }
}

impl fmt::Display for MinMaxAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MinMaxAll::Min => "min",
            MinMaxAll::Max => "max",
            MinMaxAll::All => "all",
        })
    }
}

/// Early/late is the path-search view of min/max: early slack reductions use
/// the min extreme, late use the max extreme.
pub type EarlyLate = MinMax;
pub type EarlyLateAll = MinMaxAll;

impl MinMax {
    pub const fn early() -> Self {
        MinMax::Min
    }

    pub const fn late() -> Self {
        MinMax::Max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_values_are_worst() {
        assert!(MinMax::Min.init_value() > 1e30);
        assert!(MinMax::Max.init_value() < -1e30);
        // Any real value beats the init value.
        assert!(MinMax::Min.compare(0.0, MinMax::Min.init_value()));
        assert!(MinMax::Max.compare(0.0, MinMax::Max.init_value()));
    }

    #[test]
    fn opposite_and_index() {
        assert_eq!(MinMax::Min.opposite(), MinMax::Max);
        assert_eq!(MinMax::Max.opposite(), MinMax::Min);
        assert_eq!(MinMax::Min.index(), 0);
        assert_eq!(MinMax::Max.index(), 1);
        assert_eq!(MinMax::find_index(1), Some(MinMax::Max));
        assert_eq!(MinMax::find_index(2), None);
    }

    #[test]
    fn minmax_reduction() {
        assert_eq!(MinMax::Min.minmax(1.0, 2.0), 1.0);
        assert_eq!(MinMax::Max.minmax(1.0, 2.0), 2.0);
    }

    #[test]
    fn all_matches_both() {
        assert!(MinMaxAll::All.matches(MinMax::Min));
        assert!(MinMaxAll::All.matches(MinMax::Max));
        assert!(MinMaxAll::Min.matches(MinMax::Min));
        assert!(!MinMaxAll::Min.matches(MinMax::Max));
        assert_eq!(MinMaxAll::All.range().len(), 2);
    }

    #[test]
    fn early_late_aliases() {
        assert_eq!(EarlyLate::early(), MinMax::Min);
        assert_eq!(EarlyLate::late(), MinMax::Max);
    }
}
