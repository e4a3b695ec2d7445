pub mod min_max;
pub mod report;
pub mod transition;
pub mod units;

pub use min_max::{EarlyLate, EarlyLateAll, MinMax, MinMaxAll};
pub use report::Report;
pub use transition::{RiseFall, RiseFallBoth, Transition};
pub use units::{Unit, Units};
