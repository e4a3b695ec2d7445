//! PVT derating coefficients.
//!
//! A `ScaleFactors` group stores `k` coefficients per
//! `(quantity, pvt axis, rise/fall)`. The library turns them into
//! multiplicative derates with `1 + k * (value - nominal)` per axis;
//! missing coefficients contribute a factor of 1.

use arclight_common::RiseFall;

/// The three scaling axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleFactorPvt {
    Process,
    Volt,
    Temp,
}

impl ScaleFactorPvt {
    pub const COUNT: usize = 3;

    pub const fn index(self) -> usize {
        match self {
            Self::Process => 0,
            Self::Volt => 1,
            Self::Temp => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Volt => "volt",
            Self::Temp => "temp",
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "process" => Some(Self::Process),
            "volt" => Some(Self::Volt),
            "temp" => Some(Self::Temp),
            _ => None,
        }
    }

    pub const fn all() -> [Self; 3] {
        [Self::Process, Self::Volt, Self::Temp]
    }
}

/// Quantities a `k_*` scaling attribute can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleFactorType {
    PinCap,
    WireCap,
    WireRes,
    MinPeriod,
    Cell,
    Hold,
    Setup,
    Recovery,
    Removal,
    Nochange,
    Skew,
    LeakagePower,
    InternalPower,
    Transition,
    MinPulseWidth,
    Unknown,
}

impl ScaleFactorType {
    pub const COUNT: usize = 16;

    pub const fn index(self) -> usize {
        match self {
            Self::PinCap => 0,
            Self::WireCap => 1,
            Self::WireRes => 2,
            Self::MinPeriod => 3,
            Self::Cell => 4,
            Self::Hold => 5,
            Self::Setup => 6,
            Self::Recovery => 7,
            Self::Removal => 8,
            Self::Nochange => 9,
            Self::Skew => 10,
            Self::LeakagePower => 11,
            Self::InternalPower => 12,
            Self::Transition => 13,
            Self::MinPulseWidth => 14,
            Self::Unknown => 15,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::PinCap => "pin_cap",
            Self::WireCap => "wire_cap",
            Self::WireRes => "wire_res",
            Self::MinPeriod => "min_period",
            Self::Cell => "cell",
            Self::Hold => "hold",
            Self::Setup => "setup",
            Self::Recovery => "recovery",
            Self::Removal => "removal",
            Self::Nochange => "nochange",
            Self::Skew => "skew",
            Self::LeakagePower => "leakage_power",
            Self::InternalPower => "internal_power",
            Self::Transition => "transition",
            Self::MinPulseWidth => "min_pulse_width",
            Self::Unknown => "unknown",
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "pin_cap" => Some(Self::PinCap),
            "wire_cap" => Some(Self::WireCap),
            "wire_res" => Some(Self::WireRes),
            "min_period" => Some(Self::MinPeriod),
            "cell" => Some(Self::Cell),
            "hold" => Some(Self::Hold),
            "setup" => Some(Self::Setup),
            "recovery" => Some(Self::Recovery),
            "removal" => Some(Self::Removal),
            "nochange" => Some(Self::Nochange),
            "skew" => Some(Self::Skew),
            "leakage_power" => Some(Self::LeakagePower),
            "internal_power" => Some(Self::InternalPower),
            "transition" => Some(Self::Transition),
            "min_pulse_width" => Some(Self::MinPulseWidth),
            _ => None,
        }
    }

    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::PinCap,
            Self::WireCap,
            Self::WireRes,
            Self::MinPeriod,
            Self::Cell,
            Self::Hold,
            Self::Setup,
            Self::Recovery,
            Self::Removal,
            Self::Nochange,
            Self::Skew,
            Self::LeakagePower,
            Self::InternalPower,
            Self::Transition,
            Self::MinPulseWidth,
            Self::Unknown,
        ]
    }

    /// `k_<pvt>_<name>_rise` / `_fall` attribute spellings.
    pub const fn has_rise_fall_suffix(self) -> bool {
        matches!(
            self,
            Self::Cell
                | Self::Hold
                | Self::Setup
                | Self::Recovery
                | Self::Removal
                | Self::Nochange
                | Self::Skew
        )
    }

    /// `k_<pvt>_rise_<name>` / `_fall_` attribute spellings.
    pub const fn has_rise_fall_prefix(self) -> bool {
        matches!(self, Self::Transition)
    }

    /// `k_<pvt>_<name>_high` / `_low` attribute spellings.
    pub const fn has_hi_low_suffix(self) -> bool {
        matches!(self, Self::MinPulseWidth)
    }
}

/// Named grid of `k` coefficients: `[type][pvt][rise/fall]`.
#[derive(Debug, Clone)]
pub struct ScaleFactors {
    name: String,
    scales: [[[f32; RiseFall::COUNT]; ScaleFactorPvt::COUNT]; ScaleFactorType::COUNT],
}

impl ScaleFactors {
    pub fn new(name: &str) -> Self {
        ScaleFactors {
            name: name.to_string(),
            scales: [[[0.0; RiseFall::COUNT]; ScaleFactorPvt::COUNT]; ScaleFactorType::COUNT],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_scale(
        &mut self,
        sf_type: ScaleFactorType,
        pvt: ScaleFactorPvt,
        rf: RiseFall,
        value: f32,
    ) {
        self.scales[sf_type.index()][pvt.index()][rf.index()] = value;
    }

    /// Set the coefficient for both edges.
    pub fn set_scale_both(&mut self, sf_type: ScaleFactorType, pvt: ScaleFactorPvt, value: f32) {
        for rf in RiseFall::both() {
            self.set_scale(sf_type, pvt, rf, value);
        }
    }

    pub fn scale(&self, sf_type: ScaleFactorType, pvt: ScaleFactorPvt, rf: RiseFall) -> f32 {
        self.scales[sf_type.index()][pvt.index()][rf.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficients_default_to_zero() {
        let sf = ScaleFactors::new("ss_derate");
        assert_eq!(
            sf.scale(ScaleFactorType::Cell, ScaleFactorPvt::Temp, RiseFall::Rise),
            0.0
        );
    }

    #[test]
    fn set_and_get() {
        let mut sf = ScaleFactors::new("ss_derate");
        sf.set_scale(
            ScaleFactorType::Cell,
            ScaleFactorPvt::Volt,
            RiseFall::Fall,
            -0.5,
        );
        assert_eq!(
            sf.scale(ScaleFactorType::Cell, ScaleFactorPvt::Volt, RiseFall::Fall),
            -0.5
        );
        assert_eq!(
            sf.scale(ScaleFactorType::Cell, ScaleFactorPvt::Volt, RiseFall::Rise),
            0.0
        );
        sf.set_scale_both(ScaleFactorType::Hold, ScaleFactorPvt::Process, 0.1);
        assert_eq!(
            sf.scale(ScaleFactorType::Hold, ScaleFactorPvt::Process, RiseFall::Rise),
            0.1
        );
        assert_eq!(
            sf.scale(ScaleFactorType::Hold, ScaleFactorPvt::Process, RiseFall::Fall),
            0.1
        );
    }

    #[test]
    fn attribute_spelling_predicates() {
        assert!(ScaleFactorType::Cell.has_rise_fall_suffix());
        assert!(!ScaleFactorType::Cell.has_rise_fall_prefix());
        assert!(ScaleFactorType::Transition.has_rise_fall_prefix());
        assert!(ScaleFactorType::MinPulseWidth.has_hi_low_suffix());
        assert!(!ScaleFactorType::PinCap.has_rise_fall_suffix());
    }

    #[test]
    fn indices_are_dense() {
        for (i, t) in ScaleFactorType::all().iter().enumerate() {
            assert_eq!(t.index(), i);
        }
        for (i, p) in ScaleFactorPvt::all().iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }
}
