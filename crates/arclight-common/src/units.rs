//! Display units for the physical quantities a cell library carries.
//!
//! Values are stored internally in SI units (seconds, farads, ohms, volts,
//! amps, watts, meters). A `Unit` remembers the multiplicative scale between
//! the internal value and the user-facing value, the display suffix, and the
//! number of digits used when formatting.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    scale: f32,
    suffix: String,
    digits: usize,
}

impl Unit {
    pub fn new(scale: f32, suffix: &str, digits: usize) -> Self {
        Unit {
            scale,
            suffix: suffix.to_string(),
            digits,
        }
    }

    /// Multiplier between one user unit and the internal SI value,
    /// e.g. 1e-9 for a "1ns" time unit.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn set_suffix(&mut self, suffix: &str) {
        self.suffix = suffix.to_string();
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    pub fn set_digits(&mut self, digits: usize) {
        self.digits = digits;
    }

    /// Internal SI value -> user-facing value.
    pub fn sta_to_user(&self, value: f32) -> f32 {
        value / self.scale
    }

    /// User-facing value -> internal SI value.
    pub fn user_to_sta(&self, value: f32) -> f32 {
        value * self.scale
    }

    pub fn format(&self, value: f32) -> String {
        format!("{:.*}", self.digits, self.sta_to_user(value))
    }

    pub fn format_suffixed(&self, value: f32) -> String {
        format!("{}{}", self.format(value), self.suffix)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scale, self.suffix)
    }
}

/// The set of units a library defines, plus the dimensionless scalar unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    time: Unit,
    capacitance: Unit,
    resistance: Unit,
    voltage: Unit,
    current: Unit,
    power: Unit,
    distance: Unit,
    scalar: Unit,
}

impl Units {
    pub fn new() -> Self {
        Units {
            time: Unit::new(1.0, "s", 3),
            capacitance: Unit::new(1.0, "F", 3),
            resistance: Unit::new(1.0, "ohm", 4),
            voltage: Unit::new(1.0, "V", 2),
            current: Unit::new(1.0, "A", 3),
            power: Unit::new(1.0, "W", 3),
            distance: Unit::new(1.0, "m", 3),
            scalar: Unit::new(1.0, "", 4),
        }
    }

    pub fn time_unit(&self) -> &Unit {
        &self.time
    }

    pub fn capacitance_unit(&self) -> &Unit {
        &self.capacitance
    }

    pub fn resistance_unit(&self) -> &Unit {
        &self.resistance
    }

    pub fn voltage_unit(&self) -> &Unit {
        &self.voltage
    }

    pub fn current_unit(&self) -> &Unit {
        &self.current
    }

    pub fn power_unit(&self) -> &Unit {
        &self.power
    }

    pub fn distance_unit(&self) -> &Unit {
        &self.distance
    }

    pub fn scalar_unit(&self) -> &Unit {
        &self.scalar
    }

    pub fn find(&self, name: &str) -> Option<&Unit> {
        match name {
            "time" => Some(&self.time),
            "capacitance" => Some(&self.capacitance),
            "resistance" => Some(&self.resistance),
            "voltage" => Some(&self.voltage),
            "current" => Some(&self.current),
            "power" => Some(&self.power),
            "distance" => Some(&self.distance),
            "scalar" => Some(&self.scalar),
            _ => None,
        }
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Unit> {
        match name {
            "time" => Some(&mut self.time),
            "capacitance" => Some(&mut self.capacitance),
            "resistance" => Some(&mut self.resistance),
            "voltage" => Some(&mut self.voltage),
            "current" => Some(&mut self.current),
            "power" => Some(&mut self.power),
            "distance" => Some(&mut self.distance),
            "scalar" => Some(&mut self.scalar),
            _ => None,
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Units::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_round_trip() {
        let ns = Unit::new(1e-9, "ns", 3);
        let v = 2.5f32;
        let internal = ns.user_to_sta(v);
        assert!((internal - 2.5e-9).abs() < 1e-15);
        let back = ns.sta_to_user(internal);
        assert!(((back - v) / v).abs() < 1e-6);
    }

    #[test]
    fn format_uses_digits() {
        let ns = Unit::new(1e-9, "ns", 2);
        assert_eq!(ns.format(1.5e-9), "1.50");
        assert_eq!(ns.format_suffixed(1.5e-9), "1.50ns");
    }

    #[test]
    fn find_by_name() {
        let mut units = Units::new();
        assert!(units.find("time").is_some());
        assert!(units.find("bogus").is_none());
        units.find_mut("time").unwrap().set_scale(1e-9);
        assert_eq!(units.time_unit().scale(), 1e-9);
    }
}
