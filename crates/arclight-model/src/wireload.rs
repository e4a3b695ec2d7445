//! Wireload models: parametric interconnect estimates binned by fanout,
//! plus area-based selection groups.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireloadTree {
    BestCase,
    Balanced,
    WorstCase,
    Unknown,
}

impl WireloadTree {
    pub fn find(name: &str) -> Self {
        match name {
            "best_case_tree" => Self::BestCase,
            "balanced_tree" => Self::Balanced,
            "worst_case_tree" => Self::WorstCase,
            _ => Self::Unknown,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::BestCase => "best_case_tree",
            Self::Balanced => "balanced_tree",
            Self::WorstCase => "worst_case_tree",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WireloadTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireloadMode {
    Top,
    Enclosed,
    Segmented,
    Unknown,
}

impl WireloadMode {
    pub fn find(name: &str) -> Self {
        match name {
            "top" => Self::Top,
            "enclosed" => Self::Enclosed,
            "segmented" => Self::Segmented,
            _ => Self::Unknown,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Enclosed => "enclosed",
            Self::Segmented => "segmented",
            Self::Unknown => "unknown",
        }
    }
}

/// Wire length as a function of fanout, with per-length capacitance and
/// resistance. Fanouts beyond the table extrapolate along `slope`.
#[derive(Debug, Clone)]
pub struct Wireload {
    name: String,
    area: f32,
    resistance: f32,
    capacitance: f32,
    slope: f32,
    /// `(fanout, length)` pairs, sorted by fanout.
    fanout_lengths: Vec<(f32, f32)>,
}

impl Wireload {
    pub fn new(name: &str) -> Self {
        Wireload {
            name: name.to_string(),
            area: 0.0,
            resistance: 0.0,
            capacitance: 0.0,
            slope: 0.0,
            fanout_lengths: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn set_area(&mut self, area: f32) {
        self.area = area;
    }

    pub fn resistance(&self) -> f32 {
        self.resistance
    }

    pub fn set_resistance(&mut self, res: f32) {
        self.resistance = res;
    }

    pub fn capacitance(&self) -> f32 {
        self.capacitance
    }

    pub fn set_capacitance(&mut self, cap: f32) {
        self.capacitance = cap;
    }

    pub fn slope(&self) -> f32 {
        self.slope
    }

    pub fn set_slope(&mut self, slope: f32) {
        self.slope = slope;
    }

    pub fn add_fanout_length(&mut self, fanout: f32, length: f32) {
        let at = self
            .fanout_lengths
            .partition_point(|(f, _)| *f < fanout);
        self.fanout_lengths.insert(at, (fanout, length));
    }

    pub fn fanout_lengths(&self) -> &[(f32, f32)] {
        &self.fanout_lengths
    }

    /// Estimated wire length for `fanout`: interpolation between the
    /// table points, slope extrapolation past either end (clamped at
    /// zero below).
    pub fn find_length(&self, fanout: f32) -> f32 {
        match self.fanout_lengths.as_slice() {
            [] => 0.0,
            [(f0, l0)] => (l0 + (fanout - f0) * self.slope).max(0.0),
            points => {
                let (f_first, l_first) = points[0];
                let (f_last, l_last) = points[points.len() - 1];
                if fanout < f_first {
                    (l_first - (f_first - fanout) * self.slope).max(0.0)
                } else if fanout > f_last {
                    l_last + (fanout - f_last) * self.slope
                } else {
                    let i = points.partition_point(|(f, _)| *f <= fanout) - 1;
                    let i = i.min(points.len() - 2);
                    let (f0, l0) = points[i];
                    let (f1, l1) = points[i + 1];
                    if f1 == f0 {
                        l0
                    } else {
                        l0 + (fanout - f0) * (l1 - l0) / (f1 - f0)
                    }
                }
            }
        }
    }

    /// Estimated wire capacitance and resistance for `fanout`.
    pub fn find_wireload(&self, fanout: f32) -> (f32, f32) {
        let length = self.find_length(fanout);
        (length * self.capacitance, length * self.resistance)
    }
}

/// Area-binned wireload choice: `wire_load_from_area` entries.
#[derive(Debug, Clone)]
pub struct WireloadSelection {
    name: String,
    /// `(min_area, max_area, wireload name)`, sorted by min_area.
    entries: Vec<(f32, f32, String)>,
}

impl WireloadSelection {
    pub fn new(name: &str) -> Self {
        WireloadSelection {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_entry(&mut self, min_area: f32, max_area: f32, wireload: &str) {
        let at = self.entries.partition_point(|(min, _, _)| *min < min_area);
        self.entries
            .insert(at, (min_area, max_area, wireload.to_string()));
    }

    pub fn entries(&self) -> &[(f32, f32, String)] {
        &self.entries
    }

    /// Name of the wireload covering `area`: the first entry whose range
    /// contains it; below every range answers the first entry, above
    /// every range the last.
    pub fn find_wireload_name(&self, area: f32) -> Option<&str> {
        let entries = self.entries.as_slice();
        if entries.is_empty() {
            return None;
        }
        for (min, max, name) in entries {
            if area >= *min && area < *max {
                return Some(name);
            }
        }
        if area < entries[0].0 {
            Some(&entries[0].2)
        } else {
            Some(&entries[entries.len() - 1].2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fanout_length_interpolation() {
        let mut wl = Wireload::new("wl");
        wl.set_capacitance(2.0);
        wl.set_resistance(3.0);
        wl.set_slope(1.0);
        wl.add_fanout_length(1.0, 10.0);
        wl.add_fanout_length(3.0, 30.0);
        assert_eq!(wl.find_length(2.0), 20.0);
        // Past the last point: slope extrapolation.
        assert_eq!(wl.find_length(5.0), 32.0);
        // Below the first point, clamped at zero.
        assert_eq!(wl.find_length(0.5), 9.5);
        let (cap, res) = wl.find_wireload(2.0);
        assert_eq!(cap, 40.0);
        assert_eq!(res, 60.0);
    }

    #[test]
    fn empty_fanout_table() {
        let wl = Wireload::new("wl");
        assert_eq!(wl.find_length(4.0), 0.0);
    }

    #[test]
    fn selection_bins() {
        // Spec scenario (g).
        let mut sel = WireloadSelection::new("sel");
        sel.add_entry(0.0, 100.0, "WL_S");
        sel.add_entry(100.0, 500.0, "WL_M");
        sel.add_entry(500.0, 1000.0, "WL_L");
        assert_eq!(sel.find_wireload_name(50.0), Some("WL_S"));
        assert_eq!(sel.find_wireload_name(200.0), Some("WL_M"));
        assert_eq!(sel.find_wireload_name(750.0), Some("WL_L"));
        assert_eq!(sel.find_wireload_name(2000.0), Some("WL_L"));
        assert_eq!(sel.find_wireload_name(-10.0), Some("WL_S"));
    }

    #[test]
    fn tree_and_mode_names() {
        assert_eq!(WireloadTree::find("balanced_tree"), WireloadTree::Balanced);
        assert_eq!(WireloadTree::find("nope"), WireloadTree::Unknown);
        assert_eq!(WireloadMode::find("top"), WireloadMode::Top);
        assert_eq!(WireloadMode::find("nope"), WireloadMode::Unknown);
    }
}
