//! Lookup tables with 0 to 3 axes.
//!
//! Tables interpolate linearly between grid points. Past either end of an
//! axis the linear continuation keeps the slope of the end segment; delay
//! calculation relies on that for out-of-range slew and load inputs, so the
//! extrapolation rule must not clamp.

use std::fmt::Write as _;
use std::sync::Arc;

use arclight_common::Units;

/// Axis variable taxonomy from lookup-table templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAxisVariable {
    InputNetTransition,
    TotalOutputNetCapacitance,
    InputTransitionTime,
    RelatedPinTransition,
    ConstrainedPinTransition,
    OutputPinTransition,
    ConnectDelay,
    RelatedOutTotalOutputNetCapacitance,
    EqualOrOppositeOutputNetCapacitance,
    Time,
    IvOutputVoltage,
    InputNoiseWidth,
    InputNoiseHeight,
    InputVoltage,
    OutputVoltage,
    PathDepth,
    PathDistance,
    NormalizedVoltage,
    Unknown,
}

impl TableAxisVariable {
    pub fn find(name: &str) -> Self {
        match name {
            "input_net_transition" => Self::InputNetTransition,
            "total_output_net_capacitance" => Self::TotalOutputNetCapacitance,
            "input_transition_time" => Self::InputTransitionTime,
            "related_pin_transition" => Self::RelatedPinTransition,
            "constrained_pin_transition" => Self::ConstrainedPinTransition,
            "output_pin_transition" => Self::OutputPinTransition,
            "connect_delay" => Self::ConnectDelay,
            "related_out_total_output_net_capacitance" => {
                Self::RelatedOutTotalOutputNetCapacitance
            }
            "equal_or_opposite_output_net_capacitance" => {
                Self::EqualOrOppositeOutputNetCapacitance
            }
            "time" => Self::Time,
            "iv_output_voltage" => Self::IvOutputVoltage,
            "input_noise_width" => Self::InputNoiseWidth,
            "input_noise_height" => Self::InputNoiseHeight,
            "input_voltage" => Self::InputVoltage,
            "output_voltage" => Self::OutputVoltage,
            "path_depth" => Self::PathDepth,
            "path_distance" => Self::PathDistance,
            "normalized_voltage" => Self::NormalizedVoltage,
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::InputNetTransition => "input_net_transition",
            Self::TotalOutputNetCapacitance => "total_output_net_capacitance",
            Self::InputTransitionTime => "input_transition_time",
            Self::RelatedPinTransition => "related_pin_transition",
            Self::ConstrainedPinTransition => "constrained_pin_transition",
            Self::OutputPinTransition => "output_pin_transition",
            Self::ConnectDelay => "connect_delay",
            Self::RelatedOutTotalOutputNetCapacitance => {
                "related_out_total_output_net_capacitance"
            }
            Self::EqualOrOppositeOutputNetCapacitance => {
                "equal_or_opposite_output_net_capacitance"
            }
            Self::Time => "time",
            Self::IvOutputVoltage => "iv_output_voltage",
            Self::InputNoiseWidth => "input_noise_width",
            Self::InputNoiseHeight => "input_noise_height",
            Self::InputVoltage => "input_voltage",
            Self::OutputVoltage => "output_voltage",
            Self::PathDepth => "path_depth",
            Self::PathDistance => "path_distance",
            Self::NormalizedVoltage => "normalized_voltage",
            Self::Unknown => "unknown",
        }
    }

    /// Name of the unit this axis variable is expressed in.
    pub fn unit_name(self) -> &'static str {
        match self {
            Self::InputNetTransition
            | Self::InputTransitionTime
            | Self::RelatedPinTransition
            | Self::ConstrainedPinTransition
            | Self::OutputPinTransition
            | Self::ConnectDelay
            | Self::Time
            | Self::InputNoiseWidth => "time",
            Self::TotalOutputNetCapacitance
            | Self::RelatedOutTotalOutputNetCapacitance
            | Self::EqualOrOppositeOutputNetCapacitance => "capacitance",
            Self::IvOutputVoltage
            | Self::InputNoiseHeight
            | Self::InputVoltage
            | Self::OutputVoltage
            | Self::NormalizedVoltage => "voltage",
            Self::PathDistance => "distance",
            Self::PathDepth | Self::Unknown => "scalar",
        }
    }
}

/// One table axis: a variable and its sorted sample points.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAxis {
    variable: TableAxisVariable,
    values: Vec<f32>,
}

impl TableAxis {
    /// Samples are sorted on construction; Liberty does not require the
    /// index attributes to be ordered.
    pub fn new(variable: TableAxisVariable, mut values: Vec<f32>) -> Self {
        values.sort_by(|a, b| a.partial_cmp(b).expect("NaN axis value"));
        TableAxis { variable, values }
    }

    pub fn variable(&self) -> TableAxisVariable {
        self.variable
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn axis_value(&self, index: usize) -> f32 {
        self.values[index]
    }

    pub fn min(&self) -> f32 {
        self.values[0]
    }

    pub fn max(&self) -> f32 {
        self.values[self.values.len() - 1]
    }

    pub fn in_bounds(&self, x: f32) -> bool {
        self.size() > 1 && x >= self.min() && x <= self.max()
    }

    /// Lower index of the segment bracketing `x`, clamped to
    /// `[0, size - 2]`. A single-point axis always answers 0.
    pub fn find_axis_index(&self, x: f32) -> usize {
        if self.size() < 2 {
            return 0;
        }
        let upper = self.values.partition_point(|v| *v <= x);
        upper.saturating_sub(1).min(self.size() - 2)
    }

    /// Exact-match lookup: `(index, true)` when `x` is a sample point,
    /// otherwise the bracketing segment index and `false`.
    pub fn find_axis_index_exact(&self, x: f32) -> (usize, bool) {
        let index = self.find_axis_index(x);
        if self.values[index] == x {
            (index, true)
        } else if index + 1 < self.size() && self.values[index + 1] == x {
            (index + 1, true)
        } else {
            (index, false)
        }
    }

    /// Nearest sample index by the midpoint rule; ties go to the upper
    /// sample.
    pub fn find_axis_closest_index(&self, x: f32) -> usize {
        if self.size() < 2 {
            return 0;
        }
        let index = self.find_axis_index(x);
        let midpoint = (self.values[index] + self.values[index + 1]) / 2.0;
        if x >= midpoint { index + 1 } else { index }
    }
}

/// Template kinds a library files its table templates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableTemplateType {
    Delay,
    Power,
    OutputCurrent,
    Ocv,
}

/// Reusable axis structure referenced by name from table groups. Tables
/// that omit their own index attributes inherit the template's points.
#[derive(Debug, Clone)]
pub struct TableTemplate {
    name: String,
    axes: [Option<Arc<TableAxis>>; 3],
}

impl TableTemplate {
    pub fn new(name: &str) -> Self {
        TableTemplate {
            name: name.to_string(),
            axes: [None, None, None],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis(&self, index: usize) -> Option<&Arc<TableAxis>> {
        self.axes.get(index).and_then(|a| a.as_ref())
    }

    pub fn axis1(&self) -> Option<&Arc<TableAxis>> {
        self.axis(0)
    }

    pub fn axis2(&self) -> Option<&Arc<TableAxis>> {
        self.axis(1)
    }

    pub fn axis3(&self) -> Option<&Arc<TableAxis>> {
        self.axis(2)
    }

    pub fn set_axis(&mut self, index: usize, axis: Arc<TableAxis>) {
        self.axes[index] = Some(axis);
    }

    pub fn order(&self) -> usize {
        self.axes.iter().filter(|a| a.is_some()).count()
    }
}

/// A 0- to 3-axis table of values. Axes are shared between tables built
/// from the same template.
#[derive(Debug, Clone)]
pub enum Table {
    Scalar(f32),
    OneD {
        values: Vec<f32>,
        axis1: Arc<TableAxis>,
    },
    TwoD {
        /// Row-major: `values[i1][i2]`.
        values: Vec<Vec<f32>>,
        axis1: Arc<TableAxis>,
        axis2: Arc<TableAxis>,
    },
    ThreeD {
        values: Vec<Vec<Vec<f32>>>,
        axis1: Arc<TableAxis>,
        axis2: Arc<TableAxis>,
        axis3: Arc<TableAxis>,
    },
}

/// Segment endpoints and interpolation fraction along one axis.
/// Single-point axes pin to index 0 with weight 1. The fraction is not
/// clamped, which is what produces end-segment-slope extrapolation.
fn axis_span(axis: &TableAxis, x: f32) -> (usize, usize, f32) {
    if axis.size() < 2 {
        return (0, 0, 0.0);
    }
    let i = axis.find_axis_index(x);
    let x0 = axis.axis_value(i);
    let x1 = axis.axis_value(i + 1);
    let t = (x - x0) / (x1 - x0);
    (i, i + 1, t)
}

impl Table {
    pub fn order(&self) -> usize {
        match self {
            Table::Scalar(_) => 0,
            Table::OneD { .. } => 1,
            Table::TwoD { .. } => 2,
            Table::ThreeD { .. } => 3,
        }
    }

    pub fn axis1(&self) -> Option<&Arc<TableAxis>> {
        match self {
            Table::Scalar(_) => None,
            Table::OneD { axis1, .. } => Some(axis1),
            Table::TwoD { axis1, .. } => Some(axis1),
            Table::ThreeD { axis1, .. } => Some(axis1),
        }
    }

    pub fn axis2(&self) -> Option<&Arc<TableAxis>> {
        match self {
            Table::TwoD { axis2, .. } => Some(axis2),
            Table::ThreeD { axis2, .. } => Some(axis2),
            _ => None,
        }
    }

    pub fn axis3(&self) -> Option<&Arc<TableAxis>> {
        match self {
            Table::ThreeD { axis3, .. } => Some(axis3),
            _ => None,
        }
    }

    /// Raw stored value. Indices beyond the table's order are ignored.
    pub fn value(&self, i: usize, j: usize, k: usize) -> f32 {
        match self {
            Table::Scalar(v) => *v,
            Table::OneD { values, .. } => values[i],
            Table::TwoD { values, .. } => values[i][j],
            Table::ThreeD { values, .. } => values[i][j][k],
        }
    }

    /// Interpolated lookup. Extra arguments are ignored for low-order
    /// tables.
    pub fn find_value(&self, x1: f32, x2: f32, x3: f32) -> f32 {
        match self {
            Table::Scalar(v) => *v,
            Table::OneD { values, axis1 } => {
                if axis1.size() < 2 {
                    return values[0];
                }
                let (i0, i1, t) = axis_span(axis1, x1);
                let v0 = f64::from(values[i0]);
                let v1 = f64::from(values[i1]);
                (v0 + t as f64 * (v1 - v0)) as f32
            }
            Table::TwoD {
                values,
                axis1,
                axis2,
            } => {
                let (i0, i1, ti) = axis_span(axis1, x1);
                let (j0, j1, tj) = axis_span(axis2, x2);
                let (ti, tj) = (ti as f64, tj as f64);
                let v = |i: usize, j: usize| f64::from(values[i][j]);
                let lo = v(i0, j0) + tj * (v(i0, j1) - v(i0, j0));
                let hi = v(i1, j0) + tj * (v(i1, j1) - v(i1, j0));
                (lo + ti * (hi - lo)) as f32
            }
            Table::ThreeD {
                values,
                axis1,
                axis2,
                axis3,
            } => {
                let (i0, i1, ti) = axis_span(axis1, x1);
                let (j0, j1, tj) = axis_span(axis2, x2);
                let (k0, k1, tk) = axis_span(axis3, x3);
                let (ti, tj, tk) = (ti as f64, tj as f64, tk as f64);
                let v = |i: usize, j: usize, k: usize| f64::from(values[i][j][k]);
                let plane = |i: usize| {
                    let lo = v(i, j0, k0) + tk * (v(i, j0, k1) - v(i, j0, k0));
                    let hi = v(i, j1, k0) + tk * (v(i, j1, k1) - v(i, j1, k0));
                    lo + tj * (hi - lo)
                };
                let lo = plane(i0);
                let hi = plane(i1);
                (lo + ti * (hi - lo)) as f32
            }
        }
    }

    /// Clipped lookup for one-axis tables: 0.0 below the first sample,
    /// the last stored value above the last sample, interpolation in
    /// between. The lower-bound value of 0.0 is load-bearing for wire
    /// slew degradation tables.
    pub fn find_value_clip(&self, x1: f32) -> f32 {
        match self {
            Table::Scalar(v) => *v,
            Table::OneD { values, axis1 } => {
                if x1 < axis1.min() {
                    0.0
                } else if x1 > axis1.max() {
                    values[values.len() - 1]
                } else {
                    self.find_value(x1, 0.0, 0.0)
                }
            }
            _ => {
                debug_assert!(false, "find_value_clip on a multi-axis table");
                self.find_value(x1, 0.0, 0.0)
            }
        }
    }

    /// Dump the table samples for diagnostics.
    pub fn report(&self, units: &Units) -> String {
        let mut out = String::new();
        match self {
            Table::Scalar(v) => {
                let _ = writeln!(out, "{}", units.scalar_unit().format(*v));
            }
            Table::OneD { values, axis1 } => {
                let _ = writeln!(out, "axis {}", axis1.variable().name());
                for (i, x) in axis1.values().iter().enumerate() {
                    let _ = writeln!(out, "{:>10} {:>10}", x, values[i]);
                }
            }
            Table::TwoD {
                values,
                axis1,
                axis2,
            } => {
                let _ = writeln!(
                    out,
                    "axes {} x {}",
                    axis1.variable().name(),
                    axis2.variable().name()
                );
                for (i, row) in values.iter().enumerate() {
                    let _ = write!(out, "{:>10}", axis1.axis_value(i));
                    for v in row {
                        let _ = write!(out, " {v:>10}");
                    }
                    let _ = writeln!(out);
                }
            }
            Table::ThreeD { axis1, axis2, axis3, .. } => {
                let _ = writeln!(
                    out,
                    "axes {} x {} x {}",
                    axis1.variable().name(),
                    axis2.variable().name(),
                    axis3.variable().name()
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(var: TableAxisVariable, values: &[f32]) -> Arc<TableAxis> {
        Arc::new(TableAxis::new(var, values.to_vec()))
    }

    #[test]
    fn axis_index_clamps_to_segments() {
        let a = TableAxis::new(TableAxisVariable::Time, vec![1.0, 2.0, 4.0]);
        assert_eq!(a.find_axis_index(0.0), 0);
        assert_eq!(a.find_axis_index(1.0), 0);
        assert_eq!(a.find_axis_index(1.5), 0);
        assert_eq!(a.find_axis_index(2.0), 1);
        assert_eq!(a.find_axis_index(3.9), 1);
        assert_eq!(a.find_axis_index(4.0), 1);
        assert_eq!(a.find_axis_index(100.0), 1);
    }

    #[test]
    fn axis_exact_and_closest() {
        let a = TableAxis::new(TableAxisVariable::Time, vec![1.0, 2.0, 4.0]);
        assert_eq!(a.find_axis_index_exact(2.0), (1, true));
        assert_eq!(a.find_axis_index_exact(4.0), (1, true));
        assert_eq!(a.find_axis_index_exact(2.5), (1, false));
        assert_eq!(a.find_axis_closest_index(1.4), 0);
        // Tie goes to the upper sample.
        assert_eq!(a.find_axis_closest_index(1.5), 1);
        assert_eq!(a.find_axis_closest_index(3.5), 2);
    }

    #[test]
    fn axis_in_bounds_needs_two_points() {
        let single = TableAxis::new(TableAxisVariable::Time, vec![1.0]);
        assert!(!single.in_bounds(1.0));
        let a = TableAxis::new(TableAxisVariable::Time, vec![1.0, 2.0]);
        assert!(a.in_bounds(1.5));
        assert!(!a.in_bounds(2.5));
    }

    #[test]
    fn axis_sorts_unordered_samples() {
        let a = TableAxis::new(TableAxisVariable::Time, vec![3.0, 1.0, 2.0]);
        assert_eq!(a.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn scalar_table() {
        let t = Table::Scalar(0.5);
        assert_eq!(t.order(), 0);
        assert_eq!(t.find_value(99.0, -3.0, 7.0), 0.5);
    }

    #[test]
    fn one_d_interpolation_and_extrapolation() {
        let t = Table::OneD {
            values: vec![1.0, 3.0, 4.0],
            axis1: axis(TableAxisVariable::InputNetTransition, &[0.0, 1.0, 2.0]),
        };
        assert_eq!(t.find_value(0.5, 0.0, 0.0), 2.0);
        assert_eq!(t.find_value(1.0, 0.0, 0.0), 3.0);
        // Below range: slope of the first segment (2.0 per unit).
        assert_eq!(t.find_value(-1.0, 0.0, 0.0), -1.0);
        // Above range: slope of the last segment (1.0 per unit).
        assert_eq!(t.find_value(3.0, 0.0, 0.0), 5.0);
    }

    #[test]
    fn one_d_clip() {
        let t = Table::OneD {
            values: vec![1.0, 3.0],
            axis1: axis(TableAxisVariable::OutputPinTransition, &[1.0, 2.0]),
        };
        assert_eq!(t.find_value_clip(0.5), 0.0);
        assert_eq!(t.find_value_clip(1.5), 2.0);
        assert_eq!(t.find_value_clip(9.0), 3.0);
    }

    #[test]
    fn two_d_bilinear() {
        // Spec scenario: axis1=[0,2], axis2=[0,4], values=[[0,4],[2,6]].
        let t = Table::TwoD {
            values: vec![vec![0.0, 4.0], vec![2.0, 6.0]],
            axis1: axis(TableAxisVariable::InputNetTransition, &[0.0, 2.0]),
            axis2: axis(TableAxisVariable::TotalOutputNetCapacitance, &[0.0, 4.0]),
        };
        assert_eq!(t.find_value(1.0, 2.0, 0.0), 3.0);
        assert_eq!(t.value(0, 0, 0), 0.0);
        assert_eq!(t.value(1, 1, 0), 6.0);
    }

    #[test]
    fn two_d_degenerate_single_point_axis() {
        let t = Table::TwoD {
            values: vec![vec![1.0, 5.0]],
            axis1: axis(TableAxisVariable::InputNetTransition, &[0.7]),
            axis2: axis(TableAxisVariable::TotalOutputNetCapacitance, &[0.0, 2.0]),
        };
        assert_eq!(t.find_value(123.0, 1.0, 0.0), 3.0);
    }

    #[test]
    fn three_d_grid_identity() {
        let t = Table::ThreeD {
            values: vec![
                vec![vec![0.0, 1.0], vec![2.0, 3.0]],
                vec![vec![4.0, 5.0], vec![6.0, 7.0]],
            ],
            axis1: axis(TableAxisVariable::InputNetTransition, &[0.0, 1.0]),
            axis2: axis(TableAxisVariable::TotalOutputNetCapacitance, &[0.0, 1.0]),
            axis3: axis(TableAxisVariable::RelatedOutTotalOutputNetCapacitance, &[0.0, 1.0]),
        };
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    assert_eq!(
                        t.find_value(i as f32, j as f32, k as f32),
                        t.value(i, j, k)
                    );
                }
            }
        }
        // Center of the cube.
        assert_eq!(t.find_value(0.5, 0.5, 0.5), 3.5);
    }

    #[test]
    fn template_axis_slots() {
        let mut tpl = TableTemplate::new("delay_template_5x5");
        assert_eq!(tpl.order(), 0);
        tpl.set_axis(0, axis(TableAxisVariable::InputNetTransition, &[0.1, 0.2]));
        tpl.set_axis(1, axis(TableAxisVariable::TotalOutputNetCapacitance, &[1.0, 2.0]));
        assert_eq!(tpl.order(), 2);
        assert_eq!(
            tpl.axis1().unwrap().variable(),
            TableAxisVariable::InputNetTransition
        );
        assert!(tpl.axis3().is_none());
    }
}
