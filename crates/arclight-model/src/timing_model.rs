//! Delay/check models attached to timing arcs.
//!
//! `LinearModel` is the generic-CMOS intrinsic+resistance model.
//! `GateTableModel` and `CheckTableModel` wrap lookup tables built from
//! library templates; evaluation maps arc inputs onto table axes by axis
//! variable and derates the raw lookup by the library's PVT scale factors.

use std::fmt::Write as _;
use std::sync::Arc;

use arclight_common::{EarlyLate, RiseFall, Unit};

use crate::library::{LibertyCell, LibertyLibrary, Pvt};
use crate::scale_factors::ScaleFactorType;
use crate::table::{Table, TableAxis, TableAxisVariable, TableTemplate};

#[derive(Debug, Clone)]
pub enum TimingModel {
    Linear(LinearModel),
    GateTable(GateTableModel),
    CheckTable(CheckTableModel),
}

impl TimingModel {
    pub fn intrinsic_delay(&self) -> f32 {
        match self {
            TimingModel::Linear(m) => m.intrinsic(),
            TimingModel::GateTable(m) => m
                .delay_model()
                .map_or(0.0, |d| d.find_value_unscaled(0.0, 0.0, 0.0)),
            TimingModel::CheckTable(m) => m.model().find_value_unscaled(0.0, 0.0, 0.0),
        }
    }

    pub fn drive_resistance(&self) -> f32 {
        match self {
            TimingModel::Linear(m) => m.resistance(),
            TimingModel::GateTable(m) => m.drive_resistance(),
            TimingModel::CheckTable(_) => 0.0,
        }
    }
}

/// Gate delay `d = intrinsic + R * load`; checks carry the intrinsic only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    intrinsic: f32,
    resistance: f32,
}

impl LinearModel {
    pub fn new(intrinsic: f32, resistance: f32) -> Self {
        LinearModel {
            intrinsic,
            resistance,
        }
    }

    pub fn intrinsic(&self) -> f32 {
        self.intrinsic
    }

    pub fn resistance(&self) -> f32 {
        self.resistance
    }

    pub fn gate_delay(&self, load_cap: f32) -> f32 {
        self.intrinsic + self.resistance * load_cap
    }

    pub fn check_delay(&self) -> f32 {
        self.intrinsic
    }
}

/// A shared table plus the scaling context needed to evaluate it.
#[derive(Debug, Clone)]
pub struct TableModel {
    table: Arc<Table>,
    template: Option<Arc<TableTemplate>>,
    scale_factor_type: ScaleFactorType,
    rf: RiseFall,
    /// True once PVT scaling has been baked into the stored values.
    is_scaled: bool,
}

impl TableModel {
    pub fn new(
        table: Arc<Table>,
        template: Option<Arc<TableTemplate>>,
        scale_factor_type: ScaleFactorType,
        rf: RiseFall,
    ) -> Self {
        TableModel {
            table,
            template,
            scale_factor_type,
            rf,
            is_scaled: false,
        }
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn template(&self) -> Option<&Arc<TableTemplate>> {
        self.template.as_ref()
    }

    pub fn scale_factor_type(&self) -> ScaleFactorType {
        self.scale_factor_type
    }

    pub fn rf(&self) -> RiseFall {
        self.rf
    }

    pub fn is_scaled(&self) -> bool {
        self.is_scaled
    }

    pub fn set_is_scaled(&mut self, scaled: bool) {
        self.is_scaled = scaled;
    }

    pub fn order(&self) -> usize {
        self.table.order()
    }

    pub fn axis1(&self) -> Option<&Arc<TableAxis>> {
        self.table.axis1()
    }

    pub fn axis2(&self) -> Option<&Arc<TableAxis>> {
        self.table.axis2()
    }

    pub fn axis3(&self) -> Option<&Arc<TableAxis>> {
        self.table.axis3()
    }

    pub fn value(&self, i: usize, j: usize, k: usize) -> f32 {
        self.table.value(i, j, k)
    }

    pub fn find_value_unscaled(&self, x1: f32, x2: f32, x3: f32) -> f32 {
        self.table.find_value(x1, x2, x3)
    }

    /// Interpolated lookup derated by the library's `(type, pvt, rf)`
    /// scale factor, unless scaling is already baked in.
    pub fn find_value(
        &self,
        library: &LibertyLibrary,
        cell: &LibertyCell,
        pvt: Option<&Pvt>,
        x1: f32,
        x2: f32,
        x3: f32,
    ) -> f32 {
        let raw = self.table.find_value(x1, x2, x3);
        if self.is_scaled {
            raw
        } else {
            raw * library.scale_factor(self.scale_factor_type, self.rf, cell, pvt)
        }
    }

    /// Human-readable account of a lookup: the operating point on each
    /// axis, the surrounding samples, and the result in user units.
    pub fn report_value(
        &self,
        quantity: &str,
        library: &LibertyLibrary,
        cell: &LibertyCell,
        pvt: Option<&Pvt>,
        x1: f32,
        x2: f32,
        x3: f32,
        unit: &Unit,
        digits: usize,
    ) -> String {
        let mut out = String::new();
        let xs = [x1, x2, x3];
        for (i, axis) in [self.axis1(), self.axis2(), self.axis3()]
            .into_iter()
            .enumerate()
        {
            if let Some(axis) = axis {
                let x = xs[i];
                let seg = axis.find_axis_index(x);
                let _ = write!(out, "{} = {:.digits$}", axis.variable().name(), x);
                if axis.size() > 1 {
                    let _ = write!(
                        out,
                        " (samples {:.digits$} .. {:.digits$})",
                        axis.axis_value(seg),
                        axis.axis_value(seg + 1),
                    );
                }
                let _ = writeln!(out);
            }
        }
        let value = self.find_value(library, cell, pvt, x1, x2, x3);
        let _ = writeln!(
            out,
            "{quantity} = {}{}",
            unit.format(value),
            unit.suffix()
        );
        out
    }
}

fn gate_axis_arg(var: TableAxisVariable, in_slew: f32, load_cap: f32, related_cap: f32) -> f32 {
    match var {
        TableAxisVariable::InputNetTransition | TableAxisVariable::InputTransitionTime => in_slew,
        TableAxisVariable::TotalOutputNetCapacitance => load_cap,
        TableAxisVariable::RelatedOutTotalOutputNetCapacitance
        | TableAxisVariable::EqualOrOppositeOutputNetCapacitance => related_cap,
        _ => 0.0,
    }
}

fn gate_axis_args(model: &TableModel, in_slew: f32, load_cap: f32) -> (f32, f32, f32) {
    let arg = |axis: Option<&Arc<TableAxis>>| {
        axis.map_or(0.0, |a| gate_axis_arg(a.variable(), in_slew, load_cap, 0.0))
    };
    (
        arg(model.axis1()),
        arg(model.axis2()),
        arg(model.axis3()),
    )
}

/// Receiver-pin capacitance tables, two waveform segments per edge.
#[derive(Debug, Clone, Default)]
pub struct ReceiverModel {
    capacitances: [[Option<Arc<Table>>; RiseFall::COUNT]; 2],
}

impl ReceiverModel {
    pub fn new() -> Self {
        ReceiverModel::default()
    }

    pub fn set_capacitance(&mut self, segment: usize, rf: RiseFall, table: Arc<Table>) {
        self.capacitances[segment][rf.index()] = Some(table);
    }

    pub fn capacitance(
        &self,
        segment: usize,
        rf: RiseFall,
        in_slew: f32,
        load_cap: f32,
    ) -> Option<f32> {
        self.capacitances[segment][rf.index()]
            .as_ref()
            .map(|t| t.find_value(in_slew, load_cap, 0.0))
    }
}

/// Normalized output-current waveforms for current-source drivers: one
/// current-vs-time table per (input slew, load cap) grid point.
#[derive(Debug, Clone)]
pub struct OutputWaveforms {
    slew_axis: Arc<TableAxis>,
    cap_axis: Arc<TableAxis>,
    currents: Vec<Arc<Table>>,
    reference_times: Arc<Table>,
}

impl OutputWaveforms {
    pub fn new(
        slew_axis: Arc<TableAxis>,
        cap_axis: Arc<TableAxis>,
        currents: Vec<Arc<Table>>,
        reference_times: Arc<Table>,
    ) -> Self {
        OutputWaveforms {
            slew_axis,
            cap_axis,
            currents,
            reference_times,
        }
    }

    pub fn current_waveform(&self, slew: f32, cap: f32) -> &Arc<Table> {
        let i = self.slew_axis.find_axis_closest_index(slew);
        let j = self.cap_axis.find_axis_closest_index(cap);
        &self.currents[i * self.cap_axis.size() + j]
    }

    pub fn reference_time(&self, slew: f32, cap: f32) -> f32 {
        self.reference_times.find_value(slew, cap, 0.0)
    }
}

/// Table-driven gate delay: delay and output slew tables, optional POCV
/// sigma tables, optional receiver/current-source models.
#[derive(Debug, Clone, Default)]
pub struct GateTableModel {
    delay: Option<TableModel>,
    slew: Option<TableModel>,
    delay_sigma: [Option<TableModel>; EarlyLate::COUNT],
    slew_sigma: [Option<TableModel>; EarlyLate::COUNT],
    receiver_model: Option<Arc<ReceiverModel>>,
    output_waveforms: Option<Arc<OutputWaveforms>>,
}

impl GateTableModel {
    pub fn new(delay: Option<TableModel>, slew: Option<TableModel>) -> Self {
        GateTableModel {
            delay,
            slew,
            ..GateTableModel::default()
        }
    }

    pub fn delay_model(&self) -> Option<&TableModel> {
        self.delay.as_ref()
    }

    pub fn slew_model(&self) -> Option<&TableModel> {
        self.slew.as_ref()
    }

    pub fn delay_sigma(&self, el: EarlyLate) -> Option<&TableModel> {
        self.delay_sigma[el.index()].as_ref()
    }

    pub fn slew_sigma(&self, el: EarlyLate) -> Option<&TableModel> {
        self.slew_sigma[el.index()].as_ref()
    }

    pub fn set_delay_sigma(&mut self, el: EarlyLate, model: TableModel) {
        self.delay_sigma[el.index()] = Some(model);
    }

    pub fn set_slew_sigma(&mut self, el: EarlyLate, model: TableModel) {
        self.slew_sigma[el.index()] = Some(model);
    }

    pub fn receiver_model(&self) -> Option<&Arc<ReceiverModel>> {
        self.receiver_model.as_ref()
    }

    pub fn set_receiver_model(&mut self, model: Arc<ReceiverModel>) {
        self.receiver_model = Some(model);
    }

    pub fn output_waveforms(&self) -> Option<&Arc<OutputWaveforms>> {
        self.output_waveforms.as_ref()
    }

    pub fn set_output_waveforms(&mut self, waveforms: Arc<OutputWaveforms>) {
        self.output_waveforms = Some(waveforms);
    }

    /// Evaluate delay and output slew at an operating point. With `pocv`
    /// the late delay sigma is added onto the nominal delay.
    pub fn gate_delay(
        &self,
        library: &LibertyLibrary,
        cell: &LibertyCell,
        pvt: Option<&Pvt>,
        in_slew: f32,
        load_cap: f32,
        pocv_enabled: bool,
    ) -> (f32, f32) {
        let eval = |model: Option<&TableModel>| {
            model.map_or(0.0, |m| {
                let (x1, x2, x3) = gate_axis_args(m, in_slew, load_cap);
                m.find_value(library, cell, pvt, x1, x2, x3)
            })
        };
        let mut delay = eval(self.delay.as_ref());
        let slew = eval(self.slew.as_ref());
        if pocv_enabled {
            delay += eval(self.delay_sigma(EarlyLate::late()));
        }
        (delay, slew)
    }

    /// Delay slope with respect to load at zero input slew.
    pub fn drive_resistance(&self) -> f32 {
        match &self.delay {
            Some(delay) => {
                let (x1_0, x2_0, x3_0) = gate_axis_args(delay, 0.0, 0.0);
                let (x1_1, x2_1, x3_1) = gate_axis_args(delay, 0.0, 1.0);
                delay.find_value_unscaled(x1_1, x2_1, x3_1)
                    - delay.find_value_unscaled(x1_0, x2_0, x3_0)
            }
            None => 0.0,
        }
    }

    /// Axis variables a gate delay/slew table may use, by table order.
    pub fn check_axes(table: &Table) -> bool {
        let ok = |axis: Option<&Arc<TableAxis>>| {
            axis.is_none_or(|a| {
                matches!(
                    a.variable(),
                    TableAxisVariable::InputNetTransition
                        | TableAxisVariable::InputTransitionTime
                        | TableAxisVariable::TotalOutputNetCapacitance
                        | TableAxisVariable::RelatedOutTotalOutputNetCapacitance
                )
            })
        };
        ok(table.axis1()) && ok(table.axis2()) && ok(table.axis3())
    }
}

/// Table-driven timing check, evaluated against
/// `(related pin slew, constrained pin slew, related output load)`.
#[derive(Debug, Clone)]
pub struct CheckTableModel {
    model: TableModel,
    sigma: [Option<TableModel>; EarlyLate::COUNT],
}

impl CheckTableModel {
    pub fn new(model: TableModel) -> Self {
        CheckTableModel {
            model,
            sigma: [None, None],
        }
    }

    pub fn model(&self) -> &TableModel {
        &self.model
    }

    pub fn sigma(&self, el: EarlyLate) -> Option<&TableModel> {
        self.sigma[el.index()].as_ref()
    }

    pub fn set_sigma(&mut self, el: EarlyLate, model: TableModel) {
        self.sigma[el.index()] = Some(model);
    }

    pub fn check_delay(
        &self,
        library: &LibertyLibrary,
        cell: &LibertyCell,
        pvt: Option<&Pvt>,
        from_slew: f32,
        to_slew: f32,
        related_out_cap: f32,
    ) -> f32 {
        let arg = |axis: Option<&Arc<TableAxis>>| {
            axis.map_or(0.0, |a| match a.variable() {
                TableAxisVariable::RelatedPinTransition => from_slew,
                TableAxisVariable::ConstrainedPinTransition => to_slew,
                TableAxisVariable::RelatedOutTotalOutputNetCapacitance => related_out_cap,
                _ => 0.0,
            })
        };
        let x1 = arg(self.model.axis1());
        let x2 = arg(self.model.axis2());
        let x3 = arg(self.model.axis3());
        self.model.find_value(library, cell, pvt, x1, x2, x3)
    }

    pub fn check_axes(table: &Table) -> bool {
        let ok = |axis: Option<&Arc<TableAxis>>| {
            axis.is_none_or(|a| {
                matches!(
                    a.variable(),
                    TableAxisVariable::RelatedPinTransition
                        | TableAxisVariable::ConstrainedPinTransition
                        | TableAxisVariable::RelatedOutTotalOutputNetCapacitance
                )
            })
        };
        ok(table.axis1()) && ok(table.axis2()) && ok(table.axis3())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::PortDirection;

    fn delay_table() -> Arc<Table> {
        Arc::new(Table::TwoD {
            values: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            axis1: Arc::new(TableAxis::new(
                TableAxisVariable::InputNetTransition,
                vec![0.0, 1.0],
            )),
            axis2: Arc::new(TableAxis::new(
                TableAxisVariable::TotalOutputNetCapacitance,
                vec![0.0, 1.0],
            )),
        })
    }

    fn library_and_cell() -> (LibertyLibrary, LibertyCell) {
        let library = LibertyLibrary::new("test", "test.lib");
        let mut cell = LibertyCell::new("buf", "test.lib");
        cell.add_port("A", PortDirection::Input);
        cell.add_port("Z", PortDirection::Output);
        (library, cell)
    }

    #[test]
    fn linear_model_delay() {
        let m = LinearModel::new(1.0e-9, 2.0e3);
        assert_eq!(m.gate_delay(1.0e-12), 1.0e-9 + 2.0e-9);
        assert_eq!(m.check_delay(), 1.0e-9);
    }

    #[test]
    fn table_model_unscaled_matches_table() {
        let model = TableModel::new(delay_table(), None, ScaleFactorType::Cell, RiseFall::Rise);
        assert_eq!(model.find_value_unscaled(0.5, 0.5, 0.0), 2.5);
        assert_eq!(model.order(), 2);
        assert_eq!(model.value(1, 0, 0), 3.0);
    }

    #[test]
    fn gate_delay_maps_axes() {
        let (library, cell) = library_and_cell();
        let delay = TableModel::new(delay_table(), None, ScaleFactorType::Cell, RiseFall::Rise);
        let slew = TableModel::new(delay_table(), None, ScaleFactorType::Transition, RiseFall::Rise);
        let gate = GateTableModel::new(Some(delay), Some(slew));
        let (d, s) = gate.gate_delay(&library, &cell, None, 0.0, 1.0, false);
        assert_eq!(d, 2.0);
        assert_eq!(s, 2.0);
    }

    #[test]
    fn drive_resistance_is_delay_slope() {
        let delay = TableModel::new(delay_table(), None, ScaleFactorType::Cell, RiseFall::Rise);
        let gate = GateTableModel::new(Some(delay), None);
        // Delay rises 1.0 per unit load along the cap axis.
        assert_eq!(gate.drive_resistance(), 1.0);
    }

    #[test]
    fn gate_axes_validation() {
        assert!(GateTableModel::check_axes(&delay_table()));
        let bad = Table::OneD {
            values: vec![0.0],
            axis1: Arc::new(TableAxis::new(TableAxisVariable::Time, vec![0.0])),
        };
        assert!(!GateTableModel::check_axes(&bad));
    }

    #[test]
    fn check_table_maps_constraint_axes() {
        let (library, cell) = library_and_cell();
        let table = Arc::new(Table::TwoD {
            values: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            axis1: Arc::new(TableAxis::new(
                TableAxisVariable::RelatedPinTransition,
                vec![0.0, 1.0],
            )),
            axis2: Arc::new(TableAxis::new(
                TableAxisVariable::ConstrainedPinTransition,
                vec![0.0, 1.0],
            )),
        });
        assert!(CheckTableModel::check_axes(&table));
        let check = CheckTableModel::new(TableModel::new(
            table,
            None,
            ScaleFactorType::Setup,
            RiseFall::Rise,
        ));
        let v = check.check_delay(&library, &cell, None, 1.0, 0.0, 0.0);
        assert_eq!(v, 3.0);
    }
}
