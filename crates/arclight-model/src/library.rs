//! The library → cell → port object graph.
//!
//! Libraries own their cells, cells own their ports and timing arc sets;
//! cross references are index newtypes into those arenas, so the graph has
//! no back-pointer cycles and ids stay stable for the life of the library.

use std::sync::Arc;

use arclight_common::{MinMax, RiseFall, Units};
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;

use crate::func_expr::FuncExpr;
use crate::power::{InternalPower, LeakagePower};
use crate::scale_factors::{ScaleFactorPvt, ScaleFactorType, ScaleFactors};
use crate::table::{Table, TableAxisVariable, TableTemplate, TableTemplateType};
use crate::timing_arc::TimingArcSet;
use crate::wireload::{Wireload, WireloadMode, WireloadSelection, WireloadTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcSetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
    Bidirect,
    Tristate,
    Internal,
    Power,
    Ground,
    Unknown,
}

impl PortDirection {
    pub fn find(name: &str) -> Self {
        match name {
            "input" => Self::Input,
            "output" => Self::Output,
            "inout" => Self::Bidirect,
            "internal" => Self::Internal,
            _ => Self::Unknown,
        }
    }

    pub const fn is_any_input(self) -> bool {
        matches!(self, Self::Input | Self::Bidirect)
    }

    pub const fn is_any_output(self) -> bool {
        matches!(self, Self::Output | Self::Bidirect | Self::Tristate)
    }

    pub const fn is_power_ground(self) -> bool {
        matches!(self, Self::Power | Self::Ground)
    }
}

/// `clock_gating_integrated_cell` classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockGateType {
    None_,
    LatchPosedge,
    LatchNegedge,
    Other,
}

impl ClockGateType {
    pub fn find(value: &str) -> Self {
        if value.starts_with("latch_posedge") {
            Self::LatchPosedge
        } else if value.starts_with("latch_negedge") {
            Self::LatchNegedge
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchCellType {
    CoarseGrain,
    FineGrain,
}

impl SwitchCellType {
    pub fn find(value: &str) -> Option<Self> {
        match value {
            "coarse_grain" => Some(Self::CoarseGrain),
            "fine_grain" => Some(Self::FineGrain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelShifterType {
    HighToLow,
    LowToHigh,
    HighLow,
}

impl LevelShifterType {
    pub fn find(value: &str) -> Option<Self> {
        match value {
            "HL" => Some(Self::HighToLow),
            "LH" => Some(Self::LowToHigh),
            "HL_LH" => Some(Self::HighLow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayModelType {
    GenericCmos,
    Table,
    Polynomial,
    Dcm,
}

impl DelayModelType {
    pub fn find(name: &str) -> Option<Self> {
        match name {
            "generic_cmos" => Some(Self::GenericCmos),
            "table_lookup" => Some(Self::Table),
            "polynomial" => Some(Self::Polynomial),
            "dcm" => Some(Self::Dcm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    Clk,
    Data,
}

impl PathType {
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        match self {
            Self::Clk => 0,
            Self::Data => 1,
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "clock" | "clk" => Some(Self::Clk),
            "data" => Some(Self::Data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicValue {
    Zero,
    One,
    Unknown,
}

impl LogicValue {
    pub fn find(value: &str) -> Self {
        match value {
            "L" | "l" | "0" => Self::Zero,
            "H" | "h" | "1" => Self::One,
            _ => Self::Unknown,
        }
    }
}

/// `type` group bus declaration: a named bit range.
#[derive(Debug, Clone, PartialEq)]
pub struct BusDcl {
    name: String,
    from: i32,
    to: i32,
}

impl BusDcl {
    pub fn new(name: &str, from: i32, to: i32) -> Self {
        BusDcl {
            name: name.to_string(),
            from,
            to,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from(&self) -> i32 {
        self.from
    }

    pub fn to(&self) -> i32 {
        self.to
    }

    pub fn size(&self) -> usize {
        (self.from - self.to).unsigned_abs() as usize + 1
    }
}

#[derive(Debug, Clone)]
pub struct ModeValueDef {
    value: String,
    cond: Option<FuncExpr>,
    sdf_cond: Option<String>,
}

impl ModeValueDef {
    pub fn new(value: &str) -> Self {
        ModeValueDef {
            value: value.to_string(),
            cond: None,
            sdf_cond: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cond(&self) -> Option<&FuncExpr> {
        self.cond.as_ref()
    }

    pub fn set_cond(&mut self, cond: FuncExpr) {
        self.cond = Some(cond);
    }

    pub fn sdf_cond(&self) -> Option<&str> {
        self.sdf_cond.as_deref()
    }

    pub fn set_sdf_cond(&mut self, cond: &str) {
        self.sdf_cond = Some(cond.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct ModeDef {
    name: String,
    values: Vec<ModeValueDef>,
}

impl ModeDef {
    pub fn new(name: &str) -> Self {
        ModeDef {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_value(&mut self, value: ModeValueDef) {
        self.values.push(value);
    }

    pub fn values(&self) -> &[ModeValueDef] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [ModeValueDef] {
        &mut self.values
    }

    pub fn find_value(&self, value: &str) -> Option<&ModeValueDef> {
        self.values.iter().find(|v| v.value() == value)
    }
}

/// Register/latch description; consumed by graph elaboration to build the
/// sequential's logical model.
#[derive(Debug, Clone)]
pub struct Sequential {
    is_register: bool,
    is_bank: bool,
    out_port: Option<PortId>,
    out_inv_port: Option<PortId>,
    size: usize,
    clock: Option<FuncExpr>,
    data: Option<FuncExpr>,
    clear: Option<FuncExpr>,
    preset: Option<FuncExpr>,
    clr_preset_var1: LogicValue,
    clr_preset_var2: LogicValue,
}

impl Sequential {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        is_register: bool,
        is_bank: bool,
        out_port: Option<PortId>,
        out_inv_port: Option<PortId>,
        size: usize,
        clock: Option<FuncExpr>,
        data: Option<FuncExpr>,
        clear: Option<FuncExpr>,
        preset: Option<FuncExpr>,
        clr_preset_var1: LogicValue,
        clr_preset_var2: LogicValue,
    ) -> Self {
        Sequential {
            is_register,
            is_bank,
            out_port,
            out_inv_port,
            size,
            clock,
            data,
            clear,
            preset,
            clr_preset_var1,
            clr_preset_var2,
        }
    }

    pub fn is_register(&self) -> bool {
        self.is_register
    }

    pub fn is_latch(&self) -> bool {
        !self.is_register
    }

    pub fn is_bank(&self) -> bool {
        self.is_bank
    }

    pub fn out_port(&self) -> Option<PortId> {
        self.out_port
    }

    pub fn out_inv_port(&self) -> Option<PortId> {
        self.out_inv_port
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn clock(&self) -> Option<&FuncExpr> {
        self.clock.as_ref()
    }

    pub fn data(&self) -> Option<&FuncExpr> {
        self.data.as_ref()
    }

    pub fn clear(&self) -> Option<&FuncExpr> {
        self.clear.as_ref()
    }

    pub fn preset(&self) -> Option<&FuncExpr> {
        self.preset.as_ref()
    }

    pub fn clr_preset_var1(&self) -> LogicValue {
        self.clr_preset_var1
    }

    pub fn clr_preset_var2(&self) -> LogicValue {
        self.clr_preset_var2
    }
}

/// Process/voltage/temperature triple used during delay calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pvt {
    process: f32,
    voltage: f32,
    temperature: f32,
}

impl Pvt {
    pub fn new(process: f32, voltage: f32, temperature: f32) -> Self {
        Pvt {
            process,
            voltage,
            temperature,
        }
    }

    pub fn process(&self) -> f32 {
        self.process
    }

    pub fn set_process(&mut self, process: f32) {
        self.process = process;
    }

    pub fn voltage(&self) -> f32 {
        self.voltage
    }

    pub fn set_voltage(&mut self, voltage: f32) {
        self.voltage = voltage;
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature;
    }

    pub fn value(&self, axis: ScaleFactorPvt) -> f32 {
        match axis {
            ScaleFactorPvt::Process => self.process,
            ScaleFactorPvt::Volt => self.voltage,
            ScaleFactorPvt::Temp => self.temperature,
        }
    }
}

impl Default for Pvt {
    fn default() -> Self {
        Pvt::new(1.0, 0.0, 0.0)
    }
}

#[derive(Debug, Clone)]
pub struct OperatingConditions {
    name: String,
    pvt: Pvt,
    tree: WireloadTree,
}

impl OperatingConditions {
    pub fn new(name: &str) -> Self {
        OperatingConditions {
            name: name.to_string(),
            pvt: Pvt::default(),
            tree: WireloadTree::Unknown,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pvt(&self) -> &Pvt {
        &self.pvt
    }

    pub fn pvt_mut(&mut self) -> &mut Pvt {
        &mut self.pvt
    }

    pub fn wireload_tree(&self) -> WireloadTree {
        self.tree
    }

    pub fn set_wireload_tree(&mut self, tree: WireloadTree) {
        self.tree = tree;
    }
}

/// Per-arc OCV derate tables, indexed `[rise/fall][early/late][path type]`.
#[derive(Debug, Clone)]
pub struct OcvDerate {
    name: String,
    tables: [[[Option<Arc<Table>>; PathType::COUNT]; MinMax::COUNT]; RiseFall::COUNT],
}

impl OcvDerate {
    pub fn new(name: &str) -> Self {
        OcvDerate {
            name: name.to_string(),
            tables: Default::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn derate_table(
        &self,
        rf: RiseFall,
        early_late: MinMax,
        path_type: PathType,
    ) -> Option<&Arc<Table>> {
        self.tables[rf.index()][early_late.index()][path_type.index()].as_ref()
    }

    pub fn set_derate_table(
        &mut self,
        rf: RiseFall,
        early_late: MinMax,
        path_type: PathType,
        table: Arc<Table>,
    ) {
        self.tables[rf.index()][early_late.index()][path_type.index()] = Some(table);
    }
}

/// Normalized output-voltage-versus-slew waveform for current-source
/// driver modeling.
#[derive(Debug, Clone)]
pub struct DriverWaveform {
    name: Option<String>,
    table: Arc<Table>,
}

impl DriverWaveform {
    pub fn new(name: Option<&str>, table: Arc<Table>) -> Self {
        DriverWaveform {
            name: name.map(str::to_string),
            table,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn value(&self, slew: f32, normalized_time: f32) -> f32 {
        self.table.find_value(slew, normalized_time, 0.0)
    }
}

/* ─────────────────────────── LibertyPort ─────────────────────────── */

#[derive(Debug, Clone)]
pub struct LibertyPort {
    name: String,
    direction: PortDirection,
    function: Option<FuncExpr>,
    tristate_enable: Option<FuncExpr>,
    bus_dcl: Option<BusDcl>,
    members: Vec<PortId>,
    parent: Option<PortId>,
    bus_bit_index: Option<i32>,
    is_bundle: bool,
    /// `[rise/fall][min/max]`.
    capacitance: [[Option<f32>; MinMax::COUNT]; RiseFall::COUNT],
    slew_limit: [Option<f32>; MinMax::COUNT],
    cap_limit: [Option<f32>; MinMax::COUNT],
    fanout_limit: [Option<f32>; MinMax::COUNT],
    fanout_load: Option<f32>,
    min_period: Option<f32>,
    min_pulse_width: [Option<f32>; RiseFall::COUNT],
    pub is_clock: bool,
    pub is_reg_clk: bool,
    pub is_reg_output: bool,
    pub is_check_clk: bool,
    pub is_latch_data: bool,
    pub is_pll_feedback: bool,
    pub is_pad: bool,
    pub is_switch: bool,
    pub is_disabled_constraint: bool,
    pub isolation_cell_data: bool,
    pub isolation_cell_enable: bool,
    pub level_shifter_data: bool,
    pub is_clock_gate_clock: bool,
    pub is_clock_gate_enable: bool,
    pub is_clock_gate_out: bool,
    pulse_clk: Option<(RiseFall, RiseFall)>,
    related_ground_pin: Option<String>,
    related_power_pin: Option<String>,
    driver_waveforms: [Option<String>; RiseFall::COUNT],
}

impl LibertyPort {
    fn new(name: &str, direction: PortDirection) -> Self {
        LibertyPort {
            name: name.to_string(),
            direction,
            function: None,
            tristate_enable: None,
            bus_dcl: None,
            members: Vec::new(),
            parent: None,
            bus_bit_index: None,
            is_bundle: false,
            capacitance: Default::default(),
            slew_limit: Default::default(),
            cap_limit: Default::default(),
            fanout_limit: Default::default(),
            fanout_load: None,
            min_period: None,
            min_pulse_width: Default::default(),
            is_clock: false,
            is_reg_clk: false,
            is_reg_output: false,
            is_check_clk: false,
            is_latch_data: false,
            is_pll_feedback: false,
            is_pad: false,
            is_switch: false,
            is_disabled_constraint: false,
            isolation_cell_data: false,
            isolation_cell_enable: false,
            level_shifter_data: false,
            is_clock_gate_clock: false,
            is_clock_gate_enable: false,
            is_clock_gate_out: false,
            pulse_clk: None,
            related_ground_pin: None,
            related_power_pin: None,
            driver_waveforms: Default::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: PortDirection) {
        self.direction = direction;
    }

    pub fn function(&self) -> Option<&FuncExpr> {
        self.function.as_ref()
    }

    pub fn set_function(&mut self, function: FuncExpr) {
        self.function = Some(function);
    }

    pub fn tristate_enable(&self) -> Option<&FuncExpr> {
        self.tristate_enable.as_ref()
    }

    pub fn set_tristate_enable(&mut self, enable: FuncExpr) {
        self.tristate_enable = Some(enable);
    }

    pub fn bus_dcl(&self) -> Option<&BusDcl> {
        self.bus_dcl.as_ref()
    }

    pub fn is_bus(&self) -> bool {
        self.bus_dcl.is_some()
    }

    pub fn is_bundle(&self) -> bool {
        self.is_bundle
    }

    pub fn is_bus_bit(&self) -> bool {
        self.bus_bit_index.is_some()
    }

    pub fn bus_bit_index(&self) -> Option<i32> {
        self.bus_bit_index
    }

    /// Bus/bundle top port this port is a bit or member of.
    pub fn parent(&self) -> Option<PortId> {
        self.parent
    }

    pub fn members(&self) -> &[PortId] {
        &self.members
    }

    pub fn member(&self, index: usize) -> PortId {
        self.members[index]
    }

    pub fn size(&self) -> usize {
        if self.members.is_empty() {
            1
        } else {
            self.members.len()
        }
    }

    /* capacitance */

    pub fn set_capacitance(&mut self, cap: f32) {
        for rf in 0..RiseFall::COUNT {
            for mm in 0..MinMax::COUNT {
                self.capacitance[rf][mm] = Some(cap);
            }
        }
    }

    pub fn set_capacitance_rf(&mut self, rf: RiseFall, min_max: MinMax, cap: f32) {
        self.capacitance[rf.index()][min_max.index()] = Some(cap);
    }

    pub fn capacitance_rf(&self, rf: RiseFall, min_max: MinMax) -> f32 {
        self.capacitance[rf.index()][min_max.index()].unwrap_or(0.0)
    }

    /// Worst capacitance for `min_max` across both edges.
    pub fn capacitance_min_max(&self, min_max: MinMax) -> f32 {
        let rise = self.capacitance_rf(RiseFall::Rise, min_max);
        let fall = self.capacitance_rf(RiseFall::Fall, min_max);
        min_max.minmax(rise, fall)
    }

    /// Single representative capacitance (max corner).
    pub fn capacitance(&self) -> f32 {
        self.capacitance_min_max(MinMax::Max)
    }

    /// True when all four stored values exist and agree.
    pub fn capacitance_is_one_value(&self) -> bool {
        let first = self.capacitance[0][0];
        first.is_some()
            && self
                .capacitance
                .iter()
                .flatten()
                .all(|c| *c == first)
    }

    /* limits */

    pub fn slew_limit(&self, min_max: MinMax) -> Option<f32> {
        self.slew_limit[min_max.index()]
    }

    pub fn set_slew_limit(&mut self, min_max: MinMax, limit: f32) {
        self.slew_limit[min_max.index()] = Some(limit);
    }

    pub fn capacitance_limit(&self, min_max: MinMax) -> Option<f32> {
        self.cap_limit[min_max.index()]
    }

    pub fn set_capacitance_limit(&mut self, min_max: MinMax, limit: f32) {
        self.cap_limit[min_max.index()] = Some(limit);
    }

    pub fn fanout_limit(&self, min_max: MinMax) -> Option<f32> {
        self.fanout_limit[min_max.index()]
    }

    pub fn set_fanout_limit(&mut self, min_max: MinMax, limit: f32) {
        self.fanout_limit[min_max.index()] = Some(limit);
    }

    pub fn fanout_load(&self) -> Option<f32> {
        self.fanout_load
    }

    pub fn set_fanout_load(&mut self, load: f32) {
        self.fanout_load = Some(load);
    }

    pub fn min_period(&self) -> Option<f32> {
        self.min_period
    }

    pub fn set_min_period(&mut self, period: f32) {
        self.min_period = Some(period);
    }

    pub fn min_pulse_width(&self, rf: RiseFall) -> Option<f32> {
        self.min_pulse_width[rf.index()]
    }

    pub fn set_min_pulse_width(&mut self, rf: RiseFall, width: f32) {
        self.min_pulse_width[rf.index()] = Some(width);
    }

    /* misc attributes */

    pub fn pulse_clk(&self) -> Option<(RiseFall, RiseFall)> {
        self.pulse_clk
    }

    pub fn set_pulse_clk(&mut self, trigger: RiseFall, sense: RiseFall) {
        self.pulse_clk = Some((trigger, sense));
    }

    pub fn related_ground_pin(&self) -> Option<&str> {
        self.related_ground_pin.as_deref()
    }

    pub fn set_related_ground_pin(&mut self, pin: &str) {
        self.related_ground_pin = Some(pin.to_string());
    }

    pub fn related_power_pin(&self) -> Option<&str> {
        self.related_power_pin.as_deref()
    }

    pub fn set_related_power_pin(&mut self, pin: &str) {
        self.related_power_pin = Some(pin.to_string());
    }

    pub fn driver_waveform_name(&self, rf: RiseFall) -> Option<&str> {
        self.driver_waveforms[rf.index()].as_deref()
    }

    pub fn set_driver_waveform_name(&mut self, rf: RiseFall, name: &str) {
        self.driver_waveforms[rf.index()] = Some(name.to_string());
    }

    /// Scene/corner projection; identity until per-scene twins exist.
    pub fn scene_port(&self, port_id: PortId, _scene: usize, _min_max: MinMax) -> PortId {
        port_id
    }
}

/* ─────────────────────────── LibertyCell ─────────────────────────── */

#[derive(Debug, Clone)]
pub struct LibertyCell {
    name: String,
    filename: String,
    id: Option<CellId>,
    area: f32,
    pub dont_use: bool,
    pub is_macro: bool,
    pub is_memory: bool,
    pub is_pad: bool,
    pub is_clock_cell: bool,
    pub is_level_shifter: bool,
    pub is_isolation_cell: bool,
    pub always_on: bool,
    pub interface_timing: bool,
    pub has_internal_ports: bool,
    pub has_infered_reg_timing_arcs: bool,
    pub is_disabled_constraint: bool,
    clock_gate_type: ClockGateType,
    switch_cell_type: Option<SwitchCellType>,
    level_shifter_type: Option<LevelShifterType>,
    leakage_power: Option<f32>,
    ocv_arc_depth: Option<f32>,
    ocv_derate_name: Option<String>,
    scale_factors_name: Option<String>,
    footprint: Option<String>,
    user_function_class: Option<String>,
    ports: Vec<LibertyPort>,
    port_index: FxHashMap<String, PortId>,
    arc_sets: Vec<TimingArcSet>,
    internal_powers: Vec<InternalPower>,
    leakage_powers: Vec<LeakagePower>,
    sequentials: Vec<Sequential>,
    mode_defs: FxHashMap<String, ModeDef>,
    bus_dcls: FxHashMap<String, BusDcl>,
    test_cell: Option<Box<LibertyCell>>,
    /// Per-scene/corner twin cells; empty means identity projection.
    corner_cells: Vec<CellId>,
}

impl LibertyCell {
    pub fn new(name: &str, filename: &str) -> Self {
        LibertyCell {
            name: name.to_string(),
            filename: filename.to_string(),
            id: None,
            area: 0.0,
            dont_use: false,
            is_macro: false,
            is_memory: false,
            is_pad: false,
            is_clock_cell: false,
            is_level_shifter: false,
            is_isolation_cell: false,
            always_on: false,
            interface_timing: false,
            has_internal_ports: false,
            has_infered_reg_timing_arcs: false,
            is_disabled_constraint: false,
            clock_gate_type: ClockGateType::None_,
            switch_cell_type: None,
            level_shifter_type: None,
            leakage_power: None,
            ocv_arc_depth: None,
            ocv_derate_name: None,
            scale_factors_name: None,
            footprint: None,
            user_function_class: None,
            ports: Vec::new(),
            port_index: FxHashMap::default(),
            arc_sets: Vec::new(),
            internal_powers: Vec::new(),
            leakage_powers: Vec::new(),
            sequentials: Vec::new(),
            mode_defs: FxHashMap::default(),
            bus_dcls: FxHashMap::default(),
            test_cell: None,
            corner_cells: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename before library registration; scaled-cell twins register
    /// under a scoped name.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn id(&self) -> Option<CellId> {
        self.id
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn set_area(&mut self, area: f32) {
        self.area = area;
    }

    pub fn clock_gate_type(&self) -> ClockGateType {
        self.clock_gate_type
    }

    pub fn set_clock_gate_type(&mut self, cg: ClockGateType) {
        self.clock_gate_type = cg;
    }

    pub fn is_clock_gate(&self) -> bool {
        self.clock_gate_type != ClockGateType::None_
    }

    pub fn switch_cell_type(&self) -> Option<SwitchCellType> {
        self.switch_cell_type
    }

    pub fn set_switch_cell_type(&mut self, sc: SwitchCellType) {
        self.switch_cell_type = Some(sc);
    }

    pub fn level_shifter_type(&self) -> Option<LevelShifterType> {
        self.level_shifter_type
    }

    pub fn set_level_shifter_type(&mut self, ls: LevelShifterType) {
        self.level_shifter_type = Some(ls);
    }

    pub fn leakage_power(&self) -> Option<f32> {
        self.leakage_power
    }

    pub fn set_leakage_power(&mut self, power: f32) {
        self.leakage_power = Some(power);
    }

    pub fn ocv_arc_depth(&self) -> Option<f32> {
        self.ocv_arc_depth
    }

    pub fn set_ocv_arc_depth(&mut self, depth: f32) {
        self.ocv_arc_depth = Some(depth);
    }

    pub fn ocv_derate_name(&self) -> Option<&str> {
        self.ocv_derate_name.as_deref()
    }

    pub fn set_ocv_derate_name(&mut self, name: &str) {
        self.ocv_derate_name = Some(name.to_string());
    }

    pub fn scale_factors_name(&self) -> Option<&str> {
        self.scale_factors_name.as_deref()
    }

    pub fn set_scale_factors_name(&mut self, name: &str) {
        self.scale_factors_name = Some(name.to_string());
    }

    pub fn footprint(&self) -> Option<&str> {
        self.footprint.as_deref()
    }

    pub fn set_footprint(&mut self, footprint: &str) {
        self.footprint = Some(footprint.to_string());
    }

    pub fn user_function_class(&self) -> Option<&str> {
        self.user_function_class.as_deref()
    }

    pub fn set_user_function_class(&mut self, class: &str) {
        self.user_function_class = Some(class.to_string());
    }

    pub fn test_cell(&self) -> Option<&LibertyCell> {
        self.test_cell.as_deref()
    }

    pub fn set_test_cell(&mut self, cell: LibertyCell) {
        self.test_cell = Some(Box::new(cell));
    }

    pub fn corner_cells(&self) -> &[CellId] {
        &self.corner_cells
    }

    pub fn add_corner_cell(&mut self, cell: CellId) {
        self.corner_cells.push(cell);
    }

    /// Twin cell for a scene; scene 0 (and unpopulated twins) project to
    /// this cell.
    pub fn scene_cell(&self, scene: usize) -> Option<CellId> {
        if scene == 0 || self.corner_cells.is_empty() {
            self.id
        } else {
            self.corner_cells.get(scene - 1).copied().or(self.id)
        }
    }

    /* ports */

    pub fn add_port(&mut self, name: &str, direction: PortDirection) -> PortId {
        let id = PortId(self.ports.len() as u32);
        self.ports.push(LibertyPort::new(name, direction));
        self.port_index.insert(name.to_string(), id);
        id
    }

    /// Create a bus port plus its bit ports `name[from..to]`.
    pub fn add_bus_port(
        &mut self,
        name: &str,
        from: i32,
        to: i32,
        direction: PortDirection,
    ) -> PortId {
        let bus_id = self.add_port(name, direction);
        let step: i32 = if from <= to { 1 } else { -1 };
        let mut members = Vec::new();
        let mut index = from;
        loop {
            let bit_name = format!("{name}[{index}]");
            let bit_id = self.add_port(&bit_name, direction);
            self.ports[bit_id.0 as usize].parent = Some(bus_id);
            self.ports[bit_id.0 as usize].bus_bit_index = Some(index);
            members.push(bit_id);
            if index == to {
                break;
            }
            index += step;
        }
        let bus = &mut self.ports[bus_id.0 as usize];
        bus.members = members;
        bus.bus_dcl = Some(BusDcl::new(name, from, to));
        bus_id
    }

    /// Create a bundle port grouping existing member ports.
    pub fn add_bundle_port(&mut self, name: &str, members: Vec<PortId>) -> PortId {
        let bundle_id = self.add_port(name, PortDirection::Unknown);
        for member in &members {
            self.ports[member.0 as usize].parent = Some(bundle_id);
        }
        let bundle = &mut self.ports[bundle_id.0 as usize];
        bundle.members = members;
        bundle.is_bundle = true;
        bundle_id
    }

    pub fn port(&self, id: PortId) -> &LibertyPort {
        &self.ports[id.0 as usize]
    }

    pub fn port_mut(&mut self, id: PortId) -> &mut LibertyPort {
        &mut self.ports[id.0 as usize]
    }

    pub fn find_port(&self, name: &str) -> Option<PortId> {
        self.port_index.get(name).copied()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// All ports including bus bits and bundle members, in creation order.
    pub fn port_ids(&self) -> impl Iterator<Item = PortId> + '_ {
        (0..self.ports.len()).map(|i| PortId(i as u32))
    }

    /// Top-level ports only (no bus bits, no bundle members).
    pub fn top_port_ids(&self) -> impl Iterator<Item = PortId> + '_ {
        self.port_ids()
            .filter(move |id| self.port(*id).parent.is_none())
    }

    /* timing arc sets */

    /// Register an arc set, assigning its stable intra-cell index.
    pub fn add_timing_arc_set(&mut self, mut set: TimingArcSet) -> ArcSetId {
        let index = self.arc_sets.len();
        set.set_index(index);
        self.arc_sets.push(set);
        ArcSetId(index as u32)
    }

    pub fn timing_arc_sets(&self) -> &[TimingArcSet] {
        &self.arc_sets
    }

    pub fn timing_arc_set(&self, id: ArcSetId) -> &TimingArcSet {
        &self.arc_sets[id.0 as usize]
    }

    pub fn find_timing_arc_set(&self, index: usize) -> Option<&TimingArcSet> {
        self.arc_sets.get(index)
    }

    /// Arc sets from `from` to `to`, in registration order.
    pub fn timing_arc_sets_between(
        &self,
        from: Option<PortId>,
        to: Option<PortId>,
    ) -> impl Iterator<Item = &TimingArcSet> {
        self.arc_sets.iter().filter(move |set| {
            (from.is_none() || set.from() == from) && (to.is_none() || set.to() == to)
        })
    }

    pub fn has_timing_arcs(&self, port: PortId) -> bool {
        self.arc_sets
            .iter()
            .any(|set| set.from() == Some(port) || set.to() == Some(port))
    }

    /// Max drive resistance over the arcs driving `port`.
    pub fn drive_resistance(&self, port: PortId) -> f32 {
        let mut max_res = 0.0f32;
        for set in &self.arc_sets {
            if set.to() == Some(port) && !set.role().is_timing_check() {
                for arc in set.arcs() {
                    max_res = max_res.max(arc.drive_resistance());
                }
            }
        }
        max_res
    }

    /* power */

    pub fn add_internal_power(&mut self, power: InternalPower) {
        self.internal_powers.push(power);
    }

    pub fn internal_powers(&self) -> &[InternalPower] {
        &self.internal_powers
    }

    pub fn add_leakage_power(&mut self, power: LeakagePower) {
        self.leakage_powers.push(power);
    }

    pub fn leakage_powers(&self) -> &[LeakagePower] {
        &self.leakage_powers
    }

    /* sequentials */

    pub fn add_sequential(&mut self, seq: Sequential) {
        self.sequentials.push(seq);
    }

    pub fn sequentials(&self) -> &[Sequential] {
        &self.sequentials
    }

    pub fn has_sequentials(&self) -> bool {
        !self.sequentials.is_empty()
    }

    /* mode defs / bus dcls */

    pub fn make_mode_def(&mut self, name: &str) -> &mut ModeDef {
        self.mode_defs
            .entry(name.to_string())
            .or_insert_with(|| ModeDef::new(name))
    }

    pub fn find_mode_def(&self, name: &str) -> Option<&ModeDef> {
        self.mode_defs.get(name)
    }

    pub fn add_bus_dcl(&mut self, dcl: BusDcl) {
        self.bus_dcls.insert(dcl.name().to_string(), dcl);
    }

    pub fn find_bus_dcl(&self, name: &str) -> Option<&BusDcl> {
        self.bus_dcls.get(name)
    }

    /* structure predicates */

    fn single_input_output(&self) -> Option<(PortId, PortId)> {
        let mut input = None;
        let mut output = None;
        for id in self.top_port_ids() {
            let port = self.port(id);
            match port.direction() {
                PortDirection::Input => {
                    if input.is_some() {
                        return None;
                    }
                    input = Some(id);
                }
                PortDirection::Output | PortDirection::Tristate => {
                    if output.is_some() {
                        return None;
                    }
                    output = Some(id);
                }
                PortDirection::Power | PortDirection::Ground | PortDirection::Internal => {}
                _ => return None,
            }
        }
        input.zip(output)
    }

    /// One input, one output, output function is the input port.
    pub fn is_buffer(&self) -> bool {
        self.single_input_output()
            .map(|(input, output)| {
                FuncExpr::equiv(
                    self.port(output).function(),
                    Some(&FuncExpr::make_port(input)),
                )
            })
            .unwrap_or(false)
    }

    /// One input, one output, output function is NOT of the input port.
    pub fn is_inverter(&self) -> bool {
        self.single_input_output()
            .map(|(input, output)| {
                FuncExpr::equiv(
                    self.port(output).function(),
                    Some(&FuncExpr::make_not(FuncExpr::make_port(input))),
                )
            })
            .unwrap_or(false)
    }

    /// The (input, output) ports of a buffer cell.
    pub fn buffer_ports(&self) -> Option<(PortId, PortId)> {
        if self.is_buffer() {
            self.single_input_output()
        } else {
            None
        }
    }
}

/* ───────────────────────── LibertyLibrary ────────────────────────── */

/// Simple glob: `*` matches any run, `?` matches one character.
pub fn pattern_match(pattern: &str, name: &str) -> bool {
    fn matches(p: &[u8], n: &[u8]) -> bool {
        match (p.first(), n.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                matches(&p[1..], n) || (!n.is_empty() && matches(p, &n[1..]))
            }
            (Some(b'?'), Some(_)) => matches(&p[1..], &n[1..]),
            (Some(pc), Some(nc)) if pc == nc => matches(&p[1..], &n[1..]),
            _ => false,
        }
    }
    matches(pattern.as_bytes(), name.as_bytes())
}

#[derive(Debug)]
pub struct LibertyLibrary {
    name: String,
    filename: String,
    units: Units,
    delay_model: DelayModelType,
    bus_brackets: (char, char),
    cells: Vec<LibertyCell>,
    cell_index: FxHashMap<String, CellId>,
    bus_dcls: FxHashMap<String, BusDcl>,
    templates: FxHashMap<(TableTemplateType, String), Arc<TableTemplate>>,
    wireloads: FxHashMap<String, Wireload>,
    wireload_selections: FxHashMap<String, WireloadSelection>,
    op_conds: FxHashMap<String, OperatingConditions>,
    scale_factors_map: FxHashMap<String, ScaleFactors>,
    ocv_derates: FxHashMap<String, OcvDerate>,
    driver_waveforms: FxHashMap<String, DriverWaveform>,
    default_driver_waveform: Option<DriverWaveform>,
    default_wireload: Option<String>,
    default_wireload_mode: WireloadMode,
    default_wireload_selection: Option<String>,
    default_op_cond: Option<String>,
    default_scale_factors: Option<String>,
    default_ocv_derate: Option<String>,
    nominal: Pvt,
    ocv_arc_depth: Option<f32>,
    input_threshold: [f32; RiseFall::COUNT],
    output_threshold: [f32; RiseFall::COUNT],
    slew_lower_threshold: [f32; RiseFall::COUNT],
    slew_upper_threshold: [f32; RiseFall::COUNT],
    slew_derate_from_library: f32,
    default_input_pin_cap: f32,
    default_output_pin_cap: f32,
    default_bidirect_pin_cap: f32,
    default_intrinsic: [Option<f32>; RiseFall::COUNT],
    default_inout_pin_res: [Option<f32>; RiseFall::COUNT],
    default_output_pin_res: [Option<f32>; RiseFall::COUNT],
    default_max_slew: Option<f32>,
    default_max_capacitance: Option<f32>,
    default_max_fanout: Option<f32>,
    default_fanout_load: Option<f32>,
    wire_slew_degradation: [Option<Arc<Table>>; RiseFall::COUNT],
    supply_voltages: FxHashMap<String, f32>,
    buffers_cache: OnceCell<Vec<CellId>>,
    inverters_cache: OnceCell<Vec<CellId>>,
}

impl LibertyLibrary {
    pub fn new(name: &str, filename: &str) -> Self {
        LibertyLibrary {
            name: name.to_string(),
            filename: filename.to_string(),
            units: Units::new(),
            delay_model: DelayModelType::Table,
            bus_brackets: ('[', ']'),
            cells: Vec::new(),
            cell_index: FxHashMap::default(),
            bus_dcls: FxHashMap::default(),
            templates: FxHashMap::default(),
            wireloads: FxHashMap::default(),
            wireload_selections: FxHashMap::default(),
            op_conds: FxHashMap::default(),
            scale_factors_map: FxHashMap::default(),
            ocv_derates: FxHashMap::default(),
            driver_waveforms: FxHashMap::default(),
            default_driver_waveform: None,
            default_wireload: None,
            default_wireload_mode: WireloadMode::Unknown,
            default_wireload_selection: None,
            default_op_cond: None,
            default_scale_factors: None,
            default_ocv_derate: None,
            nominal: Pvt::default(),
            ocv_arc_depth: None,
            input_threshold: [50.0; RiseFall::COUNT],
            output_threshold: [50.0; RiseFall::COUNT],
            slew_lower_threshold: [20.0; RiseFall::COUNT],
            slew_upper_threshold: [80.0; RiseFall::COUNT],
            slew_derate_from_library: 1.0,
            default_input_pin_cap: 0.0,
            default_output_pin_cap: 0.0,
            default_bidirect_pin_cap: 0.0,
            default_intrinsic: Default::default(),
            default_inout_pin_res: Default::default(),
            default_output_pin_res: Default::default(),
            default_max_slew: None,
            default_max_capacitance: None,
            default_max_fanout: None,
            default_fanout_load: None,
            wire_slew_degradation: Default::default(),
            supply_voltages: FxHashMap::default(),
            buffers_cache: OnceCell::new(),
            inverters_cache: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut Units {
        &mut self.units
    }

    pub fn delay_model(&self) -> DelayModelType {
        self.delay_model
    }

    pub fn set_delay_model(&mut self, model: DelayModelType) {
        self.delay_model = model;
    }

    pub fn bus_brackets(&self) -> (char, char) {
        self.bus_brackets
    }

    pub fn set_bus_brackets(&mut self, open: char, close: char) {
        self.bus_brackets = (open, close);
    }

    /* cells */

    pub fn add_cell(&mut self, mut cell: LibertyCell) -> CellId {
        let id = CellId(self.cells.len() as u32);
        cell.id = Some(id);
        self.cell_index.insert(cell.name().to_string(), id);
        self.cells.push(cell);
        id
    }

    pub fn cell(&self, id: CellId) -> &LibertyCell {
        &self.cells[id.0 as usize]
    }

    pub fn cell_mut(&mut self, id: CellId) -> &mut LibertyCell {
        &mut self.cells[id.0 as usize]
    }

    pub fn find_cell(&self, name: &str) -> Option<CellId> {
        self.cell_index.get(name).copied()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[LibertyCell] {
        &self.cells
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(|i| CellId(i as u32))
    }

    /// Cells whose names match a `*`/`?` glob, in file order.
    pub fn find_cells_matching(&self, pattern: &str) -> Vec<CellId> {
        self.cell_ids()
            .filter(|id| pattern_match(pattern, self.cell(*id).name()))
            .collect()
    }

    /* named containers */

    pub fn add_bus_dcl(&mut self, dcl: BusDcl) {
        self.bus_dcls.insert(dcl.name().to_string(), dcl);
    }

    pub fn find_bus_dcl(&self, name: &str) -> Option<&BusDcl> {
        self.bus_dcls.get(name)
    }

    pub fn add_table_template(&mut self, kind: TableTemplateType, template: TableTemplate) {
        self.templates
            .insert((kind, template.name().to_string()), Arc::new(template));
    }

    pub fn find_table_template(
        &self,
        kind: TableTemplateType,
        name: &str,
    ) -> Option<&Arc<TableTemplate>> {
        self.templates.get(&(kind, name.to_string()))
    }

    pub fn add_wireload(&mut self, wireload: Wireload) {
        self.wireloads
            .insert(wireload.name().to_string(), wireload);
    }

    pub fn find_wireload(&self, name: &str) -> Option<&Wireload> {
        self.wireloads.get(name)
    }

    pub fn add_wireload_selection(&mut self, selection: WireloadSelection) {
        self.wireload_selections
            .insert(selection.name().to_string(), selection);
    }

    pub fn find_wireload_selection(&self, name: &str) -> Option<&WireloadSelection> {
        self.wireload_selections.get(name)
    }

    /// Wireload chosen by a selection group for a block of `area`.
    pub fn select_wireload(&self, selection: &WireloadSelection, area: f32) -> Option<&Wireload> {
        selection
            .find_wireload_name(area)
            .and_then(|name| self.find_wireload(name))
    }

    pub fn add_operating_conditions(&mut self, op_cond: OperatingConditions) {
        self.op_conds.insert(op_cond.name().to_string(), op_cond);
    }

    pub fn find_operating_conditions(&self, name: &str) -> Option<&OperatingConditions> {
        self.op_conds.get(name)
    }

    pub fn add_scale_factors(&mut self, factors: ScaleFactors) {
        self.scale_factors_map
            .insert(factors.name().to_string(), factors);
    }

    pub fn find_scale_factors(&self, name: &str) -> Option<&ScaleFactors> {
        self.scale_factors_map.get(name)
    }

    pub fn add_ocv_derate(&mut self, derate: OcvDerate) {
        self.ocv_derates.insert(derate.name().to_string(), derate);
    }

    pub fn find_ocv_derate(&self, name: &str) -> Option<&OcvDerate> {
        self.ocv_derates.get(name)
    }

    pub fn add_driver_waveform(&mut self, waveform: DriverWaveform) {
        match waveform.name() {
            Some(name) => {
                self.driver_waveforms.insert(name.to_string(), waveform);
            }
            None => self.default_driver_waveform = Some(waveform),
        }
    }

    pub fn find_driver_waveform(&self, name: &str) -> Option<&DriverWaveform> {
        self.driver_waveforms.get(name)
    }

    pub fn default_driver_waveform(&self) -> Option<&DriverWaveform> {
        self.default_driver_waveform.as_ref()
    }

    /* defaults */

    pub fn default_wireload(&self) -> Option<&Wireload> {
        self.default_wireload
            .as_deref()
            .and_then(|name| self.find_wireload(name))
    }

    pub fn set_default_wireload(&mut self, name: &str) {
        self.default_wireload = Some(name.to_string());
    }

    pub fn default_wireload_mode(&self) -> WireloadMode {
        self.default_wireload_mode
    }

    pub fn set_default_wireload_mode(&mut self, mode: WireloadMode) {
        self.default_wireload_mode = mode;
    }

    pub fn default_wireload_selection(&self) -> Option<&WireloadSelection> {
        self.default_wireload_selection
            .as_deref()
            .and_then(|name| self.find_wireload_selection(name))
    }

    pub fn set_default_wireload_selection(&mut self, name: &str) {
        self.default_wireload_selection = Some(name.to_string());
    }

    pub fn default_operating_conditions(&self) -> Option<&OperatingConditions> {
        self.default_op_cond
            .as_deref()
            .and_then(|name| self.find_operating_conditions(name))
    }

    pub fn set_default_operating_conditions(&mut self, name: &str) {
        self.default_op_cond = Some(name.to_string());
    }

    pub fn default_scale_factors(&self) -> Option<&ScaleFactors> {
        self.default_scale_factors
            .as_deref()
            .and_then(|name| self.find_scale_factors(name))
    }

    pub fn set_default_scale_factors(&mut self, name: &str) {
        self.default_scale_factors = Some(name.to_string());
    }

    pub fn default_ocv_derate(&self) -> Option<&OcvDerate> {
        self.default_ocv_derate
            .as_deref()
            .and_then(|name| self.find_ocv_derate(name))
    }

    pub fn set_default_ocv_derate(&mut self, name: &str) {
        self.default_ocv_derate = Some(name.to_string());
    }

    /* nominal PVT and thresholds */

    pub fn nominal(&self) -> &Pvt {
        &self.nominal
    }

    pub fn nominal_mut(&mut self) -> &mut Pvt {
        &mut self.nominal
    }

    pub fn ocv_arc_depth(&self) -> Option<f32> {
        self.ocv_arc_depth
    }

    pub fn set_ocv_arc_depth(&mut self, depth: f32) {
        self.ocv_arc_depth = Some(depth);
    }

    pub fn input_threshold(&self, rf: RiseFall) -> f32 {
        self.input_threshold[rf.index()]
    }

    pub fn set_input_threshold(&mut self, rf: RiseFall, pct: f32) {
        self.input_threshold[rf.index()] = pct;
    }

    pub fn output_threshold(&self, rf: RiseFall) -> f32 {
        self.output_threshold[rf.index()]
    }

    pub fn set_output_threshold(&mut self, rf: RiseFall, pct: f32) {
        self.output_threshold[rf.index()] = pct;
    }

    pub fn slew_lower_threshold(&self, rf: RiseFall) -> f32 {
        self.slew_lower_threshold[rf.index()]
    }

    pub fn set_slew_lower_threshold(&mut self, rf: RiseFall, pct: f32) {
        self.slew_lower_threshold[rf.index()] = pct;
    }

    pub fn slew_upper_threshold(&self, rf: RiseFall) -> f32 {
        self.slew_upper_threshold[rf.index()]
    }

    pub fn set_slew_upper_threshold(&mut self, rf: RiseFall, pct: f32) {
        self.slew_upper_threshold[rf.index()] = pct;
    }

    pub fn slew_derate_from_library(&self) -> f32 {
        self.slew_derate_from_library
    }

    pub fn set_slew_derate_from_library(&mut self, derate: f32) {
        self.slew_derate_from_library = derate;
    }

    /* default pin caps, intrinsics, resistances, limits */

    pub fn default_input_pin_cap(&self) -> f32 {
        self.default_input_pin_cap
    }

    pub fn set_default_input_pin_cap(&mut self, cap: f32) {
        self.default_input_pin_cap = cap;
    }

    pub fn default_output_pin_cap(&self) -> f32 {
        self.default_output_pin_cap
    }

    pub fn set_default_output_pin_cap(&mut self, cap: f32) {
        self.default_output_pin_cap = cap;
    }

    pub fn default_bidirect_pin_cap(&self) -> f32 {
        self.default_bidirect_pin_cap
    }

    pub fn set_default_bidirect_pin_cap(&mut self, cap: f32) {
        self.default_bidirect_pin_cap = cap;
    }

    pub fn default_intrinsic(&self, rf: RiseFall) -> Option<f32> {
        self.default_intrinsic[rf.index()]
    }

    pub fn set_default_intrinsic(&mut self, rf: RiseFall, value: f32) {
        self.default_intrinsic[rf.index()] = Some(value);
    }

    pub fn default_inout_pin_res(&self, rf: RiseFall) -> Option<f32> {
        self.default_inout_pin_res[rf.index()]
    }

    pub fn set_default_inout_pin_res(&mut self, rf: RiseFall, value: f32) {
        self.default_inout_pin_res[rf.index()] = Some(value);
    }

    pub fn default_output_pin_res(&self, rf: RiseFall) -> Option<f32> {
        self.default_output_pin_res[rf.index()]
    }

    pub fn set_default_output_pin_res(&mut self, rf: RiseFall, value: f32) {
        self.default_output_pin_res[rf.index()] = Some(value);
    }

    pub fn default_max_slew(&self) -> Option<f32> {
        self.default_max_slew
    }

    pub fn set_default_max_slew(&mut self, slew: f32) {
        self.default_max_slew = Some(slew);
    }

    pub fn default_max_capacitance(&self) -> Option<f32> {
        self.default_max_capacitance
    }

    pub fn set_default_max_capacitance(&mut self, cap: f32) {
        self.default_max_capacitance = Some(cap);
    }

    pub fn default_max_fanout(&self) -> Option<f32> {
        self.default_max_fanout
    }

    pub fn set_default_max_fanout(&mut self, fanout: f32) {
        self.default_max_fanout = Some(fanout);
    }

    pub fn default_fanout_load(&self) -> Option<f32> {
        self.default_fanout_load
    }

    pub fn set_default_fanout_load(&mut self, load: f32) {
        self.default_fanout_load = Some(load);
    }

    /// Port slew limit with library-default inheritance for output ports.
    pub fn port_slew_limit(&self, cell: &LibertyCell, port: PortId, min_max: MinMax) -> Option<f32> {
        cell.port(port).slew_limit(min_max).or({
            if min_max == MinMax::Max && cell.port(port).direction().is_any_output() {
                self.default_max_slew
            } else {
                None
            }
        })
    }

    pub fn port_capacitance_limit(
        &self,
        cell: &LibertyCell,
        port: PortId,
        min_max: MinMax,
    ) -> Option<f32> {
        cell.port(port).capacitance_limit(min_max).or({
            if min_max == MinMax::Max && cell.port(port).direction().is_any_output() {
                self.default_max_capacitance
            } else {
                None
            }
        })
    }

    pub fn port_fanout_limit(
        &self,
        cell: &LibertyCell,
        port: PortId,
        min_max: MinMax,
    ) -> Option<f32> {
        cell.port(port).fanout_limit(min_max).or({
            if min_max == MinMax::Max && cell.port(port).direction().is_any_output() {
                self.default_max_fanout
            } else {
                None
            }
        })
    }

    /* wire slew degradation */

    pub fn wire_slew_degradation(&self, rf: RiseFall) -> Option<&Arc<Table>> {
        self.wire_slew_degradation[rf.index()].as_ref()
    }

    pub fn set_wire_slew_degradation(&mut self, rf: RiseFall, table: Arc<Table>) {
        self.wire_slew_degradation[rf.index()] = Some(table);
    }

    /// Slew degradation table axes must be output_pin_transition and/or
    /// connect_delay.
    pub fn check_slew_degradation_axes(table: &Table) -> bool {
        let ok = |axis: Option<&Arc<crate::table::TableAxis>>| {
            axis.is_none_or(|a| {
                matches!(
                    a.variable(),
                    TableAxisVariable::OutputPinTransition | TableAxisVariable::ConnectDelay
                )
            })
        };
        table.order() <= 2 && ok(table.axis1()) && ok(table.axis2())
    }

    pub fn degraded_wire_slew(&self, rf: RiseFall, slew: f32, delay: f32) -> f32 {
        match self.wire_slew_degradation(rf) {
            None => slew,
            Some(table) => {
                let arg = |axis: Option<&Arc<crate::table::TableAxis>>| {
                    axis.map_or(0.0, |a| match a.variable() {
                        TableAxisVariable::OutputPinTransition => slew,
                        TableAxisVariable::ConnectDelay => delay,
                        _ => 0.0,
                    })
                };
                match table.order() {
                    0 => table.find_value(0.0, 0.0, 0.0),
                    1 => table.find_value_clip(arg(table.axis1())),
                    _ => table.find_value(arg(table.axis1()), arg(table.axis2()), 0.0),
                }
            }
        }
    }

    /* supply voltages */

    pub fn add_supply_voltage(&mut self, name: &str, voltage: f32) {
        self.supply_voltages.insert(name.to_string(), voltage);
    }

    pub fn supply_voltage(&self, name: &str) -> Option<f32> {
        self.supply_voltages.get(name).copied()
    }

    pub fn supply_exists(&self, name: &str) -> bool {
        self.supply_voltages.contains_key(name)
    }

    /* scale factor evaluation */

    /// PVT derate for `(type, rf)`: the product over process, voltage and
    /// temperature of `1 + k * (value - nominal)`. Defaults to 1.0 when
    /// no scale factors or operating point apply.
    pub fn scale_factor(
        &self,
        sf_type: ScaleFactorType,
        rf: RiseFall,
        cell: &LibertyCell,
        pvt: Option<&Pvt>,
    ) -> f32 {
        let factors = cell
            .scale_factors_name()
            .and_then(|name| self.find_scale_factors(name))
            .or_else(|| self.default_scale_factors());
        match (factors, pvt) {
            (Some(factors), Some(pvt)) => {
                let mut scale = 1.0f32;
                for axis in ScaleFactorPvt::all() {
                    let k = factors.scale(sf_type, axis, rf);
                    let delta = pvt.value(axis) - self.nominal.value(axis);
                    scale *= 1.0 + k * delta;
                }
                scale
            }
            _ => 1.0,
        }
    }

    /* structural caches */

    /// Buffer cells, ordered by area then name for stable iteration.
    pub fn buffers(&self) -> &[CellId] {
        self.buffers_cache.get_or_init(|| {
            let mut ids: Vec<CellId> = self
                .cell_ids()
                .filter(|id| self.cell(*id).is_buffer())
                .collect();
            ids.sort_by(|a, b| {
                let (ca, cb) = (self.cell(*a), self.cell(*b));
                ca.area()
                    .partial_cmp(&cb.area())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| ca.name().cmp(cb.name()))
            });
            ids
        })
    }

    pub fn inverters(&self) -> &[CellId] {
        self.inverters_cache.get_or_init(|| {
            let mut ids: Vec<CellId> = self
                .cell_ids()
                .filter(|id| self.cell(*id).is_inverter())
                .collect();
            ids.sort_by(|a, b| {
                let (ca, cb) = (self.cell(*a), self.cell(*b));
                ca.area()
                    .partial_cmp(&cb.area())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| ca.name().cmp(cb.name()))
            });
            ids
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing_arc::TimingArcAttrs;
    use crate::timing_role::TimingRole;

    fn buffer_cell() -> LibertyCell {
        let mut cell = LibertyCell::new("BUF1", "test.lib");
        let a = cell.add_port("A", PortDirection::Input);
        let z = cell.add_port("Z", PortDirection::Output);
        cell.port_mut(z).set_function(FuncExpr::make_port(a));
        cell
    }

    #[test]
    fn buffer_and_inverter_predicates() {
        let buf = buffer_cell();
        assert!(buf.is_buffer());
        assert!(!buf.is_inverter());
        let (input, output) = buf.buffer_ports().unwrap();
        assert_eq!(buf.port(input).direction(), PortDirection::Input);
        assert_eq!(buf.port(output).direction(), PortDirection::Output);
        assert!(FuncExpr::equiv(
            buf.port(output).function(),
            Some(&FuncExpr::make_port(input))
        ));

        let mut inv = LibertyCell::new("INV1", "test.lib");
        let a = inv.add_port("A", PortDirection::Input);
        let z = inv.add_port("Z", PortDirection::Output);
        inv.port_mut(z)
            .set_function(FuncExpr::make_not(FuncExpr::make_port(a)));
        assert!(inv.is_inverter());
        assert!(!inv.is_buffer());
    }

    #[test]
    fn arc_set_indices_are_dense_and_stable() {
        let mut cell = buffer_cell();
        let a = cell.find_port("A").unwrap();
        let z = cell.find_port("Z").unwrap();
        for _ in 0..3 {
            let set = TimingArcSet::new(
                Some(a),
                Some(z),
                None,
                TimingRole::Combinational,
                TimingArcAttrs::default(),
            );
            cell.add_timing_arc_set(set);
        }
        for (i, set) in cell.timing_arc_sets().iter().enumerate() {
            assert_eq!(set.index(), i);
            assert_eq!(cell.find_timing_arc_set(i).unwrap().index(), i);
        }
        assert!(cell.find_timing_arc_set(3).is_none());
    }

    #[test]
    fn bus_ports_make_bits() {
        let mut cell = LibertyCell::new("RAM", "test.lib");
        let bus = cell.add_bus_port("D", 3, 0, PortDirection::Input);
        assert_eq!(cell.port(bus).size(), 4);
        assert!(cell.port(bus).is_bus());
        let bit = cell.find_port("D[2]").unwrap();
        assert_eq!(cell.port(bit).bus_bit_index(), Some(2));
        assert_eq!(cell.port(bit).parent(), Some(bus));
        // Bit order follows the declaration direction.
        assert_eq!(cell.port(cell.port(bus).member(0)).name(), "D[3]");
        assert_eq!(cell.port(cell.port(bus).member(3)).name(), "D[0]");
        // Top-level iteration skips the bits.
        assert_eq!(cell.top_port_ids().count(), 1);
    }

    #[test]
    fn bundle_ports_group_members() {
        let mut cell = LibertyCell::new("X", "test.lib");
        let a = cell.add_port("A1", PortDirection::Input);
        let b = cell.add_port("A2", PortDirection::Input);
        let bundle = cell.add_bundle_port("A", vec![a, b]);
        assert!(cell.port(bundle).is_bundle());
        assert_eq!(cell.port(bundle).size(), 2);
        assert_eq!(cell.top_port_ids().count(), 1);
    }

    #[test]
    fn port_capacitance_storage() {
        let mut cell = buffer_cell();
        let a = cell.find_port("A").unwrap();
        cell.port_mut(a).set_capacitance(2.0);
        assert!(cell.port(a).capacitance_is_one_value());
        assert_eq!(cell.port(a).capacitance(), 2.0);
        cell.port_mut(a)
            .set_capacitance_rf(RiseFall::Rise, MinMax::Max, 3.0);
        assert!(!cell.port(a).capacitance_is_one_value());
        assert_eq!(cell.port(a).capacitance_min_max(MinMax::Max), 3.0);
        assert_eq!(cell.port(a).capacitance_min_max(MinMax::Min), 2.0);
    }

    #[test]
    fn library_cell_lookup_and_glob() {
        let mut lib = LibertyLibrary::new("lib", "lib.lib");
        lib.add_cell(LibertyCell::new("BUF1", "lib.lib"));
        lib.add_cell(LibertyCell::new("BUF2", "lib.lib"));
        lib.add_cell(LibertyCell::new("INV1", "lib.lib"));
        assert!(lib.find_cell("BUF2").is_some());
        assert!(lib.find_cell("nope").is_none());
        let bufs = lib.find_cells_matching("BUF*");
        assert_eq!(bufs.len(), 2);
        let all = lib.find_cells_matching("*");
        assert_eq!(all.len(), 3);
        assert_eq!(lib.find_cells_matching("?NV1").len(), 1);
    }

    #[test]
    fn scale_factor_product() {
        let mut lib = LibertyLibrary::new("lib", "lib.lib");
        let mut sf = ScaleFactors::new("sf");
        sf.set_scale_both(ScaleFactorType::Cell, ScaleFactorPvt::Temp, 0.01);
        sf.set_scale_both(ScaleFactorType::Cell, ScaleFactorPvt::Volt, -0.1);
        lib.add_scale_factors(sf);
        lib.set_default_scale_factors("sf");
        lib.nominal_mut().set_temperature(25.0);
        lib.nominal_mut().set_voltage(1.0);
        lib.nominal_mut().set_process(1.0);
        let cell = buffer_cell();
        let pvt = Pvt::new(1.0, 1.1, 125.0);
        let scale = lib.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, &cell, Some(&pvt));
        // (1 + 0.01*100) * (1 - 0.1*0.1) = 2.0 * 0.99
        assert!((scale - 2.0 * 0.99).abs() < 1e-5);
        // No pvt means no scaling.
        assert_eq!(
            lib.scale_factor(ScaleFactorType::Cell, RiseFall::Rise, &cell, None),
            1.0
        );
    }

    #[test]
    fn buffers_cache_is_sorted_by_area() {
        let mut lib = LibertyLibrary::new("lib", "lib.lib");
        let mut big = buffer_cell();
        big.set_area(4.0);
        big.set_name("BUF_B");
        let mut small = buffer_cell();
        small.set_area(1.0);
        small.set_name("BUF_S");
        lib.add_cell(big);
        lib.add_cell(small);
        let buffers = lib.buffers();
        assert_eq!(buffers.len(), 2);
        assert_eq!(lib.cell(buffers[0]).name(), "BUF_S");
        assert_eq!(lib.cell(buffers[1]).name(), "BUF_B");
    }

    #[test]
    fn supply_voltages() {
        let mut lib = LibertyLibrary::new("lib", "lib.lib");
        lib.add_supply_voltage("VDD", 1.1);
        assert!(lib.supply_exists("VDD"));
        assert_eq!(lib.supply_voltage("VDD"), Some(1.1));
        assert!(!lib.supply_exists("VSS"));
    }

    #[test]
    fn limit_inheritance_for_outputs() {
        let mut lib = LibertyLibrary::new("lib", "lib.lib");
        lib.set_default_max_slew(5.0);
        let cell = buffer_cell();
        let a = cell.find_port("A").unwrap();
        let z = cell.find_port("Z").unwrap();
        assert_eq!(lib.port_slew_limit(&cell, z, MinMax::Max), Some(5.0));
        assert_eq!(lib.port_slew_limit(&cell, a, MinMax::Max), None);
    }

    #[test]
    fn pattern_matching() {
        assert!(pattern_match("*", "anything"));
        assert!(pattern_match("BUF?", "BUFX"));
        assert!(!pattern_match("BUF?", "BUF"));
        assert!(pattern_match("B*1", "BUF1"));
        assert!(!pattern_match("B*2", "BUF1"));
    }
}
