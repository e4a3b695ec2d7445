//! Event-driven Liberty reader.
//!
//! The reader walks the parsed statement tree with two dispatch tables
//! (attribute name → visitor, group type → begin/end visitors) and builds
//! the library model through `LibertyBuilder`. Port functions, sequential
//! groups, timing groups, and leakage groups cannot be resolved until the
//! cell's port set is complete, so they queue up and drain at `end_cell`
//! in a fixed order: functions, sequentials, port groups (timing arcs and
//! internal powers), leakage powers.
//!
//! Unknown groups and attributes are skipped; Liberty is extensible by
//! design. Embedders can claim vendor attributes with
//! `define_attr_visitor`/`define_group_visitor` and the reserved
//! `visit_attr1..9` slots, which record raw values into a side table.

use std::fs::File;
use std::io::{self, Read as _};
use std::sync::Arc;

use arclight_common::{MinMax, Report, RiseFall};
use arclight_model::{
    BusDcl, CheckTableModel, ClockGateType, DelayModelType, DriverWaveform, FuncExpr,
    GateTableModel, InternalPowerAttrs, LeakagePowerAttrs, LevelShifterType, LibertyCell,
    LibertyLibrary, LinearModel, LogicValue, ModeValueDef, OcvDerate, OperatingConditions,
    PathType, PortDirection, PortId, ScaleFactorPvt, ScaleFactorType, ScaleFactors, Sequential,
    SwitchCellType, Table, TableAxis, TableAxisVariable, TableModel, TableTemplate,
    TableTemplateType, TimingArcAttrs, TimingModel, TimingRole, TimingSense, TimingType, Wireload,
    WireloadMode, WireloadSelection, WireloadTree,
};
use flate2::read::GzDecoder;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::builder::LibertyBuilder;
use crate::error::LibertyError;
use crate::expr::parse_func_expr;
use crate::parser::parse_liberty;
use crate::stmt::{LibertyAttr, LibertyDefine, LibertyGroup, LibertyStmt, LibertyVariable};

pub type AttrVisitor = fn(&mut LibertyReader, &LibertyAttr);
pub type GroupVisitor = fn(&mut LibertyReader, &LibertyGroup);

/* ───────────────────── deferred group records ───────────────────── */

/// Where a deferred function expression lands once parsed.
#[derive(Debug, Clone)]
enum FuncTarget {
    PortFunction(PortId),
    PortTristateEnable(PortId),
    ModeValueCond { mode: String, value: String },
}

/// An expression string queued for parsing at `end_cell`.
#[derive(Debug, Clone)]
struct LibertyFunc {
    expr: String,
    target: FuncTarget,
    invert: bool,
    attr_name: String,
    line: u32,
}

/// Timing group attributes accumulated inside a `timing` group.
#[derive(Debug, Clone, Default)]
struct TimingGroup {
    line: u32,
    related_port_names: Vec<String>,
    one_to_one: bool,
    related_output_port_name: Option<String>,
    timing_type: Option<TimingType>,
    timing_sense: Option<TimingSense>,
    cond_str: Option<String>,
    sdf_cond: Option<String>,
    sdf_cond_start: Option<String>,
    sdf_cond_end: Option<String>,
    mode_name: Option<String>,
    mode_value: Option<String>,
    ocv_arc_depth: Option<f32>,
    intrinsic: [Option<f32>; RiseFall::COUNT],
    resistance: [Option<f32>; RiseFall::COUNT],
    cell_tables: [Option<TableModel>; RiseFall::COUNT],
    transition_tables: [Option<TableModel>; RiseFall::COUNT],
    constraint_tables: [Option<TableModel>; RiseFall::COUNT],
    delay_sigma: [[Option<TableModel>; MinMax::COUNT]; RiseFall::COUNT],
    slew_sigma: [[Option<TableModel>; MinMax::COUNT]; RiseFall::COUNT],
    constraint_sigma: [[Option<TableModel>; MinMax::COUNT]; RiseFall::COUNT],
}

impl TimingGroup {
    fn make_attrs(&self, cond: Option<FuncExpr>) -> TimingArcAttrs {
        let mut attrs = TimingArcAttrs {
            timing_type: self.timing_type,
            timing_sense: self.timing_sense,
            cond,
            sdf_cond: self.sdf_cond.clone(),
            sdf_cond_start: self.sdf_cond_start.clone(),
            sdf_cond_end: self.sdf_cond_end.clone(),
            mode_name: self.mode_name.clone(),
            mode_value: self.mode_value.clone(),
            ocv_arc_depth: self.ocv_arc_depth,
            models: [None, None],
        };
        for rf in RiseFall::both() {
            let i = rf.index();
            let model = if let Some(delay) = &self.cell_tables[i] {
                let mut gate = GateTableModel::new(
                    Some(delay.clone()),
                    self.transition_tables[i].clone(),
                );
                for el in MinMax::both() {
                    if let Some(sigma) = &self.delay_sigma[i][el.index()] {
                        gate.set_delay_sigma(el, sigma.clone());
                    }
                    if let Some(sigma) = &self.slew_sigma[i][el.index()] {
                        gate.set_slew_sigma(el, sigma.clone());
                    }
                }
                Some(TimingModel::GateTable(gate))
            } else if let Some(constraint) = &self.constraint_tables[i] {
                let mut check = CheckTableModel::new(constraint.clone());
                for el in MinMax::both() {
                    if let Some(sigma) = &self.constraint_sigma[i][el.index()] {
                        check.set_sigma(el, sigma.clone());
                    }
                }
                Some(TimingModel::CheckTable(check))
            } else if let Some(slew) = &self.transition_tables[i] {
                Some(TimingModel::GateTable(GateTableModel::new(
                    None,
                    Some(slew.clone()),
                )))
            } else if self.intrinsic[i].is_some() || self.resistance[i].is_some() {
                Some(TimingModel::Linear(LinearModel::new(
                    self.intrinsic[i].unwrap_or(0.0),
                    self.resistance[i].unwrap_or(0.0),
                )))
            } else {
                None
            };
            if let Some(model) = model {
                attrs.set_model(rf, Arc::new(model));
            }
        }
        attrs
    }
}

#[derive(Debug, Clone, Default)]
struct InternalPowerGroup {
    line: u32,
    related_port_names: Vec<String>,
    when_str: Option<String>,
    related_pg_pin: Option<String>,
    models: [Option<TableModel>; RiseFall::COUNT],
}

#[derive(Debug, Clone, Default)]
struct LeakagePowerGroup {
    line: u32,
    when_str: Option<String>,
    related_pg_pin: Option<String>,
    power: Option<f32>,
}

#[derive(Debug, Clone)]
struct SequentialGroup {
    is_register: bool,
    is_bank: bool,
    out_name: Option<String>,
    out_inv_name: Option<String>,
    size: Option<usize>,
    clk_str: Option<String>,
    data_str: Option<String>,
    clear_str: Option<String>,
    preset_str: Option<String>,
    clr_preset_var1: LogicValue,
    clr_preset_var2: LogicValue,
    line: u32,
}

/// Port attributes that reference other ports wait here until the cell's
/// ports are all defined.
#[derive(Debug, Default)]
struct PortGroup {
    ports: Vec<PortId>,
    timings: Vec<TimingGroup>,
    internal_powers: Vec<InternalPowerGroup>,
}

/// Everything accumulated for the cell under construction. Test cells
/// push a nested context.
#[derive(Debug)]
struct CellContext {
    cell: LibertyCell,
    port_groups: Vec<PortGroup>,
    sequentials: Vec<SequentialGroup>,
    leakage_powers: Vec<LeakagePowerGroup>,
    funcs: Vec<LibertyFunc>,
    scaled_cell_op_cond: Option<String>,
}

/// Which model slot the table group under construction fills.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TableSlot {
    Cell(RiseFall),
    Transition(RiseFall),
    Constraint(RiseFall),
    DelaySigma(RiseFall),
    SlewSigma(RiseFall),
    ConstraintSigma(RiseFall),
    Power(RiseFall),
    SlewDegradation(RiseFall),
    OcvDerateFactors,
    DriverWaveform,
}

/// Table group under construction.
#[derive(Debug)]
struct TableContext {
    slot: TableSlot,
    template: Option<Arc<TableTemplate>>,
    axes: [Option<Arc<TableAxis>>; 3],
    axis_values: [Option<Vec<f32>>; 3],
    rows: Vec<Vec<f32>>,
    scale: f32,
    scale_factor_type: ScaleFactorType,
    rf: RiseFall,
    line: u32,
}

/* ──────────────────────────── the reader ─────────────────────────── */

pub struct LibertyReader {
    filename: String,
    infer_latches: bool,
    builder: LibertyBuilder,
    report: Report,
    library: Option<LibertyLibrary>,

    attr_visitors: FxHashMap<String, AttrVisitor>,
    group_begin_visitors: FxHashMap<String, GroupVisitor>,
    group_end_visitors: FxHashMap<String, GroupVisitor>,

    time_scale: f32,
    cap_scale: f32,
    res_scale: f32,
    volt_scale: f32,
    current_scale: f32,
    power_scale: f32,
    leakage_power_scale: f32,
    energy_scale: f32,
    distance_scale: f32,
    have_resistance_unit: bool,

    variables: FxHashMap<String, f32>,
    defines: FxHashMap<String, LibertyDefine>,
    extension_values: FxHashMap<String, String>,

    cell_stack: Vec<CellContext>,
    ports: Vec<PortId>,
    saved_ports: Vec<PortId>,
    in_bus: bool,
    in_bundle: bool,
    bus_names: Vec<String>,
    port_group: Option<PortGroup>,
    timing: Option<TimingGroup>,
    internal_power: Option<InternalPowerGroup>,
    leakage_power: Option<LeakagePowerGroup>,
    sequential: Option<SequentialGroup>,

    tbl_template: Option<TableTemplate>,
    tbl_template_type: Option<TableTemplateType>,
    axis_vars: [Option<TableAxisVariable>; 3],
    axis_values: [Option<Vec<f32>>; 3],
    table: Option<TableContext>,

    type_name: Option<String>,
    type_bit_from: Option<i32>,
    type_bit_to: Option<i32>,

    op_cond: Option<OperatingConditions>,
    wireload: Option<Wireload>,
    wireload_selection: Option<WireloadSelection>,
    scale_factors: Option<ScaleFactors>,
    in_scaling_factors: bool,

    ocv_derate: Option<OcvDerate>,
    rf_type: Option<RiseFall>,
    derate_type: MinMax,
    path_type: PathType,

    mode_def_name: Option<String>,
    mode_value_name: Option<String>,

    driver_waveform_name: Option<String>,
}

impl LibertyReader {
    pub fn new(infer_latches: bool) -> Self {
        let mut reader = LibertyReader {
            filename: String::new(),
            infer_latches,
            builder: LibertyBuilder::new(),
            report: Report::capturing(),
            library: None,
            attr_visitors: FxHashMap::default(),
            group_begin_visitors: FxHashMap::default(),
            group_end_visitors: FxHashMap::default(),
            time_scale: 1e-9,
            cap_scale: 1e-12,
            res_scale: 1.0,
            volt_scale: 1.0,
            current_scale: 1e-3,
            power_scale: 1.0,
            leakage_power_scale: 1.0,
            energy_scale: 1e-12,
            distance_scale: 1e-6,
            have_resistance_unit: false,
            variables: FxHashMap::default(),
            defines: FxHashMap::default(),
            extension_values: FxHashMap::default(),
            cell_stack: Vec::new(),
            ports: Vec::new(),
            saved_ports: Vec::new(),
            in_bus: false,
            in_bundle: false,
            bus_names: Vec::new(),
            port_group: None,
            timing: None,
            internal_power: None,
            leakage_power: None,
            sequential: None,
            tbl_template: None,
            tbl_template_type: None,
            axis_vars: [None, None, None],
            axis_values: [None, None, None],
            table: None,
            type_name: None,
            type_bit_from: None,
            type_bit_to: None,
            op_cond: None,
            wireload: None,
            wireload_selection: None,
            scale_factors: None,
            in_scaling_factors: false,
            ocv_derate: None,
            rf_type: None,
            derate_type: MinMax::Max,
            path_type: PathType::Data,
            mode_def_name: None,
            mode_value_name: None,
            driver_waveform_name: None,
        };
        reader.define_visitors();
        reader
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn library(&self) -> Option<&LibertyLibrary> {
        self.library.as_ref()
    }

    /// Raw values recorded by the reserved extension visitors.
    pub fn extension_values(&self) -> &FxHashMap<String, String> {
        &self.extension_values
    }

    /* ─────────────────────── dispatch tables ─────────────────────── */

    pub fn define_attr_visitor(&mut self, name: &str, visitor: AttrVisitor) {
        self.attr_visitors.insert(name.to_string(), visitor);
    }

    pub fn define_group_visitor(
        &mut self,
        group_type: &str,
        begin: GroupVisitor,
        end: GroupVisitor,
    ) {
        self.group_begin_visitors
            .insert(group_type.to_string(), begin);
        self.group_end_visitors.insert(group_type.to_string(), end);
    }

    fn define_visitors(&mut self) {
        use LibertyReader as R;
        let a = |r: &mut Self, name: &str, v: AttrVisitor| r.define_attr_visitor(name, v);

        self.define_group_visitor("library", R::begin_library, R::end_library);
        self.define_group_visitor("cell", R::begin_cell, R::end_cell);
        self.define_group_visitor("scaled_cell", R::begin_scaled_cell, R::end_scaled_cell);
        self.define_group_visitor("test_cell", R::begin_test_cell, R::end_test_cell);
        self.define_group_visitor("pin", R::begin_pin, R::end_pin);
        self.define_group_visitor("bus", R::begin_bus, R::end_bus);
        self.define_group_visitor("bundle", R::begin_bundle, R::end_bundle);
        self.define_group_visitor("pg_pin", R::begin_pg_pin, R::end_pg_pin);
        self.define_group_visitor("timing", R::begin_timing, R::end_timing);
        self.define_group_visitor("internal_power", R::begin_internal_power, R::end_internal_power);
        self.define_group_visitor("leakage_power", R::begin_leakage_power, R::end_leakage_power);
        self.define_group_visitor("statetable", R::begin_statetable, R::end_nop);
        self.define_group_visitor("ff", R::begin_ff, R::end_sequential);
        self.define_group_visitor("ff_bank", R::begin_ff_bank, R::end_sequential);
        self.define_group_visitor("latch", R::begin_latch, R::end_sequential);
        self.define_group_visitor("latch_bank", R::begin_latch_bank, R::end_sequential);
        self.define_group_visitor("mode_definition", R::begin_mode_def, R::end_mode_def);
        self.define_group_visitor("mode_value", R::begin_mode_value, R::end_mode_value);
        self.define_group_visitor("type", R::begin_type, R::end_type);
        self.define_group_visitor(
            "operating_conditions",
            R::begin_op_cond,
            R::end_op_cond,
        );
        self.define_group_visitor("wire_load", R::begin_wireload, R::end_wireload);
        self.define_group_visitor(
            "wire_load_selection",
            R::begin_wireload_selection,
            R::end_wireload_selection,
        );
        self.define_group_visitor(
            "scaling_factors",
            R::begin_scaling_factors,
            R::end_scaling_factors,
        );
        self.define_group_visitor("ocv_derate", R::begin_ocv_derate, R::end_ocv_derate);
        self.define_group_visitor(
            "ocv_derate_factors",
            R::begin_ocv_derate_factors,
            R::end_ocv_derate_factors,
        );
        self.define_group_visitor(
            "normalized_driver_waveform",
            R::begin_driver_waveform,
            R::end_driver_waveform,
        );

        // Table templates.
        self.define_group_visitor(
            "lu_table_template",
            R::begin_table_template_delay,
            R::end_table_template,
        );
        self.define_group_visitor(
            "power_lut_template",
            R::begin_table_template_power,
            R::end_table_template,
        );
        self.define_group_visitor(
            "output_current_template",
            R::begin_table_template_output_current,
            R::end_table_template,
        );
        self.define_group_visitor(
            "ocv_table_template",
            R::begin_table_template_ocv,
            R::end_table_template,
        );

        // Table model groups.
        self.define_group_visitor("cell_rise", R::begin_cell_rise, R::end_timing_table);
        self.define_group_visitor("cell_fall", R::begin_cell_fall, R::end_timing_table);
        self.define_group_visitor("rise_transition", R::begin_rise_transition, R::end_timing_table);
        self.define_group_visitor("fall_transition", R::begin_fall_transition, R::end_timing_table);
        self.define_group_visitor("rise_constraint", R::begin_rise_constraint, R::end_timing_table);
        self.define_group_visitor("fall_constraint", R::begin_fall_constraint, R::end_timing_table);
        self.define_group_visitor(
            "ocv_sigma_cell_rise",
            R::begin_ocv_sigma_cell_rise,
            R::end_timing_table,
        );
        self.define_group_visitor(
            "ocv_sigma_cell_fall",
            R::begin_ocv_sigma_cell_fall,
            R::end_timing_table,
        );
        self.define_group_visitor(
            "ocv_sigma_rise_transition",
            R::begin_ocv_sigma_rise_transition,
            R::end_timing_table,
        );
        self.define_group_visitor(
            "ocv_sigma_fall_transition",
            R::begin_ocv_sigma_fall_transition,
            R::end_timing_table,
        );
        self.define_group_visitor(
            "ocv_sigma_rise_constraint",
            R::begin_ocv_sigma_rise_constraint,
            R::end_timing_table,
        );
        self.define_group_visitor(
            "ocv_sigma_fall_constraint",
            R::begin_ocv_sigma_fall_constraint,
            R::end_timing_table,
        );
        self.define_group_visitor(
            "rise_transition_degradation",
            R::begin_rise_transition_degradation,
            R::end_timing_table,
        );
        self.define_group_visitor(
            "fall_transition_degradation",
            R::begin_fall_transition_degradation,
            R::end_timing_table,
        );
        self.define_group_visitor("rise_power", R::begin_rise_power, R::end_timing_table);
        self.define_group_visitor("fall_power", R::begin_fall_power, R::end_timing_table);

        // Library header attributes.
        a(self, "time_unit", R::visit_time_unit);
        a(self, "capacitive_load_unit", R::visit_capacitive_load_unit);
        a(self, "pulling_resistance_unit", R::visit_pulling_resistance_unit);
        a(self, "resistance_unit", R::visit_resistance_unit);
        a(self, "voltage_unit", R::visit_voltage_unit);
        a(self, "current_unit", R::visit_current_unit);
        a(self, "power_unit", R::visit_power_unit);
        a(self, "leakage_power_unit", R::visit_leakage_power_unit);
        a(self, "distance_unit", R::visit_distance_unit);
        a(self, "delay_model", R::visit_delay_model);
        a(self, "bus_naming_style", R::visit_bus_style);
        a(self, "voltage_map", R::visit_voltage_map);
        a(self, "nom_temperature", R::visit_nom_temp);
        a(self, "nom_voltage", R::visit_nom_volt);
        a(self, "nom_process", R::visit_nom_proc);
        a(self, "default_inout_pin_cap", R::visit_default_inout_pin_cap);
        a(self, "default_input_pin_cap", R::visit_default_input_pin_cap);
        a(self, "default_output_pin_cap", R::visit_default_output_pin_cap);
        a(self, "default_max_transition", R::visit_default_max_transition);
        a(self, "default_max_capacitance", R::visit_default_max_capacitance);
        a(self, "default_max_fanout", R::visit_default_max_fanout);
        a(self, "default_fanout_load", R::visit_default_fanout_load);
        a(self, "default_intrinsic_rise", R::visit_default_intrinsic_rise);
        a(self, "default_intrinsic_fall", R::visit_default_intrinsic_fall);
        a(self, "default_inout_pin_rise_res", R::visit_default_inout_pin_rise_res);
        a(self, "default_inout_pin_fall_res", R::visit_default_inout_pin_fall_res);
        a(self, "default_output_pin_rise_res", R::visit_default_output_pin_rise_res);
        a(self, "default_output_pin_fall_res", R::visit_default_output_pin_fall_res);
        a(self, "default_wire_load", R::visit_default_wire_load);
        a(self, "default_wire_load_mode", R::visit_default_wire_load_mode);
        a(self, "default_wire_load_selection", R::visit_default_wire_load_selection);
        a(self, "default_operating_conditions", R::visit_default_operating_conditions);
        a(self, "default_scaling_factors", R::visit_default_scaling_factors);
        a(self, "input_threshold_pct_rise", R::visit_input_threshold_rise);
        a(self, "input_threshold_pct_fall", R::visit_input_threshold_fall);
        a(self, "output_threshold_pct_rise", R::visit_output_threshold_rise);
        a(self, "output_threshold_pct_fall", R::visit_output_threshold_fall);
        a(self, "slew_lower_threshold_pct_rise", R::visit_slew_lower_threshold_rise);
        a(self, "slew_lower_threshold_pct_fall", R::visit_slew_lower_threshold_fall);
        a(self, "slew_upper_threshold_pct_rise", R::visit_slew_upper_threshold_rise);
        a(self, "slew_upper_threshold_pct_fall", R::visit_slew_upper_threshold_fall);
        a(self, "slew_derate_from_library", R::visit_slew_derate_from_library);
        a(self, "default_ocv_derate_group", R::visit_default_ocv_derate_group);
        a(self, "ocv_arc_depth", R::visit_ocv_arc_depth);

        // Template axis attributes.
        a(self, "variable_1", R::visit_variable_1);
        a(self, "variable_2", R::visit_variable_2);
        a(self, "variable_3", R::visit_variable_3);
        a(self, "index_1", R::visit_index_1);
        a(self, "index_2", R::visit_index_2);
        a(self, "index_3", R::visit_index_3);
        a(self, "values", R::visit_values);

        // Type group attributes.
        a(self, "bit_from", R::visit_bit_from);
        a(self, "bit_to", R::visit_bit_to);

        // Cell attributes.
        a(self, "area", R::visit_area);
        a(self, "dont_use", R::visit_dont_use);
        a(self, "is_macro_cell", R::visit_is_macro);
        a(self, "is_memory_cell", R::visit_is_memory);
        a(self, "pad_cell", R::visit_pad_cell);
        a(self, "is_pad", R::visit_is_pad);
        a(self, "is_clock_cell", R::visit_is_clock_cell);
        a(self, "is_level_shifter", R::visit_is_level_shifter);
        a(self, "level_shifter_type", R::visit_level_shifter_type);
        a(self, "is_isolation_cell", R::visit_is_isolation_cell);
        a(self, "always_on", R::visit_always_on);
        a(self, "switch_cell_type", R::visit_switch_cell_type);
        a(self, "interface_timing", R::visit_interface_timing);
        a(self, "clock_gating_integrated_cell", R::visit_clock_gating_integrated_cell);
        a(self, "cell_leakage_power", R::visit_cell_leakage_power);
        a(self, "cell_footprint", R::visit_cell_footprint);
        a(self, "user_function_class", R::visit_user_function_class);
        a(self, "scaling_factors", R::visit_scaling_factors_attr);
        a(self, "is_disabled_constraint", R::visit_is_disabled_constraint);

        // Port attributes.
        a(self, "direction", R::visit_direction);
        a(self, "function", R::visit_function);
        a(self, "three_state", R::visit_three_state);
        a(self, "bus_type", R::visit_bus_type);
        a(self, "members", R::visit_members);
        a(self, "capacitance", R::visit_capacitance);
        a(self, "rise_capacitance", R::visit_rise_cap);
        a(self, "fall_capacitance", R::visit_fall_cap);
        a(self, "rise_capacitance_range", R::visit_rise_cap_range);
        a(self, "fall_capacitance_range", R::visit_fall_cap_range);
        a(self, "max_fanout", R::visit_max_fanout);
        a(self, "min_fanout", R::visit_min_fanout);
        a(self, "max_transition", R::visit_max_transition);
        a(self, "min_transition", R::visit_min_transition);
        a(self, "max_capacitance", R::visit_max_capacitance);
        a(self, "min_capacitance", R::visit_min_capacitance);
        a(self, "fanout_load", R::visit_fanout_load);
        a(self, "min_period", R::visit_min_period);
        a(self, "min_pulse_width_low", R::visit_min_pulse_width_low);
        a(self, "min_pulse_width_high", R::visit_min_pulse_width_high);
        a(self, "pulse_clock", R::visit_pulse_clock);
        a(self, "clock", R::visit_clock);
        a(self, "clock_gate_clock_pin", R::visit_clock_gate_clock_pin);
        a(self, "clock_gate_enable_pin", R::visit_clock_gate_enable_pin);
        a(self, "clock_gate_out_pin", R::visit_clock_gate_out_pin);
        a(self, "is_pll_feedback_pin", R::visit_is_pll_feedback_pin);
        a(self, "isolation_cell_data_pin", R::visit_isolation_cell_data_pin);
        a(self, "isolation_cell_enable_pin", R::visit_isolation_cell_enable_pin);
        a(self, "level_shifter_data_pin", R::visit_level_shifter_data_pin);
        a(self, "switch_pin", R::visit_switch_pin);
        a(self, "related_ground_pin", R::visit_related_ground_pin);
        a(self, "related_power_pin", R::visit_related_power_pin);
        a(self, "driver_waveform_rise", R::visit_driver_waveform_rise);
        a(self, "driver_waveform_fall", R::visit_driver_waveform_fall);
        a(self, "pg_type", R::visit_pg_type);
        a(self, "voltage_name", R::visit_voltage_name);

        // Timing attributes.
        a(self, "related_pin", R::visit_related_pin);
        a(self, "related_bus_pins", R::visit_related_bus_pins);
        a(self, "related_output_pin", R::visit_related_output_pin);
        a(self, "timing_type", R::visit_timing_type);
        a(self, "timing_sense", R::visit_timing_sense);
        a(self, "sdf_cond", R::visit_sdf_cond);
        a(self, "sdf_cond_start", R::visit_sdf_cond_start);
        a(self, "sdf_cond_end", R::visit_sdf_cond_end);
        a(self, "mode", R::visit_mode);
        a(self, "when", R::visit_when);
        a(self, "intrinsic_rise", R::visit_intrinsic_rise);
        a(self, "intrinsic_fall", R::visit_intrinsic_fall);
        a(self, "rise_resistance", R::visit_rise_resistance);
        a(self, "fall_resistance", R::visit_fall_resistance);

        // Power group attributes.
        a(self, "related_pg_pin", R::visit_related_pg_pin);
        a(self, "value", R::visit_leakage_value);

        // Sequential attributes.
        a(self, "clocked_on", R::visit_clocked_on);
        a(self, "enable", R::visit_clocked_on);
        a(self, "next_state", R::visit_data_in);
        a(self, "data_in", R::visit_data_in);
        a(self, "clear", R::visit_clear);
        a(self, "preset", R::visit_preset);
        a(self, "clear_preset_var1", R::visit_clr_preset_var1);
        a(self, "clear_preset_var2", R::visit_clr_preset_var2);

        // Operating conditions.
        a(self, "process", R::visit_proc);
        a(self, "voltage", R::visit_volt);
        a(self, "temperature", R::visit_temp);
        a(self, "tree_type", R::visit_tree_type);

        // Wireload attributes.
        a(self, "resistance", R::visit_wireload_resistance);
        a(self, "slope", R::visit_wireload_slope);
        a(self, "fanout_length", R::visit_fanout_length);
        a(self, "wire_load_from_area", R::visit_wireload_from_area);

        // OCV derate attributes.
        a(self, "rf_type", R::visit_rf_type);
        a(self, "derate_type", R::visit_derate_type);
        a(self, "path_type", R::visit_path_type);
        a(self, "ocv_derate_group", R::visit_ocv_derate_group);

        // Driver waveform.
        a(self, "driver_waveform_name", R::visit_driver_waveform_name);
    }

    /* ──────────────────────── reading files ──────────────────────── */

    fn read_to_string(path: &str) -> io::Result<String> {
        let mut text = String::new();
        if path.ends_with(".gz") {
            let file = File::open(path)?;
            GzDecoder::new(file).read_to_string(&mut text)?;
        } else {
            File::open(path)?.read_to_string(&mut text)?;
        }
        Ok(text)
    }

    /// Read a Liberty file (gunzipping `.gz`) and build the library.
    pub fn read_liberty_file(&mut self, path: &str) -> Result<LibertyLibrary, LibertyError> {
        self.filename = path.to_string();
        let text = Self::read_to_string(path).map_err(|source| LibertyError::FileNotReadable {
            filename: path.to_string(),
            source,
        })?;
        self.read_liberty_text(&text, path)
    }

    /// Parse Liberty text; entry point shared by the file reader and the
    /// test-suite.
    pub fn read_liberty_text(
        &mut self,
        text: &str,
        filename: &str,
    ) -> Result<LibertyLibrary, LibertyError> {
        self.filename = filename.to_string();
        let root = parse_liberty(text, filename)?;
        if root.group_type != "library" {
            return Err(LibertyError::NoLibrary {
                filename: filename.to_string(),
            });
        }
        self.visit_group(&root);
        self.library.take().ok_or(LibertyError::NoLibrary {
            filename: filename.to_string(),
        })
    }

    fn visit_group(&mut self, group: &LibertyGroup) {
        let group_type = group.group_type.to_lowercase();
        if let Some(begin) = self.group_begin_visitors.get(&group_type).copied() {
            begin(self, group);
        } else {
            debug!(group = %group.group_type, line = group.line, "unknown group");
        }
        for child in &group.children {
            match child {
                LibertyStmt::Group(sub) => self.visit_group(sub),
                LibertyStmt::Attr(attr) => self.visit_attr(attr),
                LibertyStmt::Variable(var) => self.visit_variable(var),
                LibertyStmt::Define(define) => self.visit_define(define),
            }
        }
        if let Some(end) = self.group_end_visitors.get(&group_type).copied() {
            end(self, group);
        }
    }

    fn visit_attr(&mut self, attr: &LibertyAttr) {
        let name = attr.name().to_lowercase();
        if let Some(visitor) = self.attr_visitors.get(&name).copied() {
            visitor(self, attr);
        } else if self.in_scaling_factors && name.starts_with("k_") {
            self.visit_scale_factor(attr);
        } else if self.defines.contains_key(&name) {
            debug!(attr = %attr.name(), "user-defined attribute");
        } else {
            debug!(attr = %attr.name(), line = attr.line(), "unknown attribute");
        }
    }

    fn visit_variable(&mut self, var: &LibertyVariable) {
        self.variables.insert(var.name.clone(), var.value);
    }

    fn visit_define(&mut self, define: &LibertyDefine) {
        self.defines.insert(define.name.to_lowercase(), define.clone());
    }

    /* ───────────────────── reserved extension slots ───────────────── */

    pub fn visit_attr1(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr2(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr3(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr4(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr5(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr6(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr7(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr8(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn visit_attr9(&mut self, attr: &LibertyAttr) {
        self.save_extension_value(attr);
    }
    pub fn begin_group1(&mut self, _group: &LibertyGroup) {}
    pub fn begin_group2(&mut self, _group: &LibertyGroup) {}
    pub fn begin_group3(&mut self, _group: &LibertyGroup) {}
    pub fn begin_group4(&mut self, _group: &LibertyGroup) {}
    pub fn begin_group5(&mut self, _group: &LibertyGroup) {}
    pub fn end_group1(&mut self, _group: &LibertyGroup) {}
    pub fn end_group2(&mut self, _group: &LibertyGroup) {}
    pub fn end_group3(&mut self, _group: &LibertyGroup) {}
    pub fn end_group4(&mut self, _group: &LibertyGroup) {}
    pub fn end_group5(&mut self, _group: &LibertyGroup) {}

    fn save_extension_value(&mut self, attr: &LibertyAttr) {
        if let Some(value) = attr.first_value() {
            self.extension_values
                .insert(attr.name().to_string(), value.to_string());
        }
    }

    /* ─────────────────────── diagnostics/values ───────────────────── */

    fn lib_warn(&mut self, id: u32, line: u32, msg: &str) {
        let filename = self.filename.clone();
        self.report.file_warn(id, &filename, line, msg);
    }

    fn lib_error(&mut self, id: u32, line: u32, msg: &str) {
        let filename = self.filename.clone();
        self.report.file_error(id, &filename, line, msg);
    }

    fn get_attr_string(&mut self, attr: &LibertyAttr) -> Option<String> {
        match attr.first_value() {
            Some(value) => Some(value.to_string()),
            None => {
                self.lib_warn(1100, attr.line(), &format!("attribute {} missing value.", attr.name()));
                None
            }
        }
    }

    fn get_attr_float(&mut self, attr: &LibertyAttr) -> Option<f32> {
        match attr.first_value() {
            Some(value) => match value.as_float() {
                Some(f) => Some(f),
                None => {
                    // A variable reference is legal where a float is.
                    let text = value.to_string();
                    match self.variables.get(&text) {
                        Some(f) => Some(*f),
                        None => {
                            self.lib_warn(
                                1101,
                                attr.line(),
                                &format!("attribute {} value {} is not a float.", attr.name(), text),
                            );
                            None
                        }
                    }
                }
            },
            None => None,
        }
    }

    fn get_attr_bool(&mut self, attr: &LibertyAttr) -> Option<bool> {
        let value = self.get_attr_string(attr)?;
        match value.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => {
                self.lib_warn(
                    1102,
                    attr.line(),
                    &format!("attribute {} value {} is not true|false.", attr.name(), other),
                );
                None
            }
        }
    }

    fn parse_float_list(&mut self, text: &str, scale: f32, line: u32) -> Vec<f32> {
        let mut values = Vec::new();
        for token in text.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            match token.parse::<f32>() {
                Ok(f) => values.push(f * scale),
                Err(_) => {
                    self.lib_warn(1103, line, &format!("{token} is not a float."));
                }
            }
        }
        values
    }

    /* ─────────────────────────── library ─────────────────────────── */

    fn begin_library(&mut self, group: &LibertyGroup) {
        let name = group.first_name().unwrap_or("").to_string();
        if name.is_empty() {
            self.lib_error(1110, group.line, "library does not have a name.");
        }
        let mut library = LibertyLibrary::new(&name, &self.filename);
        // Default units: 1ns, 1pF, 1V, 1mA, 1ohm, 1um.
        for (unit, scale) in [
            ("time", 1e-9),
            ("capacitance", 1e-12),
            ("current", 1e-3),
            ("distance", 1e-6),
        ] {
            if let Some(unit) = library.units_mut().find_mut(unit) {
                unit.set_scale(scale);
            }
        }
        self.library = Some(library);
    }

    fn end_library(&mut self, _group: &LibertyGroup) {
        self.energy_scale = self.volt_scale * self.volt_scale * self.cap_scale;
    }

    fn unit_attr(
        &mut self,
        attr: &LibertyAttr,
        suffix: &str,
        unit_name: &'static str,
    ) -> Option<f32> {
        let value = self.get_attr_string(attr)?;
        match parse_unit_scale(&value, suffix) {
            Some(scale) => {
                if let Some(library) = self.library.as_mut() {
                    if let Some(unit) = library.units_mut().find_mut(unit_name) {
                        unit.set_scale(scale);
                        unit.set_suffix(value.trim_start_matches(|c: char| {
                            c.is_ascii_digit() || c == '.'
                        }));
                    }
                }
                Some(scale)
            }
            None => {
                self.lib_warn(
                    1111,
                    attr.line(),
                    &format!("unknown unit {value} for {}.", attr.name()),
                );
                None
            }
        }
    }

    fn visit_time_unit(&mut self, attr: &LibertyAttr) {
        if let Some(scale) = self.unit_attr(attr, "s", "time") {
            self.time_scale = scale;
        }
    }

    fn visit_capacitive_load_unit(&mut self, attr: &LibertyAttr) {
        let values = attr.values();
        if values.len() == 2 {
            let mult = values[0].as_float();
            let unit = values[1].to_string().to_lowercase();
            let unit_scale = match unit.as_str() {
                "ff" => Some(1e-15),
                "pf" => Some(1e-12),
                _ => None,
            };
            match (mult, unit_scale) {
                (Some(mult), Some(unit_scale)) => {
                    self.cap_scale = mult * unit_scale;
                    if let Some(library) = self.library.as_mut() {
                        if let Some(cap) = library.units_mut().find_mut("capacitance") {
                            cap.set_scale(mult * unit_scale);
                            cap.set_suffix(&unit);
                        }
                    }
                }
                _ => {
                    self.lib_warn(1112, attr.line(), "capacitive_load_unit units not ff or pf.");
                }
            }
        } else {
            self.lib_warn(
                1113,
                attr.line(),
                "capacitive_load_unit missing values.",
            );
        }
    }

    fn visit_pulling_resistance_unit(&mut self, attr: &LibertyAttr) {
        if let Some(scale) = self.unit_attr(attr, "ohm", "resistance") {
            self.res_scale = scale;
            self.have_resistance_unit = true;
        }
    }

    fn visit_resistance_unit(&mut self, attr: &LibertyAttr) {
        // pulling_resistance_unit wins when both appear.
        if !self.have_resistance_unit {
            if let Some(scale) = self.unit_attr(attr, "ohm", "resistance") {
                self.res_scale = scale;
            }
        }
    }

    fn visit_voltage_unit(&mut self, attr: &LibertyAttr) {
        if let Some(scale) = self.unit_attr(attr, "v", "voltage") {
            self.volt_scale = scale;
        }
    }

    fn visit_current_unit(&mut self, attr: &LibertyAttr) {
        if let Some(scale) = self.unit_attr(attr, "a", "current") {
            self.current_scale = scale;
        }
    }

    fn visit_power_unit(&mut self, attr: &LibertyAttr) {
        if let Some(scale) = self.unit_attr(attr, "w", "power") {
            self.power_scale = scale;
            self.leakage_power_scale = scale;
        }
    }

    fn visit_leakage_power_unit(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            match parse_unit_scale(&value, "w") {
                Some(scale) => self.leakage_power_scale = scale,
                None => self.lib_warn(1114, attr.line(), "unknown leakage_power_unit."),
            }
        }
    }

    fn visit_distance_unit(&mut self, attr: &LibertyAttr) {
        if let Some(scale) = self.unit_attr(attr, "m", "distance") {
            self.distance_scale = scale;
        }
    }

    fn visit_delay_model(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            match DelayModelType::find(&value) {
                Some(model) => {
                    if let Some(library) = self.library.as_mut() {
                        library.set_delay_model(model);
                    }
                }
                None => {
                    self.lib_warn(1115, attr.line(), &format!("unknown delay_model {value}."));
                }
            }
        }
    }

    fn visit_bus_style(&mut self, attr: &LibertyAttr) {
        if let Some(style) = self.get_attr_string(attr) {
            // Style is printf-ish, e.g. "%s[%d]"; the brackets matter.
            let brackets: Vec<char> = style
                .chars()
                .filter(|c| !c.is_alphanumeric() && *c != '%' && *c != 's' && *c != 'd')
                .collect();
            if brackets.len() == 2 {
                if let Some(library) = self.library.as_mut() {
                    library.set_bus_brackets(brackets[0], brackets[1]);
                }
            } else {
                self.lib_warn(1116, attr.line(), "unknown bus_naming_style format.");
            }
        }
    }

    fn visit_voltage_map(&mut self, attr: &LibertyAttr) {
        let values = attr.values();
        if values.len() == 2 {
            let name = values[0].to_string();
            match values[1].as_float() {
                Some(voltage) => {
                    if let Some(library) = self.library.as_mut() {
                        library.add_supply_voltage(&name, voltage * self.volt_scale);
                    }
                }
                None => self.lib_warn(1117, attr.line(), "voltage_map voltage is not a float."),
            }
        } else {
            self.lib_warn(1118, attr.line(), "voltage_map missing values.");
        }
    }

    fn visit_nom_temp(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(library) = self.library.as_mut() {
                library.nominal_mut().set_temperature(value);
            }
        }
    }

    fn visit_nom_volt(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(library) = self.library.as_mut() {
                library.nominal_mut().set_voltage(value * self.volt_scale);
            }
        }
    }

    fn visit_nom_proc(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(library) = self.library.as_mut() {
                library.nominal_mut().set_process(value);
            }
        }
    }

    fn visit_default_inout_pin_cap(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_bidirect_pin_cap(cap);
            }
        }
    }

    fn visit_default_input_pin_cap(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_input_pin_cap(cap);
            }
        }
    }

    fn visit_default_output_pin_cap(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_output_pin_cap(cap);
            }
        }
    }

    fn visit_default_max_transition(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let slew = value * self.time_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_max_slew(slew);
            }
        }
    }

    fn visit_default_max_capacitance(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_max_capacitance(cap);
            }
        }
    }

    fn visit_default_max_fanout(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_max_fanout(value);
            }
        }
    }

    fn visit_default_fanout_load(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_fanout_load(value);
            }
        }
    }

    fn visit_default_intrinsic(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        if let Some(value) = self.get_attr_float(attr) {
            let intrinsic = value * self.time_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_intrinsic(rf, intrinsic);
            }
        }
    }

    fn visit_default_intrinsic_rise(&mut self, attr: &LibertyAttr) {
        self.visit_default_intrinsic(attr, RiseFall::Rise);
    }

    fn visit_default_intrinsic_fall(&mut self, attr: &LibertyAttr) {
        self.visit_default_intrinsic(attr, RiseFall::Fall);
    }

    fn visit_default_inout_pin_res(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        if let Some(value) = self.get_attr_float(attr) {
            let res = value * self.res_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_inout_pin_res(rf, res);
            }
        }
    }

    fn visit_default_inout_pin_rise_res(&mut self, attr: &LibertyAttr) {
        self.visit_default_inout_pin_res(attr, RiseFall::Rise);
    }

    fn visit_default_inout_pin_fall_res(&mut self, attr: &LibertyAttr) {
        self.visit_default_inout_pin_res(attr, RiseFall::Fall);
    }

    fn visit_default_output_pin_res(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        if let Some(value) = self.get_attr_float(attr) {
            let res = value * self.res_scale;
            if let Some(library) = self.library.as_mut() {
                library.set_default_output_pin_res(rf, res);
            }
        }
    }

    fn visit_default_output_pin_rise_res(&mut self, attr: &LibertyAttr) {
        self.visit_default_output_pin_res(attr, RiseFall::Rise);
    }

    fn visit_default_output_pin_fall_res(&mut self, attr: &LibertyAttr) {
        self.visit_default_output_pin_res(attr, RiseFall::Fall);
    }

    fn visit_default_wire_load(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_wireload(&name);
            }
        }
    }

    fn visit_default_wire_load_mode(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_wireload_mode(WireloadMode::find(&name));
            }
        }
    }

    fn visit_default_wire_load_selection(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_wireload_selection(&name);
            }
        }
    }

    fn visit_default_operating_conditions(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_operating_conditions(&name);
            }
        }
    }

    fn visit_default_scaling_factors(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_scale_factors(&name);
            }
        }
    }

    fn threshold(&mut self, attr: &LibertyAttr) -> Option<f32> {
        self.get_attr_float(attr)
    }

    fn visit_input_threshold_rise(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_input_threshold(RiseFall::Rise, pct);
            }
        }
    }

    fn visit_input_threshold_fall(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_input_threshold(RiseFall::Fall, pct);
            }
        }
    }

    fn visit_output_threshold_rise(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_output_threshold(RiseFall::Rise, pct);
            }
        }
    }

    fn visit_output_threshold_fall(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_output_threshold(RiseFall::Fall, pct);
            }
        }
    }

    fn visit_slew_lower_threshold_rise(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_slew_lower_threshold(RiseFall::Rise, pct);
            }
        }
    }

    fn visit_slew_lower_threshold_fall(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_slew_lower_threshold(RiseFall::Fall, pct);
            }
        }
    }

    fn visit_slew_upper_threshold_rise(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_slew_upper_threshold(RiseFall::Rise, pct);
            }
        }
    }

    fn visit_slew_upper_threshold_fall(&mut self, attr: &LibertyAttr) {
        if let Some(pct) = self.threshold(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_slew_upper_threshold(RiseFall::Fall, pct);
            }
        }
    }

    fn visit_slew_derate_from_library(&mut self, attr: &LibertyAttr) {
        if let Some(derate) = self.get_attr_float(attr) {
            if !(0.0..=1.0).contains(&derate) {
                self.lib_warn(
                    1119,
                    attr.line(),
                    "slew_derate_from_library not between 0 and 1.",
                );
            } else if let Some(library) = self.library.as_mut() {
                library.set_slew_derate_from_library(derate);
            }
        }
    }

    fn visit_default_ocv_derate_group(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            if let Some(library) = self.library.as_mut() {
                library.set_default_ocv_derate(&name);
            }
        }
    }

    fn visit_ocv_arc_depth(&mut self, attr: &LibertyAttr) {
        if let Some(depth) = self.get_attr_float(attr) {
            if let Some(timing) = self.timing.as_mut() {
                timing.ocv_arc_depth = Some(depth);
            } else if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_ocv_arc_depth(depth);
            } else if let Some(library) = self.library.as_mut() {
                library.set_ocv_arc_depth(depth);
            }
        }
    }

    /* ─────────────────────── table templates ─────────────────────── */

    fn begin_table_template(&mut self, group: &LibertyGroup, kind: TableTemplateType) {
        match group.first_name() {
            Some(name) => {
                self.tbl_template = Some(TableTemplate::new(name));
                self.tbl_template_type = Some(kind);
                self.axis_vars = [None, None, None];
                self.axis_values = [None, None, None];
            }
            None => self.lib_error(1120, group.line, "table template does not have a name."),
        }
    }

    fn begin_table_template_delay(&mut self, group: &LibertyGroup) {
        self.begin_table_template(group, TableTemplateType::Delay);
    }

    fn begin_table_template_power(&mut self, group: &LibertyGroup) {
        self.begin_table_template(group, TableTemplateType::Power);
    }

    fn begin_table_template_output_current(&mut self, group: &LibertyGroup) {
        self.begin_table_template(group, TableTemplateType::OutputCurrent);
    }

    fn begin_table_template_ocv(&mut self, group: &LibertyGroup) {
        self.begin_table_template(group, TableTemplateType::Ocv);
    }

    fn axis_scale(&self, var: TableAxisVariable) -> f32 {
        match var.unit_name() {
            "time" => self.time_scale,
            "capacitance" => self.cap_scale,
            "voltage" => self.volt_scale,
            "distance" => self.distance_scale,
            _ => 1.0,
        }
    }

    fn end_table_template(&mut self, group: &LibertyGroup) {
        let (Some(mut template), Some(kind)) =
            (self.tbl_template.take(), self.tbl_template_type.take())
        else {
            return;
        };
        for i in 0..3 {
            if let Some(var) = self.axis_vars[i] {
                let scale = self.axis_scale(var);
                let values = self.axis_values[i]
                    .take()
                    .map(|vals| vals.iter().map(|v| v * scale).collect())
                    .unwrap_or_default();
                template.set_axis(i, Arc::new(TableAxis::new(var, values)));
            }
        }
        let _ = group;
        if let Some(library) = self.library.as_mut() {
            library.add_table_template(kind, template);
        }
    }

    fn visit_template_variable(&mut self, index: usize, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            let var = TableAxisVariable::find(&name);
            if var == TableAxisVariable::Unknown {
                self.lib_warn(
                    1121,
                    attr.line(),
                    &format!("axis variable {name} not supported."),
                );
            }
            self.axis_vars[index] = Some(var);
        }
    }

    fn visit_variable_1(&mut self, attr: &LibertyAttr) {
        self.visit_template_variable(0, attr);
    }

    fn visit_variable_2(&mut self, attr: &LibertyAttr) {
        self.visit_template_variable(1, attr);
    }

    fn visit_variable_3(&mut self, attr: &LibertyAttr) {
        self.visit_template_variable(2, attr);
    }

    fn visit_index(&mut self, index: usize, attr: &LibertyAttr) {
        let Some(text) = attr.first_value().map(ToString::to_string) else {
            return;
        };
        let values = self.parse_float_list(&text, 1.0, attr.line());
        if let Some(table) = self.table.as_mut() {
            // Index override inside a table group.
            table.axis_values[index] = Some(values);
        } else if self.tbl_template.is_some() {
            self.axis_values[index] = Some(values);
        }
    }

    fn visit_index_1(&mut self, attr: &LibertyAttr) {
        self.visit_index(0, attr);
    }

    fn visit_index_2(&mut self, attr: &LibertyAttr) {
        self.visit_index(1, attr);
    }

    fn visit_index_3(&mut self, attr: &LibertyAttr) {
        self.visit_index(2, attr);
    }

    /* ────────────────────────── type groups ──────────────────────── */

    fn begin_type(&mut self, group: &LibertyGroup) {
        self.type_name = group.first_name().map(str::to_string);
        self.type_bit_from = None;
        self.type_bit_to = None;
    }

    fn end_type(&mut self, group: &LibertyGroup) {
        let Some(name) = self.type_name.take() else {
            return;
        };
        match (self.type_bit_from.take(), self.type_bit_to.take()) {
            (Some(from), Some(to)) => {
                let dcl = BusDcl::new(&name, from, to);
                if let Some(ctx) = self.cell_stack.last_mut() {
                    ctx.cell.add_bus_dcl(dcl);
                } else if let Some(library) = self.library.as_mut() {
                    library.add_bus_dcl(dcl);
                }
            }
            _ => {
                self.lib_warn(1122, group.line, "type group missing bit_from/bit_to.");
            }
        }
    }

    fn visit_bit_from(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            self.type_bit_from = Some(value as i32);
        }
    }

    fn visit_bit_to(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            self.type_bit_to = Some(value as i32);
        }
    }

    /* ──────────────────────────── cells ──────────────────────────── */

    fn begin_cell(&mut self, group: &LibertyGroup) {
        match group.first_name() {
            Some(name) => {
                let cell = self.builder.make_cell(name, &self.filename);
                self.cell_stack.push(CellContext {
                    cell,
                    port_groups: Vec::new(),
                    sequentials: Vec::new(),
                    leakage_powers: Vec::new(),
                    funcs: Vec::new(),
                    scaled_cell_op_cond: None,
                });
            }
            None => self.lib_error(1130, group.line, "cell does not have a name."),
        }
    }

    fn end_cell(&mut self, group: &LibertyGroup) {
        let Some(ctx) = self.cell_stack.pop() else {
            return;
        };
        let cell = self.finish_cell(ctx, group.line);
        if let Some(library) = self.library.as_mut() {
            library.add_cell(cell);
        }
    }

    fn begin_scaled_cell(&mut self, group: &LibertyGroup) {
        if group.names.len() == 2 {
            let name = group.names[0].clone();
            let op_cond = group.names[1].clone();
            let cell = self.builder.make_cell(&name, &self.filename);
            self.cell_stack.push(CellContext {
                cell,
                port_groups: Vec::new(),
                sequentials: Vec::new(),
                leakage_powers: Vec::new(),
                funcs: Vec::new(),
                scaled_cell_op_cond: Some(op_cond),
            });
        } else {
            self.lib_error(1131, group.line, "scaled_cell needs (name, op_cond).");
        }
    }

    fn end_scaled_cell(&mut self, group: &LibertyGroup) {
        let Some(ctx) = self.cell_stack.pop() else {
            return;
        };
        let op_cond = ctx.scaled_cell_op_cond.clone().unwrap_or_default();
        let base_name = ctx.cell.name().to_string();
        let mut twin = self.finish_cell(ctx, group.line);
        let base_id = self
            .library
            .as_ref()
            .and_then(|lib| lib.find_cell(&base_name));
        match base_id {
            Some(base_id) => {
                // Scoped index name so the twin does not shadow the base.
                twin.set_name(&format!("{base_name}/{op_cond}"));
                if let Some(library) = self.library.as_mut() {
                    let twin_id = library.add_cell(twin);
                    library.cell_mut(base_id).add_corner_cell(twin_id);
                }
            }
            None => {
                self.lib_warn(
                    1132,
                    group.line,
                    &format!("scaled_cell base cell {base_name} not found."),
                );
            }
        }
    }

    fn begin_test_cell(&mut self, group: &LibertyGroup) {
        let name = self
            .cell_stack
            .last()
            .map(|ctx| format!("{}/test_cell", ctx.cell.name()))
            .unwrap_or_else(|| "test_cell".to_string());
        let _ = group;
        let cell = self.builder.make_cell(&name, &self.filename);
        self.cell_stack.push(CellContext {
            cell,
            port_groups: Vec::new(),
            sequentials: Vec::new(),
            leakage_powers: Vec::new(),
            funcs: Vec::new(),
            scaled_cell_op_cond: None,
        });
    }

    fn end_test_cell(&mut self, group: &LibertyGroup) {
        let Some(ctx) = self.cell_stack.pop() else {
            return;
        };
        let test_cell = self.finish_cell(ctx, group.line);
        if let Some(parent) = self.cell_stack.last_mut() {
            parent.cell.set_test_cell(test_cell);
        }
    }

    fn begin_statetable(&mut self, _group: &LibertyGroup) {
        if let Some(ctx) = self.cell_stack.last_mut() {
            ctx.cell.has_internal_ports = true;
        }
    }

    fn end_nop(&mut self, _group: &LibertyGroup) {}

    fn visit_area(&mut self, attr: &LibertyAttr) {
        if let Some(area) = self.get_attr_float(attr) {
            if area < 0.0 {
                self.lib_warn(1133, attr.line(), "area is negative.");
            } else if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_area(area);
            } else if let Some(wireload) = self.wireload.as_mut() {
                wireload.set_area(area);
            }
        }
    }

    fn cell_flag(&mut self, attr: &LibertyAttr, set: fn(&mut LibertyCell, bool)) {
        if let Some(flag) = self.get_attr_bool(attr) {
            if let Some(ctx) = self.cell_stack.last_mut() {
                set(&mut ctx.cell, flag);
            }
        }
    }

    fn visit_dont_use(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.dont_use = flag);
    }

    fn visit_is_macro(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.is_macro = flag);
    }

    fn visit_is_memory(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.is_memory = flag);
    }

    fn visit_pad_cell(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.is_pad = flag);
    }

    fn visit_is_pad(&mut self, attr: &LibertyAttr) {
        // On a cell this marks a pad cell; on a port a pad pin.
        if !self.ports.is_empty() {
            if let Some(flag) = self.get_attr_bool(attr) {
                self.each_port(|port| port.is_pad = flag);
            }
        } else {
            self.cell_flag(attr, |cell, flag| cell.is_pad = flag);
        }
    }

    fn visit_is_clock_cell(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.is_clock_cell = flag);
    }

    fn visit_is_level_shifter(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.is_level_shifter = flag);
    }

    fn visit_level_shifter_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            match LevelShifterType::find(&value) {
                Some(ls) => {
                    if let Some(ctx) = self.cell_stack.last_mut() {
                        ctx.cell.set_level_shifter_type(ls);
                    }
                }
                None => {
                    self.lib_warn(
                        1134,
                        attr.line(),
                        &format!("unknown level_shifter_type {value}."),
                    );
                }
            }
        }
    }

    fn visit_is_isolation_cell(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.is_isolation_cell = flag);
    }

    fn visit_always_on(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.always_on = flag);
    }

    fn visit_switch_cell_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            match SwitchCellType::find(&value) {
                Some(sc) => {
                    if let Some(ctx) = self.cell_stack.last_mut() {
                        ctx.cell.set_switch_cell_type(sc);
                    }
                }
                None => {
                    self.lib_warn(
                        1135,
                        attr.line(),
                        &format!("unknown switch_cell_type {value}."),
                    );
                }
            }
        }
    }

    fn visit_interface_timing(&mut self, attr: &LibertyAttr) {
        self.cell_flag(attr, |cell, flag| cell.interface_timing = flag);
    }

    fn visit_clock_gating_integrated_cell(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_clock_gate_type(ClockGateType::find(&value));
            }
        }
    }

    fn visit_cell_leakage_power(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let power = value * self.leakage_power_scale;
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_leakage_power(power);
            }
        }
    }

    fn visit_cell_footprint(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_footprint(&value);
            }
        }
    }

    fn visit_user_function_class(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_user_function_class(&value);
            }
        }
    }

    fn visit_scaling_factors_attr(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_scale_factors_name(&value);
            }
        }
    }

    fn visit_is_disabled_constraint(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            if !self.ports.is_empty() {
                self.each_port(|port| port.is_disabled_constraint = flag);
            } else if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.is_disabled_constraint = flag;
            }
        }
    }

    /* ──────────────────────────── ports ──────────────────────────── */

    fn begin_pin(&mut self, group: &LibertyGroup) {
        if self.in_bus || self.in_bundle {
            // Pin groups inside bus/bundle name the member bits; the
            // enclosing group's ports are restored at end_pin.
            self.saved_ports = std::mem::take(&mut self.ports);
            for name in &group.names {
                if let Some(ctx) = self.cell_stack.last_mut() {
                    if let Some(port) = ctx.cell.find_port(name) {
                        self.ports.push(port);
                    }
                }
            }
            return;
        }
        self.ports.clear();
        let names = group.names.clone();
        if names.is_empty() {
            self.lib_error(1140, group.line, "pin does not have a name.");
        }
        let builder = self.builder;
        for name in &names {
            if let Some(ctx) = self.cell_stack.last_mut() {
                let port = builder.make_port(&mut ctx.cell, name);
                self.ports.push(port);
            }
        }
        self.port_group = Some(PortGroup {
            ports: self.ports.clone(),
            ..PortGroup::default()
        });
    }

    fn end_pin(&mut self, _group: &LibertyGroup) {
        if self.in_bus || self.in_bundle {
            self.ports = std::mem::take(&mut self.saved_ports);
            return;
        }
        self.end_ports();
    }

    fn end_ports(&mut self) {
        if let Some(group) = self.port_group.take() {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.port_groups.push(group);
            }
        }
        self.ports.clear();
    }

    fn begin_bus(&mut self, group: &LibertyGroup) {
        self.in_bus = true;
        self.ports.clear();
        self.bus_names = group.names.clone();
        if self.bus_names.is_empty() {
            self.lib_error(1141, group.line, "bus does not have a name.");
        }
        self.port_group = Some(PortGroup::default());
    }

    fn end_bus(&mut self, group: &LibertyGroup) {
        if self.ports.is_empty() {
            self.lib_warn(1142, group.line, "bus missing bus_type.");
        }
        self.in_bus = false;
        self.bus_names.clear();
        self.end_ports();
    }

    fn visit_bus_type(&mut self, attr: &LibertyAttr) {
        let Some(type_name) = self.get_attr_string(attr) else {
            return;
        };
        if !self.in_bus {
            self.lib_warn(1143, attr.line(), "bus_type outside a bus group.");
            return;
        }
        let names = self.bus_names.clone();
        let dcl = self
            .cell_stack
            .last()
            .and_then(|ctx| ctx.cell.find_bus_dcl(&type_name).cloned())
            .or_else(|| {
                self.library
                    .as_ref()
                    .and_then(|lib| lib.find_bus_dcl(&type_name).cloned())
            });
        match dcl {
            Some(dcl) => {
                let builder = self.builder;
                for name in &names {
                    if let Some(ctx) = self.cell_stack.last_mut() {
                        let port =
                            builder.make_bus_port(&mut ctx.cell, name, dcl.from(), dcl.to());
                        self.ports.push(port);
                        if let Some(group) = self.port_group.as_mut() {
                            group.ports.push(port);
                        }
                    }
                }
            }
            None => {
                let line = attr.line();
                self.lib_warn(1144, line, &format!("bus_type {type_name} not found."));
            }
        }
    }

    fn begin_bundle(&mut self, group: &LibertyGroup) {
        self.in_bundle = true;
        self.ports.clear();
        self.bus_names = group.names.clone();
        if self.bus_names.is_empty() {
            self.lib_error(1145, group.line, "bundle does not have a name.");
        }
        self.port_group = Some(PortGroup::default());
    }

    fn end_bundle(&mut self, group: &LibertyGroup) {
        if self.ports.is_empty() {
            self.lib_warn(1146, group.line, "bundle missing members.");
        }
        self.in_bundle = false;
        self.bus_names.clear();
        self.end_ports();
    }

    fn visit_members(&mut self, attr: &LibertyAttr) {
        if !self.in_bundle {
            self.lib_warn(1147, attr.line(), "members outside a bundle group.");
            return;
        }
        let member_names: Vec<String> = attr.values().iter().map(ToString::to_string).collect();
        let bundle_names = self.bus_names.clone();
        let builder = self.builder;
        let mut made = Vec::new();
        if let Some(ctx) = self.cell_stack.last_mut() {
            let mut members = Vec::new();
            for name in &member_names {
                let port = match ctx.cell.find_port(name) {
                    Some(port) => port,
                    None => builder.make_port(&mut ctx.cell, name),
                };
                members.push(port);
            }
            for name in &bundle_names {
                let bundle = builder.make_bundle_port(&mut ctx.cell, name, members.clone());
                made.push(bundle);
            }
        }
        for bundle in made {
            self.ports.push(bundle);
            if let Some(group) = self.port_group.as_mut() {
                group.ports.push(bundle);
            }
        }
    }

    fn begin_pg_pin(&mut self, group: &LibertyGroup) {
        self.ports.clear();
        let builder = self.builder;
        for name in &group.names {
            if let Some(ctx) = self.cell_stack.last_mut() {
                let port = builder.make_port(&mut ctx.cell, name);
                self.ports.push(port);
            }
        }
    }

    fn end_pg_pin(&mut self, _group: &LibertyGroup) {
        self.ports.clear();
    }

    fn visit_pg_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            let direction = match value.as_str() {
                "primary_power" | "backup_power" | "internal_power" => PortDirection::Power,
                "primary_ground" | "backup_ground" | "internal_ground" => PortDirection::Ground,
                _ => PortDirection::Unknown,
            };
            self.set_port_direction(direction);
        }
    }

    fn visit_voltage_name(&mut self, _attr: &LibertyAttr) {
        // Recorded by the supply map via voltage_map; nothing per-pin.
    }

    /// Apply a mutation to every port of the current pin/bus/bundle group
    /// (and their bus bits).
    fn each_port(&mut self, f: impl Fn(&mut arclight_model::LibertyPort)) {
        let ports = self.ports.clone();
        if let Some(ctx) = self.cell_stack.last_mut() {
            for port in ports {
                let members: Vec<PortId> = ctx.cell.port(port).members().to_vec();
                f(ctx.cell.port_mut(port));
                for member in members {
                    f(ctx.cell.port_mut(member));
                }
            }
        }
    }

    fn set_port_direction(&mut self, direction: PortDirection) {
        self.each_port(move |port| port.set_direction(direction));
    }

    fn visit_direction(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            let direction = PortDirection::find(&value);
            if direction == PortDirection::Unknown {
                self.lib_warn(1150, attr.line(), &format!("unknown direction {value}."));
            }
            self.set_port_direction(direction);
            if direction == PortDirection::Internal {
                if let Some(ctx) = self.cell_stack.last_mut() {
                    ctx.cell.has_internal_ports = true;
                }
            }
        }
    }

    fn defer_func(&mut self, attr: &LibertyAttr, target_for: fn(PortId) -> FuncTarget, invert: bool) {
        if let Some(expr) = self.get_attr_string(attr) {
            let ports = self.ports.clone();
            if let Some(ctx) = self.cell_stack.last_mut() {
                for port in ports {
                    ctx.funcs.push(LibertyFunc {
                        expr: expr.clone(),
                        target: target_for(port),
                        invert,
                        attr_name: attr.name().to_string(),
                        line: attr.line(),
                    });
                }
            }
        }
    }

    fn visit_function(&mut self, attr: &LibertyAttr) {
        self.defer_func(attr, FuncTarget::PortFunction, false);
    }

    fn visit_three_state(&mut self, attr: &LibertyAttr) {
        self.defer_func(attr, FuncTarget::PortTristateEnable, false);
    }

    fn visit_capacitance(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            if let Some(wireload) = self.wireload.as_mut() {
                wireload.set_capacitance(cap);
            } else {
                self.each_port(move |port| port.set_capacitance(cap));
            }
        }
    }

    fn visit_rise_fall_cap(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            self.each_port(move |port| {
                for mm in MinMax::both() {
                    port.set_capacitance_rf(rf, mm, cap);
                }
            });
        }
    }

    fn visit_rise_cap(&mut self, attr: &LibertyAttr) {
        self.visit_rise_fall_cap(attr, RiseFall::Rise);
    }

    fn visit_fall_cap(&mut self, attr: &LibertyAttr) {
        self.visit_rise_fall_cap(attr, RiseFall::Fall);
    }

    fn visit_cap_range(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        let values = attr.values();
        if values.len() == 2 {
            match (values[0].as_float(), values[1].as_float()) {
                (Some(min), Some(max)) => {
                    let (min, max) = (min * self.cap_scale, max * self.cap_scale);
                    self.each_port(move |port| {
                        port.set_capacitance_rf(rf, MinMax::Min, min);
                        port.set_capacitance_rf(rf, MinMax::Max, max);
                    });
                }
                _ => self.lib_warn(1151, attr.line(), "capacitance range is not two floats."),
            }
        } else {
            self.lib_warn(1152, attr.line(), "capacitance range missing values.");
        }
    }

    fn visit_rise_cap_range(&mut self, attr: &LibertyAttr) {
        self.visit_cap_range(attr, RiseFall::Rise);
    }

    fn visit_fall_cap_range(&mut self, attr: &LibertyAttr) {
        self.visit_cap_range(attr, RiseFall::Fall);
    }

    fn visit_max_fanout(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            self.each_port(move |port| port.set_fanout_limit(MinMax::Max, value));
        }
    }

    fn visit_min_fanout(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            self.each_port(move |port| port.set_fanout_limit(MinMax::Min, value));
        }
    }

    fn visit_max_transition(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let slew = value * self.time_scale;
            self.each_port(move |port| port.set_slew_limit(MinMax::Max, slew));
        }
    }

    fn visit_min_transition(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let slew = value * self.time_scale;
            self.each_port(move |port| port.set_slew_limit(MinMax::Min, slew));
        }
    }

    fn visit_max_capacitance(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            self.each_port(move |port| port.set_capacitance_limit(MinMax::Max, cap));
        }
    }

    fn visit_min_capacitance(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let cap = value * self.cap_scale;
            self.each_port(move |port| port.set_capacitance_limit(MinMax::Min, cap));
        }
    }

    fn visit_fanout_load(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            self.each_port(move |port| port.set_fanout_load(value));
        }
    }

    fn visit_min_period(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let period = value * self.time_scale;
            self.each_port(move |port| port.set_min_period(period));
        }
    }

    fn visit_min_pulse_width(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        if let Some(value) = self.get_attr_float(attr) {
            let width = value * self.time_scale;
            self.each_port(move |port| port.set_min_pulse_width(rf, width));
        }
    }

    fn visit_min_pulse_width_low(&mut self, attr: &LibertyAttr) {
        // Low pulse width constrains the fall side.
        self.visit_min_pulse_width(attr, RiseFall::Fall);
    }

    fn visit_min_pulse_width_high(&mut self, attr: &LibertyAttr) {
        self.visit_min_pulse_width(attr, RiseFall::Rise);
    }

    fn visit_pulse_clock(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            let pulse = match value.as_str() {
                "rise_triggered_high_pulse" => Some((RiseFall::Rise, RiseFall::Rise)),
                "rise_triggered_low_pulse" => Some((RiseFall::Rise, RiseFall::Fall)),
                "fall_triggered_high_pulse" => Some((RiseFall::Fall, RiseFall::Rise)),
                "fall_triggered_low_pulse" => Some((RiseFall::Fall, RiseFall::Fall)),
                _ => None,
            };
            match pulse {
                Some((trigger, sense)) => {
                    self.each_port(move |port| port.set_pulse_clk(trigger, sense));
                }
                None => {
                    self.lib_warn(1153, attr.line(), &format!("unknown pulse_clock {value}."));
                }
            }
        }
    }

    fn visit_clock(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.is_clock = flag);
        }
    }

    fn visit_clock_gate_clock_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.is_clock_gate_clock = flag);
        }
    }

    fn visit_clock_gate_enable_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.is_clock_gate_enable = flag);
        }
    }

    fn visit_clock_gate_out_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.is_clock_gate_out = flag);
        }
    }

    fn visit_is_pll_feedback_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.is_pll_feedback = flag);
        }
    }

    fn visit_isolation_cell_data_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.isolation_cell_data = flag);
        }
    }

    fn visit_isolation_cell_enable_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.isolation_cell_enable = flag);
        }
    }

    fn visit_level_shifter_data_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.level_shifter_data = flag);
        }
    }

    fn visit_switch_pin(&mut self, attr: &LibertyAttr) {
        if let Some(flag) = self.get_attr_bool(attr) {
            self.each_port(move |port| port.is_switch = flag);
        }
    }

    fn visit_related_ground_pin(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            self.each_port(move |port| port.set_related_ground_pin(&value));
        }
    }

    fn visit_related_power_pin(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            self.each_port(move |port| port.set_related_power_pin(&value));
        }
    }

    fn visit_driver_waveform_rise(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            self.each_port(move |port| port.set_driver_waveform_name(RiseFall::Rise, &value));
        }
    }

    fn visit_driver_waveform_fall(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            self.each_port(move |port| port.set_driver_waveform_name(RiseFall::Fall, &value));
        }
    }

    /* ──────────────────────── timing groups ──────────────────────── */

    fn begin_timing(&mut self, group: &LibertyGroup) {
        self.timing = Some(TimingGroup {
            line: group.line,
            ..TimingGroup::default()
        });
    }

    fn end_timing(&mut self, _group: &LibertyGroup) {
        if let Some(timing) = self.timing.take() {
            if let Some(port_group) = self.port_group.as_mut() {
                port_group.timings.push(timing);
            }
        }
    }

    fn visit_related_pin(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            let names: Vec<String> = value.split_whitespace().map(str::to_string).collect();
            if let Some(timing) = self.timing.as_mut() {
                timing.related_port_names.extend(names);
            } else if let Some(power) = self.internal_power.as_mut() {
                power.related_port_names.extend(names);
            }
        }
    }

    fn visit_related_bus_pins(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            let names: Vec<String> = value.split_whitespace().map(str::to_string).collect();
            if let Some(timing) = self.timing.as_mut() {
                timing.related_port_names.extend(names);
                timing.one_to_one = true;
            } else if let Some(power) = self.internal_power.as_mut() {
                power.related_port_names.extend(names);
            }
        }
    }

    fn visit_related_output_pin(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(timing) = self.timing.as_mut() {
                timing.related_output_port_name = Some(value);
            }
        }
    }

    fn visit_timing_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            match TimingType::find(&value) {
                Some(tt) => {
                    if let Some(timing) = self.timing.as_mut() {
                        timing.timing_type = Some(tt);
                    }
                }
                None => {
                    self.lib_warn(1160, attr.line(), &format!("unknown timing_type {value}."));
                }
            }
        }
    }

    fn visit_timing_sense(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            match TimingSense::find(&value) {
                Some(sense) => {
                    if let Some(timing) = self.timing.as_mut() {
                        timing.timing_sense = Some(sense);
                    }
                }
                None => {
                    self.lib_warn(1161, attr.line(), &format!("unknown timing_sense {value}."));
                }
            }
        }
    }

    fn visit_sdf_cond(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(timing) = self.timing.as_mut() {
                timing.sdf_cond = Some(value);
            } else if let Some(mode_value) = self.mode_value_name.clone() {
                self.set_mode_value_sdf_cond(&mode_value, &value);
            }
        }
    }

    fn visit_sdf_cond_start(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(timing) = self.timing.as_mut() {
                timing.sdf_cond_start = Some(value);
            }
        }
    }

    fn visit_sdf_cond_end(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(timing) = self.timing.as_mut() {
                timing.sdf_cond_end = Some(value);
            }
        }
    }

    fn visit_mode(&mut self, attr: &LibertyAttr) {
        let values = attr.values();
        if values.len() == 2 {
            if let Some(timing) = self.timing.as_mut() {
                timing.mode_name = Some(values[0].to_string());
                timing.mode_value = Some(values[1].to_string());
            }
        } else {
            self.lib_warn(1162, attr.line(), "mode missing values.");
        }
    }

    fn visit_when(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(timing) = self.timing.as_mut() {
                timing.cond_str = Some(value);
            } else if let Some(power) = self.internal_power.as_mut() {
                power.when_str = Some(value);
            } else if let Some(leakage) = self.leakage_power.as_mut() {
                leakage.when_str = Some(value);
            } else if let (Some(mode), Some(mode_value)) =
                (self.mode_def_name.clone(), self.mode_value_name.clone())
            {
                if let Some(ctx) = self.cell_stack.last_mut() {
                    ctx.funcs.push(LibertyFunc {
                        expr: value,
                        target: FuncTarget::ModeValueCond {
                            mode,
                            value: mode_value,
                        },
                        invert: false,
                        attr_name: attr.name().to_string(),
                        line: attr.line(),
                    });
                }
            }
        }
    }

    fn visit_intrinsic(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        if let Some(value) = self.get_attr_float(attr) {
            let delay = value * self.time_scale;
            if let Some(timing) = self.timing.as_mut() {
                timing.intrinsic[rf.index()] = Some(delay);
            }
        }
    }

    fn visit_intrinsic_rise(&mut self, attr: &LibertyAttr) {
        self.visit_intrinsic(attr, RiseFall::Rise);
    }

    fn visit_intrinsic_fall(&mut self, attr: &LibertyAttr) {
        self.visit_intrinsic(attr, RiseFall::Fall);
    }

    fn visit_rise_fall_resistance(&mut self, attr: &LibertyAttr, rf: RiseFall) {
        if let Some(value) = self.get_attr_float(attr) {
            let res = value * self.res_scale;
            if let Some(timing) = self.timing.as_mut() {
                timing.resistance[rf.index()] = Some(res);
            }
        }
    }

    fn visit_rise_resistance(&mut self, attr: &LibertyAttr) {
        self.visit_rise_fall_resistance(attr, RiseFall::Rise);
    }

    fn visit_fall_resistance(&mut self, attr: &LibertyAttr) {
        self.visit_rise_fall_resistance(attr, RiseFall::Fall);
    }

    /* ──────────────────────── table groups ───────────────────────── */

    fn begin_timing_table(
        &mut self,
        group: &LibertyGroup,
        slot: TableSlot,
        template_type: TableTemplateType,
        scale: f32,
        sf_type: ScaleFactorType,
        rf: RiseFall,
    ) {
        let template = group.first_name().and_then(|name| {
            if name == "scalar" {
                None
            } else {
                self.library
                    .as_ref()
                    .and_then(|lib| lib.find_table_template(template_type, name).cloned())
            }
        });
        if template.is_none()
            && group.first_name().is_some_and(|n| n != "scalar")
        {
            let name = group.first_name().unwrap_or("").to_string();
            self.lib_warn(
                1170,
                group.line,
                &format!("table template {name} not found."),
            );
        }
        let mut axes = [None, None, None];
        if let Some(template) = &template {
            for i in 0..3 {
                axes[i] = template.axis(i).cloned();
            }
        }
        self.table = Some(TableContext {
            slot,
            template,
            axes,
            axis_values: [None, None, None],
            rows: Vec::new(),
            scale,
            scale_factor_type: sf_type,
            rf,
            line: group.line,
        });
    }

    fn begin_cell_rise(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::Cell(RiseFall::Rise),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Cell,
            RiseFall::Rise,
        );
    }

    fn begin_cell_fall(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::Cell(RiseFall::Fall),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Cell,
            RiseFall::Fall,
        );
    }

    fn begin_rise_transition(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::Transition(RiseFall::Rise),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Transition,
            RiseFall::Rise,
        );
    }

    fn begin_fall_transition(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::Transition(RiseFall::Fall),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Transition,
            RiseFall::Fall,
        );
    }

    fn constraint_scale_factor_type(&self) -> ScaleFactorType {
        match self.timing.as_ref().and_then(|t| t.timing_type) {
            Some(TimingType::HoldRising) | Some(TimingType::HoldFalling) => ScaleFactorType::Hold,
            Some(TimingType::RecoveryRising) | Some(TimingType::RecoveryFalling) => {
                ScaleFactorType::Recovery
            }
            Some(TimingType::RemovalRising) | Some(TimingType::RemovalFalling) => {
                ScaleFactorType::Removal
            }
            Some(TimingType::SkewRising) | Some(TimingType::SkewFalling) => ScaleFactorType::Skew,
            Some(TimingType::MinPulseWidth) => ScaleFactorType::MinPulseWidth,
            Some(TimingType::MinimumPeriod) => ScaleFactorType::MinPeriod,
            Some(TimingType::NochangeHighHigh)
            | Some(TimingType::NochangeHighLow)
            | Some(TimingType::NochangeLowHigh)
            | Some(TimingType::NochangeLowLow) => ScaleFactorType::Nochange,
            _ => ScaleFactorType::Setup,
        }
    }

    fn begin_rise_constraint(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        let sf_type = self.constraint_scale_factor_type();
        self.begin_timing_table(
            group,
            TableSlot::Constraint(RiseFall::Rise),
            TableTemplateType::Delay,
            scale,
            sf_type,
            RiseFall::Rise,
        );
    }

    fn begin_fall_constraint(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        let sf_type = self.constraint_scale_factor_type();
        self.begin_timing_table(
            group,
            TableSlot::Constraint(RiseFall::Fall),
            TableTemplateType::Delay,
            scale,
            sf_type,
            RiseFall::Fall,
        );
    }

    fn begin_ocv_sigma_cell_rise(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::DelaySigma(RiseFall::Rise),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Cell,
            RiseFall::Rise,
        );
    }

    fn begin_ocv_sigma_cell_fall(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::DelaySigma(RiseFall::Fall),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Cell,
            RiseFall::Fall,
        );
    }

    fn begin_ocv_sigma_rise_transition(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::SlewSigma(RiseFall::Rise),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Transition,
            RiseFall::Rise,
        );
    }

    fn begin_ocv_sigma_fall_transition(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::SlewSigma(RiseFall::Fall),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Transition,
            RiseFall::Fall,
        );
    }

    fn begin_ocv_sigma_rise_constraint(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        let sf_type = self.constraint_scale_factor_type();
        self.begin_timing_table(
            group,
            TableSlot::ConstraintSigma(RiseFall::Rise),
            TableTemplateType::Delay,
            scale,
            sf_type,
            RiseFall::Rise,
        );
    }

    fn begin_ocv_sigma_fall_constraint(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        let sf_type = self.constraint_scale_factor_type();
        self.begin_timing_table(
            group,
            TableSlot::ConstraintSigma(RiseFall::Fall),
            TableTemplateType::Delay,
            scale,
            sf_type,
            RiseFall::Fall,
        );
    }

    fn begin_rise_transition_degradation(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::SlewDegradation(RiseFall::Rise),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Transition,
            RiseFall::Rise,
        );
    }

    fn begin_fall_transition_degradation(&mut self, group: &LibertyGroup) {
        let scale = self.time_scale;
        self.begin_timing_table(
            group,
            TableSlot::SlewDegradation(RiseFall::Fall),
            TableTemplateType::Delay,
            scale,
            ScaleFactorType::Transition,
            RiseFall::Fall,
        );
    }

    fn begin_rise_power(&mut self, group: &LibertyGroup) {
        let scale = self.energy_scale();
        self.begin_timing_table(
            group,
            TableSlot::Power(RiseFall::Rise),
            TableTemplateType::Power,
            scale,
            ScaleFactorType::InternalPower,
            RiseFall::Rise,
        );
    }

    fn begin_fall_power(&mut self, group: &LibertyGroup) {
        let scale = self.energy_scale();
        self.begin_timing_table(
            group,
            TableSlot::Power(RiseFall::Fall),
            TableTemplateType::Power,
            scale,
            ScaleFactorType::InternalPower,
            RiseFall::Fall,
        );
    }

    fn energy_scale(&self) -> f32 {
        self.volt_scale * self.volt_scale * self.cap_scale
    }

    fn visit_values(&mut self, attr: &LibertyAttr) {
        let rows: Vec<String> = attr.values().iter().map(ToString::to_string).collect();
        let line = attr.line();
        let parsed: Vec<Vec<f32>> = rows
            .iter()
            .map(|row| self.parse_float_list(row, 1.0, line))
            .collect();
        if let Some(table) = self.table.as_mut() {
            table.rows = parsed;
        }
    }

    fn end_timing_table(&mut self, group: &LibertyGroup) {
        let Some(mut ctx) = self.table.take() else {
            return;
        };
        // Explicit index attrs override the template's axes.
        for i in 0..3 {
            if let Some(values) = ctx.axis_values[i].take() {
                let var = ctx
                    .template
                    .as_ref()
                    .and_then(|t| t.axis(i))
                    .map(|a| a.variable())
                    .unwrap_or(TableAxisVariable::Unknown);
                let scale = self.axis_scale(var);
                let scaled: Vec<f32> = values.iter().map(|v| v * scale).collect();
                ctx.axes[i] = Some(Arc::new(TableAxis::new(var, scaled)));
            }
        }
        let scale = ctx.scale;
        let flat: Vec<f32> = ctx
            .rows
            .iter()
            .flat_map(|row| row.iter().map(|v| v * scale))
            .collect();
        if flat.is_empty() {
            self.lib_warn(1171, group.line, "table has no values.");
            return;
        }
        let axes: Vec<Arc<TableAxis>> = ctx.axes.iter().flatten().cloned().collect();
        let table = match axes.as_slice() {
            [] => Some(Table::Scalar(flat[0])),
            [axis1] => {
                if flat.len() == axis1.size() {
                    Some(Table::OneD {
                        values: flat.clone(),
                        axis1: axis1.clone(),
                    })
                } else {
                    None
                }
            }
            [axis1, axis2] => {
                if flat.len() == axis1.size() * axis2.size() {
                    let values = flat
                        .chunks(axis2.size())
                        .map(|chunk| chunk.to_vec())
                        .collect();
                    Some(Table::TwoD {
                        values,
                        axis1: axis1.clone(),
                        axis2: axis2.clone(),
                    })
                } else {
                    None
                }
            }
            [axis1, axis2, axis3, ..] => {
                if flat.len() == axis1.size() * axis2.size() * axis3.size() {
                    let values = flat
                        .chunks(axis2.size() * axis3.size())
                        .map(|plane| {
                            plane
                                .chunks(axis3.size())
                                .map(|row| row.to_vec())
                                .collect::<Vec<_>>()
                        })
                        .collect();
                    Some(Table::ThreeD {
                        values,
                        axis1: axis1.clone(),
                        axis2: axis2.clone(),
                        axis3: axis3.clone(),
                    })
                } else {
                    None
                }
            }
        };
        let Some(table) = table else {
            self.lib_warn(
                1172,
                ctx.line,
                "table values do not match the axis sizes.",
            );
            return;
        };
        let table = Arc::new(table);
        let model = TableModel::new(
            table.clone(),
            ctx.template.clone(),
            ctx.scale_factor_type,
            ctx.rf,
        );
        match ctx.slot {
            TableSlot::Cell(rf) => {
                if !GateTableModel::check_axes(&table) {
                    self.lib_warn(1173, ctx.line, "unsupported delay table axes.");
                }
                if let Some(timing) = self.timing.as_mut() {
                    timing.cell_tables[rf.index()] = Some(model);
                }
            }
            TableSlot::Transition(rf) => {
                if !GateTableModel::check_axes(&table) {
                    self.lib_warn(1174, ctx.line, "unsupported slew table axes.");
                }
                if let Some(timing) = self.timing.as_mut() {
                    timing.transition_tables[rf.index()] = Some(model);
                }
            }
            TableSlot::Constraint(rf) => {
                if !CheckTableModel::check_axes(&table) {
                    self.lib_warn(1175, ctx.line, "unsupported constraint table axes.");
                }
                if let Some(timing) = self.timing.as_mut() {
                    timing.constraint_tables[rf.index()] = Some(model);
                }
            }
            TableSlot::DelaySigma(rf) => {
                if let Some(timing) = self.timing.as_mut() {
                    for el in MinMax::both() {
                        timing.delay_sigma[rf.index()][el.index()] = Some(model.clone());
                    }
                }
            }
            TableSlot::SlewSigma(rf) => {
                if let Some(timing) = self.timing.as_mut() {
                    for el in MinMax::both() {
                        timing.slew_sigma[rf.index()][el.index()] = Some(model.clone());
                    }
                }
            }
            TableSlot::ConstraintSigma(rf) => {
                if let Some(timing) = self.timing.as_mut() {
                    for el in MinMax::both() {
                        timing.constraint_sigma[rf.index()][el.index()] = Some(model.clone());
                    }
                }
            }
            TableSlot::Power(rf) => {
                if let Some(power) = self.internal_power.as_mut() {
                    power.models[rf.index()] = Some(model);
                }
            }
            TableSlot::SlewDegradation(rf) => {
                if !LibertyLibrary::check_slew_degradation_axes(&table) {
                    self.lib_warn(
                        1176,
                        ctx.line,
                        "transition_degradation axes must be output_pin_transition \
                         and/or connect_delay.",
                    );
                } else if let Some(library) = self.library.as_mut() {
                    library.set_wire_slew_degradation(rf, table);
                }
            }
            TableSlot::OcvDerateFactors => {
                let rf_types = match self.rf_type {
                    Some(rf) => vec![rf],
                    None => vec![RiseFall::Rise, RiseFall::Fall],
                };
                let derate_type = self.derate_type;
                let path_type = self.path_type;
                if let Some(derate) = self.ocv_derate.as_mut() {
                    for rf in rf_types {
                        derate.set_derate_table(rf, derate_type, path_type, table.clone());
                    }
                }
            }
            TableSlot::DriverWaveform => {
                let name = self.driver_waveform_name.take();
                if let Some(library) = self.library.as_mut() {
                    library.add_driver_waveform(DriverWaveform::new(name.as_deref(), table));
                }
            }
        }
    }

    /* ─────────────────────── internal power ──────────────────────── */

    fn begin_internal_power(&mut self, group: &LibertyGroup) {
        self.internal_power = Some(InternalPowerGroup {
            line: group.line,
            ..InternalPowerGroup::default()
        });
    }

    fn end_internal_power(&mut self, _group: &LibertyGroup) {
        if let Some(power) = self.internal_power.take() {
            if let Some(port_group) = self.port_group.as_mut() {
                port_group.internal_powers.push(power);
            }
        }
    }

    fn visit_related_pg_pin(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(power) = self.internal_power.as_mut() {
                power.related_pg_pin = Some(value);
            } else if let Some(leakage) = self.leakage_power.as_mut() {
                leakage.related_pg_pin = Some(value);
            }
        }
    }

    /* ─────────────────────── leakage power ───────────────────────── */

    fn begin_leakage_power(&mut self, group: &LibertyGroup) {
        self.leakage_power = Some(LeakagePowerGroup {
            line: group.line,
            ..LeakagePowerGroup::default()
        });
    }

    fn end_leakage_power(&mut self, _group: &LibertyGroup) {
        if let Some(leakage) = self.leakage_power.take() {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.leakage_powers.push(leakage);
            }
        }
    }

    fn visit_leakage_value(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let power = value * self.leakage_power_scale;
            if let Some(leakage) = self.leakage_power.as_mut() {
                leakage.power = Some(power);
            }
        }
    }

    /* ──────────────────────── sequentials ────────────────────────── */

    fn begin_sequential(&mut self, group: &LibertyGroup, is_register: bool, is_bank: bool) {
        let mut out_name = None;
        let mut out_inv_name = None;
        let mut size = None;
        for name in &group.names {
            if let Ok(n) = name.parse::<usize>() {
                size = Some(n);
            } else if out_name.is_none() {
                out_name = Some(name.clone());
            } else if out_inv_name.is_none() {
                out_inv_name = Some(name.clone());
            }
        }
        self.sequential = Some(SequentialGroup {
            is_register,
            is_bank,
            out_name,
            out_inv_name,
            size,
            clk_str: None,
            data_str: None,
            clear_str: None,
            preset_str: None,
            clr_preset_var1: LogicValue::Unknown,
            clr_preset_var2: LogicValue::Unknown,
            line: group.line,
        });
    }

    fn begin_ff(&mut self, group: &LibertyGroup) {
        self.begin_sequential(group, true, false);
    }

    fn begin_ff_bank(&mut self, group: &LibertyGroup) {
        self.begin_sequential(group, true, true);
    }

    fn begin_latch(&mut self, group: &LibertyGroup) {
        self.begin_sequential(group, false, false);
    }

    fn begin_latch_bank(&mut self, group: &LibertyGroup) {
        self.begin_sequential(group, false, true);
    }

    fn end_sequential(&mut self, _group: &LibertyGroup) {
        if let Some(seq) = self.sequential.take() {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.sequentials.push(seq);
            }
        }
    }

    fn visit_clocked_on(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(seq) = self.sequential.as_mut() {
                seq.clk_str = Some(value);
            }
        }
    }

    fn visit_data_in(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(seq) = self.sequential.as_mut() {
                seq.data_str = Some(value);
            }
        }
    }

    fn visit_clear(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(seq) = self.sequential.as_mut() {
                seq.clear_str = Some(value);
            }
        }
    }

    fn visit_preset(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(seq) = self.sequential.as_mut() {
                seq.preset_str = Some(value);
            }
        }
    }

    fn visit_clr_preset_var1(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(seq) = self.sequential.as_mut() {
                seq.clr_preset_var1 = LogicValue::find(&value);
            }
        }
    }

    fn visit_clr_preset_var2(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(seq) = self.sequential.as_mut() {
                seq.clr_preset_var2 = LogicValue::find(&value);
            }
        }
    }

    /* ───────────────────────── mode defs ─────────────────────────── */

    fn begin_mode_def(&mut self, group: &LibertyGroup) {
        match group.first_name() {
            Some(name) => {
                self.mode_def_name = Some(name.to_string());
                if let Some(ctx) = self.cell_stack.last_mut() {
                    ctx.cell.make_mode_def(name);
                }
            }
            None => self.lib_error(1180, group.line, "mode_definition missing name."),
        }
    }

    fn end_mode_def(&mut self, _group: &LibertyGroup) {
        self.mode_def_name = None;
    }

    fn begin_mode_value(&mut self, group: &LibertyGroup) {
        match (group.first_name(), self.mode_def_name.clone()) {
            (Some(value), Some(mode)) => {
                self.mode_value_name = Some(value.to_string());
                if let Some(ctx) = self.cell_stack.last_mut() {
                    ctx.cell
                        .make_mode_def(&mode)
                        .add_value(ModeValueDef::new(value));
                }
            }
            _ => self.lib_error(1181, group.line, "mode_value missing name."),
        }
    }

    fn end_mode_value(&mut self, _group: &LibertyGroup) {
        self.mode_value_name = None;
    }

    fn set_mode_value_sdf_cond(&mut self, value_name: &str, cond: &str) {
        if let Some(mode) = self.mode_def_name.clone() {
            if let Some(ctx) = self.cell_stack.last_mut() {
                let def = ctx.cell.make_mode_def(&mode);
                for value in def.values_mut() {
                    if value.value() == value_name {
                        value.set_sdf_cond(cond);
                    }
                }
            }
        }
    }

    /* ─────────────────── operating conditions ────────────────────── */

    fn begin_op_cond(&mut self, group: &LibertyGroup) {
        match group.first_name() {
            Some(name) => self.op_cond = Some(OperatingConditions::new(name)),
            None => self.lib_error(1190, group.line, "operating_conditions missing name."),
        }
    }

    fn end_op_cond(&mut self, _group: &LibertyGroup) {
        if let Some(op_cond) = self.op_cond.take() {
            if let Some(library) = self.library.as_mut() {
                library.add_operating_conditions(op_cond);
            }
        }
    }

    fn visit_proc(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(op_cond) = self.op_cond.as_mut() {
                op_cond.pvt_mut().set_process(value);
            }
        }
    }

    fn visit_volt(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let volt = value * self.volt_scale;
            if let Some(op_cond) = self.op_cond.as_mut() {
                op_cond.pvt_mut().set_voltage(volt);
            }
        }
    }

    fn visit_temp(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(op_cond) = self.op_cond.as_mut() {
                op_cond.pvt_mut().set_temperature(value);
            }
        }
    }

    fn visit_tree_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            if let Some(op_cond) = self.op_cond.as_mut() {
                op_cond.set_wireload_tree(WireloadTree::find(&value));
            }
        }
    }

    /* ───────────────────────── wireloads ─────────────────────────── */

    fn begin_wireload(&mut self, group: &LibertyGroup) {
        match group.first_name() {
            Some(name) => self.wireload = Some(Wireload::new(name)),
            None => self.lib_error(1200, group.line, "wire_load missing name."),
        }
    }

    fn end_wireload(&mut self, _group: &LibertyGroup) {
        if let Some(wireload) = self.wireload.take() {
            if let Some(library) = self.library.as_mut() {
                library.add_wireload(wireload);
            }
        }
    }

    fn visit_wireload_resistance(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            let res = value * self.res_scale;
            if let Some(wireload) = self.wireload.as_mut() {
                wireload.set_resistance(res);
            }
        }
    }

    fn visit_wireload_slope(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_float(attr) {
            if let Some(wireload) = self.wireload.as_mut() {
                wireload.set_slope(value);
            }
        }
    }

    fn visit_fanout_length(&mut self, attr: &LibertyAttr) {
        let values = attr.values();
        if values.len() >= 2 {
            match (values[0].as_float(), values[1].as_float()) {
                (Some(fanout), Some(length)) => {
                    if let Some(wireload) = self.wireload.as_mut() {
                        wireload.add_fanout_length(fanout, length);
                    }
                }
                _ => self.lib_warn(1201, attr.line(), "fanout_length is not two floats."),
            }
        } else {
            self.lib_warn(1202, attr.line(), "fanout_length missing values.");
        }
    }

    fn begin_wireload_selection(&mut self, group: &LibertyGroup) {
        match group.first_name() {
            Some(name) => self.wireload_selection = Some(WireloadSelection::new(name)),
            None => self.lib_error(1203, group.line, "wire_load_selection missing name."),
        }
    }

    fn end_wireload_selection(&mut self, _group: &LibertyGroup) {
        if let Some(selection) = self.wireload_selection.take() {
            if let Some(library) = self.library.as_mut() {
                library.add_wireload_selection(selection);
            }
        }
    }

    fn visit_wireload_from_area(&mut self, attr: &LibertyAttr) {
        let values = attr.values();
        if values.len() == 3 {
            match (values[0].as_float(), values[1].as_float()) {
                (Some(min), Some(max)) => {
                    let name = values[2].to_string();
                    if let Some(selection) = self.wireload_selection.as_mut() {
                        selection.add_entry(min, max, &name);
                    }
                }
                _ => self.lib_warn(1204, attr.line(), "wire_load_from_area bounds not floats."),
            }
        } else {
            self.lib_warn(1205, attr.line(), "wire_load_from_area missing values.");
        }
    }

    /* ─────────────────────── scaling factors ─────────────────────── */

    fn begin_scaling_factors(&mut self, group: &LibertyGroup) {
        let name = group.first_name().unwrap_or("default");
        self.scale_factors = Some(ScaleFactors::new(name));
        self.in_scaling_factors = true;
    }

    fn end_scaling_factors(&mut self, _group: &LibertyGroup) {
        self.in_scaling_factors = false;
        if let Some(factors) = self.scale_factors.take() {
            if let Some(library) = self.library.as_mut() {
                library.add_scale_factors(factors);
            }
        }
    }

    /// `k_<pvt>_<quantity>[_rise|_fall|_high|_low]` and
    /// `k_<pvt>_rise_<quantity>` spellings.
    fn visit_scale_factor(&mut self, attr: &LibertyAttr) {
        let Some(value) = self.get_attr_float(attr) else {
            return;
        };
        let name = attr.name().to_lowercase();
        let Some(rest) = name.strip_prefix("k_") else {
            return;
        };
        let Some((pvt_name, rest)) = rest.split_once('_') else {
            self.lib_warn(1210, attr.line(), &format!("unknown scale factor {name}."));
            return;
        };
        let Some(pvt) = ScaleFactorPvt::find(pvt_name) else {
            self.lib_warn(1211, attr.line(), &format!("unknown scale factor {name}."));
            return;
        };
        let mut rf: Option<RiseFall> = None;
        let mut quantity = rest.to_string();
        if let Some(stripped) = quantity.strip_prefix("rise_") {
            rf = Some(RiseFall::Rise);
            quantity = stripped.to_string();
        } else if let Some(stripped) = quantity.strip_prefix("fall_") {
            rf = Some(RiseFall::Fall);
            quantity = stripped.to_string();
        } else if let Some(stripped) = quantity.strip_suffix("_rise") {
            rf = Some(RiseFall::Rise);
            quantity = stripped.to_string();
        } else if let Some(stripped) = quantity.strip_suffix("_fall") {
            rf = Some(RiseFall::Fall);
            quantity = stripped.to_string();
        } else if let Some(stripped) = quantity.strip_suffix("_high") {
            rf = Some(RiseFall::Rise);
            quantity = stripped.to_string();
        } else if let Some(stripped) = quantity.strip_suffix("_low") {
            rf = Some(RiseFall::Fall);
            quantity = stripped.to_string();
        }
        let Some(sf_type) = ScaleFactorType::find(&quantity) else {
            self.lib_warn(1212, attr.line(), &format!("unknown scale factor {name}."));
            return;
        };
        if let Some(factors) = self.scale_factors.as_mut() {
            match rf {
                Some(rf) => factors.set_scale(sf_type, pvt, rf, value),
                None => factors.set_scale_both(sf_type, pvt, value),
            }
        }
    }

    /* ─────────────────────── OCV derating ────────────────────────── */

    fn begin_ocv_derate(&mut self, group: &LibertyGroup) {
        match group.first_name() {
            Some(name) => self.ocv_derate = Some(OcvDerate::new(name)),
            None => self.lib_error(1220, group.line, "ocv_derate missing name."),
        }
    }

    fn end_ocv_derate(&mut self, _group: &LibertyGroup) {
        if let Some(derate) = self.ocv_derate.take() {
            if let Some(library) = self.library.as_mut() {
                library.add_ocv_derate(derate);
            }
        }
    }

    fn begin_ocv_derate_factors(&mut self, group: &LibertyGroup) {
        self.rf_type = None;
        self.derate_type = MinMax::Max;
        self.path_type = PathType::Data;
        self.begin_timing_table(
            group,
            TableSlot::OcvDerateFactors,
            TableTemplateType::Ocv,
            1.0,
            ScaleFactorType::Unknown,
            RiseFall::Rise,
        );
    }

    fn end_ocv_derate_factors(&mut self, group: &LibertyGroup) {
        self.end_timing_table(group);
    }

    fn visit_rf_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            self.rf_type = match value.as_str() {
                "rise" => Some(RiseFall::Rise),
                "fall" => Some(RiseFall::Fall),
                "rise_and_fall" => None,
                other => {
                    self.lib_warn(1221, attr.line(), &format!("unknown rf_type {other}."));
                    None
                }
            };
        }
    }

    fn visit_derate_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            self.derate_type = match value.as_str() {
                "early" => MinMax::Min,
                "late" => MinMax::Max,
                other => {
                    self.lib_warn(1222, attr.line(), &format!("unknown derate_type {other}."));
                    MinMax::Max
                }
            };
        }
    }

    fn visit_path_type(&mut self, attr: &LibertyAttr) {
        if let Some(value) = self.get_attr_string(attr) {
            match PathType::find(&value) {
                Some(path_type) => self.path_type = path_type,
                None => {
                    self.lib_warn(1223, attr.line(), &format!("unknown path_type {value}."));
                }
            }
        }
    }

    fn visit_ocv_derate_group(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            if let Some(ctx) = self.cell_stack.last_mut() {
                ctx.cell.set_ocv_derate_name(&name);
            }
        }
    }

    /* ────────────────────── driver waveforms ─────────────────────── */

    fn begin_driver_waveform(&mut self, group: &LibertyGroup) {
        self.driver_waveform_name = None;
        self.begin_timing_table(
            group,
            TableSlot::DriverWaveform,
            TableTemplateType::Delay,
            1.0,
            ScaleFactorType::Unknown,
            RiseFall::Rise,
        );
    }

    fn end_driver_waveform(&mut self, group: &LibertyGroup) {
        self.end_timing_table(group);
    }

    fn visit_driver_waveform_name(&mut self, attr: &LibertyAttr) {
        if let Some(name) = self.get_attr_string(attr) {
            self.driver_waveform_name = Some(name);
        }
    }

    /* ─────────────────── deferred cell resolution ────────────────── */

    fn finish_cell(&mut self, mut ctx: CellContext, line: u32) -> LibertyCell {
        self.parse_cell_funcs(&mut ctx);
        self.make_cell_sequentials(&mut ctx);
        self.finish_port_groups(&mut ctx);
        self.make_leakage_powers(&mut ctx, line);
        ctx.cell
    }

    fn parse_cell_funcs(&mut self, ctx: &mut CellContext) {
        let funcs = std::mem::take(&mut ctx.funcs);
        for func in funcs {
            match parse_func_expr(&ctx.cell, &func.expr) {
                Ok(expr) => {
                    let expr = if func.invert {
                        FuncExpr::make_not(expr)
                    } else {
                        expr
                    };
                    match func.target {
                        FuncTarget::PortFunction(port) => {
                            ctx.cell.port_mut(port).set_function(expr);
                        }
                        FuncTarget::PortTristateEnable(port) => {
                            ctx.cell.port_mut(port).set_tristate_enable(expr);
                        }
                        FuncTarget::ModeValueCond { mode, value } => {
                            let def = ctx.cell.make_mode_def(&mode);
                            for mode_value in def.values_mut() {
                                if mode_value.value() == value {
                                    mode_value.set_cond(expr.clone());
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    self.lib_warn(
                        1230,
                        func.line,
                        &format!("{} {}: {}.", func.attr_name, func.expr, err.message),
                    );
                }
            }
        }
    }

    fn make_cell_sequentials(&mut self, ctx: &mut CellContext) {
        let groups = std::mem::take(&mut ctx.sequentials);
        for group in groups {
            let out_port = group
                .out_name
                .as_deref()
                .and_then(|name| ctx.cell.find_port(name));
            let out_inv_port = group
                .out_inv_name
                .as_deref()
                .and_then(|name| ctx.cell.find_port(name));
            if group.out_name.is_some() && out_port.is_none() {
                self.lib_warn(
                    1231,
                    group.line,
                    &format!(
                        "sequential output {} not found.",
                        group.out_name.as_deref().unwrap_or("")
                    ),
                );
            }
            let mut parse = |text: &Option<String>, what: &str| -> Option<FuncExpr> {
                let text = text.as_deref()?;
                match parse_func_expr(&ctx.cell, text) {
                    Ok(expr) => Some(expr),
                    Err(err) => {
                        let line = group.line;
                        self.report.file_warn(
                            1232,
                            &self.filename,
                            line,
                            &format!("{what} {text}: {}.", err.message),
                        );
                        None
                    }
                }
            };
            let clock = parse(&group.clk_str, "clocked_on");
            let data = parse(&group.data_str, "next_state");
            let clear = parse(&group.clear_str, "clear");
            let preset = parse(&group.preset_str, "preset");
            let size = group
                .size
                .or_else(|| out_port.map(|p| ctx.cell.port(p).size()))
                .unwrap_or(1);
            if let Some(out) = out_port {
                ctx.cell.port_mut(out).is_reg_output = true;
            }
            if let Some(out_inv) = out_inv_port {
                ctx.cell.port_mut(out_inv).is_reg_output = true;
            }
            ctx.cell.add_sequential(Sequential::new(
                group.is_register,
                group.is_bank,
                out_port,
                out_inv_port,
                size,
                clock,
                data,
                clear,
                preset,
                group.clr_preset_var1,
                group.clr_preset_var2,
            ));
        }
    }

    fn finish_port_groups(&mut self, ctx: &mut CellContext) {
        let port_groups = std::mem::take(&mut ctx.port_groups);
        for group in &port_groups {
            for port in &group.ports {
                self.set_port_cap_default(ctx, *port);
            }
        }
        for group in &port_groups {
            for timing in &group.timings {
                self.make_timing_arcs(ctx, group, timing);
            }
            for power in &group.internal_powers {
                self.make_internal_powers(ctx, group, power);
            }
        }
    }

    fn set_port_cap_default(&mut self, ctx: &mut CellContext, port: PortId) {
        let Some(library) = self.library.as_ref() else {
            return;
        };
        let direction = ctx.cell.port(port).direction();
        let default = match direction {
            PortDirection::Input => library.default_input_pin_cap(),
            PortDirection::Output | PortDirection::Tristate => library.default_output_pin_cap(),
            PortDirection::Bidirect => library.default_bidirect_pin_cap(),
            _ => 0.0,
        };
        if default != 0.0 && !ctx.cell.port(port).capacitance_is_one_value() {
            let members: Vec<PortId> = ctx.cell.port(port).members().to_vec();
            ctx.cell.port_mut(port).set_capacitance(default);
            for member in members {
                ctx.cell.port_mut(member).set_capacitance(default);
            }
        }
    }

    /// Expand a related-pin name into bit ports: scalar ports yield
    /// themselves, bus names their bits, `name[a:b]` a bit range.
    fn port_name_bits(&mut self, cell: &LibertyCell, name: &str, line: u32) -> Vec<PortId> {
        if let Some(port) = cell.find_port(name) {
            if cell.port(port).is_bus() {
                return cell.port(port).members().to_vec();
            }
            return vec![port];
        }
        // Bus range reference.
        if let (Some(open), Some(close)) = (name.find('['), name.rfind(']')) {
            let base = &name[..open];
            let range = &name[open + 1..close];
            if let Some((from, to)) = range.split_once(':') {
                if let (Ok(from), Ok(to)) = (from.parse::<i32>(), to.parse::<i32>()) {
                    let step = if from <= to { 1 } else { -1 };
                    let mut bits = Vec::new();
                    let mut index = from;
                    loop {
                        match cell.find_port(&format!("{base}[{index}]")) {
                            Some(bit) => bits.push(bit),
                            None => {
                                self.lib_warn(
                                    1240,
                                    line,
                                    &format!("port {base}[{index}] not found."),
                                );
                            }
                        }
                        if index == to {
                            break;
                        }
                        index += step;
                    }
                    return bits;
                }
            }
        }
        self.lib_warn(1241, line, &format!("port {name} not found."));
        Vec::new()
    }

    fn make_timing_arcs(&mut self, ctx: &mut CellContext, group: &PortGroup, timing: &TimingGroup) {
        // The cond expression parses against the completed port set.
        let cond = timing.cond_str.as_deref().and_then(|text| {
            match parse_func_expr(&ctx.cell, text) {
                Ok(expr) => Some(expr),
                Err(err) => {
                    let line = timing.line;
                    self.report.file_warn(
                        1242,
                        &self.filename,
                        line,
                        &format!("when {text}: {}.", err.message),
                    );
                    None
                }
            }
        });
        let attrs = timing.make_attrs(cond);
        let related_out = timing
            .related_output_port_name
            .as_deref()
            .and_then(|name| ctx.cell.find_port(name));
        for to_port in &group.ports {
            if timing.related_port_names.is_empty() {
                let needs_related = !matches!(
                    timing.timing_type,
                    Some(TimingType::MinPulseWidth)
                        | Some(TimingType::MinimumPeriod)
                        | Some(TimingType::MaxClockTreePath)
                        | Some(TimingType::MinClockTreePath)
                );
                if needs_related {
                    self.lib_warn(1243, timing.line, "timing group missing related_pin.");
                    continue;
                }
                let set = self.builder.make_timing_arcs(
                    &mut ctx.cell,
                    None,
                    *to_port,
                    related_out,
                    attrs.clone(),
                );
                self.note_latch_inference(ctx, set);
                continue;
            }
            for related_name in &timing.related_port_names {
                let from_bits = self.port_name_bits(&ctx.cell, related_name, timing.line);
                let to_size = ctx.cell.port(*to_port).size();
                if timing.one_to_one && from_bits.len() == to_size && to_size > 1 {
                    let to_members: Vec<PortId> = ctx.cell.port(*to_port).members().to_vec();
                    for (from_bit, to_bit) in from_bits.iter().zip(to_members) {
                        let set = self.builder.make_timing_arcs(
                            &mut ctx.cell,
                            Some(*from_bit),
                            to_bit,
                            related_out,
                            attrs.clone(),
                        );
                        self.note_latch_inference(ctx, set);
                    }
                } else {
                    for from_bit in from_bits {
                        let set = self.builder.make_timing_arcs(
                            &mut ctx.cell,
                            Some(from_bit),
                            *to_port,
                            related_out,
                            attrs.clone(),
                        );
                        self.note_latch_inference(ctx, set);
                    }
                }
            }
        }
    }

    fn note_latch_inference(&mut self, ctx: &mut CellContext, set: Option<arclight_model::ArcSetId>) {
        if self.infer_latches {
            if let Some(set) = set {
                if ctx.cell.timing_arc_set(set).role() == TimingRole::LatchEnToQ {
                    ctx.cell.has_infered_reg_timing_arcs = true;
                }
            }
        }
    }

    fn make_internal_powers(
        &mut self,
        ctx: &mut CellContext,
        group: &PortGroup,
        power: &InternalPowerGroup,
    ) {
        let when = power.when_str.as_deref().and_then(|text| {
            match parse_func_expr(&ctx.cell, text) {
                Ok(expr) => Some(expr),
                Err(err) => {
                    let line = power.line;
                    self.report.file_warn(
                        1250,
                        &self.filename,
                        line,
                        &format!("when {text}: {}.", err.message),
                    );
                    None
                }
            }
        });
        let attrs = InternalPowerAttrs {
            when,
            related_pg_pin: power.related_pg_pin.clone(),
            models: power.models.clone(),
        };
        for port in &group.ports {
            if power.related_port_names.is_empty() {
                self.builder
                    .make_internal_power(&mut ctx.cell, *port, None, attrs.clone());
            } else {
                for related_name in &power.related_port_names {
                    for related in self.port_name_bits(&ctx.cell, related_name, power.line) {
                        self.builder.make_internal_power(
                            &mut ctx.cell,
                            *port,
                            Some(related),
                            attrs.clone(),
                        );
                    }
                }
            }
        }
    }

    fn make_leakage_powers(&mut self, ctx: &mut CellContext, _line: u32) {
        let groups = std::mem::take(&mut ctx.leakage_powers);
        for group in groups {
            let when = group.when_str.as_deref().and_then(|text| {
                match parse_func_expr(&ctx.cell, text) {
                    Ok(expr) => Some(expr),
                    Err(err) => {
                        let line = group.line;
                        self.report.file_warn(
                            1251,
                            &self.filename,
                            line,
                            &format!("when {text}: {}.", err.message),
                        );
                        None
                    }
                }
            });
            let stateless = when.is_none();
            let attrs = LeakagePowerAttrs {
                when,
                related_pg_pin: group.related_pg_pin.clone(),
                power: group.power,
            };
            // A stateless entry doubles as the cell-level leakage.
            if stateless && ctx.cell.leakage_power().is_none() {
                if let Some(power) = group.power {
                    ctx.cell.set_leakage_power(power);
                }
            }
            self.builder.make_leakage_power(&mut ctx.cell, attrs);
        }
    }
}

impl Default for LibertyReader {
    fn default() -> Self {
        LibertyReader::new(false)
    }
}

/// Parse a unit attribute value like "1ns" or "10kohm" against the
/// expected dimension suffix. Returns the scale to SI units.
fn parse_unit_scale(value: &str, suffix: &str) -> Option<f32> {
    let lower = value.trim().to_lowercase();
    let rest = lower.strip_suffix(suffix)?;
    let digits_end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (digits, prefix) = rest.split_at(digits_end);
    let mult: f32 = if digits.is_empty() {
        1.0
    } else {
        digits.parse().ok()?
    };
    let prefix_scale = match prefix {
        "" => 1.0,
        "k" => 1e3,
        "m" => 1e-3,
        "u" => 1e-6,
        "n" => 1e-9,
        "p" => 1e-12,
        "f" => 1e-15,
        _ => return None,
    };
    Some(mult * prefix_scale)
}

/// Read a Liberty file (transparently gunzipping `.gz`).
pub fn read_liberty_file(
    path: &str,
    infer_latches: bool,
) -> Result<LibertyLibrary, LibertyError> {
    let mut reader = LibertyReader::new(infer_latches);
    reader.read_liberty_file(path)
}

/// Translate a Liberty-escaped port name to the network's path
/// conventions: bus brackets survive unescaped, an escaped hierarchy
/// divider becomes the network's escape followed by its divider, any
/// other escaped character keeps the network escape.
pub fn port_liberty_to_sta(name: &str, divider: char, escape: char) -> String {
    const LIBERTY_ESCAPE: char = '\\';
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == LIBERTY_ESCAPE && i + 1 < chars.len() {
            let next = chars[i + 1];
            if next == '[' || next == ']' {
                out.push(next);
            } else if next == '/' {
                out.push(escape);
                out.push(divider);
            } else {
                out.push(escape);
                out.push(next);
            }
            i += 2;
        } else {
            out.push(ch);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_name_translation() {
        assert_eq!(port_liberty_to_sta("A", '/', '\\'), "A");
        assert_eq!(port_liberty_to_sta("D\\[3\\]", '/', '\\'), "D[3]");
        assert_eq!(port_liberty_to_sta("a\\/b", '/', '\\'), "a\\/b");
        assert_eq!(port_liberty_to_sta("a\\.b", '/', '\\'), "a\\.b");
    }

    #[test]
    fn unit_scale_parsing() {
        assert_eq!(parse_unit_scale("1ns", "s"), Some(1e-9));
        assert_eq!(parse_unit_scale("10ps", "s"), Some(10.0e-12));
        assert_eq!(parse_unit_scale("1kohm", "ohm"), Some(1e3));
        assert_eq!(parse_unit_scale("1V", "v"), Some(1.0));
        assert_eq!(parse_unit_scale("1mA", "a"), Some(1e-3));
        assert_eq!(parse_unit_scale("5xs", "s"), None);
        assert_eq!(parse_unit_scale("1ns", "v"), None);
    }
}
