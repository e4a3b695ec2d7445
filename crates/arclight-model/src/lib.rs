pub mod func_expr;
pub mod library;
pub mod netlist;
pub mod power;
pub mod scale_factors;
pub mod table;
pub mod timing_arc;
pub mod timing_model;
pub mod timing_role;
pub mod wireload;

pub use func_expr::FuncExpr;
pub use library::{
    ArcSetId, BusDcl, CellId, ClockGateType, DelayModelType, DriverWaveform, LevelShifterType,
    LibertyCell, LibertyLibrary, LibertyPort, LogicValue, ModeDef, ModeValueDef, OcvDerate,
    OperatingConditions, PathType, PortDirection, PortId, Pvt, Sequential, SwitchCellType,
    pattern_match,
};
pub use netlist::{
    AnalysisType, EdgeArcs, EdgeId, Graph, InstanceId, Network, PinId, Scene, SingleScene,
    VertexId, edge_arc_set,
};
pub use power::{InternalPower, InternalPowerAttrs, LeakagePower, LeakagePowerAttrs};
pub use scale_factors::{ScaleFactorPvt, ScaleFactorType, ScaleFactors};
pub use table::{Table, TableAxis, TableAxisVariable, TableTemplate, TableTemplateType};
pub use timing_arc::{
    TimingArc, TimingArcAttrs, TimingArcSet, TimingSense, TimingType, WIRE_ARC_INDEX_FALL,
    WIRE_ARC_INDEX_RISE, wire_arc_set,
};
pub use timing_model::{
    CheckTableModel, GateTableModel, LinearModel, OutputWaveforms, ReceiverModel, TableModel,
    TimingModel,
};
pub use timing_role::TimingRole;
pub use wireload::{Wireload, WireloadMode, WireloadSelection, WireloadTree};

// Re-export the common types alongside the model.
pub use arclight_common::{
    EarlyLate, EarlyLateAll, MinMax, MinMaxAll, Report, RiseFall, RiseFallBoth, Transition, Unit,
    Units,
};
