//! Collaborator traits for the elaborated design.
//!
//! The netlist and timing graph live outside this crate; SDF annotation
//! and the writer only need the narrow, id-based surface below. Edges
//! carry an `EdgeArcs` descriptor instead of an arc-set reference so a
//! graph implementation does not have to borrow the library.

use arclight_common::{MinMax, RiseFall};

use crate::library::{LibertyCell, PortId};
use crate::timing_arc::{TimingArcSet, wire_arc_set};
use crate::timing_role::TimingRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

/// SDC analysis mode; governs how SDF min/typ/max triples collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisType {
    Single,
    BcWc,
    Ocv,
}

impl AnalysisType {
    pub fn find(name: &str) -> Option<Self> {
        match name {
            "single" => Some(Self::Single),
            "bc_wc" => Some(Self::BcWc),
            "on_chip_variation" | "ocv" => Some(Self::Ocv),
            _ => None,
        }
    }
}

/// Where an edge's timing arcs come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeArcs {
    /// Interconnect: the process-wide wire arc set.
    Wire,
    /// A cell arc set, by instance and intra-cell set index.
    CellArcs {
        instance: InstanceId,
        arc_set: usize,
    },
}

/// Resolve an edge's arc set against the network's library.
pub fn edge_arc_set<'a, N: Network + ?Sized>(
    network: &'a N,
    arcs: EdgeArcs,
) -> Option<&'a TimingArcSet> {
    match arcs {
        EdgeArcs::Wire => Some(wire_arc_set()),
        EdgeArcs::CellArcs { instance, arc_set } => {
            network.instance_cell(instance).find_timing_arc_set(arc_set)
        }
    }
}

/// Hierarchy and name lookup on the elaborated netlist.
pub trait Network {
    fn find_pin(&self, path: &str) -> Option<PinId>;
    fn find_instance(&self, path: &str) -> Option<InstanceId>;
    fn find_pin_relative(&self, instance: InstanceId, port_name: &str) -> Option<PinId>;
    fn instance_cell(&self, instance: InstanceId) -> &LibertyCell;
    fn cell_name(&self, instance: InstanceId) -> &str;
    fn path_name(&self, instance: InstanceId) -> String;
    fn pin_path_name(&self, pin: PinId) -> String;
    fn pin_instance(&self, pin: PinId) -> Option<InstanceId>;
    fn pin_port(&self, pin: PinId) -> Option<PortId>;
    fn is_hierarchical(&self, pin: PinId) -> bool;
    fn is_top_level_port(&self, pin: PinId) -> bool;
    fn leaf_instances(&self) -> Vec<InstanceId>;
    fn instance_pins(&self, instance: InstanceId) -> Vec<PinId>;
    fn path_divider(&self) -> char;
    fn path_escape(&self) -> char;
}

/// The timing graph surface used for back-annotation: per-arc delay slots
/// with annotation flags.
pub trait Graph {
    fn pin_load_vertex(&self, pin: PinId) -> Option<VertexId>;
    fn pin_drvr_vertex(&self, pin: PinId) -> Option<VertexId>;
    fn vertex_pin(&self, vertex: VertexId) -> PinId;
    fn in_edges(&self, vertex: VertexId) -> Vec<EdgeId>;
    fn edge_from(&self, edge: EdgeId) -> VertexId;
    fn edge_to(&self, edge: EdgeId) -> VertexId;
    fn edge_role(&self, edge: EdgeId) -> TimingRole;
    fn edge_arcs(&self, edge: EdgeId) -> EdgeArcs;

    /// Number of min/max delay slots per arc.
    fn delay_slot_count(&self) -> usize;
    fn arc_delay(&self, edge: EdgeId, arc: usize, slot: usize) -> f32;
    fn set_arc_delay(&mut self, edge: EdgeId, arc: usize, slot: usize, delay: f32);
    fn arc_delay_annotated(&self, edge: EdgeId, arc: usize, slot: usize) -> bool;
    fn set_arc_delay_annotated(&mut self, edge: EdgeId, arc: usize, slot: usize, annotated: bool);
    fn delay_annotation_is_incremental(&self, edge: EdgeId) -> bool;
    fn set_delay_annotation_is_incremental(&mut self, edge: EdgeId, incremental: bool);

    fn period_check_annotation(&self, pin: PinId, slot: usize) -> Option<f32>;
    fn set_period_check_annotation(&mut self, pin: PinId, slot: usize, period: f32);

    /// The min-pulse-width check arc on a vertex for one edge polarity.
    fn min_pulse_width_arc(&self, vertex: VertexId, rf: RiseFall) -> Option<(EdgeId, usize)>;
}

/// A delay-calculation corner: maps min/max to arc delay slot indices.
pub trait Scene {
    fn find_dcalc_analysis_pt(&self, min_max: MinMax) -> usize;
}

/// The trivial one-corner scene: min is slot 0, max is slot 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleScene;

impl Scene for SingleScene {
    fn find_dcalc_analysis_pt(&self, min_max: MinMax) -> usize {
        min_max.index()
    }
}
