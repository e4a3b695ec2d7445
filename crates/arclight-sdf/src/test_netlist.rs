//! Reference in-memory netlist and timing graph.
//!
//! A deliberately small flat implementation of the `Network` and `Graph`
//! collaborator traits, used by the SDF test-suite to annotate against
//! real library cells without the production elaborator.

use arclight_common::RiseFall;
use arclight_model::{
    CellId, EdgeArcs, EdgeId, Graph, InstanceId, LibertyCell, LibertyLibrary, Network, PinId,
    PortId, TimingRole, VertexId, wire_arc_set,
};
use rustc_hash::FxHashMap;

struct InstanceData {
    name: String,
    cell: CellId,
    pins: Vec<PinId>,
}

struct PinData {
    path: String,
    instance: Option<InstanceId>,
    port: Option<PortId>,
    hierarchical: bool,
}

pub struct TestNetlist<'a> {
    library: &'a LibertyLibrary,
    instances: Vec<InstanceData>,
    instance_index: FxHashMap<String, InstanceId>,
    pins: Vec<PinData>,
    pin_index: FxHashMap<String, PinId>,
}

impl<'a> TestNetlist<'a> {
    pub fn new(library: &'a LibertyLibrary) -> Self {
        TestNetlist {
            library,
            instances: Vec::new(),
            instance_index: FxHashMap::default(),
            pins: Vec::new(),
            pin_index: FxHashMap::default(),
        }
    }

    pub fn library(&self) -> &'a LibertyLibrary {
        self.library
    }

    /// Instantiate a library cell; makes a pin per cell port.
    pub fn make_instance(&mut self, name: &str, cell_name: &str) -> InstanceId {
        let cell_id = self
            .library
            .find_cell(cell_name)
            .unwrap_or_else(|| panic!("cell {cell_name} not in library"));
        let instance = InstanceId(self.instances.len() as u32);
        let cell = self.library.cell(cell_id);
        let mut pins = Vec::new();
        for port in cell.port_ids() {
            let pin = PinId(self.pins.len() as u32);
            let path = format!("{name}/{}", cell.port(port).name());
            self.pins.push(PinData {
                path: path.clone(),
                instance: Some(instance),
                port: Some(port),
                hierarchical: false,
            });
            self.pin_index.insert(path, pin);
            pins.push(pin);
        }
        self.instances.push(InstanceData {
            name: name.to_string(),
            cell: cell_id,
            pins,
        });
        self.instance_index.insert(name.to_string(), instance);
        instance
    }

    /// A pin on the hierarchy, not on a leaf port.
    pub fn make_hierarchical_pin(&mut self, path: &str) -> PinId {
        let pin = PinId(self.pins.len() as u32);
        self.pins.push(PinData {
            path: path.to_string(),
            instance: None,
            port: None,
            hierarchical: true,
        });
        self.pin_index.insert(path.to_string(), pin);
        pin
    }

    pub fn pin(&self, path: &str) -> PinId {
        self.pin_index
            .get(path)
            .copied()
            .unwrap_or_else(|| panic!("pin {path} not in netlist"))
    }
}

impl Network for TestNetlist<'_> {
    fn find_pin(&self, path: &str) -> Option<PinId> {
        self.pin_index.get(path).copied()
    }

    fn find_instance(&self, path: &str) -> Option<InstanceId> {
        self.instance_index.get(path).copied()
    }

    fn find_pin_relative(&self, instance: InstanceId, port_name: &str) -> Option<PinId> {
        let name = &self.instances[instance.0 as usize].name;
        self.find_pin(&format!("{name}/{port_name}"))
    }

    fn instance_cell(&self, instance: InstanceId) -> &LibertyCell {
        self.library
            .cell(self.instances[instance.0 as usize].cell)
    }

    fn cell_name(&self, instance: InstanceId) -> &str {
        self.instance_cell(instance).name()
    }

    fn path_name(&self, instance: InstanceId) -> String {
        self.instances[instance.0 as usize].name.clone()
    }

    fn pin_path_name(&self, pin: PinId) -> String {
        self.pins[pin.0 as usize].path.clone()
    }

    fn pin_instance(&self, pin: PinId) -> Option<InstanceId> {
        self.pins[pin.0 as usize].instance
    }

    fn pin_port(&self, pin: PinId) -> Option<PortId> {
        self.pins[pin.0 as usize].port
    }

    fn is_hierarchical(&self, pin: PinId) -> bool {
        self.pins[pin.0 as usize].hierarchical
    }

    fn is_top_level_port(&self, pin: PinId) -> bool {
        self.pins[pin.0 as usize].instance.is_none() && !self.pins[pin.0 as usize].hierarchical
    }

    fn leaf_instances(&self) -> Vec<InstanceId> {
        (0..self.instances.len())
            .map(|i| InstanceId(i as u32))
            .collect()
    }

    fn instance_pins(&self, instance: InstanceId) -> Vec<PinId> {
        self.instances[instance.0 as usize].pins.clone()
    }

    fn path_divider(&self) -> char {
        '/'
    }

    fn path_escape(&self) -> char {
        '\\'
    }
}

struct EdgeData {
    from: VertexId,
    to: VertexId,
    role: TimingRole,
    arcs: EdgeArcs,
    delays: Vec<Vec<f32>>,
    annotated: Vec<Vec<bool>>,
    incremental: bool,
}

#[derive(Default)]
pub struct TestGraph {
    slots: usize,
    vertex_of_pin: FxHashMap<PinId, VertexId>,
    vertex_pins: Vec<PinId>,
    edges: Vec<EdgeData>,
    in_edges: FxHashMap<VertexId, Vec<EdgeId>>,
    period_annotations: FxHashMap<(PinId, usize), f32>,
}

impl TestGraph {
    pub fn new(slots: usize) -> Self {
        TestGraph {
            slots,
            ..TestGraph::default()
        }
    }

    fn vertex(&mut self, pin: PinId) -> VertexId {
        if let Some(vertex) = self.vertex_of_pin.get(&pin) {
            return *vertex;
        }
        let vertex = VertexId(self.vertex_pins.len() as u32);
        self.vertex_pins.push(pin);
        self.vertex_of_pin.insert(pin, vertex);
        vertex
    }

    pub fn make_edge(
        &mut self,
        from_pin: PinId,
        to_pin: PinId,
        role: TimingRole,
        arcs: EdgeArcs,
        arc_count: usize,
    ) -> EdgeId {
        let from = self.vertex(from_pin);
        let to = self.vertex(to_pin);
        let edge = EdgeId(self.edges.len() as u32);
        self.edges.push(EdgeData {
            from,
            to,
            role,
            arcs,
            delays: vec![vec![0.0; self.slots]; arc_count],
            annotated: vec![vec![false; self.slots]; arc_count],
            incremental: false,
        });
        self.in_edges.entry(to).or_default().push(edge);
        edge
    }

    /// Wire edge between a driver pin and a load pin.
    pub fn connect(&mut self, from_pin: PinId, to_pin: PinId) -> EdgeId {
        let arc_count = wire_arc_set().arc_count();
        self.make_edge(from_pin, to_pin, TimingRole::Wire, EdgeArcs::Wire, arc_count)
    }

    /// Build graph edges for every timing arc set of an instance's cell.
    pub fn elaborate_instance(&mut self, netlist: &TestNetlist, instance: InstanceId) {
        let cell = netlist.instance_cell(instance);
        for (set_index, set) in cell.timing_arc_sets().iter().enumerate() {
            let (Some(from_port), Some(to_port)) = (set.from(), set.to()) else {
                continue;
            };
            let from_name = cell.port(from_port).name().to_string();
            let to_name = cell.port(to_port).name().to_string();
            let (Some(from_pin), Some(to_pin)) = (
                netlist.find_pin_relative(instance, &from_name),
                netlist.find_pin_relative(instance, &to_name),
            ) else {
                continue;
            };
            self.make_edge(
                from_pin,
                to_pin,
                set.role(),
                EdgeArcs::CellArcs {
                    instance,
                    arc_set: set_index,
                },
                set.arc_count(),
            );
        }
    }
}

impl Graph for TestGraph {
    fn pin_load_vertex(&self, pin: PinId) -> Option<VertexId> {
        self.vertex_of_pin.get(&pin).copied()
    }

    fn pin_drvr_vertex(&self, pin: PinId) -> Option<VertexId> {
        self.vertex_of_pin.get(&pin).copied()
    }

    fn vertex_pin(&self, vertex: VertexId) -> PinId {
        self.vertex_pins[vertex.0 as usize]
    }

    fn in_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.in_edges.get(&vertex).cloned().unwrap_or_default()
    }

    fn edge_from(&self, edge: EdgeId) -> VertexId {
        self.edges[edge.0 as usize].from
    }

    fn edge_to(&self, edge: EdgeId) -> VertexId {
        self.edges[edge.0 as usize].to
    }

    fn edge_role(&self, edge: EdgeId) -> TimingRole {
        self.edges[edge.0 as usize].role
    }

    fn edge_arcs(&self, edge: EdgeId) -> EdgeArcs {
        self.edges[edge.0 as usize].arcs
    }

    fn delay_slot_count(&self) -> usize {
        self.slots
    }

    fn arc_delay(&self, edge: EdgeId, arc: usize, slot: usize) -> f32 {
        self.edges[edge.0 as usize].delays[arc][slot]
    }

    fn set_arc_delay(&mut self, edge: EdgeId, arc: usize, slot: usize, delay: f32) {
        self.edges[edge.0 as usize].delays[arc][slot] = delay;
    }

    fn arc_delay_annotated(&self, edge: EdgeId, arc: usize, slot: usize) -> bool {
        self.edges[edge.0 as usize].annotated[arc][slot]
    }

    fn set_arc_delay_annotated(&mut self, edge: EdgeId, arc: usize, slot: usize, annotated: bool) {
        self.edges[edge.0 as usize].annotated[arc][slot] = annotated;
    }

    fn delay_annotation_is_incremental(&self, edge: EdgeId) -> bool {
        self.edges[edge.0 as usize].incremental
    }

    fn set_delay_annotation_is_incremental(&mut self, edge: EdgeId, incremental: bool) {
        self.edges[edge.0 as usize].incremental = incremental;
    }

    fn period_check_annotation(&self, pin: PinId, slot: usize) -> Option<f32> {
        self.period_annotations.get(&(pin, slot)).copied()
    }

    fn set_period_check_annotation(&mut self, pin: PinId, slot: usize, period: f32) {
        self.period_annotations.insert((pin, slot), period);
    }

    fn min_pulse_width_arc(&self, vertex: VertexId, rf: RiseFall) -> Option<(EdgeId, usize)> {
        for edge in self.in_edges(vertex) {
            if self.edge_role(edge) == TimingRole::Width {
                let data = &self.edges[edge.0 as usize];
                // Width arcs pair same-edge transitions; pick by polarity.
                let arc = rf.index().min(data.delays.len().saturating_sub(1));
                return Some((edge, arc));
            }
        }
        None
    }
}
