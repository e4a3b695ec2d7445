//! SDF back-annotation.
//!
//! The reader resolves each delay definition against the elaborated
//! netlist and graph: IOPATH entries locate cell arc sets on the driver
//! vertex of the destination port, INTERCONNECT/PORT entries locate wire
//! edges, and timing checks locate the clock→data check edges. Matched
//! triples land in the graph's min/max arc-delay slots.
//!
//! Semantic mismatches (missing pins, unmatched arcs) warn and continue;
//! only unreadable files, syntax errors, and unsupported TIMESCALEs abort
//! the read.

use std::fs::File;
use std::io::{self, Read as _};

use arclight_common::{MinMax, MinMaxAll, Report, RiseFall, Transition};
use arclight_model::{
    AnalysisType, EdgeId, Graph, InstanceId, LibertyCell, Network, PinId, PortId, Scene,
    TimingRole, edge_arc_set,
};
use flate2::read::GzDecoder;

use crate::error::SdfError;
use crate::parse::{
    SdfCell, SdfCellEntry, SdfCheck, SdfDelayDef, SdfFile, SdfInstanceSpec, SdfPortSpec, SdfTriple,
    parse_sdf,
};

#[derive(Debug, Clone)]
pub struct SdfReaderOptions {
    /// Hierarchical prefix prepended to every SDF path.
    pub path_prefix: Option<String>,
    /// Arc delay slot written from triple min values.
    pub arc_min_index: usize,
    /// Arc delay slot written from triple max values.
    pub arc_max_index: usize,
    pub analysis_type: AnalysisType,
    pub unescaped_dividers: bool,
    /// Ignore ABSOLUTE sections, only apply INCREMENT.
    pub incremental_only: bool,
    /// Fallback merge for conditional SDF arcs with no matching library
    /// condition.
    pub cond_use: Option<MinMaxAll>,
}

impl Default for SdfReaderOptions {
    fn default() -> Self {
        SdfReaderOptions {
            path_prefix: None,
            arc_min_index: 0,
            arc_max_index: 1,
            analysis_type: AnalysisType::Single,
            unescaped_dividers: false,
            incremental_only: false,
            cond_use: None,
        }
    }
}

impl SdfReaderOptions {
    /// Slot indices from a delay-calc corner.
    pub fn for_scene(scene: &impl Scene) -> Self {
        SdfReaderOptions {
            arc_min_index: scene.find_dcalc_analysis_pt(MinMax::Min),
            arc_max_index: scene.find_dcalc_analysis_pt(MinMax::Max),
            ..SdfReaderOptions::default()
        }
    }
}

pub struct SdfReader<'a, N: Network, G: Graph> {
    options: SdfReaderOptions,
    network: &'a N,
    graph: &'a mut G,
    report: Report,
    filename: String,
    divider: char,
    escape: char,
    timescale: f32,
    instance: Option<InstanceId>,
    cell_name: Option<String>,
    in_incremental: bool,
}

impl<'a, N: Network, G: Graph> SdfReader<'a, N, G> {
    pub fn new(options: SdfReaderOptions, network: &'a N, graph: &'a mut G) -> Self {
        SdfReader {
            options,
            network,
            graph,
            report: Report::capturing(),
            filename: String::new(),
            divider: '/',
            escape: '\\',
            timescale: 1.0e-9,
            instance: None,
            cell_name: None,
            in_incremental: false,
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    fn read_to_string(path: &str) -> io::Result<String> {
        let mut text = String::new();
        if path.ends_with(".gz") {
            GzDecoder::new(File::open(path)?).read_to_string(&mut text)?;
        } else {
            File::open(path)?.read_to_string(&mut text)?;
        }
        Ok(text)
    }

    pub fn read_file(&mut self, path: &str) -> Result<(), SdfError> {
        self.filename = path.to_string();
        let text = Self::read_to_string(path).map_err(|source| SdfError::FileNotReadable {
            filename: path.to_string(),
            source,
        })?;
        self.read_text(&text, path)
    }

    pub fn read_text(&mut self, text: &str, filename: &str) -> Result<(), SdfError> {
        self.filename = filename.to_string();
        let file = parse_sdf(text, filename)?;
        self.annotate(&file)
    }

    fn annotate(&mut self, file: &SdfFile) -> Result<(), SdfError> {
        if let Some(divider) = file.divider {
            self.divider = divider;
        }
        if let Some((mult, units)) = &file.timescale {
            self.set_timescale(*mult, units)?;
        }
        for cell in &file.cells {
            self.annotate_cell(cell);
        }
        Ok(())
    }

    fn set_timescale(&mut self, mult: f32, units: &str) -> Result<(), SdfError> {
        if !(mult == 1.0 || mult == 10.0 || mult == 100.0) {
            return Err(SdfError::unsupported(
                &self.filename,
                "TIMESCALE multiplier not 1, 10, or 100.",
            ));
        }
        let unit_scale = match units {
            "us" => 1.0e-6,
            "ns" => 1.0e-9,
            "ps" => 1.0e-12,
            _ => {
                return Err(SdfError::unsupported(
                    &self.filename,
                    "TIMESCALE units not us, ns, or ps.",
                ));
            }
        };
        self.timescale = mult * unit_scale;
        Ok(())
    }

    fn annotate_cell(&mut self, cell: &SdfCell) {
        self.cell_name = cell.celltype.clone();
        match &cell.instance {
            Some(SdfInstanceSpec::Path(path)) => self.set_instance(path),
            Some(SdfInstanceSpec::Wildcard) => {
                self.warn(193, "INSTANCE wildcards not supported.");
                self.instance = None;
            }
            Some(SdfInstanceSpec::Empty) | None => self.instance = None,
        }
        for entry in &cell.entries {
            match entry {
                SdfCellEntry::Delay { incremental, defs } => {
                    self.in_incremental = *incremental;
                    for def in defs {
                        self.annotate_delay_def(def);
                    }
                }
                SdfCellEntry::TimingChecks(checks) => {
                    for check in checks {
                        self.annotate_check(check);
                    }
                }
            }
        }
        // Reset per-cell state.
        self.cell_name = None;
        self.instance = None;
        self.in_incremental = false;
    }

    fn set_instance(&mut self, path: &str) {
        let name = self.full_path(path);
        self.instance = self.network.find_instance(&name);
        match self.instance {
            Some(instance) => {
                if let Some(cell_name) = &self.cell_name {
                    let inst_cell_name = self.network.cell_name(instance);
                    if inst_cell_name != cell_name {
                        let msg = format!(
                            "instance {name} cell {inst_cell_name} does not match enclosing \
                             cell {cell_name}."
                        );
                        self.warn(190, &msg);
                    }
                }
            }
            None => {
                self.warn(195, &format!("instance {name} not found."));
            }
        }
    }

    fn annotate_delay_def(&mut self, def: &SdfDelayDef) {
        match def {
            SdfDelayDef::IoPath {
                from,
                to,
                triples,
                cond,
                condelse,
            } => self.iopath(from, to, triples, cond.as_deref(), *condelse),
            SdfDelayDef::Interconnect { from, to, triples } => {
                self.interconnect(from, to, triples);
            }
            SdfDelayDef::Port { to, triples } => self.port(to, triples),
            SdfDelayDef::Device { port, triples } => self.device(port.as_deref(), triples),
        }
    }

    /* ─────────────────────────── IOPATH ──────────────────────────── */

    fn iopath(
        &mut self,
        from_spec: &SdfPortSpec,
        to_name: &str,
        triples: &[SdfTriple],
        cond: Option<&str>,
        condelse: bool,
    ) {
        let network = self.network;
        let Some(instance) = self.instance else {
            return;
        };
        let cell = network.instance_cell(instance);
        let from_name = self.unescape(&from_spec.port);
        let to_name = self.unescape(to_name);
        let Some(_from_port) = self.find_port(cell, &from_name) else {
            return;
        };
        let Some(_to_port) = self.find_port(cell, &to_name) else {
            return;
        };
        // The instance may not have the pin; that is not an error.
        let Some(from_pin) = network.find_pin_relative(instance, &from_name) else {
            return;
        };
        let Some(to_pin) = network.find_pin_relative(instance, &to_name) else {
            return;
        };
        let Some(to_vertex) = self.graph.pin_drvr_vertex(to_pin) else {
            return;
        };
        let triple_count = triples.len();
        if triple_count == 0 {
            self.error(188, "IOPATH with no triples.");
            return;
        }
        if triple_count > 2 {
            self.error(189, "IOPATH with more than 2 triples.");
            return;
        }
        let triples: Vec<SdfTriple> = triples.iter().map(|t| t.scaled(self.timescale)).collect();
        let mut matched = false;
        // Search for multiple matching edges because of tristate
        // enable/disable.
        for edge in self.graph.in_edges(to_vertex) {
            let Some(arc_set) = edge_arc_set(network, self.graph.edge_arcs(edge)) else {
                continue;
            };
            let lib_cond = arc_set.sdf_cond();
            let cond_use_flag = self.options.cond_use.is_some()
                && cond.is_some()
                && lib_cond.is_none()
                && !(!self.options.incremental_only && self.in_incremental);
            let from_vertex = self.graph.edge_from(edge);
            if self.graph.vertex_pin(from_vertex) == from_pin
                && arc_set.role().sdf_role() == TimingRole::SdfIopath
                && (cond_use_flag
                    || (!condelse && cond_match(cond, lib_cond))
                    // condelse matches the default (unconditional) arc.
                    || (condelse && lib_cond.is_none()))
            {
                matched = true;
                for arc in arc_set.arcs() {
                    if from_spec.transition == Transition::RiseFall
                        || arc.from_edge() == from_spec.transition
                    {
                        let triple = if triple_count == 1 {
                            triples.first()
                        } else {
                            arc.to_edge()
                                .sdf_triple_index()
                                .and_then(|index| triples.get(index))
                        };
                        if let Some(triple) = triple {
                            if cond_use_flag {
                                self.set_edge_arc_delays_cond_use(edge, arc.index(), triple);
                            } else {
                                self.set_edge_arc_delays(edge, arc.index(), triple);
                            }
                        }
                    }
                }
            }
        }
        if !matched {
            let msg = format!(
                "cell {} IOPATH {from_name} -> {to_name} not found.",
                self.network.cell_name(instance)
            );
            self.warn(191, &msg);
        }
    }

    /* ─────────────────── INTERCONNECT / PORT ─────────────────────── */

    fn interconnect(&mut self, from_name: &str, to_name: &str, triples: &[SdfTriple]) {
        // Ignore non-incremental annotations in incremental only mode.
        if self.options.incremental_only && !self.in_incremental {
            return;
        }
        let from_pin = self.find_pin(from_name);
        let to_pin = self.find_pin(to_name);
        match (from_pin, to_pin) {
            (Some(from_pin), Some(to_pin)) => {
                match self.find_wire_edge(from_pin, to_pin) {
                    Some(edge) => {
                        let triples: Vec<SdfTriple> =
                            triples.iter().map(|t| t.scaled(self.timescale)).collect();
                        self.set_edge_delays(edge, &triples, "INTERCONNECT");
                    }
                    None => {
                        let from_hier = self.network.is_hierarchical(from_pin);
                        let to_hier = self.network.is_hierarchical(to_pin);
                        if from_hier || to_hier {
                            if from_hier {
                                self.error(
                                    182,
                                    &format!("pin {from_name} is a hierarchical pin."),
                                );
                            }
                            if to_hier {
                                self.error(183, &format!("pin {to_name} is a hierarchical pin."));
                            }
                        } else {
                            self.warn(
                                184,
                                &format!("INTERCONNECT from {from_name} to {to_name} not found."),
                            );
                        }
                    }
                }
            }
            (from_pin, to_pin) => {
                if from_pin.is_none() {
                    self.warn(185, &format!("pin {from_name} not found."));
                }
                if to_pin.is_none() {
                    self.warn(186, &format!("pin {to_name} not found."));
                }
            }
        }
    }

    fn find_wire_edge(&mut self, from_pin: PinId, to_pin: PinId) -> Option<EdgeId> {
        // Fanin < fanout, so search for the driver from the load.
        let to_vertex = self.graph.pin_load_vertex(to_pin)?;
        self.graph.in_edges(to_vertex).into_iter().find(|edge| {
            let from_vertex = self.graph.edge_from(*edge);
            self.graph.vertex_pin(from_vertex) == from_pin
                && self.graph.edge_role(*edge).sdf_role().is_wire()
        })
    }

    fn port(&mut self, to_name: &str, triples: &[SdfTriple]) {
        if self.options.incremental_only && !self.in_incremental {
            return;
        }
        let to_name_unescaped = self.unescape(to_name);
        let to_pin = match self.instance {
            Some(instance) => self
                .network
                .find_pin_relative(instance, &to_name_unescaped),
            None => self.find_pin(&to_name_unescaped),
        };
        match to_pin {
            Some(to_pin) => {
                if let Some(vertex) = self.graph.pin_load_vertex(to_pin) {
                    let triples: Vec<SdfTriple> =
                        triples.iter().map(|t| t.scaled(self.timescale)).collect();
                    for edge in self.graph.in_edges(vertex) {
                        if self.graph.edge_role(edge).sdf_role().is_wire() {
                            self.set_edge_delays(edge, &triples, "PORT");
                        }
                    }
                }
            }
            None => self.warn(187, &format!("pin {to_name_unescaped} not found.")),
        }
    }

    fn device(&mut self, port: Option<&str>, triples: &[SdfTriple]) {
        if self.options.incremental_only && !self.in_incremental {
            return;
        }
        let Some(instance) = self.instance else {
            return;
        };
        let triples: Vec<SdfTriple> = triples.iter().map(|t| t.scaled(self.timescale)).collect();
        let network = self.network;
        let pins: Vec<PinId> = match port {
            Some(port_name) => {
                let cell = network.instance_cell(instance);
                let name = self.unescape(port_name);
                if self.find_port(cell, &name).is_none() {
                    return;
                }
                network
                    .find_pin_relative(instance, &name)
                    .into_iter()
                    .collect()
            }
            None => network.instance_pins(instance),
        };
        for pin in pins {
            if let Some(vertex) = self.graph.pin_drvr_vertex(pin) {
                for edge in self.graph.in_edges(vertex) {
                    if self.graph.edge_role(edge).sdf_role() == TimingRole::SdfIopath {
                        self.set_edge_delays(edge, &triples, "DEVICE");
                    }
                }
            }
        }
    }

    /* ─────────────────────── timing checks ───────────────────────── */

    fn annotate_check(&mut self, check: &SdfCheck) {
        match check {
            SdfCheck::Setup { data, clk, triple } => {
                self.timing_check(TimingRole::Setup, data, clk, *triple);
            }
            SdfCheck::Hold { data, clk, triple } => {
                self.timing_check(TimingRole::Hold, data, clk, *triple);
            }
            SdfCheck::SetupHold {
                data,
                clk,
                setup,
                hold,
            } => {
                self.timing_check(TimingRole::Setup, data, clk, *setup);
                self.timing_check(TimingRole::Hold, data, clk, *hold);
            }
            SdfCheck::Recovery { data, clk, triple } => {
                self.timing_check(TimingRole::Recovery, data, clk, *triple);
            }
            SdfCheck::Removal { data, clk, triple } => {
                self.timing_check(TimingRole::Removal, data, clk, *triple);
            }
            SdfCheck::RecRem {
                data,
                clk,
                recovery,
                removal,
            } => {
                self.timing_check(TimingRole::Recovery, data, clk, *recovery);
                self.timing_check(TimingRole::Removal, data, clk, *removal);
            }
            SdfCheck::Skew { data, clk, triple } => {
                self.timing_check(TimingRole::Skew, data, clk, *triple);
            }
            SdfCheck::Width { port, triple } => self.timing_check_width(port, *triple),
            SdfCheck::Period { port, triple } => self.timing_check_period(port, *triple),
            SdfCheck::Nochange { .. } => {
                self.warn(193, "NOCHANGE not supported.");
            }
        }
    }

    fn timing_check(
        &mut self,
        role: TimingRole,
        data_spec: &SdfPortSpec,
        clk_spec: &SdfPortSpec,
        triple: SdfTriple,
    ) {
        // Ignore non-incremental annotations in incremental only mode.
        if self.options.incremental_only && !self.in_incremental {
            return;
        }
        let Some(instance) = self.instance else {
            return;
        };
        let network = self.network;
        let cell = network.instance_cell(instance);
        let data_name = self.unescape(&data_spec.port);
        let clk_name = self.unescape(&clk_spec.port);
        if self.find_port(cell, &data_name).is_none() || self.find_port(cell, &clk_name).is_none()
        {
            return;
        }
        let Some(data_pin) = network.find_pin_relative(instance, &data_name) else {
            return;
        };
        let Some(clk_pin) = network.find_pin_relative(instance, &clk_name) else {
            return;
        };
        let mut triple = triple.scaled(self.timescale);
        // Collapse min/typ/max by analysis mode before annotating.
        if let (Some(min), Some(max)) = (triple.min, triple.max) {
            match self.options.analysis_type {
                AnalysisType::Single => {}
                AnalysisType::BcWc => {
                    if role.generic_role().is_setup_like() {
                        triple.min = Some(max);
                    } else {
                        triple.max = Some(min);
                    }
                }
                AnalysisType::Ocv => triple.min = Some(max),
            }
        }
        let mut matched =
            self.annotate_check_edges(data_pin, data_spec, clk_pin, clk_spec, role, triple, false);
        // Liberty setup/hold checks on preset/clear pins can be translated
        // into recovery/removal checks, so be flexible about matching.
        if !matched {
            matched = self
                .annotate_check_edges(data_pin, data_spec, clk_pin, clk_spec, role, triple, true);
        }
        if !matched && triple.has_value() {
            let msg = format!(
                "cell {} {data_name} -> {clk_name} {} check not found.",
                self.network.cell_name(instance),
                role.name()
            );
            self.warn(192, &msg);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn annotate_check_edges(
        &mut self,
        data_pin: PinId,
        data_spec: &SdfPortSpec,
        clk_pin: PinId,
        clk_spec: &SdfPortSpec,
        sdf_role: TimingRole,
        triple: SdfTriple,
        match_generic: bool,
    ) -> bool {
        let network = self.network;
        let mut matched = false;
        // Timing check graph edges run from clk to data.
        let Some(to_vertex) = self.graph.pin_load_vertex(data_pin) else {
            return false;
        };
        for edge in self.graph.in_edges(to_vertex) {
            let from_vertex = self.graph.edge_from(edge);
            if self.graph.vertex_pin(from_vertex) != clk_pin {
                continue;
            }
            let Some(arc_set) = edge_arc_set(network, self.graph.edge_arcs(edge)) else {
                continue;
            };
            let edge_role = arc_set.role();
            let cond_matches = cond_match(data_spec.cond.as_deref(), arc_set.sdf_cond_start())
                && cond_match(clk_spec.cond.as_deref(), arc_set.sdf_cond_end());
            let role_matches = if match_generic {
                edge_role.generic_role() == sdf_role.generic_role()
            } else {
                edge_role.sdf_role() == sdf_role
            };
            if role_matches && cond_matches {
                for arc in arc_set.arcs() {
                    let data_matches = data_spec.transition == Transition::RiseFall
                        || arc.to_edge() == data_spec.transition;
                    let clk_matches = clk_spec.transition == Transition::RiseFall
                        || arc.from_edge() == clk_spec.transition;
                    if data_matches && clk_matches {
                        self.set_edge_arc_delays(edge, arc.index(), &triple);
                    }
                }
                matched = true;
            }
        }
        matched
    }

    fn timing_check_width(&mut self, port_spec: &SdfPortSpec, triple: SdfTriple) {
        if self.options.incremental_only && !self.in_incremental {
            return;
        }
        let Some(instance) = self.instance else {
            return;
        };
        let network = self.network;
        let cell = network.instance_cell(instance);
        let name = self.unescape(&port_spec.port);
        if self.find_port(cell, &name).is_none() {
            return;
        }
        let Some(pin) = network.find_pin_relative(instance, &name) else {
            return;
        };
        let Some(vertex) = self.graph.pin_load_vertex(pin) else {
            return;
        };
        let triple = triple.scaled(self.timescale);
        let rfs = match port_spec.transition.as_rise_fall() {
            Some(rf) => vec![rf],
            None => vec![RiseFall::Rise, RiseFall::Fall],
        };
        for rf in rfs {
            if let Some((edge, arc)) = self.graph.min_pulse_width_arc(vertex, rf) {
                self.set_edge_arc_delays(edge, arc, &triple);
            }
        }
    }

    fn timing_check_period(&mut self, port_spec: &SdfPortSpec, triple: SdfTriple) {
        if self.options.incremental_only && !self.in_incremental {
            return;
        }
        let Some(instance) = self.instance else {
            return;
        };
        let network = self.network;
        let cell = network.instance_cell(instance);
        let name = self.unescape(&port_spec.port);
        if self.find_port(cell, &name).is_none() {
            return;
        }
        // Edge specifier is ignored for period checks.
        let Some(pin) = network.find_pin_relative(instance, &name) else {
            return;
        };
        let triple = triple.scaled(self.timescale);
        if let Some(value) = triple.min {
            self.graph
                .set_period_check_annotation(pin, self.options.arc_min_index, value);
        }
        if let Some(value) = triple.max {
            self.graph
                .set_period_check_annotation(pin, self.options.arc_max_index, value);
        }
    }

    /* ─────────────────────── delay writing ───────────────────────── */

    /// Rise/fall triples onto every arc of an edge's set.
    fn set_edge_delays(&mut self, edge: EdgeId, triples: &[SdfTriple], sdf_cmd: &str) {
        let network = self.network;
        match triples.len() {
            1 | 2 => {
                let Some(arc_set) = edge_arc_set(network, self.graph.edge_arcs(edge)) else {
                    return;
                };
                for arc in arc_set.arcs() {
                    let triple = if triples.len() == 1 {
                        triples.first()
                    } else {
                        arc.to_edge()
                            .sdf_triple_index()
                            .and_then(|index| triples.get(index))
                    };
                    if let Some(triple) = triple {
                        self.set_edge_arc_delays(edge, arc.index(), triple);
                    }
                }
            }
            0 => self.error(188, &format!("{sdf_cmd} with no triples.")),
            _ => self.error(189, &format!("{sdf_cmd} with more than 2 triples.")),
        }
    }

    fn set_edge_arc_delays(&mut self, edge: EdgeId, arc: usize, triple: &SdfTriple) {
        for (value, slot) in [
            (triple.min, self.options.arc_min_index),
            (triple.max, self.options.arc_max_index),
        ] {
            if let Some(value) = value {
                let delay = if self.in_incremental {
                    value + self.graph.arc_delay(edge, arc, slot)
                } else {
                    value
                };
                self.graph.set_arc_delay(edge, arc, slot, delay);
                self.graph.set_arc_delay_annotated(edge, arc, slot, true);
                self.graph
                    .set_delay_annotation_is_incremental(edge, self.options.incremental_only);
            }
        }
    }

    /// cond_use fallback: merge into previously annotated values by the
    /// requested extreme.
    fn set_edge_arc_delays_cond_use(&mut self, edge: EdgeId, arc: usize, triple: &SdfTriple) {
        let (min_merge, max_merge) = match self.options.cond_use {
            Some(MinMaxAll::Min) => (MinMax::Min, MinMax::Min),
            Some(MinMaxAll::Max) => (MinMax::Max, MinMax::Max),
            _ => (MinMax::Min, MinMax::Max),
        };
        for (value, slot, merge) in [
            (triple.min, self.options.arc_min_index, min_merge),
            (triple.max, self.options.arc_max_index, max_merge),
        ] {
            if let Some(value) = value {
                let mut delay = value;
                if !self.options.incremental_only && self.in_incremental {
                    delay += self.graph.arc_delay(edge, arc, slot);
                } else if self.graph.arc_delay_annotated(edge, arc, slot) {
                    let prev = self.graph.arc_delay(edge, arc, slot);
                    if merge.compare(prev, delay) {
                        delay = prev;
                    }
                }
                self.graph.set_arc_delay(edge, arc, slot, delay);
                self.graph.set_arc_delay_annotated(edge, arc, slot, true);
                self.graph
                    .set_delay_annotation_is_incremental(edge, self.options.incremental_only);
            }
        }
    }

    /* ───────────────────────── name lookup ───────────────────────── */

    fn full_path(&self, name: &str) -> String {
        match &self.options.path_prefix {
            Some(prefix) => {
                format!("{prefix}{}{}", self.network.path_divider(), name)
            }
            None => name.to_string(),
        }
    }

    fn find_pin(&mut self, name: &str) -> Option<PinId> {
        let unescaped = self.unescape(name);
        let path = self.full_path(&unescaped);
        self.network.find_pin(&path)
    }

    fn find_port(&mut self, cell: &LibertyCell, name: &str) -> Option<PortId> {
        let port = cell.find_port(name);
        if port.is_none() {
            if let Some(instance) = self.instance {
                let msg = format!(
                    "instance {} port {name} not found.",
                    self.network.path_name(instance)
                );
                self.warn(194, &msg);
            }
        }
        port
    }

    /// Translate SDF escapes into the network's conventions.
    fn unescape(&self, token: &str) -> String {
        let path_escape = self.network.path_escape();
        let path_divider = self.network.path_divider();
        let mut out = String::with_capacity(token.len());
        let chars: Vec<char> = token.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            if ch == self.escape && i + 1 < chars.len() {
                let next = chars[i + 1];
                if next == self.divider {
                    if self.options.unescaped_dividers {
                        out.push(path_divider);
                    } else {
                        // Translate sdf escape+divider to the network's.
                        out.push(path_escape);
                        out.push(path_divider);
                    }
                } else if next == '[' || next == ']' || next == self.escape {
                    out.push(path_escape);
                    out.push(next);
                } else {
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

    /* ─────────────────────── diagnostics ─────────────────────────── */

    fn warn(&mut self, id: u32, msg: &str) {
        let filename = self.filename.clone();
        self.report.file_warn(id, &filename, 0, msg);
    }

    fn error(&mut self, id: u32, msg: &str) {
        let filename = self.filename.clone();
        self.report.file_error(id, &filename, 0, msg);
    }
}

/// Whitespace-insensitive condition match; a missing SDF condition
/// matches any library condition.
pub fn cond_match(sdf_cond: Option<&str>, lib_cond: Option<&str>) -> bool {
    match (sdf_cond, lib_cond) {
        (None, _) => true,
        (Some(sdf), Some(lib)) => {
            let mut a = sdf.chars().filter(|c| !c.is_whitespace());
            let mut b = lib.chars().filter(|c| !c.is_whitespace());
            loop {
                match (a.next(), b.next()) {
                    (None, None) => return true,
                    (Some(x), Some(y)) if x == y => {}
                    _ => return false,
                }
            }
        }
        (Some(_), None) => false,
    }
}

/// Read an SDF file and annotate the graph. Returns the diagnostic report;
/// unreadable files, syntax errors, and bad TIMESCALEs abort.
pub fn read_sdf<N: Network, G: Graph>(
    path: &str,
    options: SdfReaderOptions,
    network: &N,
    graph: &mut G,
) -> Result<Report, SdfError> {
    let mut reader = SdfReader::new(options, network, graph);
    reader.read_file(path)?;
    Ok(std::mem::take(&mut reader.report))
}

/// As `read_sdf`, over in-memory text.
pub fn read_sdf_text<N: Network, G: Graph>(
    text: &str,
    filename: &str,
    options: SdfReaderOptions,
    network: &N,
    graph: &mut G,
) -> Result<Report, SdfError> {
    let mut reader = SdfReader::new(options, network, graph);
    reader.read_text(text, filename)?;
    Ok(std::mem::take(&mut reader.report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cond_match_ignores_whitespace() {
        assert!(cond_match(None, Some("EN")));
        assert!(cond_match(None, None));
        assert!(cond_match(Some("EN == 1'b1"), Some("EN==1'b1")));
        assert!(cond_match(Some(" A * B "), Some("A*B")));
        assert!(!cond_match(Some("A*B"), Some("A+B")));
        assert!(!cond_match(Some("A"), None));
    }
}
