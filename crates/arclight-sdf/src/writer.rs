//! SDF writer.
//!
//! Emits the graph's annotated IOPATH delays and timing checks, grouped
//! per instance, in a form the reader replays byte-for-byte into the same
//! annotations. Values convert from internal seconds to the 1ns timescale
//! written in the header.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;

use arclight_common::{RiseFall, Transition};
use arclight_model::{
    EdgeArcs, EdgeId, Graph, InstanceId, Network, TimingArcSet, TimingRole, edge_arc_set,
};
use flate2::{Compression, write::GzEncoder};

use crate::error::SdfError;

#[derive(Debug, Clone)]
pub struct SdfWriterOptions {
    pub divider: char,
    /// Decimal digits per triple value.
    pub digits: usize,
    /// Write `(min:typ:max)` instead of `(min::max)`.
    pub include_typ: bool,
    pub gzip: bool,
    pub arc_min_index: usize,
    pub arc_max_index: usize,
    pub design: Option<String>,
    /// Timestamp string for the DATE header; omitted when absent.
    pub date: Option<String>,
    /// Tool version for the VERSION header; omitted when absent.
    pub version: Option<String>,
}

impl Default for SdfWriterOptions {
    fn default() -> Self {
        SdfWriterOptions {
            divider: '/',
            digits: 3,
            include_typ: false,
            gzip: false,
            arc_min_index: 0,
            arc_max_index: 1,
            design: None,
            date: None,
            version: None,
        }
    }
}

const TIMESCALE: f32 = 1.0e-9;

pub struct SdfWriter<'a, N: Network, G: Graph> {
    options: SdfWriterOptions,
    network: &'a N,
    graph: &'a G,
}

impl<'a, N: Network, G: Graph> SdfWriter<'a, N, G> {
    pub fn new(options: SdfWriterOptions, network: &'a N, graph: &'a G) -> Self {
        SdfWriter {
            options,
            network,
            graph,
        }
    }

    pub fn write_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "(DELAYFILE");
        let _ = writeln!(out, " (SDFVERSION \"3.0\")");
        if let Some(design) = &self.options.design {
            let _ = writeln!(out, " (DESIGN \"{design}\")");
        }
        if let Some(date) = &self.options.date {
            let _ = writeln!(out, " (DATE \"{date}\")");
        }
        let _ = writeln!(out, " (VENDOR \"arclight\")");
        let _ = writeln!(out, " (PROGRAM \"arclight\")");
        if let Some(version) = &self.options.version {
            let _ = writeln!(out, " (VERSION \"{version}\")");
        }
        let _ = writeln!(out, " (DIVIDER {})", self.options.divider);
        let _ = writeln!(out, " (TIMESCALE 1ns)");
        for instance in self.network.leaf_instances() {
            self.write_instance(&mut out, instance);
        }
        let _ = writeln!(out, ")");
        out
    }

    pub fn write_file(&self, path: &str) -> Result<(), SdfError> {
        let text = self.write_string();
        let not_writable = |source| SdfError::FileNotWritable {
            filename: path.to_string(),
            source,
        };
        if self.options.gzip || path.ends_with(".gz") {
            let file = File::create(path).map_err(not_writable)?;
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(text.as_bytes()).map_err(not_writable)?;
            encoder.finish().map_err(not_writable)?;
        } else {
            let mut file = File::create(path).map_err(not_writable)?;
            file.write_all(text.as_bytes()).map_err(not_writable)?;
        }
        Ok(())
    }

    fn write_instance(&self, out: &mut String, instance: InstanceId) {
        let mut iopath_lines = Vec::new();
        let mut check_lines = Vec::new();
        for pin in self.network.instance_pins(instance) {
            if let Some(vertex) = self.graph.pin_drvr_vertex(pin) {
                for edge in self.graph.in_edges(vertex) {
                    if self.edge_of_instance(edge, instance)
                        && self.graph.edge_role(edge).sdf_role() == TimingRole::SdfIopath
                    {
                        if let Some(line) = self.iopath_line(edge, instance) {
                            iopath_lines.push(line);
                        }
                    }
                }
            }
            if let Some(vertex) = self.graph.pin_load_vertex(pin) {
                for edge in self.graph.in_edges(vertex) {
                    if self.edge_of_instance(edge, instance)
                        && self.graph.edge_role(edge).is_timing_check()
                    {
                        check_lines.extend(self.check_lines(edge, instance));
                    }
                }
            }
        }
        if iopath_lines.is_empty() && check_lines.is_empty() {
            return;
        }
        let _ = writeln!(out, " (CELL");
        let _ = writeln!(
            out,
            "  (CELLTYPE \"{}\")",
            self.network.cell_name(instance)
        );
        let _ = writeln!(
            out,
            "  (INSTANCE {})",
            self.sdf_path(&self.network.path_name(instance))
        );
        if !iopath_lines.is_empty() {
            let _ = writeln!(out, "  (DELAY");
            let _ = writeln!(out, "   (ABSOLUTE");
            for line in iopath_lines {
                let _ = writeln!(out, "    {line}");
            }
            let _ = writeln!(out, "   )");
            let _ = writeln!(out, "  )");
        }
        if !check_lines.is_empty() {
            let _ = writeln!(out, "  (TIMINGCHECK");
            for line in check_lines {
                let _ = writeln!(out, "   {line}");
            }
            let _ = writeln!(out, "  )");
        }
        let _ = writeln!(out, " )");
    }

    fn edge_of_instance(&self, edge: EdgeId, instance: InstanceId) -> bool {
        matches!(
            self.graph.edge_arcs(edge),
            EdgeArcs::CellArcs { instance: edge_instance, .. } if edge_instance == instance
        )
    }

    fn edge_arc_set_of(&self, edge: EdgeId) -> Option<&'a TimingArcSet> {
        edge_arc_set(self.network, self.graph.edge_arcs(edge))
    }

    fn any_arc_annotated(&self, edge: EdgeId, arc_count: usize) -> bool {
        (0..arc_count).any(|arc| {
            self.graph
                .arc_delay_annotated(edge, arc, self.options.arc_min_index)
                || self
                    .graph
                    .arc_delay_annotated(edge, arc, self.options.arc_max_index)
        })
    }

    fn iopath_line(&self, edge: EdgeId, instance: InstanceId) -> Option<String> {
        let arc_set = self.edge_arc_set_of(edge)?;
        if !self.any_arc_annotated(edge, arc_set.arc_count()) {
            return None;
        }
        let cell = self.network.instance_cell(instance);
        let from_name = cell.port(arc_set.from()?).name();
        let to_name = cell.port(arc_set.to()?).name();
        let from_spec = self.port_spec(
            from_name,
            arc_set.arcs().iter().map(|arc| arc.from_edge()),
        );
        // Rise then fall destination triples.
        let mut triples = String::new();
        for rf in [RiseFall::Rise, RiseFall::Fall] {
            let arc = arc_set
                .arcs()
                .iter()
                .find(|arc| arc.to_edge().as_rise_fall() == Some(rf));
            triples.push_str(&match arc {
                Some(arc) => self.triple(edge, arc.index()),
                None => "()".to_string(),
            });
            if rf == RiseFall::Rise {
                triples.push(' ');
            }
        }
        let mut line = String::new();
        if let Some(cond) = arc_set.sdf_cond() {
            let _ = write!(line, "(COND {cond} ");
        }
        let _ = write!(line, "(IOPATH {from_spec} {to_name} {triples})");
        if arc_set.sdf_cond().is_some() {
            line.push(')');
        }
        Some(line)
    }

    /// One check line per annotated arc, with explicit edge specifiers so
    /// rise/fall constraints round-trip exactly.
    fn check_lines(&self, edge: EdgeId, instance: InstanceId) -> Vec<String> {
        let mut lines = Vec::new();
        let Some(arc_set) = self.edge_arc_set_of(edge) else {
            return lines;
        };
        let cell = self.network.instance_cell(instance);
        let (Some(from_port), Some(to_port)) = (arc_set.from(), arc_set.to()) else {
            return lines;
        };
        let clk_name = cell.port(from_port).name();
        let data_name = cell.port(to_port).name();
        let role = arc_set.role().sdf_role();
        let keyword = match role {
            TimingRole::Setup => "SETUP",
            TimingRole::Hold => "HOLD",
            TimingRole::Recovery => "RECOVERY",
            TimingRole::Removal => "REMOVAL",
            TimingRole::Skew => "SKEW",
            TimingRole::Width => "WIDTH",
            TimingRole::Period => "PERIOD",
            TimingRole::Nochange => "NOCHANGE",
            _ => return lines,
        };
        for arc in arc_set.arcs() {
            let annotated = self
                .graph
                .arc_delay_annotated(edge, arc.index(), self.options.arc_min_index)
                || self
                    .graph
                    .arc_delay_annotated(edge, arc.index(), self.options.arc_max_index);
            if !annotated {
                continue;
            }
            let triple = self.triple(edge, arc.index());
            if role == TimingRole::Width {
                let port_spec = self.edge_spec(data_name, arc.to_edge());
                lines.push(format!("({keyword} {port_spec} {triple})"));
                continue;
            }
            let data_spec = self.cond_spec(
                arc_set.sdf_cond_start(),
                &self.edge_spec(data_name, arc.to_edge()),
            );
            let clk_spec = self.cond_spec(
                arc_set.sdf_cond_end(),
                &self.edge_spec(clk_name, arc.from_edge()),
            );
            lines.push(format!("({keyword} {data_spec} {clk_spec} {triple})"));
        }
        lines
    }

    fn edge_spec(&self, port: &str, edge: Transition) -> String {
        match edge.as_rise_fall() {
            Some(RiseFall::Rise) => format!("(posedge {port})"),
            Some(RiseFall::Fall) => format!("(negedge {port})"),
            None => port.to_string(),
        }
    }

    fn cond_spec(&self, cond: Option<&str>, spec: &str) -> String {
        match cond {
            Some(cond) => format!("(COND {cond} {spec})"),
            None => spec.to_string(),
        }
    }

    /// Port with an edge specifier when every arc agrees on the edge.
    fn port_spec(&self, port: &str, mut edges: impl Iterator<Item = Transition>) -> String {
        let first = edges.next();
        let uniform = match first {
            Some(first) => {
                if edges.all(|edge| edge == first) {
                    first.as_rise_fall()
                } else {
                    None
                }
            }
            None => None,
        };
        match uniform {
            Some(RiseFall::Rise) => format!("(posedge {port})"),
            Some(RiseFall::Fall) => format!("(negedge {port})"),
            None => port.to_string(),
        }
    }

    fn triple(&self, edge: EdgeId, arc: usize) -> String {
        let value = |slot: usize| {
            if self.graph.arc_delay_annotated(edge, arc, slot) {
                Some(self.graph.arc_delay(edge, arc, slot) / TIMESCALE)
            } else {
                None
            }
        };
        let min = value(self.options.arc_min_index);
        let max = value(self.options.arc_max_index);
        let digits = self.options.digits;
        let fmt = |v: Option<f32>| v.map_or(String::new(), |v| format!("{v:.digits$}"));
        match (min, max) {
            (Some(min_v), Some(max_v)) if min_v == max_v && !self.options.include_typ => {
                format!("({})", fmt(min))
            }
            _ if self.options.include_typ => {
                format!("({}:{}:{})", fmt(min), fmt(max.or(min)), fmt(max))
            }
            _ => format!("({}::{})", fmt(min), fmt(max)),
        }
    }

    fn sdf_path(&self, path: &str) -> String {
        let network_divider = self.network.path_divider();
        let network_escape = self.network.path_escape();
        path.chars()
            .map(|ch| {
                if ch == network_divider {
                    self.options.divider
                } else if ch == network_escape {
                    '\\'
                } else {
                    ch
                }
            })
            .collect()
    }
}

/// Write the graph's annotations as SDF text.
pub fn write_sdf_string<N: Network, G: Graph>(
    options: SdfWriterOptions,
    network: &N,
    graph: &G,
) -> String {
    SdfWriter::new(options, network, graph).write_string()
}

/// Write the graph's annotations to an SDF file (gzipped for `.gz`).
pub fn write_sdf<N: Network, G: Graph>(
    path: &str,
    options: SdfWriterOptions,
    network: &N,
    graph: &G,
) -> Result<(), SdfError> {
    SdfWriter::new(options, network, graph).write_file(path)
}
