//! Back-annotation behavior against a small library and netlist.

use arclight_liberty::reader::LibertyReader;
use arclight_model::{AnalysisType, Graph, LibertyLibrary, MinMaxAll, TimingRole};
use arclight_sdf::reader::{SdfReaderOptions, read_sdf_text};
use arclight_sdf::test_netlist::{TestGraph, TestNetlist};
use arclight_sdf::writer::{SdfWriterOptions, write_sdf_string};

const LIB: &str = r#"
library (demo) {
  delay_model : table_lookup;
  time_unit : "1ns";
  capacitive_load_unit (1, pf);
  cell (BUF1) {
    pin (A) { direction : input; }
    pin (Z) {
      direction : output;
      function : "A";
      timing () {
        related_pin : "A";
        timing_sense : positive_unate;
        intrinsic_rise : 1.0;
        intrinsic_fall : 2.0;
      }
    }
  }
  cell (DFF1) {
    ff (IQ, IQN) {
      clocked_on : "CK";
      next_state : "D";
    }
    pin (CK) {
      direction : input;
      clock : true;
      timing () {
        timing_type : min_pulse_width;
        rise_constraint (scalar) { values ("0.8"); }
        fall_constraint (scalar) { values ("0.9"); }
      }
    }
    pin (D) {
      direction : input;
      timing () {
        related_pin : "CK";
        timing_type : setup_rising;
        rise_constraint (scalar) { values ("0.2"); }
        fall_constraint (scalar) { values ("0.2"); }
      }
    }
    pin (Q) {
      direction : output;
      function : "IQ";
      timing () {
        related_pin : "CK";
        timing_type : rising_edge;
        intrinsic_rise : 0.5;
        intrinsic_fall : 0.6;
      }
    }
    pin (IQ) { direction : internal; }
    pin (IQN) { direction : internal; }
  }
}
"#;

fn build_library() -> LibertyLibrary {
    let mut reader = LibertyReader::new(false);
    reader.read_liberty_text(LIB, "demo.lib").unwrap()
}

struct Design<'a> {
    netlist: TestNetlist<'a>,
    graph: TestGraph,
}

fn build_design(library: &LibertyLibrary) -> Design<'_> {
    let mut netlist = TestNetlist::new(library);
    let u1 = netlist.make_instance("u1", "BUF1");
    let u2 = netlist.make_instance("u2", "DFF1");
    let mut graph = TestGraph::new(2);
    graph.elaborate_instance(&netlist, u1);
    graph.elaborate_instance(&netlist, u2);
    graph.connect(netlist.pin("u1/Z"), netlist.pin("u2/D"));
    Design { netlist, graph }
}

fn find_edge(
    design: &Design<'_>,
    from: &str,
    to: &str,
    role_filter: fn(TimingRole) -> bool,
) -> arclight_model::EdgeId {
    let to_pin = design.netlist.pin(to);
    let from_pin = design.netlist.pin(from);
    let vertex = design.graph.pin_load_vertex(to_pin).unwrap();
    design
        .graph
        .in_edges(vertex)
        .into_iter()
        .find(|edge| {
            let from_vertex = design.graph.edge_from(*edge);
            design.graph.vertex_pin(from_vertex) == from_pin
                && role_filter(design.graph.edge_role(*edge))
        })
        .unwrap_or_else(|| panic!("no edge {from} -> {to}"))
}

const SDF: &str = r#"
(DELAYFILE
 (SDFVERSION "3.0")
 (DESIGN "top")
 (DIVIDER /)
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "BUF1") (INSTANCE u1)
  (DELAY (ABSOLUTE (IOPATH A Z (0.3:0.3:0.3) (0.4:0.4:0.4)))))
 (CELL (CELLTYPE "DFF1") (INSTANCE u2)
  (DELAY (ABSOLUTE (IOPATH (posedge CK) Q (0.5) (0.6))))
  (TIMINGCHECK
   (SETUP D (posedge CK) (0.2))
   (WIDTH (posedge CK) (0.7))))
)
"#;

#[test]
fn iopath_annotates_rise_and_fall_arcs() {
    let library = build_library();
    let mut design = build_design(&library);
    let report = read_sdf_text(
        SDF,
        "test.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    assert_eq!(report.error_count(), 0);

    let edge = find_edge(&design, "u1/A", "u1/Z", |r| r == TimingRole::Combinational);
    // Arc 0 is rise->rise, arc 1 fall->fall in the positive-unate set.
    for slot in 0..2 {
        assert!(design.graph.arc_delay_annotated(edge, 0, slot));
        assert!((design.graph.arc_delay(edge, 0, slot) - 0.3e-9).abs() < 1e-15);
        assert!(design.graph.arc_delay_annotated(edge, 1, slot));
        assert!((design.graph.arc_delay(edge, 1, slot) - 0.4e-9).abs() < 1e-15);
    }

    let q_edge = find_edge(&design, "u2/CK", "u2/Q", |r| r == TimingRole::RegClkToQ);
    assert!((design.graph.arc_delay(q_edge, 0, 0) - 0.5e-9).abs() < 1e-15);
    assert!((design.graph.arc_delay(q_edge, 1, 0) - 0.6e-9).abs() < 1e-15);

    let setup_edge = find_edge(&design, "u2/CK", "u2/D", |r| r == TimingRole::Setup);
    assert!(design.graph.arc_delay_annotated(setup_edge, 0, 1));
    assert!((design.graph.arc_delay(setup_edge, 0, 1) - 0.2e-9).abs() < 1e-15);

    let width_edge = find_edge(&design, "u2/CK", "u2/CK", |r| r == TimingRole::Width);
    assert!(design.graph.arc_delay_annotated(width_edge, 0, 0));
    assert!((design.graph.arc_delay(width_edge, 0, 0) - 0.7e-9).abs() < 1e-15);
}

#[test]
fn interconnect_annotates_wire_edges() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "top") (INSTANCE)
  (DELAY (ABSOLUTE (INTERCONNECT u1/Z u2/D (0.05))))))
"#;
    let report = read_sdf_text(
        sdf,
        "wires.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    assert_eq!(report.error_count(), 0);
    let edge = find_edge(&design, "u1/Z", "u2/D", |r| r.is_wire());
    for arc in 0..2 {
        assert!(design.graph.arc_delay_annotated(edge, arc, 0));
        assert!((design.graph.arc_delay(edge, arc, 0) - 0.05e-9).abs() < 1e-15);
    }
}

#[test]
fn hierarchical_interconnect_pin_is_an_error() {
    let library = build_library();
    let mut design = build_design(&library);
    design.netlist.make_hierarchical_pin("top/u1h/a");
    design.netlist.make_hierarchical_pin("top/u1h/b");
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (INSTANCE)
  (DELAY (ABSOLUTE (INTERCONNECT top/u1h/a top/u1h/b (0.1))))))
"#;
    let report = read_sdf_text(
        sdf,
        "hier.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    assert!(report.error_count() > 0);
    assert!(
        report
            .messages()
            .iter()
            .any(|m| m.contains("hierarchical pin"))
    );
}

#[test]
fn unsupported_timescale_aborts() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = "(DELAYFILE (TIMESCALE 2ns))";
    let result = read_sdf_text(
        sdf,
        "bad.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    );
    assert!(result.is_err());
}

#[test]
fn timescale_scales_values() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 10ps)
 (CELL (CELLTYPE "BUF1") (INSTANCE u1)
  (DELAY (ABSOLUTE (IOPATH A Z (3.0) (4.0))))))
"#;
    read_sdf_text(
        sdf,
        "ps.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    let edge = find_edge(&design, "u1/A", "u1/Z", |r| r == TimingRole::Combinational);
    assert!((design.graph.arc_delay(edge, 0, 0) - 30.0e-12).abs() < 1e-16);
}

#[test]
fn incremental_adds_to_previous_delay() {
    let library = build_library();
    let mut design = build_design(&library);
    read_sdf_text(
        SDF,
        "abs.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    let incr = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "BUF1") (INSTANCE u1)
  (DELAY (INCREMENT (IOPATH A Z (0.1) (0.1))))))
"#;
    read_sdf_text(
        incr,
        "incr.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    let edge = find_edge(&design, "u1/A", "u1/Z", |r| r == TimingRole::Combinational);
    assert!((design.graph.arc_delay(edge, 0, 0) - 0.4e-9).abs() < 1e-15);
    assert!((design.graph.arc_delay(edge, 1, 0) - 0.5e-9).abs() < 1e-15);
}

#[test]
fn reading_twice_is_idempotent() {
    let library = build_library();
    let mut design = build_design(&library);
    for _ in 0..2 {
        read_sdf_text(
            SDF,
            "twice.sdf",
            SdfReaderOptions::default(),
            &design.netlist,
            &mut design.graph,
        )
        .unwrap();
    }
    let edge = find_edge(&design, "u1/A", "u1/Z", |r| r == TimingRole::Combinational);
    assert!((design.graph.arc_delay(edge, 0, 0) - 0.3e-9).abs() < 1e-15);
    assert!((design.graph.arc_delay(edge, 1, 0) - 0.4e-9).abs() < 1e-15);
}

#[test]
fn cond_use_merges_unmatched_conditions() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "BUF1") (INSTANCE u1)
  (DELAY (ABSOLUTE
   (COND EN == 1'b1 (IOPATH A Z (0.5) (0.5)))
   (COND EN == 1'b0 (IOPATH A Z (0.2) (0.2)))))))
"#;
    let options = SdfReaderOptions {
        cond_use: Some(MinMaxAll::Max),
        ..SdfReaderOptions::default()
    };
    let report = read_sdf_text(sdf, "cond.sdf", options, &design.netlist, &mut design.graph)
        .unwrap();
    assert_eq!(report.error_count(), 0);
    let edge = find_edge(&design, "u1/A", "u1/Z", |r| r == TimingRole::Combinational);
    // Max merge keeps the larger conditional delay.
    assert!((design.graph.arc_delay(edge, 0, 0) - 0.5e-9).abs() < 1e-15);
    assert!((design.graph.arc_delay(edge, 0, 1) - 0.5e-9).abs() < 1e-15);
}

#[test]
fn period_checks_annotate_the_pin() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "DFF1") (INSTANCE u2)
  (TIMINGCHECK (PERIOD (posedge CK) (2.0)))))
"#;
    read_sdf_text(
        sdf,
        "period.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    let ck = design.netlist.pin("u2/CK");
    let period = design.graph.period_check_annotation(ck, 0).unwrap();
    assert!((period - 2.0e-9).abs() < 1e-15);
}

#[test]
fn bc_wc_collapses_setup_to_max() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "DFF1") (INSTANCE u2)
  (TIMINGCHECK (SETUP D (posedge CK) (0.1:0.15:0.2)))))
"#;
    let options = SdfReaderOptions {
        analysis_type: AnalysisType::BcWc,
        ..SdfReaderOptions::default()
    };
    read_sdf_text(sdf, "bcwc.sdf", options, &design.netlist, &mut design.graph).unwrap();
    let edge = find_edge(&design, "u2/CK", "u2/D", |r| r == TimingRole::Setup);
    // Setup copies max into the min slot.
    assert!((design.graph.arc_delay(edge, 0, 0) - 0.2e-9).abs() < 1e-15);
    assert!((design.graph.arc_delay(edge, 0, 1) - 0.2e-9).abs() < 1e-15);
}

#[test]
fn nochange_warns_not_supported() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "DFF1") (INSTANCE u2)
  (TIMINGCHECK (NOCHANGE D (posedge CK) (0.1) (0.1)))))
"#;
    let report = read_sdf_text(
        sdf,
        "nochange.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    assert!(
        report
            .messages()
            .iter()
            .any(|m| m.contains("NOCHANGE not supported"))
    );
}

#[test]
fn write_then_read_round_trips() {
    let library = build_library();
    let mut design = build_design(&library);
    read_sdf_text(
        SDF,
        "in.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();

    let options = SdfWriterOptions {
        digits: 6,
        design: Some("top".to_string()),
        ..SdfWriterOptions::default()
    };
    let text = write_sdf_string(options, &design.netlist, &design.graph);

    let mut replay = build_design(&library);
    let report = read_sdf_text(
        &text,
        "out.sdf",
        SdfReaderOptions::default(),
        &replay.netlist,
        &mut replay.graph,
    )
    .unwrap();
    assert_eq!(report.error_count(), 0);

    for (from, to, role_filter) in [
        ("u1/A", "u1/Z", (|r| r == TimingRole::Combinational) as fn(TimingRole) -> bool),
        ("u2/CK", "u2/Q", |r| r == TimingRole::RegClkToQ),
        ("u2/CK", "u2/D", |r| r == TimingRole::Setup),
        ("u2/CK", "u2/CK", |r| r == TimingRole::Width),
    ] {
        let edge = find_edge(&design, from, to, role_filter);
        let replay_edge = find_edge(&replay, from, to, role_filter);
        for arc in 0..2 {
            for slot in 0..2 {
                let annotated = design.graph.arc_delay_annotated(edge, arc, slot);
                assert_eq!(
                    replay.graph.arc_delay_annotated(replay_edge, arc, slot),
                    annotated,
                    "annotation flag differs on {from}->{to} arc {arc} slot {slot}"
                );
                if annotated {
                    let original = design.graph.arc_delay(edge, arc, slot);
                    let replayed = replay.graph.arc_delay(replay_edge, arc, slot);
                    assert!(
                        (original - replayed).abs() < 1e-15,
                        "delay differs on {from}->{to} arc {arc} slot {slot}: \
                         {original} vs {replayed}"
                    );
                }
            }
        }
    }

    let width_edge = find_edge(&design, "u2/CK", "u2/CK", |r| r == TimingRole::Width);
    assert!(design.graph.arc_delay_annotated(width_edge, 0, 0));
}

#[test]
fn missing_instance_warns_and_skips() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "BUF1") (INSTANCE nope)
  (DELAY (ABSOLUTE (IOPATH A Z (0.3))))))
"#;
    let report = read_sdf_text(
        sdf,
        "missing.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    assert!(report.warn_count() > 0);
    let edge = find_edge(&design, "u1/A", "u1/Z", |r| r == TimingRole::Combinational);
    assert!(!design.graph.arc_delay_annotated(edge, 0, 0));
}

#[test]
fn wildcard_instance_is_not_supported() {
    let library = build_library();
    let mut design = build_design(&library);
    let sdf = r#"
(DELAYFILE
 (TIMESCALE 1ns)
 (CELL (CELLTYPE "BUF1") (INSTANCE *)
  (DELAY (ABSOLUTE (IOPATH A Z (0.3))))))
"#;
    let report = read_sdf_text(
        sdf,
        "wild.sdf",
        SdfReaderOptions::default(),
        &design.netlist,
        &mut design.graph,
    )
    .unwrap();
    assert!(
        report
            .messages()
            .iter()
            .any(|m| m.contains("INSTANCE wildcards not supported"))
    );
}
