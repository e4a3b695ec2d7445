//! End-to-end reader tests over small Liberty sources.

use arclight_liberty::reader::LibertyReader;
use arclight_liberty::stmt::LibertyAttr;
use arclight_model::{
    FuncExpr, MinMax, PortDirection, RiseFall, TimingRole, TimingSense, TimingType,
};

const DEMO_LIB: &str = r#"
library (demo) {
  delay_model : table_lookup;
  time_unit : "1ns";
  voltage_unit : "1V";
  current_unit : "1mA";
  pulling_resistance_unit : "1kohm";
  capacitive_load_unit (1, pf);
  nom_process : 1.0;
  nom_voltage : 1.1;
  nom_temperature : 25.0;
  default_max_transition : 3.0;
  slew_lower_threshold_pct_rise : 20.0;
  slew_upper_threshold_pct_rise : 80.0;
  voltage_map (VDD, 1.1);
  voltage_map (VSS, 0.0);

  lu_table_template (delay_2x2) {
    variable_1 : input_net_transition;
    variable_2 : total_output_net_capacitance;
    index_1 ("0.0, 2.0");
    index_2 ("0.0, 4.0");
  }

  wire_load ("small") {
    resistance : 0.1;
    capacitance : 0.2;
    slope : 1.0;
    fanout_length (1, 10.0);
    fanout_length (3, 30.0);
  }

  wire_load_selection ("by_area") {
    wire_load_from_area (0, 100, "small");
  }

  operating_conditions (typical) {
    process : 1.0;
    voltage : 1.1;
    temperature : 25.0;
    tree_type : balanced_tree;
  }

  cell (BUF1) {
    area : 2.0;
    cell_leakage_power : 0.5;
    pin (A) {
      direction : input;
      capacitance : 0.01;
    }
    pin (Z) {
      direction : output;
      function : "A";
      max_capacitance : 0.4;
      timing () {
        related_pin : "A";
        timing_sense : positive_unate;
        cell_rise (delay_2x2) {
          values ("0.0, 4.0", "2.0, 6.0");
        }
        cell_fall (delay_2x2) {
          values ("0.0, 4.0", "2.0, 6.0");
        }
        rise_transition (delay_2x2) {
          values ("0.1, 0.2", "0.3, 0.4");
        }
        fall_transition (delay_2x2) {
          values ("0.1, 0.2", "0.3, 0.4");
        }
      }
    }
  }

  cell (DFF1) {
    area : 6.0;
    ff (IQ, IQN) {
      clocked_on : "CK";
      next_state : "D";
    }
    pin (CK) {
      direction : input;
      clock : true;
    }
    pin (D) {
      direction : input;
      timing () {
        related_pin : "CK";
        timing_type : setup_rising;
        rise_constraint (scalar) {
          values ("0.2");
        }
        fall_constraint (scalar) {
          values ("0.2");
        }
      }
    }
    pin (Q) {
      direction : output;
      function : "IQ";
      timing () {
        related_pin : "CK";
        timing_type : rising_edge;
        cell_rise (delay_2x2) {
          values ("0.0, 4.0", "2.0, 6.0");
        }
        cell_fall (delay_2x2) {
          values ("0.0, 4.0", "2.0, 6.0");
        }
      }
    }
    pin (IQ) {
      direction : internal;
    }
    pin (IQN) {
      direction : internal;
    }
  }
}
"#;

#[test]
fn units_scale_to_si() {
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(DEMO_LIB, "demo.lib").unwrap();
    assert_eq!(library.units().time_unit().scale(), 1e-9);
    assert_eq!(library.units().capacitance_unit().scale(), 1e-12);
    assert_eq!(library.units().resistance_unit().scale(), 1e3);
    // default_max_transition is in library time units.
    assert!((library.default_max_slew().unwrap() - 3.0e-9).abs() < 1e-15);
}

#[test]
fn functions_parse_after_end_cell() {
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(DEMO_LIB, "demo.lib").unwrap();
    let buf = library.cell(library.find_cell("BUF1").unwrap());
    let a = buf.find_port("A").unwrap();
    let z = buf.find_port("Z").unwrap();
    let function = buf.port(z).function().unwrap();
    assert!(FuncExpr::equiv(
        Some(function),
        Some(&FuncExpr::make_port(a))
    ));
    assert_eq!(function.port_timing_sense(a), TimingSense::PositiveUnate);
    assert!(buf.is_buffer());
    let (input, output) = buf.buffer_ports().unwrap();
    assert_eq!(buf.port(input).direction(), PortDirection::Input);
    assert_eq!(buf.port(output).direction(), PortDirection::Output);
}

#[test]
fn delay_tables_scale_and_interpolate() {
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(DEMO_LIB, "demo.lib").unwrap();
    let buf = library.cell(library.find_cell("BUF1").unwrap());
    let set = &buf.timing_arc_sets()[0];
    assert_eq!(set.role(), TimingRole::Combinational);
    assert_eq!(set.sense(), TimingSense::PositiveUnate);
    let arc = set.arc_to(RiseFall::Rise).unwrap();
    let gate = arc.gate_table_model().unwrap();
    let delay = gate.delay_model().unwrap();
    // Axis values scale by the time/cap units, table values by time.
    // Bilinear center of the spec scenario grid: 3.0 ns.
    let v = delay.find_value_unscaled(1.0e-9, 2.0e-12, 0.0);
    assert!((v - 3.0e-9).abs() < 1e-13);
}

#[test]
fn sequential_cells_and_checks() {
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(DEMO_LIB, "demo.lib").unwrap();
    let dff = library.cell(library.find_cell("DFF1").unwrap());
    assert!(dff.has_sequentials());
    let seq = &dff.sequentials()[0];
    assert!(seq.is_register());
    let ck = dff.find_port("CK").unwrap();
    let d = dff.find_port("D").unwrap();
    assert!(dff.port(ck).is_clock);
    assert!(dff.port(ck).is_check_clk);
    // Setup check from CK rise to D.
    let setup = dff
        .timing_arc_sets()
        .iter()
        .find(|set| set.role() == TimingRole::Setup)
        .unwrap();
    assert_eq!(setup.from(), Some(ck));
    assert_eq!(setup.to(), Some(d));
    assert_eq!(setup.attrs().timing_type, Some(TimingType::SetupRising));
    // Clk-to-Q arcs exist and leave the rising clock edge.
    let clk_to_q = dff
        .timing_arc_sets()
        .iter()
        .find(|set| set.role() == TimingRole::RegClkToQ)
        .unwrap();
    for arc in clk_to_q.arcs() {
        assert_eq!(arc.from_edge().as_rise_fall(), Some(RiseFall::Rise));
    }
}

#[test]
fn wireloads_and_opconds_register() {
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(DEMO_LIB, "demo.lib").unwrap();
    let wireload = library.find_wireload("small").unwrap();
    assert_eq!(wireload.find_length(2.0), 20.0);
    let selection = library.find_wireload_selection("by_area").unwrap();
    assert_eq!(selection.find_wireload_name(50.0), Some("small"));
    let op_cond = library.find_operating_conditions("typical").unwrap();
    assert!((op_cond.pvt().voltage() - 1.1).abs() < 1e-6);
    assert!(library.supply_exists("VDD"));
    assert!(!library.supply_exists("VPP"));
}

#[test]
fn unknown_groups_and_attrs_are_skipped() {
    let src = r#"
library (demo) {
  mystery_attr : 42;
  mystery_group (x) {
    inner : "keep going";
  }
  cell (B) {
    pin (A) { direction : input; }
  }
}
"#;
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(src, "demo.lib").unwrap();
    assert!(library.find_cell("B").is_some());
    assert_eq!(reader.report().error_count(), 0);
}

#[test]
fn bad_function_warns_and_leaves_none() {
    let src = r#"
library (demo) {
  cell (B) {
    pin (A) { direction : input; }
    pin (Z) {
      direction : output;
      function : "A * MISSING";
    }
  }
}
"#;
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(src, "demo.lib").unwrap();
    let cell = library.cell(library.find_cell("B").unwrap());
    let z = cell.find_port("Z").unwrap();
    assert!(cell.port(z).function().is_none());
    assert!(reader.report().warn_count() > 0);
    assert!(
        reader
            .report()
            .messages()
            .iter()
            .any(|m| m.contains("MISSING"))
    );
}

#[test]
fn bus_ports_expand_related_pins() {
    let src = r#"
library (demo) {
  type (bus4) {
    base_type : array;
    data_type : bit;
    bit_width : 4;
    bit_from : 3;
    bit_to : 0;
  }
  cell (MUX) {
    bus (D) {
      bus_type : bus4;
      direction : input;
      capacitance : 0.02;
    }
    pin (Z) {
      direction : output;
      timing () {
        related_pin : "D";
        timing_sense : non_unate;
        intrinsic_rise : 0.3;
        intrinsic_fall : 0.4;
      }
    }
  }
}
"#;
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(src, "demo.lib").unwrap();
    let cell = library.cell(library.find_cell("MUX").unwrap());
    let bus = cell.find_port("D").unwrap();
    assert!(cell.port(bus).is_bus());
    assert_eq!(cell.port(bus).size(), 4);
    // One arc set per bus bit.
    let z = cell.find_port("Z").unwrap();
    let sets: Vec<_> = cell
        .timing_arc_sets()
        .iter()
        .filter(|set| set.to() == Some(z))
        .collect();
    assert_eq!(sets.len(), 4);
    for (i, set) in sets.iter().enumerate() {
        assert_eq!(set.index(), i);
        assert_eq!(set.role(), TimingRole::Combinational);
        // Intrinsic-only arcs carry linear models.
        let arc = set.arcs().first().unwrap();
        assert!(arc.intrinsic_delay() > 0.0);
    }
    // Bit caps picked up the bus capacitance.
    let bit = cell.find_port("D[2]").unwrap();
    assert!((cell.port(bit).capacitance_min_max(MinMax::Max) - 0.02e-12).abs() < 1e-18);
}

#[test]
fn extension_visitors_claim_vendor_attrs() {
    fn thingy(reader: &mut LibertyReader, attr: &LibertyAttr) {
        reader.visit_attr1(attr);
    }
    let src = r#"
library (demo) {
  cell (B) {
    thingy : "frobbed";
    pin (A) { direction : input; }
  }
}
"#;
    let mut reader = LibertyReader::new(false);
    reader.define_attr_visitor("thingy", thingy);
    let _library = reader.read_liberty_text(src, "demo.lib").unwrap();
    assert_eq!(
        reader.extension_values().get("thingy").map(String::as_str),
        Some("frobbed")
    );
}

#[test]
fn scaling_factor_groups_parse_k_attrs() {
    let src = r#"
library (demo) {
  scaling_factors (ss) {
    k_temp_cell_rise : 0.0012;
    k_temp_cell_fall : 0.0010;
    k_volt_rise_transition : -0.2;
    k_process_min_pulse_width_high : 0.1;
  }
  default_scaling_factors : ss;
  cell (B) { pin (A) { direction : input; } }
}
"#;
    let mut reader = LibertyReader::new(false);
    let library = reader.read_liberty_text(src, "demo.lib").unwrap();
    let factors = library.find_scale_factors("ss").unwrap();
    use arclight_model::{ScaleFactorPvt, ScaleFactorType};
    assert_eq!(
        factors.scale(ScaleFactorType::Cell, ScaleFactorPvt::Temp, RiseFall::Rise),
        0.0012
    );
    assert_eq!(
        factors.scale(
            ScaleFactorType::Transition,
            ScaleFactorPvt::Volt,
            RiseFall::Rise
        ),
        -0.2
    );
    assert_eq!(
        factors.scale(
            ScaleFactorType::MinPulseWidth,
            ScaleFactorPvt::Process,
            RiseFall::Rise
        ),
        0.1
    );
}
