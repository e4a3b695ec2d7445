//! Model construction on behalf of the reader.
//!
//! The builder owns the rise/fall edge mapping rules per timing role: the
//! reader hands it a destination port and the accumulated arc attributes,
//! and it produces the right arc set shape for the timing type. Embedders
//! that need vendor-specific model objects wrap these entry points.

use arclight_common::{RiseFall, Transition};
use arclight_model::{
    ArcSetId, InternalPower, InternalPowerAttrs, LeakagePower, LeakagePowerAttrs, LibertyCell,
    PortDirection, PortId, TimingArcAttrs, TimingArcSet, TimingRole, TimingSense, TimingType,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LibertyBuilder;

impl LibertyBuilder {
    pub fn new() -> Self {
        LibertyBuilder
    }

    pub fn make_cell(&self, name: &str, filename: &str) -> LibertyCell {
        LibertyCell::new(name, filename)
    }

    pub fn make_port(&self, cell: &mut LibertyCell, name: &str) -> PortId {
        cell.add_port(name, PortDirection::Unknown)
    }

    pub fn make_bus_port(
        &self,
        cell: &mut LibertyCell,
        name: &str,
        from: i32,
        to: i32,
    ) -> PortId {
        cell.add_bus_port(name, from, to, PortDirection::Unknown)
    }

    pub fn make_bundle_port(
        &self,
        cell: &mut LibertyCell,
        name: &str,
        members: Vec<PortId>,
    ) -> PortId {
        cell.add_bundle_port(name, members)
    }

    pub fn make_internal_power(
        &self,
        cell: &mut LibertyCell,
        port: PortId,
        related_port: Option<PortId>,
        attrs: InternalPowerAttrs,
    ) {
        cell.add_internal_power(InternalPower::new(port, related_port, attrs));
    }

    pub fn make_leakage_power(&self, cell: &mut LibertyCell, attrs: LeakagePowerAttrs) {
        cell.add_leakage_power(LeakagePower::new(attrs));
    }

    /// Build a timing arc set from accumulated attributes, choosing the
    /// role and edge mapping by timing type.
    pub fn make_timing_arcs(
        &self,
        cell: &mut LibertyCell,
        from_port: Option<PortId>,
        to_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
    ) -> Option<ArcSetId> {
        let timing_type = attrs.timing_type.unwrap_or(TimingType::Combinational);
        match timing_type {
            TimingType::Combinational => {
                self.make_combinational(cell, from_port?, to_port, related_out, attrs, true, true)
            }
            TimingType::CombinationalRise => {
                self.make_combinational(cell, from_port?, to_port, related_out, attrs, true, false)
            }
            TimingType::CombinationalFall => {
                self.make_combinational(cell, from_port?, to_port, related_out, attrs, false, true)
            }
            TimingType::ThreeStateEnable => {
                self.make_tristate(cell, from_port?, to_port, related_out, attrs, true, true, true)
            }
            TimingType::ThreeStateEnableRise => self.make_tristate(
                cell, from_port?, to_port, related_out, attrs, true, true, false,
            ),
            TimingType::ThreeStateEnableFall => self.make_tristate(
                cell, from_port?, to_port, related_out, attrs, true, false, true,
            ),
            TimingType::ThreeStateDisable => self.make_tristate(
                cell, from_port?, to_port, related_out, attrs, false, true, true,
            ),
            TimingType::ThreeStateDisableRise => self.make_tristate(
                cell, from_port?, to_port, related_out, attrs, false, true, false,
            ),
            TimingType::ThreeStateDisableFall => self.make_tristate(
                cell, from_port?, to_port, related_out, attrs, false, false, true,
            ),
            TimingType::RisingEdge => {
                self.make_edge_triggered(cell, from_port?, to_port, related_out, attrs, RiseFall::Rise)
            }
            TimingType::FallingEdge => {
                self.make_edge_triggered(cell, from_port?, to_port, related_out, attrs, RiseFall::Fall)
            }
            TimingType::Preset => {
                self.make_preset_clr(cell, from_port?, to_port, related_out, attrs, RiseFall::Rise)
            }
            TimingType::Clear => {
                self.make_preset_clr(cell, from_port?, to_port, related_out, attrs, RiseFall::Fall)
            }
            TimingType::SetupRising => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Setup, RiseFall::Rise,
            ),
            TimingType::SetupFalling => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Setup, RiseFall::Fall,
            ),
            TimingType::HoldRising => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Hold, RiseFall::Rise,
            ),
            TimingType::HoldFalling => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Hold, RiseFall::Fall,
            ),
            TimingType::RecoveryRising => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Recovery, RiseFall::Rise,
            ),
            TimingType::RecoveryFalling => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Recovery, RiseFall::Fall,
            ),
            TimingType::RemovalRising => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Removal, RiseFall::Rise,
            ),
            TimingType::RemovalFalling => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Removal, RiseFall::Fall,
            ),
            TimingType::SkewRising => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Skew, RiseFall::Rise,
            ),
            TimingType::SkewFalling => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::Skew, RiseFall::Fall,
            ),
            TimingType::NonSeqSetupRising => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::NonSeqSetup,
                RiseFall::Rise,
            ),
            TimingType::NonSeqSetupFalling => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::NonSeqSetup,
                RiseFall::Fall,
            ),
            TimingType::NonSeqHoldRising => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::NonSeqHold,
                RiseFall::Rise,
            ),
            TimingType::NonSeqHoldFalling => self.make_check(
                cell, from_port?, to_port, related_out, attrs, TimingRole::NonSeqHold,
                RiseFall::Fall,
            ),
            TimingType::MinPulseWidth => self.make_same_edge_arcs(
                cell,
                from_port.unwrap_or(to_port),
                to_port,
                related_out,
                attrs,
                TimingRole::Width,
            ),
            TimingType::MinimumPeriod => self.make_same_edge_arcs(
                cell,
                from_port.unwrap_or(to_port),
                to_port,
                related_out,
                attrs,
                TimingRole::Period,
            ),
            TimingType::MaxClockTreePath => self.make_same_edge_arcs(
                cell,
                from_port.unwrap_or(to_port),
                to_port,
                related_out,
                attrs,
                TimingRole::ClockTreePathMax,
            ),
            TimingType::MinClockTreePath => self.make_same_edge_arcs(
                cell,
                from_port.unwrap_or(to_port),
                to_port,
                related_out,
                attrs,
                TimingRole::ClockTreePathMin,
            ),
            TimingType::NochangeHighHigh => self.make_nochange(
                cell, from_port?, to_port, related_out, attrs, RiseFall::Rise, RiseFall::Rise,
            ),
            TimingType::NochangeHighLow => self.make_nochange(
                cell, from_port?, to_port, related_out, attrs, RiseFall::Rise, RiseFall::Fall,
            ),
            TimingType::NochangeLowHigh => self.make_nochange(
                cell, from_port?, to_port, related_out, attrs, RiseFall::Fall, RiseFall::Rise,
            ),
            TimingType::NochangeLowLow => self.make_nochange(
                cell, from_port?, to_port, related_out, attrs, RiseFall::Fall, RiseFall::Fall,
            ),
            TimingType::Unknown => None,
        }
    }

    /// Unateness for delay arcs: explicit attribute first, then the cond
    /// expression, then the destination port function.
    fn arc_sense(
        &self,
        cell: &LibertyCell,
        from_port: PortId,
        to_port: PortId,
        attrs: &TimingArcAttrs,
    ) -> TimingSense {
        let sense = attrs.timing_sense.unwrap_or_else(|| {
            attrs
                .cond
                .as_ref()
                .map(|cond| cond.port_timing_sense(from_port))
                .filter(|s| {
                    matches!(s, TimingSense::PositiveUnate | TimingSense::NegativeUnate)
                })
                .unwrap_or_else(|| {
                    cell.port(to_port)
                        .function()
                        .map(|f| f.port_timing_sense(from_port))
                        .unwrap_or(TimingSense::Unknown)
                })
        });
        match sense {
            TimingSense::PositiveUnate | TimingSense::NegativeUnate => sense,
            _ => TimingSense::NonUnate,
        }
    }

    /// A latch output driven combinationally from its data pin is a
    /// D-to-Q arc, not a plain combinational one.
    fn latch_d_to_q_role(
        &self,
        cell: &LibertyCell,
        from_port: PortId,
        to_port: PortId,
    ) -> TimingRole {
        for seq in cell.sequentials() {
            if seq.is_latch()
                && (seq.out_port() == Some(to_port) || seq.out_inv_port() == Some(to_port))
                && seq.data().is_some_and(|d| d.has_port(from_port))
            {
                return TimingRole::LatchDToQ;
            }
        }
        TimingRole::Combinational
    }

    #[allow(clippy::too_many_arguments)]
    fn make_combinational(
        &self,
        cell: &mut LibertyCell,
        from_port: PortId,
        to_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        to_rise: bool,
        to_fall: bool,
    ) -> Option<ArcSetId> {
        let sense = self.arc_sense(cell, from_port, to_port, &attrs);
        let role = self.latch_d_to_q_role(cell, from_port, to_port);
        let rise_model = attrs.model(RiseFall::Rise).cloned();
        let fall_model = attrs.model(RiseFall::Fall).cloned();
        let mut set = TimingArcSet::new(Some(from_port), Some(to_port), related_out, role, attrs);
        match sense {
            TimingSense::PositiveUnate => {
                if to_rise {
                    set.add_arc(Transition::Rise, Transition::Rise, rise_model);
                }
                if to_fall {
                    set.add_arc(Transition::Fall, Transition::Fall, fall_model);
                }
            }
            TimingSense::NegativeUnate => {
                if to_rise {
                    set.add_arc(Transition::Fall, Transition::Rise, rise_model);
                }
                if to_fall {
                    set.add_arc(Transition::Rise, Transition::Fall, fall_model);
                }
            }
            _ => {
                if to_rise {
                    set.add_arc(Transition::Rise, Transition::Rise, rise_model.clone());
                    set.add_arc(Transition::Fall, Transition::Rise, rise_model);
                }
                if to_fall {
                    set.add_arc(Transition::Rise, Transition::Fall, fall_model.clone());
                    set.add_arc(Transition::Fall, Transition::Fall, fall_model);
                }
            }
        }
        Some(cell.add_timing_arc_set(set))
    }

    /// Tristate arcs run between Z and a driven value. Enable arcs end at
    /// Z1/Z0, disable arcs at 0Z/1Z; the rise/fall model follows the
    /// projection of the destination edge.
    #[allow(clippy::too_many_arguments)]
    fn make_tristate(
        &self,
        cell: &mut LibertyCell,
        from_port: PortId,
        to_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        enable: bool,
        to_rise: bool,
        to_fall: bool,
    ) -> Option<ArcSetId> {
        let sense = self.arc_sense(cell, from_port, to_port, &attrs);
        let role = if enable {
            TimingRole::TristateEnable
        } else {
            TimingRole::TristateDisable
        };
        let rise_model = attrs.model(RiseFall::Rise).cloned();
        let fall_model = attrs.model(RiseFall::Fall).cloned();
        let (rise_to, fall_to) = if enable {
            (Transition::TrZ1, Transition::TrZ0)
        } else {
            (Transition::Tr0Z, Transition::Tr1Z)
        };
        let mut set = TimingArcSet::new(Some(from_port), Some(to_port), related_out, role, attrs);
        let mut add = |from: Transition, to: Transition, model: Option<_>| {
            set.add_arc(from, to, model);
        };
        match sense {
            TimingSense::PositiveUnate => {
                if to_rise {
                    add(Transition::Rise, rise_to, rise_model);
                }
                if to_fall {
                    add(Transition::Fall, fall_to, fall_model);
                }
            }
            TimingSense::NegativeUnate => {
                if to_rise {
                    add(Transition::Fall, rise_to, rise_model);
                }
                if to_fall {
                    add(Transition::Rise, fall_to, fall_model);
                }
            }
            _ => {
                if to_rise {
                    add(Transition::Rise, rise_to, rise_model.clone());
                    add(Transition::Fall, rise_to, rise_model);
                }
                if to_fall {
                    add(Transition::Rise, fall_to, fall_model.clone());
                    add(Transition::Fall, fall_to, fall_model);
                }
            }
        }
        Some(cell.add_timing_arc_set(set))
    }

    /// `rising_edge`/`falling_edge` clock-to-output arcs. A latch whose
    /// enable is the source port gets the En-to-Q role instead of
    /// clock-to-Q.
    fn make_edge_triggered(
        &self,
        cell: &mut LibertyCell,
        from_port: PortId,
        to_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        from_rf: RiseFall,
    ) -> Option<ArcSetId> {
        let is_latch_enable = cell.sequentials().iter().any(|seq| {
            seq.is_latch()
                && (seq.out_port() == Some(to_port) || seq.out_inv_port() == Some(to_port))
                && seq.clock().is_some_and(|c| c.has_port(from_port))
        });
        let role = if is_latch_enable {
            TimingRole::LatchEnToQ
        } else {
            TimingRole::RegClkToQ
        };
        cell.port_mut(from_port).is_reg_clk = true;
        cell.port_mut(to_port).is_reg_output = true;
        let id = self.make_from_transition_arcs(cell, from_port, to_port, related_out, attrs, role, from_rf);
        Some(id)
    }

    fn make_preset_clr(
        &self,
        cell: &mut LibertyCell,
        from_port: PortId,
        to_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        to_rf: RiseFall,
    ) -> Option<ArcSetId> {
        let sense = self.arc_sense(cell, from_port, to_port, &attrs);
        let model = attrs.model(to_rf).cloned();
        let mut set = TimingArcSet::new(
            Some(from_port),
            Some(to_port),
            related_out,
            TimingRole::RegSetClr,
            attrs,
        );
        match sense {
            TimingSense::PositiveUnate => {
                set.add_arc(Transition::Rise, to_rf.as_transition(), model);
            }
            TimingSense::NegativeUnate => {
                set.add_arc(Transition::Fall, to_rf.as_transition(), model);
            }
            _ => {
                set.add_arc(Transition::Rise, to_rf.as_transition(), model.clone());
                set.add_arc(Transition::Fall, to_rf.as_transition(), model);
            }
        }
        Some(cell.add_timing_arc_set(set))
    }

    #[allow(clippy::too_many_arguments)]
    fn make_check(
        &self,
        cell: &mut LibertyCell,
        clk_port: PortId,
        data_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        role: TimingRole,
        clk_rf: RiseFall,
    ) -> Option<ArcSetId> {
        cell.port_mut(clk_port).is_check_clk = true;
        if role.generic_role() == TimingRole::Setup && cell.has_sequentials() {
            let is_latch_data = cell
                .sequentials()
                .iter()
                .any(|seq| seq.is_latch() && seq.data().is_some_and(|d| d.has_port(data_port)));
            if is_latch_data {
                cell.port_mut(data_port).is_latch_data = true;
            }
        }
        let id = self.make_from_transition_arcs(
            cell, clk_port, data_port, related_out, attrs, role, clk_rf,
        );
        Some(id)
    }

    /// Arcs from one source edge to both destination edges, models chosen
    /// by the destination.
    #[allow(clippy::too_many_arguments)]
    fn make_from_transition_arcs(
        &self,
        cell: &mut LibertyCell,
        from_port: PortId,
        to_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        role: TimingRole,
        from_rf: RiseFall,
    ) -> ArcSetId {
        let rise_model = attrs.model(RiseFall::Rise).cloned();
        let fall_model = attrs.model(RiseFall::Fall).cloned();
        let mut set = TimingArcSet::new(Some(from_port), Some(to_port), related_out, role, attrs);
        let from: Transition = from_rf.as_transition();
        let neither = rise_model.is_none() && fall_model.is_none();
        if rise_model.is_some() || neither {
            set.add_arc(from, Transition::Rise, rise_model);
        }
        if fall_model.is_some() || neither {
            set.add_arc(from, Transition::Fall, fall_model);
        }
        cell.add_timing_arc_set(set)
    }

    /// Same-edge arc pairs (rise→rise, fall→fall) for width/period and
    /// clock-tree-path sets.
    fn make_same_edge_arcs(
        &self,
        cell: &mut LibertyCell,
        from_port: PortId,
        to_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        role: TimingRole,
    ) -> Option<ArcSetId> {
        let rise_model = attrs.model(RiseFall::Rise).cloned();
        let fall_model = attrs.model(RiseFall::Fall).cloned();
        let mut set = TimingArcSet::new(Some(from_port), Some(to_port), related_out, role, attrs);
        set.add_arc(Transition::Rise, Transition::Rise, rise_model);
        set.add_arc(Transition::Fall, Transition::Fall, fall_model);
        Some(cell.add_timing_arc_set(set))
    }

    #[allow(clippy::too_many_arguments)]
    fn make_nochange(
        &self,
        cell: &mut LibertyCell,
        clk_port: PortId,
        data_port: PortId,
        related_out: Option<PortId>,
        attrs: TimingArcAttrs,
        clk_rf: RiseFall,
        data_rf: RiseFall,
    ) -> Option<ArcSetId> {
        let model = attrs.model(data_rf).cloned();
        let mut set = TimingArcSet::new(
            Some(clk_port),
            Some(data_port),
            related_out,
            TimingRole::Nochange,
            attrs,
        );
        set.add_arc(clk_rf.as_transition(), data_rf.as_transition(), model);
        Some(cell.add_timing_arc_set(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arclight_model::{FuncExpr, Transition, wire_arc_set};

    fn cell_with_ports() -> (LibertyCell, PortId, PortId) {
        let mut cell = LibertyCell::new("X", "test.lib");
        let a = cell.add_port("A", PortDirection::Input);
        let z = cell.add_port("Z", PortDirection::Output);
        (cell, a, z)
    }

    #[test]
    fn positive_unate_combinational() {
        let (mut cell, a, z) = cell_with_ports();
        let attrs = TimingArcAttrs {
            timing_sense: Some(TimingSense::PositiveUnate),
            ..TimingArcAttrs::default()
        };
        let builder = LibertyBuilder::new();
        let id = builder.make_timing_arcs(&mut cell, Some(a), z, None, attrs).unwrap();
        let set = cell.timing_arc_set(id);
        assert_eq!(set.role(), TimingRole::Combinational);
        assert_eq!(set.arc_count(), 2);
        assert_eq!(set.arc(0).from_edge(), Transition::Rise);
        assert_eq!(set.arc(0).to_edge(), Transition::Rise);
        assert_eq!(set.arc(1).from_edge(), Transition::Fall);
        assert_eq!(set.arc(1).to_edge(), Transition::Fall);
    }

    #[test]
    fn function_supplies_sense() {
        let (mut cell, a, z) = cell_with_ports();
        cell.port_mut(z)
            .set_function(FuncExpr::make_not(FuncExpr::make_port(a)));
        let builder = LibertyBuilder::new();
        let id = builder
            .make_timing_arcs(&mut cell, Some(a), z, None, TimingArcAttrs::default())
            .unwrap();
        let set = cell.timing_arc_set(id);
        assert_eq!(set.sense(), TimingSense::NegativeUnate);
    }

    #[test]
    fn non_unate_makes_four_arcs() {
        let (mut cell, a, z) = cell_with_ports();
        let attrs = TimingArcAttrs {
            timing_sense: Some(TimingSense::NonUnate),
            ..TimingArcAttrs::default()
        };
        let builder = LibertyBuilder::new();
        let id = builder.make_timing_arcs(&mut cell, Some(a), z, None, attrs).unwrap();
        assert_eq!(cell.timing_arc_set(id).arc_count(), 4);
    }

    #[test]
    fn rising_edge_marks_clock_and_output() {
        let (mut cell, clk, q) = cell_with_ports();
        let attrs = TimingArcAttrs {
            timing_type: Some(TimingType::RisingEdge),
            ..TimingArcAttrs::default()
        };
        let builder = LibertyBuilder::new();
        let id = builder.make_timing_arcs(&mut cell, Some(clk), q, None, attrs).unwrap();
        let set = cell.timing_arc_set(id);
        assert_eq!(set.role(), TimingRole::RegClkToQ);
        assert!(cell.port(clk).is_reg_clk);
        assert!(cell.port(q).is_reg_output);
        for arc in set.arcs() {
            assert_eq!(arc.from_edge(), Transition::Rise);
        }
    }

    #[test]
    fn setup_checks_come_from_the_clock_edge() {
        let (mut cell, clk, d) = cell_with_ports();
        let attrs = TimingArcAttrs {
            timing_type: Some(TimingType::SetupRising),
            ..TimingArcAttrs::default()
        };
        let builder = LibertyBuilder::new();
        let id = builder.make_timing_arcs(&mut cell, Some(clk), d, None, attrs).unwrap();
        let set = cell.timing_arc_set(id);
        assert_eq!(set.role(), TimingRole::Setup);
        assert!(cell.port(clk).is_check_clk);
        assert!(set.arcs().iter().all(|a| a.from_edge() == Transition::Rise));
    }

    #[test]
    fn tristate_enable_uses_z_edges() {
        let (mut cell, en, z) = cell_with_ports();
        let attrs = TimingArcAttrs {
            timing_type: Some(TimingType::ThreeStateEnable),
            timing_sense: Some(TimingSense::PositiveUnate),
            ..TimingArcAttrs::default()
        };
        let builder = LibertyBuilder::new();
        let id = builder.make_timing_arcs(&mut cell, Some(en), z, None, attrs).unwrap();
        let set = cell.timing_arc_set(id);
        assert_eq!(set.role(), TimingRole::TristateEnable);
        let edges: Vec<_> = set.arcs().iter().map(|a| a.to_edge()).collect();
        assert!(edges.contains(&Transition::TrZ1));
        assert!(edges.contains(&Transition::TrZ0));
    }

    #[test]
    fn wire_arc_set_is_not_a_cell_set() {
        assert_eq!(wire_arc_set().role(), TimingRole::Wire);
    }
}
