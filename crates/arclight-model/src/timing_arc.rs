//! Timing arc sets and arcs.
//!
//! An arc set groups the arcs that share `(from port, to port, related
//! output port, role, attributes)`. Arcs are the concrete transition pairs
//! inside a set; each references the timing model for its destination edge.

use std::cmp::Ordering;
use std::sync::Arc;

use arclight_common::{RiseFall, Transition};
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::func_expr::FuncExpr;
use crate::library::{LibertyCell, PortId};
use crate::timing_model::TimingModel;
use crate::timing_role::TimingRole;

/// Unateness of an arc or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingSense {
    PositiveUnate,
    NegativeUnate,
    NonUnate,
    None_,
    Unknown,
}

impl TimingSense {
    pub fn find(name: &str) -> Option<Self> {
        match name {
            "positive_unate" => Some(Self::PositiveUnate),
            "negative_unate" => Some(Self::NegativeUnate),
            "non_unate" => Some(Self::NonUnate),
            "none" => Some(Self::None_),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::PositiveUnate => "positive_unate",
            Self::NegativeUnate => "negative_unate",
            Self::NonUnate => "non_unate",
            Self::None_ => "none",
            Self::Unknown => "unknown",
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::PositiveUnate => Self::NegativeUnate,
            Self::NegativeUnate => Self::PositiveUnate,
            other => other,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::PositiveUnate => 0,
            Self::NegativeUnate => 1,
            Self::NonUnate => 2,
            Self::None_ => 3,
            Self::Unknown => 4,
        }
    }
}

/// Liberty `timing_type` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingType {
    Combinational,
    CombinationalRise,
    CombinationalFall,
    ThreeStateDisable,
    ThreeStateDisableRise,
    ThreeStateDisableFall,
    ThreeStateEnable,
    ThreeStateEnableRise,
    ThreeStateEnableFall,
    RisingEdge,
    FallingEdge,
    Preset,
    Clear,
    HoldRising,
    HoldFalling,
    SetupRising,
    SetupFalling,
    RecoveryRising,
    RecoveryFalling,
    RemovalRising,
    RemovalFalling,
    SkewRising,
    SkewFalling,
    MinPulseWidth,
    MinimumPeriod,
    MaxClockTreePath,
    MinClockTreePath,
    NonSeqSetupRising,
    NonSeqSetupFalling,
    NonSeqHoldRising,
    NonSeqHoldFalling,
    NochangeHighHigh,
    NochangeHighLow,
    NochangeLowHigh,
    NochangeLowLow,
    Unknown,
}

impl TimingType {
    pub fn find(name: &str) -> Option<Self> {
        match name {
            "combinational" => Some(Self::Combinational),
            "combinational_rise" => Some(Self::CombinationalRise),
            "combinational_fall" => Some(Self::CombinationalFall),
            "three_state_disable" => Some(Self::ThreeStateDisable),
            "three_state_disable_rise" => Some(Self::ThreeStateDisableRise),
            "three_state_disable_fall" => Some(Self::ThreeStateDisableFall),
            "three_state_enable" => Some(Self::ThreeStateEnable),
            "three_state_enable_rise" => Some(Self::ThreeStateEnableRise),
            "three_state_enable_fall" => Some(Self::ThreeStateEnableFall),
            "rising_edge" => Some(Self::RisingEdge),
            "falling_edge" => Some(Self::FallingEdge),
            "preset" => Some(Self::Preset),
            "clear" => Some(Self::Clear),
            "hold_rising" => Some(Self::HoldRising),
            "hold_falling" => Some(Self::HoldFalling),
            "setup_rising" => Some(Self::SetupRising),
            "setup_falling" => Some(Self::SetupFalling),
            "recovery_rising" => Some(Self::RecoveryRising),
            "recovery_falling" => Some(Self::RecoveryFalling),
            "removal_rising" => Some(Self::RemovalRising),
            "removal_falling" => Some(Self::RemovalFalling),
            "skew_rising" => Some(Self::SkewRising),
            "skew_falling" => Some(Self::SkewFalling),
            "min_pulse_width" => Some(Self::MinPulseWidth),
            "minimum_period" => Some(Self::MinimumPeriod),
            "max_clock_tree_path" => Some(Self::MaxClockTreePath),
            "min_clock_tree_path" => Some(Self::MinClockTreePath),
            "non_seq_setup_rising" => Some(Self::NonSeqSetupRising),
            "non_seq_setup_falling" => Some(Self::NonSeqSetupFalling),
            "non_seq_hold_rising" => Some(Self::NonSeqHoldRising),
            "non_seq_hold_falling" => Some(Self::NonSeqHoldFalling),
            "nochange_high_high" => Some(Self::NochangeHighHigh),
            "nochange_high_low" => Some(Self::NochangeHighLow),
            "nochange_low_high" => Some(Self::NochangeLowHigh),
            "nochange_low_low" => Some(Self::NochangeLowLow),
            _ => None,
        }
    }

    pub const fn is_check(self) -> bool {
        matches!(
            self,
            Self::HoldRising
                | Self::HoldFalling
                | Self::SetupRising
                | Self::SetupFalling
                | Self::RecoveryRising
                | Self::RecoveryFalling
                | Self::RemovalRising
                | Self::RemovalFalling
                | Self::SkewRising
                | Self::SkewFalling
                | Self::MinPulseWidth
                | Self::MinimumPeriod
                | Self::NonSeqSetupRising
                | Self::NonSeqSetupFalling
                | Self::NonSeqHoldRising
                | Self::NonSeqHoldFalling
                | Self::NochangeHighHigh
                | Self::NochangeHighLow
                | Self::NochangeLowHigh
                | Self::NochangeLowLow
        )
    }
}

/// Attributes shared by all arcs of an arc set.
#[derive(Debug, Clone, Default)]
pub struct TimingArcAttrs {
    pub timing_type: Option<TimingType>,
    pub timing_sense: Option<TimingSense>,
    pub cond: Option<FuncExpr>,
    pub sdf_cond: Option<String>,
    pub sdf_cond_start: Option<String>,
    pub sdf_cond_end: Option<String>,
    pub mode_name: Option<String>,
    pub mode_value: Option<String>,
    pub ocv_arc_depth: Option<f32>,
    /// Per-destination-edge models, indexed by `RiseFall`.
    pub models: [Option<Arc<TimingModel>>; RiseFall::COUNT],
}

impl TimingArcAttrs {
    pub fn model(&self, rf: RiseFall) -> Option<&Arc<TimingModel>> {
        self.models[rf.index()].as_ref()
    }

    pub fn set_model(&mut self, rf: RiseFall, model: Arc<TimingModel>) {
        self.models[rf.index()] = Some(model);
    }

    fn order_key(&self) -> (usize, usize, &Option<String>, &Option<String>, &Option<String>) {
        (
            self.timing_type.map_or(usize::MAX, |t| t as usize),
            self.timing_sense.map_or(usize::MAX, |s| s.index()),
            &self.sdf_cond,
            &self.mode_name,
            &self.mode_value,
        )
    }
}

/// One concrete transition pair inside an arc set.
#[derive(Debug, Clone)]
pub struct TimingArc {
    from_edge: Transition,
    to_edge: Transition,
    model: Option<Arc<TimingModel>>,
    index: usize,
}

impl TimingArc {
    pub fn from_edge(&self) -> Transition {
        self.from_edge
    }

    pub fn to_edge(&self) -> Transition {
        self.to_edge
    }

    pub fn model(&self) -> Option<&Arc<TimingModel>> {
        self.model.as_ref()
    }

    /// Index of this arc within its owning set.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Unateness implied by the edge pair; checks have no sense.
    pub fn sense(&self, role: TimingRole) -> TimingSense {
        if role.is_timing_check() {
            TimingSense::None_
        } else {
            match (self.from_edge.as_rise_fall(), self.to_edge.as_rise_fall()) {
                (Some(f), Some(t)) if f == t => TimingSense::PositiveUnate,
                (Some(_), Some(_)) => TimingSense::NegativeUnate,
                _ => TimingSense::NonUnate,
            }
        }
    }

    pub fn drive_resistance(&self) -> f32 {
        self.model
            .as_ref()
            .map_or(0.0, |m| m.drive_resistance())
    }

    pub fn intrinsic_delay(&self) -> f32 {
        self.model.as_ref().map_or(0.0, |m| m.intrinsic_delay())
    }

    pub fn gate_table_model(&self) -> Option<&crate::timing_model::GateTableModel> {
        match self.model.as_deref() {
            Some(TimingModel::GateTable(model)) => Some(model),
            _ => None,
        }
    }

    /// Structural equivalence: same edges and same model object.
    pub fn equiv(a: &TimingArc, b: &TimingArc) -> bool {
        a.from_edge == b.from_edge
            && a.to_edge == b.to_edge
            && match (&a.model, &b.model) {
                (None, None) => true,
                (Some(ma), Some(mb)) => Arc::ptr_eq(ma, mb),
                _ => false,
            }
    }

    pub fn to_string(&self, cell: &LibertyCell, set: &TimingArcSet) -> String {
        let from = set
            .from()
            .map_or_else(|| "-".to_string(), |p| cell.port(p).name().to_string());
        let to = set
            .to()
            .map_or_else(|| "-".to_string(), |p| cell.port(p).name().to_string());
        format!("{from} {} -> {to} {}", self.from_edge, self.to_edge)
    }
}

/// Reserved arc indices inside the wire arc set.
pub const WIRE_ARC_INDEX_RISE: usize = 0;
pub const WIRE_ARC_INDEX_FALL: usize = 1;

#[derive(Debug, Clone)]
pub struct TimingArcSet {
    from: Option<PortId>,
    to: Option<PortId>,
    related_out: Option<PortId>,
    role: TimingRole,
    attrs: TimingArcAttrs,
    arcs: SmallVec<[TimingArc; 2]>,
    /// Index assigned by the owning cell at registration.
    index: usize,
}

impl TimingArcSet {
    pub fn new(
        from: Option<PortId>,
        to: Option<PortId>,
        related_out: Option<PortId>,
        role: TimingRole,
        attrs: TimingArcAttrs,
    ) -> Self {
        TimingArcSet {
            from,
            to,
            related_out,
            role,
            attrs,
            arcs: SmallVec::new(),
            index: usize::MAX,
        }
    }

    pub fn from(&self) -> Option<PortId> {
        self.from
    }

    pub fn to(&self) -> Option<PortId> {
        self.to
    }

    pub fn related_out(&self) -> Option<PortId> {
        self.related_out
    }

    pub fn role(&self) -> TimingRole {
        self.role
    }

    pub fn attrs(&self) -> &TimingArcAttrs {
        &self.attrs
    }

    pub fn cond(&self) -> Option<&FuncExpr> {
        self.attrs.cond.as_ref()
    }

    pub fn sdf_cond(&self) -> Option<&str> {
        self.attrs.sdf_cond.as_deref()
    }

    pub fn sdf_cond_start(&self) -> Option<&str> {
        self.attrs
            .sdf_cond_start
            .as_deref()
            .or_else(|| self.sdf_cond())
    }

    pub fn sdf_cond_end(&self) -> Option<&str> {
        self.attrs
            .sdf_cond_end
            .as_deref()
            .or_else(|| self.sdf_cond())
    }

    pub fn mode_name(&self) -> Option<&str> {
        self.attrs.mode_name.as_deref()
    }

    pub fn mode_value(&self) -> Option<&str> {
        self.attrs.mode_value.as_deref()
    }

    pub fn ocv_arc_depth(&self) -> Option<f32> {
        self.attrs.ocv_arc_depth
    }

    /// Index within the owning cell, assigned at registration time.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn add_arc(
        &mut self,
        from_edge: Transition,
        to_edge: Transition,
        model: Option<Arc<TimingModel>>,
    ) -> usize {
        let index = self.arcs.len();
        self.arcs.push(TimingArc {
            from_edge,
            to_edge,
            model,
            index,
        });
        index
    }

    pub fn arcs(&self) -> &[TimingArc] {
        &self.arcs
    }

    pub fn arc(&self, index: usize) -> &TimingArc {
        &self.arcs[index]
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Unanimous arc direction gives a unate sense, anything else is
    /// non-unate.
    pub fn sense(&self) -> TimingSense {
        let mut sense: Option<TimingSense> = None;
        for arc in &self.arcs {
            let arc_sense = arc.sense(self.role);
            match sense {
                None => sense = Some(arc_sense),
                Some(s) if s == arc_sense => {}
                Some(_) => return TimingSense::NonUnate,
            }
        }
        sense.unwrap_or(TimingSense::Unknown)
    }

    /// Up to two arcs leaving `from_rf`: the one to rise and the one to
    /// fall.
    pub fn arcs_from(&self, from_rf: RiseFall) -> (Option<&TimingArc>, Option<&TimingArc>) {
        let mut to_rise = None;
        let mut to_fall = None;
        for arc in &self.arcs {
            if arc.from_edge.as_rise_fall() == Some(from_rf) {
                match arc.to_edge.as_rise_fall() {
                    Some(RiseFall::Rise) if to_rise.is_none() => to_rise = Some(arc),
                    Some(RiseFall::Fall) if to_fall.is_none() => to_fall = Some(arc),
                    _ => {}
                }
            }
        }
        (to_rise, to_fall)
    }

    /// First arc arriving at `to_rf`.
    pub fn arc_to(&self, to_rf: RiseFall) -> Option<&TimingArc> {
        self.arcs
            .iter()
            .find(|arc| arc.to_edge.as_rise_fall() == Some(to_rf))
    }

    /// Per-scene arc projection; identity until scaled twins exist.
    pub fn scene_arc(&self, _scene_index: usize, arc_index: usize) -> &TimingArc {
        &self.arcs[arc_index]
    }

    /// Lexicographic order over `(from, to, related_out, role, attrs)` for
    /// stable reporting. Port ids order by creation, which tracks file
    /// order.
    pub fn cmp_sets(a: &TimingArcSet, b: &TimingArcSet) -> Ordering {
        a.from
            .cmp(&b.from)
            .then(a.to.cmp(&b.to))
            .then(a.related_out.cmp(&b.related_out))
            .then(a.role.index().cmp(&b.role.index()))
            .then_with(|| a.attrs.order_key().cmp(&b.attrs.order_key()))
    }

    pub fn less(a: &TimingArcSet, b: &TimingArcSet) -> bool {
        Self::cmp_sets(a, b) == Ordering::Less
    }

    pub fn equiv(a: &TimingArcSet, b: &TimingArcSet) -> bool {
        Self::cmp_sets(a, b) == Ordering::Equal && a.arc_count() == b.arc_count()
    }
}

/// The process-wide wire arc set: interconnect delay with exactly a rise
/// arc and a fall arc, no models.
pub fn wire_arc_set() -> &'static TimingArcSet {
    static WIRE: Lazy<TimingArcSet> = Lazy::new(|| {
        let mut set = TimingArcSet::new(None, None, None, TimingRole::Wire, TimingArcAttrs::default());
        set.add_arc(Transition::Rise, Transition::Rise, None);
        set.add_arc(Transition::Fall, Transition::Fall, None);
        set
    });
    &WIRE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comb_set() -> TimingArcSet {
        let mut set = TimingArcSet::new(
            Some(PortId(0)),
            Some(PortId(1)),
            None,
            TimingRole::Combinational,
            TimingArcAttrs::default(),
        );
        set.add_arc(Transition::Rise, Transition::Rise, None);
        set.add_arc(Transition::Fall, Transition::Fall, None);
        set
    }

    #[test]
    fn arc_indices_are_dense() {
        let set = comb_set();
        for (i, arc) in set.arcs().iter().enumerate() {
            assert_eq!(arc.index(), i);
        }
    }

    #[test]
    fn unanimous_sense_is_unate() {
        let set = comb_set();
        assert_eq!(set.sense(), TimingSense::PositiveUnate);

        let mut inv = TimingArcSet::new(
            Some(PortId(0)),
            Some(PortId(1)),
            None,
            TimingRole::Combinational,
            TimingArcAttrs::default(),
        );
        inv.add_arc(Transition::Rise, Transition::Fall, None);
        inv.add_arc(Transition::Fall, Transition::Rise, None);
        assert_eq!(inv.sense(), TimingSense::NegativeUnate);

        let mut mixed = comb_set();
        mixed.add_arc(Transition::Rise, Transition::Fall, None);
        assert_eq!(mixed.sense(), TimingSense::NonUnate);
    }

    #[test]
    fn arcs_from_and_to() {
        let set = comb_set();
        let (to_rise, to_fall) = set.arcs_from(RiseFall::Rise);
        assert!(to_rise.is_some());
        assert!(to_fall.is_none());
        assert_eq!(
            set.arc_to(RiseFall::Fall).unwrap().from_edge(),
            Transition::Fall
        );
    }

    #[test]
    fn wire_singleton_shape() {
        let wire = wire_arc_set();
        assert_eq!(wire.role(), TimingRole::Wire);
        assert_eq!(wire.arc_count(), 2);
        assert_eq!(wire.arc(WIRE_ARC_INDEX_RISE).to_edge(), Transition::Rise);
        assert_eq!(wire.arc(WIRE_ARC_INDEX_FALL).to_edge(), Transition::Fall);
    }

    #[test]
    fn set_ordering_is_stable() {
        let a = comb_set();
        let mut b = comb_set();
        b.from = Some(PortId(2));
        assert!(TimingArcSet::less(&a, &b));
        assert!(!TimingArcSet::less(&b, &a));
        assert!(TimingArcSet::equiv(&a, &comb_set()));
    }

    #[test]
    fn check_arc_has_no_sense() {
        let mut set = TimingArcSet::new(
            Some(PortId(0)),
            Some(PortId(1)),
            None,
            TimingRole::Setup,
            TimingArcAttrs::default(),
        );
        let i = set.add_arc(Transition::Rise, Transition::Rise, None);
        assert_eq!(set.arc(i).sense(TimingRole::Setup), TimingSense::None_);
    }
}
