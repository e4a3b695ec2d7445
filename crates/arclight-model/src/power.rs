//! Internal (switching) and leakage power models.

use arclight_common::RiseFall;

use crate::func_expr::FuncExpr;
use crate::library::{LibertyCell, LibertyLibrary, PortId, Pvt};
use crate::table::{TableAxis, TableAxisVariable};
use crate::timing_model::TableModel;
use std::sync::Arc;

/// Attributes accumulated for an `internal_power` group before the owning
/// ports are resolved.
#[derive(Debug, Clone, Default)]
pub struct InternalPowerAttrs {
    pub when: Option<FuncExpr>,
    pub related_pg_pin: Option<String>,
    pub models: [Option<TableModel>; RiseFall::COUNT],
}

/// Per-transition energy for a port, optionally conditioned on a `when`
/// state and a related input.
#[derive(Debug, Clone)]
pub struct InternalPower {
    port: PortId,
    related_port: Option<PortId>,
    when: Option<FuncExpr>,
    related_pg_pin: Option<String>,
    models: [Option<TableModel>; RiseFall::COUNT],
}

impl InternalPower {
    pub fn new(port: PortId, related_port: Option<PortId>, attrs: InternalPowerAttrs) -> Self {
        InternalPower {
            port,
            related_port,
            when: attrs.when,
            related_pg_pin: attrs.related_pg_pin,
            models: attrs.models,
        }
    }

    pub fn port(&self) -> PortId {
        self.port
    }

    pub fn related_port(&self) -> Option<PortId> {
        self.related_port
    }

    pub fn when(&self) -> Option<&FuncExpr> {
        self.when.as_ref()
    }

    pub fn related_pg_pin(&self) -> Option<&str> {
        self.related_pg_pin.as_deref()
    }

    pub fn model(&self, rf: RiseFall) -> Option<&TableModel> {
        self.models[rf.index()].as_ref()
    }

    /// Energy for one `rf` transition at the given operating point.
    /// Order-0 tables are a constant; otherwise slew/load map onto the
    /// table axes by variable.
    pub fn power(
        &self,
        rf: RiseFall,
        library: &LibertyLibrary,
        cell: &LibertyCell,
        pvt: Option<&Pvt>,
        in_slew: f32,
        load_cap: f32,
    ) -> f32 {
        match self.model(rf) {
            None => 0.0,
            Some(model) => {
                let arg = |axis: Option<&Arc<TableAxis>>| {
                    axis.map_or(0.0, |a| match a.variable() {
                        TableAxisVariable::InputTransitionTime
                        | TableAxisVariable::InputNetTransition => in_slew,
                        TableAxisVariable::TotalOutputNetCapacitance => load_cap,
                        _ => 0.0,
                    })
                };
                let x1 = arg(model.axis1());
                let x2 = arg(model.axis2());
                let x3 = arg(model.axis3());
                model.find_value(library, cell, pvt, x1, x2, x3)
            }
        }
    }
}

/// Attributes for a `leakage_power` group.
#[derive(Debug, Clone, Default)]
pub struct LeakagePowerAttrs {
    pub when: Option<FuncExpr>,
    pub related_pg_pin: Option<String>,
    pub power: Option<f32>,
}

/// Per-state leakage; stateless entries aggregate into the cell-level
/// leakage value.
#[derive(Debug, Clone)]
pub struct LeakagePower {
    when: Option<FuncExpr>,
    related_pg_pin: Option<String>,
    power: f32,
}

impl LeakagePower {
    pub fn new(attrs: LeakagePowerAttrs) -> Self {
        LeakagePower {
            when: attrs.when,
            related_pg_pin: attrs.related_pg_pin,
            power: attrs.power.unwrap_or(0.0),
        }
    }

    pub fn when(&self) -> Option<&FuncExpr> {
        self.when.as_ref()
    }

    pub fn related_pg_pin(&self) -> Option<&str> {
        self.related_pg_pin.as_deref()
    }

    pub fn power(&self) -> f32 {
        self.power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::PortDirection;
    use crate::scale_factors::ScaleFactorType;
    use crate::table::Table;

    #[test]
    fn constant_internal_power() {
        let library = LibertyLibrary::new("lib", "lib.lib");
        let mut cell = LibertyCell::new("buf", "lib.lib");
        let a = cell.add_port("A", PortDirection::Input);
        let z = cell.add_port("Z", PortDirection::Output);
        let mut attrs = InternalPowerAttrs::default();
        attrs.models[RiseFall::Rise.index()] = Some(TableModel::new(
            Arc::new(Table::Scalar(3.0)),
            None,
            ScaleFactorType::InternalPower,
            RiseFall::Rise,
        ));
        let power = InternalPower::new(z, Some(a), attrs);
        assert_eq!(
            power.power(RiseFall::Rise, &library, &cell, None, 0.1, 0.2),
            3.0
        );
        assert_eq!(
            power.power(RiseFall::Fall, &library, &cell, None, 0.1, 0.2),
            0.0
        );
    }

    #[test]
    fn leakage_power_defaults() {
        let leak = LeakagePower::new(LeakagePowerAttrs::default());
        assert_eq!(leak.power(), 0.0);
        assert!(leak.when().is_none());
    }
}
