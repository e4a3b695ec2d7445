//! Property tests for the numeric and ordering invariants.

use std::sync::Arc;

use arclight_model::{
    FuncExpr, PortId, Table, TableAxis, TableAxisVariable, Unit,
};
use proptest::prelude::*;

fn expr_strategy() -> impl Strategy<Value = FuncExpr> {
    let leaf = prop_oneof![
        Just(FuncExpr::make_zero()),
        Just(FuncExpr::make_one()),
        (0u32..4).prop_map(|i| FuncExpr::Port(PortId(i))),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| FuncExpr::Not(Box::new(e))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| FuncExpr::make_and(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| FuncExpr::make_or(a, b)),
            (inner.clone(), inner).prop_map(|(a, b)| FuncExpr::make_xor(a, b)),
        ]
    })
}

fn sorted_axis_values() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-100.0f32..100.0, 2..12).prop_map(|mut values| {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values.dedup();
        if values.len() < 2 {
            values.push(values[0] + 1.0);
        }
        values
    })
}

proptest! {
    #[test]
    fn func_expr_equiv_is_reflexive_and_copy_stable(e in expr_strategy()) {
        prop_assert!(FuncExpr::equiv(Some(&e), Some(&e)));
        prop_assert!(FuncExpr::equiv(Some(&e), Some(&e.copy())));
    }

    #[test]
    fn func_expr_less_is_a_strict_order(
        a in expr_strategy(),
        b in expr_strategy(),
        c in expr_strategy(),
    ) {
        // Asymmetry.
        if FuncExpr::less(Some(&a), Some(&b)) {
            prop_assert!(!FuncExpr::less(Some(&b), Some(&a)));
        }
        // Transitivity.
        if FuncExpr::less(Some(&a), Some(&b)) && FuncExpr::less(Some(&b), Some(&c)) {
            prop_assert!(FuncExpr::less(Some(&a), Some(&c)));
        }
        // Irreflexivity.
        prop_assert!(!FuncExpr::less(Some(&a), Some(&a)));
    }

    #[test]
    fn axis_index_stays_in_segment_range(
        values in sorted_axis_values(),
        x in -1000.0f32..1000.0,
    ) {
        let axis = TableAxis::new(TableAxisVariable::Time, values);
        let index = axis.find_axis_index(x);
        prop_assert!(index <= axis.size() - 2);
    }

    #[test]
    fn table_matches_stored_values_at_grid_points(values in sorted_axis_values()) {
        let axis = Arc::new(TableAxis::new(TableAxisVariable::Time, values.clone()));
        let samples: Vec<f32> = (0..axis.size()).map(|i| i as f32 * 2.0).collect();
        let table = Table::OneD {
            values: samples.clone(),
            axis1: axis.clone(),
        };
        for i in 0..axis.size() {
            let found = table.find_value(axis.axis_value(i), 0.0, 0.0);
            prop_assert!((found - samples[i]).abs() <= 1e-3 * samples[i].abs().max(1.0));
        }
    }

    #[test]
    fn unit_conversion_round_trips(
        scale in prop_oneof![Just(1e-15f32), Just(1e-12), Just(1e-9), Just(1e-3), Just(1.0)],
        value in 1e-3f32..1e3,
    ) {
        let unit = Unit::new(scale, "x", 3);
        let round = unit.sta_to_user(unit.user_to_sta(value));
        prop_assert!(((round - value) / value).abs() < 1e-6);
    }
}
