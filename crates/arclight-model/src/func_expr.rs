//! Boolean functions over library ports.
//!
//! `FuncExpr` is the parsed form of Liberty `function`, `three_state`,
//! `when`, and sequential-control attributes. Nodes own their children;
//! ports are referenced by id into the owning cell.

use std::cmp::Ordering;

use crate::library::{LibertyCell, PortId};
use crate::timing_arc::TimingSense;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuncExpr {
    Port(PortId),
    Not(Box<FuncExpr>),
    And(Box<FuncExpr>, Box<FuncExpr>),
    Or(Box<FuncExpr>, Box<FuncExpr>),
    Xor(Box<FuncExpr>, Box<FuncExpr>),
    One,
    Zero,
}

impl FuncExpr {
    pub fn make_port(port: PortId) -> Self {
        FuncExpr::Port(port)
    }

    /// NOT constructor that cancels a double negation instead of stacking
    /// a second inverter node.
    pub fn make_not(expr: FuncExpr) -> Self {
        match expr {
            FuncExpr::Not(inner) => *inner,
            other => FuncExpr::Not(Box::new(other)),
        }
    }

    pub fn make_and(left: FuncExpr, right: FuncExpr) -> Self {
        FuncExpr::And(Box::new(left), Box::new(right))
    }

    pub fn make_or(left: FuncExpr, right: FuncExpr) -> Self {
        FuncExpr::Or(Box::new(left), Box::new(right))
    }

    pub fn make_xor(left: FuncExpr, right: FuncExpr) -> Self {
        FuncExpr::Xor(Box::new(left), Box::new(right))
    }

    pub fn make_one() -> Self {
        FuncExpr::One
    }

    pub fn make_zero() -> Self {
        FuncExpr::Zero
    }

    /// Deep clone; the expression graphs are unique-owned, so sharing goes
    /// through an explicit copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn port(&self) -> Option<PortId> {
        match self {
            FuncExpr::Port(p) => Some(*p),
            _ => None,
        }
    }

    fn op_rank(&self) -> u8 {
        match self {
            FuncExpr::Port(_) => 0,
            FuncExpr::Not(_) => 1,
            FuncExpr::And(..) => 2,
            FuncExpr::Or(..) => 3,
            FuncExpr::Xor(..) => 4,
            FuncExpr::One => 5,
            FuncExpr::Zero => 6,
        }
    }

    /// Structural equivalence; both-absent counts as equivalent.
    pub fn equiv(a: Option<&FuncExpr>, b: Option<&FuncExpr>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Total order for canonicalization: absent before present, then op,
    /// then children left to right, then port identity.
    pub fn less(a: Option<&FuncExpr>, b: Option<&FuncExpr>) -> bool {
        Self::cmp_opt(a, b) == Ordering::Less
    }

    pub fn cmp_opt(a: Option<&FuncExpr>, b: Option<&FuncExpr>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp_expr(b),
        }
    }

    fn cmp_expr(&self, other: &FuncExpr) -> Ordering {
        self.op_rank().cmp(&other.op_rank()).then_with(|| {
            match (self, other) {
                (FuncExpr::Port(a), FuncExpr::Port(b)) => a.cmp(b),
                (FuncExpr::Not(a), FuncExpr::Not(b)) => a.cmp_expr(b),
                (FuncExpr::And(al, ar), FuncExpr::And(bl, br))
                | (FuncExpr::Or(al, ar), FuncExpr::Or(bl, br))
                | (FuncExpr::Xor(al, ar), FuncExpr::Xor(bl, br)) => {
                    al.cmp_expr(bl).then_with(|| ar.cmp_expr(br))
                }
                _ => Ordering::Equal,
            }
        })
    }

    pub fn has_port(&self, port: PortId) -> bool {
        match self {
            FuncExpr::Port(p) => *p == port,
            FuncExpr::Not(e) => e.has_port(port),
            FuncExpr::And(l, r) | FuncExpr::Or(l, r) | FuncExpr::Xor(l, r) => {
                l.has_port(port) || r.has_port(port)
            }
            FuncExpr::One | FuncExpr::Zero => false,
        }
    }

    /// Unateness of this function with respect to `port`.
    pub fn port_timing_sense(&self, port: PortId) -> TimingSense {
        use TimingSense::*;
        match self {
            FuncExpr::Zero | FuncExpr::One => None_,
            FuncExpr::Port(p) => {
                if *p == port {
                    PositiveUnate
                } else {
                    None_
                }
            }
            FuncExpr::Not(e) => match e.port_timing_sense(port) {
                PositiveUnate => NegativeUnate,
                NegativeUnate => PositiveUnate,
                other => other,
            },
            FuncExpr::And(l, r) | FuncExpr::Or(l, r) => {
                let ls = l.port_timing_sense(port);
                let rs = r.port_timing_sense(port);
                match (ls, rs) {
                    (Unknown, _) | (_, Unknown) => Unknown,
                    (None_, s) | (s, None_) => s,
                    (PositiveUnate, PositiveUnate) => PositiveUnate,
                    (NegativeUnate, NegativeUnate) => NegativeUnate,
                    _ => NonUnate,
                }
            }
            FuncExpr::Xor(l, r) => {
                let ls = l.port_timing_sense(port);
                let rs = r.port_timing_sense(port);
                if ls == Unknown || rs == Unknown {
                    Unknown
                } else if l.has_port(port) || r.has_port(port) {
                    NonUnate
                } else {
                    None_
                }
            }
        }
    }

    /// True when every port leaf has bit width `size`.
    pub fn check_size(&self, size: usize, cell: &LibertyCell) -> bool {
        match self {
            FuncExpr::Port(p) => cell.port(*p).size() == size,
            FuncExpr::Not(e) => e.check_size(size, cell),
            FuncExpr::And(l, r) | FuncExpr::Or(l, r) | FuncExpr::Xor(l, r) => {
                l.check_size(size, cell) && r.check_size(size, cell)
            }
            FuncExpr::One | FuncExpr::Zero => true,
        }
    }

    /// Bit-level sub-expression: bus port leaves are replaced by their
    /// `bit`-th member, scalar leaves stay as they are.
    pub fn bit_sub_expr(&self, bit: usize, cell: &LibertyCell) -> FuncExpr {
        match self {
            FuncExpr::Port(p) => {
                let port = cell.port(*p);
                if port.size() > 1 {
                    FuncExpr::Port(port.member(bit))
                } else {
                    self.clone()
                }
            }
            FuncExpr::Not(e) => FuncExpr::Not(Box::new(e.bit_sub_expr(bit, cell))),
            FuncExpr::And(l, r) => FuncExpr::And(
                Box::new(l.bit_sub_expr(bit, cell)),
                Box::new(r.bit_sub_expr(bit, cell)),
            ),
            FuncExpr::Or(l, r) => FuncExpr::Or(
                Box::new(l.bit_sub_expr(bit, cell)),
                Box::new(r.bit_sub_expr(bit, cell)),
            ),
            FuncExpr::Xor(l, r) => FuncExpr::Xor(
                Box::new(l.bit_sub_expr(bit, cell)),
                Box::new(r.bit_sub_expr(bit, cell)),
            ),
            FuncExpr::One | FuncExpr::Zero => self.clone(),
        }
    }

    /// Render using the cell's port names. Binary operators are emitted
    /// without parentheses; an inverted compound child is parenthesized.
    pub fn to_string(&self, cell: &LibertyCell) -> String {
        match self {
            FuncExpr::Zero => "0".to_string(),
            FuncExpr::One => "1".to_string(),
            FuncExpr::Port(p) => cell.port(*p).name().to_string(),
            FuncExpr::Not(e) => match e.as_ref() {
                FuncExpr::Port(_) | FuncExpr::Zero | FuncExpr::One => {
                    format!("!{}", e.to_string(cell))
                }
                _ => format!("!({})", e.to_string(cell)),
            },
            FuncExpr::And(l, r) => format!("{}*{}", l.to_string(cell), r.to_string(cell)),
            FuncExpr::Or(l, r) => format!("{}+{}", l.to_string(cell), r.to_string(cell)),
            FuncExpr::Xor(l, r) => format!("{}^{}", l.to_string(cell), r.to_string(cell)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::PortDirection;

    fn two_port_cell() -> (LibertyCell, PortId, PortId) {
        let mut cell = LibertyCell::new("and2", "test.lib");
        let a = cell.add_port("A", PortDirection::Input);
        let b = cell.add_port("B", PortDirection::Input);
        (cell, a, b)
    }

    #[test]
    fn not_not_cancels() {
        let (_, a, _) = two_port_cell();
        let e = FuncExpr::make_not(FuncExpr::make_not(FuncExpr::make_port(a)));
        assert_eq!(e, FuncExpr::Port(a));
    }

    #[test]
    fn equiv_and_copy() {
        let (_, a, b) = two_port_cell();
        let e = FuncExpr::make_and(FuncExpr::make_port(a), FuncExpr::make_port(b));
        let c = e.copy();
        assert!(FuncExpr::equiv(Some(&e), Some(&c)));
        assert!(FuncExpr::equiv(None, None));
        assert!(!FuncExpr::equiv(Some(&e), None));
    }

    #[test]
    fn less_is_strict_and_null_first() {
        let (_, a, b) = two_port_cell();
        let pa = FuncExpr::make_port(a);
        let pb = FuncExpr::make_port(b);
        assert!(FuncExpr::less(None, Some(&pa)));
        assert!(FuncExpr::less(Some(&pa), Some(&pb)));
        assert!(!FuncExpr::less(Some(&pb), Some(&pa)));
        assert!(!FuncExpr::less(Some(&pa), Some(&pa)));
    }

    #[test]
    fn sense_combinations() {
        use TimingSense::*;
        let (_, a, b) = two_port_cell();
        let pa = FuncExpr::make_port(a);
        let pb = FuncExpr::make_port(b);
        let and = FuncExpr::make_and(pa.clone(), pb.clone());
        assert_eq!(and.port_timing_sense(a), PositiveUnate);
        assert_eq!(and.port_timing_sense(b), PositiveUnate);

        let mixed = FuncExpr::make_and(pa.clone(), FuncExpr::make_not(pa.clone()));
        assert_eq!(mixed.port_timing_sense(a), NonUnate);

        let nand = FuncExpr::make_not(and.clone());
        assert_eq!(nand.port_timing_sense(a), NegativeUnate);

        let xor = FuncExpr::make_xor(pa.clone(), pb.clone());
        assert_eq!(xor.port_timing_sense(a), NonUnate);
        assert_eq!(FuncExpr::make_one().port_timing_sense(a), None_);
    }

    #[test]
    fn has_port_walks_the_tree() {
        let (_, a, b) = two_port_cell();
        let e = FuncExpr::make_or(
            FuncExpr::make_not(FuncExpr::make_port(a)),
            FuncExpr::make_zero(),
        );
        assert!(e.has_port(a));
        assert!(!e.has_port(b));
    }

    #[test]
    fn rendering() {
        let (cell, a, b) = two_port_cell();
        let e = FuncExpr::make_and(FuncExpr::make_port(a), FuncExpr::make_port(b));
        assert_eq!(e.to_string(&cell), "A*B");
        let n = FuncExpr::Not(Box::new(e.clone()));
        assert_eq!(n.to_string(&cell), "!(A*B)");
        assert_eq!(
            FuncExpr::make_not(FuncExpr::make_port(a)).to_string(&cell),
            "!A"
        );
        assert_eq!(FuncExpr::make_zero().to_string(&cell), "0");
    }
}
