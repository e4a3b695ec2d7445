//! Signal transition enumerations.
//!
//! `RiseFall` is the closed two-value enumeration the timing model indexes
//! by. `Transition` is the wider SDF view: the two rise/fall transitions,
//! the ten tristate/unknown edges, and the `rise_fall` wildcard that matches
//! either. Every non-wildcard transition has a stable triple index used to
//! pick the rise or fall slot out of SDF value lists.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiseFall {
    Rise,
    Fall,
}

impl RiseFall {
    pub const COUNT: usize = 2;

    pub const fn rise() -> Self {
        RiseFall::Rise
    }

    pub const fn fall() -> Self {
        RiseFall::Fall
    }

    pub const fn index(self) -> usize {
        match self {
            RiseFall::Rise => 0,
            RiseFall::Fall => 1,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            RiseFall::Rise => RiseFall::Fall,
            RiseFall::Fall => RiseFall::Rise,
        }
    }

    pub const fn short_name(self) -> &'static str {
        match self {
            RiseFall::Rise => "^",
            RiseFall::Fall => "v",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            RiseFall::Rise => "rise",
            RiseFall::Fall => "fall",
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "rise" | "^" => Some(RiseFall::Rise),
            "fall" | "v" => Some(RiseFall::Fall),
            _ => None,
        }
    }

    pub const fn find_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(RiseFall::Rise),
            1 => Some(RiseFall::Fall),
            _ => None,
        }
    }

    pub const fn both() -> [Self; 2] {
        [RiseFall::Rise, RiseFall::Fall]
    }

    pub const fn as_transition(self) -> Transition {
        match self {
            RiseFall::Rise => Transition::Rise,
            RiseFall::Fall => Transition::Fall,
        }
    }
}

impl fmt::Display for RiseFall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rise, fall, or both; used wherever an attribute may name one edge or
/// apply to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiseFallBoth {
    Rise,
    Fall,
    RiseFall,
}

impl RiseFallBoth {
    pub const fn rise() -> Self {
        RiseFallBoth::Rise
    }

    pub const fn fall() -> Self {
        RiseFallBoth::Fall
    }

    pub const fn rise_fall() -> Self {
        RiseFallBoth::RiseFall
    }

    pub fn matches(self, rf: RiseFall) -> bool {
        match self {
            RiseFallBoth::Rise => rf == RiseFall::Rise,
            RiseFallBoth::Fall => rf == RiseFall::Fall,
            RiseFallBoth::RiseFall => true,
        }
    }

    pub fn matches_transition(self, tr: Transition) -> bool {
        match tr.as_rise_fall() {
            Some(rf) => self.matches(rf),
            None => self == RiseFallBoth::RiseFall,
        }
    }

    pub fn range(self) -> &'static [RiseFall] {
        match self {
            RiseFallBoth::Rise => &[RiseFall::Rise],
            RiseFallBoth::Fall => &[RiseFall::Fall],
            RiseFallBoth::RiseFall => &[RiseFall::Rise, RiseFall::Fall],
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "rise" | "^" => Some(RiseFallBoth::Rise),
            "fall" | "v" => Some(RiseFallBoth::Fall),
            "rise_fall" => Some(RiseFallBoth::RiseFall),
            _ => None,
        }
    }
}

/// SDF transitions. The twelve concrete transitions carry triple indices
/// 0..11; `RiseFall` is the wildcard that matches either concrete edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Rise,
    Fall,
    Tr0Z,
    TrZ1,
    Tr1Z,
    TrZ0,
    Tr0X,
    TrX1,
    Tr1X,
    TrX0,
    TrXZ,
    TrZX,
    /// Wildcard matching any rise or fall transition.
    RiseFall,
}

impl Transition {
    pub const MAX_INDEX: usize = 11;

    pub const fn rise() -> Self {
        Transition::Rise
    }

    pub const fn fall() -> Self {
        Transition::Fall
    }

    pub const fn rise_fall() -> Self {
        Transition::RiseFall
    }

    /// Index into SDF rise/fall value lists. The wildcard has no index.
    pub const fn sdf_triple_index(self) -> Option<usize> {
        match self {
            Transition::Rise => Some(0),
            Transition::Fall => Some(1),
            Transition::Tr0Z => Some(2),
            Transition::TrZ1 => Some(3),
            Transition::Tr1Z => Some(4),
            Transition::TrZ0 => Some(5),
            Transition::Tr0X => Some(6),
            Transition::TrX1 => Some(7),
            Transition::Tr1X => Some(8),
            Transition::TrX0 => Some(9),
            Transition::TrXZ => Some(10),
            Transition::TrZX => Some(11),
            Transition::RiseFall => None,
        }
    }

    pub const fn as_init_final(self) -> &'static str {
        match self {
            Transition::Rise => "01",
            Transition::Fall => "10",
            Transition::Tr0Z => "0Z",
            Transition::TrZ1 => "Z1",
            Transition::Tr1Z => "1Z",
            Transition::TrZ0 => "Z0",
            Transition::Tr0X => "0X",
            Transition::TrX1 => "X1",
            Transition::Tr1X => "1X",
            Transition::TrX0 => "X0",
            Transition::TrXZ => "XZ",
            Transition::TrZX => "ZX",
            Transition::RiseFall => "**",
        }
    }

    /// Best-effort projection onto rise/fall. Transitions ending high
    /// project to rise, ending low to fall; XZ/ZX and the wildcard project
    /// to nothing.
    pub const fn as_rise_fall(self) -> Option<RiseFall> {
        match self {
            Transition::Rise | Transition::Tr0Z | Transition::TrZ1 | Transition::Tr0X
            | Transition::TrX1 => Some(RiseFall::Rise),
            Transition::Fall | Transition::Tr1Z | Transition::TrZ0 | Transition::Tr1X
            | Transition::TrX0 => Some(RiseFall::Fall),
            Transition::TrXZ | Transition::TrZX | Transition::RiseFall => None,
        }
    }

    pub fn matches(self, other: Transition) -> bool {
        self == Transition::RiseFall || self == other
    }

    pub fn find(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "^" | "01" | "RISE" => Some(Transition::Rise),
            "V" | "10" | "FALL" => Some(Transition::Fall),
            "0Z" => Some(Transition::Tr0Z),
            "Z1" => Some(Transition::TrZ1),
            "1Z" => Some(Transition::Tr1Z),
            "Z0" => Some(Transition::TrZ0),
            "0X" => Some(Transition::Tr0X),
            "X1" => Some(Transition::TrX1),
            "1X" => Some(Transition::Tr1X),
            "X0" => Some(Transition::TrX0),
            "XZ" => Some(Transition::TrXZ),
            "ZX" => Some(Transition::TrZX),
            "*" | "**" | "RISE_FALL" => Some(Transition::RiseFall),
            _ => None,
        }
    }

    pub const fn all() -> [Self; 13] {
        [
            Transition::Rise,
            Transition::Fall,
            Transition::Tr0Z,
            Transition::TrZ1,
            Transition::Tr1Z,
            Transition::TrZ0,
            Transition::Tr0X,
            Transition::TrX1,
            Transition::Tr1X,
            Transition::TrX0,
            Transition::TrXZ,
            Transition::TrZX,
            Transition::RiseFall,
        ]
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Rise => "^",
            Transition::Fall => "v",
            Transition::RiseFall => "*",
            other => other.as_init_final(),
        })
    }
}

impl From<RiseFall> for Transition {
    fn from(rf: RiseFall) -> Self {
        rf.as_transition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rise_fall_basics() {
        assert_eq!(RiseFall::Rise.opposite(), RiseFall::Fall);
        assert_eq!(RiseFall::Rise.short_name(), "^");
        assert_eq!(RiseFall::Fall.short_name(), "v");
        assert_eq!(RiseFall::find("rise"), Some(RiseFall::Rise));
        assert_eq!(RiseFall::find("v"), Some(RiseFall::Fall));
        assert_eq!(RiseFall::find("x"), None);
    }

    #[test]
    fn triple_indices_cover_0_to_11() {
        let mut seen = [false; 12];
        let mut wildcard = 0;
        for tr in Transition::all() {
            match tr.sdf_triple_index() {
                Some(i) => {
                    assert!(!seen[i]);
                    seen[i] = true;
                }
                None => wildcard += 1,
            }
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(wildcard, 1);
    }

    #[test]
    fn rise_fall_projection() {
        assert_eq!(Transition::Rise.as_rise_fall(), Some(RiseFall::Rise));
        assert_eq!(Transition::Fall.as_rise_fall(), Some(RiseFall::Fall));
        assert_eq!(Transition::TrZ1.as_rise_fall(), Some(RiseFall::Rise));
        assert_eq!(Transition::Tr1Z.as_rise_fall(), Some(RiseFall::Fall));
        assert_eq!(Transition::TrXZ.as_rise_fall(), None);
        assert_eq!(Transition::TrZX.as_rise_fall(), None);
        assert_eq!(Transition::RiseFall.as_rise_fall(), None);
    }

    #[test]
    fn wildcard_matches_everything_concrete() {
        assert!(Transition::RiseFall.matches(Transition::Rise));
        assert!(Transition::RiseFall.matches(Transition::Tr0Z));
        assert!(Transition::Rise.matches(Transition::Rise));
        assert!(!Transition::Rise.matches(Transition::Fall));
    }

    #[test]
    fn find_by_init_final() {
        assert_eq!(Transition::find("0z"), Some(Transition::Tr0Z));
        assert_eq!(Transition::find("Z1"), Some(Transition::TrZ1));
        assert_eq!(Transition::find("^"), Some(Transition::Rise));
        assert_eq!(Transition::find("nope"), None);
    }

    #[test]
    fn rise_fall_both_matching() {
        assert!(RiseFallBoth::RiseFall.matches(RiseFall::Rise));
        assert!(RiseFallBoth::RiseFall.matches_transition(Transition::Tr0Z));
        assert!(!RiseFallBoth::Fall.matches_transition(Transition::Rise));
        assert!(RiseFallBoth::Fall.matches_transition(Transition::Tr1Z));
    }
}
