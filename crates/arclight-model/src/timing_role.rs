//! Timing roles: what a timing arc set means to the analyzer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingRole {
    Wire,
    Combinational,
    TristateEnable,
    TristateDisable,
    RegClkToQ,
    RegSetClr,
    LatchEnToQ,
    LatchDToQ,
    Setup,
    Hold,
    Recovery,
    Removal,
    Skew,
    Width,
    Period,
    Nochange,
    ClockTreePathMin,
    ClockTreePathMax,
    NonSeqSetup,
    NonSeqHold,
    /// SDF's view of every delay arc through a cell; only used as the
    /// target of `sdf_role` projections, never as a library role.
    SdfIopath,
}

impl TimingRole {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wire => "wire",
            Self::Combinational => "combinational",
            Self::TristateEnable => "tristate enable",
            Self::TristateDisable => "tristate disable",
            Self::RegClkToQ => "Reg Clk to Q",
            Self::RegSetClr => "Reg S/R to Q",
            Self::LatchEnToQ => "Latch En to Q",
            Self::LatchDToQ => "Latch D to Q",
            Self::Setup => "setup",
            Self::Hold => "hold",
            Self::Recovery => "recovery",
            Self::Removal => "removal",
            Self::Skew => "skew",
            Self::Width => "width",
            Self::Period => "period",
            Self::Nochange => "nochange",
            Self::ClockTreePathMin => "min clock tree path",
            Self::ClockTreePathMax => "max clock tree path",
            Self::NonSeqSetup => "nonseq setup",
            Self::NonSeqHold => "nonseq hold",
            Self::SdfIopath => "IOPATH",
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name {
            "wire" => Some(Self::Wire),
            "combinational" => Some(Self::Combinational),
            "tristate enable" => Some(Self::TristateEnable),
            "tristate disable" => Some(Self::TristateDisable),
            "Reg Clk to Q" => Some(Self::RegClkToQ),
            "Reg S/R to Q" => Some(Self::RegSetClr),
            "Latch En to Q" => Some(Self::LatchEnToQ),
            "Latch D to Q" => Some(Self::LatchDToQ),
            "setup" => Some(Self::Setup),
            "hold" => Some(Self::Hold),
            "recovery" => Some(Self::Recovery),
            "removal" => Some(Self::Removal),
            "skew" => Some(Self::Skew),
            "width" => Some(Self::Width),
            "period" => Some(Self::Period),
            "nochange" => Some(Self::Nochange),
            "min clock tree path" => Some(Self::ClockTreePathMin),
            "max clock tree path" => Some(Self::ClockTreePathMax),
            "nonseq setup" => Some(Self::NonSeqSetup),
            "nonseq hold" => Some(Self::NonSeqHold),
            _ => None,
        }
    }

    /// Stable ordering index, used for deterministic arc-set comparisons.
    pub const fn index(self) -> usize {
        match self {
            Self::Wire => 0,
            Self::Combinational => 1,
            Self::TristateEnable => 2,
            Self::TristateDisable => 3,
            Self::RegClkToQ => 4,
            Self::RegSetClr => 5,
            Self::LatchEnToQ => 6,
            Self::LatchDToQ => 7,
            Self::Setup => 8,
            Self::Hold => 9,
            Self::Recovery => 10,
            Self::Removal => 11,
            Self::Skew => 12,
            Self::Width => 13,
            Self::Period => 14,
            Self::Nochange => 15,
            Self::ClockTreePathMin => 16,
            Self::ClockTreePathMax => 17,
            Self::NonSeqSetup => 18,
            Self::NonSeqHold => 19,
            Self::SdfIopath => 20,
        }
    }

    pub const fn is_wire(self) -> bool {
        matches!(self, Self::Wire)
    }

    pub const fn is_timing_check(self) -> bool {
        matches!(
            self,
            Self::Setup
                | Self::Hold
                | Self::Recovery
                | Self::Removal
                | Self::Skew
                | Self::Width
                | Self::Period
                | Self::Nochange
                | Self::NonSeqSetup
                | Self::NonSeqHold
        )
    }

    /// Checks whose violation direction is "data too late" (setup-like)
    /// as opposed to "data too early" (hold-like).
    pub const fn is_setup_like(self) -> bool {
        matches!(self, Self::Setup | Self::Recovery | Self::NonSeqSetup)
    }

    /// Collapse the non-sequential variants onto their sequential
    /// counterparts.
    pub const fn generic_role(self) -> Self {
        match self {
            Self::NonSeqSetup => Self::Setup,
            Self::NonSeqHold => Self::Hold,
            other => other,
        }
    }

    /// What SDF calls this role: every through-cell delay arc is an
    /// IOPATH, wire arcs are interconnect, checks keep their generic role.
    pub const fn sdf_role(self) -> Self {
        match self {
            Self::Combinational
            | Self::TristateEnable
            | Self::TristateDisable
            | Self::RegClkToQ
            | Self::RegSetClr
            | Self::LatchEnToQ
            | Self::LatchDToQ
            | Self::ClockTreePathMin
            | Self::ClockTreePathMax => Self::SdfIopath,
            Self::NonSeqSetup => Self::Setup,
            Self::NonSeqHold => Self::Hold,
            other => other,
        }
    }
}

impl fmt::Display for TimingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_round_trips_names() {
        for role in [
            TimingRole::Wire,
            TimingRole::Combinational,
            TimingRole::Setup,
            TimingRole::NonSeqHold,
            TimingRole::ClockTreePathMax,
        ] {
            assert_eq!(TimingRole::find(role.name()), Some(role));
        }
        assert_eq!(TimingRole::find("bogus"), None);
    }

    #[test]
    fn check_predicate() {
        assert!(TimingRole::Setup.is_timing_check());
        assert!(TimingRole::Width.is_timing_check());
        assert!(!TimingRole::Combinational.is_timing_check());
        assert!(!TimingRole::Wire.is_timing_check());
        assert!(TimingRole::Wire.is_wire());
    }

    #[test]
    fn generic_collapses_nonseq() {
        assert_eq!(TimingRole::NonSeqSetup.generic_role(), TimingRole::Setup);
        assert_eq!(TimingRole::NonSeqHold.generic_role(), TimingRole::Hold);
        assert_eq!(TimingRole::Setup.generic_role(), TimingRole::Setup);
    }

    #[test]
    fn sdf_projection() {
        assert_eq!(TimingRole::Combinational.sdf_role(), TimingRole::SdfIopath);
        assert_eq!(TimingRole::RegClkToQ.sdf_role(), TimingRole::SdfIopath);
        assert_eq!(TimingRole::Wire.sdf_role(), TimingRole::Wire);
        assert_eq!(TimingRole::Setup.sdf_role(), TimingRole::Setup);
        assert_eq!(TimingRole::NonSeqSetup.sdf_role(), TimingRole::Setup);
    }
}
