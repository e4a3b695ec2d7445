//! Umbrella crate: the library model plus the Liberty and SDF front ends.

pub use arclight_common as common;
pub use arclight_liberty as liberty;
pub use arclight_model as model;
pub use arclight_sdf as sdf;

pub use arclight_common::{
    EarlyLate, EarlyLateAll, MinMax, MinMaxAll, Report, RiseFall, RiseFallBoth, Transition, Unit,
    Units,
};
pub use arclight_liberty::{LibertyBuilder, LibertyError, LibertyReader, read_liberty_file};
pub use arclight_model::{
    AnalysisType, FuncExpr, Graph, LibertyCell, LibertyLibrary, LibertyPort, Network, Pvt,
    TimingArc, TimingArcSet, TimingRole, TimingSense,
};
pub use arclight_sdf::{
    SdfError, SdfReaderOptions, SdfWriterOptions, read_sdf, write_sdf,
};
