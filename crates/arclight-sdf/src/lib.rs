pub mod error;
pub mod parse;
pub mod reader;
pub mod test_netlist;
pub mod writer;

pub use error::SdfError;
pub use parse::{
    SdfCell, SdfCellEntry, SdfCheck, SdfDelayDef, SdfFile, SdfInstanceSpec, SdfPortSpec,
    SdfTriple, parse_sdf,
};
pub use reader::{SdfReader, SdfReaderOptions, cond_match, read_sdf, read_sdf_text};
pub use writer::{SdfWriter, SdfWriterOptions, write_sdf, write_sdf_string};
