pub mod builder;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod reader;
pub mod stmt;

pub use builder::LibertyBuilder;
pub use error::LibertyError;
pub use expr::{ExprError, parse_func_expr};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, parse_liberty};
pub use reader::{
    AttrVisitor, GroupVisitor, LibertyReader, port_liberty_to_sta, read_liberty_file,
};
pub use stmt::{
    LibertyAttr, LibertyAttrType, LibertyAttrValue, LibertyDefine, LibertyGroup, LibertyStmt,
    LibertyVariable,
};
