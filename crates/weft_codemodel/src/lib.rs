//! The code-emission model synthesizers write into.
//!
//! A [`CodeModel`] holds one [`GeneratedClass`] per component. Method bodies
//! are [`Block`]s of [`Stmt`]s over [`Expr`]s. [`JavaRenderer`] prints a class
//! as a Java compilation unit, and [`Interpreter`] executes generated bodies
//! against runtime [`Value`]s so their behaviour can be checked without a
//! Java toolchain.

pub mod ast;
pub mod error;
pub mod eval;
pub mod model;
pub mod render;
pub mod value;

pub use ast::{Block, Expr, Stmt};
pub use error::EvalError;
pub use eval::{Host, HostReply, Interpreter, NoHost};
pub use model::{ClassId, CodeModel, FieldDecl, GeneratedClass, MethodDecl, INIT_METHOD};
pub use render::JavaRenderer;
pub use value::{Object, ObjectRef, Value};
