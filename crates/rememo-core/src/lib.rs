//! Automatic memoization of expensive computations in JavaScript functions.
//!
//! A function body is lowered to a flat IR ([`ir`]), analyzed for values
//! that may change between invocations ([`transforms::deps`]), grouped into
//! reactive blocks ([`transforms::partition`]) and printed back with
//! `useMemo` wrappers ([`codegen`]). [`pipeline`] drives the whole thing over
//! a module.

pub mod ast_printer;
pub mod codegen;
pub mod entity;
pub mod error;
pub mod ir;
pub mod js_ast;
pub mod log;
pub mod pipeline;
pub mod transforms;

pub use error::CoreError;
pub use log::{Level, LogLine, LogSink};
pub use pipeline::{
    analyze_function, compile_function, compile_module, CompileStats, CompiledFunction,
    FunctionAnalysis, MemoConfig, PassConfig,
};
