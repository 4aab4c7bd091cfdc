pub mod config;

pub use config::{MemoConfig, PassConfig};

use crate::ast_printer::print_stmts;
use crate::codegen::{
    direct_rewrite, ensure_runtime_import, memo_decls, reconstruct_body, MemoNames,
};
use crate::error::CoreError;
use crate::ir::{lower_function, print_analysis, FunctionBody};
use crate::js_ast::{JsFunction, JsModule, JsStmt};
use crate::log::LogSink;
use crate::transforms::{analyze, partition, Analysis, PartitionItem};

/// Rewritten body of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    /// Memo declarations followed by the (directly rewritten) original
    /// statements.
    pub body: Vec<JsStmt>,
    pub memo_blocks: usize,
    pub direct_rewrites: usize,
}

impl CompiledFunction {
    pub fn changed(&self) -> bool {
        self.memo_blocks > 0 || self.direct_rewrites > 0
    }
}

/// Totals for a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub functions: usize,
    pub memo_blocks: usize,
    pub direct_rewrites: usize,
    pub import_changed: bool,
}

/// Lowered IR of a function together with its analysis and partition.
#[derive(Debug, Clone)]
pub struct FunctionAnalysis {
    pub body: FunctionBody,
    pub analysis: Analysis,
    pub items: Vec<PartitionItem>,
}

impl FunctionAnalysis {
    /// Debug report: the IR with its analysis and partition, followed by the
    /// statements the IR reconstructs to.
    pub fn report(&self) -> String {
        let mut out = print_analysis(&self.body, &self.analysis, &self.items);
        out.push_str("statements:\n");
        print_stmts(&reconstruct_body(&self.body), &mut out, "  ");
        out
    }
}

/// Lower, analyze and partition a function without generating code.
pub fn analyze_function(
    func: &JsFunction,
    config: &MemoConfig,
    sink: &mut LogSink,
) -> Result<FunctionAnalysis, CoreError> {
    let body = lower_function(func, sink)?;
    let analysis = analyze(&body, config);
    let items = partition(&body, &analysis);
    Ok(FunctionAnalysis {
        body,
        analysis,
        items,
    })
}

/// Compile one function declaration.
pub fn compile_function(
    func: &JsFunction,
    config: &MemoConfig,
    sink: &mut LogSink,
) -> Result<CompiledFunction, CoreError> {
    let FunctionAnalysis {
        body,
        analysis,
        items,
    } = analyze_function(func, config, sink)?;

    let decls = if config.passes.ir_blocks {
        let mut names = MemoNames::new();
        memo_decls(&body, &analysis, &items, config, &mut names, sink)
    } else {
        Vec::new()
    };

    let (rewritten, direct_rewrites) = if config.passes.direct_rewrite {
        direct_rewrite(&func.body, config, sink)
    } else {
        (func.body.clone(), 0)
    };

    let compiled = CompiledFunction {
        memo_blocks: decls.len(),
        direct_rewrites,
        body: decls.into_iter().chain(rewritten).collect(),
    };
    if compiled.changed() {
        sink.success(format!(
            "`{}`: {} memo block(s), {} direct rewrite(s)",
            func.name, compiled.memo_blocks, compiled.direct_rewrites
        ));
    } else {
        sink.info(format!("`{}`: nothing to memoize", func.name));
    }
    Ok(compiled)
}

/// Compile every top-level function declaration of a module in place, then
/// fix up the runtime import if anything was rewritten.
///
/// On error the module is left partially rewritten; callers discard it.
pub fn compile_module(
    module: &mut JsModule,
    config: &MemoConfig,
    sink: &mut LogSink,
) -> Result<CompileStats, CoreError> {
    let mut stats = CompileStats::default();
    for func in module.functions_mut() {
        let compiled = compile_function(func, config, sink)?;
        stats.functions += 1;
        stats.memo_blocks += compiled.memo_blocks;
        stats.direct_rewrites += compiled.direct_rewrites;
        func.body = compiled.body;
    }

    if stats.memo_blocks + stats.direct_rewrites > 0 && config.passes.imports {
        stats.import_changed = ensure_runtime_import(module, config, sink);
    }
    tracing::debug!(
        functions = stats.functions,
        memo_blocks = stats.memo_blocks,
        direct_rewrites = stats.direct_rewrites,
        "module compiled"
    );
    Ok(stats)
}
