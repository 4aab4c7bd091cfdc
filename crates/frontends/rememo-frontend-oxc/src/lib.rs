//! JavaScript frontend: parses source text with oxc and converts it to the
//! host AST the memoization pipeline works on.

mod convert;

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_parser::Parser as OxcParser;
use oxc_span::SourceType;

use rememo_core::js_ast::JsModule;
use rememo_core::CoreError;

use convert::Converter;

/// Parse a JavaScript module.
///
/// The source type is picked from the file extension (`.jsx`, `.mjs`, ...),
/// defaulting to an ES module with JSX enabled. Any syntax error fails the
/// whole parse.
pub fn parse_module(source: &str, filename: &str) -> Result<JsModule, CoreError> {
    let allocator = Allocator::default();
    let source_type =
        SourceType::from_path(filename).unwrap_or_else(|_| SourceType::mjs().with_jsx(true));
    let ret = OxcParser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = if ret.errors.is_empty() {
            "parser aborted".to_string()
        } else {
            ret.errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        };
        return Err(CoreError::Parse {
            file: Path::new(filename).to_path_buf(),
            message,
        });
    }

    let module = Converter::new(source, filename).module(&ret.program);
    tracing::debug!(file = filename, items = module.items.len(), "parsed module");
    Ok(module)
}
