use crate::js_ast::{ImportDecl, ImportSpecifier, JsModule, ModuleItem};
use crate::log::LogSink;
use crate::pipeline::MemoConfig;

/// Whether the import binds `name` under that same local name. Generated
/// code calls the primitive by its plain name, so `useMemo as memo` does not
/// count.
fn binds_name(import: &ImportDecl, name: &str) -> bool {
    import.specifiers.iter().any(|s| {
        matches!(s, ImportSpecifier::Named { imported, local } if imported == name && local == name)
    })
}

/// `import * as R from ...` cannot be combined with a named import list.
fn takes_named_specifiers(import: &ImportDecl) -> bool {
    !import
        .specifiers
        .iter()
        .any(|s| matches!(s, ImportSpecifier::Namespace(_)))
}

/// Make the memo primitive importable from the runtime module.
///
/// An existing runtime import gains the memo and state primitives it lacks.
/// Without one that can take named specifiers, `import { useMemo } from
/// "<runtime>";` is inserted at the top of the module. Returns whether the
/// module changed.
pub fn ensure_runtime_import(module: &mut JsModule, config: &MemoConfig, sink: &mut LogSink) -> bool {
    let existing = module.items.iter_mut().find_map(|item| match item {
        ModuleItem::Import(import)
            if import.source == config.runtime_module && takes_named_specifiers(import) =>
        {
            Some(import)
        }
        _ => None,
    });

    match existing {
        Some(import) => {
            let mut added = Vec::new();
            for name in [&config.memo_primitive, &config.state_primitive] {
                if !binds_name(import, name) {
                    import.specifiers.push(ImportSpecifier::named(name.as_str()));
                    added.push(name.as_str());
                }
            }
            if added.is_empty() {
                return false;
            }
            sink.info(format!(
                "added {} to import from \"{}\"",
                added.join(", "),
                config.runtime_module
            ));
            true
        }
        None => {
            module.items.insert(
                0,
                ModuleItem::Import(ImportDecl {
                    source: config.runtime_module.clone(),
                    specifiers: vec![ImportSpecifier::named(config.memo_primitive.as_str())],
                }),
            );
            sink.info(format!(
                "inserted import of {} from \"{}\"",
                config.memo_primitive, config.runtime_module
            ));
            true
        }
    }
}
