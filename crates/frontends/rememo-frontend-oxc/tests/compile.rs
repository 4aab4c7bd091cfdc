//! Source text → compiled source text, through the oxc frontend.

use rememo_core::ast_printer::print_module;
use rememo_core::{compile_module, Level, LogSink, MemoConfig};
use rememo_frontend_oxc::parse_module;

fn compile(source: &str) -> (String, LogSink) {
    let mut module = parse_module(source, "input.js").expect("parse failed");
    let mut sink = LogSink::new();
    compile_module(&mut module, &MemoConfig::default(), &mut sink).expect("compile failed");
    (print_module(&module), sink)
}

#[test]
fn map_over_params_is_wrapped_in_place() {
    let (out, sink) = compile("function F(a, b) { const c = a.map(x => x * b); return c; }");
    assert_eq!(
        out,
        "\
import { useMemo } from \"react\";

function F(a, b) {
  const c = useMemo(() => a.map(x => x * b), [a, b]);
  return c;
}
"
    );
    assert!(sink.lines().iter().any(|l| l.level == Level::Success));
}

#[test]
fn empty_function_without_params_is_untouched() {
    let src = "import { useState } from \"react\";\n\nfunction Empty() {\n}\n";
    let (out, sink) = compile(src);
    assert_eq!(out, src);
    assert_eq!(sink.count(Level::Success), 0);
}

#[test]
fn object_argument_forms_a_memo_block() {
    let (out, _) = compile(
        "import { useState } from 'react';\nexport default function Panel(a) { render({ value: a }); }\n",
    );
    assert_eq!(
        out,
        "\
import { useState, useMemo } from \"react\";

export default function Panel(a) {
  const memoized0 = useMemo(() => ({ value: a }), [a]);
  render({ value: a });
}
"
    );
}

#[test]
fn filter_sort_chain_gets_both_rewrites() {
    let (out, _) = compile(
        "export function Top(scores) {\n  const best = scores.filter(s => s > 10).sort();\n  return best;\n}\n",
    );
    assert!(out.contains("const memoized0 = useMemo(() => scores.filter(s => s > 10), [scores]);"));
    assert!(out.contains(
        "const best = useMemo(() => scores.filter(s => s > 10).sort(), [scores]);"
    ));
}

#[test]
fn unsupported_statements_survive_with_a_warning() {
    let (out, sink) = compile(
        "function F(items) {\n  if (!items) { return null; }\n  const names = items.map(i => i.name);\n  return names;\n}\n",
    );
    assert!(out.contains("  if (!items) { return null; }\n"));
    assert!(out.contains("const names = useMemo(() => items.map(i => i.name), [items]);"));
    assert!(sink.count(Level::Warn) >= 1);
}

#[test]
fn hook_state_counts_as_changing() {
    let (out, _) = compile(
        "import { useState } from 'react';\n\
         function List() {\n\
           const [rows, setRows] = useState([]);\n\
           const sorted = rows.sort(byName);\n\
           return sorted;\n\
         }\n",
    );
    assert!(out.contains("const sorted = useMemo(() => rows.sort(byName), [rows, byName]);"));
}

#[test]
fn structural_error_fails_the_module() {
    let mut module = parse_module("function F({ ['k']: v }) { return v; }", "input.js").unwrap();
    let mut sink = LogSink::new();
    assert!(compile_module(&mut module, &MemoConfig::default(), &mut sink).is_err());
    assert_eq!(sink.count(Level::Fatal), 1);
}

#[test]
fn template_substitutions_are_dependencies() {
    let (out, _) = compile("function F(a, b) { const c = a.map(x => `${x}-${b}`); return c; }");
    assert!(out.contains("const c = useMemo(() => a.map(x => `${x}-${b}`), [a, b]);"));
}

#[test]
fn optional_chain_keys_are_dependencies() {
    let (out, _) = compile("function F(a, b) { const c = a.map(x => x?.[b]); return c; }");
    assert!(out.contains("const c = useMemo(() => a.map(x => x?.[b]), [a, b]);"));
}

#[test]
fn unreadable_initializer_is_not_wrapped() {
    let src = "function F(a, b) {\n  const c = a.map(x => tag`${x}${b}`);\n  return c;\n}\n";
    let (out, sink) = compile(src);
    assert_eq!(out, src);
    assert_eq!(sink.count(Level::Warn), 1);
}

#[test]
fn namespace_import_is_not_extended() {
    let (out, _) = compile(
        "import * as React from 'react';\nfunction F(a, b) { const c = a.map(x => x * b); return c; }\n",
    );
    assert!(out.starts_with(
        "import { useMemo } from \"react\";\nimport * as React from \"react\";\n"
    ));
}

#[test]
fn aliased_memo_import_still_binds_plain_name() {
    let (out, _) = compile(
        "import { useMemo as memo } from 'react';\nfunction F(a, b) { const c = a.map(x => x * b); return c; }\n",
    );
    assert!(out.starts_with("import { useMemo as memo, useMemo, useState } from \"react\";\n"));
    assert!(out.contains("const c = useMemo(() => a.map(x => x * b), [a, b]);"));
}
