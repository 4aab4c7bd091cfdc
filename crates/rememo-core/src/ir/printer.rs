use std::fmt;

use crate::ast_printer::{print_expr, print_literal, print_pattern};
use crate::entity::EntityRef;
use crate::transforms::{Analysis, PartitionItem};

use super::func::FunctionBody;
use super::inst::{Constant, Op, Operand};
use super::InstId;

fn fmt_value(v: InstId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "v{}", v.index())
}

fn fmt_operand(op: &Operand, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match op {
        Operand::Literal(lit) => write!(f, "{}", print_literal(lit)),
        Operand::Value(v) => fmt_value(*v, f),
    }
}

fn fmt_constant(c: &Constant, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match c {
        Constant::Literal(lit) => write!(f, "{}", print_literal(lit)),
        Constant::Global(name) => write!(f, "global {name}"),
        Constant::Function(expr) => write!(f, "fn `{}`", print_expr(expr)),
        Constant::Unsupported { kind, .. } => write!(f, "unsupported <{kind}>"),
    }
}

impl fmt::Display for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn {} {{", self.name)?;
        for (id, inst) in self.insts.iter() {
            write!(f, "  ")?;
            if !matches!(inst.op, Op::Return { .. }) {
                fmt_value(id, f)?;
                write!(f, " = ")?;
            }
            match &inst.op {
                Op::Param { name } => write!(f, "param {name}")?,
                Op::LoadConstant(c) => {
                    write!(f, "const ")?;
                    fmt_constant(c, f)?;
                }
                Op::Declare {
                    kind,
                    pattern,
                    value,
                    ..
                } => {
                    write!(f, "{} {} = ", kind.keyword(), print_pattern(pattern))?;
                    fmt_value(*value, f)?;
                }
                Op::ReadProperty { object, property } => {
                    write!(f, "read ")?;
                    fmt_value(*object, f)?;
                    write!(f, "{property}")?;
                }
                Op::Object { props } => {
                    write!(f, "object {{")?;
                    for (i, (key, value)) in props.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, " {key}: ")?;
                        fmt_operand(value, f)?;
                    }
                    if !props.is_empty() {
                        write!(f, " ")?;
                    }
                    write!(f, "}}")?;
                }
                Op::Call {
                    receiver,
                    property,
                    args,
                } => {
                    write!(f, "call ")?;
                    fmt_value(*receiver, f)?;
                    if let Some(p) = property {
                        write!(f, "{p}")?;
                    }
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        fmt_operand(arg, f)?;
                    }
                    write!(f, ")")?;
                }
                Op::Return { value } => {
                    write!(f, "return")?;
                    if let Some(v) = value {
                        write!(f, " ")?;
                        fmt_value(*v, f)?;
                    }
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

fn value_set<'a>(ids: impl IntoIterator<Item = &'a InstId>) -> String {
    let parts: Vec<_> = ids.into_iter().map(|v| format!("v{}", v.index())).collect();
    format!("{{{}}}", parts.join(", "))
}

/// Print the body followed by its per-instruction analysis and partition.
pub fn print_analysis(body: &FunctionBody, analysis: &Analysis, items: &[PartitionItem]) -> String {
    let mut out = format!("{body}\n");
    for id in body.insts.keys() {
        let info = analysis.info(id);
        let mut flags = Vec::new();
        if analysis.may_change[id] {
            flags.push("may-change");
        }
        if analysis.writable[id] {
            flags.push("writable");
        }
        if info.should_memo {
            flags.push("memo");
        }
        out.push_str(&format!(
            "  v{}: deps {} mutators {}{}{}\n",
            id.index(),
            value_set(&info.dependencies),
            value_set(&info.mutators),
            if flags.is_empty() { "" } else { " " },
            flags.join(" "),
        ));
    }
    for item in items {
        match item {
            PartitionItem::PassThrough(id) => out.push_str(&format!("pass v{}\n", id.index())),
            PartitionItem::Block(block) => out.push_str(&format!(
                "block [v{}..v{}] deps {}\n",
                block.start.index(),
                block.end.index(),
                value_set(&block.deps)
            )),
        }
    }
    out
}
