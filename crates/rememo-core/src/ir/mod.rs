pub mod builder;
pub mod func;
pub mod inst;
pub mod lower;
pub mod printer;

pub use builder::FunctionBuilder;
pub use func::FunctionBody;
pub use inst::{Constant, Inst, InstId, Op, Operand, Property};
pub use lower::lower_function;
pub use printer::print_analysis;
