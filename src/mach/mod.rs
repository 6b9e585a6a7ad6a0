/*!
## Rust Machine Module

This Rust module stores and runs BASIC programs. Statements arrive already
parsed; the runtime walks them one at a time against a scoped variable
environment.

*/

mod array;
mod console;
mod decimal;
mod function;
mod object;
mod operation;
mod program;
mod runtime;
mod stack;
mod var;

pub use array::Array;
pub use console::Capture;
pub use console::Console;
pub use decimal::Decimal;
pub use decimal::DEFAULT_PRECISION;
pub use function::Registry;
pub use object::Builtin;
pub use object::BuiltinFn;
pub use object::Object;
pub use object::UserFunction;
pub use operation::Kind;
pub use operation::Logic;
pub use operation::Op;
pub use operation::Operation;
pub use program::Datum;
pub use program::Position;
pub use program::Program;
pub use runtime::Runtime;
pub use runtime::Session;
pub use stack::Stack;
pub use var::Environment;

#[cfg(test)]
mod tests;
