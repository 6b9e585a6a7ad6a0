//! # BASIC
//!
//! A line-numbered BASIC at the terminal.
//!

fn main() {
    basic::term::main();
}
