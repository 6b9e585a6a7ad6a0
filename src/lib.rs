//! # Line BASIC
//!
//! A line-numbered BASIC with 16-bit integers, 32-bit longs, decimal
//! fixed-point numbers and IEEE floats.
//!
//! Start the executable for an interactive prompt. A file name given on
//! the command line is loaded first; every line in it must be numbered.
//! ```text
//! READY.
//! 10 FOR I = 1 TO 3: PRINT I;: NEXT
//! RUN
//!  1  2  3
//! READY.
//! ```
//!
//! The machine can also be driven without a terminal. Hand the runtime
//! any [`Console`](mach::Console) and feed it lines:
//! ```
//! use basic::mach::{Capture, Runtime};
//!
//! let screen = Capture::new();
//! let mut runtime = Runtime::new(Box::new(screen.clone()));
//! runtime.enter("10 PRINT 3 + 2.5").unwrap();
//! runtime.enter("RUN").unwrap();
//! assert_eq!(screen.take(), " 5.5 \n");
//! ```

pub mod lang;
pub mod mach;
pub mod term;
