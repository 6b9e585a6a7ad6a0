use basic::lang::ErrorCode;
use basic::mach::{Capture, Console, Runtime};

/// A runtime on an in-memory screen. Errors are printed to the screen
/// the way the terminal shows them.
pub struct Basic {
    pub runtime: Runtime,
    pub screen: Capture,
}

impl Basic {
    pub fn new() -> Basic {
        let screen = Capture::new();
        Basic {
            runtime: Runtime::new(Box::new(screen.clone())),
            screen,
        }
    }

    pub fn enter(&mut self, s: &str) {
        if let Err(error) = self.runtime.enter(s) {
            self.screen.clone().println(&format!("?{}", error));
        }
    }

    /// The code and line of the error a line raises.
    pub fn error(&mut self, s: &str) -> (ErrorCode, Option<u16>) {
        match self.runtime.enter(s) {
            Ok(obj) => panic!("expected an error, got {:?}", obj),
            Err(error) => (error.code(), error.line_number()),
        }
    }
}

pub fn exec(basic: &mut Basic) -> String {
    basic.screen.take()
}
