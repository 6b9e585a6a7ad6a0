use crate::lang::{Error, ErrorCode};
use crate::mach::{Capture, Console, Runtime};


/// A runtime printing to a screen the test can read back. Errors land on
/// the screen the way the terminal shows them.
struct Basic {
    runtime: Runtime,
    screen: Capture,
}

impl Basic {
    fn new() -> Basic {
        let screen = Capture::new();
        Basic {
            runtime: Runtime::new(Box::new(screen.clone())),
            screen,
        }
    }

    fn enter(&mut self, s: &str) {
        if let Err(error) = self.runtime.enter(s) {
            self.screen.clone().println(&format!("?{}", error));
        }
    }

    fn error(&mut self, s: &str) -> Error {
        self.runtime.enter(s).unwrap_err()
    }
}

fn run(basic: &mut Basic) -> String {
    basic.screen.take()
}

fn code(error: Error) -> ErrorCode {
    error.code()
}
