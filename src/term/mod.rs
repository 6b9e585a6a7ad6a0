extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use crate::lang::Line;
use crate::mach::{Capture, Console, Runtime};
use ansi_term::Style;
use linefeed::{DefaultTerminal, Interface, ReadResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn main() {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        eprintln!("Error setting Ctrl-C handler: {}", error);
        return;
    }
    if let Err(error) = main_loop(interrupted, std::env::args().nth(1)) {
        eprintln!("{}", error);
    }
}

fn main_loop(interrupted: Arc<AtomicBool>, path: Option<String>) -> std::io::Result<()> {
    let interface = Arc::new(Interface::new("BASIC")?);
    let console = Terminal::new(interface.clone(), interrupted.clone());
    let mut runtime = Runtime::new(Box::new(console));
    if let Some(path) = path {
        load(&mut runtime, &interface, &path)?;
    }
    interface.write_fmt(format_args!("READY.\n"))?;
    loop {
        let input = match interface.read_line()? {
            ReadResult::Input(input) => input,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        interrupted.store(false, Ordering::SeqCst);
        if let Err(error) = runtime.enter(&input) {
            report(&interface, &error.to_string())?;
        }
        if Line::new(&input).is_direct() {
            interface.write_fmt(format_args!("READY.\n"))?;
        }
        if !input.trim().is_empty() {
            interface.add_history_unique(input);
        }
    }
    Ok(())
}

fn report(interface: &Interface<DefaultTerminal>, message: &str) -> std::io::Result<()> {
    interface.write_fmt(format_args!(
        "{}\n",
        Style::new().bold().paint(format!("?{}", message))
    ))
}

fn load(
    runtime: &mut Runtime,
    interface: &Interface<DefaultTerminal>,
    filename: &str,
) -> std::io::Result<()> {
    let reader = match File::open(filename) {
        Ok(file) => BufReader::new(file),
        Err(error) => return report(interface, &format!("{}: {}", filename, error)),
    };
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if Line::new(&line).is_direct() && !line.trim().is_empty() {
            report(
                interface,
                &format!("DIRECT STATEMENT IN FILE; In line {} of the file.", index + 1),
            )?;
            break;
        }
        if let Err(error) = runtime.enter(&line) {
            report(
                interface,
                &format!("{}; In line {} of the file.", error, index + 1),
            )?;
            break;
        }
    }
    Ok(())
}

/// The terminal as a console. Output goes through linefeed so it doesn't
/// trample the prompt; a shadow screen answers cursor and read queries.
struct Terminal {
    interface: Arc<Interface<DefaultTerminal>>,
    interrupted: Arc<AtomicBool>,
    shadow: Capture,
}

impl Terminal {
    fn new(interface: Arc<Interface<DefaultTerminal>>, interrupted: Arc<AtomicBool>) -> Terminal {
        Terminal {
            interface,
            interrupted,
            shadow: Capture::new(),
        }
    }

    fn write(&self, text: &str) {
        if let Err(error) = self.interface.write_fmt(format_args!("{}", text)) {
            eprintln!("{}", error);
        }
    }
}

impl Console for Terminal {
    fn print(&mut self, text: &str) {
        self.write(text);
        self.shadow.print(text);
        self.shadow.take();
    }

    fn locate(&mut self, row: u16, col: u16) {
        self.write(&format!("\x1b[{};{}H", row, col));
        self.shadow.locate(row, col);
    }

    fn cursor(&self) -> (u16, u16) {
        self.shadow.cursor()
    }

    fn read(&self, col: u16, row: u16, len: usize) -> String {
        self.shadow.read(col, row, len)
    }

    fn read_keys(&mut self, _count: usize) -> Vec<u8> {
        vec![]
    }

    fn sound_bell(&mut self) {
        self.write("\x07");
    }

    fn break_check(&mut self) -> bool {
        self.interrupted.swap(false, Ordering::SeqCst)
    }
}
