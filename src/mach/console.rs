use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// ## Console capability
///
/// Everything the machine needs from a screen and keyboard. Calls are
/// synchronous and must return immediately; a front end collecting keys
/// on another thread hands them over through `read_keys`.

pub trait Console {
    fn print(&mut self, text: &str);
    fn println(&mut self, text: &str) {
        self.print(text);
        self.print("\n");
    }
    /// Rows and columns count from 1.
    fn locate(&mut self, row: u16, col: u16);
    fn cursor(&self) -> (u16, u16);
    /// Text already on screen at a position.
    fn read(&self, col: u16, row: u16, len: usize) -> String;
    fn read_keys(&mut self, count: usize) -> Vec<u8>;
    fn sound_bell(&mut self);
    /// True once per break request.
    fn break_check(&mut self) -> bool;
}

#[derive(Debug, Default)]
struct Screen {
    rows: Vec<Vec<char>>,
    row: usize,
    col: usize,
    transcript: String,
    keys: VecDeque<u8>,
    bells: usize,
    break_after: Option<usize>,
}

impl Screen {
    fn put(&mut self, ch: char) {
        self.transcript.push(ch);
        if ch == '\n' {
            self.row += 1;
            self.col = 0;
            return;
        }
        while self.rows.len() <= self.row {
            self.rows.push(vec![]);
        }
        let line = &mut self.rows[self.row];
        while line.len() < self.col {
            line.push(' ');
        }
        if self.col < line.len() {
            line[self.col] = ch;
        } else {
            line.push(ch);
        }
        self.col += 1;
    }
}

/// An in-memory console. Clones share one screen, so a caller can keep a
/// handle while the runtime owns another.
#[derive(Debug, Default, Clone)]
pub struct Capture(Rc<RefCell<Screen>>);

impl Capture {
    pub fn new() -> Capture {
        Capture::default()
    }

    /// Everything printed since the last call.
    pub fn take(&self) -> String {
        std::mem::take(&mut self.0.borrow_mut().transcript)
    }

    pub fn type_keys(&self, keys: &str) {
        self.0.borrow_mut().keys.extend(keys.bytes());
    }

    pub fn bells(&self) -> usize {
        self.0.borrow().bells
    }

    /// Requests a break after `checks` more polls of `break_check`.
    pub fn interrupt_after(&self, checks: usize) {
        self.0.borrow_mut().break_after = Some(checks);
    }
}

impl Console for Capture {
    fn print(&mut self, text: &str) {
        let mut screen = self.0.borrow_mut();
        for ch in text.chars() {
            screen.put(ch);
        }
    }

    fn locate(&mut self, row: u16, col: u16) {
        let mut screen = self.0.borrow_mut();
        screen.row = row.saturating_sub(1) as usize;
        screen.col = col.saturating_sub(1) as usize;
    }

    fn cursor(&self) -> (u16, u16) {
        let screen = self.0.borrow();
        (screen.row as u16 + 1, screen.col as u16 + 1)
    }

    fn read(&self, col: u16, row: u16, len: usize) -> String {
        let screen = self.0.borrow();
        match screen.rows.get(row.saturating_sub(1) as usize) {
            Some(line) => line
                .iter()
                .skip(col.saturating_sub(1) as usize)
                .take(len)
                .collect(),
            None => String::new(),
        }
    }

    fn read_keys(&mut self, count: usize) -> Vec<u8> {
        let mut screen = self.0.borrow_mut();
        let count = count.min(screen.keys.len());
        screen.keys.drain(..count).collect()
    }

    fn sound_bell(&mut self) {
        self.0.borrow_mut().bells += 1;
    }

    fn break_check(&mut self) -> bool {
        let mut screen = self.0.borrow_mut();
        match screen.break_after {
            Some(0) => {
                screen.break_after = None;
                true
            }
            Some(n) => {
                screen.break_after = Some(n - 1);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_shares_screen() {
        let capture = Capture::new();
        let mut console: Box<dyn Console> = Box::new(capture.clone());
        console.println("HELLO");
        console.print("WORLD");
        assert_eq!(capture.take(), "HELLO\nWORLD");
        assert_eq!(capture.take(), "");
        assert_eq!(console.cursor(), (2, 6));
        assert_eq!(console.read(2, 1, 3), "ELL");
    }

    #[test]
    fn test_locate_overwrites() {
        let mut capture = Capture::new();
        capture.print("ABCDEF");
        capture.locate(1, 3);
        capture.print("X");
        assert_eq!(capture.read(1, 1, 10), "ABXDEF");
    }

    #[test]
    fn test_keys_and_break() {
        let mut capture = Capture::new();
        capture.type_keys("AB");
        assert_eq!(capture.read_keys(5), b"AB".to_vec());
        capture.interrupt_after(1);
        assert!(!capture.break_check());
        assert!(capture.break_check());
        assert!(!capture.break_check());
    }
}
