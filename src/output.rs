use std::io::{stdout, Write};

use colored::Colorize;

use crate::ops::disassemble;
use crate::symbol::Word;

/// Value emitted by the machine, in execution order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputEvent {
    /// From `OUT`
    Number(Word),
    /// From `OUTC`, a character code
    Char(Word),
}

impl OutputEvent {
    /// Character for `Char` events. Codes that are not valid scalars render as U+FFFD.
    pub fn as_char(&self) -> Option<char> {
        match self {
            OutputEvent::Char(code) => Some(
                u32::try_from(*code)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER),
            ),
            OutputEvent::Number(_) => None,
        }
    }
}

/// Receives output events as the machine produces them.
pub trait OutputSink {
    fn emit(&mut self, event: OutputEvent);
}

/// Collect events for inspection.
impl OutputSink for Vec<OutputEvent> {
    fn emit(&mut self, event: OutputEvent) {
        self.push(event)
    }
}

/// Renders events to stdout. Numbers get a line each, characters are printed as-is.
#[derive(Debug)]
pub struct Console {
    line_start: bool,
}

impl Default for Console {
    fn default() -> Self {
        Console { line_start: true }
    }
}

impl Console {
    pub fn new() -> Self {
        Console::default()
    }

    /// Whether the cursor is at the start of a line, so status messages don't get glued on.
    pub fn is_line_start(&self) -> bool {
        self.line_start
    }
}

impl OutputSink for Console {
    fn emit(&mut self, event: OutputEvent) {
        match event {
            OutputEvent::Number(val) => {
                if !self.line_start {
                    println!();
                }
                println!("{val}");
                self.line_start = true;
            }
            OutputEvent::Char(_) => {
                let ch = event.as_char().unwrap_or(char::REPLACEMENT_CHARACTER);
                print!("{ch}");
                self.line_start = ch == '\n';
            }
        }
        // Nothing sensible to do if stdout is gone
        let _ = stdout().flush();
    }
}

/// Print one executed step to stderr.
pub fn trace_step(pc: usize, word: Word, accumulator: Word, stack: &[Word]) {
    eprintln!(
        "{:>12} {:>4}: {:<10} {} {:<8} {} {:?}",
        "Trace".cyan(),
        pc,
        disassemble(word),
        "acc".dimmed(),
        accumulator,
        "stack".dimmed(),
        stack,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_events() {
        assert_eq!(OutputEvent::Char(72).as_char(), Some('H'));
        assert_eq!(OutputEvent::Char(-1).as_char(), Some(char::REPLACEMENT_CHARACTER));
        assert_eq!(OutputEvent::Char(0xD800).as_char(), Some(char::REPLACEMENT_CHARACTER));
        assert_eq!(OutputEvent::Number(72).as_char(), None);
    }

    #[test]
    fn collects_in_order() {
        let mut sink: Vec<OutputEvent> = Vec::new();
        sink.emit(OutputEvent::Number(1));
        sink.emit(OutputEvent::Char(33));
        assert_eq!(sink, vec![OutputEvent::Number(1), OutputEvent::Char(33)]);
    }
}
