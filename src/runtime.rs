use crate::{
    air::Air,
    error::{AsmError, RunError},
    ops::Op,
    output::{trace_step, OutputEvent, OutputSink},
    symbol::Word,
};

/// Result of a single step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Continue,
    Halted,
}

/// Represents complete program state during runtime.
#[derive(Debug)]
pub struct RunState {
    /// One word per assembled statement
    mem: Vec<Word>,
    /// Auxiliary LIFO stack used by `PSH`/`POP`
    stack: Vec<Word>,
    /// Values for `INP`, consumed from the back
    input: Vec<Word>,
    /// Accumulator
    acc: Word,
    /// Program counter
    pc: usize,
    halted: bool,
    trace: bool,
}

impl RunState {
    pub fn try_from(air: &Air) -> Result<RunState, AsmError> {
        Ok(RunState::from_raw(air.assemble()?))
    }

    pub fn from_raw(mem: Vec<Word>) -> RunState {
        RunState {
            mem,
            stack: Vec::new(),
            input: Vec::new(),
            acc: 0,
            pc: 0,
            halted: false,
            trace: false,
        }
    }

    /// Supply `INP` values. The last value given is read first.
    pub fn with_input(mut self, input: Vec<Word>) -> Self {
        self.input = input;
        self
    }

    /// Print every executed step to stderr.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn memory(&self) -> &[Word] {
        &self.mem
    }

    pub fn stack(&self) -> &[Word] {
        &self.stack
    }

    pub fn accumulator(&self) -> Word {
        self.acc
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Run until a `HLT`. Loops forever if the program does.
    pub fn run(&mut self, out: &mut impl OutputSink) -> Result<(), RunError> {
        while self.step(out)? == Step::Continue {}
        Ok(())
    }

    /// Run until a `HLT`, failing after `limit` steps. Returns the number of steps taken.
    pub fn run_bounded(&mut self, out: &mut impl OutputSink, limit: u64) -> Result<u64, RunError> {
        let mut steps = 0;
        while !self.halted {
            if steps == limit {
                return Err(RunError::StepLimitExceeded { limit });
            }
            self.step(out)?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Fetch, decode and execute one instruction. Does nothing once halted.
    pub fn step(&mut self, out: &mut impl OutputSink) -> Result<Step, RunError> {
        if self.halted {
            return Ok(Step::Halted);
        }
        let at = self.pc;
        let word = self.load(at, at as Word)?;
        let Some(op) = Op::decode(word) else {
            return Err(RunError::InvalidInstruction {
                pc: at,
                word,
                accumulator: self.acc,
                memory: self.mem.clone(),
                stack: self.stack.clone(),
            });
        };
        // PC incremented before instruction is performed
        self.pc += 1;
        self.execute(op, at, out)?;

        if self.trace {
            trace_step(at, word, self.acc, &self.stack);
        }
        Ok(if self.halted {
            Step::Halted
        } else {
            Step::Continue
        })
    }

    fn execute(&mut self, op: Op, at: usize, out: &mut impl OutputSink) -> Result<(), RunError> {
        match op {
            Op::ADD(addr) => self.acc = self.acc.wrapping_add(self.load(at, addr as Word)?),
            Op::SUB(addr) => self.acc = self.acc.wrapping_sub(self.load(at, addr as Word)?),
            Op::STA(addr) => {
                let acc = self.acc;
                *self.cell(at, addr)? = acc;
            }
            Op::LDA(addr) => self.acc = self.load(at, addr as Word)?,
            Op::BRA(addr) => self.pc = addr,
            Op::BRZ(addr) => {
                if self.acc == 0 {
                    self.pc = addr
                }
            }
            Op::BRP(addr) => {
                // Zero does not count as positive
                if self.acc > 0 {
                    self.pc = addr
                }
            }
            Op::HLT => self.halted = true,
            Op::RET => {
                self.pc = usize::try_from(self.acc).map_err(|_| RunError::AddressOutOfBounds {
                    pc: at,
                    addr: self.acc,
                })?
            }
            Op::INP => self.acc = self.input.pop().ok_or(RunError::InputExhausted { pc: at })?,
            Op::OUT => out.emit(OutputEvent::Number(self.acc)),
            Op::OUTC => out.emit(OutputEvent::Char(self.acc)),
            Op::POP => self.acc = self.stack.pop().ok_or(RunError::StackUnderflow { pc: at })?,
            Op::PSH => self.stack.push(self.acc),
            Op::LDAPC => self.acc = self.pc as Word,
        }
        Ok(())
    }

    fn load(&self, at: usize, addr: Word) -> Result<Word, RunError> {
        usize::try_from(addr)
            .ok()
            .and_then(|idx| self.mem.get(idx).copied())
            .ok_or(RunError::AddressOutOfBounds { pc: at, addr })
    }

    fn cell(&mut self, at: usize, addr: usize) -> Result<&mut Word, RunError> {
        self.mem.get_mut(addr).ok_or(RunError::AddressOutOfBounds {
            pc: at,
            addr: addr as Word,
        })
    }
}
