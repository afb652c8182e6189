// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD
#![warn(missing_docs)]

//! Library providing a minimal Intcode interpreter and a brute-force search for the noun and verb
//! that make a program produce a wanted value.
//!
//! The interpreter understands the three [Opcodes] defined for [Day 2]: `ADD` (1), `MUL` (2) and
//! `HALT` (99). Every parameter is positional: it is the address of the cell to read or write.
//!
//! # Example
//!
//! ```rust
//! use gravity_assist::prelude::*;
//! let mut interpreter = Interpreter::new(vec![1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]);
//!
//! assert_eq!(interpreter.run().unwrap(), State::Halted);
//! assert_eq!(interpreter[0], 3500);
//! ```
//!
//! The [search] module finds the noun and verb that produce a target value:
//!
//! ```rust
//! use gravity_assist::prelude::*;
//! let code = [1, 0, 0, 3, 2, 3, 11, 0, 99, 30, 40, 50];
//! let pair = find_pair(&code, &SearchConfig::new(3500)).unwrap();
//! assert_eq!(pair, ParamPair::new(9, 10));
//! ```
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Day 2]: https://adventofcode.com/2019/day/2

mod internals;
pub mod parse;
pub mod search;
pub mod trace;

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::ops::{Index, IndexMut};
use std::sync::{Arc, Mutex};

use trace::Trace;

/// A small module that re-exports items needed when working with the Intcode interpreter
pub mod prelude {
    pub use crate::search::{ParamPair, SearchConfig, find_pair};
    pub use crate::{Interpreter, InterpreterError, OpcodePolicy, State, execute};
}

/// The state of the intcode system, returned whenever the intcode system has stopped.
///
/// [Halted](State::Halted) means that a `HALT` instruction has been executed.
///
/// [RanOffEnd](State::RanOffEnd) means the instruction pointer moved past the last memory cell
/// without ever reaching a `HALT`. Memory is still in a usable state, but the program did not end
/// the way it was meant to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    /// Execution has halted
    Halted,
    /// The instruction pointer moved past the end of memory
    RanOffEnd,
}

/// How the interpreter treats an int that is not a known opcode.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum OpcodePolicy {
    /// Fail with [`InterpreterError::UnrecognizedOpcode`]
    #[default]
    Strict,
    /// Treat the int as a 4-cell instruction that does nothing, and move on to the next one.
    ///
    /// Some older solvers behaved this way, so it is kept for reproducing their results.
    Skip,
}

/// An Intcode opcode
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(i64)]
pub enum OpCode {
    /// Add the values at the first two addresses, storing the sum at the third
    Add = 1,
    /// Multiply the values at the first two addresses, storing the product at the third
    Mul = 2,
    /// Stop execution
    Halt = 99,
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, i64> {
        match i {
            1 => Ok(Self::Add),
            2 => Ok(Self::Mul),
            99 => Ok(Self::Halt),
            i => Err(i),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::Add => write!(f, "ADD"),
            OpCode::Mul => write!(f, "MUL"),
            OpCode::Halt => write!(f, "HALT"),
        }
    }
}

#[derive(Debug)]
/// An error occured when executing an intcode instruction
pub enum InterpreterError {
    /// An invalid opcode was encountered at instruction pointer `at`
    UnrecognizedOpcode {
        /// The int that could not be decoded
        opcode: i64,
        /// Where it was found
        at: usize,
    },
    /// An address outside of memory was read from or written to
    OutOfBounds {
        /// The address that was accessed
        address: i64,
        /// The size of memory at the time
        len: usize,
    },
    /// The result of an instruction did not fit in an [`i64`]
    Overflow {
        /// The instruction that overflowed
        opcode: OpCode,
        /// Where it was found
        at: usize,
    },
    /// The interpreter previously failed, and memory may be partially updated
    Poisoned,
    /// An error occured with the logger
    LoggerFailed(io::Error),
}

impl PartialEq for InterpreterError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::UnrecognizedOpcode { opcode: a, at: b },
                Self::UnrecognizedOpcode { opcode: c, at: d },
            ) => a == c && b == d,
            (
                Self::OutOfBounds { address: a, len: b },
                Self::OutOfBounds { address: c, len: d },
            ) => a == c && b == d,
            (Self::Overflow { opcode: a, at: b }, Self::Overflow { opcode: c, at: d }) => {
                a == c && b == d
            }
            (Self::Poisoned, Self::Poisoned) => true,
            _ => false,
        }
    }
}

impl Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedOpcode { opcode, at } => {
                write!(f, "encountered unrecognized opcode {opcode} at address {at}")
            }
            Self::OutOfBounds { address, len } => write!(
                f,
                "address {address} is out of bounds for memory of {len} ints"
            ),
            Self::Overflow { opcode, at } => {
                write!(f, "{opcode} instruction at address {at} overflowed")
            }
            Self::Poisoned => write!(f, "interpreter was used after a previous error"),
            Self::LoggerFailed(e) => write!(f, "logger encountered an error: {e}"),
        }
    }
}

impl Error for InterpreterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LoggerFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for InterpreterError {
    fn from(err: io::Error) -> Self {
        Self::LoggerFailed(err)
    }
}

type Logger = Arc<Mutex<dyn io::Write + Send>>;

#[derive(Clone)]
/// An intcode interpreter, which provides optional logging and tracing of instructions executed.
pub struct Interpreter {
    index: usize,
    code: Vec<i64>,
    policy: OpcodePolicy,
    poisoned: bool,
    trace: Option<Trace>,
    logger: Option<Logger>,
}

// ignore the logger and trace fields
impl PartialEq for Interpreter {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.policy == other.policy
            && self.poisoned == other.poisoned
            && self.code == other.code
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Interpreter")
            .field("code", &self.code)
            .field("ip", &self.index)
            .field("policy", &self.policy)
            .field("poisoned", &self.poisoned)
            .field("tracing", &self.trace.is_some())
            .field("logging", &self.logger.is_some())
            .finish()
    }
}

impl Index<usize> for Interpreter {
    type Output = i64;

    fn index(&self, i: usize) -> &Self::Output {
        self.code.index(i)
    }
}

impl IndexMut<usize> for Interpreter {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        self.code.index_mut(i)
    }
}

impl Interpreter {
    /// Create a new interpreter. Collects `code` into the starting memory state.
    pub fn new(code: impl IntoIterator<Item = i64>) -> Self {
        Self {
            index: 0,
            code: code.into_iter().collect(),
            policy: OpcodePolicy::default(),
            poisoned: false,
            trace: None,
            logger: None,
        }
    }

    /// Replace the [`OpcodePolicy`] used for unrecognized opcodes
    #[must_use]
    pub fn with_policy(mut self, policy: OpcodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Log each executed instruction as a line written to `logger`.
    ///
    /// # Example
    ///
    /// ```
    /// use gravity_assist::prelude::*;
    /// use std::io::Write;
    /// use std::sync::{Arc, Mutex};
    ///
    /// #[derive(Clone, Default)]
    /// struct SharedBuf(Arc<Mutex<Vec<u8>>>);
    /// impl std::io::Write for SharedBuf {
    ///     fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    ///         self.0.lock().unwrap().write(buf)
    ///     }
    ///     fn flush(&mut self) -> std::io::Result<()> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let buf = SharedBuf::default();
    /// let mut interp = Interpreter::new([1, 0, 0, 0, 99]);
    /// interp.log_with(buf.clone());
    /// interp.run().unwrap();
    /// let log = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    /// assert_eq!(log.lines().count(), 2);
    /// ```
    pub fn log_with(&mut self, logger: impl io::Write + Send + 'static) {
        let logger: Logger = Arc::new(Mutex::new(logger));
        self.logger = Some(logger);
    }

    /// Stop logging executed instructions
    pub fn stop_logging(&mut self) {
        self.logger = None;
    }

    /// Get the memory at `address`
    ///
    /// # Errors
    ///
    /// Returns [`InterpreterError::OutOfBounds`] if `address` is not in memory.
    #[doc(alias = "peek")]
    pub fn mem_get(&self, address: usize) -> Result<i64, InterpreterError> {
        self.code
            .get(address)
            .copied()
            .ok_or_else(|| self.out_of_bounds(internals::to_address(address)))
    }

    /// Manually set a memory location
    ///
    /// # Errors
    ///
    /// Returns [`InterpreterError::OutOfBounds`] if `address` is not in memory.
    #[doc(alias("poke", "write"))]
    pub fn mem_override(&mut self, address: usize, value: i64) -> Result<(), InterpreterError> {
        let len = self.code.len();
        let cell = self
            .code
            .get_mut(address)
            .ok_or(InterpreterError::OutOfBounds {
                address: internals::to_address(address),
                len,
            })?;
        *cell = value;
        Ok(())
    }

    /// A view of the whole memory
    pub fn memory(&self) -> &[i64] {
        &self.code
    }

    /// Consume the interpreter, returning its memory
    pub fn into_memory(self) -> Vec<i64> {
        self.code
    }

    /// The current position of the instruction pointer
    pub fn cursor(&self) -> usize {
        self.index
    }

    /// Whether a previous error has left the interpreter unusable
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Execute a single instruction.
    ///
    /// Returns `Ok(None)` if there's more to execute, or `Ok(Some(state))` once execution stopped.
    /// Once [`State::Halted`] has been returned, later calls keep returning it without touching
    /// memory.
    ///
    /// # Errors
    ///
    /// On error, returns an [`InterpreterError`] and marks the interpreter as poisoned, except for
    /// [`InterpreterError::LoggerFailed`], which is reported before the instruction takes effect.
    pub fn step(&mut self) -> Result<Option<State>, InterpreterError> {
        if self.poisoned {
            return Err(InterpreterError::Poisoned);
        }
        let Some(&op_int) = self.code.get(self.index) else {
            return Ok(Some(State::RanOffEnd));
        };
        match self.decode(op_int)? {
            Some(OpCode::Add) => self.op3(op_int, OpCode::Add, i64::checked_add),
            Some(OpCode::Mul) => self.op3(op_int, OpCode::Mul, i64::checked_mul),
            Some(OpCode::Halt) => {
                self.report(format_args!("{op_int:<5} [HALT]"))?;
                self.trace_halt();
                Ok(Some(State::Halted))
            }
            None => {
                self.report(format_args!("{op_int:<5} [SKIP]"))?;
                self.trace_skipped(op_int);
                self.index += 4;
                Ok(None)
            }
        }
    }

    /// Execute until either the program halts or runs off the end of memory.
    ///
    /// # Errors
    ///
    /// Returns the first [`InterpreterError`] encountered. See [`Interpreter::step`].
    pub fn run(&mut self) -> Result<State, InterpreterError> {
        loop {
            if let Some(state) = self.step()? {
                break Ok(state);
            }
        }
    }
}

/// Run `memory` as an Intcode program, returning the memory once the program stops.
///
/// Whether the program halted or ran off the end of memory is not reported; use an
/// [`Interpreter`] directly to find out.
///
/// # Example
///
/// ```
/// use gravity_assist::execute;
/// assert_eq!(execute(vec![2, 3, 0, 3, 99]).unwrap(), vec![2, 3, 0, 6, 99]);
/// ```
///
/// # Errors
///
/// Returns an [`InterpreterError`] if an instruction could not be executed.
pub fn execute(memory: Vec<i64>) -> Result<Vec<i64>, InterpreterError> {
    let mut interpreter = Interpreter::new(memory);
    interpreter.run()?;
    Ok(interpreter.into_memory())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_halt() {
        let mut interpreter = Interpreter::new([99]);
        assert_eq!(interpreter.run(), Ok(State::Halted));
        assert_eq!(interpreter.cursor(), 0);
        assert_eq!(interpreter.into_memory(), vec![99]);
    }

    #[test]
    fn halt_does_not_read_trailing_cells() {
        // the cells after HALT would be out of bounds if they were treated as an instruction
        assert_eq!(execute(vec![99, 1000, -5]), Ok(vec![99, 1000, -5]));
    }

    #[test]
    fn repeated_halt() {
        let mut interpreter = Interpreter::new([1, 0, 0, 0, 99]);
        assert_eq!(interpreter.run(), Ok(State::Halted));
        let halted = interpreter.clone();
        assert_eq!(interpreter.step(), Ok(Some(State::Halted)));
        assert_eq!(interpreter, halted);
    }

    #[test]
    fn deterministic() {
        let code = vec![1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50];
        assert_eq!(execute(code.clone()), execute(code));
    }

    #[test]
    fn runs_off_end() {
        let mut interpreter = Interpreter::new([1, 0, 0, 0]);
        assert_eq!(interpreter.run(), Ok(State::RanOffEnd));
        assert_eq!(interpreter.memory(), &[2, 0, 0, 0]);
        assert_eq!(interpreter.cursor(), 4);
        assert_eq!(Interpreter::new(Vec::new()).run(), Ok(State::RanOffEnd));
    }

    #[test]
    fn out_of_bounds_operand() {
        let mut interpreter = Interpreter::new([1, 0, 12, 0, 99]);
        assert_eq!(
            interpreter.run(),
            Err(InterpreterError::OutOfBounds {
                address: 12,
                len: 5
            })
        );
        // nothing was written
        assert_eq!(interpreter.memory(), &[1, 0, 12, 0, 99]);
    }

    #[test]
    fn negative_address() {
        assert_eq!(
            execute(vec![2, 0, 0, -1, 99]),
            Err(InterpreterError::OutOfBounds {
                address: -1,
                len: 5
            })
        );
    }

    #[test]
    fn truncated_instruction() {
        // the instruction's destination cell would be at index 3, past the end
        assert_eq!(
            execute(vec![1, 0, 0]),
            Err(InterpreterError::OutOfBounds { address: 3, len: 3 })
        );
    }

    #[test]
    fn unrecognized_opcode() {
        let mut interpreter = Interpreter::new([1, 0, 0, 0, 42, 0, 0, 0, 99]);
        assert_eq!(
            interpreter.run(),
            Err(InterpreterError::UnrecognizedOpcode { opcode: 42, at: 4 })
        );
        assert!(interpreter.is_poisoned());
        assert_eq!(interpreter.run(), Err(InterpreterError::Poisoned));
    }

    #[test]
    fn skipped_opcode() {
        let mut interpreter =
            Interpreter::new([1, 0, 0, 0, 42, 0, 0, 0, 99]).with_policy(OpcodePolicy::Skip);
        assert_eq!(interpreter.run(), Ok(State::Halted));
        assert_eq!(interpreter.memory(), &[2, 0, 0, 0, 42, 0, 0, 0, 99]);
        assert_eq!(interpreter.cursor(), 8);
    }

    #[test]
    fn overflow() {
        assert_eq!(
            execute(vec![2, 5, 5, 0, 99, i64::MAX]),
            Err(InterpreterError::Overflow {
                opcode: OpCode::Mul,
                at: 0
            })
        );
    }

    #[test]
    fn mem_access() {
        let mut interpreter = Interpreter::new([1, 2, 3]);
        assert_eq!(interpreter.mem_get(2), Ok(3));
        assert_eq!(
            interpreter.mem_get(3),
            Err(InterpreterError::OutOfBounds { address: 3, len: 3 })
        );
        interpreter.mem_override(0, 99).unwrap();
        assert_eq!(interpreter[0], 99);
        assert!(interpreter.mem_override(7, 0).is_err());
    }

    #[test]
    fn opcode_conversion() {
        assert_eq!(OpCode::try_from(1), Ok(OpCode::Add));
        assert_eq!(OpCode::try_from(2), Ok(OpCode::Mul));
        assert_eq!(OpCode::try_from(99), Ok(OpCode::Halt));
        assert_eq!(OpCode::try_from(3), Err(3));
        assert_eq!(OpCode::Halt as i64, 99);
    }

    #[test]
    fn failing_logger() {
        struct Broken;
        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("broken"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut interpreter = Interpreter::new([1, 0, 0, 0, 99]);
        interpreter.log_with(Broken);
        assert!(matches!(
            interpreter.step(),
            Err(InterpreterError::LoggerFailed(_))
        ));
        // the failed instruction did not take effect, and can be retried without the logger
        assert!(!interpreter.is_poisoned());
        interpreter.stop_logging();
        assert_eq!(interpreter.run(), Ok(State::Halted));
        assert_eq!(interpreter[0], 2);
    }
}
