// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Structured tracing of executed instructions
use std::fmt::{self, Debug, Display};

use itertools::Itertools;

use super::{Interpreter, OpCode};

/// Each operand of a 3-parameter instruction, as `(parameter, resolved value)`.
/// For the destination, the resolved value is the value stored.
type Operands = [(i64, i64); 3];

#[derive(Clone, Copy, PartialEq)]
enum TracedOp {
    Add(Operands),
    Mul(Operands),
    Halt,
    Skipped,
}

#[derive(Clone, PartialEq)]
/// An opaque type containing information about what instruction was executed, which can be queried
/// with its various methods, or converted into a [String] using its [Display] impl.
pub struct TracedInstr {
    op: TracedOp,
    op_int: i64,
    instr_ptr: usize,
}

impl TracedInstr {
    /// Return the instruction pointer's position when the traced instruction was executed
    pub fn instr_ptr(&self) -> usize {
        self.instr_ptr
    }

    /// Return the actual integer of the traced instruction
    pub fn op_int(&self) -> i64 {
        self.op_int
    }

    /// Return the opcode of the traced instruction, or [`None`] if it was an unrecognized int
    /// that was skipped over
    pub fn op_code(&self) -> Option<OpCode> {
        match self.op {
            TracedOp::Add(_) => Some(OpCode::Add),
            TracedOp::Mul(_) => Some(OpCode::Mul),
            TracedOp::Halt => Some(OpCode::Halt),
            TracedOp::Skipped => None,
        }
    }

    /// If the instruction stored a value, return that value
    pub fn stored_val(&self) -> Option<i64> {
        self.operands().map(|[.., (_, stored)]| stored)
    }

    /// If the instruction took parameters, return each as `(parameter, resolved value)`
    pub fn operands(&self) -> Option<Operands> {
        match self.op {
            TracedOp::Add(operands) | TracedOp::Mul(operands) => Some(operands),
            TracedOp::Halt | TracedOp::Skipped => None,
        }
    }
}

impl Interpreter {
    /// Begin a [Trace] of executed instructions. If a trace is already running, this replaces that
    /// trace and returns in a [`Some`], otherwise, it returns [`None`].
    ///
    /// # Example
    /// ```
    ///# use gravity_assist::prelude::*;
    /// let mut interp = Interpreter::new([1, 0, 0, 0, 99]);
    /// assert!(interp.start_trace().is_none());
    /// interp.run().unwrap();
    /// let trace = interp.end_trace().unwrap();
    /// assert_eq!(trace.0.len(), 2);
    /// assert_eq!(trace.0[0].stored_val(), Some(2));
    /// ```
    pub fn start_trace(&mut self) -> Option<Trace> {
        self.trace.replace(Trace::new())
    }

    /// Stop tracing executed instructions into a [Trace]. If no trace was active, returns [`None`]
    ///
    /// see [Interpreter::start_trace]
    pub fn end_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Get a view of the current trace
    pub fn show_trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    pub(crate) fn trace_op3(&mut self, opcode: OpCode, operands: Operands) {
        let op = match opcode {
            OpCode::Add => TracedOp::Add(operands),
            OpCode::Mul => TracedOp::Mul(operands),
            OpCode::Halt => TracedOp::Halt,
        };
        self.push_trace(op, opcode as i64);
    }

    pub(crate) fn trace_halt(&mut self) {
        self.push_trace(TracedOp::Halt, OpCode::Halt as i64);
    }

    pub(crate) fn trace_skipped(&mut self, op_int: i64) {
        self.push_trace(TracedOp::Skipped, op_int);
    }

    fn push_trace(&mut self, op: TracedOp, op_int: i64) {
        let instr_ptr = self.index;
        if let Some(Trace(ref mut trace)) = self.trace {
            trace.push(TracedInstr {
                op,
                op_int,
                instr_ptr,
            });
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
/// A log of instructions that an [Interpreter] has executed since a call to
/// [Interpreter::start_trace]
///
/// see [Interpreter::start_trace]
pub struct Trace(pub Vec<TracedInstr>);

impl Trace {
    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

impl Debug for TracedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! variant {
            ($name: literal, $operands: ident) => {
                f.debug_tuple($name)
                    .field(&format_args!("{} => {}", $operands[0].0, $operands[0].1))
                    .field(&format_args!("{} => {}", $operands[1].0, $operands[1].1))
                    .field(&format_args!("{} => {}", $operands[2].0, $operands[2].1))
                    .finish()
            };
        }
        match self {
            Self::Add(operands) => variant!("Add", operands),
            Self::Mul(operands) => variant!("Mul", operands),
            Self::Halt => write!(f, "Halt"),
            Self::Skipped => write!(f, "Skipped"),
        }
    }
}

impl Debug for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedInstr")
            .field("op", &self.op)
            .field("op_int", &self.op_int)
            .field("instr_ptr", &self.instr_ptr)
            .finish()
    }
}

impl Display for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ran instruction at {:0>4}: op int {: <5} | ",
            self.instr_ptr, self.op_int
        )?;

        match (self.op, self.op_code()) {
            (TracedOp::Add([(pa, va), (pb, vb), (dest, val)]), Some(opcode))
            | (TracedOp::Mul([(pa, va), (pb, vb), (dest, val)]), Some(opcode)) => write!(
                f,
                "[{opcode} {pa} (resolves to {va}), {pb} (resolves to {vb}), {dest} (stored {val})]"
            ),
            (TracedOp::Skipped, _) => write!(f, "[SKIP]"),
            _ => write!(f, "[HALT]"),
        }
    }
}
