// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use std::fmt;
use std::io::Write;
use std::sync::PoisonError;

use super::*;

/// Convert an index into the signed form used when reporting bad addresses
pub(crate) fn to_address(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

impl Interpreter {
    pub(crate) fn out_of_bounds(&self, address: i64) -> InterpreterError {
        InterpreterError::OutOfBounds {
            address,
            len: self.code.len(),
        }
    }

    /// Decode `op_int`, returning `None` if it should be skipped over.
    /// Unrecognized opcodes mark `self` as poisoned under [`OpcodePolicy::Strict`]
    pub(crate) fn decode(&mut self, op_int: i64) -> Result<Option<OpCode>, InterpreterError> {
        match (OpCode::try_from(op_int), self.policy) {
            (Ok(opcode), _) => Ok(Some(opcode)),
            (Err(_), OpcodePolicy::Skip) => Ok(None),
            (Err(opcode), OpcodePolicy::Strict) => {
                self.poisoned = true;
                Err(InterpreterError::UnrecognizedOpcode {
                    opcode,
                    at: self.index,
                })
            }
        }
    }

    /// Resolves `address` to an index into memory.
    /// If it's negative or past the end of memory, marks `self` as poisoned and returns the error
    pub(crate) fn resolve_addr(&mut self, address: i64) -> Result<usize, InterpreterError> {
        match usize::try_from(address) {
            Ok(i) if i < self.code.len() => Ok(i),
            _ => {
                self.poisoned = true;
                Err(self.out_of_bounds(address))
            }
        }
    }

    /// Reads the int at `address`, with the same checks as [`Interpreter::resolve_addr`]
    pub(crate) fn checked_access(&mut self, address: i64) -> Result<i64, InterpreterError> {
        self.resolve_addr(address).map(|i| self.code[i])
    }

    /// Reads the raw int of the `offset`th parameter of the current instruction
    fn param(&mut self, offset: usize) -> Result<i64, InterpreterError> {
        self.checked_access(to_address(self.index + offset))
    }

    /// common logic of both instructions that take 3 parameters
    pub(crate) fn op3(
        &mut self,
        op_int: i64,
        opcode: OpCode,
        operation: impl Fn(i64, i64) -> Option<i64>,
    ) -> Result<Option<State>, InterpreterError> {
        let params = [self.param(1)?, self.param(2)?, self.param(3)?];
        let a = self.checked_access(params[0])?;
        let b = self.checked_access(params[1])?;
        let dest = self.resolve_addr(params[2])?;
        let Some(val) = operation(a, b) else {
            self.poisoned = true;
            return Err(InterpreterError::Overflow {
                opcode,
                at: self.index,
            });
        };
        self.report(format_args!(
            "{op_int:<5} [{opcode}({}, {}, {})]",
            params[0], params[1], params[2]
        ))?;
        self.trace_op3(opcode, [(params[0], a), (params[1], b), (params[2], val)]);
        self.code[dest] = val;
        self.index += 4;
        Ok(None)
    }

    /// Write a line to the logger, if one is set
    pub(crate) fn report(&self, args: fmt::Arguments<'_>) -> Result<(), InterpreterError> {
        if let Some(ref logger) = self.logger {
            let mut logger = logger.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(logger, "ip: {:>8} | {args}", self.index)?;
        }
        Ok(())
    }
}
