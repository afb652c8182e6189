// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 2 built using the `gravity_assist` library.

use gravity_assist::parse::parse_ascii;
use gravity_assist::prelude::*;

fn part1(mut i: Interpreter) -> i64 {
    i[1] = 12;
    i[2] = 2;
    let state = i.run().unwrap();
    assert_eq!(state, State::Halted, "intcode did not run to completion");
    i[0]
}

fn part2(code: &[i64]) -> i64 {
    #[allow(clippy::unreadable_literal, reason = "from Advent of Code")]
    let pair = find_pair(code, &SearchConfig::new(19690720)).unwrap();
    let ParamPair { noun, verb } = pair.found().expect("no answer found for part 2");
    100 * noun + verb
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    let code = parse_ascii(&input).unwrap();
    println!("part 1: {}", part1(Interpreter::new(code.clone())));
    println!("part 2: {}", part2(&code));
}
