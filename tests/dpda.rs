use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rstest::rstest;

use pushdown::dpda::{Dpda, Simulator, State, StepResult, Symbol, TransitionFrom, TransitionTo};
use pushdown::error::RunError;

fn from<'a>(state: &'a str, letter: Option<char>, top: Option<&'a str>) -> TransitionFrom<'a> {
    TransitionFrom {
        state: State(state),
        letter,
        top: top.map(Symbol),
    }
}

fn to<'a>(state: &'a str, push: &[&'a str]) -> TransitionTo<'a> {
    TransitionTo {
        state: State(state),
        push: push.iter().copied().map(Symbol).collect(),
    }
}

/// The machine for 0^m 1^n with 1 <= n <= m. Push lists are deepest first.
fn reference() -> Dpda<'static> {
    Dpda::new(
        HashSet::from([State("A"), State("B"), State("C")]),
        HashSet::from(['0', '1']),
        HashSet::from([Symbol("$"), Symbol("0")]),
        HashMap::from([
            (from("A", Some('0'), Some("$")), to("A", &["$", "0"])),
            (from("A", Some('0'), Some("0")), to("A", &["0", "0"])),
            (from("A", Some('1'), Some("0")), to("B", &[])),
            (from("B", Some('1'), Some("0")), to("B", &[])),
            (from("B", Some('1'), Some("$")), to("C", &["$"])),
        ]),
        State("A"),
        Symbol("$"),
        HashSet::from([State("B")]),
    )
    .unwrap()
}

#[rstest]
#[case("000111", true)]
// a single matched pair is enough, acceptance does not need the zeros used up
#[case("01", true)]
#[case("0011", true)]
#[case("000011", true)]
#[case("011", false)]
#[case("111", false)]
#[case("", false)]
#[case("0", false)]
#[case("00", false)]
#[case("10", false)]
#[case("0110", false)]
fn reference_verdicts(#[case] input: &str, #[case] accepted: bool) {
    assert_eq!(reference().process(input), Ok(accepted));
}

#[test]
fn out_of_alphabet_letter_is_an_error() {
    let machine = reference();
    assert_eq!(machine.process("2"), Err(RunError::InvalidLetter('2')));
    assert_eq!(machine.process("0021"), Err(RunError::InvalidLetter('2')));
    // even when a missing transition would end the run first
    assert_eq!(machine.process("11x"), Err(RunError::InvalidLetter('x')));
}

#[test]
fn empty_table_accepts_iff_initial_state_is_final() {
    let accepting = Dpda::new(
        HashSet::from([State("X")]),
        HashSet::from(['a']),
        HashSet::from([Symbol("Z")]),
        HashMap::new(),
        State("X"),
        Symbol("Z"),
        HashSet::from([State("X")]),
    )
    .unwrap();
    assert_eq!(accepting.process(""), Ok(true));

    let rejecting = Dpda::new(
        HashSet::from([State("X")]),
        HashSet::from(['a']),
        HashSet::from([Symbol("Z")]),
        HashMap::new(),
        State("X"),
        Symbol("Z"),
        HashSet::new(),
    )
    .unwrap();
    assert_eq!(rejecting.process(""), Ok(false));
}

#[test]
fn repeated_runs_share_one_definition() {
    let machine = reference();
    for _ in 0..3 {
        assert_eq!(machine.process("000111"), Ok(true));
        assert_eq!(machine.process("111"), Ok(false));
        assert_eq!(machine.process("01"), Ok(true));
        assert_eq!(machine.process("2"), Err(RunError::InvalidLetter('2')));
    }
}

#[test]
fn stack_stays_within_push_bound() {
    let machine = reference();
    let input = "0".repeat(64);
    let mut simulator = Simulator::begin(&machine, &input);

    // the longest push list of the reference table has two symbols
    let max_push = 2;
    let mut consumed = 0;
    loop {
        match simulator.step() {
            StepResult::Pending => {
                consumed += 1;
                assert!(simulator.stack().len() <= 1 + consumed * max_push);
            }
            StepResult::Reject => break,
            other => panic!("unexpected step result {other:?}"),
        }
    }
    assert_eq!(consumed, 64);
}

#[test]
fn trailing_epsilon_lookup_pops_even_without_a_transition() {
    let machine = reference();
    let mut simulator = Simulator::begin(&machine, "01");
    let verdict = loop {
        match simulator.step() {
            StepResult::Pending => {}
            other => break other,
        }
    };
    assert_eq!(verdict, StepResult::Accept);
    assert_eq!(simulator.state(), State("B"));
    // the '$' popped for the failed epsilon lookup is not restored
    assert!(simulator.stack().is_empty());
}

#[test]
fn trailing_epsilon_transition_can_move_into_a_final_state() {
    let machine = Dpda::new(
        HashSet::from([State("X"), State("Y")]),
        HashSet::from(['a']),
        HashSet::from([Symbol("Z")]),
        HashMap::from([(from("X", None, Some("Z")), to("Y", &["Z"]))]),
        State("X"),
        Symbol("Z"),
        HashSet::from([State("Y")]),
    )
    .unwrap();
    assert_eq!(machine.process(""), Ok(true));
}

#[test]
fn missing_transition_mid_string_is_not_rescued_by_epsilon() {
    let machine = Dpda::new(
        HashSet::from([State("X"), State("Y")]),
        HashSet::from(['a', 'b']),
        HashSet::from([Symbol("Z")]),
        HashMap::from([
            (from("X", None, Some("Z")), to("Y", &["Z"])),
            (from("Y", Some('b'), Some("Z")), to("Y", &["Z"])),
        ]),
        State("X"),
        Symbol("Z"),
        HashSet::from([State("Y")]),
    )
    .unwrap();

    // the epsilon move out of X exists but is only tried after the input
    assert_eq!(machine.process("b"), Ok(false));
    assert_eq!(machine.process(""), Ok(true));
}

#[test]
fn empty_stack_sentinel_matches_only_an_explicit_key() {
    let machine = Dpda::new(
        HashSet::from([State("X"), State("Y")]),
        HashSet::from(['a']),
        HashSet::from([Symbol("Z")]),
        HashMap::from([
            (from("X", Some('a'), Some("Z")), to("X", &[])),
            (from("X", None, None), to("Y", &[])),
        ]),
        State("X"),
        Symbol("Z"),
        HashSet::from([State("Y")]),
    )
    .unwrap();

    // "a" empties the stack, the sentinel key then applies
    assert_eq!(machine.process("a"), Ok(true));
    // with Z still on the stack the sentinel key must not match
    assert_eq!(machine.process(""), Ok(false));
}

#[test]
fn multi_character_stack_symbols_push_as_one_unit() {
    let machine = Dpda::new(
        HashSet::from([State("X"), State("Y")]),
        HashSet::from(['a', 'b']),
        HashSet::from([Symbol("bottom"), Symbol("mark")]),
        HashMap::from([
            (
                from("X", Some('a'), Some("bottom")),
                to("X", &["bottom", "mark"]),
            ),
            (from("X", Some('b'), Some("mark")), to("Y", &[])),
        ]),
        State("X"),
        Symbol("bottom"),
        HashSet::from([State("Y")]),
    )
    .unwrap();

    let mut simulator = Simulator::begin(&machine, "ab");
    assert_eq!(simulator.step(), StepResult::Pending);
    assert_eq!(simulator.stack(), [Symbol("bottom"), Symbol("mark")]);
    assert_eq!(machine.process("ab"), Ok(true));
}

proptest! {
    #[test]
    fn zeros_then_ones_accepted_iff_enough_zeros(zeros in 0usize..32, ones in 0usize..32) {
        let machine = reference();
        let input = "0".repeat(zeros) + &"1".repeat(ones);
        let expected = ones >= 1 && ones <= zeros;
        prop_assert_eq!(machine.process(&input), Ok(expected));
    }

    #[test]
    fn alien_letters_always_error(input in "[01]{0,8}[a-z2-9][01]{0,8}") {
        let machine = reference();
        prop_assert!(machine.process(&input).is_err());
    }
}
