use std::collections::{HashMap, HashSet, hash_map::Entry};

use super::{Dpda, State, Symbol, TransitionFrom, TransitionTo};

use crate::loader::{
    Context, DELTA_LOWER, GAMMA_UPPER, INITIAL_STACK, INITIAL_STATE, SIGMA_UPPER, Spanned,
    ast::{self, Symbol as Sym},
    log::LogSink,
};

impl<'a> Dpda<'a> {
    pub fn compile(
        items: impl Iterator<Item = Spanned<ast::TopLevel<'a>>>,
        ctx: &mut Context<'a>,
    ) -> Option<Dpda<'a>> {
        let mut initial_state = None;
        let mut initial_stack = None;

        let mut states = HashSet::new();
        let mut stack_symbols = HashSet::new();
        let mut alphabet = HashSet::new();
        let mut final_states = HashSet::new();

        let mut transitions: HashMap<TransitionFrom<'a>, TransitionTo<'a>> = HashMap::new();

        for Spanned(element, span) in items {
            use Spanned as S;
            use ast::TopLevel as TL;
            match element {
                TL::Item(S("Q", _), list) => {
                    if !states.is_empty() {
                        ctx.emit_error("states already set", span);
                    }
                    let Some(list) = list.expect_set(ctx) else {
                        continue;
                    };
                    for item in list {
                        let Some(ident) = item.expect_ident(ctx) else {
                            continue;
                        };
                        if !states.insert(State(ident)) {
                            ctx.emit_error("state redefined", item.1);
                        }
                    }

                    if list.is_empty() {
                        ctx.emit_error("states cannot be empty", span);
                    }
                }
                TL::Item(S("E" | SIGMA_UPPER | "sigma", _), list) => {
                    if !alphabet.is_empty() {
                        ctx.emit_error("alphabet already set", span);
                    }
                    let Some(list) = list.expect_set(ctx) else {
                        continue;
                    };
                    for item in list {
                        let Some(ident) = item.expect_ident(ctx) else {
                            continue;
                        };

                        let mut chars = ident.chars();
                        match (chars.next(), chars.next()) {
                            (Some(letter), None) => {
                                if !alphabet.insert(letter) {
                                    ctx.emit_error("letter redefined", item.1);
                                }
                            }
                            _ => {
                                ctx.emit_error("letter cannot be longer than one char", item.1);
                            }
                        }
                    }
                    if list.is_empty() {
                        ctx.emit_error("alphabet cannot be empty", span);
                    }
                }
                TL::Item(S("F", _), list) => {
                    if !final_states.is_empty() {
                        ctx.emit_error("final states already set", span);
                    }
                    let Some(list) = list.expect_set(ctx) else {
                        continue;
                    };
                    for item in list {
                        let Some(ident) = item.expect_ident(ctx) else {
                            continue;
                        };
                        if states.contains(&State(ident)) {
                            if !final_states.insert(State(ident)) {
                                ctx.emit_error("final state redefined", item.1);
                            }
                        } else {
                            ctx.emit_error("final state not defined in set of states", item.1);
                        }
                    }
                }
                TL::Item(S("T" | GAMMA_UPPER | "gamma", _), list) => {
                    if !stack_symbols.is_empty() {
                        ctx.emit_error("stack symbols already set", span);
                    }
                    let Some(list) = list.expect_set(ctx) else {
                        continue;
                    };
                    for item in list {
                        let Some(ident) = item.expect_ident(ctx) else {
                            continue;
                        };

                        if !stack_symbols.insert(Symbol(ident)) {
                            ctx.emit_error("stack symbol redefined", item.1);
                        }
                    }

                    if list.is_empty() {
                        ctx.emit_error("stack symbols cannot be empty", span);
                    }
                }
                TL::Item(S("I" | "q0", _), S(src, src_d)) => match src {
                    ast::Item::Symbol(Sym::Ident(ident)) => {
                        if initial_state.is_some() {
                            ctx.emit_error("initial state already set", span);
                        }
                        if states.contains(&State(ident)) {
                            initial_state = Some(State(ident))
                        } else {
                            ctx.emit_error("initial state symbol not defined as a state", src_d);
                        }
                    }
                    _ => _ = ctx.emit_error("expected ident", src_d),
                },
                TL::Item(S("S" | "z0", _), S(src, src_d)) => match src {
                    ast::Item::Symbol(Sym::Ident(ident)) => {
                        if initial_stack.is_some() {
                            ctx.emit_error("initial stack already set", span);
                        }
                        if stack_symbols.contains(&Symbol(ident)) {
                            initial_stack = Some(Symbol(ident));
                        } else {
                            ctx.emit_error(
                                "initial stack symbol not defined as a stack symbol",
                                src_d,
                            );
                        }
                    }
                    _ => _ = ctx.emit_error("expected ident", src_d),
                },
                TL::Item(S(name, dest_s), _) => {
                    ctx.emit_error(format!("unknown item {name:?}, expected 'Q' | 'E' | '{SIGMA_UPPER}' | 'sigma' | 'F' | 'T' | '{GAMMA_UPPER}' | 'gamma' | 'I' | 'q0' | 'S' | 'z0'"), dest_s);
                }

                TL::TransitionFunc(S((S("d" | DELTA_LOWER | "delta", _), tuple), _), list) => {
                    let list = list.set_weak();
                    let Some((state, letter, stack_symbol)) =
                        tuple.as_ref().expect_transition_function(ctx)
                    else {
                        continue;
                    };
                    if !states.contains(&State(state.0)) {
                        ctx.emit_error("transition state not defined as state", state.1);
                        continue;
                    };

                    let letter: Option<char> = match letter.0 {
                        Sym::Epsilon(_) => None,
                        Sym::Ident(val) => {
                            let mut chars = val.chars();
                            match (chars.next(), chars.next()) {
                                (Some(char), None) => {
                                    if !alphabet.contains(&char) {
                                        ctx.emit_error(
                                            "transition letter not defined in alphabet",
                                            letter.1,
                                        );
                                    }
                                    Some(char)
                                }
                                _ => {
                                    ctx.emit_error(
                                        "transition letter can only be single character",
                                        letter.1,
                                    );
                                    continue;
                                }
                            }
                        }
                    };

                    // epsilon as the stack top keys the empty stack sentinel
                    let top: Option<Symbol<'a>> = match stack_symbol.0 {
                        Sym::Epsilon(_) => None,
                        Sym::Ident(ident) => {
                            if !stack_symbols.contains(&Symbol(ident)) {
                                ctx.emit_error(
                                    "transition stack symbol not defined as stack symbol",
                                    stack_symbol.1,
                                );
                                continue;
                            }
                            Some(Symbol(ident))
                        }
                    };

                    for item in list {
                        let Some((next_state, stack)) = item
                            .expect_tuple(ctx)
                            .and_then(|item| item.expect_transition(ctx))
                        else {
                            continue;
                        };

                        if !states.contains(&State(next_state.0)) {
                            ctx.emit_error("transition state not defined as state", next_state.1);
                            continue;
                        };

                        // written top first, stored deepest first
                        let push: Vec<_> = stack
                            .iter()
                            .rev()
                            .filter_map(|symbol| {
                                if matches!(symbol.0, ast::Item::Symbol(Sym::Epsilon(_))) {
                                    return None;
                                }
                                let ident = symbol.expect_ident(ctx)?;

                                if !stack_symbols.contains(&Symbol(ident)) {
                                    ctx.emit_error("transition stack symbol not defined", symbol.1);
                                    return None;
                                };
                                Some(Symbol(ident))
                            })
                            .collect();

                        match transitions.entry(TransitionFrom {
                            state: State(state.0),
                            letter,
                            top,
                        }) {
                            Entry::Occupied(_) => {
                                ctx.emit_error(
                                    "transition already defined for this starting point (the machine is deterministic)",
                                    item.1,
                                );
                            }
                            Entry::Vacant(vacant) => {
                                vacant.insert(TransitionTo {
                                    state: State(next_state.0),
                                    push,
                                });
                            }
                        }
                    }
                }
                TL::TransitionFunc(S((S(name, _), _), dest_s), _) => {
                    ctx.emit_error(
                        format!(
                            "unknown function {name:?}, expected 'd' | 'delta' | '{DELTA_LOWER}'"
                        ),
                        dest_s,
                    );
                }
            }
        }

        if stack_symbols.is_empty() {
            ctx.emit_error_locless("stack symbols never defined");
        }

        if alphabet.is_empty() {
            ctx.emit_error_locless("alphabet never defined");
        }

        if states.is_empty() {
            ctx.emit_error_locless("states never defined");
        }

        let initial_stack = match initial_stack {
            Some(some) => some,
            None => {
                if stack_symbols.contains(&Symbol(INITIAL_STACK)) {
                    ctx.emit_warning_locless(
                        "initial stack symbol not defined, defaulting to 'z0'",
                    );
                } else {
                    ctx.emit_error_locless("initial stack symbol not defined")
                        .emit_help_locless("add: S = ...");
                }
                Symbol(INITIAL_STACK)
            }
        };

        let initial_state = match initial_state {
            Some(some) => some,
            None => {
                if states.contains(&State(INITIAL_STATE)) {
                    ctx.emit_warning_locless("initial state not defined, defaulting to 'q0'");
                } else {
                    ctx.emit_error_locless("initial state not defined")
                        .emit_help_locless("add: I = ...");
                }
                State(INITIAL_STATE)
            }
        };

        if ctx.contains_errors() {
            return None;
        }

        match Dpda::new(
            states,
            alphabet,
            stack_symbols,
            transitions,
            initial_state,
            initial_stack,
            final_states,
        ) {
            Ok(dpda) => Some(dpda),
            Err(err) => {
                ctx.emit_error_locless(err.to_string());
                None
            }
        }
    }
}

impl<'a, 'b> Spanned<&'b ast::Tuple<'a>> {
    fn expect_transition_function(
        &self,
        ctx: &mut Context<'a>,
    ) -> Option<(
        Spanned<&'a str>,
        Spanned<ast::Symbol<'a>>,
        Spanned<ast::Symbol<'a>>,
    )> {
        match self.0.0.as_slice() {
            [
                Spanned(ast::Item::Symbol(ast::Symbol::Ident(state)), state_span),
                Spanned(ast::Item::Symbol(letter), letter_span),
                Spanned(ast::Item::Symbol(symbol), symbol_span),
            ] => {
                return Some((
                    Spanned(*state, *state_span),
                    Spanned(*letter, *letter_span),
                    Spanned(*symbol, *symbol_span),
                ));
            }
            _ => {
                ctx.emit_error(
                    "expected transition function (ident, ident|~, ident|~)",
                    self.1,
                );
            }
        }
        None
    }

    fn expect_transition(
        &self,
        ctx: &mut Context<'a>,
    ) -> Option<(Spanned<&'a str>, &'b [Spanned<ast::Item<'a>>])> {
        match self.0.0.as_slice() {
            [
                Spanned(ast::Item::Symbol(ast::Symbol::Ident(state)), state_span),
                list,
            ] => {
                return Some((Spanned(*state, *state_span), list.list_weak()));
            }
            _ => {
                ctx.emit_error("expected transition (ident, item|[item])", self.1);
            }
        }
        None
    }
}
