use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use ori_sized::{LongestPathOracle, SizeBound, SizeSignature, SizeType, SizeVar};

use crate::options::{PreservationOptions, SizeCheckFlags};
use crate::reify::Instantiation;
use crate::test_helpers::{
    both_suc, both_zero, copy_cons, copy_nil, first_order, plus_suc, plus_zero, s, Clause, F,
};
use crate::trace::Verdict;

use super::{ClauseSummary, PreservationRun};

static ORACLE: LongestPathOracle = LongestPathOracle;

fn run_with(signature: SizeSignature, options: PreservationOptions) -> PreservationRun<'static> {
    PreservationRun::new(vec![F], F, signature, &ORACLE, options)
}

fn check(run: &mut PreservationRun<'_>, clause: Clause) -> ClauseSummary {
    match run.check_clause(clause) {
        Ok(summary) => summary,
        Err(never) => match never {},
    }
}

fn final_candidates(arity: u32, clauses: &[Clause]) -> BTreeMap<SizeVar, Vec<SizeVar>> {
    let mut run = run_with(first_order(arity), PreservationOptions::default());
    for &clause in clauses {
        check(&mut run, clause);
    }
    run.candidates().clone()
}

#[test]
fn scenario_preserved() {
    let mut run = run_with(first_order(1), PreservationOptions::default());
    check(&mut run, copy_nil);
    check(&mut run, copy_cons);
    assert_eq!(run.candidates().get(&s(1)), Some(&vec![s(0)]));

    let outcome = run.finish();
    assert_eq!(outcome.decisions, vec![(s(1), Instantiation::To(s(0)))]);
    assert_eq!(outcome.signature.to_string(), "[s0] (#s0 -> #s0)");
    assert!(outcome.notes.is_empty());
}

#[test]
fn scenario_unrelated() {
    let mut run = run_with(first_order(2), PreservationOptions::default());
    check(&mut run, plus_zero);
    check(&mut run, plus_suc);
    assert_eq!(run.candidates().get(&s(2)), Some(&vec![]));

    let outcome = run.finish();
    assert_eq!(outcome.decisions, vec![(s(2), Instantiation::Infinity)]);
    assert_eq!(
        outcome.signature.to_string(),
        "[s0, s1] (#s0 -> (#s1 -> #inf))"
    );
}

#[test]
fn scenario_ambiguous() {
    let mut run = run_with(first_order(2), PreservationOptions::default());
    check(&mut run, both_zero);
    check(&mut run, both_suc);
    assert_eq!(run.candidates().get(&s(2)), Some(&vec![s(0), s(1)]));

    let outcome = run.finish();
    assert_eq!(outcome.decisions, vec![(s(2), Instantiation::Infinity)]);
}

#[test]
fn scenario_coinductive_duality() {
    // repeat : Nat s0 -> Stream s1
    let signature = SizeSignature::new(
        vec![SizeBound::Unbounded; 2],
        [s(1)],
        SizeType::arrow(SizeType::sized(s(0)), SizeType::sized(s(1))),
    );
    let run = run_with(signature, PreservationOptions::default());
    assert!(run.candidates().is_empty());

    let outcome = run.finish();
    assert!(outcome.decisions.is_empty());
    assert_eq!(outcome.signature.to_string(), "[s0, s1 co] (#s0 -> #s1)");
}

#[test]
fn disabled_preservation_keeps_the_analysis_but_drops_the_claim() {
    let mut run = run_with(
        first_order(1),
        PreservationOptions::new(SizeCheckFlags::empty()),
    );
    check(&mut run, copy_cons);
    assert_eq!(run.candidates().get(&s(1)), Some(&vec![s(0)]));

    let outcome = run.finish();
    assert_eq!(outcome.decisions, vec![(s(1), Instantiation::Infinity)]);
    assert_eq!(outcome.signature.to_string(), "[s0] (#s0 -> #inf)");
}

#[test]
fn trace_keeps_notes() {
    let mut run = run_with(first_order(2), PreservationOptions::new(SizeCheckFlags::all()));
    check(&mut run, plus_zero);
    check(&mut run, plus_suc);

    let rendered: Vec<String> = run.finish().notes.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "fn#1 s2: candidate s0 rejected (incoherent)",
            "fn#1 s2: candidate s1 kept",
            "fn#1 s2: candidate s1 rejected (incoherent)",
            "fn#1 s2: not preserved",
        ]
    );
}

#[test]
fn decisions_are_noted() {
    let mut run = run_with(first_order(1), PreservationOptions::new(SizeCheckFlags::all()));
    check(&mut run, copy_cons);
    let outcome = run.finish();
    let last = outcome.notes.last().map(|note| (note.variable, note.verdict));
    assert_eq!(
        last,
        Some((s(1), Verdict::Decided(Instantiation::To(s(0)))))
    );
}

#[test]
fn failed_clause_leaves_candidates_untouched() {
    let mut run = run_with(first_order(2), PreservationOptions::default());
    let result = run.check_clause(|ctx| {
        if let Err(never) = plus_zero(ctx) {
            match never {}
        }
        Err("unsupported pattern")
    });
    assert_eq!(result, Err("unsupported pattern"));
    assert_eq!(run.candidates().get(&s(2)), Some(&vec![s(0), s(1)]));
}

#[test]
fn clause_summary_resolves_flexibles() {
    let mut run = run_with(first_order(1), PreservationOptions::default());

    // nil rigid s2, result s3
    let nil = check(&mut run, copy_nil);
    let expected: BTreeMap<_, _> = [(s(3), Instantiation::To(s(2)))].into_iter().collect();
    assert_eq!(nil.flexibles, expected);

    // xs s4, call (s5, s6), result s7
    let cons = check(&mut run, copy_cons);
    let expected: BTreeMap<_, _> = [
        (s(5), Instantiation::Infinity),
        (s(6), Instantiation::To(s(1))),
        (s(7), Instantiation::To(s(1))),
    ]
    .into_iter()
    .collect();
    assert_eq!(cons.flexibles, expected);
    assert_eq!(run.context().matrix().rows().len(), 2);
}

#[test]
fn rewritten_signature_is_dense() {
    let mut run = run_with(first_order(2), PreservationOptions::default());
    check(&mut run, both_suc);
    let outcome = run.finish();

    let mut used = outcome.signature.ty.used_vars();
    used.sort();
    assert_eq!(used, outcome.signature.vars().collect::<Vec<_>>());
}

mod proptest_order {
    use proptest::prelude::*;

    use crate::test_helpers::{
        both_suc, both_zero, copy_cons, copy_nil, plus_suc, plus_zero, Clause,
    };

    use super::final_candidates;

    fn permuted(clauses: &[Clause], order: &[usize]) -> Vec<Clause> {
        order.iter().map(|&i| clauses[i]).collect()
    }

    proptest! {
        #[test]
        fn copy_is_order_independent(
            order in Just(vec![0usize, 1, 1, 0]).prop_shuffle()
        ) {
            let clauses: [Clause; 2] = [copy_nil, copy_cons];
            prop_assert_eq!(
                final_candidates(1, &permuted(&clauses, &order)),
                final_candidates(1, &clauses)
            );
        }

        #[test]
        fn plus_is_order_independent(
            order in Just(vec![0usize, 1, 0]).prop_shuffle()
        ) {
            let clauses: [Clause; 2] = [plus_zero, plus_suc];
            prop_assert_eq!(
                final_candidates(2, &permuted(&clauses, &order)),
                final_candidates(2, &clauses)
            );
        }

        #[test]
        fn lockstep_is_order_independent(
            order in Just(vec![0usize, 1, 1]).prop_shuffle()
        ) {
            let clauses: [Clause; 2] = [both_zero, both_suc];
            prop_assert_eq!(
                final_candidates(2, &permuted(&clauses, &order)),
                final_candidates(2, &clauses)
            );
        }
    }
}
