use proptest::prelude::*;

use trit_core::{
    and3, apply_density_penalty, classify, not3, or3, weighted_consensus, Ewma, Vote,
};
use trit_types::Trit;

fn any_trit() -> impl Strategy<Value = Trit> {
    prop_oneof![Just(Trit::Zero), Just(Trit::Psi), Just(Trit::One)]
}

fn rank(t: Trit) -> u8 {
    match t {
        Trit::Zero => 0,
        Trit::Psi => 1,
        Trit::One => 2,
    }
}

proptest! {
    #[test]
    fn psi_exactly_inside_band(c in 0.0f64..=1.0, theta in 0.1f64..=0.9, delta in 0.01f64..=0.1) {
        let inside = c >= theta - delta && c <= theta + delta;
        prop_assert_eq!(classify(c, theta, delta) == Trit::Psi, inside);
    }

    #[test]
    fn classify_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0, delta in 0.01f64..=0.25) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(classify(lo, 0.5, delta)) <= rank(classify(hi, 0.5, delta)));
    }

    #[test]
    fn ewma_stays_in_unit_interval(
        alpha in 0.001f64..=1.0,
        samples in prop::collection::vec(0.0f64..=1.0, 1..200),
    ) {
        let mut ewma = Ewma::new(alpha, 0.5);
        for s in samples {
            let v = ewma.update(s);
            prop_assert!((0.0..=1.0).contains(&v), "ewma escaped: {}", v);
        }
    }

    #[test]
    fn density_penalty_moves_toward_threshold(c in 0.0f64..=1.0, d in 0.0f64..=1.0) {
        let adjusted = apply_density_penalty(c, d, 0.5);
        prop_assert!((adjusted - 0.5).abs() <= (c - 0.5).abs() + 1e-12);
    }

    #[test]
    fn consensus_margin_bounded(
        votes in prop::collection::vec((any_trit(), 0.0f64..10.0), 1..50),
    ) {
        let votes: Vec<Vote> = votes.into_iter().map(|(t, w)| Vote::new(t, w)).collect();
        let outcome = weighted_consensus(&votes, 0.1).unwrap();
        prop_assert!((0.0..=1.0).contains(&outcome.margin));
    }

    #[test]
    fn kleene_de_morgan(a in any_trit(), b in any_trit()) {
        prop_assert_eq!(not3(and3(a, b)), or3(not3(a), not3(b)));
        prop_assert_eq!(not3(or3(a, b)), and3(not3(a), not3(b)));
    }

    #[test]
    fn kleene_commutative(a in any_trit(), b in any_trit()) {
        prop_assert_eq!(and3(a, b), and3(b, a));
        prop_assert_eq!(or3(a, b), or3(b, a));
    }

    #[test]
    fn double_negation(a in any_trit()) {
        prop_assert_eq!(not3(not3(a)), a);
    }
}
