use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use wl_core::{EnergyModel, Move, PairTable, PairingRule, RngHandle, MIN_HAIRPIN};
use wl_mcmc::{enumerate_moves, enumerate_moves_shuffled, random_move};
use wl_rna::{BasePairModel, Sequence};

const BASES: [char; 4] = ['A', 'C', 'G', 'U'];

fn model_for(bases: &[usize]) -> BasePairModel {
    let seq: String = bases.iter().map(|&b| BASES[b]).collect();
    BasePairModel::open_chain(Sequence::parse(&seq).unwrap()).unwrap()
}

/// Grows a structure by applying `walk` random legal moves from the open chain.
fn random_structure(model: &BasePairModel, seed: u64, walk: usize) -> PairTable {
    let mut pt = PairTable::open_chain(model.sequence().len());
    let mut rng = RngHandle::from_seed(seed);
    for _ in 0..walk {
        match random_move(&pt, model, &mut rng) {
            Ok(mv) => pt.apply(mv).unwrap(),
            Err(_) => break,
        }
    }
    pt
}

fn crosses(pt: &PairTable, i: usize, j: usize) -> bool {
    pt.pairs().any(|(k, l)| (k < i && i < l && l < j) || (i < k && k < j && j < l))
}

fn brute_force(pt: &PairTable, rule: &impl PairingRule) -> BTreeSet<Move> {
    let mut moves: BTreeSet<Move> = pt.pairs().map(|(i, j)| Move::Delete { i, j }).collect();
    for i in 0..pt.len() {
        for j in (i + 1)..pt.len() {
            if pt.partner(i).is_none()
                && pt.partner(j).is_none()
                && j - i > MIN_HAIRPIN
                && rule.can_pair(i, j)
                && !crosses(pt, i, j)
            {
                moves.insert(Move::Insert { i, j });
            }
        }
    }
    moves
}

fn sequence_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..4, 6..28)
}

proptest! {
    #[test]
    fn enumeration_matches_brute_force(bases in sequence_strategy(), seed in any::<u64>(), walk in 0usize..20) {
        let model = model_for(&bases);
        let pt = random_structure(&model, seed, walk);
        let moves = enumerate_moves(&pt, &model);
        let unique: BTreeSet<Move> = moves.iter().copied().collect();
        prop_assert_eq!(unique.len(), moves.len());
        prop_assert_eq!(unique, brute_force(&pt, &model));
        prop_assert_eq!(moves.clone(), enumerate_moves(&pt, &model));
        let openings: Vec<usize> = moves.iter().map(|mv| mv.pair().0).collect();
        prop_assert!(openings.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn moves_are_reversible(bases in sequence_strategy(), seed in any::<u64>(), walk in 0usize..20) {
        let model = model_for(&bases);
        let pt = random_structure(&model, seed, walk);
        for mv in enumerate_moves(&pt, &model) {
            let mut next = pt.clone();
            next.apply(mv).unwrap();
            prop_assert!(enumerate_moves(&next, &model).contains(&mv.inverse()));
            next.apply(mv.inverse()).unwrap();
            prop_assert_eq!(&next, &pt);
        }
    }

    #[test]
    fn move_delta_matches_reevaluation(bases in sequence_strategy(), seed in any::<u64>(), walk in 0usize..20) {
        let model = model_for(&bases);
        let pt = random_structure(&model, seed, walk);
        let before = model.evaluate(&pt).unwrap();
        for mv in enumerate_moves(&pt, &model) {
            let mut next = pt.clone();
            next.apply(mv).unwrap();
            let after = model.evaluate(&next).unwrap();
            prop_assert_eq!(model.move_delta(&pt, mv).unwrap(), after - before);
        }
    }
}

#[test]
fn shuffled_enumeration_keeps_the_set() {
    let model = model_for(&[2, 2, 2, 0, 0, 0, 1, 1, 1, 3, 3, 3, 2, 1]);
    let pt = random_structure(&model, 5, 3);
    let mut rng = RngHandle::from_seed(77);
    let shuffled: BTreeSet<Move> = enumerate_moves_shuffled(&pt, &model, &mut rng)
        .into_iter()
        .collect();
    let plain: BTreeSet<Move> = enumerate_moves(&pt, &model).into_iter().collect();
    assert_eq!(shuffled, plain);
}

#[test]
fn random_move_is_uniform() {
    let any_pair = |_: usize, _: usize| true;
    let pt = PairTable::open_chain(8);
    let moves = enumerate_moves(&pt, &any_pair);
    assert_eq!(moves.len(), 10);

    let draws = 20_000;
    let mut rng = RngHandle::from_seed(31);
    let mut counts = BTreeMap::<Move, usize>::new();
    for _ in 0..draws {
        *counts.entry(random_move(&pt, &any_pair, &mut rng).unwrap()).or_default() += 1;
    }
    assert_eq!(counts.len(), moves.len());
    let expected = draws / moves.len();
    for (mv, count) in counts {
        assert!(
            count.abs_diff(expected) < expected / 10,
            "{mv} drawn {count} times, expected about {expected}"
        );
    }
}
