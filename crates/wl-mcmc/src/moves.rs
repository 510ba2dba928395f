use rand::seq::SliceRandom;
use rand::RngCore;
use wl_core::errors::ErrorInfo;
use wl_core::{Move, PairTable, PairingRule, WlError, MIN_HAIRPIN};

/// Enumerates every legal move out of `config` in ascending order of the opening position.
///
/// Each existing pair yields one deletion. Each unpaired `i` yields one
/// insertion per unpaired `j` reachable without crossing: the scan skips
/// over pairs nested to the right of `i` and stops at the closing position
/// of the pair enclosing `i`.
pub fn enumerate_moves<R>(config: &PairTable, rule: &R) -> Vec<Move>
where
    R: PairingRule + ?Sized,
{
    let n = config.len();
    let mut moves = Vec::new();
    for i in 0..n {
        match config.partner(i) {
            Some(j) if j > i => moves.push(Move::Delete { i, j }),
            Some(_) => {}
            None => {
                let mut k = i + 1;
                while k < n {
                    match config.partner(k) {
                        Some(p) if p > k => k = p + 1,
                        Some(_) => break,
                        None => {
                            if k - i > MIN_HAIRPIN && rule.can_pair(i, k) {
                                moves.push(Move::Insert { i, j: k });
                            }
                            k += 1;
                        }
                    }
                }
            }
        }
    }
    moves
}

/// Same set as [`enumerate_moves`] in uniformly random order.
pub fn enumerate_moves_shuffled<R, G>(config: &PairTable, rule: &R, rng: &mut G) -> Vec<Move>
where
    R: PairingRule + ?Sized,
    G: RngCore + ?Sized,
{
    let mut moves = enumerate_moves(config, rule);
    moves.shuffle(rng);
    moves
}

/// Draws one legal move uniformly at random.
pub fn random_move<R, G>(config: &PairTable, rule: &R, rng: &mut G) -> Result<Move, WlError>
where
    R: PairingRule + ?Sized,
    G: RngCore + ?Sized,
{
    let mut moves = enumerate_moves(config, rule);
    let (picked, _) = moves.partial_shuffle(rng, 1);
    picked.first().copied().ok_or_else(|| {
        WlError::MoveSet(
            ErrorInfo::new("no-moves", "configuration has no legal neighbours")
                .with_context("structure", config)
                .with_hint("check the pairing rule and the sequence length"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wl_core::RngHandle;

    fn any_pair(_: usize, _: usize) -> bool {
        true
    }

    #[test]
    fn open_chain_offers_separated_insertions() {
        let pt = PairTable::open_chain(6);
        let moves = enumerate_moves(&pt, &any_pair);
        assert_eq!(
            moves,
            vec![
                Move::Insert { i: 0, j: 4 },
                Move::Insert { i: 0, j: 5 },
                Move::Insert { i: 1, j: 5 },
            ]
        );
    }

    #[test]
    fn nested_pairs_are_skipped_and_enclosing_pairs_stop_the_scan() {
        // 0 pairs with 11; 2..7 forms an inner pair.
        let pt = PairTable::from_dot_bracket("(.(....)...)").unwrap();
        let moves = enumerate_moves(&pt, &any_pair);
        assert!(moves.contains(&Move::Delete { i: 0, j: 11 }));
        assert!(moves.contains(&Move::Delete { i: 2, j: 7 }));
        assert!(moves.contains(&Move::Insert { i: 1, j: 8 }));
        assert!(moves.contains(&Move::Insert { i: 1, j: 10 }));
        assert!(!moves.iter().any(|mv| mv.pair().1 == 11 && !mv.is_deletion()));
        assert!(!moves.contains(&Move::Insert { i: 1, j: 5 }));
    }

    #[test]
    fn no_moves_is_an_error() {
        let pt = PairTable::open_chain(4);
        let mut rng = RngHandle::from_seed(3);
        let err = random_move(&pt, &any_pair, &mut rng).unwrap_err();
        assert_eq!(err.info().code, "no-moves");
    }

    #[test]
    fn shuffled_enumeration_is_a_permutation() {
        let pt = PairTable::from_dot_bracket("..(....)......").unwrap();
        let mut sorted = enumerate_moves(&pt, &any_pair);
        let mut shuffled = enumerate_moves_shuffled(&pt, &any_pair, &mut RngHandle::from_seed(11));
        sorted.sort();
        shuffled.sort();
        assert_eq!(sorted, shuffled);
    }
}
