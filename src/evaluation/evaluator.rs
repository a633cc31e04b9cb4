use super::category::Category;
use crate::cards::card::Card;
use crate::cards::rank::Rank;

/// best five cards and their tiebreak ordering for one 5-card combination.
#[derive(Debug, Clone)]
pub struct Scored {
    pub category: Category,
    pub cards: Vec<Card>,
    pub tiebreaks: Vec<Rank>,
}

impl Scored {
    /// category in the high bits, tiebreak ranks in descending
    /// significance below. comparing two packed scores is exactly
    /// poker comparison; equal scores are exact ties.
    pub fn score(&self) -> u32 {
        let mut bits = 20;
        let mut score = (self.category as u32) << bits;
        for rank in self.tiebreaks.iter() {
            bits -= 4;
            score |= (rank.value() as u32) << bits;
        }
        score
    }
}

/// scores one exact 5-card hand.
pub fn evaluate_five(five: &[Card]) -> Scored {
    assert!(five.len() == 5);
    let flush = five.iter().all(|c| c.suit() == five[0].suit());
    let straight = find_straight(five);
    let groups = group_ranks(five);
    let (category, tiebreaks) = match (straight, flush) {
        (Some(Rank::Ace), true) => (Category::RoyalFlush, vec![]),
        (Some(high), true) => (Category::StraightFlush, vec![high]),
        _ => match groups.as_slice() {
            [(4, quad), (1, kick)] => (Category::FourOAK, vec![*quad, *kick]),
            [(3, trip), (2, pair)] => (Category::FullHouse, vec![*trip, *pair]),
            _ if flush => (Category::Flush, ranks_descending(five)),
            _ if straight.is_some() => (Category::Straight, vec![straight.unwrap()]),
            [(3, trip), (1, k1), (1, k2)] => (Category::ThreeOAK, vec![*trip, *k1, *k2]),
            [(2, hi), (2, lo), (1, kick)] => (Category::TwoPair, vec![*hi, *lo, *kick]),
            [(2, pair), rest @ ..] => {
                let mut tb = vec![*pair];
                tb.extend(rest.iter().map(|(_, r)| *r));
                (Category::OnePair, tb)
            }
            _ => (Category::HighCard, ranks_descending(five)),
        },
    };
    Scored {
        category,
        cards: five.to_vec(),
        tiebreaks,
    }
}

/// straight high card, if any. the wheel A-2-3-4-5 plays the ace
/// low and its high card is the Five.
fn find_straight(five: &[Card]) -> Option<Rank> {
    let mut ranks = five.iter().map(|c| c.rank() as u8).collect::<Vec<u8>>();
    ranks.sort_unstable();
    ranks.dedup();
    if ranks.len() != 5 {
        return None;
    }
    if ranks[4] - ranks[0] == 4 {
        return Some(Rank::from(ranks[4]));
    }
    const WHEEL: [u8; 5] = [0, 1, 2, 3, 12]; // 2 3 4 5 A
    if ranks == WHEEL {
        return Some(Rank::Five);
    }
    None
}

/// rank multiset as (count, rank), sorted count-major then rank-major,
/// both descending
fn group_ranks(five: &[Card]) -> Vec<(u8, Rank)> {
    let mut counts = [0u8; 13];
    for card in five.iter() {
        counts[card.rank() as u8 as usize] += 1;
    }
    let mut groups = counts
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0)
        .map(|(i, n)| (*n, Rank::from(i as u8)))
        .collect::<Vec<(u8, Rank)>>();
    groups.sort_by(|a, b| b.cmp(a));
    groups
}

fn ranks_descending(five: &[Card]) -> Vec<Rank> {
    let mut ranks = five.iter().map(|c| c.rank()).collect::<Vec<Rank>>();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    ranks
}
