use super::category::Category;
use super::evaluator;
use crate::cards::card::Card;
use crate::cards::rank::Rank;

/// A hand's strength: the best five-card hand makeable from the
/// input cards, with an integer score whose ordering is exactly
/// poker ordering. Equal scores are exact ties and split the pot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strength {
    pub category: Category,
    pub cards: Vec<Card>,
    pub kickers: Vec<Rank>,
    pub score: u32,
}

impl Strength {
    /// evaluate 5 to 7 cards, searching every five-card combination.
    /// duplicate cards or an out-of-range count are a structural bug
    /// in the caller, not a user error.
    pub fn evaluate(cards: &[Card]) -> Result<Strength> {
        if cards.len() < 5 || cards.len() > 7 {
            bail!("invalid card set: {} cards", cards.len());
        }
        let mut seen = 0u64;
        for card in cards.iter() {
            if seen & card.to_bits() != 0 {
                bail!("invalid card set: duplicate {}", card);
            }
            seen |= card.to_bits();
        }
        let n = cards.len();
        let best = (0u32..1u32 << n)
            .filter(|mask| mask.count_ones() == 5)
            .map(|mask| {
                let five = (0..n)
                    .filter(|i| mask & (1u32 << i) != 0)
                    .map(|i| cards[i])
                    .collect::<Vec<Card>>();
                evaluator::evaluate_five(&five)
            })
            .max_by_key(|scored| scored.score())
            .expect("at least one combination");
        Ok(Strength::from(best))
    }
}

impl From<evaluator::Scored> for Strength {
    fn from(scored: evaluator::Scored) -> Self {
        let score = scored.score();
        let split = scored.tiebreaks.len() - scored.category.n_kickers();
        let kickers = scored.tiebreaks[split..].to_vec();
        Self {
            category: scored.category,
            cards: scored.cards,
            kickers,
            score,
        }
    }
}

impl PartialEq for Strength {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}
impl Eq for Strength {}
impl PartialOrd for Strength {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Strength {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.score.cmp(&other.score)
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<14}", self.category)?;
        for card in self.cards.iter() {
            write!(f, " {}", card)?;
        }
        Ok(())
    }
}

use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use serde::Serialize;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::suit::Suit;

    fn strength(cards: Vec<(Rank, Suit)>) -> Strength {
        let cards = cards
            .into_iter()
            .map(Card::from)
            .collect::<Vec<Card>>();
        Strength::evaluate(&cards).unwrap()
    }

    #[test]
    fn high_card() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::King, Suit::Heart),
            (Rank::Queen, Suit::Diamond),
            (Rank::Jack, Suit::Club),
            (Rank::Nine, Suit::Spade),
        ];
        assert_eq!(strength(hand).category, Category::HighCard);
    }

    #[test]
    fn one_pair() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::King, Suit::Diamond),
            (Rank::Queen, Suit::Club),
            (Rank::Jack, Suit::Spade),
        ];
        assert_eq!(strength(hand).category, Category::OnePair);
    }

    #[test]
    fn two_pair_beats_one_pair() {
        let two = strength(vec![
            (Rank::Two, Suit::Spade),
            (Rank::Two, Suit::Heart),
            (Rank::Three, Suit::Diamond),
            (Rank::Three, Suit::Club),
            (Rank::Four, Suit::Spade),
        ]);
        let one = strength(vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::King, Suit::Diamond),
            (Rank::Queen, Suit::Club),
            (Rank::Jack, Suit::Spade),
        ]);
        assert!(two > one);
    }

    #[test]
    fn wheel_is_five_high() {
        let wheel = strength(vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Two, Suit::Heart),
            (Rank::Three, Suit::Diamond),
            (Rank::Four, Suit::Club),
            (Rank::Five, Suit::Spade),
        ]);
        let six_high = strength(vec![
            (Rank::Two, Suit::Heart),
            (Rank::Three, Suit::Diamond),
            (Rank::Four, Suit::Club),
            (Rank::Five, Suit::Spade),
            (Rank::Six, Suit::Spade),
        ]);
        let trips = strength(vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::Ace, Suit::Diamond),
            (Rank::King, Suit::Club),
            (Rank::Queen, Suit::Spade),
        ]);
        assert_eq!(wheel.category, Category::Straight);
        assert!(wheel < six_high);
        assert!(wheel > trips);
    }

    #[test]
    fn royal_flush_tops_straight_flush() {
        let royal = strength(vec![
            (Rank::Ten, Suit::Spade),
            (Rank::Jack, Suit::Spade),
            (Rank::Queen, Suit::Spade),
            (Rank::King, Suit::Spade),
            (Rank::Ace, Suit::Spade),
        ]);
        let nine_high = strength(vec![
            (Rank::Five, Suit::Heart),
            (Rank::Six, Suit::Heart),
            (Rank::Seven, Suit::Heart),
            (Rank::Eight, Suit::Heart),
            (Rank::Nine, Suit::Heart),
        ]);
        assert_eq!(royal.category, Category::RoyalFlush);
        assert_eq!(nine_high.category, Category::StraightFlush);
        assert!(royal > nine_high);
    }

    #[test]
    fn full_house_vs_flush() {
        let seven = strength(vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::Ace, Suit::Diamond),
            (Rank::King, Suit::Spade),
            (Rank::King, Suit::Heart),
            (Rank::Queen, Suit::Spade),
            (Rank::Jack, Suit::Spade),
        ]);
        assert_eq!(seven.category, Category::FullHouse);
        assert_eq!(seven.kickers, vec![]);
    }

    #[test]
    fn seven_cards_pick_best_five() {
        let seven = strength(vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::King, Suit::Diamond),
            (Rank::King, Suit::Club),
            (Rank::Queen, Suit::Spade),
            (Rank::Queen, Suit::Heart),
            (Rank::Jack, Suit::Diamond),
        ]);
        assert_eq!(seven.category, Category::TwoPair);
        assert_eq!(seven.kickers, vec![Rank::Jack]);
        let score = seven.score;
        // aces and kings with jack kicker
        assert_eq!(score >> 20, Category::TwoPair as u32);
        assert_eq!((score >> 16) & 0xf, 14);
        assert_eq!((score >> 12) & 0xf, 13);
        assert_eq!((score >> 8) & 0xf, 11);
    }

    #[test]
    fn equal_hands_tie_across_suits() {
        let spades = strength(vec![
            (Rank::King, Suit::Spade),
            (Rank::King, Suit::Heart),
            (Rank::Nine, Suit::Spade),
            (Rank::Five, Suit::Diamond),
            (Rank::Two, Suit::Club),
        ]);
        let hearts = strength(vec![
            (Rank::King, Suit::Diamond),
            (Rank::King, Suit::Club),
            (Rank::Nine, Suit::Heart),
            (Rank::Five, Suit::Club),
            (Rank::Two, Suit::Spade),
        ]);
        assert_eq!(spades, hearts);
        assert_eq!(spades.score, hearts.score);
    }

    #[test]
    fn kicker_breaks_tie() {
        let better = strength(vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::King, Suit::Diamond),
            (Rank::Queen, Suit::Club),
            (Rank::Jack, Suit::Spade),
        ]);
        let worse = strength(vec![
            (Rank::Ace, Suit::Diamond),
            (Rank::Ace, Suit::Club),
            (Rank::King, Suit::Spade),
            (Rank::Queen, Suit::Heart),
            (Rank::Ten, Suit::Spade),
        ]);
        assert!(better > worse);
    }

    #[test]
    fn rejects_short_and_long_inputs() {
        let four = (0..4).map(Card::from).collect::<Vec<Card>>();
        let eight = (0..8).map(Card::from).collect::<Vec<Card>>();
        assert!(Strength::evaluate(&four).is_err());
        assert!(Strength::evaluate(&eight).is_err());
    }

    #[test]
    fn rejects_duplicates() {
        let mut cards = (0..5).map(Card::from).collect::<Vec<Card>>();
        cards[4] = cards[0];
        assert!(Strength::evaluate(&cards).is_err());
    }
}
