/// hand categories in ascending order of strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOAK = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOAK = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl Category {
    /// how many tiebreak ranks fall outside the made pattern
    pub const fn n_kickers(&self) -> usize {
        match self {
            Category::HighCard => 4,
            Category::OnePair => 3,
            Category::ThreeOAK => 2,
            Category::FourOAK | Category::TwoPair => 1,
            _ => 0,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Category::HighCard => write!(f, "HighCard"),
            Category::OnePair => write!(f, "OnePair"),
            Category::TwoPair => write!(f, "TwoPair"),
            Category::ThreeOAK => write!(f, "ThreeOfAKind"),
            Category::Straight => write!(f, "Straight"),
            Category::Flush => write!(f, "Flush"),
            Category::FullHouse => write!(f, "FullHouse"),
            Category::FourOAK => write!(f, "FourOfAKind"),
            Category::StraightFlush => write!(f, "StraightFlush"),
            Category::RoyalFlush => write!(f, "RoyalFlush"),
        }
    }
}

use serde::Deserialize;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};
