use crate::Chips;
use crate::Position;
use crate::cards::card::Card;
use crate::gameplay::game::Game;
use crate::gameplay::game::Status;
use crate::gameplay::phase::Phase;
use crate::gameplay::record::HandSummary;
use crate::gameplay::record::LogEntry;
use crate::gameplay::record::SeatResult;
use serde::Serialize;
use uuid::Uuid;

/// what spectators may see of one seat: no hole cards, ever
#[derive(Debug, Serialize)]
pub struct SeatView {
    pub model: String,
    pub position: Position,
    pub stack: Chips,
    pub stake: Chips,
    pub spent: Chips,
    pub folded: bool,
    pub all_in: bool,
}

/// the public projection of the game document. the deck, the burn
/// pile, and live hole cards never leave the server.
#[derive(Debug, Serialize)]
pub struct GameView {
    pub id: Uuid,
    pub status: Status,
    pub current_hand: u32,
    pub phase: Phase,
    pub pot: Chips,
    pub board: Vec<Card>,
    pub dealer: Position,
    pub actor: Option<Position>,
    pub thinking: Option<Position>,
    pub seats: Vec<SeatView>,
    pub log: Vec<LogEntry>,
    pub hands: Vec<HandSummary>,
    pub ai_cost: f64,
    pub tokens_spent: u64,
    pub created_at: i64,
    pub completed_at: Option<i64>,
    pub results: Vec<SeatResult>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            status: game.status,
            current_hand: game.current_hand,
            phase: game.table.phase,
            pot: game.table.pot,
            board: game.table.board.clone(),
            dealer: game.table.dealer,
            actor: game.table.actor,
            thinking: game.thinking,
            seats: game
                .seats
                .iter()
                .map(|s| SeatView {
                    model: s.model.clone(),
                    position: s.position,
                    stack: s.stack,
                    stake: s.stake,
                    spent: s.spent,
                    folded: s.folded,
                    all_in: s.all_in,
                })
                .collect(),
            log: game.log.clone(),
            hands: game.hands.clone(),
            ai_cost: game.ai_cost,
            tokens_spent: game.tokens_spent,
            created_at: game.created_at,
            completed_at: game.completed_at,
            results: game.results.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::game::Config;

    #[test]
    fn view_hides_cards_and_deck() {
        let models = vec!["a".to_string(), "b".to_string()];
        let mut game = Game::create(Config::default(), &models, true);
        game.status = Status::Active;
        game.begin_hand();
        game.post_blinds();
        game.deal_holes();
        let view = GameView::from(&game);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("hole"));
        assert!(!json.contains("deck"));
        assert!(!json.contains("burned"));
        assert_eq!(view.seats.len(), 2);
        assert_eq!(view.pot, 30);
    }
}
