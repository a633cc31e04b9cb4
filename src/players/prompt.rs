use crate::Position;
use crate::gameplay::action::Legal;
use crate::gameplay::game::Game;
use std::fmt::Write;

/// render the compact table context one model sees on its turn:
/// its private cards, the shared board, stacks and statuses, the
/// current hand's betting so far, and exactly what it may do.
pub fn render(game: &Game, pos: Position, legal: &Legal) -> String {
    let seat = game.seat(pos);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are {} in a no-limit hold'em game, seat {} of {}.",
        seat.model,
        pos,
        game.seats.len()
    );
    let _ = writeln!(
        out,
        "Hand {} of {}, {} street. Blinds {}/{}.",
        game.current_hand,
        game.config.max_hands,
        game.table.phase,
        game.config.small_blind,
        game.config.big_blind
    );
    let hole = seat
        .hole
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<String>>()
        .join(" ");
    let board = match game.table.board.is_empty() {
        true => "none yet".to_string(),
        false => game
            .table
            .board
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(" "),
    };
    let _ = writeln!(out, "Your cards: {}. Board: {}.", hole, board);
    let _ = writeln!(
        out,
        "Pot: {}. Your stack: {}. To match: {}.",
        game.table.pot, seat.stack, game.table.stake
    );
    let _ = writeln!(out, "Opponents:");
    for other in game.seats.iter().filter(|s| s.position != pos) {
        let status = if other.folded {
            "folded"
        } else if other.all_in {
            "all-in"
        } else {
            "live"
        };
        let button = match other.position == game.table.dealer {
            true => ", button",
            false => "",
        };
        let _ = writeln!(
            out,
            "  seat {} ({}): {} chips, {}{}",
            other.position, other.model, other.stack, status, button
        );
    }
    if !game.table.actions.is_empty() {
        let _ = writeln!(out, "This hand so far:");
        for (actor, action) in game.table.actions.iter() {
            let _ = writeln!(out, "  seat {}: {}", actor, action);
        }
    }
    let _ = writeln!(out, "Legal actions:");
    let _ = writeln!(out, "  FOLD");
    if legal.can_check {
        let _ = writeln!(out, "  CHECK");
    }
    if legal.can_call {
        let _ = writeln!(out, "  CALL ({} chips)", legal.call_amount);
    }
    if legal.can_raise {
        let _ = writeln!(
            out,
            "  RAISE $<total> (total between {} and {})",
            legal.min_raise_total.min(legal.max_raise_total),
            legal.max_raise_total
        );
        let _ = writeln!(out, "  ALL-IN ({} total)", legal.max_raise_total);
    }
    let _ = writeln!(
        out,
        "Think it through, then end your reply with one line: \
         FOLD, CHECK, CALL, RAISE $<total>, or ALL-IN."
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::game::Config;
    use crate::gameplay::game::Status;

    #[test]
    fn prompt_names_the_legal_set() {
        let models = vec!["a".to_string(), "b".to_string()];
        let mut game = Game::create(Config::default(), &models, true);
        game.status = Status::Active;
        game.begin_hand();
        game.post_blinds();
        game.deal_holes();
        let actor = game.table.actor.unwrap();
        let legal = game.legal(actor);
        let prompt = render(&game, actor, &legal);
        assert!(prompt.contains("CALL"));
        assert!(prompt.contains("RAISE"));
        assert!(prompt.contains("Pot: 30"));
        assert!(!legal.can_check);
        assert!(!prompt.contains("  CHECK\n")); // facing the blind, no check
    }
}
