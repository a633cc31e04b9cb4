use super::action::Action;
use super::game::Game;
use super::phase::Phase;
use super::pot;
use super::record::HandSummary;
use super::record::LogEntry;
use super::record::WinCondition;
use crate::Position;
use crate::evaluation::strength::Strength;
use std::collections::BTreeMap;

impl Game {
    /// the hand loop stops when the table is down to one funded seat
    /// or the configured hand count has been played out
    pub fn over(&self) -> bool {
        self.current_hand >= self.config.max_hands || self.n_funded() < 2
    }

    /// reset the document for a fresh hand: rotate the button over
    /// funded seats, shuffle a new deck, clear per-hand seat state.
    /// busted seats sit out as folded.
    pub fn begin_hand(&mut self) {
        assert!(!self.over(), "hand started on a finished game");
        self.current_hand += 1;
        self.table.dealer = self.next_funded(self.table.dealer);
        self.table.phase = Phase::Preflop;
        self.table.pot = 0;
        self.table.board.clear();
        self.table.burned.clear();
        self.table.actions.clear();
        self.table.stake = 0;
        self.table.min_raise = 0;
        self.table.last_raise = 0;
        self.table.aggressor = None;
        self.table.actor = None;
        self.table.deck = crate::cards::deck::Deck::shuffled();
        for seat in self.seats.iter_mut() {
            seat.reset_for_hand();
        }
        for pos in 0..self.seats.len() {
            if self.seats[pos].stack > 0 {
                self.stat_mut(pos).hands_dealt += 1;
            }
        }
        self.log_push(LogEntry::Phase {
            hand: self.current_hand,
            phase: Phase::Preflop,
            at: crate::now_ms(),
        });
    }

    /// heads-up the button posts the small blind and acts first
    /// preflop; multi-way the blinds sit clockwise of the button and
    /// the seat after the big blind opens. short blinds go all-in.
    pub fn post_blinds(&mut self) {
        let dealer = self.table.dealer;
        let heads_up = self.n_funded() == 2;
        let sb = if heads_up { dealer } else { self.next_funded(dealer) };
        let bb = self.next_funded(sb);
        let small = self.config.small_blind.min(self.seat(sb).stack);
        let big = self.config.big_blind.min(self.seat(bb).stack);
        self.apply(sb, Action::Blind(small), None);
        self.apply(bb, Action::Blind(big), None);
        self.table.stake = self.config.big_blind;
        self.table.last_raise = self.config.big_blind;
        self.table.min_raise = self.config.big_blind * 2;
        self.table.aggressor = Some(bb);
        self.table.actor = self.seat_to_act_from(bb);
    }

    /// two cards to every seat in the hand, clockwise from the button
    pub fn deal_holes(&mut self) {
        let n = self.seats.len();
        let dealer = self.table.dealer;
        for i in 1..=n {
            let pos = (dealer + i) % n;
            if self.seats[pos].live() {
                let first = self.table.deck.draw().expect("card for the hole");
                let second = self.table.deck.draw().expect("card for the hole");
                self.seats[pos].hole = vec![first, second];
            }
        }
    }

    /// the street the closed betting round advances into
    pub fn next_target(&self) -> Phase {
        self.table.phase.next()
    }

    /// burn one, reveal the street, reset stakes, and seat the first
    /// actor. with fewer than two seats able to bet there is no
    /// betting round and the hand runs out street by street.
    pub fn advance_street(&mut self, target: Phase) {
        assert!(target.is_betting() && target != Phase::Preflop);
        assert!(self.table.phase == target.prev(), "street out of order");
        for seat in self.seats.iter_mut() {
            seat.reset_for_street();
        }
        self.table.stake = 0;
        self.table.last_raise = self.config.big_blind;
        self.table.min_raise = self.config.big_blind;
        self.table.aggressor = None;
        let burn = self.table.deck.draw().expect("card to burn");
        self.table.burned.push(burn);
        for _ in 0..target.n_revealed() {
            let card = self.table.deck.draw().expect("card for the board");
            self.table.board.push(card);
        }
        self.table.phase = target;
        self.table.actor = match self.n_bettable() >= 2 {
            true => self.seat_to_act_from(self.table.dealer),
            false => None,
        };
        self.log_push(LogEntry::Phase {
            hand: self.current_hand,
            phase: target,
            at: crate::now_ms(),
        });
    }

    /// evaluate every live seat, split the layered pot, and record
    /// the hand. evaluation failures are structural bugs surfaced to
    /// the caller, which cancels the game.
    pub fn showdown(&mut self) -> anyhow::Result<()> {
        assert!(self.table.phase == Phase::River, "showdown before the river");
        self.table.phase = Phase::Showdown;
        self.table.actor = None;
        let mut scores = BTreeMap::new();
        for seat in self.seats.iter().filter(|s| s.live()) {
            let mut cards = seat.hole.clone();
            cards.extend(self.table.board.iter().copied());
            scores.insert(seat.position, Strength::evaluate(&cards)?.score);
        }
        let layers = pot::layers(&self.seats);
        let payout = pot::distribute(&layers, &scores, self.table.dealer, self.seats.len());
        let pot = self.table.pot;
        for (&pos, &chips) in payout.winnings.iter() {
            self.seats[pos].stack += chips;
        }
        for pos in 0..self.seats.len() {
            if self.seats[pos].live() {
                self.stat_mut(pos).showdowns_seen += 1;
            }
        }
        for &pos in payout.winners.iter() {
            self.stat_mut(pos).showdowns_won += 1;
            let model = self.seats[pos].model.clone();
            let chips = payout.winnings[&pos];
            self.log_push(LogEntry::System {
                hand: self.current_hand,
                content: format!("{} wins {} at showdown", model, chips),
                at: crate::now_ms(),
            });
        }
        self.finish_hand(pot, payout.winners, WinCondition::Showdown);
        Ok(())
    }

    /// everyone else folded: the last live seat takes the whole pot
    /// without showing
    pub fn fold_win(&mut self) {
        assert!(self.n_live() == 1, "fold win with contested pot");
        let winner = self
            .seats
            .iter()
            .position(|s| s.live())
            .expect("one live seat");
        let pot = self.table.pot;
        self.seats[winner].stack += pot;
        self.table.phase = Phase::Showdown;
        self.table.actor = None;
        let model = self.seats[winner].model.clone();
        self.log_push(LogEntry::System {
            hand: self.current_hand,
            content: format!("{} wins {} uncontested", model, pot),
            at: crate::now_ms(),
        });
        self.finish_hand(pot, vec![winner], WinCondition::AllFolded);
    }

    /// append the hand summary and clear transient hand state. the
    /// document rests here until the next hand is scheduled.
    fn finish_hand(&mut self, pot: crate::Chips, winners: Vec<Position>, condition: WinCondition) {
        let summary = HandSummary {
            hand: self.current_hand,
            pot,
            board: self.table.board.clone(),
            winners: winners
                .iter()
                .map(|&p| self.seats[p].model.clone())
                .collect(),
            condition,
            actions: std::mem::take(&mut self.table.actions),
        };
        self.hands.push(summary);
        for seat in self.seats.iter_mut() {
            seat.hole.clear();
            seat.stake = 0;
            seat.spent = 0;
        }
        self.table.pot = 0;
        self.table.stake = 0;
        self.table.aggressor = None;
        self.thinking = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::cards::card::Card;
    use crate::cards::rank::Rank;
    use crate::cards::suit::Suit;
    use crate::gameplay::action::Proposal;
    use crate::gameplay::game::Config;
    use crate::gameplay::game::Game;
    use crate::gameplay::game::Status;
    use crate::gameplay::phase::Phase;
    use crate::gameplay::record::WinCondition;

    fn models(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("model-{}", i)).collect()
    }

    fn fresh(n: usize) -> Game {
        let mut game = Game::create(Config::default(), &models(n), true);
        game.status = Status::Active;
        game.begin_hand();
        game.post_blinds();
        game.deal_holes();
        game
    }

    /// walk the actor pointer the way the dispatcher does
    fn step(game: &mut Game, proposal: Proposal) {
        let pos = game.table.actor.expect("actor on turn");
        let action = game.propose(pos, proposal).expect("legal proposal");
        game.apply(pos, action, None);
        game.table.ply += 1;
        game.table.actor = game.seat_to_act_from(pos);
    }

    #[test]
    fn heads_up_button_posts_small_and_acts_first() {
        let game = fresh(2);
        // button rotated onto seat 1, which posts the small blind
        assert_eq!(game.table.dealer, 1);
        assert_eq!(game.seat(1).stack, 990);
        assert_eq!(game.seat(0).stack, 980);
        assert_eq!(game.table.pot, 30);
        assert_eq!(game.table.stake, 20);
        assert_eq!(game.table.actor, Some(1));
        assert_eq!(game.table.aggressor, Some(0));
    }

    #[test]
    fn heads_up_fold_win_awards_blinds() {
        let mut game = fresh(2);
        step(&mut game, Proposal::Fold);
        assert_eq!(game.n_live(), 1);
        game.fold_win();
        assert_eq!(game.seat(1).stack, 990);
        assert_eq!(game.seat(0).stack, 1010);
        assert_eq!(game.table.ply, 1);
        let summary = game.hands.last().unwrap();
        assert_eq!(summary.condition, WinCondition::AllFolded);
        assert_eq!(summary.winners, vec!["model-0".to_string()]);
        assert_eq!(summary.pot, 30);
    }

    #[test]
    fn big_blind_gets_the_option() {
        let mut game = fresh(2);
        step(&mut game, Proposal::Call);
        // stakes are level but the big blind has not acted
        assert_eq!(game.table.actor, Some(0));
        assert!(game.legal(0).can_check);
        step(&mut game, Proposal::Check);
        assert_eq!(game.table.actor, None);
        assert!(game.round_over());
    }

    #[test]
    fn non_button_acts_first_after_the_flop() {
        let mut game = fresh(2);
        step(&mut game, Proposal::Call);
        step(&mut game, Proposal::Check);
        game.advance_street(Phase::Flop);
        assert_eq!(game.table.board.len(), 3);
        assert_eq!(game.table.burned.len(), 1);
        assert_eq!(game.table.actor, Some(0));
        assert_eq!(game.table.stake, 0);
    }

    #[test]
    fn full_raise_reopens_the_action() {
        let mut game = fresh(3);
        // seats: dealer 1, sb 2, bb 0; utg is the dealer's left
        let utg = game.table.actor.unwrap();
        step(&mut game, Proposal::Raise(100));
        assert_eq!(game.table.stake, 100);
        assert_eq!(game.table.min_raise, 180);
        assert_eq!(game.table.aggressor, Some(utg));
        step(&mut game, Proposal::Call);
        step(&mut game, Proposal::Call);
        assert!(game.round_over());
    }

    #[test]
    fn under_raise_shove_does_not_reopen() {
        let mut game = fresh(3);
        let utg = game.table.actor.unwrap();
        step(&mut game, Proposal::Raise(100));
        step(&mut game, Proposal::Call); // small blind calls 100
        let bb = game.table.actor.unwrap();
        // leave the big blind a stack that shoves short of a full raise
        game.seat_mut(bb).stack = 130;
        step(&mut game, Proposal::Shove);
        assert_eq!(game.table.stake, 150);
        assert!(game.seat(bb).all_in);
        // callers keep their acted flag but still owe the difference
        assert!(game.seat(utg).acted);
        assert!(!game.round_over());
        step(&mut game, Proposal::Call);
        step(&mut game, Proposal::Call);
        assert!(game.round_over());
    }

    #[test]
    fn dealer_rotation_skips_busted_seats() {
        let mut game = Game::create(Config::default(), &models(3), true);
        game.status = Status::Active;
        game.seats[1].stack = 0;
        game.begin_hand();
        assert_eq!(game.table.dealer, 2);
        assert!(game.seat(1).folded);
        game.post_blinds();
        game.deal_holes();
        assert!(game.seat(1).hole.is_empty());
        assert_eq!(game.seat(0).hole.len(), 2);
    }

    #[test]
    fn mutual_all_in_runs_out_with_no_actors() {
        let mut game = fresh(2);
        step(&mut game, Proposal::Shove);
        step(&mut game, Proposal::Shove); // resolves to an all-in call
        assert!(game.round_over());
        assert_eq!(game.n_bettable(), 0);
        game.advance_street(Phase::Flop);
        assert_eq!(game.table.actor, None);
        game.advance_street(Phase::Turn);
        assert_eq!(game.table.actor, None);
        game.advance_street(Phase::River);
        assert_eq!(game.table.actor, None);
        assert_eq!(game.table.board.len(), 5);
        assert_eq!(game.table.burned.len(), 3);
    }

    #[test]
    fn chips_are_conserved_through_a_hand() {
        let mut game = fresh(3);
        let circulating = game.circulating();
        step(&mut game, Proposal::Raise(60));
        step(&mut game, Proposal::Call);
        step(&mut game, Proposal::Fold);
        assert_eq!(game.circulating(), circulating);
        game.advance_street(Phase::Flop);
        step(&mut game, Proposal::Check);
        step(&mut game, Proposal::Check);
        assert_eq!(game.circulating(), circulating);
    }

    #[test]
    fn board_tie_splits_with_odd_chip_clockwise() {
        let mut game = Game::create(Config::default(), &models(3), true);
        game.status = Status::Active;
        game.current_hand = 1;
        game.table.dealer = 1;
        game.table.phase = Phase::River;
        game.table.board = vec![
            Card::from((Rank::Ace, Suit::Spade)),
            Card::from((Rank::King, Suit::Spade)),
            Card::from((Rank::Queen, Suit::Spade)),
            Card::from((Rank::Jack, Suit::Spade)),
            Card::from((Rank::Ten, Suit::Spade)),
        ];
        game.seats[0].hole = vec![
            Card::from((Rank::Two, Suit::Heart)),
            Card::from((Rank::Three, Suit::Heart)),
        ];
        game.seats[1].hole = vec![
            Card::from((Rank::Two, Suit::Club)),
            Card::from((Rank::Three, Suit::Club)),
        ];
        game.seats[0].spent = 50;
        game.seats[1].spent = 50;
        game.seats[2].spent = 1;
        game.seats[2].folded = true;
        game.seats[0].stack = 0;
        game.seats[1].stack = 0;
        game.table.pot = 101;
        game.showdown().unwrap();
        assert_eq!(game.seat(0).stack, 51);
        assert_eq!(game.seat(1).stack, 50);
        let summary = game.hands.last().unwrap();
        assert_eq!(summary.condition, WinCondition::Showdown);
        assert_eq!(summary.pot, 101);
        assert_eq!(summary.winners.len(), 2);
    }

    #[test]
    fn three_way_all_in_layers_settle_by_contribution() {
        let mut game = Game::create(Config::default(), &models(3), true);
        game.status = Status::Active;
        game.current_hand = 1;
        game.table.dealer = 0;
        game.table.phase = Phase::River;
        game.table.board = vec![
            Card::from((Rank::Two, Suit::Heart)),
            Card::from((Rank::Seven, Suit::Heart)),
            Card::from((Rank::Nine, Suit::Heart)),
            Card::from((Rank::Four, Suit::Club)),
            Card::from((Rank::Ten, Suit::Diamond)),
        ];
        // aces for the short stack, two pair for the middle, flush deep
        game.seats[0].hole = vec![
            Card::from((Rank::Ace, Suit::Spade)),
            Card::from((Rank::Ace, Suit::Club)),
        ];
        game.seats[1].hole = vec![
            Card::from((Rank::Ten, Suit::Spade)),
            Card::from((Rank::Nine, Suit::Club)),
        ];
        game.seats[2].hole = vec![
            Card::from((Rank::King, Suit::Heart)),
            Card::from((Rank::Three, Suit::Heart)),
        ];
        for (pos, spent) in [(0, 200u64), (1, 500), (2, 1000)] {
            game.seats[pos].spent = spent;
            game.seats[pos].stack = 0;
            game.seats[pos].all_in = true;
        }
        game.table.pot = 1700;
        game.showdown().unwrap();
        // the deep stack scoops the main pot, the side pot, and its
        // own uncalled margin
        assert_eq!(game.seat(2).stack, 1700);
        assert_eq!(game.seat(0).stack, 0);
        assert_eq!(game.seat(1).stack, 0);
        let summary = game.hands.last().unwrap();
        assert_eq!(summary.winners, vec!["model-2".to_string()]);
    }
}
