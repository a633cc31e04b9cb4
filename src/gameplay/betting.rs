use super::action::Action;
use super::action::Legal;
use super::action::Proposal;
use super::game::Game;
use super::phase::Phase;
use super::record::LogEntry;
use crate::Position;

impl Game {
    /// the legal-action summary for a seat, given the table stake,
    /// the seat's street stake, and its stack
    pub fn legal(&self, pos: Position) -> Legal {
        let seat = self.seat(pos);
        let deficit = self.table.stake.saturating_sub(seat.stake);
        let all_in_total = seat.stake + seat.stack;
        Legal {
            can_check: deficit == 0,
            can_call: deficit > 0 && seat.stack > 0,
            can_raise: all_in_total > self.table.stake,
            call_amount: deficit.min(seat.stack),
            min_raise_total: self.table.min_raise,
            max_raise_total: all_in_total,
        }
    }

    /// validate a proposal and resolve it into a concrete action.
    /// None means the proposal is illegal here and coerces to a fold
    /// upstream. an all-in resolves to a raise or a call depending on
    /// the resulting total; a raise below the minimum is only
    /// admitted when it is the seat's whole stack.
    pub fn propose(&self, pos: Position, proposal: Proposal) -> Option<Action> {
        let seat = self.seat(pos);
        let legal = self.legal(pos);
        match proposal {
            Proposal::Fold => Some(Action::Fold),
            Proposal::Check if legal.can_check => Some(Action::Check),
            Proposal::Call if legal.can_call => Some(Action::Call(legal.call_amount)),
            Proposal::Raise(total)
                if legal.can_raise
                    && total > self.table.stake
                    && total <= legal.max_raise_total
                    && (total >= legal.min_raise_total || total == legal.max_raise_total) =>
            {
                if total == legal.max_raise_total {
                    Some(Action::Shove(total))
                } else {
                    Some(Action::Raise(total))
                }
            }
            Proposal::Shove if seat.stack > 0 => {
                let total = seat.stake + seat.stack;
                if total > self.table.stake {
                    Some(Action::Shove(total))
                } else if legal.can_call {
                    Some(Action::Call(legal.call_amount))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// mutate the document with an already-validated action. the ply
    /// counter is bumped by the dispatcher, not here; blinds flow
    /// through the same path without marking the seat as having acted.
    pub fn apply(&mut self, pos: Position, action: Action, reasoning: Option<String>) {
        let circulating = self.circulating();
        let prior_stake = self.table.stake;
        if action.is_voluntary()
            && !self
                .table
                .actions
                .iter()
                .any(|(p, a)| *p == pos && a.is_voluntary())
        {
            self.stat_mut(pos).hands_played += 1;
        }
        match action {
            Action::Blind(amount) => {
                self.seat_mut(pos).commit(amount);
            }
            Action::Fold => {
                let seat = self.seat_mut(pos);
                seat.folded = true;
                seat.acted = true;
                let preflop = self.table.phase == Phase::Preflop;
                let stat = self.stat_mut(pos);
                stat.folds += 1;
                stat.preflop_folds += preflop as u64;
            }
            Action::Check => {
                self.seat_mut(pos).acted = true;
                self.stat_mut(pos).checks += 1;
            }
            Action::Call(amount) => {
                let seat = self.seat_mut(pos);
                seat.commit(amount);
                seat.acted = true;
                let preflop = self.table.phase == Phase::Preflop;
                let stat = self.stat_mut(pos);
                stat.calls += 1;
                stat.preflop_calls += preflop as u64;
                stat.chips_committed += amount;
            }
            Action::Raise(total) | Action::Shove(total) => {
                assert!(total > prior_stake, "raise below the table stake");
                let delta = total - self.seat(pos).stake;
                let seat = self.seat_mut(pos);
                seat.commit(delta);
                seat.acted = true;
                self.table.stake = total;
                let increment = total - prior_stake;
                if increment >= self.table.last_raise {
                    // full raise: the action reopens for everyone else
                    self.table.last_raise = increment;
                    self.table.min_raise = total + increment;
                    self.table.aggressor = Some(pos);
                    for seat in self.seats.iter_mut() {
                        if seat.position != pos && seat.can_act() {
                            seat.acted = false;
                        }
                    }
                } else {
                    // all-in under-raise: the stake advances but seats
                    // that already matched the prior stake keep their turn
                    self.table.min_raise = total + self.table.last_raise;
                }
                let preflop = self.table.phase == Phase::Preflop;
                let shove = matches!(action, Action::Shove(_));
                let stat = self.stat_mut(pos);
                stat.raises += !shove as u64;
                stat.shoves += shove as u64;
                stat.preflop_raises += preflop as u64;
                stat.chips_committed += delta;
            }
        }
        self.table.pot = self.seats.iter().map(|s| s.spent).sum();
        self.table.actions.push((pos, action));
        self.log_push(LogEntry::Action {
            hand: self.current_hand,
            seat: pos,
            action,
            at: crate::now_ms(),
            reasoning,
        });
        debug_assert!(self.circulating() == circulating, "chips not conserved");
    }

    /// the next seat clockwise from `from` that still owes a
    /// decision: unacted, or committed below the table stake
    pub fn seat_to_act_from(&self, from: Position) -> Option<Position> {
        let n = self.seats.len();
        (1..=n).map(|i| (from + i) % n).find(|&p| {
            let seat = self.seat(p);
            seat.can_act() && (!seat.acted || seat.stake < self.table.stake)
        })
    }

    /// the betting round is closed when nobody owes a decision
    pub fn round_over(&self) -> bool {
        match self.table.actor {
            Some(actor) => self.seat_to_act_from(actor).is_none(),
            None => true,
        }
    }
}
