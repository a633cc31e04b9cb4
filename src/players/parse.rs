use crate::gameplay::action::Proposal;
use regex::Regex;
use std::sync::LazyLock;

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(FOLD)|(CHECK)|(CALL)|(ALL[\s_-]?IN)|RAISE\s*\$?\s*(\d+))\b")
        .expect("action pattern compiles")
});

/// scan the reply bottom-up for the last action line. everything a
/// model says above its action is its reasoning; a reply with no
/// recognizable action is invalid and coerces to a fold upstream.
pub fn parse(text: &str) -> Option<Proposal> {
    text.lines().rev().find_map(|line| {
        ACTION.captures(line).and_then(|caps| {
            if caps.get(1).is_some() {
                Some(Proposal::Fold)
            } else if caps.get(2).is_some() {
                Some(Proposal::Check)
            } else if caps.get(3).is_some() {
                Some(Proposal::Call)
            } else if caps.get(4).is_some() {
                Some(Proposal::Shove)
            } else {
                caps.get(5)
                    .and_then(|m| m.as_str().parse().ok())
                    .map(Proposal::Raise)
            }
        })
    })
}
