//! Act/beat progression state machine.
//!
//! One state record per conversation, advanced once per user turn.
//! The machine never interprets story content; it only decides whether
//! the canonical beat counter moves, freezes pending a clarification
//! of an open-ended "Other" pick, or resets.

use serde::{Deserialize, Serialize};

/// How many recorded choices the summary reads
const RECENT_READ: usize = 3;
/// How many recorded choices are retained at all
const RECENT_KEPT: usize = 10;
/// Recorded choices are truncated to this many characters
const CHOICE_MAX_CHARS: usize = 20;

/// Per-conversation story position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Major story phase, 1 through 3
    pub act: u8,
    /// Canonical checkpoint within the story
    pub beat: u8,
    /// Recent normalized inputs, newest last
    pub recent_choices: Vec<String>,
    /// Set while an "Other" pick waits for a concrete follow-up
    pub awaiting_other: bool,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            act: 1,
            beat: 1,
            recent_choices: Vec::new(),
            awaiting_other: false,
        }
    }
}

impl ProgressionState {
    /// Advance the machine from one raw user input.
    ///
    /// Rule precedence: explicit restart, then resolution of a pending
    /// "Other", then entry into "Other", then a normal one-beat
    /// advance. The machine is deliberately permissive: unrecognized
    /// free text advances rather than stalling.
    pub fn advance(&mut self, raw: &str) {
        let choice = normalize(raw);
        self.record_choice(&choice);

        if choice.contains("start again") || choice.contains("restart") {
            *self = Self::default();
            return;
        }

        if self.awaiting_other {
            // A repeated menu pick is not a clarification; stay put and
            // let the narrator re-prompt.
            if !is_menu_pick(&choice) {
                self.awaiting_other = false;
                self.bump_beat();
            }
            return;
        }

        if choice == "4" || choice.starts_with("4)") || choice.contains("other") {
            self.awaiting_other = true;
            return;
        }

        self.bump_beat();
    }

    /// Derived one-line summary injected as an extra system turn on
    /// every completion call. Never persisted.
    pub fn summary(&self) -> String {
        let start = self.recent_choices.len().saturating_sub(RECENT_READ);
        let recent = &self.recent_choices[start..];
        let recent_str = if recent.is_empty() {
            "none".to_string()
        } else {
            recent.join(",")
        };
        format!(
            "SESSION STATE: act={}, beat={}, recent_choices={}. \
             Advance to the next canon beat unless the player chose Other.",
            self.act, self.beat, recent_str
        )
    }

    fn record_choice(&mut self, choice: &str) {
        let truncated: String = choice.chars().take(CHOICE_MAX_CHARS).collect();
        self.recent_choices.push(truncated);
        if self.recent_choices.len() > RECENT_KEPT {
            let excess = self.recent_choices.len() - RECENT_KEPT;
            self.recent_choices.drain(..excess);
        }
    }

    fn bump_beat(&mut self) {
        self.beat += 1;
        if self.act == 1 && self.beat > 4 {
            self.act = 2;
            self.beat = 5;
        } else if self.act == 2 && self.beat > 8 {
            self.act = 3;
            self.beat = 9;
        } else if self.act == 3 && self.beat > 10 {
            // story caps at act 3, beat 10
            self.beat = 10;
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A bare numbered menu selection, with or without a trailing
/// parenthesis ("2" or "2) examine the door")
fn is_menu_pick(choice: &str) -> bool {
    matches!(choice, "1" | "2" | "3" | "4")
        || ["1)", "2)", "3)", "4)"].iter().any(|p| choice.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(act: u8, beat: u8) -> ProgressionState {
        ProgressionState {
            act,
            beat,
            ..ProgressionState::default()
        }
    }

    #[test]
    fn test_default_is_act_one_beat_one() {
        let s = ProgressionState::default();
        assert_eq!((s.act, s.beat), (1, 1));
        assert!(s.recent_choices.is_empty());
        assert!(!s.awaiting_other);
    }

    #[test]
    fn test_numeric_pick_advances_one_beat() {
        let mut s = state(1, 2);
        s.advance("3");
        assert_eq!((s.act, s.beat), (1, 3));
        assert!(!s.awaiting_other);
    }

    #[test]
    fn test_parenthesized_pick_advances() {
        let mut s = state(1, 2);
        s.advance("2) Ask the innkeeper");
        assert_eq!((s.act, s.beat), (1, 3));
    }

    #[test]
    fn test_free_text_advances() {
        let mut s = state(1, 2);
        s.advance("I follow the driver");
        assert_eq!((s.act, s.beat), (1, 3));
    }

    #[test]
    fn test_act_one_rolls_into_act_two() {
        let mut s = state(1, 4);
        s.advance("3");
        assert_eq!((s.act, s.beat), (2, 5));
    }

    #[test]
    fn test_act_two_rolls_into_act_three() {
        let mut s = state(2, 8);
        s.advance("1");
        assert_eq!((s.act, s.beat), (3, 9));
    }

    #[test]
    fn test_act_three_clamps_at_beat_ten() {
        let mut s = state(3, 10);
        s.advance("2");
        assert_eq!((s.act, s.beat), (3, 10));
    }

    #[test]
    fn test_other_keyword_freezes_beat() {
        let mut s = state(1, 3);
        s.advance("Other");
        assert_eq!((s.act, s.beat), (1, 3));
        assert!(s.awaiting_other);
    }

    #[test]
    fn test_bare_four_freezes_beat() {
        let mut s = state(2, 6);
        s.advance("4");
        assert_eq!((s.act, s.beat), (2, 6));
        assert!(s.awaiting_other);
    }

    #[test]
    fn test_four_with_parenthesis_freezes_beat() {
        let mut s = state(2, 6);
        s.advance("4) something else");
        assert!(s.awaiting_other);
        assert_eq!(s.beat, 6);
    }

    #[test]
    fn test_menu_pick_while_awaiting_leaves_state_unchanged() {
        let mut s = state(1, 3);
        s.awaiting_other = true;
        s.advance("2");
        assert!(s.awaiting_other);
        assert_eq!((s.act, s.beat), (1, 3));
    }

    #[test]
    fn test_free_text_resolves_awaiting_and_advances() {
        let mut s = state(1, 3);
        s.awaiting_other = true;
        s.advance("I hide behind the curtain");
        assert!(!s.awaiting_other);
        assert_eq!((s.act, s.beat), (1, 4));
    }

    #[test]
    fn test_resolving_awaiting_applies_rollover() {
        let mut s = state(1, 4);
        s.awaiting_other = true;
        s.advance("I climb out the window");
        assert!(!s.awaiting_other);
        assert_eq!((s.act, s.beat), (2, 5));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut s = state(3, 9);
        s.awaiting_other = true;
        s.recent_choices = vec!["1".into(), "2".into()];
        s.advance("Start Again please");
        assert_eq!(s, ProgressionState::default());
    }

    #[test]
    fn test_restart_substring_matches() {
        let mut s = state(2, 7);
        s.advance("can we RESTART this");
        assert_eq!(s, ProgressionState::default());
    }

    #[test]
    fn test_restart_wins_over_awaiting() {
        let mut s = state(2, 6);
        s.awaiting_other = true;
        s.advance("restart");
        assert_eq!(s, ProgressionState::default());
    }

    #[test]
    fn test_choices_are_normalized_and_truncated() {
        let mut s = ProgressionState::default();
        s.advance("  I Sneak Past The Sleeping Guards Tonight  ");
        assert_eq!(s.recent_choices.last().unwrap(), "i sneak past the sle");
    }

    #[test]
    fn test_multibyte_truncation_does_not_panic() {
        let mut s = ProgressionState::default();
        s.advance("Ich öffne die Tür längst über die Schwelle");
        assert!(s.recent_choices.last().unwrap().chars().count() <= 20);
    }

    #[test]
    fn test_recent_choices_stay_bounded() {
        let mut s = ProgressionState::default();
        for i in 0..50 {
            s.advance(&format!("move {i}"));
        }
        assert!(s.recent_choices.len() <= 10);
        assert_eq!(s.recent_choices.last().unwrap(), "move 49");
    }

    #[test]
    fn test_summary_reads_last_three() {
        let mut s = ProgressionState::default();
        for input in ["1", "2", "look around", "3"] {
            s.advance(input);
        }
        let summary = s.summary();
        assert!(summary.contains("recent_choices=2,look around,3"));
        assert!(summary.contains(&format!("act={}, beat={}", s.act, s.beat)));
    }

    #[test]
    fn test_summary_with_no_choices_says_none() {
        let s = ProgressionState::default();
        assert!(s.summary().contains("recent_choices=none"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut s = state(2, 7);
        s.advance("other");
        let json = serde_json::to_string(&s).unwrap();
        let back: ProgressionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
