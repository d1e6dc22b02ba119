//! Game progression as a finite-state machine.
//!
//! Every transition borrows the current [`Session`] and returns a new one.
//! Calling a transition from the wrong state returns an unchanged copy, so
//! callers may fire transitions speculatively.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::scoring::calculate_total_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Idle,
    RoundReady,
    TimerRunning,
    RoundResult,
    GameOver,
}

/// Actions the player can take, each owned by exactly one state
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StartGame,
    StartTimer,
    StopTimer,
    NextRound,
    ResetGame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START_GAME" => Ok(Action::StartGame),
            "START_TIMER" => Ok(Action::StartTimer),
            "STOP_TIMER" => Ok(Action::StopTimer),
            "NEXT_ROUND" => Ok(Action::NextRound),
            "RESET_GAME" => Ok(Action::ResetGame),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

impl GameState {
    pub fn allowed_actions(self) -> &'static [Action] {
        match self {
            GameState::Idle => &[Action::StartGame],
            GameState::RoundReady => &[Action::StartTimer],
            GameState::TimerRunning => &[Action::StopTimer],
            GameState::RoundResult => &[Action::NextRound],
            GameState::GameOver => &[Action::ResetGame],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub round: u32,
    pub target_time: f64,
    pub elapsed_time: f64,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub current_state: GameState,
    pub current_round: u32,
    pub total_rounds: u32,
    pub target_time: Option<f64>,
    pub start_time: Option<Instant>,
    pub elapsed_time: Option<f64>,
    pub round_scores: Vec<u64>,
    pub round_results: Vec<RoundResult>,
}

impl Session {
    pub fn new(total_rounds: u32) -> Self {
        Self {
            current_state: GameState::Idle,
            current_round: 0,
            total_rounds,
            target_time: None,
            start_time: None,
            elapsed_time: None,
            round_scores: Vec::new(),
            round_results: Vec::new(),
        }
    }

    #[must_use]
    pub fn start_game(&self, target_time: f64) -> Self {
        if self.current_state != GameState::Idle {
            return self.clone();
        }
        tracing::debug!(target_time, "start game");

        Self {
            current_state: GameState::RoundReady,
            current_round: 1,
            target_time: Some(target_time),
            round_scores: Vec::new(),
            round_results: Vec::new(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn start_timer(&self, start_time: Instant) -> Self {
        if self.current_state != GameState::RoundReady {
            return self.clone();
        }

        Self {
            current_state: GameState::TimerRunning,
            start_time: Some(start_time),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn stop_timer(&self, elapsed_time: f64, score: u64) -> Self {
        if self.current_state != GameState::TimerRunning {
            return self.clone();
        }
        tracing::debug!(round = self.current_round, elapsed_time, score, "stop timer");

        let mut next = self.clone();
        next.current_state = GameState::RoundResult;
        next.elapsed_time = Some(elapsed_time);
        next.round_scores.push(score);
        next.round_results.push(RoundResult {
            round: self.current_round,
            // a running round always carries its target
            target_time: self.target_time.unwrap_or_default(),
            elapsed_time,
            score,
        });
        next
    }

    #[must_use]
    pub fn next_round(&self, target_time: f64) -> Self {
        if self.current_state != GameState::RoundResult {
            return self.clone();
        }

        if self.current_round >= self.total_rounds {
            tracing::debug!(rounds = self.current_round, "game over");
            return Self {
                current_state: GameState::GameOver,
                target_time: None,
                start_time: None,
                elapsed_time: None,
                ..self.clone()
            };
        }

        Self {
            current_state: GameState::RoundReady,
            current_round: self.current_round + 1,
            target_time: Some(target_time),
            start_time: None,
            elapsed_time: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn reset_game(&self) -> Self {
        Self::new(self.total_rounds)
    }

    pub fn can_transition(&self, action: Action) -> bool {
        self.current_state.allowed_actions().contains(&action)
    }

    pub fn total_score(&self) -> u64 {
        calculate_total_score(&self.round_scores)
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.round_results.last()
    }

    pub fn is_last_round(&self) -> bool {
        self.current_round >= self.total_rounds
    }
}
