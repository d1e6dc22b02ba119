use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::hiscores::{HighScores, MAX_NAME_LEN};
use crate::scoring::RoundSummary;
use crate::state::{GameState, Session};
use crate::storage::KeyValueStore;
use crate::timer::{Clock, Timer};
use crate::util::{mean, std_dev};

/// Name stored when the player saves without typing one
pub const DEFAULT_PLAYER_NAME: &str = "AAA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Game,
    HighScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Owns the single live session and threads it through every transition
pub struct App<C: Clock, S: KeyValueStore> {
    pub config: GameConfig,
    pub session: Session,
    pub timer: Timer<C>,
    pub high_scores: HighScores<S>,
    pub screen: Screen,
    /// name being typed on the game-over screen, when the total qualifies
    pub name_entry: Option<String>,
    /// outcome of the last save attempt this game
    pub save_result: Option<bool>,
    pub ticks: u64,
    rng: StdRng,
}

impl<C: Clock, S: KeyValueStore> App<C, S> {
    pub fn new(config: GameConfig, clock: C, storage: S, rng: StdRng) -> Self {
        Self {
            session: Session::new(config.total_rounds),
            config,
            timer: Timer::new(clock),
            high_scores: HighScores::new(storage),
            screen: Screen::Game,
            name_entry: None,
            save_result: None,
            ticks: 0,
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.session.current_state
    }

    pub fn start_game(&mut self) {
        let target = self.config.generate_target_time(&mut self.rng);
        self.session = self.session.start_game(target);
        self.name_entry = None;
        self.save_result = None;
        tracing::info!(rounds = self.config.total_rounds, "game started");
    }

    pub fn start_timer(&mut self) {
        if self.state() != GameState::RoundReady {
            return;
        }
        let mark = self.timer.start();
        self.session = self.session.start_timer(mark);
    }

    pub fn stop_timer(&mut self) {
        if self.state() != GameState::TimerRunning {
            return;
        }
        let elapsed = self.timer.stop();
        let target = self.session.target_time.unwrap_or_default();
        let score = self.config.score(target, elapsed);
        self.session = self.session.stop_timer(elapsed, score);
    }

    pub fn continue_game(&mut self) {
        let target = self.config.generate_target_time(&mut self.rng);
        self.session = self.session.next_round(target);

        if self.state() == GameState::GameOver {
            let total = self.session.total_score();
            tracing::info!(total, "game over");
            if self.high_scores.is_high_score(total) {
                self.name_entry = Some(String::new());
            }
        }
    }

    pub fn play_again(&mut self) {
        self.back_to_menu();
        self.start_game();
    }

    pub fn back_to_menu(&mut self) {
        self.timer.reset();
        self.session = self.session.reset_game();
        self.name_entry = None;
        self.save_result = None;
    }

    /// Persist the typed name with this game's total.
    pub fn save_score(&mut self) {
        let Some(typed) = self.name_entry.take() else {
            return;
        };
        let name = match typed.trim() {
            "" => DEFAULT_PLAYER_NAME,
            trimmed => trimmed,
        };
        let saved = self.high_scores.save(
            name,
            self.session.total_score(),
            self.config.total_rounds,
        );
        self.save_result = Some(saved);
    }

    /// Space/Enter: the one forward action the current state allows
    pub fn advance(&mut self) {
        match self.state() {
            GameState::Idle => self.start_game(),
            GameState::RoundReady => self.start_timer(),
            GameState::TimerRunning => self.stop_timer(),
            GameState::RoundResult => self.continue_game(),
            GameState::GameOver => self.play_again(),
        }
    }

    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    pub fn last_summary(&self) -> Option<RoundSummary> {
        self.session
            .last_result()
            .map(|r| RoundSummary::new(r.target_time, r.elapsed_time, r.score))
    }

    /// Mean and spread of how far each round landed from its target
    pub fn miss_stats(&self) -> Option<(f64, f64)> {
        let misses: Vec<f64> = self
            .session
            .round_results
            .iter()
            .map(|r| (r.elapsed_time - r.target_time).abs())
            .collect();
        Some((mean(&misses)?, std_dev(&misses)?))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        if self.screen == Screen::HighScores {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b')
            ) {
                self.screen = Screen::Game;
            }
            return Control::Continue;
        }

        if self.state() == GameState::GameOver && self.name_entry.is_some() {
            self.handle_name_key(key);
            return Control::Continue;
        }

        match (self.state(), key.code) {
            (_, KeyCode::Esc) => return Control::Quit,
            (_, KeyCode::Char(' ') | KeyCode::Enter) => self.advance(),
            (GameState::Idle, KeyCode::Char('q'))
            | (GameState::GameOver, KeyCode::Char('q')) => return Control::Quit,
            (GameState::Idle | GameState::GameOver, KeyCode::Char('h')) => {
                self.screen = Screen::HighScores;
            }
            (GameState::GameOver, KeyCode::Char('p')) => self.play_again(),
            (GameState::GameOver, KeyCode::Char('m')) => self.back_to_menu(),
            _ => {}
        }
        Control::Continue
    }

    fn handle_name_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.save_score(),
            KeyCode::Esc => self.name_entry = None,
            KeyCode::Backspace => {
                if let Some(name) = self.name_entry.as_mut() {
                    name.pop();
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                if let Some(name) = self.name_entry.as_mut() {
                    if name.chars().count() < MAX_NAME_LEN {
                        name.push(c);
                    }
                }
            }
            _ => {}
        }
    }
}
