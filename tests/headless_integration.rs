use std::sync::mpsc;
use std::time::Duration;

use blind_timer::app::{App, Control, Screen};
use blind_timer::config::GameConfig;
use blind_timer::runtime::{ChannelEventSource, GameEvent, Runner};
use blind_timer::state::GameState;
use blind_timer::storage::MemoryStore;
use blind_timer::timer::ManualClock;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

fn key(code: KeyCode) -> GameEvent {
    GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn config(rounds: u32) -> GameConfig {
    GameConfig {
        total_rounds: rounds,
        ..GameConfig::default()
    }
}

// Drives the event loop the same way the binary does, minus the terminal.
fn pump<C, S>(runner: &Runner<ChannelEventSource>, app: &mut App<C, S>, steps: u32) -> Control
where
    C: blind_timer::timer::Clock,
    S: blind_timer::storage::KeyValueStore,
{
    for _ in 0..steps {
        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize(_, _) => {}
            GameEvent::Key(k) => {
                if app.handle_key(k) == Control::Quit {
                    return Control::Quit;
                }
            }
        }
    }
    Control::Continue
}

#[test]
fn headless_full_game_reaches_game_over() {
    let clock = ManualClock::new();
    let mut app = App::new(
        config(2),
        &clock,
        MemoryStore::new(),
        StdRng::seed_from_u64(42),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    // menu -> round ready
    tx.send(key(KeyCode::Char(' '))).unwrap();
    pump(&runner, &mut app, 1);
    assert_eq!(app.state(), GameState::RoundReady);
    assert_eq!(app.session.current_round, 1);

    for round in 1..=2 {
        let target = app.session.target_time.unwrap();
        assert!((2.0..=8.0).contains(&target));

        tx.send(key(KeyCode::Char(' '))).unwrap();
        pump(&runner, &mut app, 1);
        assert_eq!(app.state(), GameState::TimerRunning);

        // stop one second early: (1 - 1/target)^2 of the max
        clock.advance_secs(target - 1.0);
        tx.send(key(KeyCode::Enter)).unwrap();
        pump(&runner, &mut app, 1);
        assert_eq!(app.state(), GameState::RoundResult);
        assert_eq!(app.session.round_results.len(), round);
        assert!(app.session.round_scores[round - 1] > 0);

        tx.send(key(KeyCode::Char(' '))).unwrap();
        pump(&runner, &mut app, 1);
    }

    assert_eq!(app.state(), GameState::GameOver);
    assert_eq!(app.session.round_results.len(), 2);
    let total = app.session.total_score();
    assert_eq!(
        total,
        app.session.round_scores.iter().sum::<u64>()
    );

    // first score on an empty table always qualifies
    assert_eq!(app.name_entry.as_deref(), Some(""));
    for c in "zed".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
    pump(&runner, &mut app, 4);

    assert_eq!(app.save_result, Some(true));
    let saved = app.high_scores.load();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "zed");
    assert_eq!(saved[0].score, total);
    assert_eq!(saved[0].rounds, 2);

    tx.send(key(KeyCode::Char('q'))).unwrap();
    assert_eq!(pump(&runner, &mut app, 1), Control::Quit);
}

#[test]
fn headless_late_stop_scores_nothing() {
    let clock = ManualClock::new();
    let mut app = App::new(
        config(1),
        &clock,
        MemoryStore::new(),
        StdRng::seed_from_u64(7),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    tx.send(key(KeyCode::Char(' '))).unwrap();
    tx.send(key(KeyCode::Char(' '))).unwrap();
    pump(&runner, &mut app, 2);

    let target = app.session.target_time.unwrap();
    clock.advance_secs(target + 0.5);
    tx.send(key(KeyCode::Char(' '))).unwrap();
    pump(&runner, &mut app, 1);

    assert_eq!(app.state(), GameState::RoundResult);
    assert_eq!(app.session.round_scores, vec![0]);
    let summary = app.last_summary().unwrap();
    assert!(summary.is_over);

    tx.send(key(KeyCode::Char(' '))).unwrap();
    pump(&runner, &mut app, 1);
    assert_eq!(app.state(), GameState::GameOver);
    assert_eq!(app.session.total_score(), 0);
}

#[test]
fn headless_ticks_do_not_advance_state() {
    let clock = ManualClock::new();
    let mut app = App::new(
        config(3),
        &clock,
        MemoryStore::new(),
        StdRng::seed_from_u64(3),
    );

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

    pump(&runner, &mut app, 10);

    assert_eq!(app.state(), GameState::Idle);
    assert_eq!(app.ticks, 10);
}

#[test]
fn headless_high_scores_screen_round_trip() {
    let clock = ManualClock::new();
    let mut app = App::new(
        config(1),
        &clock,
        MemoryStore::new(),
        StdRng::seed_from_u64(9),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    tx.send(key(KeyCode::Char('h'))).unwrap();
    pump(&runner, &mut app, 1);
    assert_eq!(app.screen, Screen::HighScores);

    // space is ignored while the list is open
    tx.send(key(KeyCode::Char(' '))).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();
    pump(&runner, &mut app, 2);
    assert_eq!(app.screen, Screen::Game);
    assert_eq!(app.state(), GameState::Idle);
}
