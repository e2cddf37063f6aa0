use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::problem::{self, Operation};
use crate::rope::{self, Winner};
use crate::session::{GameMode, Player, SessionState};
use crate::timers::{Scheduler, TimerHandle, TimerKind, TimerTick};

const MATCH_CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// How a finished match turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub winner: Winner,
    pub mode: GameMode,
    pub elapsed_secs: u64,
}

impl MatchResult {
    pub fn title(&self) -> String {
        match (self.mode, self.winner) {
            (_, Winner::Computer) => "DEFEAT...".to_string(),
            (GameMode::Single, _) => "YOU WIN!".to_string(),
            (GameMode::TwoPlayer, Winner::PlayerOne) => "PLAYER 1 WINS!".to_string(),
            (GameMode::TwoPlayer, Winner::PlayerTwo) => "PLAYER 2 WINS!".to_string(),
        }
    }

    pub fn message(&self) -> String {
        match (self.mode, self.winner) {
            (_, Winner::Computer) => {
                "The computer was too fast! Keep practicing your math skills.".to_string()
            }
            (GameMode::Single, _) => format!(
                "Great job! You defeated the computer in {} seconds.",
                self.elapsed_secs
            ),
            (GameMode::TwoPlayer, winner) => {
                let n = if winner == Winner::PlayerOne { 1 } else { 2 };
                format!(
                    "Victory for Player {n}! Match duration: {} seconds.",
                    self.elapsed_secs
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Menu, nothing running
    Idle,
    Active,
    /// Result display; only `acknowledge` leaves it
    Ended(MatchResult),
}

/// Reported back for every accepted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub player: Player,
    pub correct: bool,
    pub winner: Option<Winner>,
}

/// Snapshot of what the presentation needs to draw
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub rope_position: f64,
    pub player1_question: Option<String>,
    pub player2_question: Option<String>,
    pub timer_display: String,
    pub result: Option<MatchResult>,
}

/// Owns the session state and both match timers.
///
/// All mutation goes through these methods; each pull is applied and checked
/// in a single call so ticks and submissions can interleave freely.
pub struct Controller<S: Scheduler, R: Rng = StdRng> {
    state: SessionState,
    phase: Phase,
    scheduler: S,
    rng: R,
    match_id: u64,
    started_at: Option<Instant>,
    clock_timer: Option<TimerHandle>,
    opponent_timer: Option<TimerHandle>,
}

impl<S: Scheduler> Controller<S, StdRng> {
    pub fn new(scheduler: S) -> Self {
        Self::with_rng(scheduler, StdRng::from_entropy())
    }
}

impl<S: Scheduler, R: Rng> Controller<S, R> {
    pub fn with_rng(scheduler: S, rng: R) -> Self {
        Self {
            state: SessionState::default(),
            phase: Phase::Idle,
            scheduler,
            rng,
            match_id: 0,
            started_at: None,
            clock_timer: None,
            opponent_timer: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        self.state.game_active
    }

    pub fn match_id(&self) -> u64 {
        self.match_id
    }

    /// Change mode from the menu. Ignored while a match is running or showing results.
    pub fn select_mode(&mut self, mode: GameMode) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.state.game_mode = mode;
        true
    }

    pub fn select_level(&mut self, level: u32) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.state.level = level.max(1);
        true
    }

    pub fn select_operation(&mut self, operation: Operation) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.state.operation = operation;
        true
    }

    /// Begin a new match. Any timers from a previous match are cancelled first.
    pub fn start(&mut self, operation: Operation, level: u32, now: Instant) {
        self.cancel_timers();
        self.state.reset();
        self.state.operation = operation;
        self.state.level = level.max(1);
        self.state.game_active = true;
        self.state.derive_pull_settings();

        self.match_id += 1;
        self.started_at = Some(now);
        self.phase = Phase::Active;

        self.next_problem(Player::One);
        if self.state.game_mode == GameMode::TwoPlayer {
            self.next_problem(Player::Two);
        }

        self.clock_timer = Some(self.scheduler.every(
            MATCH_CLOCK_PERIOD,
            TimerTick {
                kind: TimerKind::MatchClock,
                match_id: self.match_id,
            },
        ));
        if self.state.game_mode == GameMode::Single {
            let period = Duration::from_secs_f64(self.state.opponent_pull_speed / 1000.0);
            self.opponent_timer = Some(self.scheduler.every(
                period,
                TimerTick {
                    kind: TimerKind::OpponentPull,
                    match_id: self.match_id,
                },
            ));
        }

        info!(
            match_id = self.match_id,
            mode = %self.state.game_mode,
            operation = %operation,
            level = self.state.level,
            "match started"
        );
    }

    /// Handle a raw answer from `player`. Returns `None` when the input was ignored.
    pub fn submit(&mut self, player: Player, raw: &str) -> Option<Submission> {
        if !self.state.game_active {
            return None;
        }
        if self.state.game_mode == GameMode::Single && player == Player::Two {
            return None;
        }
        let Some(answer) = parse_answer(raw) else {
            debug!(player = player.number(), raw, "ignoring non-numeric answer");
            return None;
        };
        let expected = self.state.problem_for(player)?.answer;
        let correct = answer == expected;

        if correct {
            match player {
                Player::One => self.state.score += 1,
                Player::Two => self.state.opponent_score += 1,
            }
        }

        let delta = rope::answer_delta(player, correct, self.state.pull_strength);
        let winner = rope::apply_pull(&mut self.state, delta);
        match winner {
            Some(w) => self.finish(w),
            None => self.next_problem(player),
        }

        Some(Submission {
            player,
            correct,
            winner,
        })
    }

    /// Route a timer fire. Ticks from an older match or after the end are dropped.
    pub fn on_timer(&mut self, tick: TimerTick, now: Instant) -> Option<Winner> {
        if tick.match_id != self.match_id || !self.state.game_active {
            trace!(?tick, current = self.match_id, "dropping stale timer tick");
            return None;
        }
        match tick.kind {
            TimerKind::MatchClock => {
                self.clock_tick(now);
                None
            }
            TimerKind::OpponentPull => self.opponent_tick(),
        }
    }

    /// Recompute elapsed seconds from wall-clock time.
    pub fn clock_tick(&mut self, now: Instant) {
        if !self.state.game_active {
            return;
        }
        if let Some(started) = self.started_at {
            let elapsed = now.saturating_duration_since(started).as_secs();
            self.state.timer = self.state.timer.max(elapsed);
        }
    }

    /// One computer pull. Only meaningful in single mode.
    pub fn opponent_tick(&mut self) -> Option<Winner> {
        if !self.state.game_active || self.state.game_mode != GameMode::Single {
            return None;
        }
        self.state.opponent_score += 1;
        let pull = self.state.opponent_pull();
        let winner = rope::apply_pull(&mut self.state, pull);
        if let Some(w) = winner {
            self.finish(w);
        }
        winner
    }

    /// Back to the menu while a match is running, skipping the result screen.
    pub fn abort(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.cancel_timers();
        self.state.game_active = false;
        self.state.reset();
        self.phase = Phase::Idle;
        info!(match_id = self.match_id, "match aborted");
        true
    }

    /// Leave the result screen.
    pub fn acknowledge(&mut self) -> bool {
        if !matches!(self.phase, Phase::Ended(_)) {
            return false;
        }
        self.state.reset();
        self.phase = Phase::Idle;
        true
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            rope_position: self.state.rope_position,
            player1_question: self.state.player1_problem.as_ref().map(|p| p.question.clone()),
            player2_question: self.state.player2_problem.as_ref().map(|p| p.question.clone()),
            timer_display: format!("Time: {}s", self.state.timer),
            result: match self.phase {
                Phase::Ended(result) => Some(result),
                _ => None,
            },
        }
    }

    fn next_problem(&mut self, player: Player) {
        let problem = problem::generate(self.state.operation, self.state.level, &mut self.rng);
        *self.state.problem_slot(player) = Some(problem);
    }

    fn finish(&mut self, winner: Winner) {
        self.cancel_timers();
        self.state.game_active = false;
        let result = MatchResult {
            winner,
            mode: self.state.game_mode,
            elapsed_secs: self.state.timer,
        };
        self.phase = Phase::Ended(result);
        info!(
            match_id = self.match_id,
            ?winner,
            elapsed_secs = result.elapsed_secs,
            "match ended"
        );
    }

    fn cancel_timers(&mut self) {
        if let Some(handle) = self.clock_timer.take() {
            handle.cancel();
        }
        if let Some(handle) = self.opponent_timer.take() {
            handle.cancel();
        }
    }
}

/// Read the leading integer of `raw`, ignoring anything typed after it.
/// `None` when no digit follows the optional sign.
pub fn parse_answer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let digits_from = usize::from(raw.starts_with(['-', '+']));
    let digits_len = raw[digits_from..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    raw[..digits_from + digits_len].parse().ok()
}

impl<S: Scheduler, R: Rng> Drop for Controller<S, R> {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::ManualScheduler;
    use assert_matches::assert_matches;

    fn controller(mode: GameMode) -> (Controller<ManualScheduler>, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let mut c = Controller::with_rng(scheduler.clone(), StdRng::seed_from_u64(42));
        c.select_mode(mode);
        (c, scheduler)
    }

    fn answer(c: &Controller<ManualScheduler>, player: Player) -> String {
        c.state().problem_for(player).unwrap().answer.to_string()
    }

    fn wrong(c: &Controller<ManualScheduler>, player: Player) -> String {
        (c.state().problem_for(player).unwrap().answer + 1).to_string()
    }

    #[test]
    fn start_single_mode() {
        let (mut c, scheduler) = controller(GameMode::Single);
        c.start(Operation::Addition, 2, Instant::now());

        assert!(c.is_active());
        assert_eq!(c.phase(), &Phase::Active);
        assert!(c.state().player1_problem.is_some());
        assert!(c.state().player2_problem.is_none());
        assert_eq!(c.state().pull_strength, 4.0);
        assert_eq!(c.state().opponent_pull_speed, 1500.0);

        let live = scheduler.live();
        assert_eq!(live.len(), 2);
        let opponent = live
            .iter()
            .find(|t| t.tick.kind == TimerKind::OpponentPull)
            .unwrap();
        assert_eq!(opponent.period, Duration::from_millis(1500));
    }

    #[test]
    fn start_two_player_mode() {
        let (mut c, scheduler) = controller(GameMode::TwoPlayer);
        c.start(Operation::Multiplication, 1, Instant::now());

        assert!(c.state().player1_problem.is_some());
        assert!(c.state().player2_problem.is_some());
        assert_eq!(c.state().pull_strength, 5.0);
        let live = scheduler.live();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].tick.kind, TimerKind::MatchClock);
    }

    #[test]
    fn non_numeric_answer_changes_nothing() {
        let (mut c, _) = controller(GameMode::Single);
        c.start(Operation::Addition, 1, Instant::now());
        let before = c.state().clone();

        assert_eq!(c.submit(Player::One, "abc"), None);
        assert_eq!(c.submit(Player::One, ""), None);
        assert_eq!(c.submit(Player::One, "-"), None);
        assert_eq!(c.submit(Player::One, "x8"), None);
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn trailing_characters_after_answer_are_dropped() {
        let (mut c, _) = controller(GameMode::Single);
        c.start(Operation::Addition, 1, Instant::now());

        let raw = format!("{}-", answer(&c, Player::One));
        let sub = c.submit(Player::One, &raw).unwrap();
        assert!(sub.correct);
        assert_eq!(c.state().rope_position, 42.0);
    }

    #[test]
    fn parse_answer_reads_leading_integer() {
        assert_eq!(parse_answer("8-"), Some(8));
        assert_eq!(parse_answer("  12abc"), Some(12));
        assert_eq!(parse_answer("-3"), Some(-3));
        assert_eq!(parse_answer("+4"), Some(4));
        assert_eq!(parse_answer("--3"), None);
        assert_eq!(parse_answer("-"), None);
        assert_eq!(parse_answer(""), None);
    }

    #[test]
    fn opponent_tick_ignored_in_two_player_mode() {
        let (mut c, _) = controller(GameMode::TwoPlayer);
        let t0 = Instant::now();
        c.start(Operation::Addition, 3, t0);
        let tick = TimerTick {
            kind: TimerKind::OpponentPull,
            match_id: c.match_id(),
        };

        assert_eq!(c.on_timer(tick, t0), None);
        assert_eq!(c.opponent_tick(), None);
        assert_eq!(c.state().rope_position, 50.0);
        assert_eq!(c.state().opponent_score, 0);
        assert!(c.is_active());
    }

    #[test]
    fn correct_answer_pulls_toward_player_one() {
        let (mut c, _) = controller(GameMode::Single);
        c.start(Operation::Subtraction, 1, Instant::now());

        let raw = answer(&c, Player::One);
        let sub = c.submit(Player::One, &raw).unwrap();
        assert!(sub.correct);
        assert_eq!(sub.winner, None);
        assert_eq!(c.state().rope_position, 42.0);
        assert_eq!(c.state().score, 1);
        assert!(c.state().player1_problem.is_some());
    }

    #[test]
    fn wrong_answer_helps_opponent() {
        let (mut c, _) = controller(GameMode::TwoPlayer);
        c.start(Operation::Addition, 1, Instant::now());

        let raw = wrong(&c, Player::Two);
        let p1_before = c.state().player1_problem.clone();
        let sub = c.submit(Player::Two, &raw).unwrap();
        assert!(!sub.correct);
        assert_eq!(c.state().rope_position, 45.0);
        // only the submitting player gets a fresh problem
        assert_eq!(c.state().player1_problem, p1_before);
    }

    #[test]
    fn player_two_ignored_in_single_mode() {
        let (mut c, _) = controller(GameMode::Single);
        c.start(Operation::Addition, 1, Instant::now());
        assert_eq!(c.submit(Player::Two, "3"), None);
        assert_eq!(c.state().rope_position, 50.0);
    }

    #[test]
    fn player_one_wins_by_answering() {
        let (mut c, scheduler) = controller(GameMode::TwoPlayer);
        c.start(Operation::Addition, 1, Instant::now());

        let mut last = None;
        for _ in 0..20 {
            let raw = answer(&c, Player::One);
            last = c.submit(Player::One, &raw);
            if !c.is_active() {
                break;
            }
        }

        assert_matches!(last, Some(Submission { winner: Some(Winner::PlayerOne), .. }));
        assert_matches!(c.phase(), Phase::Ended(MatchResult { winner: Winner::PlayerOne, .. }));
        assert!(c.state().rope_position <= 10.0);
        assert!(scheduler.live().is_empty());
    }

    #[test]
    fn computer_wins_by_auto_pulls() {
        let (mut c, scheduler) = controller(GameMode::Single);
        let t0 = Instant::now();
        c.start(Operation::Division, 3, t0);
        let tick = TimerTick {
            kind: TimerKind::OpponentPull,
            match_id: c.match_id(),
        };

        // 6 per pull at level 3: 56, 62, ... 92
        let mut winner = None;
        for _ in 0..7 {
            winner = c.on_timer(tick, t0);
        }
        assert_eq!(winner, Some(Winner::Computer));
        assert!(!c.is_active());
        assert!(scheduler.live().is_empty());

        let result = c.view().result.unwrap();
        assert_eq!(result.title(), "DEFEAT...");
    }

    #[test]
    fn ended_match_ignores_further_input() {
        let (mut c, _) = controller(GameMode::Single);
        let t0 = Instant::now();
        c.start(Operation::Addition, 3, t0);
        let id = c.match_id();
        while c.is_active() {
            c.opponent_tick();
        }
        let frozen = c.state().rope_position;

        assert_eq!(c.opponent_tick(), None);
        assert_eq!(c.submit(Player::One, "1"), None);
        let stale = TimerTick {
            kind: TimerKind::OpponentPull,
            match_id: id,
        };
        assert_eq!(c.on_timer(stale, t0), None);
        assert_eq!(c.state().rope_position, frozen);
    }

    #[test]
    fn clock_uses_wall_time() {
        let (mut c, _) = controller(GameMode::TwoPlayer);
        let t0 = Instant::now();
        c.start(Operation::Addition, 1, t0);
        let tick = TimerTick {
            kind: TimerKind::MatchClock,
            match_id: c.match_id(),
        };

        c.on_timer(tick, t0 + Duration::from_millis(2999));
        assert_eq!(c.state().timer, 2);
        // a late tick catches up instead of counting ticks
        c.on_timer(tick, t0 + Duration::from_millis(7400));
        assert_eq!(c.state().timer, 7);
        assert_eq!(c.view().timer_display, "Time: 7s");
    }

    #[test]
    fn restart_cancels_previous_timers_and_drops_their_ticks() {
        let (mut c, scheduler) = controller(GameMode::Single);
        let t0 = Instant::now();
        c.start(Operation::Addition, 1, t0);
        let old = TimerTick {
            kind: TimerKind::OpponentPull,
            match_id: c.match_id(),
        };

        c.start(Operation::Addition, 1, t0);
        assert_eq!(scheduler.scheduled().len(), 4);
        assert_eq!(scheduler.live().len(), 2);
        assert!(scheduler
            .live()
            .iter()
            .all(|t| t.tick.match_id == c.match_id()));

        assert_eq!(c.on_timer(old, t0), None);
        assert_eq!(c.state().rope_position, 50.0);
    }

    #[test]
    fn abort_returns_to_idle_without_result() {
        let (mut c, scheduler) = controller(GameMode::Single);
        c.start(Operation::Addition, 2, Instant::now());
        assert!(c.abort());

        assert_eq!(c.phase(), &Phase::Idle);
        assert!(!c.is_active());
        assert!(c.view().result.is_none());
        assert!(scheduler.live().is_empty());
        assert_eq!(c.state().level, 2);
        assert!(!c.abort());
    }

    #[test]
    fn acknowledge_resets_but_keeps_selections() {
        let (mut c, _) = controller(GameMode::Single);
        c.start(Operation::Multiplication, 3, Instant::now());
        while c.is_active() {
            c.opponent_tick();
        }
        assert!(c.acknowledge());

        let s = c.state();
        assert_eq!(c.phase(), &Phase::Idle);
        assert_eq!(s.rope_position, 50.0);
        assert_eq!(s.timer, 0);
        assert!(s.player1_problem.is_none());
        assert_eq!(s.level, 3);
        assert_eq!(s.game_mode, GameMode::Single);
        assert_eq!(s.operation, Operation::Multiplication);
    }

    #[test]
    fn selections_locked_outside_menu() {
        let (mut c, _) = controller(GameMode::Single);
        c.start(Operation::Addition, 1, Instant::now());
        assert!(!c.select_mode(GameMode::TwoPlayer));
        assert!(!c.select_level(3));
        assert_eq!(c.state().game_mode, GameMode::Single);
    }

    #[test]
    fn result_texts() {
        let win = MatchResult {
            winner: Winner::PlayerOne,
            mode: GameMode::Single,
            elapsed_secs: 12,
        };
        assert_eq!(win.title(), "YOU WIN!");
        assert_eq!(
            win.message(),
            "Great job! You defeated the computer in 12 seconds."
        );

        let p2 = MatchResult {
            winner: Winner::PlayerTwo,
            mode: GameMode::TwoPlayer,
            elapsed_secs: 30,
        };
        assert_eq!(p2.title(), "PLAYER 2 WINS!");
        assert_eq!(
            p2.message(),
            "Victory for Player 2! Match duration: 30 seconds."
        );

        let p1 = MatchResult {
            winner: Winner::PlayerOne,
            mode: GameMode::TwoPlayer,
            elapsed_secs: 8,
        };
        assert_eq!(p1.title(), "PLAYER 1 WINS!");
        assert_eq!(
            p1.message(),
            "Victory for Player 1! Match duration: 8 seconds."
        );
    }
}
