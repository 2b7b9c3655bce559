//! Sliding-window majority filter over raw per-frame gesture labels.

use crate::{error::Error, gesture::Gesture};
use std::collections::VecDeque;

const DEFAULT_HISTORY_SIZE: &str = "10";
const DEFAULT_WINDOW_SIZE: &str = "5";
const DEFAULT_QUORUM: &str = "3";
const DEFAULT_MIN_HISTORY: &str = "3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, structopt::StructOpt)]
pub(crate) struct Config {
    /// Number of raw labels remembered.
    #[structopt(long, default_value = DEFAULT_HISTORY_SIZE)]
    pub(crate) history_size: usize,

    /// Number of most recent labels that take part in the vote.
    #[structopt(long, default_value = DEFAULT_WINDOW_SIZE)]
    pub(crate) window_size: usize,

    /// Votes within the window needed to confirm a gesture.
    #[structopt(long, default_value = DEFAULT_QUORUM)]
    pub(crate) quorum: usize,

    /// Labels that must be recorded after a reset before any gesture is confirmed.
    #[structopt(long, default_value = DEFAULT_MIN_HISTORY)]
    pub(crate) min_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE.parse().unwrap(),
            window_size: DEFAULT_WINDOW_SIZE.parse().unwrap(),
            quorum: DEFAULT_QUORUM.parse().unwrap(),
            min_history: DEFAULT_MIN_HISTORY.parse().unwrap(),
        }
    }
}

impl Config {
    pub(crate) fn validate(self) -> Result<Self, Error> {
        let Self {
            history_size,
            window_size,
            quorum,
            ..
        } = self;
        if quorum == 0 {
            Err(Error::ZeroQuorum)
        } else if quorum > window_size {
            Err(Error::QuorumExceedsWindow(quorum, window_size))
        } else if window_size > history_size {
            Err(Error::WindowExceedsHistory(window_size, history_size))
        } else {
            Ok(self)
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Stabilizer {
    config: Config,
    history: VecDeque<Gesture>,
    recorded: usize,
    stabilized: Gesture,
}

impl Stabilizer {
    pub(crate) fn new(config: Config) -> Result<Self, Error> {
        let config = config.validate()?;
        Ok(Self {
            config,
            history: VecDeque::with_capacity(config.history_size),
            recorded: 0,
            stabilized: Gesture::Idle,
        })
    }

    /// Record the newest raw label and return the updated stabilized gesture.
    pub(crate) fn push(&mut self, raw: Gesture) -> Gesture {
        if self.history.len() == self.config.history_size {
            self.history.pop_front();
        }
        self.history.push_back(raw);
        self.recorded = self.recorded.saturating_add(1);
        self.stabilized = self.vote();
        self.stabilized
    }

    fn vote(&self) -> Gesture {
        if self.recorded < self.config.min_history {
            return Gesture::Idle;
        }

        let skip = self.history.len().saturating_sub(self.config.window_size);
        let (jumps, ducks) =
            self.history
                .iter()
                .skip(skip)
                .fold((0, 0), |(jumps, ducks), gesture| match gesture {
                    Gesture::Jump => (jumps + 1, ducks),
                    Gesture::Duck => (jumps, ducks + 1),
                    Gesture::Idle | Gesture::Run => (jumps, ducks),
                });

        if jumps >= self.config.quorum {
            Gesture::Jump
        } else if ducks >= self.config.quorum {
            Gesture::Duck
        } else {
            Gesture::Idle
        }
    }

    pub(crate) fn stabilized(&self) -> Gesture {
        self.stabilized
    }

    #[cfg_attr(not(feature = "gui"), allow(dead_code))]
    pub(crate) fn history(&self) -> impl Iterator<Item = Gesture> + '_ {
        self.history.iter().copied()
    }

    pub(crate) fn reset(&mut self) {
        self.history.clear();
        self.recorded = 0;
        self.stabilized = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Stabilizer};
    use crate::{error::Error, gesture::Gesture};
    use Gesture::*;

    fn feed(stabilizer: &mut Stabilizer, labels: &[Gesture]) -> Gesture {
        labels
            .iter()
            .fold(Idle, |_, &label| stabilizer.push(label))
    }

    fn stabilizer() -> Stabilizer {
        Stabilizer::new(Config::default()).unwrap()
    }

    #[test]
    fn cold_start_is_idle() {
        let mut s = stabilizer();
        assert_eq!(s.push(Jump), Idle);
        assert_eq!(s.push(Jump), Idle);
        assert_eq!(s.push(Jump), Jump);
    }

    #[test]
    fn cold_start_ignores_duck() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Duck, Duck]), Idle);
    }

    #[test]
    fn three_of_five_confirms() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Jump, Idle, Jump, Idle, Jump]), Jump);
    }

    #[test]
    fn split_vote_is_idle() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Jump, Duck, Idle, Jump, Duck]), Idle);
    }

    #[test]
    fn leading_no_subject_frames() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Idle, Idle, Jump, Jump, Jump]), Jump);
    }

    #[test]
    fn jump_checked_before_duck() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Jump, Jump, Jump, Duck, Duck]), Jump);
    }

    #[test]
    fn both_at_quorum_prefers_jump() {
        let mut s = Stabilizer::new(Config {
            window_size: 4,
            quorum: 2,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(feed(&mut s, &[Duck, Jump, Duck, Jump]), Jump);
    }

    #[test]
    fn run_does_not_vote() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Run, Run, Run, Run, Run]), Idle);
    }

    #[test]
    fn only_last_window_votes() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Jump, Jump, Jump, Idle, Idle, Idle]), Idle);
    }

    #[test]
    fn no_subject_frames_decay_jump() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Jump; 10]), Jump);
        assert_eq!(s.push(Idle), Jump);
        assert_eq!(s.push(Idle), Jump);
        assert_eq!(s.push(Idle), Idle);
        assert_eq!(feed(&mut s, &[Idle, Idle]), Idle);
    }

    #[test]
    fn history_is_bounded() {
        let mut s = stabilizer();
        feed(&mut s, &[Duck; 25]);
        s.push(Jump);
        assert_eq!(s.history().count(), 10);
        assert_eq!(s.history().last(), Some(Jump));
    }

    #[test]
    fn reset_restores_cold_start() {
        let mut s = stabilizer();
        feed(&mut s, &[Jump; 6]);
        s.reset();
        assert_eq!(s.stabilized(), Idle);
        assert_eq!(s.history().count(), 0);
        assert_eq!(feed(&mut s, &[Jump, Jump]), Idle);
    }

    #[test]
    fn window_and_quorum_are_independent() {
        let mut s = Stabilizer::new(Config {
            history_size: 20,
            window_size: 8,
            quorum: 6,
            min_history: 3,
        })
        .unwrap();
        assert_eq!(feed(&mut s, &[Jump, Jump, Jump, Jump, Jump, Idle]), Idle);
        assert_eq!(s.push(Jump), Jump);
    }

    #[test]
    fn invalid_configs() {
        let invalid = |config| Stabilizer::new(config).unwrap_err();
        assert!(matches!(
            invalid(Config {
                quorum: 0,
                ..Config::default()
            }),
            Error::ZeroQuorum
        ));
        assert!(matches!(
            invalid(Config {
                quorum: 6,
                ..Config::default()
            }),
            Error::QuorumExceedsWindow(6, 5)
        ));
        assert!(matches!(
            invalid(Config {
                window_size: 11,
                ..Config::default()
            }),
            Error::WindowExceedsHistory(11, 10)
        ));
    }
}
