//! Turns the stabilized gesture stream into game actions.
//!
//! Jump (and restart, while the game is over) fire once on the rising edge of
//! a stabilized jump. Duck is held for as long as its source reads duck.

use crate::gesture::Gesture;
use std::str::FromStr;

/// Which label stream drives the held duck action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum DuckSource {
    /// Duck follows the majority-vote label: survives brief tracking loss,
    /// releases a few frames late.
    Stabilized,
    /// Duck follows the current frame's label: releases the moment the
    /// gesture (or the hand) is lost.
    Raw,
}

impl Default for DuckSource {
    fn default() -> Self {
        Self::Stabilized
    }
}

impl FromStr for DuckSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stabilized" => Ok(Self::Stabilized),
            "raw" => Ok(Self::Raw),
            other => Err(format!(
                "unknown duck source {:?}, expected \"stabilized\" or \"raw\"",
                other
            )),
        }
    }
}

/// Actions for one tick.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct Actions {
    pub(crate) jump: bool,
    pub(crate) restart: bool,
    pub(crate) duck: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ControlMapper {
    duck_source: DuckSource,
    jump_was_active: bool,
    actions: Actions,
}

impl ControlMapper {
    pub(crate) fn new(duck_source: DuckSource) -> Self {
        Self {
            duck_source,
            ..Self::default()
        }
    }

    pub(crate) fn update(&mut self, stabilized: Gesture, raw: Gesture, game_over: bool) -> Actions {
        let jump_active = stabilized == Gesture::Jump;
        let rising = jump_active && !self.jump_was_active;
        self.jump_was_active = jump_active;

        let duck_label = match self.duck_source {
            DuckSource::Stabilized => stabilized,
            DuckSource::Raw => raw,
        };

        self.actions = Actions {
            jump: rising && !game_over,
            restart: rising && game_over,
            duck: duck_label == Gesture::Duck && !game_over,
        };
        self.actions
    }

    pub(crate) fn actions(&self) -> Actions {
        self.actions
    }

    pub(crate) fn reset(&mut self) {
        self.jump_was_active = false;
        self.actions = Actions::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{Actions, ControlMapper, DuckSource};
    use crate::gesture::Gesture::{self, *};

    fn run(mapper: &mut ControlMapper, stabilized: &[Gesture]) -> Vec<Actions> {
        stabilized
            .iter()
            .map(|&label| mapper.update(label, label, false))
            .collect()
    }

    #[test]
    fn held_jump_fires_once() {
        let mut mapper = ControlMapper::default();
        let actions = run(&mut mapper, &[Jump; 20]);
        assert_eq!(actions.iter().filter(|a| a.jump).count(), 1);
        assert!(actions[0].jump);
    }

    #[test]
    fn jump_refires_after_release() {
        let mut mapper = ControlMapper::default();
        let actions = run(&mut mapper, &[Jump, Jump, Idle, Run, Jump, Jump]);
        let fired: Vec<bool> = actions.iter().map(|a| a.jump).collect();
        assert_eq!(fired, vec![true, false, false, false, true, false]);
    }

    #[test]
    fn duck_is_held() {
        let mut mapper = ControlMapper::default();
        let actions = run(&mut mapper, &[Duck, Duck, Duck, Idle]);
        let held: Vec<bool> = actions.iter().map(|a| a.duck).collect();
        assert_eq!(held, vec![true, true, true, false]);
    }

    #[test]
    fn run_and_idle_are_neutral() {
        let mut mapper = ControlMapper::default();
        for actions in run(&mut mapper, &[Run, Idle, Run]) {
            assert_eq!(actions, Actions::default());
        }
    }

    #[test]
    fn rising_edge_restarts_when_game_over() {
        let mut mapper = ControlMapper::default();
        let first = mapper.update(Jump, Jump, true);
        assert!(first.restart);
        assert!(!first.jump);
        let held = mapper.update(Jump, Jump, false);
        assert_eq!(held, Actions::default());
    }

    #[test]
    fn no_duck_while_game_over() {
        let mut mapper = ControlMapper::default();
        assert!(!mapper.update(Duck, Duck, true).duck);
    }

    #[test]
    fn raw_duck_releases_immediately() {
        let mut mapper = ControlMapper::new(DuckSource::Raw);
        assert!(mapper.update(Duck, Duck, false).duck);
        assert!(!mapper.update(Duck, Idle, false).duck);
    }

    #[test]
    fn stabilized_duck_survives_tracking_gap() {
        let mut mapper = ControlMapper::new(DuckSource::Stabilized);
        assert!(mapper.update(Duck, Duck, false).duck);
        assert!(mapper.update(Duck, Idle, false).duck);
    }

    #[test]
    fn reset_rearms_jump() {
        let mut mapper = ControlMapper::default();
        assert!(mapper.update(Jump, Jump, false).jump);
        mapper.reset();
        assert!(mapper.update(Jump, Jump, false).jump);
    }

    #[test]
    fn parse_duck_source() {
        assert_eq!("raw".parse::<DuckSource>(), Ok(DuckSource::Raw));
        assert_eq!("stabilized".parse::<DuckSource>(), Ok(DuckSource::Stabilized));
        assert!("held".parse::<DuckSource>().is_err());
    }
}
