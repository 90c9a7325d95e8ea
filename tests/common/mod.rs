#![allow(dead_code)]

use tabular_rl::env::{DiscreteActionSpace, Environment, Transition};

/// Replays a fixed list of transitions regardless of the actions taken
pub struct ScriptedEnv {
    initial: u32,
    transitions: Vec<Transition<u32>>,
    cursor: usize,
}

impl ScriptedEnv {
    pub fn new(initial: u32, transitions: Vec<Transition<u32>>) -> Self {
        assert!(!transitions.is_empty());
        Self {
            initial,
            transitions,
            cursor: 0,
        }
    }
}

impl Environment for ScriptedEnv {
    type State = u32;
    type Action = usize;

    fn reset(&mut self) -> u32 {
        self.cursor = 0;
        self.initial
    }

    fn step(&mut self, _action: usize) -> Transition<u32> {
        let t = self.transitions[self.cursor.min(self.transitions.len() - 1)];
        if self.cursor < self.transitions.len() {
            self.cursor += 1;
        }
        t
    }

    fn dimensions(&self) -> (usize, usize) {
        (16, 1)
    }
}

impl DiscreteActionSpace for ScriptedEnv {
    fn actions(&self) -> Vec<usize> {
        vec![0, 1]
    }
}

/// Never reaches a terminal state
pub struct Treadmill;

impl Environment for Treadmill {
    type State = u32;
    type Action = usize;

    fn reset(&mut self) -> u32 {
        0
    }

    fn step(&mut self, _action: usize) -> Transition<u32> {
        Transition {
            state: 0,
            reward: -1.0,
            done: false,
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        (3, 3)
    }
}

impl DiscreteActionSpace for Treadmill {
    fn actions(&self) -> Vec<usize> {
        vec![0, 1]
    }
}
