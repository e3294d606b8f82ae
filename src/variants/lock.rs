//! Mechanical lock: release the bolts in a hidden order.
//!
//! Bolts are shown in shuffled order. Picking the next bolt of the target
//! order unlocks it; picking any other bolt re-engages every bolt.

use std::fmt;

use log::debug;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::PuzzleConfig;
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::variant::{Progress, Variant};

pub const DEFAULT_BOLTS: [&str; 3] = ["red", "blue", "green"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockMove {
    /// Pick the bolt shown in this display slot.
    Select(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MechanicalLock {
    /// Bolt names in unlock order.
    #[serde(skip)]
    order: Vec<String>,
    /// Display slot -> index into `order`.
    display: Vec<usize>,
    /// Number of bolts released so far; they are `order[..unlocked]`.
    unlocked: usize,
    /// Whether the last selection reset the lock.
    jammed: bool,
}

impl MechanicalLock {
    /// Builds a lock whose bolts are displayed in the given slot order.
    pub fn new(order: Vec<String>, display: Vec<usize>) -> ConfigResult<Self> {
        if order.is_empty() {
            return Err(ConfigError::invalid("bolts", "at least one bolt is required"));
        }
        let distinct: FxHashSet<&str> = order.iter().map(String::as_str).collect();
        if distinct.len() != order.len() {
            return Err(ConfigError::invalid("bolts", "bolt names must be unique"));
        }
        let mut sorted = display.clone();
        sorted.sort_unstable();
        if sorted != (0..order.len()).collect::<Vec<_>>() {
            return Err(ConfigError::invalid("bolts", "display order is not a permutation"));
        }
        Ok(Self {
            order,
            display,
            unlocked: 0,
            jammed: false,
        })
    }

    /// Bolt names in display order.
    pub fn bolts(&self) -> impl Iterator<Item = &str> {
        self.display.iter().map(|&i| self.order[i].as_str())
    }

    /// Whether the bolt in `slot` is released.
    pub fn is_unlocked(&self, slot: usize) -> bool {
        self.display.get(slot).is_some_and(|&i| i < self.unlocked)
    }

    pub fn unlocked(&self) -> usize {
        self.unlocked
    }

    /// Whether the last selection was out of order and reset the lock.
    pub fn jammed(&self) -> bool {
        self.jammed
    }
}

impl Variant for MechanicalLock {
    type Move = LockMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let order = match &config.bolts {
            Some(bolts) => bolts.clone(),
            None => DEFAULT_BOLTS.iter().map(|s| s.to_string()).collect(),
        };
        let mut display: Vec<usize> = (0..order.len()).collect();
        display.shuffle(rng);
        Self::new(order, display)
    }

    fn apply(&mut self, mv: LockMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        let LockMove::Select(slot) = mv;
        let &bolt = self.display.get(slot).ok_or(Rejection::OutOfBounds)?;
        if bolt < self.unlocked {
            return Err(Rejection::AlreadyRevealed);
        }

        if bolt == self.unlocked {
            self.unlocked += 1;
            self.jammed = false;
        } else {
            debug!("lock: bolt {} out of order, resetting", self.order[bolt]);
            self.unlocked = 0;
            self.jammed = true;
        }
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.unlocked == self.order.len()
    }

    fn progress(&self) -> Progress {
        Progress::Lock {
            unlocked: self.unlocked,
            total: self.order.len(),
        }
    }
}

impl fmt::Display for MechanicalLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, name) in self.bolts().enumerate() {
            let state = if self.is_unlocked(slot) { "open" } else { "shut" };
            writeln!(f, "{}: {} [{}]", slot, name, state)?;
        }
        if self.jammed {
            writeln!(f, "sequence fail, resetting")?;
        }
        Ok(())
    }
}
