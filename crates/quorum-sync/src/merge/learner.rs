//! Adaptive merge heuristic owned by one node's merge engine.
//!
//! A single recurrent unit estimates how likely a merge with a given
//! field diff is to resolve deterministically. Per-field preferences track
//! whether the peer or the local side tends to hold the newer value.
//! Activation runs the recurrence until successive outputs differ by less
//! than `activation_epsilon` or `max_activation_iterations` is reached.

use serde::{Deserialize, Serialize};

use quorum_core::config::MergeConfig;
use quorum_core::constants::MAX_CONVERGENCE_STEPS;

use crate::consensus::FieldDiff;

const FEATURES: usize = 4;
const INITIAL_WEIGHTS: [f64; FEATURES] = [-2.0, -0.5, -0.5, 0.5];
const RECURRENT_LIMIT: f64 = 2.0;
const NEUTRAL_PREFERENCE: f64 = 0.5;

/// Result of one activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation {
    pub confidence: f64,
    pub iterations: usize,
}

/// Snapshot of learner state for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerSummary {
    pub samples: u64,
    pub weights: [f64; FEATURES],
    pub recurrent: f64,
    pub field_preference: Vec<f64>,
}

/// Which side the learner favours for one differing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChoice {
    Local,
    Peer,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeLearner {
    weights: [f64; FEATURES],
    recurrent: f64,
    field_preference: Vec<f64>,
    samples: u64,
}

impl MergeLearner {
    pub fn new(field_count: usize) -> Self {
        Self {
            weights: INITIAL_WEIGHTS,
            recurrent: 0.0,
            field_preference: vec![NEUTRAL_PREFERENCE; field_count],
            samples: 0,
        }
    }

    /// Confidence that a merge over `diff` resolves without conflict.
    pub fn activate(&self, diff: &FieldDiff, link: usize, config: &MergeConfig) -> Activation {
        let x = features(diff, link);
        let drive: f64 = self.weights.iter().zip(&x).map(|(w, v)| w * v).sum();
        let mut y = NEUTRAL_PREFERENCE;
        let mut iterations = 0;
        while iterations < config.max_activation_iterations {
            iterations += 1;
            let next = sigmoid(drive + self.recurrent * y);
            let settled = (next - y).abs() < config.activation_epsilon;
            y = next;
            if settled {
                break;
            }
        }
        Activation {
            confidence: y,
            iterations,
        }
    }

    /// One gradient step towards `label` plus a preference update for
    /// every differing field.
    pub fn train(
        &mut self,
        diff: &FieldDiff,
        link: usize,
        label: bool,
        peer_newer: Option<bool>,
        config: &MergeConfig,
    ) {
        let x = features(diff, link);
        let y = self.activate(diff, link, config).confidence;
        let target = if label { 1.0 } else { 0.0 };
        let error = target - y;
        for (w, v) in self.weights.iter_mut().zip(&x) {
            *w += config.learning_rate * error * v;
        }
        self.recurrent = (self.recurrent + config.learning_rate * error * y)
            .clamp(-RECURRENT_LIMIT, RECURRENT_LIMIT);

        if self.field_preference.len() < diff.len() {
            self.field_preference.resize(diff.len(), NEUTRAL_PREFERENCE);
        }
        let goal = match peer_newer {
            Some(true) => 1.0,
            Some(false) => 0.0,
            None => NEUTRAL_PREFERENCE,
        };
        for i in diff.changed() {
            let p = &mut self.field_preference[i];
            *p += config.learning_rate * (goal - *p);
        }
        self.samples += 1;
    }

    pub fn choice(&self, field: usize) -> FieldChoice {
        let p = self
            .field_preference
            .get(field)
            .copied()
            .unwrap_or(NEUTRAL_PREFERENCE);
        if p > NEUTRAL_PREFERENCE {
            FieldChoice::Peer
        } else if p < NEUTRAL_PREFERENCE {
            FieldChoice::Local
        } else {
            FieldChoice::Tie
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Forget everything learned, keeping the field count.
    pub fn reset(&mut self) {
        *self = Self::new(self.field_preference.len());
    }

    pub fn summary(&self) -> LearnerSummary {
        LearnerSummary {
            samples: self.samples,
            weights: self.weights,
            recurrent: self.recurrent,
            field_preference: self.field_preference.clone(),
        }
    }
}

/// bias, changed fraction, normalised elapsed time, link equality.
fn features(diff: &FieldDiff, link: usize) -> [f64; FEATURES] {
    let changed = if diff.is_empty() {
        0.0
    } else {
        diff.changed().len() as f64 / diff.len() as f64
    };
    let elapsed = diff.elapsed().min(u64::from(MAX_CONVERGENCE_STEPS)) as f64
        / f64::from(MAX_CONVERGENCE_STEPS);
    let link_equal = if diff.is_equal(link) { 1.0 } else { 0.0 };
    [1.0, changed, elapsed, link_equal]
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
