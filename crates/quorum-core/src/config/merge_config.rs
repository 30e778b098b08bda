use serde::{Deserialize, Serialize};

use super::defaults;

/// Tuning for the adaptive merge heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Confidence the learner must exceed before its blend is trusted.
    pub confidence_threshold: f64,
    /// Gradient step size used after every merge attempt.
    pub learning_rate: f64,
    /// Activation stops once successive outputs differ by less than this.
    pub activation_epsilon: f64,
    /// Hard cap on activation iterations.
    pub max_activation_iterations: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            activation_epsilon: defaults::DEFAULT_ACTIVATION_EPSILON,
            max_activation_iterations: defaults::DEFAULT_MAX_ACTIVATION_ITERATIONS,
        }
    }
}
