//! Practice topics and difficulty levels offered in both tabs.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    LinearRegression,
    LogisticRegression,
    DecisionTrees,
    NeuralNetworks,
    Cnns,
    RnnsLstms,
    Transformers,
    GradientDescent,
    Regularization,
    Clustering,
    DimensionalityReduction,
    EvaluationMetrics,
}

impl Topic {
    pub const ALL: [Topic; 12] = [
        Topic::LinearRegression,
        Topic::LogisticRegression,
        Topic::DecisionTrees,
        Topic::NeuralNetworks,
        Topic::Cnns,
        Topic::RnnsLstms,
        Topic::Transformers,
        Topic::GradientDescent,
        Topic::Regularization,
        Topic::Clustering,
        Topic::DimensionalityReduction,
        Topic::EvaluationMetrics,
    ];

    /// Wire id, identical to the serde name.
    pub fn id(&self) -> &'static str {
        match self {
            Topic::LinearRegression => "linear_regression",
            Topic::LogisticRegression => "logistic_regression",
            Topic::DecisionTrees => "decision_trees",
            Topic::NeuralNetworks => "neural_networks",
            Topic::Cnns => "cnns",
            Topic::RnnsLstms => "rnns_lstms",
            Topic::Transformers => "transformers",
            Topic::GradientDescent => "gradient_descent",
            Topic::Regularization => "regularization",
            Topic::Clustering => "clustering",
            Topic::DimensionalityReduction => "dimensionality_reduction",
            Topic::EvaluationMetrics => "evaluation_metrics",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Topic::LinearRegression => "Linear Regression",
            Topic::LogisticRegression => "Logistic Regression",
            Topic::DecisionTrees => "Decision Trees",
            Topic::NeuralNetworks => "Neural Networks",
            Topic::Cnns => "Convolutional Neural Networks",
            Topic::RnnsLstms => "RNNs and LSTMs",
            Topic::Transformers => "Transformers and Attention",
            Topic::GradientDescent => "Gradient Descent and Optimizers",
            Topic::Regularization => "Regularization",
            Topic::Clustering => "Clustering",
            Topic::DimensionalityReduction => "Dimensionality Reduction",
            Topic::EvaluationMetrics => "Evaluation Metrics",
        }
    }

    /// True for topics that belong to deep learning rather than classical ML.
    pub fn is_deep_learning(&self) -> bool {
        matches!(
            self,
            Topic::NeuralNetworks | Topic::Cnns | Topic::RnnsLstms | Topic::Transformers
        )
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn id(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// What the level means, spelled out for the model.
    pub(crate) fn guidance(&self) -> &'static str {
        match self {
            Difficulty::Easy => {
                "a warm-up suitable for a junior candidate; one core concept, NumPy only"
            }
            Difficulty::Medium => {
                "a typical on-site question; combine two concepts and mind numerical stability"
            }
            Difficulty::Hard => {
                "a senior-level question; from-scratch implementation with vectorization, \
                 edge cases and complexity discussion"
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_ids_are_snake_case() {
        let t: Topic = serde_json::from_str("\"rnns_lstms\"").unwrap();
        assert_eq!(t, Topic::RnnsLstms);
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
    }

    #[test]
    fn deep_learning_split() {
        let dl = Topic::ALL.iter().filter(|t| t.is_deep_learning()).count();
        assert_eq!(dl, 4);
    }

    #[test]
    fn ids_match_serde_names() {
        for t in Topic::ALL {
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t.id()));
        }
    }
}
