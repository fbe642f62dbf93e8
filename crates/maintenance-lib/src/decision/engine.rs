//! Cost-based FIX_NOW / WAIT rule
//!
//! FIX_NOW iff `p * cost_failure > cost_fix` or `p >= threshold`. Every
//! caller (HTTP, CLI, batch jobs) goes through [`decide`].

use super::cost::CostModel;
use crate::models::{
    DecisionRule, FailurePrediction, MaintenanceAction, MaintenanceDecision, Probability,
};
use serde::{Deserialize, Serialize};

/// Outcome of the rule for a single probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: MaintenanceAction,
    pub rule: DecisionRule,
    pub expected_failure_cost: f64,
    pub explanation: String,
}

/// Probability weighted cost of letting the component fail
pub fn expected_failure_cost(probability: Probability, cost: &CostModel) -> f64 {
    probability.value() * cost.cost_failure()
}

/// Pure and total over valid inputs
pub fn decide(probability: Probability, cost: &CostModel) -> Decision {
    let p = probability.value();
    let expected = expected_failure_cost(probability, cost);
    let cost_rule = expected > cost.cost_fix();
    let threshold_rule = p >= cost.threshold();

    let cost_clause = format!("expected failure cost {:.2} > fix cost {:.2}", expected, cost.cost_fix());
    let threshold_clause = format!("probability {:.2} >= threshold {:.2}", p, cost.threshold());

    let (action, rule, explanation) = match (cost_rule, threshold_rule) {
        (true, true) => (
            MaintenanceAction::FixNow,
            DecisionRule::ExpectedCostAndThreshold,
            format!("{}; {}", cost_clause, threshold_clause),
        ),
        (true, false) => (MaintenanceAction::FixNow, DecisionRule::ExpectedCost, cost_clause),
        (false, true) => (MaintenanceAction::FixNow, DecisionRule::Threshold, threshold_clause),
        (false, false) => (
            MaintenanceAction::Wait,
            DecisionRule::Neither,
            format!(
                "below threshold, cost acceptable: probability {:.2} < threshold {:.2}, expected failure cost {:.2} <= fix cost {:.2}",
                p,
                cost.threshold(),
                expected,
                cost.cost_fix()
            ),
        ),
    };

    Decision {
        action,
        rule,
        expected_failure_cost: expected,
        explanation,
    }
}

/// Decide for a prediction, carrying its identifiers through
pub fn decide_prediction(prediction: &FailurePrediction, cost: &CostModel) -> MaintenanceDecision {
    let decision = decide(prediction.failure_probability, cost);
    MaintenanceDecision {
        component_id: prediction.component_id.clone(),
        vehicle_id: prediction.vehicle_id.clone(),
        failure_probability: prediction.failure_probability,
        action: decision.action,
        rule: decision.rule,
        expected_failure_cost: decision.expected_failure_cost,
        explanation: decision.explanation,
    }
}

/// Element-wise [`decide_prediction`], preserving input order
pub fn decide_all(predictions: &[FailurePrediction], cost: &CostModel) -> Vec<MaintenanceDecision> {
    predictions.iter().map(|p| decide_prediction(p, cost)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(v: f64) -> Probability {
        Probability::new(v).unwrap()
    }

    fn prediction(id: &str, v: f64) -> FailurePrediction {
        FailurePrediction {
            component_id: id.to_string(),
            vehicle_id: "VH-1".to_string(),
            failure_probability: p(v),
            model_version: "v-test".to_string(),
        }
    }

    #[test]
    fn test_expected_cost_rule_fires() {
        // 0.9 * 5000 = 4500 > 1000
        let d = decide(p(0.9), &CostModel::new(5000.0, 1000.0, 0.95).unwrap());
        assert_eq!(d.action, MaintenanceAction::FixNow);
        assert_eq!(d.rule, DecisionRule::ExpectedCost);
        assert_eq!(d.expected_failure_cost, 4500.0);
        assert_eq!(d.explanation, "expected failure cost 4500.00 > fix cost 1000.00");
    }

    #[test]
    fn test_threshold_rule_fires() {
        // 0.65 * 1000 = 650 < 1000, but 0.65 >= 0.6
        let d = decide(p(0.65), &CostModel::new(1000.0, 1000.0, 0.6).unwrap());
        assert_eq!(d.action, MaintenanceAction::FixNow);
        assert_eq!(d.rule, DecisionRule::Threshold);
        assert_eq!(d.explanation, "probability 0.65 >= threshold 0.60");
    }

    #[test]
    fn test_wait_when_neither_rule_fires() {
        // 0.1 * 5000 = 500 <= 1000 and 0.1 < 0.6
        let d = decide(p(0.1), &CostModel::default());
        assert_eq!(d.action, MaintenanceAction::Wait);
        assert_eq!(d.rule, DecisionRule::Neither);
        assert!(d.explanation.starts_with("below threshold, cost acceptable"));
        assert!(d.explanation.contains("0.10"));
    }

    #[test]
    fn test_both_rules_named() {
        let d = decide(p(0.8), &CostModel::default());
        assert_eq!(d.rule, DecisionRule::ExpectedCostAndThreshold);
        assert!(d.explanation.contains("expected failure cost 4000.00 > fix cost 1000.00"));
        assert!(d.explanation.contains("probability 0.80 >= threshold 0.60"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let cost = CostModel::new(1000.0, 5000.0, 0.6).unwrap();
        assert_eq!(decide(p(0.6), &cost).action, MaintenanceAction::FixNow);
        assert_eq!(decide(p(0.5999), &cost).action, MaintenanceAction::Wait);
    }

    #[test]
    fn test_expected_cost_equal_to_fix_cost_waits() {
        // 0.2 * 5000 == 1000 is not strictly greater
        let d = decide(p(0.2), &CostModel::default());
        assert_eq!(d.action, MaintenanceAction::Wait);
    }

    #[test]
    fn test_decide_all_preserves_order() {
        let predictions = vec![prediction("a", 0.05), prediction("b", 0.95), prediction("c", 0.3)];
        let decisions = decide_all(&predictions, &CostModel::default());
        let ids: Vec<_> = decisions.iter().map(|d| d.component_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(decisions[0].action, MaintenanceAction::Wait);
        assert_eq!(decisions[1].action, MaintenanceAction::FixNow);
        assert_eq!(decisions[2].action, MaintenanceAction::FixNow);
        assert!(decide_all(&[], &CostModel::default()).is_empty());
    }

    fn cost_model() -> impl Strategy<Value = CostModel> {
        (1.0f64..100_000.0, 1.0f64..100_000.0, 0.0f64..=1.0)
            .prop_map(|(f, x, t)| CostModel::new(f, x, t).unwrap())
    }

    proptest! {
        #[test]
        fn prop_fix_now_iff_either_rule(v in 0.0f64..=1.0, cost in cost_model()) {
            let d = decide(p(v), &cost);
            let expected = v * cost.cost_failure() > cost.cost_fix() || v >= cost.threshold();
            prop_assert_eq!(d.action == MaintenanceAction::FixNow, expected);
        }

        #[test]
        fn prop_monotone_in_probability(a in 0.0f64..=1.0, b in 0.0f64..=1.0, cost in cost_model()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if decide(p(lo), &cost).action == MaintenanceAction::FixNow {
                prop_assert_eq!(decide(p(hi), &cost).action, MaintenanceAction::FixNow);
            }
        }

        #[test]
        fn prop_idempotent(v in 0.0f64..=1.0, cost in cost_model()) {
            prop_assert_eq!(decide(p(v), &cost), decide(p(v), &cost));
        }

        #[test]
        fn prop_explanation_names_rule(v in 0.0f64..=1.0, cost in cost_model()) {
            let d = decide(p(v), &cost);
            match d.rule {
                DecisionRule::ExpectedCost => prop_assert!(d.explanation.starts_with("expected failure cost")),
                DecisionRule::Threshold => prop_assert!(d.explanation.starts_with("probability")),
                DecisionRule::ExpectedCostAndThreshold => prop_assert!(d.explanation.contains(" >= threshold ")),
                DecisionRule::Neither => prop_assert!(d.explanation.starts_with("below threshold")),
            }
        }
    }
}
