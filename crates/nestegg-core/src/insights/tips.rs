//! Built-in saving tips for the investment calculator

use super::types::SavingTip;

/// Most tips shown at once
pub const MAX_SAVING_TIPS: usize = 6;

/// The six fixed tips, one per category
pub fn fallback_tips() -> Vec<SavingTip> {
    vec![
        SavingTip::new(
            "Automate Your Savings",
            "Set up automatic transfers from your checking to savings account on payday. This 'pay yourself first' approach ensures you never forget to save.",
            "$2,400+ annually",
            "Automation",
        ),
        SavingTip::new(
            "Review Subscriptions",
            "Audit your monthly subscriptions and cancel unused services. Many people pay for services they forgot they had.",
            "$300-600 annually",
            "Subscriptions",
        ),
        SavingTip::new(
            "Energy Efficiency",
            "Switch to LED bulbs, use smart thermostats, and unplug electronics when not in use. Small changes add up to significant savings.",
            "$200-400 annually",
            "Utilities",
        ),
        SavingTip::new(
            "Meal Planning",
            "Plan your meals weekly and buy groceries in bulk. This reduces food waste and impulse purchases.",
            "$1,200+ annually",
            "Food",
        ),
        SavingTip::new(
            "Transportation Optimization",
            "Consider carpooling, public transit, or biking for short trips. Even small changes can save on gas and maintenance.",
            "$800-1,500 annually",
            "Transportation",
        ),
        SavingTip::new(
            "Negotiate Bills",
            "Call your service providers annually to negotiate better rates. Many companies offer discounts to retain customers.",
            "$200-500 annually",
            "Bills",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_tips() {
        let tips = fallback_tips();
        assert_eq!(tips.len(), MAX_SAVING_TIPS);

        let categories: Vec<_> = tips.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["Automation", "Subscriptions", "Utilities", "Food", "Transportation", "Bills"]
        );
        assert_eq!(tips[0].potential_savings, "$2,400+ annually");
    }

    #[test]
    fn test_tip_as_insight() {
        let insight = fallback_tips()[3].to_insight();
        assert_eq!(insight.title.as_deref(), Some("Meal Planning"));
        assert_eq!(insight.savings.as_deref(), Some("$1,200+ annually"));
        assert!(insight.message.starts_with("💡 Meal Planning:"));
    }
}
