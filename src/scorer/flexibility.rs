use crate::types::CreativeFlexibility;

/// Revenue and confidence for one match after applying creative flexibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Rounded to cents.
    pub estimated_revenue: f64,
    /// Clamped to 0–100.
    pub confidence_score: u8,
}

/// More freedom to rewrite scenes makes a placement easier to sell.
/// `MinorDialogueChanges` is the neutral setting and also what unrecognised
/// input resolves to when parsed.
pub fn revenue_multiplier(flexibility: CreativeFlexibility) -> f64 {
    match flexibility {
        CreativeFlexibility::NoChanges => 0.7,
        CreativeFlexibility::MinorDialogueChanges => 1.0,
        CreativeFlexibility::SceneLevelChanges => 1.3,
    }
}

pub fn confidence_adjustment(flexibility: CreativeFlexibility) -> i32 {
    match flexibility {
        CreativeFlexibility::NoChanges => -10,
        CreativeFlexibility::MinorDialogueChanges => 0,
        CreativeFlexibility::SceneLevelChanges => 5,
    }
}

pub fn score(base_revenue: f64, base_confidence: u8, flexibility: CreativeFlexibility) -> Score {
    let estimated_revenue = round_cents(base_revenue * revenue_multiplier(flexibility));
    let confidence = i32::from(base_confidence) + confidence_adjustment(flexibility);
    Score {
        estimated_revenue,
        confidence_score: confidence.clamp(0, 100) as u8,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
