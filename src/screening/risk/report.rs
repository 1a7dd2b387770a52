use crate::screening::types::RiskLevel;

pub fn explanation(level: RiskLevel, accuracy_percent: f64) -> String {
    match level {
        RiskLevel::Low => format!(
            "Based on the assessment (accuracy: {accuracy_percent:.1}%), your child showed strong \
             number sense and mathematical reasoning. Response times were within normal range."
        ),
        RiskLevel::Medium => format!(
            "The assessment shows some areas that may benefit from additional support \
             (accuracy: {accuracy_percent:.1}%). This is common and doesn't indicate a diagnosis."
        ),
        RiskLevel::High => format!(
            "The screening suggests that a professional evaluation may be beneficial \
             (accuracy: {accuracy_percent:.1}%). Early support can make a significant positive \
             difference."
        ),
    }
}

pub fn recommendations(level: RiskLevel) -> Vec<String> {
    let items: &[&str] = match level {
        RiskLevel::Low => &[
            "Continue with regular age-appropriate math activities",
            "Encourage number games and puzzles",
            "Celebrate their mathematical curiosity",
        ],
        RiskLevel::Medium => &[
            "Consider additional practice with number concepts",
            "Use visual and hands-on learning materials",
            "Monitor progress over the next few months",
            "Consult with teacher about classroom support",
        ],
        RiskLevel::High => &[
            "Schedule an evaluation with an educational psychologist",
            "Explore specialized learning support options",
            "Use multi-sensory learning approaches",
            "Connect with school special education services",
            "Consider working with a math specialist tutor",
        ],
    };
    items.iter().map(|s| s.to_string()).collect()
}
