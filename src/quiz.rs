//! The energetic diagnosis quiz.
//!
//! Ten 1-5 slider questions scored into a single darkness scalar that
//! recolors the lungs animation. Three questions read positively (energy,
//! air quality, inner peace), so their scores are inverted before summing.

pub const QUESTIONS: [&str; 10] = [
    "How heavy does your chest feel? (1=light, 5=heavy)",
    "How restricted is your breathing? (1=free, 5=restricted)",
    "How much fear are you holding onto right now? (1=none, 5=a lot)",
    "How much sadness or grief are you experiencing? (1=none, 5=a lot)",
    "How would you rate your current energy levels? (1=low, 5=high)",
    "How much unspoken resentment are you holding? (1=none, 5=a lot)",
    "Do you feel a sense of oppression in your daily life? (1=not at all, 5=very)",
    "How would you rate your air quality? (1=poor, 5=excellent)",
    "How often do you experience coughing or a sore throat? (1=rarely, 5=often)",
    "How connected do you feel to inner peace? (1=disconnected, 5=very connected)",
];

/// Zero-based positions of the questions where a higher answer is better.
const HIGH_IS_GOOD: [usize; 3] = [4, 7, 9];

pub const MIN_ANSWER: u8 = 1;
pub const MAX_ANSWER: u8 = 5;

#[derive(Clone, Debug)]
pub struct Quiz {
    pub answers: [u8; QUESTIONS.len()],
}

impl Default for Quiz {
    fn default() -> Self {
        Self {
            answers: [3; QUESTIONS.len()],
        }
    }
}

impl Quiz {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Symptom score: each answer contributes 1..=5, inverted (6 - value)
    /// for the high-is-good questions.
    pub fn total_score(&self) -> u32 {
        self.answers
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let v = v.clamp(MIN_ANSWER, MAX_ANSWER) as u32;
                if HIGH_IS_GOOD.contains(&i) {
                    6 - v
                } else {
                    v
                }
            })
            .sum()
    }

    /// Total normalized to [0.2, 1.0] (all answers minimal scores 0.2).
    pub fn normalized_score(&self) -> f32 {
        self.total_score() as f32 / (QUESTIONS.len() as u32 * MAX_ANSWER as u32) as f32
    }

    /// Darkness for the lungs animation: the normalized score scaled to
    /// [0.2, 0.8] with the 0.2 floor applied inclusively.
    pub fn darkness(&self) -> f32 {
        (self.normalized_score() * 0.8).max(0.2)
    }

    pub fn result_text(&self) -> &'static str {
        let score = self.normalized_score();
        if score < 0.4 {
            "Your energy field shows minor respiratory congestion. Focus on \
             light breathing and maintaining emotional clarity."
        } else if score < 0.7 {
            "There are notable energetic blockages in your respiratory system, \
             likely linked to suppressed emotions. The healing frequencies and \
             emotional release will be very beneficial."
        } else {
            "Your respiratory system is carrying a significant energetic \
             burden. This journey is crucial for you. Be patient and gentle \
             with yourself as you release these deep patterns."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_answers_score_midway() {
        let quiz = Quiz::default();
        // Every answer is 3; inversion maps 3 to 3, so the total is 30/50.
        assert_eq!(quiz.total_score(), 30);
        assert!((quiz.normalized_score() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn positive_questions_are_inverted() {
        let quiz = Quiz {
            answers: [5; QUESTIONS.len()],
        };
        // Seven symptom questions contribute 5, the three positive ones 1.
        assert_eq!(quiz.total_score(), 7 * 5 + 3 * 1);

        let quiz = Quiz {
            answers: [1; QUESTIONS.len()],
        };
        assert_eq!(quiz.total_score(), 7 * 1 + 3 * 5);
    }

    #[test]
    fn darkness_floor_is_inclusive() {
        // Best possible reading: symptoms at 1, positives at 5.
        let mut answers = [1u8; QUESTIONS.len()];
        for i in [4, 7, 9] {
            answers[i] = 5;
        }
        let quiz = Quiz { answers };
        assert_eq!(quiz.total_score(), 10);
        assert!((quiz.normalized_score() - 0.2).abs() < 1e-6);
        // 0.2 * 0.8 = 0.16 lifts to the 0.2 floor.
        assert_eq!(quiz.darkness(), 0.2);
    }

    #[test]
    fn darkness_ceiling_is_0_8() {
        let mut answers = [5u8; QUESTIONS.len()];
        for i in [4, 7, 9] {
            answers[i] = 1;
        }
        let quiz = Quiz { answers };
        assert_eq!(quiz.total_score(), 50);
        assert!((quiz.darkness() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_answers_are_clamped() {
        let mut quiz = Quiz::default();
        quiz.answers[0] = 0;
        quiz.answers[1] = 9;
        // Remaining eight questions stay at the neutral 3.
        assert_eq!(quiz.total_score(), 1 + 5 + 3 * 8);
    }

    #[test]
    fn result_text_tiers() {
        let mut answers = [1u8; QUESTIONS.len()];
        for i in [4, 7, 9] {
            answers[i] = 5;
        }
        let light = Quiz { answers };
        assert!(light.result_text().contains("minor"));

        let mid = Quiz::default();
        assert!(mid.result_text().contains("notable"));

        let mut answers = [5u8; QUESTIONS.len()];
        for i in [4, 7, 9] {
            answers[i] = 1;
        }
        let heavy = Quiz { answers };
        assert!(heavy.result_text().contains("significant"));
    }
}
