use pantry::catalog::{FoodItem, FoodKind, ItemName};

pub const CORRECT_POINTS: i64 = 10;
pub const WRONG_PENALTY: i64 = 5;

/// Outcome of sorting one item, handed to the journal, narrator and presenter.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub item: ItemName,
    pub kind: FoodKind,
    pub zone: FoodKind,
    pub correct: bool,
    pub score: i64,
}

impl Feedback {
    pub fn verdict(&self) -> &'static str {
        if self.correct { "Correct!" } else { "Incorrect!" }
    }

    pub fn narration(&self) -> &'static str {
        if self.correct {
            "Correct! Good job."
        } else {
            "Incorrect. Try again."
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub score: i64,
    pub correct: u32,
    pub incorrect: u32,
}

impl Scoreboard {
    /// The score has no floor.
    pub fn record(&mut self, item: &FoodItem, zone: FoodKind) -> Feedback {
        let correct = item.kind == zone;
        if correct {
            self.score += CORRECT_POINTS;
            self.correct += 1;
        } else {
            self.score -= WRONG_PENALTY;
            self.incorrect += 1;
        }

        Feedback {
            item: item.name.clone(),
            kind: item.kind,
            zone,
            correct,
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_then_wrong() {
        let carrot = FoodItem::new("Carrot", "carrot.png", FoodKind::Veg);
        let mut board = Scoreboard::default();

        let first = board.record(&carrot, FoodKind::Veg);
        assert!(first.correct);
        assert_eq!(first.score, 10);
        assert_eq!(first.verdict(), "Correct!");

        let second = board.record(&carrot, FoodKind::NonVeg);
        assert!(!second.correct);
        assert_eq!(second.score, 5);
        assert_eq!(second.zone, FoodKind::NonVeg);
        assert_eq!(second.kind, FoodKind::Veg);
        assert_eq!((board.correct, board.incorrect), (1, 1));
    }

    #[test]
    fn test_score_goes_negative() {
        let chicken = FoodItem::new("Chicken", "chicken.png", FoodKind::NonVeg);
        let mut board = Scoreboard::default();
        board.record(&chicken, FoodKind::Veg);
        let fb = board.record(&chicken, FoodKind::Veg);
        assert_eq!(fb.score, -10);
        assert_eq!(fb.narration(), "Incorrect. Try again.");
    }
}
