//! Answer buffering between the keyboard and the wire.
//!
//! Players type one answer per category while the countdown runs; the host
//! collects whatever is buffered when time runs out. A bare line fills the
//! first unanswered category; a line like `3: Ostrich` (re)targets category
//! 3 directly, and `3:` alone blanks it again.

/// Where a typed line ended up.
#[derive(Debug, PartialEq, Eq)]
pub enum Recorded {
    /// Stored as the answer for this zero-based category index.
    Slot(usize),
    /// Every category already has an answer; a bare line has nowhere to go.
    AllFull,
    /// A targeted line named a category number that does not exist.
    OutOfRange(usize),
    /// Blank input, nothing recorded.
    Ignored,
    /// No round is in progress.
    Inactive,
}

pub struct AnswerBuffer {
    slots: Vec<Option<String>>,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        AnswerBuffer { slots: Vec::new() }
    }

    /// Starts a fresh round with one empty slot per category. An arity of
    /// zero deactivates the buffer until the next round.
    pub fn reset(&mut self, arity: usize) {
        self.slots = vec![None; arity];
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    /// Records one typed line.
    pub fn record(&mut self, line: &str) -> Recorded {
        if self.slots.is_empty() {
            return Recorded::Inactive;
        }

        if let Some((number, text)) = parse_targeted(line) {
            if number >= 1 && number <= self.slots.len() {
                self.slots[number - 1] = Some(text.to_string());
                return Recorded::Slot(number - 1);
            }
            return Recorded::OutOfRange(number);
        }

        let text = line.trim();
        if text.is_empty() {
            return Recorded::Ignored;
        }
        match self.slots.iter().position(|slot| slot.is_none()) {
            Some(index) => {
                self.slots[index] = Some(text.to_string());
                Recorded::Slot(index)
            }
            None => Recorded::AllFull,
        }
    }

    /// The full answer list in category order, unanswered slots as empty
    /// strings — exactly what goes on the wire.
    pub fn take_answers(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.clone().unwrap_or_default())
            .collect()
    }
}

impl Default for AnswerBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a `N: text` line into its category number and (trimmed) answer.
fn parse_targeted(line: &str) -> Option<(usize, &str)> {
    let (prefix, rest) = line.split_once(':')?;
    let number = prefix.trim().parse::<usize>().ok()?;
    Some((number, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_lines_fill_in_order() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(3);

        assert_eq!(buffer.record("Apple"), Recorded::Slot(0));
        assert_eq!(buffer.record("Bear"), Recorded::Slot(1));
        assert_eq!(buffer.take_answers(), vec!["Apple", "Bear", ""]);
    }

    #[test]
    fn test_targeted_line_revises_a_slot() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(3);

        buffer.record("Apple");
        assert_eq!(buffer.record("1: Apricot"), Recorded::Slot(0));
        assert_eq!(buffer.take_answers(), vec!["Apricot", "", ""]);
    }

    #[test]
    fn test_targeted_line_can_blank_a_slot() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(2);

        buffer.record("Apple");
        assert_eq!(buffer.record("1:"), Recorded::Slot(0));
        assert_eq!(buffer.take_answers(), vec!["", ""]);
    }

    #[test]
    fn test_targeted_line_skips_ahead() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(3);

        assert_eq!(buffer.record("3: Carrot"), Recorded::Slot(2));
        // The next bare line still fills the first gap.
        assert_eq!(buffer.record("Apple"), Recorded::Slot(0));
        assert_eq!(buffer.take_answers(), vec!["Apple", "", "Carrot"]);
    }

    #[test]
    fn test_out_of_range_target_is_rejected() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(2);

        assert_eq!(buffer.record("5: Emu"), Recorded::OutOfRange(5));
        assert_eq!(buffer.take_answers(), vec!["", ""]);
    }

    #[test]
    fn test_full_buffer_rejects_bare_lines() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(1);

        buffer.record("Apple");
        assert_eq!(buffer.record("Banana"), Recorded::AllFull);
        assert_eq!(buffer.take_answers(), vec!["Apple"]);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(1);
        assert_eq!(buffer.record("   "), Recorded::Ignored);
    }

    #[test]
    fn test_inactive_outside_a_round() {
        let mut buffer = AnswerBuffer::new();
        assert_eq!(buffer.record("Apple"), Recorded::Inactive);

        buffer.reset(1);
        buffer.record("Apple");
        buffer.reset(0);
        assert_eq!(buffer.record("Bear"), Recorded::Inactive);
    }

    #[test]
    fn test_answers_are_trimmed() {
        let mut buffer = AnswerBuffer::new();
        buffer.reset(1);
        buffer.record("  Apple  ");
        assert_eq!(buffer.take_answers(), vec!["Apple"]);
    }
}
