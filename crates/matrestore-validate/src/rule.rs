use crate::types::Signal;

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn signal(&self) -> Signal;
    fn eval(&self, content: &str) -> bool;
}

/// "vocabulary" in any case, or the literal "PART A" heading.
pub struct VocabularyRule;

impl Rule for VocabularyRule {
    fn id(&self) -> &str {
        "vocabulary_section"
    }

    fn signal(&self) -> Signal {
        Signal::Vocabulary
    }

    fn eval(&self, content: &str) -> bool {
        contains_ci(content, "vocabulary") || content.contains("PART A")
    }
}

pub struct TableRule;

impl Rule for TableRule {
    fn id(&self) -> &str {
        "table_markup"
    }

    fn signal(&self) -> Signal {
        Signal::Table
    }

    fn eval(&self, content: &str) -> bool {
        content.contains("<table")
    }
}

pub struct ReadingRule;

impl Rule for ReadingRule {
    fn id(&self) -> &str {
        "reading_section"
    }

    fn signal(&self) -> Signal {
        Signal::Reading
    }

    fn eval(&self, content: &str) -> bool {
        contains_ci(content, "reading") || content.contains("PART B")
    }
}

/// Both words anywhere, in either order.
pub struct AnswerKeyRule;

impl Rule for AnswerKeyRule {
    fn id(&self) -> &str {
        "answer_key"
    }

    fn signal(&self) -> Signal {
        Signal::AnswerKey
    }

    fn eval(&self, content: &str) -> bool {
        contains_ci(content, "answer") && contains_ci(content, "key")
    }
}

pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(VocabularyRule),
        Box::new(TableRule),
        Box::new(ReadingRule),
        Box::new(AnswerKeyRule),
    ]
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
