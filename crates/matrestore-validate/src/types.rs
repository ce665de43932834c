use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Vocabulary,
    Table,
    Reading,
    AnswerKey,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Vocabulary => "vocabulary section",
            Signal::Table => "tables",
            Signal::Reading => "reading section",
            Signal::AnswerKey => "answer key",
        }
    }
}

/// Plausibility flags for one content string. Reporting only.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentSignals {
    pub vocabulary: bool,
    pub table: bool,
    pub reading: bool,
    pub answer_key: bool,
}

impl ContentSignals {
    pub fn get(&self, signal: Signal) -> bool {
        match signal {
            Signal::Vocabulary => self.vocabulary,
            Signal::Table => self.table,
            Signal::Reading => self.reading,
            Signal::AnswerKey => self.answer_key,
        }
    }

    pub(crate) fn set(&mut self, signal: Signal, value: bool) {
        match signal {
            Signal::Vocabulary => self.vocabulary = value,
            Signal::Table => self.table = value,
            Signal::Reading => self.reading = value,
            Signal::AnswerKey => self.answer_key = value,
        }
    }

    /// Signals in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Signal, bool)> + '_ {
        [Signal::Vocabulary, Signal::Table, Signal::Reading, Signal::AnswerKey]
            .into_iter()
            .map(move |s| (s, self.get(s)))
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut out = vec![];
        if !self.table {
            out.push("content does not appear to contain tables; continuing anyway".to_string());
        }
        out
    }
}
