//! Advisory content checks. Nothing here accepts or rejects a candidate; the
//! signals only let an operator eyeball a restore before trusting it.

pub mod rule;
pub mod types;

pub use rule::*;
pub use types::*;

/// Run every built-in rule over `content`.
pub fn inspect(content: &str) -> ContentSignals {
    let mut signals = ContentSignals::default();
    for rule in default_rules() {
        signals.set(rule.signal(), rule.eval(content));
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_material_lights_every_signal() {
        let content = "<h2>PART A - Vocabulary</h2><table><tr><td>word</td></tr></table>\
                       <h2>PART B - Reading</h2><p>...</p><h3>Answer Key</h3>";
        let s = inspect(content);
        assert!(s.vocabulary && s.table && s.reading && s.answer_key);
        assert!(s.warnings().is_empty());
    }

    #[test]
    fn table_without_vocabulary() {
        let s = inspect("<table><tr><td>1</td></tr></table>");
        assert!(s.table);
        assert!(!s.vocabulary);
        assert!(!s.reading);
        assert!(!s.answer_key);
    }

    #[test]
    fn missing_table_yields_warning() {
        let s = inspect("Vocabulary list and a reading passage");
        assert!(!s.table);
        assert_eq!(s.warnings().len(), 1);
    }
}
