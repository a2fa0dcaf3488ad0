//! Batch explanation pipeline — prompt construction, explanation
//! extraction, and the executor driving tasks end to end.

pub mod executor;

pub use executor::GenerationPipeline;

use crate::store::QuestionOption;

/// What a generation task covers: one topic, every topic under a subject,
/// or the global backlog of unexplained questions.
#[derive(Debug, Clone)]
pub enum GenerationScope {
    Topic {
        category_id: i64,
        subject_name: String,
        topic_name: String,
    },
    Subject {
        category_id: i64,
        subject_name: String,
    },
    Backlog,
}

const OPTION_LABELS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Answer options labeled for the prompt.
///
/// Labels are assigned A, B, C, … in the order the options were returned;
/// the option flagged correct determines the correct label.
#[derive(Debug, Default)]
pub(crate) struct LabeledOptions {
    pub lines: Vec<String>,
    pub correct_label: Option<char>,
}

pub(crate) fn label_options(options: &[&QuestionOption]) -> LabeledOptions {
    let mut labeled = LabeledOptions::default();
    for (i, option) in options.iter().enumerate() {
        let label = OPTION_LABELS
            .chars()
            .nth(i)
            .unwrap_or(OPTION_LABELS.chars().next_back().unwrap_or('Z'));
        labeled.lines.push(format!("{label}. {}", option.text));
        if option.is_correct {
            labeled.correct_label = Some(label);
        }
    }
    labeled
}

/// Build the generation request for one question.
pub(crate) fn build_prompt(question: &str, labeled: &LabeledOptions) -> String {
    let correct = labeled
        .correct_label
        .map(|c| c.to_string())
        .unwrap_or_default();
    format!(
        "Question: {question}\nOptions:\n{}\nCorrect Answer: {correct}\n\n\
         Explain why the correct option is right.",
        labeled.lines.join("\n")
    )
}

/// Two-step explanation decode: if the text parses as a JSON object with an
/// "explanation" string field, take that field; otherwise keep the raw text.
pub(crate) fn extract_explanation(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map
            .get("explanation")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(question_id: i64, text: &str, is_correct: bool) -> QuestionOption {
        QuestionOption {
            question_id,
            text: text.into(),
            is_correct,
        }
    }

    #[test]
    fn labels_follow_returned_order() {
        let options = [
            option(1, "All current cases", false),
            option(1, "New cases over time", true),
            option(1, "Deaths over time", false),
        ];
        let refs: Vec<&QuestionOption> = options.iter().collect();
        let labeled = label_options(&refs);

        assert_eq!(
            labeled.lines,
            vec![
                "A. All current cases",
                "B. New cases over time",
                "C. Deaths over time"
            ]
        );
        assert_eq!(labeled.correct_label, Some('B'));
    }

    #[test]
    fn prompt_carries_question_options_and_correct_label() {
        let options = [option(1, "Paris", true), option(1, "Lyon", false)];
        let refs: Vec<&QuestionOption> = options.iter().collect();
        let prompt = build_prompt("Capital of France?", &label_options(&refs));

        assert!(prompt.starts_with("Question: Capital of France?\nOptions:\n"));
        assert!(prompt.contains("A. Paris\nB. Lyon"));
        assert!(prompt.contains("Correct Answer: A"));
        assert!(prompt.ends_with("Explain why the correct option is right."));
    }

    #[test]
    fn extract_takes_explanation_field_from_json_object() {
        let raw = r#"{"explanation": "B is correct because incidence counts new cases."}"#;
        assert_eq!(
            extract_explanation(raw),
            "B is correct because incidence counts new cases."
        );
    }

    #[test]
    fn extract_falls_back_to_raw_text() {
        assert_eq!(extract_explanation("plain prose"), "plain prose");
        // JSON but not an object
        assert_eq!(extract_explanation("[1, 2]"), "[1, 2]");
        // Object without the field
        let raw = r#"{"answer": "B"}"#;
        assert_eq!(extract_explanation(raw), raw);
        // Object with a non-string field
        let raw = r#"{"explanation": 42}"#;
        assert_eq!(extract_explanation(raw), raw);
    }
}
