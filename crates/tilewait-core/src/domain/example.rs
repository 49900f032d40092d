//! Example questions: the payload the queue applies to a ready tile.

use serde::{Deserialize, Serialize};

/// One example question to register on a tile.
///
/// `guideline` is a single optional answering hint; the API takes a list,
/// so adapters wrap it (`guidelines()`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleQuestion {
    pub question: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guideline: Option<String>,
}

impl ExampleQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            guideline: None,
        }
    }

    pub fn with_guideline(mut self, guideline: impl Into<String>) -> Self {
        self.guideline = Some(guideline.into());
        self
    }

    /// Guideline in the list shape the API expects (`None` when absent).
    pub fn guidelines(&self) -> Option<Vec<String>> {
        self.guideline.as_ref().map(|g| vec![g.clone()])
    }
}

/// An example the API reports as created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedExample {
    pub example_id: String,
    pub question: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guideline_is_wrapped_as_list() {
        let q = ExampleQuestion::new("What is the scrap rate?").with_guideline("cite the plant");
        assert_eq!(q.guidelines(), Some(vec!["cite the plant".to_string()]));
        assert_eq!(ExampleQuestion::new("bare").guidelines(), None);
    }

    #[test]
    fn missing_guideline_deserializes_as_none() {
        let q: ExampleQuestion = serde_json::from_str(r#"{"question":"q"}"#).unwrap();
        assert_eq!(q, ExampleQuestion::new("q"));
    }
}
