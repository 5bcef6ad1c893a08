//! Reply schemas and validation.
//!
//! The JSON schemas are sent to the model as its structured output format.
//! Whatever comes back is still parsed and validated here, because the
//! model is free to ignore the requested format.

use super::AnalysisError;
use crate::models::{CheckKind, CheckPayload, SourceLanguage};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Output schema for the spelling check.
pub fn spelling_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "correctedText": { "type": "string" },
            "corrections": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "originalWord": { "type": "string" },
                        "suggestedCorrections": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["originalWord", "suggestedCorrections"]
                }
            },
            "correctnessScore": { "type": "number", "minimum": 0, "maximum": 100 }
        },
        "required": ["correctedText", "corrections", "correctnessScore"]
    })
}

/// Output schema for the language detection step of the translation check.
pub fn language_detection_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "language": { "type": "string", "enum": ["Tamil", "English", "Unknown"] }
        },
        "required": ["language"]
    })
}

/// Output schema for Tamil to English translation.
pub fn tamil_to_english_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "englishTranslation": { "type": "string" }
        },
        "required": ["englishTranslation"]
    })
}

/// Output schema for English to Tamil translation.
pub fn english_to_tamil_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "tamilTranslation": { "type": "string" },
            "thanglishTranscription": { "type": "string" }
        },
        "required": ["tamilTranslation", "thanglishTranscription"]
    })
}

/// Output schema for the vocabulary check.
pub fn vocabulary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "enhancedText": { "type": "string" },
            "removedLoanwords": { "type": "array", "items": { "type": "string" } },
            "appliedChanges": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "originalWord": { "type": "string" },
                        "replacementWord": { "type": "string" }
                    },
                    "required": ["originalWord", "replacementWord"]
                }
            }
        },
        "required": ["enhancedText", "removedLoanwords", "appliedChanges"]
    })
}

/// Output schema for the idiom check.
pub fn idioms_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "suggestions": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["suggestions"]
    })
}

/// Language reported by the detection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DetectedLanguage {
    Tamil,
    English,
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct DetectionReply {
    pub language: DetectedLanguage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TamilToEnglishReply {
    pub english_translation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnglishToTamilReply {
    pub tamil_translation: String,
    pub thanglish_transcription: String,
}

/// Parse a model reply into `T`.
///
/// A reply object carrying an `"error"` string is an explicit failure,
/// whatever else it contains.
pub fn parse_reply<T: DeserializeOwned>(check: CheckKind, content: &str) -> Result<T, AnalysisError> {
    let body = strip_code_fence(content);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(AnalysisError::Reported(message.to_string()));
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::schema(check, e.to_string()))
}

/// Strip a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Check the constraints serde cannot express.
pub fn validate_payload(payload: &CheckPayload) -> Result<(), AnalysisError> {
    let kind = payload.kind();

    match payload {
        CheckPayload::Spelling(result) => {
            let score = result.correctness_score;
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(AnalysisError::schema(
                    kind,
                    format!("correctnessScore {} is outside 0..=100", score),
                ));
            }
            if result
                .corrections
                .iter()
                .any(|c| c.original_word.trim().is_empty())
            {
                return Err(AnalysisError::schema(kind, "correction without originalWord"));
            }
        }
        CheckPayload::Translation(result) => match result.source_language {
            SourceLanguage::Tamil if result.english_translation.is_none() => {
                return Err(AnalysisError::schema(
                    kind,
                    "Tamil source without englishTranslation",
                ));
            }
            SourceLanguage::English
                if result.tamil_translation.is_none()
                    || result.thanglish_transcription.is_none() =>
            {
                return Err(AnalysisError::schema(
                    kind,
                    "English source without tamilTranslation and thanglishTranscription",
                ));
            }
            _ => {}
        },
        CheckPayload::Vocabulary(result) => {
            if result
                .applied_changes
                .iter()
                .any(|c| c.original_word.trim().is_empty())
            {
                return Err(AnalysisError::schema(kind, "change without originalWord"));
            }
        }
        CheckPayload::Idioms(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdiomResult, SpellCheckResult, TranslationResult};

    #[test]
    fn test_parse_reply_typed() {
        let reply: IdiomResult =
            parse_reply(CheckKind::Idioms, r#"{"suggestions": ["யாதும் ஊரே"]}"#).unwrap();
        assert_eq!(reply.suggestions, vec!["யாதும் ஊரே"]);
    }

    #[test]
    fn test_parse_reply_strips_code_fence() {
        let content = "```json\n{\"language\": \"Tamil\"}\n```";
        let reply: DetectionReply = parse_reply(CheckKind::Translation, content).unwrap();
        assert_eq!(reply.language, DetectedLanguage::Tamil);
    }

    #[test]
    fn test_parse_reply_error_marker() {
        let err = parse_reply::<IdiomResult>(CheckKind::Idioms, r#"{"error": "quota exceeded"}"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Reported(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn test_parse_reply_not_json() {
        let err = parse_reply::<IdiomResult>(CheckKind::Idioms, "Here are some idioms").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_reply_schema_mismatch() {
        let err = parse_reply::<IdiomResult>(CheckKind::Idioms, r#"{"idioms": []}"#).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Schema {
                check: CheckKind::Idioms,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_score_range() {
        let payload = CheckPayload::Spelling(SpellCheckResult {
            corrected_text: "x".to_string(),
            corrections: vec![],
            correctness_score: 140.0,
        });
        assert!(validate_payload(&payload).is_err());

        let payload = CheckPayload::Spelling(SpellCheckResult {
            corrected_text: "x".to_string(),
            corrections: vec![],
            correctness_score: 100.0,
        });
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn test_validate_translation_fields() {
        let mut result = TranslationResult::from_english("வணக்கம்".to_string(), "vanakkam".to_string());
        assert!(validate_payload(&CheckPayload::Translation(result.clone())).is_ok());

        result.thanglish_transcription = None;
        assert!(validate_payload(&CheckPayload::Translation(result)).is_err());

        let tamil = TranslationResult {
            english_translation: None,
            ..TranslationResult::from_tamil(String::new())
        };
        assert!(validate_payload(&CheckPayload::Translation(tamil)).is_err());
    }

    #[test]
    fn test_schemas_require_fields() {
        assert_eq!(idioms_schema()["required"], json!(["suggestions"]));
        assert_eq!(
            language_detection_schema()["properties"]["language"]["enum"],
            json!(["Tamil", "English", "Unknown"])
        );
    }
}
