//! Prompt construction for each check.

use crate::models::Tone;

/// System prompt shared by every check.
pub const SYSTEM_PROMPT: &str = r#"You are an expert in the Tamil language, its grammar, vocabulary and idiom.
Answer with a single JSON object that matches the requested format.
Do not add explanations, markdown or any text outside the JSON object."#;

pub fn spelling_prompt(text: &str) -> String {
    format!(
        r#"Check the following Tamil text for spelling mistakes.

1. Give a correctness score from 0 to 100, where 100 means the text is spelled perfectly and 0 means it is entirely wrong. Base the score on how many mistakes there are and how serious they are.
2. List every misspelled word together with one or more suggested corrections.
3. Give the full text with all mistakes corrected.

Only report genuine spelling mistakes.

Tamil text:
{text}

Reply with JSON: {{"correctnessScore": number, "correctedText": string, "corrections": [{{"originalWord": string, "suggestedCorrections": [string]}}]}}"#
    )
}

pub fn language_detection_prompt(text: &str) -> String {
    format!(
        r#"Identify the main language of the following text. Use "Tamil", "English" or "Unknown".

Text:
{text}

Reply with JSON: {{"language": "Tamil" | "English" | "Unknown"}}"#
    )
}

pub fn tamil_to_english_prompt(text: &str) -> String {
    format!(
        r#"Translate the following Tamil text into English.

Tamil text:
{text}

Reply with JSON: {{"englishTranslation": string}}"#
    )
}

pub fn english_to_tamil_prompt(text: &str) -> String {
    format!(
        r#"Translate the following English text into Tamil. Also give a Thanglish version of your Tamil translation, that is a phonetic transliteration in Latin script.

English text:
{text}

Reply with JSON: {{"tamilTranslation": string, "thanglishTranscription": string}}"#
    )
}

pub fn vocabulary_prompt(text: &str, tone: Tone) -> String {
    format!(
        r#"Rewrite the following Tamil text so that its tone is {tone}. Prefer rich native Tamil words and replace overused English loanwords with Tamil equivalents.

Tamil text:
{text}

List every replacement you make as a pair of the original word and its replacement, and list the English loanwords you removed or replaced.

Reply with JSON: {{"enhancedText": string, "appliedChanges": [{{"originalWord": string, "replacementWord": string}}], "removedLoanwords": [string]}}"#
    )
}

pub fn idioms_prompt(text: &str) -> String {
    format!(
        r#"Suggest Tamil idioms or proverbs (பழமொழிகள்) that would make the following text more expressive and culturally rich.

Text:
{text}

Reply with JSON: {{"suggestions": [string]}}"#
    )
}
