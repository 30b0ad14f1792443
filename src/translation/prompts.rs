/*!
 * Prompt templates for batch line translation.
 *
 * Both wire clients send the same contract to their model: translate a JSON
 * array of lines, keep the line count exact, and leave placeholder tokens
 * untouched.
 */

/// Build the system prompt for a batch translation request
pub fn system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate from {} to {}. \
         CRITICAL: Return exactly the same number of lines as provided. \
         Do not add, remove, merge, or split lines. \
         Preserve all placeholders exactly as they appear. \
         DO NOT translate any text matching these patterns: TERM_{{}}, HTMLENTITY_{{}}, HTMLTAG_{{}}. \
         If a line is empty or contains only whitespace, keep it empty. \
         Respond with ONLY a JSON object - no extra text.",
        source_language, target_language
    )
}

/// Build the user prompt carrying the lines to translate
pub fn user_prompt(lines: &[String], source_language: &str, target_language: &str) -> String {
    let lines_json = serde_json::to_string(lines).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Translate these lines from {} to {}:\n\n{}\n\n\
         IMPORTANT INSTRUCTIONS:\n\
         - Preserve all placeholders exactly as they appear\n\
         - DO NOT translate any text matching these patterns: TERM_{{}}, HTMLENTITY_{{}}, HTMLTAG_{{}}\n\
         - Only translate the actual text content, not placeholder patterns\n\
         - Keep all placeholder patterns completely unchanged\n\n\
         Return the translation as a JSON object with \"lines_translated\" array \
         containing exactly {} strings.",
        source_language, target_language, lines_json, lines.len()
    )
}
