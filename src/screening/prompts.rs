//! Prompt builders for the text-generation oracle.
//!
//! The oracle is asked for JSON but is not trusted to return it; the callers
//! in `mapper` and `empathy` own the parsing and fallbacks.

/// Prompt asking the oracle to map a free-text reply onto a 0..3 frequency
/// score with an explicit risk field.
pub fn mapping_prompt(question_text: &str, user_reply: &str) -> String {
    format!(
        "You are a calm, precise assistant. You MUST return valid JSON only (no extra commentary). \
         The JSON must have keys: 'answer' (int 0..3), 'risk' ('none' or 'suicidal'), 'explain' (short text). \
         Map the user's reply about frequency to the integer where: \
         0=not at all, 1=several days, 2=more than half the days, 3=nearly every day. \
         If the reply indicates suicidal ideation, self-harm intent, or plans, set 'risk' to 'suicidal'.\n\n\
         Question: {question_text}\nReply: {user_reply}"
    )
}

/// Prompt asking for a reflective acknowledgment plus the next question in a
/// single JSON object, with few-shot examples biasing brevity and style.
pub fn empathy_prompt(next_question_text: &str, user_reply: &str) -> String {
    format!(
        r#"You are an empathic, concise counselor-style assistant.
Given the user's last message, produce JSON ONLY with keys 'soothing' and 'next_question'.
Rules:
 - 'soothing': 1-2 short sentences (15-30 words max) that acknowledge and reflect the user's feelings using some of their words.
   Use phrases like 'That sounds...', 'I can hear...', 'It makes sense you feel...' Avoid 'I hear you' alone.
 - 'next_question': a gentle, casual PHQ-style follow-up question (<=2 sentences) that asks the next PHQ item and includes answer hints like '(rare / a few days / most days / nearly every day)'.
 - Be specific but brief; avoid giving medical advice or instructions here.
 - Do NOT include anything else besides the JSON object.

Examples:
User: 'I'm exhausted and I can't focus on anything lately.'
JSON: {{"soothing":"That sounds really exhausting — it's understandable you're finding it hard to focus right now.", "next_question":"Lately, how often have you had trouble concentrating (rare / a few days / most days / nearly every day)?"}}

User: 'I feel hopeless — nothing seems to help.'
JSON: {{"soothing":"I'm so sorry — feeling hopeless can be overwhelming. You're not alone in this.", "next_question":"Over the last two weeks, how often have you felt down, depressed, or hopeless (rare / a few days / most days / nearly every day)?"}}

Now produce a JSON for the following input.
User: "{user_reply}"
Next PHQ item (to phrase casually): "{next_question_text}"
Return JSON only."#
    )
}

/// Prompt asking the oracle to rewrite a canonical PHQ item into a casual
/// one-or-two sentence question with frequency hints.
pub fn casual_question_prompt(question_text: &str) -> String {
    format!(
        "You are a compassionate conversational assistant. \
         Rewrite the PHQ-style item below into a short, informal one-or-two sentence question \
         that encourages a natural reply. Add short answer hints in parentheses such as \
         '(rare / a few days / most days / nearly every day)'. Keep it empathetic and <= 2 sentences.\n\n\
         PHQ item: {question_text}"
    )
}
