//! The nine canonical PHQ-9 items, in administration order.

/// Index 0..8 correspond to the nine PHQ items; index 8 is the self-harm item.
pub const PHQ_ITEMS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself — or that you are a failure or have let yourself or your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed; or the opposite — being fidgety or restless",
    "Thoughts that you would be better off dead or of hurting yourself in some way",
];

/// Index of the self-harm item, which drives the escalation path.
pub const SELF_HARM_ITEM_INDEX: usize = 8;

/// Friendly hint appended when a question is asked verbatim.
pub const ANSWER_HINTS: &str =
    "Please answer roughly: rare / a few days / most days / nearly every day (or reply in your own words).";

/// Shorter frequency hint used when the casual-question rewrite is unavailable.
pub const FREQUENCY_HINT: &str =
    "Please answer: rare / a few days / most days / nearly every day";
