//! The conversational session: one answer per turn, nine turns total,
//! with escalation taking precedence over completion on the final item.

mod router;
mod store;

pub use router::screening_router;
pub use store::{InMemorySessionStore, SessionState, SessionStore, SessionStoreError, SessionToken};

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::empathy::EmpathyGenerator;
use super::items::{ANSWER_HINTS, PHQ_ITEMS, SELF_HARM_ITEM_INDEX};
use super::mapper::{MappedAnswer, ScoreMapper};
use super::oracle::TextOracle;
use super::scorer::{level_label, score_to_level};

/// Opening line returned by `/start`; the first PHQ item is only asked once
/// the user has said something.
pub const GREETING: &str = "Hi — I'm here to listen. How are you feeling today?";

const CLOSING_MESSAGE: &str = "Thanks for sharing — that was helpful. Based on this quick \
     screening, I've summarized your responses above. Would you like resources or next steps?";

const ESCALATION_MESSAGE: &str = "I'm really sorry — your reply indicates possible self-harm or \
     suicidal thoughts. If you are in immediate danger, please call your local emergency number \
     right now. Would you like me to provide crisis helpline numbers or connect you to someone?";

/// Severity forced onto every escalated session regardless of the total.
const ESCALATION_LEVEL: u8 = 5;

/// Final summary computed once, when all nine items are answered.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningSummary {
    pub score: u8,
    pub level: u8,
    pub label: &'static str,
    pub details: SummaryDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryDetails {
    pub answers: Vec<u8>,
}

/// Outcome of one `/answer` turn, tagged for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TurnOutcome {
    Continue {
        soothing: String,
        question: String,
        index: usize,
        mapped: MappedAnswer,
    },
    Finished {
        summary: ScreeningSummary,
        bot_message: &'static str,
        mapped: MappedAnswer,
    },
    Escalate {
        message: &'static str,
        level: u8,
        score: u8,
    },
}

/// Caller mistakes on the session boundary. Oracle trouble never lands here.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not initialized. Call /start first.")]
    NotInitialized,
    #[error("assessment already completed. Call /start to begin again.")]
    AlreadyCompleted,
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Composes the mapper, empathy generator, and session store into the
/// turn-by-turn screening flow.
pub struct ScreeningService<S> {
    store: Arc<S>,
    mapper: ScoreMapper,
    empathy: EmpathyGenerator,
}

impl<S> ScreeningService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(oracle: Arc<dyn TextOracle>, store: Arc<S>) -> Self {
        Self {
            store,
            mapper: ScoreMapper::new(oracle.clone()),
            empathy: EmpathyGenerator::new(oracle),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Begin (or restart) a session, returning its token and the greeting.
    pub fn start(&self) -> Result<(SessionToken, &'static str), SessionError> {
        let token = self.store.create()?;
        info!(session = %token.0, "screening session started");
        Ok((token, GREETING))
    }

    /// Record one reply and advance the state machine.
    pub async fn submit_answer(
        &self,
        token: &SessionToken,
        user_reply: &str,
    ) -> Result<TurnOutcome, SessionError> {
        let Some(mut state) = self.store.fetch(token)? else {
            return Err(SessionError::NotInitialized);
        };

        if state.index >= PHQ_ITEMS.len() {
            self.store.clear(token)?;
            return Err(SessionError::AlreadyCompleted);
        }

        let answered_index = state.index;
        let mapped = self
            .mapper
            .map(PHQ_ITEMS[answered_index], user_reply)
            .await;

        state.answers.push(mapped.answer);
        state.index += 1;
        self.store.update(token, state.clone())?;

        // Escalation outranks completion: the self-harm item is also the
        // last item, and a risky final answer must never read as "finished".
        if answered_index == SELF_HARM_ITEM_INDEX && mapped.risk.is_suicidal() {
            let score = state.total();
            self.store.clear(token)?;
            warn!(session = %token.0, score, "session escalated on self-harm item");
            return Ok(TurnOutcome::Escalate {
                message: ESCALATION_MESSAGE,
                level: ESCALATION_LEVEL,
                score,
            });
        }

        if state.index >= PHQ_ITEMS.len() {
            let score = state.total();
            let level = score_to_level(score);
            let summary = ScreeningSummary {
                score,
                level,
                label: level_label(level),
                details: SummaryDetails {
                    answers: state.answers,
                },
            };
            self.store.clear(token)?;
            info!(session = %token.0, score, level, "screening session completed");
            return Ok(TurnOutcome::Finished {
                summary,
                bot_message: CLOSING_MESSAGE,
                mapped,
            });
        }

        let next_question_text = PHQ_ITEMS[state.index];
        let turn = self.empathy.generate(next_question_text, user_reply).await;
        let soothing = if turn.soothing.is_empty() {
            "I hear you — thank you for telling me that.".to_string()
        } else {
            turn.soothing
        };
        let question = if turn.next_question.is_empty() {
            format!("{next_question_text} ({ANSWER_HINTS})")
        } else {
            turn.next_question
        };

        Ok(TurnOutcome::Continue {
            soothing,
            question,
            index: state.index,
            mapped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::oracle::OracleError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Pops scripted outputs front-first; errors when the script runs dry.
    struct ScriptedOracle {
        outputs: Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        fn new(outputs: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                outputs: Mutex::new(outputs.into_iter().map(String::from).collect()),
            })
        }
    }

    #[async_trait]
    impl TextOracle for ScriptedOracle {
        async fn complete(&self, _: &str, _: f32, _: u32) -> Result<String, OracleError> {
            let mut outputs = self.outputs.lock().expect("script mutex");
            if outputs.is_empty() {
                return Err(OracleError::Empty);
            }
            Ok(outputs.remove(0))
        }
    }

    fn mapping(answer: u8, risk: &str) -> String {
        format!(r#"{{"answer":{answer},"risk":"{risk}","explain":"mapped"}}"#)
    }

    fn empathy() -> String {
        r#"{"soothing":"That sounds hard.","next_question":"Next (rare / a few days / most days / nearly every day)?"}"#.to_string()
    }

    fn service(outputs: Vec<String>) -> ScreeningService<InMemorySessionStore> {
        let oracle = ScriptedOracle::new(outputs.iter().map(String::as_str).collect());
        ScreeningService::new(oracle, Arc::new(InMemorySessionStore::default()))
    }

    #[tokio::test]
    async fn nine_calm_answers_walk_to_completion() {
        // Eight continue turns consume a mapping + an empathy output each;
        // the ninth consumes only a mapping.
        let mut outputs = Vec::new();
        for _ in 0..8 {
            outputs.push(mapping(1, "none"));
            outputs.push(empathy());
        }
        outputs.push(mapping(1, "none"));

        let service = service(outputs);
        let (token, greeting) = service.start().expect("session starts");
        assert_eq!(greeting, GREETING);

        for expected_index in 1..=8 {
            let outcome = service
                .submit_answer(&token, "a few days")
                .await
                .expect("turn succeeds");
            match outcome {
                TurnOutcome::Continue { index, .. } => assert_eq!(index, expected_index),
                other => panic!("expected continue, got {other:?}"),
            }
        }

        let outcome = service
            .submit_answer(&token, "a few days")
            .await
            .expect("final turn succeeds");
        match outcome {
            TurnOutcome::Finished { summary, .. } => {
                assert_eq!(summary.score, 9);
                assert_eq!(summary.level, 2);
                assert_eq!(summary.label, "Mild");
                assert_eq!(summary.details.answers, vec![1; 9]);
            }
            other => panic!("expected finished, got {other:?}"),
        }

        // Session is cleared after completion.
        let err = service
            .submit_answer(&token, "again")
            .await
            .expect_err("cleared session rejects further turns");
        assert!(matches!(err, SessionError::NotInitialized));
    }

    #[tokio::test]
    async fn risky_final_answer_escalates_even_with_a_low_total() {
        let mut outputs = Vec::new();
        for _ in 0..8 {
            outputs.push(mapping(0, "none"));
            outputs.push(empathy());
        }
        outputs.push(mapping(0, "suicidal"));

        let service = service(outputs);
        let (token, _) = service.start().expect("session starts");
        for _ in 0..8 {
            service
                .submit_answer(&token, "not at all")
                .await
                .expect("calm turn");
        }

        let outcome = service
            .submit_answer(&token, "I want to die")
            .await
            .expect("escalation turn succeeds");
        match outcome {
            TurnOutcome::Escalate { level, score, message } => {
                assert_eq!(level, 5);
                assert_eq!(score, 0);
                assert!(message.contains("emergency"));
            }
            other => panic!("expected escalate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn risk_before_the_final_item_does_not_escalate() {
        let outputs = vec![mapping(3, "suicidal"), empathy()];
        let service = service(outputs);
        let (token, _) = service.start().expect("session starts");

        let outcome = service
            .submit_answer(&token, "I keep thinking about hurting myself")
            .await
            .expect("turn succeeds");
        match outcome {
            TurnOutcome::Continue { index, mapped, .. } => {
                assert_eq!(index, 1);
                assert!(mapped.risk.is_suicidal());
            }
            other => panic!("expected continue, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submitting_without_a_session_is_a_caller_error() {
        let service = service(Vec::new());
        let missing = SessionToken("missing".to_string());
        let err = service
            .submit_answer(&missing, "hello")
            .await
            .expect_err("no session");
        assert!(matches!(err, SessionError::NotInitialized));
    }

    #[tokio::test]
    async fn exhausted_sessions_are_cleared_and_rejected() {
        let service = service(Vec::new());
        let (token, _) = service.start().expect("session starts");
        service
            .store()
            .update(
                &token,
                SessionState {
                    index: 9,
                    answers: vec![1; 9],
                },
            )
            .expect("seed exhausted state");

        let err = service
            .submit_answer(&token, "hello")
            .await
            .expect_err("exhausted session rejects");
        assert!(matches!(err, SessionError::AlreadyCompleted));
        assert!(service
            .store()
            .fetch(&token)
            .expect("fetch after rejection")
            .is_none());
    }

    #[tokio::test]
    async fn oracle_silence_still_advances_with_fallback_text() {
        // No scripted outputs at all: mapping and empathy both fail.
        let service = service(Vec::new());
        let (token, _) = service.start().expect("session starts");

        let outcome = service
            .submit_answer(&token, "hard to say")
            .await
            .expect("turn still succeeds");
        match outcome {
            TurnOutcome::Continue { soothing, question, index, mapped } => {
                assert_eq!(index, 1);
                assert_eq!(mapped.answer, 0);
                assert_eq!(soothing, "I hear you — thanks for sharing.");
                assert!(question.contains(PHQ_ITEMS[1]));
            }
            other => panic!("expected continue, got {other:?}"),
        }
    }
}
