use teloxide::types::ChatId;

use crate::database::model::{AnswerRef, Choice, Question, UserProgress};
use crate::database::store::{RetrieveBank, TrackProgress};
use crate::messenger::Messenger;
use crate::BotError;

pub(crate) const NO_QUESTIONS: &str =
    "No questions available yet. Wait for the admin to add some.";

/// Resets progress to zero and sends the first question. Refuses to create
/// a record for an empty bank.
pub(crate) async fn begin<S, M>(store: &S, messenger: &M, chat: ChatId) -> Result<(), BotError>
where
    S: RetrieveBank + TrackProgress,
    M: Messenger,
{
    let _guard = store.lock_user(chat.0).await;

    let bank = store.retrieve_bank().await?;
    if bank.is_empty() {
        messenger.send_text(chat, NO_QUESTIONS).await?;
        return Ok(());
    }

    let progress = UserProgress::default();
    store.store_progress(chat.0, progress).await?;
    log::info!("chat {} begins the quiz ({} questions)", chat.0, bank.len());
    prompt(store, messenger, chat, &bank, progress).await
}

/// Sends the question the user's progress points at, or the final summary
/// once the pointer has run off the end of the bank. Completion deletes the
/// progress record, collapsing the session back to "not started".
pub(crate) async fn prompt<S, M>(
    store: &S,
    messenger: &M,
    chat: ChatId,
    bank: &[Question],
    progress: UserProgress,
) -> Result<(), BotError>
where
    S: TrackProgress,
    M: Messenger,
{
    if progress.index >= bank.len() {
        messenger
            .send_text(
                chat,
                &format!(
                    "Quiz complete. Correct: {}, Incorrect: {}",
                    progress.correct, progress.incorrect
                ),
            )
            .await?;
        store.delete_progress(chat.0).await?;
        log::info!(
            "chat {} finished with {}/{} correct",
            chat.0,
            progress.correct,
            bank.len()
        );
        return Ok(());
    }

    let question = &bank[progress.index];
    let choices: Vec<(String, String)> = Choice::ALL
        .iter()
        .map(|&choice| {
            let label = format!("{}) {}", choice, question.options().get(choice));
            let reference = AnswerRef {
                question_id: question.id(),
                choice,
            };
            (label, reference.to_string())
        })
        .collect();

    messenger
        .send_choices(
            chat,
            &format!("Question {}: {}", progress.index + 1, question.text()),
            &choices,
        )
        .await
}

/// Validates an answer callback against the user's current position. Only
/// the question the progress pointer is at may be answered; stale buttons
/// from earlier (or skipped-ahead) messages are rejected without mutation.
pub(crate) async fn submit_answer<S, M>(
    store: &S,
    messenger: &M,
    chat: ChatId,
    answer: AnswerRef,
    event: &str,
) -> Result<(), BotError>
where
    S: RetrieveBank + TrackProgress,
    M: Messenger,
{
    messenger.acknowledge(event).await?;

    // Held across the whole read-modify-write so two concurrent callbacks
    // for the same user can't both pass the index guard.
    let _guard = store.lock_user(chat.0).await;

    let bank = store.retrieve_bank().await?;
    let Some(position) = bank.iter().position(|q| q.id() == answer.question_id) else {
        messenger.send_text(chat, "That question no longer exists.").await?;
        return Ok(());
    };

    let Some(mut progress) = store.retrieve_progress(chat.0).await? else {
        messenger
            .send_text(chat, "No quiz in progress. Send /start to begin.")
            .await?;
        return Ok(());
    };

    if progress.index != position {
        log::info!(
            "chat {} answered position {} while at {}; rejected",
            chat.0,
            position,
            progress.index
        );
        messenger
            .send_text(chat, "You can't answer that question (already passed or not current).")
            .await?;
        return Ok(());
    }

    let question = &bank[position];
    if answer.choice == question.correct() {
        progress.correct += 1;
        messenger.send_text(chat, "Correct ✅").await?;
    } else {
        progress.incorrect += 1;
        messenger
            .send_text(
                chat,
                &format!("Incorrect ❌. The right answer was {}", question.correct()),
            )
            .await?;
    }
    progress.index += 1;
    store.store_progress(chat.0, progress).await?;

    prompt(store, messenger, chat, &bank, progress).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::model::{OptionSet, QuestionDraft};
    use crate::database::store::{AppendQuestions, MemStore};
    use crate::messenger::{Outgoing, RecordingMessenger};

    const CHAT: ChatId = ChatId(42);

    fn draft(text: &str, correct: Choice) -> QuestionDraft {
        QuestionDraft {
            text: text.to_owned(),
            options: OptionSet {
                a: "one".into(),
                b: "two".into(),
                c: "three".into(),
                d: "four".into(),
            },
            correct,
        }
    }

    async fn seeded_store(drafts: Vec<QuestionDraft>) -> MemStore {
        let store = MemStore::default();
        store.append_questions(drafts).await.expect("seed");
        store
    }

    fn answer_for(question: &Question, choice: Choice) -> AnswerRef {
        AnswerRef {
            question_id: question.id(),
            choice,
        }
    }

    #[tokio::test]
    async fn begin_on_an_empty_bank_creates_nothing() {
        let store = MemStore::default();
        let messenger = RecordingMessenger::default();

        begin(&store, &messenger, CHAT).await.expect("begin");

        assert_eq!(store.retrieve_progress(CHAT.0).await.unwrap(), None);
        assert_eq!(messenger.all(), vec![Outgoing::Text(NO_QUESTIONS.to_owned())]);
    }

    #[tokio::test]
    async fn begin_resets_progress_and_prompts_question_one() {
        let store = seeded_store(vec![draft("q1", Choice::A), draft("q2", Choice::B)]).await;
        let messenger = RecordingMessenger::default();

        begin(&store, &messenger, CHAT).await.expect("begin");

        assert_eq!(
            store.retrieve_progress(CHAT.0).await.unwrap(),
            Some(UserProgress::default())
        );
        match messenger.last().expect("a prompt") {
            Outgoing::Choices { text, choices } => {
                assert_eq!(text, "Question 1: q1");
                assert_eq!(choices.len(), 4);
                assert_eq!(choices[0].0, "a) one");
                assert_eq!(choices[0].1, "ans|0|a");
            }
            other => panic!("expected a choices prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_run_counts_answers_and_deletes_the_record() {
        let store = seeded_store(vec![draft("q1", Choice::A), draft("q2", Choice::B)]).await;
        let messenger = RecordingMessenger::default();
        let bank = store.retrieve_bank().await.unwrap();

        begin(&store, &messenger, CHAT).await.expect("begin");

        // Correct answer to question 1.
        submit_answer(&store, &messenger, CHAT, answer_for(&bank[0], Choice::A), "ev1")
            .await
            .expect("first answer");
        let progress = store.retrieve_progress(CHAT.0).await.unwrap().expect("record");
        assert_eq!(progress, UserProgress { index: 1, correct: 1, incorrect: 0 });

        // Wrong answer to question 2 completes the run.
        submit_answer(&store, &messenger, CHAT, answer_for(&bank[1], Choice::D), "ev2")
            .await
            .expect("second answer");

        assert_eq!(store.retrieve_progress(CHAT.0).await.unwrap(), None);
        let texts = messenger.texts();
        assert!(texts.iter().any(|t| t.contains("Correct: 1, Incorrect: 1")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_submits_for_one_user_advance_only_once() {
        let store = seeded_store(vec![draft("q1", Choice::A), draft("q2", Choice::B)]).await;
        let messenger = RecordingMessenger::default();
        let bank = store.retrieve_bank().await.unwrap();

        begin(&store, &messenger, CHAT).await.expect("begin");

        // Two callbacks for the same question racing each other; the
        // per-user lock must let exactly one pass the index guard.
        let first = submit_answer(&store, &messenger, CHAT, answer_for(&bank[0], Choice::A), "ev1");
        let second = submit_answer(&store, &messenger, CHAT, answer_for(&bank[0], Choice::A), "ev2");
        let (first, second) = tokio::join!(first, second);
        first.expect("first submit");
        second.expect("second submit");

        let progress = store.retrieve_progress(CHAT.0).await.unwrap().expect("record");
        assert_eq!(progress, UserProgress { index: 1, correct: 1, incorrect: 0 });
    }

    #[tokio::test]
    async fn replaying_an_already_answered_question_changes_nothing() {
        let store = seeded_store(vec![draft("q1", Choice::A), draft("q2", Choice::B)]).await;
        let messenger = RecordingMessenger::default();
        let bank = store.retrieve_bank().await.unwrap();

        begin(&store, &messenger, CHAT).await.expect("begin");
        submit_answer(&store, &messenger, CHAT, answer_for(&bank[0], Choice::A), "ev1")
            .await
            .expect("answer");
        let before = store.retrieve_progress(CHAT.0).await.unwrap();

        // The stale button for question 1 again.
        submit_answer(&store, &messenger, CHAT, answer_for(&bank[0], Choice::B), "ev2")
            .await
            .expect("replay");

        assert_eq!(store.retrieve_progress(CHAT.0).await.unwrap(), before);
    }

    #[tokio::test]
    async fn answering_ahead_of_the_pointer_is_rejected() {
        let store = seeded_store(vec![draft("q1", Choice::A), draft("q2", Choice::B)]).await;
        let messenger = RecordingMessenger::default();
        let bank = store.retrieve_bank().await.unwrap();

        begin(&store, &messenger, CHAT).await.expect("begin");
        submit_answer(&store, &messenger, CHAT, answer_for(&bank[1], Choice::B), "ev1")
            .await
            .expect("skip ahead");

        assert_eq!(
            store.retrieve_progress(CHAT.0).await.unwrap(),
            Some(UserProgress::default()),
            "progress must be untouched"
        );
    }

    #[tokio::test]
    async fn unknown_question_id_is_reported_without_mutation() {
        let store = seeded_store(vec![draft("q1", Choice::A)]).await;
        let messenger = RecordingMessenger::default();

        begin(&store, &messenger, CHAT).await.expect("begin");
        let bogus = AnswerRef {
            question_id: 999,
            choice: Choice::A,
        };
        submit_answer(&store, &messenger, CHAT, bogus, "ev1").await.expect("bogus");

        assert_eq!(
            store.retrieve_progress(CHAT.0).await.unwrap(),
            Some(UserProgress::default())
        );
        assert!(messenger.texts().iter().any(|t| t.contains("no longer exists")));
    }

    #[tokio::test]
    async fn answering_without_a_session_is_a_notice_not_a_record() {
        let store = seeded_store(vec![draft("q1", Choice::A)]).await;
        let messenger = RecordingMessenger::default();
        let bank = store.retrieve_bank().await.unwrap();

        submit_answer(&store, &messenger, CHAT, answer_for(&bank[0], Choice::A), "ev1")
            .await
            .expect("no session");

        assert_eq!(store.retrieve_progress(CHAT.0).await.unwrap(), None);
        assert!(messenger.texts().iter().any(|t| t.contains("/start")));
    }
}
