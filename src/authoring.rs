use teloxide::types::ChatId;

use crate::database::model::{Choice, OptionSet, QuestionDraft};
use crate::database::store::{AppendQuestions, ClearBank};
use crate::messenger::Messenger;
use crate::parser::parse_options_block;
use crate::state::{AdminDraft, AdminState};
use crate::BotError;

pub(crate) const MENU_CREATE: &str = "admin_create";
pub(crate) const MENU_DELETE_ALL: &str = "admin_delete_all";
pub(crate) const MENU_CANCEL: &str = "admin_cancel";

/// How many questions a batch targets when the admin's count reply doesn't
/// parse as a positive integer. The fallback is silent on purpose; see the
/// parse_count tests.
pub(crate) const DEFAULT_BATCH: usize = 30;

pub(crate) fn menu_choices() -> Vec<(String, String)> {
    vec![
        ("Create questions".to_owned(), MENU_CREATE.to_owned()),
        ("Delete all questions".to_owned(), MENU_DELETE_ALL.to_owned()),
        ("Cancel".to_owned(), MENU_CANCEL.to_owned()),
    ]
}

pub(crate) fn parse_count(text: &str) -> usize {
    match text.trim().parse::<i64>() {
        Ok(n) if n > 0 => n as usize,
        _ => DEFAULT_BATCH,
    }
}

/// Handles a press on the admin menu. `None` means the conversation is over.
pub(crate) async fn handle_menu_choice<S, M>(
    store: &S,
    messenger: &M,
    chat: ChatId,
    data: &str,
    event: &str,
) -> Result<Option<AdminState>, BotError>
where
    S: ClearBank,
    M: Messenger,
{
    messenger.acknowledge(event).await?;
    match data {
        MENU_CREATE => {
            messenger
                .send_text(chat, "How many questions do you want to add?")
                .await?;
            Ok(Some(AdminState::AwaitingCount))
        }
        MENU_DELETE_ALL => {
            store.clear_bank().await?;
            log::info!("chat {} deleted the whole question bank", chat.0);
            messenger.send_text(chat, "All questions deleted.").await?;
            Ok(None)
        }
        // Anything else, including the explicit cancel button, just ends
        // the conversation.
        _ => {
            messenger.send_text(chat, "Cancelled.").await?;
            Ok(None)
        }
    }
}

/// The whole authoring transition table. Takes the current state and the
/// admin's text reply, performs the step's side effects, and returns the
/// next state (`None` once the batch has been committed).
pub(crate) async fn advance<S, M>(
    store: &S,
    messenger: &M,
    chat: ChatId,
    state: AdminState,
    text: &str,
) -> Result<Option<AdminState>, BotError>
where
    S: AppendQuestions,
    M: Messenger,
{
    let text = text.trim();
    match state {
        AdminState::Menu => {
            messenger
                .send_text(chat, "Use the menu buttons above, or send /cancel.")
                .await?;
            Ok(Some(AdminState::Menu))
        }
        AdminState::AwaitingCount => {
            let target = parse_count(text);
            messenger
                .send_text(chat, &format!("Enter question 1 (of {target} total):"))
                .await?;
            Ok(Some(AdminState::AwaitingQuestion {
                draft: AdminDraft {
                    target,
                    collected: Vec::new(),
                },
            }))
        }
        AdminState::AwaitingQuestion { draft } => {
            messenger
                .send_text(
                    chat,
                    "Enter option a), or paste all four options as one block \
                     with the correct one marked in parentheses:",
                )
                .await?;
            Ok(Some(AdminState::AwaitingOptionA {
                draft,
                question: text.to_owned(),
            }))
        }
        AdminState::AwaitingOptionA { draft, question } => {
            // A full options block finishes the question in one step.
            if let Some((options, correct)) = parse_options_block(text) {
                return finish_question(
                    store,
                    messenger,
                    chat,
                    draft,
                    QuestionDraft {
                        text: question,
                        options,
                        correct,
                    },
                )
                .await;
            }
            messenger.send_text(chat, "Enter option b):").await?;
            Ok(Some(AdminState::AwaitingOptionB {
                draft,
                question,
                a: text.to_owned(),
            }))
        }
        AdminState::AwaitingOptionB { draft, question, a } => {
            messenger.send_text(chat, "Enter option c):").await?;
            Ok(Some(AdminState::AwaitingOptionC {
                draft,
                question,
                a,
                b: text.to_owned(),
            }))
        }
        AdminState::AwaitingOptionC { draft, question, a, b } => {
            messenger.send_text(chat, "Enter option d):").await?;
            Ok(Some(AdminState::AwaitingOptionD {
                draft,
                question,
                a,
                b,
                c: text.to_owned(),
            }))
        }
        AdminState::AwaitingOptionD { draft, question, a, b, c } => {
            messenger
                .send_text(chat, "Which option is correct? (a/b/c/d)")
                .await?;
            Ok(Some(AdminState::AwaitingCorrect {
                draft,
                question,
                options: OptionSet {
                    a,
                    b,
                    c,
                    d: text.to_owned(),
                },
            }))
        }
        AdminState::AwaitingCorrect { draft, question, options } => {
            let Some(correct) = Choice::from_reply(text) else {
                // The machine's only retry loop.
                messenger
                    .send_text(chat, "Please reply with one of a, b, c or d.")
                    .await?;
                return Ok(Some(AdminState::AwaitingCorrect {
                    draft,
                    question,
                    options,
                }));
            };
            finish_question(
                store,
                messenger,
                chat,
                draft,
                QuestionDraft {
                    text: question,
                    options,
                    correct,
                },
            )
            .await
        }
    }
}

/// Closes out one question. Commits the whole batch once the target is
/// reached; partial batches never touch the bank.
async fn finish_question<S, M>(
    store: &S,
    messenger: &M,
    chat: ChatId,
    mut draft: AdminDraft,
    question: QuestionDraft,
) -> Result<Option<AdminState>, BotError>
where
    S: AppendQuestions,
    M: Messenger,
{
    draft.collected.push(question);

    if draft.collected.len() >= draft.target {
        let added = store.append_questions(draft.collected).await?;
        log::info!("chat {} committed a batch of {added} questions", chat.0);
        messenger
            .send_text(chat, &format!("{added} questions saved."))
            .await?;
        return Ok(None);
    }

    messenger
        .send_text(
            chat,
            &format!(
                "Enter question {} (of {} total):",
                draft.collected.len() + 1,
                draft.target
            ),
        )
        .await?;
    Ok(Some(AdminState::AwaitingQuestion { draft }))
}
