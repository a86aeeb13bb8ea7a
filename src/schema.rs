use teloxide::{
    dispatching::{dialogue, dialogue::InMemStorage, UpdateFilterExt, UpdateHandler},
    prelude::*,
    types::Message,
    Bot,
};
use tracing::instrument;

use crate::{
    commands::{cancel, help, Command},
    constructor,
    database::store::JsonStore,
    runner,
    state::DialogueState,
    BotError, HandlerResult,
};

/// Routes inbound updates to the two state machines: messages feed the
/// admin authoring dialogue, callback presses feed either the admin menu
/// or the quiz session, depending on the chat's dialogue state.
#[instrument(level = "debug")]
pub fn schema() -> UpdateHandler<BotError> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(runner::start::<JsonStore>))
        .branch(case![Command::Admin].endpoint(constructor::admin_command))
        .branch(case![Command::Cancel].endpoint(cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![DialogueState::Admin(state)].endpoint(constructor::admin_input::<JsonStore>))
        .endpoint(invalid_state);

    let callback_handler = Update::filter_callback_query()
        .branch(case![DialogueState::Admin(state)].endpoint(constructor::admin_menu::<JsonStore>))
        .endpoint(runner::take_answer::<JsonStore>);

    dialogue::enter::<Update, InMemStorage<DialogueState>, DialogueState, _>()
        .branch(message_handler)
        .branch(callback_handler)
}

#[instrument(level = "info")]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    log::info!("chat {}: unhandled message {:?}", msg.chat.id.0, msg.text());
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .await?;
    Ok(())
}
