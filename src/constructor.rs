use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    prelude::Requester,
    types::{CallbackQuery, Message},
    Bot,
};
use tracing::instrument;

use crate::{
    authoring::{self, menu_choices},
    config::BotConfig,
    database::store::{AppendQuestions, ClearBank},
    messenger::{Messenger, TelegramMessenger},
    state::{AdminState, DialogueState},
    HandlerResult, UserDialogue,
};

#[instrument(level = "info", skip(bot, dialogue, config))]
pub(crate) async fn admin_command(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    config: Arc<BotConfig>,
) -> HandlerResult {
    if !config.is_admin(msg.chat.id) {
        log::info!("chat {} tried the admin menu and was rejected", msg.chat.id.0);
        bot.send_message(msg.chat.id, "You are not the admin.").await?;
        return Ok(());
    }

    let messenger = TelegramMessenger::new(bot);
    messenger
        .send_choices(msg.chat.id, "Admin menu:", &menu_choices())
        .await?;
    dialogue.update(DialogueState::Admin(AdminState::Menu)).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, store))]
pub(crate) async fn admin_menu<Store: ClearBank>(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    state: AdminState,
    store: Arc<Store>,
) -> HandlerResult {
    let Some(chat) = q.chat_id() else {
        return Ok(());
    };
    let messenger = TelegramMessenger::new(bot);

    if !matches!(state, AdminState::Menu) {
        // A stale button pressed mid-dialogue; don't let it clobber the
        // current step.
        messenger.acknowledge(&q.id).await?;
        messenger
            .send_text(chat, "Finish the current step first, or send /cancel.")
            .await?;
        return Ok(());
    }

    let data = q.data.clone().unwrap_or_default();
    let next =
        authoring::handle_menu_choice(store.as_ref(), &messenger, chat, &data, &q.id).await?;
    update_dialogue(&dialogue, next).await
}

#[instrument(level = "info", skip(bot, dialogue, store, state))]
pub(crate) async fn admin_input<Store: AppendQuestions>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    state: AdminState,
    store: Arc<Store>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send text.").await?;
        return Ok(());
    };
    let text = text.to_owned();

    let messenger = TelegramMessenger::new(bot);
    let next =
        authoring::advance(store.as_ref(), &messenger, msg.chat.id, state, &text).await?;
    update_dialogue(&dialogue, next).await
}

async fn update_dialogue(dialogue: &UserDialogue, next: Option<AdminState>) -> HandlerResult {
    match next {
        Some(state) => dialogue.update(DialogueState::Admin(state)).await?,
        None => dialogue.update(DialogueState::Idle).await?,
    }
    Ok(())
}
