use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    types::{CallbackQuery, Message},
    Bot,
};
use tracing::instrument;

use crate::{
    database::model::AnswerRef,
    database::store::{RetrieveBank, TrackProgress},
    messenger::{Messenger, TelegramMessenger},
    session, HandlerResult,
};

#[instrument(level = "info", skip(bot, store))]
pub(crate) async fn start<Store>(bot: Bot, msg: Message, store: Arc<Store>) -> HandlerResult
where
    Store: RetrieveBank + TrackProgress,
{
    let messenger = TelegramMessenger::new(bot);
    session::begin(store.as_ref(), &messenger, msg.chat.id).await
}

#[instrument(level = "info", skip(bot, store))]
pub(crate) async fn take_answer<Store>(bot: Bot, q: CallbackQuery, store: Arc<Store>) -> HandlerResult
where
    Store: RetrieveBank + TrackProgress,
{
    let Some(chat) = q.chat_id() else {
        return Ok(());
    };
    let messenger = TelegramMessenger::new(bot);

    let Some(answer) = q.data.as_deref().and_then(AnswerRef::parse) else {
        log::warn!("chat {} sent unparseable callback data {:?}", chat.0, q.data);
        messenger.acknowledge(&q.id).await?;
        return Ok(());
    };

    session::submit_answer(store.as_ref(), &messenger, chat, answer, &q.id).await
}
