use teloxide::{prelude::Requester, types::Message, utils::command::BotCommands, Bot};

use crate::{state::DialogueState, HandlerResult, UserDialogue};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "display help.")]
    Help,
    #[command(description = "start the quiz.")]
    Start,
    #[command(description = "open the admin menu.")]
    Admin,
    #[command(description = "cancel the admin dialogue.")]
    Cancel,
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Works from any admin state; the draft in the dialogue state is dropped
/// with it, so partial batches are never committed.
pub(crate) async fn cancel(bot: Bot, dialogue: UserDialogue, msg: Message) -> HandlerResult {
    log::info!("chat {} cancelled the dialogue", msg.chat.id.0);
    bot.send_message(msg.chat.id, "Operation cancelled.").await?;
    dialogue.update(DialogueState::Idle).await?;
    Ok(())
}
