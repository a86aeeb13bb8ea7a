use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::ChatId, Bot};

use crate::keyboard::choices_keyboard;
use crate::BotError;

/// Everything the state machines are allowed to do to the outside world.
pub(crate) trait Messenger {
    async fn send_text(&self, target: ChatId, text: &str) -> Result<(), BotError>;

    async fn send_choices(
        &self,
        target: ChatId,
        text: &str,
        choices: &[(String, String)],
    ) -> Result<(), BotError>;

    async fn acknowledge(&self, event: &str) -> Result<(), BotError>;
}

pub(crate) struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub(crate) fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl Messenger for TelegramMessenger {
    async fn send_text(&self, target: ChatId, text: &str) -> Result<(), BotError> {
        self.bot.send_message(target, text).await?;
        Ok(())
    }

    async fn send_choices(
        &self,
        target: ChatId,
        text: &str,
        choices: &[(String, String)],
    ) -> Result<(), BotError> {
        self.bot
            .send_message(target, text)
            .reply_markup(choices_keyboard(choices))
            .await?;
        Ok(())
    }

    async fn acknowledge(&self, event: &str) -> Result<(), BotError> {
        self.bot.answer_callback_query(event.to_owned()).await?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outgoing {
    Text(String),
    Choices {
        text: String,
        choices: Vec<(String, String)>,
    },
    Ack(String),
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingMessenger {
    outgoing: std::sync::Mutex<Vec<Outgoing>>,
}

#[cfg(test)]
impl RecordingMessenger {
    pub(crate) fn all(&self) -> Vec<Outgoing> {
        self.outgoing.lock().unwrap().clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|out| match out {
                Outgoing::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last(&self) -> Option<Outgoing> {
        self.all().last().cloned()
    }
}

#[cfg(test)]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, _target: ChatId, text: &str) -> Result<(), BotError> {
        self.outgoing
            .lock()
            .unwrap()
            .push(Outgoing::Text(text.to_owned()));
        Ok(())
    }

    async fn send_choices(
        &self,
        target: ChatId,
        text: &str,
        choices: &[(String, String)],
    ) -> Result<(), BotError> {
        let _ = target;
        self.outgoing.lock().unwrap().push(Outgoing::Choices {
            text: text.to_owned(),
            choices: choices.to_vec(),
        });
        Ok(())
    }

    async fn acknowledge(&self, event: &str) -> Result<(), BotError> {
        self.outgoing
            .lock()
            .unwrap()
            .push(Outgoing::Ack(event.to_owned()));
        Ok(())
    }
}
