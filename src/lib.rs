use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

use state::DialogueState;

pub mod authoring;
pub mod commands;
pub mod config;
pub mod constructor;
pub mod database;
pub mod keyboard;
pub mod messenger;
pub mod parser;
pub mod runner;
pub mod schema;
pub mod session;
pub mod state;

pub type BotError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), BotError>;
pub(crate) type UserDialogue = Dialogue<DialogueState, InMemStorage<DialogueState>>;
