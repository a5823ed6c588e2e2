use std::sync::Arc;

use shared::domain::{Submitter, UserKey};
use teloxide::payloads::{EditMessageReplyMarkupSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    KeyboardRemove, MessageId, ReplyMarkup, User,
};
use tracing::{debug, warn};
use wizard::reply::{BTN_BACK, BTN_CANCEL, BTN_SKIP};
use wizard::{handle_update, BotContext, Button, Command, Inbound, Keyboard, Reply};

use crate::sessions::SessionRegistry;

pub struct BotState {
    ctx: BotContext,
    sessions: SessionRegistry,
}

impl BotState {
    pub fn new(ctx: BotContext) -> Self {
        Self {
            ctx,
            sessions: SessionRegistry::default(),
        }
    }

    async fn dispatch(&self, user: &User, inbound: Inbound) -> Vec<Reply> {
        let submitter = Submitter::new(UserKey(user.id.0), user.username.clone());
        let slot = self.sessions.slot(submitter.user_id).await;
        let replies = {
            let mut session = slot.lock().await;
            handle_update(&self.ctx, &mut session, &submitter, inbound).await
        };
        self.sessions.release(submitter.user_id, slot).await;
        replies
    }
}

/// Long-polls Telegram until Ctrl-C.
pub async fn run(bot: Bot, state: BotState) {
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![Arc::new(state)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn on_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        return Ok(());
    };
    let inbound = match Command::parse(text) {
        Some(command) => Inbound::Command(command),
        None => Inbound::Text(text.to_string()),
    };
    let replies = state.dispatch(user, inbound).await;
    deliver(&bot, msg.chat.id, None, replies).await
}

async fn on_callback(bot: Bot, query: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    if let Err(err) = bot.answer_callback_query(query.id.clone()).await {
        warn!(%err, "answering callback query failed");
    }
    let Some(data) = query.data.clone() else {
        return Ok(());
    };
    let origin = query.regular_message().map(|message| (message.chat.id, message.id));
    let chat = origin
        .map(|(chat, _)| chat)
        .unwrap_or(ChatId(query.from.id.0 as i64));

    let replies = state.dispatch(&query.from, Inbound::Choice(data)).await;
    deliver(&bot, chat, origin.map(|(_, id)| id), replies).await
}

/// Sends replies in order. Edits target the message whose button was pressed
/// and fall back to a new message when there is none.
async fn deliver(
    bot: &Bot,
    chat: ChatId,
    origin: Option<MessageId>,
    replies: Vec<Reply>,
) -> ResponseResult<()> {
    for reply in replies {
        match (reply, origin) {
            (Reply::Send { text, keyboard }, _) => {
                let request = bot.send_message(chat, text);
                match reply_markup(keyboard) {
                    Some(markup) => request.reply_markup(markup).await?,
                    None => request.await?,
                };
            }
            (Reply::EditText(text), Some(id)) => {
                if let Err(err) = bot.edit_message_text(chat, id, text).await {
                    warn!(%err, "editing message text failed");
                }
            }
            (Reply::EditText(text), None) => {
                bot.send_message(chat, text).await?;
            }
            (Reply::EditKeyboard(rows), Some(id)) => {
                let edit = bot
                    .edit_message_reply_markup(chat, id)
                    .reply_markup(inline_markup(rows));
                if let Err(err) = edit.await {
                    warn!(%err, "editing inline keyboard failed");
                }
            }
            (Reply::EditKeyboard(_), None) => {
                debug!("keyboard edit without an origin message dropped");
            }
        }
    }
    Ok(())
}

fn reply_markup(keyboard: Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::None => None,
        Keyboard::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
        Keyboard::Field { skip } => {
            let mut rows = Vec::new();
            if skip {
                rows.push(vec![KeyboardButton::new(BTN_SKIP)]);
            }
            rows.push(vec![
                KeyboardButton::new(BTN_BACK),
                KeyboardButton::new(BTN_CANCEL),
            ]);
            Some(ReplyMarkup::Keyboard(KeyboardMarkup::new(rows)))
        }
        Keyboard::Inline(rows) => Some(ReplyMarkup::InlineKeyboard(inline_markup(rows))),
    }
}

fn inline_markup(rows: Vec<Vec<Button>>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.label, button.data))
            .collect::<Vec<_>>()
    }))
}
