use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reference_data::ReferenceData;
use shared::domain::Submitter;
use shared::error::ValidationError;
use shared::protocol::UserMapping;
use store_client::RecordStore;
use tracing::{error, info, warn};

use crate::choice::{Choice, TechRole};
use crate::command::{Command, HELP_TEXT};
use crate::picker::{PickerOutcome, TechPicker};
use crate::reply::{Keyboard, Reply};
use crate::stats::{compute_stats, format_stats};
use crate::steps::{Input, Transition, Wizard};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Everything a session handler needs that outlives a single session.
#[derive(Clone)]
pub struct BotContext {
    pub data: Arc<ReferenceData>,
    pub store: Arc<dyn RecordStore>,
    pub tz: Tz,
    clock: Clock,
}

impl BotContext {
    pub fn new(data: Arc<ReferenceData>, store: Arc<dyn RecordStore>, tz: Tz) -> Self {
        Self {
            data,
            store,
            tz,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Tz> {
        (self.clock)().with_timezone(&self.tz)
    }
}

/// The conversation a user is currently in.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    WorkOrder(Wizard),
    BindIdentity(TechPicker),
}

/// An update from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    Text(String),
    /// Raw callback data of a pressed inline button.
    Choice(String),
}

const STORE_FAILURE: &str = "Gagal mengambil data. Coba lagi nanti.";

/// Handles one update for one user. `session` is `None` when the user is not
/// in a conversation and is reset to `None` when a conversation ends.
pub async fn handle_update(
    ctx: &BotContext,
    session: &mut Option<Session>,
    submitter: &Submitter,
    inbound: Inbound,
) -> Vec<Reply> {
    match inbound {
        Inbound::Command(command) => handle_command(ctx, session, submitter, command).await,
        Inbound::Text(text) => match session {
            Some(Session::WorkOrder(_)) => {
                drive_wizard(ctx, session, submitter, Input::Text(&text)).await
            }
            Some(Session::BindIdentity(_)) => vec![Reply::text(
                ValidationError::UnknownSelection.to_string(),
            )],
            None => vec![Reply::text(
                "Ketik /start untuk input pekerjaan baru atau /help untuk bantuan.",
            )],
        },
        Inbound::Choice(data) => {
            let choice = match data.parse::<Choice>() {
                Ok(choice) => choice,
                Err(err) => {
                    warn!(user_id = %submitter.user_id, %data, "unrecognised callback data");
                    return vec![Reply::text(err.to_string())];
                }
            };
            match session {
                Some(Session::WorkOrder(_)) => {
                    drive_wizard(ctx, session, submitter, Input::Choice(&choice)).await
                }
                Some(Session::BindIdentity(_)) => {
                    bind_identity(ctx, session, submitter, &choice).await
                }
                None => vec![Reply::text(
                    "Sesi sudah berakhir. Ketik /start untuk mulai lagi.",
                )],
            }
        }
    }
}

async fn handle_command(
    ctx: &BotContext,
    session: &mut Option<Session>,
    submitter: &Submitter,
    command: Command,
) -> Vec<Reply> {
    match command {
        Command::Start => {
            let (wizard, replies) = Wizard::start(&ctx.data);
            if session.replace(Session::WorkOrder(wizard)).is_some() {
                info!(user_id = %submitter.user_id, "previous session replaced");
            }
            info!(user_id = %submitter.user_id, "work order session started");
            replies
        }
        Command::SetMe => {
            let mut picker = TechPicker::new(TechRole::Identity);
            let prompt = picker.unit_prompt(&ctx.data);
            *session = Some(Session::BindIdentity(picker));
            vec![prompt]
        }
        Command::Me => my_stats(ctx, submitter).await,
        Command::Stats(name) => {
            if name.trim().is_empty() {
                return vec![Reply::text("Gunakan: /stats Nama Teknisi")];
            }
            stats_for(ctx, name.trim()).await
        }
        Command::Help => vec![Reply::text(HELP_TEXT)],
        Command::Cancel => {
            if session.take().is_some() {
                info!(user_id = %submitter.user_id, "session cancelled");
            }
            vec![Reply::with_keyboard("Dibatalkan.", Keyboard::Remove)]
        }
        Command::Skip => match session {
            Some(Session::WorkOrder(_)) => drive_wizard(ctx, session, submitter, Input::Skip).await,
            _ => vec![Reply::text("Tidak ada yang bisa dilewati.")],
        },
        Command::Unknown(word) => {
            vec![Reply::text(format!(
                "Perintah /{word} tidak dikenal. Ketik /help untuk bantuan."
            ))]
        }
    }
}

async fn drive_wizard(
    ctx: &BotContext,
    session: &mut Option<Session>,
    submitter: &Submitter,
    input: Input<'_>,
) -> Vec<Reply> {
    let Some(Session::WorkOrder(wizard)) = session else {
        return Vec::new();
    };
    match wizard.handle(&ctx.data, input) {
        Transition::Stay(replies) => replies,
        Transition::Ended(replies) => {
            info!(user_id = %submitter.user_id, "work order session ended");
            *session = None;
            replies
        }
        Transition::Submit => {
            let record = match wizard.draft().to_record(submitter, &ctx.now()) {
                Ok(record) => record,
                Err(err) => {
                    error!(user_id = %submitter.user_id, %err, "draft rejected at submission");
                    *session = None;
                    return vec![Reply::EditText(
                        "Data belum lengkap. Jalankan /start lagi.".to_string(),
                    )];
                }
            };
            match ctx.store.append_record(&record).await {
                Ok(()) => {
                    info!(
                        user_id = %submitter.user_id,
                        wo_number = %record.wo_number,
                        "work order submitted"
                    );
                    *session = None;
                    vec![Reply::EditText("✅ Data tersimpan. Terima kasih!".to_string())]
                }
                Err(err) => {
                    // The draft stays at the confirmation step so Save can be retried.
                    error!(user_id = %submitter.user_id, %err, "work order submission failed");
                    vec![Reply::text(
                        "Gagal menyimpan data ke spreadsheet. Tekan Simpan untuk mencoba lagi atau /cancel untuk membatalkan.",
                    )]
                }
            }
        }
    }
}

async fn bind_identity(
    ctx: &BotContext,
    session: &mut Option<Session>,
    submitter: &Submitter,
    choice: &Choice,
) -> Vec<Reply> {
    let Some(Session::BindIdentity(picker)) = session else {
        return Vec::new();
    };
    let index = match picker.handle(&ctx.data, choice) {
        PickerOutcome::Pending(replies) => return replies,
        PickerOutcome::Rejected(err) => return vec![Reply::text(err.to_string())],
        PickerOutcome::Picked(index) => index,
    };
    *session = None;
    let Some(technician) = ctx.data.technician(index) else {
        return vec![Reply::text(ValidationError::UnknownSelection.to_string())];
    };
    let mapping = UserMapping {
        user_id: submitter.user_id.to_string(),
        username: submitter.username_or_empty().to_string(),
        teknisi_name: technician.name.clone(),
        updated_at: (ctx.clock)().to_rfc3339(),
    };
    match ctx.store.set_user_mapping(&mapping).await {
        Ok(()) => {
            info!(user_id = %submitter.user_id, technician = %mapping.teknisi_name, "identity bound");
            vec![Reply::EditText(format!(
                "Nama kamu tersimpan sebagai: {}",
                mapping.teknisi_name
            ))]
        }
        Err(err) => {
            error!(user_id = %submitter.user_id, %err, "identity binding failed");
            vec![Reply::text("Gagal menyimpan nama. Coba /setme lagi nanti.")]
        }
    }
}

async fn my_stats(ctx: &BotContext, submitter: &Submitter) -> Vec<Reply> {
    let user_id = submitter.user_id.to_string();
    match ctx.store.get_user_mapping(&user_id).await {
        Ok(Some(name)) => stats_for(ctx, &name).await,
        Ok(None) => vec![Reply::text("Nama kamu belum diset. Jalankan /setme dulu.")],
        Err(err) => {
            error!(%user_id, %err, "mapping lookup failed");
            vec![Reply::text(STORE_FAILURE)]
        }
    }
}

async fn stats_for(ctx: &BotContext, name: &str) -> Vec<Reply> {
    let records = match ctx.store.get_all_records().await {
        Ok(records) => records,
        Err(err) => {
            error!(technician = %name, %err, "record fetch failed");
            return vec![Reply::text(STORE_FAILURE)];
        }
    };
    let now = ctx.now();
    let stats = compute_stats(&records, name, &now);
    vec![Reply::text(format_stats(name, &stats, &now))]
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
