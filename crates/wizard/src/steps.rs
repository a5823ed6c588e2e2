use reference_data::ReferenceData;
use shared::dates::{parse_work_date, DATE_INPUT_HINT};
use shared::domain::OrderItem;
use shared::error::ValidationError;
use tracing::warn;

use crate::choice::{Choice, TechRole};
use crate::draft::{Draft, SecondTechnician};
use crate::keyboards;
use crate::pagination::PAGE_SIZE;
use crate::picker::{PickerOutcome, PickerStage, TechPicker};
use crate::reply::{step_text, Keyboard, Nav, Reply, BTN_SKIP, TOTAL_STEPS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    SegmentPick,
    OrderQuery,
    ServiceNumber,
    WoNumber,
    TicketId,
    DateOpen,
    DateClose,
    /// Unit and name selection for technician 1 or 2.
    Technician(TechPicker),
    Tech2Decide,
    Workzone,
    Keterangan,
    Confirm,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SegmentPick => "SegmentPick",
            Self::OrderQuery => "OrderQuery",
            Self::ServiceNumber => "ServiceNumber",
            Self::WoNumber => "WoNumber",
            Self::TicketId => "TicketId",
            Self::DateOpen => "DateOpen",
            Self::DateClose => "DateClose",
            Self::Technician(picker) => match (picker.role(), picker.stage()) {
                (TechRole::Secondary, PickerStage::Unit) => "Tech2Unit",
                (TechRole::Secondary, PickerStage::Name { .. }) => "Tech2Name",
                (_, PickerStage::Unit) => "Tech1Unit",
                (_, PickerStage::Name { .. }) => "Tech1Name",
            },
            Self::Tech2Decide => "Tech2Decide",
            Self::Workzone => "Workzone",
            Self::Keterangan => "Keterangan",
            Self::Confirm => "Confirm",
        }
    }

    fn takes_text(&self) -> bool {
        matches!(
            self,
            Self::ServiceNumber
                | Self::WoNumber
                | Self::TicketId
                | Self::DateOpen
                | Self::DateClose
                | Self::Workzone
                | Self::Keterangan
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Text(&'a str),
    Choice(&'a Choice),
    /// The `/skip` command.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Stay(Vec<Reply>),
    /// The session is over; the draft is dropped.
    Ended(Vec<Reply>),
    /// The user pressed Save on a complete draft.
    Submit,
}

/// One work-order run: the current step plus the draft it is filling.
#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    step: Step,
    draft: Draft,
}

impl Wizard {
    pub fn start(data: &ReferenceData) -> (Self, Vec<Reply>) {
        let wizard = Self {
            step: Step::SegmentPick,
            draft: Draft::default(),
        };
        let replies = vec![segment_prompt(data)];
        (wizard, replies)
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn handle(&mut self, data: &ReferenceData, input: Input<'_>) -> Transition {
        let nav = match input {
            Input::Text(text) => Nav::detect(text),
            Input::Skip => Some(Nav::Skip),
            Input::Choice(_) => None,
        };
        if nav == Some(Nav::Cancel) && self.step != Step::Confirm {
            return cancelled();
        }
        if nav == Some(Nav::Back) {
            return self.back(data);
        }
        if nav == Some(Nav::Skip) {
            return self.skip();
        }

        match input {
            Input::Text(text) => self.text(data, text.trim()),
            Input::Choice(choice) => self.choice(data, choice),
            Input::Skip => self.reject(ValidationError::UnknownSelection),
        }
    }

    fn text(&mut self, data: &ReferenceData, text: &str) -> Transition {
        if !self.step.takes_text() && self.step != Step::OrderQuery {
            return self.reject(ValidationError::UnknownSelection);
        }
        if text.is_empty() && self.step != Step::Keterangan {
            return self.reject(ValidationError::EmptyField);
        }

        match self.step {
            Step::OrderQuery => self.search(data, text),
            Step::ServiceNumber => {
                self.draft.service_number = Some(text.to_string());
                self.advance(Field::WoNumber)
            }
            Step::WoNumber => {
                self.draft.wo_number = Some(text.to_string());
                self.advance(Field::TicketId)
            }
            Step::TicketId => {
                self.draft.ticket_id = Some(text.to_string());
                self.advance(Field::DateOpen)
            }
            Step::DateOpen => {
                if parse_work_date(text).is_none() {
                    return self.reject(ValidationError::InvalidDate);
                }
                self.draft.date_open = Some(text.to_string());
                self.advance(Field::DateClose)
            }
            Step::DateClose => {
                if parse_work_date(text).is_none() {
                    return self.reject(ValidationError::InvalidDate);
                }
                self.draft.date_close = Some(text.to_string());
                let mut picker = TechPicker::new(TechRole::Primary);
                let prompt = picker.unit_prompt(data);
                self.step = Step::Technician(picker);
                Transition::Stay(vec![
                    Reply::with_keyboard(
                        "✅ Data tanggal tersimpan. Lanjut pilih teknisi via tombol di bawah.",
                        Keyboard::Remove,
                    ),
                    prompt,
                ])
            }
            Step::Workzone => {
                self.draft.workzone = Some(text.to_string());
                self.advance(Field::Keterangan)
            }
            Step::Keterangan => {
                self.draft.remark = Some(text.to_string());
                self.confirm("Siap, menampilkan konfirmasi...")
            }
            _ => self.reject(ValidationError::UnknownSelection),
        }
    }

    fn search(&mut self, data: &ReferenceData, query: &str) -> Transition {
        let segment = self.draft.segment.clone().unwrap_or_default();
        let matches = data.search_orders(&segment, query);
        match matches.len() {
            0 => self.reject(ValidationError::NoMatch),
            1 => {
                let item = matches[0].clone();
                self.select_order(item, false)
            }
            count if count > PAGE_SIZE => self.reject(ValidationError::TooManyMatches {
                count,
                limit: PAGE_SIZE,
            }),
            _ => Transition::Stay(vec![Reply::inline(
                "Pilih salah satu:",
                keyboards::order_buttons(matches.into_iter()),
            )]),
        }
    }

    fn choice(&mut self, data: &ReferenceData, choice: &Choice) -> Transition {
        match (&mut self.step, choice) {
            (Step::SegmentPick, Choice::Segment(segment)) => {
                if !data.has_segment(segment) {
                    return self.reject(ValidationError::UnknownSelection);
                }
                self.draft.segment = Some(segment.clone());
                self.draft.order = None;
                self.step = Step::OrderQuery;
                Transition::Stay(vec![
                    Reply::EditText(step_text(
                        2,
                        "Pilih Jenis Order",
                        "Bisa ketik kata kunci (contoh: Corrective) atau pilih dari daftar.",
                    )),
                    order_list(data, segment),
                ])
            }
            (Step::OrderQuery, Choice::OrderPage { segment, page })
                if self.draft.segment.as_ref() == Some(segment) =>
            {
                Transition::Stay(vec![Reply::EditKeyboard(keyboards::order_page(
                    data, segment, *page,
                ))])
            }
            (Step::OrderQuery, Choice::OrderSelect { segment, id })
                if self.draft.segment.as_ref() == Some(segment) =>
            {
                match data.order(segment, id) {
                    Some(item) => self.select_order(item.clone(), true),
                    None => Transition::Stay(vec![Reply::EditText(
                        "Jenis order tidak ditemukan. Coba lagi.".to_string(),
                    )]),
                }
            }
            (Step::Technician(picker), choice) => match picker.handle(data, choice) {
                PickerOutcome::Pending(replies) => Transition::Stay(replies),
                PickerOutcome::Rejected(err) => self.reject(err),
                PickerOutcome::Picked(index) => {
                    let role = picker.role();
                    let Some(technician) = data.technician(index) else {
                        return self.reject(ValidationError::UnknownSelection);
                    };
                    let name = technician.name.clone();
                    let picked = Reply::EditText(format!("Teknisi dipilih: {name}"));
                    if role == TechRole::Secondary {
                        self.draft.technician_2 = SecondTechnician::Named(name);
                        self.step = Step::Workzone;
                        Transition::Stay(vec![picked, prompt(Field::Workzone)])
                    } else {
                        self.draft.technician_1 = Some(name);
                        self.step = Step::Tech2Decide;
                        Transition::Stay(vec![picked, tech2_prompt()])
                    }
                }
            },
            (Step::Tech2Decide, Choice::Tech2None) => {
                self.draft.technician_2 = SecondTechnician::Absent;
                self.step = Step::Workzone;
                Transition::Stay(vec![
                    Reply::EditText("Teknisi 2: -".to_string()),
                    prompt(Field::Workzone),
                ])
            }
            (Step::Tech2Decide, Choice::Tech2Pick) => {
                let mut picker = TechPicker::new(TechRole::Secondary);
                let unit_list = picker.unit_prompt(data);
                self.step = Step::Technician(picker);
                Transition::Stay(vec![
                    Reply::EditText(step_text(
                        9,
                        "Teknisi 2 - Pilih Unit",
                        "Pilih unit teknisi kedua.",
                    )),
                    unit_list,
                ])
            }
            (Step::Confirm, Choice::Save) => {
                if self.draft.is_submittable() {
                    Transition::Submit
                } else {
                    warn!("save pressed on an incomplete draft");
                    Transition::Ended(vec![Reply::EditText(
                        "Data belum lengkap. Jalankan /start lagi.".to_string(),
                    )])
                }
            }
            (Step::Confirm, Choice::Discard) => {
                Transition::Ended(vec![Reply::EditText("Dibatalkan.".to_string())])
            }
            (step, choice) => {
                warn!(step = step.name(), %choice, "choice does not fit current step");
                self.reject(ValidationError::UnknownSelection)
            }
        }
    }

    fn back(&mut self, data: &ReferenceData) -> Transition {
        match self.step {
            Step::OrderQuery => {
                self.draft.segment = None;
                self.step = Step::SegmentPick;
                Transition::Stay(vec![segment_prompt(data)])
            }
            Step::ServiceNumber => {
                let Some(segment) = self.draft.segment.clone() else {
                    return Transition::Ended(vec![Reply::with_keyboard(
                        "Segment belum dipilih. Jalankan /start lagi.",
                        Keyboard::Remove,
                    )]);
                };
                self.step = Step::OrderQuery;
                Transition::Stay(vec![
                    Reply::with_keyboard(
                        "Kembali ke pemilihan jenis order. Pilih dari daftar:",
                        Keyboard::Remove,
                    ),
                    order_list(data, &segment),
                ])
            }
            Step::WoNumber => self.advance(Field::ServiceNumber),
            Step::TicketId => self.advance(Field::WoNumber),
            Step::DateOpen => self.advance(Field::TicketId),
            Step::DateClose => self.advance(Field::DateOpen),
            Step::Workzone => {
                let notice =
                    Reply::with_keyboard("Kembali ke langkah Teknisi 2.", Keyboard::Remove);
                if self.draft.technician_2 == SecondTechnician::Absent {
                    self.step = Step::Tech2Decide;
                    Transition::Stay(vec![notice, tech2_prompt()])
                } else {
                    let mut picker = TechPicker::new(TechRole::Secondary);
                    let unit_list = picker.unit_prompt(data);
                    self.step = Step::Technician(picker);
                    Transition::Stay(vec![notice, unit_list])
                }
            }
            Step::Keterangan => self.advance(Field::Workzone),
            _ => self.reject(ValidationError::UnknownSelection),
        }
    }

    fn skip(&mut self) -> Transition {
        if self.step != Step::Keterangan {
            return self.reject(ValidationError::UnknownSelection);
        }
        self.draft.remark = Some(String::new());
        self.confirm("Keterangan dilewati.")
    }

    fn select_order(&mut self, item: OrderItem, from_button: bool) -> Transition {
        let picked = format!("Terpilih: {}", item.label());
        self.draft.order = Some(item);
        self.step = Step::ServiceNumber;
        let picked = if from_button {
            Reply::EditText(picked)
        } else {
            Reply::text(picked)
        };
        Transition::Stay(vec![picked, prompt(Field::ServiceNumber)])
    }

    fn advance(&mut self, next: Field) -> Transition {
        self.step = next.step();
        let reply = prompt(next);
        Transition::Stay(vec![reply])
    }

    fn confirm(&mut self, notice: &str) -> Transition {
        self.step = Step::Confirm;
        Transition::Stay(vec![
            Reply::with_keyboard(notice, Keyboard::Remove),
            Reply::inline(summary(&self.draft), keyboards::confirm()),
        ])
    }

    /// Keeps the user on the current step with an explanation.
    fn reject(&self, err: ValidationError) -> Transition {
        let keyboard = if self.step.takes_text() {
            Keyboard::Field {
                skip: self.step == Step::Keterangan,
            }
        } else {
            Keyboard::None
        };
        Transition::Stay(vec![Reply::with_keyboard(err.to_string(), keyboard)])
    }
}

fn cancelled() -> Transition {
    Transition::Ended(vec![Reply::with_keyboard("Dibatalkan.", Keyboard::Remove)])
}

fn segment_prompt(data: &ReferenceData) -> Reply {
    Reply::inline(
        step_text(
            1,
            "Pilih Segment",
            "Silakan pilih segment pekerjaan dari tombol di bawah.",
        ),
        keyboards::segments(data),
    )
}

fn order_list(data: &ReferenceData, segment: &str) -> Reply {
    Reply::inline(
        format!("Total jenis order: {}. Halaman 1:", data.orders(segment).len()),
        keyboards::order_page(data, segment, 0),
    )
}

fn tech2_prompt() -> Reply {
    Reply::inline(
        step_text(9, "Teknisi 2 (Opsional)", "Pilih jika ada teknisi pendamping."),
        keyboards::tech2_decide(),
    )
}

/// The free-text steps, each with its own prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ServiceNumber,
    WoNumber,
    TicketId,
    DateOpen,
    DateClose,
    Workzone,
    Keterangan,
}

impl Field {
    fn step(self) -> Step {
        match self {
            Self::ServiceNumber => Step::ServiceNumber,
            Self::WoNumber => Step::WoNumber,
            Self::TicketId => Step::TicketId,
            Self::DateOpen => Step::DateOpen,
            Self::DateClose => Step::DateClose,
            Self::Workzone => Step::Workzone,
            Self::Keterangan => Step::Keterangan,
        }
    }
}

fn prompt(field: Field) -> Reply {
    let date_hint = format!("Format: {DATE_INPUT_HINT}");
    let (number, title, instruction) = match field {
        Field::ServiceNumber => (3, "Service Number", "Isi No Inet / Voice / Site sesuai tiket."),
        Field::WoNumber => (4, "WO Number", "Isi nomor SC/WO."),
        Field::TicketId => (5, "Ticket ID", "Isi nomor tiket gangguan/provisioning."),
        Field::DateOpen => (6, "Tanggal Open", date_hint.as_str()),
        Field::DateClose => (7, "Tanggal Close", date_hint.as_str()),
        Field::Workzone => (10, "Workzone", "Isi area/workzone pekerjaan."),
        Field::Keterangan => {
            let instruction = format!("Isi catatan tambahan, atau tekan {BTN_SKIP}.");
            return Reply::field(step_text(11, "Keterangan", &instruction), true);
        }
    };
    Reply::field(step_text(number, title, instruction), false)
}

fn summary(draft: &Draft) -> String {
    let value = |field: &Option<String>| field.clone().unwrap_or_default();
    let (order_name, weight) = draft
        .order
        .as_ref()
        .map(|item| (item.name.clone(), item.weight))
        .unwrap_or_default();
    let or_dash = |text: &str| {
        if text.is_empty() {
            "-".to_string()
        } else {
            text.to_string()
        }
    };
    format!(
        "{}\n\nKonfirmasi data:\n\
         Segment: {}\n\
         Jenis Order: {}\n\
         Bobot: {}\n\
         Service Number: {}\n\
         WO Number: {}\n\
         Ticket ID: {}\n\
         Tanggal Open: {}\n\
         Tanggal Close: {}\n\
         Teknisi 1: {}\n\
         Teknisi 2: {}\n\
         Workzone: {}\n\
         Keterangan: {}",
        step_text(TOTAL_STEPS, "Konfirmasi Data", ""),
        value(&draft.segment),
        order_name,
        weight,
        value(&draft.service_number),
        value(&draft.wo_number),
        value(&draft.ticket_id),
        value(&draft.date_open),
        value(&draft.date_close),
        value(&draft.technician_1),
        or_dash(draft.technician_2.display_name()),
        value(&draft.workzone),
        or_dash(draft.remark.as_deref().unwrap_or_default()),
    )
}

#[cfg(test)]
#[path = "tests/steps_tests.rs"]
mod tests;
