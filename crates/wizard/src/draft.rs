use chrono::{DateTime, TimeZone};
use shared::dates::parse_work_date;
use shared::domain::{OrderItem, Submitter};
use shared::protocol::Record;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("draft is not ready: {0} is missing or invalid")]
pub struct IncompleteDraft(pub &'static str);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SecondTechnician {
    #[default]
    Undecided,
    Absent,
    Named(String),
}

impl SecondTechnician {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Undecided | Self::Absent => "",
        }
    }
}

/// Answers collected so far in one work-order session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub segment: Option<String>,
    pub order: Option<OrderItem>,
    pub service_number: Option<String>,
    pub wo_number: Option<String>,
    pub ticket_id: Option<String>,
    pub date_open: Option<String>,
    pub date_close: Option<String>,
    pub technician_1: Option<String>,
    pub technician_2: SecondTechnician,
    pub workzone: Option<String>,
    pub remark: Option<String>,
}

impl Draft {
    pub fn is_submittable(&self) -> bool {
        self.check().is_ok()
    }

    /// Freezes the draft into the record sent to the store.
    pub fn to_record<Tz>(
        &self,
        submitter: &Submitter,
        generated_at: &DateTime<Tz>,
    ) -> Result<Record, IncompleteDraft>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.check()?;
        let order = self.order.as_ref().ok_or(IncompleteDraft("jenis order"))?;
        Ok(Record {
            timestamp: generated_at.to_rfc3339(),
            submitter_user_id: submitter.user_id.to_string(),
            submitter_username: submitter.username_or_empty().to_string(),
            segment: required(&self.segment, "segment")?,
            jenis_order: order.name.clone(),
            bobot: order.weight,
            service_number: required(&self.service_number, "service number")?,
            wo_number: required(&self.wo_number, "WO number")?,
            ticket_id: required(&self.ticket_id, "ticket id")?,
            tanggal_open: required(&self.date_open, "tanggal open")?,
            tanggal_close: required(&self.date_close, "tanggal close")?,
            teknisi_1: required(&self.technician_1, "teknisi 1")?,
            teknisi_2: self.technician_2.display_name().to_string(),
            workzone: required(&self.workzone, "workzone")?,
            keterangan: self.remark.clone().unwrap_or_default(),
        })
    }

    fn check(&self) -> Result<(), IncompleteDraft> {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
        let checks = [
            (present(&self.segment), "segment"),
            (self.order.is_some(), "jenis order"),
            (present(&self.service_number), "service number"),
            (present(&self.wo_number), "WO number"),
            (present(&self.ticket_id), "ticket id"),
            (
                self.date_open.as_deref().and_then(parse_work_date).is_some(),
                "tanggal open",
            ),
            (
                self.date_close.as_deref().and_then(parse_work_date).is_some(),
                "tanggal close",
            ),
            (present(&self.technician_1), "teknisi 1"),
            (
                self.technician_2 != SecondTechnician::Undecided,
                "teknisi 2",
            ),
            (present(&self.workzone), "workzone"),
        ];
        match checks.into_iter().find(|(ok, _)| !ok) {
            Some((_, field)) => Err(IncompleteDraft(field)),
            None => Ok(()),
        }
    }
}

fn required(field: &Option<String>, name: &'static str) -> Result<String, IncompleteDraft> {
    field.clone().ok_or(IncompleteDraft(name))
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use shared::domain::UserKey;

    use super::*;

    fn complete() -> Draft {
        Draft {
            segment: Some("Corrective".into()),
            order: Some(OrderItem {
                id: "Corrective:0".into(),
                name: "Ganti ONT".into(),
                weight: 5.0,
                segment: "Corrective".into(),
            }),
            service_number: Some("INET123".into()),
            wo_number: Some("WO1".into()),
            ticket_id: Some("TCK1".into()),
            date_open: Some("01-01-2024 08:00:00".into()),
            date_close: Some("01-01-2024 10:00:00".into()),
            technician_1: Some("Budi".into()),
            technician_2: SecondTechnician::Absent,
            workzone: Some("Jaksel".into()),
            remark: None,
        }
    }

    fn generated_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-01T10:05:00+07:00").expect("timestamp")
    }

    #[test]
    fn complete_draft_becomes_record() {
        let submitter = Submitter::new(UserKey(42), None);
        let record = complete()
            .to_record(&submitter, &generated_at())
            .expect("record");
        assert_eq!(record.bobot, 5.0);
        assert_eq!(record.teknisi_2, "");
        assert_eq!(record.keterangan, "");
        assert_eq!(record.submitter_user_id, "42");
        assert_eq!(record.submitter_username, "");
        assert_eq!(record.timestamp, "2024-01-01T10:05:00+07:00");
    }

    #[test]
    fn undecided_second_technician_blocks_submission() {
        let mut draft = complete();
        draft.technician_2 = SecondTechnician::Undecided;
        assert!(!draft.is_submittable());
        assert_eq!(
            draft.to_record(&Submitter::new(UserKey(1), None), &generated_at()),
            Err(IncompleteDraft("teknisi 2"))
        );
    }

    #[test]
    fn invalid_date_blocks_submission() {
        let mut draft = complete();
        draft.date_close = Some("kemarin".into());
        assert_eq!(
            draft.to_record(&Submitter::new(UserKey(1), None), &generated_at()),
            Err(IncompleteDraft("tanggal close"))
        );
    }

    #[test]
    fn named_second_technician_is_kept() {
        let mut draft = complete();
        draft.technician_2 = SecondTechnician::Named("Siti".into());
        draft.remark = Some("kabel putus".into());
        let record = draft
            .to_record(
                &Submitter::new(UserKey(7), Some("siti_ta".into())),
                &generated_at(),
            )
            .expect("record");
        assert_eq!(record.teknisi_2, "Siti");
        assert_eq!(record.keterangan, "kabel putus");
        assert_eq!(record.submitter_username, "siti_ta");
    }
}
