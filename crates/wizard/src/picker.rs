use reference_data::ReferenceData;
use shared::error::ValidationError;
use tracing::warn;

use crate::choice::{Choice, TechRole};
use crate::keyboards;
use crate::reply::{step_text, Reply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerStage {
    Unit,
    Name { unit: String, members: Vec<usize> },
}

/// Two-stage technician selection: unit first, then a name from that unit.
/// The same flow fills technician 1, technician 2 and the identity binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechPicker {
    role: TechRole,
    stage: PickerStage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    /// Still picking; show these replies.
    Pending(Vec<Reply>),
    /// A roster index was chosen.
    Picked(usize),
    Rejected(ValidationError),
}

impl TechPicker {
    pub fn new(role: TechRole) -> Self {
        Self {
            role,
            stage: PickerStage::Unit,
        }
    }

    pub fn role(&self) -> TechRole {
        self.role
    }

    pub fn stage(&self) -> &PickerStage {
        &self.stage
    }

    /// Resets to the unit list and renders its first page.
    pub fn unit_prompt(&mut self, data: &ReferenceData) -> Reply {
        self.stage = PickerStage::Unit;
        let (title, instruction) = match self.role {
            TechRole::Primary => ("Teknisi 1 - Pilih Unit", "Pilih unit terlebih dahulu."),
            TechRole::Secondary => ("Teknisi 2 - Pilih Unit", "Pilih salah satu unit di bawah."),
            TechRole::Identity => ("Set Nama Teknisi - Pilih Unit", "Pilih unit kamu."),
        };
        Reply::inline(
            self.header(title, instruction),
            keyboards::units(data, self.role, 0),
        )
    }

    pub fn handle(&mut self, data: &ReferenceData, choice: &Choice) -> PickerOutcome {
        match (&self.stage, choice) {
            (PickerStage::Unit, Choice::UnitPage { role, page }) if *role == self.role => {
                PickerOutcome::Pending(vec![Reply::EditKeyboard(keyboards::units(
                    data, self.role, *page,
                ))])
            }
            (PickerStage::Unit, Choice::UnitSelect { role, unit }) if *role == self.role => {
                if !data.has_unit(unit) {
                    warn!(unit = %unit, "unit not in roster");
                    return PickerOutcome::Rejected(ValidationError::UnknownSelection);
                }
                let members = data.technicians_in_unit(unit);
                let replies = vec![
                    Reply::EditText(format!("Unit terpilih: {unit}")),
                    Reply::inline(
                        self.header(&self.name_title(), &format!("Unit: {unit}")),
                        keyboards::technicians(data, self.role, &members, 0),
                    ),
                ];
                self.stage = PickerStage::Name {
                    unit: unit.clone(),
                    members,
                };
                PickerOutcome::Pending(replies)
            }
            (PickerStage::Name { members, .. }, Choice::TechPage { role, page })
                if *role == self.role =>
            {
                PickerOutcome::Pending(vec![Reply::EditKeyboard(keyboards::technicians(
                    data, self.role, members, *page,
                ))])
            }
            (PickerStage::Name { members, .. }, Choice::TechSelect { role, index })
                if *role == self.role && members.contains(index) =>
            {
                PickerOutcome::Picked(*index)
            }
            _ => PickerOutcome::Rejected(ValidationError::UnknownSelection),
        }
    }

    fn name_title(&self) -> String {
        match self.role {
            TechRole::Primary => "Teknisi 1 - Pilih Nama".to_string(),
            TechRole::Secondary => "Teknisi 2 - Pilih Nama".to_string(),
            TechRole::Identity => "Set Nama Teknisi - Pilih Nama".to_string(),
        }
    }

    // Technician 2 reuses step 9 for both of its sub-steps; the binding flow
    // has no step counter at all.
    fn header(&self, title: &str, instruction: &str) -> String {
        match self.role {
            TechRole::Primary => step_text(8, title, instruction),
            TechRole::Secondary => step_text(9, title, instruction),
            TechRole::Identity => format!("{title}\n{instruction}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use shared::domain::Technician;

    use super::*;
    use crate::reply::Keyboard;

    fn roster() -> ReferenceData {
        let mut technicians = Vec::new();
        for index in 0..12 {
            technicians.push(Technician {
                name: format!("Teknisi {index:02}"),
                unit: "Jaksel".into(),
                labor: None,
            });
        }
        technicians.push(Technician {
            name: "Siti".into(),
            unit: "Jaktim".into(),
            labor: None,
        });
        ReferenceData::from_parts(BTreeMap::new(), technicians)
    }

    fn unit(role: TechRole, unit: &str) -> Choice {
        Choice::UnitSelect {
            role,
            unit: unit.into(),
        }
    }

    #[test]
    fn unit_then_name_yields_roster_index() {
        let data = roster();
        let mut picker = TechPicker::new(TechRole::Primary);
        assert!(matches!(
            picker.handle(&data, &unit(TechRole::Primary, "Jaktim")),
            PickerOutcome::Pending(_)
        ));
        let outcome = picker.handle(
            &data,
            &Choice::TechSelect {
                role: TechRole::Primary,
                index: 12,
            },
        );
        assert_eq!(outcome, PickerOutcome::Picked(12));
    }

    #[test]
    fn name_list_paginates_and_selection_ignores_page() {
        let data = roster();
        let mut picker = TechPicker::new(TechRole::Secondary);
        let PickerOutcome::Pending(replies) =
            picker.handle(&data, &unit(TechRole::Secondary, "Jaksel"))
        else {
            panic!("expected name list");
        };
        let Reply::Send {
            keyboard: Keyboard::Inline(rows),
            ..
        } = &replies[1]
        else {
            panic!("expected inline keyboard");
        };
        // ten names plus a nav row holding only "Next"
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[10][0].data, "TECHPAGE|t2|1");

        let PickerOutcome::Pending(page) = picker.handle(
            &data,
            &Choice::TechPage {
                role: TechRole::Secondary,
                page: 1,
            },
        ) else {
            panic!("expected page");
        };
        assert!(matches!(&page[0], Reply::EditKeyboard(rows) if rows.len() == 3));

        // a button from page 0 is still accepted after paging forward
        assert_eq!(
            picker.handle(
                &data,
                &Choice::TechSelect {
                    role: TechRole::Secondary,
                    index: 3
                }
            ),
            PickerOutcome::Picked(3)
        );
    }

    #[test]
    fn rejects_wrong_role_stage_or_unit() {
        let data = roster();
        let mut picker = TechPicker::new(TechRole::Primary);
        assert_eq!(
            picker.handle(&data, &unit(TechRole::Secondary, "Jaksel")),
            PickerOutcome::Rejected(ValidationError::UnknownSelection)
        );
        assert_eq!(
            picker.handle(&data, &unit(TechRole::Primary, "Bogor")),
            PickerOutcome::Rejected(ValidationError::UnknownSelection)
        );
        let select_siti = Choice::TechSelect {
            role: TechRole::Primary,
            index: 12,
        };
        assert!(matches!(
            picker.handle(&data, &select_siti),
            PickerOutcome::Rejected(_)
        ));

        picker.handle(&data, &unit(TechRole::Primary, "Jaksel"));
        // Siti is not in the chosen unit
        assert!(matches!(
            picker.handle(&data, &select_siti),
            PickerOutcome::Rejected(_)
        ));
    }
}
