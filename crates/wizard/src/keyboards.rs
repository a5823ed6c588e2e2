use reference_data::ReferenceData;
use shared::domain::OrderItem;

use crate::choice::{Choice, TechRole};
use crate::pagination::{paginate, Page, PAGE_SIZE};
use crate::reply::{truncate_label, Button};

type Rows = Vec<Vec<Button>>;

pub fn segments(data: &ReferenceData) -> Rows {
    data.segments()
        .map(|segment| vec![Button::new(segment, &Choice::Segment(segment.to_string()))])
        .collect()
}

pub fn order_page(data: &ReferenceData, segment: &str, page: usize) -> Rows {
    let window = paginate(data.orders(segment), PAGE_SIZE, page);
    let mut rows = order_buttons(window.items.iter());
    push_nav(&mut rows, &window, |page| Choice::OrderPage {
        segment: segment.to_string(),
        page,
    });
    rows
}

pub fn order_buttons<'a>(items: impl Iterator<Item = &'a OrderItem>) -> Rows {
    items
        .map(|item| {
            vec![Button::new(
                truncate_label(&item.name),
                &Choice::OrderSelect {
                    segment: item.segment.clone(),
                    id: item.id.clone(),
                },
            )]
        })
        .collect()
}

pub fn units(data: &ReferenceData, role: TechRole, page: usize) -> Rows {
    let window = paginate(data.units(), PAGE_SIZE, page);
    let mut rows: Rows = window
        .items
        .iter()
        .map(|unit| {
            vec![Button::new(
                unit.as_str(),
                &Choice::UnitSelect {
                    role,
                    unit: unit.clone(),
                },
            )]
        })
        .collect();
    push_nav(&mut rows, &window, |page| Choice::UnitPage { role, page });
    rows
}

/// Name buttons for the roster indices in `members`. Buttons carry the roster
/// index, so a selection does not depend on the page it was made from.
pub fn technicians(data: &ReferenceData, role: TechRole, members: &[usize], page: usize) -> Rows {
    let window = paginate(members, PAGE_SIZE, page);
    let mut rows: Rows = window
        .items
        .iter()
        .filter_map(|&index| {
            let technician = data.technician(index)?;
            Some(vec![Button::new(
                technician.name.as_str(),
                &Choice::TechSelect { role, index },
            )])
        })
        .collect();
    push_nav(&mut rows, &window, |page| Choice::TechPage { role, page });
    rows
}

pub fn tech2_decide() -> Rows {
    vec![
        vec![Button::new("Tidak ada Teknisi 2", &Choice::Tech2None)],
        vec![Button::new("Pilih Teknisi 2", &Choice::Tech2Pick)],
    ]
}

pub fn confirm() -> Rows {
    vec![
        vec![Button::new("Simpan", &Choice::Save)],
        vec![Button::new("Batal", &Choice::Discard)],
    ]
}

fn push_nav<T>(rows: &mut Rows, window: &Page<'_, T>, to_page: impl Fn(usize) -> Choice) {
    let mut nav = Vec::new();
    if window.has_prev {
        nav.push(Button::new("Prev", &to_page(window.index.saturating_sub(1))));
    }
    if window.has_next {
        nav.push(Button::new("Next", &to_page(window.index + 1)));
    }
    if !nav.is_empty() {
        rows.push(nav);
    }
}
