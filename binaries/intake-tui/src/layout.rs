//! Screen geometry shared by drawing and mouse hit-testing.
//!
//! Both sides compute positions from the same functions so a click lands on
//! what was drawn at rest. Animation offsets are applied by the renderer only;
//! input is ignored while a transition runs anyway.

use intake_core::{FieldKind, Step};
use intake_wizard::{Scene, Wizard};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

pub const NAV_BACK_WIDTH: u16 = 10;
pub const NAV_FORWARD_WIDTH: u16 = 16;
const CARD_WIDTH: u16 = 76;

/// Fixed regions of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub header: Rect,
    pub progress: Rect,
    pub stage: Rect,
    pub nav: Rect,
    pub footer: Rect,
    pub back: Rect,
    pub forward: Rect,
}

pub fn screen(area: Rect) -> Screen {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Progress
            Constraint::Min(8),    // Question card
            Constraint::Length(3), // Navigation
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let body = chunks[2];
    let width = CARD_WIDTH.min(body.width);
    let stage = Rect {
        x: body.x + (body.width - width) / 2,
        width,
        ..body
    };

    let nav = Rect {
        x: stage.x,
        width: stage.width,
        ..chunks[3]
    };
    let back = Rect {
        x: nav.x,
        width: NAV_BACK_WIDTH.min(nav.width),
        ..nav
    };
    let forward_width = NAV_FORWARD_WIDTH.min(nav.width);
    let forward = Rect {
        x: nav.right().saturating_sub(forward_width),
        width: forward_width,
        ..nav
    };

    Screen {
        header: chunks[0],
        progress: chunks[1],
        stage,
        nav,
        footer: chunks[4],
        back,
        forward,
    }
}

/// One horizontal band of the question card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Title,
    Label { field: String },
    Input { field: String, multiline: bool },
    Choice { field: String, value: String },
    Upload { field: String },
    Gap,
}

impl Row {
    pub fn height(&self) -> u16 {
        match self {
            Self::Title => 2,
            Self::Input { multiline: true, .. } => 6,
            Self::Input { .. } => 3,
            Self::Upload { .. } => 5,
            Self::Label { .. } | Self::Choice { .. } | Self::Gap => 1,
        }
    }

    /// Field the row belongs to, for cues and invalid marks
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Label { field }
            | Self::Input { field, .. }
            | Self::Choice { field, .. }
            | Self::Upload { field } => Some(field),
            Self::Title | Self::Gap => None,
        }
    }
}

pub fn rows(step: &Step) -> Vec<Row> {
    let mut rows = vec![Row::Title, Row::Gap];
    for field in &step.fields {
        let name = field.name.clone();
        match field.kind {
            FieldKind::SingleChoice | FieldKind::MultiChoice => {
                if !field.label.is_empty() {
                    rows.push(Row::Label { field: name.clone() });
                }
                rows.extend(field.choices.iter().map(|choice| Row::Choice {
                    field: name.clone(),
                    value: choice.value.clone(),
                }));
            }
            FieldKind::File => rows.push(Row::Upload { field: name }),
            kind => {
                rows.push(Row::Label { field: name.clone() });
                rows.push(Row::Input {
                    field: name,
                    multiline: kind.is_multiline(),
                });
            }
        }
        rows.push(Row::Gap);
    }
    rows
}

/// Stack rows top to bottom inside the card, at rest.
pub fn place(stage: Rect, rows: Vec<Row>) -> Vec<(Rect, Row)> {
    let inner = card_inner(stage);
    let mut y = inner.y;
    rows.into_iter()
        .map(|row| {
            let rect = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: row.height(),
            };
            y = y.saturating_add(row.height());
            (rect, row)
        })
        .collect()
}

/// Area inside the card border and padding
pub fn card_inner(stage: Rect) -> Rect {
    Rect {
        x: stage.x.saturating_add(3),
        y: stage.y.saturating_add(1),
        width: stage.width.saturating_sub(6),
        height: stage.height.saturating_sub(2),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Choice { field: String, value: String },
    Field(String),
    Upload,
    Back,
    Forward,
}

pub fn hit_test(area: Rect, wizard: &Wizard, column: u16, row: u16) -> Option<Hit> {
    let screen = screen(area);
    let position = Position::new(column, row);

    if wizard.view().nav.visible {
        if screen.back.contains(position) {
            return Some(Hit::Back);
        }
        if screen.forward.contains(position) {
            return Some(Hit::Forward);
        }
    }

    let Scene::Step(_) = wizard.scene() else {
        return None;
    };
    let step = wizard.active()?;
    let inner = card_inner(screen.stage);
    place(screen.stage, rows(step))
        .into_iter()
        .filter(|(rect, _)| rect.bottom() <= inner.bottom())
        .find(|(rect, _)| rect.contains(position))
        .and_then(|(_, row)| match row {
            Row::Choice { field, value } => Some(Hit::Choice { field, value }),
            Row::Input { field, .. } => Some(Hit::Field(field)),
            Row::Upload { .. } => Some(Hit::Upload),
            Row::Title | Row::Label { .. } | Row::Gap => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn wizard() -> Wizard {
        Wizard::new(Arc::new(intake_config::reference_registry().unwrap()))
    }

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 40,
    };

    #[test]
    fn test_screen_regions_stack() {
        let screen = screen(AREA);
        assert_eq!(screen.header.y, 0);
        assert_eq!(screen.progress.y, 3);
        assert_eq!(screen.stage.y, 4);
        assert_eq!(screen.stage.width, CARD_WIDTH);
        assert_eq!(screen.footer.y, 39);
        assert_eq!(screen.back.y, screen.nav.y);
        assert_eq!(screen.forward.right(), screen.nav.right());
    }

    #[test]
    fn test_text_step_rows() {
        let wizard = wizard();
        let rows = rows(wizard.active().unwrap());
        assert_eq!(
            rows,
            vec![
                Row::Title,
                Row::Gap,
                Row::Label {
                    field: "email".into()
                },
                Row::Input {
                    field: "email".into(),
                    multiline: false
                },
                Row::Gap,
            ]
        );
    }

    #[test]
    fn test_click_lands_on_choice() {
        let mut wizard = wizard();
        wizard.jump_to(2).unwrap();
        wizard.advance_by(intake_wizard::timing::EXIT + intake_wizard::timing::SETTLE);

        let placed = place(screen(AREA).stage, rows(wizard.active().unwrap()));
        let (rect, _) = placed
            .iter()
            .find(|(_, row)| matches!(row, Row::Choice { value, .. } if value == "outlook"))
            .unwrap();

        assert_eq!(
            hit_test(AREA, &wizard, rect.x + 2, rect.y),
            Some(Hit::Choice {
                field: "emailProvider".into(),
                value: "outlook".into()
            })
        );
    }

    #[test]
    fn test_click_on_nav() {
        let wizard = wizard();
        let screen = screen(AREA);
        assert_eq!(
            hit_test(AREA, &wizard, screen.forward.x + 1, screen.forward.y + 1),
            Some(Hit::Forward)
        );
        assert_eq!(hit_test(AREA, &wizard, screen.back.x + 1, screen.back.y), Some(Hit::Back));
        assert_eq!(hit_test(AREA, &wizard, 0, 0), None);
    }
}
