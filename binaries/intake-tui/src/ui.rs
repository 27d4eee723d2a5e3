//! UI rendering for the intake TUI
//!
//! Everything here is a pure function of [`App`]; positions come from
//! [`crate::layout`] so mouse hit-testing agrees with what is on screen.

use crate::app::App;
use crate::layout::{self, Row, Screen};
use crate::theme::ThemePalette;
use intake_core::{FieldKind, FieldSpec, Step};
use intake_wizard::{CueKind, CueTarget, Focus, Motion, Notice, Phase, Scene, Wizard};
use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Padding, Paragraph, Wrap},
    Frame,
};

/// Rows a scene travels while sliding in or out
const SLIDE_ROWS: f32 = 6.0;
/// Horizontal offsets of the attention shake, sampled over its lifetime
const SHAKE: [i32; 9] = [0, -2, 2, -2, 2, -1, 1, -1, 0];

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let palette = app.theme.palette();

    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base_style()), area);

    let screen = layout::screen(area);
    render_header(frame, app, &palette, screen.header);
    render_progress(frame, &app.wizard, &palette, screen.progress);

    match app.wizard.scene() {
        Scene::Step(_) => render_question(frame, app, &palette, screen.stage),
        Scene::Completion => render_completion(frame, &app.wizard, &palette, screen.stage),
    }

    render_nav(frame, &app.wizard, &palette, &screen);
    render_footer(frame, app, &palette, screen.footer);

    if let Some(notice) = &app.wizard.view().notice {
        render_notice(frame, notice, &palette);
    }
    if let Some(path) = &app.picker {
        render_picker(frame, path, &palette);
    }
    if app.show_help {
        render_help_overlay(frame, &palette);
    }
}

fn render_header(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let wizard = &app.wizard;
    let counter = match wizard.scene() {
        Scene::Step(step) => format!("Question {} of {}", step, wizard.registry().len()),
        Scene::Completion => "All done".to_string(),
    };
    let target = if app.dry_run {
        Span::styled("DRY RUN", palette.highlight_style())
    } else {
        Span::styled(app.endpoint.clone(), palette.muted_style())
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "  INTAKE",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(palette.border)),
        Span::styled(counter, Style::default().fg(palette.fg)),
        Span::styled(" | ", Style::default().fg(palette.border)),
        target,
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.border))
            .style(palette.base_style()),
    );
    frame.render_widget(header, area);
}

fn render_progress(frame: &mut Frame, wizard: &Wizard, palette: &ThemePalette, area: Rect) {
    let ratio = f64::from(wizard.view().progress).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.primary).bg(palette.border))
        .ratio(ratio)
        .label(Span::styled(
            format!("{:.0}%", ratio * 100.0),
            Style::default().fg(palette.fg),
        ));
    frame.render_widget(gauge, area);
}

fn render_question(frame: &mut Frame, app: &App, palette: &ThemePalette, stage: Rect) {
    let wizard = &app.wizard;
    let Some(step) = wizard.active() else {
        return;
    };

    let card = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border_style(wizard.accepts_input(), false))
        .style(palette.base_style());
    frame.render_widget(card, stage);

    let inner = layout::card_inner(stage);
    let dy = slide_offset(wizard);
    let mut cursor = None;

    for (rect, row) in layout::place(stage, layout::rows(step)) {
        let dx = row.field().map_or(0, |field| shake_offset(wizard, field));
        let Some(rect) = shift(rect, dx, dy, inner) else {
            continue;
        };
        let spec = row.field().and_then(|field| step.field(field));

        match (&row, spec) {
            (Row::Title, _) => render_title(frame, step, palette, rect),
            (Row::Label { .. }, Some(spec)) => render_label(frame, wizard, spec, palette, rect),
            (Row::Input { .. }, Some(spec)) => {
                if let Some(position) = render_input(frame, wizard, spec, palette, rect) {
                    cursor = Some(position);
                }
            }
            (Row::Choice { value, .. }, Some(spec)) => {
                render_choice(frame, wizard, spec, value, palette, rect)
            }
            (Row::Upload { field }, _) => render_upload(frame, wizard, field, palette, rect),
            _ => {}
        }
    }

    let covered = app.picker.is_some() || app.show_help || wizard.view().notice.is_some();
    if let (Some(position), false) = (cursor, covered) {
        frame.set_cursor_position(position);
    }
}

/// Vertical offset of the scene on stage.
///
/// The outgoing scene leaves in the direction of its exit motion; the incoming
/// one arrives from the opposite side.
fn slide_offset(wizard: &Wizard) -> i32 {
    let progress = wizard.transition_progress();
    let (travel, motion) = match wizard.phase() {
        Phase::Idle => return 0,
        Phase::Exiting { direction, .. } => (progress, direction.exit_motion()),
        Phase::Entering { direction, .. } => (progress - 1.0, direction.exit_motion()),
    };
    let rows = (travel * SLIDE_ROWS).round() as i32;
    match motion {
        Motion::Up => -rows,
        Motion::Down => rows,
    }
}

fn shake_offset(wizard: &Wizard, field: &str) -> i32 {
    let view = wizard.view();
    let now = wizard.now();
    let cue = view
        .cue(&CueTarget::Field(field.to_string()), CueKind::Attention, now)
        .or_else(|| view.cue(&CueTarget::Group(field.to_string()), CueKind::Attention, now));

    cue.map_or(0, |cue| {
        let last = SHAKE.len() - 1;
        let index = (cue.progress(now) * last as f32).round() as usize;
        SHAKE[index.min(last)]
    })
}

/// Move `rect` by the animation offsets, hiding it once it leaves `bounds`.
fn shift(rect: Rect, dx: i32, dy: i32, bounds: Rect) -> Option<Rect> {
    let y = i32::from(rect.y) + dy;
    if y < i32::from(bounds.y) || y + i32::from(rect.height) > i32::from(bounds.bottom()) {
        return None;
    }
    let x = (i32::from(rect.x) + dx).clamp(i32::from(bounds.x), i32::from(bounds.right()));
    let width = (i32::from(bounds.right()) - x).min(i32::from(rect.width)).max(0);

    Some(Rect {
        x: x as u16,
        y: y as u16,
        width: width as u16,
        height: rect.height,
    })
}

fn render_title(frame: &mut Frame, step: &Step, palette: &ThemePalette, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!("{} ", step.index()), palette.primary_style()),
        Span::styled("→ ", palette.primary_style()),
        Span::styled(
            step.title.clone(),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(title).wrap(Wrap { trim: true }), area);
}

fn render_label(frame: &mut Frame, wizard: &Wizard, spec: &FieldSpec, palette: &ThemePalette, area: Rect) {
    let view = wizard.view();
    let invalid =
        view.is_field_invalid(&spec.name) || view.is_group_invalid(&spec.name, wizard.now());

    let mut spans = vec![Span::styled(spec.label.clone(), palette.muted_style())];
    if spec.required {
        spans.push(Span::styled(" *", palette.error_style()));
    }
    if invalid {
        spans.push(Span::styled(
            format!("  {}", invalid_hint(spec.kind)),
            palette.error_style(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn invalid_hint(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Email => "enter a valid email address",
        FieldKind::Number => "enter a whole number",
        FieldKind::SingleChoice => "pick an option",
        FieldKind::MultiChoice => "pick at least one option",
        _ => "this answer is required",
    }
}

/// Draws a text input and returns where the cursor belongs when it has focus.
fn render_input(
    frame: &mut Frame,
    wizard: &Wizard,
    spec: &FieldSpec,
    palette: &ThemePalette,
    area: Rect,
) -> Option<Position> {
    let view = wizard.view();
    let focused = view.focus.field() == Some(spec.name.as_str());
    let invalid = view.is_field_invalid(&spec.name);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border_style(focused, invalid));
    let inner = block.inner(area);
    let value = wizard.inputs().text(&spec.name);

    // Only the tail of long answers is shown so the cursor stays visible
    let lines: Vec<String> = if spec.kind.is_multiline() {
        let all: Vec<&str> = value.split('\n').collect();
        let skip = all.len().saturating_sub(usize::from(inner.height.max(1)));
        all[skip..].iter().map(|line| tail(line, inner.width)).collect()
    } else {
        vec![tail(value, inner.width)]
    };

    let text: Vec<Line> = if value.is_empty() {
        vec![Line::from(Span::styled(
            spec.placeholder.clone().unwrap_or_default(),
            palette.muted_style(),
        ))]
    } else {
        lines.iter().map(|line| Line::from(line.clone())).collect()
    };
    frame.render_widget(
        Paragraph::new(text).block(block).style(palette.base_style()),
        area,
    );

    if !focused || inner.width == 0 || inner.height == 0 {
        return None;
    }
    let last = lines.last().map_or(0, |line| line.chars().count());
    let row = lines.len().saturating_sub(1);
    Some(Position::new(
        inner.x + (last as u16).min(inner.width - 1),
        inner.y + (row as u16).min(inner.height - 1),
    ))
}

fn tail(text: &str, width: u16) -> String {
    let keep = usize::from(width.saturating_sub(1));
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(keep)).collect()
}

fn render_choice(
    frame: &mut Frame,
    wizard: &Wizard,
    spec: &FieldSpec,
    value: &str,
    palette: &ThemePalette,
    area: Rect,
) {
    let Some(choice) = spec.choice(value) else {
        return;
    };
    let view = wizard.view();
    let now = wizard.now();

    let chosen = wizard.inputs().is_chosen(&spec.name, value);
    let target = CueTarget::Choice {
        field: spec.name.clone(),
        value: value.to_string(),
    };
    let pressed = view.cue(&target, CueKind::Pressed, now).is_some();
    let invalid = view.is_group_invalid(&spec.name, now);

    let marker = match (spec.kind, chosen) {
        (FieldKind::MultiChoice, true) => "[x]",
        (FieldKind::MultiChoice, false) => "[ ]",
        (_, true) => "(•)",
        (_, false) => "( )",
    };
    let badge_style = if invalid {
        palette.error_style().add_modifier(Modifier::BOLD)
    } else {
        palette.primary_style().add_modifier(Modifier::BOLD)
    };
    let label_style = if pressed {
        palette.pressed_style()
    } else if chosen {
        palette.selection_style()
    } else {
        Style::default().fg(palette.fg)
    };

    let line = Line::from(vec![
        Span::styled(format!("[{}]", choice.key), badge_style),
        Span::raw(" "),
        Span::styled(format!(" {} {} ", marker, choice.display_label()), label_style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_upload(frame: &mut Frame, wizard: &Wizard, field: &str, palette: &ThemePalette, area: Rect) {
    let view = wizard.view();
    let invalid = view.is_field_invalid(field) || view.is_group_invalid(field, wizard.now());
    let file = wizard.inputs().file(field);

    let lines = match file {
        Some(file) => vec![
            Line::from(Span::styled(format!("✓ {}", file.name), palette.success_style())),
            Line::from(Span::styled(
                "Press U or drop another file to replace it",
                palette.muted_style(),
            )),
        ],
        None => vec![
            Line::from(Span::styled(
                "Drop a file here",
                Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("or press U to enter its path", palette.muted_style())),
        ],
    };

    let zone = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(palette.border_style(file.is_some(), invalid))
            .padding(Padding::vertical(1)),
    );
    frame.render_widget(zone, area);
}

fn render_completion(frame: &mut Frame, wizard: &Wizard, palette: &ThemePalette, stage: Rect) {
    let card = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.success))
        .style(palette.base_style());
    frame.render_widget(card, stage);

    let inner = layout::card_inner(stage);
    let rect = Rect {
        y: inner.y + inner.height.saturating_sub(4) / 2,
        height: 4.min(inner.height),
        ..inner
    };
    let Some(rect) = shift(rect, 0, slide_offset(wizard), inner) else {
        return;
    };

    let text = vec![
        Line::from(Span::styled("✓ Thank you!", palette.success_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Your answers have been sent.",
            Style::default().fg(palette.fg),
        )),
        Line::from(Span::styled("Press Ctrl-C to exit.", palette.muted_style())),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), rect);
}

fn render_nav(frame: &mut Frame, wizard: &Wizard, palette: &ThemePalette, screen: &Screen) {
    let view = wizard.view();
    let nav = view.nav;
    if !nav.visible {
        return;
    }

    let back = Paragraph::new("◀ Back")
        .alignment(Alignment::Center)
        .style(palette.button_style(nav.back_enabled, false))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(palette.border_style(false, false)),
        );
    frame.render_widget(back, screen.back);

    let focused = view.focus == Focus::Forward;
    let forward = Paragraph::new(nav.forward_label.text())
        .alignment(Alignment::Center)
        .style(palette.button_style(nav.forward_enabled, focused))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(palette.border_style(focused || nav.forward_enabled, false)),
        );
    frame.render_widget(forward, screen.forward);

    let hint_area = Rect {
        x: screen.back.right(),
        y: screen.nav.y + 1,
        width: screen.forward.x.saturating_sub(screen.back.right()),
        height: 1,
    };
    if nav.forward_enabled {
        frame.render_widget(
            Paragraph::new(Span::styled("press Enter ↵", palette.muted_style()))
                .alignment(Alignment::Right),
            hint_area,
        );
    }
}

fn render_footer(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let wizard = &app.wizard;
    let hints: Vec<(&str, &str)> = if app.picker.is_some() {
        vec![("Enter", "attach"), ("Esc", "cancel")]
    } else if wizard.scene() == Scene::Completion {
        vec![("Ctrl-C", "quit")]
    } else {
        let mut hints = vec![
            ("Enter", "continue"),
            ("Esc", "back"),
            ("Tab", "next field"),
            ("A-G/1-5", "choose"),
        ];
        if wizard.active().and_then(|step| step.file_field()).is_some() {
            hints.push(("U", "attach file"));
        }
        hints.extend([("F1", "help"), ("Ctrl-C", "quit")]);
        hints
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, action)) in hints.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(palette.border)));
        }
        spans.push(Span::styled(key, palette.highlight_style()));
        spans.push(Span::styled(format!(" {}", action), palette.muted_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_notice(frame: &mut Frame, notice: &Notice, palette: &ThemePalette) {
    let area = centered_rect(60, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut text: Vec<Line> = notice
        .message
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(palette.fg))))
        .collect();
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "Press any key to continue",
        palette.muted_style(),
    )));
    let popup = Paragraph::new(text)
        .block(
            Block::default()
                .title(Line::from(vec![
                    Span::raw(" "),
                    Span::styled(
                        notice.title.clone(),
                        palette.error_style().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                ]))
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(palette.border_style(false, true))
                .padding(Padding::new(2, 2, 1, 0))
                .style(Style::default().bg(palette.bg)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, area);
}

fn render_picker(frame: &mut Frame, path: &str, palette: &ThemePalette) {
    let area = centered_rect(64, 6, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled("Attach a file", palette.highlight_style()),
            Span::raw(" "),
        ]))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border_style(true, false))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg));
    let inner = block.inner(area);
    let shown = tail(path, inner.width);

    let text = vec![
        Line::from(Span::styled("Path to the file:", palette.muted_style())),
        Line::from(Span::styled(shown.clone(), Style::default().fg(palette.fg))),
        Line::from(""),
        Line::from(Span::styled("Enter to attach · Esc to cancel", palette.muted_style())),
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);

    if inner.width > 0 && inner.height > 1 {
        let x = (shown.chars().count() as u16).min(inner.width - 1);
        frame.set_cursor_position(Position::new(inner.x + x, inner.y + 1));
    }
}

fn render_help_overlay(frame: &mut Frame, palette: &ThemePalette) {
    let area = centered_rect(60, 18, frame.area());
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(Span::styled("KEYBOARD SHORTCUTS", palette.highlight_style())),
        Line::from(""),
        Line::from(Span::styled("Answering", palette.primary_style())),
        Line::from("  Enter            - Continue (newline in long answers)"),
        Line::from("  Esc              - Previous question"),
        Line::from("  Tab / Shift+Tab  - Move between fields"),
        Line::from("  A-G / 1-5        - Pick the matching option"),
        Line::from("  U                - Attach a file by path"),
        Line::from(""),
        Line::from(Span::styled("Mouse", palette.primary_style())),
        Line::from("  Click options, fields and buttons"),
        Line::from("  Drop a file onto the terminal to attach it"),
        Line::from(""),
        Line::from(Span::styled("General", palette.primary_style())),
        Line::from("  F1 help · F2 theme · Ctrl-C quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Line::from(vec![
                    Span::raw(" "),
                    Span::styled("HELP", palette.highlight_style()),
                    Span::raw(" - Press any key to close "),
                ]))
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(palette.border_style(true, false))
                .padding(Padding::new(2, 2, 1, 0))
                .style(Style::default().bg(palette.bg)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, area);
}
