use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::BankId;
use crate::config::MAX_CHAPTER;
use crate::quiz::SessionConfig;
use crate::quiz::session::{MAX_QUESTIONS, MIN_QUESTIONS};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupField {
    Bank,
    Chapter,
    Mode,
    Order,
    QuestionCount,
    LockNext,
    Start,
}

impl SetupField {
    pub const ALL: [SetupField; 7] = [
        SetupField::Bank,
        SetupField::Chapter,
        SetupField::Mode,
        SetupField::Order,
        SetupField::QuestionCount,
        SetupField::LockNext,
        SetupField::Start,
    ];

    fn label(self) -> &'static str {
        match self {
            SetupField::Bank => "Question bank",
            SetupField::Chapter => "Chapter",
            SetupField::Mode => "Mode",
            SetupField::Order => "Question order",
            SetupField::QuestionCount => "Number of questions",
            SetupField::LockNext => "Lock \"Next\" until answered",
            SetupField::Start => "Start / Reset",
        }
    }
}

/// The run parameters being edited before a start or reset.
pub struct SetupForm {
    pub draft: SessionConfig,
    pub selected: usize,
}

impl SetupForm {
    pub fn new(draft: SessionConfig) -> Self {
        Self { draft, selected: 0 }
    }

    pub fn field(&self) -> SetupField {
        SetupField::ALL[self.selected.min(SetupField::ALL.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % SetupField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = if self.selected == 0 {
            SetupField::ALL.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn cycle_forward(&mut self) {
        let field = self.field();
        let draft = &mut self.draft;
        match field {
            SetupField::Bank => draft.bank = cycle_bank(draft.bank, 1),
            SetupField::Chapter => draft.chapter = draft.chapter % MAX_CHAPTER + 1,
            SetupField::Mode => draft.mode = draft.mode.toggled(),
            SetupField::Order => draft.order = draft.order.toggled(),
            SetupField::QuestionCount => {
                draft.question_count = (draft.requested_count() + 1).min(MAX_QUESTIONS);
            }
            SetupField::LockNext => {
                draft.lock_next_until_answered = !draft.lock_next_until_answered;
            }
            SetupField::Start => {}
        }
    }

    pub fn cycle_backward(&mut self) {
        let field = self.field();
        let draft = &mut self.draft;
        match field {
            SetupField::Bank => draft.bank = cycle_bank(draft.bank, BankId::ALL.len() - 1),
            SetupField::Chapter => {
                draft.chapter = if draft.chapter <= 1 {
                    MAX_CHAPTER
                } else {
                    draft.chapter.min(MAX_CHAPTER + 1) - 1
                };
            }
            SetupField::Mode => draft.mode = draft.mode.toggled(),
            SetupField::Order => draft.order = draft.order.toggled(),
            SetupField::QuestionCount => {
                draft.question_count = draft.requested_count().saturating_sub(1).max(MIN_QUESTIONS);
            }
            SetupField::LockNext => {
                draft.lock_next_until_answered = !draft.lock_next_until_answered;
            }
            SetupField::Start => {}
        }
    }

    fn value_text(&self, field: SetupField) -> String {
        let draft = &self.draft;
        match field {
            SetupField::Bank => draft.bank.label().to_string(),
            SetupField::Chapter => draft.chapter.to_string(),
            SetupField::Mode => draft.mode.label().to_string(),
            SetupField::Order => draft.order.label().to_string(),
            SetupField::QuestionCount => draft.requested_count().to_string(),
            SetupField::LockNext => if draft.lock_next_until_answered { "On" } else { "Off" }.to_string(),
            SetupField::Start => String::new(),
        }
    }
}

fn cycle_bank(bank: BankId, step: usize) -> BankId {
    let idx = BankId::ALL.iter().position(|b| *b == bank).unwrap_or(0);
    BankId::ALL[(idx + step) % BankId::ALL.len()]
}

pub struct SetupView<'a> {
    pub form: &'a SetupForm,
    pub error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl Widget for SetupView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Setup ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(SetupField::ALL.len() as u16 * 2),
                Constraint::Min(0),
            ])
            .split(inner);

        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                "chapquiz",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Multiple-choice quiz (A/B/C)",
                Style::default().fg(colors.text_dim()),
            )),
        ])
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let field_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(SetupField::ALL.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
            .split(layout[1]);

        for (i, field) in SetupField::ALL.iter().enumerate() {
            let is_selected = i == self.form.selected;
            let indicator = if is_selected { " > " } else { "   " };
            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });

            let line = if *field == SetupField::Start {
                Line::from(Span::styled(format!("{indicator}[ {} ]", field.label()), label_style))
            } else {
                Line::from(vec![
                    Span::styled(format!("{indicator}{:<28}", field.label()), label_style),
                    Span::styled(
                        format!("< {} >", self.form.value_text(*field)),
                        Style::default().fg(if is_selected {
                            colors.selected()
                        } else {
                            colors.text_dim()
                        }),
                    ),
                ])
            };
            Paragraph::new(line).render(field_layout[i], buf);
        }

        let message = match self.error {
            Some(err) => Line::from(Span::styled(
                format!("  {err}"),
                Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                "  Choose a chapter and press Start / Reset.",
                Style::default().fg(colors.text_dim()),
            )),
        };
        Paragraph::new(message)
            .wrap(Wrap { trim: false })
            .render(layout[2], buf);
    }
}
