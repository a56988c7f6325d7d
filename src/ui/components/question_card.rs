use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::{Choice, Question};
use crate::quiz::controller::Feedback;
use crate::ui::theme::Theme;

pub struct QuestionCard<'a> {
    pub question: &'a Question,
    pub selected: Choice,
    /// Practice mode only: set once the question has an answer.
    pub feedback: Option<Feedback>,
    /// Outcome of the answer submitted since the last navigation.
    pub last_outcome: Option<bool>,
    pub theme: &'a Theme,
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Question {} ", self.question.id))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        let mut lines = vec![
            Line::from(Span::styled(
                self.question.text.as_str(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (choice, text) in self.question.options() {
            let is_selected = choice == self.selected;
            let marker = if is_selected { "(*)" } else { "( )" };

            let mut style = Style::default().fg(colors.fg());
            if let Some(fb) = self.feedback {
                if choice == fb.correct {
                    style = style.fg(colors.success());
                } else if choice == fb.chosen {
                    style = style.fg(colors.error());
                }
            }
            if is_selected {
                style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
            }

            lines.push(Line::from(Span::styled(
                format!(" {marker} {choice}) {text}"),
                style,
            )));
        }

        if let Some(fb) = self.feedback {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(" Correct answer: ", Style::default().fg(colors.fg())),
                Span::styled(
                    fb.correct.as_str(),
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("   Your answer: ", Style::default().fg(colors.fg())),
                Span::styled(
                    fb.chosen.as_str(),
                    Style::default()
                        .fg(if fb.is_correct() {
                            colors.success()
                        } else {
                            colors.error()
                        })
                        .add_modifier(Modifier::BOLD),
                ),
            ]));

            if let Some(correct) = self.last_outcome {
                let (text, color) = if correct {
                    (" Correct!", colors.success())
                } else {
                    (" Incorrect", colors.error())
                };
                lines.push(Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )));
            }
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
