use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::quiz::{MissedQuestion, Score};
use crate::ui::theme::Theme;

pub struct Summary<'a> {
    pub score: Score,
    /// `Some` in exam mode, even when nothing was missed.
    pub missed: Option<Vec<MissedQuestion<'a>>>,
    pub scroll: u16,
    pub theme: &'a Theme,
}

impl Widget for Summary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Finished ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let score_color = if self.score.percent() >= 80.0 {
            colors.success()
        } else if self.score.percent() >= 50.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let headline = Line::from(vec![
            Span::styled("Score: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{} / {}", self.score.correct, self.score.total),
                Style::default().fg(score_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({:.0}%)", self.score.percent()),
                Style::default().fg(colors.text_dim()),
            ),
        ]);
        Paragraph::new(headline)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let unanswered = self.score.total - self.score.answered;
        let detail = format!(
            "Answered {}/{}  ·  Unanswered {}",
            self.score.answered, self.score.total, unanswered
        );
        Paragraph::new(Line::from(Span::styled(
            detail,
            Style::default().fg(colors.text_dim()),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        let Some(missed) = self.missed else {
            return;
        };

        let lines = review_lines(&missed, self.theme);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(layout[2], buf);
    }
}

/// Lines of the exam review list, also used to bound scrolling.
pub fn review_lines(missed: &[MissedQuestion<'_>], theme: &Theme) -> Vec<Line<'static>> {
    let colors = &theme.colors;
    let mut lines: Vec<Line<'static>> = Vec::new();
    if missed.is_empty() {
        lines.push(Line::from(Span::styled(
            " No incorrect answers.",
            Style::default().fg(colors.success()),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Incorrect questions",
            Style::default()
                .fg(colors.error())
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    for entry in missed {
        let q = entry.question;
        lines.push(Line::from(Span::styled(
            format!(" {}. {}", q.id, q.text),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::styled("   Your answer: ", Style::default().fg(colors.fg())),
            Span::styled(entry.chosen.as_str(), Style::default().fg(colors.error())),
            Span::styled("   Correct: ", Style::default().fg(colors.fg())),
            Span::styled(
                entry.correct().as_str(),
                Style::default().fg(colors.success()),
            ),
        ]));
        for (choice, text) in q.options() {
            lines.push(Line::from(Span::styled(
                format!("   {choice}) {text}"),
                Style::default().fg(colors.text_dim()),
            )));
        }
        lines.push(Line::from(""));
    }
    lines
}
