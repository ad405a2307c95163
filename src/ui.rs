use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const TITLE: &str = "등록금이 살살 녹는다 🍦";
const USED_LABEL: &str = "지금까지 사용된 등록금";
const REMAIN_LABEL: &str = "남은 등록금";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let meter = &self.meter;

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let magenta_style = Style::default().fg(Color::Magenta);
        let hint_style = Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // title
                    Constraint::Length(2), // tag line
                    Constraint::Length(3), // gauge
                    Constraint::Length(4), // used/remaining pills
                    Constraint::Length(1), // tuition line
                    Constraint::Length(2), // schedule + rate hints
                    Constraint::Length(1),
                    Constraint::Length(2), // footer / edit bar
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(area);

        let title = Paragraph::new(Span::styled(TITLE, bold_style)).alignment(Alignment::Center);
        title.render(chunks[0], buf);

        // The tag line and pills show placeholders until the first tick has
        // produced a measurement.
        let snap = meter.snapshot();

        let tag_line = match snap {
            Some(snap) => {
                let mut spans = vec![
                    Span::styled(snap.pct_text.as_str(), bold_style),
                    Span::raw(" 만큼 사용 중 • "),
                    Span::raw(snap.time_left_text.as_str()),
                ];
                if snap.current.is_some() {
                    spans.push(Span::styled(
                        " • 수업 진행 중",
                        Style::default().fg(Color::Green).patch(bold_style),
                    ));
                }
                Line::from(spans)
            }
            None => Line::from(vec![
                Span::styled("0%", bold_style),
                Span::raw(" 만큼 사용 중 • "),
                Span::styled("남은 수업시간 계산 중…", dim_style),
            ]),
        };
        Paragraph::new(tag_line)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        let (ratio, gauge_label) = match snap {
            Some(snap) => (snap.ratio, snap.pct_text.clone()),
            None => (0.0, "—".to_string()),
        };
        Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(magenta_style)
            .ratio(ratio)
            .label(gauge_label)
            .render(chunks[2], buf);

        let used_value = snap.map_or("—".to_string(), |s| s.used_krw2.clone());
        let remain_value = snap.map_or("—".to_string(), |s| s.remain_krw2.clone());

        // Wide glyphs make byte lengths useless here; lay the pills out by
        // display width and stack them when the terminal is too narrow.
        let pill_width = [USED_LABEL, REMAIN_LABEL]
            .iter()
            .map(|s| s.width())
            .chain([used_value.width(), remain_value.width()])
            .max()
            .unwrap_or(0) as u16
            + 4;
        if area.width >= pill_width * 2 + HORIZONTAL_MARGIN * 2 {
            let pills = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
                .split(chunks[3]);
            render_pill(USED_LABEL, &used_value, pills[0], buf);
            render_pill(REMAIN_LABEL, &remain_value, pills[1], buf);
        } else {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Length(2)].as_ref())
                .split(chunks[3]);
            Paragraph::new(format!("{USED_LABEL}: {used_value}")).render(rows[0], buf);
            Paragraph::new(format!("{REMAIN_LABEL}: {remain_value}")).render(rows[1], buf);
        }

        let tuition_line = Paragraph::new(format!(
            "이번 학기 등록금: {}",
            crate::format::format_krw0(meter.tuition_krw() as f64)
        ))
        .alignment(Alignment::Center);
        tuition_line.render(chunks[4], buf);

        if let Some(snap) = snap {
            let hints = Paragraph::new(vec![
                Line::from(Span::styled(snap.schedule_text.clone(), hint_style)),
                Line::from(Span::styled(snap.rate_text.clone(), hint_style)),
            ])
            .alignment(Alignment::Center);
            hints.render(chunks[5], buf);
        }

        match self.state {
            AppState::EditTuition => {
                let edit = Paragraph::new(vec![
                    Line::from(vec![
                        Span::raw("등록금 입력: "),
                        Span::styled(format!("{}█", self.edit.buffer), bold_style),
                    ]),
                    Line::from(Span::styled("(enter) 저장 (esc) 취소", hint_style)),
                ])
                .alignment(Alignment::Center);
                edit.render(chunks[7], buf);
            }
            _ => {
                let mut lines = Vec::new();
                if let Some(snap) = snap {
                    lines.push(Line::from(Span::styled(snap.end_hint.clone(), dim_style)));
                }
                lines.push(Line::from(Span::styled(
                    "(t) 등록금 입력 (r) 초기화 (s) 수업 목록 (esc) 종료",
                    hint_style,
                )));
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(chunks[7], buf);
            }
        }
    }
}

fn render_pill(label: &str, value: &str, area: Rect, buf: &mut Buffer) {
    let pill = Paragraph::new(Span::styled(
        value.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().borders(Borders::ALL).title(label.to_string()))
    .alignment(Alignment::Center);
    pill.render(area, buf);
}
