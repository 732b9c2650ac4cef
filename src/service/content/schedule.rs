use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use teloxide::utils::markdown::{bold, code_inline, escape};

use super::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub location: Option<String>,
    /// Local time in the schedule's offset.
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
}

impl CalendarEvent {
    fn occurs_on(&self, day: NaiveDate) -> bool {
        let first = self.start.date();
        if !self.all_day {
            return first == day;
        }
        // DTEND of an all-day event is exclusive
        let last = self
            .end
            .map(|end| end.date().pred_opt().unwrap_or(first))
            .unwrap_or(first)
            .max(first);
        first <= day && day <= last
    }
}

/// Extracts events from an iCalendar document. Recurrence rules are not expanded.
pub fn parse_calendar(body: &str, offset: FixedOffset) -> Result<Vec<CalendarEvent>, FetchError> {
    let lines = unfold(body);
    if !lines.iter().any(|line| line.trim() == "BEGIN:VCALENDAR") {
        return Err(FetchError::Parse("not an iCalendar document".to_string()));
    }

    let mut events = Vec::new();
    let mut current: Option<EventBuilder> = None;

    for line in &lines {
        let line = line.trim_end();
        match line {
            "BEGIN:VEVENT" => current = Some(EventBuilder::default()),
            "END:VEVENT" => {
                if let Some(event) = current.take().and_then(|builder| builder.build()) {
                    events.push(event);
                }
            }
            _ => {
                let Some(builder) = current.as_mut() else {
                    continue;
                };
                let Some((name, value)) = line.split_once(':') else {
                    continue;
                };
                let (name, params) = name.split_once(';').unwrap_or((name, ""));

                match name {
                    "SUMMARY" => builder.summary = Some(unescape(value)),
                    "LOCATION" if !value.is_empty() => builder.location = Some(unescape(value)),
                    "DTSTART" => builder.start = parse_moment(params, value, offset),
                    "DTEND" => builder.end = parse_moment(params, value, offset).map(|(end, _)| end),
                    _ => {}
                }
            }
        }
    }

    Ok(events)
}

/// MarkdownV2 listing of the events happening on `day`.
pub fn render_day(events: &[CalendarEvent], day: NaiveDate) -> String {
    let date = escape(&day.format("%d.%m.%Y").to_string());
    let mut todays: Vec<&CalendarEvent> = events.iter().filter(|event| event.occurs_on(day)).collect();

    if todays.is_empty() {
        return t!("schedule.empty", date = date).to_string();
    }

    todays.sort_by_key(|event| (!event.all_day, event.start));

    let mut lines = vec![bold(&t!("schedule.title", date = date))];
    for event in todays {
        let when = if event.all_day {
            escape(&t!("schedule.all_day"))
        } else {
            let span = match event.end {
                Some(end) => format!("{}-{}", event.start.format("%H:%M"), end.format("%H:%M")),
                None => event.start.format("%H:%M").to_string(),
            };
            code_inline(&span)
        };

        let mut line = format!("{} {}", when, escape(&event.summary));
        if let Some(location) = &event.location {
            line.push(' ');
            line.push_str(&escape(&format!("({})", location)));
        }
        lines.push(line);
    }

    lines.join("\n")
}

#[derive(Default)]
struct EventBuilder {
    summary: Option<String>,
    location: Option<String>,
    start: Option<(NaiveDateTime, bool)>,
    end: Option<NaiveDateTime>,
}

impl EventBuilder {
    fn build(self) -> Option<CalendarEvent> {
        let (start, all_day) = self.start?;
        Some(CalendarEvent {
            summary: self.summary.unwrap_or_default(),
            location: self.location,
            start,
            end: self.end,
            all_day,
        })
    }
}

fn unfold(body: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in body.lines() {
        let raw = raw.trim_end_matches('\r');
        match (raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')), lines.last_mut()) {
            (Some(continuation), Some(last)) => last.push_str(continuation),
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// UTC values are shifted into `offset`; floating and TZID values are taken as local.
fn parse_moment(params: &str, value: &str, offset: FixedOffset) -> Option<(NaiveDateTime, bool)> {
    let value = value.trim();

    if (params.contains("VALUE=DATE") && !params.contains("VALUE=DATE-TIME")) || value.len() == 8 {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Some((date.and_hms_opt(0, 0, 0)?, true));
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        let local = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).with_timezone(&offset);
        return Some((local.naive_local(), false));
    }

    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .map(|naive| (naive, false))
}
