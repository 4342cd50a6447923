//! Cron schedule handling
//!
//! Five-field expressions follow crontab(5): weekdays are numbered 0-7 with
//! both 0 and 7 meaning Sunday, and when day-of-month and day-of-week are both
//! restricted a day matching either one fires. Six and seven field
//! expressions (with seconds/years) are handed to the `cron` crate unchanged.

use chrono::{DateTime, Local};
use cron::Schedule;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A parsed backup schedule
#[derive(Debug, Clone)]
pub struct CrontabSchedule {
    expression: String,
    /// Fires when any of these fire
    schedules: Vec<Schedule>,
}

impl CrontabSchedule {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Next tick strictly after `after`
    pub fn next_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedules
            .iter()
            .filter_map(|schedule| schedule.after(after).next())
            .min()
    }
}

impl fmt::Display for CrontabSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Parse a cron expression
pub fn parse_schedule(expression: &str) -> Result<CrontabSchedule, cron::error::Error> {
    let schedules = crontab_expressions(expression)
        .iter()
        .map(|expr| Schedule::from_str(expr))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CrontabSchedule {
        expression: expression.trim().to_string(),
        schedules,
    })
}

/// Translate an expression into `cron` crate syntax
///
/// Returns two expressions when crontab would OR the day fields.
fn crontab_expressions(expression: &str) -> Vec<String> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    let &[minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
        return vec![expression.trim().to_string()];
    };

    let weekdays = crontab_weekdays(day_of_week);

    // crontab only ORs when neither day field starts with '*'
    if !day_of_month.starts_with('*') && !day_of_week.starts_with('*') {
        vec![
            format!("0 {} {} {} {} *", minute, hour, day_of_month, month),
            format!("0 {} {} * {} {}", minute, hour, month, weekdays),
        ]
    } else {
        vec![format!("0 {} {} {} {} {}", minute, hour, day_of_month, month, weekdays)]
    }
}

/// Rewrite a crontab day-of-week field as weekday names
///
/// Unparseable fields are returned as-is so the `cron` crate reports them.
fn crontab_weekdays(field: &str) -> String {
    if field == "*" {
        return field.to_string();
    }

    let mut days = BTreeSet::new();
    for item in field.split(',') {
        match expand_weekday_item(item) {
            Some(expanded) => days.extend(expanded),
            None => return field.to_string(),
        }
    }

    days.into_iter()
        .map(|day| WEEKDAY_NAMES[day as usize])
        .collect::<Vec<_>>()
        .join(",")
}

/// Expand `*`, `a`, `a-b`, optionally with `/step`, into days 0-6
fn expand_weekday_item(item: &str) -> Option<Vec<u32>> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step.parse::<usize>().ok().filter(|s| *s > 0)?)),
        None => (item, None),
    };

    let (start, end) = if range == "*" {
        (0, 6)
    } else if let Some((start, end)) = range.split_once('-') {
        (parse_weekday(start)?, parse_weekday(end)?)
    } else {
        let day = parse_weekday(range)?;
        // `a/n` runs from a to the end of the week
        (day, if step.is_some() { 6 } else { day })
    };

    if start > end {
        return None;
    }

    Some(
        (start..=end)
            .step_by(step.unwrap_or(1))
            .map(|day| day % 7)
            .collect(),
    )
}

fn parse_weekday(token: &str) -> Option<u32> {
    if let Ok(day) = token.parse::<u32>() {
        return (day <= 7).then_some(day);
    }

    WEEKDAY_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(token))
        .map(|day| day as u32)
}

/// Next tick strictly after `after`
pub fn next_tick(schedule: &CrontabSchedule, after: &DateTime<Local>) -> Option<DateTime<Local>> {
    schedule.next_after(after)
}

/// Run `pass` at every tick of `schedule`
///
/// Each pass runs to completion before the next tick is computed, so passes
/// never overlap. Returns only if the schedule has no further ticks.
pub fn run_scheduled<F: FnMut()>(schedule: &CrontabSchedule, mut pass: F) {
    loop {
        let now = Local::now();
        let Some(next) = next_tick(schedule, &now) else {
            warn!("Schedule '{}' has no upcoming runs, stopping", schedule);
            return;
        };

        info!("Next backup at {}", next.format("%Y-%m-%d %H:%M:%S"));
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        std::thread::sleep(wait);

        pass();
    }
}
