use bean::api::{CmdMessage, MessageLevel, NextCard};
use bean::config::BeanConfig;
use bean::model::Card;
use bean::sync::SyncReport;
use chrono::{DateTime, Utc};
use colored::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const STATS_WIDTH: usize = 18;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub fn print_topics(topics: &[String]) {
    if topics.is_empty() {
        println!("No topics found. Run `bean sync` first.");
        return;
    }
    for topic in topics {
        println!("{}", topic);
    }
}

pub fn print_next(next: &NextCard) {
    // The nothing-due case arrives as a message.
    if let NextCard::Due(item) = next {
        println!("{} {}", item.key.yellow(), item.title.bold());
        println!("--------------------------------");
        println!("{}", item.content);
    }
}

pub fn print_report(report: &SyncReport) {
    for (topic, counts) in &report.topics {
        if !counts.changed() {
            continue;
        }
        println!(
            "  {:<20} {} {} {}",
            topic,
            format!("+{}", counts.created).green(),
            format!("~{}", counts.reset).yellow(),
            format!("-{}", counts.deleted).red()
        );
    }
}

pub fn print_cards(cards: &[Card], now: DateTime<Utc>) {
    if cards.is_empty() {
        println!("No cards found.");
        return;
    }

    for card in cards {
        let due = format_due(card.next_rehearsal, now);
        let stats = format!("#{} q{} ef{:.2}", card.attempt, card.quality, card.efactor);
        let available = LINE_WIDTH.saturating_sub(TIME_WIDTH + STATS_WIDTH + 2);
        let key = truncate_to_width(&card.key, available);
        let padding = available.saturating_sub(key.width());

        let due = if card.is_due(now) {
            due.yellow()
        } else {
            due.dimmed()
        };
        println!(
            "  {}{}{:<width$}{}",
            key,
            " ".repeat(padding),
            stats,
            due,
            width = STATS_WIDTH
        );
    }
}

pub fn print_config(config: &BeanConfig) {
    for key in BeanConfig::keys() {
        println!("{} = {}", key, config.get(key).unwrap_or_default());
    }
}

fn format_due(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let formatter = timeago::Formatter::new();
    let text = if at <= now {
        let ago = formatter.convert(now.signed_duration_since(at).to_std().unwrap_or_default());
        format!("due {}", ago)
    } else {
        let until = formatter.convert(at.signed_duration_since(now).to_std().unwrap_or_default());
        format!("in {}", until.trim_end_matches(" ago"))
    };
    format!("{:>width$}", text, width = TIME_WIDTH)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn truncates_wide_keys() {
        assert_eq!(truncate_to_width("abc", 10), "abc");
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("日本語の鍵", 5), "日本…");
    }

    #[test]
    fn due_times_read_both_ways() {
        let now = Utc::now();
        assert!(format_due(now - Duration::days(2), now).contains("due 2 days ago"));
        assert!(format_due(now + Duration::days(3), now).trim().starts_with("in 3 days"));
    }
}
