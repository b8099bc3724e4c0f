use colored::*;
use tracing::info;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "steam_hosts::print";

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right)
    )
    .color(colors::SEPARATOR);

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR);
    print(&format!("{}", sep));
}

/// `key.....: value`, keys padded to `width`.
pub fn aligned_line(key: &str, value: ColoredString, width: usize) {
    let dots: String = ".".repeat((width + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    print_status(format!("{}{} {}", key.color(colors::ACCENT), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    print(&format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT)));
}

/// Prints `lines` verbatim so they can be pasted into a hosts file.
pub fn raw_lines<I, S>(lines: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        print(line.as_ref());
    }
}
