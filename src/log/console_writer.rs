use std::{
    borrow::Cow,
    io::{self, IsTerminal, Write},
};

use crate::log::{log_entry::LogEntry, log_level::LogLevel};

const RESET: &str = "\x1b[0m";
const DARK_GRAY: &str = "\x1b[90m";

/// Human-readable renderer attached to a local sink.
///
/// One line per entry: `<time> <LVL> <message> host=<host> module=<module>`.
/// Line breaks inside the message are escaped so an entry never spans lines.
pub struct ConsoleWriter {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl ConsoleWriter {
    /// Renders to stdout, colored only when stdout is a terminal.
    #[must_use]
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self {
            out: Box::new(io::stdout()),
            color,
        }
    }

    /// Renders to an arbitrary destination without color.
    #[must_use]
    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out, color: false }
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn render(&self, entry: &LogEntry<'_>) -> String {
        let ts = entry.timestamp();
        let tag = entry.level.short_tag();
        let message = single_line(entry.message);
        if self.color {
            format!(
                "{DARK_GRAY}{ts}{RESET} {}{tag}{RESET} {} {DARK_GRAY}host={RESET}{} {DARK_GRAY}module={RESET}{}\n",
                level_color(entry.level),
                message,
                entry.host,
                entry.module,
            )
        } else {
            format!(
                "{ts} {tag} {} host={} module={}\n",
                message, entry.host, entry.module
            )
        }
    }

    /// # Errors
    ///
    /// Propagates the destination's write error.
    pub fn write_entry(&mut self, entry: &LogEntry<'_>) -> io::Result<()> {
        let line = self.render(entry);
        self.out.write_all(line.as_bytes())
    }

    /// # Errors
    ///
    /// Propagates the destination's flush error.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn single_line(message: &str) -> Cow<'_, str> {
    if message.contains(['\n', '\r']) {
        Cow::Owned(message.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(message)
    }
}

fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "\x1b[35m",
        LogLevel::Debug => "\x1b[33m",
        LogLevel::Info => "\x1b[32m",
        LogLevel::Warn => "\x1b[31m",
        LogLevel::Error | LogLevel::Fatal => "\x1b[1;31m",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::memory_writer::MemoryWriter;
    use time::macros::datetime;

    fn entry() -> LogEntry<'static> {
        LogEntry {
            level: LogLevel::Info,
            time: datetime!(2024-02-03 04:05:06.7 UTC),
            module: "billing",
            host: "box",
            message: "invoice sent",
        }
    }

    #[test]
    fn plain_line_layout() {
        let mem = MemoryWriter::new();
        let mut console = ConsoleWriter::to_writer(Box::new(mem.clone()));
        console.write_entry(&entry()).unwrap();

        assert_eq!(
            mem.contents_string(),
            "2024-02-03T04:05:06.7Z INF invoice sent host=box module=billing\n"
        );
    }

    #[test]
    fn colored_line_keeps_message() {
        let console = ConsoleWriter::to_writer(Box::new(io::sink())).with_color(true);
        let line = console.render(&entry());
        assert!(line.contains("\x1b[32mINF"));
        assert!(line.contains("invoice sent"));
        assert!(line.ends_with("billing\n"));
    }

    #[test]
    fn multi_line_message_stays_on_one_line() {
        let mem = MemoryWriter::new();
        let mut console = ConsoleWriter::to_writer(Box::new(mem.clone()));
        let mut e = entry();
        e.message = "first\nforged INF line\r\nend";
        console.write_entry(&e).unwrap();

        assert_eq!(
            mem.contents_string(),
            "2024-02-03T04:05:06.7Z INF first\\nforged INF line\\r\\nend host=box module=billing\n"
        );

        let colored = console.with_color(true).render(&e);
        assert_eq!(colored.matches('\n').count(), 1);
        assert!(colored.ends_with("billing\n"));
    }
}
