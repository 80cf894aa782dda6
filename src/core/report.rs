// CrashSleuth - core/report.rs
//
// Severity-tiered issue report accumulation and pagination.
// Core layer: pure logic, no I/O.
//
// The page layout produced by `IssueReport::paginate` is consumed by the
// delivery layer as-is and must stay stable.

use crate::core::model::Channel;
use crate::core::strings::{format_template, TemplateStore};
use crate::util::constants;
use serde::Serialize;

/// One primary report entry with its supplemental add-ons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosisEntry {
    pub channel: Channel,

    /// Fully rendered text, glyph included.
    pub text: String,

    /// Rendered add-ons, in the order they were attached. Never counted
    /// toward the report total; always rendered directly after `text`.
    pub add_ons: Vec<String>,
}

/// Identifies a primary entry so add-ons can be attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHandle {
    channel: Channel,
    index: usize,
}

impl EntryHandle {
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// Finished (or in-progress) report: five channels in fixed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueReport {
    channels: [Vec<DiagnosisEntry>; Channel::COUNT],
    amount: usize,
}

impl IssueReport {
    /// Number of primary entries (add-ons excluded).
    pub fn amount(&self) -> usize {
        self.amount
    }

    pub fn has_any(&self) -> bool {
        self.amount > 0
    }

    pub fn entries(&self, channel: Channel) -> &[DiagnosisEntry] {
        &self.channels[channel.index()]
    }

    /// All rendered lines of a channel: each entry followed by its add-ons.
    pub fn rendered_lines(&self, channel: Channel) -> impl Iterator<Item = &str> {
        self.channels[channel.index()].iter().flat_map(|entry| {
            std::iter::once(entry.text.as_str()).chain(entry.add_ons.iter().map(String::as_str))
        })
    }

    /// Split the report into pages of `ENTRIES_PER_PAGE` rendered lines.
    ///
    /// Channels are walked in fixed order and the line counter is cumulative
    /// across channels. Every line ends with a newline; the last top-info
    /// line gets one more.
    pub fn paginate(&self) -> Vec<String> {
        let mut pages: Vec<String> = Vec::new();
        let mut index = 0usize;

        for channel in Channel::all() {
            let lines: Vec<&str> = self.rendered_lines(*channel).collect();
            let last = lines.len().checked_sub(1);

            for (pos, line) in lines.iter().enumerate() {
                let mut rendered = format!("{line}\n");
                if *channel == Channel::TopInfo && Some(pos) == last {
                    rendered.push('\n');
                }

                match pages.last_mut() {
                    Some(page) if index % constants::ENTRIES_PER_PAGE != 0 => {
                        page.push_str(&rendered)
                    }
                    _ => pages.push(rendered),
                }
                index += 1;
            }
        }

        pages
    }
}

/// Accumulates diagnoses into an `IssueReport`, resolving templates through
/// a `TemplateStore`.
pub struct ReportBuilder<'s> {
    store: &'s dyn TemplateStore,
    report: IssueReport,
    last: Option<EntryHandle>,
}

impl<'s> ReportBuilder<'s> {
    pub fn new(store: &'s dyn TemplateStore) -> Self {
        Self {
            store,
            report: IssueReport::default(),
            last: None,
        }
    }

    /// Add a primary entry rendered from template "{channel}.{key}".
    ///
    /// An unknown key renders the key itself.
    pub fn emit(&mut self, channel: Channel, key: &str, args: &[String]) -> EntryHandle {
        let text = self.render(channel.namespace(), key, args);
        let list = &mut self.report.channels[channel.index()];
        list.push(DiagnosisEntry {
            channel,
            text: channel.decorate(&text),
            add_ons: Vec::new(),
        });

        let handle = EntryHandle {
            channel,
            index: list.len() - 1,
        };
        self.report.amount += 1;
        self.last = Some(handle);
        handle
    }

    /// Attach an add-on rendered from template "add.{key}" to `handle`.
    pub fn add_on(&mut self, handle: EntryHandle, key: &str, args: &[String]) {
        let text = self.render(constants::ADD_ON_NAMESPACE, key, args);
        if let Some(entry) = self.report.channels[handle.channel.index()].get_mut(handle.index) {
            entry
                .add_ons
                .push(format!("{}*{text}*", constants::GLYPH_ADD_ON));
        }
    }

    /// Attach an add-on to the most recently emitted entry.
    ///
    /// Returns false (and adds nothing) if nothing has been emitted yet.
    pub fn add_on_last(&mut self, key: &str, args: &[String]) -> bool {
        match self.last {
            Some(handle) => {
                self.add_on(handle, key, args);
                true
            }
            None => {
                tracing::warn!(key, "Add-on requested before any entry was emitted");
                false
            }
        }
    }

    /// True if `channel` already holds an entry whose text, after the
    /// leading glyph token, is exactly the unformatted template for `key`.
    pub fn has(&self, channel: Channel, key: &str) -> bool {
        let namespaced = format!("{}.{key}", channel.namespace());
        let template = self.store.resolve(&namespaced, key);
        self.report.channels[channel.index()]
            .iter()
            .any(|entry| entry.text.split_once(' ').map(|(_, rest)| rest) == Some(template))
    }

    pub fn has_any(&self) -> bool {
        self.report.has_any()
    }

    pub fn amount(&self) -> usize {
        self.report.amount
    }

    pub fn report(&self) -> &IssueReport {
        &self.report
    }

    pub fn finish(self) -> IssueReport {
        self.report
    }

    fn render(&self, namespace: &str, key: &str, args: &[String]) -> String {
        let namespaced = format!("{namespace}.{key}");
        format_template(self.store.resolve(&namespaced, key), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::strings::StringTable;

    fn store() -> StringTable {
        let mut table = StringTable::new();
        table.insert("error.boom", "It went boom.");
        table.insert("error.count", "You have {} problems.");
        table.insert("note.boom", "Noted boom.");
        table.insert("add.guide", "Read the guide for {}.");
        table
    }

    fn no_args() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_empty_report_has_no_values() {
        let table = store();
        let builder = ReportBuilder::new(&table);
        assert!(!builder.has_any());
        assert!(builder.finish().paginate().is_empty());
    }

    #[test]
    fn test_emit_renders_glyph_and_template() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        builder.emit(Channel::Error, "count", &["3".to_string()]);
        let report = builder.finish();
        assert_eq!(
            report.entries(Channel::Error)[0].text,
            format!("{} You have 3 problems.", constants::GLYPH_ERROR)
        );
        assert_eq!(report.amount(), 1);
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        builder.emit(Channel::Info, "raw_key_text", &no_args());
        let report = builder.finish();
        assert!(report.entries(Channel::Info)[0].text.ends_with(" raw_key_text"));
    }

    #[test]
    fn test_add_ons_follow_parent_and_do_not_count() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        let parent = builder.emit(Channel::Error, "boom", &no_args());
        builder.emit(Channel::Error, "count", &["1".to_string()]);
        builder.add_on(parent, "guide", &["Java".to_string()]);
        builder.add_on_last("guide", &["RAM".to_string()]);
        assert_eq!(builder.amount(), 2);

        let pages = builder.finish().paginate();
        assert_eq!(pages.len(), 1);
        let lines: Vec<&str> = pages[0].lines().collect();
        assert!(lines[0].ends_with("It went boom."));
        assert_eq!(
            lines[1],
            format!("{}*Read the guide for Java.*", constants::GLYPH_ADD_ON)
        );
        assert!(lines[2].ends_with("You have 1 problems."));
        assert!(lines[3].contains("RAM"));
    }

    #[test]
    fn test_add_on_before_emit_is_ignored() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        assert!(!builder.add_on_last("guide", &no_args()));
        assert!(!builder.has_any());
    }

    #[test]
    fn test_has_matches_exact_template_in_channel() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        assert!(!builder.has(Channel::Error, "boom"));

        builder.emit(Channel::Note, "boom", &no_args());
        assert!(!builder.has(Channel::Error, "boom"));
        assert!(builder.has(Channel::Note, "boom"));

        builder.emit(Channel::Error, "boom", &no_args());
        builder.emit(Channel::Warning, "other", &no_args());
        assert!(builder.has(Channel::Error, "boom"));

        // Formatted text no longer equals the raw template.
        builder.emit(Channel::Error, "count", &["2".to_string()]);
        assert!(!builder.has(Channel::Error, "count"));
    }

    #[test]
    fn test_nine_entries_fit_one_page_tenth_starts_next() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        for _ in 0..2 {
            builder.emit(Channel::TopInfo, "top", &no_args());
        }
        for _ in 0..3 {
            builder.emit(Channel::Error, "boom", &no_args());
        }
        for _ in 0..4 {
            builder.emit(Channel::Warning, "warn", &no_args());
        }
        let pages = builder.report().paginate();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines().filter(|l| !l.is_empty()).count(), 9);

        builder.emit(Channel::Note, "boom", &no_args());
        let pages = builder.finish().paginate();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], format!("{} Noted boom.\n", constants::GLYPH_NOTE));
    }

    #[test]
    fn test_last_top_info_line_gets_blank_line() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        builder.emit(Channel::Error, "boom", &no_args());
        builder.emit(Channel::TopInfo, "first", &no_args());
        builder.emit(Channel::TopInfo, "second", &no_args());
        let pages = builder.finish().paginate();
        assert_eq!(
            pages[0],
            format!(
                "‼️ **first**\n‼️ **second**\n\n{} It went boom.\n",
                constants::GLYPH_ERROR
            )
        );
    }

    #[test]
    fn test_add_ons_count_toward_page_size() {
        let table = store();
        let mut builder = ReportBuilder::new(&table);
        let handle = builder.emit(Channel::Error, "boom", &no_args());
        for _ in 0..8 {
            builder.add_on(handle, "guide", &no_args());
        }
        builder.emit(Channel::Error, "boom", &no_args());
        let pages = builder.finish().paginate();
        assert_eq!(pages.len(), 2);
        assert!(pages[1].ends_with("It went boom.\n"));
    }
}
