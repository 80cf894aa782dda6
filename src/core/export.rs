// CrashSleuth - core/export.rs
//
// Paginated text and JSON export of a finished issue report.
// Core layer: writes to any Write trait object.

use crate::core::model::Channel;
use crate::core::report::{DiagnosisEntry, IssueReport};
use crate::util::constants::PAGE_DIVIDER;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonEntry<'a> {
    text: &'a str,
    add_ons: &'a [String],
}

/// Channels as named fields so they serialise in rendering order.
#[derive(Serialize)]
struct JsonChannels<'a> {
    top_info: Vec<JsonEntry<'a>>,
    error: Vec<JsonEntry<'a>>,
    warning: Vec<JsonEntry<'a>>,
    note: Vec<JsonEntry<'a>>,
    info: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    amount: usize,
    channels: JsonChannels<'a>,
}

fn json_entries(report: &IssueReport, channel: Channel) -> Vec<JsonEntry<'_>> {
    report
        .entries(channel)
        .iter()
        .map(|entry: &DiagnosisEntry| JsonEntry {
            text: &entry.text,
            add_ons: &entry.add_ons,
        })
        .collect()
}

/// The report as delivery pages, exactly as `IssueReport::paginate` lays
/// them out.
pub fn render_pages(report: &IssueReport) -> Vec<String> {
    report.paginate()
}

/// Export a report as a JSON object.
///
/// `target` names the destination in error messages only. Returns the number
/// of primary entries written.
pub fn export_json<W: Write>(
    report: &IssueReport,
    mut writer: W,
    target: &str,
) -> Result<usize, ExportError> {
    let document = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        amount: report.amount(),
        channels: JsonChannels {
            top_info: json_entries(report, Channel::TopInfo),
            error: json_entries(report, Channel::Error),
            warning: json_entries(report, Channel::Warning),
            note: json_entries(report, Channel::Note),
            info: json_entries(report, Channel::Info),
        },
    };

    serde_json::to_writer_pretty(&mut writer, &document).map_err(|e| ExportError::Json {
        target: target.to_string(),
        source: e,
    })?;
    writeln!(writer).map_err(|e| ExportError::Io {
        target: target.to_string(),
        source: e,
    })?;
    Ok(report.amount())
}

/// Write pages for a terminal, separated by a divider line.
///
/// Returns the number of pages written.
pub fn export_text<W: Write>(
    pages: &[String],
    mut writer: W,
    target: &str,
) -> Result<usize, ExportError> {
    let io_err = |e| ExportError::Io {
        target: target.to_string(),
        source: e,
    };

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            writeln!(writer, "{PAGE_DIVIDER}").map_err(io_err)?;
        }
        writer.write_all(page.as_bytes()).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportBuilder;
    use crate::core::strings::StringTable;

    fn sample_report(errors: usize) -> IssueReport {
        let mut table = StringTable::new();
        table.insert("error.boom", "It went boom.");
        table.insert("top_info.headline", "Read this first.");
        table.insert("add.fix", "Try turning it off and on.");

        let mut builder = ReportBuilder::new(&table);
        builder.emit(Channel::TopInfo, "headline", &[]);
        for _ in 0..errors {
            builder.emit(Channel::Error, "boom", &[]);
        }
        builder.add_on_last("fix", &[]);
        builder.finish()
    }

    #[test]
    fn test_json_export_shape() {
        let report = sample_report(2);
        let mut buf = Vec::new();
        let count = export_json(&report, &mut buf, "stdout").unwrap();
        assert_eq!(count, 3);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["amount"], 3);
        assert!(value["generated_at"].is_string());
        let errors = value["channels"]["error"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0]["add_ons"].as_array().unwrap().is_empty());
        assert_eq!(errors[1]["add_ons"].as_array().unwrap().len(), 1);
        assert!(value["channels"]["note"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_channels_in_rendering_order() {
        let mut buf = Vec::new();
        export_json(&IssueReport::default(), &mut buf, "stdout").unwrap();
        let text = String::from_utf8(buf).unwrap();
        let positions: Vec<usize> = ["top_info", "\"error\"", "warning", "\"note\"", "\"info\""]
            .iter()
            .map(|name| text.find(name).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_text_export_divides_pages() {
        let report = sample_report(9);
        let pages = render_pages(&report);
        assert_eq!(pages.len(), 2);

        let mut buf = Vec::new();
        let count = export_text(&pages, &mut buf, "stdout").unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.matches(PAGE_DIVIDER).count(), 1);
        assert!(output.starts_with(&pages[0]));
        assert!(output.ends_with(&pages[1]));
    }

    #[test]
    fn test_text_export_of_empty_report_writes_nothing() {
        let mut buf = Vec::new();
        assert_eq!(export_text(&[], &mut buf, "stdout").unwrap(), 0);
        assert!(buf.is_empty());
    }
}
