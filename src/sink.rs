use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::Writer;
use unicode_width::UnicodeWidthStr;

use crate::error::ScrapeError;
use crate::extract::MISSING;
use crate::ListingRecord;

pub const HEADER: [&str; 4] = ["Name", "Phone", "Rating", "Address"];
const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Written { path: PathBuf, rows: usize },
    Empty,
}

/// Records in the order they were found on the page.
#[derive(Debug, Default)]
pub struct RecordSink {
    records: Vec<ListingRecord>,
}

impl RecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ListingRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the CSV, or nothing at all when no listing made it through.
    pub fn finish(&self, path: &Path) -> Result<SinkOutcome, ScrapeError> {
        if self.records.is_empty() {
            return Ok(SinkOutcome::Empty);
        }
        write_to_csv(&self.records, File::create(path)?)?;
        Ok(SinkOutcome::Written {
            path: path.to_owned(),
            rows: self.records.len(),
        })
    }

    /// Column-aligned table of the first few records.
    pub fn preview(&self) -> String {
        let rows: Vec<[String; 4]> = self
            .records
            .iter()
            .take(PREVIEW_ROWS)
            .map(|r| r.cells().map(|cell| cell_or_missing(&cell).to_owned()))
            .collect();

        let mut widths = HEADER.map(|h| h.width());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let mut out = String::new();
        push_row(&mut out, &HEADER.map(str::to_owned), &widths);
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
        out
    }
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{}{}", " ".repeat(pad), cell)
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&line);
    out.push('\n');
}

fn cell_or_missing(cell: &str) -> &str {
    if cell.is_empty() {
        MISSING
    } else {
        cell
    }
}

pub fn write_to_csv<W: Write>(records: &[ListingRecord], out: W) -> Result<(), ScrapeError> {
    let mut writer = Writer::from_writer(out);

    writer.write_record(HEADER)?;

    for record in records {
        let cells = record.cells();
        writer.write_record(cells.iter().map(|cell| cell_or_missing(cell)))?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, phone: &str, rating: &str, address: &str) -> ListingRecord {
        ListingRecord {
            name: name.to_owned(),
            phone: phone.to_owned(),
            rating: rating.to_owned(),
            address: address.to_owned(),
        }
    }

    #[test]
    fn csv_has_header_and_fills_blank_cells() {
        let mut buf = Vec::new();
        let records = [
            record("Sri Balaji Events", "08771234567", "4.5", ""),
            record("Lotus Decor, Tirupati", "Not Available", "N/A", "Main Road"),
        ];
        write_to_csv(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Name,Phone,Rating,Address\n\
             Sri Balaji Events,08771234567,4.5,N/A\n\
             \"Lotus Decor, Tirupati\",Not Available,N/A,Main Road\n"
        );
    }

    #[test]
    fn empty_sink_writes_no_file() {
        let path = std::env::temp_dir().join("jd_sink_empty_never_written.csv");
        let _ = std::fs::remove_file(&path);
        let outcome = RecordSink::new().finish(&path).unwrap();
        assert_eq!(outcome, SinkOutcome::Empty);
        assert!(!path.exists());
    }

    #[test]
    fn preview_shows_at_most_five_rows() {
        let mut sink = RecordSink::new();
        for i in 0..7 {
            sink.push(record(&format!("Vendor No{i}"), "Not Available", "N/A", "N/A"));
        }
        let preview = sink.preview();
        let lines: Vec<_> = preview.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].trim_start().starts_with("Name"));
        assert!(lines[5].contains("Vendor No4"));
        assert!(!preview.contains("Vendor No5"));
    }

    #[test]
    fn preview_right_aligns_by_display_width() {
        let mut sink = RecordSink::new();
        sink.push(record("Café Ünïcode", "08012345678", "5.0", "Tirupati"));
        sink.push(record("Ab Cd", "08012345678", "4.1", "x"));
        let preview = sink.preview();
        let lines: Vec<_> = preview.lines().collect();
        assert_eq!(lines[1].width(), lines[2].width());
        assert!(lines[2].starts_with("       Ab Cd"));
    }
}
