//! Per-league output files. Rows are only ever appended.

use crate::models::{MatchRecord, SHEET_HEADER};
use crate::scrapers::traits::RecordSink;
use anyhow::{Context, Result};
use calamine::{open_workbook, Reader, Xlsx};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File stem for a league, keeping it a single path component
pub fn league_file_stem(league: &str) -> String {
    let stem: String = league
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "league".to_string()
    } else {
        stem
    }
}

fn open_append(path: &Path) -> Result<(fs::File, bool)> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let is_new = file.metadata()?.len() == 0;
    Ok((file, is_new))
}

/// Worksheet title for a league: at most 31 characters, none of `[]:*?/\`
pub fn sheet_title(league: &str) -> String {
    let title: String = league
        .trim()
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(31)
        .collect();
    let title = title.trim_matches('\'');
    if title.is_empty() {
        "League".to_string()
    } else {
        title.to_string()
    }
}

/// One workbook per league, its single sheet titled after the league.
///
/// The workbook is read back and rewritten on every append, so rows already
/// saved by earlier runs are kept.
pub struct XlsxSheetSink {
    dir: PathBuf,
}

impl XlsxSheetSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, league: &str) -> PathBuf {
        self.dir.join(format!("{}.xlsx", league_file_stem(league)))
    }
}

/// Cell text of the first worksheet, row by row
fn read_sheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).with_context(|| format!("Failed to open workbook {}", path.display()))?;
    let Some(name) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("Failed to read sheet '{name}' of {}", path.display()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

fn write_sheet(path: &Path, title: &str, rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let centered = Format::new().set_align(FormatAlign::Center);
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(title)?;

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            worksheet.write_string_with_format(u32::try_from(r)?, u16::try_from(c)?, value, &centered)?;
        }
    }
    worksheet.autofit();

    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook {}", path.display()))?;
    Ok(())
}

impl RecordSink for XlsxSheetSink {
    fn append(&mut self, league: &str, record: &MatchRecord) -> Result<()> {
        let path = self.path_for(league);
        fs::create_dir_all(&self.dir).with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let mut rows = if path.exists() { read_sheet(&path)? } else { Vec::new() };
        if rows.is_empty() {
            rows.push(SHEET_HEADER.map(str::to_string).to_vec());
            info!("Creating workbook {} with header", path.display());
        }
        rows.push(record.sheet_row().map(str::to_string).to_vec());

        write_sheet(&path, &sheet_title(league), &rows)?;
        debug!("Appended row {} to {}", rows.len() - 1, path.display());
        Ok(())
    }
}

/// One CSV sheet per league with a fixed header
pub struct CsvSheetSink {
    dir: PathBuf,
}

impl CsvSheetSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, league: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", league_file_stem(league)))
    }
}

impl RecordSink for CsvSheetSink {
    fn append(&mut self, league: &str, record: &MatchRecord) -> Result<()> {
        let path = self.path_for(league);
        let (file, is_new) = open_append(&path)?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(SHEET_HEADER)?;
            info!("Created sheet {} with header", path.display());
        }
        writer.write_record(record.sheet_row())?;
        writer.flush()?;

        debug!("Appended row to {}", path.display());
        Ok(())
    }
}

/// Full records, one JSON object per line, next to the sheets
pub struct JsonLinesSink {
    dir: PathBuf,
}

impl JsonLinesSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, league: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", league_file_stem(league)))
    }
}

impl RecordSink for JsonLinesSink {
    fn append(&mut self, league: &str, record: &MatchRecord) -> Result<()> {
        let path = self.path_for(league);
        let (mut file, _) = open_append(&path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}").with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Forwards each record to every inner sink, stopping at the first failure
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn RecordSink + Send>>,
}

impl SinkSet {
    pub fn with(mut self, sink: impl RecordSink + Send + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl RecordSink for SinkSet {
    fn append(&mut self, league: &str, record: &MatchRecord) -> Result<()> {
        for sink in &mut self.sinks {
            sink.append(league, record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchLink, Preview, ScorePrediction, XgStatistics};
    use chrono::Utc;

    fn record(home: &str) -> MatchRecord {
        MatchRecord {
            league: "La Liga".to_string(),
            gameweek: 5,
            link: MatchLink("https://xgscore.io/match/1".to_string()),
            preview: Preview {
                team_home: Some(home.to_string()),
                winner: Some("Sevilla, (High)".to_string()),
                ..Default::default()
            },
            match_score_prediction: ScorePrediction {
                home: Some("2".to_string()),
                away: None,
            },
            xg_statistics: XgStatistics::default(),
            scraped_at: Utc::now(),
        }
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn header_is_written_once_and_rows_append() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSheetSink::new(dir.path());

        sink.append("La Liga", &record("Sevilla")).unwrap();
        sink.append("La Liga", &record("Sevilla")).unwrap();

        let rows = read_rows(&sink.path_for("La Liga"));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], SHEET_HEADER.map(str::to_string).to_vec());
        assert_eq!(rows[1], rows[2]);
        assert_eq!(rows[1].len(), 24);
        assert_eq!(rows[1][0], "Sevilla");
        assert_eq!(rows[1][2], "Sevilla, (High)");
        assert_eq!(rows[1][18], "2");
        assert_eq!(rows[1][19], "");
    }

    #[test]
    fn leagues_get_separate_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSheetSink::new(dir.path().join("out"));

        sink.append("La Liga", &record("Sevilla")).unwrap();
        sink.append("Serie A", &record("Roma")).unwrap();

        assert_eq!(read_rows(&sink.path_for("La Liga")).len(), 2);
        assert_eq!(read_rows(&sink.path_for("Serie A"))[1][0], "Roma");
    }

    #[test]
    fn league_names_stay_inside_the_output_dir() {
        assert_eq!(league_file_stem("Spain / La Liga"), "Spain _ La Liga");
        assert_eq!(league_file_stem(".."), "league");
        assert_eq!(league_file_stem("  "), "league");
    }

    #[test]
    fn json_lines_carry_the_full_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut sinks = SinkSet::default()
            .with(CsvSheetSink::new(dir.path()))
            .with(JsonLinesSink::new(dir.path()));

        sinks.append("La Liga", &record("Sevilla")).unwrap();

        let raw = fs::read_to_string(JsonLinesSink::new(dir.path()).path_for("La Liga")).unwrap();
        let value: serde_json::Value = serde_json::from_str(raw.trim()).unwrap();
        assert_eq!(value["link"], "https://xgscore.io/match/1");
        assert_eq!(value["preview"]["team_home"], "Sevilla");
        assert!(value["preview"].get("team_away").is_none());
        assert!(dir.path().join("La Liga.csv").exists());
    }

    fn read_workbook(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let workbook: Xlsx<_> = open_workbook(path).unwrap();
        let names = workbook.sheet_names();
        (names, read_sheet(path).unwrap())
    }

    #[test]
    fn workbook_is_titled_after_the_league_and_keeps_earlier_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = XlsxSheetSink::new(dir.path());

        sink.append("La Liga", &record("Sevilla")).unwrap();
        // A fresh sink stands in for a later run against the same output dir.
        XlsxSheetSink::new(dir.path()).append("La Liga", &record("Girona")).unwrap();

        let (names, rows) = read_workbook(&sink.path_for("La Liga"));
        assert_eq!(names, vec!["La Liga".to_string()]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], SHEET_HEADER.map(str::to_string).to_vec());
        assert_eq!(rows[1][0], "Sevilla");
        assert_eq!(rows[2][0], "Girona");
        assert_eq!(rows[2][2], "Sevilla, (High)");
        assert_eq!(rows[2][18], "2");
    }

    #[test]
    fn sheet_titles_respect_worksheet_name_rules() {
        assert_eq!(sheet_title("Spain / La Liga"), "Spain _ La Liga");
        assert_eq!(sheet_title("[Cup]: Round?"), "_Cup__ Round_");
        assert_eq!(sheet_title("'Quoted'"), "Quoted");
        assert_eq!(sheet_title(&"x".repeat(40)).len(), 31);
        assert_eq!(sheet_title("  "), "League");
    }
}
