use crate::profile::{Profile, SummaryRow};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datalens_common::Result;
use parquet::arrow::ArrowWriter;
use std::io::Write;
use std::path::Path;
use tracing::info;

fn opt_num(v: Option<f64>) -> String {
    v.map_or("-".into(), |x| format!("{x:.4}"))
}

fn opt_int(v: Option<u64>) -> String {
    v.map_or("-".into(), |x| x.to_string())
}

// --- text summary ---

pub fn write_summary<W: Write>(out: &mut W, profile: &Profile) -> Result<()> {
    writeln!(out, "{:<16} {}", "Rows:", profile.row_count())?;
    writeln!(out, "{:<16} {}", "Columns:", profile.column_count())?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<20} {:<10} {:>7} {:>7} {:>8} {:>12} {:>12} {:>12} {:>12} {:>7} {:<16} {:>6}",
        "column", "type", "nulls", "null%", "count", "mean", "std", "min", "max", "unique", "top", "freq"
    )?;
    for row in profile.summary_rows() {
        writeln!(
            out,
            "{:<20} {:<10} {:>7} {:>6.2}% {:>8} {:>12} {:>12} {:>12} {:>12} {:>7} {:<16} {:>6}",
            row.column,
            row.data_type,
            row.null_values,
            row.null_rate * 100.0,
            row.count,
            opt_num(row.mean),
            opt_num(row.std),
            opt_num(row.min),
            opt_num(row.max),
            opt_int(row.unique),
            row.top.as_deref().unwrap_or("-"),
            opt_int(row.freq),
        )?;
    }
    Ok(())
}

pub fn print_summary(profile: &Profile) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    write_summary(&mut lock, profile)
}

// --- JSON export ---

pub fn write_json<W: Write>(out: W, profile: &Profile, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(out, profile)?;
    } else {
        serde_json::to_writer(out, profile)?;
    }
    Ok(())
}

pub fn export_json(output_path: &Path, profile: &Profile) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_json(std::io::BufWriter::new(file), profile, true)?;
    info!(path = %output_path.display(), "profile written");
    Ok(())
}

// --- CSV export of summary rows ---

fn csv_escape(raw: &str) -> String {
    // wrap in quotes if it contains a comma, quote, or newline
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') || raw.contains('\r') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn csv_num(v: Option<f64>) -> String {
    v.map_or(String::new(), |x| x.to_string())
}

pub fn write_summary_csv<W: Write>(out: &mut W, rows: &[SummaryRow]) -> Result<()> {
    writeln!(out, "column,data_type,null_values,null_rate,count,mean,std,min,max,unique,top,freq")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            csv_escape(&row.column),
            csv_escape(&row.data_type),
            row.null_values,
            row.null_rate,
            row.count,
            csv_num(row.mean),
            csv_num(row.std),
            csv_num(row.min),
            csv_num(row.max),
            row.unique.map_or(String::new(), |u| u.to_string()),
            row.top.as_deref().map(csv_escape).unwrap_or_default(),
            row.freq.map_or(String::new(), |f| f.to_string()),
        )?;
    }
    Ok(())
}

pub fn export_summary_csv(output_path: &Path, profile: &Profile) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(output_path)?);
    write_summary_csv(&mut file, &profile.summary_rows())?;
    file.flush()?;
    info!(path = %output_path.display(), "summary written");
    Ok(())
}

// --- Parquet export of tabular payloads ---

pub fn export_parquet(output_path: &Path, schema: SchemaRef, batches: &[RecordBatch]) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;
    info!(path = %output_path.display(), batches = batches.len(), "parquet written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::profile;
    use crate::table::{Column, Table};

    fn sample_profile() -> Profile {
        let t = Table::new(vec![
            Column::numeric("x", vec![Some(1.0), Some(3.0), None]),
            Column::categorical(
                "label",
                vec![Some("a, b".into()), Some("say \"hi\"".into()), Some("a, b".into())],
            ),
        ])
        .unwrap();
        profile(&t, 2).unwrap()
    }

    #[test]
    fn csv_quotes_and_blanks() {
        let mut buf = Vec::new();
        write_summary_csv(&mut buf, &sample_profile().summary_rows()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("column,data_type"));
        assert_eq!(lines[1], "x,float64,1,0.3333333333333333,2,2,1.4142135623730951,1,3,,,");
        assert_eq!(lines[2], "label,object,0,0,3,,,,,2,\"a, b\",2");
    }

    #[test]
    fn text_summary_lists_every_column() {
        let mut buf = Vec::new();
        write_summary(&mut buf, &sample_profile()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Rows:"));
        assert!(text.lines().any(|l| l.starts_with("x ")));
        assert!(text.lines().any(|l| l.starts_with("label ")));
    }

    #[test]
    fn compact_json_is_single_line() {
        let mut buf = Vec::new();
        write_json(&mut buf, &sample_profile(), false).unwrap();
        assert!(!buf.contains(&b'\n'));
    }
}
