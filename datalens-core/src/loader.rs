use crate::table::{Column, ColumnKind, Table};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Float64Type, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use datalens_common::{DatalensError, LoaderConfig, Result};
use memmap2::Mmap;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Picks the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("parquet") => Ok(TableFormat::Parquet),
            Some(other) => Err(DatalensError::UnsupportedFormat(format!(".{other}"))),
            None => Err(DatalensError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub batch_size: usize,
    pub csv_infer_records: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        (&LoaderConfig::default()).into()
    }
}

impl From<&LoaderConfig> for LoadOptions {
    fn from(cfg: &LoaderConfig) -> Self {
        Self {
            batch_size: cfg.batch_size,
            csv_infer_records: cfg.csv_infer_records,
        }
    }
}

// spellings a data frame reader treats as missing
static RE_NA: OnceLock<Regex> = OnceLock::new();

fn re_na() -> &'static Regex {
    RE_NA.get_or_init(|| {
        Regex::new(
            r"^(|#N/A|#N/A N/A|#NA|-1\.#IND|-1\.#QNAN|-NaN|-nan|1\.#IND|1\.#QNAN|<NA>|N/A|NA|NULL|NaN|None|n/a|nan|null)$",
        )
        .expect("NA pattern is a valid regex")
    })
}

/// Reads a whole file into memory through a read-only mapping.
pub fn read_file_bytes(path: &Path) -> Result<Bytes> {
    let file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Bytes::new());
    }
    let mmap: Mmap = unsafe { Mmap::map(&file)? };
    Ok(Bytes::copy_from_slice(&mmap))
}

/// Decodes `bytes` into Arrow record batches.
pub fn read_batches(
    bytes: Bytes,
    format: TableFormat,
    opts: &LoadOptions,
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    match format {
        TableFormat::Csv => read_csv(bytes, opts),
        TableFormat::Parquet => read_parquet(bytes, opts),
    }
}

fn read_csv(bytes: Bytes, opts: &LoadOptions) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let csv_format = Format::default()
        .with_header(true)
        .with_null_regex(re_na().clone());
    let (schema, _) = csv_format.infer_schema(Cursor::new(bytes.as_ref()), opts.csv_infer_records)?;
    let schema = Arc::new(schema);
    if schema.fields().is_empty() {
        return Ok((schema, Vec::new()));
    }
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(csv_format)
        .with_batch_size(opts.batch_size)
        .build(Cursor::new(bytes.as_ref()))?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

fn read_parquet(bytes: Bytes, opts: &LoadOptions) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(opts.batch_size).build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

pub fn load_batches(path: &Path, opts: &LoadOptions) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let format = TableFormat::from_path(path)?;
    read_batches(read_file_bytes(path)?, format, opts)
}

/// Loads a CSV or Parquet file into a [`Table`]. The extension is checked
/// before the file is opened.
pub fn load_table(path: &Path, opts: &LoadOptions) -> Result<Table> {
    let format = TableFormat::from_path(path)?;
    let bytes = read_file_bytes(path)?;
    let table = load_table_from_bytes(bytes, format, opts)?;
    info!(
        path = %path.display(),
        ?format,
        rows = table.row_count(),
        columns = table.column_count(),
        "table loaded"
    );
    Ok(table)
}

pub fn load_table_from_bytes(bytes: Bytes, format: TableFormat, opts: &LoadOptions) -> Result<Table> {
    let (schema, batches) = read_batches(bytes, format, opts)?;
    table_from_batches(&schema, &batches)
}

pub fn classify(dt: &DataType) -> ColumnKind {
    if dt.is_numeric() {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Type label in data-frame style. [`table_from_batches`] reports integer
/// columns holding nulls as `float64` instead, as a data frame would.
pub fn dtype_label(dt: &DataType) -> String {
    match dt {
        DataType::Int8 => "int8".into(),
        DataType::Int16 => "int16".into(),
        DataType::Int32 => "int32".into(),
        DataType::Int64 => "int64".into(),
        DataType::UInt8 => "uint8".into(),
        DataType::UInt16 => "uint16".into(),
        DataType::UInt32 => "uint32".into(),
        DataType::UInt64 => "uint64".into(),
        DataType::Float16 => "float16".into(),
        DataType::Float32 => "float32".into(),
        DataType::Float64 => "float64".into(),
        DataType::Decimal128(p, s) | DataType::Decimal256(p, s) => format!("decimal({p},{s})"),
        DataType::Boolean => "bool".into(),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "object".into(),
        DataType::Dictionary(_, _) => "category".into(),
        other => other.to_string().to_lowercase(),
    }
}

/// Converts Arrow batches into a [`Table`], classifying each field once.
pub fn table_from_batches(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<Table> {
    let columns = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| -> Result<Column> {
            let arrays: Vec<&ArrayRef> = batches.iter().map(|b| b.column(idx)).collect();
            let dt = field.data_type();
            let column = match classify(dt) {
                ColumnKind::Numeric => Column::numeric(field.name(), numeric_values(field.name(), &arrays)?),
                ColumnKind::Categorical => Column::categorical(field.name(), categorical_values(&arrays)?),
            };
            // integers with missing cells are promoted to float
            let label = if dt.is_integer() && arrays.iter().any(|a| a.null_count() > 0) {
                "float64".to_owned()
            } else {
                dtype_label(dt)
            };
            Ok(column.with_dtype(label))
        })
        .collect::<Result<Vec<_>>>()?;
    Table::new(columns)
}

fn numeric_values(name: &str, arrays: &[&ArrayRef]) -> Result<Vec<Option<f64>>> {
    let mut out = Vec::with_capacity(arrays.iter().map(|a| a.len()).sum());
    let mut nan_count = 0usize;
    for &array in arrays {
        let cast = arrow::compute::cast(array, &DataType::Float64)?;
        for v in cast.as_primitive::<Float64Type>().iter() {
            match v {
                Some(x) if x.is_nan() => {
                    nan_count += 1;
                    out.push(None);
                }
                other => out.push(other),
            }
        }
    }
    if nan_count > 0 {
        warn!(column = name, nan_count, "NaN values read as null");
    }
    Ok(out)
}

fn categorical_values(arrays: &[&ArrayRef]) -> Result<Vec<Option<String>>> {
    let opts = FormatOptions::default();
    let mut out = Vec::with_capacity(arrays.iter().map(|a| a.len()).sum());
    for &array in arrays {
        let formatter = ArrayFormatter::try_new(array.as_ref(), &opts)?;
        // logical nulls also cover NullArray and dictionary-encoded nulls
        let nulls = array.logical_nulls();
        for row in 0..array.len() {
            if nulls.as_ref().is_some_and(|n| n.is_null(row)) {
                out.push(None);
            } else {
                out.push(Some(formatter.value(row).to_string()));
            }
        }
    }
    Ok(out)
}
