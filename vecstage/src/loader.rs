use std::fs::File;
use std::path::Path;

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use arrow_array::{Array, ArrayRef, RecordBatch};
use arrow_cast::display::{ArrayFormatter, FormatOptions};
use arrow_schema::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use vecstage_core::{StagedRecord, Value};

use crate::{StagedFrame, StagingError};

const ID_COLUMN: &str = "id";
// pandas persists a non-default index under this prefix.
const PANDAS_INDEX_PREFIX: &str = "__index_level_";

/// Reads a staging file into a frame indexed by `id`.
///
/// Row count is preserved. Duplicate, null or empty ids are errors, as is a
/// file without rows.
pub fn parquet_to_frame(path: impl AsRef<Path>) -> Result<StagedFrame, StagingError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| StagingError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    if schema.field_with_name(ID_COLUMN).is_err() {
        return Err(StagingError::MissingIdColumn);
    }

    let columns: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .filter(|name| name != ID_COLUMN && !name.starts_with(PANDAS_INDEX_PREFIX))
        .collect();

    let mut records = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        read_batch(&batch, &columns, &mut records)?;
    }

    if records.is_empty() {
        return Err(StagingError::EmptyFrame(path.to_path_buf()));
    }

    let frame = StagedFrame::from_records(columns, records)?;
    tracing::debug!(
        path = %path.display(),
        rows = frame.len(),
        columns = frame.columns().len(),
        "loaded staging file"
    );
    Ok(frame)
}

fn read_batch(
    batch: &RecordBatch,
    columns: &[String],
    records: &mut Vec<StagedRecord>,
) -> Result<(), StagingError> {
    let id_array = batch
        .column_by_name(ID_COLUMN)
        .ok_or(StagingError::MissingIdColumn)?;
    let arrays: Vec<(&str, &dyn Array)> = columns
        .iter()
        .filter_map(|name| {
            batch
                .column_by_name(name)
                .map(|array| (name.as_str(), array.as_ref()))
        })
        .collect();

    for row in 0..batch.num_rows() {
        let absolute_row = records.len();
        let id = match cell_to_value(id_array.as_ref(), row)? {
            Value::String(id) => id,
            Value::Null => return Err(StagingError::NullId { row: absolute_row }),
            Value::Number(number) => number.to_string(),
            other => {
                return Err(StagingError::UnsupportedId {
                    row: absolute_row,
                    value: other.to_string(),
                })
            }
        };

        let mut record = StagedRecord::new(id);
        for &(name, array) in &arrays {
            record
                .fields
                .insert(name.to_string(), cell_to_value(array, row)?);
        }
        records.push(record);
    }

    Ok(())
}

/// Converts one Arrow cell to JSON. Non-finite floats become null so that
/// metadata cleaning blanks them like any other missing value.
fn cell_to_value(array: &dyn Array, row: usize) -> Result<Value, StagingError> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    let value = match array.data_type() {
        DataType::Utf8 => Value::String(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(array.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
        DataType::Int8 => Value::from(array.as_primitive::<Int8Type>().value(row)),
        DataType::Int16 => Value::from(array.as_primitive::<Int16Type>().value(row)),
        DataType::Int32 => Value::from(array.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => Value::from(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::from(array.as_primitive::<UInt8Type>().value(row)),
        DataType::UInt16 => Value::from(array.as_primitive::<UInt16Type>().value(row)),
        DataType::UInt32 => Value::from(array.as_primitive::<UInt32Type>().value(row)),
        DataType::UInt64 => Value::from(array.as_primitive::<UInt64Type>().value(row)),
        DataType::Float32 => {
            float_value(f64::from(array.as_primitive::<Float32Type>().value(row)))
        }
        DataType::Float64 => float_value(array.as_primitive::<Float64Type>().value(row)),
        DataType::List(_) => list_value(&array.as_list::<i32>().value(row))?,
        DataType::LargeList(_) => list_value(&array.as_list::<i64>().value(row))?,
        DataType::FixedSizeList(_, _) => list_value(&array.as_fixed_size_list().value(row))?,
        _ => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
            Value::String(formatter.value(row).to_string())
        }
    };
    Ok(value)
}

fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn list_value(values: &ArrayRef) -> Result<Value, StagingError> {
    (0..values.len())
        .map(|idx| cell_to_value(values.as_ref(), idx))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
