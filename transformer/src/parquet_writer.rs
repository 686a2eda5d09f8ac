//! Parquet encoding of a one-row [`Table`].
//!
//! Each [`CellValue`] variant maps to one Arrow type. Nested values are
//! written as their compact JSON text in a `Utf8` column tagged with
//! `encoding = json` field metadata. No index column is written.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, NullArray, StringArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;

use crate::error::{Error, Result};
use crate::table::{CellValue, Column, Table};

/// Field metadata key marking a column that holds JSON text.
pub const FIELD_ENCODING_KEY: &str = "encoding";

fn writer_properties() -> WriterProperties {
    let created_by = KeyValue {
        key: "created_by".to_string(),
        value: Some(env!("CARGO_PKG_NAME").to_string()),
    };
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(Some(vec![created_by]))
        .build()
}

fn column_to_arrow(column: &Column) -> Result<(Field, ArrayRef)> {
    let name = column.name.as_str();
    let (field, array): (Field, ArrayRef) = match &column.value {
        CellValue::Null => (
            Field::new(name, DataType::Null, true),
            Arc::new(NullArray::new(1)),
        ),
        CellValue::Boolean(v) => (
            Field::new(name, DataType::Boolean, true),
            Arc::new(BooleanArray::from(vec![*v])),
        ),
        CellValue::Int64(v) => (
            Field::new(name, DataType::Int64, true),
            Arc::new(Int64Array::from(vec![*v])),
        ),
        CellValue::UInt64(v) => (
            Field::new(name, DataType::UInt64, true),
            Arc::new(UInt64Array::from(vec![*v])),
        ),
        CellValue::Float64(v) => (
            Field::new(name, DataType::Float64, true),
            Arc::new(Float64Array::from(vec![*v])),
        ),
        CellValue::Utf8(v) => (
            Field::new(name, DataType::Utf8, true),
            Arc::new(StringArray::from(vec![v.as_str()])),
        ),
        CellValue::Nested(v) => {
            let text = serde_json::to_string(v).map_err(|e| {
                Error::encode(format!("column {name:?}: nested value serialization failed: {e}"))
            })?;
            let metadata = HashMap::from([(FIELD_ENCODING_KEY.to_string(), "json".to_string())]);
            (
                Field::new(name, DataType::Utf8, true).with_metadata(metadata),
                Arc::new(StringArray::from(vec![text])),
            )
        }
    };
    Ok((field, array))
}

/// Builds the single-row Arrow batch for `table`.
///
/// A table with every column dropped still yields a one-row batch with an
/// empty schema.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = table
        .columns()
        .iter()
        .map(column_to_arrow)
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
        .map_err(|e| Error::encode(format!("record batch build failed: {e}")))
}

/// Encodes `table` as a Parquet file.
///
/// # Errors
///
/// Returns `Error::Encode` if the batch cannot be built or the Parquet write
/// fails.
pub fn write_table(table: &Table) -> Result<Bytes> {
    let batch = to_record_batch(table)?;

    let mut cursor = Cursor::new(Vec::<u8>::new());
    let mut writer = ArrowWriter::try_new(&mut cursor, batch.schema(), Some(writer_properties()))
        .map_err(|e| Error::encode(format!("parquet writer init failed: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| Error::encode(format!("parquet write failed: {e}")))?;
    writer
        .close()
        .map_err(|e| Error::encode(format!("parquet close failed: {e}")))?;
    Ok(Bytes::from(cursor.into_inner()))
}

#[cfg(test)]
pub(crate) fn read_single_batch(data: Bytes) -> RecordBatch {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    let mut reader = ParquetRecordBatchReaderBuilder::try_new(data)
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.next().unwrap().unwrap();
    assert!(reader.next().is_none());
    batch
}
