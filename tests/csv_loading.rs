use std::path::Path;

use ds2bin::ingestion::csv::{load_csv_from_path, load_csv_from_reader};
use ds2bin::ingestion::{load_table, InputFormat};
use ds2bin::types::{ColumnData, DataType};

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes())
}

#[test]
fn load_csv_from_path_infers_column_types() {
    let table = load_csv_from_path("tests/fixtures/people.csv", b',').unwrap();

    assert_eq!(table.row_count(), 4);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["id", "count", "score", "label"]
    );
    assert_eq!(table.columns[0].data, ColumnData::Int64(vec![1, 2, 3, 4]));
    assert_eq!(table.columns[2].data, ColumnData::Float64(vec![0.5, 1.5, 2.0, -1.0]));
    assert_eq!(table.columns[3].data.data_type(), DataType::Utf8);
}

#[test]
fn integer_column_with_missing_cells_becomes_float() {
    let mut rdr = reader("a,b,c\n1,,x\n,2.5,\n3,4,z\n");
    let table = load_csv_from_reader(&mut rdr).unwrap();

    assert_eq!(table.columns[0].data, ColumnData::Float64(vec![1.0, 0.0, 3.0]));
    assert_eq!(table.columns[1].data, ColumnData::Float64(vec![0.0, 2.5, 4.0]));
    assert_eq!(
        table.columns[2].data,
        ColumnData::Utf8(vec!["x".to_string(), String::new(), "z".to_string()])
    );
}

#[test]
fn boolean_and_empty_columns_are_inferred() {
    let mut rdr = reader("flag,blank\ntrue,\nFALSE,\n");
    let table = load_csv_from_reader(&mut rdr).unwrap();

    assert_eq!(table.columns[0].data, ColumnData::Bool(vec![true, false]));
    assert_eq!(table.columns[1].data, ColumnData::Float64(vec![0.0, 0.0]));
}

#[test]
fn values_and_headers_are_trimmed() {
    let mut rdr = reader(" id , name \n 7 , Ada \n");
    let table = load_csv_from_reader(&mut rdr).unwrap();

    assert_eq!(table.index_of("id"), Some(0));
    assert_eq!(table.columns[0].data, ColumnData::Int64(vec![7]));
    assert_eq!(table.columns[1].data, ColumnData::Utf8(vec!["Ada".to_string()]));
}

#[test]
fn ragged_rows_are_rejected() {
    let mut rdr = reader("a,b\n1,2\n3\n");
    let err = load_csv_from_reader(&mut rdr).unwrap_err();
    assert!(matches!(err, ds2bin::ConvertError::Csv(_)));
}

#[test]
fn input_format_is_detected_from_extension() {
    assert_eq!(InputFormat::from_path(Path::new("a.csv")).unwrap(), InputFormat::Csv);
    assert_eq!(InputFormat::from_path(Path::new("a.TSV")).unwrap(), InputFormat::Tsv);
    assert_eq!(InputFormat::from_path(Path::new("a.pq")).unwrap(), InputFormat::Parquet);

    let err = InputFormat::from_path(Path::new("a.dta")).unwrap_err();
    assert!(err.to_string().contains("a.dta"));

    let table = load_table("tests/fixtures/people.csv", None).unwrap();
    assert_eq!(table.columns.len(), 4);
}
