mod common;

use std::io::Cursor;
use std::sync::Arc;

use encoding_rs::WINDOWS_1252;
use rust_decimal::Decimal;
use stream_importer::converters::{BooleanConverter, DecimalConverter, LenientDecimalConverter};
use stream_importer::{CsvCursor, ErrorKind, ImportError, NumberLocale, ReadOutcome, SemanticType, Value};

use common::{TestWorkspace, locale_cursor, semicolon_cursor};

fn header_cursor(data: &str) -> CsvCursor {
    let mut cursor = semicolon_cursor(data);
    cursor.set_header(true);
    cursor
}

#[test]
fn header_without_data_rows() {
    let mut cursor = header_cursor("Test1;Test2;Test3");
    cursor.setup_columns().unwrap();
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
    assert_eq!(cursor.column_definitions().len(), 3);
}

#[test]
fn quoted_header_sets_input_column() {
    let mut cursor = header_cursor("Test1;\"Test2\";Test3");
    cursor.setup_columns().unwrap();
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
    assert_eq!(cursor.column_definitions().len(), 3);
    assert_eq!(cursor.column_definition(1).unwrap().input_column(), "Test2");
}

#[test]
fn trailing_delimiter_does_not_add_a_column() {
    let mut cursor = header_cursor("Test1;Test2;");
    cursor.setup_columns().unwrap();
    assert_eq!(cursor.field_count(), 2);

    let mut quoted = header_cursor("Test1;Test2;\"Test\";");
    quoted.setup_columns().unwrap();
    assert_eq!(quoted.advance().unwrap(), ReadOutcome::EndOfStream);
    assert_eq!(quoted.field_count(), 3);
}

#[test]
fn empty_header_name_is_rejected() {
    let mut cursor = header_cursor(";Test2;Test3");
    let err = cursor.setup_columns().unwrap_err();
    assert!(matches!(err, ImportError::EmptyColumnName));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(cursor.field_count(), 0);
}

#[test]
fn single_column_header() {
    let mut cursor = header_cursor("Test1");
    cursor.setup_columns().unwrap();
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
    assert_eq!(cursor.field_count(), 1);
}

#[test]
fn unterminated_quote_in_header() {
    let mut cursor = header_cursor("Test1;\"Test");
    let err = cursor.setup_columns().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.to_string(), "Invalid line end");
}

#[test]
fn text_after_closing_quote_in_header() {
    let mut cursor = header_cursor("Test1;\"Test\"text");
    let err = cursor.setup_columns().unwrap_err();
    assert_eq!(err.to_string(), "Wrong character at column 13, expected ';'");
}

#[test]
fn blank_line_after_header_ends_stream() {
    let mut cursor = header_cursor("Test1;Test2;\"Test\";\n\n");
    cursor.setup_columns().unwrap();
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
    assert_eq!(cursor.field_count(), 3);
}

#[test]
fn reads_single_data_row() {
    let mut cursor = header_cursor("Test1;Test2;\"Test\";\nData1;Data2;Data3\n");
    cursor.setup_columns().unwrap();
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
}

#[test]
fn blank_line_hides_following_rows() {
    let mut cursor = header_cursor("Test1;Test2;\"Test\";\n\nData1;Data2;Data3\n");
    cursor.setup_columns().unwrap();
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
    assert!(cursor.is_closed());
}

#[test]
fn whitespace_only_line_ends_stream() {
    let mut cursor = header_cursor("Test1;Test2\nData1;Data2\n   \t\nData3;Data4\n");
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.row().unwrap(), ["Data1", "Data2"]);
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
    assert!(cursor.is_closed());
    assert_eq!(cursor.advance().unwrap_err().kind(), ErrorKind::StreamState);
}

#[test]
fn read_after_end_of_stream_fails() {
    let mut cursor = header_cursor("Test1;Test2;\"Test\";\n\nData1;Data2;Data3\n");
    cursor.setup_columns().unwrap();
    assert_eq!(cursor.advance().unwrap(), ReadOutcome::EndOfStream);
    let err = cursor.advance().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StreamState);
    assert_eq!(err.to_string(), "Cannot read from closed stream");
}

#[test]
fn short_rows_are_padded() {
    let mut cursor = header_cursor("Test1;Test2;\"Test\";\nData1;Data2\n");
    cursor.setup_columns().unwrap();
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.get_value(2).unwrap(), Value::from(""));
    assert_eq!(cursor.row().unwrap().len(), 3);
}

#[test]
fn long_rows_are_truncated() {
    let mut cursor = header_cursor("Test1;Test2;\"Test\";\nData1;Data2;Data3;Data4\n");
    cursor.setup_columns().unwrap();
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.get_value(0).unwrap(), Value::from("Data1"));
    assert_eq!(cursor.get_value(1).unwrap(), Value::from("Data2"));
    assert_eq!(cursor.get_value(2).unwrap(), Value::from("Data3"));
    let err = cursor.get_value(3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
}

#[test]
fn reads_every_row_then_ends() {
    let mut cursor = header_cursor(
        "Test1;Test2;\"Test\";\nData1;Data2;Data3\nData1;Data2;Data3\nData1;Data2;Data3\n",
    );
    cursor.setup_columns().unwrap();
    let mut rows = 0;
    while cursor.advance().unwrap().is_row() {
        rows += 1;
    }
    assert_eq!(rows, 3);
}

#[test]
fn header_is_read_on_first_advance_without_setup() {
    let mut cursor = header_cursor("Test1;Test3;\"Test\";\nData1;Data2;Data3\n");
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.field_count(), 3);
    assert_eq!(cursor.get_ordinal("Test").unwrap(), 2);
}

#[test]
fn decimal_column_with_invariant_locale() {
    let mut cursor =
        header_cursor("Test1;Test3;\"Test\";\nData1;Data2;1.0\nData1;Data2;2.0\nData1;Data2\nData1;Data2;2.43\n");
    cursor.setup_columns().unwrap();
    cursor.set_data_type("Test", Arc::new(DecimalConverter)).unwrap();
    let expected = [
        Decimal::new(10, 1),
        Decimal::new(20, 1),
        Decimal::ZERO,
        Decimal::new(243, 2),
    ];
    for amount in expected {
        assert!(cursor.advance().unwrap().is_row());
        assert_eq!(cursor.get_value(2).unwrap(), Value::Decimal(amount));
    }
}

#[test]
fn decimal_column_with_swiss_locale() {
    let locale = NumberLocale::de_ch();
    let mut cursor = locale_cursor(
        "Test1;Test3;\"Test\";\nData1;Data2;1.0\nData1;Data2;1'002.0\nData1;Data2\nData1;Data2;2.43\n",
        locale,
    );
    assert_eq!(cursor.delimiter(), ';');
    cursor.set_header(true);
    cursor.setup_columns().unwrap();
    cursor.set_data_type("Test", Arc::new(DecimalConverter)).unwrap();
    let expected = [
        Decimal::new(10, 1),
        Decimal::new(10020, 1),
        Decimal::ZERO,
        Decimal::new(243, 2),
    ];
    for amount in expected {
        assert!(cursor.advance().unwrap().is_row());
        assert_eq!(cursor.get_value(2).unwrap(), Value::Decimal(amount));
    }
}

#[test]
fn decimal_column_with_german_locale() {
    let mut cursor = locale_cursor(
        "Test1;Test3;\"Test\";\nData1;Data2;1,0\nData1;Data2;2,0\nData1;Data2\nData1;Data2;2,43\n",
        NumberLocale::de_de(),
    );
    cursor.set_header(true);
    cursor.setup_columns().unwrap();
    cursor.set_data_type("Test", Arc::new(DecimalConverter)).unwrap();
    let expected = [
        Decimal::new(10, 1),
        Decimal::new(20, 1),
        Decimal::ZERO,
        Decimal::new(243, 2),
    ];
    for amount in expected {
        assert!(cursor.advance().unwrap().is_row());
        assert_eq!(cursor.get_value(2).unwrap(), Value::Decimal(amount));
    }
}

#[test]
fn lenient_decimal_accepts_both_conventions() {
    let mut cursor = header_cursor("Amount\n1,5\n1.234,5\n2.5\n");
    cursor.setup_columns().unwrap();
    cursor
        .set_data_type(0usize, Arc::new(LenientDecimalConverter))
        .unwrap();
    let expected = [Decimal::new(15, 1), Decimal::new(12345, 1), Decimal::new(25, 1)];
    for amount in expected {
        assert!(cursor.advance().unwrap().is_row());
        assert_eq!(cursor.get_value(0).unwrap(), Value::Decimal(amount));
    }
}

#[test]
fn explicit_columns_without_header() {
    let mut cursor = semicolon_cursor("Data1;Data2;Data3\nData1;Data2;Data3\nData1;Data2;Data3\n");
    for name in ["Field1", "Field2", "Field3"] {
        cursor.add_column_definition(name, SemanticType::String).unwrap();
    }
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.get_value(0).unwrap(), Value::from("Data1"));
    assert_eq!(cursor.get_value(1).unwrap(), Value::from("Data2"));
    assert_eq!(cursor.get_value(2).unwrap(), Value::from("Data3"));
}

#[test]
fn reading_without_columns_or_header_fails() {
    let mut cursor = semicolon_cursor("Data1;Data2;Data3\n");
    let err = cursor.advance().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(
        err.to_string(),
        "Cannot start reading if columns are not defined until now."
    );
}

#[test]
fn external_close_stops_the_cursor() {
    let mut cursor = semicolon_cursor("Data1;Data2;Data3\nData1;Data2;Data3\n");
    for name in ["Field1", "Field2", "Field3"] {
        cursor.add_column_definition(name, SemanticType::String).unwrap();
    }
    let handle = cursor.close_handle();
    assert!(cursor.advance().unwrap().is_row());
    handle.close();
    assert!(cursor.is_closed());
    let err = cursor.advance().unwrap_err();
    assert_eq!(err.to_string(), "Cannot read from closed stream");
}

#[test]
fn unmapped_type_needs_a_converter() {
    let mut cursor = semicolon_cursor("true\n");
    let err = cursor
        .add_column_definition("flag", SemanticType::Boolean)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot map the following type to ColumnDefinition: Boolean"
    );
    cursor.set_default_converter(SemanticType::Boolean, Arc::new(BooleanConverter));
    cursor.add_column_definition("flag", SemanticType::Boolean).unwrap();
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.get_value_by_name("flag").unwrap(), Value::Boolean(true));
}

#[test]
fn conversion_failure_is_reported_per_value() {
    let mut cursor = semicolon_cursor("abc;1\n");
    cursor.add_column_definition("count", SemanticType::Int32).unwrap();
    cursor.add_column_definition("other", SemanticType::Int32).unwrap();
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.get_value(0).unwrap_err().kind(), ErrorKind::Conversion);
    assert_eq!(cursor.get_value(1).unwrap(), Value::Int32(1));
}

#[test]
fn quoted_fields_keep_delimiters_and_escaped_quotes() {
    let mut cursor = semicolon_cursor("\"a;b\";\"say \"\"hi\"\"\";plain\n");
    for name in ["x", "y", "z"] {
        cursor.add_column_definition(name, SemanticType::String).unwrap();
    }
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.row().unwrap(), ["a;b", "say \"hi\"", "plain"]);
}

#[test]
fn is_null_only_for_ignored_columns() {
    let mut cursor = semicolon_cursor("keep;drop\n");
    cursor.add_column_definition("keep", SemanticType::String).unwrap();
    cursor
        .add_column_definition_with(
            "drop",
            SemanticType::Ignored,
            stream_importer::converters::builtin(SemanticType::Ignored),
        )
        .unwrap();
    assert!(cursor.advance().unwrap().is_row());
    assert!(!cursor.is_null(0).unwrap());
    assert!(cursor.is_null(1).unwrap());
}

#[test]
fn reads_legacy_encoded_files_from_disk() {
    let workspace = TestWorkspace::new();
    let (bytes, _, _) = WINDOWS_1252.encode("Name;Ort\nJürgen;Köln\n");
    let path = workspace.write_bytes("legacy.csv", &bytes);
    let mut cursor = CsvCursor::open(&path, WINDOWS_1252, NumberLocale::de_de()).unwrap();
    cursor.set_header(true);
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.get_value_by_name("Ort").unwrap(), Value::from("Köln"));
}

#[test]
fn crlf_line_endings_are_stripped() {
    let mut cursor = CsvCursor::from_buf_read(Cursor::new("a,b\r\n1,2\r\n"));
    cursor.set_header(true);
    assert!(cursor.advance().unwrap().is_row());
    assert_eq!(cursor.row().unwrap(), ["1", "2"]);
}
