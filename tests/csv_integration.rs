mod common;

use std::{error::Error, fs, thread};

use chrono::{DateTime, Datelike, TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Serialize;
use serde_json::json;
use tempfile::NamedTempFile;

use csv_flatten::{
    CsvEncoder,
    core::{
        config::{DataStrategy, DateStrategy, HeaderStrategy, NonConformingFloat, Terminator},
        value::{CsvDate, Value},
    },
};

#[derive(Serialize, Debug, Clone, PartialEq)]
struct Product {
    id: String,
    name: String,
    price: f64,
    description: Option<String>,
    available: bool,
}

fn product(id: &str, name: &str, price: f64, description: Option<&str>) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        description: description.map(str::to_string),
        available: true,
    }
}

#[test]
fn two_records_encode_to_expected_bytes() -> Result<(), Box<dyn Error>> {
    common::init_logger();

    let input = json!([{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bo"}]);
    let bytes = CsvEncoder::default().encode(&input)?;

    assert_eq!(bytes, b"id,name\n1,Ann\n2,Bo\n".to_vec());
    Ok(())
}

#[test]
fn copies_of_one_record_decode_column_by_column() -> Result<(), Box<dyn Error>> {
    let record = product("P001", "Wireless Headphones", 79.99, Some("Noise-cancelling"));
    let records = vec![record.clone(); 5];

    let bytes = CsvEncoder::default().encode(&records)?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
    let headers = reader.headers()?.clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["id", "name", "price", "description", "available"]
    );

    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), 5);
    for row in rows {
        assert_eq!(&row[0], "P001");
        assert_eq!(&row[1], "Wireless Headphones");
        assert_eq!(row[2].parse::<f64>()?, 79.99);
        assert_eq!(&row[3], "Noise-cancelling");
        assert_eq!(&row[4], "true");
    }
    Ok(())
}

#[test]
fn encoding_is_deterministic() -> Result<(), Box<dyn Error>> {
    let records = vec![
        product("P001", "Headphones", 79.99, None),
        product("P002", "USB-C Cable", 12.99, Some("1m")),
    ];
    let encoder = CsvEncoder::default();

    assert_eq!(encoder.encode(&records)?, encoder.encode(&records)?);
    Ok(())
}

#[test]
fn awkward_strings_survive_a_quote_aware_parse() -> Result<(), Box<dyn Error>> {
    let awkward = "a,b \"quoted\"\nsecond line";
    let records = vec![product("P003", awkward, 1.5, None)];

    let bytes = CsvEncoder::builder().has_headers(false).build()?.encode(&records)?;
    let text = String::from_utf8(bytes.clone())?;

    assert!(text.contains("\"a,b \"\"quoted\"\"\nsecond line\""));
    assert_ne!(text.lines().next().unwrap_or_default().split(',').count(), 5);

    let mut reader = ReaderBuilder::new().has_headers(false).from_reader(bytes.as_slice());
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], awkward);
    assert_eq!(&rows[0][3], "");
    Ok(())
}

#[test]
fn nested_sequences_become_positional_columns() -> Result<(), Box<dyn Error>> {
    let data = csv_flatten::to_string(&json!({"tags": ["a", "b"]}))?;
    assert_eq!(data, "tags.0,tags.1\na,b\n");
    Ok(())
}

#[test]
fn deeply_nested_records_use_dotted_headers() -> Result<(), Box<dyn Error>> {
    let input = json!([
        {"id": 1, "address": {"city": "Lyon", "lines": ["1 rue A", "Bat B"]}, "meta": null},
        {"id": 2, "address": {"city": "Nice", "lines": ["2 av C"]}, "meta": null},
    ]);

    let data = csv_flatten::to_string(&input)?;
    assert_eq!(
        data,
        "id,address.city,address.lines.0,address.lines.1,meta\n\
         1,Lyon,1 rue A,Bat B,\n\
         2,Nice,2 av C,,\n"
    );
    Ok(())
}

#[test]
fn non_conforming_floats_are_substituted() -> Result<(), Box<dyn Error>> {
    let encoder = CsvEncoder::builder()
        .float_strategy(NonConformingFloat::substitute("inf", "-inf", "nan"))
        .build()?;

    let records = vec![
        product("A", "nan", f64::NAN, None),
        product("B", "pos", f64::INFINITY, None),
        product("C", "neg", f64::NEG_INFINITY, None),
    ];
    let bytes = encoder.encode(&records)?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
    let prices = reader
        .records()
        .map(|row| row.map(|row| row[2].to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(prices, vec!["nan", "inf", "-inf"]);
    Ok(())
}

#[derive(Serialize)]
struct Event {
    name: &'static str,
    #[serde(serialize_with = "csv_flatten::core::value::serialize_date")]
    at: DateTime<Utc>,
    until: CsvDate,
}

#[test]
fn dates_follow_the_configured_strategy() -> Result<(), Box<dyn Error>> {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let event = Event {
        name: "launch",
        at,
        until: CsvDate(at + chrono::Duration::days(1)),
    };

    let data = csv_flatten::to_string(&event)?;
    assert_eq!(data, "name,at,until\nlaunch,2024-01-02T03:04:05Z,2024-01-03T03:04:05Z\n");

    let encoder = CsvEncoder::builder()
        .date_strategy(DateStrategy::Formatted("%Y/%m/%d".to_string()))
        .build()?;
    assert_eq!(
        encoder.encode_to_string(&event)?,
        "name,at,until\nlaunch,2024/01/02,2024/01/03\n"
    );
    Ok(())
}

#[test]
fn dates_beyond_four_digit_years_reach_the_strategy() -> Result<(), Box<dyn Error>> {
    let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    let before = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
    let rows = Value::sequence([
        Value::record([("at", Value::from(far))]),
        Value::record([("at", Value::from(before))]),
    ]);

    let millis = CsvEncoder::builder()
        .date_strategy(DateStrategy::MillisecondsSince1970)
        .build()?;
    assert_eq!(
        millis.encode_to_string(&rows)?,
        format!("at\n{}\n{}\n", far.timestamp_millis(), before.timestamp_millis())
    );

    let years = CsvEncoder::builder()
        .date_strategy(DateStrategy::custom(|date| Ok(date.year().to_string())))
        .build()?;
    assert_eq!(years.encode_to_string(&rows)?, "at\n10000\n-1\n");

    assert_eq!(
        csv_flatten::to_string(&[CsvDate(far), CsvDate(before)])?,
        "\"\"\n+10000-01-01T00:00:00Z\n-0001-01-01T00:00:00Z\n"
    );
    Ok(())
}

#[test]
fn value_tree_with_dates_and_binary_data() -> Result<(), Box<dyn Error>> {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let rows = Value::sequence([
        Value::record([
            ("when", Value::from(at)),
            ("blob", Value::from(vec![1u8, 2, 3])),
            ("note", Value::null()),
        ]),
        Value::record([("when", Value::from(at)), ("blob", Value::from(vec![255u8]))]),
    ]);

    let data = csv_flatten::to_string(&rows)?;
    assert_eq!(
        data,
        "when,blob,note\n2024-03-01T12:30:00Z,AQID,\n2024-03-01T12:30:00Z,/w==,\n"
    );

    let encoder = CsvEncoder::builder()
        .date_strategy(DateStrategy::SecondsSince1970)
        .data_strategy(DataStrategy::Hex)
        .build()?;
    assert_eq!(
        encoder.encode_to_string(&rows)?,
        "when,blob,note\n1709296200,010203,\n1709296200,ff,\n"
    );
    Ok(())
}

#[test]
fn explicit_header_replaces_key_paths() -> Result<(), Box<dyn Error>> {
    let encoder = CsvEncoder::builder()
        .header(HeaderStrategy::Explicit(vec![
            "Identifier".to_string(),
            "Full name".to_string(),
        ]))
        .build()?;

    let data = encoder.encode_to_string(&json!([{"id": 1, "name": "Ann"}]))?;
    assert_eq!(data, "Identifier,Full name\n1,Ann\n");
    Ok(())
}

#[test]
fn custom_dialect() -> Result<(), Box<dyn Error>> {
    let encoder = CsvEncoder::builder()
        .delimiter(b';')
        .terminator(Terminator::Crlf)
        .build()?;

    let data = encoder.encode_to_string(&json!([{"a": "x;y", "b": "x,y"}]))?;
    assert_eq!(data, "a;b\r\n\"x;y\";x,y\r\n");
    Ok(())
}

#[test]
fn file_destination_is_truncated_and_written() -> Result<(), Box<dyn Error>> {
    common::init_logger();

    let temp_file = NamedTempFile::new()?;
    fs::write(temp_file.path(), "old,content\nthat,is\nlonger,than,the,new,one\n")?;

    let records = vec![
        product("P001", "Headphones", 79.99, None),
        product("P002", "Cable", 12.99, Some("USB-C")),
    ];
    CsvEncoder::default().encode_to_path(&records, temp_file.path())?;

    let content = fs::read_to_string(temp_file.path())?;
    assert_eq!(
        content,
        "id,name,price,description,available\n\
         P001,Headphones,79.99,,true\n\
         P002,Cable,12.99,USB-C,true\n"
    );
    Ok(())
}

#[test]
fn large_input_is_streamed_to_file() -> Result<(), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let records: Vec<_> = (0..10_000)
        .map(|i| json!({"id": i, "label": format!("item-{}", i)}))
        .collect();

    CsvEncoder::default().encode_to_path(&records, temp_file.path())?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(temp_file.path())?;
    assert_eq!(reader.records().count(), 10_000);
    Ok(())
}

#[test]
fn one_encoder_serves_concurrent_calls() -> Result<(), Box<dyn Error>> {
    let encoder = CsvEncoder::builder()
        .float_strategy(NonConformingFloat::substitute("inf", "-inf", "nan"))
        .build()?;

    let outputs = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let encoder = &encoder;
                scope.spawn(move || encoder.encode_to_string(&json!([{"worker": i}])))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect::<Result<Vec<_>, _>>()
    })?;

    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(output, &format!("worker\n{}\n", i));
    }
    Ok(())
}
