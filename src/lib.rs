#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # csv-flatten

 Serialize arbitrarily nested values into flat CSV.

 Any type implementing [`serde::Serialize`] can be encoded. Nested records
 are flattened into dot-joined columns (`address.city`), nested sequences
 into positional columns (`tags.0`, `tags.1`), and a top-level sequence
 becomes one row per element. The column layout is taken from the first
 row and enforced on every following row.

 ## Core Concepts

- **Walker:** a `serde::Serializer` that visits the value depth-first and tracks the key-path of every leaf.
- **ColumnResolver:** assigns a column to each key-path and freezes the schema after the first row.
- **ScalarFormatter:** renders numbers, booleans, dates and binary data under the configured strategies.
- **RowAssembler:** collects the cells of one row in column order.
- **Sink:** quotes and writes rows to a buffer, a file or any `std::io::Write`.

 ## Configuration

| **Option**       | **Default**        | **Description**                                        |
|------------------|--------------------|--------------------------------------------------------|
| delimiter        | `,`                | Field delimiter                                        |
| terminator       | `\n`               | Row delimiter (`\n`, `\r\n` or any single byte)        |
| header           | `FirstLine`        | `None`, `FirstLine` or `Explicit(names)`               |
| date_strategy    | `Deferred`         | RFC 3339, epoch seconds/millis, strftime or custom     |
| data_strategy    | `Base64`           | Base64, hex or custom                                  |
| float_strategy   | `Fail`             | Fail on NaN/±inf or substitute tokens                  |

 ## Getting Started

```rust
use csv_flatten::{CsvEncoder, core::config::NonConformingFloat};
use serde::Serialize;

#[derive(Serialize)]
struct Address {
    city: String,
    lines: Vec<String>,
}

#[derive(Serialize)]
struct Person {
    id: u32,
    name: String,
    score: f64,
    address: Address,
}

fn main() -> Result<(), csv_flatten::EncodeError> {
    let people = vec![
        Person {
            id: 1,
            name: "Ann".to_string(),
            score: f64::NAN,
            address: Address { city: "Lyon".to_string(), lines: vec!["1 rue A".to_string()] },
        },
    ];

    let encoder = CsvEncoder::builder()
        .float_strategy(NonConformingFloat::substitute("inf", "-inf", "nan"))
        .build()?;

    let csv = encoder.encode_to_string(&people)?;
    assert_eq!(csv, "id,name,score,address.city,address.lines.0\n1,Ann,nan,Lyon,1 rue A\n");
    Ok(())
}
```

 ## Errors

 Every failure aborts the encode call and is reported as an [`EncodeError`]:
 `Structural` for values that cannot be flattened, `SchemaMismatch` when a
 row does not fit the schema of the first row, `Encoding` when a scalar
 cannot be rendered, and `Io` for destination failures. File destinations
 are always flushed and closed, even when an error aborts the encode.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for the encoding engine
pub mod core;

/// Error types for encode operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Row sinks and destinations
pub mod sink;

/// Encoder entry points
pub mod encoder;

pub use encoder::{CsvEncoder, CsvEncoderBuilder, to_string, to_vec};
