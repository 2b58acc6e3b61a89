//! Convert a data file to another format.
//!
//! Run with: cargo run --example convert -- <path> <json|yaml|toml|xml|csv>
//!
//! Without arguments a built-in TOML document is converted to every format.

use datafmt::{Format, Structured};
use std::error::Error;

const SAMPLE: &str = r#"
title = "Service inventory"

[owner]
name = "Platform team"
since = 2021-03-01

[[services]]
name = "gateway"
port = 443
tags = ["edge", "tls"]

[[services]]
name = "billing"
port = 8080
tags = ["internal"]
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    match (args.next(), args.next()) {
        (Some(path), Some(target)) => {
            let target: Format = target.parse()?;
            let doc = datafmt::load_file(&path)?;
            eprintln!("read {path} as {}", doc.format());
            print!("{}", doc.convert(target)?);
        }
        _ => {
            let doc = Structured::parse(Format::Toml, SAMPLE)?;
            for format in [Format::Json, Format::Yaml, Format::Xml] {
                println!("--- {format} ---");
                println!("{}", doc.convert(format)?);
            }

            // CSV holds flat records, so only the services list fits
            let services = &doc.data()["services"];
            let rows: Vec<_> = services
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .map(|s| datafmt::value!({ "name": (s["name"].clone()), "port": (s["port"].clone()) }))
                        .collect()
                })
                .unwrap_or_default();
            println!("--- {} ---", Format::Csv);
            print!("{}", datafmt::csv::to_string(&rows)?);
        }
    }
    Ok(())
}
