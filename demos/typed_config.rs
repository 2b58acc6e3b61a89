//! Load one typed configuration struct from TOML, YAML and JSON.
//!
//! Run with: cargo run --example typed_config

use datafmt::{json, toml, yaml, Datetime};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Database {
    url: String,
    pool_size: u32,
    replicas: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Config {
    name: String,
    debug: bool,
    released: Option<Datetime>,
    database: Database,
}

const TOML: &str = r#"
name = "inventory"
debug = false
released = 2024-06-01T12:00:00Z

[database]
url = "postgres://localhost/inventory"
pool_size = 16
replicas = ["db-2", "db-3"]
"#;

const YAML: &str = "
name: inventory
debug: false
released: 2024-06-01T12:00:00Z
database:
  url: postgres://localhost/inventory
  pool_size: 16
  replicas:
    - db-2
    - db-3
";

fn main() -> Result<(), Box<dyn Error>> {
    let from_toml: Config = toml::from_str(TOML)?;
    println!("TOML: {from_toml:#?}");

    // YAML has no date-time type; the string is parsed on the way in
    let from_yaml: Config = yaml::from_str(YAML)?;
    assert_eq!(from_toml, from_yaml);
    println!("✓ YAML matches TOML");

    let as_json = json::to_string_pretty(&from_toml)?;
    println!("JSON:\n{as_json}");
    let from_json: Config = json::from_str(&as_json)?;
    assert_eq!(from_toml, from_json);
    println!("✓ JSON round-trip successful");

    match toml::from_str::<Config>("name = \"x\"\ndebug = maybe\n") {
        Ok(_) => println!("unexpectedly accepted"),
        Err(e) => println!("Rejected bad input:\n{e}"),
    }
    Ok(())
}
