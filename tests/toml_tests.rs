use datafmt::{toml, Datetime, Error, Format, Table, Value};

fn parse(input: &str) -> Table {
    match toml::parse(input) {
        Ok(table) => table,
        Err(e) => panic!("failed to parse:\n{input}\n{e}"),
    }
}

fn parse_err(input: &str) -> Error {
    match toml::parse(input) {
        Ok(table) => panic!("expected an error for:\n{input}\ngot {table:?}"),
        Err(e) => e,
    }
}

#[test]
fn test_whitespace_is_insignificant() {
    assert_eq!(parse("key = \"value\""), parse("   key   =   \"value\"   "));
    assert_eq!(parse("a=1\n\n\n# c\nb=2\n"), parse("a = 1\nb = 2"));
}

#[test]
fn test_duplicate_key() {
    let err = parse_err("name = \"Tom\"\nname = \"Pradyun\"");
    assert_eq!(err.format(), Some(Format::Toml));
    assert_eq!(err.line(), Some(2));
    assert!(err.to_string().contains("duplicate key `name`"));
}

#[test]
fn test_table_redefinition() {
    let err = parse_err("[fruit]\na=1\n[fruit]\nb=2");
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_out_of_order_tables_merge() {
    let doc = parse("[fruit.apple]\ncolor = \"red\"\n[animal]\n[fruit.orange]\ncolor = \"orange\"");
    let fruit = doc["fruit"].as_table().unwrap();
    assert_eq!(fruit.len(), 2);
    assert_eq!(fruit["apple"]["color"].as_str(), Some("red"));
    assert_eq!(fruit["orange"]["color"].as_str(), Some("orange"));
    assert!(doc["animal"].as_table().unwrap().is_empty());
}

#[test]
fn test_implicit_parent_defined_later() {
    let doc = parse("[x.y.z.w]\na = 1\n[x]\nb = 2");
    assert_eq!(doc["x"]["b"], Value::Integer(2));
    assert_eq!(doc["x"]["y"]["z"]["w"]["a"], Value::Integer(1));
    parse_err("[x.y]\n[x]\n[x]");
}

#[test]
fn test_array_of_tables_with_empty_member() {
    let doc = parse("[[product]]\nname = \"Hammer\"\nsku = 738594937\n\n[[product]]\n\n[[product]]\nname = \"Nail\"\nsku = 284758393\ncolor = \"gray\"");
    let products = doc["product"].as_array().unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[1], Value::Table(Table::new()));
    assert_eq!(products[2]["color"].as_str(), Some("gray"));
}

#[test]
fn test_static_array_cannot_be_extended() {
    let err = parse_err("fruits = []\n[[fruits]]");
    assert_eq!(err.line(), Some(2));
    parse_err("[[fruits]]\n[fruits]");
    parse_err("a = {x = 1}\n[a.b]");
}

#[test]
fn test_integers() {
    let doc = parse(
        "a = +99\nb = 42\nc = 0\nd = -17\ne = 1_000\nf = 5_349_221\ng = 0xDEAD_BEEF\nh = 0o755\ni = 0b1101_0110\nj = -0\n",
    );
    assert_eq!(doc["a"], Value::Integer(99));
    assert_eq!(doc["e"], Value::Integer(1000));
    assert_eq!(doc["f"], Value::Integer(5_349_221));
    assert_eq!(doc["g"], Value::Integer(3_735_928_559));
    assert_eq!(doc["h"], Value::Integer(493));
    assert_eq!(doc["i"], Value::Integer(214));
    assert_eq!(doc["j"], Value::Integer(0));
}

#[test]
fn test_floats() {
    let doc = parse("a = 5e+22\nb = -2E-2\nc = 6.626e-34\nd = 224_617.445_991_228\ne = 1e06\nf = -0.0");
    assert_eq!(doc["a"], Value::Float(5e22));
    assert_eq!(doc["b"], Value::Float(-0.02));
    assert_eq!(doc["c"], Value::Float(6.626e-34));
    assert_eq!(doc["d"], Value::Float(224_617.445_991_228));
    assert_eq!(doc["e"], Value::Float(1e6));
}

#[test]
fn test_special_floats() {
    let doc = parse("a = inf\nb = +inf\nc = -inf\nd = nan\ne = +nan\nf = -nan");
    assert_eq!(doc["a"], Value::Float(f64::INFINITY));
    assert_eq!(doc["b"], Value::Float(f64::INFINITY));
    assert_eq!(doc["c"], Value::Float(f64::NEG_INFINITY));
    for key in ["d", "e", "f"] {
        assert!(doc[key].as_float().is_some_and(f64::is_nan), "{key}");
    }
}

#[test]
fn test_numeric_grammar_violations() {
    for bad in [
        "a = 042", "a = .7", "a = 7.", "a = 3.e+20", "a = 1__0", "a = _1", "a = 1_",
        "a = +0x10", "a = 0x", "a = 1e", "a = 9223372036854775808", "a = Inf", "a = 1.2.3",
    ] {
        let err = parse_err(bad);
        assert_eq!(err.line(), Some(1), "{bad}");
    }
}

#[test]
fn test_booleans_are_case_strict() {
    let doc = parse("t = true\nf = false");
    assert_eq!(doc["t"], Value::Bool(true));
    assert_eq!(doc["f"], Value::Bool(false));
    parse_err("t = True");
    parse_err("t = falsey");
}

#[test]
fn test_multiline_quote_runs() {
    let doc = parse(r##"str = """Here are three quotation marks: ""\"."""
four = """four""""
five = """five"""""
lit = '''that's it'''''
"##);
    assert_eq!(doc["str"].as_str(), Some("Here are three quotation marks: \"\"\"."));
    assert_eq!(doc["four"].as_str(), Some("four\""));
    assert_eq!(doc["five"].as_str(), Some("five\"\""));
    assert_eq!(doc["lit"].as_str(), Some("that's it''"));
    parse_err("a = \"\"\"x\"\"\"\"\"\"");
}

#[test]
fn test_multiline_strings() {
    let doc = parse("a = \"\"\"\nRoses are red\nViolets are blue\"\"\"\nb = \"\"\"\nThe quick \\\n\n    brown fox\"\"\"\nc = '''\nraw \\n text\n'''");
    assert_eq!(doc["a"].as_str(), Some("Roses are red\nViolets are blue"));
    assert_eq!(doc["b"].as_str(), Some("The quick brown fox"));
    assert_eq!(doc["c"].as_str(), Some("raw \\n text\n"));
}

#[test]
fn test_escapes() {
    let doc = parse(r#"a = "tab\tquote\"slash\\ \x41 é \U0001F600""#);
    assert_eq!(doc["a"].as_str(), Some("tab\tquote\"slash\\ A é 😀"));
    let err = parse_err(r#"a = "\e""#);
    assert!(err.to_string().contains("escape"));
    parse_err(r#"a = "\uD800""#);
    parse_err(r#"a = "\u12""#);
    parse_err("a = 'no\nnewline'");
    parse_err("a = \"unterminated");
}

#[test]
fn test_datetimes() {
    let doc = parse(
        "odt1 = 1979-05-27T07:32:00Z\nodt2 = 1979-05-27T00:32:00.999999-07:00\nodt3 = 1979-05-27 07:32:00Z\nldt = 1979-05-27T07:32:00\nld = 1979-05-27\nlt = 00:32:00.999999",
    );
    assert!(matches!(doc["odt1"], Value::Datetime(Datetime::OffsetDateTime(_))));
    assert!(matches!(doc["odt2"], Value::Datetime(Datetime::OffsetDateTime(_))));
    assert_eq!(doc["odt3"], doc["odt1"]);
    assert!(matches!(doc["ldt"], Value::Datetime(Datetime::LocalDateTime(_))));
    assert!(matches!(doc["ld"], Value::Datetime(Datetime::LocalDate(_))));
    assert!(matches!(doc["lt"], Value::Datetime(Datetime::LocalTime(_))));
    assert_eq!(doc["odt2"].to_string(), "1979-05-27T00:32:00.999999-07:00");
    parse_err("d = 1979-13-27");
    parse_err("d = 1979-05-27T25:00:00");
    let err = parse_err("t = 07:32");
    assert!(err.to_string().contains("malformed time, expected HH:MM:SS"), "{err}");
}

#[test]
fn test_arrays() {
    let doc = parse("a = [ 1, 2, 3, ]\nb = [\n  \"x\", # first\n  'y',\n\n]\nc = [[1, 2], [\"a\"], [], {k = 1}]");
    assert_eq!(doc["a"].as_array().map(Vec::len), Some(3));
    assert_eq!(doc["b"][1].as_str(), Some("y"));
    assert_eq!(doc["c"][3]["k"], Value::Integer(1));
    parse_err("a = [1, 2");
    parse_err("a = [1 2]");
    parse_err("a = [,]");
}

#[test]
fn test_inline_tables() {
    let doc = parse("point = { x = 1, y.z = 2, }\nempty = {}\nnested = { a = { b = [1] } }");
    assert_eq!(doc["point"]["y"]["z"], Value::Integer(2));
    assert!(doc["empty"].as_table().unwrap().is_empty());
    assert_eq!(doc["nested"]["a"]["b"][0], Value::Integer(1));
    parse_err("p = { x = 1, x = 2 }");
    parse_err("p = { x = 1 ");
    parse_err("p = { x = 1 }\np.y = 2");
}

#[test]
fn test_keys() {
    let doc = parse("bare_key-1 = 1\n\"quoted key\" = 2\n'literal.key' = 3\n1234 = 4\nsite.\"google.com\" = true\n\"\" = 5");
    assert_eq!(doc["quoted key"], Value::Integer(2));
    assert_eq!(doc["literal.key"], Value::Integer(3));
    assert_eq!(doc["1234"], Value::Integer(4));
    assert_eq!(doc["site"]["google.com"], Value::Bool(true));
    assert_eq!(doc[""], Value::Integer(5));
    parse_err("= 1");
    parse_err("a b = 1");
    parse_err("a.b = 1\na = 2");
}

#[test]
fn test_trailing_content_and_positions() {
    let err = parse_err("a = 1\nb = \"x\" c");
    assert_eq!((err.line(), err.column()), (Some(2), Some(9)));
    assert!(err.to_string().contains("b = \"x\" c"));
    let err = parse_err("a = 1\n\n  [tbl\n");
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_comments_and_crlf() {
    let doc = parse("# header\r\na = 1 # trailing\r\n[t] # table\r\nb = 'x'\r\n");
    assert_eq!(doc["a"], Value::Integer(1));
    assert_eq!(doc["t"]["b"].as_str(), Some("x"));
}

#[test]
fn test_typed_round_trip() {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Owner {
        name: String,
        dob: Datetime,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Database {
        ports: Vec<u16>,
        enabled: bool,
        temp_targets: Table,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Config {
        title: String,
        owner: Owner,
        database: Database,
        servers: Vec<Table>,
    }

    let text = r#"
title = "TOML Example"

[owner]
name = "Tom Preston-Werner"
dob = 1979-05-27T07:32:00-08:00

[database]
enabled = true
ports = [ 8000, 8001, 8002 ]
temp_targets = { cpu = 79.5, case = 72.0 }

[[servers]]
ip = "10.0.0.1"

[[servers]]
ip = "10.0.0.2"
role = "backend"
"#;
    let config: Config = toml::from_str(text).unwrap();
    assert_eq!(config.owner.dob.to_string(), "1979-05-27T07:32:00-08:00");
    assert_eq!(config.database.ports, [8000, 8001, 8002]);
    assert_eq!(config.servers[1]["role"].as_str(), Some("backend"));

    let written = toml::to_string(&config).unwrap();
    let back: Config = toml::from_str(&written).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_load_file() {
    let dir = std::env::temp_dir().join(format!("datafmt-toml-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, "[server]\nport = 8080\n").unwrap();
    let doc = toml::load_file(&path).unwrap();
    assert_eq!(doc["server"]["port"], Value::Integer(8080));

    let missing = toml::load_file(dir.join("missing.toml")).unwrap_err();
    assert!(matches!(missing, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_writer_round_trip_with_special_values() {
    let source = "when = 1979-05-27T07:32:00.5+01:30\nday = 2024-02-29\nat = 23:59:59\nbig = inf\nsmall = -inf\nwhole = 3.0\n\n[nested.deeper]\nlist = [[1, 2], [\"x\"]]\ninline = [{ a = 1 }, { b = [] }]\n\n[[nested.items]]\n\n[[nested.items]]\nname = \"second\"\n";
    let doc = parse(source);
    let written = toml::to_string(&doc).unwrap();
    assert_eq!(parse(&written), doc);
    assert!(written.contains("big = inf\n"));
    assert!(written.contains("whole = 3.0\n"));
    assert!(written.contains("when = 1979-05-27T07:32:00.5+01:30\n"));
    assert!(written.contains("[[nested.items]]\nname = \"second\"\n"));

    let nan = parse("x = nan");
    let written = toml::to_string(&nan).unwrap();
    assert_eq!(written, "x = nan\n");
}

#[test]
fn test_writer_rejections() {
    let null = datafmt::value!({ "a": null });
    assert!(matches!(toml::to_string(&null), Err(Error::UnsupportedType(_))));
    assert!(toml::to_string(&vec![1, 2]).is_err());
}
