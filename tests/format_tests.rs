use datafmt::{csv, json, value, xml, Delimiter, Error, Format, Options, Structured, Value};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("datafmt-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// CSV

#[test]
fn test_csv_quoted_fields() {
    let rows = csv::parse("name,age,notes\n\"Smith, John\",42,\"said \"\"hi\"\"\"\nAda,36,\"two\nlines\"\n").unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"].as_str(), Some("Smith, John"));
    assert_eq!(rows[0]["age"].as_str(), Some("42"));
    assert_eq!(rows[0]["notes"].as_str(), Some("said \"hi\""));
    assert_eq!(rows[1]["notes"].as_str(), Some("two\nlines"));
}

#[test]
fn test_csv_unterminated_quote() {
    let err = csv::parse("a,b\n1,\"open\n2,3\n").unwrap_err();
    assert_eq!(err.format(), Some(Format::Csv));
    assert_eq!((err.line(), err.column()), (Some(2), Some(3)));
    assert!(err.to_string().contains("unterminated quoted field"));
}

#[test]
fn test_csv_ragged_rows() {
    let err = csv::parse("a,b\n1,2\n3,4,5\n").unwrap_err();
    assert_eq!(err.line(), Some(3));

    let loose = csv::parse_with_options("1,2\n3,4,5\n", &Options::new().with_headers(false)).unwrap();
    assert_eq!(loose[1].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_csv_duplicate_columns() {
    let err = csv::parse("a,a\n1,2\n").unwrap_err();
    assert_eq!(err.format(), Some(Format::Csv));
    assert_eq!(err.line(), Some(1));
    assert!(err.to_string().contains("duplicate column `a`"));

    let err = csv::parse("\n\nid,name,\"id\"\n").unwrap_err();
    assert_eq!(err.line(), Some(3));

    let rows = csv::parse_with_options("a,a\n1,2\n", &Options::new().with_headers(false)).unwrap();
    assert_eq!(rows[0][1].as_str(), Some("2"));
}

#[test]
fn test_csv_crlf_blank_lines_and_delimiters() {
    let rows = csv::parse("a,b\r\n1,\"x\"\r\n\r\n2,\r\n").unwrap();
    assert_eq!(rows[0]["b"].as_str(), Some("x"));
    assert_eq!(rows[1]["b"].as_str(), Some(""));
    assert_eq!(rows.as_array().map(Vec::len), Some(2));

    let options = Options::new().with_delimiter(Delimiter::Semicolon);
    let rows = csv::parse_with_options("k;v\nx;1,5\n", &options).unwrap();
    assert_eq!(rows[0]["v"].as_str(), Some("1,5"));

    let tabs = Options::new().with_delimiter(Delimiter::Tab);
    let text = csv::to_string_with_options(&rows, &tabs).unwrap();
    assert_eq!(text, "k\tv\nx\t1,5\n");
}

#[test]
fn test_csv_header_only_and_empty() {
    assert_eq!(csv::parse("a,b\n").unwrap(), Value::Array(vec![]));
    assert_eq!(csv::parse("").unwrap(), Value::Array(vec![]));
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    age: u32,
    member: bool,
}

#[test]
fn test_csv_typed_records() {
    let people: Vec<Person> = csv::from_str("name,age,member\nAda,36,true\n\"Smith, John\",42,false\n").unwrap();
    assert_eq!(people[1].name, "Smith, John");
    assert_eq!(people[1].age, 42);
    assert!(people[0].member);

    let text = csv::to_string(&people).unwrap();
    assert_eq!(text, "name,age,member\nAda,36,true\n\"Smith, John\",42,false\n");
    let back: Vec<Person> = csv::from_str(&text).unwrap();
    assert_eq!(back, people);
}

#[test]
fn test_csv_writer_rules() {
    let rows = value!([
        { "id": 1, "tag": null },
        { "id": 2, "extra": "a\"b" }
    ]);
    assert_eq!(csv::to_string(&rows).unwrap(), "id,tag,extra\n1,,\n2,,\"a\"\"b\"\n");

    let no_header = Options::new().with_headers(false);
    assert_eq!(csv::to_string_with_options(&rows, &no_header).unwrap(), "1,,\n2,,\"a\"\"b\"\n");

    let nested = value!([{ "list": [1, 2] }]);
    assert!(matches!(csv::to_string(&nested), Err(Error::UnsupportedType(_))));
    assert!(csv::to_string(&value!(42)).is_err());
}

// JSON

#[test]
fn test_json_document() {
    let doc = json::parse(r#"{"name": "demo", "size": 3.5, "items": [1, "two", null, {"deep": true}]}"#).unwrap();
    assert_eq!(doc["size"], Value::Float(3.5));
    assert_eq!(doc["items"][1].as_str(), Some("two"));
    assert!(doc["items"][2].is_null());
    assert_eq!(doc["items"][3]["deep"], Value::Bool(true));
}

#[test]
fn test_json_errors() {
    let err = json::parse("{\"a\": 1,\n \"b\": }").unwrap_err();
    assert_eq!(err.format(), Some(Format::Json));
    assert_eq!(err.line(), Some(2));
    assert!(json::parse("").is_err());
    assert!(json::parse("[1, 2] extra").is_err());
}

#[test]
fn test_json_typed_round_trip() {
    let person = Person {
        name: "Ada".to_string(),
        age: 36,
        member: true,
    };
    let text = json::to_string(&person).unwrap();
    assert_eq!(text, r#"{"name":"Ada","age":36,"member":true}"#);
    let back: Person = json::from_str(&text).unwrap();
    assert_eq!(back, person);
}

// XML

#[test]
fn test_xml_structure() {
    let doc = xml::parse(
        r#"<?xml version="1.0"?>
<!-- catalogue -->
<library name="City &amp; County">
  <book id="1"><title>Dune</title></book>
  <book id="2"><title>Emma</title><note><![CDATA[<rare>]]></note></book>
  <closed/>
  <p lang="en">Hello &lt;world&gt;</p>
</library>"#,
    )
    .unwrap();
    let library = &doc["library"];
    assert_eq!(library["@name"].as_str(), Some("City & County"));
    assert_eq!(library["book"].as_array().map(Vec::len), Some(2));
    assert_eq!(library["book"][0]["@id"].as_str(), Some("1"));
    assert_eq!(library["book"][1]["title"].as_str(), Some("Emma"));
    assert_eq!(library["book"][1]["note"].as_str(), Some("<rare>"));
    assert!(library["closed"].is_null());
    assert_eq!(library["p"]["#text"].as_str(), Some("Hello <world>"));
}

#[test]
fn test_xml_errors() {
    for bad in ["", "<a>", "<a/><b/>", "<a></b>", "just text"] {
        let err = xml::parse(bad).unwrap_err();
        assert_eq!(err.format(), Some(Format::Xml), "{bad:?}");
    }
    let err = xml::parse("<a>\n  <b>\n</a>").unwrap_err();
    assert!(err.line().is_some());
}

#[test]
fn test_xml_writer() {
    let doc = value!({ "a": 1, "b": [1, 2], "c": null });
    assert_eq!(
        xml::to_string(&doc).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n  <a>1</a>\n  <b>1</b>\n  <b>2</b>\n  <c/>\n</root>\n"
    );

    let source = r#"<shelf id="7"><book lang="en">Dune &amp; more</book><book>Emma</book></shelf>"#;
    let parsed = xml::parse(source).unwrap();
    let written = xml::to_string(&parsed).unwrap();
    assert!(written.contains("<shelf id=\"7\">"));
    assert!(written.contains("<book lang=\"en\">Dune &amp; more</book>"));
    assert_eq!(xml::parse(&written).unwrap(), parsed);

    let bad_name = value!({ "1st": "x" });
    assert!(matches!(xml::to_string(&bad_name), Err(Error::UnsupportedType(_))));
}

// detection, conversion and files

#[test]
fn test_detect_every_format() {
    let cases = [
        ("{\"name\": \"demo\"}", Format::Json),
        ("<config><debug>true</debug></config>", Format::Xml),
        ("[server]\nport = 8080\n", Format::Toml),
        ("server:\n  port: 8080\n", Format::Yaml),
        ("---\n- 1\n", Format::Yaml),
        ("id,name\n1,ann\n", Format::Csv),
    ];
    for (text, format) in cases {
        assert_eq!(datafmt::parse(text).unwrap().format(), format, "{text}");
    }
}

#[test]
fn test_detect_failure_reports_last_error() {
    let err = datafmt::parse("\"unterminated").unwrap_err();
    assert_eq!(err.format(), Some(Format::Csv));
}

#[test]
fn test_convert_chain() {
    let toml = "title = \"demo\"\nratio = 0.5\n\n[owner]\nname = \"Ann\"\ntags = [\"a\", \"b\"]\n\n[[items]]\nid = 1\n\n[[items]]\nid = 2\n";
    let doc = datafmt::parse_as(Format::Toml, toml).unwrap();
    assert_eq!(doc.serialize().unwrap(), toml);

    let mut current = doc.clone();
    for format in [Format::Yaml, Format::Json, Format::Toml] {
        let text = current.convert(format).unwrap();
        current = Structured::parse(format, &text).unwrap();
        assert_eq!(current.data(), doc.data(), "via {format}");
    }
}

#[test]
fn test_convert_xml_and_csv() {
    let doc = datafmt::parse("<user id=\"3\"><name>Ann</name></user>").unwrap();
    let json = doc.convert(Format::Json).unwrap();
    assert_eq!(json, "{\n  \"user\": {\n    \"@id\": \"3\",\n    \"name\": \"Ann\"\n  }\n}");

    let rows = datafmt::parse_as(Format::Json, r#"[{"a": 1, "b": "x,y"}, {"a": 2, "b": ""}]"#).unwrap();
    assert_eq!(rows.convert(Format::Csv).unwrap(), "a,b\n1,\"x,y\"\n2,\n");
}

#[test]
fn test_load_files() {
    let dir = scratch_dir("load");
    let files = [
        ("app.yml", "name: demo\n", Format::Yaml),
        ("app.json", "{\"name\": \"demo\"}", Format::Json),
        ("app.conf", "name = \"demo\"\n", Format::Toml),
        ("app.xml", "<name>demo</name>", Format::Xml),
    ];
    for (file, text, format) in files {
        let path = dir.join(file);
        std::fs::write(&path, text).unwrap();
        let doc = datafmt::load_file(&path).unwrap();
        assert_eq!(doc.format(), format, "{file}");
        assert_eq!(doc.data()["name"].as_str(), Some("demo"));
    }

    let rows = dir.join("rows.csv");
    std::fs::write(&rows, "name\ndemo\n").unwrap();
    assert_eq!(csv::load_file(&rows).unwrap()[0]["name"].as_str(), Some("demo"));
    assert_eq!(json::load_file(dir.join("app.json")).unwrap()["name"].as_str(), Some("demo"));
    assert_eq!(xml::load_file(dir.join("app.xml")).unwrap()["name"].as_str(), Some("demo"));

    let err = datafmt::load_file(dir.join("missing.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    std::fs::remove_dir_all(&dir).unwrap();
}
