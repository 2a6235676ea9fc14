//! Decoder dispatch against real files on disk.

use std::fs::{self, File};
use std::path::Path;

use missive_render::{pipeline, DecoderRegistry, RenderError};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn render_files(
    template: &str,
    data: &str,
) -> Result<missive_render::RenderedMessages, RenderError> {
    let registry = DecoderRegistry::new();
    let decoder = registry.lookup(data)?;
    pipeline::run(File::open(template)?, File::open(data)?, decoder.as_ref())
}

#[test]
fn test_every_builtin_extension() {
    let tmp = TempDir::new().unwrap();
    let template = write(tmp.path(), "message.tmpl", "Hello {{.name}}!");

    let fixtures = [
        ("people.json", r#"{"alice": {"name": "Alice"}}"#),
        ("people.yaml", "alice:\n  name: Alice\n"),
        ("people.yml", "alice:\n  name: Alice\n"),
        ("people.toml", "[alice]\nname = \"Alice\"\n"),
        ("PEOPLE.JSON", r#"{"alice": {"name": "Alice"}}"#),
    ];

    for (name, content) in fixtures {
        let data = write(tmp.path(), name, content);
        let messages = render_files(&template, &data).unwrap();
        assert_eq!(messages["alice"], "Hello Alice!", "fixture {}", name);
    }
}

#[test]
fn test_extension_decides_not_content() {
    let tmp = TempDir::new().unwrap();
    let template = write(tmp.path(), "message.tmpl", "{{.name}}");
    // valid JSON is also valid YAML, so this decodes fine
    let data = write(tmp.path(), "people.yaml", r#"{"alice": {"name": "Alice"}}"#);
    assert_eq!(render_files(&template, &data).unwrap()["alice"], "Alice");

    // a YAML document in a .json file is a JSON decode error
    let data = write(tmp.path(), "people.json", "alice:\n  name: Alice\n");
    let err = render_files(&template, &data).unwrap_err();
    assert!(matches!(err, RenderError::DataDecodeFailed { ref format, .. } if format == "json"));
}

#[test]
fn test_unsupported_file() {
    let tmp = TempDir::new().unwrap();
    let template = write(tmp.path(), "message.tmpl", "{{.name}}");
    let data = write(tmp.path(), "people.xml", "<alice/>");

    let err = render_files(&template, &data).unwrap_err();
    assert!(err.is_unsupported_format());
    assert!(err.to_string().contains(".xml"));
}

#[test]
fn test_missing_template_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let data = write(tmp.path(), "people.json", "{}");
    let missing = tmp.path().join("nope.tmpl");

    let err = render_files(&missing.to_string_lossy(), &data).unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
}

#[test]
fn test_custom_decoder_for_new_extension() {
    use std::io::{BufRead, BufReader, Read};

    use missive_render::{FieldMap, RecipientData};

    // one "recipient=name" pair per line
    fn decode_pairs(reader: &mut dyn Read) -> missive_render::Result<RecipientData> {
        let mut data = RecipientData::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            if let Some((recipient, name)) = line.split_once('=') {
                let fields = FieldMap::from([("name".to_string(), name.to_string())]);
                data.insert(recipient.to_string(), fields);
            }
        }
        Ok(data)
    }

    let tmp = TempDir::new().unwrap();
    let data = write(tmp.path(), "people.pairs", "alice=Alice\nbob=Bob\n");

    let mut registry = DecoderRegistry::new();
    registry.register("pairs", decode_pairs);
    let decoder = registry.lookup(&data).unwrap();

    let messages = pipeline::run(
        "Hi {{.name}}".as_bytes(),
        File::open(&data).unwrap(),
        decoder.as_ref(),
    )
    .unwrap();
    assert_eq!(messages["bob"], "Hi Bob");
}
