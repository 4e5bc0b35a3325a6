use std::fs;
use std::path::Path;

use confluence_engine::{
    DocxConverter, DocxError, FileProcessor, PandocConverter, ProcessError, ProcessorConfig,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct StubConverter;

impl DocxConverter for StubConverter {
    fn convert(&self, html_path: &Path, docx_path: &Path) -> Result<(), DocxError> {
        assert!(html_path.is_file());
        fs::write(docx_path, b"PK").map_err(|source| DocxError::Spawn {
            program: "stub".to_string(),
            source,
        })
    }
}

fn page(dir: &Path, relative: &str, title: &str, crumbs: &[&str]) {
    let anchors: String = crumbs
        .iter()
        .map(|crumb| format!("<span><a href=\"#\">{crumb}</a></span>"))
        .collect();
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!(
            "<html><head><title>{title}</title></head><body>\
             <div id=\"breadcrumb-section\">{anchors}</div>\
             <div id=\"main-content\" class=\"wiki-content\"><p>{title} body</p></div>\
             </body></html>"
        ),
    )
    .unwrap();
}

fn export_fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("export");
    page(&input, "Guide.html", "Guide", &["Eng Space"]);
    page(&input, "overview.html", "Eng-Space Overview", &["Eng Space"]);
    page(&input, "pages/Setup.html", "Setup", &["Eng Space", "Guide"]);
    fs::write(input.join("orphan.html"), "<title>Orphan</title><p>no trail</p>").unwrap();
    fs::create_dir_all(input.join("attachments").join("12")).unwrap();
    fs::write(input.join("attachments").join("12").join("a.png"), b"png").unwrap();
    temp
}

fn config(temp: &TempDir) -> ProcessorConfig {
    ProcessorConfig::new(temp.path().join("export"), temp.path().join("out"))
}

#[test]
fn pages_land_in_breadcrumb_directories() {
    let temp = export_fixture();
    let mut processor = FileProcessor::new(ProcessorConfig {
        create_docx: true,
        ..config(&temp)
    })
    .unwrap()
    .with_converter(Box::new(StubConverter));

    let stats = processor.process_files().unwrap();
    assert_eq!(stats.total_input_files, 4);
    assert_eq!(stats.processed_files, 3);
    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.created_docx, 3);
    assert_eq!(stats.files_not_processed, 0);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].contains("orphan.html"), "{:?}", stats.errors);

    let base = temp.path().join("out").join("Eng-Space");
    assert!(base.join("Overview.html").is_file());
    assert!(base.join("Overview.docx").is_file());
    assert!(base.join("Guide").join("Setup.html").is_file());
    // Guide.html shares its name with the Guide/ folder and moves inside it.
    assert!(!base.join("Guide.html").exists());
    assert!(base.join("Guide").join("Guide.html").is_file());
    assert!(base.join("Guide").join("Guide.docx").is_file());
    assert_eq!(
        fs::read(base.join("attachments").join("12").join("a.png")).unwrap(),
        b"png"
    );

    let cleaned = fs::read_to_string(base.join("Guide").join("Setup.html")).unwrap();
    assert!(cleaned.starts_with("<!DOCTYPE html>"));
    assert!(cleaned.contains("<p>Setup body</p>"));
    assert!(!cleaned.contains("breadcrumb-section"));
}

#[test]
fn rerun_replaces_previous_space_output() {
    let temp = export_fixture();
    let stale = temp.path().join("out").join("Eng-Space").join("stale.html");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();

    let mut processor = FileProcessor::new(config(&temp)).unwrap();
    processor.process_files().unwrap();
    assert!(!stale.exists());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = export_fixture();
    let mut processor = FileProcessor::new(ProcessorConfig {
        dry_run: true,
        create_docx: true,
        ..config(&temp)
    })
    .unwrap();

    let stats = processor.process_files().unwrap();
    assert_eq!(stats.processed_files, 3);
    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.created_docx, 0);
    assert!(!temp.path().join("out").exists());
}

#[test]
fn missing_converter_fails_pages_not_the_run() {
    let temp = export_fixture();
    let mut processor = FileProcessor::new(ProcessorConfig {
        create_docx: true,
        ..config(&temp)
    })
    .unwrap()
    .with_converter(Box::new(PandocConverter::new("no-such-converter-binary")));

    let stats = processor.process_files().unwrap();
    assert_eq!(stats.processed_files, 0);
    assert_eq!(stats.failed_files, 4);
    assert!(stats.errors.iter().any(|err| err.contains("no-such-converter-binary")));
}

#[test]
fn space_name_falls_back_to_parenthesized_title() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("export");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("index.html"), "<title>Home (Design Team)</title><p>hi</p>").unwrap();

    let processor = FileProcessor::new(config(&temp)).unwrap();
    let layout = processor.setup_directory_structure().unwrap();
    assert_eq!(layout.space_name, "Design-Team");
    assert!(layout.base_dir.ends_with("Design-Team"));
    assert!(layout.base_dir.is_dir());
}

#[test]
fn setup_errors_abort_the_run() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("export");
    fs::create_dir_all(&input).unwrap();

    let mut processor = FileProcessor::new(config(&temp)).unwrap();
    assert!(matches!(
        processor.process_files(),
        Err(ProcessError::NoHtmlFiles(_))
    ));

    fs::write(input.join("index.html"), "<title>Home</title>").unwrap();
    let mut processor = FileProcessor::new(config(&temp)).unwrap();
    assert!(matches!(
        processor.process_files(),
        Err(ProcessError::NoSpaceName(_))
    ));

    let file = temp.path().join("file.html");
    fs::write(&file, "").unwrap();
    assert!(matches!(
        FileProcessor::new(ProcessorConfig::new(&file, temp.path().join("out"))),
        Err(ProcessError::NotADirectory(_))
    ));
}
