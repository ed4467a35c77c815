use clinic_report::core::Storage;
use clinic_report::utils::validation::Validate;
use clinic_report::{ClinicPeriodMetrics, LayoutConfig, LocalStorage, ProviderMetric, ReportRenderer};
use lopdf::{Document, Object};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn metrics_json() -> &'static str {
    r#"{
        "clinic_name": "North Campus",
        "period_label": "April 2026",
        "total_weighted_rvu": 8450.25,
        "rvu_per_fte": 1690.05,
        "new_patient_count_approx": 64,
        "provider_breakdown": [
            { "name": "Dr. Adams", "total_rvu": 3200.0 },
            { "name": "Dr. Baker", "total_rvu": 5250.25 }
        ]
    }"#
}

#[test]
fn test_local_storage_creates_nested_directories() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_str().unwrap().to_string();
    let storage = LocalStorage::new(base);

    storage
        .write_file("2026/04/report.pdf", b"%PDF-1.4 stub")
        .unwrap();
    assert!(temp_dir.path().join("2026/04/report.pdf").exists());

    let read_back = storage.read_file("2026/04/report.pdf").unwrap();
    assert_eq!(read_back, b"%PDF-1.4 stub");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    let err = storage.read_file("absent.json").unwrap_err();
    assert!(matches!(err, clinic_report::ReportError::IoError(_)));
}

#[test]
fn test_json_metrics_render_and_persist() {
    let metrics: ClinicPeriodMetrics = serde_json::from_str(metrics_json()).unwrap();
    assert_eq!(metrics.provider_count(), 2);

    let bytes = ReportRenderer::default()
        .render(&metrics.sorted_by_volume())
        .unwrap();

    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    storage.write_file("performance_report.pdf", &bytes).unwrap();

    let stored = std::fs::read(temp_dir.path().join("performance_report.pdf")).unwrap();
    assert_eq!(stored, bytes);

    let doc = Document::load_mem(&stored).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_layout_file_changes_page_size() {
    let mut layout_file = NamedTempFile::new().unwrap();
    layout_file
        .write_all(
            br#"
[page]
width_mm = 215.9
height_mm = 279.4

[table]
name_column_mm = 135.9
"#,
        )
        .unwrap();

    let config = LayoutConfig::from_file(layout_file.path()).unwrap();
    assert!(config.validate().is_ok());

    let metrics = ClinicPeriodMetrics::new(
        "Example Clinic",
        "March 2026",
        1.0,
        1.0,
        1,
        vec![ProviderMetric::new("Dr. Letter", 1.0)],
    );
    let bytes = ReportRenderer::new(config).render(&metrics).unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let size: Vec<f32> = media_box
        .iter()
        .map(|value| match value {
            Object::Integer(n) => *n as f32,
            Object::Real(r) => *r,
            other => panic!("unexpected MediaBox entry {:?}", other),
        })
        .collect();
    assert_eq!(size, vec![0.0, 0.0, 612.0, 792.0]);
}
