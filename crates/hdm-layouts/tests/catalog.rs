use std::path::{Path, PathBuf};

use hdm_layouts::{DEFAULT_PREVIEW_LIMIT, LayoutCatalog, LayoutError};
use hdm_model::{FieldType, LayoutId};

fn layouts_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../layouts")
}

fn copy_layouts(dest: &Path) {
    for entry in std::fs::read_dir(layouts_root()).expect("read layouts dir") {
        let entry = entry.expect("dir entry");
        std::fs::copy(entry.path(), dest.join(entry.file_name())).expect("copy layout file");
    }
}

#[test]
fn loads_all_layouts_with_documented_counts() {
    let catalog = LayoutCatalog::load(&layouts_root()).expect("load catalog");
    let summaries = catalog.list_layouts();
    assert_eq!(summaries.len(), 3);

    for id in LayoutId::ALL {
        let layout = catalog.layout(id).expect("layout present");
        assert_eq!(layout.len(), id.expected_field_count(), "{id}");
    }
    assert_eq!(catalog.get_layout("member").unwrap().len(), 52);
    assert_eq!(catalog.get_layout("service_provider").unwrap().len(), 38);
    assert_eq!(catalog.get_layout("bill_custom_detail").unwrap().len(), 124);
}

#[test]
fn resolves_display_names() {
    let catalog = LayoutCatalog::load(&layouts_root()).expect("load catalog");
    let layout = catalog.get_layout("Bill Custom Detail").expect("resolve");
    assert_eq!(layout.id(), LayoutId::BillCustomDetail);

    let billed = layout.field("billed_amount").expect("BILLED_AMOUNT");
    assert_eq!(billed.name, "BILLED_AMOUNT");
    assert_eq!(billed.data_type, FieldType::Numeric);
    assert!(layout.contains("CLAIM_ID"));
}

#[test]
fn unknown_layout_lists_expected_ids() {
    let catalog = LayoutCatalog::load(&layouts_root()).expect("load catalog");
    let err = catalog.get_layout("pharmacy_claim").unwrap_err();
    match err {
        LayoutError::UnknownLayout { name, expected } => {
            assert_eq!(name, "pharmacy_claim");
            assert!(expected.contains("bill_custom_detail"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn preview_returns_leading_fields_and_total() {
    let catalog = LayoutCatalog::load(&layouts_root()).expect("load catalog");
    let preview = catalog
        .preview("member", DEFAULT_PREVIEW_LIMIT)
        .expect("preview");
    assert_eq!(preview.total_fields, 52);
    assert_eq!(preview.preview.len(), DEFAULT_PREVIEW_LIMIT);
    assert_eq!(preview.preview[0].name, "MEMBER_ID");

    let all = catalog.preview("member", 500).expect("preview");
    assert_eq!(all.preview.len(), 52);
}

#[test]
fn tampered_layout_fails_hash_check() {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_layouts(dir.path());
    let path = dir.path().join("member.csv");
    let mut contents = std::fs::read_to_string(&path).expect("read member.csv");
    contents.push_str("EXTRA_FIELD,string,Injected field\n");
    std::fs::write(&path, contents).expect("write member.csv");

    let err = LayoutCatalog::load(dir.path()).unwrap_err();
    assert!(matches!(err, LayoutError::Sha256Mismatch { .. }), "{err}");
}

#[test]
fn manifest_must_list_every_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_layouts(dir.path());
    let manifest_path = dir.path().join("manifest.toml");
    let manifest = std::fs::read_to_string(&manifest_path).expect("read manifest");
    let cut = manifest
        .find("[[files]]\nlayout = \"bill_custom_detail\"")
        .expect("bill_custom_detail entry");
    std::fs::write(&manifest_path, &manifest[..cut]).expect("write manifest");

    let err = LayoutCatalog::load(dir.path()).unwrap_err();
    assert!(
        matches!(
            err,
            LayoutError::MissingLayout {
                layout: LayoutId::BillCustomDetail
            }
        ),
        "{err}"
    );
}

#[test]
fn missing_layout_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_layouts(dir.path());
    std::fs::remove_file(dir.path().join("service_provider.csv")).expect("remove file");

    let err = LayoutCatalog::load(dir.path()).unwrap_err();
    assert!(matches!(err, LayoutError::MissingFile { .. }), "{err}");
}
