use assert_matches::assert_matches;

use ena_search::catalog::{Catalog, Parameter, TAXON_CONTEXT, VIEW_CONTEXT};
use ena_search::error::EnaError;

#[test]
fn values_by_parameter_name() {
    let catalog = Catalog::packaged().unwrap();

    let displays = catalog.values_for("display", Some("read_run")).unwrap();
    assert_eq!(
        displays.into_iter().collect::<Vec<_>>(),
        ["fastq", "html", "report", "text", "xml"]
    );
    let fields = catalog
        .values_for("returnable_fields", Some("read_run"))
        .unwrap();
    assert!(fields.contains("fastq_ftp"));
    assert_matches!(
        catalog.values_for("colour", None),
        Err(EnaError::UnknownParameter(name)) if name == "colour"
    );
}

#[test]
fn unknown_context_is_empty() {
    let catalog = Catalog::packaged().unwrap();
    assert!(catalog.values(Parameter::Display, Some("protein")).is_empty());
    assert!(catalog.returnable_fields("protein").is_empty());
    assert!(catalog.filter_fields("protein").is_none());
}

#[test]
fn global_options_without_context() {
    let catalog = Catalog::packaged().unwrap();
    let displays = catalog.values(Parameter::Display, None);
    assert!(displays.contains("fasta") && displays.contains("fastq"));
    assert_eq!(
        catalog.values(Parameter::Download, None).into_iter().collect::<Vec<_>>(),
        ["gzip", "txt"]
    );
}

#[test]
fn taxonomy_results_are_results() {
    let catalog = Catalog::packaged().unwrap();
    let taxonomy = catalog.values(Parameter::TaxonomyResult, None);
    assert!(taxonomy.contains("sequence_release"));
    assert!(!taxonomy.contains("taxon"));
    for result in taxonomy {
        assert!(catalog.result(result).is_some(), "{result}");
    }
}

#[test]
fn batch_displays_per_context() {
    let catalog = Catalog::packaged().unwrap();
    assert!(catalog.is_batch_display(VIEW_CONTEXT, "fasta"));
    assert!(catalog.is_batch_display(VIEW_CONTEXT, "xml"));
    assert!(!catalog.is_batch_display(VIEW_CONTEXT, "html"));
    assert!(catalog.is_batch_display(TAXON_CONTEXT, "xml"));
    assert!(!catalog.is_batch_display(TAXON_CONTEXT, "text"));
}

#[test]
fn filter_types_and_special_filters() {
    let catalog = Catalog::packaged().unwrap();
    let text = &catalog.filter_types()["Text"];
    assert!(!text.operators.is_empty());

    let geo = &catalog.special_filters()["Geospatial"];
    assert!(geo.contains_key("geo_south"));
    assert!(catalog.special_filters()["Taxonomy"].contains_key("tax_tree"));
}

#[test]
fn filter_fields_carry_type() {
    let catalog = Catalog::packaged().unwrap();
    let fields = catalog.filter_fields("assembly").unwrap();
    assert!(fields.contains_key("assembly_name"));
    assert!(!fields["assembly_name"].kind.is_empty());
}

#[test]
fn custom_catalog_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"{
            "max_length": 50,
            "results": {"sample": {"description": "Samples", "returnable_fields": ["accession"]}},
            "taxonomy_results": {},
            "display_options": {"report": "Report"},
            "download_options": {"txt": "Text"},
            "display_contexts": {"sample": ["report"]},
            "download_contexts": {"sample": ["txt"]}
        }"#,
    )
    .unwrap();

    let catalog = Catalog::from_path(&path).unwrap();
    assert_eq!(catalog.max_length(), 50);
    assert_eq!(catalog.returnable_fields("sample"), ["accession"]);
    assert!(catalog.contains(Parameter::Download, Some("sample"), "txt"));
}

#[test]
fn malformed_catalog_is_reported() {
    assert_matches!(Catalog::from_json("{"), Err(EnaError::CatalogParse(_)));
    assert_matches!(
        Catalog::from_path(std::path::Path::new("/nonexistent/catalog.json")),
        Err(EnaError::Filesystem(_))
    );
}
