use ena_search::catalog::Catalog;
use ena_search::request::{
    FileReportParams, ReportKind, RetrieveParams, SearchParams, TaxonParams, ValidatedCount,
};
use ena_search::url::UrlBuilder;
use ena_search::validate::Validator;

fn run_search() -> SearchParams {
    SearchParams {
        query: "tax_eq(9606)".to_string(),
        result: "read_run".to_string(),
        display: "report".to_string(),
        fields: Some(vec!["run_accession".to_string(), "fastq_ftp".to_string()]),
        length: Some(0),
        ..SearchParams::default()
    }
}

#[test]
fn unbounded_read_run_search() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let search = run_search().validate(&validator).unwrap();

    let url = UrlBuilder::default().search_url(&search);
    assert!(url.starts_with("https://www.ebi.ac.uk/ena/data/warehouse/search?"));
    assert!(url.contains("result=read_run&fields=run_accession,fastq_ftp"));
    assert!(url.contains("query=tax_eq%289606%29"));
    assert!(url.contains("display=report"));
    assert!(!url.contains("length="));
    assert!(!url.contains("offset="));
}

#[test]
fn search_url_is_deterministic_and_sensitive() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let builder = UrlBuilder::default();

    let base = builder.search_url(&run_search().validate(&validator).unwrap());
    assert_eq!(base, builder.search_url(&run_search().validate(&validator).unwrap()));

    let variants = [
        SearchParams {
            length: Some(10),
            ..run_search()
        },
        SearchParams {
            offset: Some(5),
            ..run_search()
        },
        SearchParams {
            display: "xml".to_string(),
            ..run_search()
        },
        SearchParams {
            download: Some("gzip".to_string()),
            ..run_search()
        },
        SearchParams {
            query: "tax_eq(10090)".to_string(),
            ..run_search()
        },
        SearchParams {
            fields: Some(vec!["run_accession".to_string()]),
            ..run_search()
        },
        SearchParams {
            sort_fields: Some(vec!["read_count".to_string()]),
            ..run_search()
        },
        SearchParams {
            free_text: true,
            ..run_search()
        },
    ];
    for variant in variants {
        let url = builder.search_url(&variant.validate(&validator).unwrap());
        assert_ne!(url, base, "{variant:?}");
    }
}

#[test]
fn paging_parameters_follow_query() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let search = SearchParams {
        offset: Some(1),
        length: Some(500),
        sort_fields: Some(vec!["read_count".to_string()]),
        ..run_search()
    }
    .validate(&validator)
    .unwrap();

    let url = UrlBuilder::new("http://localhost:8080/ena/").search_url(&search);
    assert_eq!(
        url,
        "http://localhost:8080/ena/data/warehouse/search?result=read_run&fields=run_accession,fastq_ftp\
         &sortfields=read_count&query=tax_eq%289606%29&display=report&offset=1&length=500"
    );
}

#[test]
fn boolean_query_keeps_operators() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let search = SearchParams {
        query: r#"tissue_lib="lambda gt11" AND dataclass=STD"#.to_string(),
        result: "coding_release".to_string(),
        display: "xml".to_string(),
        ..SearchParams::default()
    }
    .validate(&validator)
    .unwrap();

    let url = UrlBuilder::default().search_url(&search);
    assert!(url.contains("query=tissue_lib%3D%22lambda%20gt11%22%20AND%20dataclass%3DSTD"));
}

#[test]
fn free_text_search_endpoint() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let search = SearchParams {
        query: "kinase+homo+sapiens".to_string(),
        result: "sequence_update".to_string(),
        display: "fasta".to_string(),
        free_text: true,
        ..SearchParams::default()
    }
    .validate(&validator)
    .unwrap();

    let url = UrlBuilder::default().search_url(&search);
    assert_eq!(
        url,
        "https://www.ebi.ac.uk/ena/data/search?result=sequence_update&query=kinase+homo+sapiens&display=fasta"
    );
}

#[test]
fn count_url_has_flag() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let count = ValidatedCount::new(&validator, "tax_eq(10090)", "assembly", false).unwrap();

    let url = UrlBuilder::default().count_url(&count);
    assert_eq!(
        url,
        "https://www.ebi.ac.uk/ena/data/warehouse/search?result=assembly&query=tax_eq%2810090%29&resultcount"
    );
}

#[test]
fn taxons_non_batch_one_url_per_id() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let retrieve = TaxonParams {
        ids: vec!["9606".to_string(), "10090".to_string()],
        display: "text".to_string(),
        ..TaxonParams::default()
    }
    .validate(&validator)
    .unwrap();

    assert!(!retrieve.is_batch());
    let urls = UrlBuilder::default().retrieve_urls(&retrieve);
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with("9606"));
    assert!(urls[1].ends_with("10090"));
    assert_eq!(urls[0], "https://www.ebi.ac.uk/ena/browser/api/text/Taxon:9606");
}

#[test]
fn taxons_batch_single_url() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let retrieve = TaxonParams {
        ids: vec!["9606".to_string(), "10090".to_string()],
        display: "xml".to_string(),
        result: Some("sequence_release".to_string()),
        ..TaxonParams::default()
    }
    .validate(&validator)
    .unwrap();

    let urls = UrlBuilder::default().retrieve_urls(&retrieve);
    assert_eq!(
        urls,
        vec![
            "https://www.ebi.ac.uk/ena/browser/api/xml/Taxon:9606,Taxon:10090?result=sequence_release"
        ]
    );
}

#[test]
fn retrieve_with_subsequence_range() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let retrieve = RetrieveParams {
        ids: vec!["A00145".to_string()],
        display: "fasta".to_string(),
        range_start: Some(3),
        range_stop: Some(63),
        ..RetrieveParams::default()
    }
    .validate(&validator)
    .unwrap();

    let urls = UrlBuilder::default().retrieve_urls(&retrieve);
    assert_eq!(urls, vec!["https://www.ebi.ac.uk/ena/browser/api/fasta/A00145:3-63"]);
}

#[test]
fn retrieve_batch_and_flags() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let retrieve = RetrieveParams {
        ids: vec!["A00145,A00146".to_string()],
        display: "text".to_string(),
        download: Some("gzip".to_string()),
        offset: Some(2),
        length: Some(10),
        expanded: true,
        header: true,
        ..RetrieveParams::default()
    }
    .validate(&validator)
    .unwrap();

    let urls = UrlBuilder::default().retrieve_urls(&retrieve);
    assert_eq!(
        urls,
        vec![
            "https://www.ebi.ac.uk/ena/browser/api/text/A00145,A00146\
             ?offset=2&length=10&expanded=true&header=true&download=gzip"
        ]
    );
}

#[test]
fn retrieve_non_batch_display_splits_ids() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let retrieve = RetrieveParams {
        ids: vec!["A00145".to_string(), "A00146".to_string()],
        display: "html".to_string(),
        ..RetrieveParams::default()
    }
    .validate(&validator)
    .unwrap();

    let urls = UrlBuilder::default().retrieve_urls(&retrieve);
    assert_eq!(
        urls,
        vec![
            "https://www.ebi.ac.uk/ena/browser/api/html/A00145",
            "https://www.ebi.ac.uk/ena/browser/api/html/A00146"
        ]
    );
}

#[test]
fn run_report_url() {
    let catalog = Catalog::packaged().unwrap();
    let validator = Validator::new(&catalog);
    let report = FileReportParams {
        accession: "SRR000001".to_string(),
        kind: ReportKind::Run,
        fields: Some(vec!["run_accession,fastq_md5".to_string()]),
    }
    .validate(&validator)
    .unwrap();

    assert_eq!(
        UrlBuilder::default().file_report_url(&report),
        "https://www.ebi.ac.uk/ena/data/warehouse/filereport?accession=SRR000001&result=read_run&fields=run_accession,fastq_md5"
    );
}
