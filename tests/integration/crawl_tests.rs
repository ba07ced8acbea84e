//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the registry and test the
//! search, detail, procedure and download stages end-to-end.

use std::path::Path;
use tempfile::TempDir;
use via_harvest::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use via_harvest::crawler::{DocumentListCrawler, HttpSession, ProjectRecord};
use via_harvest::output::{read_project_list, write_project_list};
use via_harvest::{DownloadOutcome, Downloader, HarvestError, Harvester, SearchType, Termination};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const SEARCH_PATH: &str = "/it-IT/Ricerca/ViaLibera";

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, download_root: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            ..SiteConfig::default()
        },
        crawler: CrawlerConfig {
            request_delay_ms: 0, // No pause between requests in tests
            page_timeout_secs: 5,
            download_timeout_secs: 5,
            max_pages: 50,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: None,
            contact_email: Some("test@example.com".to_string()),
        },
        output: OutputConfig {
            download_root: download_root.to_string_lossy().into_owned(),
            project_list_path: download_root
                .join("projects_list.csv")
                .to_string_lossy()
                .into_owned(),
        },
    }
}

/// Matches requests whose query lacks the given parameter
struct NoQueryParam(&'static str);

impl Match for NoQueryParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn pagination_label(current: u32, total: u32) -> String {
    format!(
        r#"<ul class="pagination"><li><a href="?pagina=1">1</a></li><li class="etichettaRicerca">Pagina {} di {}</li></ul>"#,
        current, total
    )
}

fn search_page(hrefs: &[&str], pagination: &str) -> ResponseTemplate {
    let links: String = hrefs
        .iter()
        .map(|href| format!(r#"<div class="risultato"><a href="{}">Progetto</a></div>"#, href))
        .collect();
    html(format!(r#"<a href="/it-IT/Home">Home</a>{}{}"#, links, pagination))
}

fn detail_page(procedure_hrefs: &[&str]) -> ResponseTemplate {
    let links: String = procedure_hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{}">Documentazione</a></li>"#, href))
        .collect();
    html(format!("<h1>Scheda progetto</h1><ul>{}</ul>", links))
}

/// A document table row: (file name, download href or None for a bare anchor)
fn procedure_page(rows: &[(&str, Option<&str>)], pagination: &str) -> ResponseTemplate {
    let mut table = String::from(
        r#"<table class="Documentazione"><tr><th>#</th><th>Nome file</th><th>Descrizione</th><th>Codice</th><th>Data</th><th>Tipo</th><th>Scala</th><th>Dim.</th><th></th></tr>"#,
    );
    for (idx, (filename, href)) in rows.iter().enumerate() {
        let anchor = match href {
            Some(href) => format!(
                r#"<a href="{}" title="Scarica il documento"><img src="dl.png"></a>"#,
                href
            ),
            None => r#"<a href="/File/Anteprima" title="Anteprima">vedi</a>"#.to_string(),
        };
        table.push_str(&format!(
            "<tr><td>{}</td><td> {} </td><td>d</td><td>c</td><td>2024</td><td>pdf</td><td>-</td><td>1 MB</td><td>{}</td></tr>",
            idx + 1,
            filename,
            anchor
        ));
    }
    table.push_str("</table>");
    html(format!("{}{}", table, pagination))
}

async fn mount_search_page(
    server: &MockServer,
    keyword: &str,
    type_code: &str,
    page: u32,
    response: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("Testo", keyword))
        .and(query_param("t", type_code))
        .and(query_param("pagina", page.to_string().as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_three_page_search_visits_each_detail_once() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    // Page 2 repeats a link from page 1; it must not be visited twice
    let pages: [&[&str]; 3] = [
        &["/it-IT/Oggetti/Info/101", "/it-IT/Oggetti/Info/102"],
        &[
            "/it-IT/Oggetti/Info/101",
            "/it-IT/Oggetti/Info/103",
            "/it-IT/Oggetti/Info/104",
        ],
        &["/it-IT/Oggetti/Info/105", "/it-IT/Oggetti/Info/106"],
    ];
    for (idx, hrefs) in pages.iter().enumerate() {
        let page = idx as u32 + 1;
        mount_search_page(
            &mock_server,
            "eolico",
            "o",
            page,
            search_page(hrefs, &pagination_label(page, 3)),
        )
        .await;
    }

    for id in 101..=106 {
        Mock::given(method("GET"))
            .and(path(format!("/it-IT/Oggetti/Info/{}", id)))
            .respond_with(detail_page(&[]))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut harvester = Harvester::new(config).unwrap();
    let stats = harvester
        .harvest_keyword("eolico", SearchType::Projects)
        .await
        .unwrap();

    assert_eq!(stats.listing_pages, 3);
    assert_eq!(stats.projects, 6);
    assert_eq!(
        stats.listing_termination,
        Some(Termination::LastPage { total: 3 })
    );
    assert_eq!(stats.failed_projects, 0);
    assert_eq!(harvester.requests_sent(), 9);

    // One folder per project, even without documents
    for id in 101..=106 {
        assert!(dir
            .path()
            .join("eolico")
            .join("Progetti")
            .join(id.to_string())
            .is_dir());
    }
}

#[tokio::test]
async fn test_search_failure_on_page_two_returns_page_one_links() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_search_page(
        &mock_server,
        "fotovoltaico",
        "o",
        1,
        search_page(
            &["/it-IT/Oggetti/Info/201", "/it-IT/Oggetti/Info/202"],
            &pagination_label(1, 3),
        ),
    )
    .await;
    mount_search_page(
        &mock_server,
        "fotovoltaico",
        "o",
        2,
        ResponseTemplate::new(500),
    )
    .await;

    // Page 3 must never be requested
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("pagina", "3"))
        .respond_with(search_page(&[], &pagination_label(3, 3)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut harvester = Harvester::new(config).unwrap();
    let results = harvester
        .search("fotovoltaico", SearchType::Projects)
        .await
        .unwrap();

    let base = mock_server.uri();
    assert_eq!(
        results.links.into_vec(),
        vec![
            format!("{}/it-IT/Oggetti/Info/201", base),
            format!("{}/it-IT/Oggetti/Info/202", base),
        ]
    );
    assert_eq!(results.pages, 1);
    assert!(matches!(
        results.termination,
        Termination::FetchFailed { page: 2, .. }
    ));
    assert!(results.termination.is_truncated());
}

#[tokio::test]
async fn test_document_search_collects_documentation_links() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_search_page(
        &mock_server,
        "rumore",
        "d",
        1,
        search_page(
            &[
                "/it-IT/Oggetti/Info/301",
                "/it-IT/Oggetti/Documentazione/301/7001",
            ],
            r#"<h3 class="risultati">Documenti (1)</h3>"#,
        ),
    )
    .await;

    let mut harvester = Harvester::new(config).unwrap();
    let results = harvester
        .search("rumore", SearchType::Documents)
        .await
        .unwrap();

    assert_eq!(
        results.links.into_vec(),
        vec![format!(
            "{}/it-IT/Oggetti/Documentazione/301/7001",
            mock_server.uri()
        )]
    );
    assert_eq!(results.termination, Termination::LastPage { total: 1 });
}

#[tokio::test]
async fn test_rows_without_download_anchor_are_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/it-IT/Oggetti/Documentazione/101/9001"))
        .respond_with(procedure_page(
            &[
                ("Relazione.pdf", Some("/File/Documento/1")),
                ("Tavola 1.pdf", Some("/File/Documento/2")),
                ("Tavola 2.pdf", None),
                ("Sintesi.pdf", Some("/File/Documento/4")),
            ],
            "",
        ))
        .mount(&mock_server)
        .await;

    let mut session = HttpSession::new(&config).unwrap();
    let procedure_url = format!("{}/it-IT/Oggetti/Documentazione/101/9001", mock_server.uri());
    let listing = DocumentListCrawler::new(&config)
        .crawl(&mut session, &procedure_url)
        .await;

    let names: Vec<&str> = listing.items.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["Relazione.pdf", "Tavola 1.pdf", "Sintesi.pdf"]);
    assert_eq!(
        listing.items[2].download_url,
        format!("{}/File/Documento/4", mock_server.uri())
    );
    assert_eq!(listing.termination, Termination::LastPage { total: 1 });
}

#[tokio::test]
async fn test_procedure_pagination_appends_page_param() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let procedure_path = "/it-IT/Oggetti/Documentazione/101/9001";

    Mock::given(method("GET"))
        .and(path(procedure_path))
        .and(NoQueryParam("pagina"))
        .respond_with(procedure_page(
            &[("A.pdf", Some("/File/Documento/1"))],
            &pagination_label(1, 2),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(procedure_path))
        .and(query_param("pagina", "2"))
        .respond_with(procedure_page(
            &[("B.pdf", Some("/File/Documento/2"))],
            &pagination_label(2, 2),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut session = HttpSession::new(&config).unwrap();
    let listing = DocumentListCrawler::new(&config)
        .crawl(&mut session, &format!("{}{}", mock_server.uri(), procedure_path))
        .await;

    let names: Vec<&str> = listing.items.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["A.pdf", "B.pdf"]);
    assert_eq!(listing.pages, 2);
    assert!(listing.termination.is_complete());
}

#[tokio::test]
async fn test_procedure_without_document_table_is_empty() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/it-IT/Oggetti/Documentazione/101/9002"))
        .respond_with(html("<p>Nessun documento</p>".to_string()))
        .mount(&mock_server)
        .await;

    let mut session = HttpSession::new(&config).unwrap();
    let listing = DocumentListCrawler::new(&config)
        .crawl(
            &mut session,
            &format!("{}/it-IT/Oggetti/Documentazione/101/9002", mock_server.uri()),
        )
        .await;

    assert!(listing.items.is_empty());
    assert!(matches!(
        listing.termination,
        Termination::MarkerMissing { page: 1, .. }
    ));
}

#[tokio::test]
async fn test_save_twice_fetches_once() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/File/Documento/5001"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 relazione".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut session = HttpSession::new(&config).unwrap();
    let downloader = Downloader::new();
    let url = format!("{}/File/Documento/5001", mock_server.uri());
    let project_dir = dir.path().join("10217");

    let first = downloader
        .save(&mut session, &url, "Relazione: generale.pdf", &project_dir)
        .await
        .unwrap();
    let second = downloader
        .save(&mut session, &url, "Relazione: generale.pdf", &project_dir)
        .await
        .unwrap();

    let expected = project_dir.join("Relazione_ generale.pdf");
    assert_eq!(
        first,
        DownloadOutcome::Saved {
            path: expected.clone(),
            bytes: 18
        }
    );
    assert_eq!(second, DownloadOutcome::Skipped { path: expected.clone() });
    assert_eq!(std::fs::read(&expected).unwrap(), b"%PDF-1.4 relazione");
    assert!(!project_dir.join("Relazione_ generale.pdf.part").exists());
    assert_eq!(session.requests_sent(), 1);
}

#[tokio::test]
async fn test_failed_download_leaves_no_file() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/File/Documento/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut session = HttpSession::new(&config).unwrap();
    let err = Downloader::new()
        .save(
            &mut session,
            &format!("{}/File/Documento/404", mock_server.uri()),
            "Mancante.pdf",
            dir.path(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::HttpStatus { status: 404, .. }));
    assert!(err.is_transport());
    assert!(!dir.path().join("Mancante.pdf").exists());
}

#[tokio::test]
async fn test_empty_filename_is_rejected_without_request() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut session = HttpSession::new(&config).unwrap();
    let err = Downloader::new()
        .save(
            &mut session,
            &format!("{}/File/Documento/1", mock_server.uri()),
            "   ",
            dir.path(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::EmptyFilename { .. }));
}

/// Mounts one project with a detail page, a procedure page and two documents
async fn mount_project(server: &MockServer, id: u32, downloads_expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/it-IT/Oggetti/Info/{}", id)))
        .respond_with(detail_page(&[&format!(
            "/it-IT/Oggetti/Documentazione/{}/9{}",
            id, id
        )]))
        .mount(server)
        .await;

    let first_doc = format!("/File/Documento/{}1", id);
    let second_doc = format!("/File/Documento/{}2", id);
    Mock::given(method("GET"))
        .and(path(format!("/it-IT/Oggetti/Documentazione/{}/9{}", id, id)))
        .respond_with(procedure_page(
            &[
                ("Relazione tecnica.pdf", Some(first_doc.as_str())),
                ("Tavola A/B.pdf", Some(second_doc.as_str())),
            ],
            "",
        ))
        .mount(server)
        .await;

    for n in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/File/Documento/{}{}", id, n)))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(format!("documento {}-{}", id, n).into_bytes()),
            )
            .expect(downloads_expected)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_full_harvest_is_idempotent() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_search_page(
        &mock_server,
        "eolico offshore",
        "o",
        1,
        search_page(
            &["/it-IT/Oggetti/Info/11", "/it-IT/Oggetti/Info/12"],
            r#"<h3 class="risultati">Progetti (2)</h3>"#,
        ),
    )
    .await;
    mount_project(&mock_server, 11, 1).await;
    mount_project(&mock_server, 12, 1).await;

    let mut harvester = Harvester::new(config).unwrap();

    let first = harvester
        .harvest_keyword("eolico offshore", SearchType::Projects)
        .await
        .unwrap();
    assert_eq!(first.projects, 2);
    assert_eq!(first.documents_found, 4);
    assert_eq!(first.downloaded, 4);
    assert_eq!(first.skipped, 0);
    assert_eq!(first.failed, 0);

    let project_dir = dir.path().join("eolico offshore").join("Progetti").join("11");
    assert_eq!(
        std::fs::read_to_string(project_dir.join("Relazione tecnica.pdf")).unwrap(),
        "documento 11-1"
    );
    assert_eq!(
        std::fs::read_to_string(project_dir.join("Tavola A_B.pdf")).unwrap(),
        "documento 11-2"
    );

    // A second run finds every file on disk and downloads nothing
    let second = harvester
        .harvest_keyword("eolico offshore", SearchType::Projects)
        .await
        .unwrap();
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.skipped, 4);
}

#[tokio::test]
async fn test_unreachable_detail_page_is_counted_and_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_search_page(
        &mock_server,
        "idroelettrico",
        "o",
        1,
        search_page(
            &["/it-IT/Oggetti/Info/21", "/it-IT/Oggetti/Info/22"],
            &pagination_label(1, 1),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/it-IT/Oggetti/Info/21"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_project(&mock_server, 22, 1).await;

    let mut harvester = Harvester::new(config).unwrap();
    let stats = harvester
        .harvest_keyword("idroelettrico", SearchType::Projects)
        .await
        .unwrap();

    assert_eq!(stats.failed_projects, 1);
    assert_eq!(stats.downloaded, 2);
}

#[tokio::test]
async fn test_project_list_then_download_selected() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let list_path = dir.path().join("projects_list.csv");

    let results_table = r#"<table class="ElencoViaVasRicerca">
        <tr><th>Titolo</th><th>Proponente</th><th>Stato</th><th>Info</th><th>Doc</th></tr>
        <tr><td> Parco eolico Alfa </td><td>Alfa S.r.l.</td><td>In corso</td>
            <td><a href="/it-IT/Oggetti/Info/11">Info</a></td>
            <td><a href="/it-IT/Oggetti/Documentazione/11/911">Doc</a></td></tr>
        <tr><td>Parco eolico Beta</td><td>Beta S.p.A.</td><td>Concluso</td>
            <td><a href="/it-IT/Oggetti/Info/12">Info</a></td>
            <td><a href="/it-IT/Oggetti/Documentazione/12/912">Doc</a></td></tr>
        <tr><td>Riga incompleta</td><td>-</td></tr>
    </table>"#;
    mount_search_page(
        &mock_server,
        "eolico",
        "o",
        1,
        html(format!(
            r#"<h3 class="risultati">Progetti (2)</h3>{}"#,
            results_table
        )),
    )
    .await;
    mount_project(&mock_server, 11, 1).await;
    mount_project(&mock_server, 12, 0).await;

    let mut harvester = Harvester::new(config).unwrap();
    let listing = harvester.list_projects("eolico").await.unwrap();
    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.items[0].id, "11");
    assert_eq!(listing.items[0].title, "Parco eolico Alfa");
    assert_eq!(listing.items[1].status, "Concluso");
    assert!(listing.items.iter().all(|p| p.is_included()));

    write_project_list(&list_path, &listing.items).unwrap();

    // The user deselects the second project
    let mut records = read_project_list(&list_path).unwrap();
    records[1].include = "NO".to_string();

    let stats = harvester
        .harvest_project_list(&records, "Selezione: nord")
        .await
        .unwrap();

    assert_eq!(stats.projects, 1);
    assert_eq!(stats.downloaded, 2);
    let project_dir = dir.path().join("Selezione_ nord").join("11");
    assert!(project_dir.join("Relazione tecnica.pdf").is_file());
    assert!(!dir.path().join("Selezione_ nord").join("12").exists());
}

#[tokio::test]
async fn test_project_list_without_results_table() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_search_page(
        &mock_server,
        "inesistente",
        "o",
        1,
        html("<p>Nessun risultato</p>".to_string()),
    )
    .await;

    let mut harvester = Harvester::new(config).unwrap();
    let listing = harvester.list_projects("inesistente").await.unwrap();

    assert!(listing.items.is_empty());
    assert_eq!(
        listing.termination,
        Termination::MarkerMissing {
            page: 1,
            marker: "table.ElencoViaVasRicerca".to_string()
        }
    );
}

#[tokio::test]
async fn test_search_stops_at_page_limit() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawler.max_pages = 2;

    for page in 1..=2u32 {
        let href = format!("/it-IT/Oggetti/Info/40{}", page);
        mount_search_page(
            &mock_server,
            "geotermico",
            "o",
            page,
            search_page(&[href.as_str()], &pagination_label(page, 5)),
        )
        .await;
    }
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("pagina", "3"))
        .respond_with(search_page(&[], &pagination_label(3, 5)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut harvester = Harvester::new(config).unwrap();
    let results = harvester
        .search("geotermico", SearchType::Projects)
        .await
        .unwrap();

    assert_eq!(results.links.len(), 2);
    assert_eq!(results.pages, 2);
    assert_eq!(results.termination, Termination::PageLimit { limit: 2 });
    assert!(results.termination.is_truncated());
    assert_eq!(harvester.requests_sent(), 2);
}

#[tokio::test]
async fn test_search_stops_when_total_shrinks() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_search_page(
        &mock_server,
        "biomasse",
        "o",
        1,
        search_page(&["/it-IT/Oggetti/Info/501"], &pagination_label(1, 3)),
    )
    .await;
    // The registry shrank between requests and page 2 now claims to be the last
    mount_search_page(
        &mock_server,
        "biomasse",
        "o",
        2,
        search_page(&["/it-IT/Oggetti/Info/502"], &pagination_label(2, 1)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("pagina", "3"))
        .respond_with(search_page(&[], &pagination_label(3, 3)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut harvester = Harvester::new(config).unwrap();
    let results = harvester
        .search("biomasse", SearchType::Projects)
        .await
        .unwrap();

    assert_eq!(results.links.len(), 2);
    assert_eq!(results.pages, 2);
    assert_eq!(results.termination, Termination::LastPage { total: 1 });
    assert_eq!(harvester.requests_sent(), 2);
}

#[tokio::test]
async fn test_project_list_with_header_only_table() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_search_page(
        &mock_server,
        "maree",
        "o",
        1,
        html(
            r#"<table class="ElencoViaVasRicerca">
                <tr><th>Titolo</th><th>Proponente</th><th>Stato</th><th>Info</th><th>Doc</th></tr>
            </table>"#
                .to_string(),
        ),
    )
    .await;

    let mut harvester = Harvester::new(config).unwrap();
    let listing = harvester.list_projects("maree").await.unwrap();

    assert!(listing.items.is_empty());
    assert_eq!(listing.pages, 1);
    assert_eq!(listing.termination, Termination::EmptyPage { page: 1 });
}

#[tokio::test]
async fn test_leftover_partial_file_is_replaced() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/File/Documento/6001"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"full".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // An interrupted earlier run left a longer partial file behind
    std::fs::write(dir.path().join("a.pdf.part"), b"stale partial content").unwrap();

    let mut session = HttpSession::new(&config).unwrap();
    let outcome = Downloader::new()
        .save(
            &mut session,
            &format!("{}/File/Documento/6001", mock_server.uri()),
            "a.pdf",
            dir.path(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Saved {
            path: dir.path().join("a.pdf"),
            bytes: 4
        }
    );
    assert_eq!(std::fs::read(dir.path().join("a.pdf")).unwrap(), b"full");
    assert!(!dir.path().join("a.pdf.part").exists());
}

#[tokio::test]
async fn test_single_project_by_id() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("scelti");
    let config = create_test_config(&mock_server.uri(), &dir.path().join("root"));
    mount_project(&mock_server, 31, 1).await;

    let mut harvester = Harvester::new(config).unwrap();
    let stats = harvester.harvest_project(" 31 ", Some(&dest)).await.unwrap();

    assert_eq!(stats.projects, 1);
    assert_eq!(stats.failed_projects, 0);
    assert_eq!(stats.procedure_pages, 1);
    assert_eq!(stats.downloaded, 2);
    assert_eq!(harvester.requests_sent(), 4);

    let project_dir = dest.join("31");
    assert_eq!(
        std::fs::read_to_string(project_dir.join("Relazione tecnica.pdf")).unwrap(),
        "documento 31-1"
    );
    assert_eq!(
        std::fs::read_to_string(project_dir.join("Tavola A_B.pdf")).unwrap(),
        "documento 31-2"
    );
    assert!(!dir.path().join("root").exists());

    // Already on disk: the second run only walks the pages
    let again = harvester.harvest_project("31", Some(&dest)).await.unwrap();
    assert_eq!(again.downloaded, 0);
    assert_eq!(again.skipped, 2);
}

#[tokio::test]
async fn test_single_project_with_unreachable_detail_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/it-IT/Oggetti/Info/32"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut harvester = Harvester::new(config).unwrap();
    let stats = harvester.harvest_project("32", None).await.unwrap();

    assert_eq!(stats.failed_projects, 1);
    assert_eq!(stats.documents_found, 0);
    assert!(dir.path().join("32").is_dir());
}

#[tokio::test]
async fn test_dot_segment_ids_stay_inside_list_folder() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    mount_project(&mock_server, 33, 1).await;

    // A hand-edited list row whose id would name the parent folder
    let records = vec![ProjectRecord {
        id: "..".to_string(),
        title: "Impianto Gamma".to_string(),
        documentation_url: format!("{}/it-IT/Oggetti/Documentazione/33/933", mock_server.uri()),
        include: "YES".to_string(),
        ..ProjectRecord::default()
    }];

    let mut harvester = Harvester::new(config).unwrap();
    let stats = harvester
        .harvest_project_list(&records, "lista")
        .await
        .unwrap();

    assert_eq!(stats.downloaded, 2);
    let project_dir = dir.path().join("lista").join("UnknownProject");
    assert!(project_dir.join("Relazione tecnica.pdf").is_file());
    assert!(!dir.path().join("Relazione tecnica.pdf").exists());
}

