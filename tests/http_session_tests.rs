//! Integration tests for the HTTP-backed page session
//!
//! Runs `HttpSession` against a wiremock server standing in for the
//! form-driven source: the query form postback, the window stack, and
//! the error cases a real server produces.

use catalog_crawl::config::{ClientConfig, SourceConfig};
use catalog_crawl::markup::Link;
use catalog_crawl::session::{HttpSession, PageSession};
use catalog_crawl::CatalogError;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORM_PAGE: &str = r#"
    <html><body><form action="query.aspx" method="post">
        <input type="hidden" name="__VIEWSTATE" value="abc123" />
        <input type="hidden" name="__EVENTVALIDATION" value="def456" />
        <select id="dpJhlx" name="dpJhlx">
            <option value="1" selected>First major</option>
            <option value="2">Second major</option>
        </select>
        <select id="dpRxnd" name="dpRxnd">
            <option>2016</option>
            <option>2017</option>
        </select>
        <input type="submit" id="btnQuery" name="btnQuery" value="Query" />
    </form></body></html>"#;

const LISTING_PAGE: &str = r#"
    <html><body><table id="grdJxjh">
        <tr class="tbshowlist">
            <td>Engineering</td>
            <td><a href="entity1.aspx">Mechanical</a></td>
        </tr>
    </table></body></html>"#;

const ENTITY_PAGE: &str = r#"
    <html><body><table id="Table1">
        <tr><td><a href="cat1.aspx">Compulsory</a></td></tr>
    </table></body></html>"#;

fn source_config(base_url: String) -> SourceConfig {
    SourceConfig {
        base_url,
        type_selector: "dpJhlx".to_string(),
        scope_selector: "dpRxnd".to_string(),
        query_button: "btnQuery".to_string(),
        entity_table_id: "grdJxjh".to_string(),
        entity_row_class: "tbshowlist".to_string(),
        category_table_id: "Table1".to_string(),
        record_table_ids: vec!["DataGrid1".to_string(), "DataGrid2".to_string()],
        skip_labels: Vec::new(),
    }
}

async fn server_with_form() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORM_PAGE))
        .mount(&server)
        .await;
    server
}

async fn connect(server: &MockServer) -> HttpSession {
    let source = source_config(format!("{}/query.aspx", server.uri()));
    HttpSession::connect(&source, &ClientConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_connect_exposes_form_options() {
    let server = server_with_form().await;
    let session = connect(&server).await;

    assert_eq!(
        session.option_labels("dpJhlx").unwrap(),
        vec!["First major", "Second major"]
    );
    assert_eq!(session.option_labels("dpRxnd").unwrap(), vec!["2016", "2017"]);

    assert!(matches!(
        session.option_labels("dpMissing"),
        Err(CatalogError::FormInteraction { control }) if control == "dpMissing"
    ));
}

#[tokio::test]
async fn test_query_scope_posts_state_and_selections() {
    let server = server_with_form().await;

    Mock::given(method("POST"))
        .and(path("/query.aspx"))
        .and(body_string_contains("__VIEWSTATE=abc123"))
        .and(body_string_contains("__EVENTVALIDATION=def456"))
        .and(body_string_contains("dpJhlx=1"))
        .and(body_string_contains("dpRxnd=2016"))
        .and(body_string_contains("btnQuery=Query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    session.query_scope("First major", "2016").await.unwrap();

    // The result replaces the root view in place
    assert!(session.current_markup().contains("grdJxjh"));
    assert!(session.current_address().ends_with("/query.aspx"));
}

#[tokio::test]
async fn test_query_scope_rejects_unknown_label() {
    let server = server_with_form().await;
    let mut session = connect(&server).await;

    assert!(matches!(
        session.query_scope("First major", "1999").await,
        Err(CatalogError::UnknownOption { label, selector })
            if label == "1999" && selector == "dpRxnd"
    ));
}

#[tokio::test]
async fn test_enter_and_leave_walk_the_window_stack() {
    let server = server_with_form().await;
    Mock::given(method("POST"))
        .and(path("/query.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/entity1.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENTITY_PAGE))
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    session.query_scope("First major", "2016").await.unwrap();

    let link = Link {
        name: "Mechanical".to_string(),
        address: "entity1.aspx".to_string(),
    };
    session.enter(&link).await.unwrap();
    assert!(session.current_address().ends_with("/entity1.aspx"));
    assert!(session.current_markup().contains("Table1"));

    session.leave().await.unwrap();
    assert!(session.current_address().ends_with("/query.aspx"));
    assert!(session.current_markup().contains("grdJxjh"));

    // The root view cannot be left
    assert!(matches!(
        session.leave().await,
        Err(CatalogError::WindowStackUnderflow)
    ));
}

#[tokio::test]
async fn test_enter_rejects_non_navigable_addresses() {
    let server = server_with_form().await;
    let mut session = connect(&server).await;

    let script = Link {
        name: "Close".to_string(),
        address: "javascript:window.close()".to_string(),
    };
    assert!(matches!(
        session.enter(&script).await,
        Err(CatalogError::Navigation { .. })
    ));

    let empty = Link {
        name: "Blank".to_string(),
        address: String::new(),
    };
    assert!(matches!(
        session.enter(&empty).await,
        Err(CatalogError::Navigation { .. })
    ));
}

#[tokio::test]
async fn test_enter_surfaces_http_errors() {
    let server = server_with_form().await;
    Mock::given(method("GET"))
        .and(path("/entity1.aspx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    let link = Link {
        name: "Mechanical".to_string(),
        address: "entity1.aspx".to_string(),
    };

    assert!(matches!(
        session.enter(&link).await,
        Err(CatalogError::Navigation { message, .. }) if message.contains("500")
    ));
}

#[tokio::test]
async fn test_refresh_refetches_current_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORM_PAGE))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/query.aspx"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FORM_PAGE.replace("abc123", "fresh789")),
        )
        .mount(&server)
        .await;

    let mut session = connect(&server).await;
    assert!(session.current_markup().contains("abc123"));

    session.refresh().await.unwrap();
    assert!(session.current_markup().contains("fresh789"));
}
