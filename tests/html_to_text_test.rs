mod common;

use assert2::check;
use common::read_fixture;
use rstest::rstest;
use sphinx_search::html_to_text;
use sphinx_search::snippet::{ScraperParser, html_to_text_with};

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

#[test]
fn html_to_text_basic_case() {
    let html = read_fixture("html/index.html");
    check!(
        words(&html_to_text(&html, None))
            == [
                "Getting", "Started", "Some", "text", "Other", "Section", "Other", "text", "Yet",
                "Another", "Section", "More", "text",
            ]
    );
}

#[rstest]
#[case("#other-section")]
#[case("other-section")]
fn html_to_text_starts_at_anchor(#[case] anchor: &str) {
    let html = read_fixture("html/index.html");
    check!(words(&html_to_text(&html, Some(anchor))) == ["Other", "Section", "Other", "text"]);
}

#[test]
fn html_to_text_skips_scripts_styles_and_permalinks() {
    let text = html_to_text(&read_fixture("html/index.html"), None);
    check!(!text.contains("console.log"));
    check!(!text.contains("text-align"));
    check!(!text.contains('¶'));
    check!(!text.contains("main content"));
}

#[test]
fn html_to_text_ignores_ids_outside_main() {
    let html = r#"<html><body>
        <div id="sidebar">Sidebar links</div>
        <div role="main"><p>Body text</p></div>
    </body></html>"#;
    check!(words(&html_to_text(html, Some("#sidebar"))) == ["Body", "text"]);
}

#[rstest]
#[case("")]
#[case("<html><body><p>No main region</p></body></html>")]
#[case("<<<not html")]
fn html_to_text_without_main_region_is_empty(#[case] html: &str) {
    check!(html_to_text(html, None).is_empty());
}

#[test]
fn html_to_text_with_explicit_parser() {
    let html = read_fixture("html/index.html");
    check!(html_to_text_with(&ScraperParser, &html, Some("#yet-another-section")).contains("More text"));
}
