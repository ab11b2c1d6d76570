// Parse module tests.

use super::*;

const BASE_URL: &str = "http://url.ru";

fn page_with_head(head: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
        <html>
            <head>{head}</head>
            <body></body>
        </html>"#
    )
}

#[test]
fn test_check_for_meta_without_meta() {
    assert_eq!(check_for_meta("<nothing>", BASE_URL), None);
    assert_eq!(check_for_meta(&page_with_head(""), BASE_URL), None);
}

#[test]
fn test_check_for_meta_bare_meta() {
    assert_eq!(check_for_meta(&page_with_head("<meta/>"), BASE_URL), None);
}

#[test]
fn test_check_for_meta_without_http_equiv() {
    let page = page_with_head(r#"<meta content="5; url=http://second.com/"/>"#);
    assert_eq!(check_for_meta(&page, BASE_URL), None);
}

#[test]
fn test_check_for_meta_http_equiv_not_refresh() {
    let page = page_with_head(r#"<meta Http-equiv=None" content="5; url=http://second.com/">"#);
    assert_eq!(check_for_meta(&page, BASE_URL), None);
}

#[test]
fn test_check_for_meta_content_without_url_part() {
    let page = page_with_head(r#"<meta Http-equiv="Refresh" content="5">"#);
    assert_eq!(check_for_meta(&page, BASE_URL), None);
}

#[test]
fn test_check_for_meta_content_with_three_parts() {
    let page = page_with_head(r#"<meta http-equiv="refresh" content="5; url=/a; extra">"#);
    assert_eq!(check_for_meta(&page, BASE_URL), None);
}

#[test]
fn test_check_for_meta_malformed_url_part() {
    let page = page_with_head(r#"<meta Http-equiv="Refresh" content="5; url is %$!@*">"#);
    assert_eq!(check_for_meta(&page, "http://first.com/"), None);
}

#[test]
fn test_check_for_meta_absolute_target() {
    let page =
        page_with_head(r#"<meta http-equiv="refresh" content="5; url=http://redirect-url.ru">"#);
    assert_eq!(
        check_for_meta(&page, BASE_URL),
        Some("http://redirect-url.ru".to_string())
    );
}

#[test]
fn test_check_for_meta_absolute_target_query_untouched() {
    let page = page_with_head(
        r#"<meta http-equiv="refresh" content="5; url=http://redirect-url.ru/a?q=x y">"#,
    );
    assert_eq!(
        check_for_meta(&page, BASE_URL),
        Some("http://redirect-url.ru/a?q=x y".to_string())
    );
}

#[test]
fn test_check_for_meta_relative_target_query_untouched() {
    let page = page_with_head(r#"<meta http-equiv="refresh" content="0; url=../go?to=a b#top">"#);
    assert_eq!(
        check_for_meta(&page, "http://example.com/dir/sub/page?old=1"),
        Some("http://example.com/dir/go?to=a b#top".to_string())
    );
}

#[test]
fn test_check_for_meta_query_only_target_replaces_query() {
    let page = page_with_head(r#"<meta http-equiv="refresh" content="0; url=?page=2">"#);
    assert_eq!(
        check_for_meta(&page, "http://example.com/list?page=1"),
        Some("http://example.com/list?page=2".to_string())
    );
}

#[test]
fn test_check_for_meta_is_case_insensitive() {
    let page = page_with_head(r#"<META HTTP-EQUIV="REFRESH" CONTENT="0;URL=/landing">"#);
    assert_eq!(
        check_for_meta(&page, "http://example.com/start/page"),
        Some("http://example.com/landing".to_string())
    );
}

#[test]
fn test_check_for_meta_relative_target_is_joined_and_normalized() {
    let page = page_with_head(r#"<meta http-equiv="refresh" content="0; url='next page.html'">"#);
    assert_eq!(
        check_for_meta(&page, "http://example.com/dir/index.html"),
        Some("http://example.com/dir/next%20page.html".to_string())
    );
}

#[test]
fn test_check_for_meta_bad_target_host() {
    let page = page_with_head(r#"<meta http-equiv="refresh" content="0; url=http://.bad/">"#);
    assert_eq!(check_for_meta(&page, BASE_URL), None);
}

#[test]
fn test_get_counters_canonical_order() {
    let counters = get_counters("mc.yandex.ru/metrika/watch.js google-analytics.com/ga.js");
    let names: Vec<&str> = counters.iter().map(Counter::as_str).collect();
    assert_eq!(names, vec!["GOOGLE_ANALYTICS", "YA_METRICA"]);
}

#[test]
fn test_get_counters_order_independent_and_deduplicated() {
    let forward = get_counters(
        r#"<script src="//top-fwz1.mail.ru/counter?id=1"></script>
           <a href="http://top.mail.ru/jump?from=1"></a>
           <script src="https://counter.rambler.ru/top100.jcn?1"></script>"#,
    );
    let backward = get_counters(
        r#"<script src="https://counter.rambler.ru/top100.jcn?1"></script>
           <script src="//top-fwz1.mail.ru/counter?id=1"></script>"#,
    );
    assert_eq!(forward, backward);
    assert_eq!(forward.len(), 2);
}

#[test]
fn test_get_counters_case_insensitive() {
    let counters = get_counters("<script src='//VISTRAC.com/static/vt.js'></script>");
    assert!(counters.contains(&Counter::Vistrac));
}

#[test]
fn test_get_counters_empty() {
    assert!(get_counters("").is_empty());
    assert!(get_counters("content_without_counters").is_empty());
}

#[test]
fn test_counter_set_serializes_as_names() {
    let counters = get_counters("//counter.yadro.ru/hit //googleads.g.doubleclick.net/pagead/viewthroughconversion/1");
    assert_eq!(
        serde_json::to_string(&counters).unwrap(),
        r#"["DOUBLECLICK","LI_RU"]"#
    );
}
