//! Integration tests for the redirect_checker library.
//!
//! These tests drive the public API against `httptest` mock servers and
//! in-memory tubes. They make no requests outside the loopback interface.

#[cfg(test)]
mod tests {
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use redirect_checker::error_handling::ProcessingStats;
    use redirect_checker::fetch::{
        get_redirect_history, HistoryResolver, HopKind, HttpFetcher,
    };
    use redirect_checker::initialization::init_redirect_client;
    use redirect_checker::queue::{put_json, MemoryTube, TaskData};
    use redirect_checker::worker::{ParentLivenessCheck, WorkerContext, WorkerExit};
    use redirect_checker::Config;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const COUNTERS_PAGE: &str = r#"<html><body>
        <script src="https://mc.yandex.ru/metrika/watch.js"></script>
        <img src="//top-fwz1.mail.ru/counter?id=1">
    </body></html>"#;

    fn fetcher(stats: &Arc<ProcessingStats>) -> HttpFetcher {
        let config = Config {
            fetch_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        HttpFetcher::new(
            init_redirect_client(&config).expect("Failed to create client"),
            config.fetch_timeout,
            None,
            Arc::clone(stats),
        )
    }

    /// Parent stays alive for a fixed number of checks.
    struct AliveFor(AtomicUsize);

    impl ParentLivenessCheck for AliveFor {
        fn is_alive(&self, _pid: u32) -> bool {
            self.0
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    /// HTTP redirect, then meta refresh, then a page with counters.
    #[tokio::test]
    async fn test_resolve_mixed_chain() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/start"))
                .respond_with(status_code(302).append_header("Location", "/interstitial")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/interstitial")).respond_with(
                status_code(200).body(
                    r#"<html><head><meta http-equiv="refresh" content="0; url=/landing page"></head></html>"#,
                ),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/landing%20page"))
                .respond_with(status_code(200).body(COUNTERS_PAGE)),
        );
        let stats = Arc::new(ProcessingStats::new());
        let base = format!("http://{}", server.addr());

        let history =
            get_redirect_history(&fetcher(&stats), &format!("{}/start", base), 30, None).await;

        assert_eq!(
            serde_json::to_value(&history).expect("serialize"),
            json!([
                ["http_status", "meta_tag"],
                [
                    format!("{}/start", base),
                    format!("{}/interstitial", base),
                    format!("{}/landing%20page", base)
                ],
                ["TOP_MAIL_RU", "YA_METRICA"]
            ])
        );
    }

    /// A redirect loop is cut off by the hop bound.
    #[tokio::test]
    async fn test_resolve_redirect_loop_is_bounded() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/loop"))
                .times(4)
                .respond_with(status_code(301).append_header("Location", "/loop")),
        );
        let stats = Arc::new(ProcessingStats::new());
        let url = format!("http://{}/loop", server.addr());

        let history = get_redirect_history(&fetcher(&stats), &url, 3, None).await;

        assert_eq!(history.history_types, vec![HopKind::HttpStatus; 3]);
        assert_eq!(history.history_urls, vec![url; 4]);
    }

    /// A redirect to a dead host ends the chain with an ERROR hop.
    #[tokio::test]
    async fn test_resolve_dead_hop_records_error() {
        let dead_port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr").port()
        };
        let dead = format!("http://127.0.0.1:{}/gone", dead_port);
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/start"))
                .respond_with(status_code(307).append_header("Location", dead.as_str())),
        );
        let stats = Arc::new(ProcessingStats::new());
        let start = format!("http://{}/start", server.addr());

        let history = get_redirect_history(&fetcher(&stats), &start, 30, None).await;

        assert_eq!(history.history_types, vec![HopKind::HttpStatus, HopKind::Error]);
        assert_eq!(history.history_urls, vec![start, dead.clone(), dead]);
        assert!(history.counters.is_empty());
        assert_eq!(stats.total_errors(), 1);
    }

    /// A worker resolves tasks from the input tube end to end.
    #[tokio::test]
    async fn test_worker_pipeline_with_memory_tubes() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/ok"))
                .respond_with(status_code(200).body(COUNTERS_PAGE)),
        );
        let dead_port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr").port()
        };

        let input = MemoryTube::new("url_check_input");
        let output = MemoryTube::new("url_check_output");
        let ok_url = format!("http://{}/ok", server.addr());
        let dead_url = format!("http://127.0.0.1:{}/", dead_port);
        put_json(&input, &TaskData::new(ok_url.clone(), 1))
            .await
            .expect("put");
        put_json(&input, &TaskData::new(dead_url.clone(), 2))
            .await
            .expect("put");

        let stats = Arc::new(ProcessingStats::new());
        let resolver = HistoryResolver::new(fetcher(&stats), 30, Arc::clone(&stats));
        let liveness = AliveFor(AtomicUsize::new(3));
        let worker = WorkerContext {
            input: &input,
            output: &output,
            resolver: &resolver,
            liveness: &liveness,
            parent_pid: 1,
            take_timeout: Duration::from_millis(50),
            stats: &stats,
        };

        let exit = worker.run(&CancellationToken::new()).await.expect("run");

        assert_eq!(exit, WorkerExit::ParentGone);
        assert_eq!(input.taken_count(), 3);
        assert_eq!(input.acked().len(), 3);
        assert!(input.pending().is_empty());
        assert_eq!(
            output.pending(),
            vec![
                json!({
                    "url_id": 1,
                    "result": [[], [ok_url], ["TOP_MAIL_RU", "YA_METRICA"]],
                    "check_type": "normal"
                }),
                json!({
                    "url_id": 2,
                    "result": [["ERROR"], [dead_url.clone(), dead_url], []],
                    "check_type": "normal"
                }),
            ]
        );
        // The dead URL was tried twice: once fresh, once as a recheck.
        assert_eq!(stats.total_errors(), 2);
    }
}
