//! `test-utils` is used for testing in both `shieldgen-lib` and `shieldgen-bin`.
//! This crate does not depend on `shieldgen-lib` or `shieldgen-bin`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies.

/// Create a mock web server, which responds with a predefined status when
/// handling a matching request
#[macro_export]
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new($status);
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::method("GET")).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// Create a mock web server serving one filter list per path.
///
/// Every `(path, body)` pair is answered with status 200 and the given body;
/// any other path gets a 404.
#[macro_export]
macro_rules! list_server {
    ($(($path:expr, $body:expr)),* $(,)?) => {{
        let mock_server = wiremock::MockServer::start().await;
        $(
            wiremock::Mock::given(wiremock::matchers::method("GET"))
                .and(wiremock::matchers::path($path))
                .respond_with(wiremock::ResponseTemplate::new(200).set_body_string($body))
                .mount(&mock_server)
                .await;
        )*
        mock_server
    }};
}
