//! The demo route table.
//!
//! Each route shows one way of composing middleware around a trivial
//! terminal handler.
//!
//! | Path | Composition |
//! |---|---|
//! | `/` | manual nesting: `LoggingGate(PathGate(home))` |
//! | `/easychain` | the same two layers through [`Chain`] |
//! | `/headers` | `InjectJson(EnforceJson(headers))` |
//! | `/signup` | `BasicAuth(landing_page)` |
//! | `/log` | `AccessLog(logging_file)` |
//! | `/constructor` | [`access_log`] constructor around `logging_file` |

use tracing::info;

use crate::config::Config;
use crate::handler::boxed;
use crate::middleware::{
    AccessLog, AuthenticatedUser, BasicAuth, Chain, EnforceJson, InjectJson, LogSink, LoggingGate,
    Middleware, PathGate, Rejection, access_log, layer,
};
use crate::request::Request;
use crate::router::Router;

/// Settings the route table depends on.
#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub username: String,
    pub password: String,
    pub blocked_path: String,
    pub rejection: Rejection,
}

impl From<&Config> for RouteConfig {
    fn from(config: &Config) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            blocked_path: config.blocked_path.clone(),
            rejection: config.rejection,
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            username: "lee".to_owned(),
            password: "pass".to_owned(),
            blocked_path: "/icons".to_owned(),
            rejection: Rejection::Silent,
        }
    }
}

/// Builds every demo route. `sink` receives the `/log` and `/constructor`
/// access lines.
pub fn router(config: &RouteConfig, sink: &LogSink) -> Router {
    let path_gate = PathGate::new(config.blocked_path.as_str()).rejection(config.rejection);

    // manual nesting
    let home_route = LoggingGate.wrap(path_gate.wrap(boxed(home)));

    // same layers, same order, as a list
    let easy_chain = Chain::new([layer(LoggingGate), layer(path_gate)]);

    let headers_route = InjectJson.wrap(
        EnforceJson::new()
            .rejection(config.rejection)
            .wrap(boxed(headers)),
    );

    let signup_route = BasicAuth::new(&config.username, &config.password).wrap(boxed(landing_page));

    let log_route = AccessLog::new(sink.clone()).wrap(boxed(logging_file));

    let handle_logs = access_log(sink.clone());

    Router::new()
        .route("/", home_route)
        .route("/easychain", easy_chain.then(home))
        .route("/headers", headers_route)
        .route("/signup", signup_route)
        .route("/log", log_route)
        .route("/constructor", handle_logs.wrap(boxed(logging_file)))
}

// ── Terminal handlers ─────────────────────────────────────────────────────────

async fn home(_req: Request) -> &'static str {
    info!("root route Handler was successfully called.");
    "middlewares successfully executed"
}

async fn headers(_req: Request) -> &'static str {
    info!("headers route Handler was successfully called.");
    "Middleware successfully Executed."
}

async fn landing_page(req: Request) -> &'static str {
    let user = req.extensions().get::<AuthenticatedUser>().map(|u| u.0.as_str());
    info!(user = user.unwrap_or("-"), "landing page route Handler successfully called.");
    "Middleware successfully Executed."
}

async fn logging_file(_req: Request) -> &'static str {
    info!("logging file route Handler successfully called.");
    "Middleware successfully Executed."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::testing::{build, request};
    use base64::Engine as _;
    use http::StatusCode;
    use http::header::{AUTHORIZATION, CONTENT_TYPE};

    fn app() -> Router {
        router(&RouteConfig::default(), &LogSink::new(std::io::sink()))
    }

    async fn call(router: &Router, req: Request) -> crate::Response {
        let path = req.path().to_owned();
        router.dispatch(&path).call(req).await
    }

    #[tokio::test]
    async fn home_and_easychain_answer_alike() {
        let router = app();
        for path in ["/", "/easychain"] {
            let res = call(&router, build(request(path))).await;
            assert_eq!(res.status_code(), StatusCode::OK);
            assert_eq!(res.body(), "middlewares successfully executed");
        }
    }

    #[tokio::test]
    async fn headers_route_passes_whatever_the_client_sent() {
        let router = app();
        let res = call(&router, build(request("/headers").header(CONTENT_TYPE, "text/plain"))).await;
        assert_eq!(res.body(), "Middleware successfully Executed.");
    }

    #[tokio::test]
    async fn signup_requires_credentials() {
        let router = app();
        let res = call(&router, build(request("/signup"))).await;
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

        let token = base64::engine::general_purpose::STANDARD.encode("lee:pass");
        let res = call(
            &router,
            build(request("/signup").header(AUTHORIZATION, format!("Basic {token}"))),
        )
        .await;
        assert_eq!(res.body(), "Middleware successfully Executed.");
    }

    #[tokio::test]
    async fn blocked_path_is_not_routed() {
        let res = call(&app(), build(request("/icons"))).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn configured_blocked_path_can_shadow_a_route() {
        let config = RouteConfig {
            blocked_path: "/easychain".to_owned(),
            rejection: Rejection::Explicit,
            ..RouteConfig::default()
        };
        let router = router(&config, &LogSink::new(std::io::sink()));
        let res = call(&router, build(request("/easychain"))).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    }
}
