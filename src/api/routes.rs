use crate::api::api_error::APIError;
use crate::api::model::{TemplateParamsQuery, TemplateRequest};
use crate::api::server::AppState;
use crate::identity::IdentityResolver;
use crate::mappings::fallback_script;
use crate::templates::required_variables;
use crate::variables::{merge_variables, VariableTree};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Query parameter naming the client explicitly, bypassing reverse DNS and mapping rules.
const HOST_PARAM: &str = "host";

/// Query parameter selecting the template environment.
const ENVIRONMENT_PARAM: &str = "environment";

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/params", get(template_params))
        .fallback(render_template)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

#[allow(clippy::unused_async)]
async fn template_params(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<TemplateParamsQuery>, APIError>,
) -> Result<Json<Vec<String>>, APIError> {
    let vars = required_variables(
        state.templates.as_ref(),
        &state.config.params_blacklist,
        params.script.as_deref(),
        params.environment.as_deref(),
    )?;
    Ok(Json(vars))
}

async fn render_template(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    uri: Uri,
    WithRejection(Query(query), _): WithRejection<Query<Vec<(String, String)>>, APIError>,
) -> Result<String, APIError> {
    let request = TemplateRequest::from_path(uri.path(), first_value(&query, ENVIRONMENT_PARAM))?;
    let query_vars =
        VariableTree::from_query(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    let source_addr = connect_info.map(|ConnectInfo(addr)| addr);
    let identity = IdentityResolver::new(state.dns.as_ref(), state.config.trust_forwarded_for)
        .resolve(source_addr, &headers, first_value(&query, HOST_PARAM))
        .await;

    let mapping = fallback_script(
        &state.config.hostname_maps,
        &state.config.network_maps,
        &identity,
    );
    let base_url = state.config.base_url_for_env(request.environment.as_deref());
    let variables = merge_variables(&base_url, &identity, mapping, query_vars);

    match state.templates.render(
        &request.template_name,
        &variables,
        request.environment_name(),
    ) {
        Ok(rendered) => {
            tracing::info!(
                "rendered \"{}\" ({}) for {:?} \"{}\"",
                request.template_name,
                request.environment_name(),
                identity.effective_ip(),
                identity.resolved_host,
            );
            Ok(rendered)
        }
        Err(err) => {
            tracing::error!("error rendering \"{}\": {err}", request.template_name);
            Err(err.into())
        }
    }
}

/// The first value of `key` in the raw query pairs.
fn first_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
