use crate::api::routes;
use crate::config::Shared;
use crate::dns::DynReverseLookup;
use crate::templates::DynTemplateRenderer;
use std::future::Future;
use std::net::SocketAddr;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: Shared,
    pub templates: DynTemplateRenderer,
    pub dns: DynReverseLookup,
}

/// Bind the HTTP API to [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`],
/// returning a future that serves it.
pub fn new(
    config: Shared,
    templates: DynTemplateRenderer,
    dns: DynReverseLookup,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&config.api_bind_addr).serve(
        routes::new(AppState {
            config,
            templates,
            dns,
        })
        .into_make_service_with_connect_info::<SocketAddr>(),
    )
}
