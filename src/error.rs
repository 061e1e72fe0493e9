//! Error types.

use std::net::IpAddr;
use trust_dns_client::error::ClientError;
use trust_dns_proto::error::ProtoError;

/// Error enumerates the possible bootcrab error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a client requests the [render endpoint][crate::api#template-get] without a
    /// template name in the request path.
    #[error("No template name provided")]
    MissingTemplateName,

    /// Returned when the request path doesn't percent-decode to UTF-8.
    #[error("template path \"{0}\" is not valid UTF-8")]
    InvalidTemplatePath(String),

    /// Returned when a client requests the [`/params` endpoint][crate::api#params-get] without
    /// the `script` query parameter.
    #[error("Required script parameter")]
    MissingScriptParam,

    /// Returned when a dotted query key descends through a key already bound to a scalar value,
    /// or binds a scalar where a nested tree already exists.
    ///
    /// E.g. `?net=eth0&net.ip=10.0.0.2`.
    #[error("query parameter \"{0}\" collides with an existing parameter")]
    ParamCollision(String),

    /// Returned when a dotted query key contains an empty segment, e.g. `a..b` or `.a`.
    #[error("query parameter \"{0}\" has an empty key segment")]
    InvalidParamKey(String),

    /// Returned when the [`TemplateRenderer`][crate::templates::TemplateRenderer] has no
    /// template by the requested name for the requested environment.
    #[error("template \"{0}\" not found")]
    TemplateNotFound(String),

    /// Returned when a template references a variable that is missing from the variable tree,
    /// or that names a nested tree rather than a scalar value.
    #[error("template \"{template}\": no value for \"{variable}\"")]
    MissingVariable { template: String, variable: String },

    /// Returned when a PTR query for the given address produced no answer.
    #[error("no PTR record for {0}")]
    NoPtrRecord(IpAddr),

    /// Returned when the [template directory][crate::config::Config::templates_dir] can't be
    /// walked, e.g. a broken or looping symlink below it.
    #[error("error walking template directory")]
    TemplateDir(#[from] walkdir::Error),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [trying to load a `Config`][crate::config::Config::try_from_file]) fails due to invalid
    /// JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the reverse DNS client encounters a generic DNS protocol error, including
    /// a query that didn't complete within
    /// [`Config::dns_timeout`][crate::config::Config::dns_timeout].
    #[error("DNS error")]
    DNSError(#[from] ProtoError),

    /// Returned when the reverse DNS client fails to send a query or receive its response.
    #[error("DNS client error")]
    DNSClientError(#[from] ClientError),
}
