use crate::identity::ClientIdentity;
use crate::mappings::Script;
use crate::variables::VariableTree;

/// Framework default variable pointing clients back at this server.
pub const BASE_URL_VAR: &str = "baseURL";

/// Layer the variable sources of a request into the tree handed to the renderer.
///
/// `base_url` is the lowest layer, followed by the identity variables, the mapping `params`
/// and finally the query parameters.
#[must_use]
pub fn merge_variables(
    base_url: &str,
    identity: &ClientIdentity,
    mapping: Option<&Script>,
    query: VariableTree,
) -> VariableTree {
    let mut vars = VariableTree::new();
    vars.set_scalar(BASE_URL_VAR, base_url);
    vars.merge(identity.variables());
    if let Some(script) = mapping {
        vars.merge(script.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect());
    }
    vars.merge(query);

    match serde_json::to_string(&vars) {
        Ok(json) => tracing::debug!("template variables: {json}"),
        Err(err) => tracing::debug!("template variables not serializable: {err}"),
    }
    vars
}
