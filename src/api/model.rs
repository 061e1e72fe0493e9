use crate::error::Error;
use crate::templates::DEFAULT_ENVIRONMENT;
use serde::Deserialize;

/// Path prefix selecting an environment, e.g. `/env/prod/debian.ipxe`.
const ENV_PREFIX: &str = "env";

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TemplateParamsQuery {
    pub script: Option<String>,
    pub environment: Option<String>,
}

/// The template a render request asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TemplateRequest {
    pub template_name: String,
    pub environment: Option<String>,
}

impl TemplateRequest {
    /// Parse a request path into a template name, taking the environment from an `/env/<name>/`
    /// prefix, or else from the `environment` query parameter.
    ///
    /// The path is percent-decoded first. `.` and `..` segments are resolved the way a
    /// filesystem path would be, without ever leaving the template root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTemplatePath`] if the path doesn't decode to UTF-8, and
    /// [`Error::MissingTemplateName`] if no template name is left after cleaning.
    pub fn from_path(path: &str, environment_param: Option<&str>) -> Result<Self, Error> {
        let path =
            urlencoding::decode(path).map_err(|_| Error::InvalidTemplatePath(path.to_string()))?;
        let mut segments: Vec<&str> = vec![];
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                segment => segments.push(segment),
            }
        }

        let mut environment = environment_param
            .filter(|e| !e.is_empty())
            .map(ToString::to_string);
        if segments.len() >= 2 && segments[0] == ENV_PREFIX {
            environment = Some(segments[1].to_string());
            segments.drain(..2);
        }

        if segments.is_empty() {
            return Err(Error::MissingTemplateName);
        }
        Ok(Self {
            template_name: segments.join("/"),
            environment,
        })
    }

    pub fn environment_name(&self) -> &str {
        self.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(name: &str, environment: Option<&str>) -> TemplateRequest {
        TemplateRequest {
            template_name: name.to_string(),
            environment: environment.map(ToString::to_string),
        }
    }

    #[test]
    fn plain_path() {
        let req = TemplateRequest::from_path("/debian.ipxe", None).unwrap();
        assert_eq!(req, request("debian.ipxe", None));
        assert_eq!(req.environment_name(), "default");
    }

    #[test]
    fn environment_from_query_or_path() {
        assert_eq!(
            TemplateRequest::from_path("/preseed/base.cfg", Some("prod")).unwrap(),
            request("preseed/base.cfg", Some("prod"))
        );
        assert_eq!(
            TemplateRequest::from_path("/env/prod/debian.ipxe", Some("staging")).unwrap(),
            request("debian.ipxe", Some("prod"))
        );
        assert_eq!(
            TemplateRequest::from_path("/debian.ipxe", Some("")).unwrap(),
            request("debian.ipxe", None)
        );
    }

    #[test]
    fn cleans_path() {
        assert_eq!(
            TemplateRequest::from_path("//a/./b/../c.ipxe", None).unwrap(),
            request("a/c.ipxe", None)
        );
        assert_eq!(
            TemplateRequest::from_path("/../../c.ipxe", None).unwrap(),
            request("c.ipxe", None)
        );
    }

    #[test]
    fn percent_decodes_path() {
        assert_eq!(
            TemplateRequest::from_path("/boot%20menu.ipxe", None).unwrap(),
            request("boot menu.ipxe", None)
        );
        assert_eq!(
            TemplateRequest::from_path("/env/st%C3%A5ging/a%2Fb.cfg", None).unwrap(),
            request("a/b.cfg", Some("ståging"))
        );
        assert_eq!(
            TemplateRequest::from_path("/a/%2E%2E/%2E%2E/c.ipxe", None).unwrap(),
            request("c.ipxe", None)
        );
        assert!(matches!(
            TemplateRequest::from_path("/%FF.ipxe", None),
            Err(Error::InvalidTemplatePath(path)) if path == "/%FF.ipxe"
        ));
    }

    #[test]
    fn missing_template_name() {
        for path in ["", "/", "/./", "/a/..", "/env/prod", "/env/prod/"] {
            assert!(
                matches!(
                    TemplateRequest::from_path(path, None),
                    Err(Error::MissingTemplateName)
                ),
                "{path}"
            );
        }
    }
}
