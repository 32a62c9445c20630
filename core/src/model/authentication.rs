#![deny(missing_docs)]

//! # Authentication
//!
//! Authentication schemes (API key, HTTP, OAuth2, OpenID Connect), OAuth2
//! flows and scopes, and requirements built from references to schemes.
//!
//! A declaration is an `Interface` tagged `authentication`. Its scheme is
//! chosen by the `type` field; remaining fields are `Member` children:
//!
//! ```yaml
//! kind: interface
//! name: oauth
//! tags: { authentication: [] }
//! children:
//!   - { kind: member, name: type, value: oauth2 }
//!   - kind: member
//!     name: flows
//!     children:
//!       - kind: member
//!         name: authorizationCode
//!         children:
//!           - { kind: member, name: authorizationUrl, value: "https://a/auth" }
//!           - { kind: member, name: tokenUrl, value: "https://a/token" }
//!           - kind: member
//!             name: scopes
//!             children:
//!               - { kind: member, name: read, value: "Read access" }
//! ```
//!
//! Requirements are declarations tagged `requirement` whose children are
//! `Reference`s to authentications (`Literal` children list the scopes) or
//! inline authentication declarations (scopes from `scope` tags).
//!
//! Within a requirement every reference must be satisfied (AND); a list of
//! requirements is satisfied when any one of them is (OR).

use super::{
    invalid, model_element, optional, optional_url, required, required_name, required_url, Element,
};
use crate::alias::{Alias, Declared};
use crate::declaration::FromNode;
use crate::error::{AppError, AppResult};
use crate::tree::{DocumentSource, Node, NodeKind, TagReader};
use derive_more::{Display, From};
use std::borrow::Cow;
use tracing::debug;

/// The scheme families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AuthenticationType {
    /// `apiKey`
    #[display("apiKey")]
    ApiKey,
    /// `http`
    #[display("http")]
    Http,
    /// `oauth2`
    #[display("oauth2")]
    OAuth2,
    /// `openIdConnect`
    #[display("openIdConnect")]
    OpenIdConnect,
}

impl AuthenticationType {
    /// Parses a scheme family, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "apikey" => Some(Self::ApiKey),
            "http" => Some(Self::Http),
            "oauth2" => Some(Self::OAuth2),
            "openidconnect" => Some(Self::OpenIdConnect),
            _ => None,
        }
    }
}

/// Where an API key is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ParameterLocation {
    /// Query string.
    #[display("query")]
    Query,
    /// Request header.
    #[display("header")]
    Header,
    /// Cookie.
    #[display("cookie")]
    Cookie,
}

impl ParameterLocation {
    /// Parses a location, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// API key carried in a query parameter, header or cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyAuthentication {
    /// Unique scheme name.
    pub name: String,
    /// Name of the parameter carrying the key.
    pub parameter_name: String,
    /// Where the key is carried.
    pub location: ParameterLocation,
    /// Shared attributes.
    pub element: Element,
}

impl ApiKeyAuthentication {
    /// A new API key scheme.
    pub fn new(
        name: impl Into<String>,
        parameter_name: impl Into<String>,
        location: ParameterLocation,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_name: parameter_name.into(),
            location,
            element: Element::new(),
        }
    }
}

/// HTTP authentication (RFC 7235).
#[derive(Debug, Clone, PartialEq)]
pub struct HttpAuthentication {
    /// Unique scheme name.
    pub name: String,
    /// Authorization scheme, e.g. `basic` or `bearer`.
    pub scheme: String,
    /// Hint about how bearer tokens are formatted.
    pub bearer_format: Option<String>,
    /// Shared attributes.
    pub element: Element,
}

impl HttpAuthentication {
    /// A new HTTP scheme.
    pub fn new(name: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            bearer_format: None,
            element: Element::new(),
        }
    }
}

/// A named OAuth2 scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Scope {
    /// Scope name.
    pub name: String,
    /// What the scope grants.
    pub description: String,
    /// Shared attributes.
    pub element: Element,
}

impl OAuth2Scope {
    /// A new scope.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            element: Element::new(),
        }
    }
}

/// The grant of an OAuth2 flow with its endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuth2Grant {
    /// Implicit grant.
    Implicit {
        /// Authorization endpoint.
        authorization_url: String,
    },
    /// Resource owner password grant.
    Password {
        /// Token endpoint.
        token_url: String,
    },
    /// Client credentials grant.
    ClientCredentials {
        /// Token endpoint.
        token_url: String,
    },
    /// Authorization code grant.
    AuthorizationCode {
        /// Authorization endpoint.
        authorization_url: String,
        /// Token endpoint.
        token_url: String,
    },
}

/// One OAuth2 flow.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuth2Flow {
    /// Grant and endpoints.
    pub grant: OAuth2Grant,
    /// Refresh endpoint.
    pub refresh_url: Option<String>,
    /// Available scopes.
    pub scopes: Vec<OAuth2Scope>,
    /// Shared attributes.
    pub element: Element,
}

impl OAuth2Flow {
    /// A flow with the given grant and no scopes.
    pub fn new(grant: OAuth2Grant) -> Self {
        Self {
            grant,
            refresh_url: None,
            scopes: Vec::new(),
            element: Element::new(),
        }
    }

    /// Adds a scope.
    pub fn with_scope(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.push(OAuth2Scope::new(name, description));
        self
    }

    /// Sets the refresh endpoint.
    pub fn with_refresh_url(mut self, refresh_url: impl Into<String>) -> Self {
        self.refresh_url = Some(refresh_url.into());
        self
    }

    /// Field name of the flow (`implicit`, `password`, ...).
    pub fn flow_name(&self) -> &'static str {
        match self.grant {
            OAuth2Grant::Implicit { .. } => "implicit",
            OAuth2Grant::Password { .. } => "password",
            OAuth2Grant::ClientCredentials { .. } => "clientCredentials",
            OAuth2Grant::AuthorizationCode { .. } => "authorizationCode",
        }
    }

    /// Authorization endpoint, for implicit and authorization code flows.
    pub fn authorization_url(&self) -> Option<&str> {
        match &self.grant {
            OAuth2Grant::Implicit { authorization_url }
            | OAuth2Grant::AuthorizationCode {
                authorization_url, ..
            } => Some(authorization_url),
            OAuth2Grant::Password { .. } | OAuth2Grant::ClientCredentials { .. } => None,
        }
    }

    /// Token endpoint, for every flow except implicit.
    pub fn token_url(&self) -> Option<&str> {
        match &self.grant {
            OAuth2Grant::Password { token_url }
            | OAuth2Grant::ClientCredentials { token_url }
            | OAuth2Grant::AuthorizationCode { token_url, .. } => Some(token_url),
            OAuth2Grant::Implicit { .. } => None,
        }
    }

    /// Looks a scope up by name.
    pub fn scope(&self, name: &str) -> Option<&OAuth2Scope> {
        self.scopes.iter().find(|scope| scope.name == name)
    }

    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let grant = match node.name() {
            Some("implicit") => OAuth2Grant::Implicit {
                authorization_url: required_url(node, "authorizationUrl")?,
            },
            Some("password") => OAuth2Grant::Password {
                token_url: required_url(node, "tokenUrl")?,
            },
            Some("clientCredentials") => OAuth2Grant::ClientCredentials {
                token_url: required_url(node, "tokenUrl")?,
            },
            Some("authorizationCode") => OAuth2Grant::AuthorizationCode {
                authorization_url: required_url(node, "authorizationUrl")?,
                token_url: required_url(node, "tokenUrl")?,
            },
            other => {
                return Err(invalid(
                    node,
                    format!("unknown OAuth2 flow '{}'", other.unwrap_or_default()),
                ))
            }
        };

        let scopes = node
            .member("scopes")
            .map(|scopes| {
                scopes
                    .children()
                    .filter(|scope| scope.kind() == NodeKind::Member)
                    .map(|scope| -> AppResult<_> {
                        Ok(OAuth2Scope {
                            name: required_name(scope)?,
                            description: scope.value().unwrap_or_default().to_string(),
                            element: Element::from_node(scope),
                        })
                    })
                    .collect::<AppResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            grant,
            refresh_url: optional_url(node, "refreshUrl")?,
            scopes,
            element: Element::from_node(node),
        })
    }
}

/// OAuth2 with one or more flows.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuth2Authentication {
    /// Unique scheme name.
    pub name: String,
    /// Supported flows.
    pub flows: Vec<OAuth2Flow>,
    /// Shared attributes.
    pub element: Element,
}

impl OAuth2Authentication {
    /// A new OAuth2 scheme.
    pub fn new(name: impl Into<String>, flows: Vec<OAuth2Flow>) -> Self {
        Self {
            name: name.into(),
            flows,
            element: Element::new(),
        }
    }

    /// Scopes across all flows.
    pub fn scopes(&self) -> impl Iterator<Item = &OAuth2Scope> + '_ {
        self.flows.iter().flat_map(|flow| flow.scopes.iter())
    }

    /// Returns `true` if any flow declares `scope`.
    pub fn declares_scope(&self, scope: &str) -> bool {
        self.scopes().any(|declared| declared.name == scope)
    }
}

/// OpenID Connect discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenIdConnectAuthentication {
    /// Unique scheme name.
    pub name: String,
    /// Discovery document URL.
    pub open_id_connect_url: String,
    /// Shared attributes.
    pub element: Element,
}

impl OpenIdConnectAuthentication {
    /// A new OpenID Connect scheme.
    pub fn new(name: impl Into<String>, open_id_connect_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            open_id_connect_url: open_id_connect_url.into(),
            element: Element::new(),
        }
    }
}

/// An authentication scheme.
#[derive(Debug, Clone, PartialEq, From)]
pub enum Authentication {
    /// API key.
    ApiKey(ApiKeyAuthentication),
    /// HTTP.
    Http(HttpAuthentication),
    /// OAuth2.
    OAuth2(OAuth2Authentication),
    /// OpenID Connect.
    OpenIdConnect(OpenIdConnectAuthentication),
}

impl Authentication {
    /// The scheme's unique name.
    pub fn name(&self) -> &str {
        match self {
            Authentication::ApiKey(auth) => &auth.name,
            Authentication::Http(auth) => &auth.name,
            Authentication::OAuth2(auth) => &auth.name,
            Authentication::OpenIdConnect(auth) => &auth.name,
        }
    }

    /// The scheme family.
    pub fn authentication_type(&self) -> AuthenticationType {
        match self {
            Authentication::ApiKey(_) => AuthenticationType::ApiKey,
            Authentication::Http(_) => AuthenticationType::Http,
            Authentication::OAuth2(_) => AuthenticationType::OAuth2,
            Authentication::OpenIdConnect(_) => AuthenticationType::OpenIdConnect,
        }
    }

    /// The OAuth2 scheme, if this is one.
    pub fn as_oauth2(&self) -> Option<&OAuth2Authentication> {
        match self {
            Authentication::OAuth2(auth) => Some(auth),
            Authentication::ApiKey(_) | Authentication::Http(_) | Authentication::OpenIdConnect(_) => {
                None
            }
        }
    }
}

impl super::ModelElement for Authentication {
    fn element(&self) -> &Element {
        match self {
            Authentication::ApiKey(auth) => &auth.element,
            Authentication::Http(auth) => &auth.element,
            Authentication::OAuth2(auth) => &auth.element,
            Authentication::OpenIdConnect(auth) => &auth.element,
        }
    }

    fn element_mut(&mut self) -> &mut Element {
        match self {
            Authentication::ApiKey(auth) => &mut auth.element,
            Authentication::Http(auth) => &mut auth.element,
            Authentication::OAuth2(auth) => &mut auth.element,
            Authentication::OpenIdConnect(auth) => &mut auth.element,
        }
    }
}

impl FromNode for Authentication {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let name = required_name(node)?;
        let element = Element::from_node(node);
        let kind = required(node, "type")?;
        let kind = AuthenticationType::parse(kind)
            .ok_or_else(|| invalid(node, format!("unknown authentication type '{}'", kind)))?;

        Ok(match kind {
            AuthenticationType::ApiKey => {
                let location = required(node, "in")?;
                Authentication::ApiKey(ApiKeyAuthentication {
                    name,
                    parameter_name: required(node, "parameterName")?.to_string(),
                    location: ParameterLocation::parse(location).ok_or_else(|| {
                        invalid(node, format!("unknown API key location '{}'", location))
                    })?,
                    element,
                })
            }
            AuthenticationType::Http => Authentication::Http(HttpAuthentication {
                name,
                scheme: required(node, "scheme")?.to_string(),
                bearer_format: optional(node, "bearerFormat"),
                element,
            }),
            AuthenticationType::OAuth2 => {
                let flows = node
                    .member("flows")
                    .ok_or_else(|| invalid(node, "missing field 'flows'"))?;
                let flows = flows
                    .children()
                    .filter(|flow| flow.kind() == NodeKind::Member)
                    .map(OAuth2Flow::from_node)
                    .collect::<AppResult<Vec<_>>>()?;
                if flows.is_empty() {
                    return Err(invalid(node, "OAuth2 authentication declares no flows"));
                }
                for (index, flow) in flows.iter().enumerate() {
                    if flows[..index]
                        .iter()
                        .any(|earlier| earlier.flow_name() == flow.flow_name())
                    {
                        return Err(invalid(
                            node,
                            format!("duplicate OAuth2 flow '{}'", flow.flow_name()),
                        ));
                    }
                }
                Authentication::OAuth2(OAuth2Authentication {
                    name,
                    flows,
                    element,
                })
            }
            AuthenticationType::OpenIdConnect => {
                Authentication::OpenIdConnect(OpenIdConnectAuthentication {
                    name,
                    open_id_connect_url: required_url(node, "openIdConnectUrl")?,
                    element,
                })
            }
        })
    }
}

impl Declared for Authentication {
    const KIND: &'static str = "authentication";

    fn is_declaration(node: Node<'_>) -> bool {
        node.has_tag("authentication")
    }
}

/// A use of an authentication scheme, narrowed to OAuth2 scopes.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticationReference {
    /// The scheme, inline or by name.
    pub authentication: Alias<Authentication>,
    /// Required scopes; must be empty unless the scheme is OAuth2.
    pub scopes: Vec<String>,
    /// Shared attributes.
    pub element: Element,
}

impl AuthenticationReference {
    /// A reference without scopes.
    pub fn new(authentication: impl Into<Alias<Authentication>>) -> Self {
        Self {
            authentication: authentication.into(),
            scopes: Vec::new(),
            element: Element::new(),
        }
    }

    /// Sets the required scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// The referenced scheme.
    pub fn resolve<S: DocumentSource>(&self, documents: &S) -> AppResult<Cow<'_, Authentication>> {
        self.authentication.resolve(documents)
    }

    /// Checks that scopes are only required from OAuth2 schemes that declare them.
    ///
    /// # Errors
    ///
    /// * Alias resolution errors for named schemes.
    /// * `Validation` for scopes on a non-OAuth2 scheme or undeclared scopes.
    pub fn validate<S: DocumentSource>(&self, documents: &S) -> AppResult<()> {
        let authentication = self.resolve(documents)?;
        match authentication.as_ref() {
            Authentication::OAuth2(oauth) => {
                match self.scopes.iter().find(|scope| !oauth.declares_scope(scope)) {
                    Some(scope) => Err(AppError::Validation(format!(
                        "Scope '{}' is not declared by OAuth2 authentication '{}'",
                        scope, oauth.name
                    ))),
                    None => Ok(()),
                }
            }
            Authentication::ApiKey(_) | Authentication::Http(_) | Authentication::OpenIdConnect(_) => {
                if self.scopes.is_empty() {
                    Ok(())
                } else {
                    Err(AppError::Validation(format!(
                        "Authentication '{}' is {} but scopes {:?} were required; only OAuth2 has scopes",
                        authentication.name(),
                        authentication.authentication_type(),
                        self.scopes
                    )))
                }
            }
        }
    }
}

model_element!(
    ApiKeyAuthentication,
    HttpAuthentication,
    OAuth2Scope,
    OAuth2Flow,
    OAuth2Authentication,
    OpenIdConnectAuthentication,
    AuthenticationReference,
    AuthenticationRequirement,
);

impl FromNode for AuthenticationReference {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        if node.kind() == NodeKind::Reference {
            let target = node
                .value()
                .ok_or_else(|| invalid(node, "authentication reference has no target"))?;
            return Ok(Self {
                authentication: Alias::named(target),
                scopes: node
                    .children()
                    .filter(|child| child.kind() == NodeKind::Literal)
                    .filter_map(|child| child.value().map(str::to_string))
                    .collect(),
                element: Element::from_node(node),
            });
        }

        if Authentication::is_declaration(node) {
            return Ok(Self {
                authentication: Alias::Inline(Authentication::from_node(node)?),
                scopes: node.tag_values("scope").to_vec(),
                element: Element::new(),
            });
        }

        Err(invalid(
            node,
            "expected a reference to an authentication or an inline authentication",
        ))
    }
}

/// Authentication references that must all be satisfied together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthenticationRequirement {
    /// Declared name, absent for inline requirements.
    pub name: Option<String>,
    /// References combined with logical AND.
    pub authentications: Vec<AuthenticationReference>,
    /// Shared attributes.
    pub element: Element,
}

impl AuthenticationRequirement {
    /// An empty requirement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference.
    pub fn with(mut self, reference: AuthenticationReference) -> Self {
        self.authentications.push(reference);
        self
    }

    /// Validates every reference.
    pub fn validate<S: DocumentSource>(&self, documents: &S) -> AppResult<()> {
        self.authentications
            .iter()
            .try_for_each(|reference| reference.validate(documents))
    }

    /// Returns `true` if `credentials` satisfy every reference.
    ///
    /// All references are resolved before any is checked, so a broken alias
    /// is reported even when an earlier reference is not satisfied.
    pub fn is_satisfied_by<S, C>(&self, documents: &S, credentials: &C) -> AppResult<bool>
    where
        S: DocumentSource,
        C: Credentials + ?Sized,
    {
        let resolved = self
            .authentications
            .iter()
            .map(|reference| -> AppResult<_> {
                Ok((reference.resolve(documents)?, reference.scopes.as_slice()))
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(resolved
            .iter()
            .all(|(authentication, scopes)| credentials.satisfies(authentication, scopes)))
    }
}

impl FromNode for AuthenticationRequirement {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let authentications = node
            .children()
            .filter(|child| {
                child.kind() == NodeKind::Reference || Authentication::is_declaration(*child)
            })
            .map(AuthenticationReference::from_node)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            name: node.name().map(str::to_string),
            authentications,
            element: Element::from_node(node),
        })
    }
}

impl Declared for AuthenticationRequirement {
    const KIND: &'static str = "authentication requirement";

    fn is_declaration(node: Node<'_>) -> bool {
        node.has_tag("requirement")
    }
}

/// What a caller holds, checked against a scheme and required scopes.
pub trait Credentials {
    /// Returns `true` if the caller can authenticate with `authentication`
    /// holding all of `scopes`.
    fn satisfies(&self, authentication: &Authentication, scopes: &[String]) -> bool;
}

impl<F> Credentials for F
where
    F: Fn(&Authentication, &[String]) -> bool,
{
    fn satisfies(&self, authentication: &Authentication, scopes: &[String]) -> bool {
        self(authentication, scopes)
    }
}

/// Evaluates a requirement list: satisfied if any requirement is.
///
/// An empty list imposes no authentication and is always satisfied. Every
/// requirement is evaluated so resolution errors are never masked by an
/// earlier success.
pub fn authorizes<S, C>(
    requirements: &[Alias<AuthenticationRequirement>],
    documents: &S,
    credentials: &C,
) -> AppResult<bool>
where
    S: DocumentSource,
    C: Credentials + ?Sized,
{
    if requirements.is_empty() {
        return Ok(true);
    }

    let mut authorized = false;
    for requirement in requirements {
        let requirement = requirement.resolve(documents)?;
        let satisfied = requirement.is_satisfied_by(documents, credentials)?;
        debug!(
            requirement = requirement.name.as_deref().unwrap_or("<inline>"),
            satisfied, "evaluated authentication requirement"
        );
        authorized |= satisfied;
    }
    Ok(authorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Document, DocumentSet, DocumentSpec, NodeSpec};
    use pretty_assertions::assert_eq;

    fn api_key() -> NodeSpec {
        NodeSpec::interface("key")
            .tag("authentication")
            .describe("Static API key")
            .children([
                NodeSpec::field("type", "apiKey"),
                NodeSpec::field("parameterName", "X-API-Key"),
                NodeSpec::field("in", "header"),
            ])
    }

    fn oauth() -> NodeSpec {
        NodeSpec::interface("oauth").tag("authentication").children([
            NodeSpec::field("type", "oauth2"),
            NodeSpec::member("flows").children([
                NodeSpec::member("authorizationCode").children([
                    NodeSpec::field("authorizationUrl", "https://a/auth"),
                    NodeSpec::field("tokenUrl", "https://a/token"),
                    NodeSpec::member("scopes").children([
                        NodeSpec::field("read", "Read access"),
                        NodeSpec::field("write", "Write access"),
                    ]),
                ]),
                NodeSpec::member("clientCredentials")
                    .child(NodeSpec::field("tokenUrl", "/token"))
                    .child(NodeSpec::field("refreshUrl", "https://a/refresh")),
            ]),
        ])
    }

    fn documents() -> DocumentSet {
        let spec = DocumentSpec::new("auth.yaml")
            .declaration(api_key())
            .declaration(oauth())
            .declaration(
                NodeSpec::interface("basic")
                    .tag("authentication")
                    .child(NodeSpec::field("type", "http"))
                    .child(NodeSpec::field("scheme", "basic")),
            );
        [Document::from_spec(&spec)].into_iter().collect()
    }

    fn named(name: &str) -> Authentication {
        crate::alias::resolve_alias(name, &documents()).unwrap()
    }

    #[test]
    fn test_api_key_from_node() {
        let mut expected = ApiKeyAuthentication::new("key", "X-API-Key", ParameterLocation::Header);
        expected.element = Element::new().describe("Static API key");
        assert_eq!(named("key"), Authentication::ApiKey(expected));
    }

    #[test]
    fn test_oauth2_flows_from_node() {
        let expected = OAuth2Authentication::new(
            "oauth",
            vec![
                OAuth2Flow::new(OAuth2Grant::AuthorizationCode {
                    authorization_url: "https://a/auth".into(),
                    token_url: "https://a/token".into(),
                })
                .with_scope("read", "Read access")
                .with_scope("write", "Write access"),
                OAuth2Flow::new(OAuth2Grant::ClientCredentials {
                    token_url: "/token".into(),
                })
                .with_refresh_url("https://a/refresh"),
            ],
        );
        let actual = named("oauth");
        assert_eq!(actual, Authentication::OAuth2(expected));

        let oauth = actual.as_oauth2().unwrap();
        assert_eq!(oauth.flows[0].flow_name(), "authorizationCode");
        assert_eq!(oauth.flows[1].authorization_url(), None);
        assert_eq!(oauth.flows[1].token_url(), Some("/token"));
        assert!(oauth.declares_scope("write"));
    }

    #[test]
    fn test_duplicate_flow_is_invalid() {
        let implicit = || {
            NodeSpec::member("implicit").child(NodeSpec::field("authorizationUrl", "https://a/auth"))
        };
        let spec = DocumentSpec::new("bad.yaml").declaration(
            NodeSpec::interface("twice").tag("authentication").children([
                NodeSpec::field("type", "oauth2"),
                NodeSpec::member("flows").children([implicit(), implicit()]),
            ]),
        );
        let document = Document::from_spec(&spec);
        match Authentication::from_node(document.declarations().next().unwrap()) {
            Err(AppError::InvalidDeclaration { reason, .. }) => {
                assert_eq!(reason, "duplicate OAuth2 flow 'implicit'");
            }
            other => panic!("expected an invalid declaration, got {:?}", other),
        };
    }

    #[test]
    fn test_unknown_type_is_invalid() {
        let spec = DocumentSpec::new("bad.yaml").declaration(
            NodeSpec::interface("mystery")
                .tag("authentication")
                .child(NodeSpec::field("type", "kerberos")),
        );
        let document = Document::from_spec(&spec);
        match Authentication::from_node(document.declarations().next().unwrap()) {
            Err(AppError::InvalidDeclaration {
                declaration,
                reason,
            }) => {
                assert_eq!(declaration, "bad.yaml/mystery");
                assert_eq!(reason, "unknown authentication type 'kerberos'");
            }
            other => panic!("expected InvalidDeclaration, got {:?}", other),
        };
    }

    #[test]
    fn test_scopes_on_non_oauth2_rejected() {
        let documents = documents();
        let reference =
            AuthenticationReference::new(Alias::named("key")).with_scopes(["read"]);
        assert!(matches!(
            reference.validate(&documents),
            Err(AppError::Validation(_))
        ));
        assert!(AuthenticationReference::new(Alias::named("key"))
            .validate(&documents)
            .is_ok());
    }

    #[test]
    fn test_undeclared_oauth2_scope_rejected() {
        let documents = documents();
        let ok = AuthenticationReference::new(Alias::named("oauth")).with_scopes(["read", "write"]);
        assert!(ok.validate(&documents).is_ok());

        let bad = AuthenticationReference::new(Alias::named("oauth")).with_scopes(["admin"]);
        assert!(matches!(bad.validate(&documents), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_requirement_children() {
        let spec = DocumentSpec::new("req.yaml").declaration(
            NodeSpec::interface("signedIn")
                .tag("requirement")
                .child(NodeSpec::reference("oauth").child(NodeSpec::literal("read")))
                .child(api_key().tagged("scope", "ignored-for-api-key"))
                .child(NodeSpec::field("note", "members are not references")),
        );
        let document = Document::from_spec(&spec);
        let requirement =
            AuthenticationRequirement::from_node(document.declarations().next().unwrap()).unwrap();

        assert_eq!(requirement.name.as_deref(), Some("signedIn"));
        assert_eq!(requirement.authentications.len(), 2);
        assert_eq!(requirement.authentications[0].authentication, Alias::named("oauth"));
        assert_eq!(requirement.authentications[0].scopes, vec!["read".to_string()]);
        assert!(requirement.authentications[1].authentication.is_inline());
        assert_eq!(
            requirement.authentications[1].scopes,
            vec!["ignored-for-api-key".to_string()]
        );
    }

    #[test]
    fn test_and_within_requirement_or_across_list() {
        let documents = documents();
        let both = AuthenticationRequirement::new()
            .with(AuthenticationReference::new(Alias::named("key")))
            .with(AuthenticationReference::new(Alias::named("basic")));
        let oauth_only =
            AuthenticationRequirement::new().with(AuthenticationReference::new(Alias::named("oauth")));
        let requirements = [Alias::Inline(both.clone()), Alias::Inline(oauth_only)];

        let only_key = |auth: &Authentication, _: &[String]| auth.name() == "key";
        assert!(!both.is_satisfied_by(&documents, &only_key).unwrap());
        assert!(!authorizes(&requirements, &documents, &only_key).unwrap());

        let key_and_basic = |auth: &Authentication, _: &[String]| auth.name() != "oauth";
        assert!(both.is_satisfied_by(&documents, &key_and_basic).unwrap());
        assert!(authorizes(&requirements, &documents, &key_and_basic).unwrap());

        let only_oauth = |auth: &Authentication, _: &[String]| auth.name() == "oauth";
        assert!(authorizes(&requirements, &documents, &only_oauth).unwrap());

        let nothing = |_: &Authentication, _: &[String]| false;
        assert!(authorizes(&[], &documents, &nothing).unwrap());
    }

    #[test]
    fn test_broken_alias_is_not_masked() {
        let documents = documents();
        let requirements = [
            Alias::Inline(
                AuthenticationRequirement::new().with(AuthenticationReference::new(Alias::named("key"))),
            ),
            Alias::Inline(
                AuthenticationRequirement::new()
                    .with(AuthenticationReference::new(Alias::named("missing"))),
            ),
        ];
        let anything = |_: &Authentication, _: &[String]| true;
        assert!(matches!(
            authorizes(&requirements, &documents, &anything),
            Err(AppError::UnresolvedAlias { .. })
        ));
    }
}
