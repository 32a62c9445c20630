#![deny(missing_docs)]

//! # HTTP Protocol
//!
//! Typed collections for HTTP APIs on top of [`ProtocolModel`], plus the
//! protocol-level authentication and connection settings.

use super::predicates::{
    self, parameter_key, AUTHENTICATION, CONNECTION, HEADER, OPERATION_GROUP, REQUIREMENT, RESPONSE,
    RESPONSE_COLLECTION, RESULT,
};
use super::{PredicateRegistry, Protocol, ProtocolModel};
use crate::alias::{Alias, Declared};
use crate::declaration::Declaration;
use crate::error::{AppError, AppResult};
use crate::model::{
    self, Authentication, AuthenticationRequirement, Connection, Credentials, Header, OperationGroup,
    OperationResult, ParamSource, Parameter, Response, ResponseCollection,
};
use crate::tree::{DocumentSet, DocumentSource};
use tracing::debug;

/// The HTTP protocol binding.
#[derive(Debug)]
pub struct HttpProtocol {
    model: ProtocolModel,
    /// Schemes available to the API.
    pub authentications: Vec<Alias<Authentication>>,
    /// Requirements applying to the API as a whole (OR-ed).
    pub authentication_requirements: Vec<Alias<AuthenticationRequirement>>,
    /// Base URLs.
    pub connections: Vec<Alias<Connection>>,
}

impl Default for HttpProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for HttpProtocol {
    fn name(&self) -> &'static str {
        "http"
    }

    fn register_predicates(&self, registry: &mut PredicateRegistry) {
        Self::register(registry);
    }
}

impl HttpProtocol {
    /// A binding with no protocol-level settings.
    pub fn new() -> Self {
        let mut model = ProtocolModel::new();
        Self::register(model.predicates_mut());
        Self {
            model,
            authentications: Vec::new(),
            authentication_requirements: Vec::new(),
            connections: Vec::new(),
        }
    }

    fn register(registry: &mut PredicateRegistry) {
        registry.register(HEADER, predicates::is_header);
        registry.register(AUTHENTICATION, Authentication::is_declaration);
        registry.register(REQUIREMENT, AuthenticationRequirement::is_declaration);
        registry.register(CONNECTION, Connection::is_declaration);
    }

    /// The underlying scanner.
    pub fn model(&self) -> &ProtocolModel {
        &self.model
    }

    /// The underlying scanner, for registering further shapes.
    pub fn model_mut(&mut self) -> &mut ProtocolModel {
        &mut self.model
    }

    /// Operation groups.
    pub fn operation_groups<S: DocumentSource>(&self, documents: &S) -> Vec<Declaration<OperationGroup>> {
        self.model.declarations(documents, OPERATION_GROUP)
    }

    /// Response collections.
    pub fn response_collections<S: DocumentSource>(
        &self,
        documents: &S,
    ) -> Vec<Declaration<ResponseCollection>> {
        self.model.declarations(documents, RESPONSE_COLLECTION)
    }

    /// Single responses.
    pub fn responses<S: DocumentSource>(&self, documents: &S) -> Vec<Declaration<Response>> {
        self.model.declarations(documents, RESPONSE)
    }

    /// Results.
    pub fn results<S: DocumentSource>(&self, documents: &S) -> Vec<Declaration<OperationResult>> {
        self.model.declarations(documents, RESULT)
    }

    /// Parameters in every location.
    pub fn parameters<S: DocumentSource>(&self, documents: &S) -> Vec<Declaration<Parameter>> {
        let keys: Vec<String> = ParamSource::ALL.into_iter().map(parameter_key).collect();
        let kinds: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.model.declarations_any(documents, &kinds)
    }

    /// Parameters carried in `source`.
    pub fn parameters_in<S: DocumentSource>(
        &self,
        documents: &S,
        source: ParamSource,
    ) -> Vec<Declaration<Parameter>> {
        self.model.declarations(documents, &parameter_key(source))
    }

    /// Header declarations.
    pub fn headers<S: DocumentSource>(&self, documents: &S) -> Vec<Declaration<Header>> {
        self.model.declarations(documents, HEADER)
    }

    /// Top-level authentication declarations.
    pub fn declared_authentications<S: DocumentSource>(
        &self,
        documents: &S,
    ) -> Vec<Declaration<Authentication>> {
        self.model.declarations(documents, AUTHENTICATION)
    }

    /// Top-level authentication requirement declarations.
    pub fn declared_requirements<S: DocumentSource>(
        &self,
        documents: &S,
    ) -> Vec<Declaration<AuthenticationRequirement>> {
        self.model.declarations(documents, REQUIREMENT)
    }

    /// Top-level connection declarations.
    pub fn declared_connections<S: DocumentSource>(&self, documents: &S) -> Vec<Declaration<Connection>> {
        self.model.declarations(documents, CONNECTION)
    }

    /// Evaluates the protocol-level requirements against `credentials`.
    pub fn authorizes<S, C>(&self, documents: &S, credentials: &C) -> AppResult<bool>
    where
        S: DocumentSource,
        C: Credentials + ?Sized,
    {
        model::authorizes(&self.authentication_requirements, documents, credentials)
    }

    /// Resolves every protocol-level alias and validates requirement scopes
    /// and connection templates.
    pub fn validate<S: DocumentSource>(&self, documents: &S) -> AppResult<()> {
        for authentication in &self.authentications {
            authentication.resolve(documents)?;
        }
        for requirement in &self.authentication_requirements {
            requirement.resolve(documents)?.validate(documents)?;
        }
        for connection in &self.connections {
            connection.resolve(documents)?.validate()?;
        }
        debug!(
            authentications = self.authentications.len(),
            requirements = self.authentication_requirements.len(),
            connections = self.connections.len(),
            "validated http protocol settings"
        );
        Ok(())
    }

    /// Adds a new operation group declaration.
    ///
    /// # Errors
    ///
    /// Always `NotImplemented`: declarations cannot be synthesized yet.
    pub fn create_operation_group(
        &mut self,
        _documents: &mut DocumentSet,
        name: &str,
    ) -> AppResult<Declaration<OperationGroup>> {
        Err(AppError::NotImplemented(format!(
            "creating operation group '{}'",
            name
        )))
    }

    /// Adds a new result type alias.
    ///
    /// # Errors
    ///
    /// Always `NotImplemented`: declarations cannot be synthesized yet.
    pub fn create_operation_result_alias(
        &mut self,
        _documents: &mut DocumentSet,
        name: &str,
    ) -> AppResult<Declaration<OperationResult>> {
        Err(AppError::NotImplemented(format!(
            "creating operation result alias '{}'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Document, DocumentSpec, NodeSpec};
    use pretty_assertions::assert_eq;

    fn documents() -> DocumentSet {
        let spec = DocumentSpec::new("api.yaml")
            .declaration(NodeSpec::interface("Pets").child(NodeSpec::operation("list")))
            .declaration(NodeSpec::type_alias("Limit").child(
                NodeSpec::reference("Query").child(NodeSpec::reference("integer")),
            ))
            .declaration(NodeSpec::type_alias("Session").child(
                NodeSpec::reference("Cookie").child(NodeSpec::reference("string")),
            ))
            .declaration(
                NodeSpec::type_alias("RequestId")
                    .tagged("header", "X-Request-Id")
                    .child(NodeSpec::reference("string")),
            )
            .declaration(
                NodeSpec::interface("basic")
                    .tag("authentication")
                    .child(NodeSpec::field("type", "http"))
                    .child(NodeSpec::field("scheme", "basic")),
            )
            .declaration(
                NodeSpec::interface("main")
                    .tag("connection")
                    .child(NodeSpec::field("url", "https://api.example.com")),
            );
        [Document::from_spec(&spec)].into_iter().collect()
    }

    #[test]
    fn test_collections() {
        let documents = documents();
        let http = HttpProtocol::new();
        assert_eq!(http.operation_groups(&documents).len(), 1);
        assert_eq!(http.parameters(&documents).len(), 2);

        let cookies = http.parameters_in(&documents, ParamSource::Cookie);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value(&documents).unwrap().name, "Session");

        let headers = http.headers(&documents);
        assert_eq!(headers[0].value(&documents).unwrap().wire_name, "X-Request-Id");
        assert_eq!(http.declared_authentications(&documents).len(), 1);
        assert_eq!(http.declared_connections(&documents).len(), 1);
        assert!(http.declared_requirements(&documents).is_empty());
    }

    #[test]
    fn test_validate_resolves_settings() {
        let documents = documents();
        let mut http = HttpProtocol::new();
        http.authentications.push(Alias::named("basic"));
        http.connections.push(Alias::named("main"));
        assert!(http.validate(&documents).is_ok());

        http.connections.push(Alias::named("backup"));
        assert!(matches!(
            http.validate(&documents),
            Err(AppError::UnresolvedAlias { kind: "connection", .. })
        ));
    }

    #[test]
    fn test_create_is_not_implemented() {
        let mut documents = documents();
        let mut http = HttpProtocol::new();
        assert!(matches!(
            http.create_operation_group(&mut documents, "Stores"),
            Err(AppError::NotImplemented(_))
        ));
        assert!(matches!(
            http.create_operation_result_alias(&mut documents, "StoreResult"),
            Err(AppError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_registers_as_protocol() {
        let model = ProtocolModel::new().with_protocol(&HttpProtocol::new());
        assert!(model.predicates().is_registered(HEADER));
        assert!(model.predicates().is_registered(CONNECTION));
    }
}
