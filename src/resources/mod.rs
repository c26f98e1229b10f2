//! Managed resource types and the framework shared by all of them.
//!
//! A resource type is an options struct implementing [`ConfigObject`];
//! [`ObjectResource`] wraps it into the object-safe [`Resource`] trait so the
//! [`ResourceRegistry`] can hold every type behind one interface.

pub mod application;
pub mod diag;
pub mod handler;
pub mod object;
pub mod schema;
pub mod security_ike_proposal;
pub mod security_ipsec_proposal;
pub mod state;

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::junos::Session;

pub use diag::{Diagnostic, Diagnostics, Severity};
pub use object::ConfigObject;
pub use schema::{Attribute, AttributeType, Schema, Validator};
pub use state::ResourceData;

/// Lifecycle operations of one resource type
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name (`junos_application`)
    fn type_name(&self) -> &'static str;

    /// Human description used in messages
    fn description(&self) -> &'static str;

    /// Declarative schema
    fn schema(&self) -> Schema;

    /// Create the object from desired state; sets the id on success
    async fn create(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics;

    /// Refresh state from the device; clears the id when the object is gone
    async fn read(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics;

    /// Apply desired state to an existing object
    async fn update(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics;

    /// Remove the object; clears the id on success
    async fn delete(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics;

    /// Build state for an existing object from its id
    async fn import(&self, sess: &Session, id: &str) -> Result<ResourceData>;
}

/// [`Resource`] implementation for any [`ConfigObject`]
pub struct ObjectResource<T>(PhantomData<fn() -> T>);

impl<T: ConfigObject> ObjectResource<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    /// Coerce, default and validate user input in place
    fn prepare(data: &mut ResourceData) -> Diagnostics {
        let schema = T::schema();
        let mut diags = schema.coerce(&mut data.attributes);
        if diags.has_error() {
            return diags;
        }
        schema.apply_defaults(&mut data.attributes);
        diags.extend(schema.validate(&data.attributes));
        diags
    }
}

impl<T: ConfigObject> Default for ObjectResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: ConfigObject> Resource for ObjectResource<T> {
    fn type_name(&self) -> &'static str {
        T::RESOURCE_TYPE
    }

    fn description(&self) -> &'static str {
        T::DESCRIPTION
    }

    fn schema(&self) -> Schema {
        T::schema()
    }

    async fn create(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics {
        let diags = Self::prepare(data);
        if diags.has_error() {
            return diags;
        }
        handler::create::<T>(sess, data).await
    }

    async fn read(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics {
        handler::read::<T>(sess, data).await
    }

    async fn update(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics {
        let diags = Self::prepare(data);
        if diags.has_error() {
            return diags;
        }
        let name = data.get_str("name");
        if !data.id().is_empty() && name != data.id() {
            return Diagnostics::from_err(Error::validation(
                "name",
                format!(
                    "changing '{}' to '{}' forces a new {}",
                    data.id(),
                    name,
                    T::DESCRIPTION
                ),
            ));
        }
        handler::update::<T>(sess, data).await
    }

    async fn delete(&self, sess: &Session, data: &mut ResourceData) -> Diagnostics {
        handler::delete::<T>(sess, data).await
    }

    async fn import(&self, sess: &Session, id: &str) -> Result<ResourceData> {
        handler::import::<T>(sess, id).await
    }
}

/// Registry of resource types by name
#[derive(Clone)]
pub struct ResourceRegistry {
    resources: IndexMap<&'static str, Arc<dyn Resource>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            resources: IndexMap::new(),
        }
    }

    /// Create a registry with all built-in resource types
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(
            ObjectResource::<application::ApplicationOptions>::new(),
        ));
        registry.register(Arc::new(ObjectResource::<
            security_ike_proposal::IkeProposalOptions,
        >::new()));
        registry.register(Arc::new(ObjectResource::<
            security_ipsec_proposal::IpsecProposalOptions,
        >::new()));
        registry
    }

    /// Register a resource type
    pub fn register(&mut self, resource: Arc<dyn Resource>) {
        self.resources.insert(resource.type_name(), resource);
    }

    /// Get a resource type by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownResource(name.to_string()))
    }

    /// Check if a resource type exists
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Registered type names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Schemas of every registered type
    pub fn schemas(&self) -> IndexMap<&'static str, Schema> {
        self.resources
            .iter()
            .map(|(name, resource)| (*name, resource.schema()))
            .collect()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::connection::{Connection, ConnectionError, ConnectionResult, Connector};
    use serde_json::json;

    struct Unreachable;

    #[async_trait]
    impl Connector for Unreachable {
        async fn connect(&self, _config: &ProviderConfig) -> ConnectionResult<Arc<dyn Connection>> {
            Err(ConnectionError::ConnectionFailed("unreachable".to_string()))
        }
    }

    fn session() -> Session {
        Session::new(ProviderConfig::default(), Arc::new(Unreachable))
    }

    #[test]
    fn test_builtins() {
        let registry = ResourceRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![
                "junos_application",
                "junos_security_ike_proposal",
                "junos_security_ipsec_proposal",
            ]
        );
        assert!(registry.contains("junos_application"));
        assert!(matches!(
            registry.get("junos_interface"),
            Err(Error::UnknownResource(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_before_connecting() {
        let registry = ResourceRegistry::with_builtins();
        let resource = registry.get("junos_security_ipsec_proposal").unwrap();
        let attrs = json!({"name": "p1", "protocol": "gre"});
        let mut data = ResourceData::new(attrs.as_object().cloned().unwrap());

        let diags = resource.create(&session(), &mut data).await;
        assert!(diags.has_error());
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.attribute.as_deref(), Some("protocol"));
        assert!(data.is_gone());
    }

    #[tokio::test]
    async fn test_update_rejects_rename() {
        let resource = ObjectResource::<application::ApplicationOptions>::new();
        let mut data = ResourceData::from_id("app1");
        data.set("name", "app2").unwrap();

        let diags = resource.update(&session(), &mut data).await;
        assert!(diags.has_error());
        let diag = diags.iter().next().unwrap();
        assert_eq!(
            diag.to_string(),
            "name: changing 'app1' to 'app2' forces a new application"
        );
    }

    #[tokio::test]
    async fn test_read_surfaces_connection_error() {
        let resource = ObjectResource::<application::ApplicationOptions>::new();
        let mut data = ResourceData::from_id("app1");
        let diags = resource.read(&session(), &mut data).await;
        assert!(diags.has_error());
        assert_eq!(data.id(), "app1");
    }
}
