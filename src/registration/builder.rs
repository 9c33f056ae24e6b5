//! GitHub service builder
//!
//! Fluent configuration that wires the transport primitive, the connection
//! layers and every resolved client into a [`ServiceCollection`].

use crate::connection::{
    ApiConnection, Connection, CredentialStore, DefaultApiConnection, HttpConnection,
    InMemoryCredentialStore, JsonSerializer, PackageInfo, ProductHeaderValue, SimpleJsonSerializer,
    GITHUB_API_URL,
};
use crate::config::Settings;
use crate::error::{require_non_blank, OctowireError, Result};
use crate::graph::{AnyInstance, BoundConstructor, ClientUniverse, ResolutionMode};
use crate::registration::provider::ServiceProvider;
use crate::registration::services::{ServiceCollection, ServiceDescriptor, ServiceFactory, ServiceKey};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

impl ServiceCollection {
    /// Start configuring a GitHub client, optionally under a discriminator name
    pub fn add_github_client(&mut self, name: Option<&str>) -> Result<GitHubServiceBuilder<'_>> {
        if let Some(name) = name {
            require_non_blank("name", name)?;
        }
        Ok(GitHubServiceBuilder::new(self, name.map(str::to_string)))
    }

    /// Configure a GitHub client in one go and hand back the collection
    pub fn configure_github_client<F>(&mut self, name: Option<&str>, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(GitHubServiceBuilder<'_>) -> Result<GitHubServiceBuilder<'_>>,
    {
        configure(self.add_github_client(name)?)?;
        Ok(self)
    }

    /// Wire the complete hierarchy from loaded settings.
    ///
    /// The credential store from `settings` replaces any registered earlier.
    pub fn add_github_from_settings(
        &mut self,
        settings: &Settings,
        package: &PackageInfo,
    ) -> Result<&mut Self> {
        let credentials = settings.credentials.to_credentials();
        info!(
            client = ?settings.client_name,
            base_url = %settings.base_url,
            mode = ?settings.resolution_mode,
            authentication = ?credentials.authentication_type(),
            "Configuring GitHub client"
        );

        let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new(credentials));
        self.add_singleton(store);

        self.configure_github_client(settings.client_name.as_deref(), |github| {
            github
                .with_resolution_mode(settings.resolution_mode)
                .with_base_url(settings.base_url.clone())
                .with_request_timeout(settings.request_timeout())
                .use_product_header(Some(package))?
                .use_connection()
                .add_clients()
        })
    }
}

pub struct GitHubServiceBuilder<'a> {
    services: &'a mut ServiceCollection,
    name: Option<String>,
    mode: ResolutionMode,
    base_address: String,
    request_timeout: Option<Duration>,
}

impl<'a> GitHubServiceBuilder<'a> {
    fn new(services: &'a mut ServiceCollection, name: Option<String>) -> Self {
        Self {
            services,
            name,
            mode: ResolutionMode::default(),
            base_address: GITHUB_API_URL.to_string(),
            request_timeout: None,
        }
    }

    pub fn services(&self) -> &ServiceCollection {
        self.services
    }

    /// Transport discriminator name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn resolution_mode(&self) -> ResolutionMode {
        self.mode
    }

    pub fn with_resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// API address used by connections registered afterwards
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_address = base_url.into();
        self
    }

    /// Initial timeout of connections registered afterwards; `None` never times out
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Register the outbound identity derived from a package's name and version
    pub fn use_product_header(self, package: Option<&PackageInfo>) -> Result<Self> {
        let package = package.ok_or_else(|| {
            OctowireError::invalid_input("package", "a package reference is required")
        })?;

        let header = package.product_header()?;
        debug!(product = %header, "Registering product header");
        self.services.add_singleton(Arc::new(header));

        Ok(self)
    }

    /// Register the transport primitive (once per name), the connection and the API connection.
    ///
    /// A missing product header only surfaces when a connection is constructed.
    pub fn use_connection(self) -> Self {
        let name = self.name.clone();

        if !self
            .services
            .contains_named::<dyn HttpTransport>(name.as_deref())
        {
            self.services
                .add_named_singleton_factory::<dyn HttpTransport, _>(name.as_deref(), |_| {
                    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
                    Ok(transport)
                });
        }

        if self.mode == ResolutionMode::Lenient {
            let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::anonymous());
            self.services.try_add_singleton(store);
            let serializer: Arc<dyn JsonSerializer> = Arc::new(SimpleJsonSerializer);
            self.services.try_add_singleton(serializer);
        }

        let base_address = self.base_address.clone();
        let timeout = self.request_timeout;
        self.services
            .add_transient::<dyn Connection, _>(move |provider| {
                let connection = build_connection(provider, name.as_deref(), &base_address)?;
                connection.set_request_timeout(timeout);
                let connection: Arc<dyn Connection> = Arc::new(connection);
                Ok(connection)
            });

        self.services
            .add_transient::<dyn ApiConnection, _>(|provider| {
                let connection = provider.get_required::<dyn Connection>()?;
                let api: Arc<dyn ApiConnection> = Arc::new(DefaultApiConnection::new(connection));
                Ok(api)
            });

        self
    }

    /// Resolve the GitHub client hierarchy and register every bound client
    pub fn add_clients(self) -> Result<Self> {
        self.add_clients_from(&ClientUniverse::github())
    }

    /// Resolve `universe` and register a constructor per binding.
    ///
    /// Interfaces that already have a registration keep it.
    pub fn add_clients_from(self, universe: &ClientUniverse) -> Result<Self> {
        let graph = universe.resolve(self.mode)?;

        for binding in graph.bindings() {
            let factory: ServiceFactory = match binding.constructor {
                BoundConstructor::ApiConnection(ctor) => {
                    Arc::new(move |provider: &ServiceProvider| -> Result<AnyInstance> {
                        Ok(ctor(provider.get_required::<dyn ApiConnection>()?))
                    })
                }
                BoundConstructor::Connection(ctor) => {
                    Arc::new(move |provider: &ServiceProvider| -> Result<AnyInstance> {
                        Ok(ctor(provider.get_required::<dyn Connection>()?))
                    })
                }
            };

            let key = ServiceKey::for_interface(binding.interface);
            if self.services.try_add(ServiceDescriptor::transient(key, factory)) {
                debug!(
                    interface = binding.interface.name(),
                    implementation = binding.implementation,
                    "Registered client"
                );
            } else {
                debug!(
                    interface = binding.interface.name(),
                    "Keeping existing client registration"
                );
            }
        }

        Ok(self)
    }
}

fn build_connection(
    provider: &ServiceProvider,
    name: Option<&str>,
    base_address: &str,
) -> Result<HttpConnection> {
    let product = provider.get_required::<ProductHeaderValue>()?;
    let transport = provider.get_required_named::<dyn HttpTransport>(name)?;
    let connection =
        HttpConnection::new((*product).clone(), transport).with_base_address(base_address);

    let Some(store) = provider.get::<dyn CredentialStore>()? else {
        return Ok(connection);
    };

    let serializer = match provider.get::<dyn JsonSerializer>()? {
        Some(serializer) => serializer,
        None => Arc::new(SimpleJsonSerializer),
    };

    Ok(connection
        .with_credential_store(store)
        .with_serializer(serializer))
}
