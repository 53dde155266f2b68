//! Process-level observer handle.
//!
//! # Responsibilities
//! - Hold the static settings shared by every observed exchange
//! - Hold the publisher handle events are dispatched through
//! - Hand out the inbound layer, correlation contexts and outbound clients
//!
//! # Design Decisions
//! - Settings are immutable after bootstrap and shared via `Arc` without locks
//! - Settings and transport are separate values so either can be swapped in tests

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::bootstrap::{self, BootstrapError, ClientMetadata};
use crate::config::ObserverConfig;
use crate::context::{CorrelationContext, ErrorRecord};
use crate::event::{EventMeta, SdkType};
use crate::interceptor::ObserverLayer;
use crate::outbound::{ObservedClient, OutboundOptions};
use crate::publish::{Publisher, Transport};
use crate::redaction::{PathError, RedactionRules};

/// Static identity and rules echoed into every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub project_id: String,
    pub rules: RedactionRules,
    pub tags: Vec<String>,
    pub service_version: Option<String>,
    pub debug: bool,
}

impl Settings {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    pub fn with_rules(mut self, rules: RedactionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Build settings from config and an already resolved project id.
    pub fn from_config(config: &ObserverConfig, project_id: impl Into<String>) -> Result<Self, PathError> {
        Ok(Self {
            project_id: project_id.into(),
            rules: config.redaction.to_rules()?,
            tags: config.tags.clone(),
            service_version: config.service_version.clone(),
            debug: config.debug,
        })
    }
}

/// Cloneable handle combining static settings with a publisher.
#[derive(Debug, Clone)]
pub struct Observer {
    settings: Arc<Settings>,
    publisher: Publisher,
}

impl Observer {
    pub fn new(settings: Settings, publisher: Publisher) -> Self {
        let publisher = publisher.with_debug(settings.debug);
        Self {
            settings: Arc::new(settings),
            publisher,
        }
    }

    /// Parse rules, resolve the project identity, and wire the transport.
    ///
    /// A configured `project_id` is used as-is. Otherwise the API key is
    /// exchanged for client metadata; any failure there is returned and
    /// should abort startup.
    pub async fn bootstrap(
        config: &ObserverConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, BootstrapError> {
        // Rejects bad rules before any network round trip.
        config.redaction.to_rules()?;

        let metadata = match config.project_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => ClientMetadata::offline(id),
            _ => {
                let client = reqwest::Client::new();
                bootstrap::resolve(&client, &config.api_key, &config.root_url).await?
            }
        };
        let settings = Settings::from_config(config, metadata.project_id)?;

        info!(
            project_id = %settings.project_id,
            transport = transport.name(),
            header_rules = settings.rules.header_names().len(),
            "Observer initialized"
        );

        Ok(Self::new(settings, Publisher::new(transport)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn project_id(&self) -> &str {
        &self.settings.project_id
    }

    /// Tower layer observing every request of a router.
    pub fn layer(&self) -> ObserverLayer {
        ObserverLayer::new(self.clone())
    }

    /// Fresh correlation context for an exchange observed outside the layer.
    pub fn new_context(&self) -> CorrelationContext {
        CorrelationContext::new(self.settings.project_id.clone())
    }

    /// Client whose calls are published as children of `ctx`.
    pub fn observe_outbound_call(&self, ctx: &CorrelationContext, options: OutboundOptions) -> ObservedClient {
        self.observe_outbound_call_with(reqwest::Client::new(), ctx, options)
    }

    /// Same as [`Observer::observe_outbound_call`] over a preconfigured client.
    pub fn observe_outbound_call_with(
        &self,
        client: reqwest::Client,
        ctx: &CorrelationContext,
        options: OutboundOptions,
    ) -> ObservedClient {
        ObservedClient::new(client, self.clone(), ctx.clone(), options)
    }

    pub(crate) fn event_meta(
        &self,
        message_id: Uuid,
        parent_id: Option<Uuid>,
        sdk_type: SdkType,
        errors: Vec<ErrorRecord>,
    ) -> EventMeta {
        EventMeta {
            message_id,
            parent_id,
            project_id: self.settings.project_id.clone(),
            sdk_type,
            tags: self.settings.tags.clone(),
            service_version: self.settings.service_version.clone(),
            errors,
        }
    }
}
