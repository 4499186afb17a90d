//! REST client for the policy backend
//!
//! [`BackendClient`] is a thin pass-through: it serializes requests, maps
//! non-2xx responses and `success: false` bodies to [`Error::Transport`] and
//! otherwise returns the backend's data unchanged. It holds no state beyond
//! the connection pool and is cheap to clone into async tasks.

pub mod wire;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::core::error::{Error, Result};
use crate::core::objects::{
    AddressGroup, AddressObject, FALLBACK_APPLICATIONS, FirewallPath, ServiceGroup, ServiceObject,
};

pub use wire::{
    CreateAddressGroupRequest, CreateEndpoint, CreateObjectRequest, CreateResponse,
    CreateRuleRequest, CreateServiceGroupRequest, CreateServiceRequest, GroupDetails, GroupMatch,
    MatchedObject, ProfileCatalog, SearchResults, ServiceQuery,
};

/// Origin used when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Object kind sent to `check_object_name`
pub const SERVICE_OBJECT_TYPE: &str = "service";

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url,
        }
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self::new(
            config.backend(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {path}");
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST {path}");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<wire::ErrorBody>(&body)
                .ok()
                .and_then(wire::ErrorBody::into_message)
                .unwrap_or_else(|| format!("{path} returned {status}"));
            return Err(Error::transport(message, Some(status.as_u16())));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Sends a create request and returns the created entity's name.
    ///
    /// The backend answers failures either with a 4xx/5xx or with a 200 and
    /// `success: false`; both become [`Error::Transport`] carrying the message
    /// the endpoint uses.
    async fn create<B: Serialize>(
        &self,
        endpoint: CreateEndpoint,
        body: &B,
        requested_name: &str,
    ) -> Result<String> {
        let path = endpoint.path();
        info!("POST {path} ({requested_name})");

        let response = self.http.post(self.url(&path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let http_status = (!status.is_success()).then_some(status.as_u16());

        match serde_json::from_str::<CreateResponse>(&text) {
            Ok(parsed) if parsed.success && status.is_success() => Ok(endpoint
                .created_name(&parsed)
                .unwrap_or_else(|| requested_name.to_string())),
            Ok(parsed) => Err(Error::transport(endpoint.failure_message(&parsed), http_status)),
            Err(_) => Err(Error::transport(
                endpoint.failure_message(&CreateResponse::default()),
                Some(status.as_u16()),
            )),
        }
    }

    // ── Lookups ────────────────────────────────────────────────────────────

    /// Existing address objects whose value matches `address`
    pub async fn check_object(&self, address: &str) -> Result<Vec<MatchedObject>> {
        let resp: wire::LookupResponse = self
            .post_json("/check_object/", &wire::CheckObjectRequest { address })
            .await?;
        Ok(if resp.exists { resp.objects } else { Vec::new() })
    }

    /// Service objects matching a name or protocol/port pair, `None` when
    /// the backend reports no match. A match may come without object detail.
    pub async fn check_service(&self, query: &ServiceQuery) -> Result<Option<Vec<MatchedObject>>> {
        let resp: wire::LookupResponse = self.post_json("/check_service/", query).await?;
        Ok(resp.exists.then_some(resp.objects))
    }

    pub async fn check_object_name(&self, name: &str, object_type: &str) -> Result<bool> {
        let resp: wire::ExistsResponse = self
            .post_json(
                "/check_object_name/",
                &wire::CheckObjectNameRequest {
                    object_name: name,
                    object_type,
                },
            )
            .await?;
        Ok(resp.exists)
    }

    pub async fn check_address_group_name(&self, name: &str) -> Result<bool> {
        let resp: wire::ExistsResponse = self
            .post_json(
                "/check_address_group_name/",
                &wire::CheckGroupNameRequest { group_name: name },
            )
            .await?;
        Ok(resp.exists)
    }

    pub async fn check_service_group_name(&self, name: &str) -> Result<bool> {
        let resp: wire::ExistsResponse = self
            .post_json(
                "/check_service_group_name/",
                &wire::CheckGroupNameRequest { group_name: name },
            )
            .await?;
        Ok(resp.exists)
    }

    pub async fn search_address_group(&self, term: &str) -> Result<SearchResults<AddressObject>> {
        self.post_json(
            "/search_address_group/",
            &wire::SearchRequest { search_term: term },
        )
        .await
    }

    pub async fn search_service_group(&self, term: &str) -> Result<SearchResults<ServiceObject>> {
        self.post_json(
            "/search_service_group/",
            &wire::SearchRequest { search_term: term },
        )
        .await
    }

    // ── Listings ───────────────────────────────────────────────────────────

    pub async fn list_address_objects(&self) -> Result<Vec<AddressObject>> {
        let list: wire::AddressObjectList = self.get_json("/list_address_objects/").await?;
        Ok(list.objects)
    }

    pub async fn list_service_objects(&self) -> Result<Vec<ServiceObject>> {
        let list: wire::ServiceObjectList = self.get_json("/list_service_objects/").await?;
        Ok(list.objects)
    }

    pub async fn list_address_groups(&self) -> Result<Vec<AddressGroup>> {
        let list: wire::AddressGroupList = self.get_json("/list_address_groups/").await?;
        Ok(list.groups)
    }

    pub async fn list_service_groups(&self) -> Result<Vec<ServiceGroup>> {
        let list: wire::ServiceGroupList = self.get_json("/list_service_groups/").await?;
        Ok(list.groups)
    }

    /// Application names; a non-success status yields the built-in list
    pub async fn list_applications(&self) -> Result<Vec<String>> {
        let list: wire::ApplicationList = self.get_json("/list_applications/").await?;
        if list.status.as_deref() == Some("success") {
            Ok(list.applications)
        } else {
            info!("Backend application list unavailable, using built-in list");
            Ok(fallback_applications())
        }
    }

    pub async fn list_security_profiles(&self) -> Result<ProfileCatalog> {
        let list: wire::ProfileList = self.get_json("/list_security_profiles/").await?;
        Ok(ProfileCatalog::from_keyed(list.profiles))
    }

    pub async fn firewall_hierarchy(&self) -> Result<Vec<FirewallPath>> {
        let list: wire::HierarchyList = self.get_json("/firewall-hierarchy/").await?;
        Ok(list.data)
    }

    // ── Creation ───────────────────────────────────────────────────────────

    pub async fn create_object(&self, request: &CreateObjectRequest) -> Result<String> {
        self.create(CreateEndpoint::AddressObject, request, &request.object_name)
            .await
    }

    pub async fn create_service(&self, request: &CreateServiceRequest) -> Result<String> {
        self.create(CreateEndpoint::ServiceObject, request, &request.object_name)
            .await
    }

    pub async fn create_service_group(&self, request: &CreateServiceGroupRequest) -> Result<String> {
        self.create(CreateEndpoint::ServiceGroup, request, &request.name)
            .await
    }

    pub async fn create_address_group(&self, request: &CreateAddressGroupRequest) -> Result<String> {
        self.create(CreateEndpoint::AddressGroup, request, &request.name)
            .await
    }

    pub async fn create_rule(&self, request: &CreateRuleRequest) -> Result<String> {
        self.create(CreateEndpoint::Rule, request, &request.name).await
    }
}

pub fn fallback_applications() -> Vec<String> {
    FALLBACK_APPLICATIONS.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BackendClient::new("http://panorama-api.local:8000/", Duration::from_secs(5));
        assert_eq!(client.base_url(), "http://panorama-api.local:8000");
        assert_eq!(
            client.url("/check_object/"),
            "http://panorama-api.local:8000/check_object/"
        );
    }

    #[test]
    fn test_fallback_applications() {
        let apps = fallback_applications();
        assert_eq!(apps.first().map(String::as_str), Some("any"));
        assert!(apps.iter().any(|a| a == "web-browsing"));
        assert_eq!(apps.len(), 15);
    }
}
