//! Request and response bodies of the policy backend
//!
//! Field names are the backend's, including its mix of camelCase and
//! snake_case (`objectName`, `group_name`, `rule_type`). Do not normalize them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::objects::{
    AddressGroup, AddressObject, AddressType, FirewallPath, GroupType, ProfileCategory,
    RuleAction, RuleType, SecurityProfiles, ServiceGroup, ServiceObject,
};

// ═══════════════════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateObjectRequest {
    #[serde(rename = "objectName")]
    pub object_name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateServiceRequest {
    #[serde(rename = "objectName")]
    pub object_name: String,
    pub protocol: String,
    pub port: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "deviceGroup", skip_serializing_if = "Option::is_none")]
    pub device_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateServiceGroupRequest {
    pub name: String,
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "deviceGroup", skip_serializing_if = "Option::is_none")]
    pub device_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateAddressGroupRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "deviceGroup")]
    pub device_group: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateRuleRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "sourceZone")]
    pub source_zone: String,
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    #[serde(rename = "destinationZone")]
    pub destination_zone: String,
    #[serde(rename = "destinationIP")]
    pub destination_ip: String,
    /// Service name; the backend calls it a port
    #[serde(rename = "destinationPort")]
    pub destination_port: String,
    pub application: String,
    pub action: RuleAction,
    pub location: String,
    pub rule_type: RuleType,
    pub disabled: bool,
    #[serde(rename = "logSetting")]
    pub log_setting: String,
    #[serde(rename = "logStart")]
    pub log_start: bool,
    #[serde(rename = "logEnd")]
    pub log_end: bool,
    #[serde(rename = "negateSource")]
    pub negate_source: bool,
    #[serde(rename = "negateDestination")]
    pub negate_destination: bool,
    #[serde(rename = "securityProfiles")]
    pub security_profiles: SecurityProfiles,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CheckObjectRequest<'a> {
    pub address: &'a str,
}

/// Lookup key for `check_service`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServiceQuery {
    ByName {
        #[serde(rename = "serviceName")]
        service_name: String,
    },
    ByProtocolPort {
        protocol: String,
        port: String,
    },
}

impl ServiceQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::ByName {
            service_name: name.into(),
        }
    }

    pub fn by_port(protocol: impl Into<String>, port: impl Into<String>) -> Self {
        Self::ByProtocolPort {
            protocol: protocol.into(),
            port: port.into(),
        }
    }
}

impl std::fmt::Display for ServiceQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByName { service_name } => write!(f, "{service_name}"),
            Self::ByProtocolPort { protocol, port } => write!(f, "{protocol}/{port}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CheckObjectNameRequest<'a> {
    #[serde(rename = "objectName")]
    pub object_name: &'a str,
    #[serde(rename = "objectType")]
    pub object_type: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CheckGroupNameRequest<'a> {
    #[serde(rename = "groupName")]
    pub group_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SearchRequest<'a> {
    #[serde(rename = "searchTerm")]
    pub search_term: &'a str,
}

// ═══════════════════════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════════════════════

/// Body of every create endpoint. Which failure field is populated depends
/// on the endpoint, see [`CreateEndpoint::failure_message`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CreateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(rename = "objectName", default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub rule_name: Option<String>,
}

/// The create endpoints, each with its own way of reporting failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CreateEndpoint {
    #[strum(serialize = "create_object")]
    AddressObject,
    #[strum(serialize = "create_service")]
    ServiceObject,
    #[strum(serialize = "create_service_group")]
    ServiceGroup,
    #[strum(serialize = "create_address_group")]
    AddressGroup,
    #[strum(serialize = "create-rule")]
    Rule,
}

fn non_empty(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl CreateEndpoint {
    pub fn path(self) -> String {
        format!("/{self}/")
    }

    pub fn failure_message(self, response: &CreateResponse) -> String {
        let error = non_empty(response.error.as_ref());
        let message = non_empty(response.message.as_ref());
        let details = non_empty(response.details.as_ref());

        match self {
            Self::AddressObject => error.unwrap_or("Failed to create object").to_string(),
            Self::ServiceObject => message
                .or(error)
                .unwrap_or("Failed to create service object. Please check permissions.")
                .to_string(),
            Self::ServiceGroup => error.unwrap_or("Failed to create service group.").to_string(),
            Self::AddressGroup => message.unwrap_or("Failed to create address group.").to_string(),
            Self::Rule => match (error, details) {
                (Some(e), Some(d)) => format!("Failed to create rule: {e} ({d})"),
                (Some(e), None) => format!("Failed to create rule: {e}"),
                (None, Some(d)) => format!("Failed to create rule. Details: {d}"),
                (None, None) => "Failed to create rule".to_string(),
            },
        }
    }

    /// Name the backend reports for the created entity, when it reports one
    pub fn created_name(self, response: &CreateResponse) -> Option<String> {
        match self {
            Self::AddressObject => None,
            Self::ServiceObject => response.object_name.clone(),
            Self::ServiceGroup | Self::AddressGroup => response.group_name.clone(),
            Self::Rule => response.rule_name.clone(),
        }
    }
}

/// Error body of non-create endpoints
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .or(self.details)
            .filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExistsResponse {
    #[serde(default)]
    pub exists: bool,
}

/// An existing object the backend matched during a lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchedObject {
    #[serde(rename = "objectName", alias = "name", default)]
    pub object_name: String,
    #[serde(rename = "objectDetails", default)]
    pub object_details: Option<serde_json::Value>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MatchedObject {
    fn detail(&self, key: &str) -> Option<String> {
        self.object_details
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Top-level field first, then the same key inside `objectDetails`
    pub fn protocol(&self) -> Option<String> {
        self.protocol.clone().or_else(|| self.detail("protocol"))
    }

    pub fn port(&self) -> Option<String> {
        self.port.clone().or_else(|| self.detail("port"))
    }

    pub fn value(&self) -> Option<String> {
        self.detail("value")
    }

    pub fn description(&self) -> Option<String> {
        self.description.clone().or_else(|| self.detail("description"))
    }

    pub fn tags(&self) -> Vec<String> {
        if !self.tags.is_empty() {
            return self.tags.clone();
        }
        self.object_details
            .as_ref()
            .and_then(|d| d.get("tags"))
            .and_then(serde_json::Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub objects: Vec<MatchedObject>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    pub objects: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GroupList<T> {
    #[serde(default = "Vec::new")]
    pub groups: Vec<T>,
}

pub(crate) type AddressObjectList = ObjectList<AddressObject>;
pub(crate) type ServiceObjectList = ObjectList<ServiceObject>;
pub(crate) type AddressGroupList = GroupList<AddressGroup>;
pub(crate) type ServiceGroupList = GroupList<ServiceGroup>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationList {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub applications: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct NamedEntry {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileList {
    #[serde(default)]
    pub profiles: HashMap<String, Vec<NamedEntry>>,
}

/// Security profile names available per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileCatalog {
    entries: HashMap<ProfileCategory, Vec<String>>,
}

impl ProfileCatalog {
    pub(crate) fn from_keyed(mut keyed: HashMap<String, Vec<NamedEntry>>) -> Self {
        use strum::IntoEnumIterator;

        let entries = ProfileCategory::iter()
            .filter_map(|category| {
                keyed.remove(category.key()).map(|list| {
                    (category, list.into_iter().map(|e| e.name).collect())
                })
            })
            .collect();
        Self { entries }
    }

    pub fn names(&self, category: ProfileCategory) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HierarchyList {
    #[serde(default)]
    pub data: Vec<FirewallPath>,
}

/// Extra detail the search endpoints attach to a matched group
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GroupDetails {
    #[serde(rename = "type", default)]
    pub group_type: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GroupMatch {
    pub name: String,
    #[serde(default)]
    pub details: Option<GroupDetails>,
}

/// Result of a group search: matching groups, or objects when no group matched
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchResults<T> {
    #[serde(default = "Vec::new")]
    pub groups: Vec<GroupMatch>,
    #[serde(default = "Vec::new")]
    pub objects: Vec<T>,
}

impl<T> Default for SearchResults<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            objects: Vec::new(),
        }
    }
}

impl<T> SearchResults<T> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.objects.is_empty()
    }
}
