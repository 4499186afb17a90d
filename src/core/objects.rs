//! Policy object types as the backend reports them
//!
//! Field names follow the backend payloads. Optional fields default so that
//! partially filled listings still deserialize.

use serde::{Deserialize, Serialize};

/// Device group every create form defaults to.
pub const SHARED_LOCATION: &str = "shared";

/// Backend type tag of an address object.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum AddressType {
    #[default]
    #[serde(rename = "ip-netmask")]
    #[strum(serialize = "ip-netmask")]
    IpNetmask,
    #[serde(rename = "ip-range")]
    #[strum(serialize = "ip-range")]
    IpRange,
    #[serde(rename = "fqdn")]
    #[strum(serialize = "fqdn")]
    Fqdn,
    #[serde(rename = "ip-wildcard")]
    #[strum(serialize = "ip-wildcard")]
    IpWildcard,
}

impl AddressType {
    /// Types offered when creating an object from the console
    pub const CREATABLE: [Self; 3] = [Self::IpNetmask, Self::IpRange, Self::Fqdn];

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::IpNetmask => "IP Netmask",
            Self::IpRange => "IP Range",
            Self::Fqdn => "FQDN",
            Self::IpWildcard => "IP Wildcard",
        }
    }
}

/// Protocol of a service object
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum ServiceProtocol {
    #[default]
    #[strum(serialize = "tcp")]
    Tcp,
    #[strum(serialize = "udp")]
    Udp,
    #[strum(serialize = "icmp")]
    Icmp,
    #[strum(serialize = "sctp")]
    Sctp,
}

impl ServiceProtocol {
    /// Protocols the service checker lets the user look up
    pub const CHECKABLE: [Self; 2] = [Self::Tcp, Self::Udp];
}

/// Static groups list members explicitly, dynamic groups match by tag filter.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    #[default]
    #[strum(serialize = "static")]
    Static,
    #[strum(serialize = "dynamic")]
    Dynamic,
}

/// Reference to a group an object belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRef {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressObject {
    pub name: String,
    #[serde(rename = "type", default)]
    pub address_type: AddressType,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

impl AddressObject {
    /// Case-insensitive substring match on name or value
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.value.to_lowercase().contains(needle_lowercase)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceObject {
    pub name: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

impl ServiceObject {
    /// `name (proto/port)`, falling back to `any` for missing halves
    pub fn display(&self) -> String {
        format!(
            "{} ({}/{})",
            self.name,
            self.protocol.as_deref().unwrap_or("any"),
            self.port.as_deref().unwrap_or("any")
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressGroup {
    pub name: String,
    #[serde(rename = "type", default)]
    pub group_type: GroupType,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceGroup {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// An entry the service browser can offer for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceItem {
    Object(ServiceObject),
    Group {
        group: ServiceGroup,
        /// Members annotated with `(proto/port)` where the object is known
        member_details: Vec<String>,
    },
}

impl ServiceItem {
    pub fn name(&self) -> &str {
        match self {
            Self::Object(obj) => &obj.name,
            Self::Group { group, .. } => &group.name,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Object(obj) => obj.display(),
            Self::Group { group, .. } => format!("{} (Group)", group.name),
        }
    }
}

/// Merges service objects and groups into one browsable list, objects first.
pub fn combine_service_items(objects: Vec<ServiceObject>, groups: Vec<ServiceGroup>) -> Vec<ServiceItem> {
    let details = |member: &String| -> String {
        objects.iter().find(|o| &o.name == member).map_or_else(
            || member.clone(),
            |o| {
                format!(
                    "{member} ({}/{})",
                    o.protocol.as_deref().unwrap_or("any"),
                    o.port.as_deref().unwrap_or("any")
                )
            },
        )
    };

    let group_items: Vec<ServiceItem> = groups
        .into_iter()
        .map(|group| ServiceItem::Group {
            member_details: group.members.iter().map(details).collect(),
            group,
        })
        .collect();

    objects
        .into_iter()
        .map(ServiceItem::Object)
        .chain(group_items)
        .collect()
}

/// A choice in the rule form's service picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOption {
    pub name: String,
    pub display: String,
}

impl std::fmt::Display for ServiceOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

/// Builds picker options from service objects plus the groups they belong to.
///
/// Groups are appended once each, in first-seen order.
pub fn service_options(objects: &[ServiceObject]) -> Vec<ServiceOption> {
    let mut options: Vec<ServiceOption> = objects
        .iter()
        .map(|obj| {
            let display = if obj.protocol.is_some() || obj.port.is_some() {
                format!(
                    "{} ({}/{})",
                    obj.name,
                    obj.protocol.as_deref().unwrap_or("tcp"),
                    obj.port.as_deref().unwrap_or("any")
                )
            } else {
                obj.name.clone()
            };
            ServiceOption {
                name: obj.name.clone(),
                display,
            }
        })
        .collect();

    for group in objects.iter().flat_map(|o| o.groups.iter()) {
        if !options.iter().any(|opt| opt.name == group.name) {
            options.push(ServiceOption {
                name: group.name.clone(),
                display: format!("{} (service-group)", group.name),
            });
        }
    }

    options
}

/// One managed firewall and its device-group chain, root first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirewallPath {
    pub hostname: String,
    #[serde(default)]
    pub path: Vec<String>,
}

/// Security rule action
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum RuleAction {
    #[default]
    #[serde(rename = "allow")]
    #[strum(serialize = "allow")]
    Allow,
    #[serde(rename = "deny")]
    #[strum(serialize = "deny")]
    Deny,
    #[serde(rename = "drop")]
    #[strum(serialize = "drop")]
    Drop,
    #[serde(rename = "reset-client")]
    #[strum(serialize = "reset-client")]
    ResetClient,
    #[serde(rename = "reset-server")]
    #[strum(serialize = "reset-server")]
    ResetServer,
    #[serde(rename = "reset-both")]
    #[strum(serialize = "reset-both")]
    ResetBoth,
}

/// Pre-rules are evaluated before device-local rules, post-rules after.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[strum(serialize = "pre")]
    Pre,
    #[default]
    #[strum(serialize = "post")]
    Post,
}

/// Security profile category, in the order the backend lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum ProfileCategory {
    Antivirus,
    AntiSpyware,
    Vulnerability,
    UrlFiltering,
    FileBlocking,
    Wildfire,
    DataFiltering,
    ProfileGroup,
}

impl ProfileCategory {
    /// JSON key used by the backend
    pub const fn key(self) -> &'static str {
        match self {
            Self::Antivirus => "antivirus",
            Self::AntiSpyware => "antiSpyware",
            Self::Vulnerability => "vulnerability",
            Self::UrlFiltering => "urlFiltering",
            Self::FileBlocking => "fileBlocking",
            Self::Wildfire => "wildfire",
            Self::DataFiltering => "dataFiltering",
            Self::ProfileGroup => "profileGroup",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Antivirus => "Antivirus",
            Self::AntiSpyware => "Anti-Spyware",
            Self::Vulnerability => "Vulnerability",
            Self::UrlFiltering => "URL Filtering",
            Self::FileBlocking => "File Blocking",
            Self::Wildfire => "WildFire Analysis",
            Self::DataFiltering => "Data Filtering",
            Self::ProfileGroup => "Profile Group",
        }
    }
}

/// Profiles attached to a rule; empty string means none.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityProfiles {
    pub antivirus: String,
    pub anti_spyware: String,
    pub vulnerability: String,
    pub url_filtering: String,
    pub file_blocking: String,
    pub wildfire: String,
    pub data_filtering: String,
    pub profile_group: String,
}

impl SecurityProfiles {
    pub fn get(&self, category: ProfileCategory) -> &str {
        match category {
            ProfileCategory::Antivirus => &self.antivirus,
            ProfileCategory::AntiSpyware => &self.anti_spyware,
            ProfileCategory::Vulnerability => &self.vulnerability,
            ProfileCategory::UrlFiltering => &self.url_filtering,
            ProfileCategory::FileBlocking => &self.file_blocking,
            ProfileCategory::Wildfire => &self.wildfire,
            ProfileCategory::DataFiltering => &self.data_filtering,
            ProfileCategory::ProfileGroup => &self.profile_group,
        }
    }

    pub fn set(&mut self, category: ProfileCategory, value: String) {
        let slot = match category {
            ProfileCategory::Antivirus => &mut self.antivirus,
            ProfileCategory::AntiSpyware => &mut self.anti_spyware,
            ProfileCategory::Vulnerability => &mut self.vulnerability,
            ProfileCategory::UrlFiltering => &mut self.url_filtering,
            ProfileCategory::FileBlocking => &mut self.file_blocking,
            ProfileCategory::Wildfire => &mut self.wildfire,
            ProfileCategory::DataFiltering => &mut self.data_filtering,
            ProfileCategory::ProfileGroup => &mut self.profile_group,
        };
        *slot = value;
    }

    /// `category: profile` pairs for every non-empty slot, or `None`
    pub fn summary(&self) -> String {
        use strum::IntoEnumIterator;

        let active: Vec<String> = ProfileCategory::iter()
            .filter(|c| !self.get(*c).is_empty())
            .map(|c| format!("{}: {}", c.key(), self.get(c)))
            .collect();
        if active.is_empty() {
            "None".to_string()
        } else {
            active.join(", ")
        }
    }
}

/// Applications offered when the backend cannot list them.
pub const FALLBACK_APPLICATIONS: &[&str] = &[
    "any",
    "web-browsing",
    "ssl",
    "dns",
    "http",
    "https",
    "ftp",
    "ssh",
    "smtp",
    "pop3",
    "imap",
    "telnet",
    "rdp",
    "vnc",
    "icmp",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn svc(name: &str, protocol: Option<&str>, port: Option<&str>, groups: &[&str]) -> ServiceObject {
        ServiceObject {
            name: name.to_string(),
            protocol: protocol.map(str::to_string),
            port: port.map(str::to_string),
            groups: groups
                .iter()
                .map(|g| GroupRef {
                    name: (*g).to_string(),
                    location: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_address_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&AddressType::IpRange).unwrap(),
            "\"ip-range\""
        );
        assert_eq!(AddressType::Fqdn.to_string(), "fqdn");
        let parsed: AddressType = "ip-netmask".parse().unwrap();
        assert_eq!(parsed, AddressType::IpNetmask);
    }

    #[test]
    fn test_address_object_defaults_missing_fields() {
        let obj: AddressObject = serde_json::from_str(r#"{"name":"web"}"#).unwrap();
        assert_eq!(obj.address_type, AddressType::IpNetmask);
        assert!(obj.value.is_empty());
        assert!(obj.groups.is_empty());
    }

    #[test]
    fn test_address_object_matches() {
        let obj = AddressObject {
            name: "Web-Srv".to_string(),
            address_type: AddressType::IpNetmask,
            value: "10.1.1.10/32".to_string(),
            description: None,
            location: None,
            groups: Vec::new(),
        };
        assert!(obj.matches("web"));
        assert!(obj.matches("10.1.1"));
        assert!(!obj.matches("db"));
    }

    #[test]
    fn test_service_options_appends_groups_once() {
        let objects = vec![
            svc("http", Some("tcp"), Some("80"), &["web"]),
            svc("https", Some("tcp"), Some("443"), &["web"]),
            svc("bare", None, None, &[]),
        ];
        let options = service_options(&objects);
        let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["http", "https", "bare", "web"]);
        assert_eq!(options[0].display, "http (tcp/80)");
        assert_eq!(options[2].display, "bare");
        assert_eq!(options[3].display, "web (service-group)");
    }

    #[test]
    fn test_combine_service_items_annotates_members() {
        let objects = vec![svc("dns", Some("udp"), Some("53"), &[])];
        let groups = vec![ServiceGroup {
            name: "infra".to_string(),
            members: vec!["dns".to_string(), "ntp".to_string()],
        }];
        let items = combine_service_items(objects, groups);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].display(), "dns (udp/53)");
        assert_eq!(items[1].display(), "infra (Group)");
        let ServiceItem::Group { member_details, .. } = &items[1] else {
            panic!("expected group");
        };
        assert_eq!(member_details, &vec!["dns (udp/53)".to_string(), "ntp".to_string()]);
    }

    #[test]
    fn test_security_profiles_wire_shape() {
        let mut profiles = SecurityProfiles::default();
        profiles.set(ProfileCategory::AntiSpyware, "strict".to_string());
        let json = serde_json::to_value(&profiles).unwrap();
        assert_eq!(json["antiSpyware"], "strict");
        assert_eq!(json["profileGroup"], "");
        assert_eq!(profiles.summary(), "antiSpyware: strict");
        assert_eq!(SecurityProfiles::default().summary(), "None");
    }

    #[test]
    fn test_rule_enums_wire_names() {
        assert_eq!(
            serde_json::to_string(&RuleAction::ResetBoth).unwrap(),
            "\"reset-both\""
        );
        assert_eq!(RuleType::default(), RuleType::Post);
        assert_eq!(serde_json::to_string(&RuleType::Pre).unwrap(), "\"pre\"");
    }
}
