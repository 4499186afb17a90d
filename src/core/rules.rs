//! Security rule drafting and reference resolution
//!
//! A [`RuleDraft`] holds what the user typed. Before anything is sent, the
//! draft goes through two passes:
//!
//! 1. [`RuleDraft::check_local`] runs the synchronous field checks.
//! 2. [`resolve`] asks the backend to map each literal source/destination
//!    address to an existing address object and confirms the service exists.
//!
//! Only a draft with no issues from either pass becomes a
//! [`CreateRuleRequest`]. Address literals are replaced by object names since
//! the backend refuses raw addresses in rules.

use std::future::Future;

use tracing::warn;

use crate::api::{BackendClient, CreateRuleRequest, ServiceQuery};
use crate::core::error::{Error, Result};
use crate::core::objects::{RuleAction, RuleType, SecurityProfiles, SHARED_LOCATION};
use crate::validators::{self, NameKind};

/// Keyword matching every address, service or application
pub const ANY: &str = "any";

fn is_any(value: &str) -> bool {
    value.eq_ignore_ascii_case(ANY)
}

/// Fields of the rule form that can carry an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::AsRefStr, strum::EnumIter)]
pub enum RuleField {
    #[strum(serialize = "firewall")]
    Firewall,
    #[strum(serialize = "location")]
    Location,
    #[strum(serialize = "name")]
    Name,
    #[strum(serialize = "description")]
    Description,
    #[strum(serialize = "sourceZone")]
    SourceZone,
    #[strum(serialize = "destinationZone")]
    DestinationZone,
    #[strum(serialize = "sourceIP")]
    SourceIp,
    #[strum(serialize = "destinationIP")]
    DestinationIp,
    #[strum(serialize = "service")]
    Service,
    #[strum(serialize = "application")]
    Application,
}

impl RuleField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Firewall => "Firewall",
            Self::Location => "Location",
            Self::Name => "Rule Name",
            Self::Description => "Description",
            Self::SourceZone => "Source Zone",
            Self::DestinationZone => "Destination Zone",
            Self::SourceIp => "Source IP",
            Self::DestinationIp => "Destination IP",
            Self::Service => "Service",
            Self::Application => "Application",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Local check failed
    Invalid(String),
    /// No address object holds this value yet
    MissingAddressObject(String),
    /// No service object or group answers to this name
    MissingService(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    pub field: RuleField,
    pub kind: IssueKind,
}

impl RuleIssue {
    fn invalid(field: RuleField, message: impl Into<String>) -> Self {
        Self {
            field,
            kind: IssueKind::Invalid(message.into()),
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::Invalid(message) => message.clone(),
            IssueKind::MissingAddressObject(value) => {
                format!("Address object for \"{value}\" not found. Would you like to create it?")
            }
            IssueKind::MissingService(value) => {
                format!("Service \"{value}\" not found. Would you like to create it?")
            }
        }
    }

    /// Whether the form should offer to create the missing reference
    pub fn offers_creation(&self) -> bool {
        !matches!(self.kind, IssueKind::Invalid(_))
    }

    pub fn to_error(&self) -> Error {
        match &self.kind {
            IssueKind::Invalid(message) => Error::validation(self.field.as_ref(), message.clone()),
            IssueKind::MissingAddressObject(value) => Error::not_found("address object", value.clone()),
            IssueKind::MissingService(value) => Error::not_found("service", value.clone()),
        }
    }
}

/// Rule form input before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    pub firewall: Option<String>,
    /// Location typed by hand; wins over the tree selection when non-blank
    pub manual_location: String,
    /// Location picked in the hierarchy tree
    pub selected_path: Option<String>,
    pub name: String,
    pub description: String,
    pub source_zone: String,
    pub destination_zone: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub service: String,
    pub application: String,
    pub action: RuleAction,
    pub rule_type: RuleType,
    pub disabled: bool,
    pub log_setting: String,
    pub log_start: bool,
    pub log_end: bool,
    pub negate_source: bool,
    pub negate_destination: bool,
    pub security_profiles: SecurityProfiles,
}

impl Default for RuleDraft {
    fn default() -> Self {
        Self {
            firewall: None,
            manual_location: String::new(),
            selected_path: None,
            name: String::new(),
            description: String::new(),
            source_zone: String::new(),
            destination_zone: String::new(),
            source_ip: String::new(),
            destination_ip: String::new(),
            service: ANY.to_string(),
            application: ANY.to_string(),
            action: RuleAction::default(),
            rule_type: RuleType::default(),
            disabled: false,
            log_setting: String::new(),
            log_start: true,
            log_end: true,
            negate_source: false,
            negate_destination: false,
            security_profiles: SecurityProfiles::default(),
        }
    }
}

impl RuleDraft {
    /// Effective location: trimmed manual text, else the tree selection
    pub fn location(&self) -> Option<String> {
        let manual = self.manual_location.trim();
        if manual.is_empty() {
            self.selected_path.clone().filter(|p| !p.is_empty())
        } else {
            Some(manual.to_string())
        }
    }

    /// Applies a manual location edit and returns the resulting tree
    /// selection: `shared` selects the shared location, text equal to the
    /// current selection keeps it, anything else clears it.
    pub fn edit_manual_location(&mut self, value: String) -> Option<String> {
        if value == SHARED_LOCATION {
            self.selected_path = Some(SHARED_LOCATION.to_string());
        } else if self.selected_path.as_deref() != Some(value.as_str()) {
            self.selected_path = None;
        }
        self.manual_location = value;
        self.selected_path.clone()
    }

    /// Picking a tree node also fills the manual location field
    pub fn select_path(&mut self, path: String) {
        self.manual_location.clone_from(&path);
        self.selected_path = Some(path);
    }

    /// Clears location state when the firewall changes
    pub fn select_firewall(&mut self, hostname: String) {
        self.firewall = Some(hostname);
        self.selected_path = None;
        self.manual_location.clear();
    }

    /// Synchronous checks; address and service existence are left to [`resolve`]
    pub fn check_local(&self) -> Vec<RuleIssue> {
        let mut issues = Vec::new();

        if self.firewall.as_deref().is_none_or(str::is_empty) {
            issues.push(RuleIssue::invalid(RuleField::Firewall, "Please select a firewall"));
        }

        if self.location().is_none() {
            issues.push(RuleIssue::invalid(
                RuleField::Location,
                "Please select or enter a location",
            ));
        }

        if let Some(reason) = validators::validate_entity_name(NameKind::Rule, &self.name).into_error() {
            issues.push(RuleIssue::invalid(RuleField::Name, reason));
        }

        if let Some(reason) = validators::validate_description(&self.description).into_error() {
            issues.push(RuleIssue::invalid(RuleField::Description, reason));
        }

        if self.source_zone.trim().is_empty() {
            issues.push(RuleIssue::invalid(RuleField::SourceZone, "Source zone is required"));
        }
        if self.destination_zone.trim().is_empty() {
            issues.push(RuleIssue::invalid(
                RuleField::DestinationZone,
                "Destination zone is required",
            ));
        }

        for (field, value, label) in [
            (RuleField::SourceIp, &self.source_ip, "Source IP"),
            (RuleField::DestinationIp, &self.destination_ip, "Destination IP"),
        ] {
            if value.is_empty() {
                issues.push(RuleIssue::invalid(field, format!("{label} is required")));
            } else if let Some(reason) = validators::validate_address(value).into_error() {
                issues.push(RuleIssue::invalid(field, reason));
            }
        }

        if self.service.is_empty() {
            issues.push(RuleIssue::invalid(RuleField::Service, "Service is required"));
        }
        if self.application.is_empty() {
            issues.push(RuleIssue::invalid(RuleField::Application, "Application is required"));
        }

        issues
    }

    fn to_request(&self, location: String, source_ip: String, destination_ip: String) -> CreateRuleRequest {
        CreateRuleRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            source_zone: self.source_zone.clone(),
            source_ip,
            destination_zone: self.destination_zone.clone(),
            destination_ip,
            destination_port: self.service.clone(),
            application: self.application.clone(),
            action: self.action,
            location,
            rule_type: self.rule_type,
            disabled: self.disabled,
            log_setting: self.log_setting.clone(),
            log_start: self.log_start,
            log_end: self.log_end,
            negate_source: self.negate_source,
            negate_destination: self.negate_destination,
            security_profiles: self.security_profiles.clone(),
        }
    }
}

/// Backend lookups needed to resolve a rule's references
pub trait ReferenceLookup {
    /// Name of the first address object holding `value`, if any
    fn address_object(&self, value: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn service_exists(&self, query: &ServiceQuery) -> impl Future<Output = Result<bool>> + Send;
}

impl ReferenceLookup for BackendClient {
    async fn address_object(&self, value: &str) -> Result<Option<String>> {
        let objects = self.check_object(value).await?;
        Ok(objects.into_iter().next().map(|o| o.object_name))
    }

    async fn service_exists(&self, query: &ServiceQuery) -> Result<bool> {
        Ok(self.check_service(query).await?.is_some())
    }
}

/// Looks up by name first, then as `protocol/port` when the value has that
/// shape. Lookup failures count as not found.
async fn service_known<L: ReferenceLookup>(lookup: &L, service: &str) -> bool {
    match lookup.service_exists(&ServiceQuery::by_name(service)).await {
        Ok(true) => return true,
        Ok(false) => {}
        Err(e) => warn!("Service lookup for '{service}' failed: {e}"),
    }

    let Some((protocol, port)) = service.split_once('/') else {
        return false;
    };
    match lookup
        .service_exists(&ServiceQuery::by_port(protocol, port))
        .await
    {
        Ok(found) => found,
        Err(e) => {
            warn!("Service lookup for '{protocol}/{port}' failed: {e}");
            false
        }
    }
}

async fn address_name<L: ReferenceLookup>(lookup: &L, value: &str) -> Option<String> {
    match lookup.address_object(value).await {
        Ok(name) => name,
        Err(e) => {
            warn!("Address object lookup for '{value}' failed: {e}");
            None
        }
    }
}

/// Runs local checks and backend lookups, producing the request to send or
/// every issue found. All issues are reported together.
pub async fn resolve<L: ReferenceLookup>(
    lookup: &L,
    draft: &RuleDraft,
) -> std::result::Result<CreateRuleRequest, Vec<RuleIssue>> {
    let mut issues = draft.check_local();
    let failed = |issues: &[RuleIssue], field| issues.iter().any(|i| i.field == field);

    let mut resolved = Vec::with_capacity(2);
    for (field, value) in [
        (RuleField::SourceIp, &draft.source_ip),
        (RuleField::DestinationIp, &draft.destination_ip),
    ] {
        if failed(&issues, field) {
            resolved.push(String::new());
        } else if is_any(value) {
            resolved.push(ANY.to_string());
        } else if let Some(name) = address_name(lookup, value).await {
            resolved.push(name);
        } else {
            issues.push(RuleIssue {
                field,
                kind: IssueKind::MissingAddressObject(value.clone()),
            });
            resolved.push(String::new());
        }
    }

    if !failed(&issues, RuleField::Service)
        && draft.service != ANY
        && !service_known(lookup, &draft.service).await
    {
        issues.push(RuleIssue {
            field: RuleField::Service,
            kind: IssueKind::MissingService(draft.service.clone()),
        });
    }

    match draft.location() {
        Some(location) if issues.is_empty() => {
            let destination_ip = resolved.pop().unwrap_or_default();
            let source_ip = resolved.pop().unwrap_or_default();
            Ok(draft.to_request(location, source_ip, destination_ip))
        }
        _ => {
            issues.sort_by_key(|i| i.field);
            Err(issues)
        }
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

fn or_empty(value: &str) -> String {
    if value.is_empty() {
        "Empty".to_string()
    } else {
        value.to_string()
    }
}

/// Label/value pairs describing exactly what will be sent
pub fn preview(request: &CreateRuleRequest) -> Vec<(&'static str, String)> {
    vec![
        ("Rule Name", or_empty(&request.name)),
        ("Action", request.action.to_string()),
        ("Source Zone", or_empty(&request.source_zone)),
        ("Destination Zone", or_empty(&request.destination_zone)),
        ("Source IP/Object", or_empty(&request.source_ip)),
        ("Destination IP/Object", or_empty(&request.destination_ip)),
        ("Service/Port", or_empty(&request.destination_port)),
        ("Application", or_empty(&request.application)),
        ("Location", or_empty(&request.location)),
        ("Rule Type", request.rule_type.to_string()),
        ("Disabled", yes_no(request.disabled)),
        ("Log Start", yes_no(request.log_start)),
        ("Log End", yes_no(request.log_end)),
        ("Negate Source", yes_no(request.negate_source)),
        ("Negate Destination", yes_no(request.negate_destination)),
        ("Security Profiles", request.security_profiles.summary()),
        ("Description", or_empty(&request.description)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::core::objects::ProfileCategory;

    /// In-memory backend: address value → object name, known service names
    #[derive(Default)]
    struct FakeLookup {
        addresses: HashMap<String, String>,
        services: Vec<String>,
        ports: Vec<(String, String)>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ReferenceLookup for FakeLookup {
        async fn address_object(&self, value: &str) -> Result<Option<String>> {
            self.calls.lock().unwrap().push(format!("address:{value}"));
            if self.fail {
                return Err(Error::transport("connection refused", None));
            }
            Ok(self.addresses.get(value).cloned())
        }

        async fn service_exists(&self, query: &ServiceQuery) -> Result<bool> {
            self.calls.lock().unwrap().push(format!("service:{query:?}"));
            if self.fail {
                return Err(Error::transport("connection refused", None));
            }
            Ok(match query {
                ServiceQuery::ByName { service_name } => self.services.contains(service_name),
                ServiceQuery::ByProtocolPort { protocol, port } => self
                    .ports
                    .iter()
                    .any(|(p, n)| p == protocol && n == port),
            })
        }
    }

    fn valid_draft() -> RuleDraft {
        RuleDraft {
            firewall: Some("fw-01".into()),
            selected_path: Some("Global/EU".into()),
            name: "allow-web".into(),
            source_zone: "trust".into(),
            destination_zone: "untrust".into(),
            source_ip: "any".into(),
            destination_ip: "10.1.1.10".into(),
            service: "http".into(),
            application: "web-browsing".into(),
            ..RuleDraft::default()
        }
    }

    fn lookup() -> FakeLookup {
        FakeLookup {
            addresses: HashMap::from([("10.1.1.10".to_string(), "web-srv".to_string())]),
            services: vec!["http".into()],
            ports: vec![("tcp".into(), "8443".into())],
            ..FakeLookup::default()
        }
    }

    #[test]
    fn test_default_draft_matches_form_defaults() {
        let draft = RuleDraft::default();
        assert_eq!(draft.service, "any");
        assert_eq!(draft.application, "any");
        assert!(draft.log_start && draft.log_end);
        assert_eq!(draft.rule_type, RuleType::Post);
    }

    #[test]
    fn test_location_manual_wins() {
        let mut draft = valid_draft();
        draft.manual_location = "  Global/US  ".into();
        assert_eq!(draft.location().as_deref(), Some("Global/US"));
        draft.manual_location = "   ".into();
        assert_eq!(draft.location().as_deref(), Some("Global/EU"));
        draft.selected_path = None;
        assert!(draft.location().is_none());
    }

    #[test]
    fn test_manual_location_edits() {
        let mut draft = RuleDraft::default();
        draft.select_path("Global/EU".into());
        assert_eq!(draft.manual_location, "Global/EU");

        assert_eq!(draft.edit_manual_location("Global/EU".into()).as_deref(), Some("Global/EU"));
        assert_eq!(draft.edit_manual_location("Global/E".into()), None);
        assert_eq!(draft.edit_manual_location("shared".into()).as_deref(), Some("shared"));
        assert_eq!(draft.location().as_deref(), Some("shared"));
    }

    #[test]
    fn test_select_firewall_clears_location() {
        let mut draft = valid_draft();
        draft.manual_location = "Global".into();
        draft.select_firewall("fw-02".into());
        assert_eq!(draft.firewall.as_deref(), Some("fw-02"));
        assert!(draft.location().is_none());
    }

    #[test]
    fn test_check_local_reports_each_field() {
        let draft = RuleDraft {
            service: String::new(),
            application: String::new(),
            ..RuleDraft::default()
        };
        let fields: Vec<RuleField> = draft.check_local().iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                RuleField::Firewall,
                RuleField::Location,
                RuleField::Name,
                RuleField::SourceZone,
                RuleField::DestinationZone,
                RuleField::SourceIp,
                RuleField::DestinationIp,
                RuleField::Service,
                RuleField::Application,
            ]
        );
    }

    #[test]
    fn test_check_local_name_messages() {
        let mut draft = valid_draft();
        draft.name = "1rule".into();
        let issues = draft.check_local();
        assert_eq!(issues[0].message(), "Name cannot start with a number");

        draft.name = String::new();
        assert_eq!(draft.check_local()[0].message(), "Rule name is required");
    }

    #[test]
    fn test_check_local_bad_address() {
        let mut draft = valid_draft();
        draft.destination_ip = "10.0.0.300".into();
        let issues = draft.check_local();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, RuleField::DestinationIp);
        assert!(issues[0].message().starts_with("Invalid IP address"));
        assert!(!issues[0].offers_creation());
    }

    #[tokio::test]
    async fn test_resolve_replaces_addresses_with_object_names() {
        let request = resolve(&lookup(), &valid_draft()).await.unwrap();
        assert_eq!(request.source_ip, "any");
        assert_eq!(request.destination_ip, "web-srv");
        assert_eq!(request.destination_port, "http");
        assert_eq!(request.location, "Global/EU");
    }

    #[tokio::test]
    async fn test_resolve_missing_address_offers_creation() {
        let mut draft = valid_draft();
        draft.source_ip = "192.168.5.0/24".into();
        let issues = resolve(&lookup(), &draft).await.unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, RuleField::SourceIp);
        assert!(issues[0].offers_creation());
        assert_eq!(
            issues[0].message(),
            "Address object for \"192.168.5.0/24\" not found. Would you like to create it?"
        );
        assert!(matches!(issues[0].to_error(), Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_service_falls_back_to_protocol_port() {
        let mut draft = valid_draft();
        draft.service = "tcp/8443".into();
        let fake = lookup();
        assert!(resolve(&fake, &draft).await.is_ok());
        let calls = fake.calls.lock().unwrap();
        assert!(calls.iter().any(|c| c.contains("ByProtocolPort")));
    }

    #[tokio::test]
    async fn test_resolve_unknown_service() {
        let mut draft = valid_draft();
        draft.service = "ssh-alt".into();
        let issues = resolve(&lookup(), &draft).await.unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::MissingService("ssh-alt".into()));
    }

    #[tokio::test]
    async fn test_resolve_any_service_skips_lookup() {
        let mut draft = valid_draft();
        draft.service = "any".into();
        draft.destination_ip = "ANY".into();
        let fake = lookup();
        let request = resolve(&fake, &draft).await.unwrap();
        assert_eq!(request.destination_ip, "any");
        assert!(fake.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_lookup_failure_counts_as_missing() {
        let fake = FakeLookup {
            fail: true,
            ..FakeLookup::default()
        };
        let issues = resolve(&fake, &valid_draft()).await.unwrap_err();
        let fields: Vec<RuleField> = issues.iter().map(|i| i.field).collect();
        assert_eq!(fields, vec![RuleField::DestinationIp, RuleField::Service]);
    }

    #[tokio::test]
    async fn test_resolve_skips_lookups_for_invalid_fields() {
        let mut draft = valid_draft();
        draft.destination_ip = "not-an-ip".into();
        let fake = lookup();
        let issues = resolve(&fake, &draft).await.unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(
            !fake
                .calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.starts_with("address:"))
        );
    }

    #[test]
    fn test_preview_formatting() {
        let mut draft = valid_draft();
        draft
            .security_profiles
            .set(ProfileCategory::Antivirus, "default".into());
        let request = draft.to_request("Global/EU".into(), "any".into(), "web-srv".into());
        let lines: HashMap<&str, String> = preview(&request).into_iter().collect();
        assert_eq!(lines["Disabled"], "No");
        assert_eq!(lines["Log End"], "Yes");
        assert_eq!(lines["Description"], "Empty");
        assert_eq!(lines["Rule Type"], "post");
        assert_eq!(lines["Security Profiles"], "antivirus: default");
    }
}
