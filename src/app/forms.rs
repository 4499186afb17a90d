//! Form state for the console pages
//!
//! Each form is plain data with an `apply` reducer for keystroke-level edits
//! and a `validate` pass that runs before anything is sent. Async results
//! are folded in by the handlers.

use std::collections::BTreeSet;

use crate::api::{
    CreateAddressGroupRequest, CreateObjectRequest, CreateServiceGroupRequest,
    CreateServiceRequest, MatchedObject, ProfileCatalog, SearchResults,
};
use crate::core::hierarchy::{self, HierarchyAction, HierarchyNode, HierarchyView};
use crate::core::objects::{
    AddressGroup, AddressObject, AddressType, FirewallPath, GroupType, ProfileCategory,
    RuleAction, RuleType, SHARED_LOCATION, ServiceItem, ServiceObject, ServiceOption,
    ServiceProtocol,
};
use crate::core::rules::{RuleDraft, RuleField, RuleIssue};
use crate::validators::{self, NameKind};

/// Form validation errors for individual fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub value: Option<String>,
    pub port: Option<String>,
    pub description: Option<String>,
    pub members: Option<String>,
}

fn check(slot: &mut Option<String>, has_errors: &mut bool, result: validators::Validation) {
    if let Some(reason) = result.into_error() {
        *slot = Some(reason);
        *has_errors = true;
    }
}

/// Progress of a backend lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Lookup<T> {
    #[default]
    Idle,
    Pending,
    Found(T),
    Missing,
}

impl<T> Lookup<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Where to go after an object created on behalf of another form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTo {
    Rule(RuleField),
    AddressGroup,
    ServiceGroup,
}

// ── Address objects ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressObjectDraft {
    pub name: String,
    pub value: String,
    pub address_type: AddressType,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct AddressObjectForm {
    pub lookup_value: String,
    /// Live validation message or reserved-range hint for the lookup field
    pub lookup_hint: Option<String>,
    pub lookup: Lookup<Vec<MatchedObject>>,
    pub create: Option<AddressObjectDraft>,
    pub errors: Option<FormErrors>,
    pub submitting: bool,
    pub return_to: Option<ReturnTo>,
}

#[derive(Debug, Clone)]
pub enum AddressObjectEdit {
    LookupValue(String),
    Name(String),
    Type(AddressType),
    Description(String),
}

impl AddressObjectForm {
    pub fn apply(&mut self, edit: AddressObjectEdit) {
        match edit {
            AddressObjectEdit::LookupValue(value) => {
                self.lookup_hint = Self::hint_for(&value);
                self.lookup_value = value;
                self.lookup = Lookup::Idle;
            }
            AddressObjectEdit::Name(name) => {
                if let Some(draft) = &mut self.create {
                    draft.name = name;
                }
                self.clear_error(|e| &mut e.name);
            }
            AddressObjectEdit::Type(address_type) => {
                if let Some(draft) = &mut self.create {
                    draft.address_type = address_type;
                }
                self.clear_error(|e| &mut e.value);
            }
            AddressObjectEdit::Description(description) => {
                if let Some(draft) = &mut self.create {
                    draft.description = description;
                }
                self.clear_error(|e| &mut e.description);
            }
        }
    }

    fn clear_error(&mut self, field: impl FnOnce(&mut FormErrors) -> &mut Option<String>) {
        if let Some(errors) = &mut self.errors {
            *field(errors) = None;
        }
    }

    fn hint_for(value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() || validators::detect_address_type(value) == AddressType::Fqdn {
            return None;
        }
        match validators::parse_address(value) {
            Ok(spec) => validators::check_reserved_ip(&spec),
            Err(reason) => Some(reason),
        }
    }

    /// Trimmed value to look up, or the reason it can't be
    pub fn lookup_query(&self) -> Result<String, String> {
        let value = self.lookup_value.trim();
        if value.is_empty() {
            return Err("Please enter an IP address, range or FQDN".to_string());
        }
        if validators::detect_address_type(value) != AddressType::Fqdn {
            validators::parse_address(value)?;
        }
        Ok(value.to_string())
    }

    /// Opens the create form prefilled from `value`
    pub fn open_create(&mut self, value: &str, return_to: Option<ReturnTo>) {
        let value = value.trim();
        self.lookup_value = value.to_string();
        self.lookup_hint = Self::hint_for(value);
        self.create = Some(AddressObjectDraft {
            name: validators::suggest_object_name(value),
            value: value.to_string(),
            address_type: validators::detect_address_type(value),
            description: String::new(),
        });
        self.errors = None;
        self.return_to = return_to;
    }

    pub fn cancel_create(&mut self) {
        self.create = None;
        self.errors = None;
        self.submitting = false;
        self.return_to = None;
    }

    pub fn validate(&self) -> Option<FormErrors> {
        let draft = self.create.as_ref()?;
        let mut errors = FormErrors::default();
        let mut has_errors = false;

        check(
            &mut errors.name,
            &mut has_errors,
            validators::validate_entity_name(NameKind::Object, draft.name.trim()),
        );
        self.validate_value(draft, &mut errors, &mut has_errors);
        check(
            &mut errors.description,
            &mut has_errors,
            validators::validate_description(&draft.description),
        );

        if has_errors { Some(errors) } else { None }
    }

    fn validate_value(&self, draft: &AddressObjectDraft, errors: &mut FormErrors, has_errors: &mut bool) {
        let value = draft.value.trim();
        if value.is_empty() {
            errors.value = Some("Value is required".to_string());
            *has_errors = true;
            return;
        }
        match draft.address_type {
            AddressType::Fqdn => {
                if !value.contains('.') {
                    errors.value = Some("FQDN must contain at least one dot".to_string());
                    *has_errors = true;
                }
            }
            AddressType::IpRange if !value.contains('-') => {
                errors.value = Some("IP range must be written as start-end".to_string());
                *has_errors = true;
            }
            _ => check(&mut errors.value, has_errors, validators::validate_address(value)),
        }
    }

    pub fn to_request(&self) -> Option<CreateObjectRequest> {
        let draft = self.create.as_ref()?;
        Some(CreateObjectRequest {
            object_name: draft.name.trim().to_string(),
            value: draft.value.trim().to_string(),
            address_type: draft.address_type,
            description: draft.description.clone(),
        })
    }
}

// ── Service objects ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceObjectDraft {
    pub name: String,
    pub protocol: ServiceProtocol,
    pub port: String,
    pub description: String,
    pub tags: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceObjectForm {
    pub protocol: ServiceProtocol,
    pub port: String,
    pub port_error: Option<String>,
    pub lookup: Lookup<Vec<MatchedObject>>,
    pub create: Option<ServiceObjectDraft>,
    pub errors: Option<FormErrors>,
    pub submitting: bool,
    pub return_to: Option<ReturnTo>,
}

#[derive(Debug, Clone)]
pub enum ServiceObjectEdit {
    Protocol(ServiceProtocol),
    Port(String),
    Name(String),
    CreateProtocol(ServiceProtocol),
    CreatePort(String),
    Description(String),
    Tags(String),
}

impl ServiceObjectForm {
    pub fn apply(&mut self, edit: ServiceObjectEdit) {
        match edit {
            ServiceObjectEdit::Protocol(protocol) => {
                self.protocol = protocol;
                self.lookup = Lookup::Idle;
            }
            ServiceObjectEdit::Port(port) => {
                self.port_error = if port.is_empty() {
                    None
                } else {
                    validators::validate_port(&port).into_error()
                };
                self.port = port;
                self.lookup = Lookup::Idle;
            }
            ServiceObjectEdit::Name(name) => {
                if let Some(draft) = &mut self.create {
                    draft.name = validators::underscore_whitespace(&name);
                }
                if let Some(errors) = &mut self.errors {
                    errors.name = None;
                }
            }
            ServiceObjectEdit::CreateProtocol(protocol) => {
                if let Some(draft) = &mut self.create {
                    draft.protocol = protocol;
                }
            }
            ServiceObjectEdit::CreatePort(port) => {
                if let Some(draft) = &mut self.create {
                    draft.port = port;
                }
                if let Some(errors) = &mut self.errors {
                    errors.port = None;
                }
            }
            ServiceObjectEdit::Description(description) => {
                if let Some(draft) = &mut self.create {
                    draft.description = description;
                }
            }
            ServiceObjectEdit::Tags(tags) => {
                if let Some(draft) = &mut self.create {
                    draft.tags = tags;
                }
            }
        }
    }

    /// Trimmed port to look up, or the reason it can't be
    pub fn lookup_query(&self) -> Result<String, String> {
        let port = self.port.trim();
        validators::validate_port(port)
            .into_error()
            .map_or_else(|| Ok(port.to_string()), Err)
    }

    /// Opens the create form for a protocol/port pair
    pub fn open_create(&mut self, protocol: ServiceProtocol, port: &str, return_to: Option<ReturnTo>) {
        let port = port.trim();
        self.create = Some(ServiceObjectDraft {
            name: if port.is_empty() {
                String::new()
            } else {
                validators::suggest_service_name(protocol.as_ref(), port)
            },
            protocol,
            port: port.to_string(),
            ..ServiceObjectDraft::default()
        });
        self.errors = None;
        self.return_to = return_to;
    }

    /// Opens the create form for a missing rule service like `tcp/8443` or `web-alt`
    pub fn open_create_for_service(&mut self, service: &str, return_to: Option<ReturnTo>) {
        match service.split_once('/') {
            Some((protocol, port)) => {
                let protocol = protocol.parse().unwrap_or_default();
                self.protocol = protocol;
                self.port = port.to_string();
                self.open_create(protocol, port, return_to);
            }
            None => {
                self.open_create(self.protocol, "", return_to);
                if let Some(draft) = &mut self.create {
                    draft.name = validators::suggest_object_name(service);
                }
            }
        }
    }

    pub fn cancel_create(&mut self) {
        self.create = None;
        self.errors = None;
        self.submitting = false;
        self.return_to = None;
    }

    pub fn validate(&self) -> Option<FormErrors> {
        let draft = self.create.as_ref()?;
        let mut errors = FormErrors::default();
        let mut has_errors = false;

        check(
            &mut errors.name,
            &mut has_errors,
            validators::validate_entity_name(NameKind::Object, draft.name.trim()),
        );
        check(
            &mut errors.port,
            &mut has_errors,
            validators::validate_port(draft.port.trim()),
        );
        check(
            &mut errors.description,
            &mut has_errors,
            validators::validate_description(&draft.description),
        );

        if has_errors { Some(errors) } else { None }
    }

    pub fn to_request(&self, device_group: &str) -> Option<CreateServiceRequest> {
        let draft = self.create.as_ref()?;
        Some(CreateServiceRequest {
            object_name: draft.name.trim().to_string(),
            protocol: draft.protocol.to_string(),
            port: draft.port.trim().to_string(),
            description: draft.description.clone(),
            tags: validators::parse_tags(&draft.tags),
            device_group: Some(device_group.to_string()),
        })
    }
}

// ── Address groups ─────────────────────────────────────────────────────────

/// Which list the address member browser shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum BrowserKind {
    #[default]
    #[strum(serialize = "Address Objects")]
    Objects,
    #[strum(serialize = "Address Groups")]
    Groups,
}

#[derive(Debug, Clone)]
pub struct AddressGroupForm {
    pub search_term: String,
    pub search: Lookup<SearchResults<AddressObject>>,
    pub create_open: bool,
    pub name: String,
    pub description: String,
    pub device_group: String,
    pub group_type: GroupType,
    pub browser_open: bool,
    pub browser_kind: BrowserKind,
    pub browser_filter: String,
    pub objects: Vec<AddressObject>,
    pub groups: Vec<AddressGroup>,
    pub loading: bool,
    pub selected_objects: Vec<String>,
    pub selected_groups: Vec<String>,
    pub expanded_groups: BTreeSet<String>,
    pub errors: Option<FormErrors>,
    pub submitting: bool,
    pub success: Option<String>,
}

impl Default for AddressGroupForm {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search: Lookup::Idle,
            create_open: false,
            name: String::new(),
            description: String::new(),
            device_group: SHARED_LOCATION.to_string(),
            group_type: GroupType::Static,
            browser_open: false,
            browser_kind: BrowserKind::Objects,
            browser_filter: String::new(),
            objects: Vec::new(),
            groups: Vec::new(),
            loading: false,
            selected_objects: Vec::new(),
            selected_groups: Vec::new(),
            expanded_groups: BTreeSet::new(),
            errors: None,
            submitting: false,
            success: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AddressGroupEdit {
    SearchTerm(String),
    Name(String),
    Description(String),
    DeviceGroup(String),
    Type(GroupType),
    BrowserFilter(String),
    BrowserKind(BrowserKind),
    ToggleObject(String),
    ToggleGroup(String),
    ToggleExpanded(String),
    OpenCreate,
    CloseCreate,
}

fn toggle(list: &mut Vec<String>, name: String) {
    if let Some(pos) = list.iter().position(|n| *n == name) {
        list.remove(pos);
    } else {
        list.push(name);
    }
}

impl AddressGroupForm {
    pub fn apply(&mut self, edit: AddressGroupEdit) {
        match edit {
            AddressGroupEdit::SearchTerm(term) => {
                if term.trim().is_empty() {
                    self.search = Lookup::Idle;
                }
                self.search_term = term;
            }
            AddressGroupEdit::Name(name) => {
                self.name = validators::underscore_whitespace(&name);
                if let Some(errors) = &mut self.errors {
                    errors.name = None;
                }
            }
            AddressGroupEdit::Description(description) => self.description = description,
            AddressGroupEdit::DeviceGroup(device_group) => self.device_group = device_group,
            AddressGroupEdit::Type(group_type) => self.group_type = group_type,
            AddressGroupEdit::BrowserFilter(filter) => self.browser_filter = filter,
            AddressGroupEdit::BrowserKind(kind) => self.browser_kind = kind,
            AddressGroupEdit::ToggleObject(name) => {
                toggle(&mut self.selected_objects, name);
                self.clear_members_error();
            }
            AddressGroupEdit::ToggleGroup(name) => {
                toggle(&mut self.selected_groups, name);
                self.clear_members_error();
            }
            AddressGroupEdit::ToggleExpanded(name) => {
                if !self.expanded_groups.remove(&name) {
                    self.expanded_groups.insert(name);
                }
            }
            AddressGroupEdit::OpenCreate => {
                self.create_open = true;
                self.browser_open = true;
                self.success = None;
            }
            AddressGroupEdit::CloseCreate => {
                self.create_open = false;
                self.browser_open = false;
                self.errors = None;
            }
        }
    }

    fn clear_members_error(&mut self) {
        if let Some(errors) = &mut self.errors {
            errors.members = None;
        }
    }

    pub fn filtered_objects(&self) -> impl Iterator<Item = &AddressObject> {
        let needle = self.browser_filter.to_lowercase();
        self.objects.iter().filter(move |o| o.matches(&needle))
    }

    pub fn filtered_groups(&self) -> impl Iterator<Item = &AddressGroup> {
        let needle = self.browser_filter.to_lowercase();
        self.groups
            .iter()
            .filter(move |g| g.name.to_lowercase().contains(&needle))
    }

    /// Selected objects first, then selected groups
    pub fn members(&self) -> Vec<String> {
        self.selected_objects
            .iter()
            .chain(&self.selected_groups)
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> Option<FormErrors> {
        let mut errors = FormErrors::default();
        let mut has_errors = false;

        check(
            &mut errors.name,
            &mut has_errors,
            validators::validate_entity_name(NameKind::Group, &self.name),
        );
        check(
            &mut errors.description,
            &mut has_errors,
            validators::validate_description(&self.description),
        );
        if self.selected_objects.is_empty() && self.selected_groups.is_empty() {
            errors.members = Some("Please select at least one address object or group".to_string());
            has_errors = true;
        }

        if has_errors { Some(errors) } else { None }
    }

    pub fn to_request(&self) -> CreateAddressGroupRequest {
        CreateAddressGroupRequest {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            device_group: self.device_group.clone(),
            group_type: self.group_type,
            members: self.members(),
        }
    }

    /// Shows the created group as the search result and resets the create form
    pub fn finish_create(&mut self, group_name: String) {
        let members = self.members();
        self.success = Some(format!("Address group \"{group_name}\" created successfully!"));
        self.search = Lookup::Found(SearchResults {
            groups: vec![crate::api::GroupMatch {
                name: group_name,
                details: Some(crate::api::GroupDetails {
                    group_type: Some(self.group_type.to_string()),
                    members,
                    description: Some(self.description.clone()),
                    location: Some(self.device_group.clone()),
                    tags: Vec::new(),
                }),
            }],
            objects: Vec::new(),
        });
        let device_group = std::mem::take(&mut self.device_group);
        *self = Self {
            search_term: std::mem::take(&mut self.search_term),
            search: std::mem::take(&mut self.search),
            success: self.success.take(),
            objects: std::mem::take(&mut self.objects),
            groups: std::mem::take(&mut self.groups),
            device_group,
            ..Self::default()
        };
    }
}

// ── Service groups ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServiceGroupForm {
    pub search_term: String,
    pub search: Lookup<SearchResults<ServiceObject>>,
    pub create_open: bool,
    pub name: String,
    pub description: String,
    pub tags: String,
    pub device_group: String,
    pub browser_filter: String,
    pub items: Vec<ServiceItem>,
    pub loading: bool,
    pub selected: Vec<String>,
    pub expanded_groups: BTreeSet<String>,
    pub errors: Option<FormErrors>,
    pub submitting: bool,
    pub success: Option<String>,
}

impl Default for ServiceGroupForm {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search: Lookup::Idle,
            create_open: false,
            name: String::new(),
            description: String::new(),
            tags: String::new(),
            device_group: SHARED_LOCATION.to_string(),
            browser_filter: String::new(),
            items: Vec::new(),
            loading: false,
            selected: Vec::new(),
            expanded_groups: BTreeSet::new(),
            errors: None,
            submitting: false,
            success: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ServiceGroupEdit {
    SearchTerm(String),
    Name(String),
    Description(String),
    Tags(String),
    BrowserFilter(String),
    ToggleItem(String),
    ToggleExpanded(String),
    OpenCreate,
    CloseCreate,
}

impl ServiceGroupForm {
    pub fn apply(&mut self, edit: ServiceGroupEdit) {
        match edit {
            ServiceGroupEdit::SearchTerm(term) => {
                if term.trim().is_empty() {
                    self.search = Lookup::Idle;
                }
                self.search_term = term;
            }
            ServiceGroupEdit::Name(name) => {
                self.name = validators::underscore_whitespace(&name);
                if let Some(errors) = &mut self.errors {
                    errors.name = None;
                }
            }
            ServiceGroupEdit::Description(description) => self.description = description,
            ServiceGroupEdit::Tags(tags) => self.tags = tags,
            ServiceGroupEdit::BrowserFilter(filter) => self.browser_filter = filter,
            ServiceGroupEdit::ToggleItem(name) => {
                toggle(&mut self.selected, name);
                if let Some(errors) = &mut self.errors {
                    errors.members = None;
                }
            }
            ServiceGroupEdit::ToggleExpanded(name) => {
                if !self.expanded_groups.remove(&name) {
                    self.expanded_groups.insert(name);
                }
            }
            ServiceGroupEdit::OpenCreate => {
                self.create_open = true;
                self.success = None;
            }
            ServiceGroupEdit::CloseCreate => {
                self.create_open = false;
                self.errors = None;
            }
        }
    }

    pub fn filtered_items(&self) -> impl Iterator<Item = &ServiceItem> {
        let needle = self.browser_filter.to_lowercase();
        self.items
            .iter()
            .filter(move |item| item.display().to_lowercase().contains(&needle))
    }

    pub fn validate(&self) -> Option<FormErrors> {
        let mut errors = FormErrors::default();
        let mut has_errors = false;

        check(
            &mut errors.name,
            &mut has_errors,
            validators::validate_entity_name(NameKind::Group, &self.name),
        );
        check(
            &mut errors.description,
            &mut has_errors,
            validators::validate_description(&self.description),
        );
        if self.selected.is_empty() {
            errors.members = Some("Please select at least one service object or group".to_string());
            has_errors = true;
        }

        if has_errors { Some(errors) } else { None }
    }

    pub fn to_request(&self) -> CreateServiceGroupRequest {
        let description = self.description.trim();
        CreateServiceGroupRequest {
            name: self.name.trim().to_string(),
            members: self.selected.clone(),
            description: (!description.is_empty()).then(|| description.to_string()),
            tags: validators::parse_tags(&self.tags),
            device_group: Some(self.device_group.clone()),
        }
    }

    pub fn finish_create(&mut self, group_name: String) {
        self.success = Some(format!("Service group \"{group_name}\" created successfully!"));
        self.search = Lookup::Found(SearchResults {
            groups: vec![crate::api::GroupMatch {
                name: group_name,
                details: Some(crate::api::GroupDetails {
                    group_type: None,
                    members: std::mem::take(&mut self.selected),
                    description: None,
                    location: Some(self.device_group.clone()),
                    tags: validators::parse_tags(&self.tags),
                }),
            }],
            objects: Vec::new(),
        });
        self.create_open = false;
        self.name.clear();
        self.description.clear();
        self.tags.clear();
        self.errors = None;
    }
}

// ── Security rule ──────────────────────────────────────────────────────────

/// Picker data the rule form loads once per visit
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    pub firewalls: Vec<FirewallPath>,
    pub applications: Vec<String>,
    pub services: Vec<ServiceObject>,
    pub profiles: ProfileCatalog,
}

#[derive(Debug, Clone, Default)]
pub struct RuleForm {
    pub draft: RuleDraft,
    pub firewalls: Vec<FirewallPath>,
    pub applications: Vec<String>,
    pub services: Vec<ServiceOption>,
    pub profiles: ProfileCatalog,
    pub catalog_loaded: bool,
    pub loading: bool,
    /// Tree of the selected firewall; rebuilt on every firewall selection
    pub tree: Option<HierarchyNode>,
    pub view: HierarchyView,
    pub issues: Vec<RuleIssue>,
    pub resolving: bool,
    pub preview: Option<crate::api::CreateRuleRequest>,
    pub submitting: bool,
    pub success: Option<String>,
}

#[derive(Debug, Clone)]
pub enum RuleEdit {
    Name(String),
    Description(String),
    SourceZone(String),
    DestinationZone(String),
    SourceIp(String),
    DestinationIp(String),
    Service(String),
    Application(String),
    Action(RuleAction),
    RuleType(RuleType),
    Disabled(bool),
    LogSetting(String),
    LogStart(bool),
    LogEnd(bool),
    NegateSource(bool),
    NegateDestination(bool),
    Profile(ProfileCategory, String),
    ManualLocation(String),
}

impl RuleEdit {
    fn field(&self) -> Option<RuleField> {
        Some(match self {
            Self::Name(_) => RuleField::Name,
            Self::Description(_) => RuleField::Description,
            Self::SourceZone(_) => RuleField::SourceZone,
            Self::DestinationZone(_) => RuleField::DestinationZone,
            Self::SourceIp(_) => RuleField::SourceIp,
            Self::DestinationIp(_) => RuleField::DestinationIp,
            Self::Service(_) => RuleField::Service,
            Self::Application(_) => RuleField::Application,
            Self::ManualLocation(_) => RuleField::Location,
            _ => return None,
        })
    }
}

impl RuleForm {
    pub fn apply(&mut self, edit: RuleEdit) {
        if let Some(field) = edit.field() {
            self.issues.retain(|i| i.field != field);
        }
        self.success = None;

        let draft = &mut self.draft;
        match edit {
            RuleEdit::Name(v) => draft.name = v,
            RuleEdit::Description(v) => draft.description = v,
            RuleEdit::SourceZone(v) => draft.source_zone = v,
            RuleEdit::DestinationZone(v) => draft.destination_zone = v,
            RuleEdit::SourceIp(v) => draft.source_ip = v,
            RuleEdit::DestinationIp(v) => draft.destination_ip = v,
            RuleEdit::Service(v) => draft.service = v,
            RuleEdit::Application(v) => draft.application = v,
            RuleEdit::Action(v) => draft.action = v,
            RuleEdit::RuleType(v) => draft.rule_type = v,
            RuleEdit::Disabled(v) => draft.disabled = v,
            RuleEdit::LogSetting(v) => draft.log_setting = v,
            RuleEdit::LogStart(v) => draft.log_start = v,
            RuleEdit::LogEnd(v) => draft.log_end = v,
            RuleEdit::NegateSource(v) => draft.negate_source = v,
            RuleEdit::NegateDestination(v) => draft.negate_destination = v,
            RuleEdit::Profile(category, v) => draft.security_profiles.set(category, v),
            RuleEdit::ManualLocation(v) => {
                self.view.selected = draft.edit_manual_location(v);
            }
        }
    }

    pub fn load_catalog(&mut self, catalog: RuleCatalog) {
        self.firewalls = catalog.firewalls;
        self.applications = catalog.applications;
        self.services = crate::core::objects::service_options(&catalog.services);
        self.profiles = catalog.profiles;
        self.catalog_loaded = true;
        self.loading = false;
    }

    /// Rebuilds the tree for `hostname` and expands its whole chain
    pub fn select_firewall(&mut self, hostname: String) {
        self.issues
            .retain(|i| !matches!(i.field, RuleField::Firewall | RuleField::Location));
        let path = hierarchy::find_firewall(&self.firewalls, &hostname)
            .map(|fw| fw.path.clone())
            .unwrap_or_default();
        self.tree = hierarchy::build_tree(&path);
        self.view = HierarchyView::default()
            .apply(HierarchyAction::Reset)
            .apply(HierarchyAction::ExpandChain(path));
        self.draft.select_firewall(hostname);
    }

    /// Swaps in a fresh firewall list; the tree is rebuilt only if the
    /// selected firewall's chain changed
    pub fn refresh_firewalls(&mut self, firewalls: Vec<FirewallPath>) {
        let moved = self
            .draft
            .firewall
            .as_deref()
            .filter(|host| {
                hierarchy::find_firewall(&self.firewalls, host).map(|fw| &fw.path)
                    != hierarchy::find_firewall(&firewalls, host).map(|fw| &fw.path)
            })
            .map(str::to_string);
        self.firewalls = firewalls;
        if let Some(hostname) = moved {
            self.select_firewall(hostname);
        }
    }

    pub fn hierarchy(&mut self, action: HierarchyAction) {
        if let HierarchyAction::Select(path) = &action {
            self.draft.select_path(path.clone());
            self.issues.retain(|i| i.field != RuleField::Location);
        }
        self.view = std::mem::take(&mut self.view).apply(action);
    }

    pub fn issue(&self, field: RuleField) -> Option<&RuleIssue> {
        self.issues.iter().find(|i| i.field == field)
    }

    /// Settles a field after an object was created on the rule's behalf.
    ///
    /// Address fields keep the typed address; the next preview resolves it
    /// to the new object. Services take the created name directly.
    pub fn fill_created(&mut self, field: RuleField, name: String) {
        match field {
            RuleField::SourceIp | RuleField::DestinationIp => {
                self.issues.retain(|i| i.field != field);
            }
            RuleField::Service => self.apply(RuleEdit::Service(name)),
            _ => {}
        }
    }

    /// Keeps pickers and firewall selection, clears everything typed
    pub fn finish_create(&mut self, rule_name: &str) {
        let firewall = self.draft.firewall.clone();
        self.draft = RuleDraft {
            firewall,
            ..RuleDraft::default()
        };
        self.view.selected = None;
        self.preview = None;
        self.issues.clear();
        self.success = Some(format!("Rule \"{rule_name}\" created successfully!"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::IssueKind;

    #[test]
    fn test_address_lookup_query() {
        let mut form = AddressObjectForm::default();
        assert!(form.lookup_query().is_err());

        form.apply(AddressObjectEdit::LookupValue(" 10.0.0.0/24 ".into()));
        assert_eq!(form.lookup_query().unwrap(), "10.0.0.0/24");
        assert_eq!(form.lookup_hint.as_deref(), Some("Private IP range (RFC 1918)"));

        form.apply(AddressObjectEdit::LookupValue("www.example.com".into()));
        assert!(form.lookup_query().is_ok());
        assert!(form.lookup_hint.is_none());

        form.apply(AddressObjectEdit::LookupValue("10.0.0.256".into()));
        assert!(form.lookup_query().is_err());
        assert!(form.lookup_hint.is_some());
    }

    #[test]
    fn test_address_open_create_prefills() {
        let mut form = AddressObjectForm::default();
        form.open_create("10.1.0.1-10.1.0.9", None);
        let draft = form.create.as_ref().unwrap();
        assert_eq!(draft.name, "10_1_0_1_10_1_0_9");
        assert_eq!(draft.address_type, AddressType::IpRange);

        // Suggested name starts with a digit and must be edited
        let errors = form.validate().unwrap();
        assert_eq!(errors.name.as_deref(), Some("Name cannot start with a number"));

        form.apply(AddressObjectEdit::Name("range-01".into()));
        assert!(form.errors.is_none() || form.errors.as_ref().unwrap().name.is_none());
        assert!(form.validate().is_none());
        assert_eq!(form.to_request().unwrap().object_name, "range-01");
    }

    #[test]
    fn test_address_fqdn_value() {
        let mut form = AddressObjectForm::default();
        form.open_create("intranet", None);
        form.apply(AddressObjectEdit::Name("intranet".into()));
        form.apply(AddressObjectEdit::Type(AddressType::Fqdn));
        let errors = form.validate().unwrap();
        assert!(errors.value.unwrap().contains("dot"));
    }

    #[test]
    fn test_service_port_live_validation() {
        let mut form = ServiceObjectForm::default();
        form.apply(ServiceObjectEdit::Port("70000".into()));
        assert_eq!(form.port_error.as_deref(), Some("Port must be between 1-65535"));
        form.apply(ServiceObjectEdit::Port(String::new()));
        assert!(form.port_error.is_none());
        assert_eq!(form.lookup_query().unwrap_err(), "Port is required");
    }

    #[test]
    fn test_service_create_from_rule_value() {
        let mut form = ServiceObjectForm::default();
        form.open_create_for_service("udp/5353", Some(ReturnTo::Rule(RuleField::Service)));
        let draft = form.create.as_ref().unwrap();
        assert_eq!(draft.name, "UDP_5353");
        assert_eq!(draft.protocol, ServiceProtocol::Udp);
        assert_eq!(draft.port, "5353");

        let request = form.to_request("shared").unwrap();
        assert_eq!(request.protocol, "udp");
        assert_eq!(request.device_group.as_deref(), Some("shared"));
    }

    #[test]
    fn test_service_name_spaces_become_underscores() {
        let mut form = ServiceObjectForm::default();
        form.open_create(ServiceProtocol::Tcp, "443", None);
        form.apply(ServiceObjectEdit::Name("web  secure".into()));
        assert_eq!(form.create.as_ref().unwrap().name, "web_secure");
    }

    #[test]
    fn test_address_group_requires_members() {
        let mut form = AddressGroupForm::default();
        form.apply(AddressGroupEdit::Name("web-servers".into()));
        let errors = form.validate().unwrap();
        assert_eq!(
            errors.members.as_deref(),
            Some("Please select at least one address object or group")
        );

        form.apply(AddressGroupEdit::ToggleGroup("dmz".into()));
        form.apply(AddressGroupEdit::ToggleObject("web-01".into()));
        assert!(form.validate().is_none());
        assert_eq!(form.to_request().members, vec!["web-01", "dmz"]);

        form.apply(AddressGroupEdit::ToggleObject("web-01".into()));
        assert_eq!(form.members(), vec!["dmz"]);
    }

    #[test]
    fn test_address_group_filter() {
        let mut form = AddressGroupForm::default();
        form.objects = vec![
            AddressObject {
                name: "web-01".into(),
                value: "10.0.0.5".into(),
                ..AddressObject::default()
            },
            AddressObject {
                name: "db-01".into(),
                value: "10.0.1.5".into(),
                ..AddressObject::default()
            },
        ];
        form.apply(AddressGroupEdit::BrowserFilter("WEB".into()));
        assert_eq!(form.filtered_objects().count(), 1);
        form.apply(AddressGroupEdit::BrowserFilter("10.0.1".into()));
        assert_eq!(form.filtered_objects().next().unwrap().name, "db-01");
    }

    #[test]
    fn test_address_group_finish_create() {
        let mut form = AddressGroupForm::default();
        form.apply(AddressGroupEdit::OpenCreate);
        form.apply(AddressGroupEdit::Name("web servers".into()));
        form.apply(AddressGroupEdit::ToggleObject("web-01".into()));
        form.finish_create("web_servers".into());

        assert_eq!(
            form.success.as_deref(),
            Some("Address group \"web_servers\" created successfully!")
        );
        assert!(!form.create_open);
        assert!(form.name.is_empty());
        assert!(form.selected_objects.is_empty());
        let Lookup::Found(results) = &form.search else {
            panic!("expected created group as result");
        };
        assert_eq!(results.groups[0].details.as_ref().unwrap().members, vec!["web-01"]);
    }

    #[test]
    fn test_service_group_request() {
        let mut form = ServiceGroupForm::default();
        form.apply(ServiceGroupEdit::Name("web".into()));
        form.apply(ServiceGroupEdit::Tags("prod, web,".into()));
        assert!(form.validate().unwrap().members.is_some());
        form.apply(ServiceGroupEdit::ToggleItem("http".into()));
        assert!(form.validate().is_none());

        let request = form.to_request();
        assert_eq!(request.tags, vec!["prod", "web"]);
        assert!(request.description.is_none());
        assert_eq!(request.members, vec!["http"]);
    }

    fn rule_form() -> RuleForm {
        let mut form = RuleForm::default();
        form.load_catalog(RuleCatalog {
            firewalls: vec![FirewallPath {
                hostname: "fw-01".into(),
                path: vec!["Global".into(), "EU".into(), "Paris".into()],
            }],
            ..RuleCatalog::default()
        });
        form
    }

    #[test]
    fn test_rule_select_firewall_expands_chain() {
        let mut form = rule_form();
        form.select_firewall("fw-01".into());
        assert_eq!(form.tree.as_ref().unwrap().depth(), 3);
        assert!(form.view.is_expanded("Global"));
        assert!(form.view.is_expanded("Global/EU"));
        assert!(form.view.selected.is_none());

        form.select_firewall("unknown".into());
        assert!(form.tree.is_none());
    }

    #[test]
    fn test_rule_tree_selection_fills_location() {
        let mut form = rule_form();
        form.select_firewall("fw-01".into());
        form.hierarchy(HierarchyAction::Select("Global/EU".into()));
        assert_eq!(form.draft.location().as_deref(), Some("Global/EU"));
        assert!(form.view.is_selected("Global/EU"));

        form.apply(RuleEdit::ManualLocation("Global/E".into()));
        assert!(form.view.selected.is_none());
        form.apply(RuleEdit::ManualLocation("shared".into()));
        assert!(form.view.is_selected("shared"));
    }

    #[test]
    fn test_rule_edit_clears_field_issue() {
        let mut form = rule_form();
        form.issues = form.draft.check_local();
        assert!(form.issue(RuleField::Name).is_some());
        form.apply(RuleEdit::Name("allow-web".into()));
        assert!(form.issue(RuleField::Name).is_none());
        assert!(form.issue(RuleField::SourceZone).is_some());
    }

    #[test]
    fn test_rule_fill_created_keeps_address() {
        let mut form = rule_form();
        form.apply(RuleEdit::DestinationIp("10.9.9.9".into()));
        form.issues.push(RuleIssue {
            field: RuleField::DestinationIp,
            kind: IssueKind::MissingAddressObject("10.9.9.9".into()),
        });
        form.fill_created(RuleField::DestinationIp, "srv-10_9_9_9".into());
        assert_eq!(form.draft.destination_ip, "10.9.9.9");
        assert!(form.issues.is_empty());

        // The kept address still passes local checks on the next preview
        let issues = form.draft.check_local();
        assert!(issues.iter().all(|i| i.field != RuleField::DestinationIp));
    }

    #[test]
    fn test_rule_fill_created_service_takes_name() {
        let mut form = rule_form();
        form.apply(RuleEdit::Service("udp/5353".into()));
        form.issues.push(RuleIssue {
            field: RuleField::Service,
            kind: IssueKind::MissingService("udp/5353".into()),
        });
        form.fill_created(RuleField::Service, "mdns".into());
        assert_eq!(form.draft.service, "mdns");
        assert!(form.issues.is_empty());
    }

    #[test]
    fn test_rule_refresh_firewalls_rebuilds_moved_chain() {
        let mut form = rule_form();
        form.select_firewall("fw-01".into());
        form.hierarchy(HierarchyAction::Select("Global/EU".into()));

        // Same chain: the user's location pick survives
        let unchanged = form.firewalls.clone();
        form.refresh_firewalls(unchanged);
        assert!(form.view.is_selected("Global/EU"));

        form.refresh_firewalls(vec![FirewallPath {
            hostname: "fw-01".into(),
            path: vec!["Global".into(), "APAC".into(), "fw-01".into()],
        }]);
        assert!(form.view.selected.is_none());
        assert!(form.view.is_expanded("Global/APAC"));
        assert!(!form.view.is_expanded("Global/EU"));
        assert_eq!(form.draft.firewall.as_deref(), Some("fw-01"));
    }

    #[test]
    fn test_rule_finish_create_keeps_firewall() {
        let mut form = rule_form();
        form.select_firewall("fw-01".into());
        form.apply(RuleEdit::Name("allow-web".into()));
        form.finish_create("allow-web");
        assert_eq!(form.draft.firewall.as_deref(), Some("fw-01"));
        assert!(form.draft.name.is_empty());
        assert_eq!(form.draft.service, "any");
    }
}
