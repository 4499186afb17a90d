pub mod forms;
pub mod handlers;
pub mod ui_components;
pub mod view;

use crate::api::{BackendClient, CreateRuleRequest, MatchedObject, SearchResults};
use crate::config::AppConfig;
use crate::core::error::ErrorTranslation;
use crate::core::hierarchy::HierarchyAction;
use crate::core::objects::{AddressGroup, AddressObject, FirewallPath, ServiceItem, ServiceObject};
use crate::core::rules::{RuleField, RuleIssue};
use crate::theme::{AppTheme, ThemeChoice};
use forms::{
    AddressGroupEdit, AddressGroupForm, AddressObjectEdit, AddressObjectForm, RuleCatalog,
    RuleEdit, RuleForm, ServiceGroupEdit, ServiceGroupForm, ServiceObjectEdit, ServiceObjectForm,
};
use iced::{Element, Task};

/// Console pages, in sidebar order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Page {
    #[default]
    #[strum(serialize = "Address Objects")]
    AddressObjects,
    #[strum(serialize = "Service Objects")]
    ServiceObjects,
    #[strum(serialize = "Address Groups")]
    AddressGroups,
    #[strum(serialize = "Service Groups")]
    ServiceGroups,
    #[strum(serialize = "Security Rule")]
    SecurityRule,
}

/// Top-of-page notice; errors stay until dismissed
#[derive(Debug, Clone)]
pub enum Banner {
    Error(ErrorTranslation),
    Success(String),
}

pub struct State {
    pub config: AppConfig,
    pub client: BackendClient,
    pub theme: AppTheme,
    pub page: Page,
    pub banner: Option<Banner>,
    pub address_object: AddressObjectForm,
    pub service_object: ServiceObjectForm,
    pub address_group: AddressGroupForm,
    pub service_group: ServiceGroupForm,
    pub rule: RuleForm,
}

type Fetched<T> = Result<T, ErrorTranslation>;

#[derive(Debug, Clone)]
pub enum Message {
    PageSelected(Page),
    BannerDismissed,
    SuccessExpired(Page),
    ThemeChanged(ThemeChoice),
    ConfigSaved(Result<(), String>),
    EventOccurred(iced::Event),

    // Address objects
    AddressObject(AddressObjectEdit),
    AddressLookupSubmitted,
    AddressLookupCompleted(Fetched<Vec<MatchedObject>>),
    AddressCreateOpened,
    AddressCreateCancelled,
    AddressCreateSubmitted,
    AddressCreateCompleted(Fetched<String>),

    // Service objects
    ServiceObject(ServiceObjectEdit),
    ServiceLookupSubmitted,
    ServiceLookupCompleted(Fetched<Option<Vec<MatchedObject>>>),
    ServiceCreateOpened,
    ServiceCreateCancelled,
    ServiceCreateSubmitted,
    ServiceNameChecked(Fetched<bool>),
    ServiceCreateCompleted(Fetched<String>),

    // Address groups
    AddressGroup(AddressGroupEdit),
    AddressGroupSearchSubmitted,
    AddressGroupSearchCompleted(Fetched<SearchResults<AddressObject>>),
    AddressGroupBrowserRequested,
    AddressGroupBrowserLoaded(Fetched<(Vec<AddressObject>, Vec<AddressGroup>)>),
    AddressGroupNewObjectRequested,
    AddressGroupSubmitted,
    AddressGroupNameChecked(Fetched<bool>),
    AddressGroupCreated(Fetched<String>),

    // Service groups
    ServiceGroup(ServiceGroupEdit),
    ServiceGroupSearchSubmitted,
    ServiceGroupSearchCompleted(Fetched<SearchResults<ServiceObject>>),
    ServiceGroupBrowserRequested,
    ServiceGroupItemsLoaded(Fetched<Vec<ServiceItem>>),
    ServiceGroupNewObjectRequested,
    ServiceGroupSubmitted,
    ServiceGroupNameChecked(Fetched<bool>),
    ServiceGroupCreated(Fetched<String>),

    // Security rule
    Rule(RuleEdit),
    RuleCatalogLoaded(Fetched<RuleCatalog>),
    FirewallSelected(String),
    FirewallsRefreshed(Fetched<Vec<FirewallPath>>),
    Hierarchy(HierarchyAction),
    RulePreviewRequested,
    RuleResolved(Result<CreateRuleRequest, Vec<RuleIssue>>),
    RulePreviewClosed,
    RuleSubmitted,
    RuleCreated(Fetched<String>),
    RuleMissingCreateRequested(RuleField),
}

impl State {
    pub fn view(&self) -> Element<'_, Message> {
        view::view(self)
    }

    /// Boots with an already merged config; unusable settings fall back to defaults
    pub fn with_config(config: AppConfig) -> (Self, Task<Message>) {
        let config = match config.clone().validated() {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("{e}; falling back to defaults");
                AppConfig::default()
            }
        };
        tracing::info!("Using policy backend at {}", config.backend());

        let client = BackendClient::from_config(&config);
        let device_group = config.default_device_group.clone();
        let mut state = Self {
            theme: config.theme_choice.to_theme(),
            client,
            page: Page::default(),
            banner: None,
            address_object: AddressObjectForm::default(),
            service_object: ServiceObjectForm::default(),
            address_group: AddressGroupForm::default(),
            service_group: ServiceGroupForm::default(),
            rule: RuleForm::default(),
            config,
        };
        state.address_group.device_group.clone_from(&device_group);
        state.service_group.device_group = device_group;

        (state, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        use handlers::*;

        match message {
            Message::PageSelected(page) => return handle_page_selected(self, page),
            Message::BannerDismissed => self.banner = None,
            Message::SuccessExpired(page) => handle_success_expired(self, page),
            Message::ThemeChanged(choice) => return handle_theme_changed(self, choice),
            Message::ConfigSaved(result) => {
                if let Err(e) = result {
                    tracing::error!("Failed to save config: {e}");
                    self.banner = Some(Banner::Error(
                        ErrorTranslation::new(format!("Settings were not saved: {e}"))
                            .with_suggestion("Check permissions on the panctl data directory"),
                    ));
                }
            }
            Message::EventOccurred(event) => return self.handle_event(event),

            Message::AddressObject(edit) => self.address_object.apply(edit),
            Message::AddressLookupSubmitted => return handle_address_lookup(self),
            Message::AddressLookupCompleted(result) => handle_address_lookup_completed(self, result),
            Message::AddressCreateOpened => {
                let form = &mut self.address_object;
                let value = form.lookup_value.clone();
                form.open_create(&value, form.return_to);
            }
            Message::AddressCreateCancelled => return handle_address_create_cancelled(self),
            Message::AddressCreateSubmitted => return handle_address_create(self),
            Message::AddressCreateCompleted(result) => {
                return handle_address_create_completed(self, result);
            }

            Message::ServiceObject(edit) => self.service_object.apply(edit),
            Message::ServiceLookupSubmitted => return handle_service_lookup(self),
            Message::ServiceLookupCompleted(result) => handle_service_lookup_completed(self, result),
            Message::ServiceCreateOpened => {
                let form = &mut self.service_object;
                let port = form.port.clone();
                form.open_create(form.protocol, &port, form.return_to);
            }
            Message::ServiceCreateCancelled => return handle_service_create_cancelled(self),
            Message::ServiceCreateSubmitted => return handle_service_create(self),
            Message::ServiceNameChecked(result) => return handle_service_name_checked(self, result),
            Message::ServiceCreateCompleted(result) => {
                return handle_service_create_completed(self, result);
            }

            Message::AddressGroup(edit) => {
                let opening = matches!(edit, AddressGroupEdit::OpenCreate);
                self.address_group.apply(edit);
                if opening {
                    return handle_address_group_browser(self);
                }
            }
            Message::AddressGroupSearchSubmitted => return handle_address_group_search(self),
            Message::AddressGroupSearchCompleted(result) => {
                handle_address_group_search_completed(self, result);
            }
            Message::AddressGroupBrowserRequested => return handle_address_group_browser(self),
            Message::AddressGroupBrowserLoaded(result) => {
                handle_address_group_browser_loaded(self, result);
            }
            Message::AddressGroupNewObjectRequested => handle_address_group_new_object(self),
            Message::AddressGroupSubmitted => return handle_address_group_submit(self),
            Message::AddressGroupNameChecked(result) => {
                return handle_address_group_name_checked(self, result);
            }
            Message::AddressGroupCreated(result) => return handle_address_group_created(self, result),

            Message::ServiceGroup(edit) => {
                let opening = matches!(edit, ServiceGroupEdit::OpenCreate);
                self.service_group.apply(edit);
                if opening {
                    return handle_service_group_browser(self);
                }
            }
            Message::ServiceGroupSearchSubmitted => return handle_service_group_search(self),
            Message::ServiceGroupSearchCompleted(result) => {
                handle_service_group_search_completed(self, result);
            }
            Message::ServiceGroupBrowserRequested => return handle_service_group_browser(self),
            Message::ServiceGroupItemsLoaded(result) => handle_service_group_items_loaded(self, result),
            Message::ServiceGroupNewObjectRequested => handle_service_group_new_object(self),
            Message::ServiceGroupSubmitted => return handle_service_group_submit(self),
            Message::ServiceGroupNameChecked(result) => {
                return handle_service_group_name_checked(self, result);
            }
            Message::ServiceGroupCreated(result) => return handle_service_group_created(self, result),

            Message::Rule(edit) => self.rule.apply(edit),
            Message::RuleCatalogLoaded(result) => handle_rule_catalog_loaded(self, result),
            Message::FirewallSelected(hostname) => return handle_firewall_selected(self, hostname),
            Message::FirewallsRefreshed(result) => handle_firewalls_refreshed(self, result),
            Message::Hierarchy(action) => self.rule.hierarchy(action),
            Message::RulePreviewRequested => return handle_rule_preview(self),
            Message::RuleResolved(result) => handle_rule_resolved(self, result),
            Message::RulePreviewClosed => self.rule.preview = None,
            Message::RuleSubmitted => return handle_rule_submit(self),
            Message::RuleCreated(result) => return handle_rule_created(self, result),
            Message::RuleMissingCreateRequested(field) => handle_rule_missing_create(self, field),
        }
        Task::none()
    }

    fn handle_event(&mut self, event: iced::Event) -> Task<Message> {
        use iced::keyboard::{Event as KeyEvent, Key, key::Named};

        let iced::Event::Keyboard(KeyEvent::KeyPressed { key, .. }) = event else {
            return Task::none();
        };
        if key.as_ref() != Key::Named(Named::Escape) {
            return Task::none();
        }

        if self.rule.preview.is_some() {
            return Task::done(Message::RulePreviewClosed);
        }
        match self.page {
            Page::AddressObjects if self.address_object.create.is_some() => {
                Task::done(Message::AddressCreateCancelled)
            }
            Page::ServiceObjects if self.service_object.create.is_some() => {
                Task::done(Message::ServiceCreateCancelled)
            }
            _ if self.banner.is_some() => Task::done(Message::BannerDismissed),
            _ => Task::none(),
        }
    }

    pub fn subscription(&self) -> iced::Subscription<Message> {
        iced::event::listen().map(Message::EventOccurred)
    }
}
