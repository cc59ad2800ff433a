//! Per-visitor view controller. Holds everything the presentation layer needs
//! across screens and validates every navigation event. One instance per
//! browsing session, handed explicitly to whoever mutates it.

pub mod track;

use crate::catalog::{Catalog, STATES};
use crate::chat_session::ChatSession;
use crate::filter::PropertyFilter;
use crate::models::auth::User;
use crate::models::chat::{AssistantReply, ChatRole, ChatTurn};
use crate::models::dashboard::{ActiveTransaction, DashboardResponse};
use crate::models::property::PropertyRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use track::{Track, TrackState};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Home,
    ListingDetail,
    Dashboard,
    Services,
}

/// What should actually be drawn. Equal to the screen, except that the
/// dashboard shows the login flow until someone signs in.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RenderedScreen {
    Home,
    ListingDetail,
    Dashboard,
    Services,
    Login,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    Navigate { screen: Screen },
    SelectProperty { property_id: String },
    // Only the auth flow may sign someone in.
    #[serde(skip_deserializing)]
    LoginSucceeded { user: User },
    ToggleSave { property_id: String },
    SelectState { state: Option<String> },
    SetFilters { max_price: Option<u64>, min_area: Option<u32> },
    ClearFilters,
    OpenContact { title: String, subtitle: Option<String> },
    CloseContact,
    Back,
}

#[derive(Error, Debug, PartialEq)]
pub enum ViewError {
    #[error("Property not found: {0}")]
    UnknownProperty(String),
    #[error("Unknown state: {0}")]
    UnknownState(String),
    #[error("Properties can only be selected from the home screen (current: {0:?})")]
    SelectionOutsideHome(Screen),
    #[error("No property is selected")]
    NoPropertySelected,
    #[error("Login is only accepted while the dashboard is waiting for sign-in")]
    LoginNotExpected,
    #[error("A {0} request is already in progress")]
    TrackBusy(Track),
    #[error("Message must not be empty")]
    EmptyMessage,
    #[error("Sign in to view the dashboard")]
    NotSignedIn,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ContactModal {
    pub open: bool,
    pub title: String,
    pub subtitle: Option<String>,
}

/// Everything needed to run one chat request without holding the session.
#[derive(Debug, Clone)]
pub struct ChatTicket {
    pub generation: u64,
    pub property: PropertyRecord,
    pub question: String,
    pub prior_turns: Vec<ChatTurn>,
}

#[derive(Debug, Clone)]
pub struct ReportTicket {
    pub generation: u64,
    pub property: PropertyRecord,
}

#[derive(Debug, Serialize)]
pub struct ViewSnapshot {
    pub screen: Screen,
    pub rendered: RenderedScreen,
    pub selected_property: Option<PropertyRecord>,
    pub selected_state: Option<String>,
    pub filters: PropertyFilter,
    pub visible_listings: Vec<String>,
    pub saved: Vec<String>,
    pub user: Option<User>,
    pub contact: ContactModal,
    pub chat: Vec<ChatTurn>,
    pub chat_state: TrackState,
    pub report: Option<AssistantReply>,
    pub report_state: TrackState,
}

#[derive(Debug, Default)]
pub struct ViewController {
    screen: Screen,
    selected: Option<PropertyRecord>,
    selected_state: Option<String>,
    max_price: Option<u64>,
    min_area: Option<u32>,
    saved: BTreeSet<String>,
    user: Option<User>,
    contact: ContactModal,
    chat: Option<ChatSession>,
    chat_state: TrackState,
    report: Option<AssistantReply>,
    report_state: TrackState,
    // Bumped on every property selection; replies for an older value are dropped.
    generation: u64,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn rendered(&self) -> RenderedScreen {
        match self.screen {
            Screen::Home => RenderedScreen::Home,
            Screen::ListingDetail => RenderedScreen::ListingDetail,
            Screen::Services => RenderedScreen::Services,
            Screen::Dashboard if self.user.is_some() => RenderedScreen::Dashboard,
            Screen::Dashboard => RenderedScreen::Login,
        }
    }

    pub fn selected_property(&self) -> Option<&PropertyRecord> {
        self.selected.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_saved(&self, property_id: &str) -> bool {
        self.saved.contains(property_id)
    }

    pub fn chat_turns(&self) -> &[ChatTurn] {
        self.chat.as_ref().map(|c| c.turns()).unwrap_or(&[])
    }

    pub fn chat_state(&self) -> TrackState {
        self.chat_state
    }

    pub fn report_state(&self) -> TrackState {
        self.report_state
    }

    pub fn report(&self) -> Option<&AssistantReply> {
        self.report.as_ref()
    }

    pub fn listing_filter(&self) -> PropertyFilter {
        PropertyFilter {
            max_price: self.max_price,
            min_area: self.min_area,
            state: self.selected_state.clone(),
        }
    }

    pub fn apply(&mut self, catalog: &Catalog, event: ViewEvent) -> Result<(), ViewError> {
        tracing::debug!(?event, screen = ?self.screen, "applying view event");
        match event {
            ViewEvent::Navigate { screen } => {
                if screen == Screen::ListingDetail && self.selected.is_none() {
                    return Err(ViewError::NoPropertySelected);
                }
                self.screen = screen;
            }
            ViewEvent::SelectProperty { property_id } => {
                if self.screen != Screen::Home {
                    return Err(ViewError::SelectionOutsideHome(self.screen));
                }
                let property = catalog
                    .get(&property_id)
                    .ok_or(ViewError::UnknownProperty(property_id))?;
                self.open_listing(property.clone());
            }
            ViewEvent::LoginSucceeded { user } => {
                if self.rendered() != RenderedScreen::Login {
                    return Err(ViewError::LoginNotExpected);
                }
                tracing::info!(user = %user.name, "session signed in");
                self.user = Some(user);
                self.screen = Screen::Dashboard;
            }
            ViewEvent::ToggleSave { property_id } => {
                if !catalog.contains(&property_id) {
                    return Err(ViewError::UnknownProperty(property_id));
                }
                self.toggle_save(&property_id);
            }
            ViewEvent::SelectState { state } => {
                if let Some(ref name) = state {
                    if !STATES.contains(&name.as_str()) {
                        return Err(ViewError::UnknownState(name.clone()));
                    }
                }
                self.selected_state = state;
            }
            ViewEvent::SetFilters { max_price, min_area } => {
                self.max_price = max_price;
                self.min_area = min_area;
            }
            ViewEvent::ClearFilters => {
                self.selected_state = None;
                self.max_price = None;
                self.min_area = None;
            }
            ViewEvent::OpenContact { title, subtitle } => {
                self.contact = ContactModal {
                    open: true,
                    title,
                    subtitle,
                };
            }
            ViewEvent::CloseContact => {
                self.contact.open = false;
            }
            ViewEvent::Back => {
                self.screen = Screen::Home;
            }
        }
        Ok(())
    }

    fn open_listing(&mut self, property: PropertyRecord) {
        self.generation += 1;
        self.chat = Some(ChatSession::for_property(&property));
        self.chat_state = TrackState::Idle;
        self.report = None;
        self.report_state = TrackState::Idle;
        self.selected = Some(property);
        self.screen = Screen::ListingDetail;
    }

    /// Returns whether the id is saved after the toggle.
    pub fn toggle_save(&mut self, property_id: &str) -> bool {
        if self.saved.remove(property_id) {
            false
        } else {
            self.saved.insert(property_id.to_string());
            true
        }
    }

    /// Records the user's question and moves the chat track to Awaiting.
    pub fn begin_chat(&mut self, message: &str) -> Result<ChatTicket, ViewError> {
        let question = message.trim();
        if question.is_empty() {
            return Err(ViewError::EmptyMessage);
        }
        if self.screen != Screen::ListingDetail {
            return Err(ViewError::NoPropertySelected);
        }
        let (property, chat) = match (self.selected.as_ref(), self.chat.as_mut()) {
            (Some(property), Some(chat)) => (property, chat),
            _ => return Err(ViewError::NoPropertySelected),
        };
        if self.chat_state.is_busy() {
            return Err(ViewError::TrackBusy(Track::Chat));
        }

        let prior_turns = chat.turns().to_vec();
        chat.append(ChatRole::User, question);
        self.chat_state = TrackState::Awaiting;

        Ok(ChatTicket {
            generation: self.generation,
            property: property.clone(),
            question: question.to_string(),
            prior_turns,
        })
    }

    /// Appends the reply if the same property is still being viewed.
    /// Returns false when the reply was discarded.
    pub fn complete_chat(&mut self, generation: u64, reply: AssistantReply) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping chat reply for a previous property");
            return false;
        }
        self.chat_state = TrackState::Idle;
        match self.chat.as_mut() {
            Some(chat) => {
                chat.append(ChatRole::Assistant, reply.text);
                true
            }
            None => false,
        }
    }

    pub fn begin_report(&mut self) -> Result<ReportTicket, ViewError> {
        if self.screen != Screen::ListingDetail {
            return Err(ViewError::NoPropertySelected);
        }
        let property = self.selected.clone().ok_or(ViewError::NoPropertySelected)?;
        if self.report_state.is_busy() {
            return Err(ViewError::TrackBusy(Track::Report));
        }
        self.report_state = TrackState::Awaiting;
        Ok(ReportTicket {
            generation: self.generation,
            property,
        })
    }

    pub fn complete_report(&mut self, generation: u64, reply: AssistantReply) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping report for a previous property");
            return false;
        }
        self.report_state = TrackState::Idle;
        self.report = Some(reply);
        true
    }

    pub fn dashboard(&self, catalog: &Catalog) -> Result<DashboardResponse, ViewError> {
        let user = self.user.clone().ok_or(ViewError::NotSignedIn)?;
        let saved_properties = catalog
            .all()
            .iter()
            .filter(|p| self.saved.contains(&p.id))
            .cloned()
            .collect();
        Ok(DashboardResponse {
            user,
            saved_properties,
            active_transaction: ActiveTransaction::sample(),
        })
    }

    pub fn snapshot(&self, catalog: &Catalog) -> ViewSnapshot {
        let filters = self.listing_filter();
        let visible_listings = filters
            .apply(catalog.all())
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        ViewSnapshot {
            screen: self.screen,
            rendered: self.rendered(),
            selected_property: self.selected.clone(),
            selected_state: self.selected_state.clone(),
            filters,
            visible_listings,
            saved: self.saved.iter().cloned().collect(),
            user: self.user.clone(),
            contact: self.contact.clone(),
            chat: self.chat_turns().to_vec(),
            chat_state: self.chat_state,
            report: self.report.clone(),
            report_state: self.report_state,
        }
    }
}
