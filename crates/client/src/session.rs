//! UI state coordination for the reference page.
//!
//! [`Coordinator`] owns the state of the three floating surfaces (search suggestions,
//! hover preview panel, pinned preferences box) plus the provider sidebar and the results
//! area, and keeps them consistent. Its handlers never touch the network: they return
//! [`Command`]s, and the results come back as [`Event`]s. [`Session`] pairs a coordinator
//! with an [`ApiClient`] and runs that loop.
//!
//! Every fetch carries a ticket. A response whose ticket is older than the newest one
//! issued for its surface is dropped, so a slow answer for an earlier hover or click never
//! overwrites a later one.

use crate::api::ApiClient;
use crate::drag::{Drag, Position, PressTarget};
use crate::error::FetchError;
use crate::render;
use api_shared::{Medication, PreferenceSet, ProviderSummary, SuggestionPair};
use std::collections::VecDeque;

pub type Ticket = u64;

/// Input to the coordinator: user actions and fetch results.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Page loaded; the provider list is requested.
    Start,
    ProvidersLoaded(Result<Vec<ProviderSummary>, FetchError>),
    ProviderFilterChanged(String),
    ToggleSidebar,
    HoverProvider {
        id: String,
        name: String,
    },
    PreviewLoaded {
        ticket: Ticket,
        id: String,
        name: String,
        result: Result<PreferenceSet, FetchError>,
    },
    /// Pointer left the sidebar; `into_panel` when it moved onto the preview panel.
    PointerLeftSidebar {
        into_panel: bool,
    },
    /// Pointer left the preview panel; `into_sidebar` when it moved onto the sidebar.
    PointerLeftPanel {
        into_sidebar: bool,
    },
    ClickProvider {
        id: String,
        name: String,
    },
    PinLoaded {
        ticket: Ticket,
        id: String,
        name: String,
        result: Result<PreferenceSet, FetchError>,
    },
    Unpin,
    PinnedPointerDown {
        target: PressTarget,
        x: f64,
        y: f64,
    },
    PointerMoved {
        x: f64,
        y: f64,
    },
    PointerUp,
    SearchInput(String),
    SuggestionsLoaded {
        ticket: Ticket,
        query: String,
        result: Result<Vec<SuggestionPair>, FetchError>,
    },
    SelectSuggestion(String),
    MedicationLoaded {
        ticket: Ticket,
        result: Result<Medication, FetchError>,
    },
}

/// Work requested by the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    FetchProviders,
    FetchPreview {
        ticket: Ticket,
        id: String,
        name: String,
    },
    FetchPin {
        ticket: Ticket,
        id: String,
        name: String,
    },
    FetchSuggestions {
        ticket: Ticket,
        query: String,
    },
    FetchMedication {
        ticket: Ticket,
        name: String,
    },
}

/// The provider sidebar list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderList {
    providers: Vec<ProviderSummary>,
    filter: String,
    error_html: Option<String>,
}

impl ProviderList {
    /// Providers matching the filter, sorted by first name.
    pub fn visible(&self) -> Vec<&ProviderSummary> {
        let filter = self.filter.trim().to_lowercase();
        self.providers
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&filter))
            .collect()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn error_html(&self) -> Option<&str> {
        self.error_html.as_deref()
    }
}

/// The hover preview panel. It does not exist until the first preview arrives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviewPanel {
    pub created: bool,
    pub open: bool,
    pub html: String,
    pub title_highlight: bool,
}

impl PreviewPanel {
    fn close(&mut self) {
        self.open = false;
        self.title_highlight = false;
    }
}

/// The persistent, draggable preferences box.
#[derive(Clone, Debug, PartialEq)]
pub struct PinnedBox {
    pub provider_id: String,
    pub provider_name: String,
    pub title: String,
    pub details_html: String,
    pub visible: bool,
    pub position: Position,
    drag: Drag,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuggestionItem {
    pub name: String,
    pub label_html: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuggestionList {
    pub items: Vec<SuggestionItem>,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultsArea {
    pub html: String,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct Tickets {
    issued: Ticket,
    preview: Ticket,
    pin: Ticket,
    suggestions: Ticket,
    medication: Ticket,
}

impl Tickets {
    fn next(&mut self) -> Ticket {
        self.issued += 1;
        self.issued
    }
}

#[derive(Clone, Debug, Default)]
pub struct Coordinator {
    providers: ProviderList,
    sidebar_open: bool,
    current_provider_id: Option<String>,
    panel: PreviewPanel,
    pinned: Option<PinnedBox>,
    search_text: String,
    suggestions: SuggestionList,
    results: ResultsArea,
    tickets: Tickets,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn providers(&self) -> &ProviderList {
        &self.providers
    }

    /// Sidebar markup: the error paragraph, or one row per visible provider.
    pub fn sidebar_html(&self) -> String {
        if let Some(error) = self.providers.error_html() {
            return error.to_string();
        }
        let pinned_id = self.pinned.as_ref().map(|b| b.provider_id.as_str());
        self.providers
            .visible()
            .into_iter()
            .map(|p| render::provider_row(p, pinned_id == Some(p.id.as_str())))
            .collect()
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn current_provider_id(&self) -> Option<&str> {
        self.current_provider_id.as_deref()
    }

    pub fn panel(&self) -> &PreviewPanel {
        &self.panel
    }

    pub fn pinned(&self) -> Option<&PinnedBox> {
        self.pinned.as_ref()
    }

    pub fn pinned_provider_name(&self) -> Option<&str> {
        self.pinned.as_ref().map(|b| b.provider_name.as_str())
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    pub fn results(&self) -> &ResultsArea {
        &self.results
    }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Start => vec![Command::FetchProviders],
            Event::ProvidersLoaded(result) => {
                self.providers_loaded(result);
                Vec::new()
            }
            Event::ProviderFilterChanged(filter) => {
                self.providers.filter = filter;
                Vec::new()
            }
            Event::ToggleSidebar => {
                self.toggle_sidebar();
                Vec::new()
            }
            Event::HoverProvider { id, name } => self.hover(id, name),
            Event::PreviewLoaded {
                ticket,
                id,
                name,
                result,
            } => {
                self.preview_loaded(ticket, id, name, result);
                Vec::new()
            }
            Event::PointerLeftSidebar { into_panel } => {
                if !into_panel {
                    self.panel.close();
                }
                Vec::new()
            }
            Event::PointerLeftPanel { into_sidebar } => {
                if !into_sidebar {
                    self.panel.close();
                }
                Vec::new()
            }
            Event::ClickProvider { id, name } => self.click(id, name),
            Event::PinLoaded {
                ticket,
                id,
                name,
                result,
            } => {
                self.pin_loaded(ticket, id, name, result);
                Vec::new()
            }
            Event::Unpin => {
                if let Some(unpinned) = self.pinned.take() {
                    tracing::debug!("unpinned provider {}", unpinned.provider_id);
                }
                Vec::new()
            }
            Event::PinnedPointerDown { target, x, y } => {
                if let Some(pinned) = self.pinned.as_mut() {
                    pinned.drag.press(target, x, y);
                }
                Vec::new()
            }
            Event::PointerMoved { x, y } => {
                if let Some(pinned) = self.pinned.as_mut() {
                    pinned.drag.motion(&mut pinned.position, x, y);
                }
                Vec::new()
            }
            Event::PointerUp => {
                if let Some(pinned) = self.pinned.as_mut() {
                    pinned.drag.release();
                }
                Vec::new()
            }
            Event::SearchInput(text) => self.search_input(text),
            Event::SuggestionsLoaded {
                ticket,
                query,
                result,
            } => {
                self.suggestions_loaded(ticket, &query, result);
                Vec::new()
            }
            Event::SelectSuggestion(name) => self.select_suggestion(name),
            Event::MedicationLoaded { ticket, result } => {
                self.medication_loaded(ticket, result);
                Vec::new()
            }
        }
    }

    fn providers_loaded(&mut self, result: Result<Vec<ProviderSummary>, FetchError>) {
        match result {
            Ok(mut providers) => {
                providers.sort_by_cached_key(ProviderSummary::first_name_key);
                self.providers.providers = providers;
                self.providers.error_html = None;
            }
            Err(e) => {
                tracing::error!("failed to load providers: {}", e);
                self.providers.providers.clear();
                self.providers.error_html = Some(render::provider_list_error());
            }
        }
    }

    fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        if let Some(pinned) = self.pinned.as_mut() {
            pinned.visible = !self.sidebar_open;
        }
        self.panel.close();
    }

    fn hover(&mut self, id: String, name: String) -> Vec<Command> {
        self.current_provider_id = Some(id.clone());
        self.panel.open = true;
        let ticket = self.tickets.next();
        self.tickets.preview = ticket;
        vec![Command::FetchPreview { ticket, id, name }]
    }

    fn preview_loaded(
        &mut self,
        ticket: Ticket,
        id: String,
        name: String,
        result: Result<PreferenceSet, FetchError>,
    ) {
        if ticket != self.tickets.preview {
            tracing::debug!("dropping stale preview for provider {}", id);
            return;
        }
        self.panel.created = true;
        match result {
            Ok(prefs) => {
                self.panel.html = render::preview_panel(&name, &prefs);
                self.panel.title_highlight = self.panel.open;
            }
            Err(e) => {
                tracing::error!("failed to load preferences for provider {}: {}", id, e);
                self.panel.html = render::preview_error(&name);
                self.panel.close();
            }
        }
    }

    fn click(&mut self, id: String, name: String) -> Vec<Command> {
        self.current_provider_id = Some(id.clone());
        self.sidebar_open = false;
        if let Some(pinned) = self.pinned.as_mut() {
            pinned.visible = true;
        }
        self.panel.close();
        let ticket = self.tickets.next();
        self.tickets.pin = ticket;
        vec![Command::FetchPin { ticket, id, name }]
    }

    fn pin_loaded(
        &mut self,
        ticket: Ticket,
        id: String,
        name: String,
        result: Result<PreferenceSet, FetchError>,
    ) {
        if ticket != self.tickets.pin {
            tracing::debug!("dropping stale pin for provider {}", id);
            return;
        }
        let prefs = match result {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::error!("failed to pin preferences for provider {}: {}", id, e);
                return;
            }
        };

        let details_html = render::preference_details(&prefs);
        match self.pinned.as_mut() {
            Some(pinned) if pinned.provider_id == id => {}
            Some(pinned) => {
                pinned.title = name.clone();
                pinned.provider_name = name;
                pinned.provider_id = id;
                pinned.details_html = details_html;
                pinned.visible = true;
            }
            None => {
                self.pinned = Some(PinnedBox {
                    provider_id: id,
                    title: name.clone(),
                    provider_name: name,
                    details_html,
                    visible: true,
                    position: Position::default(),
                    drag: Drag::default(),
                });
            }
        }
    }

    fn search_input(&mut self, text: String) -> Vec<Command> {
        let query = text.trim().to_string();
        self.search_text = text;
        self.suggestions.items.clear();

        // Bumping the ticket also drops answers for earlier, longer queries.
        let ticket = self.tickets.next();
        self.tickets.suggestions = ticket;

        if query.is_empty() {
            self.suggestions.visible = false;
            self.results.visible = false;
            return Vec::new();
        }
        vec![Command::FetchSuggestions { ticket, query }]
    }

    fn suggestions_loaded(
        &mut self,
        ticket: Ticket,
        query: &str,
        result: Result<Vec<SuggestionPair>, FetchError>,
    ) {
        if ticket != self.tickets.suggestions {
            return;
        }
        match result {
            Ok(pairs) => {
                self.suggestions.items = pairs
                    .iter()
                    .map(|pair| SuggestionItem {
                        name: pair.canonical().to_string(),
                        label_html: render::suggestion_label(
                            pair.canonical(),
                            pair.matched(),
                            query,
                        ),
                    })
                    .collect();
                self.suggestions.visible = !self.suggestions.items.is_empty();
            }
            Err(e) => tracing::error!("error fetching suggestions: {}", e),
        }
    }

    fn select_suggestion(&mut self, name: String) -> Vec<Command> {
        self.search_text = name.clone();
        self.suggestions.items.clear();
        self.suggestions.visible = false;
        let ticket = self.tickets.next();
        self.tickets.medication = ticket;
        vec![Command::FetchMedication { ticket, name }]
    }

    fn medication_loaded(&mut self, ticket: Ticket, result: Result<Medication, FetchError>) {
        if ticket != self.tickets.medication {
            return;
        }
        self.results.html = match result {
            Ok(med) => render::medication_details(&med),
            Err(e) => {
                tracing::error!("error fetching medication details: {}", e);
                match e {
                    FetchError::Status { error, .. } => render::error_paragraph(
                        error.as_deref().unwrap_or("Medication not found"),
                    ),
                    FetchError::Network(_) | FetchError::Decode(_) => {
                        render::error_paragraph("Failed to fetch medication details.")
                    }
                }
            }
        };
        self.results.visible = true;
    }
}

impl ApiClient {
    /// Runs one coordinator command and wraps the outcome as the matching event.
    pub async fn execute(&self, command: Command) -> Event {
        match command {
            Command::FetchProviders => Event::ProvidersLoaded(self.providers().await),
            Command::FetchPreview { ticket, id, name } => {
                let result = self.provider_preferences(&id).await;
                Event::PreviewLoaded {
                    ticket,
                    id,
                    name,
                    result,
                }
            }
            Command::FetchPin { ticket, id, name } => {
                let result = self.provider_preferences(&id).await;
                Event::PinLoaded {
                    ticket,
                    id,
                    name,
                    result,
                }
            }
            Command::FetchSuggestions { ticket, query } => {
                let result = self.suggestions(&query).await;
                Event::SuggestionsLoaded {
                    ticket,
                    query,
                    result,
                }
            }
            Command::FetchMedication { ticket, name } => {
                let result = self.medication(&name).await;
                Event::MedicationLoaded { ticket, result }
            }
        }
    }
}

/// A coordinator wired to a server.
pub struct Session {
    coordinator: Coordinator,
    client: ApiClient,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self {
            coordinator: Coordinator::new(),
            client,
        }
    }

    pub fn state(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Handles `event` and every fetch it triggers, one request at a time, until the
    /// coordinator has nothing left to do.
    pub async fn dispatch(&mut self, event: Event) {
        let mut queue: VecDeque<Command> = self.coordinator.handle(event).into();
        while let Some(command) = queue.pop_front() {
            let outcome = self.client.execute(command).await;
            queue.extend(self.coordinator.handle(outcome));
        }
    }
}
