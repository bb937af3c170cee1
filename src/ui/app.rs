use anyhow::Result;
use chrono::{Local, NaiveDateTime};

use crate::config::{Config, Locale};
use crate::db::Database;
use crate::models::{Client, Installment};
use crate::report::PortfolioSummary;
use crate::schedule::{build_standings, total_paid, ClientStanding, Tier};
use crate::ui::util::clamp_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Clients,
    Payments,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Clients, Self::Payments]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Clients => write!(f, "Clients"),
            Self::Payments => write!(f, "Payments"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    /// Typing a payment amount for the selected client.
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "PAY"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteClient { id: i64, name: String },
    DeletePayment { id: i64, description: String },
    ImportCommit,
}

/// Scrollable text shown over the current screen (reports, reminders, import errors).
#[derive(Debug, Clone)]
pub(crate) struct Popup {
    pub(crate) title: String,
    pub(crate) lines: Vec<String>,
    pub(crate) scroll: usize,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) popup: Option<Popup>,

    pub(crate) currency: String,
    pub(crate) locale: Locale,

    // Every client regardless of search; feeds the dashboard, reports and export
    pub(crate) portfolio: Vec<ClientStanding>,
    pub(crate) summary: PortfolioSummary,

    // Clients (search results)
    pub(crate) standings: Vec<ClientStanding>,
    pub(crate) tier_filter: Option<Tier>,
    pub(crate) client_index: usize,
    pub(crate) client_scroll: usize,

    // Payments
    pub(crate) payments_client: Option<ClientStanding>,
    pub(crate) payments: Vec<Installment>,
    pub(crate) payment_index: usize,
    pub(crate) payment_scroll: usize,

    // Import waiting for confirmation
    pub(crate) import_preview: Vec<Client>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            popup: None,

            currency: config.currency.clone(),
            locale: config.locale,

            portfolio: Vec::new(),
            summary: PortfolioSummary::default(),

            standings: Vec::new(),
            tier_filter: None,
            client_index: 0,
            client_scroll: 0,

            payments_client: None,
            payments: Vec::new(),
            payment_index: 0,
            payment_scroll: 0,

            import_preview: Vec::new(),

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Reload clients and payments, recomputing every standing for the current instant.
    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        let now = Self::now();
        let installments = db.get_installments()?;

        self.portfolio = build_standings(&db.get_clients(None)?, &installments, now);
        self.summary = PortfolioSummary::from_standings(&self.portfolio);

        self.standings = if self.search_input.trim().is_empty() {
            self.portfolio.clone()
        } else {
            build_standings(&db.get_clients(Some(&self.search_input))?, &installments, now)
        };
        let len = self.visible_clients().len();
        clamp_index(&mut self.client_index, &mut self.client_scroll, len);

        self.refresh_payments(db)?;
        Ok(())
    }

    /// Reload the history of the client shown on the Payments screen.
    pub(crate) fn refresh_payments(&mut self, db: &Database) -> Result<()> {
        let Some(id) = self.payments_client.as_ref().and_then(|s| s.client.id) else {
            self.payments.clear();
            return Ok(());
        };
        let Some(client) = db.get_client_by_id(id)? else {
            self.payments_client = None;
            self.payments.clear();
            return Ok(());
        };
        self.payments = db.get_installments_for_client(id)?;
        let paid = total_paid(&self.payments);
        self.payments_client = Some(ClientStanding::new(client, paid, Self::now()));
        clamp_index(&mut self.payment_index, &mut self.payment_scroll, self.payments.len());
        Ok(())
    }

    /// Clients passing the tier filter, in table order.
    pub(crate) fn visible_clients(&self) -> Vec<&ClientStanding> {
        self.standings
            .iter()
            .filter(|s| self.tier_filter.map_or(true, |t| s.tier == t))
            .collect()
    }

    pub(crate) fn selected_client(&self) -> Option<&ClientStanding> {
        self.visible_clients().get(self.client_index).copied()
    }

    /// The client an action applies to: the one whose history is open on the
    /// Payments screen, otherwise the highlighted row.
    pub(crate) fn focused_client(&self) -> Option<&ClientStanding> {
        match self.screen {
            Screen::Payments => self.payments_client.as_ref(),
            _ => self.selected_client(),
        }
    }

    /// Move the cursor onto a client by id, clearing the tier filter if it hides them.
    pub(crate) fn select_client(&mut self, id: i64) {
        if !self.visible_clients().iter().any(|s| s.client.id == Some(id)) {
            self.tier_filter = None;
        }
        if let Some(pos) = self
            .visible_clients()
            .iter()
            .position(|s| s.client.id == Some(id))
        {
            self.client_index = pos;
            if pos < self.client_scroll || pos >= self.client_scroll + self.visible_rows.max(1) {
                self.client_scroll = pos;
            }
        }
    }

    /// Show the payment history of the highlighted client.
    pub(crate) fn open_payments(&mut self, db: &Database) -> Result<()> {
        let Some(selected) = self.selected_client().cloned() else {
            self.set_status("No client selected");
            return Ok(());
        };
        self.payments_client = Some(selected);
        self.payment_index = 0;
        self.payment_scroll = 0;
        self.screen = Screen::Payments;
        self.refresh_payments(db)
    }

    pub(crate) fn set_tier_filter(&mut self, tier: Option<Tier>) {
        self.tier_filter = tier;
        self.client_index = 0;
        self.client_scroll = 0;
    }

    pub(crate) fn show_popup(&mut self, title: impl Into<String>, body: &str) {
        self.popup = Some(Popup {
            title: title.into(),
            lines: body.lines().map(str::to_string).collect(),
            scroll: 0,
        });
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
