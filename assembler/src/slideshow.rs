//! The owner of a live deck: reloads it from source and announces
//! replacements.
//!
//! Every load takes a ticket when it starts. A finished load installs its
//! deck only if no later load has started since, so a slow fetch can never
//! overwrite the result of a newer one. A failed load leaves the installed
//! deck as it was.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use slidemark::RawSlideRecord;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::assemble::DeckAssembler;
use crate::config::DeckOptions;
use crate::deck::Deck;
use crate::error::LoadError;
use crate::source::{fetch_source, parse_source, read_source};

/// Where a deck comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Markdown source text.
    Text(String),
    /// Records built elsewhere; parsing is skipped.
    Records(Vec<RawSlideRecord>),
    Url(String),
    File(PathBuf),
}

impl Source {
    /// The source named by the options: `source_url` wins over inline
    /// `source`, which defaults to empty.
    pub fn from_options(options: &DeckOptions) -> Self {
        match (&options.source_url, &options.source) {
            (Some(url), _) => Source::Url(url.clone()),
            (None, Some(text)) => Source::Text(text.clone()),
            (None, None) => Source::Text(String::new()),
        }
    }
}

/// How many deck events a slow subscriber may fall behind before it lags.
const EVENT_CAPACITY: usize = 16;

/// Broadcast to every [`SlideShow::subscribe`] receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckEvent {
    /// A new deck snapshot is in place.
    DeckReplaced { generation: u64, slide_count: usize },
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The new deck is installed.
    Replaced(Arc<Deck>),
    /// A later load started before this one finished; its result was dropped.
    Superseded,
}

impl LoadOutcome {
    pub fn deck(&self) -> Option<&Arc<Deck>> {
        match self {
            LoadOutcome::Replaced(deck) => Some(deck),
            LoadOutcome::Superseded => None,
        }
    }
}

struct Installed {
    records: Arc<[RawSlideRecord]>,
    deck: Arc<Deck>,
    generation: u64,
}

pub struct SlideShow {
    options: RwLock<DeckOptions>,
    installed: RwLock<Installed>,
    tickets: AtomicU64,
    events: broadcast::Sender<DeckEvent>,
    client: reqwest::Client,
}

impl SlideShow {
    pub fn new(options: DeckOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SlideShow {
            options: RwLock::new(options),
            installed: RwLock::new(Installed {
                records: Arc::from(Vec::new()),
                deck: Arc::new(Deck::empty()),
                generation: 0,
            }),
            tickets: AtomicU64::new(0),
            events,
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client for URL sources.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeckEvent> {
        self.events.subscribe()
    }

    /// The current deck snapshot. Later reloads do not affect it.
    pub fn deck(&self) -> Arc<Deck> {
        Arc::clone(&self.read_installed().deck)
    }

    /// Ticket of the load that produced the current deck; 0 before any.
    pub fn generation(&self) -> u64 {
        self.read_installed().generation
    }

    pub fn options(&self) -> DeckOptions {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Edit the options and re-assemble the current records under them.
    /// This counts as a new load, so it supersedes any load in flight.
    pub fn update_options(&self, edit: impl FnOnce(&mut DeckOptions)) -> LoadOutcome {
        edit(&mut self.options.write().unwrap_or_else(PoisonError::into_inner));
        let ticket = self.begin();
        let records = Arc::clone(&self.read_installed().records);
        self.install(ticket, records)
    }

    pub fn load_from_records(&self, records: Vec<RawSlideRecord>) -> LoadOutcome {
        let ticket = self.begin();
        self.install(ticket, records.into())
    }

    pub fn load_from_string(&self, source: &str) -> Result<LoadOutcome, LoadError> {
        let ticket = self.begin();
        let records = self.checked(parse_source(source))?;
        Ok(self.install(ticket, records.into()))
    }

    pub fn load_from_file(&self, path: &Path) -> Result<LoadOutcome, LoadError> {
        let ticket = self.begin();
        let text = self.checked(read_source(path).map_err(LoadError::from))?;
        let records = self.checked(parse_source(&text))?;
        Ok(self.install(ticket, records.into()))
    }

    pub async fn load_from_url(&self, url: &str) -> Result<LoadOutcome, LoadError> {
        let ticket = self.begin();
        let text = self.checked(
            fetch_source(&self.client, url)
                .await
                .map_err(LoadError::from),
        )?;
        let records = self.checked(parse_source(&text))?;
        Ok(self.install(ticket, records.into()))
    }

    pub async fn load(&self, source: Source) -> Result<LoadOutcome, LoadError> {
        match source {
            Source::Text(text) => self.load_from_string(&text),
            Source::Records(records) => Ok(self.load_from_records(records)),
            Source::Url(url) => self.load_from_url(&url).await,
            Source::File(path) => self.load_from_file(&path),
        }
    }

    /// Load whatever the options point at.
    pub async fn load_configured(&self) -> Result<LoadOutcome, LoadError> {
        let source = Source::from_options(&self.options());
        self.load(source).await
    }

    fn begin(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn checked<T>(&self, result: Result<T, LoadError>) -> Result<T, LoadError> {
        if let Err(error) = &result {
            warn!(%error, "deck load failed, keeping the current deck");
        }
        result
    }

    fn install(&self, ticket: u64, records: Arc<[RawSlideRecord]>) -> LoadOutcome {
        let options = self.options();
        let deck = Arc::new(DeckAssembler::new(&options).assemble(&records));
        let slide_count = deck.slide_count();

        {
            let mut installed = self
                .installed
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let latest = self.tickets.load(Ordering::SeqCst);
            if ticket != latest {
                warn!(ticket, latest, "discarding superseded deck load");
                return LoadOutcome::Superseded;
            }
            *installed = Installed {
                records,
                deck: Arc::clone(&deck),
                generation: ticket,
            };
        }

        info!(generation = ticket, slides = slide_count, "deck replaced");
        // No subscribers is fine.
        let _ = self.events.send(DeckEvent::DeckReplaced {
            generation: ticket,
            slide_count,
        });
        LoadOutcome::Replaced(deck)
    }

    fn read_installed(&self) -> std::sync::RwLockReadGuard<'_, Installed> {
        self.installed.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SlideShow {
    fn default() -> Self {
        SlideShow::new(DeckOptions::default())
    }
}
