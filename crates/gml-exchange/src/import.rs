//! Import: pick up payloads sent by sibling apps
//!
//! The host hands in an [`InboundSource`] (the query parameters it was
//! opened with) and a store. Anything that goes wrong on the way in is
//! logged and the import is dropped.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::envelope::{random_suffix, timestamp, ContentType, Envelope, ExportPayload};
use crate::store::KeyValueStore;

/// Decoded parameter lookup
pub trait InboundSource {
    fn param(&self, name: &str) -> Option<String>;
}

impl InboundSource for HashMap<String, String> {
    fn param(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Query string of a URL, values percent-decoded once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Accepts a full URL or a bare query string. Pairs that fail to decode
    /// are skipped.
    pub fn parse(input: &str) -> Self {
        let query = match input.split_once('?') {
            Some((_, query)) => query,
            None if input.contains("://") => "",
            None => input,
        };
        let query = query.split_once('#').map_or(query, |(q, _)| q);

        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                match (decode_component(key), decode_component(value)) {
                    (Some(key), Some(value)) => Some((key, value)),
                    _ => {
                        warn!(pair, "Skipping undecodable query parameter");
                        None
                    }
                }
            })
            .collect();

        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " ")).ok().map(|s| s.into_owned())
}

impl InboundSource for QueryParams {
    /// First value for `name`
    fn param(&self, name: &str) -> Option<String> {
        self.pairs.iter().find(|(key, _)| key == name).map(|(_, value)| value.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Received,
    Processed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRecord {
    pub id: String,
    pub timestamp: String,
    pub source: String,
    pub target: String,
    pub data: Envelope,
    pub status: ImportStatus,
}

type Listener = Box<dyn FnMut(&ImportRecord) -> anyhow::Result<()> + Send>;

pub struct ImportHandler {
    queue: Vec<ImportRecord>,
    listeners: Vec<Listener>,
    auto_process: bool,
}

impl Default for ImportHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportHandler {
    pub fn new() -> Self {
        Self::with_auto_process(true)
    }

    /// With auto-processing off, records stay `received` until
    /// [`mark_processed`](Self::mark_processed).
    pub fn with_auto_process(auto_process: bool) -> Self {
        Self {
            queue: Vec::new(),
            listeners: Vec::new(),
            auto_process,
        }
    }

    /// Run listeners for every record handled from now on, in registration
    /// order. An error from one is logged and the rest still run.
    pub fn on_import<F>(&mut self, listener: F)
    where
        F: FnMut(&ImportRecord) -> anyhow::Result<()> + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Look for `import` and `importKey` in the inbound source. A stored
    /// entry is removed only after it parsed. Returns the number of imports
    /// handled.
    pub fn detect(&mut self, source: &dyn InboundSource, store: &mut dyn KeyValueStore) -> usize {
        let mut handled = 0;

        if let Some(raw) = source.param("import") {
            match self.handle_json(&raw) {
                Ok(_) => handled += 1,
                Err(e) => error!("Failed to parse URL import data: {e}"),
            }
        }

        if let Some(key) = source.param("importKey") {
            match store.get(&key) {
                Ok(Some(raw)) => match self.handle_json(&raw) {
                    Ok(_) => {
                        handled += 1;
                        if let Err(e) = store.remove(&key) {
                            error!(key = %key, "Failed to remove consumed import: {e}");
                        }
                    }
                    Err(e) => error!(key = %key, "Failed to parse stored import data: {e}"),
                },
                Ok(None) => warn!(key = %key, "No stored import under key"),
                Err(e) => error!(key = %key, "Failed to read stored import: {e}"),
            }
        }

        handled
    }

    pub fn handle_json(&mut self, raw: &str) -> serde_json::Result<&ImportRecord> {
        let payload: ExportPayload = serde_json::from_str(raw)?;
        Ok(self.handle_import(payload))
    }

    pub fn handle_import(&mut self, payload: ExportPayload) -> &ImportRecord {
        if !payload.has_protocol_tag() {
            warn!(source = %payload.source, "Import data missing 9x3 protocol tag");
        }

        let now = Utc::now();
        self.queue.push(ImportRecord {
            id: format!("import_{}_{}", now.timestamp_millis(), random_suffix(9)),
            timestamp: timestamp(now),
            source: payload.source,
            target: payload.target,
            data: payload.data,
            status: ImportStatus::Received,
        });

        let index = self.queue.len() - 1;
        self.notify(index);
        if self.auto_process {
            self.process(index);
        }
        &self.queue[index]
    }

    fn notify(&mut self, index: usize) {
        let record = &self.queue[index];
        for (position, listener) in self.listeners.iter_mut().enumerate() {
            if let Err(e) = listener(record) {
                error!(listener = position, id = %record.id, "Import listener error: {e:#}");
            }
        }
    }

    fn process(&mut self, index: usize) {
        let record = &mut self.queue[index];
        match record.data.content_type() {
            ContentType::RiffCollection => info!(id = %record.id, "Auto-processing riff collection"),
            ContentType::TriadProgression => info!(id = %record.id, "Auto-processing triad progression"),
            ContentType::QuartetScore => info!(id = %record.id, "Auto-processing quartet score"),
            ContentType::Generic => {}
        }
        record.status = ImportStatus::Processed;
    }

    pub fn records(&self) -> &[ImportRecord] {
        &self.queue
    }

    /// Records still `received`, oldest first
    pub fn pending(&self) -> Vec<&ImportRecord> {
        self.queue.iter().filter(|r| r.status == ImportStatus::Received).collect()
    }

    /// Returns false for an unknown id
    pub fn mark_processed(&mut self, id: &str) -> bool {
        match self.queue.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = ImportStatus::Processed;
                true
            }
            None => false,
        }
    }
}
