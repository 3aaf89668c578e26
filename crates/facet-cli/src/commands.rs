use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use facet_cli::replay::{CommitRecord, Replay};
use facet_cli::script::Script;
use facet_cli::session::Session;
use facet_cli::settings::{Settings, save_settings, settings_path};
use facet_model::{Half, Tristate};
use facet_persist::{
    FileStore, KeyValueStore, MemoryStore, QueryParams, ResolvedFrom, Sinks, UrlOverrides,
    build_url, split_url,
};
use facet_state::{FilterPanel, PanelConfig, SearchQuery};
use serde_json::Value;
use tracing::{info, info_span};

use crate::cli::{LinkArgs, ReplayArgs, TabArgs};
use crate::summary::apply_table_style;

/// One row of the field table.
#[derive(Debug, Clone)]
pub struct FieldRow {
    pub key: String,
    pub kind: &'static str,
    pub live: String,
    pub committed: String,
    pub pending: bool,
    /// Tier the entry was read from, when the panel was just mounted.
    pub source: Option<&'static str>,
}

#[derive(Debug)]
pub struct ReplayOutcome {
    pub panel: String,
    pub commits: Vec<CommitRecord>,
    /// Commits dropped by closing the panel early.
    pub cancelled: usize,
    pub url: String,
    pub tab_store: BTreeMap<String, String>,
    pub fields: Vec<FieldRow>,
    pub query: SearchQuery,
    pub session: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ResolveOutcome {
    pub panel: String,
    pub url: String,
    pub fields: Vec<FieldRow>,
    pub query: SearchQuery,
}

pub fn run_replay(args: &ReplayArgs, settings: &Settings) -> Result<ReplayOutcome> {
    let config = find_panel(settings, &args.tab.panel)?;
    let span = info_span!("replay", panel = %config.name);
    let _guard = span.enter();

    let script = Script::load(&args.script)?;
    let sinks = open_tab(&args.tab, &config, settings)?;
    let mut replay = Replay::mount(config, sinks, settings.sync)?;
    info!(steps = script.steps.len(), duration_ms = script.duration_ms(), "replaying");

    if args.realtime {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("start runtime")?;
        runtime.block_on(async {
            replay.run_realtime(&script).await?;
            if !args.no_settle {
                replay.settle_realtime().await;
            }
            anyhow::Ok(())
        })?;
    } else {
        replay.run_virtual(&script)?;
        if !args.no_settle {
            replay.settle_virtual();
        }
    }
    let cancelled = if replay.pending_len() > 0 {
        replay.unmount()
    } else {
        0
    };

    if let Some(path) = &args.tab.session {
        Session::capture(&replay.sinks).save(path)?;
    }

    Ok(ReplayOutcome {
        panel: replay.panel.name().to_string(),
        fields: field_rows(&replay.panel, false),
        query: replay.panel.committed_query(),
        url: replay.sinks.location.href(),
        tab_store: replay.sinks.tab.snapshot(),
        commits: std::mem::take(&mut replay.commits),
        cancelled,
        session: args.tab.session.clone(),
    })
}

pub fn run_resolve(args: &TabArgs, settings: &Settings) -> Result<ResolveOutcome> {
    let config = find_panel(settings, &args.panel)?;
    let sinks = open_tab(args, &config, settings)?;
    let replay = Replay::mount(config, sinks, settings.sync)?;
    Ok(ResolveOutcome {
        panel: replay.panel.name().to_string(),
        url: replay.sinks.location.href(),
        fields: field_rows(&replay.panel, true),
        query: replay.panel.committed_query(),
    })
}

pub fn run_link(args: &LinkArgs) -> Result<String> {
    let (path, query) = split_url(&args.from);
    let current = QueryParams::parse(query);
    let mut overrides = UrlOverrides::new();
    for pair in &args.set {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{pair}'"))?;
        overrides = if serde_json::from_str::<Value>(value).is_ok() {
            overrides.raw(key, value)
        } else {
            overrides.value(key, value)?
        };
    }
    for key in &args.clear {
        overrides = overrides.clear(key.as_str());
    }
    for key in &args.unset {
        overrides = overrides.unset(key.as_str());
    }
    let base = args.base.as_deref().unwrap_or(path);
    Ok(build_url(base, &current, &overrides))
}

pub fn run_presets(settings: &Settings) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Panel", "Path", "Group", "Store", "Keys"]);
    apply_table_style(&mut table);
    for panel in settings.panels() {
        table.add_row(vec![
            panel.name.clone(),
            panel.path.clone(),
            panel.group.clone().unwrap_or_else(|| "-".to_string()),
            panel.store.to_string(),
            panel.keys().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_init(settings: &Settings, path: Option<&Path>) -> Result<PathBuf> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(settings_path)
        .context("no settings path on this platform, pass --settings")?;
    save_settings(settings, &path)?;
    Ok(path)
}

fn find_panel(settings: &Settings, name: &str) -> Result<PanelConfig> {
    settings.panel(name).ok_or_else(|| {
        let known: Vec<String> = settings.panels().into_iter().map(|p| p.name).collect();
        anyhow!("unknown panel '{name}' (available: {})", known.join(", "))
    })
}

fn open_tab(args: &TabArgs, config: &PanelConfig, settings: &Settings) -> Result<Sinks> {
    let mut session = args
        .session
        .as_deref()
        .and_then(Session::load)
        .unwrap_or_else(|| Session::new(config.path.clone()));
    if let Some(url) = &args.url {
        session.url = url.clone();
    }
    let local: Box<dyn KeyValueStore> = match &settings.storage.local_store_path {
        Some(path) => Box::new(
            FileStore::open(path)
                .with_context(|| format!("open local store {}", path.display()))?,
        ),
        None => Box::new(MemoryStore::new()),
    };
    Ok(session.into_sinks(local))
}

fn field_rows(panel: &FilterPanel, with_source: bool) -> Vec<FieldRow> {
    let source = |key: &str| {
        with_source
            .then(|| panel.resolved_from(key))
            .flatten()
            .map(ResolvedFrom::as_str)
    };

    let mut rows = Vec::new();
    for (key, field) in panel.scalars() {
        let kind = panel
            .config()
            .scalar(key)
            .map_or("scalar", |spec| spec.kind.as_str());
        rows.push(FieldRow {
            key: key.to_string(),
            kind,
            live: tristate(field.live()),
            committed: tristate(field.committed()),
            pending: field.is_pending(),
            source: source(key),
        });
    }
    for (key, set) in panel.selections() {
        rows.push(FieldRow {
            key: key.to_string(),
            kind: "selection",
            live: set.active().join(", "),
            committed: set.committed().join(", "),
            pending: set.has_pending(),
            source: source(key),
        });
    }
    if let Some(sort) = panel.sort() {
        let order = |half| {
            sort.sort_order(half)
                .into_iter()
                .map(|(field, direction)| format!("{field} {direction}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let key = sort.binding().key.clone();
        rows.push(FieldRow {
            source: source(&key),
            key,
            kind: "sort",
            live: order(Half::Live),
            committed: order(Half::Committed),
            pending: sort.is_pending(),
        });
    }
    rows
}

fn tristate<T: fmt::Display>(value: &Tristate<T>) -> String {
    match value {
        Tristate::Value(value) => value.to_string(),
        Tristate::Cleared => "(cleared)".to_string(),
        Tristate::Unset => String::new(),
    }
}
