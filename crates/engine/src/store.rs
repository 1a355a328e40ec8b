//! The configuration store
//!
//! A [`Store`] owns one [`ConfigTree`] behind a `parking_lot::RwLock`.
//! Read-only statements share the lock; every other statement holds it
//! exclusively from navigation to the last write, so statements never
//! interleave. Snapshot encoding takes the shared lock and therefore sees
//! each statement either fully applied or not at all.
//!
//! A persistent store lives in a data directory holding `configx.toml` and
//! the snapshot file. An ephemeral store has neither.

use crate::config::{self, DurabilityMode, StoreConfig};
use crate::interpreter;
use configx_core::{parse, Error, Operation, PathExpression, Result, Value};
use configx_storage::{decode_tree, encode_tree, ConfigTree, SnapshotFile};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Embedded, path-addressable configuration store
pub struct Store {
    tree: RwLock<ConfigTree>,
    config: StoreConfig,
    mode: DurabilityMode,
    data_dir: Option<PathBuf>,
    snapshot: Option<SnapshotFile>,
    /// Mutations since the last successful save
    dirty: AtomicBool,
    closed: AtomicBool,
}

impl Store {
    fn with_tree(
        tree: ConfigTree,
        config: StoreConfig,
        data_dir: Option<PathBuf>,
        snapshot: Option<SnapshotFile>,
    ) -> Result<Self> {
        let mode = config.durability_mode()?;
        Ok(Store {
            tree: RwLock::new(tree),
            config,
            mode,
            data_dir,
            snapshot,
            dirty: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    /// Create an in-memory store with no persistence.
    pub fn ephemeral() -> Self {
        Store {
            tree: RwLock::new(ConfigTree::new()),
            config: StoreConfig::default(),
            mode: DurabilityMode::OnClose,
            data_dir: None,
            snapshot: None,
            dirty: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Build an in-memory store from encoded snapshot bytes.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        let tree = decode_tree(bytes)?;
        Self::with_tree(tree, StoreConfig::default(), None, None)
    }

    /// Open (or create) a store in `dir`.
    ///
    /// Writes a default `configx.toml` if the directory has none, then
    /// loads the snapshot if one exists. A corrupt snapshot fails the open.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let data_dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(config::CONFIG_FILE_NAME);
        StoreConfig::write_default_if_missing(&config_path)?;
        let cfg = StoreConfig::from_file(&config_path)?;

        Self::open_inner(data_dir, cfg)
    }

    /// Open a store in `dir` with an explicit configuration.
    ///
    /// The supplied config is written to `configx.toml` so that a later
    /// [`Store::open`] picks up the same settings.
    pub fn open_with<P: AsRef<Path>>(dir: P, cfg: StoreConfig) -> Result<Self> {
        let data_dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        cfg.validate()?;

        let config_path = data_dir.join(config::CONFIG_FILE_NAME);
        cfg.write_to_file(&config_path)?;

        Self::open_inner(data_dir, cfg)
    }

    fn open_inner(data_dir: PathBuf, cfg: StoreConfig) -> Result<Self> {
        let snapshot = SnapshotFile::new(data_dir.join(&cfg.snapshot_file));
        if snapshot.cleanup_temp_file()? {
            warn!(
                target: "configx::store",
                path = %snapshot.path().display(),
                "Removed temporary snapshot left by an interrupted save"
            );
        }

        let tree = if snapshot.exists() {
            snapshot
                .load_with_depth(cfg.max_nesting_depth)
                .map_err(|e| {
                    warn!(
                        target: "configx::snapshot",
                        path = %snapshot.path().display(),
                        error = %e,
                        "Snapshot failed to load"
                    );
                    e
                })?
        } else {
            ConfigTree::new()
        };

        info!(
            target: "configx::store",
            path = %data_dir.display(),
            durability = %cfg.durability,
            restored = !tree.is_empty(),
            "Store opened"
        );
        Self::with_tree(tree, cfg, Some(data_dir), Some(snapshot))
    }

    /// Data directory of a persistent store
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Whether the store writes snapshots
    pub fn is_persistent(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The configuration in effect
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse and execute one expression.
    ///
    /// Returns `None` for an absent result (safe-mode miss, whole-path
    /// delete).
    pub fn resolve(&self, expression: &str) -> Result<Option<Value>> {
        let expr = parse(expression)?;
        self.execute(&expr)
    }

    /// Execute an already-parsed statement.
    pub fn execute(&self, expr: &PathExpression) -> Result<Option<Value>> {
        if expr.is_read_only() {
            let tree = self.tree.read();
            return interpreter::evaluate(&tree, expr);
        }

        let max_depth = self.config.max_nesting_depth;
        let mut tree = self.tree.write();

        if self.mode == DurabilityMode::Always && self.snapshot.is_some() {
            // The live tree only changes once the snapshot holding the
            // statement is on disk. Still under the write lock, so snapshots
            // land in statement order.
            let mut next = tree.clone();
            let result = interpreter::execute_with_depth(&mut next, expr, max_depth)?;
            self.persist(&next)?;
            *tree = next;
            debug!(target: "configx::store", statement = %expr, "Statement applied");
            return Ok(result);
        }

        let result = interpreter::execute_with_depth(&mut tree, expr, max_depth)?;
        self.dirty.store(true, Ordering::Release);
        debug!(target: "configx::store", statement = %expr, "Statement applied");
        Ok(result)
    }

    /// Read a value by plain dotted path (accessors and `!` allowed).
    pub fn get_value(&self, path: &str) -> Result<Option<Value>> {
        let expr = parse(path)?;
        if !matches!(expr.operation, Operation::Get | Operation::SafeGet) {
            return Err(Error::syntax(0, format!("'{}' is not a read", path)));
        }
        self.execute(&expr)
    }

    /// Set a leaf by plain dotted path, auto-vivifying namespaces.
    pub fn set_value(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let mut expr = parse(path)?;
        if !expr.accessors.is_empty() || expr.operation != Operation::Get {
            return Err(Error::syntax(
                0,
                format!("'{}' is not a plain dotted path", path),
            ));
        }
        expr.operation = Operation::Set(value.into());
        self.execute(&expr).map(|_| ())
    }

    /// Every leaf path currently stored, in path order
    pub fn paths(&self) -> Vec<String> {
        self.tree
            .read()
            .leaves()
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Encode the whole tree as snapshot bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let tree = self.tree.read();
        encode_tree(&tree)
    }

    /// Write the snapshot now. A no-op for ephemeral stores.
    pub fn save(&self) -> Result<()> {
        if self.snapshot.is_none() {
            return Ok(());
        }
        let tree = self.tree.read();
        self.persist(&tree)
    }

    fn persist(&self, tree: &ConfigTree) -> Result<()> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        let bytes = encode_tree(tree)?;
        snapshot.save_bytes(&bytes)?;
        self.dirty.store(false, Ordering::Release);
        debug!(
            target: "configx::store",
            bytes = bytes.len(),
            "Snapshot persisted"
        );
        Ok(())
    }

    /// Save (when persistent) and close the store.
    pub fn close(self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        self.save()?;
        info!(
            target: "configx::store",
            persistent = self.is_persistent(),
            "Store closed"
        );
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.closed.load(Ordering::Acquire) || !self.dirty.load(Ordering::Acquire) {
            return;
        }
        // Final save so unsaved mutations survive a missing close()
        if let Err(e) = self.save() {
            warn!(
                target: "configx::store",
                error = %e,
                "Failed to save snapshot on drop"
            );
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("data_dir", &self.data_dir)
            .field("durability", &self.mode)
            .finish_non_exhaustive()
    }
}
