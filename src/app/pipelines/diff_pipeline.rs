use super::load_snapshot;
use crate::core::differ::{Differ, IdentityKind};
use crate::core::snapshot::to_json_pretty;
use crate::domain::model::{ChangeKind, ChangeSet, Snapshot};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;

/// 比較兩份快照並輸出 new / changed / missing
pub struct DiffPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) old: String,
    pub(crate) new: String,
    pub(crate) output: String,
    pub(crate) identity: IdentityKind,
}

impl<S: Storage> DiffPipeline<S> {
    pub fn new(storage: S, old: String, new: String, output: String) -> Self {
        Self {
            storage,
            old,
            new,
            output,
            identity: IdentityKind::default(),
        }
    }

    pub fn with_identity(mut self, identity: IdentityKind) -> Self {
        self.identity = identity;
        self
    }
}

impl<S: Storage> Pipeline for DiffPipeline<S> {
    type Extracted = (Snapshot, Snapshot);
    type Transformed = ChangeSet;

    fn name(&self) -> &str {
        "diff"
    }

    fn extract(&self) -> Result<(Snapshot, Snapshot)> {
        let old = load_snapshot(&self.storage, &self.old)?;
        let new = load_snapshot(&self.storage, &self.new)?;
        Ok((old, new))
    }

    fn transform(&self, (old, new): (Snapshot, Snapshot)) -> Result<ChangeSet> {
        let differ = Differ::with_strategy(self.identity.strategy());
        let changes = differ.diff(&old, &new);

        for kind in [ChangeKind::Missing, ChangeKind::Changed] {
            for (category, entry) in changes.kind(kind).categories() {
                tracing::info!(kind = %kind, category = %category, count = entry.count(), "Change");
            }
        }
        tracing::info!(
            identity = differ.strategy_name(),
            new = changes.new.total(),
            changed = changes.changed.total(),
            missing = changes.missing.total(),
            "Snapshots compared"
        );
        Ok(changes)
    }

    fn load(&self, result: ChangeSet) -> Result<String> {
        let json = to_json_pretty(&result)?;
        self.storage.write_file(&self.output, json.as_bytes())?;
        Ok(self.output.clone())
    }
}
