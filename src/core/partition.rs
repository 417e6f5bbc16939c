// Entity catalogue and the partition scheme of the bronze layer.
//
// Responsibilities
// - Name every extracted entity, its API endpoint and how it is partitioned.
// - Map (entity, run date) deterministically to one storage key.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Games,
    Genres,
    Platforms,
    Publishers,
    Tags,
}

/// Lookup tables refreshed in full on every run, in extraction order.
pub const SNAPSHOT_ENTITIES: [Entity; 4] = [
    Entity::Genres,
    Entity::Platforms,
    Entity::Publishers,
    Entity::Tags,
];

impl Entity {
    pub fn name(self) -> &'static str {
        match self {
            Entity::Games => "games",
            Entity::Genres => "genres",
            Entity::Platforms => "platforms",
            Entity::Publishers => "publishers",
            Entity::Tags => "tags",
        }
    }

    /// The API endpoint equals the entity name for every catalog listing.
    pub fn endpoint(self) -> &'static str {
        self.name()
    }

    pub fn partition_kind(self) -> PartitionKind {
        match self {
            Entity::Games => PartitionKind::Incremental,
            _ => PartitionKind::Snapshot,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKind {
    Incremental,
    Snapshot,
}

impl PartitionKind {
    pub fn column(self) -> &'static str {
        match self {
            PartitionKind::Incremental => "updated_date",
            PartitionKind::Snapshot => "snapshot_date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    pub entity: Entity,
    pub kind: PartitionKind,
    pub date: NaiveDate,
}

impl PartitionKey {
    pub fn for_run(entity: Entity, run_date: NaiveDate) -> Self {
        Self {
            entity,
            kind: entity.partition_kind(),
            date: run_date,
        }
    }

    pub fn object_key(&self) -> String {
        format!(
            "{entity}/{column}={date}/{entity}.ndjson",
            entity = self.entity,
            column = self.kind.column(),
            date = self.date.format("%Y-%m-%d"),
        )
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.object_key())
    }
}
