//! Budget entity - A spending ceiling for one category.
//!
//! There is no `spent` column: spend is always derived from the
//! owner's expenses at read time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity of the owning user
    pub owner_id: String,
    /// Category this budget covers (join key against expenses)
    pub category: String,
    /// Ceiling for the period in minor currency units
    pub limit_minor: i64,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// `Budget` has no foreign-key relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
