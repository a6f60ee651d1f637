//! Foreign keys of the relational schema and what happens to referencing rows
//! when the referenced row is deleted. The migrations must declare exactly
//! these constraints.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// Referencing rows are deleted along with the referenced row.
    Cascade,
    /// Deleting a referenced row fails.
    Restrict,
}

impl OnDelete {
    pub fn sql(self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: OnDelete,
}

const fn fk(
    table: &'static str,
    column: &'static str,
    references: &'static str,
    on_delete: OnDelete,
) -> ForeignKey {
    ForeignKey {
        table,
        column,
        references,
        on_delete,
    }
}

pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk("routes", "source_id", "stations", OnDelete::Cascade),
    fk("routes", "destination_id", "stations", OnDelete::Cascade),
    fk("trains", "train_type_id", "train_types", OnDelete::Restrict),
    fk("seats", "train_id", "trains", OnDelete::Cascade),
    fk("journeys", "route_id", "routes", OnDelete::Cascade),
    fk("journeys", "train_id", "trains", OnDelete::Cascade),
    fk("journey_crews", "journey_id", "journeys", OnDelete::Cascade),
    fk("journey_crews", "crew_id", "crews", OnDelete::Cascade),
    fk("tickets", "journey_id", "journeys", OnDelete::Cascade),
    fk("tickets", "seat_id", "seats", OnDelete::Cascade),
    fk("tickets", "train_id", "trains", OnDelete::Cascade),
    fk("tickets", "order_id", "orders", OnDelete::Cascade),
];

/// Foreign keys pointing at `table`.
pub fn referencing(table: &str) -> impl Iterator<Item = &'static ForeignKey> + '_ {
    FOREIGN_KEYS.iter().filter(move |key| key.references == table)
}
