use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "gear_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub loadout_id: i32,
    pub name: String,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gear_loadouts::Entity",
        from = "Column::LoadoutId",
        to = "super::gear_loadouts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    GearLoadouts,
}

impl Related<super::gear_loadouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GearLoadouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
