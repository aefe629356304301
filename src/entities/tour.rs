use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tour_status")]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tour")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub start_date: Date,
    pub end_date: Date,
    pub start_time: Option<Time>,
    pub max_capacity: i32,
    pub current_bookings: i32,
    pub price_per_person: Option<f64>,
    pub status: TourStatus,
    pub notes: String,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn available_spots(&self) -> i32 {
        self.max_capacity - self.current_bookings
    }

    pub fn is_full(&self) -> bool {
        self.current_bookings >= self.max_capacity
    }

    /// Inclusive day count: a one-day trip starts and ends on the same date.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;

    fn tour(start: NaiveDate, end: NaiveDate, capacity: i32, booked: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            title: "Maasai Mara Safari".to_string(),
            description: String::new(),
            destination: "Maasai Mara".to_string(),
            start_date: start,
            end_date: end,
            start_time: None,
            max_capacity: capacity,
            current_bookings: booked,
            price_per_person: Some(250.0),
            status: TourStatus::Scheduled,
            notes: String::new(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_duration_is_inclusive() {
        let d = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        assert_eq!(tour(d, d, 8, 0).duration_days(), 1);

        let end = NaiveDate::from_ymd_opt(2025, 8, 12).unwrap();
        assert_eq!(tour(d, end, 8, 0).duration_days(), 3);
    }

    #[test]
    fn test_capacity_derivations() {
        let d = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        let t = tour(d, d, 8, 6);
        assert_eq!(t.available_spots(), 2);
        assert!(!t.is_full());

        let full = tour(d, d, 8, 8);
        assert_eq!(full.available_spots(), 0);
        assert!(full.is_full());
    }
}
